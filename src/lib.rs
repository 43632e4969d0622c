pub mod config;
pub mod entries;
pub mod error;
pub mod geometry;
pub mod history;
pub mod spin;

pub use entries::EntryList;
pub use error::{
    MIN_ENTRIES,
    WheelError,
};
pub use spin::{
    AnimationState,
    SpinEngine,
    SpinOutcome,
    SpinRequest,
    SpinState,
};
