use std::fmt;

/// Minimum number of entries a wheel can hold.
pub const MIN_ENTRIES: usize = 2;

/// Recoverable validation failures. None of them mutate state.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WheelError {
    EmptyEntry,
    MinimumEntries { min: usize },
    IndexOutOfRange { index: usize, len: usize },
    NotEnoughEntries { count: usize, min: usize },
}

impl fmt::Display for WheelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WheelError::EmptyEntry => write!(f, "Please enter a value"),
            WheelError::MinimumEntries { min } => {
                write!(f, "Minimum {min} entries required")
            }
            WheelError::IndexOutOfRange { index, len } => {
                write!(f, "No entry at position {} (wheel has {len})", index + 1)
            }
            WheelError::NotEnoughEntries { count, min } => write!(
                f,
                "Cannot spin with {count} {}; at least {min} required",
                if *count == 1 { "entry" } else { "entries" }
            ),
        }
    }
}

impl std::error::Error for WheelError {}

pub type Result<T> = std::result::Result<T, WheelError>;
