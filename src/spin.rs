use crate::{
    error::{
        MIN_ENTRIES,
        Result,
        WheelError,
    },
    geometry,
};
use rand::{
    Rng,
    SeedableRng,
    rngs::StdRng,
};
use std::f64::consts::TAU;
use tracing::{
    info,
    warn,
};

pub const DAMPING: f64 = 0.05;
pub const EPSILON: f64 = 0.01;
pub const MIN_FULL_TURNS: u32 = 4;
pub const MAX_FULL_TURNS: u32 = 7;
pub const MAX_TICKS: u32 = 600;

/// Fixed wheel physics. The defaults are the only values the app uses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineParams {
    pub damping: f64,
    pub epsilon: f64,
    pub min_full_turns: u32,
    pub max_full_turns: u32,
    pub max_ticks: u32,
}

impl Default for EngineParams {
    fn default() -> Self {
        EngineParams {
            damping: DAMPING,
            epsilon: EPSILON,
            min_full_turns: MIN_FULL_TURNS,
            max_full_turns: MAX_FULL_TURNS,
            max_ticks: MAX_TICKS,
        }
    }
}

impl EngineParams {
    /// Ticks the ease-out needs to close `distance` to within epsilon.
    pub fn ticks_to_converge(&self, distance: f64) -> u32 {
        let distance = distance.abs();
        if distance < self.epsilon {
            return 0;
        }
        let per_tick = (1.0 - self.damping).ln();
        ((self.epsilon / distance).ln() / per_tick).floor() as u32 + 1
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SpinState {
    #[default]
    Idle,
    Spinning,
}

/// Rotation the renderer reads every frame. Only the engine mutates it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AnimationState {
    pub current: f64,
    pub target: f64,
}

impl AnimationState {
    pub fn remaining(&self) -> f64 {
        self.target - self.current
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpinRequest {
    Started {
        target: f64,
        full_turns: u32,
        offset: f64,
    },
    AlreadySpinning,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpinOutcome {
    pub index: usize,
    pub winner: String,
    pub rotation: f64,
    pub ticks: u32,
    /// Settled by the tick limit rather than by convergence.
    pub forced: bool,
}

/// Target for a spin: always ahead of `current` in the spin direction.
pub fn plan_target(current: f64, full_turns: u32, offset: f64) -> f64 {
    current + full_turns as f64 * TAU + offset
}

pub struct SpinEngine<R = StdRng> {
    params: EngineParams,
    rng: R,
    animation: AnimationState,
    state: SpinState,
    snapshot: Vec<String>,
    distance: f64,
    ticks: u32,
    last_outcome: Option<SpinOutcome>,
}

impl SpinEngine<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(EngineParams::default(), StdRng::from_os_rng())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(EngineParams::default(), StdRng::seed_from_u64(seed))
    }
}

impl Default for SpinEngine<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> SpinEngine<R> {
    pub fn with_rng(params: EngineParams, rng: R) -> Self {
        SpinEngine {
            params,
            rng,
            animation: AnimationState::default(),
            state: SpinState::Idle,
            snapshot: Vec::new(),
            distance: 0.0,
            ticks: 0,
            last_outcome: None,
        }
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn state(&self) -> SpinState {
        self.state
    }

    pub fn is_spinning(&self) -> bool {
        self.state == SpinState::Spinning
    }

    pub fn animation(&self) -> AnimationState {
        self.animation
    }

    /// Entries captured when the current (or last) spin started.
    pub fn snapshot(&self) -> &[String] {
        &self.snapshot
    }

    pub fn last_outcome(&self) -> Option<&SpinOutcome> {
        self.last_outcome.as_ref()
    }

    /// Fraction of the spin distance already covered, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if !self.is_spinning() || self.distance <= 0.0 {
            return if self.last_outcome.is_some() { 1.0 } else { 0.0 };
        }
        (1.0 - self.animation.remaining() / self.distance).clamp(0.0, 1.0)
    }

    /// Starts a spin over a snapshot of `entries`.
    ///
    /// A spin already in flight makes this a no-op returning
    /// [`SpinRequest::AlreadySpinning`].
    pub fn request_spin<S: AsRef<str>>(&mut self, entries: &[S]) -> Result<SpinRequest> {
        if self.is_spinning() {
            return Ok(SpinRequest::AlreadySpinning);
        }
        if entries.len() < MIN_ENTRIES {
            return Err(WheelError::NotEnoughEntries {
                count: entries.len(),
                min: MIN_ENTRIES,
            });
        }

        let full_turns = self
            .rng
            .random_range(self.params.min_full_turns..=self.params.max_full_turns);
        let offset = self.rng.random_range(0.0..TAU);
        let target = plan_target(self.animation.current, full_turns, offset);

        self.snapshot = entries.iter().map(|e| e.as_ref().to_string()).collect();
        self.last_outcome = None;
        self.animation.target = target;
        self.distance = self.animation.remaining();
        self.ticks = 0;
        self.state = SpinState::Spinning;

        info!(
            entries = self.snapshot.len(),
            full_turns,
            offset,
            from = self.animation.current,
            target,
            "spin started"
        );
        Ok(SpinRequest::Started {
            target,
            full_turns,
            offset,
        })
    }

    /// Advances the animation by one frame. Returns the outcome on the tick
    /// the spin settles and `None` otherwise.
    pub fn tick(&mut self) -> Option<SpinOutcome> {
        if !self.is_spinning() {
            return None;
        }
        self.ticks += 1;
        let step = self.animation.remaining() * self.params.damping;
        self.animation.current += step;

        if self.animation.remaining().abs() < self.params.epsilon {
            return Some(self.settle(false));
        }
        if self.ticks >= self.params.max_ticks {
            warn!(
                ticks = self.ticks,
                remaining = self.animation.remaining(),
                "spin did not converge, forcing settle"
            );
            return Some(self.settle(true));
        }
        None
    }

    fn settle(&mut self, forced: bool) -> SpinOutcome {
        self.animation.current = self.animation.target;
        let rotation = self.animation.current;
        let index = geometry::sector_under_pointer(rotation, self.snapshot.len());
        let outcome = SpinOutcome {
            index,
            winner: self.snapshot[index].clone(),
            rotation,
            ticks: self.ticks,
            forced,
        };
        self.state = SpinState::Idle;
        info!(
            winner = %outcome.winner,
            index,
            rotation,
            ticks = self.ticks,
            forced,
            "spin settled"
        );
        self.last_outcome = Some(outcome.clone());
        outcome
    }
}
