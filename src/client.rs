use crate::ui;
use chrono::Local;
use color_eyre::eyre::{
    Result,
    WrapErr,
};
use prize_wheel::{
    config::AppConfig,
    entries::EntryList,
    history::WinnerHistory,
    spin::{
        SpinEngine,
        SpinOutcome,
        SpinRequest,
        SpinState,
    },
};
use std::{
    fmt::Display,
    time::Duration,
};
use tokio::time::{
    self,
    MissedTickBehavior,
};
use tracing::{
    debug,
    info,
    warn,
};

const MAX_ERRORS: usize = 5;

#[derive(Clone, Debug)]
pub struct HistoryLine {
    pub time: String,
    pub winner: String,
}

#[derive(Clone, Debug)]
pub struct AppSnapshot {
    pub entries: Vec<String>,
    /// What the wheel shows: the spin's snapshot while spinning, else the
    /// live list.
    pub wheel_entries: Vec<String>,
    pub rotation: f64,
    pub spin_state: SpinState,
    pub progress: f64,
    pub selected: usize,
    pub winner: Option<String>,
    pub history: Vec<HistoryLine>,
    pub status: String,
    pub errors: Vec<String>,
}

pub struct AppController {
    entries: EntryList,
    engine: SpinEngine,
    history: WinnerHistory,
    winner: Option<String>,
    selected: usize,
    status: String,
    errors: Vec<String>,
}

impl AppController {
    pub fn new(config: &AppConfig) -> Self {
        let engine = match config.seed {
            Some(seed) => SpinEngine::seeded(seed),
            None => SpinEngine::new(),
        };
        Self::with_engine(config.entries.clone(), engine)
    }

    fn with_engine(entries: EntryList, engine: SpinEngine) -> Self {
        Self {
            entries,
            engine,
            history: WinnerHistory::default(),
            winner: None,
            selected: 0,
            status: String::from("Ready"),
            errors: Vec::new(),
        }
    }

    pub fn is_spinning(&self) -> bool {
        self.engine.is_spinning()
    }

    pub fn add_entry(&mut self, text: &str) {
        match self.entries.add(text) {
            Ok(()) => {
                let added = self.entries.get(self.entries.len() - 1).unwrap_or_default();
                let msg = format!("Added \"{added}\"");
                self.set_status(msg);
            }
            Err(e) => {
                warn!(error = %e, "add entry rejected");
                self.push_error(e);
            }
        }
    }

    pub fn remove_selected(&mut self) {
        match self.entries.remove(self.selected) {
            Ok(removed) => {
                self.selected = self.selected.min(self.entries.len() - 1);
                self.set_status(format!("Removed \"{removed}\""));
            }
            Err(e) => {
                warn!(error = %e, index = self.selected, "remove entry rejected");
                self.push_error(e);
            }
        }
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.entries.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn request_spin(&mut self) {
        match self.engine.request_spin(self.entries.as_slice()) {
            Ok(SpinRequest::Started { .. }) => {
                self.winner = None;
                self.set_status("Spinning...");
            }
            Ok(SpinRequest::AlreadySpinning) => {
                debug!("spin requested while already spinning");
                self.status = String::from("Already spinning, wait for the wheel to stop");
            }
            Err(e) => {
                warn!(error = %e, "spin rejected");
                self.push_error(e);
            }
        }
    }

    /// One animation frame. Announces the winner on the frame the wheel
    /// settles.
    pub fn tick(&mut self) -> Option<SpinOutcome> {
        let outcome = self.engine.tick()?;
        info!(winner = %outcome.winner, ticks = outcome.ticks, "winner announced");
        self.history.record(&outcome, Local::now());
        self.winner = Some(outcome.winner.clone());
        self.set_status(format!("Winner! {}", outcome.winner));
        Some(outcome)
    }

    pub fn snapshot(&self) -> AppSnapshot {
        let wheel_entries = if self.engine.is_spinning() {
            self.engine.snapshot().to_vec()
        } else {
            self.entries.snapshot()
        };
        AppSnapshot {
            entries: self.entries.snapshot(),
            wheel_entries,
            rotation: self.engine.animation().current,
            spin_state: self.engine.state(),
            progress: self.engine.progress(),
            selected: self.selected,
            winner: self.winner.clone(),
            history: self
                .history
                .iter()
                .map(|r| HistoryLine {
                    time: r.at.format("%H:%M:%S").to_string(),
                    winner: r.winner.clone(),
                })
                .collect(),
            status: self.status.clone(),
            errors: self.errors.clone(),
        }
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.errors.clear();
    }

    fn push_error(&mut self, err: impl Display) {
        self.errors.push(err.to_string());
        if self.errors.len() > MAX_ERRORS {
            let overflow = self.errors.len() - MAX_ERRORS;
            self.errors.drain(..overflow);
        }
    }
}

pub async fn run_app(config: AppConfig) -> Result<()> {
    let controller = AppController::new(&config);
    let mut ui_state = ui::UiState::default();
    let mut input_events = ui::input_event_stream();

    tracing::info!("Starting UI");
    ui::terminal_enter(&mut ui_state)?;
    let res = run_loop(
        controller,
        &mut ui_state,
        &mut input_events,
        config.frame_interval,
    )
    .await;
    ui::finish_with_exit(res, ui::terminal_exit())
}

async fn run_loop(
    mut controller: AppController,
    ui_state: &mut ui::UiState,
    input_events: &mut ui::InputEventReceiver,
    frame_interval: Duration,
) -> Result<()> {
    let mut frames = time::interval(frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let snapshot = controller.snapshot();
    ui::draw(ui_state, &snapshot).wrap_err("initial draw failed")?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => { break; }
            _ = frames.tick(), if controller.is_spinning() => {
                controller.tick();
                let snapshot = controller.snapshot();
                ui::draw(ui_state, &snapshot).wrap_err("draw after frame failed")?;
            }
            raw_ev = ui::next_raw_event(input_events) => {
                let event = raw_ev?;
                let Some(ev) = ui::interpret_event(ui_state, event) else {
                    continue;
                };
                match ev {
                    ui::UserEvent::Quit => break,
                    ui::UserEvent::Spin => controller.request_spin(),
                    ui::UserEvent::AddEntry(text) => controller.add_entry(&text),
                    ui::UserEvent::RemoveSelected => controller.remove_selected(),
                    ui::UserEvent::NextEntry => controller.select_next(),
                    ui::UserEvent::PrevEntry => controller.select_prev(),
                    ui::UserEvent::Redraw => {}
                }
                let snapshot = controller.snapshot();
                ui::draw(ui_state, &snapshot).wrap_err("draw after input failed")?;
            }
        }
    }
    tracing::info!("UI closed");
    Ok(())
}
