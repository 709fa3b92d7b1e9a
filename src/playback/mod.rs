//! Playback controller
//!
//! Sequences the steps of a scenario in response to start / advance /
//! reset. All Playback State lives in [`PlaybackState`] and is only
//! mutated through those three operations.
//!
//! Applying the language-model step spawns an answer task on the tokio
//! runtime. The state update itself is synchronous and visible before the
//! task resolves; the task appends its line to the shared console whenever
//! the provider answers. Tasks are never aborted. Each `start`/`reset`
//! bumps an epoch and, when `discard_stale_answers` is set, a task issued
//! under an older epoch drops its result instead of logging it.

pub mod log;

pub use log::{ConsoleLog, LogHistory, LOG_CAPACITY};

use crate::config::PlaybackConfig;
use crate::genai::{generate_answer, GenerativeModel};
use crate::scenario::{build_scenario, InspectorPayload, Scenario, ScenarioName, StepRecord};
use crate::topology::{Edge, NodeId};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Logged when an advance runs past the final step
pub const COMPLETE_LINE: &str = "Simulation complete.";

/// Logged by reset
pub const RESET_LINE: &str = "Reset.";

/// Prefix of the line carrying the model's answer
pub const ANSWER_PREFIX: &str = "[LLM Response]: ";

/// Controller state machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No scenario selected
    Idle,
    /// Steps are being applied, up to and including the final one
    Running,
    /// The advance after the final step was consumed
    Completed,
}

/// Result of a controller operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step at this position was applied
    Applied(usize),
    /// The scenario finished
    Completed,
    /// Nothing to do in the current phase
    Ignored,
}

/// "Step n / total" indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepProgress {
    pub number: usize,
    pub total: usize,
}

/// Mutable playback state of one session
#[derive(Debug, Clone, Default)]
pub struct PlaybackState {
    scenario: Option<Scenario>,
    current_index: Option<usize>,
    active_node: Option<NodeId>,
    active_edge: Option<Edge>,
    inspector: Option<InspectorPayload>,
    completed: bool,
}

impl PlaybackState {
    pub fn phase(&self) -> Phase {
        match (&self.scenario, self.completed) {
            (None, _) => Phase::Idle,
            (Some(_), false) => Phase::Running,
            (Some(_), true) => Phase::Completed,
        }
    }

    pub fn scenario(&self) -> Option<&Scenario> {
        self.scenario.as_ref()
    }

    pub fn scenario_name(&self) -> Option<ScenarioName> {
        self.scenario.as_ref().map(Scenario::name)
    }

    /// Position of the most recently applied step; `None` before the first
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn active_node(&self) -> Option<NodeId> {
        self.active_node
    }

    pub fn active_edge(&self) -> Option<Edge> {
        self.active_edge
    }

    pub fn inspector(&self) -> Option<&InspectorPayload> {
        self.inspector.as_ref()
    }

    pub fn progress(&self) -> Option<StepProgress> {
        let scenario = self.scenario.as_ref()?;
        Some(StepProgress {
            number: self.current_index.map_or(0, |i| i + 1),
            total: scenario.len(),
        })
    }
}

/// Drives scenario playback for one session
pub struct PlaybackController {
    state: PlaybackState,
    console: ConsoleLog,
    model: Arc<dyn GenerativeModel>,
    config: PlaybackConfig,
    query: String,
    epoch: Arc<AtomicU64>,
    pending: Vec<JoinHandle<()>>,
}

impl PlaybackController {
    pub fn new(model: Arc<dyn GenerativeModel>, config: PlaybackConfig) -> Self {
        Self::with_console(model, config, ConsoleLog::new())
    }

    /// Controller writing to an existing console
    pub fn with_console(model: Arc<dyn GenerativeModel>, config: PlaybackConfig, console: ConsoleLog) -> Self {
        Self {
            state: PlaybackState::default(),
            console,
            model,
            config,
            query: String::new(),
            epoch: Arc::new(AtomicU64::new(0)),
            pending: Vec::new(),
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn console(&self) -> &ConsoleLog {
        &self.console
    }

    pub fn log(&self) -> LogHistory {
        self.console.snapshot()
    }

    /// Query text sent with the generation step
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Number of answer tasks not yet awaited by [`settle`](Self::settle)
    pub fn pending_answers(&self) -> usize {
        self.pending.iter().filter(|h| !h.is_finished()).count()
    }

    /// Begin a scenario, discarding whatever ran before, and apply its first step
    pub fn start(&mut self, name: ScenarioName, tenant_id: &str) -> StepOutcome {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        info!("Starting {} pipeline simulation for {}", name, tenant_id);

        self.state = PlaybackState {
            scenario: Some(build_scenario(name, tenant_id)),
            ..PlaybackState::default()
        };
        self.console.clear();
        self.apply(0)
    }

    /// Apply the next step, or complete the scenario after the final one
    pub fn advance(&mut self) -> StepOutcome {
        if self.state.phase() != Phase::Running {
            debug!("advance ignored in {:?} phase", self.state.phase());
            return StepOutcome::Ignored;
        }

        let next = self.state.current_index.map_or(0, |i| i + 1);
        let last = self.state.scenario.as_ref().map_or(0, Scenario::last_position);

        if next > last {
            self.state.completed = true;
            self.state.active_edge = None;
            self.console.push(COMPLETE_LINE);
            info!("Simulation complete");
            return StepOutcome::Completed;
        }

        self.apply(next)
    }

    /// Return to idle, clearing highlights, inspector and log
    pub fn reset(&mut self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.state = PlaybackState::default();
        self.console.reset_to(RESET_LINE);
        debug!("Playback reset");
    }

    /// Wait for every outstanding answer task
    pub async fn settle(&mut self) {
        for handle in self.pending.drain(..) {
            if let Err(e) = handle.await {
                warn!("Answer task failed: {}", e);
            }
        }
    }

    fn apply(&mut self, position: usize) -> StepOutcome {
        let step: StepRecord = match self.state.scenario.as_ref().and_then(|s| s.get(position)) {
            Some(step) => step.clone(),
            None => return StepOutcome::Ignored,
        };

        self.state.current_index = Some(position);
        self.state.active_node = Some(step.node);
        self.state.active_edge = step.edge;
        self.state.inspector = Some(step.payload);
        self.console.push(step.log_line);
        debug!("Applied step {} at {}", position, step.node);

        if step.node.is_language_model() {
            self.spawn_answer();
        }

        StepOutcome::Applied(position)
    }

    fn spawn_answer(&mut self) {
        let runtime = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("No async runtime available; skipping answer generation");
                return;
            }
        };

        let model = Arc::clone(&self.model);
        let console = self.console.clone();
        let epoch = Arc::clone(&self.epoch);
        let issued_at = epoch.load(Ordering::SeqCst);
        let discard_stale = self.config.discard_stale_answers;
        let query = self.query.clone();
        let context = self.config.answer_context.clone();

        self.pending.retain(|h| !h.is_finished());
        self.pending.push(runtime.spawn(async move {
            let answer = generate_answer(model.as_ref(), &query, &context).await;
            if discard_stale && epoch.load(Ordering::SeqCst) != issued_at {
                debug!("Dropping answer from a superseded run");
                return;
            }
            console.push(format!("{}{}", ANSWER_PREFIX, answer));
        }));
    }
}
