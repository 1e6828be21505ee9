//! Execution wrapper around a single test unit.

use crate::context::{TestContext, TestEnvironment};
use crate::error::{HarnessError, HarnessResult};
use crate::registry::TestDescriptor;
use crate::unit::{TestUnit, UnitError};
use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{error, info, warn};

const BANNER_WIDTH: usize = 72;

/// Lifecycle step in which a unit failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Prepare,
    Run,
    Close,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecyclePhase::Prepare => write!(f, "prepare"),
            LifecyclePhase::Run => write!(f, "run"),
            LifecyclePhase::Close => write!(f, "close"),
        }
    }
}

/// Terminal state of a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Failed(LifecyclePhase),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Completed)
    }
}

/// Drives one unit through prepare, run and close, recording timing and the
/// first failure. Lifecycle errors are kept on the runner and never returned
/// to the caller.
pub struct TestRunner {
    name: &'static str,
    padding: usize,
    unit: Box<dyn TestUnit>,
    identifiers: Vec<String>,
    explicitly_mentioned: bool,
    sequence: usize,
    started: Option<DateTime<Utc>>,
    ended: Option<DateTime<Utc>>,
    running: bool,
    completed: bool,
    failed_phase: Option<LifecyclePhase>,
    error: Option<UnitError>,
    summary: String,
}

impl TestRunner {
    /// Instantiates the unit. A failing constructor is fatal for the caller.
    pub fn new(descriptor: &TestDescriptor, explicitly_mentioned: bool) -> HarnessResult<Self> {
        let name = descriptor.name();
        let unit = descriptor
            .instantiate()
            .map_err(|source| HarnessError::Construction {
                name: name.to_string(),
                source,
            })?;

        Ok(Self {
            name,
            padding: BANNER_WIDTH.saturating_sub(name.len()) / 2,
            unit,
            identifiers: Vec::new(),
            explicitly_mentioned,
            sequence: 0,
            started: None,
            ended: None,
            running: false,
            completed: false,
            failed_phase: None,
            error: None,
            summary: String::new(),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn padding(&self) -> usize {
        self.padding
    }

    pub fn sequence(&self) -> usize {
        self.sequence
    }

    pub(crate) fn set_sequence(&mut self, sequence: usize) {
        self.sequence = sequence;
    }

    pub fn is_explicitly_mentioned(&self) -> bool {
        self.explicitly_mentioned
    }

    pub fn needs_running(&self) -> bool {
        self.explicitly_mentioned || self.unit.is_default_test()
    }

    pub fn started(&self) -> Option<DateTime<Utc>> {
        self.started
    }

    pub fn ended(&self) -> Option<DateTime<Utc>> {
        self.ended
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn error(&self) -> Option<&UnitError> {
        self.error.as_ref()
    }

    pub fn failed_phase(&self) -> Option<LifecyclePhase> {
        self.failed_phase
    }

    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Terminal outcome, or `None` while the runner has not executed.
    pub fn outcome(&self) -> Option<RunOutcome> {
        if self.completed {
            Some(RunOutcome::Completed)
        } else {
            self.failed_phase.map(RunOutcome::Failed)
        }
    }

    /// Milliseconds between the start of the run phase and the end of the
    /// lifecycle. Zero when the run phase was never reached.
    pub fn elapsed_ms(&self) -> i64 {
        match (self.started, self.ended) {
            (Some(started), Some(ended)) => (ended - started).num_milliseconds().max(0),
            _ => 0,
        }
    }

    pub async fn execute(&mut self, env: &TestEnvironment) -> RunOutcome {
        if let Some(outcome) = self.outcome() {
            warn!("{} already executed, not running it again", self.name);
            return outcome;
        }

        let pad = "=".repeat(self.padding);
        info!("{} Starting test {:02} - {} {}", pad, self.sequence, self.name, pad);

        let result = self.drive(env).await;

        self.ended = Some(Utc::now());
        self.running = false;
        self.summary = self.identifiers.join(", ");

        match result {
            Ok(()) => {
                self.completed = true;
                info!(
                    test = self.name,
                    sequence = self.sequence,
                    elapsed_ms = self.elapsed_ms(),
                    "Test completed"
                );
                RunOutcome::Completed
            }
            Err((phase, err)) => {
                error!(
                    test = self.name,
                    sequence = self.sequence,
                    phase = %phase,
                    elapsed_ms = self.elapsed_ms(),
                    "Test failed: {}",
                    err
                );
                self.failed_phase = Some(phase);
                self.error = Some(err);
                RunOutcome::Failed(phase)
            }
        }
    }

    async fn drive(&mut self, env: &TestEnvironment) -> Result<(), (LifecyclePhase, UnitError)> {
        let mut ctx = TestContext::new(env, &mut self.identifiers);

        self.unit
            .on_prepare_test(&mut ctx)
            .await
            .map_err(|e| (LifecyclePhase::Prepare, e))?;

        self.started = Some(Utc::now());
        self.running = true;

        self.unit
            .run(&mut ctx)
            .await
            .map_err(|e| (LifecyclePhase::Run, e))?;

        self.unit
            .on_close_test(&mut ctx)
            .await
            .map_err(|e| (LifecyclePhase::Close, e))
    }

    /// The report line without the sequence number.
    pub fn describe(&self) -> String {
        let timing = if self.error.is_some() {
            format!("failed after {}ms", self.elapsed_ms())
        } else {
            format!("({}ms)", self.elapsed_ms())
        };

        if self.summary.is_empty() {
            format!("{} {}", self.name, timing)
        } else {
            format!("{} {} - {}", self.name, timing, self.summary)
        }
    }

    pub fn report(&self) -> String {
        format!("{:02} {}", self.sequence, self.describe())
    }
}

impl fmt::Debug for TestRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestRunner")
            .field("name", &self.name)
            .field("sequence", &self.sequence)
            .field("explicitly_mentioned", &self.explicitly_mentioned)
            .field("running", &self.running)
            .field("completed", &self.completed)
            .field("failed_phase", &self.failed_phase)
            .field("identifiers", &self.identifiers)
            .finish()
    }
}
