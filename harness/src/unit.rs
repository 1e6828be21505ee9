//! The lifecycle contract every end-to-end scenario implements.

use crate::context::TestContext;
use async_trait::async_trait;
use engine::EngineError;
use thiserror::Error;

/// Failure raised by a scenario during prepare, run or close.
#[derive(Error, Debug)]
pub enum UnitError {
    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Missing data: {0}")]
    Missing(String),

    #[error("Setup failed: {0}")]
    Setup(String),
}

pub type UnitResult<T> = Result<T, UnitError>;

/// One end-to-end scenario.
///
/// A unit is instantiated once per runner, driven through
/// [`on_prepare_test`](TestUnit::on_prepare_test), [`run`](TestUnit::run) and
/// [`on_close_test`](TestUnit::on_close_test) in that order, and discarded
/// afterwards.
#[async_trait]
pub trait TestUnit: Send {
    /// Whether the unit takes part in an unqualified run. Destructive or slow
    /// scenarios opt out and only run when selected by name or group.
    fn is_default_test(&self) -> bool {
        true
    }

    async fn on_prepare_test(&mut self, _ctx: &mut TestContext<'_>) -> UnitResult<()> {
        Ok(())
    }

    async fn run(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()>;

    async fn on_close_test(&mut self, _ctx: &mut TestContext<'_>) -> UnitResult<()> {
        Ok(())
    }
}
