use crate::unit::UnitError;
use engine::EngineError;
use thiserror::Error;

/// Errors that abort a whole invocation.
///
/// Failures inside a unit's lifecycle are not represented here; the runner
/// records those as [`UnitError`] and carries on with the next unit.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Test '{name}' not found")]
    UnknownTest { name: String },

    #[error("Group '{group}' refers to unknown test '{name}'")]
    UnknownGroupMember { group: String, name: String },

    #[error("Failed to construct test {name}: {source}")]
    Construction {
        name: String,
        #[source]
        source: UnitError,
    },

    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type HarnessResult<T> = Result<T, HarnessError>;
