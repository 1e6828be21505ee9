pub mod config;
pub mod context;
pub mod error;
pub mod registry;
pub mod report;
pub mod runner;
pub mod scenarios;
pub mod unit;

pub use config::{HarnessConfig, HarnessEnv, DEFAULT_CONFIG_FILE};
pub use context::{TestContext, TestEnvironment};
pub use error::{HarnessError, HarnessResult};
pub use registry::{TestDescriptor, TestRegistry, UnitFactory, ALL_TESTS};
pub use report::RunReport;
pub use runner::{LifecyclePhase, RunOutcome, TestRunner};
pub use scenarios::{catalogue, STORAGE_GROUP};
pub use unit::{TestUnit, UnitError, UnitResult};
