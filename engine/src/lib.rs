pub mod config;
pub mod http;
pub mod poll;
pub mod service;
pub mod types;

pub use config::{EngineConfig, PollPolicy};
pub use http::HttpEngine;
pub use poll::{poll_until, poll_until_status};
pub use service::{CaseEngine, EngineError, EngineResult};
pub use types::{
    CaseInstance, CaseTeam, CaseTeamGroup, CaseTeamUser, ConsentGroup, ConsentGroupCreated,
    ConsentGroupMember, DefinitionMigration, GroupRoleMapping, PlanItem, StartCase,
    StartCaseResponse, Task, TaskState, Tenant, TenantUser, Transition, User,
};

pub mod prelude {
    pub use crate::config::*;
    pub use crate::http::*;
    pub use crate::poll::*;
    pub use crate::service::*;
    pub use crate::types::*;
}
