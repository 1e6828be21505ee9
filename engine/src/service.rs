use crate::types::{
    CaseInstance, CaseTeam, CaseTeamUser, ConsentGroup, DefinitionMigration, PlanItem, StartCase,
    StartCaseResponse, Task, Tenant, TenantUser, Transition, User,
};
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{method} {path} returned {status}: {body}")]
    UnexpectedStatus {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    #[error("User '{user_id}' has no token; login first")]
    NotAuthenticated { user_id: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("Condition not yet met: {message}")]
    Pending { message: String },

    #[error("Gave up waiting for {what} after {attempts} attempts: {last_error}")]
    PollTimeout {
        what: String,
        attempts: u32,
        last_error: String,
    },
}

impl EngineError {
    /// HTTP status of a rejected request, if the engine answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            EngineError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Operations of the case engine used by the end-to-end scenarios.
///
/// Every call except [`login`](CaseEngine::login) and
/// [`health_check`](CaseEngine::health_check) is performed on behalf of an
/// authenticated [`User`].
#[async_trait]
pub trait CaseEngine: Send + Sync {
    async fn login(&self, user_id: &str) -> EngineResult<User>;

    async fn health_check(&self) -> EngineResult<()>;

    // Platform and tenant administration
    async fn create_tenant(&self, user: &User, tenant: &Tenant) -> EngineResult<()>;

    async fn disable_tenant(&self, user: &User, tenant: &str) -> EngineResult<()>;

    async fn enable_tenant(&self, user: &User, tenant: &str) -> EngineResult<()>;

    async fn get_tenant_users(&self, user: &User, tenant: &str) -> EngineResult<Vec<TenantUser>>;

    // Cases
    async fn start_case(&self, user: &User, command: &StartCase)
        -> EngineResult<StartCaseResponse>;

    async fn get_case(&self, user: &User, case_id: &str) -> EngineResult<CaseInstance>;

    async fn get_plan_items(&self, user: &User, case_id: &str) -> EngineResult<Vec<PlanItem>>;

    async fn make_plan_item_transition(
        &self,
        user: &User,
        case_id: &str,
        plan_item_id: &str,
        transition: Transition,
    ) -> EngineResult<()>;

    async fn migrate_definition(
        &self,
        user: &User,
        case_id: &str,
        migration: &DefinitionMigration,
    ) -> EngineResult<()>;

    // Case team
    async fn get_case_team(&self, user: &User, case_id: &str) -> EngineResult<CaseTeam>;

    async fn set_case_team_user(
        &self,
        user: &User,
        case_id: &str,
        member: &CaseTeamUser,
    ) -> EngineResult<()>;

    async fn remove_case_team_user(
        &self,
        user: &User,
        case_id: &str,
        user_id: &str,
    ) -> EngineResult<()>;

    // Tasks
    async fn get_case_tasks(&self, user: &User, case_id: &str) -> EngineResult<Vec<Task>>;

    async fn claim_task(&self, user: &User, task_id: &str) -> EngineResult<()>;

    async fn complete_task(&self, user: &User, task_id: &str, output: Value) -> EngineResult<()>;

    // Consent groups
    async fn create_consent_group(
        &self,
        user: &User,
        tenant: &str,
        group: &ConsentGroup,
    ) -> EngineResult<String>;

    async fn get_consent_group(&self, user: &User, group_id: &str) -> EngineResult<ConsentGroup>;

    // Storage
    async fn archive_case(&self, user: &User, case_id: &str) -> EngineResult<()>;

    async fn restore_case(&self, user: &User, case_id: &str) -> EngineResult<()>;

    async fn delete_case(&self, user: &User, case_id: &str) -> EngineResult<()>;

    async fn delete_tenant(&self, user: &User, tenant: &str) -> EngineResult<()>;

    fn engine_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_only_for_http_rejections() {
        let err = EngineError::UnexpectedStatus {
            method: "GET".to_string(),
            path: "/cases/abc".to_string(),
            status: 404,
            body: "Case not found".to_string(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "GET /cases/abc returned 404: Case not found");

        let err = EngineError::Pending {
            message: "case still active".to_string(),
        };
        assert_eq!(err.status(), None);

        let err = EngineError::NotAuthenticated {
            user_id: "bob".to_string(),
        };
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_poll_timeout_message() {
        let err = EngineError::PollTimeout {
            what: "case archived".to_string(),
            attempts: 3,
            last_error: "still there".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Gave up waiting for case archived after 3 attempts: still there"
        );
    }
}
