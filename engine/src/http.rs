use crate::config::EngineConfig;
use crate::service::{CaseEngine, EngineError, EngineResult};
use crate::types::{
    CaseInstance, CaseTeam, CaseTeamUser, ConsentGroup, ConsentGroupCreated, DefinitionMigration,
    PlanItem, StartCase, StartCaseResponse, Task, Tenant, TenantUser, Transition, User,
};
use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};

#[derive(Serialize)]
struct TokenRequest<'a> {
    sub: &'a str,
}

/// [`CaseEngine`] over the engine's REST API.
pub struct HttpEngine {
    http_client: reqwest::Client,
    base_url: String,
    token_url: String,
}

impl HttpEngine {
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config
            .validate()
            .map_err(|message| EngineError::InvalidConfig { message })?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EngineError::InvalidConfig {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            base_url: with_trailing_slash(&config.base_url),
            token_url: with_trailing_slash(&config.token_url),
        })
    }

    pub fn with_default_config() -> EngineResult<Self> {
        Self::new(EngineConfig::default())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_send_error(e: reqwest::Error) -> EngineError {
        if e.is_timeout() {
            EngineError::ServiceUnavailable {
                message: "Request timeout".to_string(),
            }
        } else if e.is_connect() {
            EngineError::ServiceUnavailable {
                message: "Cannot connect to case engine".to_string(),
            }
        } else {
            EngineError::Network(e)
        }
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        user: Option<&User>,
        body: Option<Value>,
    ) -> EngineResult<reqwest::Response> {
        debug!("{} {}", method, path);

        let mut builder = self
            .http_client
            .request(method.clone(), format!("{}{}", self.base_url, path));

        if let Some(user) = user {
            let token = user
                .token
                .as_deref()
                .ok_or_else(|| EngineError::NotAuthenticated {
                    user_id: user.user_id.clone(),
                })?;
            builder = builder.bearer_auth(token);
        }

        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await.map_err(Self::map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::UnexpectedStatus {
                method: method.to_string(),
                path: format!("/{}", path),
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        user: &User,
        body: Option<Value>,
    ) -> EngineResult<()> {
        self.request(method, path, Some(user), body).await?;
        Ok(())
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        user: &User,
        body: Option<Value>,
    ) -> EngineResult<T> {
        let response = self.request(method, path, Some(user), body).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

#[async_trait]
impl CaseEngine for HttpEngine {
    async fn login(&self, user_id: &str) -> EngineResult<User> {
        debug!("Requesting token for {}", user_id);

        let response = self
            .http_client
            .post(format!("{}token", self.token_url))
            .json(&TokenRequest { sub: user_id })
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(EngineError::UnexpectedStatus {
                method: "POST".to_string(),
                path: "/token".to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(User::new(user_id).with_token(body.trim()))
    }

    async fn health_check(&self) -> EngineResult<()> {
        debug!("Performing health check");

        match self.request(Method::GET, "health", None, None).await {
            Ok(_) => {
                info!("Health check passed");
                Ok(())
            }
            Err(e) => {
                error!("Health check failed: {}", e);
                Err(e)
            }
        }
    }

    async fn create_tenant(&self, user: &User, tenant: &Tenant) -> EngineResult<()> {
        let body = serde_json::to_value(tenant)?;
        self.send(Method::POST, "platform", user, Some(body)).await
    }

    async fn disable_tenant(&self, user: &User, tenant: &str) -> EngineResult<()> {
        let path = format!("platform/{}/disable", tenant);
        self.send(Method::PUT, &path, user, None).await
    }

    async fn enable_tenant(&self, user: &User, tenant: &str) -> EngineResult<()> {
        let path = format!("platform/{}/enable", tenant);
        self.send(Method::PUT, &path, user, None).await
    }

    async fn get_tenant_users(&self, user: &User, tenant: &str) -> EngineResult<Vec<TenantUser>> {
        let path = format!("tenant/{}/users", tenant);
        self.fetch(Method::GET, &path, user, None).await
    }

    async fn start_case(
        &self,
        user: &User,
        command: &StartCase,
    ) -> EngineResult<StartCaseResponse> {
        let body = serde_json::to_value(command)?;
        let response: StartCaseResponse = self.fetch(Method::POST, "cases", user, Some(body)).await?;
        info!(
            "Started case {} ({}) in tenant {}",
            response.case_instance_id, command.definition, command.tenant
        );
        Ok(response)
    }

    async fn get_case(&self, user: &User, case_id: &str) -> EngineResult<CaseInstance> {
        let path = format!("cases/{}", case_id);
        self.fetch(Method::GET, &path, user, None).await
    }

    async fn get_plan_items(&self, user: &User, case_id: &str) -> EngineResult<Vec<PlanItem>> {
        let path = format!("cases/{}/planitems", case_id);
        self.fetch(Method::GET, &path, user, None).await
    }

    async fn make_plan_item_transition(
        &self,
        user: &User,
        case_id: &str,
        plan_item_id: &str,
        transition: Transition,
    ) -> EngineResult<()> {
        let path = format!("cases/{}/planitems/{}/{}", case_id, plan_item_id, transition);
        self.send(Method::POST, &path, user, None).await
    }

    async fn migrate_definition(
        &self,
        user: &User,
        case_id: &str,
        migration: &DefinitionMigration,
    ) -> EngineResult<()> {
        let path = format!("cases/{}/migrate-definition", case_id);
        let body = serde_json::to_value(migration)?;
        self.send(Method::POST, &path, user, Some(body)).await
    }

    async fn get_case_team(&self, user: &User, case_id: &str) -> EngineResult<CaseTeam> {
        let path = format!("cases/{}/caseteam", case_id);
        self.fetch(Method::GET, &path, user, None).await
    }

    async fn set_case_team_user(
        &self,
        user: &User,
        case_id: &str,
        member: &CaseTeamUser,
    ) -> EngineResult<()> {
        let path = format!("cases/{}/caseteam/users", case_id);
        let body = serde_json::to_value(member)?;
        self.send(Method::PUT, &path, user, Some(body)).await
    }

    async fn remove_case_team_user(
        &self,
        user: &User,
        case_id: &str,
        user_id: &str,
    ) -> EngineResult<()> {
        let path = format!("cases/{}/caseteam/users/{}", case_id, user_id);
        self.send(Method::DELETE, &path, user, None).await
    }

    async fn get_case_tasks(&self, user: &User, case_id: &str) -> EngineResult<Vec<Task>> {
        let path = format!("tasks?caseInstanceId={}", case_id);
        self.fetch(Method::GET, &path, user, None).await
    }

    async fn claim_task(&self, user: &User, task_id: &str) -> EngineResult<()> {
        let path = format!("tasks/{}/claim", task_id);
        self.send(Method::PUT, &path, user, None).await
    }

    async fn complete_task(&self, user: &User, task_id: &str, output: Value) -> EngineResult<()> {
        let path = format!("tasks/{}/complete", task_id);
        self.send(Method::POST, &path, user, Some(output)).await
    }

    async fn create_consent_group(
        &self,
        user: &User,
        tenant: &str,
        group: &ConsentGroup,
    ) -> EngineResult<String> {
        let path = format!("consent-group/{}", tenant);
        let body = serde_json::to_value(group)?;
        let created: ConsentGroupCreated = self.fetch(Method::POST, &path, user, Some(body)).await?;
        Ok(created.group_id)
    }

    async fn get_consent_group(&self, user: &User, group_id: &str) -> EngineResult<ConsentGroup> {
        let path = format!("consent-group/{}", group_id);
        self.fetch(Method::GET, &path, user, None).await
    }

    async fn archive_case(&self, user: &User, case_id: &str) -> EngineResult<()> {
        let path = format!("storage/case/{}/archive", case_id);
        self.send(Method::PUT, &path, user, None).await
    }

    async fn restore_case(&self, user: &User, case_id: &str) -> EngineResult<()> {
        let path = format!("storage/case/{}/restore", case_id);
        self.send(Method::PUT, &path, user, None).await
    }

    async fn delete_case(&self, user: &User, case_id: &str) -> EngineResult<()> {
        let path = format!("storage/case/{}", case_id);
        self.send(Method::DELETE, &path, user, None).await
    }

    async fn delete_tenant(&self, user: &User, tenant: &str) -> EngineResult<()> {
        let path = format!("storage/tenant/{}", tenant);
        self.send(Method::DELETE, &path, user, None).await
    }

    fn engine_name(&self) -> &'static str {
        "http"
    }
}
