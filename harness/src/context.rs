use crate::config::HarnessConfig;
use crate::error::HarnessResult;
use crate::unit::UnitResult;
use engine::{CaseEngine, HttpEngine, PollPolicy, User};
use std::sync::Arc;
use uuid::Uuid;

/// Shared state for one invocation: configuration plus the engine client.
/// Built once and lent to every runner in turn.
pub struct TestEnvironment {
    config: HarnessConfig,
    engine: Arc<dyn CaseEngine>,
}

impl TestEnvironment {
    pub fn new(config: HarnessConfig, engine: Arc<dyn CaseEngine>) -> Self {
        Self { config, engine }
    }

    /// Connects an [`HttpEngine`] using the engine section of `config`.
    pub fn connect(config: HarnessConfig) -> HarnessResult<Self> {
        let engine = HttpEngine::new(config.engine.clone())?;
        Ok(Self::new(config, Arc::new(engine)))
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn engine(&self) -> &dyn CaseEngine {
        self.engine.as_ref()
    }
}

/// What a unit sees while its lifecycle runs.
pub struct TestContext<'a> {
    env: &'a TestEnvironment,
    identifiers: &'a mut Vec<String>,
}

impl<'a> TestContext<'a> {
    pub fn new(env: &'a TestEnvironment, identifiers: &'a mut Vec<String>) -> Self {
        Self { env, identifiers }
    }

    pub fn engine(&self) -> &'a dyn CaseEngine {
        self.env.engine.as_ref()
    }

    pub fn config(&self) -> &'a HarnessConfig {
        &self.env.config
    }

    pub fn poll(&self) -> PollPolicy {
        self.env.config.poll
    }

    /// Records an artifact (case id, tenant name) for the run report.
    pub fn add_identifier(&mut self, identifier: impl Into<String>) {
        self.identifiers.push(identifier.into());
    }

    pub fn identifiers(&self) -> &[String] {
        self.identifiers
    }

    pub async fn login(&self, user_id: &str) -> UnitResult<User> {
        Ok(self.engine().login(user_id).await?)
    }

    pub async fn login_platform_admin(&self) -> UnitResult<User> {
        self.login(&self.env.config.platform_admin).await
    }

    /// A tenant name that no earlier run has used.
    pub fn unique_tenant_name(&self) -> String {
        format!("{}-{}", self.env.config.tenant_prefix, Uuid::new_v4().simple())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn environment() -> TestEnvironment {
        TestEnvironment::connect(HarnessConfig::default()).unwrap()
    }

    #[test]
    fn test_identifiers_are_appended_in_order() {
        let env = environment();
        let mut identifiers = Vec::new();
        let mut ctx = TestContext::new(&env, &mut identifiers);

        ctx.add_identifier("tenant world-1");
        ctx.add_identifier(String::from("case c-1"));
        assert_eq!(ctx.identifiers().to_vec(), vec!["tenant world-1", "case c-1"]);
        drop(ctx);

        assert_eq!(identifiers.len(), 2);
    }

    #[test]
    fn test_unique_tenant_names() {
        let env = environment();
        let mut identifiers = Vec::new();
        let ctx = TestContext::new(&env, &mut identifiers);

        let first = ctx.unique_tenant_name();
        let second = ctx.unique_tenant_name();
        assert!(first.starts_with("e2e-"));
        assert_ne!(first, second);
        assert_eq!(ctx.engine().engine_name(), "http");
    }
}
