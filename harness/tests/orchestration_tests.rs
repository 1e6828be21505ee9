use async_trait::async_trait;
use engine::{
    CaseEngine, CaseInstance, CaseTeam, CaseTeamUser, ConsentGroup, DefinitionMigration,
    EngineError, EngineResult, PlanItem, PollPolicy, StartCase, StartCaseResponse, Task, Tenant,
    TenantUser, Transition, User,
};
use harness::{
    catalogue, HarnessConfig, HarnessError, LifecyclePhase, RunOutcome, RunReport, TestContext,
    TestDescriptor, TestEnvironment, TestRegistry, TestUnit, UnitError, UnitResult,
    STORAGE_GROUP,
};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct TestAlpha;

#[async_trait]
impl TestUnit for TestAlpha {
    async fn run(&mut self, _ctx: &mut TestContext<'_>) -> UnitResult<()> {
        Ok(())
    }
}

#[derive(Default)]
struct TestBeta;

#[async_trait]
impl TestUnit for TestBeta {
    fn is_default_test(&self) -> bool {
        false
    }

    async fn run(&mut self, _ctx: &mut TestContext<'_>) -> UnitResult<()> {
        Ok(())
    }
}

#[derive(Default)]
struct TestGamma;

#[async_trait]
impl TestUnit for TestGamma {
    async fn run(&mut self, _ctx: &mut TestContext<'_>) -> UnitResult<()> {
        Ok(())
    }
}

#[derive(Default)]
struct TestBoomInPrepare;

#[async_trait]
impl TestUnit for TestBoomInPrepare {
    async fn on_prepare_test(&mut self, _ctx: &mut TestContext<'_>) -> UnitResult<()> {
        Err(UnitError::Setup("boom".to_string()))
    }

    async fn run(&mut self, _ctx: &mut TestContext<'_>) -> UnitResult<()> {
        Ok(())
    }
}

#[derive(Default)]
struct TestRunFailsAfterIdentifier;

#[async_trait]
impl TestUnit for TestRunFailsAfterIdentifier {
    async fn run(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        ctx.add_identifier("X");
        Err(UnitError::Assertion("case not in expected state".to_string()))
    }
}

fn small_catalogue() -> TestRegistry {
    TestRegistry::new(vec![
        TestDescriptor::of::<TestAlpha>("TestAlpha"),
        TestDescriptor::of::<TestBeta>("TestBeta"),
        TestDescriptor::of::<TestGamma>("TestGamma"),
        TestDescriptor::of::<TestBoomInPrepare>("TestBoomInPrepare"),
        TestDescriptor::of::<TestRunFailsAfterIdentifier>("TestRunFailsAfterIdentifier"),
    ])
}

fn offline_environment() -> TestEnvironment {
    TestEnvironment::connect(HarnessConfig::default()).unwrap()
}

#[test]
fn test_empty_selection_skips_non_default_units() {
    let registry = TestRegistry::new(vec![
        TestDescriptor::of::<TestAlpha>("TestAlpha"),
        TestDescriptor::of::<TestBeta>("TestBeta"),
        TestDescriptor::of::<TestGamma>("TestGamma"),
    ]);

    let runners = registry.create_runners::<&str>(&[]).unwrap();

    let selected: Vec<(usize, &str)> = runners.iter().map(|r| (r.sequence(), r.name())).collect();
    assert_eq!(selected, vec![(1, "TestAlpha"), (2, "TestGamma")]);
    assert!(runners.iter().all(|r| !r.is_explicitly_mentioned()));
}

#[test]
fn test_storage_group_yields_seven_explicit_runners() {
    let registry = catalogue().unwrap();

    let runners = registry.create_runners(&[STORAGE_GROUP]).unwrap();

    assert_eq!(runners.len(), 7);
    let expected: Vec<&str> = registry
        .group(STORAGE_GROUP)
        .unwrap()
        .iter()
        .map(|d| d.name())
        .collect();
    for (index, runner) in runners.iter().enumerate() {
        assert_eq!(runner.sequence(), index + 1);
        assert_eq!(runner.name(), expected[index]);
        assert!(runner.is_explicitly_mentioned());
        assert!(runner.started().is_none());
    }
}

#[test]
fn test_star_resolves_full_catalogue_per_occurrence() {
    let registry = small_catalogue();

    let resolved = registry
        .resolve_selection(&["*", "alpha", "*"])
        .unwrap();

    assert_eq!(resolved.len(), registry.len() * 2 + 1);
    assert_eq!(resolved[0].name(), "TestAlpha");
    assert_eq!(resolved[registry.len()].name(), "TestAlpha");
    assert_eq!(resolved.last().unwrap().name(), "TestRunFailsAfterIdentifier");
}

#[test]
fn test_name_resolution_ignores_case_and_prefix() {
    let registry = small_catalogue();
    for token in ["gamma", "GAMMA", "testgamma", "TestGamma"] {
        assert_eq!(registry.resolve_by_name(token).unwrap().name(), "TestGamma");
    }
}

#[test]
fn test_unknown_name_aborts_before_any_runner() {
    let registry = small_catalogue();

    let result = registry.create_runners(&["alpha", "unknownname"]);

    match result {
        Err(HarnessError::UnknownTest { name }) => assert_eq!(name, "unknownname"),
        other => panic!("expected UnknownTest, got {:?}", other.map(|r| r.len())),
    }
}

#[tokio::test]
async fn test_prepare_failure_is_recorded_not_raised() {
    let env = offline_environment();
    let mut runners = small_catalogue()
        .create_runners(&["boominprepare"])
        .unwrap();
    let runner = &mut runners[0];

    let outcome = runner.execute(&env).await;

    assert_eq!(outcome, RunOutcome::Failed(LifecyclePhase::Prepare));
    assert!(runner.error().unwrap().to_string().contains("boom"));
    assert!(!runner.is_completed());
    assert!(!runner.is_running());
    assert_eq!(runner.summary(), "");
}

#[tokio::test]
async fn test_run_failure_keeps_identifier_and_report_continues() {
    let env = offline_environment();
    let runners = small_catalogue()
        .create_runners(&["runfailsafteridentifier", "alpha"])
        .unwrap();

    let report = RunReport::execute(runners, &env).await;

    let failed = &report.runners()[0];
    assert_eq!(failed.outcome(), Some(RunOutcome::Failed(LifecyclePhase::Run)));
    assert!(failed.summary().contains('X'));
    assert!(failed.ended() >= failed.started());

    let passed = &report.runners()[1];
    assert!(passed.is_completed());
    assert_eq!(passed.summary(), "");

    let rendered = report.render();
    assert!(rendered.starts_with("01 TestRunFailsAfterIdentifier failed after "));
    assert!(rendered.contains("\n02 TestAlpha ("));
    assert!(rendered.ends_with("2 tests, 1 passed, 1 failed"));
}

/// In-memory engine that knows tenants and nothing else. Users of a disabled
/// tenant are answered with `disabled_status`.
struct TenantOnlyEngine {
    tenants: Mutex<HashMap<String, Vec<TenantUser>>>,
    disabled: Mutex<HashSet<String>>,
    disabled_status: u16,
}

impl TenantOnlyEngine {
    fn new(disabled_status: u16) -> Self {
        Self {
            tenants: Mutex::new(HashMap::new()),
            disabled: Mutex::new(HashSet::new()),
            disabled_status,
        }
    }
}

fn rejected(method: &str, path: String, status: u16) -> EngineError {
    EngineError::UnexpectedStatus {
        method: method.to_string(),
        path,
        status,
        body: String::new(),
    }
}

fn not_found<T>(path: &str) -> EngineResult<T> {
    Err(rejected("GET", path.to_string(), 404))
}

#[async_trait]
impl CaseEngine for TenantOnlyEngine {
    async fn login(&self, user_id: &str) -> EngineResult<User> {
        Ok(User::new(user_id).with_token(format!("token-{}", user_id)))
    }

    async fn health_check(&self) -> EngineResult<()> {
        Ok(())
    }

    async fn create_tenant(&self, _user: &User, tenant: &Tenant) -> EngineResult<()> {
        self.tenants
            .lock()
            .unwrap()
            .insert(tenant.name.clone(), tenant.users.clone());
        Ok(())
    }

    async fn disable_tenant(&self, _user: &User, tenant: &str) -> EngineResult<()> {
        self.disabled.lock().unwrap().insert(tenant.to_string());
        Ok(())
    }

    async fn enable_tenant(&self, _user: &User, tenant: &str) -> EngineResult<()> {
        self.disabled.lock().unwrap().remove(tenant);
        Ok(())
    }

    async fn get_tenant_users(&self, _user: &User, tenant: &str) -> EngineResult<Vec<TenantUser>> {
        if self.disabled.lock().unwrap().contains(tenant) {
            let path = format!("/tenant/{}/users", tenant);
            return Err(rejected("GET", path, self.disabled_status));
        }
        match self.tenants.lock().unwrap().get(tenant) {
            Some(users) => Ok(users.clone()),
            None => not_found(tenant),
        }
    }

    async fn start_case(&self, _user: &User, command: &StartCase) -> EngineResult<StartCaseResponse> {
        not_found(&command.tenant)
    }

    async fn get_case(&self, _user: &User, case_id: &str) -> EngineResult<CaseInstance> {
        not_found(case_id)
    }

    async fn get_plan_items(&self, _user: &User, case_id: &str) -> EngineResult<Vec<PlanItem>> {
        not_found(case_id)
    }

    async fn make_plan_item_transition(
        &self,
        _user: &User,
        case_id: &str,
        _plan_item_id: &str,
        _transition: Transition,
    ) -> EngineResult<()> {
        not_found(case_id)
    }

    async fn migrate_definition(
        &self,
        _user: &User,
        case_id: &str,
        _migration: &DefinitionMigration,
    ) -> EngineResult<()> {
        not_found(case_id)
    }

    async fn get_case_team(&self, _user: &User, case_id: &str) -> EngineResult<CaseTeam> {
        not_found(case_id)
    }

    async fn set_case_team_user(
        &self,
        _user: &User,
        case_id: &str,
        _member: &CaseTeamUser,
    ) -> EngineResult<()> {
        not_found(case_id)
    }

    async fn remove_case_team_user(
        &self,
        _user: &User,
        case_id: &str,
        _user_id: &str,
    ) -> EngineResult<()> {
        not_found(case_id)
    }

    async fn get_case_tasks(&self, _user: &User, case_id: &str) -> EngineResult<Vec<Task>> {
        not_found(case_id)
    }

    async fn claim_task(&self, _user: &User, task_id: &str) -> EngineResult<()> {
        not_found(task_id)
    }

    async fn complete_task(&self, _user: &User, task_id: &str, _output: Value) -> EngineResult<()> {
        not_found(task_id)
    }

    async fn create_consent_group(
        &self,
        _user: &User,
        tenant: &str,
        _group: &ConsentGroup,
    ) -> EngineResult<String> {
        not_found(tenant)
    }

    async fn get_consent_group(&self, _user: &User, group_id: &str) -> EngineResult<ConsentGroup> {
        not_found(group_id)
    }

    async fn archive_case(&self, _user: &User, case_id: &str) -> EngineResult<()> {
        not_found(case_id)
    }

    async fn restore_case(&self, _user: &User, case_id: &str) -> EngineResult<()> {
        not_found(case_id)
    }

    async fn delete_case(&self, _user: &User, case_id: &str) -> EngineResult<()> {
        not_found(case_id)
    }

    async fn delete_tenant(&self, user: &User, tenant: &str) -> EngineResult<()> {
        if user.user_id != "admin" {
            return Err(rejected("DELETE", format!("/storage/tenant/{}", tenant), 401));
        }
        match self.tenants.lock().unwrap().remove(tenant) {
            Some(_) => Ok(()),
            None => not_found(tenant),
        }
    }

    fn engine_name(&self) -> &'static str {
        "in-memory"
    }
}

fn in_memory_environment(engine: Arc<TenantOnlyEngine>) -> TestEnvironment {
    let mut config = HarnessConfig::default();
    config.poll = PollPolicy::new(3, Duration::from_millis(1));
    TestEnvironment::new(config, engine)
}

#[tokio::test]
async fn test_scenario_runs_against_injected_engine() {
    let engine = Arc::new(TenantOnlyEngine::new(401));
    let env = in_memory_environment(engine.clone());

    let runners = catalogue()
        .unwrap()
        .create_runners(&["deletetenant", "helloworld"])
        .unwrap();
    let report = RunReport::execute(runners, &env).await;

    let delete = &report.runners()[0];
    assert!(delete.is_completed(), "{:?}", delete.error());
    let deleted = delete.summary().trim_start_matches("tenant ").to_string();
    assert!(deleted.starts_with("e2e-"));
    assert!(!engine.tenants.lock().unwrap().contains_key(&deleted));

    // Starting a case is not supported by the in-memory engine.
    let hello = &report.runners()[1];
    assert_eq!(hello.outcome(), Some(RunOutcome::Failed(LifecyclePhase::Run)));
    assert_eq!(engine.tenants.lock().unwrap().len(), 1);
    assert_eq!(report.passed(), 1);
    assert_eq!(report.failed(), 1);
}

#[tokio::test]
async fn test_disabled_tenant_must_be_rejected_as_unauthorized() {
    let env = in_memory_environment(Arc::new(TenantOnlyEngine::new(401)));
    let mut runners = catalogue()
        .unwrap()
        .create_runners(&["tenantadministration"])
        .unwrap();

    let outcome = runners[0].execute(&env).await;
    assert_eq!(outcome, RunOutcome::Completed, "{:?}", runners[0].error());

    let env = in_memory_environment(Arc::new(TenantOnlyEngine::new(500)));
    let mut runners = catalogue()
        .unwrap()
        .create_runners(&["tenantadministration"])
        .unwrap();

    let outcome = runners[0].execute(&env).await;
    assert_eq!(outcome, RunOutcome::Failed(LifecyclePhase::Run));
    assert!(runners[0].error().unwrap().to_string().contains("500"));
}
