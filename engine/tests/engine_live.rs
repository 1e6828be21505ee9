//! Checks against a running engine. Run with `cargo test -- --ignored` once
//! the engine and its token issuer listen on the default ports.

use engine::{
    poll_until, poll_until_status, CaseEngine, EngineConfig, HttpEngine, PollPolicy, Tenant,
    TenantUser,
};
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(60);

fn make_engine() -> HttpEngine {
    HttpEngine::new(EngineConfig::default().with_timeout(TIMEOUT)).expect("engine creation")
}

fn policy() -> PollPolicy {
    PollPolicy::new(20, Duration::from_millis(500))
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let engine = make_engine();

    tokio::time::timeout(TIMEOUT, engine.health_check())
        .await
        .expect("health_check timed out")
        .expect("health_check failed");
}

#[tokio::test]
#[ignore]
async fn test_login_issues_token() {
    let engine = make_engine();

    let admin = engine.login("admin").await.expect("login failed");

    assert_eq!(admin.user_id, "admin");
    assert!(admin.is_authenticated(), "token must be present");
}

#[tokio::test]
#[ignore]
async fn test_tenant_round_trip() {
    let engine = make_engine();
    let admin = engine.login("admin").await.expect("admin login failed");
    let owner = engine.login("live-owner").await.expect("owner login failed");

    let name = format!("live-{}", std::process::id());
    let tenant = Tenant::new(name.as_str(), vec![TenantUser::owner("live-owner")]);
    engine
        .create_tenant(&admin, &tenant)
        .await
        .expect("create_tenant failed");

    let (engine_ref, owner_ref, tenant_name) = (&engine, &owner, name.as_str());
    let users = poll_until("tenant users", policy(), move || {
        engine_ref.get_tenant_users(owner_ref, tenant_name)
    })
    .await
    .expect("tenant never became visible");
    assert_eq!(users.len(), 1);
    assert!(users[0].is_owner);

    engine
        .delete_tenant(&admin, &name)
        .await
        .expect("delete_tenant failed");
    poll_until_status("tenant removed", policy(), 404, move || {
        engine_ref.get_tenant_users(owner_ref, tenant_name)
    })
    .await
    .expect("tenant still served after deletion");
}
