//! Platform administration of a tenant: listing, disabling and enabling.

use super::support::{
    ensure, prepared, TenantFixture, EMPLOYEE, OWNER, REQUESTOR, UNAUTHORIZED,
};
use crate::context::TestContext;
use crate::unit::{TestUnit, UnitResult};
use async_trait::async_trait;
use engine::{poll_until, poll_until_status};

#[derive(Default)]
pub struct TestTenantAdministration {
    tenant: Option<TenantFixture>,
}

#[async_trait]
impl TestUnit for TestTenantAdministration {
    async fn on_prepare_test(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        self.tenant = Some(TenantFixture::create(ctx).await?);
        Ok(())
    }

    async fn run(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        let tenant = prepared(&self.tenant, "tenant")?;
        let engine = ctx.engine();
        let (owner, name, poll) = (&tenant.owner, tenant.name.as_str(), ctx.poll());

        let users = engine.get_tenant_users(owner, name).await?;
        for expected in [OWNER, REQUESTOR, EMPLOYEE] {
            ensure(users.iter().any(|u| u.user_id == expected), || {
                format!("{} missing from tenant {}", expected, name)
            })?;
        }
        ensure(users.iter().filter(|u| u.is_owner).count() == 1, || {
            format!("expected one owner in {:?}", users)
        })?;

        engine.disable_tenant(&tenant.admin, name).await?;
        poll_until_status("tenant disabled", poll, UNAUTHORIZED, move || {
            engine.get_tenant_users(owner, name)
        })
        .await?;

        engine.enable_tenant(&tenant.admin, name).await?;
        let restored = poll_until("tenant enabled", poll, move || {
            engine.get_tenant_users(owner, name)
        })
        .await?;
        ensure(restored.len() == users.len(), || {
            format!(
                "tenant {} lists {} users after enabling, expected {}",
                name,
                restored.len(),
                users.len()
            )
        })?;
        Ok(())
    }
}
