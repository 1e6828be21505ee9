//! Removing cases and tenants from storage. These scenarios destroy data and
//! only run when selected by name or through the storage group.

use super::archival::tenant_with_case;
use super::support::{
    archive_case, expect_status, prepared, wait_for_case_gone, TenantFixture, HELLOWORLD,
    NOT_FOUND, UNAUTHORIZED,
};
use crate::context::TestContext;
use crate::unit::{TestUnit, UnitResult};
use async_trait::async_trait;
use engine::poll_until_status;

/// Waits until the tenant's user list is no longer served.
async fn wait_for_tenant_gone(ctx: &TestContext<'_>, tenant: &TenantFixture) -> UnitResult<()> {
    let engine = ctx.engine();
    let (admin, name) = (&tenant.admin, tenant.name.as_str());
    let what = format!("tenant {} removed", name);
    poll_until_status(&what, ctx.poll(), NOT_FOUND, move || {
        engine.get_tenant_users(admin, name)
    })
    .await?;
    Ok(())
}

#[derive(Default)]
pub struct TestDeleteCase {
    prepared: Option<(TenantFixture, String)>,
}

#[async_trait]
impl TestUnit for TestDeleteCase {
    fn is_default_test(&self) -> bool {
        false
    }

    async fn on_prepare_test(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        self.prepared = Some(tenant_with_case(ctx).await?);
        Ok(())
    }

    async fn run(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        let (tenant, case_id) = prepared(&self.prepared, "tenant with case")?;
        let engine = ctx.engine();

        expect_status(
            engine.delete_case(&tenant.employee, case_id).await,
            UNAUTHORIZED,
            "case member deletes the case",
        )?;

        engine.delete_case(&tenant.owner, case_id).await?;
        wait_for_case_gone(ctx, &tenant.requestor, case_id).await?;

        expect_status(
            engine.restore_case(&tenant.owner, case_id).await,
            NOT_FOUND,
            "restore a deleted case",
        )
    }
}

#[derive(Default)]
pub struct TestDeleteArchivedCase {
    prepared: Option<(TenantFixture, String)>,
}

#[async_trait]
impl TestUnit for TestDeleteArchivedCase {
    fn is_default_test(&self) -> bool {
        false
    }

    async fn on_prepare_test(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        let (tenant, case_id) = tenant_with_case(ctx).await?;
        archive_case(ctx, &tenant, &case_id).await?;
        self.prepared = Some((tenant, case_id));
        Ok(())
    }

    async fn run(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        let (tenant, case_id) = prepared(&self.prepared, "archived case")?;
        let engine = ctx.engine();

        engine.delete_case(&tenant.owner, case_id).await?;
        expect_status(
            engine.restore_case(&tenant.owner, case_id).await,
            NOT_FOUND,
            "restore an archived case after deletion",
        )
    }
}

#[derive(Default)]
pub struct TestDeleteTenant {
    tenant: Option<TenantFixture>,
}

#[async_trait]
impl TestUnit for TestDeleteTenant {
    fn is_default_test(&self) -> bool {
        false
    }

    async fn on_prepare_test(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        self.tenant = Some(TenantFixture::create(ctx).await?);
        Ok(())
    }

    async fn run(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        let tenant = prepared(&self.tenant, "tenant")?;
        let engine = ctx.engine();

        expect_status(
            engine.delete_tenant(&tenant.requestor, &tenant.name).await,
            UNAUTHORIZED,
            "tenant member deletes the tenant",
        )?;

        engine.delete_tenant(&tenant.admin, &tenant.name).await?;
        wait_for_tenant_gone(ctx, tenant).await
    }
}

#[derive(Default)]
pub struct TestDeleteTenantWithCases {
    tenant: Option<TenantFixture>,
    cases: Vec<String>,
}

#[async_trait]
impl TestUnit for TestDeleteTenantWithCases {
    fn is_default_test(&self) -> bool {
        false
    }

    async fn on_prepare_test(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        let tenant = TenantFixture::create(ctx).await?;
        for _ in 0..2 {
            let case_id = tenant.start_case(ctx, tenant.command(HELLOWORLD)).await?;
            self.cases.push(case_id);
        }
        let archived = tenant.start_case(ctx, tenant.command(HELLOWORLD)).await?;
        archive_case(ctx, &tenant, &archived).await?;
        self.cases.push(archived);

        self.tenant = Some(tenant);
        Ok(())
    }

    async fn run(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        let tenant = prepared(&self.tenant, "tenant")?;

        ctx.engine()
            .delete_tenant(&tenant.admin, &tenant.name)
            .await?;
        wait_for_tenant_gone(ctx, tenant).await?;

        for case_id in &self.cases {
            wait_for_case_gone(ctx, &tenant.requestor, case_id).await?;
            expect_status(
                ctx.engine().restore_case(&tenant.owner, case_id).await,
                NOT_FOUND,
                "restore a case of a deleted tenant",
            )?;
        }
        Ok(())
    }
}
