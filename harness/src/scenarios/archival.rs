//! Archiving cases and bringing them back.

use super::support::{
    archive_case, ensure, expect_status, prepared, wait_for_case, TenantFixture, HELLOWORLD,
    NOT_FOUND, UNAUTHORIZED,
};
use crate::context::TestContext;
use crate::unit::{TestUnit, UnitResult};
use async_trait::async_trait;

/// A fresh tenant with one running case, shared by the storage scenarios.
pub(crate) async fn tenant_with_case(
    ctx: &mut TestContext<'_>,
) -> UnitResult<(TenantFixture, String)> {
    let tenant = TenantFixture::create(ctx).await?;
    let case_id = tenant.start_case(ctx, tenant.command(HELLOWORLD)).await?;
    Ok((tenant, case_id))
}

#[derive(Default)]
pub struct TestArchiveCase {
    prepared: Option<(TenantFixture, String)>,
}

#[async_trait]
impl TestUnit for TestArchiveCase {
    async fn on_prepare_test(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        self.prepared = Some(tenant_with_case(ctx).await?);
        Ok(())
    }

    async fn run(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        let (tenant, case_id) = prepared(&self.prepared, "tenant with case")?;
        archive_case(ctx, tenant, case_id).await?;

        // The owner loses sight of it too.
        expect_status(
            ctx.engine().get_case(&tenant.owner, case_id).await,
            NOT_FOUND,
            "tenant owner reads an archived case",
        )
    }
}

#[derive(Default)]
pub struct TestRestoreCase {
    prepared: Option<(TenantFixture, String)>,
}

#[async_trait]
impl TestUnit for TestRestoreCase {
    async fn on_prepare_test(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        let (tenant, case_id) = tenant_with_case(ctx).await?;
        archive_case(ctx, &tenant, &case_id).await?;
        self.prepared = Some((tenant, case_id));
        Ok(())
    }

    async fn run(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        let (tenant, case_id) = prepared(&self.prepared, "archived case")?;
        ctx.engine().restore_case(&tenant.owner, case_id).await?;

        let case = wait_for_case(ctx, &tenant.requestor, case_id).await?;
        ensure(case.tenant == tenant.name, || {
            format!("restored case landed in tenant {}", case.tenant)
        })
    }
}

#[derive(Default)]
pub struct TestArchiveUnauthorized {
    prepared: Option<(TenantFixture, String)>,
}

#[async_trait]
impl TestUnit for TestArchiveUnauthorized {
    async fn on_prepare_test(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        self.prepared = Some(tenant_with_case(ctx).await?);
        Ok(())
    }

    async fn run(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        let (tenant, case_id) = prepared(&self.prepared, "tenant with case")?;
        let engine = ctx.engine();

        expect_status(
            engine.archive_case(&tenant.employee, case_id).await,
            UNAUTHORIZED,
            "case member archives without tenant ownership",
        )?;
        expect_status(
            engine.restore_case(&tenant.employee, case_id).await,
            UNAUTHORIZED,
            "case member restores without tenant ownership",
        )?;

        let case = engine.get_case(&tenant.requestor, case_id).await?;
        ensure(case.state.eq_ignore_ascii_case("Active"), || {
            format!("case is {} after rejected archive", case.state)
        })
    }
}
