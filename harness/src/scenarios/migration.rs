//! Migrating a running case to a new version of its definition.

use super::support::{
    ensure, prepared, wait_for_plan_item_state, TenantFixture, HELLOWORLD, HELLOWORLD_V2,
    RECEIVE_GREETING,
};
use crate::context::TestContext;
use crate::unit::{TestUnit, UnitResult};
use async_trait::async_trait;
use engine::{poll_until, DefinitionMigration, EngineError};

#[derive(Default)]
pub struct TestDefinitionMigration {
    tenant: Option<TenantFixture>,
    case_id: Option<String>,
}

#[async_trait]
impl TestUnit for TestDefinitionMigration {
    async fn on_prepare_test(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        let tenant = TenantFixture::create(ctx).await?;
        let case_id = tenant.start_case(ctx, tenant.command(HELLOWORLD)).await?;
        self.tenant = Some(tenant);
        self.case_id = Some(case_id);
        Ok(())
    }

    async fn run(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        let tenant = prepared(&self.tenant, "tenant")?;
        let case_id = prepared(&self.case_id, "case")?.as_str();
        let engine = ctx.engine();
        let requestor = &tenant.requestor;

        wait_for_plan_item_state(ctx, requestor, case_id, RECEIVE_GREETING, "Active").await?;

        engine
            .migrate_definition(requestor, case_id, &DefinitionMigration::new(HELLOWORLD_V2))
            .await?;

        let migrated = poll_until("definition migrated", ctx.poll(), move || async move {
            let case = engine.get_case(requestor, case_id).await?;
            match case.definition.as_deref() {
                Some(definition) if definition.contains("helloworld_v2") => Ok(case),
                other => Err(EngineError::Pending {
                    message: format!("case still runs definition {:?}", other),
                }),
            }
        })
        .await?;

        ensure(migrated.state.eq_ignore_ascii_case("Active"), || {
            format!("migrated case is {}", migrated.state)
        })?;
        ensure(migrated.plan_item(RECEIVE_GREETING).is_some(), || {
            format!("'{}' lost during migration", RECEIVE_GREETING)
        })?;
        Ok(())
    }
}
