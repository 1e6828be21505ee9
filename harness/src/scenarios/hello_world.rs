//! Smallest complete case: start, suspend and resume the greeting task, then
//! claim and complete it.

use super::support::{
    ensure, prepared, wait_for_plan_item_state, wait_for_task, TenantFixture, HELLOWORLD,
    RECEIVE_GREETING,
};
use crate::context::TestContext;
use crate::unit::{TestUnit, UnitResult};
use async_trait::async_trait;
use engine::{TaskState, Transition};
use serde_json::json;

#[derive(Default)]
pub struct TestHelloWorld {
    tenant: Option<TenantFixture>,
}

#[async_trait]
impl TestUnit for TestHelloWorld {
    async fn on_prepare_test(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        self.tenant = Some(TenantFixture::create(ctx).await?);
        Ok(())
    }

    async fn run(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        let tenant = prepared(&self.tenant, "tenant")?;
        let engine = ctx.engine();
        let requestor = &tenant.requestor;

        let command = tenant.command(HELLOWORLD).with_inputs(json!({
            "Greeting": { "Message": "Hello there", "From": requestor.user_id }
        }));
        let case_id = tenant.start_case(ctx, command).await?;

        let case = engine.get_case(requestor, &case_id).await?;
        ensure(case.state == "Active", || {
            format!("expected case {} to be Active, found {}", case_id, case.state)
        })?;
        ensure(case.tenant == tenant.name, || {
            format!("case was started in tenant {}", case.tenant)
        })?;

        let task = wait_for_task(ctx, requestor, &case_id, RECEIVE_GREETING).await?;
        ensure(task.task_state == TaskState::Unassigned, || {
            format!("fresh task is {:?}", task.task_state)
        })?;

        let item =
            wait_for_plan_item_state(ctx, requestor, &case_id, RECEIVE_GREETING, "Active").await?;
        engine
            .make_plan_item_transition(requestor, &case_id, &item.id, Transition::Suspend)
            .await?;
        wait_for_plan_item_state(ctx, requestor, &case_id, RECEIVE_GREETING, "Suspended").await?;
        engine
            .make_plan_item_transition(requestor, &case_id, &item.id, Transition::Resume)
            .await?;
        wait_for_plan_item_state(ctx, requestor, &case_id, RECEIVE_GREETING, "Active").await?;

        engine.claim_task(requestor, &task.id).await?;
        engine
            .complete_task(
                requestor,
                &task.id,
                json!({ "Response": { "Message": "Hi yourself", "Date": "2026-10-18" } }),
            )
            .await?;

        wait_for_plan_item_state(ctx, requestor, &case_id, RECEIVE_GREETING, "Completed").await?;
        Ok(())
    }
}
