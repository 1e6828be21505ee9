//! Task claim and completion depend on case roles and assignment.

use super::support::{
    ensure, expect_status, prepared, wait_for_plan_item_state, wait_for_task, TenantFixture,
    EMPLOYEE, HELLOWORLD, RECEIVE_GREETING, REQUESTOR, UNAUTHORIZED,
};
use crate::context::TestContext;
use crate::unit::{TestUnit, UnitResult};
use async_trait::async_trait;
use engine::{poll_until, CaseTeam, CaseTeamUser, EngineError, TaskState};
use serde_json::json;

/// Case role required to pick up the greeting task.
const RECEIVER: &str = "Receiver";

#[derive(Default)]
pub struct TestTaskAuthorization {
    tenant: Option<TenantFixture>,
}

#[async_trait]
impl TestUnit for TestTaskAuthorization {
    async fn on_prepare_test(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        self.tenant = Some(TenantFixture::create(ctx).await?);
        Ok(())
    }

    async fn run(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        let tenant = prepared(&self.tenant, "tenant")?;
        let engine = ctx.engine();
        let (requestor, employee) = (&tenant.requestor, &tenant.employee);

        let team = CaseTeam::new(vec![
            CaseTeamUser::owner(REQUESTOR, &["Requestor"]),
            CaseTeamUser::new(EMPLOYEE, &[]),
        ]);
        let command = tenant.command(HELLOWORLD).with_case_team(team);
        let case_id = tenant.start_case(ctx, command).await?;

        let task = wait_for_task(ctx, employee, &case_id, RECEIVE_GREETING).await?;
        expect_status(
            engine.claim_task(employee, &task.id).await,
            UNAUTHORIZED,
            "claim without the Receiver role",
        )?;

        engine
            .set_case_team_user(
                requestor,
                &case_id,
                &CaseTeamUser::new(EMPLOYEE, &[RECEIVER]),
            )
            .await?;

        let (task_id, poll) = (task.id.as_str(), ctx.poll());
        poll_until("claim after role grant", poll, move || {
            engine.claim_task(employee, task_id)
        })
        .await?;

        let (case_ref, employee_id) = (case_id.as_str(), employee.user_id.as_str());
        let claimed = poll_until("task assigned to employee", poll, move || async move {
            let tasks = engine.get_case_tasks(employee, case_ref).await?;
            tasks
                .into_iter()
                .find(|t| t.id == task_id && t.assignee.as_deref() == Some(employee_id))
                .ok_or_else(|| EngineError::Pending {
                    message: "assignment not yet visible".to_string(),
                })
        })
        .await?;
        ensure(claimed.task_state == TaskState::Assigned, || {
            format!("claimed task is {:?}", claimed.task_state)
        })?;

        let output = json!({ "Response": { "Message": "Received", "Date": "2026-10-18" } });
        expect_status(
            engine.complete_task(requestor, task_id, output.clone()).await,
            UNAUTHORIZED,
            "complete a task assigned to someone else",
        )?;
        engine.complete_task(employee, task_id, output).await?;

        wait_for_plan_item_state(ctx, requestor, &case_id, RECEIVE_GREETING, "Completed").await?;
        Ok(())
    }
}
