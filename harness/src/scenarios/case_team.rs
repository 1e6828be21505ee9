//! Case team membership controls who can see a case.

use super::support::{
    ensure, expect_status, prepared, wait_for_case, wait_for_case_gone, TenantFixture, EMPLOYEE,
    HELLOWORLD, NOT_FOUND, REQUESTOR, UNAUTHORIZED,
};
use crate::context::TestContext;
use crate::unit::{TestUnit, UnitResult};
use async_trait::async_trait;
use engine::{CaseTeam, CaseTeamUser};

#[derive(Default)]
pub struct TestCaseTeam {
    tenant: Option<TenantFixture>,
}

#[async_trait]
impl TestUnit for TestCaseTeam {
    async fn on_prepare_test(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        self.tenant = Some(TenantFixture::create(ctx).await?);
        Ok(())
    }

    async fn run(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        let tenant = prepared(&self.tenant, "tenant")?;
        let engine = ctx.engine();
        let (requestor, employee) = (&tenant.requestor, &tenant.employee);

        let solo_team = CaseTeam::new(vec![CaseTeamUser::owner(REQUESTOR, &["Requestor"])]);
        let command = tenant.command(HELLOWORLD).with_case_team(solo_team);
        let case_id = tenant.start_case(ctx, command).await?;

        expect_status(
            engine.get_case(employee, &case_id).await,
            NOT_FOUND,
            "employee reads case before joining the team",
        )?;

        engine
            .set_case_team_user(requestor, &case_id, &CaseTeamUser::new(EMPLOYEE, &["Employee"]))
            .await?;
        wait_for_case(ctx, employee, &case_id).await?;

        let team = engine.get_case_team(requestor, &case_id).await?;
        ensure(team.find_user(EMPLOYEE).is_some(), || {
            format!("{} missing from case team {:?}", EMPLOYEE, team.users)
        })?;
        ensure(team.owners().count() == 1, || {
            format!("expected exactly one owner, team is {:?}", team.users)
        })?;

        expect_status(
            engine
                .remove_case_team_user(employee, &case_id, REQUESTOR)
                .await,
            UNAUTHORIZED,
            "non-owner removes the case owner",
        )?;

        engine
            .remove_case_team_user(requestor, &case_id, EMPLOYEE)
            .await?;
        wait_for_case_gone(ctx, employee, &case_id).await?;
        Ok(())
    }
}
