//! Consent groups grant case access through group role mappings.

use super::support::{
    ensure, expect_status, prepared, wait_for_case, TenantFixture, EMPLOYEE, HELLOWORLD,
    NOT_FOUND, OWNER, REQUESTOR,
};
use crate::context::TestContext;
use crate::unit::{TestUnit, UnitResult};
use async_trait::async_trait;
use engine::{
    poll_until, CaseTeam, CaseTeamGroup, CaseTeamUser, ConsentGroup, ConsentGroupMember,
    GroupRoleMapping,
};

const CLERK: &str = "Clerk";

#[derive(Default)]
pub struct TestConsentGroup {
    tenant: Option<TenantFixture>,
    group_id: Option<String>,
}

#[async_trait]
impl TestUnit for TestConsentGroup {
    async fn on_prepare_test(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        let tenant = TenantFixture::create(ctx).await?;

        let group = ConsentGroup::new(vec![
            ConsentGroupMember::owner(OWNER, &[CLERK]),
            ConsentGroupMember::new(EMPLOYEE, &[CLERK]),
        ]);
        let group_id = ctx
            .engine()
            .create_consent_group(&tenant.owner, &tenant.name, &group)
            .await?;
        ctx.add_identifier(format!("group {}", group_id));

        self.tenant = Some(tenant);
        self.group_id = Some(group_id);
        Ok(())
    }

    async fn run(&mut self, ctx: &mut TestContext<'_>) -> UnitResult<()> {
        let tenant = prepared(&self.tenant, "tenant")?;
        let group_id = prepared(&self.group_id, "consent group")?;
        let engine = ctx.engine();

        let owner = &tenant.owner;
        let group = poll_until("consent group visible", ctx.poll(), move || {
            engine.get_consent_group(owner, group_id)
        })
        .await?;
        ensure(group.members.len() == 2, || {
            format!("expected 2 members, group has {:?}", group.members)
        })?;
        ensure(
            group.find_member(OWNER).map_or(false, |m| m.is_owner),
            || format!("{} is not an owner of group {}", OWNER, group_id),
        )?;
        ensure(
            group.find_member(EMPLOYEE).map_or(false, |m| !m.is_owner),
            || format!("{} should be a plain member of group {}", EMPLOYEE, group_id),
        )?;

        let team = CaseTeam::new(vec![CaseTeamUser::owner(REQUESTOR, &["Requestor"])]).with_group(
            CaseTeamGroup {
                group_id: group_id.clone(),
                mappings: vec![GroupRoleMapping {
                    group_role: CLERK.to_string(),
                    case_roles: vec!["Employee".to_string()],
                    is_owner: false,
                }],
            },
        );
        let shared = tenant
            .start_case(ctx, tenant.command(HELLOWORLD).with_case_team(team))
            .await?;
        wait_for_case(ctx, &tenant.employee, &shared).await?;

        let solo = CaseTeam::new(vec![CaseTeamUser::owner(REQUESTOR, &["Requestor"])]);
        let private = tenant
            .start_case(ctx, tenant.command(HELLOWORLD).with_case_team(solo))
            .await?;
        expect_status(
            engine.get_case(&tenant.employee, &private).await,
            NOT_FOUND,
            "group member reads a case outside the group",
        )?;
        Ok(())
    }
}
