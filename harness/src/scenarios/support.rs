//! Fixtures and assertions shared by the scenarios.

use crate::context::TestContext;
use crate::unit::{UnitError, UnitResult};
use engine::{
    poll_until, poll_until_status, CaseInstance, CaseTeam, CaseTeamUser, EngineError,
    EngineResult, PlanItem, StartCase, Task, Tenant, TenantUser, User,
};
use std::fmt::Debug;

pub const UNAUTHORIZED: u16 = 401;
pub const NOT_FOUND: u16 = 404;

pub const HELLOWORLD: &str = "helloworld.xml";
pub const HELLOWORLD_V2: &str = "helloworld_v2.xml";
pub const RECEIVE_GREETING: &str = "Receive Greeting";

pub const OWNER: &str = "tenant-owner";
pub const REQUESTOR: &str = "requestor";
pub const EMPLOYEE: &str = "employee";

pub fn ensure(condition: bool, message: impl FnOnce() -> String) -> UnitResult<()> {
    if condition {
        Ok(())
    } else {
        Err(UnitError::Assertion(message()))
    }
}

/// Passes when `result` is a rejection with exactly `status`.
pub fn expect_status<T: Debug>(result: EngineResult<T>, status: u16, what: &str) -> UnitResult<()> {
    match result {
        Err(err) if err.status() == Some(status) => Ok(()),
        Err(err) => Err(UnitError::Assertion(format!(
            "{}: expected status {}, got {}",
            what, status, err
        ))),
        Ok(value) => Err(UnitError::Assertion(format!(
            "{}: expected status {} but request succeeded with {:?}",
            what, status, value
        ))),
    }
}

/// State built in `on_prepare_test` and needed again in `run`.
pub fn prepared<'a, T>(slot: &'a Option<T>, what: &str) -> UnitResult<&'a T> {
    slot.as_ref()
        .ok_or_else(|| UnitError::Missing(format!("{} was not prepared", what)))
}

/// A freshly created tenant with an owner and two members, all logged in.
pub struct TenantFixture {
    pub name: String,
    pub admin: User,
    pub owner: User,
    pub requestor: User,
    pub employee: User,
}

impl TenantFixture {
    pub async fn create(ctx: &mut TestContext<'_>) -> UnitResult<Self> {
        let engine = ctx.engine();
        let admin = ctx.login_platform_admin().await?;
        let name = ctx.unique_tenant_name();

        let tenant = Tenant::new(
            name.as_str(),
            vec![
                TenantUser::owner(OWNER).with_roles(&["Manager"]),
                TenantUser::new(REQUESTOR).with_roles(&["Requestor"]),
                TenantUser::new(EMPLOYEE).with_roles(&["Employee"]),
            ],
        );
        engine.create_tenant(&admin, &tenant).await?;
        ctx.add_identifier(format!("tenant {}", name));

        let owner = ctx.login(OWNER).await?;
        let expected = tenant.users.len();
        let (owner_ref, tenant_name) = (&owner, name.as_str());
        poll_until("tenant users visible", ctx.poll(), move || async move {
            let users = engine.get_tenant_users(owner_ref, tenant_name).await?;
            if users.len() == expected {
                Ok(())
            } else {
                Err(EngineError::Pending {
                    message: format!("{} of {} users visible", users.len(), expected),
                })
            }
        })
        .await?;

        Ok(Self {
            name,
            admin,
            owner,
            requestor: ctx.login(REQUESTOR).await?,
            employee: ctx.login(EMPLOYEE).await?,
        })
    }

    /// Start command for `definition` in this tenant with [`default_team`](Self::default_team).
    pub fn command(&self, definition: &str) -> StartCase {
        StartCase::new(self.name.as_str(), definition).with_case_team(self.default_team())
    }

    /// Requestor-owned team with the employee as plain member.
    pub fn default_team(&self) -> CaseTeam {
        CaseTeam::new(vec![
            CaseTeamUser::owner(REQUESTOR, &["Requestor"]),
            CaseTeamUser::new(EMPLOYEE, &["Employee"]),
        ])
    }

    /// Starts the case as the requestor and waits until it can be read back.
    pub async fn start_case(
        &self,
        ctx: &mut TestContext<'_>,
        command: StartCase,
    ) -> UnitResult<String> {
        let response = ctx.engine().start_case(&self.requestor, &command).await?;
        let case_id = response.case_instance_id;
        ctx.add_identifier(format!("case {}", case_id));

        wait_for_case(ctx, &self.requestor, &case_id).await?;
        Ok(case_id)
    }
}

pub async fn wait_for_case(
    ctx: &TestContext<'_>,
    user: &User,
    case_id: &str,
) -> UnitResult<CaseInstance> {
    let engine = ctx.engine();
    let what = format!("case {} visible to {}", case_id, user.user_id);
    Ok(poll_until(&what, ctx.poll(), move || engine.get_case(user, case_id)).await?)
}

pub async fn wait_for_case_gone(ctx: &TestContext<'_>, user: &User, case_id: &str) -> UnitResult<()> {
    let engine = ctx.engine();
    let what = format!("case {} gone for {}", case_id, user.user_id);
    poll_until_status(&what, ctx.poll(), NOT_FOUND, move || {
        engine.get_case(user, case_id)
    })
    .await?;
    Ok(())
}

/// Archives the case as the tenant owner and waits until it is no longer served.
pub async fn archive_case(
    ctx: &TestContext<'_>,
    tenant: &TenantFixture,
    case_id: &str,
) -> UnitResult<()> {
    ctx.engine().archive_case(&tenant.owner, case_id).await?;
    wait_for_case_gone(ctx, &tenant.requestor, case_id).await
}

pub async fn wait_for_task(
    ctx: &TestContext<'_>,
    user: &User,
    case_id: &str,
    task_name: &str,
) -> UnitResult<Task> {
    let engine = ctx.engine();
    let what = format!("task '{}' in case {}", task_name, case_id);
    Ok(poll_until(&what, ctx.poll(), move || async move {
        let tasks = engine.get_case_tasks(user, case_id).await?;
        tasks
            .into_iter()
            .find(|t| t.task_name == task_name)
            .ok_or_else(|| EngineError::Pending {
                message: format!("task '{}' not yet created", task_name),
            })
    })
    .await?)
}

pub async fn wait_for_plan_item_state(
    ctx: &TestContext<'_>,
    user: &User,
    case_id: &str,
    item_name: &str,
    state: &str,
) -> UnitResult<PlanItem> {
    let engine = ctx.engine();
    let what = format!("plan item '{}' in state {}", item_name, state);
    Ok(poll_until(&what, ctx.poll(), move || async move {
        let items = engine.get_plan_items(user, case_id).await?;
        match items.into_iter().find(|p| p.name == item_name) {
            Some(item) if item.is_in_state(state) => Ok(item),
            Some(item) => Err(EngineError::Pending {
                message: format!("'{}' is {}", item_name, item.current_state),
            }),
            None => Err(EngineError::Pending {
                message: format!("'{}' not yet planned", item_name),
            }),
        }
    })
    .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejection(status: u16) -> EngineError {
        EngineError::UnexpectedStatus {
            method: "PUT".to_string(),
            path: "/storage/case/c-1/archive".to_string(),
            status,
            body: String::new(),
        }
    }

    #[test]
    fn test_expect_status() {
        assert!(expect_status::<()>(Err(rejection(401)), 401, "archive").is_ok());

        let err = expect_status::<()>(Err(rejection(404)), 401, "archive").unwrap_err();
        assert!(err.to_string().contains("expected status 401"));

        let err = expect_status(Ok(7), 401, "archive").unwrap_err();
        assert!(err.to_string().contains("request succeeded with 7"));
    }

    #[test]
    fn test_ensure_and_prepared() {
        assert!(ensure(true, || unreachable!()).is_ok());
        let err = ensure(false, || "case not active".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "Assertion failed: case not active");

        let empty: Option<u32> = None;
        assert!(matches!(prepared(&empty, "fixture"), Err(UnitError::Missing(_))));
        assert_eq!(prepared(&Some(3), "fixture").unwrap(), &3);
    }
}
