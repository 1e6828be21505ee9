use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An authenticated principal. The token is obtained through
/// [`CaseEngine::login`](crate::CaseEngine::login) and never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    #[serde(skip)]
    pub token: Option<String>,
}

impl User {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantUser {
    pub user_id: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub is_owner: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl TenantUser {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            roles: Vec::new(),
            is_owner: false,
            enabled: true,
        }
    }

    pub fn owner(user_id: impl Into<String>) -> Self {
        Self {
            is_owner: true,
            ..Self::new(user_id)
        }
    }

    pub fn with_roles(mut self, roles: &[&str]) -> Self {
        self.roles = roles.iter().map(|r| r.to_string()).collect();
        self
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub name: String,
    #[serde(default)]
    pub users: Vec<TenantUser>,
}

impl Tenant {
    pub fn new(name: impl Into<String>, users: Vec<TenantUser>) -> Self {
        Self {
            name: name.into(),
            users,
        }
    }

    pub fn owners(&self) -> impl Iterator<Item = &TenantUser> {
        self.users.iter().filter(|u| u.is_owner)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseTeamUser {
    pub user_id: String,
    #[serde(default)]
    pub case_roles: Vec<String>,
    #[serde(default)]
    pub is_owner: bool,
}

impl CaseTeamUser {
    pub fn new(user_id: impl Into<String>, case_roles: &[&str]) -> Self {
        Self {
            user_id: user_id.into(),
            case_roles: case_roles.iter().map(|r| r.to_string()).collect(),
            is_owner: false,
        }
    }

    pub fn owner(user_id: impl Into<String>, case_roles: &[&str]) -> Self {
        Self {
            is_owner: true,
            ..Self::new(user_id, case_roles)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRoleMapping {
    pub group_role: String,
    #[serde(default)]
    pub case_roles: Vec<String>,
    #[serde(default)]
    pub is_owner: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseTeamGroup {
    pub group_id: String,
    #[serde(default)]
    pub mappings: Vec<GroupRoleMapping>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseTeam {
    #[serde(default)]
    pub users: Vec<CaseTeamUser>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<CaseTeamGroup>,
}

impl CaseTeam {
    pub fn new(users: Vec<CaseTeamUser>) -> Self {
        Self {
            users,
            groups: Vec::new(),
        }
    }

    pub fn with_group(mut self, group: CaseTeamGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn find_user(&self, user_id: &str) -> Option<&CaseTeamUser> {
        self.users.iter().find(|u| u.user_id == user_id)
    }

    pub fn owners(&self) -> impl Iterator<Item = &CaseTeamUser> {
        self.users.iter().filter(|u| u.is_owner)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCase {
    pub tenant: String,
    pub definition: String,
    #[serde(default)]
    pub inputs: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_team: Option<CaseTeam>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_instance_id: Option<String>,
    #[serde(default)]
    pub debug: bool,
}

impl StartCase {
    pub fn new(tenant: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            tenant: tenant.into(),
            definition: definition.into(),
            inputs: Value::Object(Default::default()),
            case_team: None,
            case_instance_id: None,
            debug: false,
        }
    }

    pub fn with_inputs(mut self, inputs: Value) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_case_team(mut self, case_team: CaseTeam) -> Self {
        self.case_team = Some(case_team);
        self
    }

    pub fn with_case_instance_id(mut self, id: impl Into<String>) -> Self {
        self.case_instance_id = Some(id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCaseResponse {
    pub case_instance_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub current_state: String,
    #[serde(default)]
    pub transition: Option<String>,
}

impl PlanItem {
    pub fn is_in_state(&self, state: &str) -> bool {
        self.current_state.eq_ignore_ascii_case(state)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseInstance {
    pub id: String,
    pub tenant: String,
    #[serde(default)]
    pub case_name: String,
    pub state: String,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub parent_case_id: Option<String>,
    #[serde(default)]
    pub root_case_id: Option<String>,
    #[serde(default, rename = "planitems")]
    pub plan_items: Vec<PlanItem>,
    #[serde(default)]
    pub team: Option<CaseTeam>,
    #[serde(default)]
    pub file: Value,
}

impl CaseInstance {
    pub fn plan_item(&self, name: &str) -> Option<&PlanItem> {
        self.plan_items.iter().find(|p| p.name == name)
    }
}

/// Plan item transitions accepted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Complete,
    Terminate,
    Suspend,
    Reactivate,
    Resume,
    Occur,
    Start,
}

impl Transition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Complete => "complete",
            Transition::Terminate => "terminate",
            Transition::Suspend => "suspend",
            Transition::Reactivate => "reactivate",
            Transition::Resume => "resume",
            Transition::Occur => "occur",
            Transition::Start => "start",
        }
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskState {
    Unassigned,
    Assigned,
    Delegated,
    Completed,
    Terminated,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub task_name: String,
    pub task_state: TaskState,
    pub case_instance_id: String,
    #[serde(default)]
    pub tenant: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentGroupMember {
    pub user_id: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub is_owner: bool,
}

impl ConsentGroupMember {
    pub fn new(user_id: impl Into<String>, roles: &[&str]) -> Self {
        Self {
            user_id: user_id.into(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            is_owner: false,
        }
    }

    pub fn owner(user_id: impl Into<String>, roles: &[&str]) -> Self {
        Self {
            is_owner: true,
            ..Self::new(user_id, roles)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
    #[serde(default)]
    pub members: Vec<ConsentGroupMember>,
}

impl ConsentGroup {
    pub fn new(members: Vec<ConsentGroupMember>) -> Self {
        Self {
            id: None,
            tenant: None,
            members,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn find_member(&self, user_id: &str) -> Option<&ConsentGroupMember> {
        self.members.iter().find(|m| m.user_id == user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentGroupCreated {
    pub group_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionMigration {
    pub new_definition: String,
}

impl DefinitionMigration {
    pub fn new(new_definition: impl Into<String>) -> Self {
        Self {
            new_definition: new_definition.into(),
        }
    }
}
