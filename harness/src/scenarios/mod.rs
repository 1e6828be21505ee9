//! The scenarios run against a live engine, and the catalogue that registers
//! them.

mod archival;
mod case_team;
mod consent_group;
mod deletion;
mod hello_world;
mod migration;
pub mod support;
mod task_authorization;
mod tenant_admin;

pub use archival::{TestArchiveCase, TestArchiveUnauthorized, TestRestoreCase};
pub use case_team::TestCaseTeam;
pub use consent_group::TestConsentGroup;
pub use deletion::{
    TestDeleteArchivedCase, TestDeleteCase, TestDeleteTenant, TestDeleteTenantWithCases,
};
pub use hello_world::TestHelloWorld;
pub use migration::TestDefinitionMigration;
pub use task_authorization::TestTaskAuthorization;
pub use tenant_admin::TestTenantAdministration;

use crate::error::HarnessResult;
use crate::registry::{TestDescriptor, TestRegistry};

pub const STORAGE_GROUP: &str = "storage";

/// Members of [`STORAGE_GROUP`], in the order they run.
pub const STORAGE_TESTS: [&str; 7] = [
    "TestArchiveCase",
    "TestRestoreCase",
    "TestArchiveUnauthorized",
    "TestDeleteCase",
    "TestDeleteArchivedCase",
    "TestDeleteTenant",
    "TestDeleteTenantWithCases",
];

/// Every known unit in registration order, plus the storage group.
pub fn catalogue() -> HarnessResult<TestRegistry> {
    TestRegistry::new(vec![
        TestDescriptor::of::<TestHelloWorld>("TestHelloWorld"),
        TestDescriptor::of::<TestCaseTeam>("TestCaseTeam"),
        TestDescriptor::of::<TestTaskAuthorization>("TestTaskAuthorization"),
        TestDescriptor::of::<TestConsentGroup>("TestConsentGroup"),
        TestDescriptor::of::<TestTenantAdministration>("TestTenantAdministration"),
        TestDescriptor::of::<TestDefinitionMigration>("TestDefinitionMigration"),
        TestDescriptor::of::<TestArchiveCase>("TestArchiveCase"),
        TestDescriptor::of::<TestRestoreCase>("TestRestoreCase"),
        TestDescriptor::of::<TestArchiveUnauthorized>("TestArchiveUnauthorized"),
        TestDescriptor::of::<TestDeleteCase>("TestDeleteCase"),
        TestDescriptor::of::<TestDeleteArchivedCase>("TestDeleteArchivedCase"),
        TestDescriptor::of::<TestDeleteTenant>("TestDeleteTenant"),
        TestDescriptor::of::<TestDeleteTenantWithCases>("TestDeleteTenantWithCases"),
    ])
    .with_group(STORAGE_GROUP, &STORAGE_TESTS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_registers_every_unit() {
        let registry = catalogue().unwrap();
        assert_eq!(registry.len(), 13);

        let storage: Vec<&str> = registry
            .group(STORAGE_GROUP)
            .unwrap()
            .iter()
            .map(|d| d.name())
            .collect();
        assert_eq!(storage, STORAGE_TESTS);
    }

    #[test]
    fn test_deletion_units_are_opt_in() {
        let registry = catalogue().unwrap();
        let defaults: Vec<&str> = registry
            .create_runners::<&str>(&[])
            .unwrap()
            .iter()
            .map(|r| r.name())
            .collect();

        assert_eq!(defaults.len(), 9);
        assert!(defaults.contains(&"TestArchiveCase"));
        assert!(!defaults.iter().any(|name| name.starts_with("TestDelete")));
    }
}
