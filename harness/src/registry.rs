//! Catalogue of known test units and selection by name.
//!
//! The registry is built once from an explicit, ordered table of
//! [`TestDescriptor`]s and is read-only afterwards. Selection tokens map to
//! descriptors as follows:
//!
//! - no tokens or `*`: the whole catalogue in registration order, filtered to
//!   default-eligible units when runners are created
//! - a group name such as `storage`: the group's members in group order, all
//!   treated as explicitly mentioned
//! - anything else: a single unit, matched case-insensitively with or
//!   without a `test` prefix

use crate::error::{HarnessError, HarnessResult};
use crate::runner::TestRunner;
use crate::unit::{TestUnit, UnitResult};
use tracing::debug;

pub const ALL_TESTS: &str = "*";

pub type UnitFactory = fn() -> UnitResult<Box<dyn TestUnit>>;

/// Name plus constructor of a test unit.
#[derive(Debug, Clone, Copy)]
pub struct TestDescriptor {
    name: &'static str,
    factory: UnitFactory,
}

fn construct<T: TestUnit + Default + 'static>() -> UnitResult<Box<dyn TestUnit>> {
    Ok(Box::new(T::default()))
}

impl TestDescriptor {
    pub const fn new(name: &'static str, factory: UnitFactory) -> Self {
        Self { name, factory }
    }

    /// Descriptor for a unit type that constructs through [`Default`].
    pub fn of<T: TestUnit + Default + 'static>(name: &'static str) -> Self {
        Self::new(name, construct::<T>)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn instantiate(&self) -> UnitResult<Box<dyn TestUnit>> {
        (self.factory)()
    }
}

struct RegisteredTest {
    descriptor: TestDescriptor,
    lookup_name: String,
}

impl RegisteredTest {
    fn matches(&self, token: &str) -> bool {
        token.eq_ignore_ascii_case(&self.lookup_name)
            || self
                .lookup_name
                .strip_prefix("test")
                .map_or(false, |rest| token.eq_ignore_ascii_case(rest))
    }
}

pub struct TestRegistry {
    tests: Vec<RegisteredTest>,
    groups: Vec<(String, Vec<TestDescriptor>)>,
}

impl TestRegistry {
    pub fn new(descriptors: Vec<TestDescriptor>) -> Self {
        let tests = descriptors
            .into_iter()
            .map(|descriptor| RegisteredTest {
                lookup_name: descriptor.name.to_lowercase(),
                descriptor,
            })
            .collect();

        Self {
            tests,
            groups: Vec::new(),
        }
    }

    /// Adds a named group. Every member must already be registered.
    pub fn with_group(mut self, group: &str, members: &[&str]) -> HarnessResult<Self> {
        let resolved = members
            .iter()
            .map(|member| {
                self.resolve_by_name(member)
                    .copied()
                    .map_err(|_| HarnessError::UnknownGroupMember {
                        group: group.to_string(),
                        name: member.to_string(),
                    })
            })
            .collect::<HarnessResult<Vec<_>>>()?;

        self.groups.push((group.to_lowercase(), resolved));
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// All descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &TestDescriptor> {
        self.tests.iter().map(|t| &t.descriptor)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &[TestDescriptor])> {
        self.groups
            .iter()
            .map(|(name, members)| (name.as_str(), members.as_slice()))
    }

    pub fn group(&self, name: &str) -> Option<&[TestDescriptor]> {
        self.groups
            .iter()
            .find(|(group, _)| group.eq_ignore_ascii_case(name))
            .map(|(_, members)| members.as_slice())
    }

    pub fn resolve_by_name(&self, name: &str) -> HarnessResult<&TestDescriptor> {
        self.tests
            .iter()
            .find(|t| t.matches(name))
            .map(|t| &t.descriptor)
            .ok_or_else(|| HarnessError::UnknownTest {
                name: name.to_string(),
            })
    }

    /// Expands selection tokens left to right. Duplicates are kept.
    pub fn resolve_selection<S: AsRef<str>>(
        &self,
        tokens: &[S],
    ) -> HarnessResult<Vec<&TestDescriptor>> {
        Ok(self
            .expand(tokens)?
            .into_iter()
            .map(|(descriptor, _)| descriptor)
            .collect())
    }

    /// Resolves `tokens` and wraps every unit that needs running in a
    /// [`TestRunner`], numbered from 1 in final order.
    ///
    /// Units are instantiated here, so a failing constructor aborts the whole
    /// batch.
    pub fn create_runners<S: AsRef<str>>(&self, tokens: &[S]) -> HarnessResult<Vec<TestRunner>> {
        let mut runners = Vec::new();
        for (descriptor, explicitly_mentioned) in self.expand(tokens)? {
            let runner = TestRunner::new(descriptor, explicitly_mentioned)?;
            if runner.needs_running() {
                runners.push(runner);
            } else {
                debug!("Skipping {} (not a default test)", descriptor.name());
            }
        }

        for (index, runner) in runners.iter_mut().enumerate() {
            runner.set_sequence(index + 1);
        }

        Ok(runners)
    }

    fn all(&self, explicitly_mentioned: bool) -> impl Iterator<Item = (&TestDescriptor, bool)> {
        self.descriptors().map(move |d| (d, explicitly_mentioned))
    }

    fn expand<S: AsRef<str>>(&self, tokens: &[S]) -> HarnessResult<Vec<(&TestDescriptor, bool)>> {
        if tokens.is_empty() {
            return Ok(self.all(false).collect());
        }

        let mut selected = Vec::new();
        for token in tokens {
            let token = token.as_ref();
            if token == ALL_TESTS {
                selected.extend(self.all(false));
            } else if let Some(members) = self.group(token) {
                selected.extend(members.iter().map(|d| (d, true)));
            } else {
                selected.push((self.resolve_by_name(token)?, true));
            }
        }
        Ok(selected)
    }
}
