use crate::context::TestEnvironment;
use crate::runner::TestRunner;
use std::fmt;
use tracing::info;

/// The runners of one invocation, in execution order.
#[derive(Debug, Default)]
pub struct RunReport {
    runners: Vec<TestRunner>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes every runner in order and collects them all, whatever their
    /// outcome.
    pub async fn execute(runners: Vec<TestRunner>, env: &TestEnvironment) -> Self {
        info!("Running {} tests", runners.len());

        let mut report = Self::new();
        for mut runner in runners {
            runner.execute(env).await;
            report.add_test(runner);
        }
        report
    }

    pub fn add_test(&mut self, runner: TestRunner) {
        self.runners.push(runner);
    }

    pub fn runners(&self) -> &[TestRunner] {
        &self.runners
    }

    pub fn len(&self) -> usize {
        self.runners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }

    pub fn passed(&self) -> usize {
        self.runners.iter().filter(|r| r.is_completed()).count()
    }

    pub fn failed(&self) -> usize {
        self.runners.iter().filter(|r| r.error().is_some()).count()
    }

    pub fn all_passed(&self) -> bool {
        self.passed() == self.len()
    }

    /// One line per runner, numbered by position, followed by the totals.
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = self
            .runners
            .iter()
            .enumerate()
            .map(|(index, runner)| format!("{:02} {}", index + 1, runner.describe()))
            .collect();

        lines.push(format!(
            "{} tests, {} passed, {} failed",
            self.len(),
            self.passed(),
            self.failed()
        ));
        lines.join("\n")
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
