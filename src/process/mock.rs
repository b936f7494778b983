use super::{Invocation, Outcome, ProcessRunner};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// Scripted response for invocations whose command line starts with a prefix
struct Rule {
    prefix: Vec<String>,
    response: Response,
}

#[derive(Clone, Copy)]
enum Response {
    Outcome(Outcome),
    SpawnError,
}

/// Records every invocation and answers from scripted rules
///
/// Unmatched invocations exit with status 0.
pub struct MockProcessRunner {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<Invocation>>,
}

impl MockProcessRunner {
    pub fn new() -> Self {
        Self {
            rules: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer invocations whose program + args start with `prefix`
    pub fn respond(&self, prefix: &[&str], outcome: Outcome) {
        self.push_rule(prefix, Response::Outcome(outcome));
    }

    /// Fail to spawn invocations whose program + args start with `prefix`
    pub fn fail_spawn(&self, prefix: &[&str]) {
        self.push_rule(prefix, Response::SpawnError);
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded command lines, rendered as strings
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(|c| c.to_string()).collect()
    }

    fn push_rule(&self, prefix: &[&str], response: Response) {
        self.rules.lock().unwrap().push(Rule {
            prefix: prefix.iter().map(|s| s.to_string()).collect(),
            response,
        });
    }
}

impl Default for MockProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessRunner for MockProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<Outcome> {
        self.calls.lock().unwrap().push(invocation.clone());

        let line: Vec<&str> = std::iter::once(invocation.program.as_str())
            .chain(invocation.args.iter().map(String::as_str))
            .collect();

        let rules = self.rules.lock().unwrap();
        let matched = rules.iter().find(|rule| {
            rule.prefix.len() <= line.len()
                && rule.prefix.iter().zip(&line).all(|(a, b)| a == b)
        });

        match matched.map(|r| r.response) {
            Some(Response::Outcome(outcome)) => Ok(outcome),
            Some(Response::SpawnError) => Err(anyhow!("No such file or directory")),
            None => Ok(Outcome::Exited(0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_and_matches_prefix() {
        let runner = MockProcessRunner::new();
        runner.respond(&["python3", "-m", "pip", "show"], Outcome::Exited(1));

        let show = Invocation::new("python3").args(["-m", "pip", "show", "fastapi"]);
        let other = Invocation::new("python3").arg("backend/main.py");

        assert_eq!(runner.run(&show).await.unwrap(), Outcome::Exited(1));
        assert_eq!(runner.run(&other).await.unwrap(), Outcome::Exited(0));
        assert_eq!(
            runner.command_lines(),
            vec!["python3 -m pip show fastapi", "python3 backend/main.py"]
        );
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let runner = MockProcessRunner::new();
        runner.fail_spawn(&["python3"]);
        assert!(runner.run(&Invocation::new("python3")).await.is_err());
    }
}
