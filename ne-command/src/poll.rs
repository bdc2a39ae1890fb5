//! Conditional command polling.
//!
//! Each round runs the whole command batch through a [`CommandExecutor`],
//! then tests every outstanding condition against the fresh outputs.
//! Satisfied conditions leave the outstanding set (`all`), or the first
//! satisfied condition clears it (`any`). The poller stops when nothing is
//! outstanding or the retry budget is spent.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use indexmap::IndexMap;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::condition::{self, Condition};
use crate::driver::{CommandExecutor, ResponseSet};
use crate::error::{ConfigError, DriverError, Error, Result};

/// How multiple conditions combine into one verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Every condition must hold.
    #[default]
    All,
    /// One condition holding is enough.
    Any,
}

impl FromStr for MatchPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "all" => Ok(MatchPolicy::All),
            "any" => Ok(MatchPolicy::Any),
            other => Err(ConfigError::Invalid {
                message: format!("value of match must be one of: any, all, got: {other}"),
            }),
        }
    }
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchPolicy::All => f.write_str("all"),
            MatchPolicy::Any => f.write_str("any"),
        }
    }
}

/// Retry budget for a polling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget {
    /// Rounds allowed before giving up; zero still runs once.
    pub retries: u32,

    /// Delay after each unsatisfied round.
    pub interval: Duration,
}

impl PollBudget {
    /// Create a budget.
    pub fn new(retries: u32, interval: Duration) -> Self {
        Self { retries, interval }
    }
}

impl Default for PollBudget {
    fn default() -> Self {
        Self {
            retries: 10,
            interval: Duration::from_secs(1),
        }
    }
}

/// Successful polling result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    /// Outputs of the round that satisfied the match policy.
    pub responses: ResponseSet,

    /// Number of rounds executed.
    pub rounds: u32,
}

/// Parsed conditions plus the policy and budget that drive a polling run.
///
/// # Example
///
/// ```rust
/// use ne_command::{Command, MatchPolicy, PollBudget, WaitFor};
/// use ne_command::driver::{CommandExecutor, ResponseSet};
///
/// struct Canned;
///
/// impl CommandExecutor for Canned {
///     async fn execute(&mut self, _commands: &[Command]) -> ne_command::Result<ResponseSet> {
///         Ok(ResponseSet::new(vec!["HUAWEI VRP".to_string()]))
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), ne_command::Error> {
/// let wait_for = WaitFor::parse(
///     &["result[0] contains HUAWEI"],
///     MatchPolicy::All,
///     PollBudget::default(),
/// )?;
/// let outcome = wait_for.run(&[Command::new("display version")], &mut Canned).await?;
/// assert_eq!(outcome.rounds, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WaitFor {
    conditions: Vec<Condition>,
    policy: MatchPolicy,
    budget: PollBudget,
}

impl WaitFor {
    /// Build from already-parsed conditions.
    pub fn new(conditions: Vec<Condition>, policy: MatchPolicy, budget: PollBudget) -> Self {
        Self {
            conditions,
            policy,
            budget,
        }
    }

    /// Parse raw condition strings; the first malformed one aborts.
    pub fn parse<S: AsRef<str>>(raw: &[S], policy: MatchPolicy, budget: PollBudget) -> Result<Self> {
        let conditions = condition::parse_all(raw)?;
        Ok(Self::new(conditions, policy, budget))
    }

    /// The parsed conditions in declaration order.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// The match policy.
    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// The retry budget.
    pub fn budget(&self) -> PollBudget {
        self.budget
    }

    /// Run `commands` until the match policy holds or the budget is spent.
    ///
    /// Executor and evaluation errors abort immediately; only conditions
    /// that evaluate false are retried.
    pub async fn run<E>(&self, commands: &[Command], executor: &mut E) -> Result<PollOutcome>
    where
        E: CommandExecutor,
    {
        // keyed by declaration index so duplicate raw strings stay distinct
        let mut outstanding: IndexMap<usize, &Condition> =
            self.conditions.iter().enumerate().collect();
        let mut remaining = self.budget.retries;
        let mut rounds = 0u32;

        loop {
            rounds += 1;
            debug!(
                "round {}: executing {} command(s), {} condition(s) outstanding",
                rounds,
                commands.len(),
                outstanding.len()
            );

            let responses = executor.execute(commands).await?;
            if responses.len() != commands.len() {
                return Err(DriverError::ResponseCountMismatch {
                    expected: commands.len(),
                    actual: responses.len(),
                }
                .into());
            }

            self.apply(&mut outstanding, &responses)?;

            if outstanding.is_empty() {
                info!("conditions satisfied after {} round(s)", rounds);
                return Ok(PollOutcome { responses, rounds });
            }

            if remaining == 0 {
                break;
            }

            trace!("sleeping {:?} before next round", self.budget.interval);
            tokio::time::sleep(self.budget.interval).await;
            remaining -= 1;

            if remaining == 0 {
                break;
            }
        }

        let failed_conditions: Vec<String> =
            outstanding.values().map(|c| c.raw().to_string()).collect();
        info!(
            "giving up after {} round(s), unsatisfied: {:?}",
            rounds, failed_conditions
        );
        Err(Error::RetryExhausted { failed_conditions })
    }

    /// Evaluate the outstanding conditions against one round's outputs.
    fn apply(
        &self,
        outstanding: &mut IndexMap<usize, &Condition>,
        responses: &ResponseSet,
    ) -> Result<()> {
        let snapshot: Vec<(usize, &Condition)> =
            outstanding.iter().map(|(id, c)| (*id, *c)).collect();

        for (id, condition) in snapshot {
            if !condition::evaluate(condition, responses)? {
                trace!("not yet satisfied: {}", condition);
                continue;
            }

            debug!("satisfied: {}", condition);
            match self.policy {
                MatchPolicy::Any => {
                    outstanding.clear();
                    break;
                }
                MatchPolicy::All => {
                    outstanding.shift_remove(&id);
                }
            }
        }

        Ok(())
    }
}

/// Parse `conditions` and poll `commands` through `executor`.
pub async fn run<E, S>(
    commands: &[Command],
    conditions: &[S],
    policy: MatchPolicy,
    budget: PollBudget,
    executor: &mut E,
) -> Result<PollOutcome>
where
    E: CommandExecutor,
    S: AsRef<str>,
{
    WaitFor::parse(conditions, policy, budget)?
        .run(commands, executor)
        .await
}
