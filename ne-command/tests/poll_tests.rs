//! Polling controller behavior against a scripted executor.
//!
//! Tests run with a paused clock so inter-round sleeps are virtual and the
//! elapsed time counts exactly how many sleeps happened.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

use ne_command::driver::{CommandExecutor, ResponseSet};
use ne_command::error::DriverError;
use ne_command::{Command, ErrorKind, MatchPolicy, PollBudget, WaitFor};

/// Replays canned rounds, repeating the last one once the script runs out.
struct ScriptedExecutor {
    script: VecDeque<ResponseSet>,
    last: ResponseSet,
    calls: usize,
    fail_on_call: Option<usize>,
}

impl ScriptedExecutor {
    fn new(rounds: &[&[&str]]) -> Self {
        let script: VecDeque<ResponseSet> = rounds
            .iter()
            .map(|round| round.iter().copied().collect())
            .collect();
        Self {
            script,
            last: ResponseSet::default(),
            calls: 0,
            fail_on_call: None,
        }
    }

    fn always(outputs: &[&str]) -> Self {
        Self::new(&[outputs])
    }

    fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }
}

impl CommandExecutor for ScriptedExecutor {
    async fn execute(&mut self, commands: &[Command]) -> ne_command::Result<ResponseSet> {
        self.calls += 1;
        if self.fail_on_call == Some(self.calls) {
            return Err(DriverError::CommandFailed {
                command: commands[0].command.clone(),
                message: "Error: Unrecognized command found at '^' position.".to_string(),
            }
            .into());
        }
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        Ok(self.last.clone())
    }
}

fn commands(items: &[&str]) -> Vec<Command> {
    items.iter().map(|c| Command::new(*c)).collect()
}

fn wait_for(conditions: &[&str], policy: MatchPolicy, retries: u32) -> WaitFor {
    WaitFor::parse(conditions, policy, PollBudget::new(retries, Duration::from_secs(1))).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_first_round_success() {
    let mut exec = ScriptedExecutor::always(&["HUAWEI VRP Software, Version 8.180"]);
    let start = Instant::now();

    let outcome = wait_for(&["result[0] contains HUAWEI"], MatchPolicy::All, 10)
        .run(&commands(&["display version"]), &mut exec)
        .await
        .unwrap();

    assert_eq!(outcome.rounds, 1);
    assert_eq!(
        outcome.responses.as_slice(),
        &["HUAWEI VRP Software, Version 8.180"]
    );
    assert_eq!(exec.calls, 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_budget_exhausted() {
    let mut exec = ScriptedExecutor::always(&["Cisco IOS Software, Version 15.2"]);
    let start = Instant::now();

    let err = wait_for(&["result[0] contains HUAWEI"], MatchPolicy::All, 10)
        .run(&commands(&["display version"]), &mut exec)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RetryExhausted);
    assert_eq!(
        err.failed_conditions(),
        Some(&["result[0] contains HUAWEI".to_string()][..])
    );
    assert_eq!(exec.calls, 10);
    assert_eq!(start.elapsed(), Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_any_short_circuits() {
    let mut exec = ScriptedExecutor::always(&["HUAWEI NE40E", "no board info"]);

    let outcome = wait_for(
        &["result[0] contains HUAWEI", "result[1] contains Board"],
        MatchPolicy::Any,
        10,
    )
    .run(&commands(&["display version", "display device"]), &mut exec)
    .await
    .unwrap();

    assert_eq!(outcome.rounds, 1);
    assert_eq!(exec.calls, 1);
}

#[tokio::test(start_paused = true)]
async fn test_any_succeeds_when_later_condition_holds() {
    let mut exec = ScriptedExecutor::always(&["Cisco", "Board Type : CR5D00E4XF90"]);

    let outcome = wait_for(
        &["result[0] contains HUAWEI", "result[1] contains Board"],
        MatchPolicy::Any,
        3,
    )
    .run(&commands(&["display version", "display device"]), &mut exec)
    .await
    .unwrap();

    assert_eq!(outcome.rounds, 1);
}

#[tokio::test(start_paused = true)]
async fn test_out_of_range_index_is_not_retried() {
    let mut exec = ScriptedExecutor::always(&["HUAWEI"]);
    let start = Instant::now();

    let err = wait_for(&["result[5] contains X"], MatchPolicy::All, 10)
        .run(&commands(&["display version"]), &mut exec)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidCondition);
    assert!(err.failed_conditions().is_none());
    assert_eq!(exec.calls, 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_zero_retries_runs_once_without_sleeping() {
    let mut exec = ScriptedExecutor::always(&["Cisco"]);
    let start = Instant::now();

    let err = wait_for(&["result[0] contains HUAWEI"], MatchPolicy::All, 0)
        .run(&commands(&["display version"]), &mut exec)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RetryExhausted);
    assert_eq!(exec.calls, 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_zero_retries_can_still_succeed() {
    let mut exec = ScriptedExecutor::always(&["HUAWEI"]);

    let outcome = wait_for(&["result[0] contains HUAWEI"], MatchPolicy::All, 0)
        .run(&commands(&["display version"]), &mut exec)
        .await
        .unwrap();

    assert_eq!(outcome.rounds, 1);
}

#[tokio::test(start_paused = true)]
async fn test_no_conditions_runs_once() {
    for retries in [0, 1, 10] {
        let mut exec = ScriptedExecutor::always(&["anything"]);
        let start = Instant::now();

        let outcome = wait_for(&[], MatchPolicy::All, retries)
            .run(&commands(&["display clock"]), &mut exec)
            .await
            .unwrap();

        assert_eq!(outcome.rounds, 1);
        assert_eq!(exec.calls, 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}

#[tokio::test(start_paused = true)]
async fn test_all_keeps_satisfied_conditions_out() {
    // round 1 satisfies the first condition, round 2 only the second
    let mut exec = ScriptedExecutor::new(&[
        &["HUAWEI", "0"],
        &["Cisco", "4"],
    ]);
    let start = Instant::now();

    let outcome = wait_for(
        &["result[0] contains HUAWEI", "result[1] ge 3"],
        MatchPolicy::All,
        5,
    )
    .run(&commands(&["display version", "display bgp peer | count"]), &mut exec)
    .await
    .unwrap();

    assert_eq!(outcome.rounds, 2);
    assert_eq!(outcome.responses.as_slice(), &["Cisco", "4"]);
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_only_unsatisfied_conditions_reported() {
    let mut exec = ScriptedExecutor::always(&["HUAWEI VRP", "Board Type : CR5D00E4XF90"]);

    let err = wait_for(
        &[
            "result[0] contains HUAWEI",
            "result[1] contains Slot",
            "result[0] not contains VRP",
            "result[1] contains Board",
        ],
        MatchPolicy::All,
        3,
    )
    .run(&commands(&["display version", "display device"]), &mut exec)
    .await
    .unwrap_err();

    assert_eq!(
        err.failed_conditions().unwrap(),
        &["result[1] contains Slot", "result[0] not contains VRP"]
    );
    assert_eq!(exec.calls, 3);
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_conditions_are_independent() {
    let mut exec = ScriptedExecutor::always(&["Cisco"]);

    let err = wait_for(
        &["result[0] contains HUAWEI", "result[0] contains HUAWEI"],
        MatchPolicy::All,
        2,
    )
    .run(&commands(&["display version"]), &mut exec)
    .await
    .unwrap_err();

    assert_eq!(err.failed_conditions().unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_executor_error_aborts() {
    let mut exec = ScriptedExecutor::always(&["Cisco"]).failing_on(2);
    let start = Instant::now();

    let err = wait_for(&["result[0] contains HUAWEI"], MatchPolicy::All, 10)
        .run(&commands(&["display version"]), &mut exec)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ExecutionFailure);
    assert_eq!(exec.calls, 2);
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_response_count_mismatch() {
    let mut exec = ScriptedExecutor::always(&["HUAWEI"]);

    let err = wait_for(&["result[0] contains HUAWEI"], MatchPolicy::All, 10)
        .run(&commands(&["display version", "display device"]), &mut exec)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ExecutionFailure);
    assert_eq!(exec.calls, 1);
}

#[tokio::test(start_paused = true)]
async fn test_same_inputs_same_verdict() {
    let poller = wait_for(
        &["result[0] contains HUAWEI", "result[0] matches 'V\\d{3}R\\d{3}'"],
        MatchPolicy::All,
        4,
    );
    let cmds = commands(&["display version"]);

    let first = poller
        .run(&cmds, &mut ScriptedExecutor::always(&["HUAWEI V800R021"]))
        .await
        .unwrap();
    let second = poller
        .run(&cmds, &mut ScriptedExecutor::always(&["HUAWEI V800R021"]))
        .await
        .unwrap();
    assert_eq!(first, second);

    let failed_once = poller
        .run(&cmds, &mut ScriptedExecutor::always(&["Cisco"]))
        .await
        .unwrap_err();
    let failed_twice = poller
        .run(&cmds, &mut ScriptedExecutor::always(&["Cisco"]))
        .await
        .unwrap_err();
    assert_eq!(failed_once.failed_conditions(), failed_twice.failed_conditions());
}

#[tokio::test(start_paused = true)]
async fn test_free_function_parses_first() {
    let mut exec = ScriptedExecutor::always(&["HUAWEI"]);

    let err = ne_command::run(
        &commands(&["display version"]),
        &["result[0] contains"],
        MatchPolicy::All,
        PollBudget::default(),
        &mut exec,
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidCondition);
    assert_eq!(exec.calls, 0);
}
