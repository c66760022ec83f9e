//! 통합 테스트 -- 내장 카탈로그 기반 스위트 실행 플로우 검증
//!
//! 레지스트리 조회 → 시나리오 순차 실행 → 판정 → SuiteResult 생성 과정을
//! 실제 프로세스 대신 기록용 executor로 검증합니다.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use volsuite_core::error::RegistryError;
use volsuite_core::outcome::Outcome;
use volsuite_core::verdict::Verdict;
use volsuite_runner::catalogue;
use volsuite_runner::{
    CatalogueSettings, HaltReason, NIGHTLY_SUITE, ScenarioRegistry, SuiteSequencer,
};

// Recording executor for integration tests
mod mock {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use tokio::time::Instant;
    use volsuite_core::error::LaunchError;
    use volsuite_core::outcome::Outcome;
    use volsuite_core::step::Step;
    use volsuite_runner::StepExecutor;

    /// Replays `script` in order; a clean exit once it runs dry.
    pub struct RecordingExecutor {
        script: Mutex<VecDeque<Result<Outcome, ()>>>,
        calls: Mutex<Vec<(Step, Instant)>>,
    }

    impl RecordingExecutor {
        pub fn new(script: impl IntoIterator<Item = Result<Outcome, ()>>) -> Self {
            Self {
                script: Mutex::new(script.into_iter().collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn steps(&self) -> Vec<Step> {
            self.calls.lock().unwrap().iter().map(|(s, _)| s.clone()).collect()
        }

        pub fn started_at(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
        }
    }

    impl StepExecutor for RecordingExecutor {
        async fn execute(&self, step: &Step) -> Result<Outcome, LaunchError> {
            self.calls.lock().unwrap().push((step.clone(), Instant::now()));
            match self.script.lock().unwrap().pop_front() {
                Some(Ok(outcome)) => Ok(outcome),
                Some(Err(())) => Err(LaunchError::PermissionDenied {
                    path: "./test_volume".into(),
                }),
                None => Ok(Outcome::exited(0, Duration::from_secs(1))),
            }
        }
    }
}

use mock::RecordingExecutor;

fn registry() -> ScenarioRegistry {
    catalogue::builtin(&CatalogueSettings {
        default_cooldown: Duration::ZERO,
        time_budget_grace: None,
    })
    .unwrap()
}

fn ok() -> Result<Outcome, ()> {
    Ok(Outcome::exited(0, Duration::from_secs(1)))
}

fn exit(code: i32) -> Result<Outcome, ()> {
    Ok(Outcome::exited(code, Duration::from_secs(1)))
}

fn abort() -> Result<Outcome, ()> {
    Ok(Outcome::signaled(Some(6), Duration::from_secs(1)))
}

#[tokio::test]
async fn one_disk_replace_passes_on_clean_exit() {
    let selection = registry().resolve("one_disk_replace").unwrap();
    let sequencer = SuiteSequencer::new(RecordingExecutor::new([ok()]));
    let result = sequencer.run_selection(&selection).await;

    assert!(result.success());
    let steps = sequencer.executor().steps();
    assert_eq!(steps.len(), 1);
    assert_eq!(
        steps[0].args.render(),
        vec![
            "--gtest_filter=IOTest.one_disk_replace_test",
            "--run_time=300",
            "--remove_file=0",
            "--verify_hdr=0",
            "--verify_data=0",
        ]
    );
}

#[tokio::test]
async fn one_disk_replace_fails_on_exit_code_3() {
    let selection = registry().resolve("one_disk_replace").unwrap();
    let sequencer = SuiteSequencer::new(RecordingExecutor::new([exit(3)]));
    let result = sequencer.run_selection(&selection).await;

    assert!(!result.success());
    assert_eq!(result.entries()[0].verdict, Verdict::Fail);
}

#[tokio::test]
async fn one_disk_replace_abort_tolerates_crash_then_replays() {
    let selection = registry().resolve("one-disk-replace-abort").unwrap();
    let sequencer = SuiteSequencer::new(RecordingExecutor::new([abort(), ok()]));
    let result = sequencer.run_selection(&selection).await;

    assert!(result.success());
    let steps = sequencer.executor().steps();
    assert_eq!(steps.len(), 2);
    assert_eq!(
        steps[1].args.get("expected_vol_state").and_then(|v| v.as_int()),
        Some(2)
    );
}

#[tokio::test]
async fn one_disk_replace_abort_fails_when_replay_fails() {
    let selection = registry().resolve("one_disk_replace_abort").unwrap();
    let sequencer = SuiteSequencer::new(RecordingExecutor::new([ok(), exit(1)]));
    let result = sequencer.run_selection(&selection).await;

    assert!(!result.success());
    assert_eq!(sequencer.executor().steps().len(), 2);
}

#[tokio::test]
async fn recovery_nightly_runs_nine_aborts_then_final_verify() {
    // 10 verify runs interleaved with 9 abort runs, then the final verify
    let mut script = Vec::new();
    for i in 0..10 {
        script.push(ok());
        if i < 9 {
            script.push(abort());
        }
    }
    script.push(ok());

    let selection = registry().resolve("recovery_nightly").unwrap();
    let sequencer = SuiteSequencer::new(RecordingExecutor::new(script));
    let result = sequencer.run_selection(&selection).await;

    assert!(result.success());
    let labels: Vec<String> = sequencer
        .executor()
        .steps()
        .into_iter()
        .map(|s| s.label)
        .collect();
    assert_eq!(labels.len(), 20);
    assert_eq!(labels.iter().filter(|l| *l == "recovery_abort").count(), 9);
    assert_eq!(labels.last().map(String::as_str), Some("recovery_final_verify"));
}

#[tokio::test]
async fn nightly_suite_runs_scenarios_in_catalogue_order() {
    let registry = registry();
    let selection = registry.resolve(NIGHTLY_SUITE).unwrap();
    let names: Vec<&str> = selection.scenarios.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "load",
            "normal",
            "recovery_nightly",
            "one_disk_replace",
            "one_disk_replace_abort",
            "both_disk_replace",
            "one_disk_fail",
            "vol_offline_test",
            "vol_io_fail_test",
            "vol_create_del_test",
        ]
    );
}

#[tokio::test]
async fn nightly_halts_at_first_failing_scenario() {
    let registry = registry();
    let selection = registry.resolve(NIGHTLY_SUITE).unwrap();
    // load passes, normal fails
    let sequencer = SuiteSequencer::new(RecordingExecutor::new([ok(), exit(1)]));
    let result = sequencer.run_selection(&selection).await;

    assert!(!result.success());
    assert_eq!(result.entries().len(), 2);
    assert_eq!(sequencer.executor().steps().len(), 2);
    assert_eq!(
        result.halt(),
        Some(&HaltReason::ScenarioFailed {
            scenario: "normal".to_owned()
        })
    );
    assert!(result.summary().contains("(1/10 scenarios passed)"));
}

#[tokio::test]
async fn launch_failure_halts_without_retry() {
    let selection = registry().resolve("vol_offline_test").unwrap();
    let sequencer = SuiteSequencer::new(RecordingExecutor::new([Err(())]));
    let result = sequencer.run_selection(&selection).await;

    assert!(!result.success());
    assert_eq!(sequencer.executor().steps().len(), 1);
    assert!(matches!(result.halt(), Some(HaltReason::LaunchFailure { .. })));
}

#[tokio::test(start_paused = true)]
async fn cooldown_is_observed_between_nightly_scenarios() {
    let cooldown = Duration::from_secs(5);
    let registry = catalogue::builtin(&CatalogueSettings {
        default_cooldown: cooldown,
        time_budget_grace: None,
    })
    .unwrap();
    let mut selection = registry.resolve(NIGHTLY_SUITE).unwrap();
    // keep only single-step scenarios so every start is a scenario boundary
    selection
        .scenarios
        .retain(|s| matches!(s.name.as_str(), "load" | "normal" | "one_disk_fail"));

    let sequencer = SuiteSequencer::new(RecordingExecutor::new([]));
    let result = sequencer.run_selection(&selection).await;
    assert!(result.success());

    let starts = sequencer.executor().started_at();
    assert_eq!(starts.len(), 3);
    for pair in starts.windows(2) {
        assert!(pair[1].duration_since(pair[0]) >= cooldown);
    }
}

#[tokio::test]
async fn cancellation_before_start_runs_nothing() {
    let selection = registry().resolve(NIGHTLY_SUITE).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let sequencer = SuiteSequencer::new(RecordingExecutor::new([])).with_cancellation(cancel);
    let result = sequencer.run_selection(&selection).await;

    assert_eq!(result.halt(), Some(&HaltReason::Cancelled));
    assert!(sequencer.executor().steps().is_empty());
}

#[test]
fn mapping_is_not_a_registered_name() {
    let err = registry().resolve("mapping").unwrap_err();
    match err {
        RegistryError::UnknownScenario { name, known } => {
            assert_eq!(name, "mapping");
            assert!(known.contains(&"nightly".to_owned()));
            assert!(known.contains(&"vol_create_del_test".to_owned()));
        }
        other => panic!("unexpected error: {other}"),
    }
}
