//! 판정: 실행 결과를 스텝의 기대값에 비추어 PASS/FAIL로 분류
//!
//! | 기대값 | 종료 코드 0 | 0이 아닌 코드 또는 시그널 | 타임아웃 |
//! |---|---|---|---|
//! | `MustSucceed` | PASS | FAIL | FAIL |
//! | `MayFail` | PASS | PASS | FAIL |
//! | `MustFailOrAbort` | FAIL | ABORTED_AS_EXPECTED | FAIL |
//!
//! 타임아웃은 다른 모든 열보다 우선합니다. [`interpret`]는 순수 함수이며,
//! 허용된 실패의 로깅은 호출자가 담당합니다.

use std::fmt;

use serde::Serialize;

use crate::outcome::Outcome;
use crate::step::{ExpectedOutcome, Step};

/// 판정 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Pass,
    Fail,
    /// 의도된 장애 주입이 성공함
    AbortedAsExpected,
}

impl Verdict {
    /// FAIL이 아니면 통과로 봅니다.
    pub fn is_pass(self) -> bool {
        !matches!(self, Self::Fail)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
            Self::AbortedAsExpected => write!(f, "ABORTED_AS_EXPECTED"),
        }
    }
}

/// 스텝 결과를 판정합니다.
pub fn interpret(step: &Step, outcome: &Outcome) -> Verdict {
    judge(step.expected, outcome)
}

/// 기대값만으로 판정합니다. 복구 루프처럼 기대값을 강제하는 호출자가 사용합니다.
pub fn judge(expected: ExpectedOutcome, outcome: &Outcome) -> Verdict {
    if outcome.timed_out {
        return Verdict::Fail;
    }
    let clean = outcome.is_clean_exit();
    match expected {
        ExpectedOutcome::MustSucceed if clean => Verdict::Pass,
        ExpectedOutcome::MustSucceed => Verdict::Fail,
        ExpectedOutcome::MayFail => Verdict::Pass,
        ExpectedOutcome::MustFailOrAbort if clean => Verdict::Fail,
        ExpectedOutcome::MustFailOrAbort => Verdict::AbortedAsExpected,
    }
}

/// 판정 근거를 사람이 읽을 수 있는 문장으로 만듭니다.
pub fn explain(expected: ExpectedOutcome, outcome: &Outcome, verdict: Verdict) -> String {
    match (verdict, expected) {
        (Verdict::Fail, _) if outcome.timed_out => {
            format!("{outcome}: time budget exceeded")
        }
        (Verdict::Fail, ExpectedOutcome::MustFailOrAbort) => {
            format!("{outcome}: expected abnormal termination but process exited cleanly")
        }
        (Verdict::Fail, _) => format!("{outcome}: unexpected exit status"),
        (Verdict::Pass, ExpectedOutcome::MayFail) if !outcome.is_clean_exit() => {
            format!("{outcome}: failure tolerated")
        }
        (Verdict::AbortedAsExpected, _) => format!("{outcome}: aborted as expected"),
        (Verdict::Pass, _) => outcome.to_string(),
    }
}
