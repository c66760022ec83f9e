//! 실행 결과: 자식 프로세스의 종료 상태
//!
//! [`Outcome`]은 프로세스가 실제로 실행된 경우에만 만들어집니다.
//! 실행 자체가 실패한 경우는 [`LaunchError`](crate::error::LaunchError)로 구분됩니다.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// 스텝 1회 실행 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// 종료 코드 (시그널로 종료되었거나 타임아웃이면 `None`)
    pub exit_code: Option<i32>,
    /// 종료 시그널 번호 (unix 전용)
    pub signal: Option<i32>,
    /// 시그널로 종료되었는지 여부
    pub signaled: bool,
    /// 시간 예산 초과로 강제 종료되었는지 여부
    pub timed_out: bool,
    /// 실행 시간
    #[serde(rename = "wall_clock_secs", serialize_with = "serialize_secs")]
    pub wall_clock: Duration,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

impl Outcome {
    /// 정상 종료 (코드 포함)
    pub fn exited(code: i32, wall_clock: Duration) -> Self {
        Self {
            exit_code: Some(code),
            signal: None,
            signaled: false,
            timed_out: false,
            wall_clock,
        }
    }

    /// 시그널에 의한 종료
    pub fn signaled(signal: Option<i32>, wall_clock: Duration) -> Self {
        Self {
            exit_code: None,
            signal,
            signaled: true,
            timed_out: false,
            wall_clock,
        }
    }

    /// 시간 예산 초과
    pub fn timed_out(wall_clock: Duration) -> Self {
        Self {
            exit_code: None,
            signal: None,
            signaled: false,
            timed_out: true,
            wall_clock,
        }
    }

    /// 종료 코드 0, 시그널 없음, 타임아웃 없음
    pub fn is_clean_exit(&self) -> bool {
        self.exit_code == Some(0) && !self.signaled && !self.timed_out
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.wall_clock.as_secs_f64();
        if self.timed_out {
            return write!(f, "timed out after {secs:.1}s");
        }
        if self.signaled {
            return match self.signal {
                Some(sig) => write!(f, "killed by signal {sig} after {secs:.1}s"),
                None => write!(f, "killed by signal after {secs:.1}s"),
            };
        }
        match self.exit_code {
            Some(code) => write!(f, "exited with code {code} after {secs:.1}s"),
            None => write!(f, "terminated without exit code after {secs:.1}s"),
        }
    }
}
