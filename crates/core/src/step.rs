//! 스텝: 테스트 바이너리 1회 호출의 선언적 기술
//!
//! [`Step`]은 어떤 바이너리를 어떤 플래그로 실행하고, 그 결과를 어떤 기준으로
//! 판정할지를 담습니다. 플래그의 의미는 검증하지 않고 그대로 전달합니다.
//!
//! # 사용 예시
//! ```
//! use volsuite_core::step::{ExpectedOutcome, Step};
//!
//! let step = Step::volume_test("IOTest.one_disk_replace_test")
//!     .flag("gtest_filter", "IOTest.one_disk_replace_test")
//!     .flag("run_time", 300)
//!     .flag("remove_file", 0);
//!
//! assert_eq!(step.expected, ExpectedOutcome::MustSucceed);
//! assert_eq!(
//!     step.args.render(),
//!     vec!["--gtest_filter=IOTest.one_disk_replace_test", "--run_time=300", "--remove_file=0"]
//! );
//! ```

use std::fmt;
use std::time::Duration;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// 테스트 대상 바이너리의 논리적 역할
///
/// 실제 경로는 실행 시점에 바이너리 디렉토리 설정으로 해석됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Executable {
    /// 볼륨 테스트 바이너리 (`test_volume`)
    VolumeTest,
    /// 매핑/인덱스 부하 바이너리 (`test_load`)
    LoadTest,
}

impl fmt::Display for Executable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VolumeTest => write!(f, "volume-test-binary"),
            Self::LoadTest => write!(f, "load-test-binary"),
        }
    }
}

/// 플래그 값 (정수, 불리언, 문자열)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl FlagValue {
    /// 정수 값이면 반환합니다.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for FlagValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for FlagValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for FlagValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for FlagValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<&str> for FlagValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for FlagValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// 순서를 보존하는 플래그 집합
///
/// 같은 이름을 다시 설정하면 기존 위치에서 값만 바뀝니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArgumentSet {
    entries: Vec<(String, FlagValue)>,
}

impl ArgumentSet {
    /// 빈 플래그 집합을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 플래그를 설정합니다.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FlagValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name, value)),
        }
    }

    /// 플래그 값을 조회합니다.
    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlagValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// `--name=value` 형식의 명령줄 인자로 변환합니다.
    pub fn render(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(name, value)| format!("--{name}={value}"))
            .collect()
    }
}

impl<'de> Deserialize<'de> for ArgumentSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ArgumentSetVisitor;

        impl<'de> Visitor<'de> for ArgumentSetVisitor {
            type Value = ArgumentSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of flag names to integer, boolean or string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut args = ArgumentSet::new();
                while let Some((name, value)) = map.next_entry::<String, FlagValue>()? {
                    args.set(name, value);
                }
                Ok(args)
            }
        }

        deserializer.deserialize_map(ArgumentSetVisitor)
    }
}

/// 스텝 결과에 대한 기대
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedOutcome {
    /// 종료 코드 0이어야 함
    MustSucceed,
    /// 실패해도 무방 (타임아웃은 제외)
    MayFail,
    /// 비정상 종료(0이 아닌 코드 또는 시그널)여야 함
    MustFailOrAbort,
}

impl fmt::Display for ExpectedOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MustSucceed => write!(f, "must-succeed"),
            Self::MayFail => write!(f, "may-fail"),
            Self::MustFailOrAbort => write!(f, "must-fail-or-abort"),
        }
    }
}

/// 테스트 바이너리 1회 호출
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// 로그/리포트용 이름 (보통 gtest 필터)
    pub label: String,
    /// 실행할 바이너리
    pub executable: Executable,
    /// 전달할 플래그
    pub args: ArgumentSet,
    /// 판정 기준
    pub expected: ExpectedOutcome,
    /// 최대 실행 시간 (초과 시 강제 종료)
    pub time_budget: Option<Duration>,
}

impl Step {
    /// `MustSucceed` 기대값과 빈 플래그로 스텝을 생성합니다.
    pub fn new(label: impl Into<String>, executable: Executable) -> Self {
        Self {
            label: label.into(),
            executable,
            args: ArgumentSet::new(),
            expected: ExpectedOutcome::MustSucceed,
            time_budget: None,
        }
    }

    /// 볼륨 테스트 바이너리 스텝
    pub fn volume_test(label: impl Into<String>) -> Self {
        Self::new(label, Executable::VolumeTest)
    }

    /// 부하 테스트 바이너리 스텝
    pub fn load_test(label: impl Into<String>) -> Self {
        Self::new(label, Executable::LoadTest)
    }

    /// 플래그를 추가합니다.
    pub fn flag(mut self, name: impl Into<String>, value: impl Into<FlagValue>) -> Self {
        self.args.set(name, value);
        self
    }

    /// 판정 기준을 지정합니다.
    pub fn expect(mut self, expected: ExpectedOutcome) -> Self {
        self.expected = expected;
        self
    }

    /// 실패를 허용합니다.
    pub fn may_fail(self) -> Self {
        self.expect(ExpectedOutcome::MayFail)
    }

    /// 비정상 종료를 기대합니다.
    pub fn must_abort(self) -> Self {
        self.expect(ExpectedOutcome::MustFailOrAbort)
    }

    /// 최대 실행 시간을 지정합니다.
    pub fn time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.label, self.executable)
    }
}
