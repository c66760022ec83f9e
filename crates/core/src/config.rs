//! 설정 관리: volsuite.toml 파싱 및 런타임 설정
//!
//! [`VolsuiteConfig`]는 하네스 전체 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`VOLSUITE_SUITE_COOLDOWN_SECS=10` 형식)
//! 3. 설정 파일 (`volsuite.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), volsuite_core::error::VolsuiteError> {
//! use volsuite_core::config::VolsuiteConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = VolsuiteConfig::load("volsuite.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = VolsuiteConfig::parse("[suite]\ncooldown_secs = 10")?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, VolsuiteError};
use crate::step::Executable;

/// volsuite 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolsuiteConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 테스트 바이너리 위치
    #[serde(default)]
    pub binaries: BinariesConfig,
    /// 스위트 실행 설정
    #[serde(default)]
    pub suite: SuiteConfig,
    /// 결과 알림 설정
    #[serde(default)]
    pub notify: NotifyConfig,
}

impl VolsuiteConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, VolsuiteError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 기본값에 환경변수 오버라이드만 적용합니다 (설정 파일이 없을 때).
    pub fn from_env() -> Result<Self, VolsuiteError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, VolsuiteError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VolsuiteError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                VolsuiteError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, VolsuiteError> {
        toml::from_str(toml_str).map_err(|e| {
            VolsuiteError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `VOLSUITE_{SECTION}_{FIELD}`
    /// 예: `VOLSUITE_BINARIES_DIR=/opt/homestore/bin`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "VOLSUITE_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "VOLSUITE_GENERAL_LOG_FORMAT");

        // Binaries
        override_path(&mut self.binaries.dir, "VOLSUITE_BINARIES_DIR");
        override_string(&mut self.binaries.volume_test, "VOLSUITE_BINARIES_VOLUME_TEST");
        override_string(&mut self.binaries.load_test, "VOLSUITE_BINARIES_LOAD_TEST");

        // Suite
        override_u64(&mut self.suite.cooldown_secs, "VOLSUITE_SUITE_COOLDOWN_SECS");
        override_u64(
            &mut self.suite.time_budget_grace_secs,
            "VOLSUITE_SUITE_TIME_BUDGET_GRACE_SECS",
        );
        override_string(&mut self.suite.catalogue, "VOLSUITE_SUITE_CATALOGUE");

        // Notify
        override_bool(&mut self.notify.enabled, "VOLSUITE_NOTIFY_ENABLED");
        override_words(&mut self.notify.command, "VOLSUITE_NOTIFY_COMMAND");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), VolsuiteError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // 바이너리 이름 검증: 디렉토리 구분자가 들어가면 dir 설정과 충돌
        for (field, name) in [
            ("binaries.volume_test", &self.binaries.volume_test),
            ("binaries.load_test", &self.binaries.load_test),
        ] {
            if name.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_owned(),
                    reason: "binary name must not be empty".to_owned(),
                }
                .into());
            }
            if name.contains('/') {
                return Err(ConfigError::InvalidValue {
                    field: field.to_owned(),
                    reason: "binary name must be a file name, use binaries.dir for the directory"
                        .to_owned(),
                }
                .into());
            }
        }

        // notify 검증
        if self.notify.enabled && self.notify.command.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "notify.command".to_owned(),
                reason: "command must not be empty when notify is enabled".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 테스트 바이너리 위치 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BinariesConfig {
    /// 바이너리가 있는 디렉토리
    pub dir: PathBuf,
    /// 볼륨 테스트 바이너리 파일명
    pub volume_test: String,
    /// 부하 테스트 바이너리 파일명
    pub load_test: String,
}

impl BinariesConfig {
    /// 논리적 바이너리를 실제 경로로 해석합니다.
    pub fn resolve(&self, executable: Executable) -> PathBuf {
        let name = match executable {
            Executable::VolumeTest => &self.volume_test,
            Executable::LoadTest => &self.load_test,
        };
        self.dir.join(name)
    }
}

impl Default for BinariesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./"),
            volume_test: "test_volume".to_owned(),
            load_test: "test_load".to_owned(),
        }
    }
}

/// 스위트 실행 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// 시나리오 사이 대기 시간 (초)
    pub cooldown_secs: u64,
    /// `run_time` 플래그에 더해 시간 예산을 만드는 여유 시간 (초, 0이면 비활성)
    pub time_budget_grace_secs: u64,
    /// 시나리오 카탈로그 파일 (비어 있으면 내장 카탈로그)
    pub catalogue: String,
}

impl SuiteConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    /// 시간 예산 여유분 (비활성이면 `None`)
    pub fn time_budget_grace(&self) -> Option<Duration> {
        (self.time_budget_grace_secs > 0).then(|| Duration::from_secs(self.time_budget_grace_secs))
    }
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 5,
            time_budget_grace_secs: 3600,
            catalogue: String::new(),
        }
    }
}

/// 결과 알림 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 실행할 명령 (프로그램 + 앞쪽 인자, 요약문은 마지막 인자로 추가됨)
    pub command: Vec<String>,
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_path(target: &mut PathBuf, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = PathBuf::from(val);
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_words(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val.split_whitespace().map(str::to_owned).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_has_sane_values() {
        let config = VolsuiteConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "pretty");
        assert_eq!(config.binaries.dir, PathBuf::from("./"));
        assert_eq!(config.binaries.volume_test, "test_volume");
        assert_eq!(config.binaries.load_test, "test_load");
        assert_eq!(config.suite.cooldown(), Duration::from_secs(5));
        assert!(!config.notify.enabled);
    }

    #[test]
    fn default_config_passes_validation() {
        VolsuiteConfig::default().validate().unwrap();
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = VolsuiteConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.suite.time_budget_grace_secs, 3600);
    }

    #[test]
    fn from_str_partial_toml_merges_with_defaults() {
        let toml = r#"
[binaries]
dir = "/opt/homestore/bin"

[suite]
cooldown_secs = 30
"#;
        let config = VolsuiteConfig::parse(toml).unwrap();
        assert_eq!(config.binaries.dir, PathBuf::from("/opt/homestore/bin"));
        assert_eq!(config.binaries.volume_test, "test_volume");
        assert_eq!(config.suite.cooldown_secs, 30);
        assert_eq!(config.general.log_format, "pretty");
    }

    #[test]
    fn from_str_invalid_toml_is_parse_error() {
        let err = VolsuiteConfig::parse("[suite\ncooldown_secs = 1").unwrap_err();
        assert!(matches!(
            err,
            VolsuiteError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn resolve_joins_dir_and_binary_name() {
        let binaries = BinariesConfig {
            dir: PathBuf::from("/build/bin"),
            ..BinariesConfig::default()
        };
        assert_eq!(
            binaries.resolve(Executable::VolumeTest),
            PathBuf::from("/build/bin/test_volume")
        );
        assert_eq!(
            binaries.resolve(Executable::LoadTest),
            PathBuf::from("/build/bin/test_load")
        );
    }

    #[test]
    fn grace_zero_disables_budgets() {
        let suite = SuiteConfig {
            time_budget_grace_secs: 0,
            ..SuiteConfig::default()
        };
        assert_eq!(suite.time_budget_grace(), None);
        assert_eq!(
            SuiteConfig::default().time_budget_grace(),
            Some(Duration::from_secs(3600))
        );
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = VolsuiteConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("general.log_level"));
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = VolsuiteConfig::default();
        config.general.log_format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("general.log_format"));
    }

    #[test]
    fn validate_rejects_binary_name_with_directory() {
        let mut config = VolsuiteConfig::default();
        config.binaries.volume_test = "bin/test_volume".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("binaries.volume_test"));
    }

    #[test]
    fn validate_rejects_empty_notify_command_when_enabled() {
        let mut config = VolsuiteConfig::default();
        config.notify.enabled = true;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("notify.command"));
    }

    #[test]
    #[serial]
    fn env_override_u64() {
        let mut val = 5;
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_VOLSUITE_U64", "42") };
        override_u64(&mut val, "TEST_VOLSUITE_U64");
        assert_eq!(val, 42);
        unsafe { std::env::remove_var("TEST_VOLSUITE_U64") };
    }

    #[test]
    #[serial]
    fn env_override_u64_invalid_keeps_original() {
        let mut val = 5;
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_VOLSUITE_U64_BAD", "five") };
        override_u64(&mut val, "TEST_VOLSUITE_U64_BAD");
        assert_eq!(val, 5);
        unsafe { std::env::remove_var("TEST_VOLSUITE_U64_BAD") };
    }

    #[test]
    #[serial]
    fn env_override_bool_invalid_keeps_original() {
        let mut val = false;
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_VOLSUITE_BOOL_BAD", "yes please") };
        override_bool(&mut val, "TEST_VOLSUITE_BOOL_BAD");
        assert!(!val);
        unsafe { std::env::remove_var("TEST_VOLSUITE_BOOL_BAD") };
    }

    #[test]
    #[serial]
    fn env_override_words_splits_on_whitespace() {
        let mut val = Vec::new();
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_VOLSUITE_WORDS", "./slackpost  https://hooks.example/x  regression-bot") };
        override_words(&mut val, "TEST_VOLSUITE_WORDS");
        assert_eq!(val, vec!["./slackpost", "https://hooks.example/x", "regression-bot"]);
        unsafe { std::env::remove_var("TEST_VOLSUITE_WORDS") };
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = "original".to_owned();
        override_string(&mut val, "TEST_VOLSUITE_NONEXISTENT_12345");
        assert_eq!(val, "original");
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = VolsuiteConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = VolsuiteConfig::parse(&toml_str).unwrap();
        assert_eq!(config.binaries.dir, parsed.binaries.dir);
        assert_eq!(config.suite.cooldown_secs, parsed.suite.cooldown_secs);
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let result = VolsuiteConfig::from_file("/nonexistent/path/volsuite.toml").await;
        assert!(matches!(
            result.unwrap_err(),
            VolsuiteError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}
