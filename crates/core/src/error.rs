//! 에러 타입: 도메인별 에러 정의
//!
//! 판정 결과(FAIL, 타임아웃, 예상된 abort)는 에러가 아니라 [`Verdict`](crate::verdict::Verdict)로
//! 표현됩니다. 여기의 에러는 실행 자체를 진행할 수 없는 상황만 다룹니다.

use std::path::PathBuf;

/// volsuite 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum VolsuiteError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 시나리오 레지스트리 에러
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 시나리오 레지스트리 에러
///
/// 레지스트리 구성 시점 또는 이름 조회 시점에 발생하며,
/// 어떤 테스트 바이너리도 실행되기 전에 보고됩니다.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// 등록되지 않은 시나리오/스위트 이름
    #[error("unknown scenario or suite '{name}' (known: {})", known.join(", "))]
    UnknownScenario { name: String, known: Vec<String> },

    /// 이름 중복
    #[error("duplicate scenario or suite name '{0}'")]
    DuplicateName(String),

    /// 스텝이 없는 시나리오
    #[error("scenario '{0}' has no steps")]
    EmptyScenario(String),

    /// 잘못된 복구 루프 정의
    #[error("invalid recovery loop in scenario '{scenario}': {reason}")]
    InvalidRecoveryLoop { scenario: String, reason: String },

    /// 스위트가 존재하지 않는 시나리오를 참조
    #[error("suite '{suite}' references unknown scenario '{member}'")]
    UnknownSuiteMember { suite: String, member: String },

    /// 카탈로그 문서 파싱 실패
    #[error("failed to parse scenario catalogue: {reason}")]
    CatalogueParse { reason: String },
}

/// 테스트 바이너리 실행 실패
///
/// 0이 아닌 종료 코드와는 구별됩니다. 프로세스가 시작조차 되지 않았거나
/// 상태를 회수할 수 없는 경우이며, 재시도 없이 실행 전체를 중단시킵니다.
/// 최상위 에러로 전파되지 않고 스위트 결과의 중단 사유로 기록됩니다.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// 실행 파일 없음
    #[error("executable not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// 실행 권한 없음
    #[error("permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    /// 기타 spawn 실패
    #[error("failed to spawn {}: {reason}", path.display())]
    Spawn { path: PathBuf, reason: String },

    /// 종료 상태 회수 실패
    #[error("failed to wait for {}: {reason}", path.display())]
    Wait { path: PathBuf, reason: String },
}

impl LaunchError {
    /// spawn 시점의 I/O 에러를 분류합니다.
    pub fn from_spawn(path: PathBuf, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Spawn {
                path,
                reason: err.to_string(),
            },
        }
    }
}

/// 알림 전달 실패
///
/// 종료 코드에 영향을 주지 않으며 경고 로그로만 남습니다.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// 알림 명령 실행 실패
    #[error("failed to run notify command '{program}': {reason}")]
    Spawn { program: String, reason: String },

    /// 알림 명령이 실패 코드로 종료
    #[error("notify command '{program}' exited with {status}")]
    NonZeroExit { program: String, status: String },
}
