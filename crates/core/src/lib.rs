//! volsuite 공통 크레이트: 스텝/결과/판정 모델, 에러, 설정
//!
//! 실제 프로세스 실행과 시나리오 순서 제어는 `volsuite-runner`가 담당하며,
//! 이 크레이트는 부작용 없는 타입과 규칙만 제공합니다.

pub mod config;
pub mod error;
pub mod outcome;
pub mod step;
pub mod verdict;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, LaunchError, NotifyError, RegistryError, VolsuiteError};

// 설정
pub use config::VolsuiteConfig;

// 스텝/결과/판정
pub use outcome::Outcome;
pub use step::{ArgumentSet, Executable, ExpectedOutcome, FlagValue, Step};
pub use verdict::{Verdict, interpret};
