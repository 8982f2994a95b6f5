//! # mbsched
//!
//! 공유 반이중 필드버스(Modbus 계열)용 요청 스케줄러
//!
//! ## 핵심 특징
//! - **단일 전송**: 채널에는 항상 최대 하나의 요청만 진행
//! - **우선순위 큐**: 낮은 값이 먼저, 같은 우선순위는 도착 순서
//! - **중복 제거**: 같은 (장치, 종류, 인자) 요청은 대기 중 하나만 유지
//! - **청크 분할**: 큰 범위 요청을 나눠 보내고 결과를 하나로 조립
//! - **서브 요청 재시도**: 실패한 청크만 다시 전송
//! - **전송 어댑터 분리**: 물리 채널은 `Transport` 구현이 담당

pub mod chunk;
pub mod config;
pub mod device;
pub mod error;
pub mod function;
pub mod queue;
pub mod request;
pub mod scheduler;
pub mod sim;
pub mod stats;
pub mod transport;

pub use config::Config;
pub use device::DeviceHandle;
pub use error::{Error, Result};
pub use function::FunctionKind;
pub use request::{
    DeviceId, LogicalRequest, Payload, PendingReply, Priority, RangeEcho, Reply, RequestArgs,
    SingleEcho, Submission, TransferOutput, DEFAULT_PRIORITY,
};
pub use scheduler::Scheduler;
pub use sim::{DeviceMemory, SimulatedBus};
pub use stats::SchedulerStats;
pub use transport::Transport;

/// 기본 디스패치 주기 (밀리초)
pub const DEFAULT_DISPATCH_INTERVAL_MS: u64 = 200;

/// 기본 전송 타임아웃 (밀리초)
pub const DEFAULT_TIMEOUT_MS: u64 = 500;

/// 기본 서브 요청당 시도 횟수
pub const DEFAULT_RETRY_COUNT: u32 = 3;

/// 기본 최대 청크 크기 (주소/값 수)
pub const DEFAULT_MAX_CHUNK_SIZE: u16 = 4;
