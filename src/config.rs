//! 스케줄러 설정

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::function::FunctionKind;
use crate::{
    Error, Result, DEFAULT_DISPATCH_INTERVAL_MS, DEFAULT_MAX_CHUNK_SIZE, DEFAULT_RETRY_COUNT,
    DEFAULT_TIMEOUT_MS,
};

/// 스케줄러 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 디스패치 주기 (밀리초)
    /// 주기마다 큐에서 최대 하나의 요청을 꺼내 전송
    pub dispatch_interval_ms: u64,

    /// 전송 타임아웃 (밀리초)
    /// 채널을 열 때 전송 어댑터에 한 번 적용됨
    pub timeout_ms: u64,

    /// 서브 요청당 총 시도 횟수 (1 이상)
    pub retry_count: u32,

    /// 한 번의 전송에 담을 최대 주소/값 수
    pub max_chunk_size: u16,

    /// 명령 채널 용량
    pub command_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dispatch_interval_ms: DEFAULT_DISPATCH_INTERVAL_MS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retry_count: DEFAULT_RETRY_COUNT,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            command_capacity: 256,
        }
    }
}

impl Config {
    /// 새 설정 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 남은 재시도 횟수 초기값 (retry_count - 1)
    pub fn retry_budget(&self) -> u32 {
        self.retry_count.saturating_sub(1)
    }

    pub fn dispatch_interval(&self) -> Duration {
        Duration::from_millis(self.dispatch_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// 종류별 실제 청크 크기 (프로토콜 한도로 제한)
    pub fn chunk_limit(&self, kind: FunctionKind) -> u16 {
        self.max_chunk_size.min(kind.max_quantity()).max(1)
    }

    /// 설정 검증
    pub fn validate(&self) -> Result<()> {
        if self.retry_count == 0 {
            return Err(Error::invalid_config("retry_count는 1 이상이어야 함"));
        }
        if self.max_chunk_size == 0 {
            return Err(Error::invalid_config("max_chunk_size는 1 이상이어야 함"));
        }
        if self.dispatch_interval_ms == 0 {
            return Err(Error::invalid_config("dispatch_interval_ms는 0일 수 없음"));
        }
        if self.timeout_ms == 0 {
            return Err(Error::invalid_config("timeout_ms는 0일 수 없음"));
        }
        if self.command_capacity == 0 {
            return Err(Error::invalid_config("command_capacity는 0일 수 없음"));
        }
        Ok(())
    }

    /// 저속 시리얼 (9600bps 이하) 링크용 설정
    pub fn serial_low_baud() -> Self {
        Self {
            dispatch_interval_ms: 500,
            timeout_ms: 1000,
            retry_count: 3,
            max_chunk_size: 4,
            command_capacity: 128,
        }
    }

    /// 고속 시리얼 (115200bps) 링크용 설정
    pub fn serial_high_baud() -> Self {
        Self {
            dispatch_interval_ms: 50,
            timeout_ms: 200,
            retry_count: 3,
            max_chunk_size: 32,
            command_capacity: 256,
        }
    }

    /// TCP 게이트웨이 뒤의 RTU 장치용 설정
    pub fn tcp_gateway() -> Self {
        Self {
            dispatch_interval_ms: 20,
            timeout_ms: 300,
            retry_count: 2,
            max_chunk_size: 120,
            command_capacity: 1024,
        }
    }
}
