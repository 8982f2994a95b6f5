//! 에러 타입 정의

use thiserror::Error;

/// 스케줄러 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO 에러: {0}")]
    Io(#[from] std::io::Error),

    #[error("응답 타임아웃: device={device}, function=0x{function:02X}")]
    Timeout { device: u8, function: u8 },

    #[error("예외 응답: device={device}, function=0x{function:02X}, code=0x{code:02X}")]
    Exception { device: u8, function: u8, code: u8 },

    #[error("채널 닫힘")]
    ChannelClosed,

    #[error("전송 에러: {0}")]
    Transport(String),

    #[error("유효하지 않은 요청: {reason}")]
    InvalidRequest { reason: String },

    #[error("유효하지 않은 설정: {reason}")]
    InvalidConfig { reason: String },

    #[error("스케줄러 정지됨")]
    SchedulerStopped,

    #[error("요청이 결과 없이 폐기됨")]
    RequestDropped,
}

impl Error {
    /// 재시도 대상 여부 (전송 계층 에러만)
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::Timeout { .. }
                | Error::Exception { .. }
                | Error::ChannelClosed
                | Error::Transport(_)
        )
    }

    pub(crate) fn invalid_request(reason: impl Into<String>) -> Self {
        Error::InvalidRequest {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Error::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, Error>;
