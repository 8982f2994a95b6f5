//! 논리 요청, 전송 결과, 호출자 응답 타입

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::function::{FunctionKind, KindShape};
use crate::{Error, Result};

/// 장치 주소 (버스 상의 슬레이브 ID)
pub type DeviceId = u8;

/// 우선순위 (낮을수록 먼저 전송)
pub type Priority = i32;

/// 기본 우선순위
pub const DEFAULT_PRIORITY: Priority = 1;

/// 주소 공간 크기
const ADDRESS_SPACE: u32 = 0x1_0000;

/// 호출자가 넘기는 값 부분
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// 읽기 수량
    Quantity(u16),

    /// 단일 쓰기 값 (코일은 0/1)
    Value(u16),

    /// 범위 쓰기 값 목록 (코일은 0/1)
    Values(Vec<u16>),
}

impl Payload {
    /// 코일 상태 목록을 0/1 값으로 변환
    pub fn coils(states: &[bool]) -> Self {
        Payload::Values(states.iter().map(|&on| u16::from(on)).collect())
    }
}

impl From<Vec<u16>> for Payload {
    fn from(values: Vec<u16>) -> Self {
        Payload::Values(values)
    }
}

/// 검증된 요청 인자
///
/// 중복 검사는 이 타입의 구조적 동등성으로 판단한다.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestArgs {
    Quantity { address: u16, quantity: u16 },
    Value { address: u16, value: u16 },
    Values { address: u16, values: Vec<u16> },
}

impl RequestArgs {
    /// 종류에 맞는 형태인지 검증하여 생성
    pub fn new(kind: FunctionKind, address: u16, payload: Payload) -> Result<Self> {
        let args = match (kind.shape(), payload) {
            (KindShape::RangeRead, Payload::Quantity(quantity)) => {
                if quantity == 0 {
                    return Err(Error::invalid_request(format!("{} 수량이 0", kind)));
                }
                RequestArgs::Quantity { address, quantity }
            }
            (KindShape::SingleWrite, Payload::Value(value)) => {
                if kind.is_bit_access() && value > 1 {
                    return Err(Error::invalid_request(format!(
                        "코일 값은 0 또는 1이어야 함: {}",
                        value
                    )));
                }
                RequestArgs::Value { address, value }
            }
            (KindShape::RangeWrite, Payload::Values(values)) => {
                if values.is_empty() {
                    return Err(Error::invalid_request(format!("{} 값 목록이 비어 있음", kind)));
                }
                if kind.is_bit_access() && values.iter().any(|&v| v > 1) {
                    return Err(Error::invalid_request("코일 값은 0 또는 1이어야 함"));
                }
                RequestArgs::Values { address, values }
            }
            (shape, payload) => {
                return Err(Error::invalid_request(format!(
                    "{} ({:?})에 맞지 않는 인자: {:?}",
                    kind, shape, payload
                )));
            }
        };

        if u32::from(address) + args.count() as u32 > ADDRESS_SPACE {
            return Err(Error::invalid_request(format!(
                "주소 범위 초과: address={}, count={}",
                address,
                args.count()
            )));
        }

        Ok(args)
    }

    pub fn address(&self) -> u16 {
        match self {
            RequestArgs::Quantity { address, .. }
            | RequestArgs::Value { address, .. }
            | RequestArgs::Values { address, .. } => *address,
        }
    }

    /// 대상 주소 수
    pub fn count(&self) -> usize {
        match self {
            RequestArgs::Quantity { quantity, .. } => *quantity as usize,
            RequestArgs::Value { .. } => 1,
            RequestArgs::Values { values, .. } => values.len(),
        }
    }
}

/// 논리 요청 (장치 + 종류 + 인자)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogicalRequest {
    pub device: DeviceId,
    pub kind: FunctionKind,
    pub args: RequestArgs,
}

impl LogicalRequest {
    pub fn new(
        device: DeviceId,
        kind: FunctionKind,
        address: u16,
        payload: Payload,
    ) -> Result<Self> {
        Ok(Self {
            device,
            kind,
            args: RequestArgs::new(kind, address, payload)?,
        })
    }
}

/// 단일 쓰기 에코
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleEcho {
    pub address: u16,
    pub value: u16,
}

/// 범위 쓰기 에코
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeEcho {
    pub address: u16,
    pub quantity: u16,
}

/// 전송 한 번의 원시 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutput {
    /// 읽기 결과 데이터
    Data(Vec<u16>),

    Single(SingleEcho),

    Range(RangeEcho),
}

/// 호출자에게 전달되는 최종 결과
///
/// 평탄화 결과가 정확히 하나면 `Value`로 풀어서 전달한다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Value(u16),
    Values(Vec<u16>),
}

impl Reply {
    pub fn from_flat(mut values: Vec<u16>) -> Self {
        if values.len() == 1 {
            Reply::Value(values.remove(0))
        } else {
            Reply::Values(values)
        }
    }

    pub fn as_value(&self) -> Option<u16> {
        match self {
            Reply::Value(value) => Some(*value),
            Reply::Values(_) => None,
        }
    }

    pub fn into_vec(self) -> Vec<u16> {
        match self {
            Reply::Value(value) => vec![value],
            Reply::Values(values) => values,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Reply::Value(_) => 1,
            Reply::Values(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 완료 통지 송신측 (큐 엔트리가 소유)
pub(crate) type Completion = oneshot::Sender<Result<Reply>>;

/// 수락된 요청의 결과 대기 핸들
///
/// 정확히 한 번 결과를 돌려준다. 스케줄러가 결과 없이 요청을 폐기하면
/// `Error::RequestDropped`로 끝난다.
#[derive(Debug)]
pub struct PendingReply {
    rx: oneshot::Receiver<Result<Reply>>,
}

impl PendingReply {
    pub(crate) fn channel() -> (Completion, PendingReply) {
        let (tx, rx) = oneshot::channel();
        (tx, PendingReply { rx })
    }
}

impl Future for PendingReply {
    type Output = Result<Reply>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(Error::RequestDropped)))
    }
}

/// 제출 결과
#[derive(Debug)]
pub enum Submission {
    /// 큐에 들어감
    Queued(PendingReply),

    /// 동일 요청이 이미 대기 중이어서 폐기됨 (결과 통지 없음)
    Coalesced,
}

impl Submission {
    pub fn is_coalesced(&self) -> bool {
        matches!(self, Submission::Coalesced)
    }

    pub fn into_pending(self) -> Option<PendingReply> {
        match self {
            Submission::Queued(pending) => Some(pending),
            Submission::Coalesced => None,
        }
    }
}
