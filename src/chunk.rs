//! 청크 분할 엔진
//!
//! - 논리 요청이 전송 한도를 넘으면 순서대로 서브 요청으로 분할
//! - 서브 결과를 버퍼에 모아 마지막 청크에서 하나의 결과로 조립
//! - 클로저 체인 대신 `Stage` 태그 + 순수 단계 함수(`advance`)로 표현
//!
//! I/O 없이 재시도/진행 로직을 그대로 검증할 수 있다.

use crate::config::Config;
use crate::function::KindShape;
use crate::request::{LogicalRequest, Priority, Reply, RequestArgs, TransferOutput};
use crate::Result;

/// 청크 진행 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// 성공 시 다음 청크를 큐에 넣음
    Continue,

    /// 성공 시 버퍼를 평탄화하여 호출자에게 전달
    Finalize,
}

/// 논리 요청 하나의 누적 청크 상태
#[derive(Debug, Clone)]
pub struct ChunkState {
    /// 지금까지 받은 서브 결과
    pub buffer: Vec<TransferOutput>,

    pub stage: Stage,
}

/// 대기 큐에 들어가는 단위
///
/// 논리 요청 하나당 큐에는 항상 엔트리 하나만 존재한다. 재시도나 다음 청크는
/// 이전 엔트리를 소비해서 새 엔트리를 만든다.
#[derive(Debug)]
pub struct QueueEntry<C> {
    /// 현재 서브 요청의 시작점과 남은 범위
    pub request: LogicalRequest,

    pub priority: Priority,

    /// 남은 재시도 횟수
    pub retry_budget: u32,

    pub state: ChunkState,

    /// 호출자 완료 통지
    pub completion: C,
}

/// 서브 결과 처리 후 다음 동작
#[derive(Debug)]
pub enum Step<C> {
    /// 같은 서브 요청을 재시도 예산 1 감소시켜 다시 큐에 넣음
    Retry(QueueEntry<C>),

    /// 다음 청크를 큐에 넣음
    Next(QueueEntry<C>),

    /// 논리 요청 종료
    Complete { completion: C, result: Result<Reply> },
}

/// 논리 요청을 큐 엔트리로 변환
pub fn plan<C>(
    request: LogicalRequest,
    priority: Priority,
    completion: C,
    config: &Config,
) -> QueueEntry<C> {
    let limit = config.chunk_limit(request.kind);
    let stage = stage_for(&request, limit);

    QueueEntry {
        request,
        priority,
        retry_budget: config.retry_budget(),
        state: ChunkState {
            buffer: Vec::new(),
            stage,
        },
        completion,
    }
}

/// 한도를 넘는 범위 요청만 분할
fn stage_for(request: &LogicalRequest, limit: u16) -> Stage {
    match (request.kind.shape(), &request.args) {
        (KindShape::RangeRead, RequestArgs::Quantity { quantity, .. }) if *quantity > limit => {
            Stage::Continue
        }
        (KindShape::RangeWrite, RequestArgs::Values { values, .. })
            if values.len() > limit as usize =>
        {
            Stage::Continue
        }
        _ => Stage::Finalize,
    }
}

impl<C> QueueEntry<C> {
    /// 전송 어댑터에 실제로 넘길 서브 요청 (한도로 자름)
    ///
    /// 범위 쓰기는 전체 목록의 앞부분이 아니라 남은 값의 앞 `limit`개를 보낸다.
    pub fn outgoing(&self, config: &Config) -> LogicalRequest {
        let limit = config.chunk_limit(self.request.kind);
        let args = match &self.request.args {
            RequestArgs::Quantity { address, quantity } => RequestArgs::Quantity {
                address: *address,
                quantity: (*quantity).min(limit),
            },
            RequestArgs::Values { address, values } => RequestArgs::Values {
                address: *address,
                values: values[..values.len().min(limit as usize)].to_vec(),
            },
            single @ RequestArgs::Value { .. } => single.clone(),
        };

        LogicalRequest {
            device: self.request.device,
            kind: self.request.kind,
            args,
        }
    }

    /// 서브 결과로 상태 진행
    ///
    /// 재시도 대상이 아닌 에러는 예산이 남아 있어도 바로 호출자에게 전달한다.
    pub fn advance(self, outcome: Result<TransferOutput>, config: &Config) -> Step<C> {
        let QueueEntry {
            request,
            priority,
            retry_budget,
            mut state,
            completion,
        } = self;

        let output = match outcome {
            Ok(output) => output,
            Err(error) => {
                if retry_budget > 0 && error.is_retryable() {
                    return Step::Retry(QueueEntry {
                        request,
                        priority,
                        retry_budget: retry_budget - 1,
                        state,
                        completion,
                    });
                }
                return Step::Complete {
                    completion,
                    result: Err(error),
                };
            }
        };

        let limit = config.chunk_limit(request.kind);
        state.buffer.push(output);

        match state.stage {
            Stage::Continue => {
                let next = remaining_after(&request, limit);
                state.stage = stage_for(&next, limit);
                Step::Next(QueueEntry {
                    request: next,
                    priority,
                    retry_budget: config.retry_budget(),
                    state,
                    completion,
                })
            }
            Stage::Finalize => Step::Complete {
                completion,
                result: Ok(Reply::from_flat(flatten(&state.buffer, limit))),
            },
        }
    }
}

/// 한도만큼 진행한 나머지 요청
///
/// 범위 쓰기는 주소와 값 목록을 같은 만큼 함께 전진시킨다.
fn remaining_after(request: &LogicalRequest, limit: u16) -> LogicalRequest {
    // Continue 단계는 count > limit 이고 주소 범위는 생성 시 검증됨
    let args = match &request.args {
        RequestArgs::Quantity { address, quantity } => RequestArgs::Quantity {
            address: address + limit,
            quantity: quantity - limit,
        },
        RequestArgs::Values { address, values } => RequestArgs::Values {
            address: address + limit,
            values: values[limit as usize..].to_vec(),
        },
        single @ RequestArgs::Value { .. } => single.clone(),
    };

    LogicalRequest {
        device: request.device,
        kind: request.kind,
        args,
    }
}

/// 버퍼에 모인 서브 결과를 하나의 값 목록으로 평탄화
///
/// 읽기 결과는 앞쪽 `limit`개, 단일 쓰기는 에코 값, 범위 쓰기는 에코 수량을 이어 붙인다.
pub fn flatten(buffer: &[TransferOutput], limit: u16) -> Vec<u16> {
    let mut flat = Vec::new();
    for output in buffer {
        match output {
            TransferOutput::Data(data) => {
                flat.extend_from_slice(&data[..data.len().min(limit as usize)]);
            }
            TransferOutput::Single(echo) => flat.push(echo.value),
            TransferOutput::Range(echo) => flat.push(echo.quantity),
        }
    }
    flat
}
