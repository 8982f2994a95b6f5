//! 전송 어댑터 경계
//!
//! 물리 채널(시리얼, TCP 게이트웨이 등)과 프레임 인코딩은 어댑터가 담당한다.
//! 스케줄러는 한 번에 하나의 호출만 보낸다.

use std::future::Future;
use std::time::Duration;

use crate::function::FunctionKind;
use crate::request::{
    DeviceId, LogicalRequest, RangeEcho, RequestArgs, SingleEcho, TransferOutput,
};
use crate::{Error, Result};

/// 공유 반이중 채널의 전송 어댑터
///
/// 각 전송 메서드는 요청/응답 한 번을 수행하고 정확히 한 번 결과를 돌려준다.
/// 타임아웃은 `set_timeout`으로 설정된 값을 어댑터가 직접 적용한다.
pub trait Transport: Send + Sync + 'static {
    /// 채널 열기
    fn open(&self) -> impl Future<Output = Result<()>> + Send;

    /// 채널 닫기
    fn close(&self) -> impl Future<Output = Result<()>> + Send;

    /// 이후 모든 전송에 적용할 타임아웃
    fn set_timeout(&self, timeout: Duration);

    /// FC1
    fn read_coils(
        &self,
        device: DeviceId,
        address: u16,
        quantity: u16,
    ) -> impl Future<Output = Result<Vec<u16>>> + Send;

    /// FC2
    fn read_discrete_inputs(
        &self,
        device: DeviceId,
        address: u16,
        quantity: u16,
    ) -> impl Future<Output = Result<Vec<u16>>> + Send;

    /// FC3
    fn read_holding_registers(
        &self,
        device: DeviceId,
        address: u16,
        quantity: u16,
    ) -> impl Future<Output = Result<Vec<u16>>> + Send;

    /// FC4
    fn read_input_registers(
        &self,
        device: DeviceId,
        address: u16,
        quantity: u16,
    ) -> impl Future<Output = Result<Vec<u16>>> + Send;

    /// FC5 (value는 0/1)
    fn write_single_coil(
        &self,
        device: DeviceId,
        address: u16,
        value: u16,
    ) -> impl Future<Output = Result<SingleEcho>> + Send;

    /// FC6
    fn write_single_register(
        &self,
        device: DeviceId,
        address: u16,
        value: u16,
    ) -> impl Future<Output = Result<SingleEcho>> + Send;

    /// FC15 (values는 0/1)
    fn write_multiple_coils(
        &self,
        device: DeviceId,
        address: u16,
        values: Vec<u16>,
    ) -> impl Future<Output = Result<RangeEcho>> + Send;

    /// FC16
    fn write_multiple_registers(
        &self,
        device: DeviceId,
        address: u16,
        values: Vec<u16>,
    ) -> impl Future<Output = Result<RangeEcho>> + Send;
}

/// 종류에 맞는 어댑터 메서드 호출
pub async fn transfer<T: Transport>(transport: &T, request: LogicalRequest) -> Result<TransferOutput> {
    let device = request.device;
    match (request.kind, request.args) {
        (FunctionKind::ReadCoils, RequestArgs::Quantity { address, quantity }) => transport
            .read_coils(device, address, quantity)
            .await
            .map(TransferOutput::Data),
        (FunctionKind::ReadDiscreteInputs, RequestArgs::Quantity { address, quantity }) => {
            transport
                .read_discrete_inputs(device, address, quantity)
                .await
                .map(TransferOutput::Data)
        }
        (FunctionKind::ReadHoldingRegisters, RequestArgs::Quantity { address, quantity }) => {
            transport
                .read_holding_registers(device, address, quantity)
                .await
                .map(TransferOutput::Data)
        }
        (FunctionKind::ReadInputRegisters, RequestArgs::Quantity { address, quantity }) => {
            transport
                .read_input_registers(device, address, quantity)
                .await
                .map(TransferOutput::Data)
        }
        (FunctionKind::WriteSingleCoil, RequestArgs::Value { address, value }) => transport
            .write_single_coil(device, address, value)
            .await
            .map(TransferOutput::Single),
        (FunctionKind::WriteSingleRegister, RequestArgs::Value { address, value }) => transport
            .write_single_register(device, address, value)
            .await
            .map(TransferOutput::Single),
        (FunctionKind::WriteMultipleCoils, RequestArgs::Values { address, values }) => transport
            .write_multiple_coils(device, address, values)
            .await
            .map(TransferOutput::Range),
        (FunctionKind::WriteMultipleRegisters, RequestArgs::Values { address, values }) => {
            transport
                .write_multiple_registers(device, address, values)
                .await
                .map(TransferOutput::Range)
        }
        (kind, args) => Err(Error::invalid_request(format!(
            "{}에 맞지 않는 인자: {:?}",
            kind, args
        ))),
    }
}
