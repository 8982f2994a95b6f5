//! 장치 핸들
//!
//! 스케줄러에 장치 ID를 묶어 둔 얇은 래퍼. 모든 요청은 같은 스케줄러를 거친다.

use std::time::Duration;

use crate::function::FunctionKind;
use crate::request::{DeviceId, Payload, Priority, Submission, DEFAULT_PRIORITY};
use crate::scheduler::Scheduler;
use crate::Result;

/// 특정 장치로 요청을 보내는 핸들
#[derive(Clone)]
pub struct DeviceHandle {
    id: DeviceId,
    scheduler: Scheduler,
    timeout: Option<Duration>,
}

impl DeviceHandle {
    /// `timeout`은 참고용 값이며 실제 타임아웃은 스케줄러 설정을 따른다
    pub fn new(id: DeviceId, scheduler: Scheduler, timeout: Option<Duration>) -> Self {
        Self {
            id,
            scheduler,
            timeout,
        }
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub async fn send(
        &self,
        kind: FunctionKind,
        address: u16,
        payload: Payload,
        priority: Priority,
    ) -> Result<Submission> {
        self.scheduler
            .send(self.id, kind, address, payload, priority)
            .await
    }

    pub async fn read_coils(&self, address: u16, quantity: u16) -> Result<Submission> {
        self.send(
            FunctionKind::ReadCoils,
            address,
            Payload::Quantity(quantity),
            DEFAULT_PRIORITY,
        )
        .await
    }

    pub async fn read_discrete_inputs(&self, address: u16, quantity: u16) -> Result<Submission> {
        self.send(
            FunctionKind::ReadDiscreteInputs,
            address,
            Payload::Quantity(quantity),
            DEFAULT_PRIORITY,
        )
        .await
    }

    pub async fn read_holding_registers(&self, address: u16, quantity: u16) -> Result<Submission> {
        self.send(
            FunctionKind::ReadHoldingRegisters,
            address,
            Payload::Quantity(quantity),
            DEFAULT_PRIORITY,
        )
        .await
    }

    pub async fn read_input_registers(&self, address: u16, quantity: u16) -> Result<Submission> {
        self.send(
            FunctionKind::ReadInputRegisters,
            address,
            Payload::Quantity(quantity),
            DEFAULT_PRIORITY,
        )
        .await
    }

    /// FC5
    pub async fn write_coil(&self, address: u16, state: bool) -> Result<Submission> {
        self.send(
            FunctionKind::WriteSingleCoil,
            address,
            Payload::Value(u16::from(state)),
            DEFAULT_PRIORITY,
        )
        .await
    }

    /// FC6
    pub async fn write_register(&self, address: u16, value: u16) -> Result<Submission> {
        self.send(
            FunctionKind::WriteSingleRegister,
            address,
            Payload::Value(value),
            DEFAULT_PRIORITY,
        )
        .await
    }

    /// FC15
    pub async fn write_coils(&self, address: u16, states: &[bool]) -> Result<Submission> {
        self.send(
            FunctionKind::WriteMultipleCoils,
            address,
            Payload::coils(states),
            DEFAULT_PRIORITY,
        )
        .await
    }

    /// FC16
    pub async fn write_registers(&self, address: u16, values: Vec<u16>) -> Result<Submission> {
        self.send(
            FunctionKind::WriteMultipleRegisters,
            address,
            Payload::Values(values),
            DEFAULT_PRIORITY,
        )
        .await
    }
}
