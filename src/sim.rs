//! 메모리 기반 가상 버스
//!
//! 실제 시리얼 포트 없이 스케줄러를 돌려보기 위한 `Transport` 구현.
//! - 장치별 코일/입력/홀딩/입력 레지스터 테이블
//! - 응답 지연, 타임아웃, 예외 응답, 장애 주입
//! - 호출 기록 및 동시 호출 수 측정

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use rand::Rng;
use tracing::trace;

use crate::function::{
    FunctionKind, EXCEPTION_ILLEGAL_DATA_ADDRESS, EXCEPTION_SERVER_DEVICE_BUSY,
};
use crate::request::{DeviceId, RangeEcho, SingleEcho};
use crate::transport::Transport;
use crate::{Error, Result};

/// 장치 하나의 메모리 맵
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceMemory {
    pub coils: Vec<u16>,
    pub discrete_inputs: Vec<u16>,
    pub holding_registers: Vec<u16>,
    pub input_registers: Vec<u16>,
}

impl DeviceMemory {
    /// 0으로 채운 테이블
    pub fn new(size: usize) -> Self {
        Self {
            coils: vec![0; size],
            discrete_inputs: vec![0; size],
            holding_registers: vec![0; size],
            input_registers: vec![0; size],
        }
    }

    /// 주소에서 값을 유추할 수 있는 테스트 패턴
    ///
    /// holding[i] = i, input[i] = i | 0x8000, coil[i] = i % 2, discrete[i] = (i % 3 == 0)
    pub fn with_pattern(size: usize) -> Self {
        Self {
            coils: (0..size).map(|i| (i % 2) as u16).collect(),
            discrete_inputs: (0..size).map(|i| u16::from(i % 3 == 0)).collect(),
            holding_registers: (0..size).map(|i| i as u16).collect(),
            input_registers: (0..size).map(|i| (i as u16) | 0x8000).collect(),
        }
    }

    fn table(&self, kind: FunctionKind) -> &[u16] {
        match kind {
            FunctionKind::ReadCoils
            | FunctionKind::WriteSingleCoil
            | FunctionKind::WriteMultipleCoils => &self.coils,
            FunctionKind::ReadDiscreteInputs => &self.discrete_inputs,
            FunctionKind::ReadInputRegisters => &self.input_registers,
            FunctionKind::ReadHoldingRegisters
            | FunctionKind::WriteSingleRegister
            | FunctionKind::WriteMultipleRegisters => &self.holding_registers,
        }
    }

    fn table_mut(&mut self, kind: FunctionKind) -> &mut [u16] {
        match kind {
            FunctionKind::ReadCoils
            | FunctionKind::WriteSingleCoil
            | FunctionKind::WriteMultipleCoils => &mut self.coils,
            FunctionKind::ReadDiscreteInputs => &mut self.discrete_inputs,
            FunctionKind::ReadInputRegisters => &mut self.input_registers,
            FunctionKind::ReadHoldingRegisters
            | FunctionKind::WriteSingleRegister
            | FunctionKind::WriteMultipleRegisters => &mut self.holding_registers,
        }
    }
}

/// 어댑터가 받은 호출 기록
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub device: DeviceId,
    pub kind: FunctionKind,
    pub address: u16,
    pub count: usize,
    pub at: tokio::time::Instant,
}

/// 진행 중 호출 수 (취소되어도 감소)
struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// 메모리 기반 가상 버스
pub struct SimulatedBus {
    devices: DashMap<DeviceId, DeviceMemory>,
    latency: RwLock<Duration>,
    timeout: RwLock<Duration>,
    open: AtomicBool,
    scripted_failures: AtomicUsize,
    failure_rate: RwLock<f64>,
    calls: Mutex<Vec<CallRecord>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl SimulatedBus {
    pub fn new() -> Self {
        Self {
            devices: DashMap::new(),
            latency: RwLock::new(Duration::from_millis(10)),
            timeout: RwLock::new(Duration::from_secs(1)),
            open: AtomicBool::new(false),
            scripted_failures: AtomicUsize::new(0),
            failure_rate: RwLock::new(0.0),
            calls: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    /// 응답 지연 지정
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.write() = latency;
        self
    }

    /// 장치 추가
    pub fn with_device(self, id: DeviceId, memory: DeviceMemory) -> Self {
        self.add_device(id, memory);
        self
    }

    pub fn add_device(&self, id: DeviceId, memory: DeviceMemory) {
        self.devices.insert(id, memory);
    }

    /// 장치 제거 (이후 호출은 타임아웃)
    pub fn remove_device(&self, id: DeviceId) -> Option<DeviceMemory> {
        self.devices.remove(&id).map(|(_, memory)| memory)
    }

    /// 장치 메모리 복사본
    pub fn snapshot(&self, id: DeviceId) -> Option<DeviceMemory> {
        self.devices.get(&id).map(|memory| memory.clone())
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.write() = latency;
    }

    /// 다음 n번의 호출을 Server Device Busy 예외로 실패시킴
    pub fn fail_next(&self, count: usize) {
        self.scripted_failures.store(count, Ordering::SeqCst);
    }

    /// 무작위 실패 확률 (0.0 ~ 1.0)
    pub fn set_failure_rate(&self, rate: f64) {
        *self.failure_rate.write() = rate.clamp(0.0, 1.0);
    }

    pub fn timeout(&self) -> Duration {
        *self.timeout.read()
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// 지금까지의 호출 기록
    pub fn calls(&self) -> Vec<CallRecord> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// 관측된 최대 동시 호출 수
    pub fn max_concurrent_calls(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    fn take_scripted_failure(&self) -> bool {
        self.scripted_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn roll_random_failure(&self) -> bool {
        let rate = *self.failure_rate.read();
        rate > 0.0 && rand::thread_rng().gen_bool(rate)
    }

    /// 요청/응답 한 번 수행
    async fn exchange<R>(
        &self,
        device: DeviceId,
        kind: FunctionKind,
        address: u16,
        count: usize,
        op: impl FnOnce(&mut DeviceMemory) -> Result<R> + Send,
    ) -> Result<R> {
        if !self.is_open() {
            return Err(Error::ChannelClosed);
        }

        self.calls.lock().push(CallRecord {
            device,
            kind,
            address,
            count,
            at: tokio::time::Instant::now(),
        });

        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = ActiveGuard(&self.active);
        self.max_active.fetch_max(active, Ordering::SeqCst);

        trace!("sim {} device={} address={} count={}", kind, device, address, count);

        let latency = *self.latency.read();
        let timeout = *self.timeout.read();
        let timeout_error = Error::Timeout {
            device,
            function: kind.code(),
        };

        if !self.devices.contains_key(&device) || latency > timeout {
            tokio::time::sleep(timeout).await;
            return Err(timeout_error);
        }

        tokio::time::sleep(latency).await;

        if self.take_scripted_failure() || self.roll_random_failure() {
            return Err(Error::Exception {
                device,
                function: kind.code(),
                code: EXCEPTION_SERVER_DEVICE_BUSY,
            });
        }

        // 지연 중 장치가 제거되었을 수 있음
        let mut memory = self.devices.get_mut(&device).ok_or(timeout_error)?;
        op(memory.value_mut())
    }

    async fn read(
        &self,
        device: DeviceId,
        kind: FunctionKind,
        address: u16,
        quantity: u16,
    ) -> Result<Vec<u16>> {
        self.exchange(device, kind, address, quantity as usize, move |memory| {
            let start = address as usize;
            let end = start + quantity as usize;
            memory
                .table(kind)
                .get(start..end)
                .map(|values| values.to_vec())
                .ok_or_else(|| illegal_address(device, kind))
        })
        .await
    }

    async fn write_single(
        &self,
        device: DeviceId,
        kind: FunctionKind,
        address: u16,
        value: u16,
    ) -> Result<SingleEcho> {
        self.exchange(device, kind, address, 1, move |memory| {
            let slot = memory
                .table_mut(kind)
                .get_mut(address as usize)
                .ok_or_else(|| illegal_address(device, kind))?;
            *slot = value;
            Ok(SingleEcho { address, value })
        })
        .await
    }

    async fn write_range(
        &self,
        device: DeviceId,
        kind: FunctionKind,
        address: u16,
        values: Vec<u16>,
    ) -> Result<RangeEcho> {
        let count = values.len();
        self.exchange(device, kind, address, count, move |memory| {
            let start = address as usize;
            let target = memory
                .table_mut(kind)
                .get_mut(start..start + values.len())
                .ok_or_else(|| illegal_address(device, kind))?;
            target.copy_from_slice(&values);
            Ok(RangeEcho {
                address,
                quantity: values.len() as u16,
            })
        })
        .await
    }
}

impl Default for SimulatedBus {
    fn default() -> Self {
        Self::new()
    }
}

fn illegal_address(device: DeviceId, kind: FunctionKind) -> Error {
    Error::Exception {
        device,
        function: kind.code(),
        code: EXCEPTION_ILLEGAL_DATA_ADDRESS,
    }
}

impl Transport for SimulatedBus {
    async fn open(&self) -> Result<()> {
        self.open.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.open.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn set_timeout(&self, timeout: Duration) {
        *self.timeout.write() = timeout;
    }

    async fn read_coils(&self, device: DeviceId, address: u16, quantity: u16) -> Result<Vec<u16>> {
        self.read(device, FunctionKind::ReadCoils, address, quantity).await
    }

    async fn read_discrete_inputs(
        &self,
        device: DeviceId,
        address: u16,
        quantity: u16,
    ) -> Result<Vec<u16>> {
        self.read(device, FunctionKind::ReadDiscreteInputs, address, quantity)
            .await
    }

    async fn read_holding_registers(
        &self,
        device: DeviceId,
        address: u16,
        quantity: u16,
    ) -> Result<Vec<u16>> {
        self.read(device, FunctionKind::ReadHoldingRegisters, address, quantity)
            .await
    }

    async fn read_input_registers(
        &self,
        device: DeviceId,
        address: u16,
        quantity: u16,
    ) -> Result<Vec<u16>> {
        self.read(device, FunctionKind::ReadInputRegisters, address, quantity)
            .await
    }

    async fn write_single_coil(
        &self,
        device: DeviceId,
        address: u16,
        value: u16,
    ) -> Result<SingleEcho> {
        self.write_single(device, FunctionKind::WriteSingleCoil, address, value)
            .await
    }

    async fn write_single_register(
        &self,
        device: DeviceId,
        address: u16,
        value: u16,
    ) -> Result<SingleEcho> {
        self.write_single(device, FunctionKind::WriteSingleRegister, address, value)
            .await
    }

    async fn write_multiple_coils(
        &self,
        device: DeviceId,
        address: u16,
        values: Vec<u16>,
    ) -> Result<RangeEcho> {
        self.write_range(device, FunctionKind::WriteMultipleCoils, address, values)
            .await
    }

    async fn write_multiple_registers(
        &self,
        device: DeviceId,
        address: u16,
        values: Vec<u16>,
    ) -> Result<RangeEcho> {
        self.write_range(device, FunctionKind::WriteMultipleRegisters, address, values)
            .await
    }
}
