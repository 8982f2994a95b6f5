//! 요청 스케줄러
//!
//! - 우선순위 대기 큐 + 구조적 중복 제거
//! - 고정 주기 디스패치, 채널에는 항상 최대 하나의 전송만 진행
//! - 서브 요청 단위 재시도
//! - 청크 결과를 모아 호출자에게 한 번만 전달
//!
//! 큐, 재시도 예산, 청크 버퍼는 모두 단일 태스크(`SchedulerLoop`)에서만 변경된다.
//! 외부에서는 명령 채널을 통해 `Scheduler` 핸들로 접근한다.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Interval};
use tracing::{debug, info, trace, warn};

use crate::chunk::{self, QueueEntry, Step};
use crate::device::DeviceHandle;
use crate::function::FunctionKind;
use crate::queue::{Enqueue, PendingQueue};
use crate::request::{
    Completion, DeviceId, LogicalRequest, Payload, PendingReply, Priority, Submission,
    TransferOutput,
};
use crate::stats::SchedulerStats;
use crate::transport::{self, Transport};
use crate::{Config, Error, Result};

type Entry = QueueEntry<Completion>;

type TransferCall = Pin<Box<dyn Future<Output = Result<TransferOutput>> + Send>>;

/// 내부 명령
enum SchedulerCmd {
    Submit {
        request: LogicalRequest,
        priority: Priority,
        ack: oneshot::Sender<Submission>,
    },
    Open {
        done: oneshot::Sender<Result<()>>,
    },
    Close {
        done: oneshot::Sender<Result<()>>,
    },
}

/// 루프가 기다리는 이벤트
enum Event {
    Command(Option<SchedulerCmd>),
    Tick,
    Completed(Result<TransferOutput>),
}

/// 전송 중인 서브 요청
struct InFlight {
    entry: Entry,
    call: TransferCall,
}

/// 스케줄러 내부 상태 (단일 태스크에서만 접근)
struct SchedulerLoop<T> {
    config: Config,
    transport: Arc<T>,
    queue: PendingQueue<Completion>,
    in_flight: Option<InFlight>,
    ticker: Option<Interval>,
    tick_deferred: bool,
    open: Arc<AtomicBool>,
    stats: Arc<RwLock<SchedulerStats>>,
    cmd_rx: mpsc::Receiver<SchedulerCmd>,
}

impl<T: Transport> SchedulerLoop<T> {
    async fn run(mut self) {
        loop {
            let event = tokio::select! {
                cmd = self.cmd_rx.recv() => Event::Command(cmd),
                _ = next_tick(&mut self.ticker) => Event::Tick,
                outcome = in_flight_done(&mut self.in_flight) => Event::Completed(outcome),
            };

            match event {
                Event::Command(Some(cmd)) => self.handle_command(cmd).await,
                Event::Command(None) => break,
                Event::Tick => self.on_tick(),
                Event::Completed(outcome) => self.on_completed(outcome),
            }

            self.stats.write().queue_depth = self.queue.len();
        }

        // 모든 핸들이 사라짐: 남은 요청은 결과 없이 폐기
        if self.open.swap(false, Ordering::SeqCst) {
            if let Err(e) = self.transport.close().await {
                warn!("채널 닫기 실패: {}", e);
            }
        }
        debug!("스케줄러 루프 종료: 대기 {}건 폐기", self.queue.len());
    }

    async fn handle_command(&mut self, cmd: SchedulerCmd) {
        match cmd {
            SchedulerCmd::Submit {
                request,
                priority,
                ack,
            } => {
                let (completion, pending) = PendingReply::channel();
                let entry = chunk::plan(request, priority, completion, &self.config);

                let submission = match self.queue.push(entry) {
                    Enqueue::Queued => {
                        self.stats.write().submitted += 1;
                        Submission::Queued(pending)
                    }
                    Enqueue::Coalesced(dropped) => {
                        debug!(
                            "중복 요청 폐기: device={} {} address={}",
                            dropped.request.device,
                            dropped.request.kind,
                            dropped.request.args.address()
                        );
                        self.stats.write().coalesced += 1;
                        Submission::Coalesced
                    }
                };
                let _ = ack.send(submission);
            }

            SchedulerCmd::Open { done } => {
                let _ = done.send(self.open_channel().await);
            }

            SchedulerCmd::Close { done } => {
                let _ = done.send(self.close_channel().await);
            }
        }
    }

    async fn open_channel(&mut self) -> Result<()> {
        if self.open.load(Ordering::SeqCst) {
            return Ok(());
        }

        self.transport.open().await?;
        self.transport.set_timeout(self.config.timeout());

        // 첫 틱은 한 주기 뒤
        let period = self.config.dispatch_interval();
        self.ticker = Some(time::interval_at(time::Instant::now() + period, period));
        self.open.store(true, Ordering::SeqCst);

        info!(
            "채널 열림: interval={}ms, timeout={}ms, retry={}, chunk={}, 대기 {}건",
            self.config.dispatch_interval_ms,
            self.config.timeout_ms,
            self.config.retry_count,
            self.config.max_chunk_size,
            self.queue.len()
        );
        Ok(())
    }

    async fn close_channel(&mut self) -> Result<()> {
        if !self.open.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        // 타이머를 먼저 멈춘 뒤 채널을 닫는다
        self.ticker = None;
        self.tick_deferred = false;

        if let Some(flight) = self.in_flight.take() {
            debug!(
                "진행 중 전송 폐기: device={} {} address={}",
                flight.entry.request.device,
                flight.entry.request.kind,
                flight.entry.request.args.address()
            );
        }

        self.transport.close().await?;
        info!("채널 닫힘: 대기 {}건 유지", self.queue.len());
        Ok(())
    }

    fn on_tick(&mut self) {
        if !self.open.load(Ordering::SeqCst) {
            return;
        }

        if self.in_flight.is_some() {
            // 완료 처리 직후 한 번 디스패치
            self.tick_deferred = true;
            self.stats.write().deferred_ticks += 1;
            trace!("전송 중이므로 틱 연기");
            return;
        }

        self.dispatch_next();
    }

    fn dispatch_next(&mut self) {
        let Some(entry) = self.queue.pop() else {
            return;
        };

        let outgoing = entry.outgoing(&self.config);
        debug!(
            "전송: device={} {} address={} count={} priority={} retry_budget={}",
            outgoing.device,
            outgoing.kind,
            outgoing.args.address(),
            outgoing.args.count(),
            entry.priority,
            entry.retry_budget
        );

        let transport = Arc::clone(&self.transport);
        let call: TransferCall =
            Box::pin(async move { transport::transfer(transport.as_ref(), outgoing).await });

        self.in_flight = Some(InFlight { entry, call });
        self.stats.write().dispatched += 1;
    }

    fn on_completed(&mut self, outcome: Result<TransferOutput>) {
        let Some(flight) = self.in_flight.take() else {
            return;
        };

        if let Err(e) = &outcome {
            warn!(
                "전송 실패: device={} {} address={} (남은 재시도 {}): {}",
                flight.entry.request.device,
                flight.entry.request.kind,
                flight.entry.request.args.address(),
                flight.entry.retry_budget,
                e
            );
            self.stats.write().last_error_time = Some(Instant::now());
        }

        match flight.entry.advance(outcome, &self.config) {
            Step::Retry(entry) => {
                self.stats.write().retries += 1;
                self.reenqueue(entry);
            }
            Step::Next(entry) => {
                self.stats.write().chunks += 1;
                self.reenqueue(entry);
            }
            Step::Complete { completion, result } => {
                {
                    let mut stats = self.stats.write();
                    match &result {
                        Ok(_) => stats.completed += 1,
                        Err(_) => stats.failed += 1,
                    }
                }
                if let Err(e) = &result {
                    warn!("요청 실패 (재시도 소진): {}", e);
                }
                let _ = completion.send(result);
            }
        }

        if self.tick_deferred && self.open.load(Ordering::SeqCst) {
            self.tick_deferred = false;
            self.dispatch_next();
        }
    }

    /// 재시도/다음 청크 재진입 (중복 검사 포함)
    fn reenqueue(&mut self, entry: Entry) {
        if let Enqueue::Coalesced(dropped) = self.queue.push(entry) {
            debug!(
                "재진입 요청이 대기 중인 동일 요청과 겹쳐 폐기: device={} {} address={}",
                dropped.request.device,
                dropped.request.kind,
                dropped.request.args.address()
            );
            self.stats.write().coalesced += 1;
            let _ = dropped.completion.send(Err(Error::RequestDropped));
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn in_flight_done(slot: &mut Option<InFlight>) -> Result<TransferOutput> {
    match slot {
        Some(flight) => flight.call.as_mut().await,
        None => std::future::pending().await,
    }
}

/// 스케줄러 핸들
///
/// 복제해서 여러 곳에서 공유할 수 있다. 마지막 핸들이 사라지면 루프가 끝나고
/// 대기 중인 요청은 `Error::RequestDropped`로 끝난다.
#[derive(Clone)]
pub struct Scheduler {
    cmd_tx: mpsc::Sender<SchedulerCmd>,
    config: Arc<Config>,
    stats: Arc<RwLock<SchedulerStats>>,
    open: Arc<AtomicBool>,
}

impl Scheduler {
    /// 스케줄러 생성 및 루프 시작 (tokio 런타임 안에서 호출)
    ///
    /// 채널은 닫힌 상태로 시작한다. 닫힌 동안 들어온 요청은 큐에 쌓였다가
    /// `open` 이후 전송된다.
    pub fn start<T: Transport>(config: Config, transport: Arc<T>) -> Result<Self> {
        config.validate()?;

        let (cmd_tx, cmd_rx) = mpsc::channel(config.command_capacity);
        let stats = Arc::new(RwLock::new(SchedulerStats::new()));
        let open = Arc::new(AtomicBool::new(false));

        let inner = SchedulerLoop {
            config: config.clone(),
            transport,
            queue: PendingQueue::new(),
            in_flight: None,
            ticker: None,
            tick_deferred: false,
            open: open.clone(),
            stats: stats.clone(),
            cmd_rx,
        };
        tokio::spawn(inner.run());

        Ok(Self {
            cmd_tx,
            config: Arc::new(config),
            stats,
            open,
        })
    }

    /// 채널 열기 + 디스패치 타이머 시작
    pub async fn open(&self) -> Result<()> {
        let (done, rx) = oneshot::channel();
        self.command(SchedulerCmd::Open { done }).await?;
        rx.await.map_err(|_| Error::SchedulerStopped)?
    }

    /// 디스패치 타이머 정지 + 채널 닫기
    ///
    /// 진행 중이던 전송은 버려지고 (`Error::RequestDropped`), 대기 중인 요청은
    /// 다시 열릴 때까지 큐에 남는다.
    pub async fn close(&self) -> Result<()> {
        let (done, rx) = oneshot::channel();
        self.command(SchedulerCmd::Close { done }).await?;
        rx.await.map_err(|_| Error::SchedulerStopped)?
    }

    /// 요청 제출
    ///
    /// 같은 (장치, 종류, 인자) 요청이 이미 대기 중이면 `Submission::Coalesced`를
    /// 돌려주고 이 요청의 결과는 통지되지 않는다.
    pub async fn send(
        &self,
        device: DeviceId,
        kind: FunctionKind,
        address: u16,
        payload: Payload,
        priority: Priority,
    ) -> Result<Submission> {
        let request = LogicalRequest::new(device, kind, address, payload)?;
        self.submit(request, priority).await
    }

    /// 검증된 요청 제출
    pub async fn submit(&self, request: LogicalRequest, priority: Priority) -> Result<Submission> {
        let (ack, rx) = oneshot::channel();
        self.command(SchedulerCmd::Submit {
            request,
            priority,
            ack,
        })
        .await?;
        rx.await.map_err(|_| Error::SchedulerStopped)
    }

    /// 장치 핸들 생성
    pub fn device(&self, id: DeviceId) -> DeviceHandle {
        DeviceHandle::new(id, self.clone(), None)
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 통계 스냅샷
    pub fn stats(&self) -> SchedulerStats {
        self.stats.read().clone()
    }

    async fn command(&self, cmd: SchedulerCmd) -> Result<()> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| Error::SchedulerStopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Reply;
    use crate::sim::{DeviceMemory, SimulatedBus};
    use std::time::Duration;

    fn bus() -> Arc<SimulatedBus> {
        Arc::new(SimulatedBus::new().with_device(1, DeviceMemory::with_pattern(256)))
    }

    async fn started(config: Config, bus: &Arc<SimulatedBus>) -> Scheduler {
        let scheduler = Scheduler::start(config, bus.clone()).unwrap();
        scheduler.open().await.unwrap();
        scheduler
    }

    async fn read(scheduler: &Scheduler, address: u16, quantity: u16, priority: Priority) -> Submission {
        scheduler
            .send(
                1,
                FunctionKind::ReadHoldingRegisters,
                address,
                Payload::Quantity(quantity),
                priority,
            )
            .await
            .unwrap()
    }

    fn queued(submission: Submission) -> PendingReply {
        submission.into_pending().expect("큐에 들어가야 함")
    }

    fn call_windows(bus: &SimulatedBus) -> Vec<(u16, usize)> {
        bus.calls().iter().map(|c| (c.address, c.count)).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_transfer_in_flight() {
        // 응답 지연이 디스패치 주기보다 길어도 동시 호출은 하나
        let bus = Arc::new(
            SimulatedBus::new()
                .with_device(1, DeviceMemory::with_pattern(256))
                .with_latency(Duration::from_millis(300)),
        );
        let scheduler = started(Config::default(), &bus).await;

        let mut pending = Vec::new();
        for i in 0..5 {
            pending.push(queued(read(&scheduler, i * 10, 2, 1).await));
        }
        for reply in pending {
            reply.await.unwrap();
        }

        assert_eq!(bus.call_count(), 5);
        assert_eq!(bus.max_concurrent_calls(), 1);
        assert!(scheduler.stats().deferred_ticks > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_priority_order() {
        let bus = bus();
        let scheduler = Scheduler::start(Config::default(), bus.clone()).unwrap();

        // 닫힌 상태에서 쌓아두고 연다
        let p3 = queued(read(&scheduler, 30, 1, 3).await);
        let p1 = queued(read(&scheduler, 10, 1, 1).await);
        let p2 = queued(read(&scheduler, 20, 1, 2).await);
        let e1 = queued(read(&scheduler, 40, 1, 5).await);
        let e2 = queued(read(&scheduler, 50, 1, 5).await);
        scheduler.open().await.unwrap();

        for reply in [p3, p1, p2, e1, e2] {
            reply.await.unwrap();
        }

        let order: Vec<u16> = bus.calls().iter().map(|c| c.address).collect();
        assert_eq!(order, vec![10, 20, 30, 40, 50]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chunked_read() {
        let bus = bus();
        let scheduler = started(Config::default(), &bus).await;

        let reply = queued(read(&scheduler, 100, 10, 1).await).await.unwrap();

        assert_eq!(call_windows(&bus), vec![(100, 4), (104, 4), (108, 2)]);
        assert_eq!(reply, Reply::Values((100..110).collect()));
        assert_eq!(scheduler.stats().chunks, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_budget_exhausted() {
        let bus = bus();
        let config = Config {
            retry_count: 3,
            ..Config::default()
        };
        let scheduler = started(config, &bus).await;

        // 없는 장치 -> 매번 타임아웃
        let submission = scheduler
            .send(9, FunctionKind::ReadCoils, 0, Payload::Quantity(2), 1)
            .await
            .unwrap();
        let err = queued(submission).await.unwrap_err();

        assert!(matches!(err, Error::Timeout { device: 9, function: 1 }));
        assert_eq!(bus.call_count(), 3);

        let stats = scheduler.stats();
        assert_eq!(stats.retries, 2);
        assert_eq!(stats.failed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_value_unwrapped() {
        let bus = bus();
        let scheduler = started(Config::default(), &bus).await;

        let reply = queued(read(&scheduler, 5, 1, 1).await).await.unwrap();
        assert_eq!(reply, Reply::Value(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_coalesced() {
        let bus = bus();
        let scheduler = started(Config::default(), &bus).await;

        let first = read(&scheduler, 7, 3, 1).await;
        let second = read(&scheduler, 7, 3, 2).await;
        assert!(second.is_coalesced());

        queued(first).await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(bus.call_count(), 1);
        let stats = scheduler.stats();
        assert_eq!((stats.submitted, stats.coalesced, stats.completed), (1, 1, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_stops_dispatch() {
        let bus = bus();
        let scheduler = started(Config::default(), &bus).await;

        queued(read(&scheduler, 0, 1, 1).await).await.unwrap();
        scheduler.close().await.unwrap();
        assert!(!scheduler.is_open());

        let pending = queued(read(&scheduler, 1, 1, 1).await);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(bus.call_count(), 1);

        // 다시 열면 남아 있던 요청이 전송됨
        scheduler.open().await.unwrap();
        assert_eq!(pending.await.unwrap(), Reply::Value(1));
        assert_eq!(bus.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_drops_in_flight() {
        let bus = Arc::new(
            SimulatedBus::new()
                .with_device(1, DeviceMemory::with_pattern(16))
                .with_latency(Duration::from_millis(300)),
        );
        let scheduler = started(Config::default(), &bus).await;

        let pending = queued(read(&scheduler, 0, 2, 1).await);
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(bus.call_count(), 1);

        scheduler.close().await.unwrap();
        assert!(matches!(pending.await, Err(Error::RequestDropped)));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(bus.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_reuses_sub_request() {
        let bus = bus();
        let scheduler = started(Config::default(), &bus).await;
        bus.fail_next(1);

        let reply = queued(read(&scheduler, 0, 10, 1).await).await.unwrap();

        assert_eq!(call_windows(&bus), vec![(0, 4), (0, 4), (4, 4), (8, 2)]);
        assert_eq!(reply, Reply::Values((0..10).collect()));
        assert_eq!(scheduler.stats().retries, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chunked_write() {
        let bus = bus();
        let scheduler = started(Config::default(), &bus).await;
        let values: Vec<u16> = (1000..1010).collect();

        let submission = scheduler
            .send(
                1,
                FunctionKind::WriteMultipleRegisters,
                50,
                Payload::Values(values.clone()),
                1,
            )
            .await
            .unwrap();
        let reply = queued(submission).await.unwrap();

        assert_eq!(call_windows(&bus), vec![(50, 4), (54, 4), (58, 2)]);
        assert_eq!(reply, Reply::Values(vec![4, 4, 2]));
        let memory = bus.snapshot(1).unwrap();
        assert_eq!(&memory.holding_registers[50..60], values.as_slice());
    }

    #[tokio::test(start_paused = true)]
    async fn test_coalesced_continuation_reports_dropped() {
        let bus = bus();
        let scheduler = started(Config::default(), &bus).await;

        // 두 번째 청크와 같은 요청이 이미 대기 중
        let whole = queued(read(&scheduler, 0, 8, 1).await);
        let tail = queued(read(&scheduler, 4, 4, 1).await);

        assert!(matches!(whole.await, Err(Error::RequestDropped)));
        assert_eq!(tail.await.unwrap(), Reply::Values(vec![4, 5, 6, 7]));
        assert_eq!(call_windows(&bus), vec![(0, 4), (4, 4)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_coalesced_retry_reports_dropped() {
        let bus = bus();
        let scheduler = started(Config::default(), &bus).await;
        bus.fail_next(1);

        let first = queued(read(&scheduler, 0, 2, 1).await);

        // 첫 전송이 진행 중일 때 같은 요청 제출
        tokio::time::sleep(Duration::from_millis(205)).await;
        assert_eq!(bus.call_count(), 1);
        let second = queued(read(&scheduler, 0, 2, 1).await);

        assert!(matches!(first.await, Err(Error::RequestDropped)));
        assert_eq!(second.await.unwrap(), Reply::Values(vec![0, 1]));
        assert_eq!(bus.call_count(), 2);
        assert_eq!(scheduler.stats().coalesced, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_chunk_exhausts_retries_on_read() {
        let bus = Arc::new(SimulatedBus::new().with_device(1, DeviceMemory::with_pattern(6)));
        let scheduler = started(Config::default(), &bus).await;

        let err = queued(read(&scheduler, 0, 8, 1).await).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Exception { device: 1, function: 3, code: 0x02 }
        ));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(call_windows(&bus), vec![(0, 4), (4, 4), (4, 4), (4, 4)]);

        let stats = scheduler.stats();
        assert_eq!((stats.completed, stats.failed), (0, 1));
        assert_eq!(stats.retries, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_chunk_exhausts_retries_on_write() {
        let bus = Arc::new(SimulatedBus::new().with_device(1, DeviceMemory::with_pattern(6)));
        let scheduler = started(Config::default(), &bus).await;
        let values: Vec<u16> = (100..108).collect();

        let submission = scheduler
            .send(
                1,
                FunctionKind::WriteMultipleRegisters,
                0,
                Payload::Values(values.clone()),
                1,
            )
            .await
            .unwrap();
        let err = queued(submission).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Exception { device: 1, function: 0x10, code: 0x02 }
        ));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(call_windows(&bus), vec![(0, 4), (4, 4), (4, 4), (4, 4)]);

        // 첫 청크만 반영됨
        let memory = bus.snapshot(1).unwrap();
        assert_eq!(&memory.holding_registers[..4], &values[..4]);
        assert_eq!(&memory.holding_registers[4..], &[4, 5]);

        let stats = scheduler.stats();
        assert_eq!((stats.completed, stats.failed), (0, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_request_rejected() {
        let bus = bus();
        let scheduler = started(Config::default(), &bus).await;

        let result = scheduler
            .send(1, FunctionKind::WriteMultipleCoils, 0, Payload::Quantity(4), 1)
            .await;
        assert!(matches!(result, Err(Error::InvalidRequest { .. })));
        assert_eq!(scheduler.stats().submitted, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_scheduler_drops_pending() {
        let bus = bus();
        let scheduler = Scheduler::start(Config::default(), bus.clone()).unwrap();
        let pending = queued(read(&scheduler, 0, 1, 1).await);

        drop(scheduler);
        assert!(matches!(pending.await, Err(Error::RequestDropped)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_config() {
        let config = Config {
            retry_count: 0,
            ..Config::default()
        };
        assert!(matches!(
            Scheduler::start(config, bus()),
            Err(Error::InvalidConfig { .. })
        ));
    }
}
