//! mbsched 시뮬레이터
//!
//! 가상 버스에 여러 장치를 붙이고 무작위 요청을 스케줄러로 흘려보낸다.
//! - 우선순위/중복 제거/청크 분할/재시도 동작을 로그로 확인
//! - 종료 시 통계 요약 출력
//!
//! 사용법:
//!   cargo run --release --bin mbsched-sim -- [OPTIONS]
//!
//! 예시:
//!   # 기본 실행
//!   cargo run --release --bin mbsched-sim
//!
//!   # 장애 20% + 느린 장치
//!   cargo run --release --bin mbsched-sim -- --fault-rate 0.2 --latency 150 -v

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use mbsched::function::KindShape;
use mbsched::{
    Config, DeviceMemory, FunctionKind, Payload, PendingReply, Scheduler, SimulatedBus,
};

/// 장치당 테이블 크기
const DEVICE_TABLE_SIZE: usize = 256;

/// 요청당 최대 주소/값 수
const MAX_REQUEST_SPAN: u16 = 12;

/// 시뮬레이터 설정
struct SimConfig {
    devices: u8,
    requests: usize,
    latency_ms: u64,
    fault_rate: f64,
    verbose: bool,
    config: Config,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            devices: 3,
            requests: 20,
            latency_ms: 20,
            fault_rate: 0.0,
            verbose: false,
            config: Config::default(),
        }
    }
}

fn parse_args() -> SimConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = SimConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--interval" => {
                if i + 1 < args.len() {
                    config.config.dispatch_interval_ms =
                        args[i + 1].parse().expect("유효한 숫자 필요");
                    i += 1;
                }
            }
            "--timeout" => {
                if i + 1 < args.len() {
                    config.config.timeout_ms = args[i + 1].parse().expect("유효한 숫자 필요");
                    i += 1;
                }
            }
            "--retries" => {
                if i + 1 < args.len() {
                    config.config.retry_count = args[i + 1].parse().expect("유효한 숫자 필요");
                    i += 1;
                }
            }
            "--chunk" => {
                if i + 1 < args.len() {
                    config.config.max_chunk_size = args[i + 1].parse().expect("유효한 숫자 필요");
                    i += 1;
                }
            }
            "--devices" | "-d" => {
                if i + 1 < args.len() {
                    config.devices = match parse_device_count(&args[i + 1]) {
                        Ok(devices) => devices,
                        Err(reason) => {
                            eprintln!("{}", reason);
                            std::process::exit(2);
                        }
                    };
                    i += 1;
                }
            }
            "--requests" | "-n" => {
                if i + 1 < args.len() {
                    config.requests = args[i + 1].parse().expect("유효한 숫자 필요");
                    i += 1;
                }
            }
            "--latency" => {
                if i + 1 < args.len() {
                    config.latency_ms = args[i + 1].parse().expect("유효한 숫자 필요");
                    i += 1;
                }
            }
            "--fault-rate" => {
                if i + 1 < args.len() {
                    config.fault_rate = args[i + 1].parse().expect("유효한 숫자 필요");
                    i += 1;
                }
            }
            "--verbose" | "-v" => {
                config.verbose = true;
            }
            "--help" | "-h" => {
                println!(
                    r#"mbsched-sim - 필드버스 요청 스케줄러 시뮬레이터

가상 버스에 장치를 붙이고 무작위 읽기/쓰기 요청을 스케줄러로 보낸다.

사용법:
  cargo run --release --bin mbsched-sim -- [OPTIONS]

옵션:
  --interval <MS>         디스패치 주기 (기본: 200)
  --timeout <MS>          전송 타임아웃 (기본: 500)
  --retries <N>           서브 요청당 시도 횟수 (기본: 3)
  --chunk <N>             최대 청크 크기 (기본: 4)
  -d, --devices <N>       장치 수 1~247 (기본: 3)
  -n, --requests <N>      보낼 요청 수 (기본: 20)
  --latency <MS>          장치 응답 지연 (기본: 20)
  --fault-rate <RATIO>    무작위 장애 비율 0.0~1.0 (기본: 0.0)
  -v, --verbose           디스패치 단위 로그 출력
  -h, --help              이 도움말 출력

예시:
  # 빠른 주기 + 큰 청크
  cargo run --release --bin mbsched-sim -- --interval 20 --chunk 16

  # 불안정한 버스
  cargo run --release --bin mbsched-sim -- --fault-rate 0.3 --retries 5 -v
"#
                );
                std::process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    config
}

/// 장치 수 (1 ~ 247)
fn parse_device_count(value: &str) -> Result<u8, String> {
    match value.parse::<u8>() {
        Ok(devices) if (1..=247).contains(&devices) => Ok(devices),
        _ => Err(format!("--devices는 1~247 사이 숫자여야 함: {}", value)),
    }
}

/// 무작위 요청 인자 생성
fn random_request(rng: &mut impl Rng, devices: u8) -> (u8, FunctionKind, u16, Payload, i32) {
    let device = rng.gen_range(1..=devices);
    let kind = FunctionKind::ALL[rng.gen_range(0..FunctionKind::ALL.len())];
    let span = rng.gen_range(1..=MAX_REQUEST_SPAN);
    let address = rng.gen_range(0..DEVICE_TABLE_SIZE as u16 - span);
    let priority = rng.gen_range(0..4);

    let payload = match kind.shape() {
        KindShape::RangeRead => Payload::Quantity(span),
        KindShape::SingleWrite if kind.is_bit_access() => Payload::Value(rng.gen_range(0..=1)),
        KindShape::SingleWrite => Payload::Value(rng.gen()),
        KindShape::RangeWrite if kind.is_bit_access() => {
            Payload::Values((0..span).map(|_| rng.gen_range(0..=1)).collect())
        }
        KindShape::RangeWrite => Payload::Values((0..span).map(|_| rng.gen()).collect()),
    };

    (device, kind, address, payload, priority)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sim_config = parse_args();

    // 로깅 설정
    let level = if sim_config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("mbsched-sim starting...");
    info!(
        "Devices: {}, Requests: {}, Latency: {}ms, Fault rate: {:.1}%",
        sim_config.devices,
        sim_config.requests,
        sim_config.latency_ms,
        sim_config.fault_rate * 100.0
    );

    let bus = Arc::new(SimulatedBus::new().with_latency(Duration::from_millis(sim_config.latency_ms)));
    for id in 1..=sim_config.devices {
        bus.add_device(id, DeviceMemory::with_pattern(DEVICE_TABLE_SIZE));
    }
    bus.set_failure_rate(sim_config.fault_rate);

    let scheduler = Scheduler::start(sim_config.config.clone(), bus.clone())?;
    scheduler.open().await?;

    // 요청 제출
    let mut pending: Vec<(String, PendingReply)> = Vec::new();
    let mut coalesced = 0usize;
    {
        let mut rng = rand::thread_rng();
        for _ in 0..sim_config.requests {
            let (device, kind, address, payload, priority) =
                random_request(&mut rng, sim_config.devices);
            let label = format!("device={} {} address={} priority={}", device, kind, address, priority);

            match scheduler.send(device, kind, address, payload, priority).await? {
                mbsched::Submission::Queued(reply) => pending.push((label, reply)),
                mbsched::Submission::Coalesced => {
                    coalesced += 1;
                    info!("Coalesced: {}", label);
                }
            }
        }
    }
    info!("Submitted {} requests ({} coalesced)", pending.len(), coalesced);

    // 결과 수집
    let mut failures = 0usize;
    for (label, reply) in pending {
        match reply.await {
            Ok(reply) => info!("OK   {} -> {:?}", label, reply),
            Err(e) => {
                failures += 1;
                warn!("FAIL {} -> {}", label, e);
            }
        }
    }

    scheduler.close().await?;

    info!("Finished: {} failures", failures);
    info!("Stats: {}", scheduler.stats().summary());
    info!("Bus calls: {}", bus.call_count());

    Ok(())
}
