use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mbsched::chunk::{self, QueueEntry, Step};
use mbsched::{Config, FunctionKind, LogicalRequest, Payload, TransferOutput};

const QUANTITIES: &[u16] = &[4, 40, 125, 1000];
const CHUNK_SIZES: &[u16] = &[4, 16, 125];

fn read_request(quantity: u16) -> LogicalRequest {
    let kind = if quantity > 125 {
        FunctionKind::ReadCoils
    } else {
        FunctionKind::ReadHoldingRegisters
    };
    LogicalRequest::new(1, kind, 0, Payload::Quantity(quantity)).unwrap()
}

/// 서브 요청 전송을 즉시 성공시키며 논리 요청 하나를 끝까지 진행
fn drive(mut entry: QueueEntry<()>, config: &Config) -> usize {
    let mut steps = 0;
    loop {
        let outgoing = entry.outgoing(config);
        let data = vec![0u16; outgoing.args.count()];
        steps += 1;
        match entry.advance(Ok(TransferOutput::Data(data)), config) {
            Step::Next(next) | Step::Retry(next) => entry = next,
            Step::Complete { result, .. } => {
                black_box(result.unwrap());
                return steps;
            }
        }
    }
}

fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan");
    let config = Config::default();

    for &quantity in QUANTITIES {
        group.bench_with_input(BenchmarkId::new("read", quantity), &quantity, |b, &q| {
            let request = read_request(q);
            b.iter(|| chunk::plan(black_box(request.clone()), 1, (), &config));
        });
    }
    group.finish();
}

fn bench_drive(c: &mut Criterion) {
    let mut group = c.benchmark_group("drive_to_completion");

    for &chunk_size in CHUNK_SIZES {
        let config = Config {
            max_chunk_size: chunk_size,
            ..Config::default()
        };
        for &quantity in QUANTITIES {
            group.throughput(Throughput::Elements(quantity as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("chunk_{}", chunk_size), quantity),
                &quantity,
                |b, &q| {
                    let request = read_request(q);
                    b.iter(|| drive(chunk::plan(request.clone(), 1, (), &config), &config));
                },
            );
        }
    }
    group.finish();
}

fn bench_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten");

    for &chunks in &[1usize, 10, 100] {
        let buffer: Vec<TransferOutput> = (0..chunks)
            .map(|i| TransferOutput::Data(vec![i as u16; 8]))
            .collect();
        group.throughput(Throughput::Elements((chunks * 4) as u64));
        group.bench_with_input(BenchmarkId::new("data", chunks), &buffer, |b, buffer| {
            b.iter(|| chunk::flatten(black_box(buffer), 4));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_plan, bench_drive, bench_flatten);
criterion_main!(benches);
