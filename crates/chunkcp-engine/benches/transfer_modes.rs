//! Throughput of the three transfer modes on an 8 MiB file

use chunkcp_engine::TransferCoordinator;
use chunkcp_types::{ChunkSize, TransferJob, TransferMode, WorkerCount};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tempfile::TempDir;

const FILE_SIZE: usize = 8 * 1024 * 1024;

fn bench_transfer_modes(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("source.bin");
    let data: Vec<u8> = (0..FILE_SIZE).map(|i| (i % 251) as u8).collect();
    std::fs::write(&source, &data).unwrap();

    let coordinator = TransferCoordinator::new();
    let mut group = c.benchmark_group("transfer_modes");
    group.throughput(Throughput::Bytes(FILE_SIZE as u64));
    group.sample_size(10);

    for mode in TransferMode::ALL {
        for workers in [2, 4] {
            if mode == TransferMode::Sequential && workers > 2 {
                continue;
            }

            let destination = temp_dir.path().join(format!("{}-{}.bin", mode.name(), workers));
            let job = TransferJob::new(&source, destination)
                .with_mode(mode)
                .with_workers(WorkerCount::new(workers).unwrap())
                .with_chunk_size(ChunkSize::new(256 * 1024).unwrap());

            group.bench_with_input(
                BenchmarkId::new(mode.name(), workers),
                &job,
                |b, job| {
                    b.to_async(&rt)
                        .iter(|| async { black_box(coordinator.transfer(job).await.unwrap()) });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_transfer_modes);
criterion_main!(benches);
