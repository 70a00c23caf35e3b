use std::hint::black_box;
use std::io::Cursor;

use criterion::{Criterion, criterion_group, criterion_main};
use futures::StreamExt;
use lumina_core::storage::StoredFile;
use lumina_core::streaming::{ByteRange, parse_range_header};

const FILE_SIZE: u64 = 8 * 1024 * 1024;

fn bench_range_parsing(c: &mut Criterion) {
    c.bench_function("parse_range_bounded", |b| {
        b.iter(|| parse_range_header(black_box("bytes=1048576-2097151"), FILE_SIZE))
    });

    c.bench_function("parse_range_open_ended", |b| {
        b.iter(|| parse_range_header(black_box("bytes=4194304-"), FILE_SIZE))
    });

    c.bench_function("parse_range_suffix", |b| {
        b.iter(|| parse_range_header(black_box("bytes=-65536"), FILE_SIZE))
    });
}

fn bench_cursor_reads(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let data = vec![7u8; FILE_SIZE as usize];

    for chunk_size in [16 * 1024, 64 * 1024, 256 * 1024] {
        c.bench_function(&format!("drain_1mib_window_chunk_{chunk_size}"), |b| {
            b.iter(|| {
                runtime.block_on(async {
                    let file = StoredFile::new(Box::new(Cursor::new(data.clone())), FILE_SIZE);
                    let mut cursor = file
                        .into_cursor(ByteRange::new(1024 * 1024, 2 * 1024 * 1024 - 1), chunk_size)
                        .await
                        .unwrap();
                    let mut total = 0usize;
                    while let Some(chunk) = cursor.next().await {
                        total += chunk.unwrap().len();
                    }
                    black_box(total)
                })
            });
        });
    }
}

criterion_group!(benches, bench_range_parsing, bench_cursor_reads);
criterion_main!(benches);
