//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Benchmarks for the session engine hot paths.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use telwire_session::{PolicyTable, SessionFlags, TelnetEvent, TelnetSession};

fn quiet_session() -> TelnetSession<impl FnMut(&mut TelnetEvent<'_>)> {
    TelnetSession::with_config(
        |event: &mut TelnetEvent<'_>| {
            black_box(event);
        },
        PolicyTable::new(),
        SessionFlags::default(),
    )
}

// ============================================================================
// Receive Benchmarks
// ============================================================================

fn bench_recv_plain_data(c: &mut Criterion) {
    let mut group = c.benchmark_group("recv_plain_data");

    for size in [64usize, 1024, 16384].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let mut session = quiet_session();
            let data = vec![b'x'; size];

            b.iter(|| {
                session.recv(black_box(&data)).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_recv_escaped_data(c: &mut Criterion) {
    let mut group = c.benchmark_group("recv_escaped_data");
    let size = 1024usize;
    group.throughput(Throughput::Bytes(size as u64));

    group.bench_function("every_fourth_byte_iac", |b| {
        let mut session = quiet_session();
        let data: Vec<u8> = (0..size)
            .flat_map(|i| {
                if i % 4 == 0 {
                    vec![0xFF, 0xFF]
                } else {
                    vec![(i % 251) as u8]
                }
            })
            .collect();

        b.iter(|| {
            session.recv(black_box(&data)).unwrap();
        });
    });

    group.finish();
}

fn bench_recv_subnegotiations(c: &mut Criterion) {
    let mut group = c.benchmark_group("recv_subnegotiation");

    group.bench_function("zmp_frame", |b| {
        let mut session = quiet_session();
        let frame = [
            &[0xFF, 0xFA, 0x5D][..],
            b"zmp.ping\0now\0",
            &[0xFF, 0xF0][..],
        ]
        .concat();

        b.iter(|| {
            session.recv(black_box(&frame)).unwrap();
        });
    });

    group.finish();
}

// ============================================================================
// Transmit Benchmarks
// ============================================================================

fn bench_send_data(c: &mut Criterion) {
    let mut group = c.benchmark_group("send_data");

    for size in [64usize, 1024, 16384].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let mut session = quiet_session();
            let data: Vec<u8> = (0..size).map(|i| (i % 256) as u8).collect();

            b.iter(|| {
                session.send_data(black_box(&data)).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_print(c: &mut Criterion) {
    let mut group = c.benchmark_group("print");

    group.bench_function("prompt_line", |b| {
        let mut session = quiet_session();

        b.iter(|| {
            session
                .print(format_args!("[{}hp {}mp] > \n", black_box(100), black_box(42)))
                .unwrap();
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_recv_plain_data,
    bench_recv_escaped_data,
    bench_recv_subnegotiations,
    bench_send_data,
    bench_print,
);
criterion_main!(benches);
