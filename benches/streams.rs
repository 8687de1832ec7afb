#![allow(unused)]
extern crate annostream;

use annostream::{AnnotatedStream, ByteOrder, DummyStream, MemoryStream, Stream, StreamExt};
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

const VALUES: u64 = 4096;

/// Raw scalar throughput of the memory backend in both byte orders.
fn bench_memory_scalars(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_scalars");
    group.throughput(Throughput::Bytes(VALUES * 8));

    for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
        group.bench_function(format!("write_i64_{order}"), |b| {
            b.iter(|| {
                let mut stream = MemoryStream::default();
                stream.set_byte_order(order);
                for value in 0..VALUES as i64 {
                    stream.write(black_box(&value)).unwrap();
                }
                black_box(stream)
            });
        });

        let mut source = MemoryStream::default();
        source.set_byte_order(order);
        for value in 0..VALUES as i64 {
            source.write(&value).unwrap();
        }
        group.bench_function(format!("read_i64_{order}"), |b| {
            b.iter(|| {
                source.seek(0).unwrap();
                let mut sum = 0_i64;
                for _ in 0..VALUES {
                    sum = sum.wrapping_add(source.read::<i64>().unwrap());
                }
                black_box(sum)
            });
        });
    }
    group.finish();
}

fn populate<S: Stream>(annotated: &mut AnnotatedStream<S>) {
    for index in 0..256_i64 {
        annotated.push(&format!("node{index}")).unwrap();
        annotated.set("id", &index).unwrap();
        annotated.set("name", &format!("object {index}")).unwrap();
        annotated.set("visible", &(index % 2 == 0)).unwrap();
        annotated.pop().unwrap();
    }
}

/// Named writes, table of contents parsing and lookups.
fn bench_annotated(c: &mut Criterion) {
    let mut group = c.benchmark_group("annotated");

    group.bench_function("write_and_close", |b| {
        b.iter(|| {
            let mut writer = AnnotatedStream::new(MemoryStream::default(), true).unwrap();
            populate(&mut writer);
            black_box(writer.into_inner().unwrap())
        });
    });

    group.bench_function("dry_run_size", |b| {
        b.iter(|| {
            let mut writer = AnnotatedStream::new(DummyStream::new(), true).unwrap();
            populate(&mut writer);
            writer.close().unwrap();
            black_box(writer.size())
        });
    });

    let mut writer = AnnotatedStream::new(MemoryStream::default(), true).unwrap();
    populate(&mut writer);
    let bytes = writer.into_inner().unwrap().into_inner();
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("open_and_lookup", |b| {
        b.iter(|| {
            let stream = MemoryStream::from_vec(black_box(bytes.clone()));
            let mut reader = AnnotatedStream::new(stream, true).unwrap();
            reader.push("node128").unwrap();
            black_box(reader.get::<String>("name").unwrap())
        });
    });
    group.finish();
}

criterion_group!(benches, bench_memory_scalars, bench_annotated);
criterion_main!(benches);
