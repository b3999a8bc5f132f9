use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use intrusive_list::{Link, Linked, List};
use rand::prelude::SliceRandom;
use rand::{SeedableRng, rngs::StdRng};
use std::collections::LinkedList;
use std::hint::black_box;
use std::pin::Pin;

const SIZES: [usize; 3] = [100, 1_000, 10_000];

#[derive(Linked)]
struct Entry {
    link: Link,
    value: u64,
}

fn entries(count: usize) -> Vec<Pin<Box<Entry>>> {
    (0..count as u64)
        .map(|value| {
            Box::pin(Entry {
                link: Link::new(),
                value,
            })
        })
        .collect()
}

// --- push_back then pop_front, intrusive vs std ---

fn push_pop_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("push_pop");

    for size in SIZES {
        group.throughput(Throughput::Elements(size as u64));

        let pool = entries(size);
        group.bench_function(BenchmarkId::new("intrusive", size), |b| {
            let mut list = Box::pin(List::<Entry>::new());
            b.iter(|| {
                for entry in &pool {
                    list.as_mut().push_back(entry.as_ref());
                }
                while let Some(entry) = list.as_mut().pop_front() {
                    black_box(unsafe { entry.as_ref() }.value);
                }
            });
        });

        group.bench_function(BenchmarkId::new("std", size), |b| {
            let mut list = LinkedList::new();
            b.iter(|| {
                for value in 0..size as u64 {
                    list.push_back(value);
                }
                while let Some(value) = list.pop_front() {
                    black_box(value);
                }
            });
        });
    }

    group.finish();
}

// --- removing elements in random order ---

fn unlink_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("unlink_random");

    for size in SIZES {
        group.throughput(Throughput::Elements(size as u64));

        let pool = entries(size);
        let mut order: Vec<usize> = (0..size).collect();
        order.shuffle(&mut StdRng::seed_from_u64(7));

        group.bench_function(BenchmarkId::new("intrusive", size), |b| {
            let mut list = Box::pin(List::<Entry>::new());
            b.iter_with_setup(
                || {
                    for entry in &pool {
                        list.as_mut().push_back(entry.as_ref());
                    }
                },
                |()| {
                    for &index in &order {
                        pool[index].link.unlink();
                    }
                    black_box(pool[order[0]].link.is_linked());
                },
            );
        });
    }

    group.finish();
}

// --- moving a whole list, O(1) vs O(1) ---

fn append_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("append");

    for size in SIZES {
        let pool = entries(size);
        group.bench_function(BenchmarkId::new("intrusive", size), |b| {
            let mut left = Box::pin(List::<Entry>::new());
            let mut right = Box::pin(List::<Entry>::new());
            for entry in &pool {
                right.as_mut().push_back(entry.as_ref());
            }
            b.iter(|| {
                left.as_mut().append(right.as_mut());
                right.as_mut().append(left.as_mut());
            });
        });

        group.bench_function(BenchmarkId::new("std", size), |b| {
            let mut left = LinkedList::new();
            let mut right: LinkedList<u64> = (0..size as u64).collect();
            b.iter(|| {
                left.append(&mut right);
                right.append(&mut left);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, push_pop_benchmark, unlink_benchmark, append_benchmark);
criterion_main!(benches);
