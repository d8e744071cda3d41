use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fusebox::{BreakerBuilder, CircuitBreaker, CountBreaker, RatioBreaker};
use std::error::Error;
use std::fmt;
use std::time::Duration;

// Custom error type that implements Error trait
#[derive(Debug)]
struct BenchError(String);

impl BenchError {
    fn new(msg: &str) -> Self {
        BenchError(msg.to_string())
    }
}

impl fmt::Display for BenchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Benchmark error: {}", self.0)
    }
}

impl Error for BenchError {}

fn successful_operation() -> Result<(), BenchError> {
    Ok(())
}

fn failing_operation() -> Result<(), BenchError> {
    Err(BenchError::new("Simulated failure"))
}

fn count_breaker(threshold: u32) -> CircuitBreaker<CountBreaker<BenchError>, BenchError> {
    BreakerBuilder::new()
        .handle_all()
        .threshold(threshold)
        .break_duration(Duration::from_secs(30))
        .build()
        .expect("valid configuration")
}

fn ratio_breaker() -> CircuitBreaker<RatioBreaker<BenchError>, BenchError> {
    BreakerBuilder::new()
        .handle_all()
        .min_success_ratio(50.0)
        .break_duration(Duration::from_secs(30))
        .half_life(Duration::from_secs(30))
        .build_ratio()
        .expect("valid configuration")
}

fn bench_count_breaker_closed(c: &mut Criterion) {
    let breaker = count_breaker(5);

    c.bench_function("count_breaker_closed_success", |b| {
        b.iter(|| black_box(breaker.call(successful_operation)));
    });
}

fn bench_ratio_breaker_closed(c: &mut Criterion) {
    let breaker = ratio_breaker();

    c.bench_function("ratio_breaker_closed_success", |b| {
        b.iter(|| black_box(breaker.call(successful_operation)));
    });
}

fn bench_count_breaker_transition(c: &mut Criterion) {
    let breaker = count_breaker(5);

    c.bench_function("count_breaker_transition", |b| {
        b.iter_custom(|iters| {
            let start = std::time::Instant::now();

            for _ in 0..iters {
                // Reset to ensure a consistent starting point
                breaker.reset().unwrap();

                // Trip the breaker
                for _ in 0..5 {
                    let _ = black_box(breaker.call(failing_operation));
                }

                // One open-circuit rejection
                let _ = black_box(breaker.call(successful_operation));
            }

            start.elapsed()
        });
    });
}

fn bench_count_breaker_concurrent(c: &mut Criterion) {
    use std::sync::{Arc, Barrier};
    use std::thread;

    // High threshold to avoid tripping
    let breaker = Arc::new(count_breaker(u32::MAX));

    const THREAD_COUNT: usize = 4;
    const ITERATIONS_PER_THREAD: usize = 1000;

    c.bench_function("count_breaker_concurrent", |b| {
        b.iter(|| {
            let barrier = Arc::new(Barrier::new(THREAD_COUNT + 1));
            let mut handles = Vec::with_capacity(THREAD_COUNT);

            for _ in 0..THREAD_COUNT {
                let thread_breaker = Arc::clone(&breaker);
                let thread_barrier = Arc::clone(&barrier);

                handles.push(thread::spawn(move || {
                    thread_barrier.wait();
                    for _ in 0..ITERATIONS_PER_THREAD {
                        let _ = black_box(thread_breaker.call(successful_operation));
                    }
                }));
            }

            // Start all threads simultaneously
            barrier.wait();

            // Wait for all threads to complete
            for handle in handles {
                handle.join().unwrap();
            }
        });
    });
}

criterion_group!(
    benches,
    bench_count_breaker_closed,
    bench_ratio_breaker_closed,
    bench_count_breaker_transition,
    bench_count_breaker_concurrent
);
criterion_main!(benches);
