//! Prime-test workload driving a pool through a full shutdown/re-init cycle
//!
//! 1. Initializes the pool and submits ten times its capacity in jobs
//! 2. Shuts down one second later, discarding whatever is still queued
//! 3. Re-initializes, submits 50 more jobs and polls until the queue is empty
//! 4. Shuts down a final time
//!
//! Run with: RUST_LOG=info cargo run --example prime_demo

use rand::Rng;
use rust_pool_monitor::prelude::*;
use std::thread;
use std::time::Duration;

const POOL_SIZE: usize = 8;
const CAPACITY: usize = 100;

fn is_prime(x: u32) -> bool {
    if x <= 1 {
        return false;
    }
    for p in [2, 3, 5] {
        if x % p == 0 {
            return x == p;
        }
    }

    let mut d = 7;
    while d * d <= x {
        if x % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

fn print_prime(x: u32) {
    if is_prime(x) {
        println!("print_prime: {} is prime", x);
    } else {
        println!("print_prime: {} is not prime", x);
    }
}

/// x is a twin prime if x - 2 or x + 2 is also prime
fn print_twin_prime(x: u32) {
    if !is_prime(x) {
        println!("print_twin_prime: {} is not prime", x);
    } else if x >= 2 && is_prime(x - 2) {
        println!("print_twin_prime: {} is prime twin of {}", x, x - 2);
    } else if is_prime(x + 2) {
        println!("print_twin_prime: {} is prime twin of {}", x, x + 2);
    } else {
        println!("print_twin_prime: {} is not prime twin", x);
    }
}

fn submit_jobs(pool: &ThreadPool, n_jobs: usize) {
    let mut rng = rand::thread_rng();
    for _ in 0..n_jobs {
        let x = rng.gen_range(0..1_000_000);
        println!("main: Submitting job with x={}", x);

        let result = if rng.gen_bool(0.5) {
            pool.execute_with_arg(print_prime, x)
        } else {
            pool.execute_with_arg(print_twin_prime, x)
        };

        if let Err(e) = result {
            println!("main: Failed to submit job for {}: {}", x, e);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    println!("main: Start");

    let config = ThreadPoolConfig::new(POOL_SIZE, CAPACITY).with_thread_name_prefix("prime");
    let pool = ThreadPool::with_name("prime-pool");
    pool.init_with_config(config.clone())?;

    submit_jobs(&pool, 10 * CAPACITY);

    thread::sleep(Duration::from_secs(1));

    println!(
        "main: Attempting to shutdown pool. Current queue size: {}",
        pool.queue_size()
    );
    pool.shutdown()?;
    println!("main: Pool shutdown complete");

    println!("main: Attempting to reinitialize pool");
    pool.init_with_config(config)?;

    println!("main: Pool reinitialized successfully. Attempting to submit jobs");
    submit_jobs(&pool, 50);

    println!("main: Waiting for all jobs to finish");
    while pool.queue_size() > 0 {
        thread::sleep(Duration::from_millis(100));
    }

    println!(
        "main: All jobs dequeued. Attempting to shutdown pool. Current queue size: {}",
        pool.queue_size()
    );
    pool.shutdown()?;

    let stats = pool.stats();
    println!(
        "main: Finish ({} submitted, {} rejected, {} discarded, {} executed)",
        stats.jobs_submitted, stats.jobs_rejected, stats.jobs_discarded, stats.jobs_executed
    );
    Ok(())
}
