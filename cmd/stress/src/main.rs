//! Stress test - threads and sync primitives through the table
//!
//! Runs a frame loop in which a sync thread releases worker threads with a
//! broadcast and waits for all of them to report back, then hammers the
//! mutex and atomic slots.
//!
//! Usage: stress [workers] [frames]

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering};
use std::sync::OnceLock;

use osapi::{api, lap, os_dbg, os_log, CondHandle, MutexHandle};

/// Shared worker / sync state
///
/// Counters are atomics but only change while `sync_mutex` is held.
struct Stage {
    sync_mutex: MutexHandle,
    worker_cond: CondHandle,
    sync_cond: CondHandle,
    threads_running: AtomicI32,
    frame: AtomicU64,
    quit: AtomicBool,
    jobs: AtomicI32,
}

fn stage() -> &'static Stage {
    static STAGE: OnceLock<Stage> = OnceLock::new();
    STAGE.get_or_init(|| Stage {
        sync_mutex: api::mutex_new(),
        worker_cond: api::cond_new(),
        sync_cond: api::cond_new(),
        threads_running: AtomicI32::new(0),
        frame: AtomicU64::new(0),
        quit: AtomicBool::new(false),
        jobs: AtomicI32::new(0),
    })
}

fn worker(id: usize) -> usize {
    let s = stage();
    let mut seen = 0u64;
    let mut done = 0usize;

    loop {
        api::mutex_lock(&s.sync_mutex);
        while s.frame.load(Ordering::Relaxed) == seen && !s.quit.load(Ordering::Relaxed) {
            api::cond_wait(&s.worker_cond, &s.sync_mutex);
        }
        if s.quit.load(Ordering::Relaxed) {
            api::mutex_unlock(&s.sync_mutex);
            break;
        }
        seen = s.frame.load(Ordering::Relaxed);
        api::mutex_unlock(&s.sync_mutex);

        // Frame work
        api::ainc(&s.jobs);
        done += 1;

        api::mutex_lock(&s.sync_mutex);
        if api::adec(&s.threads_running) == 0 {
            api::cond_signal(&s.sync_cond);
        }
        api::mutex_unlock(&s.sync_mutex);
    }

    os_dbg!("worker {} exiting after {} frames", id, done);
    done
}

fn run_frames(workers: usize, frames: u64) {
    let s = stage();
    let handles: Vec<_> = (0..workers)
        .filter_map(|i| api::thread_new(worker, i))
        .collect();

    for _ in 0..frames {
        api::mutex_lock(&s.sync_mutex);
        s.threads_running.store(handles.len() as i32, Ordering::Relaxed);
        s.frame.fetch_add(1, Ordering::Relaxed);
        api::cond_broadcast(&s.worker_cond);
        while s.threads_running.load(Ordering::Relaxed) > 0 {
            api::cond_wait(&s.sync_cond, &s.sync_mutex);
        }
        api::mutex_unlock(&s.sync_mutex);
    }

    api::mutex_lock(&s.sync_mutex);
    s.quit.store(true, Ordering::Relaxed);
    api::cond_broadcast(&s.worker_cond);
    api::mutex_unlock(&s.sync_mutex);

    let per_worker: usize = handles.into_iter().map(api::thread_join).sum();
    println!("Frames:          {}", frames);
    println!("Worker frames:   {}", per_worker);
    println!("Jobs counted:    {}", s.jobs.load(Ordering::SeqCst));
}

static COUNTER: AtomicI32 = AtomicI32::new(0);
const ITERS: usize = 100_000;

fn lock_increment(_: usize) -> usize {
    let s = stage();
    for _ in 0..ITERS {
        api::mutex_lock(&s.sync_mutex);
        COUNTER.store(COUNTER.load(Ordering::Relaxed) + 1, Ordering::Relaxed);
        api::mutex_unlock(&s.sync_mutex);
    }
    0
}

fn atomic_churn(_: usize) -> usize {
    for _ in 0..ITERS {
        api::ainc(&COUNTER);
    }
    for _ in 0..ITERS {
        api::adec(&COUNTER);
    }
    0
}

fn run_threads(workers: usize, f: osapi::ThreadCallback) {
    let handles: Vec<_> = (0..workers).filter_map(|i| api::thread_new(f, i)).collect();
    for h in handles {
        api::thread_join(h);
    }
}

fn main() {
    println!("=== osapi Stress Test ===\n");

    let mut args = std::env::args().skip(1);
    let workers: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(8);
    let frames: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(10_000);

    osapi::install_defaults();
    os_log!("backend: {}", osapi::BACKEND_NAME);

    let mut t = api::get_time();

    run_frames(workers, frames);
    let frame_time = lap(&mut t);
    println!("Frame loop:      {:.3}s ({:.0} frames/sec)\n", frame_time, frames as f64 / frame_time);

    COUNTER.store(0, Ordering::SeqCst);
    run_threads(workers, lock_increment);
    let lock_time = lap(&mut t);
    println!("Mutex counter:   {} (expected {})", COUNTER.load(Ordering::SeqCst), workers * ITERS);
    println!("Mutex time:      {:.3}s\n", lock_time);

    COUNTER.store(0, Ordering::SeqCst);
    run_threads(workers, atomic_churn);
    let atomic_time = lap(&mut t);
    println!("Atomic counter:  {} (expected 0)", COUNTER.load(Ordering::SeqCst));
    println!("Atomic time:     {:.3}s", atomic_time);

    println!("\n=== Stress Test Complete ===");
}
