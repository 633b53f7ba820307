//! Mutex and condition variable over `std::sync`
//!
//! The table's mutex API is lock/unlock without a guard, so the lock state
//! is an explicit flag protected by a std mutex. The condition variable is a
//! generation counter: a waiter records the generation, releases the table
//! mutex while still holding the counter lock, and sleeps until a signal
//! bumps it. No signal can slip in between release and sleep.

use core::ptr::NonNull;
use std::sync::{Condvar, Mutex, MutexGuard};

use osapi_core::handle::{CondHandle, MutexHandle};
use osapi_core::traits::{Backend, OsSync};

use super::PortableBackend;

struct PortableMutex {
    locked: Mutex<bool>,
    released: Condvar,
}

struct PortableCond {
    generation: Mutex<u64>,
    changed: Condvar,
}

/// Lock a std mutex, ignoring poison (no user code runs under these locks)
#[inline]
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl PortableMutex {
    fn acquire(&self) {
        let mut locked = lock(&self.locked);
        while *locked {
            locked = self.released.wait(locked).unwrap_or_else(|e| e.into_inner());
        }
        *locked = true;
    }

    fn release(&self) {
        *lock(&self.locked) = false;
        self.released.notify_one();
    }
}

#[inline]
fn mutex_ref(mutex: &MutexHandle) -> &PortableMutex {
    // Safety: handle is live while borrowed
    unsafe { mutex.ptr_for::<PortableMutex>(PortableBackend::NAME).as_ref() }
}

#[inline]
fn cond_ref(cond: &CondHandle) -> &PortableCond {
    // Safety: handle is live while borrowed
    unsafe { cond.ptr_for::<PortableCond>(PortableBackend::NAME).as_ref() }
}

impl OsSync for PortableBackend {
    fn mutex_new() -> MutexHandle {
        let m = Box::new(PortableMutex {
            locked: Mutex::new(false),
            released: Condvar::new(),
        });
        // Safety: fresh box, reclaimed once in mutex_free
        unsafe { MutexHandle::from_ptr(NonNull::from(Box::leak(m)), Self::NAME) }
    }

    fn mutex_free(mutex: MutexHandle) {
        let ptr = mutex.into_ptr_for::<PortableMutex>(Self::NAME);
        // Safety: leaked by mutex_new above
        drop(unsafe { Box::from_raw(ptr.as_ptr()) });
    }

    fn mutex_lock(mutex: &MutexHandle) {
        mutex_ref(mutex).acquire();
    }

    fn mutex_unlock(mutex: &MutexHandle) {
        mutex_ref(mutex).release();
    }

    fn cond_new() -> CondHandle {
        let c = Box::new(PortableCond {
            generation: Mutex::new(0),
            changed: Condvar::new(),
        });
        // Safety: fresh box, reclaimed once in cond_free
        unsafe { CondHandle::from_ptr(NonNull::from(Box::leak(c)), Self::NAME) }
    }

    fn cond_free(cond: CondHandle) {
        let ptr = cond.into_ptr_for::<PortableCond>(Self::NAME);
        // Safety: leaked by cond_new above
        drop(unsafe { Box::from_raw(ptr.as_ptr()) });
    }

    fn cond_signal(cond: &CondHandle) {
        let c = cond_ref(cond);
        *lock(&c.generation) += 1;
        // Waiters that entered after the bump keep waiting, so waking all
        // of them still releases at least one blocked before the signal.
        c.changed.notify_all();
    }

    fn cond_broadcast(cond: &CondHandle) {
        let c = cond_ref(cond);
        *lock(&c.generation) += 1;
        c.changed.notify_all();
    }

    fn cond_wait(cond: &CondHandle, mutex: &MutexHandle) {
        let c = cond_ref(cond);
        let m = mutex_ref(mutex);

        let mut generation = lock(&c.generation);
        let seen = *generation;
        m.release();
        while *generation == seen {
            generation = c.changed.wait(generation).unwrap_or_else(|e| e.into_inner());
        }
        drop(generation);
        m.acquire();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osapi_core::traits::OsThreads;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::OnceLock;

    struct Shared {
        mutex: MutexHandle,
        cond: CondHandle,
        counter: core::cell::UnsafeCell<usize>,
        ready: AtomicBool,
    }

    // Safety: counter is only touched under `mutex`
    unsafe impl Sync for Shared {}

    fn shared() -> &'static Shared {
        static SHARED: OnceLock<Shared> = OnceLock::new();
        SHARED.get_or_init(|| Shared {
            mutex: PortableBackend::mutex_new(),
            cond: PortableBackend::cond_new(),
            counter: core::cell::UnsafeCell::new(0),
            ready: AtomicBool::new(false),
        })
    }

    const THREADS: usize = 8;
    const ITERS: usize = 10_000;

    fn bump(_: usize) -> usize {
        let s = shared();
        for _ in 0..ITERS {
            PortableBackend::mutex_lock(&s.mutex);
            // Safety: guarded by s.mutex
            unsafe { *s.counter.get() += 1 };
            PortableBackend::mutex_unlock(&s.mutex);
        }
        0
    }

    fn wait_ready(_: usize) -> usize {
        let s = shared();
        PortableBackend::mutex_lock(&s.mutex);
        while !s.ready.load(Ordering::Relaxed) {
            PortableBackend::cond_wait(&s.cond, &s.mutex);
        }
        PortableBackend::mutex_unlock(&s.mutex);
        1
    }

    #[test]
    fn test_mutex_and_cond() {
        let s = shared();

        // N threads x M increments under the lock
        let handles: Vec<_> = (0..THREADS)
            .map(|_| PortableBackend::thread_new(bump, 0).unwrap())
            .collect();
        for h in handles {
            PortableBackend::thread_join(h);
        }
        PortableBackend::mutex_lock(&s.mutex);
        assert_eq!(unsafe { *s.counter.get() }, THREADS * ITERS);
        PortableBackend::mutex_unlock(&s.mutex);

        // Waiters blocked on the predicate wake after the broadcast
        let waiters: Vec<_> = (0..4)
            .map(|_| PortableBackend::thread_new(wait_ready, 0).unwrap())
            .collect();
        std::thread::sleep(std::time::Duration::from_millis(20));
        PortableBackend::mutex_lock(&s.mutex);
        s.ready.store(true, Ordering::Relaxed);
        PortableBackend::cond_broadcast(&s.cond);
        PortableBackend::mutex_unlock(&s.mutex);

        let woke: usize = waiters.into_iter().map(PortableBackend::thread_join).sum();
        assert_eq!(woke, 4);
    }

    #[test]
    fn test_create_free() {
        let m = PortableBackend::mutex_new();
        let c = PortableBackend::cond_new();
        PortableBackend::mutex_lock(&m);
        PortableBackend::cond_signal(&c);
        PortableBackend::mutex_unlock(&m);
        PortableBackend::cond_free(c);
        PortableBackend::mutex_free(m);
    }
}
