//! Single-flight call coalescer (C5): cache-breakdown protection.
//!
//! Ensures at most one in-flight execution of a producer function per key;
//! concurrent callers for the same key block on a latch and all observe the
//! first caller's result, success or failure. Mirrors the original's
//! `sync.WaitGroup`-based design, expressed here with a condition variable
//! since Rust's std lacks a reusable "wait group with result" primitive.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::error::Error;

/// The result type joiners observe: the producer's value, or a shared
/// handle to its error (errors aren't `Clone`, so every joiner gets the
/// same `Arc`).
pub type Shared<V> = Result<V, Arc<Error>>;

struct Call<V> {
    mutex: Mutex<Option<Shared<V>>>,
    condvar: Condvar,
}

impl<V: Clone> Call<V> {
    fn new() -> Self {
        Self {
            mutex: Mutex::new(None),
            condvar: Condvar::new(),
        }
    }

    fn wait(&self) -> Shared<V> {
        let mut guard = self.mutex.lock();
        while guard.is_none() {
            self.condvar.wait(&mut guard);
        }
        guard.clone().expect("loop only exits once a result is set")
    }

    fn finish(&self, result: Shared<V>) {
        let mut guard = self.mutex.lock();
        *guard = Some(result);
        self.condvar.notify_all();
    }
}

/// Deduplicates concurrent calls keyed by a string identity.
pub struct Coalescer<V> {
    calls: Mutex<HashMap<String, Arc<Call<V>>>>,
}

impl<V: Clone> Coalescer<V> {
    /// Creates an empty coalescer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `producer` for `key` if no call is already in flight, otherwise
    /// blocks until the in-flight call completes and returns its result.
    ///
    /// (I4) at most one execution of `producer` per key at any instant.
    /// (I5) every joiner sees the same `(value, error)` as the producer.
    /// (I6) the call record is gone before the next invocation for `key`
    /// starts a new one — enforced by removing it under the same lock
    /// that protects the table, after the producer has already recorded
    /// its result.
    ///
    /// A panic inside `producer` is caught and delivered to every joiner as
    /// a [`Error::LoaderFailure`], then re-raised in this call's own thread
    /// so the producer's own caller still observes the panic.
    pub fn do_call(
        &self,
        key: &str,
        producer: impl FnOnce() -> crate::error::Result<V>,
    ) -> Shared<V> {
        let (call, is_producer) = {
            let mut calls = self.calls.lock();
            if let Some(call) = calls.get(key) {
                (Arc::clone(call), false)
            } else {
                let call = Arc::new(Call::new());
                calls.insert(key.to_string(), Arc::clone(&call));
                (call, true)
            }
        };

        if !is_producer {
            return call.wait();
        }

        let (result, panic_payload) = match panic::catch_unwind(AssertUnwindSafe(producer)) {
            Ok(Ok(value)) => (Ok(value), None),
            Ok(Err(err)) => (Err(Arc::new(err)), None),
            Err(payload) => (
                Err(Arc::new(Error::LoaderFailure(anyhow::anyhow!(
                    "loader panicked"
                )))),
                Some(payload),
            ),
        };

        call.finish(result.clone());
        self.calls.lock().remove(key);

        if let Some(payload) = panic_payload {
            panic::resume_unwind(payload);
        }

        result
    }
}

impl<V> Default for Coalescer<V>
where
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for Coalescer<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coalescer")
            .field("in_flight", &self.calls.lock().len())
            .finish()
    }
}
