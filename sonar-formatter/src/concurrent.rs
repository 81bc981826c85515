// Copyright (c) The xcresult-sonar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order-preserving parallel map over a worker pool.

use crate::errors::WorkerPoolBuildError;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::{
    any::Any,
    fmt,
    num::NonZeroUsize,
    panic::{self, AssertUnwindSafe},
    thread,
};
use tracing::warn;

/// A pool of worker threads used to transform independent units of work in parallel.
pub struct WorkerPool {
    pool: ThreadPool,
}

impl WorkerPool {
    /// Creates a new pool with `threads` workers, or one per available CPU if `None`.
    pub fn new(threads: Option<usize>) -> Result<Self, WorkerPoolBuildError> {
        let threads = threads.unwrap_or_else(default_threads);
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|idx| format!("xcresult-sonar-worker-{idx}"))
            .build()
            .map_err(|err| WorkerPoolBuildError::new(threads, err))?;
        Ok(Self { pool })
    }

    /// Returns the number of worker threads in this pool.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Applies `transform` to every input in parallel, returning the successful outputs in input
    /// order.
    ///
    /// Each unit of work writes into its own pre-allocated slot, so the output order depends only
    /// on the input order and never on completion order. A unit that returns an error or panics
    /// leaves no output and does not affect the other units. Failures are logged as warnings on
    /// the calling thread once every unit has finished, in input order.
    pub fn concurrent_map<T, U, E, F>(&self, inputs: &[T], transform: F) -> Vec<U>
    where
        T: Sync,
        U: Send,
        E: fmt::Display + Send,
        F: Fn(&T) -> Result<U, E> + Sync,
    {
        let mut slots: Vec<Option<UnitOutcome<U, E>>> =
            std::iter::repeat_with(|| None).take(inputs.len()).collect();
        let transform = &transform;

        self.pool.scope(|scope| {
            for (input, slot) in inputs.iter().zip(slots.iter_mut()) {
                scope.spawn(move |_| {
                    let outcome = match panic::catch_unwind(AssertUnwindSafe(|| transform(input))) {
                        Ok(Ok(output)) => UnitOutcome::Done(output),
                        Ok(Err(error)) => UnitOutcome::Failed(error),
                        Err(payload) => UnitOutcome::Panicked(panic_message(payload.as_ref())),
                    };
                    *slot = Some(outcome);
                });
            }
        });

        slots
            .into_iter()
            .flatten()
            .filter_map(|outcome| match outcome {
                UnitOutcome::Done(output) => Some(output),
                UnitOutcome::Failed(error) => {
                    warn!("{error}, skipping");
                    None
                }
                UnitOutcome::Panicked(message) => {
                    warn!("worker panicked: {message}, skipping");
                    None
                }
            })
            .collect()
    }
}

enum UnitOutcome<U, E> {
    Done(U),
    Failed(E),
    Panicked(String),
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads())
            .finish()
    }
}

fn default_threads() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::CapturedLogs;
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };
    use test_strategy::proptest;

    #[test]
    fn preserves_input_order_regardless_of_completion_order() {
        let pool = WorkerPool::new(Some(4)).expect("pool built");
        let inputs: Vec<u64> = (0..64).collect();

        // Earlier inputs sleep longer, so they finish last.
        let outputs = pool.concurrent_map(&inputs, |&input| {
            thread::sleep(Duration::from_micros((64 - input) * 50));
            Ok::<_, std::convert::Infallible>(input * 10)
        });

        let expected: Vec<u64> = inputs.iter().map(|input| input * 10).collect();
        assert_eq!(outputs, expected);
    }

    #[test]
    fn failed_units_are_dropped_without_affecting_others() {
        let pool = WorkerPool::new(Some(3)).expect("pool built");
        let inputs: Vec<i32> = (0..20).collect();
        let calls = AtomicUsize::new(0);

        let logs = CapturedLogs::default();
        let outputs = logs.capture(|| {
            pool.concurrent_map(&inputs, |&input| {
                calls.fetch_add(1, Ordering::Relaxed);
                if input % 3 == 0 {
                    Err(format!("unit {input} failed"))
                } else {
                    Ok(input)
                }
            })
        });

        assert_eq!(calls.load(Ordering::Relaxed), inputs.len(), "every unit ran");
        let expected: Vec<i32> = inputs.iter().copied().filter(|input| input % 3 != 0).collect();
        assert_eq!(outputs, expected);

        let logs = logs.contents();
        let warnings: Vec<_> = logs
            .lines()
            .filter(|line| line.contains("failed, skipping"))
            .collect();
        assert_eq!(warnings.len(), 7, "one warning per failed unit, logs: {logs}");
        assert!(warnings[0].contains("unit 0 failed"), "logs: {logs}");
        assert!(warnings[6].contains("unit 18 failed"), "in input order, logs: {logs}");
    }

    #[test]
    fn panicking_unit_is_dropped_without_affecting_others() {
        let pool = WorkerPool::new(Some(2)).expect("pool built");
        let inputs: Vec<u32> = (0..8).collect();

        let logs = CapturedLogs::default();
        let outputs = logs.capture(|| {
            pool.concurrent_map(&inputs, |&input| {
                if input == 5 {
                    panic!("unit {input} blew up");
                }
                Ok::<_, std::convert::Infallible>(input)
            })
        });

        assert_eq!(outputs, [0, 1, 2, 3, 4, 6, 7]);
        let logs = logs.contents();
        assert!(
            logs.contains("worker panicked: unit 5 blew up, skipping"),
            "panic reported, logs: {logs}"
        );
    }

    #[test]
    fn empty_input() {
        let pool = WorkerPool::new(None).expect("pool built");
        assert!(pool.threads() >= 1);
        let outputs: Vec<u8> =
            pool.concurrent_map(&[] as &[u8], |_| Ok::<_, std::convert::Infallible>(0));
        assert!(outputs.is_empty());
    }

    #[test]
    fn zero_threads_uses_default() {
        // rayon treats 0 as "pick automatically".
        let pool = WorkerPool::new(Some(0)).expect("pool built");
        assert!(pool.threads() >= 1);
    }

    #[proptest(cases = 32)]
    fn output_is_filtered_input_order(inputs: Vec<u16>, #[strategy(1usize..8)] threads: usize) {
        let pool = WorkerPool::new(Some(threads)).expect("pool built");
        let outputs = pool.concurrent_map(&inputs, |&input| {
            if input % 5 == 0 {
                Err("divisible by five")
            } else {
                Ok(u32::from(input) + 1)
            }
        });
        let expected: Vec<u32> = inputs
            .iter()
            .filter(|&&input| input % 5 != 0)
            .map(|&input| u32::from(input) + 1)
            .collect();
        assert_eq!(outputs, expected);
    }
}
