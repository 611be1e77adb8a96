//! Concurrent handles and the join utilities that fan their results back in.
//!
//! # .NET Tasks vs Rust Handles
//!
//! In .NET, a nested fan-out produces `Task<List<Task<T>>>` and the caller
//! unwraps it with `Task.WhenAll`:
//! ```csharp
//! var outer = blocks.Select(b => Task.Run(() => SearchBlock(b))).ToList();
//! var inner = await Task.WhenAll(outer);
//! var results = await Task.WhenAll(inner.Select(l => Task.WhenAll(l)));
//! ```
//!
//! Here a [`TaskHandle`] is one level deep: a one-shot channel whose sender
//! lives in a job queued on a rayon pool. The join functions wait on many
//! handles at once and rebuild the results by index, so output order always
//! matches input order no matter which task finishes first:
//! ```rust,ignore
//! let handles: Vec<TaskHandle<usize>> = items
//!     .into_iter()
//!     .map(|item| TaskHandle::spawn(&pool, move || Ok(item.len())))
//!     .collect();
//! let lengths = join_all(handles)?;
//! ```
//!
//! There is no cancellation. When a fail-fast join returns early the
//! remaining tasks still run to completion and their results are dropped.
use crossbeam::channel::{self, Receiver, Select, TryRecvError};
use rayon::ThreadPool;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::warn;

use crate::errors::{Result, SearchError};
use crate::metrics::SearchMetrics;

/// Observed state of a [`TaskHandle`]
#[derive(Debug)]
pub enum TaskState<'a, T> {
    Pending,
    Resolved(&'a T),
    Failed(&'a SearchError),
}

/// A value being computed on a worker pool
#[derive(Debug)]
pub struct TaskHandle<T> {
    receiver: Receiver<Result<T>>,
    outcome: Option<Result<T>>,
}

impl<T: Send + 'static> TaskHandle<T> {
    /// Queues `task` on `pool` and returns a handle to its result
    pub fn spawn<F>(pool: &ThreadPool, task: F) -> Self
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        Self::spawn_inner(pool, None, task)
    }

    /// Like [`TaskHandle::spawn`], recording the outcome in `metrics`
    pub fn spawn_tracked<F>(pool: &ThreadPool, metrics: &SearchMetrics, task: F) -> Self
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        Self::spawn_inner(pool, Some(metrics.clone()), task)
    }

    fn spawn_inner<F>(pool: &ThreadPool, metrics: Option<SearchMetrics>, task: F) -> Self
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let (sender, receiver) = channel::bounded(1);
        pool.spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(task)).unwrap_or_else(|payload| {
                Err(SearchError::task_panicked(panic_message(payload.as_ref())))
            });

            if let Err(e) = &outcome {
                warn!("Task failed: {}", e);
            }
            if let Some(metrics) = &metrics {
                metrics.record_task_outcome(outcome.is_ok());
            }

            // The receiver is gone if a fail-fast join already returned
            let _ = sender.send(outcome);
        });

        Self {
            receiver,
            outcome: None,
        }
    }
}

impl<T> TaskHandle<T> {
    /// A handle that is already resolved
    pub fn resolved(value: T) -> Self {
        Self {
            receiver: channel::never(),
            outcome: Some(Ok(value)),
        }
    }

    /// A handle that has already failed
    pub fn failed(error: SearchError) -> Self {
        Self {
            receiver: channel::never(),
            outcome: Some(Err(error)),
        }
    }

    /// Checks the handle without blocking
    pub fn state(&mut self) -> TaskState<'_, T> {
        if self.outcome.is_none() {
            match self.receiver.try_recv() {
                Ok(outcome) => self.outcome = Some(outcome),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    self.outcome = Some(Err(SearchError::TaskDropped));
                }
            }
        }

        match &self.outcome {
            None => TaskState::Pending,
            Some(Ok(value)) => TaskState::Resolved(value),
            Some(Err(e)) => TaskState::Failed(e),
        }
    }

    pub fn is_finished(&mut self) -> bool {
        !matches!(self.state(), TaskState::Pending)
    }

    /// Blocks until the task finishes
    pub fn wait(self) -> Result<T> {
        match self.outcome {
            Some(outcome) => outcome,
            None => self
                .receiver
                .recv()
                .unwrap_or_else(|_| Err(SearchError::TaskDropped)),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Waits for every handle and returns their values in input order.
///
/// Fail-fast: the first failure to arrive, in completion order, is returned
/// immediately and any values already collected are discarded.
pub fn join_all<T>(handles: Vec<TaskHandle<T>>) -> Result<Vec<T>> {
    let mut slots: Vec<Option<T>> = (0..handles.len()).map(|_| None).collect();
    let mut pending = Vec::new();

    for (index, handle) in handles.into_iter().enumerate() {
        let TaskHandle { receiver, outcome } = handle;
        match outcome {
            Some(outcome) => slots[index] = Some(outcome?),
            None => pending.push((index, receiver)),
        }
    }

    let mut select = Select::new();
    for (_, receiver) in &pending {
        select.recv(receiver);
    }

    for _ in 0..pending.len() {
        let oper = select.select();
        let op = oper.index();
        let (index, receiver) = &pending[op];
        let outcome = oper
            .recv(receiver)
            .unwrap_or_else(|_| Err(SearchError::TaskDropped));
        select.remove(op);
        slots[*index] = Some(outcome?);
    }

    Ok(slots.into_iter().flatten().collect())
}

/// Waits for every handle and reports each outcome in input order
pub fn join_settled<T>(handles: Vec<TaskHandle<T>>) -> Vec<Result<T>> {
    handles.into_iter().map(TaskHandle::wait).collect()
}

/// Flattens handles-of-handles into the fully resolved nested values.
///
/// Fail-fast across the whole structure.
pub fn join_nested<T>(outer: Vec<TaskHandle<Vec<TaskHandle<T>>>>) -> Result<Vec<Vec<T>>> {
    let inner_lists = join_all(outer)?;
    let shape: Vec<usize> = inner_lists.iter().map(Vec::len).collect();

    // One fan-in over every inner handle
    let mut flat = join_all(inner_lists.into_iter().flatten().collect())?.into_iter();

    Ok(shape
        .into_iter()
        .map(|len| flat.by_ref().take(len).collect())
        .collect())
}

/// Flattens handles-of-handles, keeping one outcome per outer entry.
///
/// An outer entry fails if its own handle fails or any of its inner handles
/// fails; other entries are unaffected.
pub fn join_nested_settled<T>(outer: Vec<TaskHandle<Vec<TaskHandle<T>>>>) -> Vec<Result<Vec<T>>> {
    join_settled(outer)
        .into_iter()
        .map(|inner| inner.and_then(join_all))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::ThreadPoolBuilder;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn test_pool(threads: usize) -> ThreadPool {
        ThreadPoolBuilder::new().num_threads(threads).build().unwrap()
    }

    #[test]
    fn test_spawn_and_wait() {
        let pool = test_pool(2);
        let handle = TaskHandle::spawn(&pool, || Ok(21 * 2));
        assert_eq!(handle.wait().unwrap(), 42);
    }

    #[test]
    fn test_state_transitions() {
        let pool = test_pool(2);
        let (gate_tx, gate_rx) = channel::bounded::<()>(0);
        let mut handle = TaskHandle::spawn(&pool, move || {
            gate_rx.recv().ok();
            Ok("done")
        });

        assert!(matches!(handle.state(), TaskState::Pending));
        gate_tx.send(()).unwrap();

        while !handle.is_finished() {
            thread::yield_now();
        }
        assert!(matches!(handle.state(), TaskState::Resolved(&"done")));
        assert_eq!(handle.wait().unwrap(), "done");
    }

    #[test]
    fn test_panic_fails_only_its_handle() {
        let pool = test_pool(2);
        let handles = vec![
            TaskHandle::spawn(&pool, || Ok(1)),
            TaskHandle::spawn(&pool, || -> Result<i32> { panic!("word task blew up") }),
            TaskHandle::spawn(&pool, || Ok(3)),
        ];

        let outcomes = join_settled(handles);
        assert_eq!(*outcomes[0].as_ref().unwrap(), 1);
        assert!(matches!(
            &outcomes[1],
            Err(SearchError::TaskPanicked(msg)) if msg == "word task blew up"
        ));
        assert_eq!(*outcomes[2].as_ref().unwrap(), 3);
    }

    #[test]
    fn test_dropped_task() {
        let (sender, receiver) = channel::bounded::<Result<i32>>(1);
        drop(sender);
        let mut handle = TaskHandle {
            receiver,
            outcome: None,
        };
        assert!(matches!(
            handle.state(),
            TaskState::Failed(SearchError::TaskDropped)
        ));
        assert!(matches!(handle.wait(), Err(SearchError::TaskDropped)));
    }

    #[test]
    fn test_join_all_reports_sender_dropped_while_waiting() {
        let (sender, receiver) = channel::bounded::<Result<i32>>(1);
        let handles = vec![
            TaskHandle::resolved(1),
            TaskHandle {
                receiver,
                outcome: None,
            },
        ];

        let dropper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            drop(sender);
        });

        assert!(matches!(join_all(handles), Err(SearchError::TaskDropped)));
        dropper.join().unwrap();
    }

    #[test]
    fn test_join_all_preserves_input_order() {
        let pool = test_pool(4);
        // Later tasks finish first
        let handles: Vec<_> = (0..8u64)
            .map(|i| {
                TaskHandle::spawn(&pool, move || {
                    thread::sleep(Duration::from_millis((8 - i) * 5));
                    Ok(i)
                })
            })
            .collect();

        assert_eq!(join_all(handles).unwrap(), (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_join_all_empty() {
        let handles: Vec<TaskHandle<i32>> = Vec::new();
        assert!(join_all(handles).unwrap().is_empty());
    }

    #[test]
    fn test_join_all_with_resolved_handles() {
        let pool = test_pool(2);
        let handles = vec![
            TaskHandle::resolved(1),
            TaskHandle::spawn(&pool, || Ok(2)),
            TaskHandle::resolved(3),
        ];
        assert_eq!(join_all(handles).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_join_all_fails_fast() {
        let pool = test_pool(2);
        let (gate_tx, gate_rx) = channel::bounded::<()>(0);

        let handles = vec![
            // Never finishes until the gate opens
            TaskHandle::spawn(&pool, move || {
                gate_rx.recv().ok();
                Ok(1)
            }),
            TaskHandle::spawn(&pool, || Err(SearchError::malformed_input(1, "missing title"))),
        ];

        let err = join_all(handles).unwrap_err();
        assert!(matches!(err, SearchError::MalformedInput { index: 1, .. }));

        // The blocked task is still running; let it finish
        gate_tx.send(()).unwrap();
    }

    #[test]
    fn test_join_settled_collects_every_outcome() {
        let handles = vec![
            TaskHandle::resolved(1),
            TaskHandle::failed(SearchError::TaskDropped),
            TaskHandle::resolved(3),
        ];
        let outcomes = join_settled(handles);
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_ok());
        assert!(outcomes[1].is_err());
        assert!(outcomes[2].is_ok());
    }

    #[test]
    fn test_join_nested() {
        let pool = Arc::new(test_pool(4));
        let outer: Vec<_> = [2usize, 0, 3]
            .into_iter()
            .map(|n| {
                let inner_pool = Arc::clone(&pool);
                TaskHandle::spawn(&pool, move || {
                    Ok((0..n)
                        .map(|i| TaskHandle::spawn(&inner_pool, move || Ok(n * 10 + i)))
                        .collect())
                })
            })
            .collect();

        let nested = join_nested(outer).unwrap();
        assert_eq!(nested, vec![vec![20, 21], vec![], vec![30, 31, 32]]);
    }

    #[test]
    fn test_join_nested_fails_on_inner_failure() {
        let outer = vec![
            TaskHandle::resolved(vec![TaskHandle::resolved(1)]),
            TaskHandle::resolved(vec![
                TaskHandle::resolved(2),
                TaskHandle::failed(SearchError::task_panicked("boom")),
            ]),
        ];
        assert!(matches!(
            join_nested(outer),
            Err(SearchError::TaskPanicked(_))
        ));
    }

    #[test]
    fn test_join_nested_settled_isolates_failures() {
        let outer = vec![
            TaskHandle::resolved(vec![TaskHandle::resolved(1), TaskHandle::resolved(2)]),
            TaskHandle::failed(SearchError::malformed_input(1, "missing title")),
            TaskHandle::resolved(vec![TaskHandle::failed(SearchError::TaskDropped)]),
            TaskHandle::resolved(vec![]),
        ];

        let outcomes = join_nested_settled(outer);
        assert_eq!(outcomes.len(), 4);
        assert_eq!(outcomes[0].as_ref().unwrap(), &vec![1, 2]);
        assert!(matches!(
            outcomes[1],
            Err(SearchError::MalformedInput { index: 1, .. })
        ));
        assert!(matches!(outcomes[2], Err(SearchError::TaskDropped)));
        assert!(outcomes[3].as_ref().unwrap().is_empty());
    }
}
