// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;
use std::sync::Arc;

use crate::error::{BoxError, Error, Result};
use crate::executor::Executor;
use crate::sync::latch::Latch;
use super::state::Core;
use super::{catch, make, submit};

/// A value of type `T` that becomes available at most once
///
/// Cloning a `Future` gives another handle to the same outcome.
pub struct Future<T> {
    core: Arc<Core<T>>,
}

impl<T> Clone for Future<T> {
    fn clone(&self) -> Future<T> {
        Future { core: self.core.clone() }
    }
}

impl<T> Future<T>
    where T: Clone + Send + 'static
{
    pub(crate) fn with_core(core: Arc<Core<T>>) -> Future<T> {
        Future { core }
    }

    /// A future that is already completed with `val`. Nothing gets scheduled.
    pub fn completed(val: T) -> Future<T> {
        Future::with_core(Core::new(Some(Ok(val))))
    }

    /// A future that has already failed with `err`
    pub fn failed(err: Error) -> Future<T> {
        Future::with_core(Core::new(Some(Err(err))))
    }

    /// Run `task` on `executor` and complete the returned future with its outcome.
    ///
    /// An `Err` returned by the task, or a panic inside it, fails the future
    /// with `Error::TaskFailure`. If the executor refuses the task, the future
    /// fails with the executor's error instead.
    pub fn spawn<F, E, X>(task: F, executor: &X) -> Future<T>
        where F: FnOnce() -> ::std::result::Result<T, E> + Send + 'static,
              E: Into<BoxError>,
              X: Executor + ?Sized
    {
        let (promise, future) = make();
        submit(executor, promise, move || task().map_err(Error::task));
        future
    }

    /// The value if completed, `None` while pending or if failed. Never blocks.
    pub fn peek(&self) -> Option<T> {
        self.core.value()
    }

    /// The value if completed, `default` otherwise
    pub fn peek_or(&self, default: T) -> T {
        self.peek().unwrap_or(default)
    }

    /// Whether the future has settled, successfully or not
    pub fn is_done(&self) -> bool {
        self.core.is_settled()
    }

    pub fn is_failed(&self) -> bool {
        self.core.is_failed()
    }

    /// Block the current thread until the future settles.
    ///
    /// A failed future yields `Error::JoinFailure` wrapping the stored failure.
    /// May be called any number of times, from any number of threads.
    pub fn join(&self) -> Result<T> {
        let result = match self.core.result() {
            Some(result) => result,
            None => {
                let latch = Arc::new(Latch::new());
                let setter = latch.clone();
                self.core.set_next(Box::new(move |result| setter.set(result)));

                latch.wait().expect("join latch is set exactly once")
            }
        };

        result.map_err(|err| Error::JoinFailure(Box::new(err)))
    }

    /// Register a callback for the outcome.
    ///
    /// Runs right away on this thread if the future already settled, otherwise
    /// on the thread that settles it. Callbacks run in registration order; a
    /// callback registered while the settling thread is still running the
    /// earlier ones is queued behind them and runs on that thread instead.
    pub fn on_complete<F>(&self, f: F)
        where F: FnOnce(Result<T>) + Send + 'static
    {
        self.core.set_next(Box::new(f));
    }

    /// Once completed, run `f` with the value on `executor`.
    ///
    /// If this future fails, the returned one fails with the same error and
    /// `f` is never called. A panic in `f` fails the returned future.
    pub fn then_apply<U, F, X>(&self, f: F, executor: &X) -> Future<U>
        where U: Clone + Send + 'static,
              F: FnOnce(T) -> U + Send + 'static,
              X: Executor + Clone + 'static
    {
        self.chain(move |val| Ok(f(val)), executor)
    }

    /// Like `then_apply`, for a fallible `f`. An `Err` becomes a `TaskFailure`.
    pub fn then_try<U, E, F, X>(&self, f: F, executor: &X) -> Future<U>
        where U: Clone + Send + 'static,
              E: Into<BoxError>,
              F: FnOnce(T) -> ::std::result::Result<U, E> + Send + 'static,
              X: Executor + Clone + 'static
    {
        self.chain(move |val| f(val).map_err(Error::task), executor)
    }

    fn chain<U, F, X>(&self, f: F, executor: &X) -> Future<U>
        where U: Clone + Send + 'static,
              F: FnOnce(T) -> Result<U> + Send + 'static,
              X: Executor + Clone + 'static
    {
        let (promise, future) = make();
        let executor = executor.clone();

        self.on_complete(move |result| match result {
            Ok(val) => submit(&executor, promise, move || f(val)),
            Err(err) => {
                let _ = promise.fail(err);
            }
        });

        future
    }

    /// Turn the outcome, value or error, into a new value.
    ///
    /// `f` runs on whichever thread settles this future (or right away if it
    /// already has, unless that thread is still running earlier callbacks, see
    /// `on_complete`). The returned future fails only if `f` panics.
    pub fn handle<U, F>(&self, f: F) -> Future<U>
        where U: Clone + Send + 'static,
              F: FnOnce(Result<T>) -> U + Send + 'static
    {
        let (promise, future) = make();

        self.on_complete(move |result| {
            let _ = promise.settle(catch(move || Ok(f(result))));
        });

        future
    }

    /// Like `handle`, with `f` running on `executor`
    pub fn handle_async<U, F, X>(&self, f: F, executor: &X) -> Future<U>
        where U: Clone + Send + 'static,
              F: FnOnce(Result<T>) -> U + Send + 'static,
              X: Executor + Clone + 'static
    {
        let (promise, future) = make();
        let executor = executor.clone();

        self.on_complete(move |result| submit(&executor, promise, move || Ok(f(result))));

        future
    }
}

impl Future<()> {
    /// Run `task` on `executor` for its side effects only
    pub fn run<F, X>(task: F, executor: &X) -> Future<()>
        where F: FnOnce() + Send + 'static,
              X: Executor + ?Sized
    {
        let (promise, future) = make();
        submit(executor, promise, move || {
            task();
            Ok(())
        });
        future
    }
}

impl<T> fmt::Debug for Future<T>
    where T: Clone + Send + 'static
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Future({})", self.core.state_name())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    use crate::executor::{Immediate, ThreadPool};
    use crate::future::make;

    #[test]
    fn test_completed_is_done_without_executor() {
        let f = Future::completed("Hello, Future!".to_owned());

        assert!(f.is_done());
        assert!(!f.is_failed());
        assert_eq!(f.peek(), Some("Hello, Future!".to_owned()));
        assert_eq!(format!("{:?}", f), "Future(Completed)");
    }

    #[test]
    fn test_peek_pending_and_failed() {
        let (promise, f) = make::<i32>();

        assert_eq!(f.peek(), None);
        assert_eq!(f.peek_or(-1), -1);
        assert_eq!(format!("{:?}", promise), "Promise(Pending)");

        promise.fail(Error::task("Oops")).unwrap();
        assert!(f.is_done());
        assert!(f.is_failed());
        assert_eq!(f.peek(), None);
        assert_eq!(f.peek_or(-1), -1);
    }

    #[test]
    fn test_join_waits_for_task() {
        let pool = ThreadPool::new(2).unwrap();

        let f = Future::spawn(|| {
                                  thread::sleep(Duration::from_millis(50));
                                  Ok::<_, BoxError>(42)
                              },
                              &pool);

        assert_eq!(f.join().unwrap(), 42);
        assert!(f.is_done());
        // Idempotent once settled
        assert_eq!(f.join().unwrap(), 42);
    }

    #[test]
    fn test_join_failure_wraps_cause() {
        let f: Future<i32> = Future::spawn(|| Err("Oops"), &Immediate);

        match f.join() {
            Err(Error::JoinFailure(cause)) => assert_eq!(cause.to_string(), "Oops"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_panicking_task_fails_future() {
        let f: Future<i32> = Future::spawn(|| -> ::std::result::Result<i32, BoxError> {
                                               panic!("task blew up")
                                           },
                                           &Immediate);

        let err = f.join().unwrap_err();
        assert!(err.cause().is_task_failure());
        assert_eq!(err.cause().to_string(), "task blew up");
    }

    #[test]
    fn test_join_from_many_threads() {
        let (promise, f) = make::<u64>();

        let joiners: Vec<_> = (0..4)
            .map(|_| {
                let f = f.clone();
                thread::spawn(move || f.join().unwrap())
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        promise.complete(9).unwrap();

        for j in joiners {
            assert_eq!(j.join().unwrap(), 9);
        }
    }

    #[test]
    fn test_then_apply_skips_on_failure() {
        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();

        let f: Future<String> = Future::spawn(|| Err("Oops"), &Immediate);
        let g = f.then_apply(move |s: String| {
                                 flag.store(true, Ordering::SeqCst);
                                 s.len()
                             },
                             &Immediate);

        let err = g.join().unwrap_err();
        assert_eq!(err.cause().to_string(), "Oops");
        assert!(!called.load(Ordering::SeqCst));
    }

    #[test]
    fn test_then_apply_runs_on_given_executor() {
        let first = ThreadPool::builder().workers(1).name_prefix("First").build().unwrap();
        let second = ThreadPool::builder().workers(1).name_prefix("Second").build().unwrap();

        let f = Future::spawn(|| Ok::<_, BoxError>(thread::current().name().map(str::to_owned)),
                              &first)
            .then_apply(|prev| (prev, thread::current().name().map(str::to_owned)),
                        &second);

        let (a, b) = f.join().unwrap();
        assert_eq!(a.as_deref(), Some("First #0"));
        assert_eq!(b.as_deref(), Some("Second #0"));
    }

    #[test]
    fn test_then_try_error_becomes_failure() {
        let f = Future::completed(3)
            .then_try(|n| if n > 2 { Err("too big") } else { Ok(n) }, &Immediate);

        assert_eq!(f.join().unwrap_err().cause().to_string(), "too big");
    }

    #[test]
    fn test_handle_sees_exactly_one_side() {
        let ok = Future::completed(1).handle(|r| match r {
            Ok(v) => format!("value {}", v),
            Err(e) => format!("error {}", e),
        });
        let failed = Future::<i32>::failed(Error::task("Oops")).handle(|r| match r {
            Ok(v) => format!("value {}", v),
            Err(e) => format!("error {}", e),
        });

        assert_eq!(ok.join().unwrap(), "value 1");
        assert_eq!(failed.join().unwrap(), "error Oops");
    }

    #[test]
    fn test_handle_panic_fails() {
        let f = Future::completed(1).handle(|_| -> i32 { panic!("handler broke") });

        assert!(f.is_failed());
        assert_eq!(f.join().unwrap_err().cause().to_string(), "handler broke");
    }

    #[test]
    fn test_handle_async_runs_on_executor() {
        let pool = ThreadPool::builder().workers(1).name_prefix("Handler").build().unwrap();

        let f = Future::<i32>::failed(Error::task("Oops"))
            .handle_async(|r| (r.is_err(), thread::current().name().map(str::to_owned)), &pool);

        let (was_err, name) = f.join().unwrap();
        assert!(was_err);
        assert_eq!(name.as_deref(), Some("Handler #0"));
    }

    #[test]
    fn test_rejected_spawn_fails_future() {
        let pool = ThreadPool::new(1).unwrap();
        pool.shutdown();

        let f = Future::spawn(|| Ok::<_, BoxError>(1), &pool);

        assert!(f.is_failed());
        assert!(f.join().unwrap_err().cause().is_rejected());
    }

    #[test]
    fn test_rejected_then_apply_fails_future() {
        let pool = ThreadPool::new(1).unwrap();
        let (promise, f) = make::<i32>();
        let g = f.then_apply(|n| n + 1, &pool);

        pool.shutdown();
        promise.complete(1).unwrap();

        assert!(g.join().unwrap_err().cause().is_rejected());
    }

    #[test]
    fn test_run_has_unit_result() {
        let pool = ThreadPool::new(1).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();

        let f = Future::run(move || {
                                c.fetch_add(1, Ordering::SeqCst);
                            },
                            &pool);

        f.join().unwrap();
        assert_eq!(f.peek(), Some(()));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_continuation_order_before_and_after_completion() {
        let (promise, f) = make::<i32>();
        let log = Arc::new(Mutex::new(Vec::new()));

        for tag in 0..3 {
            let log = log.clone();
            f.on_complete(move |_| log.lock().unwrap().push(tag));
        }

        promise.complete(1).unwrap();

        for tag in 3..5 {
            let log = log.clone();
            f.on_complete(move |_| log.lock().unwrap().push(tag));
        }

        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_long_then_apply_chain_on_immediate() {
        let (promise, head) = make::<u64>();

        let mut f = head.clone();
        for _ in 0..100_000 {
            f = f.then_apply(|v| v + 1, &Immediate);
        }
        assert!(!f.is_done());

        promise.complete(0).unwrap();

        assert!(promise.is_done());
        assert_eq!(f.join().unwrap(), 100_000);
    }

    #[test]
    fn test_long_handle_chain() {
        let (promise, head) = make::<u64>();

        let mut f = head.clone();
        for _ in 0..100_000 {
            f = f.handle(|r| r.unwrap_or(0) + 1);
        }

        promise.fail(Error::task("Oops")).unwrap();

        assert!(head.is_failed());
        assert_eq!(f.join().unwrap(), 100_000);
    }

    #[test]
    fn test_racing_promises_single_winner() {
        let (promise, f) = make::<usize>();
        let (tx, rx) = mpsc::channel();

        let racers: Vec<_> = (0..8)
            .map(|i| {
                let promise = promise.clone();
                let tx = tx.clone();
                thread::spawn(move || {
                    if promise.complete(i).is_ok() {
                        tx.send(i).unwrap();
                    }
                })
            })
            .collect();
        drop(tx);

        let mut losers = 0;
        for r in racers {
            r.join().unwrap();
        }

        let winners: Vec<_> = rx.iter().collect();
        assert_eq!(winners.len(), 1);
        assert_eq!(f.peek(), Some(winners[0]));

        for i in 0..8 {
            if let Err(Error::DoubleCompletion) = promise.complete(i) {
                losers += 1;
            }
        }
        assert_eq!(losers, 8);
        assert_eq!(f.peek(), Some(winners[0]));
    }
}
