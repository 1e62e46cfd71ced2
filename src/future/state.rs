// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::sync::spinlock::Spinlock;

/// Callback receiving the settled result of a `Core`
pub type Continuation<T> = Box<dyn FnOnce(Result<T>) + Send + 'static>;

struct Inner<T> {
    result: Option<Result<T>>,
    queue: VecDeque<Continuation<T>>,
    // Set while the settling thread drains `queue`; registrations made in the
    // meantime are queued behind the ones being run.
    dispatching: bool,
}

type Job = Box<dyn FnOnce()>;

thread_local! {
    // `Some` while this thread is draining dispatches. Cores settled by a
    // continuation during the drain are appended here instead of recursing.
    static DEFERRED: RefCell<Option<VecDeque<Job>>> = RefCell::new(None);
}

/// The shared state between a `Promise` and its `Future`s
///
/// A `Core` is settled at most once. Continuations passed to `set_next`
/// before that are queued and run, in order, by the settling thread.
/// Continuations passed afterwards run right away on the calling thread,
/// unless the settling thread is still draining the queue, in which case
/// they are queued behind it.
///
/// A settle issued from inside a continuation does not dispatch on the
/// spot; the outermost dispatch on that thread picks it up once the current
/// continuation returns, so a chain of N stages never nests N frames deep.
pub struct Core<T> {
    inner: Spinlock<Inner<T>>,
}

impl<T> Core<T>
    where T: Clone + Send + 'static
{
    pub fn new(result: Option<Result<T>>) -> Arc<Core<T>> {
        Arc::new(Core {
            inner: Spinlock::new(Inner {
                result,
                queue: VecDeque::new(),
                dispatching: false,
            }),
        })
    }

    /// Store the result and run the queued continuations.
    ///
    /// Fails with `DoubleCompletion` if the core is already settled, leaving
    /// the stored result untouched.
    pub fn settle(self: &Arc<Self>, result: Result<T>) -> Result<()> {
        {
            let mut inner = self.inner.lock();

            if inner.result.is_some() {
                drop(inner);
                warn!("Attempted to settle an already settled future");
                return Err(Error::DoubleCompletion);
            }

            inner.result = Some(result);
            if inner.queue.is_empty() {
                return Ok(());
            }
            inner.dispatching = true;
        }

        let core = self.clone();
        run_or_defer(Box::new(move || core.dispatch()));
        Ok(())
    }

    pub fn set_next(&self, next: Continuation<T>) {
        let result = {
            let mut inner = self.inner.lock();

            if inner.result.is_none() || inner.dispatching {
                inner.queue.push_back(next);
                return;
            }

            inner.result.clone()
        };

        if let Some(result) = result {
            invoke(next, result);
        }
    }

    /// A copy of the result, if settled
    pub fn result(&self) -> Option<Result<T>> {
        self.inner.lock().result.clone()
    }

    pub fn is_settled(&self) -> bool {
        self.inner.lock().result.is_some()
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.inner.lock().result, Some(Err(..)))
    }

    /// The value, if settled successfully
    pub fn value(&self) -> Option<T> {
        match self.inner.lock().result {
            Some(Ok(ref val)) => Some(val.clone()),
            _ => None,
        }
    }

    pub(crate) fn state_name(&self) -> &'static str {
        match self.inner.lock().result {
            None => "Pending",
            Some(Ok(..)) => "Completed",
            Some(Err(..)) => "Failed",
        }
    }

    fn dispatch(&self) {
        loop {
            let (batch, result) = {
                let mut inner = self.inner.lock();

                if inner.queue.is_empty() {
                    inner.dispatching = false;
                    return;
                }

                let result = match inner.result.clone() {
                    Some(result) => result,
                    None => {
                        inner.dispatching = false;
                        return;
                    }
                };

                (mem::take(&mut inner.queue), result)
            };

            for next in batch {
                invoke(next, result.clone());
            }
        }
    }
}

/// Run `job` now, or queue it if this thread is already draining jobs
fn run_or_defer(job: Job) {
    let mut next = DEFERRED.with(|deferred| {
        let mut deferred = deferred.borrow_mut();
        match *deferred {
            Some(ref mut queue) => {
                queue.push_back(job);
                None
            }
            None => {
                *deferred = Some(VecDeque::new());
                Some(job)
            }
        }
    });

    while let Some(job) = next {
        job();

        next = DEFERRED.with(|deferred| {
            let mut deferred = deferred.borrow_mut();
            let job = deferred.as_mut().and_then(VecDeque::pop_front);
            if job.is_none() {
                *deferred = None;
            }
            job
        });
    }
}

fn invoke<T>(next: Continuation<T>, result: Result<T>) {
    // A panicking callback must not keep the rest of the queue from running.
    if panic::catch_unwind(AssertUnwindSafe(move || next(result))).is_err() {
        error!("A future continuation panicked");
    }
}
