// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Executors run submitted tasks on some thread, at some time
//!
//! Futures never pick a thread themselves. Every operation that runs user
//! code asynchronously takes an `Executor`, so the pool policy stays with the
//! caller.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::Builder;

use crate::error::{Error, Result};

pub use self::pool::{ThreadPool, ThreadPoolBuilder};

mod pool;

/// A unit of work handed to an executor
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Something that can run a `Task` without blocking the submitter.
///
/// Returning `Err` means the task was not accepted and will never run;
/// implementations should report that as `Error::ExecutorRejected`.
pub trait Executor: Send + Sync {
    fn execute(&self, task: Task) -> Result<()>;
}

impl<'a, E: Executor + ?Sized> Executor for &'a E {
    #[inline]
    fn execute(&self, task: Task) -> Result<()> {
        (**self).execute(task)
    }
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    #[inline]
    fn execute(&self, task: Task) -> Result<()> {
        (**self).execute(task)
    }
}

impl<E: Executor + ?Sized> Executor for Box<E> {
    #[inline]
    fn execute(&self, task: Task) -> Result<()> {
        (**self).execute(task)
    }
}

/// Runs every task right away on the submitting thread
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

impl Executor for Immediate {
    fn execute(&self, task: Task) -> Result<()> {
        task();
        Ok(())
    }
}

/// Spawns a fresh OS thread for every task
#[derive(Debug, Clone, Default)]
pub struct ThreadPerTask {
    counter: Arc<AtomicUsize>,
    stack_size: Option<usize>,
}

impl ThreadPerTask {
    pub fn new() -> ThreadPerTask {
        ThreadPerTask::default()
    }

    pub fn with_stack_size(stack_size: usize) -> ThreadPerTask {
        ThreadPerTask {
            counter: Arc::new(AtomicUsize::new(0)),
            stack_size: Some(stack_size),
        }
    }

    /// Number of threads spawned so far
    pub fn spawned(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }
}

impl Executor for ThreadPerTask {
    fn execute(&self, task: Task) -> Result<()> {
        let id = self.counter.fetch_add(1, Ordering::SeqCst);

        let mut builder = Builder::new().name(format!("Task #{}", id));
        if let Some(size) = self.stack_size {
            builder = builder.stack_size(size);
        }

        match builder.spawn(task) {
            Ok(_) => Ok(()),
            Err(err) => {
                warn!("Failed to spawn thread for task #{}: {}", id, err);
                Err(Error::ExecutorRejected(err.to_string()))
            }
        }
    }
}
