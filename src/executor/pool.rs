// The MIT License (MIT)

// Copyright (c) 2015 Y. T. Chung <zonyitoo@gmail.com>

// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:

// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Fixed-size thread pool

use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, Builder};

use crossbeam_channel::{self as channel, Receiver, Sender, TrySendError};

use crate::error::{Error, Result};
use crate::options::Options;
use super::{Executor, Task};

struct Inner {
    sender: Mutex<Option<Sender<Task>>>,
    handles: Mutex<Vec<thread::JoinHandle<()>>>,
    opts: Options,
}

impl Inner {
    fn sender(&self) -> MutexGuard<Option<Sender<Task>>> {
        self.sender.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A pool of worker threads pulling tasks from one shared queue.
///
/// Handles are cheap to clone and all refer to the same workers. The pool
/// shuts down when `shutdown` is called or the last handle is dropped; queued
/// tasks still run before the workers exit.
#[derive(Clone)]
pub struct ThreadPool {
    inner: Arc<Inner>,
}

impl ThreadPool {
    /// Create a pool with `workers` threads and an unbounded queue
    pub fn new(workers: usize) -> io::Result<ThreadPool> {
        ThreadPool::builder().workers(workers).build()
    }

    pub fn builder() -> ThreadPoolBuilder {
        ThreadPoolBuilder::new()
    }

    pub fn with_options(opts: Options) -> io::Result<ThreadPool> {
        if opts.workers == 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "Must have at least one worker"));
        }

        let (tx, rx) = match opts.queue_capacity {
            Some(cap) => channel::bounded(cap),
            None => channel::unbounded(),
        };

        let mut handles = Vec::with_capacity(opts.workers);
        for id in 0..opts.workers {
            let rx = rx.clone();
            let name = format!("{} #{}", opts.name_prefix, id);

            let mut builder = Builder::new().name(name.clone());
            if let Some(size) = opts.stack_size {
                builder = builder.stack_size(size);
            }

            // Dropping `tx` on the error path lets already started workers exit.
            handles.push(builder.spawn(move || work(name, rx))?);
        }

        debug!("Started thread pool with {} workers", opts.workers);

        Ok(ThreadPool {
            inner: Arc::new(Inner {
                sender: Mutex::new(Some(tx)),
                handles: Mutex::new(handles),
                opts,
            }),
        })
    }

    /// Number of worker threads
    pub fn workers(&self) -> usize {
        self.inner.opts.workers
    }

    /// Number of tasks waiting for a worker
    pub fn queued(&self) -> usize {
        self.inner.sender().as_ref().map_or(0, Sender::len)
    }

    pub fn is_shutdown(&self) -> bool {
        self.inner.sender().is_none()
    }

    /// Stop accepting tasks. Already queued tasks still run.
    pub fn shutdown(&self) {
        if self.inner.sender().take().is_some() {
            debug!("Thread pool is shutting down");
        }
    }

    /// Shut down and wait for every worker thread to exit
    pub fn join(&self) {
        self.shutdown();

        let handles = {
            let mut handles = self.inner.handles.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *handles)
        };

        let me = thread::current().id();
        for hdl in handles {
            if hdl.thread().id() == me {
                // Joining from inside the pool; this worker exits on its own.
                continue;
            }

            if hdl.join().is_err() {
                error!("Worker thread panicked outside of a task");
            }
        }
    }
}

impl Executor for ThreadPool {
    fn execute(&self, task: Task) -> Result<()> {
        let guard = self.inner.sender();

        let sender = match *guard {
            Some(ref sender) => sender,
            None => return Err(Error::ExecutorRejected("thread pool is shut down".to_owned())),
        };

        match sender.try_send(task) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(..)) => {
                warn!("Thread pool queue is full, rejecting task");
                Err(Error::ExecutorRejected(format!("queue is full (capacity {})",
                                                    sender.capacity().unwrap_or(0))))
            }
            Err(TrySendError::Disconnected(..)) => {
                Err(Error::ExecutorRejected("thread pool has no workers left".to_owned()))
            }
        }
    }
}

impl fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ThreadPool")
            .field("workers", &self.workers())
            .field("queued", &self.queued())
            .field("shutdown", &self.is_shutdown())
            .finish()
    }
}

fn work(name: String, rx: Receiver<Task>) {
    trace!("{}: started", name);

    for task in rx.iter() {
        if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
            error!("{}: task panicked", name);
        }
    }

    trace!("{}: exiting", name);
}

/// Thread pool configuration, chaining on top of `Options`
pub struct ThreadPoolBuilder {
    opts: Options,
}

impl ThreadPoolBuilder {
    pub fn new() -> ThreadPoolBuilder {
        ThreadPoolBuilder { opts: Options::new() }
    }

    /// Sets the number of worker threads.
    #[inline]
    pub fn workers(mut self, workers: usize) -> ThreadPoolBuilder {
        self.opts.workers(workers);
        self
    }

    /// Sets the prefix of worker thread names.
    #[inline]
    pub fn name_prefix<S: Into<String>>(mut self, prefix: S) -> ThreadPoolBuilder {
        self.opts.name_prefix(prefix.into());
        self
    }

    /// Sets the stack size of worker threads.
    #[inline]
    pub fn stack_size(mut self, stack_size: usize) -> ThreadPoolBuilder {
        self.opts.stack_size(stack_size);
        self
    }

    /// Bounds the task queue; submissions beyond it are rejected.
    #[inline]
    pub fn queue_capacity(mut self, capacity: usize) -> ThreadPoolBuilder {
        self.opts.queue_capacity(capacity);
        self
    }

    pub fn build(self) -> io::Result<ThreadPool> {
        ThreadPool::with_options(self.opts)
    }
}

impl Default for ThreadPoolBuilder {
    fn default() -> ThreadPoolBuilder {
        ThreadPoolBuilder::new()
    }
}
