// The MIT License (MIT)

// Copyright (c) 2015 Y. T. Chung <zonyitoo@gmail.com>

//  Permission is hereby granted, free of charge, to any person obtaining a
//  copy of this software and associated documentation files (the "Software"),
//  to deal in the Software without restriction, including without limitation
//  the rights to use, copy, modify, merge, publish, distribute, sublicense,
//  and/or sell copies of the Software, and to permit persons to whom the
//  Software is furnished to do so, subject to the following conditions:
//
//  The above copyright notice and this permission notice shall be included in
//  all copies or substantial portions of the Software.
//
//  THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS
//  OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
//  FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
//  AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
//  LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
//  FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
//  DEALINGS IN THE SOFTWARE.

//! Blocking futures and promises over pluggable executors
//!
//! ```
//! use cofuture::{Future, ThreadPool};
//!
//! let pool = ThreadPool::new(2).unwrap();
//!
//! let f = Future::spawn(|| Ok::<_, cofuture::BoxError>("Hello, Future!".to_owned()), &pool)
//!     .then_apply(|s| s.to_uppercase(), &pool);
//!
//! assert_eq!(f.join().unwrap(), "HELLO, FUTURE!");
//! ```

#[macro_use]
extern crate log;

pub use error::{BoxError, Error, Result};
pub use executor::{Executor, Immediate, Task, ThreadPerTask, ThreadPool, ThreadPoolBuilder};
pub use future::{all_of, make, Future, Promise};
pub use options::Options;

pub mod error;
pub mod executor;
pub mod future;
pub mod options;
pub mod sync;

/// A future that is already completed with `val`
#[inline(always)]
pub fn completed<T>(val: T) -> Future<T>
    where T: Clone + Send + 'static
{
    Future::completed(val)
}

/// Run `task` on `executor`, see `Future::spawn`
#[inline]
pub fn spawn<T, F, E, X>(task: F, executor: &X) -> Future<T>
    where T: Clone + Send + 'static,
          F: FnOnce() -> ::std::result::Result<T, E> + Send + 'static,
          E: Into<BoxError>,
          X: Executor + ?Sized
{
    Future::spawn(task, executor)
}

/// Run `task` on `executor` for its side effects, see `Future::run`
#[inline]
pub fn run<F, X>(task: F, executor: &X) -> Future<()>
    where F: FnOnce() + Send + 'static,
          X: Executor + ?Sized
{
    Future::run(task, executor)
}
