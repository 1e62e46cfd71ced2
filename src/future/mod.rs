// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Futures, promises and their combinators
//!
//! A `Future<T>` settles exactly once, either with a value or with an
//! `Error`. Failures are plain data: they flow through `then_apply` untouched,
//! get turned back into values by `handle`, and only surface as an `Err` when
//! somebody calls `join`.

mod all;
mod state;
mod future;
mod promise;

pub use self::all::all_of;
pub use self::future::Future;
pub use self::promise::Promise;

use std::panic::{self, AssertUnwindSafe};

use crate::error::{Error, Result};
use crate::executor::{Executor, Task};
use self::state::Core;

/// Create a pending `Future` together with the `Promise` that settles it
pub fn make<T>() -> (Promise<T>, Future<T>)
    where T: Clone + Send + 'static
{
    let core = Core::new(None);
    (Promise::with_core(core.clone()), Future::with_core(core))
}

/// Run `f`, turning a panic into a `TaskFailure`
fn catch<R, F>(f: F) -> Result<R>
    where F: FnOnce() -> Result<R>
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let err = Error::from_panic(payload);
            debug!("Task panicked: {}", err);
            Err(err)
        }
    }
}

/// Hand `f` to `executor`; its outcome settles `promise`.
///
/// A rejected submission fails the promise instead of reaching the caller.
fn submit<T, F, X>(executor: &X, promise: Promise<T>, f: F)
    where T: Clone + Send + 'static,
          F: FnOnce() -> Result<T> + Send + 'static,
          X: Executor + ?Sized
{
    let rejected = promise.clone();
    let task: Task = Box::new(move || {
        let _ = promise.settle(catch(f));
    });

    if let Err(err) = executor.execute(task) {
        debug!("Task was not accepted: {}", err);
        let _ = rejected.fail(err);
    }
}
