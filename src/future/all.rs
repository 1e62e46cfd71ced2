// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::Error;
use crate::sync::spinlock::Spinlock;
use super::{make, Future};

struct Pending {
    remaining: AtomicUsize,
    first_failure: Spinlock<Option<Error>>,
}

/// A future that settles once every one of `futures` has settled.
///
/// A failing member does not stop the others. The result is `Ok(())` if all
/// members completed, otherwise the failure that was observed first.
pub fn all_of<'a, T, I>(futures: I) -> Future<()>
    where T: Clone + Send + 'static,
          I: IntoIterator<Item = &'a Future<T>>
{
    let members: Vec<&Future<T>> = futures.into_iter().collect();
    if members.is_empty() {
        return Future::completed(());
    }

    let total = members.len();
    let (promise, aggregate) = make();
    let pending = Arc::new(Pending {
        remaining: AtomicUsize::new(total),
        first_failure: Spinlock::new(None),
    });

    for member in members {
        let pending = pending.clone();
        let promise = promise.clone();

        member.on_complete(move |result| {
            if let Err(err) = result {
                let mut first = pending.first_failure.lock();
                if first.is_none() {
                    *first = Some(err);
                }
            }

            if pending.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
                let outcome = match pending.first_failure.lock().take() {
                    Some(err) => Err(err),
                    None => Ok(()),
                };

                trace!("all_of: {} members settled", total);
                let _ = promise.settle(outcome);
            }
        });
    }

    aggregate
}
