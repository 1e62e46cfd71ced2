// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use super::state::Core;

/// The write side of a `Future`
///
/// Clones share the same core; whichever settles it first wins, every later
/// attempt gets `Error::DoubleCompletion`.
pub struct Promise<T> {
    core: Arc<Core<T>>,
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Promise<T> {
        Promise { core: self.core.clone() }
    }
}

impl<T> Promise<T>
    where T: Clone + Send + 'static
{
    pub(crate) fn with_core(core: Arc<Core<T>>) -> Promise<T> {
        Promise { core }
    }

    pub fn complete(&self, val: T) -> Result<()> {
        self.core.settle(Ok(val))
    }

    pub fn fail(&self, err: Error) -> Result<()> {
        self.core.settle(Err(err))
    }

    pub fn settle(&self, result: Result<T>) -> Result<()> {
        self.core.settle(result)
    }

    pub fn is_done(&self) -> bool {
        self.core.is_settled()
    }
}

impl<T> fmt::Debug for Promise<T>
    where T: Clone + Send + 'static
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Promise({})", self.core.state_name())
    }
}
