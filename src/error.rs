// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Failures carried by futures

use std::any::Any;
use std::error;
use std::sync::Arc;

use thiserror::Error;

/// Any error a task may return
pub type BoxError = Box<dyn error::Error + Send + Sync + 'static>;

pub type Result<T> = ::std::result::Result<T, Error>;

#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The task (or a continuation) returned an error or panicked.
    #[error("{0}")]
    TaskFailure(Arc<dyn error::Error + Send + Sync + 'static>),

    /// The executor refused to accept the task.
    #[error("executor rejected task: {0}")]
    ExecutorRejected(String),

    /// Returned by `Future::join` on a failed future, wrapping the stored failure.
    #[error("future completed with failure: {0}")]
    JoinFailure(#[source] Box<Error>),

    /// Somebody tried to settle a future that already settled.
    #[error("future is already completed")]
    DoubleCompletion,
}

impl Error {
    /// Wrap anything error-like as a `TaskFailure`
    pub fn task<E: Into<BoxError>>(err: E) -> Error {
        let err: BoxError = err.into();
        Error::TaskFailure(Arc::from(err))
    }

    /// The failure wrapped by a `JoinFailure`, or `self` for every other kind
    pub fn cause(&self) -> &Error {
        match *self {
            Error::JoinFailure(ref cause) => cause,
            ref other => other,
        }
    }

    pub fn is_task_failure(&self) -> bool {
        matches!(*self, Error::TaskFailure(..))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(*self, Error::ExecutorRejected(..))
    }

    pub(crate) fn from_panic(payload: Box<dyn Any + Send + 'static>) -> Error {
        let msg = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "task panicked".to_owned()
        };

        Error::task(msg)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::error::Error as StdError;
    use std::panic;

    #[test]
    fn test_task_failure_keeps_message() {
        let err = Error::task("Oops");
        assert!(err.is_task_failure());
        assert_eq!(err.to_string(), "Oops");
    }

    #[test]
    fn test_join_failure_source() {
        let err = Error::JoinFailure(Box::new(Error::task("Oops")));

        assert_eq!(err.cause().to_string(), "Oops");
        assert_eq!(err.source().map(|e| e.to_string()), Some("Oops".to_owned()));
        assert!(err.to_string().contains("Oops"));
    }

    #[test]
    fn test_cause_of_plain_error_is_itself() {
        let err = Error::ExecutorRejected("pool is shut down".to_owned());
        assert!(err.cause().is_rejected());
    }

    #[test]
    fn test_from_panic_payload() {
        let payload = panic::catch_unwind(|| panic!("boom {}", 1)).unwrap_err();
        assert_eq!(Error::from_panic(payload).to_string(), "boom 1");

        let payload = panic::catch_unwind(|| panic!("static boom")).unwrap_err();
        assert_eq!(Error::from_panic(payload).to_string(), "static boom");
    }
}
