// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! One-shot hand-off that parks the waiting thread until a value is set

use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

enum State<T> {
    Empty,
    Waiting,
    Ready(T),
    Taken,
}

/// A single value passed from one setter to one waiter.
///
/// `set` may happen before or after `wait`; the waiter sleeps on a condition
/// variable in the latter case.
pub struct Latch<T> {
    lock: Mutex<State<T>>,
    cond: Condvar,
}

impl<T> Latch<T> {
    pub fn new() -> Latch<T> {
        Latch {
            lock: Mutex::new(State::Empty),
            cond: Condvar::new(),
        }
    }

    // Nothing panics while the lock is held, so a poisoned lock still holds a sane state.
    fn guard(&self) -> MutexGuard<State<T>> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block the current thread until a value is set, then take it.
    ///
    /// Returns `None` if the value was already taken by an earlier `wait`.
    pub fn wait(&self) -> Option<T> {
        let mut guard = self.guard();

        loop {
            match std::mem::replace(&mut *guard, State::Taken) {
                State::Ready(val) => return Some(val),
                State::Taken => return None,
                State::Empty | State::Waiting => {
                    *guard = State::Waiting;
                    guard = self.cond.wait(guard).unwrap_or_else(PoisonError::into_inner);
                }
            }
        }
    }

    /// Hand the value over, waking the waiter if there is one.
    ///
    /// A second `set` replaces a value nobody has taken yet.
    pub fn set(&self, val: T) {
        let mut guard = self.guard();

        let waiting = matches!(*guard, State::Waiting);
        *guard = State::Ready(val);

        if waiting {
            self.cond.notify_one();
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(*self.guard(), State::Ready(..))
    }
}

impl<T> Default for Latch<T> {
    fn default() -> Latch<T> {
        Latch::new()
    }
}

impl<T> fmt::Debug for Latch<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.guard() {
            State::Empty => write!(f, "Latch(Empty)"),
            State::Waiting => write!(f, "Latch(Waiting)"),
            State::Ready(..) => write!(f, "Latch(Ready)"),
            State::Taken => write!(f, "Latch(Taken)"),
        }
    }
}
