// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Thread pool options

/// Default worker thread name prefix
pub const DEFAULT_NAME_PREFIX: &str = "Worker";

/// Thread pool options
#[derive(Debug, Clone)]
pub struct Options {
    /// Number of worker threads, at least one
    pub workers: usize,
    /// Worker threads are named `"{name_prefix} #{id}"`
    pub name_prefix: String,
    /// Stack size of each worker thread, platform default if `None`
    pub stack_size: Option<usize>,
    /// Maximum number of queued tasks, unbounded if `None`
    pub queue_capacity: Option<usize>,
}

impl Options {
    pub fn new() -> Options {
        Options {
            workers: num_cpus::get(),
            name_prefix: DEFAULT_NAME_PREFIX.to_owned(),
            stack_size: None,
            queue_capacity: None,
        }
    }

    pub fn workers(&mut self, workers: usize) -> &mut Options {
        self.workers = workers;
        self
    }

    pub fn name_prefix(&mut self, prefix: String) -> &mut Options {
        self.name_prefix = prefix;
        self
    }

    pub fn stack_size(&mut self, size: usize) -> &mut Options {
        self.stack_size = Some(size);
        self
    }

    pub fn queue_capacity(&mut self, capacity: usize) -> &mut Options {
        self.queue_capacity = Some(capacity);
        self
    }
}

impl Default for Options {
    fn default() -> Options {
        Options::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = Options::default();

        assert!(opts.workers >= 1);
        assert_eq!(opts.name_prefix, DEFAULT_NAME_PREFIX);
        assert!(opts.stack_size.is_none());
        assert!(opts.queue_capacity.is_none());
    }

    #[test]
    fn test_chained_setters() {
        let mut opts = Options::new();
        opts.workers(5).name_prefix("Pool".to_owned()).queue_capacity(16);

        assert_eq!(opts.workers, 5);
        assert_eq!(opts.name_prefix, "Pool");
        assert_eq!(opts.queue_capacity, Some(16));
    }
}
