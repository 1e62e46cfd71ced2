// Copyright 2015 The coio Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

extern crate cofuture;
extern crate env_logger;

use cofuture::{all_of, make, BoxError, Future, ThreadPool};

fn main() {
    env_logger::init();

    let pool = ThreadPool::builder().workers(4).name_prefix("Demo").build().unwrap();

    let r = Future::spawn(|| if true { Ok(1.23) } else { Err("Final error") }, &pool)
        .then_apply(|res| {
                        assert_eq!(res, 1.23);
                        34
                    },
                    &pool)
        .handle(|res| match res {
            Ok(n) => n,
            Err(err) => {
                println!("Failed: {}", err);
                35
            }
        });

    assert_eq!(r.join().unwrap(), 34);

    // Settle a future by hand from another thread
    let (promise, answer) = make();
    let worker = std::thread::spawn(move || promise.complete(42).unwrap());
    println!("Answer: {}", answer.join().unwrap());
    worker.join().unwrap();

    let names = ["Earth", "Solar"];
    let greetings: Vec<_> = names.iter()
        .map(|&name| {
            Future::spawn(move || if name == "Earth" {
                              Err::<String, BoxError>("Oops...".into())
                          } else {
                              Ok(format!("Hello, {}!", name))
                          },
                          &pool)
                .handle(|r| r.unwrap_or_else(|_| "Job throws error!".to_owned()))
        })
        .collect();

    all_of(&greetings).join().unwrap();

    for g in &greetings {
        println!("{}", g.peek_or(String::new()));
    }

    pool.join();
}
