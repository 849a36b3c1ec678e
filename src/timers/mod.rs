//! Hierarchy-free named timers for solver instrumentation.
//!
//! Timers are scoped with the [`timeit!`] macro, which times the
//! enclosed block against a named entry.   Repeated scopes with the
//! same name accumulate.   The [`notimeit!`] macro suspends all
//! running timers for the duration of a block, so that printing and
//! other reporting is excluded from the recorded times.

use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Default, Debug)]
pub struct Timers {
    // currently running scopes, innermost last
    stack: Vec<(&'static str, Instant)>,
    // accumulated times for completed scopes
    elapsed: HashMap<&'static str, Duration>,
    // set while notimeit! has the clock stopped
    suspended_at: Option<Instant>,
}

impl Timers {
    pub fn start(&mut self, key: &'static str) {
        self.stack.push((key, Instant::now()));
    }

    pub fn stop(&mut self) {
        let (key, start) = self.stack.pop().expect("no active timer");
        *self.elapsed.entry(key).or_default() += start.elapsed();
    }

    /// suspend all running timers.   Restarted by `resume`.
    pub fn suspend(&mut self) {
        if self.suspended_at.is_none() {
            self.suspended_at = Some(Instant::now());
        }
    }

    pub fn resume(&mut self) {
        if let Some(suspended_at) = self.suspended_at.take() {
            let gap = suspended_at.elapsed();
            // shift active start times forward so the gap is not counted
            for (_, start) in self.stack.iter_mut() {
                *start += gap;
            }
        }
    }

    /// accumulated time for `key`, including any still-running scope
    pub fn read(&self, key: &'static str) -> Duration {
        let mut total = self.elapsed.get(key).copied().unwrap_or(Duration::ZERO);
        for (k, start) in &self.stack {
            if *k == key {
                total += start.elapsed();
            }
        }
        total
    }

    pub fn reset(&mut self, key: &'static str) {
        self.elapsed.remove(key);
    }
}

macro_rules! timeit {
    ($timers:ident => $key:literal; $body:block) => {{
        $timers.start($key);
        let out = $body;
        $timers.stop();
        out
    }};
}

macro_rules! notimeit {
    ($timers:ident; $body:block) => {{
        $timers.suspend();
        let out = $body;
        $timers.resume();
        out
    }};
}

pub(crate) use notimeit;
pub(crate) use timeit;

#[test]
fn test_timer_accumulation() {
    let mut t = Timers::default();

    t.start("outer");
    std::thread::sleep(Duration::from_millis(2));
    t.stop();

    t.start("outer");
    std::thread::sleep(Duration::from_millis(2));
    t.stop();

    assert!(t.read("outer") >= Duration::from_millis(4));
    assert_eq!(t.read("unknown"), Duration::ZERO);
}

#[test]
fn test_timer_read_while_running() {
    let mut t = Timers::default();
    t.start("solve");
    std::thread::sleep(Duration::from_millis(2));
    assert!(t.read("solve") >= Duration::from_millis(2));
    t.stop();
}
