//! Match clock with pause/resume and additive penalties
//!
//! `elapsed = (now - start) + penalties` while running, frozen otherwise.

use std::rc::Rc;

use crate::format_time;
use crate::platform::Clock;

pub struct Timer {
    clock: Rc<dyn Clock>,
    start_ms: f64,
    /// Run time captured at the last pause/stop
    frozen_ms: f64,
    penalty_ms: f64,
    running: bool,
    paused: bool,
}

impl Timer {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            start_ms: 0.0,
            frozen_ms: 0.0,
            penalty_ms: 0.0,
            running: false,
            paused: false,
        }
    }

    /// Start counting from zero run time. No-op if already running.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.start_ms = self.clock.now_ms();
        self.frozen_ms = 0.0;
        self.running = true;
        self.paused = false;
    }

    /// Freeze the clock at its current value
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.frozen_ms = self.run_time();
        self.running = false;
        self.paused = false;
    }

    pub fn pause(&mut self) {
        if !self.running || self.paused {
            return;
        }
        self.frozen_ms = self.run_time();
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.start_ms = self.clock.now_ms() - self.frozen_ms;
        self.paused = false;
    }

    pub fn reset(&mut self) {
        self.start_ms = 0.0;
        self.frozen_ms = 0.0;
        self.penalty_ms = 0.0;
        self.running = false;
        self.paused = false;
    }

    /// Add penalty time. Applies immediately, running or not.
    pub fn add_penalty(&mut self, ms: f64) {
        self.penalty_ms += ms.max(0.0);
    }

    pub fn penalties(&self) -> f64 {
        self.penalty_ms
    }

    /// Elapsed milliseconds including penalties
    pub fn elapsed(&self) -> f64 {
        self.run_time() + self.penalty_ms
    }

    /// `MM:SS:mmm`
    pub fn formatted(&self) -> String {
        format_time(self.elapsed())
    }

    /// True while the clock is advancing
    pub fn is_running(&self) -> bool {
        self.running && !self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    fn run_time(&self) -> f64 {
        if self.running && !self.paused {
            (self.clock.now_ms() - self.start_ms).max(0.0)
        } else {
            self.frozen_ms
        }
    }
}
