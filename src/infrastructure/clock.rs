//! Local wall clock adapter

use chrono::{Local, NaiveDateTime};

use crate::application::ports::Clock;

/// Reads the system clock in the local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
