//! Wall clock port interface

use chrono::NaiveDateTime;

/// Port for reading local wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}
