//! Capture backend domain module

mod session_type;

pub use session_type::SessionType;
