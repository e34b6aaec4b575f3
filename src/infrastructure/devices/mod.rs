//! Audio device listing adapters

mod pacmd;

pub use pacmd::PacmdDeviceLister;
