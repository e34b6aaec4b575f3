//! Recording infrastructure module
//!
//! Supervises an external gst-launch process that captures the screen
//! (and optionally an audio source) into the configured sink.

mod gst_launch;

pub use gst_launch::GstRecorder;
