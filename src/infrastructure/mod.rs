//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with external systems like gst-launch and PulseAudio.

pub mod clock;
pub mod config;
pub mod devices;
pub mod recording;

// Re-export adapters
pub use clock::SystemClock;
pub use config::XdgConfigStore;
pub use devices::PacmdDeviceLister;
pub use recording::GstRecorder;
