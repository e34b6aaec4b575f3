//! Application layer - Use cases and port interfaces
//!
//! Contains device listing, launch detection and the trait
//! definitions for external system interactions.

pub mod devices;
pub mod launch;
pub mod ports;

pub use devices::{list_audio_devices, parse_device_listing, AudioDevices};
pub use launch::{drain_output, launch_timer, LaunchSignal, LaunchTimer, LaunchToken, LAUNCH_QUIET_PERIOD};
