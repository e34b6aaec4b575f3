//! Desktop recorder - screen and audio capture supervisor
//!
//! This crate compiles a recording configuration into a gst-launch
//! pipeline and supervises the external process that runs it: starting,
//! detecting that the pipeline launched, stopping it with an EOS-triggering
//! interrupt and enumerating PulseAudio capture sources.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Configuration values, pipeline compilation, session state and errors
//! - **Application**: Launch detection, device listing and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (gst-launch, pacmd, XDG config, clock)
//! - **CLI**: Command-line interface, argument parsing, logging and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
