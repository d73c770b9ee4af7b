//! # retroview
//!
//! Real-time presentation pipeline for a legacy-console capture unit.
//!
//! Frames produced by the capture hardware are optionally rescaled and
//! gamma-corrected, presented through a double-buffered display, and can be
//! diverted to storage as a BMP screenshot with a button chord.
//!
//! The pipeline owns no platform code: every hardware block it needs
//! (capture unit, command processor, transfer engine, display, input, clock,
//! storage) is consumed through the narrow traits in [`hal`]. Real drivers
//! implement those traits over hardware; tests implement them over plain
//! memory.
//!
//! ## Usage
//!
//! ```no_run
//! use retroview::{config::VideoConfig, video};
//!
//! # fn devices() -> retroview::hal::Devices { unimplemented!() }
//! // Bring the pipeline up; frames flow on a dedicated task from here on.
//! let video = video::init(devices(), &VideoConfig::default()).unwrap();
//!
//! // ... run ...
//!
//! // Tearing down the capture unit closes the frame-ready signal and the
//! // pipeline task terminates itself.
//! video.exit().unwrap();
//! ```

pub mod capture;
pub mod cmdlist;
pub mod color;
pub mod config;
pub mod hal;
pub mod image;
pub mod pipeline;
pub mod video;
