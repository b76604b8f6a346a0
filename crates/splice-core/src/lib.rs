//! Splice Core - Foundation types for timeline editing
//!
//! This crate provides the fundamental types used throughout Splice:
//! - Time representation (RationalTime, FrameRate, TimeRange)
//! - Track kinds and their compatibility rules
//! - The shared error taxonomy
//! - Configuration loading and tracing setup

pub mod config;
pub mod error;
pub mod kind;
pub mod logging;
pub mod time;

pub use config::{EditorConfig, ExportPolicy, LoggingConfig, TimelineDefaults, ToolPaths};
pub use error::{Result, SpliceError, ValidationError};
pub use kind::TrackKind;
pub use time::{FrameRate, RationalTime, TimeRange};
