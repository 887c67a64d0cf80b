//! SmartDub - Video Dubbing Job Configurator
//!
//! Walks a dubbing/captioning job through upload, configuration, script
//! duration reconciliation, (simulated) processing and result review.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod pipeline;
pub mod result;
pub mod rewrite;
pub mod settings;
pub mod wizard;
pub mod workflow;
