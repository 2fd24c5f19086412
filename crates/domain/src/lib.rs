//! Shared configuration, error and trace types for the VoiceChat crates.

pub mod config;
pub mod error;
pub mod trace;
