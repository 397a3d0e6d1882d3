//! Declic: anonymous self-assessment across addictive-behavior topics.
//!
//! The [`survey`] module holds the scoring engine. [`config`], [`error`], and
//! [`telemetry`] carry the shared service plumbing used by the API binary.

pub mod config;
pub mod error;
pub mod survey;
pub mod telemetry;
