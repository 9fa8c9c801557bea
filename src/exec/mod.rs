// src/exec/mod.rs

//! Subprocess channel layer.
//!
//! This module is responsible for actually running one step process at a
//! time and streaming its output back to the pipeline.
//!
//! - [`backend`] defines the `SubprocessChannel` trait every backend
//!   satisfies and the `CommandSpec` it consumes.
//! - [`channel`] is the `tokio::process` implementation used in production.
//! - [`quote`] composes quoted command lines.
//! - [`utf8`] turns raw pipe chunks into text without splitting characters.

pub mod backend;
pub mod channel;
pub mod quote;
pub mod utf8;

pub use backend::{ChunkFn, CommandSpec, SubprocessChannel};
pub use channel::{Shell, TokioChannel};
pub use quote::{quote, CommandLine};
pub use utf8::Utf8Chunker;
