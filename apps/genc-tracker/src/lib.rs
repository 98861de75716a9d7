//! # genc-tracker
//!
//! HTTP API, CLI and configuration around [`genc_core`]. The binary in
//! `main.rs` is a thin entry point over this library.

pub mod api;
pub mod cli;
pub mod config;
