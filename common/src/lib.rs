//! # Undead Common
//!
//! Shared model for the `undead` workspace: the [`target::Target`] record that flows
//! through every scan round, and the validated [`config::RunConfig`] that drives it.

pub mod config;
pub mod target;
