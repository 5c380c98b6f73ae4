//! End-to-end tests for the scan engine, run against loopback listeners.

mod monitor;
mod scan;
mod utils;
