//! # Undead Core
//!
//! The concurrent probing and classification engine.
//!
//! ## Pipeline
//! * **[`resolver`]**: hostname or literal address to [`std::net::IpAddr`], once per run.
//! * **[`probe`]**: one reachability test (ICMP via the platform `ping`, or TCP connect).
//! * **[`dispatch`]**: bounded-parallel fan-out with a completion barrier.
//! * **[`classify`]**: probe outcomes to a tri-state status.
//! * **[`scanner`]**: ties the above into a single round.
//! * **[`monitor`]**: repeats rounds on an interval until cancelled, publishing each
//!   completed round to a [`sink::ResultSink`].

pub mod classify;
pub mod dispatch;
pub mod monitor;
pub mod probe;
pub mod resolver;
pub mod scanner;
pub mod sink;
