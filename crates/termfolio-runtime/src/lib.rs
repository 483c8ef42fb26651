#![forbid(unsafe_code)]

//! termfolio runtime
//!
//! Ties the core and render crates into an Elm-style program.
//!
//! # Key Components
//!
//! - [`Model`] - Trait for application state and behavior
//! - [`Cmd`] - Commands for side effects
//! - [`Subscription`] - Trait for continuous event sources
//! - [`Every`] - Built-in tick subscription
//! - [`TimerSet`] - Virtual-time driver for periodic subscriptions
//! - [`Program`] - Native terminal loop (not on wasm)
//! - [`ProgramSimulator`] - Deterministic driver for tests

pub mod program;
pub mod simulator;
pub mod subscription;

pub use program::{Cmd, Model};
#[cfg(not(target_arch = "wasm32"))]
pub use program::{Program, ProgramConfig};
pub use simulator::{CmdRecord, ProgramSimulator};
pub use subscription::{Every, StopSignal, SubId, Subscription, SubscriptionManager, TimerSet};
