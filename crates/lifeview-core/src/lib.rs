//! Session logic for the Lifeview controller.
//!
//! This crate keeps a local mirror of a remotely simulated cellular
//! automaton in step with the service, paces the simulation under user
//! control and redraws the view after every change.
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration with env overrides and validation
//! - [`controls`] -- Linked count/density controls and the control state
//! - [`mirror`] -- Snapshot cache with ticketed reply ordering
//! - [`scheduler`] -- Run mode, evolve cycle and auto-refresh timer
//! - [`controller`] -- The [`Controller`] that wires intents to all of the above

pub mod config;
pub mod controller;
pub mod controls;
pub mod mirror;
pub mod scheduler;

pub use config::{ConfigError, ControllerConfig};
pub use controller::{Controller, ControllerError};
pub use controls::{ControlError, ControlState, LinkedControlPair};
pub use mirror::{MirrorView, RefreshOutcome, ReplyOrdering, StateMirror};
pub use scheduler::{PollingScheduler, RunTicket};
