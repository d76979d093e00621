//! Client side of the remote simulation service.
//!
//! # Modules
//!
//! - [`service`] -- The [`SimulationService`] trait and endpoint table
//! - [`http`] -- [`HttpSimulationService`], the `reqwest` implementation
//! - [`error`] -- [`ClientError`]

pub mod error;
pub mod http;
pub mod service;

pub use error::ClientError;
pub use http::HttpSimulationService;
pub use service::{Endpoint, SimulationService};
