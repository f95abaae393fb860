//! Core of the trip planner.
//!
//! - `event`: trip events, destinations and offers
//! - `api`: the HTTP client for the trip server
//! - `store` and `queue`: local persistence for offline use
//! - `provider`: offline-first access that syncs when the network comes back
//! - `model`, `summary`, `statistics`: what the views display

pub mod api;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod event;
pub mod model;
pub mod provider;
pub mod queue;
pub mod statistics;
pub mod store;
pub mod summary;

#[cfg(test)]
mod testing;

pub use api::{Api, RemoteApi};
pub use config::TripConfig;
pub use connectivity::{Connectivity, NetworkStatus, Transition};
pub use error::{TripError, TripResult};
pub use event::*;
pub use provider::Provider;
