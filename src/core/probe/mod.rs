//! Probe capability
//!
//! A probe performs one bounded-time health request against a single
//! dependency. The orchestrator only ever sees the [`Probe`] trait; concrete
//! transports live in [`http`] and [`rpc`].

mod classify;
mod factory;
pub mod http;
pub mod rpc;
mod types;

pub use factory::build_probe;
pub use http::HttpProbe;
pub use rpc::JsonRpcProbe;
pub use types::{DependencyId, ErrorKind, Probe, ProbeFailure, ProbeResult};
