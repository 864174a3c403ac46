//! JSON-RPC API Layer
//!
//! Implements the JSON-RPC 2.0 gateway for Taskhub: token authentication,
//! per-operation role checks and per-caller throttling in front of the
//! application services.

pub mod error;
pub mod handler;
pub mod rate_limiter;
pub mod server;
pub mod types;

pub use handler::{GatewayServices, RpcHandler};
pub use rate_limiter::ThrottleConfig;
pub use server::{RpcServer, RpcServerConfig, RunningServer};
