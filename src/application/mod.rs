//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the domain logic and owns the shared state:
//! - Rolling window (expiring entries and live counters)
//! - Throttle (drain, decide, execute, record)
//! - Call-shape adapters
//! - Metrics and the per-zone registry
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod metrics;
pub mod ports;
pub mod registry;
pub mod throttle;
pub mod window;
pub mod wrap;
