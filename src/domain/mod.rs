//! Domain layer - pure business logic with no external dependencies.
//!
//! This layer contains the core concepts of adaptive throttling:
//! - Window entries and their expiry
//! - The admission ratio and the admit/reject decision
//! - The rejection error and the attempt error wrapper
//!
//! All types in this layer are pure and easily testable.

pub mod decision;
pub mod entry;
pub mod rejection;
