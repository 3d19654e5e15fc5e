//! Infrastructure adapters. Implement outbound ports and the inbound UI.
//!
//! Storage, clock, identity, terminal UI. Map errors to DomainError.

pub mod clock;
pub mod identity;
pub mod persistence;
pub mod ui;
