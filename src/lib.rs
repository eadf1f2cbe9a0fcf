//! Duet Entitlements - purchase verification and shared Plus entitlement.
//!
//! This crate verifies App Store / Play Store subscription purchases and
//! reconciles the derived "Plus" entitlement across linked pairs of users.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
