//! Shared types, adapter traits, and core utilities for Portcullis.
//!
//! This crate contains the foundational types shared between the core crate
//! and the adapter implementations: the error type, the capability
//! identifiers, and the narrow traits through which the core talks to its
//! collaborators (entitlement source, configuration store, URL resolution,
//! type catalog).

pub mod capability;
pub mod catalog_adapter;
pub mod config_adapter;
pub mod entitlement_adapter;
pub mod error;
pub mod prelude;
pub mod url_adapter;

// vim: ts=4
