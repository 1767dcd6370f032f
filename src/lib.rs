//! Adds or removes host rules on a single Kubernetes ingress.
//!
//! Meant for CI pipelines wiring up preview environments: one read, at most
//! one write, and an exit status telling whether anything changed.

pub mod cli;
pub mod cluster;
pub mod driver;
pub mod editor;
pub mod error;
pub mod rules;
pub mod status;
pub mod store;
