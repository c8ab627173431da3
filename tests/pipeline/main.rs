//! End-to-end pipeline tests against the in-memory broker.
//!
//! - Employee events turn into account emails
//! - Notification events turn into notification rows
//! - Poison messages, lookup misses and failing collaborators never stop a loop
//! - Offsets are committed only after the handler returns

mod support;
mod delivery;
mod employee;
mod notifications;
