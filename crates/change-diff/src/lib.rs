//! Change Diff library
//!
//! Reconciles two snapshots of a record collection into added, removed and
//! modified records, and serves that computation over a framed
//! request/reply socket protocol.

pub mod client;
pub mod commands;
pub mod diff;
pub mod output;
pub mod protocol;
pub mod server;
pub mod utils;
