//! # pframe Web UI
//!
//! Playlist server for a remotely-polled photo frame. Owns the in-memory
//! playlist state machine (current item, pending queue, bounded history)
//! and exposes it over a REST API consumed by the browser control page and
//! the polling display client.

pub mod api;
pub mod config;
pub mod playlist;
pub mod state;
