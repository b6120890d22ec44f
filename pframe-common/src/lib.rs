//! # pframe Common Library
//!
//! Shared code for the pframe services:
//! - Error taxonomy (`Error` enum)
//! - Settings model with bounds validation
//! - Wire types exchanged between the web UI and the polling client

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{FramePayload, ImageStub, Settings, SettingsUpdate, StateSnapshot};
