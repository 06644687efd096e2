// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! picasa2shotwell: Picasa to Shotwell metadata migration
//!
//! Reads tags and captions from a Picasa database snapshot and the per-folder
//! `.picasa.ini` files, turns folder names into events, and writes the result
//! into a Shotwell library and, optionally, into the media files themselves.

pub mod classify;
pub mod config;
pub mod embed;
pub mod error;
pub mod events;
pub mod migrate;
pub mod reconcile;
pub mod records;
pub mod report;
pub mod sources;
pub mod target;

pub use config::MigrationConfig;
pub use error::{MigrationError, Result};
