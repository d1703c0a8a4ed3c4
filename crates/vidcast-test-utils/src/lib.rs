// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Vidcast.
//!
//! Provides a scriptable platform client, a factory that hands it out, and a
//! harness backed by a temporary SQLite database.

pub mod fixtures;
pub mod harness;
pub mod mock_client;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_client::{Call, CallLog, MockFactory, RecordingClient};
