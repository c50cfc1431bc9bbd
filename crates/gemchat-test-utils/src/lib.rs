// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for gemchat integration tests.
//!
//! - [`MockProvider`] - scripted provider that records what it was sent
//! - [`TestHarness`] - runtime over a temp-dir store and the mock provider

pub mod harness;
pub mod mock_provider;

pub use harness::TestHarness;
pub use mock_provider::{MockProvider, MockReply, RecordedRequest};
