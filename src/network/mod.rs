//! Network module for remote timing retrieval.
//!
//! Talks to the AlAdhan HTTP API for a fixed lookup address.
//! This module is gated behind the `async` feature.

pub mod aladhan;
