//! # tracelens LLM
//!
//! Remote inference client used by the analyze endpoint.

pub mod client;

pub use client::InferenceClient;
