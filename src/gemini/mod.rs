//! Hosted capabilities over the Generative Language REST API.

pub mod client;
pub mod types;

pub use client::GeminiClient;
