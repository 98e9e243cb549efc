//! Lingua - offline-tolerant AI translation cache
//!
//! Translates UI strings through a generative language model, caching
//! results in memory and in a durable record store. Requests that cannot be
//! served live (offline, no credential, provider error) return the original
//! text and wait in a queue that is drained when connectivity returns.

pub mod cache;
pub mod cli;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod provider;
pub mod queue;
pub mod service;
pub mod store;
pub mod transfer;
