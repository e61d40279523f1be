//! Memgate Core — Conversational Memory Gateway
//!
//! Fronts a remote, eventually consistent memory service with a small
//! stable API: resolve a user's current session, page through its
//! stored events, and append new conversational turns. Also owns the
//! lifecycle of the one memory resource each deployment environment
//! provisions, including the slow poll-to-readiness dance.
//!
//! # Architecture
//!
//! ```text
//! Callers ──► MemoryGateway
//!                  │
//!         ┌────────┴────────┐
//!   InMemoryBackend   ManagedBackend
//!                      ╱          ╲
//!          MemoryProvisioner   MemoryData
//!             ╱        ╲            │
//!   ParameterStore  MemoryControl   │
//!                          ╲        │
//!                        HttpMemoryService
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod config;
pub mod error;
pub mod params;
pub mod provisioner;
pub mod service;

pub use backend::{
    InMemoryBackend, ManagedBackend, MemoryBackend, MemoryGateway, SESSION_INIT_TEXT,
};
pub use config::{BackendKind, GatewayConfig};
pub use error::{Error, Result};
pub use params::{FileParameterStore, InMemoryParameterStore, ParameterStore};
pub use provisioner::{MemoryProvisioner, PollConfig};
pub use service::{HttpMemoryService, MemoryControl, MemoryData};
