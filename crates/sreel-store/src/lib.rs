//! Render job persistence.
//!
//! This crate provides:
//! - The [`JobStore`] contract (one row per render job)
//! - An in-memory backend for tests and local development
//! - A Redis backend with a natural-key reservation implementing the
//!   uniqueness constraint as compare-and-create

pub mod error;
pub mod memory;
pub mod redis;
pub mod store;

pub use crate::error::{StoreError, StoreResult};
pub use crate::memory::MemoryJobStore;
pub use crate::redis::{RedisJobStore, RedisStoreConfig};
pub use crate::store::{JobFilter, JobPatch, JobStore};
