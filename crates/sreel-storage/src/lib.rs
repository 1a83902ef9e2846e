//! Durable object storage for compiled videos.
//!
//! This crate provides:
//! - The [`ObjectStorage`] contract (idempotent upload, public URL
//!   resolution)
//! - A Cloudflare R2 client speaking the S3 API
//! - An in-memory backend for tests and local development
//! - Deterministic storage path derivation for rendered videos

pub mod client;
pub mod error;
pub mod memory;
pub mod paths;
pub mod storage;

pub use client::{R2Client, R2Config};
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStorage;
pub use paths::video_key;
pub use storage::ObjectStorage;
