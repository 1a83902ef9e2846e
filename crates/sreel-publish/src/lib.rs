//! Social publishing capability.
//!
//! Per-platform publishers behind one [`Publisher`] contract. No platform
//! integration is configured in this backend yet, so every variant reports
//! [`PublishOutcome::NotConfigured`] as a value instead of failing — the
//! caller decides whether that is an error.

pub mod platforms;
pub mod publisher;

pub use platforms::{publisher_for, InstagramPublisher, TikTokPublisher};
pub use publisher::{Platform, PublishOutcome, PublishRequest, Publisher};
