//! Centralized error handling for the emote proxy
//!
//! This module provides the error types used across all application layers.
//! Component-level errors (transcoding, storage, cache, per-item ingestion)
//! have their own enums so callers can match on the failure class; `AppError`
//! covers the outbound HTTP boundary shared by the directory client and the
//! image fetcher.
//!
//! # Error Categories
//!
//! - **Ingest Errors**: per-emote pipeline failures, never fatal to a batch
//! - **Transcode Errors**: image decode/encode failures
//! - **Store Errors**: blob backend failures
//! - **Cache Errors**: key-value cache failures, never fatal to a request

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;
