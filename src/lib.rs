pub mod cache;
pub mod config;
pub mod errors;
pub mod ingestor;
pub mod models;
pub mod selector;
pub mod sources;
pub mod storage;
pub mod transcode;
pub mod utils;
pub mod web;
