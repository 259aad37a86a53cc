//! HTTP client for the batch endpoint

pub mod client;

pub use client::RemoteClient;
