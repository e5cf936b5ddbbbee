//! Core types for crawl operations

use serde::{Deserialize, Serialize};

/// An item in the pending-work list with URL and depth tracking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueuedRequest {
    pub url: String,
    pub depth: u8,
    /// Number of retry attempts for this URL (0 = first attempt)
    #[serde(default)]
    pub retry_count: u8,
}

impl QueuedRequest {
    /// A fresh request at the given depth
    #[must_use]
    pub fn new(url: impl Into<String>, depth: u8) -> Self {
        Self {
            url: url.into(),
            depth,
            retry_count: 0,
        }
    }

    /// The same request with its retry counter bumped
    #[must_use]
    pub fn retried(&self) -> Self {
        Self {
            url: self.url.clone(),
            depth: self.depth,
            retry_count: self.retry_count + 1,
        }
    }
}

/// Categorizes request failures for retry decisions
///
/// Different failure types have different retry characteristics:
/// - Network errors are usually transient
/// - Server errors may recover on a later attempt
/// - Client errors are permanent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network-level failure (timeout, DNS, connection refused)
    Network,
    /// Rate limiting detected (HTTP 429)
    RateLimited,
    /// Server-side failure (HTTP 5xx)
    Server,
    /// Client-side rejection (HTTP 4xx other than 429)
    Client,
    /// Unknown/unclassified error
    Unknown,
}

impl FailureKind {
    /// Classify an error into a failure kind based on error message patterns
    #[must_use]
    pub fn classify(error: &anyhow::Error) -> Self {
        let msg = format!("{error:#}").to_lowercase();

        // Rate limiting (highest priority check)
        if msg.contains("429") || msg.contains("too many requests") {
            return Self::RateLimited;
        }

        if msg.contains("timeout")
            || msg.contains("timed out")
            || msg.contains("connection refused")
            || msg.contains("connection reset")
            || msg.contains("dns")
            || msg.contains("unreachable")
            || msg.contains("broken pipe")
            || msg.contains("error sending request")
        {
            return Self::Network;
        }

        if msg.contains("status 5") || msg.contains("http status 5") {
            return Self::Server;
        }

        if msg.contains("status 4") || msg.contains("http status 4") {
            return Self::Client;
        }

        Self::Unknown
    }

    /// Whether this failure kind should be retried by default
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network | Self::RateLimited | Self::Server | Self::Unknown => true,
            Self::Client => false,
        }
    }
}
