//! Error types for mathematical operations.

/// Errors that can occur during mathematical operations.
#[derive(Debug, thiserror::Error)]
pub enum MathError {
    /// Sigma clip threshold must be positive.
    #[error("invalid sigma threshold: {0} (must be > 0)")]
    InvalidSigma(f64),

    /// Bucket count must be at least one.
    #[error("bucket count must be at least 1")]
    InvalidBucketCount,
}
