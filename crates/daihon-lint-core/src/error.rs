//! Error types for daihon-lint-core.

use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// Configuration file not found after searching all locations.
    #[error("no configuration file found")]
    NotFound,
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur when loading or compiling a policy.
#[derive(Error, Debug)]
pub enum PolicyError {
    /// A rule pattern failed to compile.
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern string that failed to compile.
        pattern: String,
        /// The underlying regex error.
        source: regex::Error,
    },

    /// A substring automaton could not be built.
    #[error("failed to build substring matcher: {0}")]
    Automaton(#[from] aho_corasick::BuildError),

    /// The policy file uses an extension we don't recognize.
    #[error("unsupported policy format: {path} (use .toml, .yaml, .yml, or .json)")]
    UnsupportedFormat {
        /// The offending file path.
        path: String,
    },

    /// Failed to deserialize a policy file.
    #[error("invalid policy file: {0}")]
    Deserialize(#[from] Box<figment::Error>),
}

/// Result type alias using [`PolicyError`].
pub type PolicyResult<T> = Result<T, PolicyError>;
