use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all refconflict operations.
#[derive(Debug, Error, Diagnostic)]
pub enum RefConflictError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or malformed refconflict configuration (e.g. config.toml).
    #[error("Configuration error: {message}")]
    #[diagnostic(help("Check ~/.refconflict/config.toml (or the file passed with --config)"))]
    Config { message: String },

    /// The application configuration file holding binding redirects could not be used.
    #[error("Invalid application config {path}: {message}")]
    #[diagnostic(help("Binding redirects are read from configuration/runtime/assemblyBinding"))]
    AppConfig { path: String, message: String },

    /// Unresolved version conflicts were found and the caller asked to fail on them.
    #[error("{count} unresolved version conflict(s) found")]
    Conflicts { count: usize },

    /// Rendering the analysis output failed.
    #[error("Failed to render output: {message}")]
    Render { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type RefConflictResult<T> = miette::Result<T>;
