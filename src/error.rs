//! Error types for the print-control core.

/// Errors reported by collaborators or configuration loading.
///
/// View operations never return these to their callers; they are turned into
/// notifications or logged. Only configuration loading hands them out.
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    /// The printer host could not provide the active printer profile.
    #[error("Printer profile unavailable: {0}")]
    ProfileUnavailable(String),

    /// The filament service rejected a spool change.
    #[error("Spool change failed: {0}")]
    SpoolChange(String),

    /// The configuration file is not valid TOML for [`PanelConfig`](crate::PanelConfig).
    #[error("Invalid configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// An I/O error occurred (e.g., reading the configuration file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
