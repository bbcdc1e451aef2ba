// fabric-provisioner-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DatabaseError {
    #[error("TDS Driver Error: {0}")]
    #[diagnostic(
        code(provisioner::infra::database::tds),
        help("An error occurred while talking to the SQL endpoint.")
    )]
    Tds(#[from] tiberius::error::Error),

    #[error("Invalid connection request: {0}")]
    #[diagnostic(code(provisioner::infra::database::connect))]
    InvalidConnection(String),
}

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- DATABASE (Abstracted) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DatabaseError),

    #[error("Error executing query: {0}")]
    #[diagnostic(
        code(provisioner::infra::query),
        help("The statement was rejected by the SQL endpoint.")
    )]
    QueryExecution(String),

    // --- HTTP ---
    #[error("HTTP Error: {0}")]
    #[diagnostic(code(provisioner::infra::http))]
    Http(#[from] reqwest::Error),

    #[error("{context}: {status} - {body}")]
    #[diagnostic(
        code(provisioner::infra::api),
        help("Check the service principal permissions on the target resource.")
    )]
    Api {
        context: String,
        status: u16,
        body: String,
    },

    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(provisioner::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(provisioner::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("File not found at '{0}'")]
    #[diagnostic(code(provisioner::infra::config_missing))]
    ConfigNotFound(String),
}

// Manual implementation for shortcuts (e.g. `?` on tiberius calls)
impl From<tiberius::error::Error> for InfrastructureError {
    fn from(err: tiberius::error::Error) -> Self {
        InfrastructureError::Database(DatabaseError::Tds(err))
    }
}
