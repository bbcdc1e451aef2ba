// fabric-provisioner-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Configuration Error: {0}")]
    #[diagnostic(
        code(provisioner::domain::configuration),
        help("Set exactly one of 'warehouse' or 'lakehouse' on the component.")
    )]
    Configuration(String),

    #[error("{kind} '{name}' not found{scope}")]
    #[diagnostic(code(provisioner::domain::not_found))]
    NotFound {
        kind: &'static str,
        name: String,
        scope: String,
    },

    #[error("ACL resolution failed: {0}")]
    #[diagnostic(
        code(provisioner::domain::resolution),
        help("ACL subjects must look like 'user:<name>_<domain>' or 'group:<displayName>'.")
    )]
    Resolution(String),

    #[error("Invalid descriptor: {0}")]
    #[diagnostic(code(provisioner::domain::descriptor))]
    InvalidDescriptor(String),
}

impl DomainError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        DomainError::NotFound {
            kind,
            name: name.into(),
            scope: String::new(),
        }
    }

    /// Same as [`DomainError::not_found`], for lookups nested inside a workspace.
    pub fn not_found_in(kind: &'static str, name: impl Into<String>, workspace: &str) -> Self {
        DomainError::NotFound {
            kind,
            name: name.into(),
            scope: format!(" in workspace '{}'", workspace),
        }
    }
}
