// fabric-provisioner-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisionerError {
    // --- ERREURS DU DOMAINE (Descripteur, ACL, Résolution) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- ERREURS D'INFRASTRUCTURE (HTTP, SQL, IO) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- ERREURS GÉNÉRIQUES / APPLICATIVES ---
    #[error("Internal Error: {0}")]
    InternalError(String),
}

impl From<std::io::Error> for ProvisionerError {
    fn from(err: std::io::Error) -> Self {
        ProvisionerError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl From<reqwest::Error> for ProvisionerError {
    fn from(err: reqwest::Error) -> Self {
        ProvisionerError::Infrastructure(InfrastructureError::Http(err))
    }
}
