pub mod access_role;
pub mod acl;
pub mod descriptor;
pub mod endpoint;
pub mod error;
pub mod identity;
pub mod schema;
pub mod status;

// Re-exports pratiques pour simplifier les imports ailleurs
pub use acl::{AclSubject, ResolvedGrantee};
pub use descriptor::{ComponentDescriptor, DataProduct, SinkKind};
pub use endpoint::{EndpointHandle, EndpointTarget};
pub use error::DomainError;
pub use identity::{AccessToken, TokenScope};
pub use status::{ProvisioningResponse, ProvisioningStatus, Status, SystemErr};
