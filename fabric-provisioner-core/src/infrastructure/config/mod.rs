pub mod request;
pub mod settings;

pub use request::ProvisioningRequest;
pub use settings::{ClientCredentials, ProvisionerConfig};
