// fabric-provisioner-core/src/infrastructure/adapters/mod.rs

pub mod entra;
pub mod fabric;
pub mod graph;
pub mod http;
pub mod tds;

pub use entra::EntraTokenProvider;
pub use fabric::FabricRestClient;
pub use graph::GraphDirectoryClient;
pub use http::build_client;
pub use tds::TdsDriver;
