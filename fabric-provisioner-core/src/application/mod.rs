// fabric-provisioner-core/src/application/mod.rs

pub mod orchestrator;
pub mod resolver;
pub mod warehouse;

// --- RE-EXPORTS (FACADE PATTERN) ---
// Lets the CLI write `use fabric_provisioner_core::application::{Provisioner, WarehouseClient};`
// without knowing the internal file layout.

pub use orchestrator::Provisioner;
pub use resolver::DirectoryResolver;
pub use warehouse::{WarehouseClient, WarehouseSettings};
