// fabric-provisioner-core/src/ports/mod.rs
//
// Capability contracts the core needs from the outside world. Adapters live in
// `infrastructure::adapters`.

pub mod directory;
pub mod sql;
pub mod token;
pub mod warehouse;
pub mod workspace;

pub use directory::{DirectoryApi, DirectoryGroup, DirectoryUser};
pub use sql::{ConnectRequest, SqlConnection, SqlDriver};
pub use token::TokenProvider;
pub use warehouse::{TableSession, WarehouseGateway};
pub use workspace::{LakehouseItem, LoadTableRequest, WarehouseItem, WorkspaceApi, WorkspaceRef};
