// fabric-provisioner-core/src/lib.rs

// 1. Mandatory documentation for production code
#![allow(missing_docs)]
// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// Contracts towards the outside world (tokens, directory, workspace API, SQL)
pub mod ports;

// 2. Domain (business core)
// Descriptor, ACL subjects, schema mapping, access roles, statuses.
// Depends on nothing else.
pub mod domain;

// 3. Infrastructure (Adapters)
// Entra, Graph, Fabric REST, TDS, configuration files.
// Depends on the Domain and the Ports.
pub mod infrastructure;

// 4. Application (Use Cases)
// Directory resolver, warehouse client, provisioning orchestrator.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
// `use fabric_provisioner_core::ProvisionerError;`
pub use error::ProvisionerError;
