// fabric-provisioner/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fabric-provisioner")]
#[command(about = "Descriptor-driven provisioning of Fabric warehouse and lakehouse tables", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to ./provisioner.yaml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🚀 Creates the output port table and grants the dev group
    Provision {
        /// Provisioning request file (dataProduct + componentIdToProvision)
        #[arg(long)]
        descriptor: PathBuf,

        /// Component to act on, overrides componentIdToProvision
        #[arg(long)]
        component_id: Option<String>,
    },

    /// 🧹 Drops the output port table
    Unprovision {
        #[arg(long)]
        descriptor: PathBuf,

        #[arg(long)]
        component_id: Option<String>,
    },

    /// 🔐 Grants read access on the output port to users and groups
    UpdateAcl {
        #[arg(long)]
        descriptor: PathBuf,

        #[arg(long)]
        component_id: Option<String>,

        /// `user:<alias>` or `group:<name>`, repeatable
        #[arg(long = "subject", required = true)]
        subjects: Vec<String>,
    },

    /// ✅ Validates a provisioning request
    Validate {
        #[arg(long)]
        descriptor: PathBuf,
    },

    /// ⏳ Polls the status of an asynchronous request
    Status {
        #[arg(long)]
        token: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_provision() -> Result<()> {
        let args = Cli::parse_from(["fabric-provisioner", "provision", "--descriptor", "dp.yaml"]);
        assert!(args.config.is_none());
        match args.command {
            Commands::Provision {
                descriptor,
                component_id,
            } => {
                assert_eq!(descriptor.to_string_lossy(), "dp.yaml");
                assert_eq!(component_id, None);
                Ok(())
            }
            _ => bail!("Expected Provision command"),
        }
    }

    #[test]
    fn test_cli_parse_update_acl_subjects() -> Result<()> {
        let args = Cli::parse_from([
            "fabric-provisioner",
            "update-acl",
            "--descriptor",
            "dp.yaml",
            "--component-id",
            "urn:dmb:cmp:x",
            "--subject",
            "user:alice_corp.com",
            "--subject",
            "group:bigData",
            "--config",
            "/etc/provisioner.yaml",
        ]);
        assert_eq!(
            args.config.as_deref().map(|p| p.to_string_lossy().into_owned()),
            Some("/etc/provisioner.yaml".to_string())
        );
        match args.command {
            Commands::UpdateAcl {
                component_id,
                subjects,
                ..
            } => {
                assert_eq!(component_id.as_deref(), Some("urn:dmb:cmp:x"));
                assert_eq!(subjects, vec!["user:alice_corp.com", "group:bigData"]);
                Ok(())
            }
            _ => bail!("Expected UpdateAcl command"),
        }
    }

    #[test]
    fn test_cli_update_acl_requires_subject() {
        let result = Cli::try_parse_from([
            "fabric-provisioner",
            "update-acl",
            "--descriptor",
            "dp.yaml",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_status() -> Result<()> {
        let args = Cli::parse_from(["fabric-provisioner", "status", "--token", "abc"]);
        match args.command {
            Commands::Status { token } => {
                assert_eq!(token, "abc");
                Ok(())
            }
            _ => bail!("Expected Status command"),
        }
    }
}
