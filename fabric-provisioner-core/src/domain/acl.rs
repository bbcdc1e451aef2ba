// fabric-provisioner-core/src/domain/acl.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;

pub const USER_PREFIX: &str = "user:";
pub const GROUP_PREFIX: &str = "group:";

/// An unresolved reference to a directory identity, tagged by its prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AclSubject {
    /// Principal name or alias. Aliases carry `_` in place of the `@`.
    User(String),
    /// Group display name.
    Group(String),
}

impl AclSubject {
    /// Principal name to look up in the directory.
    ///
    /// The caller encodes `@` as `_` in user references, so the last
    /// underscore of the reference is turned back into `@`. A reference with
    /// no underscore is used as-is.
    pub fn principal_name(alias: &str) -> String {
        match alias.rsplit_once('_') {
            Some((local, domain)) => format!("{}@{}", local, domain),
            None => alias.to_string(),
        }
    }

    /// Builds the dev-group subject of a data product. The dev group may
    /// already be a tagged reference.
    pub fn dev_group(dev_group: &str) -> Result<Self, DomainError> {
        if dev_group.starts_with(USER_PREFIX) || dev_group.starts_with(GROUP_PREFIX) {
            dev_group.parse()
        } else {
            format!("{}{}", GROUP_PREFIX, dev_group).parse()
        }
    }
}

impl FromStr for AclSubject {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(user) = s.strip_prefix(USER_PREFIX) {
            return Ok(AclSubject::User(user.to_string()));
        }
        if let Some(group) = s.strip_prefix(GROUP_PREFIX) {
            return Ok(AclSubject::Group(group.to_string()));
        }
        Err(DomainError::Resolution(format!(
            "Unknown entity type for '{}'. Must start with '{}' or '{}'.",
            s, USER_PREFIX, GROUP_PREFIX
        )))
    }
}

impl fmt::Display for AclSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AclSubject::User(name) => write!(f, "{}{}", USER_PREFIX, name),
            AclSubject::Group(name) => write!(f, "{}{}", GROUP_PREFIX, name),
        }
    }
}

/// A directory-verified identity that can appear in a GRANT statement or a
/// data-access role membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedGrantee {
    /// Mail address for users, mail nickname for groups.
    pub name: String,
}

impl fmt::Display for ResolvedGrantee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prefixes() -> anyhow::Result<()> {
        assert_eq!(
            "user:john_doe_example.com".parse::<AclSubject>()?,
            AclSubject::User("john_doe_example.com".into())
        );
        assert_eq!(
            "group:bigData".parse::<AclSubject>()?,
            AclSubject::Group("bigData".into())
        );
        Ok(())
    }

    #[test]
    fn test_unknown_prefix_is_resolution_error() {
        let err = "role:admin".parse::<AclSubject>();
        assert!(matches!(err, Err(DomainError::Resolution(_))));

        // Prefixes are case-sensitive.
        assert!("User:alice".parse::<AclSubject>().is_err());
    }

    #[test]
    fn test_principal_name_rewrites_last_underscore() {
        assert_eq!(
            AclSubject::principal_name("john_doe_example.com"),
            "john_doe@example.com"
        );
        assert_eq!(AclSubject::principal_name("alice"), "alice");
    }

    #[test]
    fn test_dev_group_prefixing() -> anyhow::Result<()> {
        assert_eq!(
            AclSubject::dev_group("dataEngineers")?,
            AclSubject::Group("dataEngineers".into())
        );
        assert_eq!(
            AclSubject::dev_group("group:dataEngineers")?,
            AclSubject::Group("dataEngineers".into())
        );
        assert_eq!(
            AclSubject::dev_group("user:owner_corp.com")?,
            AclSubject::User("owner_corp.com".into())
        );
        Ok(())
    }
}
