// fabric-provisioner-core/src/application/resolver.rs

use std::sync::Arc;
use tracing::{info, instrument};

use crate::domain::acl::{AclSubject, ResolvedGrantee};
use crate::domain::error::DomainError;
use crate::domain::identity::{AccessToken, TokenScope};
use crate::error::ProvisionerError;
use crate::ports::{DirectoryApi, TokenProvider};

/// Turns ACL subjects into directory-verified grantees.
///
/// Nothing is cached: every `resolve` fetches a new directory token and
/// re-validates each identity.
#[derive(Clone)]
pub struct DirectoryResolver {
    tokens: Arc<dyn TokenProvider>,
    directory: Arc<dyn DirectoryApi>,
}

impl DirectoryResolver {
    pub fn new(tokens: Arc<dyn TokenProvider>, directory: Arc<dyn DirectoryApi>) -> Self {
        Self { tokens, directory }
    }

    /// Parses raw `user:` / `group:` references, then resolves them.
    pub async fn resolve_raw(
        &self,
        subjects: &[String],
    ) -> Result<Vec<ResolvedGrantee>, ProvisionerError> {
        let parsed = subjects
            .iter()
            .map(|s| s.parse::<AclSubject>())
            .collect::<Result<Vec<_>, _>>()?;
        self.resolve(&parsed).await
    }

    #[instrument(skip(self, subjects), fields(subjects.len = subjects.len()))]
    pub async fn resolve(
        &self,
        subjects: &[AclSubject],
    ) -> Result<Vec<ResolvedGrantee>, ProvisionerError> {
        if subjects.is_empty() {
            return Err(DomainError::Resolution("No valid groups or users provided.".into()).into());
        }

        let token = self.tokens.token(TokenScope::Directory).await?;
        info!("Processing {} entities...", subjects.len());

        let mut grantees = Vec::with_capacity(subjects.len());
        for subject in subjects {
            let grantee = match subject {
                AclSubject::User(alias) => self.resolve_user(&token, alias).await?,
                AclSubject::Group(name) => self.resolve_group(&token, name).await?,
            };
            grantees.push(grantee);
        }

        Ok(grantees)
    }

    async fn resolve_user(
        &self,
        token: &AccessToken,
        alias: &str,
    ) -> Result<ResolvedGrantee, ProvisionerError> {
        let principal_name = AclSubject::principal_name(alias);
        let found = self
            .directory
            .find_user_by_principal_name(token, &principal_name)
            .await?
            .ok_or_else(|| {
                DomainError::Resolution(format!("User '{}' not found.", principal_name))
            })?;

        // Re-fetch by id: the filter result alone is not proof the object resolves.
        let user = self.directory.get_user(token, &found.id).await?;
        info!(
            "Validated user: {} ({})",
            user.display_name.as_deref().unwrap_or("Unknown"),
            user.id
        );

        let mail = user.mail.ok_or_else(|| {
            DomainError::Resolution(format!("User '{}' has no mail address.", principal_name))
        })?;

        Ok(ResolvedGrantee { name: mail })
    }

    async fn resolve_group(
        &self,
        token: &AccessToken,
        display_name: &str,
    ) -> Result<ResolvedGrantee, ProvisionerError> {
        let found = self
            .directory
            .find_group_by_display_name(token, display_name)
            .await?
            .ok_or_else(|| {
                DomainError::Resolution(format!("Group '{}' not found.", display_name))
            })?;

        let group = self.directory.get_group(token, &found.id).await?;
        info!(
            "Validated group: {} ({})",
            group.display_name.as_deref().unwrap_or("Unknown"),
            group.id
        );

        let nickname = group.mail_nickname.ok_or_else(|| {
            DomainError::Resolution(format!("Group '{}' has no mail nickname.", display_name))
        })?;

        Ok(ResolvedGrantee { name: nickname })
    }
}
