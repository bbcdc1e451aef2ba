// fabric-provisioner-core/src/domain/access_role.rs
//
// Lakehouse data-access roles (OneLake security) as exchanged with the Fabric
// `dataAccessRoles` endpoint.

use serde::{Deserialize, Serialize};

use crate::domain::acl::ResolvedGrantee;

pub const DEFAULT_ROLE_NAME: &str = "Admin";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataAccessRoles {
    #[serde(default)]
    pub value: Vec<DataAccessRole>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataAccessRole {
    pub name: String,
    #[serde(default)]
    pub decision_rules: Vec<DecisionRule>,
    #[serde(default)]
    pub members: RoleMembers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRule {
    pub effect: String,
    #[serde(default)]
    pub permission: Vec<PermissionScope>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionScope {
    pub attribute_name: String,
    pub attribute_value_included_in: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleMembers {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub microsoft_entra_members: Vec<EntraMember>,
    #[serde(default)]
    pub fabric_item_members: Vec<FabricItemMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntraMember {
    pub tenant_id: String,
    pub object_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FabricItemMember {
    pub source_path: String,
    pub item_access: Vec<String>,
}

impl DataAccessRole {
    /// A role granting read on every path of the lakehouse, with no members.
    pub fn read_everything(name: &str) -> Self {
        Self {
            name: name.to_string(),
            decision_rules: vec![DecisionRule {
                effect: "Permit".into(),
                permission: vec![
                    PermissionScope {
                        attribute_name: "Path".into(),
                        attribute_value_included_in: vec!["*".into()],
                    },
                    PermissionScope {
                        attribute_name: "Action".into(),
                        attribute_value_included_in: vec!["Read".into()],
                    },
                ],
            }],
            members: RoleMembers::default(),
        }
    }

    /// Adds or replaces members keyed by source path. Existing members keep
    /// their position; a member with an already-present path replaces the old
    /// entry in place.
    pub fn merge_members(&mut self, new_members: Vec<FabricItemMember>) {
        let members = &mut self.members.fabric_item_members;
        for member in new_members {
            match members
                .iter_mut()
                .find(|m| m.source_path == member.source_path)
            {
                Some(existing) => *existing = member,
                None => members.push(member),
            }
        }
    }
}

impl DataAccessRoles {
    /// Merges `grantees` into the role called `role_name`, creating it with
    /// [`DataAccessRole::read_everything`] when absent. Other roles are left
    /// untouched so the document can be written back whole.
    pub fn grant(
        &mut self,
        role_name: &str,
        workspace_id: &str,
        grantees: &[ResolvedGrantee],
        read_all: bool,
    ) {
        let access = if read_all { "ReadAll" } else { "Read" };
        let new_members = grantees
            .iter()
            .map(|g| FabricItemMember {
                source_path: format!("{}/{}", workspace_id, g.name),
                item_access: vec![access.to_string()],
            })
            .collect();

        let idx = match self.value.iter().position(|r| r.name == role_name) {
            Some(idx) => idx,
            None => {
                self.value.push(DataAccessRole::read_everything(role_name));
                self.value.len() - 1
            }
        };
        self.value[idx].merge_members(new_members);
    }
}
