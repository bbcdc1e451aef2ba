// fabric-provisioner-core/src/domain/identity.rs

use std::fmt;

/// Connection attribute id under which the SQL driver expects the access token
/// (`SQL_COPT_SS_ACCESS_TOKEN`).
pub const SQL_COPT_SS_ACCESS_TOKEN: i32 = 1256;

/// OAuth scopes the provisioner requests tokens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenScope {
    /// Microsoft Graph (users and groups).
    Directory,
    /// Power BI / Fabric REST APIs.
    Workspace,
    /// SQL endpoints of warehouses and lakehouses.
    Database,
}

impl TokenScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Directory => "https://graph.microsoft.com/.default",
            Self::Workspace => "https://analysis.windows.net/powerbi/api/.default",
            Self::Database => "https://database.windows.net/.default",
        }
    }
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bearer token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }

    /// Frames the token for the SQL driver's access-token attribute: every
    /// UTF-8 byte is followed by a zero byte, and the result is prefixed with
    /// its length as a little-endian `i32`.
    pub fn to_connection_attribute(&self) -> Vec<u8> {
        let encoded: Vec<u8> = self.0.bytes().flat_map(|b| [b, 0]).collect();
        let mut framed = Vec::with_capacity(4 + encoded.len());
        framed.extend_from_slice(&(encoded.len() as i32).to_le_bytes());
        framed.extend_from_slice(&encoded);
        framed
    }

    /// Inverse of [`AccessToken::to_connection_attribute`]. Returns `None` if
    /// the length prefix does not match or the padding is not zero.
    pub fn from_connection_attribute(attr: &[u8]) -> Option<Self> {
        let (prefix, body) = attr.split_at_checked(4)?;
        let len = i32::from_le_bytes(prefix.try_into().ok()?);
        if len < 0 || len as usize != body.len() || body.len() % 2 != 0 {
            return None;
        }

        let mut bytes = Vec::with_capacity(body.len() / 2);
        for pair in body.chunks_exact(2) {
            if pair[1] != 0 {
                return None;
            }
            bytes.push(pair[0]);
        }
        String::from_utf8(bytes).ok().map(AccessToken)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}
