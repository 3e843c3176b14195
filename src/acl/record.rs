//! ACL entries as stored in the datacenter permission table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Principal class that can hold a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    Group,
    Token,
    User,
}

impl PrincipalKind {
    pub const ALL: [PrincipalKind; 3] = [
        PrincipalKind::Group,
        PrincipalKind::Token,
        PrincipalKind::User,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PrincipalKind::Group => "group",
            PrincipalKind::Token => "token",
            PrincipalKind::User => "user",
        }
    }
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One elementary grant: a role bound to an access-control path for a
/// single principal, with a propagation flag. Snapshots are immutable and
/// re-fetched on every pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclRecord {
    pub path: String,
    pub roleid: String,
    #[serde(with = "proxmox_bool")]
    pub propagate: bool,
    #[serde(rename = "type")]
    pub kind: PrincipalKind,
    pub ugid: String,
}

impl fmt::Display for AclRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' has '{}' on '{}' (propagate={})",
            self.kind,
            self.ugid,
            self.roleid,
            self.path,
            u8::from(self.propagate)
        )
    }
}

/// Proxmox encodes booleans as 0/1 integers on the wire; some endpoints
/// hand back real JSON booleans. Accept both, emit the integer form.
pub mod proxmox_bool {
    use serde::de::{Deserializer, Error, Unexpected};
    use serde::{Deserialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Int(u64),
        Bool(bool),
    }

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match Wire::deserialize(deserializer)? {
            Wire::Int(0) => Ok(false),
            Wire::Int(1) => Ok(true),
            Wire::Int(other) => Err(D::Error::invalid_value(
                Unexpected::Unsigned(other),
                &"0 or 1",
            )),
            Wire::Bool(b) => Ok(b),
        }
    }
}
