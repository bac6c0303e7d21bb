//! The closed `Role` enumeration (`spec.md` §3) and its string form.
//!
//! Generalizes the teacher's `rbac::Role` (`Patient`/`Staff`/`Optometrist`/
//! `Ophthalmologist`/`Admin`) to this domain's five roles, kept as a plain
//! `enum` with `FromStr`/`Display` rather than the teacher's
//! `#[contracttype] #[repr(u32)]` encoding, since nothing here crosses an
//! on-chain contract ABI boundary.

use std::fmt;
use std::str::FromStr;

use crate::CommonError;

/// The five parties a `Party` record may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Role {
    AccreditationBody,
    CertificationBody,
    Farm,
    Auditor,
    Trader,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::AccreditationBody,
        Role::CertificationBody,
        Role::Farm,
        Role::Auditor,
        Role::Trader,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::AccreditationBody => "AccreditationBody",
            Role::CertificationBody => "CertificationBody",
            Role::Farm => "Farm",
            Role::Auditor => "Auditor",
            Role::Trader => "Trader",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AccreditationBody" => Ok(Role::AccreditationBody),
            "CertificationBody" => Ok(Role::CertificationBody),
            "Farm" => Ok(Role::Farm),
            "Auditor" => Ok(Role::Auditor),
            "Trader" => Ok(Role::Trader),
            other => Err(CommonError::InvalidRole(other.to_string())),
        }
    }
}
