//! Persisted entities (`spec.md` §3). Field names are PascalCase to match
//! the wire format `spec.md` §6 fixes ("to remain forward-compatible with
//! existing data"), via `#[serde(rename = "...")]` the same way the
//! teacher keeps Soroban `#[contracttype]` field order stable across
//! upgrades.

use agrifood_common::Role;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use agrifood_common::timestamp::format_rfc3339;

fn serialize_time<S: serde::Serializer>(t: &OffsetDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_rfc3339(*t))
}

fn deserialize_time<'de, D: serde::Deserializer<'de>>(d: D) -> Result<OffsetDateTime, D::Error> {
    let raw = String::deserialize(d)?;
    agrifood_common::parse_rfc3339(&raw).map_err(serde::de::Error::custom)
}

fn serialize_opt_time<S: serde::Serializer>(
    t: &Option<OffsetDateTime>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match t {
        Some(t) => s.serialize_some(&format_rfc3339(*t)),
        None => s.serialize_none(),
    }
}

fn deserialize_opt_time<'de, D: serde::Deserializer<'de>>(
    d: D,
) -> Result<Option<OffsetDateTime>, D::Error> {
    let raw = Option::<String>::deserialize(d)?;
    match raw {
        Some(raw) => agrifood_common::parse_rfc3339(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// A registered party (`spec.md` §3). Persisted under the `parties` key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Party {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Role")]
    pub role: Role,
    #[serde(rename = "Certs")]
    pub certs: Vec<String>,
}

/// A signing accreditation (`spec.md` §3). Persisted under the
/// `SigningCertificates` key — the original collection name survives in
/// the wire format even though the entity is called `SigningAccreditation`
/// in prose, per `spec.md` §3 invariant 7.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SigningAccreditation {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "AccreditationBody")]
    pub accreditation_body: String,
    #[serde(rename = "CertificationBody")]
    pub certification_body: Option<String>,
    #[serde(
        rename = "Created",
        serialize_with = "serialize_time",
        deserialize_with = "deserialize_time"
    )]
    pub created: OffsetDateTime,
    #[serde(
        rename = "Expires",
        serialize_with = "serialize_time",
        deserialize_with = "deserialize_time"
    )]
    pub expires: OffsetDateTime,
    #[serde(rename = "Revoked")]
    pub revoked: bool,
    #[serde(
        rename = "RevocationTimestamp",
        serialize_with = "serialize_opt_time",
        deserialize_with = "deserialize_opt_time"
    )]
    pub revoked_at: Option<OffsetDateTime>,
}

/// A delegated signing authority (`spec.md` §3). Persisted under the
/// `SigningAuthorizations` key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SigningAuthorization {
    #[serde(rename = "CertificateID")]
    pub accreditation_id: String,
    #[serde(rename = "AuthorizedParty")]
    pub authorized_party: String,
    #[serde(
        rename = "Expires",
        serialize_with = "serialize_time",
        deserialize_with = "deserialize_time"
    )]
    pub expires: OffsetDateTime,
    #[serde(rename = "Revoked")]
    pub revoked: bool,
    #[serde(
        rename = "RevocationTimestamp",
        serialize_with = "serialize_opt_time",
        deserialize_with = "deserialize_opt_time"
    )]
    pub revoked_at: Option<OffsetDateTime>,
}

/// A signature applied to a grape unit (`spec.md` §3), embedded inside
/// `GrapeUnit::signatures`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CertificateSignature {
    #[serde(rename = "Issuer")]
    pub issuer: String,
    #[serde(rename = "CertificateID")]
    pub accreditation_id: String,
    #[serde(
        rename = "Issued",
        serialize_with = "serialize_time",
        deserialize_with = "deserialize_time"
    )]
    pub issued: OffsetDateTime,
    #[serde(rename = "Revoked")]
    pub revoked: bool,
    #[serde(
        rename = "RevocationTimestamp",
        serialize_with = "serialize_opt_time",
        deserialize_with = "deserialize_opt_time"
    )]
    pub revoked_at: Option<OffsetDateTime>,
}

/// One custody-chain link (`spec.md` §3), embedded inside
/// `GrapeUnit::provenance`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProvenanceEntry {
    #[serde(rename = "PartyID")]
    pub party_id: String,
    #[serde(
        rename = "Timestamp",
        serialize_with = "serialize_time",
        deserialize_with = "deserialize_time"
    )]
    pub timestamp: OffsetDateTime,
}

/// A physical grape unit (`spec.md` §3). Persisted under the `GrapeUnits`
/// key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GrapeUnit {
    #[serde(rename = "UUID")]
    pub uuid: String,
    #[serde(rename = "Producer")]
    pub producer: String,
    #[serde(
        rename = "Created",
        serialize_with = "serialize_time",
        deserialize_with = "deserialize_time"
    )]
    pub created: OffsetDateTime,
    #[serde(rename = "CertificateSignatures")]
    pub signatures: Vec<CertificateSignature>,
    #[serde(rename = "Provenance")]
    pub provenance: Vec<ProvenanceEntry>,
}
