//! C5 — Authorization Registry (`spec.md` §4.5): lifecycle of delegated
//! signing authorities (certification body → farm), with expiry and
//! revocation.
//!
//! Grounded in the same ownership-or-privileged-role authorization shape
//! as `accreditation_registry.rs`, mirrored from the teacher's
//! `rbac.rs`/`recovery.rs` guardian-revocation checks.

use time::OffsetDateTime;

use agrifood_common::Role;

use crate::config::StoreConfig;
use crate::error::CoreError;
use crate::identity;
use crate::ledger::{CallerEnvelope, Ledger, SignatureHost};
use crate::model::{Party, SigningAccreditation, SigningAuthorization};
use crate::store;

/// `grant_signing_authority` (`spec.md` §4.5). Caller must be the
/// accreditation's `CertificationBody`.
pub fn grant_signing_authority(
    ledger: &mut dyn Ledger,
    config: &StoreConfig,
    host: &dyn SignatureHost,
    envelope: &CallerEnvelope,
    accr_id: &str,
    farm_id: &str,
    expires: OffsetDateTime,
    now: OffsetDateTime,
) -> Result<(), CoreError> {
    let parties: Vec<Party> = store::load(ledger, &config.parties_key)?;
    let caller = identity::require_caller_party(host, &parties, envelope)?;
    if caller.role != Role::CertificationBody {
        return Err(CoreError::Unauthorized(
            "caller is not a CertificationBody".into(),
        ));
    }
    let caller_id = caller.id.clone();

    let accreditations: Vec<SigningAccreditation> =
        store::load(ledger, &config.signing_certificates_key)?;
    let accreditation = accreditations
        .iter()
        .find(|a| a.id == accr_id)
        .ok_or_else(|| CoreError::NotFound(format!("accreditation not found: {accr_id}")))?;

    if accreditation.revoked {
        return Err(CoreError::Revoked(format!("accreditation revoked: {accr_id}")));
    }
    if accreditation.expires <= now {
        return Err(CoreError::Expired(format!("accreditation expired: {accr_id}")));
    }
    if accreditation.certification_body.as_deref() != Some(caller_id.as_str()) {
        return Err(CoreError::Unauthorized(
            "caller is not this accreditation's CertificationBody".into(),
        ));
    }

    let target = parties
        .iter()
        .find(|p| p.id == farm_id)
        .ok_or_else(|| CoreError::NotFound(format!("party not found: {farm_id}")))?;
    if target.role != Role::Farm {
        return Err(CoreError::BadArg(format!("party {farm_id} is not a Farm")));
    }

    store::insert_unique(
        ledger,
        &config.signing_authorizations_key,
        SigningAuthorization {
            accreditation_id: accr_id.to_string(),
            authorized_party: farm_id.to_string(),
            expires,
            revoked: false,
            revoked_at: None,
        },
        |a: &SigningAuthorization| (a.accreditation_id.clone(), a.authorized_party.clone()),
    )
}

/// `revoke_signing_authority` (`spec.md` §4.5). Caller must be the
/// accreditation's `CertificationBody`, or any `Auditor`.
pub fn revoke_signing_authority(
    ledger: &mut dyn Ledger,
    config: &StoreConfig,
    host: &dyn SignatureHost,
    envelope: &CallerEnvelope,
    accr_id: &str,
    party_id: &str,
    timestamp: OffsetDateTime,
) -> Result<(), CoreError> {
    let parties: Vec<Party> = store::load(ledger, &config.parties_key)?;
    let caller = identity::require_caller_party(host, &parties, envelope)?;

    if caller.role != Role::CertificationBody && caller.role != Role::Auditor {
        return Err(CoreError::Unauthorized(
            "caller must be a CertificationBody or an Auditor".into(),
        ));
    }
    if caller.role == Role::CertificationBody {
        let accreditations: Vec<SigningAccreditation> =
            store::load(ledger, &config.signing_certificates_key)?;
        let accreditation = accreditations
            .iter()
            .find(|a| a.id == accr_id)
            .ok_or_else(|| CoreError::NotFound(format!("accreditation not found: {accr_id}")))?;
        if accreditation.certification_body.as_deref() != Some(caller.id.as_str()) {
            return Err(CoreError::Unauthorized(
                "caller is not this accreditation's CertificationBody".into(),
            ));
        }
    }

    let mut authorizations: Vec<SigningAuthorization> =
        store::load(ledger, &config.signing_authorizations_key)?;
    let authorization = authorizations
        .iter_mut()
        .find(|a| a.accreditation_id == accr_id && a.authorized_party == party_id)
        .ok_or_else(|| CoreError::NotFound(format!("authorization not found: {accr_id}/{party_id}")))?;

    if !authorization.revoked {
        authorization.revoked = true;
        authorization.revoked_at = Some(timestamp);
    }
    store::save(ledger, &config.signing_authorizations_key, &authorizations)
}
