//! C4 — Accreditation Registry (`spec.md` §4.4): lifecycle of signing
//! accreditations — create, assign to a certification body, revoke.
//!
//! Grounded in the teacher's `recovery.rs` threshold/expiry checks
//! (`expires > now`) and `rbac.rs`'s ownership-or-privileged-role
//! authorization shape. The revocation check below deliberately fixes the
//! tautology bug `spec.md` §9 calls out in the source this was distilled
//! from: a caller who is neither the owning `AccreditationBody` nor any
//! `Auditor` is rejected, matching scenario 2 of `spec.md` §8.

use time::OffsetDateTime;

use agrifood_common::Role;

use crate::config::StoreConfig;
use crate::error::CoreError;
use crate::identity;
use crate::ledger::{CallerEnvelope, Ledger, SignatureHost};
use crate::model::{Party, SigningAccreditation};
use crate::store;

/// `add_signing_accreditation` (`spec.md` §4.4). Caller must be an
/// `AccreditationBody`.
pub fn add_signing_accreditation(
    ledger: &mut dyn Ledger,
    config: &StoreConfig,
    host: &dyn SignatureHost,
    envelope: &CallerEnvelope,
    id: &str,
    description: &str,
    created: OffsetDateTime,
    expires: OffsetDateTime,
) -> Result<(), CoreError> {
    let parties: Vec<Party> = store::load(ledger, &config.parties_key)?;
    let caller = identity::require_caller_party(host, &parties, envelope)?;
    if caller.role != Role::AccreditationBody {
        return Err(CoreError::Unauthorized(
            "caller is not an AccreditationBody".into(),
        ));
    }
    let caller_id = caller.id.clone();

    if id.trim().is_empty() {
        return Err(CoreError::BadArg("accreditation id must not be empty".into()));
    }
    if created > expires {
        return Err(CoreError::BadArg("created must not be after expires".into()));
    }

    store::insert_unique(
        ledger,
        &config.signing_certificates_key,
        SigningAccreditation {
            id: id.to_string(),
            description: description.to_string(),
            accreditation_body: caller_id,
            certification_body: None,
            created,
            expires,
            revoked: false,
            revoked_at: None,
        },
        |a: &SigningAccreditation| a.id.clone(),
    )
}

/// `issue_signing_accreditation` (`spec.md` §4.4). Caller must own the
/// accreditation as its `AccreditationBody`.
pub fn issue_signing_accreditation(
    ledger: &mut dyn Ledger,
    config: &StoreConfig,
    host: &dyn SignatureHost,
    envelope: &CallerEnvelope,
    accr_id: &str,
    cert_body_id: &str,
    now: OffsetDateTime,
) -> Result<(), CoreError> {
    let parties: Vec<Party> = store::load(ledger, &config.parties_key)?;
    let caller = identity::require_caller_party(host, &parties, envelope)?;
    if caller.role != Role::AccreditationBody {
        return Err(CoreError::Unauthorized(
            "caller is not an AccreditationBody".into(),
        ));
    }
    let caller_id = caller.id.clone();

    let mut accreditations: Vec<SigningAccreditation> =
        store::load(ledger, &config.signing_certificates_key)?;
    let accreditation = accreditations
        .iter_mut()
        .find(|a| a.id == accr_id)
        .ok_or_else(|| CoreError::NotFound(format!("accreditation not found: {accr_id}")))?;

    if accreditation.accreditation_body != caller_id {
        return Err(CoreError::Unauthorized(
            "caller does not own this accreditation".into(),
        ));
    }
    if accreditation.expires <= now {
        return Err(CoreError::Expired(format!("accreditation expired: {accr_id}")));
    }

    let target = parties
        .iter()
        .find(|p| p.id == cert_body_id)
        .ok_or_else(|| CoreError::NotFound(format!("party not found: {cert_body_id}")))?;
    if target.role != Role::CertificationBody {
        return Err(CoreError::BadArg(format!(
            "party {cert_body_id} is not a CertificationBody"
        )));
    }

    accreditation.certification_body = Some(cert_body_id.to_string());
    store::save(ledger, &config.signing_certificates_key, &accreditations)
}

/// `revoke_signing_accreditation` (`spec.md` §4.4 and §9): caller must be
/// either the owning `AccreditationBody` or any `Auditor`. Any other caller
/// — including a non-owning `AccreditationBody` — is `Unauthorized`.
/// Re-revocation is idempotent and must never rewrite `revoked_at`.
pub fn revoke_signing_accreditation(
    ledger: &mut dyn Ledger,
    config: &StoreConfig,
    host: &dyn SignatureHost,
    envelope: &CallerEnvelope,
    accr_id: &str,
    timestamp: OffsetDateTime,
) -> Result<(), CoreError> {
    let parties: Vec<Party> = store::load(ledger, &config.parties_key)?;
    let caller = identity::require_caller_party(host, &parties, envelope)?;

    let mut accreditations: Vec<SigningAccreditation> =
        store::load(ledger, &config.signing_certificates_key)?;
    let accreditation = accreditations
        .iter_mut()
        .find(|a| a.id == accr_id)
        .ok_or_else(|| CoreError::NotFound(format!("accreditation not found: {accr_id}")))?;

    let caller_is_owning_body =
        caller.role == Role::AccreditationBody && accreditation.accreditation_body == caller.id;
    let caller_is_auditor = caller.role == Role::Auditor;
    if !(caller_is_owning_body || caller_is_auditor) {
        return Err(CoreError::Unauthorized(
            "caller must be the owning AccreditationBody or an Auditor".into(),
        ));
    }

    if !accreditation.revoked {
        accreditation.revoked = true;
        accreditation.revoked_at = Some(timestamp);
    }
    store::save(ledger, &config.signing_certificates_key, &accreditations)
}
