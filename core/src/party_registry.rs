//! C3 — Party Registry (`spec.md` §4.3): admins, parties, roles, per-party
//! certificate sets.
//!
//! Grounded in the teacher's `rbac.rs` (role-gated registration operations,
//! checked in a fixed auth → arg-validity → uniqueness → persist order) and
//! `recovery.rs`'s guardian-list append pattern for `add_cert`.

use agrifood_common::crypto::decode_certificate;
use agrifood_common::Role;

use crate::config::StoreConfig;
use crate::error::CoreError;
use crate::identity;
use crate::ledger::{CallerEnvelope, Ledger, SignatureHost};
use crate::model::Party;
use crate::store;

/// True if `cert` already belongs to any registered party. Closes the
/// latent defect `spec.md` §9 names in "first matching party wins": two
/// parties must never share a certificate, or identity resolution becomes
/// ambiguous.
fn cert_already_registered(parties: &[Party], cert: &str) -> bool {
    parties.iter().any(|p| p.certs.iter().any(|c| c == cert))
}

/// Auth-only pre-check for `add_admin`/`add_party`. The dispatcher calls
/// this *before* it parses the caller's string arguments, so a non-admin
/// caller gets `Unauthorized` even when their argument count or role string
/// is also wrong — `spec.md` §4.3's auth → arg count → role validity →
/// uniqueness → persist order binds on the untyped dispatch boundary, not
/// just within these functions.
pub fn require_admin_caller(
    ledger: &dyn Ledger,
    config: &StoreConfig,
    host: &dyn SignatureHost,
    envelope: &CallerEnvelope,
) -> Result<(), CoreError> {
    let admin_certs: Vec<String> = store::load(ledger, &config.admin_certs_key)?;
    identity::require_admin(host, &admin_certs, envelope)
}

/// Auth-only pre-check for `add_cert`, for the same reason as
/// `require_admin_caller`.
pub fn require_registered_caller(
    ledger: &dyn Ledger,
    config: &StoreConfig,
    host: &dyn SignatureHost,
    envelope: &CallerEnvelope,
) -> Result<(), CoreError> {
    let parties: Vec<Party> = store::load(ledger, &config.parties_key)?;
    identity::require_caller_party(host, &parties, envelope)?;
    Ok(())
}

/// `add_admin` (`spec.md` §4.3). Caller must already be an admin. The new
/// cert is decoded (`spec.md` §4.2: "decoding errors on individual certs
/// abort with `CertDecode`") before it is ever persisted.
pub fn add_admin(
    ledger: &mut dyn Ledger,
    config: &StoreConfig,
    host: &dyn SignatureHost,
    envelope: &CallerEnvelope,
    new_cert_b64: &str,
) -> Result<(), CoreError> {
    let admin_certs: Vec<String> = store::load(ledger, &config.admin_certs_key)?;
    identity::require_admin(host, &admin_certs, envelope)?;

    if new_cert_b64.trim().is_empty() {
        return Err(CoreError::BadArg("cert must not be empty".into()));
    }
    decode_certificate(new_cert_b64).map_err(CoreError::from)?;

    let mut admin_certs = admin_certs;
    admin_certs.push(new_cert_b64.to_string());
    store::save(ledger, &config.admin_certs_key, &admin_certs)
}

/// `add_party` (`spec.md` §4.3). Caller must be an admin. Validation order
/// as specified: auth → arg validity → role validity → uniqueness →
/// persist.
pub fn add_party(
    ledger: &mut dyn Ledger,
    config: &StoreConfig,
    host: &dyn SignatureHost,
    envelope: &CallerEnvelope,
    id: &str,
    role: Role,
    cert_b64: &str,
) -> Result<(), CoreError> {
    let admin_certs: Vec<String> = store::load(ledger, &config.admin_certs_key)?;
    identity::require_admin(host, &admin_certs, envelope)?;

    if id.trim().is_empty() {
        return Err(CoreError::BadArg("party id must not be empty".into()));
    }
    if cert_b64.trim().is_empty() {
        return Err(CoreError::BadArg("cert must not be empty".into()));
    }
    decode_certificate(cert_b64).map_err(CoreError::from)?;

    let parties: Vec<Party> = store::load(ledger, &config.parties_key)?;
    if parties.iter().any(|p| p.id == id) {
        return Err(CoreError::Duplicate(format!("party id already in use: {id}")));
    }
    if cert_already_registered(&parties, cert_b64) {
        return Err(CoreError::Duplicate(
            "certificate already belongs to a registered party".into(),
        ));
    }

    store::insert_unique(
        ledger,
        &config.parties_key,
        Party {
            id: id.to_string(),
            role,
            certs: vec![cert_b64.to_string()],
        },
        |p: &Party| p.id.clone(),
    )
}

/// `add_cert` (`spec.md` §4.3): self-service — caller must already be a
/// registered party.
pub fn add_cert(
    ledger: &mut dyn Ledger,
    config: &StoreConfig,
    host: &dyn SignatureHost,
    envelope: &CallerEnvelope,
    cert_b64: &str,
) -> Result<(), CoreError> {
    let parties: Vec<Party> = store::load(ledger, &config.parties_key)?;
    let caller = identity::require_caller_party(host, &parties, envelope)?;
    let caller_id = caller.id.clone();

    if cert_b64.trim().is_empty() {
        return Err(CoreError::BadArg("cert must not be empty".into()));
    }
    decode_certificate(cert_b64).map_err(CoreError::from)?;
    if cert_already_registered(&parties, cert_b64) {
        return Err(CoreError::Duplicate(
            "certificate already belongs to a registered party".into(),
        ));
    }

    let mut parties = parties;
    let slot = parties
        .iter_mut()
        .find(|p| p.id == caller_id)
        .expect("caller_party found it above");
    slot.certs.push(cert_b64.to_string());
    store::save(ledger, &config.parties_key, &parties)
}
