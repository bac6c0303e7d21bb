//! C1 — Store: typed whole-collection load/save over the host `Ledger`
//! (`spec.md` §4.1).
//!
//! Generalizes the teacher's `env.storage().persistent().get(&key)` /
//! `.set(&key, &value)` pattern (seen throughout `rbac.rs`, `recovery.rs`,
//! `examination.rs`) into a small typed wrapper over a generic `Ledger`,
//! since this core has no Soroban `Env` to own the storage namespace for
//! it.

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::ledger::Ledger;

/// Loads the named collection as a whole list. An absent or empty blob is
/// an empty list, never an error (`spec.md` §4.1: "Empty blob parses as
/// empty list").
pub fn load<T: DeserializeOwned>(ledger: &dyn Ledger, key: &str) -> Result<Vec<T>, CoreError> {
    let bytes = ledger
        .get_state(key)
        .map_err(|e| CoreError::StoreRead(format!("{key}: {e}")))?;
    match bytes {
        None => Ok(Vec::new()),
        Some(bytes) if bytes.is_empty() => Ok(Vec::new()),
        Some(bytes) => serde_json::from_slice(&bytes)
            .map_err(|e| CoreError::Decode(format!("{key}: {e}"))),
    }
}

/// Saves the whole collection, replacing whatever was there before.
pub fn save<T: Serialize>(ledger: &mut dyn Ledger, key: &str, items: &[T]) -> Result<(), CoreError> {
    let bytes =
        serde_json::to_vec(items).map_err(|e| CoreError::Encode(format!("{key}: {e}")))?;
    ledger
        .put_state(key, bytes)
        .map_err(|e| CoreError::StoreWrite(format!("{key}: {e}")))?;
    debug!(key, count = items.len(), "saved collection");
    Ok(())
}

/// Loads the collection, rejects a duplicate keyed item, appends, saves.
pub fn insert_unique<T, K, F>(
    ledger: &mut dyn Ledger,
    key: &str,
    item: T,
    keyof: F,
) -> Result<(), CoreError>
where
    T: Serialize + DeserializeOwned,
    K: PartialEq,
    F: Fn(&T) -> K,
{
    let mut items: Vec<T> = load(ledger, key)?;
    let new_key = keyof(&item);
    if items.iter().any(|existing| keyof(existing) == new_key) {
        warn!(key, "rejected duplicate insert");
        return Err(CoreError::Duplicate(format!("{key}: item already exists")));
    }
    items.push(item);
    save(ledger, key, &items)
}

/// Loads the collection, replaces the first item `matches` selects, saves.
/// A no-op (not an error) when nothing matches (`spec.md` §4.1).
pub fn update_by<T, F>(
    ledger: &mut dyn Ledger,
    key: &str,
    updated: T,
    matches: F,
) -> Result<(), CoreError>
where
    T: Serialize + DeserializeOwned,
    F: Fn(&T) -> bool,
{
    let mut items: Vec<T> = load(ledger, key)?;
    if let Some(slot) = items.iter_mut().find(|existing| matches(existing)) {
        *slot = updated;
    }
    save(ledger, key, &items)
}

/// `Init` (`spec.md` §6): seeds the five collections, `AdminCerts` with the
/// bootstrap admin certificate supplied externally.
pub fn init(
    ledger: &mut dyn Ledger,
    config: &crate::config::StoreConfig,
    admin_cert_b64: &str,
) -> Result<(), CoreError> {
    if admin_cert_b64.trim().is_empty() {
        return Err(CoreError::BadArg("admin_cert_b64 must not be empty".into()));
    }
    agrifood_common::crypto::decode_certificate(admin_cert_b64).map_err(CoreError::from)?;
    save::<String>(ledger, &config.admin_certs_key, &[admin_cert_b64.to_string()])?;
    save::<crate::model::Party>(ledger, &config.parties_key, &[])?;
    save::<crate::model::SigningAccreditation>(ledger, &config.signing_certificates_key, &[])?;
    save::<crate::model::SigningAuthorization>(ledger, &config.signing_authorizations_key, &[])?;
    save::<crate::model::GrapeUnit>(ledger, &config.grape_units_key, &[])?;
    Ok(())
}
