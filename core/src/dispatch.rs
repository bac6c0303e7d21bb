//! C7 — Dispatcher / Query (`spec.md` §4.7): function-name dispatch for
//! mutations and read-only queries.
//!
//! Generalizes the teacher's Soroban `#[contractimpl]` method table (where
//! the host VM resolves a call by ABI selector) into an explicit name →
//! handler match, since this core's host calls it by string name rather
//! than by compiled selector. This is also the one place that turns
//! positional `&[String]` into typed values (roles, timestamps) before
//! handing them to component functions that never parse strings
//! themselves — keeping `party_registry`/`accreditation_registry`/etc.
//! unit-testable without string marshalling, per `SPEC_FULL.md` §4.7.
//!
//! `now` — the instant against which expiry is judged — is supplied by the
//! host alongside the transaction's signature envelope, the same way the
//! teacher's contracts read `env.ledger().timestamp()` from the host VM
//! rather than the system clock: the core itself never calls
//! `OffsetDateTime::now_utc()`.

use std::str::FromStr;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, warn};

use agrifood_common::Role;

use crate::accreditation_registry;
use crate::authorization_registry;
use crate::config::StoreConfig;
use crate::error::CoreError;
use crate::ledger::{CallerEnvelope, Ledger, SignatureHost};
use crate::model::{CertificateSignature, GrapeUnit, ProvenanceEntry, SigningAuthorization};
use crate::party_registry;
use crate::provenance;
use crate::store;

fn require_args<'a>(fn_name: &str, args: &'a [String], expected: usize) -> Result<&'a [String], CoreError> {
    if args.len() != expected {
        Err(CoreError::BadArg(format!(
            "{fn_name} expects {expected} argument(s), got {}",
            args.len()
        )))
    } else {
        Ok(args)
    }
}

fn non_empty<'a>(field: &str, value: &'a str) -> Result<&'a str, CoreError> {
    if value.trim().is_empty() {
        Err(CoreError::BadArg(format!("{field} must not be empty")))
    } else {
        Ok(value)
    }
}

fn parse_role(value: &str) -> Result<Role, CoreError> {
    Role::from_str(value).map_err(CoreError::from)
}

fn parse_time(value: &str) -> Result<OffsetDateTime, CoreError> {
    agrifood_common::parse_rfc3339(value).map_err(CoreError::from)
}

fn ok_message(fn_name: &str) -> Vec<u8> {
    format!("ok: {fn_name}").into_bytes()
}

fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>, CoreError> {
    serde_json::to_vec(value).map_err(|e| CoreError::Encode(e.to_string()))
}

/// `Init` (`spec.md` §6).
pub fn init(
    ledger: &mut dyn Ledger,
    config: &StoreConfig,
    admin_cert_b64: &str,
) -> Result<(), CoreError> {
    store::init(ledger, config, admin_cert_b64)
}

/// `Invoke(fn_name, args) -> message_bytes | error` (`spec.md` §6/§4.7).
pub fn invoke(
    ledger: &mut dyn Ledger,
    config: &StoreConfig,
    host: &dyn SignatureHost,
    envelope: &CallerEnvelope,
    now: OffsetDateTime,
    fn_name: &str,
    args: &[String],
) -> Result<Vec<u8>, CoreError> {
    let result = dispatch_invoke(ledger, config, host, envelope, now, fn_name, args);
    match &result {
        Ok(_) => info!(fn_name, "invoke committed"),
        Err(e) => warn!(fn_name, error = %e, category = ?e.category(), "invoke rejected"),
    }
    result
}

fn dispatch_invoke(
    ledger: &mut dyn Ledger,
    config: &StoreConfig,
    host: &dyn SignatureHost,
    envelope: &CallerEnvelope,
    now: OffsetDateTime,
    fn_name: &str,
    args: &[String],
) -> Result<Vec<u8>, CoreError> {
    match fn_name {
        "add_admin" => {
            // Auth first, per spec.md §4.3's "auth → arg count → role
            // validity → uniqueness → persist" — checked here, before the
            // args are even counted, so a non-admin caller never learns
            // anything about arg shape.
            party_registry::require_admin_caller(ledger, config, host, envelope)?;
            let args = require_args(fn_name, args, 1)?;
            let cert = non_empty("cert", &args[0])?;
            party_registry::add_admin(ledger, config, host, envelope, cert)?;
        }
        "add_party" => {
            party_registry::require_admin_caller(ledger, config, host, envelope)?;
            let args = require_args(fn_name, args, 3)?;
            let id = non_empty("id", &args[0])?;
            let role = parse_role(&args[1])?;
            let cert = non_empty("cert", &args[2])?;
            party_registry::add_party(ledger, config, host, envelope, id, role, cert)?;
        }
        "add_cert" => {
            party_registry::require_registered_caller(ledger, config, host, envelope)?;
            let args = require_args(fn_name, args, 1)?;
            let cert = non_empty("cert", &args[0])?;
            party_registry::add_cert(ledger, config, host, envelope, cert)?;
        }
        "add_signing_accreditation" => {
            let args = require_args(fn_name, args, 4)?;
            let id = non_empty("id", &args[0])?;
            let description = &args[1];
            let created = parse_time(&args[2])?;
            let expires = parse_time(&args[3])?;
            accreditation_registry::add_signing_accreditation(
                ledger, config, host, envelope, id, description, created, expires,
            )?;
        }
        "issue_signing_accreditation" => {
            let args = require_args(fn_name, args, 2)?;
            let accr_id = non_empty("accr_id", &args[0])?;
            let cert_body_id = non_empty("cert_body_id", &args[1])?;
            accreditation_registry::issue_signing_accreditation(
                ledger, config, host, envelope, accr_id, cert_body_id, now,
            )?;
        }
        "revoke_signing_accreditation" => {
            let args = require_args(fn_name, args, 2)?;
            let accr_id = non_empty("accr_id", &args[0])?;
            let timestamp = parse_time(&args[1])?;
            accreditation_registry::revoke_signing_accreditation(
                ledger, config, host, envelope, accr_id, timestamp,
            )?;
        }
        "grant_signing_authority" => {
            let args = require_args(fn_name, args, 3)?;
            let accr_id = non_empty("accr_id", &args[0])?;
            let farm_id = non_empty("farm_id", &args[1])?;
            let expires = parse_time(&args[2])?;
            authorization_registry::grant_signing_authority(
                ledger, config, host, envelope, accr_id, farm_id, expires, now,
            )?;
        }
        "revoke_signing_authority" => {
            let args = require_args(fn_name, args, 3)?;
            let accr_id = non_empty("accr_id", &args[0])?;
            let party_id = non_empty("party_id", &args[1])?;
            let timestamp = parse_time(&args[2])?;
            authorization_registry::revoke_signing_authority(
                ledger, config, host, envelope, accr_id, party_id, timestamp,
            )?;
        }
        "create_grapes" => {
            let args = require_args(fn_name, args, 2)?;
            let uuid = non_empty("uuid", &args[0])?;
            let created = parse_time(&args[1])?;
            provenance::create_grapes(ledger, config, host, envelope, uuid, created)?;
        }
        "certify_grapes" => {
            let args = require_args(fn_name, args, 3)?;
            let uuid = non_empty("uuid", &args[0])?;
            let accr_id = non_empty("accr_id", &args[1])?;
            let issued = parse_time(&args[2])?;
            provenance::certify_grapes(ledger, config, host, envelope, uuid, accr_id, issued, now)?;
        }
        "revoke_signature" => {
            // Corrected per spec.md §9: exactly three arguments.
            let args = require_args(fn_name, args, 3)?;
            let uuid = non_empty("uuid", &args[0])?;
            let accr_id = non_empty("accr_id", &args[1])?;
            let timestamp = parse_time(&args[2])?;
            provenance::revoke_signature(ledger, config, host, envelope, uuid, accr_id, timestamp)?;
        }
        "transfer_grapes" => {
            let args = require_args(fn_name, args, 3)?;
            let uuid = non_empty("uuid", &args[0])?;
            let new_party_id = non_empty("new_party_id", &args[1])?;
            let timestamp = parse_time(&args[2])?;
            provenance::transfer_grapes(ledger, config, host, envelope, uuid, new_party_id, timestamp)?;
        }
        _ => return Err(CoreError::UnknownFunction(fn_name.to_string())),
    }
    Ok(ok_message(fn_name))
}

/// `Query(fn_name, args) -> json_bytes | error` (`spec.md` §6/§4.7).
/// Queries require no authentication.
pub fn query(
    ledger: &dyn Ledger,
    config: &StoreConfig,
    fn_name: &str,
    args: &[String],
) -> Result<Vec<u8>, CoreError> {
    match fn_name {
        "grape_provenance" => {
            let args = require_args(fn_name, args, 1)?;
            let uuid = non_empty("uuid", &args[0])?;
            let units: Vec<GrapeUnit> = store::load(ledger, &config.grape_units_key)?;
            let unit = units
                .into_iter()
                .find(|u| u.uuid == uuid)
                .ok_or_else(|| CoreError::NotFound(format!("grape unit not found: {uuid}")))?;
            let provenance: Vec<ProvenanceEntry> = unit.provenance;
            to_json(&provenance)
        }
        "grape_certification" => {
            // Corrected per spec.md §9: returns the full signature list,
            // not just the first entry.
            let args = require_args(fn_name, args, 1)?;
            let uuid = non_empty("uuid", &args[0])?;
            let units: Vec<GrapeUnit> = store::load(ledger, &config.grape_units_key)?;
            let unit = units
                .into_iter()
                .find(|u| u.uuid == uuid)
                .ok_or_else(|| CoreError::NotFound(format!("grape unit not found: {uuid}")))?;
            let signatures: Vec<CertificateSignature> = unit.signatures;
            to_json(&signatures)
        }
        "signer_certs" => {
            let args = require_args(fn_name, args, 1)?;
            let farm_id = non_empty("farm_id", &args[0])?;
            let authorizations: Vec<SigningAuthorization> =
                store::load(ledger, &config.signing_authorizations_key)?;
            let matching: Vec<SigningAuthorization> = authorizations
                .into_iter()
                .filter(|a| a.authorized_party == farm_id)
                .collect();
            to_json(&matching)
        }
        _ => Err(CoreError::UnknownFunction(fn_name.to_string())),
    }
}
