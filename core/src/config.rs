//! Injectable storage-key configuration.
//!
//! The teacher hardcodes every storage key as a module-level `const
//! Symbol` (`ADMIN`, `GUARDIANS`, `EXAM`, ...). A host-ledger-agnostic core
//! cannot assume it owns the whole keyspace the way an on-chain contract
//! instance does, so the five fixed collection keys from `spec.md` §3/§6
//! are gathered into one config value the host can override, instead of
//! being scattered `const`s.

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub admin_certs_key: String,
    pub parties_key: String,
    pub signing_certificates_key: String,
    pub signing_authorizations_key: String,
    pub grape_units_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            admin_certs_key: "AdminCerts".to_string(),
            parties_key: "parties".to_string(),
            signing_certificates_key: "SigningCertificates".to_string(),
            signing_authorizations_key: "SigningAuthorizations".to_string(),
            grape_units_key: "GrapeUnits".to_string(),
        }
    }
}
