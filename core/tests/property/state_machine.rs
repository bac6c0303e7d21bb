//! Property-based tests for the trust-chain core, modelling it as a state
//! machine and checking that randomized sequences of operations never
//! violate the invariants of `spec.md` §8 (P1–P6).

use proptest::prelude::*;
use time::{Duration, OffsetDateTime};

use agrifood_core::dispatch;
use agrifood_core::testkit::{Ed25519SignatureHost, InMemoryLedger, TestIdentity};
use agrifood_core::{CallerEnvelope, CoreError, StoreConfig};

fn envelope_for(identity: &TestIdentity) -> CallerEnvelope {
    let payload = b"payload".to_vec();
    let binding = b"binding".to_vec();
    let mut message = payload.clone();
    message.extend_from_slice(&binding);
    CallerEnvelope {
        caller_metadata: identity.sign(&message),
        payload,
        binding,
    }
}

fn base_time() -> OffsetDateTime {
    time::macros::datetime!(2025-01-01 00:00:00 UTC)
}

fn fmt(t: OffsetDateTime) -> String {
    agrifood_common::timestamp::format_rfc3339(t)
}

struct Harness {
    ledger: InMemoryLedger,
    config: StoreConfig,
    host: Ed25519SignatureHost,
}

impl Harness {
    fn new(admin: &TestIdentity) -> Self {
        let config = StoreConfig::default();
        let mut ledger = InMemoryLedger::new();
        dispatch::init(&mut ledger, &config, &admin.cert_b64).unwrap();
        Self { ledger, config, host: Ed25519SignatureHost }
    }

    fn invoke(
        &mut self,
        caller: &TestIdentity,
        now: OffsetDateTime,
        fn_name: &str,
        args: &[&str],
    ) -> Result<Vec<u8>, CoreError> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        dispatch::invoke(&mut self.ledger, &self.config, &self.host, &envelope_for(caller), now, fn_name, &args)
    }
}

proptest! {
    /// P1: a transaction signed by an identity with N certs is always
    /// recognized as that party, whichever of its certs happens to be
    /// present in the party's cert list at the time the call is checked.
    #[test]
    fn p1_any_registered_cert_authenticates_its_party(extra_certs in 0usize..4) {
        let admin = TestIdentity::generate();
        let mut h = Harness::new(&admin);
        let farm = TestIdentity::generate();
        h.invoke(&admin, base_time(), "add_party", &["F1", "Farm", &farm.cert_b64]).unwrap();

        let mut identities = vec![farm];
        for _ in 0..extra_certs {
            let next = TestIdentity::generate();
            h.invoke(&identities[0], base_time(), "add_cert", &[&next.cert_b64]).unwrap();
            identities.push(next);
        }

        for identity in &identities {
            let result = h.invoke(identity, base_time(), "add_signing_accreditation", &["ignored-will-fail-role", "d", &fmt(base_time()), &fmt(base_time())]);
            // Not a Farm-valid op, but UnknownCaller must never be the failure reason
            // for any of these identities — they all authenticate as F1.
            prop_assert!(!matches!(result, Err(CoreError::UnknownCaller)));
        }
    }

    /// P2: a party id, once committed, can never be committed again —
    /// regardless of which role or certificate the second attempt uses.
    #[test]
    fn p2_party_ids_stay_globally_unique(role_index in 0usize..5) {
        let roles = ["AccreditationBody", "CertificationBody", "Farm", "Auditor", "Trader"];
        let admin = TestIdentity::generate();
        let mut h = Harness::new(&admin);
        let first = TestIdentity::generate();
        let second = TestIdentity::generate();

        h.invoke(&admin, base_time(), "add_party", &["DUP", "Farm", &first.cert_b64]).unwrap();
        let err = h.invoke(&admin, base_time(), "add_party", &["DUP", roles[role_index], &second.cert_b64]).unwrap_err();
        prop_assert!(matches!(err, CoreError::Duplicate(_)));
    }

    /// P3: `grant_signing_authority` only ever commits when the
    /// accreditation has been issued to a certification body (not just
    /// created) and the target party is actually a Farm.
    #[test]
    fn p3_authority_requires_issued_accreditation_and_farm_target(
        issue_to_cb in any::<bool>(),
        target_is_farm in any::<bool>(),
    ) {
        let admin = TestIdentity::generate();
        let mut h = Harness::new(&admin);
        let ab = TestIdentity::generate();
        let cb = TestIdentity::generate();
        let target = TestIdentity::generate();

        h.invoke(&admin, base_time(), "add_party", &["AB1", "AccreditationBody", &ab.cert_b64]).unwrap();
        h.invoke(&admin, base_time(), "add_party", &["CB1", "CertificationBody", &cb.cert_b64]).unwrap();
        let target_role = if target_is_farm { "Farm" } else { "Trader" };
        h.invoke(&admin, base_time(), "add_party", &["TGT", target_role, &target.cert_b64]).unwrap();

        h.invoke(&ab, base_time(), "add_signing_accreditation", &["AC1", "d", &fmt(base_time()), &fmt(base_time() + Duration::days(3650))]).unwrap();
        if issue_to_cb {
            h.invoke(&ab, base_time(), "issue_signing_accreditation", &["AC1", "CB1"]).unwrap();
        }

        let result = h.invoke(&cb, base_time(), "grant_signing_authority", &["AC1", "TGT", &fmt(base_time() + Duration::days(300))]);

        if issue_to_cb && target_is_farm {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(result.is_err());
        }
    }

    /// P4: transfers only ever commit when the new timestamp strictly
    /// exceeds the unit's last provenance timestamp; the chain stays
    /// monotonic across any sequence of accepted/rejected attempts.
    #[test]
    fn p4_provenance_timestamps_stay_monotonic(offset_days in -5i64..10i64) {
        let admin = TestIdentity::generate();
        let mut h = Harness::new(&admin);
        let farm = TestIdentity::generate();
        let trader = TestIdentity::generate();
        h.invoke(&admin, base_time(), "add_party", &["F1", "Farm", &farm.cert_b64]).unwrap();
        h.invoke(&admin, base_time(), "add_party", &["T1", "Trader", &trader.cert_b64]).unwrap();

        let created = base_time();
        h.invoke(&farm, created, "create_grapes", &["U1", &fmt(created)]).unwrap();

        let first_transfer = created + Duration::days(5);
        h.invoke(&farm, first_transfer, "transfer_grapes", &["U1", "T1", &fmt(first_transfer)]).unwrap();

        let attempted = first_transfer + Duration::days(offset_days);
        let result = h.invoke(&trader, attempted, "transfer_grapes", &["U1", "F1", &fmt(attempted)]);

        if attempted > first_transfer {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(matches!(result, Err(CoreError::BadState(_))));
        }
    }

    /// P5: revoking an already-revoked accreditation never changes its
    /// `revoked_at`, regardless of how many further revoke calls follow or
    /// what timestamp they carry.
    #[test]
    fn p5_revocation_is_terminal(second_offset_days in 0i64..30i64) {
        let admin = TestIdentity::generate();
        let mut h = Harness::new(&admin);
        let ab = TestIdentity::generate();
        let auditor = TestIdentity::generate();
        h.invoke(&admin, base_time(), "add_party", &["AB1", "AccreditationBody", &ab.cert_b64]).unwrap();
        h.invoke(&admin, base_time(), "add_party", &["AU1", "Auditor", &auditor.cert_b64]).unwrap();
        h.invoke(&ab, base_time(), "add_signing_accreditation", &["AC1", "d", &fmt(base_time()), &fmt(base_time() + Duration::days(3650))]).unwrap();

        let first_revoke = base_time() + Duration::days(1);
        h.invoke(&auditor, first_revoke, "revoke_signing_accreditation", &["AC1", &fmt(first_revoke)]).unwrap();

        let second_revoke = first_revoke + Duration::days(second_offset_days);
        h.invoke(&auditor, second_revoke, "revoke_signing_accreditation", &["AC1", &fmt(second_revoke)]).unwrap();

        let accrs: Vec<agrifood_core::model::SigningAccreditation> =
            agrifood_core::store::load(&h.ledger, &h.config.signing_certificates_key).unwrap();
        prop_assert_eq!(accrs[0].revoked_at, Some(first_revoke));
    }

    /// P6: `certify_grapes` succeeds only when both the authorization and
    /// its accreditation are, at that instant, neither revoked nor
    /// expired.
    #[test]
    fn p6_certify_requires_live_authorization_and_accreditation(
        revoke_authorization in any::<bool>(),
        revoke_accreditation in any::<bool>(),
    ) {
        let admin = TestIdentity::generate();
        let mut h = Harness::new(&admin);
        let ab = TestIdentity::generate();
        let cb = TestIdentity::generate();
        let farm = TestIdentity::generate();
        let auditor = TestIdentity::generate();
        h.invoke(&admin, base_time(), "add_party", &["AB1", "AccreditationBody", &ab.cert_b64]).unwrap();
        h.invoke(&admin, base_time(), "add_party", &["CB1", "CertificationBody", &cb.cert_b64]).unwrap();
        h.invoke(&admin, base_time(), "add_party", &["F1", "Farm", &farm.cert_b64]).unwrap();
        h.invoke(&admin, base_time(), "add_party", &["AU1", "Auditor", &auditor.cert_b64]).unwrap();

        h.invoke(&ab, base_time(), "add_signing_accreditation", &["AC1", "d", &fmt(base_time()), &fmt(base_time() + Duration::days(3650))]).unwrap();
        h.invoke(&ab, base_time(), "issue_signing_accreditation", &["AC1", "CB1"]).unwrap();
        h.invoke(&cb, base_time(), "grant_signing_authority", &["AC1", "F1", &fmt(base_time() + Duration::days(300))]).unwrap();
        h.invoke(&farm, base_time(), "create_grapes", &["U1", &fmt(base_time())]).unwrap();

        if revoke_authorization {
            let ts = base_time() + Duration::days(1);
            h.invoke(&auditor, ts, "revoke_signing_authority", &["AC1", "F1", &fmt(ts)]).unwrap();
        }
        if revoke_accreditation {
            let ts = base_time() + Duration::days(1);
            h.invoke(&auditor, ts, "revoke_signing_accreditation", &["AC1", &fmt(ts)]).unwrap();
        }

        let issued = base_time() + Duration::days(2);
        let result = h.invoke(&farm, issued, "certify_grapes", &["U1", "AC1", &fmt(issued)]);

        if revoke_authorization || revoke_accreditation {
            prop_assert!(result.is_err());
        } else {
            prop_assert!(result.is_ok());
        }
    }
}
