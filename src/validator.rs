//! The validator facade: trust store + static CRL registry + configuration.

use crate::error::{ParseError, PathBuildingError, ValidationFailure};
use crate::path;
use crate::registry::CrlRegistry;
use crate::revocation::{self, CrlFetcher, OcspResponder, UnknownPolicy};
use crate::trust::TrustStore;
use log::debug;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use x509_parser::prelude::*;

/// Default timeout handed to the injected CRL fetcher and OCSP responder.
pub(crate) const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration snapshot read once at the start of each validate call.
///
/// The validator's setters may race with in-flight `validate` calls; a
/// given call sees either the old or the new value of each knob
/// (last-write-visible), never a torn mix read at different points of the
/// same check. Callers needing strict isolation should serialize
/// configuration changes externally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Consult CRLs referenced by certificates' CRL Distribution Point
    /// extensions, via the injected fetcher.
    pub enable_crldp: bool,
    /// Query OCSP responders advertised in certificates' AIA extensions.
    pub enable_ocsp: bool,
    /// Timeout handed to the injected fetcher/responder per operation.
    pub fetch_timeout: Duration,
    /// Handling of `unknown` OCSP responses.
    pub ocsp_unknown_policy: UnknownPolicy,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        ValidatorConfig {
            enable_crldp: false,
            enable_ocsp: false,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            ocsp_unknown_policy: UnknownPolicy::FailClosed,
        }
    }
}

/// Certificate-chain trust validator.
///
/// Holds an immutable trust store and static CRL registry established at
/// construction, plus mutable configuration toggles. The instance is
/// `Send + Sync` and may be shared across threads; `validate` is
/// synchronous, performs no internal concurrency, and leaves the instance
/// fully reusable after a failure.
pub struct ChainValidator {
    trust_store: TrustStore,
    registry: CrlRegistry,
    enable_crldp: AtomicBool,
    enable_ocsp: AtomicBool,
    fetch_timeout_ms: AtomicU64,
    ocsp_fail_open: AtomicBool,
    crl_fetcher: Option<Arc<dyn CrlFetcher>>,
    ocsp_responder: Option<Arc<dyn OcspResponder>>,
}

impl std::fmt::Debug for ChainValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainValidator")
            .field("trust_store", &self.trust_store)
            .field("registry", &self.registry)
            .field("config", &self.config())
            .finish()
    }
}

impl ChainValidator {
    /// Construct a validator from DER-encoded trust anchors and static
    /// CRLs.
    ///
    /// An empty anchor set is legal but every subsequent validation will
    /// fail at path building. An empty CRL set means "no static revocation
    /// data"; it never implies trust by itself. Both dynamic revocation
    /// mechanisms start disabled.
    pub fn new(trust_anchors: &[Vec<u8>], static_crls: &[Vec<u8>]) -> Result<Self, ParseError> {
        Ok(Self::from_parts(
            TrustStore::from_der_certs(trust_anchors)?,
            CrlRegistry::from_der_crls(static_crls)?,
        ))
    }

    /// Construct a validator from pre-built components.
    pub fn from_parts(trust_store: TrustStore, registry: CrlRegistry) -> Self {
        let defaults = ValidatorConfig::default();
        ChainValidator {
            trust_store,
            registry,
            enable_crldp: AtomicBool::new(defaults.enable_crldp),
            enable_ocsp: AtomicBool::new(defaults.enable_ocsp),
            fetch_timeout_ms: AtomicU64::new(defaults.fetch_timeout.as_millis() as u64),
            ocsp_fail_open: AtomicBool::new(false),
            crl_fetcher: None,
            ocsp_responder: None,
        }
    }

    /// Install the CRL-fetching capability used for CRLDP checks.
    pub fn with_crl_fetcher(mut self, fetcher: Arc<dyn CrlFetcher>) -> Self {
        self.crl_fetcher = Some(fetcher);
        self
    }

    /// Install the OCSP responder capability used for OCSP checks.
    pub fn with_ocsp_responder(mut self, responder: Arc<dyn OcspResponder>) -> Self {
        self.ocsp_responder = Some(responder);
        self
    }

    /// Enable or disable CRL Distribution Point checking. Takes effect on
    /// the next and all subsequent validate calls.
    pub fn set_enable_crldp(&self, enabled: bool) {
        self.enable_crldp.store(enabled, Ordering::Relaxed);
    }

    /// Enable or disable OCSP checking. Takes effect on the next and all
    /// subsequent validate calls.
    pub fn set_enable_ocsp(&self, enabled: bool) {
        self.enable_ocsp.store(enabled, Ordering::Relaxed);
    }

    /// Set the timeout handed to the injected fetcher/responder.
    pub fn set_fetch_timeout(&self, timeout: Duration) {
        self.fetch_timeout_ms
            .store(timeout.as_millis() as u64, Ordering::Relaxed);
    }

    /// Set the policy for `unknown` OCSP responses.
    pub fn set_ocsp_unknown_policy(&self, policy: UnknownPolicy) {
        self.ocsp_fail_open
            .store(policy == UnknownPolicy::FailOpen, Ordering::Relaxed);
    }

    /// Current configuration snapshot. `validate` reads exactly one of
    /// these at the start of each call.
    pub fn config(&self) -> ValidatorConfig {
        ValidatorConfig {
            enable_crldp: self.enable_crldp.load(Ordering::Relaxed),
            enable_ocsp: self.enable_ocsp.load(Ordering::Relaxed),
            fetch_timeout: Duration::from_millis(self.fetch_timeout_ms.load(Ordering::Relaxed)),
            ocsp_unknown_policy: if self.ocsp_fail_open.load(Ordering::Relaxed) {
                UnknownPolicy::FailOpen
            } else {
                UnknownPolicy::FailClosed
            },
        }
    }

    /// Number of trust anchors.
    pub fn trust_anchor_count(&self) -> usize {
        self.trust_store.len()
    }

    /// Number of static CRLs.
    pub fn static_crl_count(&self) -> usize {
        self.registry.len()
    }

    /// Build a certification path from the candidate set to one of this
    /// validator's trust anchors, without revocation checking.
    ///
    /// This is the offline half of [`validate`](Self::validate): name
    /// linkage, signatures, validity periods, and basic constraints are
    /// enforced, no network capability is consulted.
    pub fn build_path(
        &self,
        candidates: &[Vec<u8>],
    ) -> Result<crate::CertificationPath, PathBuildingError> {
        let now_ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        path::build_path(candidates, &self.trust_store, now_ts)
    }

    /// Validate a candidate certificate chain.
    ///
    /// The first certificate is the leaf to validate; the remainder are
    /// eligible intermediates, in any order, extras tolerated. On success
    /// a valid certification path to a trust anchor exists and every
    /// non-anchor certificate passed all enabled revocation checks. On
    /// failure the returned [`ValidationFailure`] identifies the stage and,
    /// for revocations, the mechanism via its source chain.
    pub fn validate(&self, candidates: &[Vec<u8>]) -> Result<(), ValidationFailure> {
        let config = self.config();
        let now_ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;

        let built = path::build_path(candidates, &self.trust_store, now_ts)?;

        // Path certificates re-parse by construction; the error arm guards
        // against DER that parsed leniently once but not twice.
        let parsed: Vec<(&[u8], X509Certificate)> = built
            .certs()
            .iter()
            .enumerate()
            .map(|(i, der)| {
                X509Certificate::from_der(der)
                    .map(|(_, cert)| (der.as_slice(), cert))
                    .map_err(|e| PathBuildingError::MalformedCandidate {
                        position: i,
                        detail: e.to_string(),
                    })
            })
            .collect::<Result<_, _>>()?;

        revocation::check_path(
            &parsed,
            &self.registry,
            &config,
            self.crl_fetcher.as_deref(),
            self.ocsp_responder.as_deref(),
            now_ts,
        )?;

        debug!("chain of {} certificates validated", candidates.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_checks_start_disabled() {
        let v = ChainValidator::new(&[], &[]).unwrap();
        let config = v.config();
        assert!(!config.enable_crldp);
        assert!(!config.enable_ocsp);
        assert_eq!(config.fetch_timeout, DEFAULT_FETCH_TIMEOUT);
        assert_eq!(config.ocsp_unknown_policy, UnknownPolicy::FailClosed);
    }

    #[test]
    fn setters_are_visible_in_next_snapshot() {
        let v = ChainValidator::new(&[], &[]).unwrap();
        v.set_enable_crldp(true);
        v.set_enable_ocsp(true);
        v.set_fetch_timeout(Duration::from_secs(3));
        v.set_ocsp_unknown_policy(UnknownPolicy::FailOpen);

        let config = v.config();
        assert!(config.enable_crldp);
        assert!(config.enable_ocsp);
        assert_eq!(config.fetch_timeout, Duration::from_secs(3));
        assert_eq!(config.ocsp_unknown_policy, UnknownPolicy::FailOpen);

        v.set_enable_crldp(false);
        assert!(!v.config().enable_crldp);
    }

    #[test]
    fn counts_reflect_construction_input() {
        let v = ChainValidator::new(&[], &[]).unwrap();
        assert_eq!(v.trust_anchor_count(), 0);
        assert_eq!(v.static_crl_count(), 0);
    }
}
