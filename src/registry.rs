//! Static CRL registry and CRL evaluation helpers.

use crate::ParseError;
use std::collections::HashMap;
use x509_parser::prelude::*;
use x509_parser::revocation_list::CertificateRevocationList;

/// An immutable set of revocation lists, keyed by raw DER-encoded issuer
/// name.
///
/// Multiple CRLs may exist for the same issuer (full + delta); all supplied
/// lists are retained and consulted. An empty registry means "no static
/// revocation data" and never implies trust by itself.
pub struct CrlRegistry {
    crls_by_issuer: HashMap<Vec<u8>, Vec<Vec<u8>>>,
    count: usize,
}

impl std::fmt::Debug for CrlRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrlRegistry")
            .field("count", &self.count)
            .finish()
    }
}

impl CrlRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        CrlRegistry {
            crls_by_issuer: HashMap::new(),
            count: 0,
        }
    }

    /// Build a registry from DER-encoded CRLs.
    pub fn from_der_crls(crls: &[Vec<u8>]) -> Result<Self, ParseError> {
        let mut registry = CrlRegistry::new();
        for der in crls {
            registry.add_der(der)?;
        }
        Ok(registry)
    }

    /// Add a DER-encoded CRL.
    pub fn add_der(&mut self, der: &[u8]) -> Result<(), ParseError> {
        let (_, crl) =
            CertificateRevocationList::from_der(der).map_err(|e| ParseError::Crl(e.to_string()))?;

        let issuer_raw = crl.issuer().as_raw().to_vec();
        self.crls_by_issuer
            .entry(issuer_raw)
            .or_default()
            .push(der.to_vec());
        self.count += 1;

        Ok(())
    }

    /// CRLs whose issuer name matches the given raw DER-encoded name.
    pub(crate) fn find_by_issuer_raw(&self, issuer_raw: &[u8]) -> Option<&Vec<Vec<u8>>> {
        self.crls_by_issuer.get(issuer_raw)
    }

    /// Number of CRLs in the registry.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl Default for CrlRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a CRL revocation reason code as an RFC 5280-style string.
///
/// Matches on the numeric value of the `ReasonCode` newtype, per RFC 5280
/// Section 5.3.1.
pub(crate) fn format_crl_reason(rc: &x509_parser::x509::ReasonCode) -> &'static str {
    match rc.0 {
        0 => "unspecified",
        1 => "keyCompromise",
        2 => "cACompromise",
        3 => "affiliationChanged",
        4 => "superseded",
        5 => "cessationOfOperation",
        6 => "certificateHold",
        // 7 is unused per RFC 5280
        8 => "removeFromCRL",
        9 => "privilegeWithdrawn",
        10 => "aACompromise",
        _ => "unspecified",
    }
}

/// Check that a CRL is usable for judging certificates issued by `issuer`:
/// the issuer name matches, `now_ts` falls within [thisUpdate, nextUpdate],
/// and the CRL signature verifies against the issuer's public key.
///
/// Returns a human-readable rejection on failure.
pub(crate) fn check_crl_applicability(
    crl: &CertificateRevocationList,
    issuer: &X509Certificate,
    now_ts: i64,
) -> Result<(), String> {
    if crl.issuer() != issuer.subject() {
        return Err(format!(
            "CRL issuer {} does not match expected issuer {}",
            crl.issuer(),
            issuer.subject()
        ));
    }

    // RFC 5280 Section 6.3.3: CRL validity window
    if now_ts < crl.last_update().timestamp() {
        return Err("CRL is not yet valid".into());
    }
    if let Some(next_update) = crl.next_update() {
        if now_ts > next_update.timestamp() {
            return Err("CRL has expired".into());
        }
    }

    if crl.verify_signature(issuer.public_key()).is_err() {
        return Err("CRL signature does not verify against issuer key".into());
    }

    Ok(())
}

/// Entry found for a revoked certificate: reason name (if recorded) and
/// revocation time.
pub(crate) struct RevokedEntry {
    pub reason: Option<String>,
    pub revocation_time: i64,
}

/// Look up a certificate's serial number among the CRL's revoked entries.
pub(crate) fn find_revoked_entry(
    crl: &CertificateRevocationList,
    cert: &X509Certificate,
) -> Option<RevokedEntry> {
    let serial = cert.raw_serial();
    for revoked in crl.iter_revoked_certificates() {
        if revoked.raw_serial() == serial {
            let reason = revoked
                .reason_code()
                .map(|rc| format_crl_reason(&rc.1).to_string());
            return Some(RevokedEntry {
                reason,
                revocation_time: revoked.revocation_date.timestamp(),
            });
        }
    }
    None
}
