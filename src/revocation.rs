//! Per-path revocation checking and the injected network capabilities.
//!
//! For every non-anchor certificate in a built path, three mechanisms are
//! evaluated in fixed precedence: the static CRL registry (always), CRLs
//! fetched from the certificate's CRL Distribution Point (when enabled),
//! and OCSP (when enabled). The first revocation found short-circuits the
//! remaining certificates. Dynamic mechanisms fail closed: if an enabled
//! mechanism cannot retrieve or validate its data, the chain is rejected
//! rather than silently passed.

use crate::error::{FetchError, RevocationError, RevocationSource, RevokedError};
use crate::helpers::{crl_distribution_uris, ocsp_responder_uris, serial_hex, subject_display};
use crate::registry::{check_crl_applicability, find_revoked_entry, CrlRegistry};
use crate::validator::ValidatorConfig;
use log::{debug, trace};
use std::time::Duration;
use x509_parser::prelude::*;
use x509_parser::revocation_list::CertificateRevocationList;

/// Injected capability for retrieving CRLs referenced by a certificate's
/// CRL Distribution Point extension.
///
/// Implementations own transport, retries, and caching; the validator only
/// consumes the DER bytes and verifies issuer, validity window, and
/// signature itself. A timeout overrun must surface as
/// [`FetchError::Timeout`].
pub trait CrlFetcher: Send + Sync {
    /// Retrieve the DER-encoded CRL published at `uri`.
    fn fetch_crl(&self, uri: &str, timeout: Duration) -> Result<Vec<u8>, FetchError>;
}

/// Injected capability for querying an OCSP responder.
///
/// The validator supplies the certificate under test, its issuer, and the
/// responder URI advertised in the certificate's Authority Information
/// Access extension. Only the first advertised responder is consulted; a
/// certificate listing several responders gets no fallback, so an
/// implementation wanting redundancy must provide it behind this trait.
pub trait OcspResponder: Send + Sync {
    /// Query the responder for the certificate's revocation status.
    fn query(
        &self,
        cert_der: &[u8],
        issuer_der: &[u8],
        responder_uri: &str,
        timeout: Duration,
    ) -> Result<OcspStatus, FetchError>;
}

/// Status reported by an OCSP responder (RFC 6960).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OcspStatus {
    /// The certificate is not known to be revoked.
    Good,
    /// The certificate has been revoked.
    Revoked {
        /// RFC 5280 reason-code name, when the response carried one.
        reason: Option<String>,
        /// Revocation time as a Unix timestamp, when available.
        revocation_time: Option<i64>,
    },
    /// The responder does not know the certificate.
    Unknown,
}

/// Policy for `unknown` OCSP responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownPolicy {
    /// Treat `unknown` as a validation failure (consistent with the
    /// fail-closed CRLDP handling). The default.
    #[default]
    FailClosed,
    /// Treat `unknown` as not revoked.
    FailOpen,
}

/// Check revocation status for every non-anchor certificate in the path.
///
/// `parsed_path` is the built certification path, leaf first, anchor last;
/// the anchor is exempt (it is the issuer of trust, not a subject of it).
pub(crate) fn check_path(
    parsed_path: &[(&[u8], X509Certificate<'_>)],
    registry: &CrlRegistry,
    config: &ValidatorConfig,
    crl_fetcher: Option<&dyn CrlFetcher>,
    ocsp_responder: Option<&dyn OcspResponder>,
    now_ts: i64,
) -> Result<(), RevocationError> {
    for link in parsed_path.windows(2) {
        let [(cert_der, cert), (issuer_der, issuer)] = link else {
            continue;
        };

        check_static(cert, issuer, registry, now_ts)?;

        if config.enable_crldp {
            check_crldp(cert, issuer, crl_fetcher, config.fetch_timeout, now_ts)?;
        }

        if config.enable_ocsp {
            check_ocsp(
                cert_der,
                cert,
                issuer_der,
                ocsp_responder,
                config.fetch_timeout,
                config.ocsp_unknown_policy,
            )?;
        }

        trace!("certificate {} passed all enabled revocation checks", cert.subject());
    }
    Ok(())
}

/// Consult the static registry. Always runs. CRLs that are inapplicable
/// (wrong issuer, stale, bad signature) are skipped; absence of a matching
/// CRL is not evidence of revocation.
fn check_static(
    cert: &X509Certificate,
    issuer: &X509Certificate,
    registry: &CrlRegistry,
    now_ts: i64,
) -> Result<(), RevocationError> {
    let Some(crl_ders) = registry.find_by_issuer_raw(cert.issuer().as_raw()) else {
        return Ok(());
    };

    for crl_der in crl_ders {
        let Ok((_, crl)) = CertificateRevocationList::from_der(crl_der) else {
            continue;
        };
        if let Err(reject) = check_crl_applicability(&crl, issuer, now_ts) {
            trace!("skipping static CRL: {}", reject);
            continue;
        }
        if let Some(entry) = find_revoked_entry(&crl, cert) {
            debug!("certificate {} revoked in static CRL", cert.subject());
            return Err(RevokedError {
                subject: subject_display(cert),
                serial: serial_hex(cert),
                source: RevocationSource::StaticCrl,
                reason: entry.reason,
                revocation_time: Some(entry.revocation_time),
            }
            .into());
        }
    }
    Ok(())
}

/// Fetch and evaluate the CRLs referenced by the certificate's CRLDP
/// extension. A certificate without the extension has nothing to check;
/// with it, every referenced list must be retrievable and valid.
fn check_crldp(
    cert: &X509Certificate,
    issuer: &X509Certificate,
    fetcher: Option<&dyn CrlFetcher>,
    timeout: Duration,
    now_ts: i64,
) -> Result<(), RevocationError> {
    let uris = crl_distribution_uris(cert);
    if uris.is_empty() {
        return Ok(());
    }
    let Some(fetcher) = fetcher else {
        return Err(RevocationError::CrlFetcherMissing);
    };

    for uri in uris {
        debug!("fetching CRL for {} from {}", cert.subject(), uri);
        let bytes = fetcher
            .fetch_crl(&uri, timeout)
            .map_err(|source| RevocationError::CrlFetch {
                uri: uri.clone(),
                source,
            })?;

        let (_, crl) = CertificateRevocationList::from_der(&bytes).map_err(|e| {
            RevocationError::CrlInvalid {
                uri: uri.clone(),
                source: FetchError::Malformed(e.to_string()),
            }
        })?;

        check_crl_applicability(&crl, issuer, now_ts).map_err(|detail| {
            RevocationError::CrlInvalid {
                uri: uri.clone(),
                source: FetchError::Malformed(detail),
            }
        })?;

        if let Some(entry) = find_revoked_entry(&crl, cert) {
            debug!("certificate {} revoked in CRL from {}", cert.subject(), uri);
            return Err(RevokedError {
                subject: subject_display(cert),
                serial: serial_hex(cert),
                source: RevocationSource::CrlDp,
                reason: entry.reason,
                revocation_time: Some(entry.revocation_time),
            }
            .into());
        }
    }
    Ok(())
}

/// Query the OCSP responder advertised in the certificate's AIA extension.
/// A certificate advertising no responder has nothing to check; one
/// advertising several is judged by the first alone.
fn check_ocsp(
    cert_der: &[u8],
    cert: &X509Certificate,
    issuer_der: &[u8],
    responder: Option<&dyn OcspResponder>,
    timeout: Duration,
    unknown_policy: UnknownPolicy,
) -> Result<(), RevocationError> {
    let uris = ocsp_responder_uris(cert);
    let Some(uri) = uris.first() else {
        return Ok(());
    };
    let Some(responder) = responder else {
        return Err(RevocationError::OcspResponderMissing);
    };

    debug!("querying OCSP responder {} for {}", uri, cert.subject());
    match responder.query(cert_der, issuer_der, uri, timeout) {
        Err(source) => Err(RevocationError::OcspQuery {
            subject: subject_display(cert),
            source,
        }),
        Ok(OcspStatus::Good) => Ok(()),
        Ok(OcspStatus::Revoked {
            reason,
            revocation_time,
        }) => Err(RevokedError {
            subject: subject_display(cert),
            serial: serial_hex(cert),
            source: RevocationSource::Ocsp,
            reason,
            revocation_time,
        }
        .into()),
        Ok(OcspStatus::Unknown) => match unknown_policy {
            UnknownPolicy::FailClosed => Err(RevocationError::OcspUnknown {
                subject: subject_display(cert),
            }),
            UnknownPolicy::FailOpen => {
                debug!(
                    "OCSP responder does not know {}; passing per fail-open policy",
                    cert.subject()
                );
                Ok(())
            }
        },
    }
}
