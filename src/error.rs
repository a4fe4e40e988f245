//! Error taxonomy for chain validation.
//!
//! The nesting of these types is part of the public contract, not an
//! implementation artifact. A failed [`crate::ChainValidator::validate`]
//! call always returns [`ValidationFailure`]; its `std::error::Error`
//! source chain identifies the failed stage and mechanism:
//!
//! - no trust path: `ValidationFailure -> PathBuildingError` (depth 2)
//! - revoked certificate: `ValidationFailure -> RevocationError ->
//!   RevokedError` (depth 3), tagged with the detecting
//!   [`RevocationSource`]
//! - unretrievable or unusable revocation data (fail closed):
//!   `ValidationFailure -> RevocationError -> FetchError` (depth 3)
//!
//! The configuration and policy outcomes [`RevocationError::CrlFetcherMissing`],
//! [`RevocationError::OcspResponderMissing`], and
//! [`RevocationError::OcspUnknown`] have no inner error and therefore sit at
//! depth 2. Depth discrimination alone cannot separate them from
//! path-building failures; matching on the [`ValidationFailure`] variant is
//! authoritative for the failed stage.

use thiserror::Error;

/// Umbrella failure reported by [`crate::ChainValidator::validate`].
///
/// The variant identifies the stage that failed; the wrapped error is also
/// exposed as the `std::error::Error` source.
#[derive(Debug, Error)]
pub enum ValidationFailure {
    /// No valid certification path from the leaf to a trust anchor.
    #[error("certificate chain validation failed")]
    PathBuilding(#[from] PathBuildingError),

    /// A path was built but a revocation check did not pass.
    #[error("certificate chain validation failed")]
    Revocation(#[from] RevocationError),
}

/// Path construction failed: the candidate set does not chain to any trust
/// anchor under signature, validity-period, and basic-constraints rules.
#[derive(Debug, Error)]
pub enum PathBuildingError {
    /// No chain from the leaf terminates at a trust anchor. Also covers the
    /// empty trust store and missing-intermediate cases.
    #[error("unable to find valid certification path to requested target")]
    NoValidPath,

    /// The candidate certificate set was empty.
    #[error("empty candidate certificate set")]
    EmptyInput,

    /// A candidate certificate could not be parsed as DER X.509.
    #[error("failed to parse candidate certificate at position {position}: {detail}")]
    MalformedCandidate { position: usize, detail: String },
}

/// A revocation check failed for a certificate in the built path.
#[derive(Debug, Error)]
pub enum RevocationError {
    /// A certificate was positively found revoked.
    #[error("certificate revocation check failed")]
    Revoked(#[from] RevokedError),

    /// The injected CRL fetcher could not retrieve a distribution-point CRL.
    /// Fail closed: the certificate is not given the benefit of the doubt.
    #[error("could not retrieve CRL from distribution point {uri}")]
    CrlFetch {
        uri: String,
        #[source]
        source: FetchError,
    },

    /// A fetched CRL was unusable: wrong issuer, outside its validity
    /// window, bad signature, or not parseable. The source carries the
    /// rejection detail.
    #[error("CRL retrieved from {uri} was rejected")]
    CrlInvalid {
        uri: String,
        #[source]
        source: FetchError,
    },

    /// CRLDP checking is enabled but no [`crate::CrlFetcher`] is installed
    /// and a certificate carries a distribution point.
    #[error("CRL distribution point checking enabled but no CRL fetcher installed")]
    CrlFetcherMissing,

    /// The injected OCSP responder failed to produce a status.
    #[error("OCSP query failed for certificate {subject}")]
    OcspQuery {
        subject: String,
        #[source]
        source: FetchError,
    },

    /// The OCSP responder answered `unknown` and the validator is configured
    /// fail-closed (the default).
    #[error("OCSP responder returned unknown status for certificate {subject}")]
    OcspUnknown { subject: String },

    /// OCSP checking is enabled but no [`crate::OcspResponder`] is installed
    /// and a certificate advertises a responder.
    #[error("OCSP checking enabled but no OCSP responder installed")]
    OcspResponderMissing,
}

/// A specific certificate was found revoked.
///
/// Display and Error are implemented by hand: the `source` field is the
/// detecting mechanism, not a nested error, and this type is the terminal
/// link of the cause chain.
#[derive(Debug, Clone)]
pub struct RevokedError {
    /// Subject distinguished name of the revoked certificate.
    pub subject: String,
    /// Serial number as colon-separated uppercase hex.
    pub serial: String,
    /// Mechanism that detected the revocation.
    pub source: RevocationSource,
    /// RFC 5280 reason-code name, when the CRL entry or OCSP response
    /// carried one.
    pub reason: Option<String>,
    /// Revocation time as a Unix timestamp, when available.
    pub revocation_time: Option<i64>,
}

impl std::fmt::Display for RevokedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "certificate {} (serial {}) is revoked via {}",
            self.subject, self.serial, self.source
        )?;
        if let Some(reason) = &self.reason {
            write!(f, ": {reason}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RevokedError {}

/// Mechanism through which a revocation was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationSource {
    /// The static CRL registry supplied at validator construction.
    StaticCrl,
    /// A CRL fetched from the certificate's CRL Distribution Point.
    CrlDp,
    /// An OCSP responder answer.
    Ocsp,
}

impl std::fmt::Display for RevocationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RevocationSource::StaticCrl => write!(f, "static CRL"),
            RevocationSource::CrlDp => write!(f, "CRL distribution point"),
            RevocationSource::Ocsp => write!(f, "OCSP"),
        }
    }
}

/// Failure of an injected network capability (CRL fetcher or OCSP
/// responder). Retries belong to the collaborator; the validator treats any
/// of these as terminal for the current call.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The operation did not complete within the caller-specified timeout.
    #[error("fetch timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The endpoint could not be reached or returned an error status.
    #[error("endpoint unreachable: {0}")]
    Unreachable(String),

    /// The response was received but could not be understood.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Input parsing failure (construction-time certificates/CRLs or PEM
/// bundles).
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse certificate: {0}")]
    Certificate(String),

    #[error("failed to parse CRL: {0}")]
    Crl(String),

    #[error("invalid PEM input: {0}")]
    Pem(String),
}
