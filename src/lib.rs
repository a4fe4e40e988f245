//! trustpath: certificate-chain trust validation with revocation checking.
//!
//! Given a set of trusted root certificates and an optional set of static
//! Certificate Revocation Lists (CRLs), a [`ChainValidator`] judges whether a
//! candidate certificate chain (leaf plus zero or more intermediates, in any
//! order, possibly with extraneous certificates) is cryptographically valid,
//! anchored in trust, within its validity periods, and not revoked.
//!
//! Revocation is evaluated through up to three mechanisms, in fixed
//! precedence:
//!
//! 1. the static CRL registry supplied at construction (always consulted),
//! 2. CRLs fetched from the certificate's CRL Distribution Point extension
//!    (opt-in via [`ChainValidator::set_enable_crldp`]),
//! 3. OCSP queries against the certificate's advertised responder
//!    (opt-in via [`ChainValidator::set_enable_ocsp`]).
//!
//! Network access is never performed by this crate. CRL fetching and OCSP
//! querying are injected capabilities ([`CrlFetcher`], [`OcspResponder`])
//! supplied by the caller; when a dynamic mechanism is enabled and its data
//! cannot be retrieved or validated, the chain fails closed.
//!
//! Failures carry a structured cause chain: a path-building failure is
//! `ValidationFailure -> PathBuildingError` (source depth 2), while a
//! revocation is `ValidationFailure -> RevocationError -> RevokedError`
//! (source depth 3) with an explicit [`RevocationSource`] tag. Callers can
//! branch on either the enum structure or the `std::error::Error` source
//! chain.

mod error;
mod helpers;
mod oid;
mod path;
mod pem;
mod registry;
mod revocation;
mod trust;
mod validator;

pub use error::{
    FetchError, ParseError, PathBuildingError, RevocationError, RevocationSource, RevokedError,
    ValidationFailure,
};
pub use path::CertificationPath;
pub use pem::{parse_pem_certs, parse_pem_crls};
pub use registry::CrlRegistry;
pub use revocation::{CrlFetcher, OcspResponder, OcspStatus, UnknownPolicy};
pub use trust::TrustStore;
pub use validator::{ChainValidator, ValidatorConfig};
