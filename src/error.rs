//! Error types for the MuSig2 session engine

use thiserror::Error;

/// Result type alias using the MuSig2 error type
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur during MuSig2 session operations.
///
/// Every variant corresponds to a failure the protocol treats as a single
/// boolean "reject": there is no partial success, and callers must treat
/// the originating session as aborted.
#[derive(Debug, Error)]
pub enum Error {
    /// Opaque object tag did not match the expected kind
    #[error("invalid object tag")]
    InvalidTag,

    /// A parsed scalar was not reduced mod the curve order
    #[error("scalar overflows curve order")]
    Overflow,

    /// Session entropy (`session_secrand32`) was all-zero
    #[error("session entropy must be non-zero")]
    ZeroEntropy,

    /// Secret nonce's stored public key does not match the supplied keypair
    #[error("secret nonce does not belong to this keypair")]
    KeyMismatch,

    /// A compressed point failed to parse or is not on the curve
    #[error("invalid curve point encoding")]
    InvalidPoint,

    /// A 32-byte buffer could not be loaded as a scalar
    #[error("invalid scalar encoding")]
    InvalidScalar,

    /// Nonce list, signer list, or public key list was empty
    #[error("signer list must be non-empty")]
    EmptySignerList,

    /// Key-aggregation cache could not be built from the supplied keys
    #[error("key aggregation cache is invalid")]
    InvalidCache,

    /// Partial signature failed verification against its session and cache
    #[error("partial signature verification failed")]
    PartialSigInvalid,

    /// Final aggregate signature failed BIP-340 verification
    #[error("aggregate signature verification failed")]
    SignatureInvalid,
}
