//! MuSig2 multi-signature session engine over secp256k1.
//!
//! ```text
//! signer                          coordinator                        signer
//!   │ nonce_gen                                                         │
//!   │────────────────────────► public nonce ◄──────────────────────────│
//!   │                               │                                  │
//!   │                          nonce_agg                               │
//!   │                               │                                  │
//!   │                        process_session                           │
//!   │                               │                                  │
//!   │ ◄─────────────────────── session ───────────────────────────────►│
//!   │ partial_sign                                            partial_sign
//!   │────────────────────────► aggregate ◄──────────────────────────────│
//! ```
//!
//! The two-round protocol runs entirely through the types in this crate: generate a
//! [`SecretNonce`]/[`PublicNonce`] pair with [`nonce_gen`], aggregate published public
//! nonces with [`nonce_agg`], process the result into a [`Session`] with
//! [`process_session`], produce a [`PartialSignature`] per signer with [`partial_sign`],
//! optionally check one with [`partial_sig_verify`], and combine all of them with
//! [`aggregate`] into a 64-byte BIP-340 Schnorr signature.

pub mod aggregate;
pub mod error;
pub mod field;
pub mod keyagg;
pub mod keypair;
pub mod noncegen;
pub mod nonceagg;
pub mod objects;
pub mod schnorr;
pub mod session;
pub mod sign;
pub mod tagged_hash;
pub mod verify;

pub use aggregate::aggregate;
pub use error::{Error, Result};
pub use keyagg::KeyAggCache;
pub use keypair::Keypair;
pub use noncegen::{nonce_gen, nonce_gen_counter, NonceGenInput};
pub use nonceagg::nonce_agg;
pub use objects::{AggregateNonce, PartialSignature, PublicNonce, SecretNonce, Session};
pub use session::process_session;
pub use sign::partial_sign;
pub use verify::partial_sig_verify;
