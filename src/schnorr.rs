//! BIP-340 Schnorr challenge and standalone verification.
//!
//! The session engine treats the challenge hash as an external primitive; this module
//! supplements it with the conventional BIP-340 construction, plus a single-key verify
//! routine used by the test suite to confirm MuSig2 output is bit-identical to ordinary
//! BIP-340 signatures (distilled spec scenario E1).

use k256::{ProjectivePoint, Scalar};

use crate::error::{Error, Result};
use crate::field::{is_infinity, mul_gen, scalar_from_bytes_reduce, x_coord};
use crate::tagged_hash::TaggedHash;

/// `e = H(Rx || Px || msg)` under the `BIP0340/challenge` tag.
pub fn schnorr_challenge(r_x: &[u8; 32], msg: &[u8; 32], px: &[u8; 32]) -> Scalar {
    let mut h = TaggedHash::new(b"BIP0340/challenge");
    h.update(r_x);
    h.update(px);
    h.update(msg);
    scalar_from_bytes_reduce(&h.finalize())
}

/// Verifies a 64-byte `Rx || s` signature against a 32-byte x-only public key, using
/// the even-y lift convention from BIP-340.
pub fn verify(sig: &[u8; 64], msg: &[u8; 32], px: &[u8; 32]) -> Result<()> {
    let r_x: [u8; 32] = sig[..32].try_into().unwrap();
    let s = crate::field::scalar_from_bytes_strict(&sig[32..].try_into().unwrap())?;

    // Lift the x-only key to its even-y representative: encode as a compressed point
    // with the even-y tag and let SEC1 parsing recover y.
    let mut compressed = [0u8; 33];
    compressed[0] = 0x02;
    compressed[1..].copy_from_slice(px);
    let p = crate::field::point_from_bytes_compressed(&compressed)?;

    let e = schnorr_challenge(&r_x, msg, px);

    let r_candidate = mul_gen(&s) - ProjectivePoint::from(p) * e;
    let r_candidate = r_candidate.to_affine();
    if is_infinity(&r_candidate) {
        return Err(Error::SignatureInvalid);
    }
    if crate::field::is_odd_y(&r_candidate) {
        return Err(Error::SignatureInvalid);
    }
    if x_coord(&r_candidate) != r_x {
        return Err(Error::SignatureInvalid);
    }
    Ok(())
}
