//! Partial Verifier.

use k256::ProjectivePoint;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::field::{is_infinity, is_odd_y, mul_gen, scalar_cond_negate};
use crate::keyagg::KeyAggCache;
use crate::objects::{PartialSignature, PublicNonce, Session};

/// Verifies one signer's partial signature against its public nonce, public key, the
/// key-aggregation cache, and the session, as a group-law equation. Any failure to
/// construct the equation (e.g. an invalid public key) is treated as rejection.
#[instrument(skip(partial_sig, pubnonce, pubkey, cache, session))]
pub fn partial_sig_verify(
    partial_sig: &PartialSignature,
    pubnonce: &PublicNonce,
    pubkey: &[u8; 33],
    cache: &KeyAggCache,
    session: &Session,
) -> Result<()> {
    let p = crate::field::point_from_bytes_compressed(pubkey)?;

    let r_unprimed = ProjectivePoint::from(pubnonce.r[0]) + ProjectivePoint::from(pubnonce.r[1]) * session.b;
    let r_prime = if session.parity_fin {
        -r_unprimed
    } else {
        r_unprimed
    };

    let mu = cache.keyaggcoef(pubkey);
    let e_prime = scalar_cond_negate(session.e * mu, is_odd_y(&cache.q()) ^ cache.parity_acc());

    let lhs = mul_gen(&partial_sig.s);
    let rhs = r_prime + ProjectivePoint::from(p) * e_prime;

    let check = (lhs - rhs).to_affine();
    if is_infinity(&check) {
        Ok(())
    } else {
        Err(Error::PartialSigInvalid)
    }
}
