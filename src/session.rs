//! Session Processor.
//!
//! Combines the aggregate nonce, the message, and the key-aggregation cache into the
//! immutable [`Session`] object every signer uses to produce and verify its partial
//! signature.

use k256::ProjectivePoint;
use tracing::instrument;

use crate::error::Result;
use crate::field::{is_infinity, is_odd_y, mul_gen, scalar_cond_negate, scalar_from_bytes_reduce, x_coord};
use crate::keyagg::KeyAggCache;
use crate::objects::{AggregateNonce, Session};
use crate::schnorr::schnorr_challenge;
use crate::tagged_hash::TaggedHash;

#[instrument(skip(aggnonce, cache, msg))]
pub fn process_session(aggnonce: &AggregateNonce, msg: &[u8; 32], cache: &KeyAggCache) -> Result<Session> {
    let agg32 = cache.agg_xonly();

    let mut h = TaggedHash::new(b"MuSig/noncecoef");
    h.update(&aggnonce.to_bytes());
    h.update(&agg32);
    h.update(msg);
    let b = scalar_from_bytes_reduce(&h.finalize());

    let r_proj = ProjectivePoint::from(aggnonce.s[0]) + ProjectivePoint::from(aggnonce.s[1]) * b;
    let r = r_proj.to_affine();
    // Per the protocol's spec-mandated fallback: an effective nonce of infinity (only
    // reachable with adversarially crafted public nonces) is replaced by the generator
    // rather than failing, so the session object always has a well-defined R.
    let r = if is_infinity(&r) { k256::ProjectivePoint::GENERATOR.to_affine() } else { r };

    let r_x = x_coord(&r);
    let parity_fin = is_odd_y(&r);

    let e = schnorr_challenge(&r_x, msg, &agg32);

    let s_tweak = if cache.has_tweak() {
        let e_prime = e * cache.tweak_acc();
        scalar_cond_negate(e_prime, is_odd_y(&cache.q()))
    } else {
        k256::Scalar::ZERO
    };

    Ok(Session {
        parity_fin,
        r_x,
        b,
        e,
        s_tweak,
    })
}
