//! Partial Signer.

use tracing::instrument;

use crate::error::{Error, Result};
use crate::field::{bytes_eq_ct, is_odd_y, point_to_bytes_compressed, scalar_cond_negate};
use crate::keyagg::KeyAggCache;
use crate::keypair::Keypair;
use crate::objects::{PartialSignature, SecretNonce, Session};

/// Produces this signer's contribution to the joint signature, consuming the secret
/// nonce: it is zeroized in place as the very first step, regardless of the outcome,
/// so a second call on the same value always fails the validity check below.
#[instrument(skip(secnonce, keypair, cache, session))]
pub fn partial_sign(
    secnonce: &mut SecretNonce,
    keypair: &Keypair,
    cache: &KeyAggCache,
    session: &Session,
) -> Result<PartialSignature> {
    let k0 = secnonce.k[0];
    let k1 = secnonce.k[1];
    let p_stored = secnonce.pk;
    secnonce.invalidate();

    if crate::field::scalar_is_zero(&k0) && crate::field::scalar_is_zero(&k1) {
        return Err(Error::InvalidScalar);
    }

    let p_stored_bytes = point_to_bytes_compressed(&p_stored);
    let p_kp_bytes = keypair.public_key_compressed();
    if !bytes_eq_ct(&p_stored_bytes, &p_kp_bytes) {
        return Err(Error::KeyMismatch);
    }

    let mut sk = keypair.secret_scalar();
    let flip = is_odd_y(&cache.q()) ^ cache.parity_acc();
    sk = scalar_cond_negate(sk, flip);

    let mu = cache.keyaggcoef(&p_kp_bytes);
    sk *= mu;

    let k0 = scalar_cond_negate(k0, session.parity_fin);
    let k1 = scalar_cond_negate(k1, session.parity_fin);

    let s = session.e * sk + k0 + session.b * k1;
    Ok(PartialSignature::new(s))
}
