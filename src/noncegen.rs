//! Nonce Generator.
//!
//! Derives a signer's secret/public nonce pair from session entropy, the signer's own
//! public key, and optional context (secret key, message, aggregate key, extra input).

use k256::elliptic_curve::Field;
use k256::Scalar;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::field::{mul_gen, scalar_from_bytes_reduce};
use crate::keyagg::KeyAggCache;
use crate::keypair::Keypair;
use crate::objects::{PublicNonce, SecretNonce};
use crate::tagged_hash::TaggedHash;

/// Inputs shared by both public entry points, gathered here instead of threaded
/// through a long parameter list.
pub struct NonceGenInput<'a> {
    pub seckey: Option<&'a [u8; 32]>,
    pub pubkey: [u8; 33],
    pub msg: Option<&'a [u8; 32]>,
    pub agg: Option<&'a [u8; 32]>,
    pub extra: Option<&'a [u8; 32]>,
}

fn derive(rand_in: &[u8; 32], input: &NonceGenInput) -> Result<(SecretNonce, PublicNonce)> {
    let rand = match input.seckey {
        Some(sk) => {
            let mut aux = TaggedHash::new(b"MuSig/aux");
            aux.update(rand_in);
            let aux = aux.finalize();
            let mut out = [0u8; 32];
            for i in 0..32 {
                out[i] = aux[i] ^ sk[i];
            }
            out
        }
        None => *rand_in,
    };

    let mut h = TaggedHash::new(b"MuSig/nonce");
    h.update(&rand);
    h.write_optional(1, Some(input.pubkey.as_slice()));
    h.write_optional(1, input.agg.map(|a| a.as_slice()));
    let msg_present = input.msg.is_some();
    h.update(&[msg_present as u8]);
    if let Some(msg) = input.msg {
        h.write_optional(8, Some(msg.as_slice()));
    }
    h.write_optional(4, input.extra.map(|e| e.as_slice()));

    let mut k = [Scalar::ZERO; 2];
    for (i, slot) in k.iter_mut().enumerate() {
        let mut hi = h.clone();
        hi.update(&[i as u8]);
        *slot = scalar_from_bytes_reduce(&hi.finalize());
    }

    let pk = crate::field::point_from_bytes_compressed(&input.pubkey)?;

    let r0 = mul_gen(&k[0]).to_affine();
    let r1 = mul_gen(&k[1]).to_affine();

    let secret = SecretNonce::new(k[0], k[1], pk);
    let public = PublicNonce::new(r0, r1);
    Ok((secret, public))
}

/// Generates a fresh nonce pair from explicit 32-byte session entropy. `session_secrand32`
/// must be non-zero; on failure the caller's entropy buffer is zeroized in place so a
/// failed attempt can never be silently reused.
#[instrument(skip(session_secrand32, seckey, pubkey, cache), fields(has_seckey = seckey.is_some()))]
pub fn nonce_gen(
    session_secrand32: &mut [u8; 32],
    seckey: Option<&[u8; 32]>,
    pubkey: &Keypair,
    msg: Option<&[u8; 32]>,
    cache: Option<&KeyAggCache>,
    extra: Option<&[u8; 32]>,
) -> Result<(SecretNonce, PublicNonce)> {
    if session_secrand32.iter().all(|b| *b == 0) {
        return Err(Error::ZeroEntropy);
    }

    let agg = cache.map(|c| c.agg_xonly());
    let input = NonceGenInput {
        seckey,
        pubkey: pubkey.public_key_compressed(),
        msg,
        agg: agg.as_ref(),
        extra,
    };

    let result = derive(session_secrand32, &input);
    // The caller's entropy buffer must not be reusable regardless of outcome.
    session_secrand32.fill(0);
    result
}

/// Non-randomized variant: derives `session_secrand32` from a monotonically increasing
/// counter. The caller is responsible for never repeating `nrc` for the same keypair.
#[instrument(skip(keypair, cache))]
pub fn nonce_gen_counter(
    nrc: u64,
    keypair: &Keypair,
    msg: Option<&[u8; 32]>,
    cache: Option<&KeyAggCache>,
    extra: Option<&[u8; 32]>,
) -> Result<(SecretNonce, PublicNonce)> {
    let mut session_secrand32 = [0u8; 32];
    session_secrand32[..8].copy_from_slice(&nrc.to_be_bytes());
    nonce_gen(&mut session_secrand32, None, keypair, msg, cache, extra)
}
