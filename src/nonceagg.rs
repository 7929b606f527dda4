//! Nonce Aggregator.
//!
//! Sums an unordered collection of per-signer public nonces into a single aggregate
//! nonce. Either resulting point may be the point at infinity for adversarial inputs;
//! this is legitimate and handled downstream by the Session Processor's fallback.

use k256::ProjectivePoint;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::objects::{AggregateNonce, PublicNonce};

#[instrument(skip(nonces), fields(n = nonces.len()))]
pub fn nonce_agg(nonces: &[PublicNonce]) -> Result<AggregateNonce> {
    if nonces.is_empty() {
        return Err(Error::EmptySignerList);
    }

    let mut sums = [ProjectivePoint::IDENTITY; 2];
    for nonce in nonces {
        sums[0] += ProjectivePoint::from(nonce.r[0]);
        sums[1] += ProjectivePoint::from(nonce.r[1]);
    }

    Ok(AggregateNonce::new(sums[0].to_affine(), sums[1].to_affine()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{is_infinity, mul_gen};
    use k256::NonZeroScalar;
    use rand::rngs::OsRng;

    #[test]
    fn rejects_empty_list() {
        assert!(matches!(nonce_agg(&[]), Err(Error::EmptySignerList)));
    }

    #[test]
    fn sums_two_signers() {
        let s1 = NonZeroScalar::random(&mut OsRng);
        let s2 = NonZeroScalar::random(&mut OsRng);
        let n1 = PublicNonce::new(mul_gen(&s1).to_affine(), mul_gen(&s2).to_affine());
        let n2 = PublicNonce::new(mul_gen(&s2).to_affine(), mul_gen(&s1).to_affine());
        let agg = nonce_agg(&[n1, n2]).unwrap();
        assert!(!is_infinity(&agg.s[0]));
        assert!(!is_infinity(&agg.s[1]));
    }

    #[test]
    fn opposing_nonces_sum_to_infinity() {
        let s = NonZeroScalar::random(&mut OsRng);
        let r = mul_gen(&s).to_affine();
        let neg_r = crate::field::negate_point(&r);
        let n1 = PublicNonce::new(r, r);
        let n2 = PublicNonce::new(neg_r, neg_r);
        let agg = nonce_agg(&[n1, n2]).unwrap();
        assert!(is_infinity(&agg.s[0]));
        assert!(is_infinity(&agg.s[1]));
    }
}
