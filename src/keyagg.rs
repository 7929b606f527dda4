//! Key-aggregation cache.
//!
//! The session engine proper treats this as an external collaborator built by a
//! separate key-aggregation subsystem and consumed read-only. This crate supplements
//! that subsystem with a minimal BIP-327-style implementation so the engine can be
//! exercised end to end: `KeyAggCache::new` aggregates a signer set into `Q`, and
//! `apply_xonly_tweak` folds in x-only tweaks while tracking the parity accumulator.

use k256::elliptic_curve::group::prime::PrimeCurveAffine;
use k256::{AffinePoint, ProjectivePoint, Scalar};
use tracing::instrument;

use crate::error::{Error, Result};
use crate::field::{
    is_infinity, is_odd_y, mul_gen, negate_point, point_from_bytes_compressed,
    point_to_bytes_compressed, scalar_from_bytes_reduce, scalar_is_zero, x_coord,
};
use crate::tagged_hash::TaggedHash;

/// Read-only view consumed by the Session Processor, Partial Signer, and Partial
/// Verifier: the aggregate point, the accumulated parity flip, and the accumulated
/// tweak scalar.
#[derive(Clone)]
pub struct KeyAggCache {
    pub(crate) q: AffinePoint,
    pub(crate) parity_acc: bool,
    pub(crate) tweak_acc: Scalar,
    list_hash: [u8; 32],
    second_key: Option<[u8; 33]>,
}

impl KeyAggCache {
    /// Aggregates an ordered, non-empty list of signer public keys into a fresh cache
    /// with no tweak applied. The order given is the order used; callers that want a
    /// canonical aggregate key across implementations must sort before calling.
    #[instrument(skip(pubkeys), fields(n = pubkeys.len()))]
    pub fn new(pubkeys: &[[u8; 33]]) -> Result<Self> {
        if pubkeys.is_empty() {
            return Err(Error::EmptySignerList);
        }

        let mut list_hasher = TaggedHash::new(b"KeyAgg list");
        for pk in pubkeys {
            list_hasher.update(pk);
        }
        let list_hash = list_hasher.finalize();

        let second_key = pubkeys.iter().find(|pk| *pk != &pubkeys[0]).copied();

        let mut q = ProjectivePoint::IDENTITY;
        for pk in pubkeys {
            let point = point_from_bytes_compressed(pk)?;
            let coeff = Self::coefficient(&list_hash, second_key, pk);
            q += ProjectivePoint::from(point) * coeff;
        }
        let q = q.to_affine();
        if is_infinity(&q) {
            return Err(Error::InvalidCache);
        }

        Ok(Self {
            q,
            parity_acc: false,
            tweak_acc: Scalar::ZERO,
            list_hash,
            second_key,
        })
    }

    fn coefficient(list_hash: &[u8; 32], second_key: Option<[u8; 33]>, pk: &[u8; 33]) -> Scalar {
        if second_key == Some(*pk) {
            return Scalar::ONE;
        }
        let mut h = TaggedHash::new(b"KeyAgg coefficient");
        h.update(list_hash);
        h.update(pk);
        scalar_from_bytes_reduce(&h.finalize())
    }

    /// Per-signer KeyAgg coefficient `μ`, recomputed from the cache's stored list hash
    /// and second-key exemption.
    pub fn keyaggcoef(&self, pubkey: &[u8; 33]) -> Scalar {
        Self::coefficient(&self.list_hash, self.second_key, pubkey)
    }

    /// Applies an x-only tweak, folding the resulting y-parity flip into `parity_acc`
    /// and the tweak scalar into `tweak_acc`, per BIP-327.
    pub fn apply_xonly_tweak(&mut self, tweak: &[u8; 32]) -> Result<()> {
        let t = crate::field::scalar_from_bytes_strict(tweak).map_err(|_| Error::InvalidScalar)?;
        let g_odd = is_odd_y(&self.q);
        let g = if g_odd { -Scalar::ONE } else { Scalar::ONE };

        let tweaked = mul_gen(&t) + ProjectivePoint::from(self.q) * g;
        let tweaked = tweaked.to_affine();
        if is_infinity(&tweaked) {
            return Err(Error::InvalidCache);
        }

        self.parity_acc = if g_odd { !self.parity_acc } else { self.parity_acc };
        self.tweak_acc = t + g * self.tweak_acc;
        self.q = tweaked;
        Ok(())
    }

    /// The 32-byte x-only aggregate public key, as exposed to callers (e.g. for
    /// BIP-340 verification of the final signature).
    pub fn agg_xonly(&self) -> [u8; 32] {
        x_coord(&self.q)
    }

    pub fn q(&self) -> AffinePoint {
        self.q
    }

    pub fn parity_acc(&self) -> bool {
        self.parity_acc
    }

    pub fn tweak_acc(&self) -> Scalar {
        self.tweak_acc
    }

    pub fn has_tweak(&self) -> bool {
        !scalar_is_zero(&self.tweak_acc)
    }
}

/// Negates a point; exposed for callers that need to lift a plain point to the
/// even-y representative of a given x-only key, mirroring the BIP-340 convention.
pub fn lift_even_y(p: AffinePoint) -> AffinePoint {
    if is_odd_y(&p) {
        negate_point(&p)
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::point_to_bytes_compressed;
    use k256::NonZeroScalar;
    use rand::rngs::OsRng;

    fn random_pubkey() -> ([u8; 33], Scalar) {
        let sk = NonZeroScalar::random(&mut OsRng);
        let pk = (mul_gen(&sk)).to_affine();
        (point_to_bytes_compressed(&pk), *sk)
    }

    #[test]
    fn single_key_gets_hashed_coefficient_not_identity() {
        let (pk, _) = random_pubkey();
        let cache = KeyAggCache::new(&[pk]).unwrap();

        // The second-key exemption only ever applies to a second *distinct* key
        // in the list; with one signer there is no second key, so the lone key
        // is not exempt and gets the ordinary tagged-hash coefficient.
        let mut list_hasher = TaggedHash::new(b"KeyAgg list");
        list_hasher.update(&pk);
        let list_hash = list_hasher.finalize();
        let mut h = TaggedHash::new(b"KeyAgg coefficient");
        h.update(&list_hash);
        h.update(&pk);
        let expected_coeff = scalar_from_bytes_reduce(&h.finalize());

        assert_eq!(cache.keyaggcoef(&pk), expected_coeff);
        let expected_q =
            (ProjectivePoint::from(point_from_bytes_compressed(&pk).unwrap()) * expected_coeff)
                .to_affine();
        assert_eq!(cache.q(), expected_q);
    }

    #[test]
    fn rejects_empty_signer_set() {
        assert!(matches!(KeyAggCache::new(&[]), Err(Error::EmptySignerList)));
    }

    #[test]
    fn tweak_updates_parity_and_tweak_accumulators() {
        let (pk1, _) = random_pubkey();
        let (pk2, _) = random_pubkey();
        let mut cache = KeyAggCache::new(&[pk1, pk2]).unwrap();
        let tweak = [7u8; 32];
        cache.apply_xonly_tweak(&tweak).unwrap();
        assert!(cache.has_tweak());
    }
}
