//! Scalar and point primitives over secp256k1, built on top of `k256`'s public
//! arithmetic API. This module is the crate's only boundary with curve math; every
//! other module reaches the group through these wrappers.

use k256::elliptic_curve::group::prime::PrimeCurveAffine;
use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::elliptic_curve::subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use k256::elliptic_curve::{Curve, Field, PrimeField};
use k256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar, Secp256k1, U256};

use crate::error::{Error, Result};

/// Parses a scalar from 32 big-endian bytes, reducing silently modulo the curve order.
/// Used wherever the protocol calls for `scalar_set_b32` without an overflow check
/// (hash outputs, which overflow with negligible probability).
pub fn scalar_from_bytes_reduce(bytes: &[u8; 32]) -> Scalar {
    let fb = FieldBytes::clone_from_slice(bytes);
    <Scalar as Reduce<U256>>::reduce_bytes(&fb)
}

/// Parses a scalar from 32 big-endian bytes, rejecting values that are not fully
/// reduced modulo the curve order. Used for wire-format partial signatures.
pub fn scalar_from_bytes_strict(bytes: &[u8; 32]) -> Result<Scalar> {
    let fb = FieldBytes::clone_from_slice(bytes);
    Option::from(Scalar::from_repr(fb)).ok_or(Error::Overflow)
}

pub fn scalar_to_bytes(s: &Scalar) -> [u8; 32] {
    s.to_bytes().into()
}

pub fn scalar_is_zero(s: &Scalar) -> bool {
    bool::from(s.is_zero())
}

/// Constant-time conditional negation: returns `-s` when `flag` is true, `s` otherwise.
pub fn scalar_cond_negate(s: Scalar, flag: bool) -> Scalar {
    Scalar::conditional_select(&s, &(-s), Choice::from(flag as u8))
}

/// Parses a 33-byte SEC1 compressed point. Rejects the point at infinity: callers that
/// need to accept infinity use [`point_from_bytes_ext`].
pub fn point_from_bytes_compressed(bytes: &[u8; 33]) -> Result<AffinePoint> {
    let encoded = EncodedPoint::from_bytes(bytes).map_err(|_| Error::InvalidPoint)?;
    let affine: Option<AffinePoint> = AffinePoint::from_encoded_point(&encoded).into();
    let affine = affine.ok_or(Error::InvalidPoint)?;
    if is_infinity(&affine) {
        return Err(Error::InvalidPoint);
    }
    // secp256k1 has cofactor 1: every point that parses on-curve is automatically in
    // the prime-order subgroup, so no separate subgroup check is required here.
    Ok(affine)
}

/// Parses a 33-byte "extended" compressed point: all-zero denotes the point at infinity.
pub fn point_from_bytes_ext(bytes: &[u8; 33]) -> Result<AffinePoint> {
    if bytes.iter().all(|b| *b == 0) {
        return Ok(AffinePoint::identity());
    }
    let encoded = EncodedPoint::from_bytes(bytes).map_err(|_| Error::InvalidPoint)?;
    let affine: Option<AffinePoint> = AffinePoint::from_encoded_point(&encoded).into();
    affine.ok_or(Error::InvalidPoint)
}

/// Serializes a point in the standard 33-byte compressed form. Never called on the
/// point at infinity (the protocol never needs to, by construction).
pub fn point_to_bytes_compressed(p: &AffinePoint) -> [u8; 33] {
    debug_assert!(!is_infinity(p), "attempted to compress the point at infinity");
    let encoded = p.to_encoded_point(true);
    let mut out = [0u8; 33];
    out.copy_from_slice(encoded.as_bytes());
    out
}

/// Serializes a point in the "extended" 33-byte form: infinity becomes 33 zero bytes.
pub fn point_to_bytes_ext(p: &AffinePoint) -> [u8; 33] {
    if is_infinity(p) {
        return [0u8; 33];
    }
    point_to_bytes_compressed(p)
}

/// Internal 64-byte affine encoding: raw big-endian `x || y`, with the all-zero buffer
/// reserved for the point at infinity (which is never a valid `(x, y)` pair on this curve).
pub fn point_to_bytes64(p: &AffinePoint) -> [u8; 64] {
    if is_infinity(p) {
        return [0u8; 64];
    }
    let encoded = p.to_encoded_point(false);
    let mut out = [0u8; 64];
    out[..32].copy_from_slice(encoded.x().expect("uncompressed point has x"));
    out[32..].copy_from_slice(encoded.y().expect("uncompressed point has y"));
    out
}

pub fn point_from_bytes64(bytes: &[u8; 64]) -> Result<AffinePoint> {
    if bytes.iter().all(|b| *b == 0) {
        return Ok(AffinePoint::identity());
    }
    let mut sec1 = [0u8; 65];
    sec1[0] = 0x04;
    sec1[1..].copy_from_slice(bytes);
    let encoded = EncodedPoint::from_bytes(sec1).map_err(|_| Error::InvalidPoint)?;
    let affine: Option<AffinePoint> = AffinePoint::from_encoded_point(&encoded).into();
    affine.ok_or(Error::InvalidPoint)
}

pub fn is_infinity(p: &AffinePoint) -> bool {
    bool::from(p.is_identity())
}

/// True when the point's y-coordinate is odd. Infinity has no parity and must not be
/// passed here.
pub fn is_odd_y(p: &AffinePoint) -> bool {
    debug_assert!(!is_infinity(p));
    let encoded = p.to_encoded_point(true);
    encoded.as_bytes()[0] == 0x03
}

/// 32-byte big-endian x-coordinate. Infinity has no x-coordinate and must not be
/// passed here.
pub fn x_coord(p: &AffinePoint) -> [u8; 32] {
    debug_assert!(!is_infinity(p));
    let encoded = p.to_encoded_point(true);
    let mut out = [0u8; 32];
    out.copy_from_slice(&encoded.as_bytes()[1..]);
    out
}

pub fn negate_point(p: &AffinePoint) -> AffinePoint {
    (-ProjectivePoint::from(*p)).to_affine()
}

/// `a * G`
pub fn mul_gen(a: &Scalar) -> ProjectivePoint {
    ProjectivePoint::GENERATOR * a
}

/// `p1 + a * p2`, matching the `ecmult(out, p2, a, 1)` contract used by the session
/// processor and partial verifier.
pub fn add_scaled(p1: ProjectivePoint, a: &Scalar, p2: &AffinePoint) -> ProjectivePoint {
    p1 + ProjectivePoint::from(*p2) * a
}

pub const CURVE_ORDER_BYTE_LEN: usize = 32;

/// Group order of secp256k1, used only by property tests exercising edge cases.
pub fn curve_order() -> U256 {
    Secp256k1::ORDER
}

/// Constant-time byte equality, used for non-secret-dependent comparisons that should
/// still avoid early-exit timing (e.g. comparing a stored public key against a supplied
/// one).
pub fn bytes_eq_ct(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
