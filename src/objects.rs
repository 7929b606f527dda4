//! Opaque session objects.
//!
//! Each kind is a small value type carrying its own fixed 4-byte tag. Tags are the
//! sole form of object-kind type safety at the wire boundary; once parsed, every
//! object exposes its fields as real scalars and points rather than raw bytes.

use k256::{AffinePoint, Scalar};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};
use crate::field::{
    point_from_bytes64, point_from_bytes_compressed, point_from_bytes_ext, point_to_bytes64,
    point_to_bytes_compressed, point_to_bytes_ext, scalar_from_bytes_reduce,
    scalar_from_bytes_strict, scalar_is_zero, scalar_to_bytes,
};

pub const TAG_SECRET_NONCE: [u8; 4] = [0x22, 0x0E, 0xDC, 0xF1];
pub const TAG_PUBLIC_NONCE: [u8; 4] = [0xF5, 0x7A, 0x3D, 0xA0];
pub const TAG_AGGREGATE_NONCE: [u8; 4] = [0xA8, 0xB7, 0xE4, 0x67];
pub const TAG_SESSION: [u8; 4] = [0x9D, 0xED, 0xE9, 0x17];
pub const TAG_PARTIAL_SIG: [u8; 4] = [0xEB, 0xFB, 0x1A, 0x32];

fn check_tag(buf: &[u8], expected: &[u8; 4]) -> Result<()> {
    if buf.len() < 4 || &buf[..4] != expected {
        return Err(Error::InvalidTag);
    }
    Ok(())
}

/// A signer's two secret nonce scalars plus its own public key, as produced by the
/// Nonce Generator. Single-use: [`crate::sign::partial_sign`] zeroizes this in place as
/// its first step, so a second signing attempt on the same value always fails the
/// validity check below.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretNonce {
    pub(crate) k: [Scalar; 2],
    #[zeroize(skip)]
    pub(crate) pk: AffinePoint,
}

impl SecretNonce {
    pub(crate) fn new(k0: Scalar, k1: Scalar, pk: AffinePoint) -> Self {
        Self { k: [k0, k1], pk }
    }

    /// Internal-layout tagged buffer: `tag(4) || k0(32) || k1(32) || enc64(pk)`.
    pub fn to_bytes(&self) -> [u8; 132] {
        let mut out = [0u8; 132];
        out[..4].copy_from_slice(&TAG_SECRET_NONCE);
        out[4..36].copy_from_slice(&scalar_to_bytes(&self.k[0]));
        out[36..68].copy_from_slice(&scalar_to_bytes(&self.k[1]));
        out[68..].copy_from_slice(&point_to_bytes64(&self.pk));
        out
    }

    pub fn parse(buf: &[u8; 132]) -> Result<Self> {
        check_tag(buf, &TAG_SECRET_NONCE)?;
        let k0 = scalar_from_bytes_reduce(buf[4..36].try_into().unwrap());
        let k1 = scalar_from_bytes_reduce(buf[36..68].try_into().unwrap());
        let pk_bytes: [u8; 64] = buf[68..].try_into().unwrap();
        let pk = point_from_bytes64(&pk_bytes)?;
        if scalar_is_zero(&k0) && scalar_is_zero(&k1) {
            return Err(Error::InvalidScalar);
        }
        Ok(Self::new(k0, k1, pk))
    }

    /// Overwrites the scalar material with zeros in place, as mandated on every exit
    /// path out of partial signing.
    pub(crate) fn invalidate(&mut self) {
        self.zeroize();
    }
}

/// A signer's two public nonce points, always non-infinity.
#[derive(Clone, Copy, Debug)]
pub struct PublicNonce {
    pub(crate) r: [AffinePoint; 2],
}

impl PublicNonce {
    pub(crate) fn new(r0: AffinePoint, r1: AffinePoint) -> Self {
        Self { r: [r0, r1] }
    }

    /// 66-byte wire form: two standard compressed points.
    pub fn to_bytes(&self) -> [u8; 66] {
        let mut out = [0u8; 66];
        out[..33].copy_from_slice(&point_to_bytes_compressed(&self.r[0]));
        out[33..].copy_from_slice(&point_to_bytes_compressed(&self.r[1]));
        out
    }

    pub fn parse(buf: &[u8; 66]) -> Result<Self> {
        let r0 = point_from_bytes_compressed(buf[..33].try_into().unwrap())?;
        let r1 = point_from_bytes_compressed(buf[33..].try_into().unwrap())?;
        Ok(Self::new(r0, r1))
    }
}

/// The summed public nonce across all signers; either component may be infinity.
#[derive(Clone, Copy, Debug)]
pub struct AggregateNonce {
    pub(crate) s: [AffinePoint; 2],
}

impl AggregateNonce {
    pub(crate) fn new(s0: AffinePoint, s1: AffinePoint) -> Self {
        Self { s: [s0, s1] }
    }

    /// 66-byte wire form: two extended-compressed points (33 zero bytes = infinity).
    pub fn to_bytes(&self) -> [u8; 66] {
        let mut out = [0u8; 66];
        out[..33].copy_from_slice(&point_to_bytes_ext(&self.s[0]));
        out[33..].copy_from_slice(&point_to_bytes_ext(&self.s[1]));
        out
    }

    pub fn parse(buf: &[u8; 66]) -> Result<Self> {
        let s0 = point_from_bytes_ext(buf[..33].try_into().unwrap())?;
        let s1 = point_from_bytes_ext(buf[33..].try_into().unwrap())?;
        Ok(Self::new(s0, s1))
    }
}

/// The immutable, signer-independent output of the Session Processor.
#[derive(Clone, Copy, Debug)]
pub struct Session {
    pub(crate) parity_fin: bool,
    pub(crate) r_x: [u8; 32],
    pub(crate) b: Scalar,
    pub(crate) e: Scalar,
    pub(crate) s_tweak: Scalar,
}

impl Session {
    pub fn r_x(&self) -> [u8; 32] {
        self.r_x
    }

    pub fn parity_fin(&self) -> bool {
        self.parity_fin
    }

    /// Internal-layout tagged buffer: `tag(4) || parity(1) || Rx(32) || b(32) || e(32) || s_tweak(32)`.
    pub fn to_bytes(&self) -> [u8; 133] {
        let mut out = [0u8; 133];
        out[..4].copy_from_slice(&TAG_SESSION);
        out[4] = self.parity_fin as u8;
        out[5..37].copy_from_slice(&self.r_x);
        out[37..69].copy_from_slice(&scalar_to_bytes(&self.b));
        out[69..101].copy_from_slice(&scalar_to_bytes(&self.e));
        out[101..].copy_from_slice(&scalar_to_bytes(&self.s_tweak));
        out
    }

    pub fn parse(buf: &[u8; 133]) -> Result<Self> {
        check_tag(buf, &TAG_SESSION)?;
        let parity_fin = match buf[4] {
            0 => false,
            1 => true,
            _ => return Err(Error::InvalidTag),
        };
        let r_x: [u8; 32] = buf[5..37].try_into().unwrap();
        let b = scalar_from_bytes_strict(&buf[37..69].try_into().unwrap())?;
        let e = scalar_from_bytes_strict(&buf[69..101].try_into().unwrap())?;
        let s_tweak = scalar_from_bytes_strict(&buf[101..].try_into().unwrap())?;
        Ok(Self {
            parity_fin,
            r_x,
            b,
            e,
            s_tweak,
        })
    }
}

/// One signer's contribution to the final signature.
#[derive(Clone, Copy, Debug)]
pub struct PartialSignature {
    pub(crate) s: Scalar,
}

impl PartialSignature {
    pub(crate) fn new(s: Scalar) -> Self {
        Self { s }
    }

    /// 32-byte wire form: big-endian scalar, rejecting non-reduced values.
    pub fn to_bytes(&self) -> [u8; 32] {
        scalar_to_bytes(&self.s)
    }

    pub fn parse(buf: &[u8; 32]) -> Result<Self> {
        let s = scalar_from_bytes_strict(buf)?;
        Ok(Self::new(s))
    }
}

/// Hex-string (de)serialization for the wire objects, mirroring each type's own
/// `to_bytes`/`parse` pair rather than deriving field-by-field.
#[cfg(feature = "serde")]
mod hex_wire {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{AggregateNonce, PartialSignature, PublicNonce, Session};

    macro_rules! impl_hex_wire {
        ($ty:ty, $len:literal) => {
            impl Serialize for $ty {
                fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: Serializer,
                {
                    serializer.serialize_str(&hex::encode(self.to_bytes()))
                }
            }

            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
                where
                    D: Deserializer<'de>,
                {
                    let s = String::deserialize(deserializer)?;
                    let mut bytes = [0u8; $len];
                    hex::decode_to_slice(&s, &mut bytes).map_err(serde::de::Error::custom)?;
                    Self::parse(&bytes).map_err(serde::de::Error::custom)
                }
            }
        };
    }

    impl_hex_wire!(PublicNonce, 66);
    impl_hex_wire!(AggregateNonce, 66);
    impl_hex_wire!(Session, 133);
    impl_hex_wire!(PartialSignature, 32);
}
