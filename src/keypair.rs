//! Signer keypairs.
//!
//! Key generation and storage are outside the session engine's scope; this is the
//! minimal holder the Nonce Generator and Partial Signer need to read a signer's
//! secret scalar and public point.

use k256::elliptic_curve::Field;
use k256::{AffinePoint, Scalar};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};
use crate::field::{mul_gen, point_to_bytes_compressed, scalar_from_bytes_strict};

#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Keypair {
    sk: Scalar,
    #[zeroize(skip)]
    pk: AffinePoint,
}

impl Keypair {
    pub fn from_bytes(sk: &[u8; 32]) -> Result<Self> {
        let sk = scalar_from_bytes_strict(sk).map_err(|_| Error::InvalidScalar)?;
        if bool::from(sk.is_zero()) {
            return Err(Error::InvalidScalar);
        }
        let pk = mul_gen(&sk).to_affine();
        Ok(Self { sk, pk })
    }

    pub fn secret_scalar(&self) -> Scalar {
        self.sk
    }

    pub fn public_point(&self) -> AffinePoint {
        self.pk
    }

    pub fn public_key_compressed(&self) -> [u8; 33] {
        point_to_bytes_compressed(&self.pk)
    }
}
