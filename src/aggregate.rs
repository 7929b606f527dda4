//! Final Aggregator.

use tracing::instrument;

use crate::error::{Error, Result};
use crate::field::scalar_to_bytes;
use crate::objects::{PartialSignature, Session};

/// Sums all partial signatures with the session's tweak contribution and emits a
/// 64-byte BIP-340-compatible signature `Rx || s_total`. No verification of the
/// partials is performed; callers that want that guarantee call
/// [`crate::verify::partial_sig_verify`] first.
#[instrument(skip(partials, session), fields(n = partials.len()))]
pub fn aggregate(session: &Session, partials: &[PartialSignature]) -> Result<[u8; 64]> {
    if partials.is_empty() {
        return Err(Error::EmptySignerList);
    }

    let mut s_total = session.s_tweak;
    for partial in partials {
        s_total += partial.s;
    }

    let mut out = [0u8; 64];
    out[..32].copy_from_slice(&session.r_x);
    out[32..].copy_from_slice(&scalar_to_bytes(&s_total));
    Ok(out)
}
