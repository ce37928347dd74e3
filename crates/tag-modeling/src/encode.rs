//! Payload encoder wrapper. The rest of the workspace sees only
//! [`CodeMatrix`]; the qrcode dependency stays behind this function.

use qrcode::{EcLevel, QrCode};
use sha2::{Digest, Sha256};
use tag_types::CodeMatrix;

use crate::types::EncodeError;

/// Encode a payload string into a code matrix with the given quiet zone.
///
/// Error correction level M, matching the scanners the tags are aimed at.
/// The matrix records the payload only as a SHA-256 digest.
pub fn encode_payload(payload: &str, quiet_zone: u32) -> Result<CodeMatrix, EncodeError> {
    let code = QrCode::with_error_correction_level(payload, EcLevel::M).map_err(|e| {
        EncodeError::EncodingFailed {
            reason: e.to_string(),
        }
    })?;

    let width = code.width();
    let colors = code.to_colors();
    let qz = quiet_zone as usize;
    let side = width + 2 * qz;

    let mut modules = vec![false; side * side];
    for row in 0..width {
        for col in 0..width {
            if colors[row * width + col] == qrcode::Color::Dark {
                modules[(row + qz) * side + (col + qz)] = true;
            }
        }
    }

    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    Ok(CodeMatrix::new(side, quiet_zone, modules, digest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tag_types::ModuleColor;

    #[test]
    fn known_payload_encodes_square_matrix() {
        let m = encode_payload("HELLO-WORLD-1234", 4).unwrap();
        // Version is picked by the encoder; the quiet zone always adds 8.
        assert!(m.side() >= 21 + 8);
        assert_eq!(m.quiet_zone(), 4);
        assert!(m.dark_count() > 0);
    }

    #[test]
    fn quiet_zone_stays_light() {
        let m = encode_payload("DEMO", 4).unwrap();
        let side = m.side();
        for i in 0..side {
            for b in 0..4 {
                assert!(!m.is_dark(b, i));
                assert!(!m.is_dark(side - 1 - b, i));
                assert!(!m.is_dark(i, b));
                assert!(!m.is_dark(i, side - 1 - b));
            }
        }
    }

    #[test]
    fn digest_is_stable_and_payload_free() {
        let a = encode_payload("HELLO-WORLD-1234", 4).unwrap();
        let b = encode_payload("HELLO-WORLD-1234", 4).unwrap();
        assert_eq!(a.payload_digest(), b.payload_digest());
        assert_eq!(a.payload_digest().len(), 64);
        assert!(!a.payload_digest().contains("HELLO"));
    }

    #[test]
    fn counts_partition_modules() {
        let m = encode_payload("DEMO", 2).unwrap();
        let total = m.side() * m.side();
        assert_eq!(
            m.count(ModuleColor::Dark) + m.count(ModuleColor::Light),
            total
        );
    }
}
