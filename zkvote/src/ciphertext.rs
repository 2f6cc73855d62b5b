use crate::*;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::traits::Identity;
use std::convert::TryFrom;
use std::ops::Add;

/// Length in bytes of a compressed Ristretto point.
pub const POINT_LENGTH: usize = 32;

/// Encode a point as lowercase hex of its compressed form.
pub fn encode_point(point: &RistrettoPoint) -> String {
    hex::encode(point.compress().as_bytes())
}

/// Decode a point from the hex produced by `encode_point`.
pub fn decode_point(hex: &str) -> Result<RistrettoPoint, Error> {
    let bytes = hex::decode(hex.trim()).map_err(Error::PointBadHex)?;
    decode_point_bytes(&bytes)
}

pub fn decode_point_bytes(bytes: &[u8]) -> Result<RistrettoPoint, Error> {
    if bytes.len() != POINT_LENGTH {
        return Err(Error::PointBadLength(bytes.len()));
    }
    let mut array = [0u8; POINT_LENGTH];
    array.copy_from_slice(bytes);

    CompressedRistretto(array)
        .decompress()
        .ok_or(Error::InvalidPoint)
}

/// An encrypted ballot, or the homomorphic sum of several.
///
/// Carries no plaintext and no reference to the key that produced it. On the wire it is a pair of
/// hex encoded points: `{"C1": "...", "C2": "..."}`.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "EncodedCiphertext", into = "EncodedCiphertext")]
pub struct Ciphertext {
    c1: RistrettoPoint,
    c2: RistrettoPoint,
}

impl Ciphertext {
    pub fn new(c1: RistrettoPoint, c2: RistrettoPoint) -> Self {
        Ciphertext { c1, c2 }
    }

    /// The pair `(identity, identity)`. Only used as a fold accumulator.
    pub(crate) fn identity() -> Self {
        Ciphertext {
            c1: RistrettoPoint::identity(),
            c2: RistrettoPoint::identity(),
        }
    }

    pub fn c1(&self) -> &RistrettoPoint {
        &self.c1
    }

    pub fn c2(&self) -> &RistrettoPoint {
        &self.c2
    }

    /// Decode a ciphertext from its two hex encoded points
    pub fn from_hex(c1: &str, c2: &str) -> Result<Self, Error> {
        Ok(Ciphertext {
            c1: decode_point(c1)?,
            c2: decode_point(c2)?,
        })
    }

    /// The two hex encoded points, `(C1, C2)`
    pub fn to_hex(&self) -> (String, String) {
        (encode_point(&self.c1), encode_point(&self.c2))
    }
}

impl Add for Ciphertext {
    type Output = Ciphertext;

    fn add(self, other: Ciphertext) -> Ciphertext {
        Ciphertext {
            c1: self.c1 + other.c1,
            c2: self.c2 + other.c2,
        }
    }
}

impl<'a> Add<&'a Ciphertext> for Ciphertext {
    type Output = Ciphertext;

    fn add(self, other: &'a Ciphertext) -> Ciphertext {
        Ciphertext {
            c1: self.c1 + other.c1,
            c2: self.c2 + other.c2,
        }
    }
}

/// Wire form of a `Ciphertext`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EncodedCiphertext {
    #[serde(rename = "C1")]
    pub c1: String,

    #[serde(rename = "C2")]
    pub c2: String,
}

impl From<Ciphertext> for EncodedCiphertext {
    fn from(ciphertext: Ciphertext) -> Self {
        let (c1, c2) = ciphertext.to_hex();
        EncodedCiphertext { c1, c2 }
    }
}

impl TryFrom<EncodedCiphertext> for Ciphertext {
    type Error = Error;

    fn try_from(encoded: EncodedCiphertext) -> Result<Self, Self::Error> {
        Ciphertext::from_hex(&encoded.c1, &encoded.c2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curve25519_dalek::scalar::Scalar;

    fn sample() -> Ciphertext {
        Ciphertext::new(
            Scalar::from(3u64) * generator(),
            Scalar::from(11u64) * generator(),
        )
    }

    #[test]
    fn test_hex_encoding() {
        let ciphertext = sample();
        let (c1, c2) = ciphertext.to_hex();
        assert_eq!(c1.len(), 64);
        assert_eq!(c2.len(), 64);

        let decoded = Ciphertext::from_hex(&c1, &c2).unwrap();
        assert_eq!(decoded, ciphertext);
    }

    #[test]
    fn test_json_wire_format() {
        let ciphertext = sample();
        let (c1, c2) = ciphertext.to_hex();

        let json = serde_json::to_value(&ciphertext).unwrap();
        assert_eq!(json, serde_json::json!({ "C1": c1, "C2": c2 }));

        let parsed: Ciphertext = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, ciphertext);
    }

    #[test]
    fn test_rejects_malformed_points() {
        let (c1, _) = sample().to_hex();

        assert!(matches!(
            Ciphertext::from_hex(&c1, "not hex"),
            Err(Error::PointBadHex(_))
        ));
        assert!(matches!(
            Ciphertext::from_hex(&c1, "00ff"),
            Err(Error::PointBadLength(2))
        ));
        // 0xff.. is not a canonical field element, so never a valid encoding
        let bad = "ff".repeat(32);
        assert!(matches!(
            Ciphertext::from_hex(&c1, &bad),
            Err(Error::InvalidPoint)
        ));

        let json = serde_json::json!({ "C1": c1, "C2": "00ff" });
        assert!(serde_json::from_value::<Ciphertext>(json).is_err());
    }

    #[test]
    fn test_add_is_pointwise() {
        let a = sample();
        let b = Ciphertext::new(generator(), generator());
        let sum = a + b;

        assert_eq!(sum.c1(), &(Scalar::from(4u64) * generator()));
        assert_eq!(sum.c2(), &(Scalar::from(12u64) * generator()));
        assert_eq!(Ciphertext::identity() + &a, a);
    }
}
