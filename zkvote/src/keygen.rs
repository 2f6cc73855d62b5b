use crate::*;
use curve25519_dalek::constants::{RISTRETTO_BASEPOINT_POINT, RISTRETTO_BASEPOINT_TABLE};
use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::Identity;
use digest::Digest;
use log::debug;
use rand::{CryptoRng, RngCore};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::Sha256;
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroize;

/// The fixed group generator `G` (the Ristretto basepoint).
pub fn generator() -> RistrettoPoint {
    RISTRETTO_BASEPOINT_POINT
}

/// Compute `scalar * G` using the precomputed basepoint table.
pub(crate) fn mul_generator(scalar: &Scalar) -> RistrettoPoint {
    scalar * &RISTRETTO_BASEPOINT_TABLE
}

/// Draw a scalar uniformly from `[1, n-1]`.
///
/// 64 bytes are reduced modulo the group order so the bias is negligible. A failing random source
/// is reported, never papered over.
pub(crate) fn random_nonzero_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Scalar, Error> {
    loop {
        let mut wide = [0u8; 64];
        let filled = rng.try_fill_bytes(&mut wide);
        let scalar = Scalar::from_bytes_mod_order_wide(&wide);
        wide[..].zeroize();
        filled?;

        if scalar != Scalar::zero() {
            return Ok(scalar);
        }
    }
}

/// The authority's secret scalar.
///
/// Zeroized on drop. `Debug` never prints the value.
pub struct SecretKey(Scalar);

impl SecretKey {
    /// Generate a new secret scalar in `[1, n-1]`
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self, Error> {
        Ok(SecretKey(random_nonzero_scalar(rng)?))
    }

    /// Load a secret from its 32 byte little-endian canonical encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != 32 {
            return Err(Error::ScalarBadLength(bytes.len()));
        }
        let mut array = [0u8; 32];
        array.copy_from_slice(bytes);

        let scalar = Scalar::from_canonical_bytes(array).ok_or(Error::InvalidScalar);
        array[..].zeroize();
        let scalar = scalar?;

        if scalar == Scalar::zero() {
            return Err(Error::InvalidScalar);
        }
        Ok(SecretKey(scalar))
    }

    pub fn from_hex(hex: &str) -> Result<Self, Error> {
        let mut bytes = hex::decode(hex.trim()).map_err(Error::ScalarBadHex)?;
        let secret = SecretKey::from_bytes(&bytes);
        bytes.zeroize();
        secret
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0.as_bytes())
    }

    pub(crate) fn as_scalar(&self) -> &Scalar {
        &self.0
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SecretKey(<redacted>)")
    }
}

/// The authority's public point, `secret * G`.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct PublicKey(RistrettoPoint);

impl PublicKey {
    /// Derive a public key from a secret key
    pub fn from_secret(secret: &SecretKey) -> Self {
        PublicKey(mul_generator(secret.as_scalar()))
    }

    pub fn as_point(&self) -> &RistrettoPoint {
        &self.0
    }

    /// Compressed 32 byte encoding
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.compress().to_bytes()
    }

    /// Decode a compressed point, rejecting the identity.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        PublicKey::from_point(decode_point_bytes(bytes)?)
    }

    fn from_point(point: RistrettoPoint) -> Result<Self, Error> {
        if point == RistrettoPoint::identity() {
            return Err(Error::IdentityPublicKey);
        }
        Ok(PublicKey(point))
    }

    /// Short, stable identifier for logs and status output.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(&self.to_bytes());
        hex::encode(&digest[..8])
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", encode_point(&self.0))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PublicKey({})", self)
    }
}

impl FromStr for PublicKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PublicKey::from_point(decode_point(s)?)
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PublicKey::from_str(&s).map_err(de::Error::custom)
    }
}

/// The authority key pair. Created once per authority lifetime.
///
/// Regenerating the pair makes every ciphertext produced under the old public key unrecoverable.
#[derive(Debug)]
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl KeyPair {
    /// Generate a fresh key pair from a cryptographically secure source
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self, Error> {
        let keypair = KeyPair::from_secret(SecretKey::generate(rng)?);
        debug!("zkvote: generated key pair {}", keypair.public.fingerprint());
        Ok(keypair)
    }

    pub fn from_secret(secret: SecretKey) -> Self {
        let public = PublicKey::from_secret(&secret);
        KeyPair { secret, public }
    }

    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }

    pub fn public(&self) -> &PublicKey {
        &self.public
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use crate::tests::BrokenRng;


    #[test]
    fn test_public_matches_secret() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let keypair = KeyPair::generate(&mut rng).unwrap();

        let expected = keypair.secret().as_scalar() * generator();
        assert_eq!(keypair.public().as_point(), &expected);
        assert_ne!(keypair.secret().as_scalar(), &Scalar::zero());
    }

    #[test]
    fn test_distinct_keys() {
        let mut rng = rand::rngs::OsRng;
        let first = KeyPair::generate(&mut rng).unwrap();
        let second = KeyPair::generate(&mut rng).unwrap();
        assert_ne!(first.public(), second.public());
    }

    #[test]
    fn test_randomness_failure() {
        match KeyPair::generate(&mut BrokenRng) {
            Err(Error::RandomnessFailure(_)) => {}
            other => panic!("expected RandomnessFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_secret_hex() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let secret = SecretKey::generate(&mut rng).unwrap();
        let restored = SecretKey::from_hex(&secret.to_hex()).unwrap();
        assert_eq!(secret.to_bytes(), restored.to_bytes());

        assert!(matches!(
            SecretKey::from_hex("zz"),
            Err(Error::ScalarBadHex(_))
        ));
        assert!(matches!(
            SecretKey::from_hex("0102"),
            Err(Error::ScalarBadLength(2))
        ));
        assert!(matches!(
            SecretKey::from_bytes(&[0u8; 32]),
            Err(Error::InvalidScalar)
        ));
        assert!(matches!(
            SecretKey::from_bytes(&[0xffu8; 32]),
            Err(Error::InvalidScalar)
        ));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let keypair = KeyPair::generate(&mut rng).unwrap();
        let debug = format!("{:?}", keypair);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains(&keypair.secret().to_hex()));
    }

    #[test]
    fn test_public_key_string() {
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let keypair = KeyPair::generate(&mut rng).unwrap();
        let public = *keypair.public();

        let parsed: PublicKey = public.to_string().parse().unwrap();
        assert_eq!(parsed, public);

        let json = serde_json::to_string(&public).unwrap();
        assert_eq!(json, format!("\"{}\"", public));
        assert_eq!(public.fingerprint().len(), 16);
    }

    #[test]
    fn test_identity_public_key_rejected() {
        let zeros = "00".repeat(32);
        assert!(matches!(
            zeros.parse::<PublicKey>(),
            Err(Error::IdentityPublicKey)
        ));
        assert!(matches!(
            PublicKey::from_bytes(&[0u8; 32]),
            Err(Error::IdentityPublicKey)
        ));

        let json = format!("\"{}\"", zeros);
        assert!(serde_json::from_str::<PublicKey>(&json).is_err());
    }
}
