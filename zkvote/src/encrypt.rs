use crate::*;
use curve25519_dalek::scalar::Scalar;
use rand::{CryptoRng, RngCore};
use std::fmt;
use std::str::FromStr;

/// Ciphertext construction.
///
/// Both variants open with `C2 - secret * C1`, so tally recovery does not care which one produced
/// a ciphertext, but ciphertexts of the two variants must never be mixed in one aggregate.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Scheme {
    /// Lifted ElGamal: `C1 = r*G`, `C2 = v*G + r*public`. Needs only the public key.
    Lifted,

    /// `C1 = r*public`, `C2 = v*G + secret*C1`. Needs the secret, so it only runs inside the
    /// authority.
    KeyMasked,
}

impl Scheme {
    pub fn name(&self) -> &'static str {
        match self {
            Scheme::Lifted => "lifted",
            Scheme::KeyMasked => "key_masked",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Scheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "lifted" => Ok(Scheme::Lifted),
            "key_masked" => Ok(Scheme::KeyMasked),
            _ => Err(Error::UnknownScheme(s.to_owned())),
        }
    }
}

/// Encrypt a vote under the public key using lifted ElGamal.
///
/// A fresh `r` is drawn on every call; reusing it across two ballots would leak their difference.
pub fn encrypt<R: RngCore + CryptoRng>(
    rng: &mut R,
    vote: PlaintextVote,
    public: &PublicKey,
) -> Result<Ciphertext, Error> {
    let r = random_nonzero_scalar(rng)?;

    let c1 = mul_generator(&r);
    let c2 = mul_generator(&Scalar::from(vote.value())) + r * public.as_point();

    Ok(Ciphertext::new(c1, c2))
}

/// Encrypt a vote with the key-masked construction.
///
/// `C1` is derived from the public key rather than the generator and `C2` is masked with the
/// secret, so this requires the full key pair.
pub fn encrypt_key_masked<R: RngCore + CryptoRng>(
    rng: &mut R,
    vote: PlaintextVote,
    keypair: &KeyPair,
) -> Result<Ciphertext, Error> {
    let r = random_nonzero_scalar(rng)?;

    let c1 = r * keypair.public().as_point();
    let c2 = mul_generator(&Scalar::from(vote.value())) + keypair.secret().as_scalar() * c1;

    Ok(Ciphertext::new(c1, c2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use crate::tests::BrokenRng;

    #[test]
    fn test_lifted_shape() {
        let mut rng = ChaCha20Rng::seed_from_u64(10);
        let keypair = KeyPair::generate(&mut rng).unwrap();

        let ciphertext = encrypt(&mut rng, PlaintextVote::new(3), keypair.public()).unwrap();

        // C2 - x*C1 must leave exactly 3*G
        let opened = ciphertext.c2() - keypair.secret().as_scalar() * ciphertext.c1();
        assert_eq!(opened, Scalar::from(3u64) * generator());
    }

    #[test]
    fn test_key_masked_shape() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let keypair = KeyPair::generate(&mut rng).unwrap();

        let ciphertext = encrypt_key_masked(&mut rng, PlaintextVote::new(2), &keypair).unwrap();

        let opened = ciphertext.c2() - keypair.secret().as_scalar() * ciphertext.c1();
        assert_eq!(opened, Scalar::from(2u64) * generator());
    }

    #[test]
    fn test_fresh_randomness() {
        let mut rng = ChaCha20Rng::seed_from_u64(12);
        let keypair = KeyPair::generate(&mut rng).unwrap();

        let first = encrypt(&mut rng, PlaintextVote::new(1), keypair.public()).unwrap();
        let second = encrypt(&mut rng, PlaintextVote::new(1), keypair.public()).unwrap();
        assert_ne!(first.c1(), second.c1());
        assert_ne!(first.c2(), second.c2());

        let first = encrypt_key_masked(&mut rng, PlaintextVote::new(1), &keypair).unwrap();
        let second = encrypt_key_masked(&mut rng, PlaintextVote::new(1), &keypair).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_randomness_failure() {
        let mut rng = ChaCha20Rng::seed_from_u64(13);
        let keypair = KeyPair::generate(&mut rng).unwrap();

        assert!(matches!(
            encrypt(&mut BrokenRng, PlaintextVote::new(1), keypair.public()),
            Err(Error::RandomnessFailure(_))
        ));
        assert!(matches!(
            encrypt_key_masked(&mut BrokenRng, PlaintextVote::new(1), &keypair),
            Err(Error::RandomnessFailure(_))
        ));
    }

    #[test]
    fn test_scheme_parse() {
        assert_eq!("lifted".parse::<Scheme>().unwrap(), Scheme::Lifted);
        assert_eq!("key-masked".parse::<Scheme>().unwrap(), Scheme::KeyMasked);
        assert_eq!("KEY_MASKED".parse::<Scheme>().unwrap(), Scheme::KeyMasked);
        assert!(matches!(
            "textbook".parse::<Scheme>(),
            Err(Error::UnknownScheme(_))
        ));
        assert_eq!(Scheme::KeyMasked.to_string(), "key_masked");
    }
}
