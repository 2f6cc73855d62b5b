use crate::*;
use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::traits::Identity;
use log::debug;
use std::fmt;
use std::str::FromStr;

/// Upper bound on the tally the recovery search will try.
///
/// Size it to the largest sum the election can produce (see `BallotDomain::max_tally`). It also
/// caps how long a recovery can run.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(transparent)]
pub struct TallyBound(u64);

impl TallyBound {
    pub fn new(max: u64) -> Self {
        TallyBound(max)
    }

    pub fn max(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TallyBound {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TallyBound {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TallyBound(s.trim().parse()?))
    }
}

/// Remove the key mask from an aggregate: `C2 - secret * C1`.
///
/// For well-formed input this is `total * G`.
fn unmask(aggregate: &Ciphertext, secret: &SecretKey) -> RistrettoPoint {
    let mask = secret.as_scalar() * aggregate.c1();
    aggregate.c2() - mask
}

/// Find `k` in `[0, max]` with `k * G == target` by walking `0*G, 1*G, 2*G, ...`
fn bounded_log(target: &RistrettoPoint, max: u64) -> Option<u64> {
    let g = generator();
    let mut candidate = RistrettoPoint::identity();
    let mut count: u64 = 0;

    loop {
        if &candidate == target {
            return Some(count);
        }
        if count == max {
            return None;
        }
        candidate += g;
        count += 1;
    }
}

/// Recover the integer sum hidden in an aggregate ciphertext.
///
/// Succeeds only if the sum is at most `bound`. A sum outside the bound and an aggregate opened
/// with the wrong secret are indistinguishable and both yield `Error::RecoveryBoundExceeded`.
pub fn recover(aggregate: &Ciphertext, secret: &SecretKey, bound: TallyBound) -> Result<u64, Error> {
    let value = unmask(aggregate, secret);

    match bounded_log(&value, bound.max()) {
        Some(total) => {
            debug!("zkvote: recovered tally {}", total);
            Ok(total)
        }
        None => {
            debug!("zkvote: no tally found in [0, {}]", bound);
            Err(Error::RecoveryBoundExceeded(bound.max()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curve25519_dalek::scalar::Scalar;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_bounded_log() {
        let g = generator();
        assert_eq!(bounded_log(&RistrettoPoint::identity(), 0), Some(0));
        assert_eq!(bounded_log(&g, 0), None);
        assert_eq!(bounded_log(&g, 1), Some(1));
        assert_eq!(bounded_log(&(Scalar::from(57u64) * g), 57), Some(57));
        assert_eq!(bounded_log(&(Scalar::from(58u64) * g), 57), None);
    }

    #[test]
    fn test_zero_tally_is_success() {
        let mut rng = ChaCha20Rng::seed_from_u64(30);
        let keypair = KeyPair::generate(&mut rng).unwrap();

        let zero = encrypt(&mut rng, PlaintextVote::new(0), keypair.public()).unwrap();
        assert_eq!(recover(&zero, keypair.secret(), TallyBound::new(10)).unwrap(), 0);
        assert_eq!(recover(&zero, keypair.secret(), TallyBound::new(0)).unwrap(), 0);
    }

    #[test]
    fn test_bound_exceeded() {
        let mut rng = ChaCha20Rng::seed_from_u64(31);
        let keypair = KeyPair::generate(&mut rng).unwrap();

        let ciphertexts: Vec<Ciphertext> = [4, 4, 4]
            .iter()
            .map(|v| encrypt(&mut rng, PlaintextVote::new(*v), keypair.public()).unwrap())
            .collect();
        let aggregate = combine(&ciphertexts).unwrap();

        assert_eq!(recover(&aggregate, keypair.secret(), TallyBound::new(12)).unwrap(), 12);
        assert!(matches!(
            recover(&aggregate, keypair.secret(), TallyBound::new(11)),
            Err(Error::RecoveryBoundExceeded(11))
        ));
    }

    #[test]
    fn test_wrong_secret() {
        let mut rng = ChaCha20Rng::seed_from_u64(32);
        let keypair = KeyPair::generate(&mut rng).unwrap();
        let other = KeyPair::generate(&mut rng).unwrap();

        let ciphertext = encrypt(&mut rng, PlaintextVote::new(2), keypair.public()).unwrap();
        assert!(matches!(
            recover(&ciphertext, other.secret(), TallyBound::new(1000)),
            Err(Error::RecoveryBoundExceeded(1000))
        ));
    }

    #[test]
    fn test_bound_parse() {
        let bound: TallyBound = " 1000 ".parse().unwrap();
        assert_eq!(bound.max(), 1000);
        assert!("-1".parse::<TallyBound>().is_err());
        assert_eq!(serde_json::to_string(&bound).unwrap(), "1000");
    }
}
