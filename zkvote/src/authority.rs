use crate::*;
use log::info;
use rand::{CryptoRng, RngCore};
use std::borrow::Borrow;

/// The tallying authority.
///
/// Owns the key pair for its whole lifetime, together with the encryption scheme and the recovery
/// bound. Read-only after construction, so one instance can be shared between request handlers
/// without locking. The secret never leaves this value except through `keypair()`.
#[derive(Debug)]
pub struct Authority {
    keypair: KeyPair,
    scheme: Scheme,
    bound: TallyBound,
}

impl Authority {
    /// Create an authority with a freshly generated key pair
    pub fn generate<R: RngCore + CryptoRng>(
        rng: &mut R,
        scheme: Scheme,
        bound: TallyBound,
    ) -> Result<Self, Error> {
        let keypair = KeyPair::generate(rng)?;
        Ok(Authority::new(keypair, scheme, bound))
    }

    pub fn new(keypair: KeyPair, scheme: Scheme, bound: TallyBound) -> Self {
        info!(
            "zkvote: authority {} ready (scheme {}, tally bound {})",
            keypair.public().fingerprint(),
            scheme,
            bound
        );
        Authority {
            keypair,
            scheme,
            bound,
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        self.keypair.public()
    }

    pub fn keypair(&self) -> &KeyPair {
        &self.keypair
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn bound(&self) -> TallyBound {
        self.bound
    }

    /// Encrypt one validated vote under this authority's key and scheme
    pub fn encrypt<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        vote: PlaintextVote,
    ) -> Result<Ciphertext, Error> {
        match self.scheme {
            Scheme::Lifted => encrypt(rng, vote, self.keypair.public()),
            Scheme::KeyMasked => encrypt_key_masked(rng, vote, &self.keypair),
        }
    }

    /// Recover the sum of an aggregate with the owned secret and bound
    pub fn recover(&self, aggregate: &Ciphertext) -> Result<u64, Error> {
        recover(aggregate, self.keypair.secret(), self.bound)
    }

    /// Combine then recover.
    ///
    /// An empty input yields `Error::EmptyAggregate`. Substituting a default tally for that case is
    /// the caller's decision.
    pub fn tally<I>(&self, ciphertexts: I) -> Result<u64, Error>
    where
        I: IntoIterator,
        I::Item: Borrow<Ciphertext>,
    {
        let aggregate = combine(ciphertexts)?;
        self.recover(&aggregate)
    }
}
