use crate::*;

/// An append-only ballot store.
///
/// Stored ciphertexts are never modified; tallying reads the full sequence.
pub trait BallotStore {
    /// Record one encrypted ballot
    fn append(&mut self, ciphertext: Ciphertext);

    /// Every stored ballot, in insertion order
    fn list_all(&self) -> Vec<Ciphertext>;

    fn len(&self) -> usize {
        self.list_all().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Homomorphic sum of everything stored
    fn aggregate(&self) -> Result<Ciphertext, Error> {
        combine_parallel(&self.list_all())
    }
}

/// A simple store that keeps ballots in a Vec
#[derive(Default, Clone, Debug)]
pub struct MemStore {
    inner: Vec<Ciphertext>,
}

impl MemStore {
    pub fn iter(&self) -> impl Iterator<Item = &Ciphertext> {
        self.inner.iter()
    }
}

impl BallotStore for MemStore {
    fn append(&mut self, ciphertext: Ciphertext) {
        self.inner.push(ciphertext);
    }

    fn list_all(&self) -> Vec<Ciphertext> {
        self.inner.clone()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn aggregate(&self) -> Result<Ciphertext, Error> {
        combine_parallel(&self.inner)
    }
}

impl From<Vec<Ciphertext>> for MemStore {
    fn from(item: Vec<Ciphertext>) -> Self {
        MemStore { inner: item }
    }
}

impl Extend<Ciphertext> for MemStore {
    fn extend<T: IntoIterator<Item = Ciphertext>>(&mut self, iter: T) {
        self.inner.extend(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_memstore() {
        let mut rng = ChaCha20Rng::seed_from_u64(50);
        let keypair = KeyPair::generate(&mut rng).unwrap();

        let mut store = MemStore::default();
        assert!(store.is_empty());
        assert!(matches!(store.aggregate(), Err(Error::EmptyAggregate)));

        let first = encrypt(&mut rng, PlaintextVote::new(3), keypair.public()).unwrap();
        let second = encrypt(&mut rng, PlaintextVote::new(4), keypair.public()).unwrap();
        store.append(first);
        store.append(second);

        assert_eq!(store.len(), 2);
        assert_eq!(store.list_all(), vec![first, second]);

        let aggregate = store.aggregate().unwrap();
        assert_eq!(aggregate, first + second);
        assert_eq!(
            recover(&aggregate, keypair.secret(), TallyBound::new(10)).unwrap(),
            7
        );
    }
}
