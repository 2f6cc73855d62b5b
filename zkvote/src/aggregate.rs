use crate::*;
use log::trace;
use rayon::prelude::*;
use std::borrow::Borrow;

/// Below this many ciphertexts `combine_parallel` folds on the calling thread.
const PARALLEL_THRESHOLD: usize = 1024;

/// Homomorphically add ciphertexts: `(Σ C1, Σ C2)`.
///
/// The result opens to the sum of the constituent votes. Order does not matter. An empty input has
/// no sum and yields `Error::EmptyAggregate` rather than an identity pair that would read as a
/// valid zero tally.
pub fn combine<I>(ciphertexts: I) -> Result<Ciphertext, Error>
where
    I: IntoIterator,
    I::Item: Borrow<Ciphertext>,
{
    let mut count: usize = 0;
    let sum = ciphertexts
        .into_iter()
        .fold(Ciphertext::identity(), |acc, ciphertext| {
            count += 1;
            acc + ciphertext.borrow()
        });

    if count == 0 {
        return Err(Error::EmptyAggregate);
    }

    trace!("zkvote: combined {} ciphertexts", count);
    Ok(sum)
}

/// Same result as `combine`, with partial sums computed on the rayon pool and merged.
pub fn combine_parallel(ciphertexts: &[Ciphertext]) -> Result<Ciphertext, Error> {
    if ciphertexts.len() < PARALLEL_THRESHOLD {
        return combine(ciphertexts);
    }

    let sum = ciphertexts
        .par_iter()
        .fold(Ciphertext::identity, |acc, ciphertext| acc + ciphertext)
        .reduce(Ciphertext::identity, |a, b| a + b);

    trace!("zkvote: combined {} ciphertexts in parallel", ciphertexts.len());
    Ok(sum)
}
