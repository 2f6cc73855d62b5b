//! Additively homomorphic ballot encryption over Ristretto255.
//!
//! Ballots are encrypted as a pair of group points, summed pointwise without decryption, and only
//! the aggregate is ever opened. Opening yields `total * G`; the integer `total` is found by a
//! bounded walk over `0*G, 1*G, 2*G, ...`, so it is only practical for small sums such as a vote
//! count.

#[macro_use]
extern crate serde;

mod aggregate;
mod authority;
mod ballot;
mod ciphertext;
mod encrypt;
mod error;
mod keygen;
mod store;
mod tally;

pub use aggregate::*;
pub use authority::*;
pub use ballot::*;
pub use ciphertext::*;
pub use encrypt::*;
pub use error::*;
pub use keygen::*;
pub use store::*;
pub use tally::*;
