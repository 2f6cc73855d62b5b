use thiserror::Error;

/// Error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("zkvote: invalid vote {0}: not in the ballot domain")]
    InvalidVote(u64),

    #[error("zkvote: invalid ballot domain: {0}")]
    InvalidBallotDomain(String),

    #[error("zkvote: cannot aggregate an empty set of ciphertexts")]
    EmptyAggregate,

    #[error("zkvote: tally not found within search bound {0}")]
    RecoveryBoundExceeded(u64),

    #[error("zkvote: secure randomness unavailable: {0}")]
    RandomnessFailure(#[from] rand_core::Error),

    #[error("zkvote: invalid point - invalid hexidecimal")]
    PointBadHex(#[source] hex::FromHexError),

    #[error("zkvote: invalid point - expected 32 bytes, got {0}")]
    PointBadLength(usize),

    #[error("zkvote: invalid point - not a valid ristretto encoding")]
    InvalidPoint,

    #[error("zkvote: invalid public key - the identity point hides nothing")]
    IdentityPublicKey,

    #[error("zkvote: invalid scalar - invalid hexidecimal")]
    ScalarBadHex(#[source] hex::FromHexError),

    #[error("zkvote: invalid scalar - expected 32 bytes, got {0}")]
    ScalarBadLength(usize),

    #[error("zkvote: invalid scalar - not canonical or zero")]
    InvalidScalar,

    #[error("zkvote: unknown encryption scheme {0:?}")]
    UnknownScheme(String),
}
