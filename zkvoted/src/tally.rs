use crate::prover::{Prover, ProverError};
use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use zkvote::{combine_parallel, Authority, Ciphertext};

#[derive(Debug, Error)]
pub enum TallyError {
    #[error(transparent)]
    Recovery(zkvote::Error),

    #[error(transparent)]
    Prover(#[from] ProverError),
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TallyResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub total_votes: u64,
    pub ballots: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted_sum: Option<Ciphertext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<String>,
}

/// Combines stored ballots, recovers the total and hands it to the prover.
#[derive(Clone)]
pub struct Tallier {
    authority: Arc<Authority>,
    prover: Option<Arc<dyn Prover>>,
    empty_default: u64,
}

impl Tallier {
    pub fn new(
        authority: Arc<Authority>,
        prover: Option<Arc<dyn Prover>>,
        empty_default: u64,
    ) -> Self {
        Tallier {
            authority,
            prover,
            empty_default,
        }
    }

    /// Blocking: recovery and proving are CPU and process bound.
    pub fn run(&self, ballots: &[Ciphertext]) -> Result<TallyResponse, TallyError> {
        let mut response = match combine_parallel(ballots) {
            Ok(aggregate) => {
                let total = self
                    .authority
                    .recover(&aggregate)
                    .map_err(TallyError::Recovery)?;
                info!("zkvoted: tallied {} ballots, total {}", ballots.len(), total);
                TallyResponse {
                    message: None,
                    total_votes: total,
                    ballots: ballots.len(),
                    encrypted_sum: Some(aggregate),
                    proof: None,
                }
            }
            Err(zkvote::Error::EmptyAggregate) => TallyResponse {
                message: Some("No votes yet".to_owned()),
                total_votes: 0,
                ballots: 0,
                encrypted_sum: None,
                proof: None,
            },
            Err(e) => return Err(TallyError::Recovery(e)),
        };

        if let Some(prover) = &self.prover {
            // The circuit cannot take an empty tally
            let proven_total = match response.encrypted_sum {
                Some(_) => response.total_votes,
                None => self.empty_default,
            };
            let proof = prover.prove(proven_total).map_err(|e| {
                warn!("zkvoted: proof generation failed: {}", e);
                e
            })?;
            response.proof = Some(hex::encode(proof));
        }

        Ok(response)
    }
}
