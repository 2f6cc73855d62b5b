use serde::Deserialize;
use std::path::{Path, PathBuf};
use zkvote::*;

#[derive(Debug, thiserror::Error)]
pub enum BallotFileError {
    #[error("unable to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Ballots as written by `zkvote encrypt` collections or returned by `zkvote votes`
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum BallotFile {
    List(Vec<Ciphertext>),
    Votes { votes: Vec<Ciphertext> },
}

impl BallotFile {
    pub fn into_ballots(self) -> Vec<Ciphertext> {
        match self {
            BallotFile::List(ballots) => ballots,
            BallotFile::Votes { votes } => votes,
        }
    }
}

/// Read a ballot file in either of the `BallotFile` forms
pub fn load_ballots(path: &Path) -> Result<Vec<Ciphertext>, BallotFileError> {
    let file_bytes = std::fs::read(path).map_err(|source| BallotFileError::Io {
        path: path.to_owned(),
        source,
    })?;

    let file = serde_json::from_slice::<BallotFile>(&file_bytes).map_err(|source| {
        BallotFileError::Parse {
            path: path.to_owned(),
            source,
        }
    })?;
    log::debug!("zkvote tally: read ballots from {}", path.display());

    Ok(file.into_ballots())
}

pub fn command_tally(matches: &clap::ArgMatches) {
    let filename = crate::expand(matches.value_of("INPUT").unwrap_or_default());

    let ballots = load_ballots(Path::new(&filename)).unwrap_or_else(|e| {
        eprintln!("zkvote tally: {}", e);
        std::process::exit(1);
    });

    let secret = crate::expand(matches.value_of("secret").unwrap_or_default());
    let secret = SecretKey::from_hex(secret.trim()).unwrap_or_else(|e| {
        eprintln!("zkvote tally: invalid secret key: {}", e);
        std::process::exit(1);
    });

    let domain = crate::ballot_domain(matches, "tally");
    let bound = crate::tally_bound(matches, &domain, ballots.len(), "tally");

    let aggregate = match combine_parallel(&ballots) {
        Ok(aggregate) => aggregate,
        Err(Error::EmptyAggregate) => {
            eprintln!("zkvote tally: {} contains no ballots", filename);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("zkvote tally: {}", e);
            std::process::exit(1);
        }
    };

    match recover(&aggregate, &secret, bound) {
        Ok(total) => {
            println!("ballots: {}", ballots.len());
            println!("total: {}", total);
        }
        Err(e) => {
            eprintln!("zkvote tally: {}", e);
            std::process::exit(1);
        }
    }
}
