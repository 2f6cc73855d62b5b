use std::env::var;
use std::path::PathBuf;
use thiserror::Error;
use zkvote::{BallotDomain, Scheme, TallyBound};

/// Largest tally searched for when `ZKVOTE_MAX_TALLY` is not set.
pub const DEFAULT_MAX_TALLY: u64 = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Settings for driving the external nargo / bb toolchain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProverConfig {
    /// Directory holding the noir project (`Nargo.toml`, `Prover.toml`, `target/`)
    pub circuits_dir: PathBuf,

    /// Name of the compiled circuit, i.e. `target/<name>.json`
    pub circuit_name: String,

    /// Value written as the circuit's `vote` input
    pub witness_vote: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub tally_bound: TallyBound,
    pub scheme: Scheme,
    pub ballot_domain: BallotDomain,

    /// Total handed to the prover when there are no ballots at all
    pub empty_tally_default: u64,

    /// `None` disables proof generation
    pub prover: Option<ProverConfig>,
}

impl Config {
    pub fn from_env() -> Self {
        match Config::from_lookup(|name| var(name).ok()) {
            Ok(config) => config,
            Err(e) => panic!("zkvoted: configuration error: {}", e),
        }
    }

    /// Build the configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = match lookup("ZKVOTE_DB_PATH") {
            Some(val) => val,
            None => "./votes.db".to_owned(),
        };

        let tally_bound = match lookup("ZKVOTE_MAX_TALLY") {
            Some(val) => val.parse::<TallyBound>().map_err(|e| ConfigError::Invalid {
                name: "ZKVOTE_MAX_TALLY",
                reason: format!("{}", e),
            })?,
            None => TallyBound::new(DEFAULT_MAX_TALLY),
        };

        let scheme = match lookup("ZKVOTE_SCHEME") {
            Some(val) => val.parse::<Scheme>().map_err(|e| ConfigError::Invalid {
                name: "ZKVOTE_SCHEME",
                reason: format!("{}", e),
            })?,
            None => Scheme::Lifted,
        };

        let ballot_domain = match lookup("ZKVOTE_BALLOT_CHOICES") {
            Some(val) => val.parse::<BallotDomain>().map_err(|e| ConfigError::Invalid {
                name: "ZKVOTE_BALLOT_CHOICES",
                reason: format!("{}", e),
            })?,
            None => BallotDomain::default(),
        };

        let empty_tally_default = match lookup("ZKVOTE_EMPTY_TALLY_DEFAULT") {
            Some(val) => val.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                name: "ZKVOTE_EMPTY_TALLY_DEFAULT",
                reason: format!("{}", e),
            })?,
            None => 1,
        };

        let prover = match lookup("ZKVOTE_CIRCUITS_DIR") {
            Some(dir) => {
                let circuit_name = match lookup("ZKVOTE_CIRCUIT_NAME") {
                    Some(val) => val,
                    None => "zkvote".to_owned(),
                };
                let witness_vote = match lookup("ZKVOTE_PROVER_VOTE") {
                    Some(val) => val.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                        name: "ZKVOTE_PROVER_VOTE",
                        reason: format!("{}", e),
                    })?,
                    None => 2,
                };
                Some(ProverConfig {
                    circuits_dir: PathBuf::from(dir),
                    circuit_name,
                    witness_vote,
                })
            }
            None => None,
        };

        Ok(Config {
            db_path,
            tally_bound,
            scheme,
            ballot_domain,
            empty_tally_default,
            prover,
        })
    }
}
