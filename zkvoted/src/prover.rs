use crate::config::ProverConfig;
use log::{info, warn};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProverError {
    #[error("prover: unable to write {}: {}", .path.display(), .source)]
    WriteInputs {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("prover: cannot encode prover inputs: {0}")]
    EncodeInputs(#[from] toml::ser::Error),

    #[error("prover: unable to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("prover: {command} failed ({status})")]
    CommandFailed { command: String, status: ExitStatus },

    #[error("prover: unable to read proof {}: {}", .path.display(), .source)]
    ReadProof {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("prover: another proof run panicked")]
    Poisoned,
}

/// Attests a final tally with an external proving system.
///
/// Only the integer is handed over; the returned artifact is opaque.
pub trait Prover: Send + Sync {
    fn prove(&self, total_votes: u64) -> Result<Vec<u8>, ProverError>;
}

/// Inputs of the noir circuit, written as `Prover.toml`.
///
/// Every value is a quoted string, as nargo expects for field inputs.
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct ProverInputs {
    pub vote: String,
    pub encrypted_sum: String,
    pub total_votes: String,
}

impl ProverInputs {
    pub fn new(witness_vote: u64, total_votes: u64) -> Self {
        ProverInputs {
            vote: witness_vote.to_string(),
            encrypted_sum: total_votes.to_string(),
            total_votes: total_votes.to_string(),
        }
    }

    pub fn write(&self, circuits_dir: &Path) -> Result<PathBuf, ProverError> {
        let path = circuits_dir.join("Prover.toml");
        let content = toml::to_string(self)?;
        fs::write(&path, content).map_err(|source| ProverError::WriteInputs {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Drives `nargo` and `bb` in a circuits directory.
///
/// Runs are serialized since every run rewrites `Prover.toml` and `target/`.
pub struct NargoProver {
    config: ProverConfig,
    running: Mutex<()>,
}

impl NargoProver {
    pub fn new(config: ProverConfig) -> Self {
        NargoProver {
            config,
            running: Mutex::new(()),
        }
    }

    fn target(&self, file: &str) -> String {
        format!("target/{}", file)
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<(), ProverError> {
        let command = format!("{} {}", program, args.join(" "));
        info!("prover: running {}", command);

        let output = Command::new(program)
            .args(args)
            .current_dir(&self.config.circuits_dir)
            .output()
            .map_err(|source| ProverError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            warn!(
                "prover: {} failed: {}",
                command,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Err(ProverError::CommandFailed {
                command,
                status: output.status,
            });
        }
        Ok(())
    }
}

impl Prover for NargoProver {
    fn prove(&self, total_votes: u64) -> Result<Vec<u8>, ProverError> {
        let _running = self.running.lock().map_err(|_| ProverError::Poisoned)?;

        ProverInputs::new(self.config.witness_vote, total_votes).write(&self.config.circuits_dir)?;

        let circuit = self.target(&format!("{}.json", self.config.circuit_name));
        let witness = self.target(&format!("{}.gz", self.config.circuit_name));
        let proof = self.target("proof");
        let vk = self.target("vk");
        let (circuit, witness, proof, vk) =
            (circuit.as_str(), witness.as_str(), proof.as_str(), vk.as_str());

        self.run("nargo", &["execute"])?;
        self.run("bb", &["prove", "-b", circuit, "-w", witness, "-o", proof])?;
        self.run("bb", &["write_vk", "-b", circuit, "-o", vk])?;
        self.run("bb", &["verify", "-k", vk, "-p", proof])?;

        let path = self.config.circuits_dir.join(&proof);
        fs::read(&path).map_err(|source| ProverError::ReadProof { path, source })
    }
}
