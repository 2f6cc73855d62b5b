use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zkvote::{BallotDomain, Ciphertext, PublicKey, Scheme, TallyBound};

#[derive(Debug, Error)]
pub enum RestError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Server { status: StatusCode, message: String },
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize, Debug)]
struct VoteRequest {
    vote: i64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub message: String,
    pub encrypted_vote: Ciphertext,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TallyResponse {
    pub message: Option<String>,
    pub total_votes: u64,
    #[serde(default)]
    pub ballots: usize,
    pub encrypted_sum: Option<Ciphertext>,
    pub proof: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct VotesResponse {
    pub message: Option<String>,
    #[serde(default)]
    pub votes: Vec<Ciphertext>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyResponse {
    pub public_key: PublicKey,
    pub fingerprint: String,
    pub scheme: Scheme,
    pub max_tally: TallyBound,
    pub choices: BallotDomain,
}

fn parse<T: DeserializeOwned>(res: Response) -> Result<T, RestError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res.json()?);
    }

    let message = match res.json::<ErrorBody>() {
        Ok(body) => body.error,
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_owned(),
    };
    Err(RestError::Server { status, message })
}

pub fn submit_vote(base_uri: &str, vote: i64) -> Result<SubmitResponse, RestError> {
    let full_uri = format!("{}/submit-vote", base_uri);
    let res = Client::new()
        .post(&full_uri)
        .json(&VoteRequest { vote })
        .send()?;
    parse(res)
}

pub fn get_tally(base_uri: &str) -> Result<TallyResponse, RestError> {
    let full_uri = format!("{}/tally", base_uri);
    parse(Client::new().get(&full_uri).send()?)
}

pub fn get_votes(base_uri: &str) -> Result<VotesResponse, RestError> {
    let full_uri = format!("{}/votes", base_uri);
    parse(Client::new().get(&full_uri).send()?)
}

pub fn get_public_key(base_uri: &str) -> Result<PublicKeyResponse, RestError> {
    let full_uri = format!("{}/public-key", base_uri);
    parse(Client::new().get(&full_uri).send()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_responses() {
        let tally: TallyResponse = serde_json::from_str(
            r#"{"message": "No votes yet", "totalVotes": 0, "ballots": 0}"#,
        )
        .unwrap();
        assert_eq!(tally.total_votes, 0);
        assert!(tally.encrypted_sum.is_none());

        let keypair = zkvote::KeyPair::generate(&mut rand::rngs::OsRng).unwrap();
        let key = keypair.public().to_string();
        let json = format!(
            r#"{{"publicKey": "{}", "fingerprint": "00", "scheme": "lifted", "maxTally": 1000, "choices": [1, 2, 3, 4]}}"#,
            key
        );
        let public: PublicKeyResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(&public.public_key, keypair.public());
        assert_eq!(public.max_tally, TallyBound::new(1000));
    }
}
