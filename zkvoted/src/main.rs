use config::Config;
use db::{Db, DbError};
use log::{error, info};
use prover::{NargoProver, Prover};
use rand::rngs::OsRng;
use rocket::fairing::{self, AdHoc};
use rocket::http::{Header, Status};
use rocket::response::{self, status, Responder};
use rocket::serde::json::Json;
use rocket::{catch, catchers, get, launch, options, post, routes};
use rocket::{Build, Request, Rocket, State};
use serde::Deserialize;
use serde_json::{json, Value};
use std::convert::TryFrom;
use std::sync::{Arc, Mutex, MutexGuard};
use tally::{TallyError, TallyResponse, Tallier};
use zkvote::*;

#[macro_use]
extern crate lazy_static;

mod config;
mod db;
mod prover;
mod tally;

// Ballots are append-only, so the database only needs to be read once at startup
lazy_static! {
    pub static ref CONFIG: Config = Config::from_env();
    pub static ref MEM_STORE: Arc<Mutex<MemStore>> = Arc::new(Mutex::new(MemStore::default()));
}

fn mem_store() -> MutexGuard<'static, MemStore> {
    MEM_STORE.lock().unwrap_or_else(|e| e.into_inner())
}

/// A JSON `{"error": ...}` body with a status code
#[derive(Debug)]
pub struct ApiError {
    status: Status,
    message: String,
}

impl ApiError {
    fn new(status: Status, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        status::Custom(self.status, Json(json!({ "error": self.message }))).respond_to(req)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        error!("{}", e);
        ApiError::new(Status::InternalServerError, "Failed to store vote")
    }
}

impl From<zkvote::Error> for ApiError {
    fn from(e: zkvote::Error) -> Self {
        error!("{}", e);
        ApiError::new(Status::InternalServerError, e.to_string())
    }
}

impl From<TallyError> for ApiError {
    fn from(e: TallyError) -> Self {
        match e {
            TallyError::Recovery(e) => e.into(),
            TallyError::Prover(e) => {
                error!("{}", e);
                ApiError::new(Status::InternalServerError, "ZK proof verification failed")
            }
        }
    }
}

#[derive(Deserialize, Debug)]
struct VoteRequest {
    vote: i64,
}

#[post("/submit-vote", data = "<request>")]
async fn submit_vote(
    db: &State<Db>,
    authority: &State<Arc<Authority>>,
    request: Json<VoteRequest>,
) -> Result<Json<Value>, ApiError> {
    let domain = &CONFIG.ballot_domain;
    let vote = match u64::try_from(request.vote).map(|v| domain.validate(v)) {
        Ok(Ok(vote)) => vote,
        _ => {
            return Err(ApiError::new(
                Status::BadRequest,
                format!("Invalid vote: must be one of {}", domain),
            ))
        }
    };

    let ciphertext = authority.encrypt(&mut OsRng, vote)?;
    let fingerprint = authority.public_key().fingerprint();
    let id = db::insert_vote(db, &ciphertext, &fingerprint).await?;
    mem_store().append(ciphertext);
    info!("zkvoted: stored ballot {}", id);

    Ok(Json(json!({
        "message": "Vote submitted successfully",
        "encryptedVote": ciphertext,
    })))
}

#[get("/tally")]
async fn get_tally(tallier: &State<Tallier>) -> Result<Json<TallyResponse>, ApiError> {
    let ballots = mem_store().list_all();
    let tallier = tallier.inner().clone();

    let response = rocket::tokio::task::spawn_blocking(move || tallier.run(&ballots))
        .await
        .map_err(|e| {
            error!("zkvoted: tally task failed: {}", e);
            ApiError::new(Status::InternalServerError, "Tally failed")
        })??;

    Ok(Json(response))
}

#[get("/votes")]
fn votes() -> Json<Value> {
    let votes = mem_store().list_all();
    if votes.is_empty() {
        return Json(json!({ "message": "No votes stored", "votes": [] }));
    }
    Json(json!({ "count": votes.len(), "votes": votes }))
}

#[get("/public-key")]
fn public_key(authority: &State<Arc<Authority>>) -> Json<Value> {
    let public = authority.public_key();
    Json(json!({
        "publicKey": public,
        "fingerprint": public.fingerprint(),
        "scheme": authority.scheme(),
        "maxTally": authority.bound(),
        "choices": CONFIG.ballot_domain,
    }))
}

#[options("/<_..>")]
fn preflight() -> Status {
    Status::NoContent
}

#[catch(400)]
fn bad_request() -> Json<Value> {
    Json(json!({ "error": "Malformed request" }))
}

#[catch(422)]
fn unprocessable() -> Json<Value> {
    Json(json!({ "error": "Request body must be {\"vote\": <integer>}" }))
}

#[catch(404)]
fn not_found() -> Json<Value> {
    Json(json!({ "error": "Not found" }))
}

async fn init_authority(rocket: Rocket<Build>) -> fairing::Result {
    // The key pair lives and dies with this process
    let authority = match Authority::generate(&mut OsRng, CONFIG.scheme, CONFIG.tally_bound) {
        Ok(authority) => Arc::new(authority),
        Err(e) => {
            error!("Failed to generate the authority key: {}", e);
            return Err(rocket);
        }
    };

    let prover = CONFIG.prover.clone().map(|config| {
        info!(
            "zkvoted: proving tallies with circuit {} in {}",
            config.circuit_name,
            config.circuits_dir.display()
        );
        Arc::new(NargoProver::new(config)) as Arc<dyn Prover>
    });
    let tallier = Tallier::new(authority.clone(), prover, CONFIG.empty_tally_default);

    Ok(rocket.manage(authority).manage(tallier))
}

fn cors() -> AdHoc {
    AdHoc::on_response("CORS", |_req, res| {
        Box::pin(async move {
            res.set_header(Header::new("Access-Control-Allow-Origin", "*"));
            res.set_header(Header::new(
                "Access-Control-Allow-Methods",
                "GET, POST, OPTIONS",
            ));
            res.set_header(Header::new("Access-Control-Allow-Headers", "Content-Type"));
        })
    })
}

#[launch]
fn rocket() -> _ {
    rocket::build()
        // The database stage filters stored ballots by the authority key
        .attach(AdHoc::try_on_ignite("Tally Authority", init_authority))
        .attach(db::stage())
        .attach(cors())
        .mount(
            "/",
            routes![submit_vote, get_tally, votes, public_key, preflight],
        )
        .register("/", catchers![bad_request, unprocessable, not_found])
}

#[cfg(test)]
mod tests;
