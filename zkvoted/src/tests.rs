use super::rocket;
use rocket::http::{ContentType, Status};
use rocket::local::blocking::Client;
use serde_json::Value;

fn submit(client: &Client, vote: i64) -> (Status, Value) {
    let res = client
        .post("/submit-vote")
        .header(ContentType::JSON)
        .body(format!("{{\"vote\": {}}}", vote))
        .dispatch();
    let status = res.status();
    (status, res.into_json().unwrap())
}

// One test drives the whole daemon, since CONFIG and MEM_STORE are process wide
#[test]
fn vote_and_tally_over_http() {
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("ZKVOTE_DB_PATH", dir.path().join("votes.db"));
    std::env::remove_var("ZKVOTE_CIRCUITS_DIR");
    std::env::remove_var("ZKVOTE_BALLOT_CHOICES");
    std::env::remove_var("ZKVOTE_MAX_TALLY");
    std::env::remove_var("ZKVOTE_SCHEME");

    let client = Client::tracked(rocket()).unwrap();

    // Nothing stored yet
    let res = client.get("/tally").dispatch();
    assert_eq!(res.status(), Status::Ok);
    let body: Value = res.into_json().unwrap();
    assert_eq!(body["message"], "No votes yet");
    assert_eq!(body["totalVotes"], 0);

    let body: Value = client.get("/votes").dispatch().into_json().unwrap();
    assert_eq!(body["message"], "No votes stored");
    assert_eq!(body["votes"], Value::Array(vec![]));

    // Valid ballots
    for vote in &[1, 2, 1, 4] {
        let (status, body) = submit(&client, *vote);
        assert_eq!(status, Status::Ok);
        assert_eq!(body["message"], "Vote submitted successfully");
        assert!(body["encryptedVote"]["C1"].is_string());
        assert!(body["encryptedVote"]["C2"].is_string());
    }

    // Out of domain ballots are rejected and not stored
    for vote in &[0, 5, 7, -1] {
        let (status, body) = submit(&client, *vote);
        assert_eq!(status, Status::BadRequest);
        assert_eq!(body["error"], "Invalid vote: must be one of 1, 2, 3, 4");
    }

    let body: Value = client.get("/votes").dispatch().into_json().unwrap();
    assert_eq!(body["count"], 4);
    assert_eq!(body["votes"].as_array().unwrap().len(), 4);

    let res = client.get("/tally").dispatch();
    assert_eq!(res.status(), Status::Ok);
    let body: Value = res.into_json().unwrap();
    assert_eq!(body["totalVotes"], 8);
    assert_eq!(body["ballots"], 4);
    assert!(body["encryptedSum"]["C1"].is_string());
    assert!(body.get("proof").is_none());

    let body: Value = client.get("/public-key").dispatch().into_json().unwrap();
    assert_eq!(body["publicKey"].as_str().unwrap().len(), 64);
    assert_eq!(body["scheme"], "lifted");
    assert_eq!(body["maxTally"], 1000);

    let res = client.options("/submit-vote").dispatch();
    assert_eq!(res.status(), Status::NoContent);
    assert_eq!(
        res.headers().get_one("Access-Control-Allow-Origin"),
        Some("*")
    );

    let res = client.get("/nowhere").dispatch();
    assert_eq!(res.status(), Status::NotFound);
}
