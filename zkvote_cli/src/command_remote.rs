use crate::rest;

pub fn command_vote(matches: &clap::ArgMatches, uri: &str) {
    let vote = matches.value_of("VOTE").unwrap_or_default();
    let vote = vote.trim().parse::<i64>().unwrap_or_else(|_| {
        eprintln!("zkvote vote: {:?} is not an integer", vote);
        std::process::exit(1);
    });

    match rest::submit_vote(uri, vote) {
        Ok(res) => {
            let (c1, c2) = res.encrypted_vote.to_hex();
            println!("{}", res.message);
            println!("C1: {}", c1);
            println!("C2: {}", c2);
        }
        Err(e) => {
            eprintln!("zkvote vote: {}", e);
            std::process::exit(1);
        }
    }
}

pub fn command_results(uri: &str) {
    let res = rest::get_tally(uri).unwrap_or_else(|e| {
        eprintln!("zkvote results: {}", e);
        std::process::exit(1);
    });

    if let Some(message) = &res.message {
        println!("{}", message);
    }
    println!("total-votes: {}", res.total_votes);
    println!("ballots: {}", res.ballots);
    if let Some(sum) = &res.encrypted_sum {
        let (c1, c2) = sum.to_hex();
        println!("encrypted-sum: C1={} C2={}", c1, c2);
    }
    if let Some(proof) = &res.proof {
        println!("proof: {}", proof);
    }
}

pub fn command_votes(uri: &str) {
    let res = rest::get_votes(uri).unwrap_or_else(|e| {
        eprintln!("zkvote votes: {}", e);
        std::process::exit(1);
    });

    if let Some(message) = &res.message {
        eprintln!("{}", message);
    }

    // Printed as a list so the output can be fed to `zkvote tally`
    match serde_json::to_string_pretty(&res.votes) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("zkvote votes: {}", e);
            std::process::exit(1);
        }
    }
}

pub fn command_public_key(uri: &str) {
    let res = rest::get_public_key(uri).unwrap_or_else(|e| {
        eprintln!("zkvote public-key: {}", e);
        std::process::exit(1);
    });

    println!("public-key: {}", res.public_key);
    println!("fingerprint: {}", res.fingerprint);
    println!("scheme: {}", res.scheme);
    println!("max-tally: {}", res.max_tally);
    println!("choices: {}", res.choices);
}
