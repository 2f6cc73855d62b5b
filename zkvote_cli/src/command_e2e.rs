use log::debug;
use zkvote::*;

pub fn command_e2e(matches: &clap::ArgMatches) {
    let mut rng = rand::rngs::OsRng;

    let scheme = match matches.value_of("scheme") {
        Some(scheme) => scheme.parse::<Scheme>().unwrap_or_else(|e| {
            eprintln!("zkvote e2e: {}", e);
            std::process::exit(1);
        }),
        None => Scheme::Lifted,
    };

    let domain = crate::ballot_domain(matches, "e2e");
    let votes: Vec<PlaintextVote> = matches
        .value_of("VOTES")
        .unwrap_or_default()
        .split(',')
        .filter(|v| !v.trim().is_empty())
        .map(|v| crate::parse_vote(v, &domain, "e2e"))
        .collect();
    let bound = crate::tally_bound(matches, &domain, votes.len(), "e2e");

    let authority = Authority::generate(&mut rng, scheme, bound).unwrap_or_else(|e| {
        eprintln!("zkvote e2e: {}", e);
        std::process::exit(1);
    });
    println!("> Authority {} ({})", authority.public_key().fingerprint(), scheme);

    let mut store = MemStore::default();
    for vote in &votes {
        match authority.encrypt(&mut rng, *vote) {
            Ok(ciphertext) => {
                let (c1, c2) = ciphertext.to_hex();
                debug!("vote {} -> C1={} C2={}", vote.value(), c1, c2);
                store.append(ciphertext);
            }
            Err(e) => {
                eprintln!("zkvote e2e: {}", e);
                std::process::exit(1);
            }
        }
    }
    println!("> Encrypted {} ballots", store.len());

    let aggregate = match store.aggregate() {
        Ok(aggregate) => aggregate,
        Err(Error::EmptyAggregate) => {
            println!("> No votes yet");
            return;
        }
        Err(e) => {
            eprintln!("zkvote e2e: {}", e);
            std::process::exit(1);
        }
    };

    match authority.recover(&aggregate) {
        Ok(total) => {
            let expected: u64 = votes.iter().map(|v| v.value()).sum();
            println!("> Tally: {} (bound {})", total, bound);
            if total != expected {
                eprintln!("zkvote e2e: tally {} does not match {}", total, expected);
                std::process::exit(1);
            }
            println!("> Tally verified OK");
        }
        Err(e) => {
            eprintln!("zkvote e2e: {}", e);
            std::process::exit(1);
        }
    }
}
