use zkvote::{encrypt, PublicKey};

pub fn command_encrypt(matches: &clap::ArgMatches) {
    let public_key = crate::expand(matches.value_of("PUBLIC-KEY").unwrap_or_default());
    let public_key = public_key.trim().parse::<PublicKey>().unwrap_or_else(|e| {
        eprintln!("zkvote encrypt: invalid public key: {}", e);
        std::process::exit(1);
    });

    let domain = crate::ballot_domain(matches, "encrypt");
    let vote = crate::parse_vote(
        matches.value_of("VOTE").unwrap_or_default(),
        &domain,
        "encrypt",
    );

    // Only the lifted scheme can be used without the authority secret
    let ciphertext = encrypt(&mut rand::rngs::OsRng, vote, &public_key).unwrap_or_else(|e| {
        eprintln!("zkvote encrypt: {}", e);
        std::process::exit(1);
    });

    match serde_json::to_string_pretty(&ciphertext) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("zkvote encrypt: {}", e);
            std::process::exit(1);
        }
    }
}
