use zkvote::KeyPair;

pub fn command_keygen(_matches: &clap::ArgMatches) {
    let keypair = KeyPair::generate(&mut rand::rngs::OsRng).unwrap_or_else(|e| {
        eprintln!("zkvote keygen: {}", e);
        std::process::exit(1);
    });

    println!("secret-key: {}", keypair.secret().to_hex());
    println!("public-key: {}", keypair.public());
    println!("fingerprint: {}", keypair.public().fingerprint());
}
