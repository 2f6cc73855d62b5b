use clap::{App, AppSettings, Arg, SubCommand};
use log::LevelFilter;
use zkvote::BallotDomain;

mod command_e2e;
mod command_encrypt;
mod command_keygen;
mod command_remote;
mod command_tally;
mod rest;

fn main() {
    let choices_arg = || {
        Arg::with_name("choices")
            .long("choices")
            .takes_value(true)
            .help("Comma separated list of allowed votes [default: 1,2,3,4]")
    };
    let max_arg = || {
        Arg::with_name("max")
            .long("max")
            .takes_value(true)
            .help("Largest tally to search for [default: largest choice times number of ballots]")
    };

    let matches = App::new("zkvote")
        .version("0.1")
        .about("Homomorphic ballot encryption and tallying")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("uri")
                .long("uri")
                .takes_value(true)
                .global(true)
                .help("Set the zkvoted uri - can also be set with ZKVOTE_URI"),
        )
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .global(true)
                .help("Sets the level of verbosity"),
        )
        .subcommand(SubCommand::with_name("keygen").about("Generate an authority key pair"))
        .subcommand(
            SubCommand::with_name("encrypt")
                .about("Encrypt a vote under an authority public key")
                .arg(
                    Arg::with_name("PUBLIC-KEY")
                        .index(1)
                        .required(true)
                        .help("Authority public key in hex, or an $ENV_VAR holding it"),
                )
                .arg(Arg::with_name("VOTE").index(2).required(true))
                .arg(choices_arg()),
        )
        .subcommand(
            SubCommand::with_name("tally")
                .about("Tally a file of encrypted ballots with the authority secret key")
                .arg(
                    Arg::with_name("INPUT")
                        .index(1)
                        .required(true)
                        .help("JSON list of ballots, or the output of `zkvote votes`"),
                )
                .arg(
                    Arg::with_name("secret")
                        .long("secret")
                        .takes_value(true)
                        .required(true)
                        .help("Authority secret key in hex, or an $ENV_VAR holding it"),
                )
                .arg(max_arg())
                .arg(choices_arg()),
        )
        .subcommand(
            SubCommand::with_name("e2e")
                .about("Run a local election: generate a key, encrypt, combine and tally")
                .arg(
                    Arg::with_name("VOTES")
                        .index(1)
                        .required(true)
                        .help("Comma separated votes, e.g. 1,2,1,4"),
                )
                .arg(
                    Arg::with_name("scheme")
                        .long("scheme")
                        .takes_value(true)
                        .help("lifted or key-masked [default: lifted]"),
                )
                .arg(max_arg())
                .arg(choices_arg()),
        )
        .subcommand(
            SubCommand::with_name("vote")
                .about("Submit a vote to zkvoted")
                .arg(Arg::with_name("VOTE").index(1).required(true)),
        )
        .subcommand(SubCommand::with_name("results").about("Fetch the current tally from zkvoted"))
        .subcommand(SubCommand::with_name("votes").about("List the ballots stored by zkvoted"))
        .subcommand(
            SubCommand::with_name("public-key").about("Fetch the zkvoted authority public key"),
        )
        .get_matches();

    let level = match matches.occurrences_of("v") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let env_var = std::env::var("ZKVOTE_URI");
    let uri = match matches.value_of("uri") {
        Some(uri) => uri,
        None => env_var.as_deref().unwrap_or("http://localhost:8000"),
    };
    let uri = uri.trim_end_matches('/');
    log::info!("URI: {}", uri);

    // Subcommands
    match matches.subcommand() {
        ("keygen", Some(matches)) => command_keygen::command_keygen(matches),
        ("encrypt", Some(matches)) => command_encrypt::command_encrypt(matches),
        ("tally", Some(matches)) => command_tally::command_tally(matches),
        ("e2e", Some(matches)) => command_e2e::command_e2e(matches),
        ("vote", Some(matches)) => command_remote::command_vote(matches, uri),
        ("results", Some(_)) => command_remote::command_results(uri),
        ("votes", Some(_)) => command_remote::command_votes(uri),
        ("public-key", Some(_)) => command_remote::command_public_key(uri),
        _ => unreachable!("subcommand required"),
    }
}

/// Expand `~` and `$VARS` in a command line value
pub fn expand(value: &str) -> String {
    match shellexpand::full(value) {
        Ok(expanded) => expanded.into_owned(),
        Err(e) => {
            eprintln!("zkvote: {}", e);
            std::process::exit(1);
        }
    }
}

/// The `--choices` domain, or the default one
pub fn ballot_domain(matches: &clap::ArgMatches, command: &str) -> BallotDomain {
    match matches.value_of("choices") {
        Some(choices) => choices.parse::<BallotDomain>().unwrap_or_else(|e| {
            eprintln!("zkvote {}: invalid --choices: {}", command, e);
            std::process::exit(1);
        }),
        None => BallotDomain::default(),
    }
}

/// Parse a vote and check it against the domain
pub fn parse_vote(value: &str, domain: &BallotDomain, command: &str) -> zkvote::PlaintextVote {
    let vote = match value.trim().parse::<u64>() {
        Ok(v) => domain.validate(v).ok(),
        Err(_) => None,
    };

    match vote {
        Some(vote) => vote,
        None => {
            eprintln!(
                "zkvote {}: invalid vote {:?}: must be one of {}",
                command, value, domain
            );
            std::process::exit(1);
        }
    }
}

/// The `--max` bound, or one derived from the domain and the number of ballots
pub fn tally_bound(
    matches: &clap::ArgMatches,
    domain: &BallotDomain,
    num_ballots: usize,
    command: &str,
) -> zkvote::TallyBound {
    match matches.value_of("max") {
        Some(max) => max.parse::<zkvote::TallyBound>().unwrap_or_else(|e| {
            eprintln!("zkvote {}: invalid --max: {}", command, e);
            std::process::exit(1);
        }),
        None => zkvote::TallyBound::new(domain.max_tally(num_ballots)),
    }
}
