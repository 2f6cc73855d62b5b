use crate::*;
use std::fmt;
use std::str::FromStr;

/// A single vote in the clear. Consumed once by encryption and never stored.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PlaintextVote(u64);

impl PlaintextVote {
    /// Wrap a raw value without domain checks. Prefer `BallotDomain::validate` at request
    /// boundaries.
    pub fn new(value: u64) -> Self {
        PlaintextVote(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// The enumerated set of choices a ballot may carry.
///
/// Choices are kept sorted and free of duplicates. The default domain is `{1, 2, 3, 4}`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "Vec<u64>", into = "Vec<u64>")]
pub struct BallotDomain {
    choices: Vec<u64>,
}

impl BallotDomain {
    pub fn new(mut choices: Vec<u64>) -> Result<Self, Error> {
        choices.sort_unstable();
        choices.dedup();

        if choices.is_empty() {
            return Err(Error::InvalidBallotDomain(
                "at least one choice is required".to_owned(),
            ));
        }
        Ok(BallotDomain { choices })
    }

    pub fn choices(&self) -> &[u64] {
        &self.choices
    }

    pub fn contains(&self, vote: u64) -> bool {
        self.choices.binary_search(&vote).is_ok()
    }

    /// Check a raw vote against the domain
    pub fn validate(&self, vote: u64) -> Result<PlaintextVote, Error> {
        if self.contains(vote) {
            Ok(PlaintextVote(vote))
        } else {
            Err(Error::InvalidVote(vote))
        }
    }

    /// Largest single choice
    pub fn max_choice(&self) -> u64 {
        // Never empty, see `new`
        self.choices[self.choices.len() - 1]
    }

    /// Largest tally `num_ballots` ballots from this domain can produce.
    ///
    /// Useful for sizing a `TallyBound`. Saturates instead of overflowing.
    pub fn max_tally(&self, num_ballots: usize) -> u64 {
        (num_ballots as u64).saturating_mul(self.max_choice())
    }
}

impl Default for BallotDomain {
    fn default() -> Self {
        BallotDomain {
            choices: vec![1, 2, 3, 4],
        }
    }
}

impl fmt::Display for BallotDomain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let choices: Vec<String> = self.choices.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", choices.join(", "))
    }
}

/// Parses a comma separated list such as `1,2,3,4`
impl FromStr for BallotDomain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut choices = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let choice = part
                .parse::<u64>()
                .map_err(|e| Error::InvalidBallotDomain(format!("{:?}: {}", part, e)))?;
            choices.push(choice);
        }
        BallotDomain::new(choices)
    }
}

impl std::convert::TryFrom<Vec<u64>> for BallotDomain {
    type Error = Error;

    fn try_from(choices: Vec<u64>) -> Result<Self, Self::Error> {
        BallotDomain::new(choices)
    }
}

impl From<BallotDomain> for Vec<u64> {
    fn from(domain: BallotDomain) -> Self {
        domain.choices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_domain() {
        let domain = BallotDomain::default();
        for vote in 1..=4 {
            assert_eq!(domain.validate(vote).unwrap().value(), vote);
        }
        assert!(matches!(domain.validate(0), Err(Error::InvalidVote(0))));
        assert!(matches!(domain.validate(5), Err(Error::InvalidVote(5))));
        assert_eq!(domain.to_string(), "1, 2, 3, 4");
    }

    #[test]
    fn test_parse_domain() {
        let domain: BallotDomain = " 4, 0,2 ,2,".parse().unwrap();
        assert_eq!(domain.choices(), &[0, 2, 4]);
        assert_eq!(domain.max_choice(), 4);

        assert!(matches!(
            "".parse::<BallotDomain>(),
            Err(Error::InvalidBallotDomain(_))
        ));
        assert!(matches!(
            "1,two".parse::<BallotDomain>(),
            Err(Error::InvalidBallotDomain(_))
        ));
    }

    #[test]
    fn test_max_tally() {
        let domain = BallotDomain::default();
        assert_eq!(domain.max_tally(0), 0);
        assert_eq!(domain.max_tally(25), 100);

        let domain = BallotDomain::new(vec![u64::MAX]).unwrap();
        assert_eq!(domain.max_tally(2), u64::MAX);
    }

    #[test]
    fn test_serde_domain() {
        let domain: BallotDomain = serde_json::from_str("[3, 1]").unwrap();
        assert_eq!(domain.choices(), &[1, 3]);
        assert_eq!(serde_json::to_string(&domain).unwrap(), "[1,3]");
        assert!(serde_json::from_str::<BallotDomain>("[]").is_err());
    }
}
