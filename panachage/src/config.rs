// ********* Reference data ***********

use std::error::Error;
use std::fmt::Display;
use std::time::Duration;

/// The identifier of a party, as written in the reference data (for example `sp`).
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd)]
pub struct PartyId(pub String);

impl PartyId {
    pub fn new(id: &str) -> PartyId {
        PartyId(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for PartyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The identifier of a candidate (for example `sp1`).
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd)]
pub struct CandidateId(pub String);

impl CandidateId {
    pub fn new(id: &str) -> CandidateId {
        CandidateId(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for CandidateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    /// The party that put this candidate on its list.
    pub party: PartyId,
}

/// A party and its pre-printed list, in list order.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Party {
    pub id: PartyId,
    pub name: String,
    /// Display colour, only used by the renderers.
    pub color: Option<String>,
    pub candidates: Vec<Candidate>,
}

// ********* Ballot ***********

/// The list chosen as the starting point of a ballot.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum ListSelection {
    /// The pre-printed list of a party. Unused lines count as list votes for this party.
    Party(PartyId),
    /// A blank list without pre-printed candidates. Unused lines are lost.
    Blank,
}

/// One line of the ballot. A cumulated candidate is a single entry with a count of 2.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct BallotEntry {
    pub candidate: Candidate,
    pub count: u32,
}

// ******** Output data structures *********

/// Candidate and party votes derived from one ballot.
///
/// Both tallies follow the order of the reference data and include the
/// parties and candidates without any vote.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TallyResult {
    pub candidate_votes: Vec<(CandidateId, u64)>,
    pub party_votes: Vec<(PartyId, u64)>,
    /// The unused lines credited to the selected party list (0 for a blank list).
    pub list_votes: u64,
}

impl TallyResult {
    pub fn candidate(&self, cid: &CandidateId) -> u64 {
        self.candidate_votes
            .iter()
            .find(|(c, _)| c == cid)
            .map(|(_, v)| *v)
            .unwrap_or(0)
    }

    pub fn party(&self, pid: &PartyId) -> u64 {
        self.party_votes
            .iter()
            .find(|(p, _)| p == pid)
            .map(|(_, v)| *v)
            .unwrap_or(0)
    }

    pub fn total_votes(&self) -> u64 {
        self.party_votes.iter().map(|(_, v)| *v).sum()
    }

    /// Share of all party votes, in percent. 0 when no vote was cast.
    pub fn vote_share(&self, pid: &PartyId) -> f64 {
        let total = self.total_votes();
        if total == 0 {
            0.0
        } else {
            (self.party(pid) as f64) / (total as f64) * 100.0
        }
    }

    /// The candidates with at least one vote, most votes first.
    /// Candidates with the same number of votes keep the order of the reference data.
    pub fn ranked_candidates(&self) -> Vec<(CandidateId, u64)> {
        let mut res: Vec<(CandidateId, u64)> = self
            .candidate_votes
            .iter()
            .filter(|(_, v)| *v > 0)
            .cloned()
            .collect();
        res.sort_by(|a, b| b.1.cmp(&a.1));
        res
    }
}

/// Seats per party, in the order of the reference data.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SeatDistribution {
    pub seats: Vec<(PartyId, u32)>,
}

impl SeatDistribution {
    pub fn seats_for(&self, pid: &PartyId) -> u32 {
        self.seats
            .iter()
            .find(|(p, _)| p == pid)
            .map(|(_, s)| *s)
            .unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.seats.iter().map(|(_, s)| *s).sum()
    }
}

// ******** Errors *********

/// The reasons for refusing a change to the ballot.
///
/// None of them is fatal: the ballot is left exactly as it was and the
/// voter may try something else.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum BallotError {
    /// All the lines of the ballot are already used.
    SeatLimitExceeded { max_seats: u32 },
    /// The candidate is already written the maximum number of times.
    CumulationLimitExceeded { candidate: CandidateId },
    /// There is no ballot line at this position. Callers should never send it.
    InvalidLineIndex { index: usize, len: usize },
    UnknownParty(PartyId),
    UnknownCandidate(CandidateId),
    /// The results are not shown while the tutorial runs.
    TallyLockedDuringTutorial,
}

impl Error for BallotError {}

impl Display for BallotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BallotError::SeatLimitExceeded { max_seats } => {
                write!(f, "at most {} candidates can be chosen", max_seats)
            }
            BallotError::CumulationLimitExceeded { candidate } => write!(
                f,
                "candidate {} is already on the ballot the maximum number of times",
                candidate
            ),
            BallotError::InvalidLineIndex { index, len } => write!(
                f,
                "no candidate on ballot line {} (the ballot has {} entries)",
                index + 1,
                len
            ),
            BallotError::UnknownParty(pid) => write!(f, "unknown party {}", pid),
            BallotError::UnknownCandidate(cid) => write!(f, "unknown candidate {}", cid),
            BallotError::TallyLockedDuringTutorial => {
                write!(f, "the vote count is disabled during the tutorial")
            }
        }
    }
}

/// Errors detected while assembling the reference data.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum CatalogError {
    EmptyCatalog,
    DuplicateParty(PartyId),
    DuplicateCandidate(CandidateId),
    UnknownParty(PartyId),
}

impl Error for CatalogError {}

impl Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::EmptyCatalog => write!(f, "the catalog does not contain any party"),
            CatalogError::DuplicateParty(pid) => write!(f, "party {} is declared twice", pid),
            CatalogError::DuplicateCandidate(cid) => {
                write!(f, "candidate {} is declared twice", cid)
            }
            CatalogError::UnknownParty(pid) => {
                write!(f, "candidate added to the undeclared party {}", pid)
            }
        }
    }
}

// ********* Configuration **********

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BallotRules {
    /// Number of lines on the ballot, which is also the number of seats to fill.
    pub max_seats: u32,
    /// How many times the same candidate may be written on the ballot.
    pub max_cumulation: u32,
    /// Maximum number of characters of the name given to a blank list.
    pub max_list_name_len: usize,
}

impl BallotRules {
    pub const DEFAULT_RULES: BallotRules = BallotRules {
        max_seats: 4,
        max_cumulation: 2,
        max_list_name_len: 50,
    };
}

impl Default for BallotRules {
    fn default() -> Self {
        BallotRules::DEFAULT_RULES
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct TutorialConfig {
    /// Pause between a solved exercise and the next one.
    pub advance_delay: Duration,
}

impl TutorialConfig {
    pub const DEFAULT_CONFIG: TutorialConfig = TutorialConfig {
        advance_delay: Duration::from_millis(1500),
    };
}

impl Default for TutorialConfig {
    fn default() -> Self {
        TutorialConfig::DEFAULT_CONFIG
    }
}
