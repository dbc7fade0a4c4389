mod config;
use log::debug;

use std::{collections::HashMap, ops::AddAssign};

pub use crate::config::*;

pub mod ballot;
pub mod builder;
pub mod catalog;
pub mod manual;
pub mod session;
pub mod tutorial;

pub use crate::ballot::{BallotEngine, BallotView};
pub use crate::catalog::Catalog;
pub use crate::session::{Command, Session};
pub use crate::tutorial::{Exercise, Tutorial, TutorialEvent, TutorialPhase, TutorialStep};

// **** Private structures ****

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct VoteCount(u64);

impl VoteCount {
    const EMPTY: VoteCount = VoteCount(0);
}

impl std::iter::Sum for VoteCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        VoteCount(iter.map(|vc| vc.0).sum())
    }
}

impl AddAssign for VoteCount {
    fn add_assign(&mut self, rhs: VoteCount) {
        self.0 += rhs.0;
    }
}

// The quota of a party, kept as an exact fraction over the total number of votes:
// quota = base + remainder / total.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
struct Quota {
    base: u64,
    remainder: u64,
}

/// Counts the candidate votes and the party votes of one ballot.
///
/// Every line of the ballot is a vote for its candidate and, through the candidate,
/// for the candidate's own party, whatever list was selected. When a party list was
/// selected, the lines left empty are added to that party as list votes.
/// Nothing is added for the empty lines of a blank list.
///
/// Arguments:
/// * `ballot` the entries of the ballot, in line order
/// * `selection` the list the ballot started from, if any
/// * `parties` the reference data. Parties and candidates without votes are reported with 0.
/// * `max_seats` the number of lines of the ballot
///
/// ```
/// use panachage::*;
///
/// let catalog = Catalog::sample();
/// let mut engine = BallotEngine::new(catalog.clone(), &BallotRules::DEFAULT_RULES);
/// engine.select_list(ListSelection::Party(PartyId::new("fdp")))?;
/// engine.remove_candidate(0)?;
///
/// let tally = compute_tally(engine.entries(), engine.selection(), catalog.parties(), 4);
/// assert_eq!(tally.party(&PartyId::new("fdp")), 4);
/// assert_eq!(tally.list_votes, 1);
/// # Ok::<(), BallotError>(())
/// ```
pub fn compute_tally(
    ballot: &[BallotEntry],
    selection: Option<&ListSelection>,
    parties: &[Party],
    max_seats: u32,
) -> TallyResult {
    let mut party_tally: HashMap<&PartyId, VoteCount> = HashMap::new();
    let mut candidate_tally: HashMap<&CandidateId, VoteCount> = HashMap::new();
    for p in parties.iter() {
        party_tally.insert(&p.id, VoteCount::EMPTY);
        for c in p.candidates.iter() {
            candidate_tally.insert(&c.id, VoteCount::EMPTY);
        }
    }

    for entry in ballot.iter() {
        let count = VoteCount(entry.count as u64);
        if let Some(vc) = candidate_tally.get_mut(&entry.candidate.id) {
            *vc += count;
        } else {
            debug!(
                "compute_tally: candidate {:?} is not in the reference data, skipping",
                entry.candidate.id
            );
        }
        if let Some(vc) = party_tally.get_mut(&entry.candidate.party) {
            *vc += count;
        }
    }

    let used: u64 = ballot.iter().map(|e| e.count as u64).sum();
    let empty_lines = (max_seats as u64).saturating_sub(used);
    let mut list_votes = VoteCount::EMPTY;
    if let Some(ListSelection::Party(pid)) = selection {
        if let Some(vc) = party_tally.get_mut(pid) {
            list_votes = VoteCount(empty_lines);
            *vc += list_votes;
        }
    }
    debug!(
        "compute_tally: {} used lines, {} list votes for {:?}",
        used, list_votes.0, selection
    );

    TallyResult {
        candidate_votes: parties
            .iter()
            .flat_map(|p| p.candidates.iter())
            .map(|c| {
                let vc = candidate_tally.get(&c.id).cloned().unwrap_or(VoteCount::EMPTY);
                (c.id.clone(), vc.0)
            })
            .collect(),
        party_votes: parties
            .iter()
            .map(|p| {
                let vc = party_tally.get(&p.id).cloned().unwrap_or(VoteCount::EMPTY);
                (p.id.clone(), vc.0)
            })
            .collect(),
        list_votes: list_votes.0,
    }
}

/// Distributes `max_seats` seats between the parties with the largest remainder method
/// (Hare quota).
///
/// Each party first receives the integer part of its quota
/// `votes / total votes * max_seats`. The seats left over go, one each, to the parties
/// with the largest fractional remainders. Equal remainders are resolved in the order
/// of `parties`.
///
/// When no vote at all was cast, every party receives 0 seats. Otherwise the seats
/// always add up to `max_seats`.
pub fn compute_seats(tally: &TallyResult, parties: &[Party], max_seats: u32) -> SeatDistribution {
    let votes: Vec<(&PartyId, VoteCount)> = parties
        .iter()
        .map(|p| (&p.id, VoteCount(tally.party(&p.id))))
        .collect();
    let total_votes: VoteCount = votes.iter().map(|(_, vc)| *vc).sum();

    if total_votes == VoteCount::EMPTY {
        debug!("compute_seats: no votes, no seat is distributed");
        return SeatDistribution {
            seats: parties.iter().map(|p| (p.id.clone(), 0)).collect(),
        };
    }

    let seats_total = max_seats as u64;
    let quotas: Vec<Quota> = votes
        .iter()
        .map(|(_, vc)| {
            let scaled = vc.0 * seats_total;
            Quota {
                base: scaled / total_votes.0,
                remainder: scaled % total_votes.0,
            }
        })
        .collect();
    debug!("compute_seats: total {:?} quotas {:?}", total_votes, quotas);

    let mut seats: Vec<u64> = quotas.iter().map(|q| q.base).collect();
    let assigned: u64 = seats.iter().sum();
    let remaining_seats = seats_total.saturating_sub(assigned) as usize;

    // The sort is stable: equal remainders keep the order of the parties.
    let mut by_remainder: Vec<usize> = (0..quotas.len()).collect();
    by_remainder.sort_by(|a, b| quotas[*b].remainder.cmp(&quotas[*a].remainder));
    for idx in by_remainder.iter().take(remaining_seats) {
        seats[*idx] += 1;
    }
    debug!(
        "compute_seats: {} seats by quota, {} by remainder",
        assigned, remaining_seats
    );

    SeatDistribution {
        seats: votes
            .iter()
            .zip(seats.iter())
            .map(|((pid, _), s)| ((*pid).clone(), *s as u32))
            .collect(),
    }
}
