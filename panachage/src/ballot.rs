//! The ballot engine: the current ballot and the rules for changing it.

use log::{debug, info};

use crate::catalog::Catalog;
use crate::config::*;
use crate::{compute_seats, compute_tally};

/// Label shown for a blank list that was not given a name.
pub const UNNAMED_BLANK_LIST: &str = "Leere Liste (ohne Bezeichnung)";

/// A read-only snapshot of the ballot, as seen by the tutorial and the renderers.
#[derive(Debug, Clone, Copy)]
pub struct BallotView<'a> {
    pub selection: Option<&'a ListSelection>,
    pub entries: &'a [BallotEntry],
    pub custom_list_name: &'a str,
    pub catalog: &'a Catalog,
    pub rules: &'a BallotRules,
}

impl<'a> BallotView<'a> {
    /// Number of ballot lines in use. A cumulated candidate uses two lines.
    pub fn used_votes(&self) -> u32 {
        self.entries.iter().map(|e| e.count).sum()
    }

    pub fn contains_party(&self, pid: &PartyId) -> bool {
        self.entries.iter().any(|e| e.candidate.party == *pid)
    }
}

/// Holds the ballot of one voter and enforces the ballot rules on every change.
///
/// Invariants, checked at every change:
/// - the entries never use more than `max_seats` lines,
/// - a candidate appears in at most one entry, whose count is between 1 and `max_cumulation`.
///
/// A refused change returns an error and leaves the ballot untouched.
#[derive(Debug, Clone)]
pub struct BallotEngine {
    catalog: Catalog,
    rules: BallotRules,
    selection: Option<ListSelection>,
    custom_list_name: String,
    entries: Vec<BallotEntry>,
    results_visible: bool,
}

impl BallotEngine {
    pub fn new(catalog: Catalog, rules: &BallotRules) -> BallotEngine {
        BallotEngine {
            catalog,
            rules: rules.clone(),
            selection: None,
            custom_list_name: String::new(),
            entries: Vec::new(),
            results_visible: false,
        }
    }

    /// Starts the ballot from a list.
    ///
    /// A party list fills the ballot with its pre-printed candidates, one line each.
    /// A blank list empties the ballot. The name of a blank list is kept.
    pub fn select_list(&mut self, selection: ListSelection) -> Result<(), BallotError> {
        let entries: Vec<BallotEntry> = match &selection {
            ListSelection::Blank => Vec::new(),
            ListSelection::Party(pid) => {
                let party = self
                    .catalog
                    .party(pid)
                    .ok_or_else(|| BallotError::UnknownParty(pid.clone()))?;
                if party.candidates.len() > self.rules.max_seats as usize {
                    debug!(
                        "select_list: list {:?} has {} candidates, only the first {} are printed",
                        pid,
                        party.candidates.len(),
                        self.rules.max_seats
                    );
                }
                party
                    .candidates
                    .iter()
                    .take(self.rules.max_seats as usize)
                    .map(|c| BallotEntry {
                        candidate: c.clone(),
                        count: 1,
                    })
                    .collect()
            }
        };
        info!("select_list: {:?}", selection);
        self.selection = Some(selection);
        self.entries = entries;
        self.results_visible = false;
        Ok(())
    }

    /// Names a blank list. The text is cut to `max_list_name_len` characters.
    pub fn set_custom_list_name(&mut self, text: &str) {
        self.custom_list_name = text.chars().take(self.rules.max_list_name_len).collect();
    }

    /// Writes a candidate on the ballot.
    ///
    /// Writing a candidate who is already on the ballot cumulates the existing entry
    /// instead of adding a second one.
    pub fn add_candidate(&mut self, cid: &CandidateId) -> Result<(), BallotError> {
        let candidate = self
            .catalog
            .candidate(cid)
            .ok_or_else(|| BallotError::UnknownCandidate(cid.clone()))?
            .clone();

        if self.used_votes() >= self.rules.max_seats {
            debug!("add_candidate: ballot is full, refusing {:?}", cid);
            return Err(BallotError::SeatLimitExceeded {
                max_seats: self.rules.max_seats,
            });
        }

        match self.entries.iter_mut().find(|e| e.candidate.id == *cid) {
            Some(e) if e.count >= self.rules.max_cumulation => {
                debug!("add_candidate: {:?} already cumulated", cid);
                return Err(BallotError::CumulationLimitExceeded {
                    candidate: cid.clone(),
                });
            }
            Some(e) => {
                e.count += 1;
                debug!("add_candidate: cumulating {:?} to {}", cid, e.count);
            }
            None => {
                debug!("add_candidate: adding {:?}", cid);
                self.entries.push(BallotEntry {
                    candidate,
                    count: 1,
                });
            }
        }
        self.results_visible = false;
        Ok(())
    }

    /// Strikes the ballot line at `index` (0-based).
    ///
    /// The whole entry goes away: a cumulated candidate loses both votes.
    pub fn remove_candidate(&mut self, index: usize) -> Result<BallotEntry, BallotError> {
        if index >= self.entries.len() {
            return Err(BallotError::InvalidLineIndex {
                index,
                len: self.entries.len(),
            });
        }
        let removed = self.entries.remove(index);
        debug!("remove_candidate: line {} {:?}", index, removed.candidate.id);
        self.results_visible = false;
        Ok(removed)
    }

    /// Clears the list selection, the list name and the ballot.
    pub fn reset(&mut self) {
        debug!("reset");
        self.selection = None;
        self.custom_list_name.clear();
        self.entries.clear();
        self.results_visible = false;
    }

    /// Asks for the results to be displayed, until the next change of the ballot.
    pub fn show_results(&mut self) {
        self.results_visible = true;
    }

    pub fn results_visible(&self) -> bool {
        self.results_visible
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rules(&self) -> &BallotRules {
        &self.rules
    }

    pub fn selection(&self) -> Option<&ListSelection> {
        self.selection.as_ref()
    }

    pub fn custom_list_name(&self) -> &str {
        self.custom_list_name.as_str()
    }

    pub fn entries(&self) -> &[BallotEntry] {
        &self.entries
    }

    pub fn view(&self) -> BallotView<'_> {
        BallotView {
            selection: self.selection.as_ref(),
            entries: &self.entries,
            custom_list_name: self.custom_list_name.as_str(),
            catalog: &self.catalog,
            rules: &self.rules,
        }
    }

    pub fn used_votes(&self) -> u32 {
        self.view().used_votes()
    }

    pub fn empty_lines(&self) -> u32 {
        self.rules.max_seats.saturating_sub(self.used_votes())
    }

    /// The ballot as printed: exactly `max_seats` lines, filled in order.
    pub fn lines(&self) -> Vec<Option<&BallotEntry>> {
        (0..self.rules.max_seats as usize)
            .map(|idx| self.entries.get(idx))
            .collect()
    }

    /// The name of the list shown on top of the ballot, if a list was selected.
    pub fn list_label(&self) -> Option<String> {
        match &self.selection {
            None => None,
            Some(ListSelection::Party(pid)) => Some(self.catalog.party_name(pid)),
            Some(ListSelection::Blank) if self.custom_list_name.is_empty() => {
                Some(UNNAMED_BLANK_LIST.to_string())
            }
            Some(ListSelection::Blank) => Some(self.custom_list_name.clone()),
        }
    }

    pub fn tally(&self) -> TallyResult {
        compute_tally(
            &self.entries,
            self.selection.as_ref(),
            self.catalog.parties(),
            self.rules.max_seats,
        )
    }

    /// The tally and the seat distribution, when the results are displayed.
    pub fn results(&self) -> Option<(TallyResult, SeatDistribution)> {
        if !self.results_visible {
            return None;
        }
        let tally = self.tally();
        let seats = compute_seats(&tally, self.catalog.parties(), self.rules.max_seats);
        Some((tally, seats))
    }
}
