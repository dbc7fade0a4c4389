pub use crate::catalog::Catalog;
pub use crate::config::*;

use std::collections::HashSet;

/// A builder for assembling the reference data.
///
/// Parties keep the order in which they are declared, and so do the
/// candidates of each list.
///
/// ```
/// use panachage::builder::Builder;
/// # use panachage::CatalogError;
///
/// let mut builder = Builder::new()
///     .party("sp", "SP")?
///     .party("fdp", "FDP")?;
///
/// builder.add_candidate("sp", "sp1", "Anna Müller")?;
/// builder.add_candidate("fdp", "fdp1", "Maria Schneider")?;
///
/// let catalog = builder.build()?;
/// assert_eq!(catalog.parties().len(), 2);
///
/// # Ok::<(), CatalogError>(())
/// ```
#[derive(Debug, Default)]
pub struct Builder {
    pub(crate) _parties: Vec<Party>,
    pub(crate) _candidate_ids: HashSet<CandidateId>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder {
            _parties: Vec::new(),
            _candidate_ids: HashSet::new(),
        }
    }

    /// Declares a new party with an empty list.
    pub fn party(mut self, id: &str, name: &str) -> Result<Builder, CatalogError> {
        self.add_party(&Party {
            id: PartyId::new(id),
            name: name.to_string(),
            color: None,
            candidates: Vec::new(),
        })?;
        Ok(self)
    }

    /// Declares a party with its complete list.
    ///
    /// The candidates are attached to this party, whatever party they claim.
    pub fn add_party(&mut self, party: &Party) -> Result<(), CatalogError> {
        if self._parties.iter().any(|p| p.id == party.id) {
            return Err(CatalogError::DuplicateParty(party.id.clone()));
        }
        // Nothing is recorded if one of the candidates is rejected.
        let mut seen: HashSet<&CandidateId> = HashSet::new();
        for c in party.candidates.iter() {
            if self._candidate_ids.contains(&c.id) || !seen.insert(&c.id) {
                return Err(CatalogError::DuplicateCandidate(c.id.clone()));
            }
        }
        self._parties.push(Party {
            id: party.id.clone(),
            name: party.name.clone(),
            color: party.color.clone(),
            candidates: Vec::new(),
        });
        for c in party.candidates.iter() {
            self.add_candidate(party.id.as_str(), c.id.as_str(), c.name.as_str())?;
        }
        Ok(())
    }

    /// Sets the display colour of a declared party.
    pub fn set_color(&mut self, party_id: &str, color: &str) -> Result<(), CatalogError> {
        let party = self
            ._parties
            .iter_mut()
            .find(|p| p.id.as_str() == party_id)
            .ok_or_else(|| CatalogError::UnknownParty(PartyId::new(party_id)))?;
        party.color = Some(color.to_string());
        Ok(())
    }

    /// Appends a candidate at the end of the list of a declared party.
    pub fn add_candidate(
        &mut self,
        party_id: &str,
        id: &str,
        name: &str,
    ) -> Result<(), CatalogError> {
        let cid = CandidateId::new(id);
        if self._candidate_ids.contains(&cid) {
            return Err(CatalogError::DuplicateCandidate(cid));
        }
        let party = self
            ._parties
            .iter_mut()
            .find(|p| p.id.as_str() == party_id)
            .ok_or_else(|| CatalogError::UnknownParty(PartyId::new(party_id)))?;
        party.candidates.push(Candidate {
            id: cid.clone(),
            name: name.to_string(),
            party: party.id.clone(),
        });
        self._candidate_ids.insert(cid);
        Ok(())
    }

    pub fn build(self) -> Result<Catalog, CatalogError> {
        if self._parties.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }
        Ok(Catalog {
            parties: self._parties,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_declaration_order() {
        let mut b = Builder::new().party("b", "B").unwrap().party("a", "A").unwrap();
        b.add_candidate("a", "a2", "Second").unwrap();
        b.add_candidate("a", "a1", "First").unwrap();
        let catalog = b.build().unwrap();
        let ids: Vec<&str> = catalog.parties().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        let names: Vec<&str> = catalog.parties()[1]
            .candidates
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Second", "First"]);
    }

    #[test]
    fn rejects_duplicates() {
        let res = Builder::new().party("a", "A").unwrap().party("a", "A again");
        assert_eq!(res.err(), Some(CatalogError::DuplicateParty(PartyId::new("a"))));

        let mut b = Builder::new().party("a", "A").unwrap().party("b", "B").unwrap();
        b.add_candidate("a", "x1", "X").unwrap();
        assert_eq!(
            b.add_candidate("b", "x1", "X"),
            Err(CatalogError::DuplicateCandidate(CandidateId::new("x1")))
        );
    }

    #[test]
    fn rejects_unknown_party_and_empty_catalog() {
        let mut b = Builder::new();
        assert_eq!(
            b.add_candidate("a", "a1", "A"),
            Err(CatalogError::UnknownParty(PartyId::new("a")))
        );
        assert_eq!(b.build(), Err(CatalogError::EmptyCatalog));
    }

    #[test]
    fn add_party_rebinds_candidates() {
        let sample = Catalog::sample();
        let mut b = Builder::new();
        for p in sample.parties() {
            b.add_party(p).unwrap();
        }
        b.set_color("sp", "crimson").unwrap();
        let catalog = b.build().unwrap();
        assert_eq!(catalog.parties().len(), 4);
        assert_eq!(catalog.parties()[0].color.as_deref(), Some("crimson"));
        assert!(catalog
            .parties()
            .iter()
            .all(|p| p.candidates.iter().all(|c| c.party == p.id)));
    }
}
