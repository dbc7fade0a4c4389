//! The reference data: parties and their pre-printed lists.

use crate::config::*;

/// The read-only set of parties of an election, in ballot order.
///
/// Use the [`crate::builder::Builder`] to assemble a catalog from external data.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Catalog {
    pub(crate) parties: Vec<Party>,
}

impl Catalog {
    pub fn parties(&self) -> &[Party] {
        &self.parties
    }

    pub fn party(&self, pid: &PartyId) -> Option<&Party> {
        self.parties.iter().find(|p| p.id == *pid)
    }

    pub fn candidate(&self, cid: &CandidateId) -> Option<&Candidate> {
        self.parties
            .iter()
            .flat_map(|p| p.candidates.iter())
            .find(|c| c.id == *cid)
    }

    /// The display name of a party, or its identifier when it is not declared.
    pub fn party_name(&self, pid: &PartyId) -> String {
        self.party(pid)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| pid.to_string())
    }

    /// The four parties of the national council example, four candidates each.
    pub fn sample() -> Catalog {
        Catalog {
            parties: vec![
                sample_party(
                    "sp",
                    "SP - Sozialdemokratische Partei",
                    "red",
                    &[
                        ("sp1", "Anna Müller"),
                        ("sp2", "Peter Schmidt"),
                        ("sp3", "Laura Weber"),
                        ("sp4", "Thomas Fischer"),
                    ],
                ),
                sample_party(
                    "fdp",
                    "FDP - Die Liberalen",
                    "blue",
                    &[
                        ("fdp1", "Maria Schneider"),
                        ("fdp2", "Hans Meier"),
                        ("fdp3", "Julia Keller"),
                        ("fdp4", "Robert Wagner"),
                    ],
                ),
                sample_party(
                    "svp",
                    "SVP - Schweizerische Volkspartei",
                    "darkgreen",
                    &[
                        ("svp1", "Beat Zimmermann"),
                        ("svp2", "Ursula Bauer"),
                        ("svp3", "Stefan Huber"),
                        ("svp4", "Claudia Meyer"),
                    ],
                ),
                sample_party(
                    "gruene",
                    "GRÜNE",
                    "green",
                    &[
                        ("gr1", "Eva Brunner"),
                        ("gr2", "Jonas Lehmann"),
                        ("gr3", "Sophie Gerber"),
                        ("gr4", "Marc Steiner"),
                    ],
                ),
            ],
        }
    }
}

fn sample_party(id: &str, name: &str, color: &str, candidates: &[(&str, &str)]) -> Party {
    Party {
        id: PartyId::new(id),
        name: name.to_string(),
        color: Some(color.to_string()),
        candidates: candidates
            .iter()
            .map(|(cid, cname)| Candidate {
                id: CandidateId::new(cid),
                name: cname.to_string(),
                party: PartyId::new(id),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_has_four_lists_of_four() {
        let catalog = Catalog::sample();
        assert_eq!(catalog.parties().len(), 4);
        for p in catalog.parties() {
            assert_eq!(p.candidates.len(), 4);
            assert!(p.candidates.iter().all(|c| c.party == p.id));
        }
    }

    #[test]
    fn lookups() {
        let catalog = Catalog::sample();
        let c = catalog.candidate(&CandidateId::new("gr3")).unwrap();
        assert_eq!(c.name, "Sophie Gerber");
        assert_eq!(c.party, PartyId::new("gruene"));
        assert!(catalog.candidate(&CandidateId::new("gr9")).is_none());
        assert_eq!(catalog.party_name(&PartyId::new("fdp")), "FDP - Die Liberalen");
        assert_eq!(catalog.party_name(&PartyId::new("glp")), "glp");
    }
}
