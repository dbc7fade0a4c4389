// Readers for the party catalog.

use std::fs;

use panachage::builder::Builder;
use panachage::{Candidate, CandidateId, Catalog, Party, PartyId};

use crate::terminal::*;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: String,
    pub name: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PartyRecord {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    #[serde(default)]
    pub candidates: Vec<CandidateRecord>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub parties: Vec<PartyRecord>,
}

/// Reads a catalog, in CSV if the file name ends with `.csv` and in JSON otherwise.
pub fn read_catalog(path: &str) -> TerminalResult<Catalog> {
    info!("Reading the reference data from {:?}", path);
    if path.to_lowercase().ends_with(".csv") {
        read_csv_catalog(path)
    } else {
        let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
        parse_json_catalog(&contents)
    }
}

pub fn parse_json_catalog(contents: &str) -> TerminalResult<Catalog> {
    let file: CatalogFile = serde_json::from_str(contents).context(ParsingJsonSnafu {})?;
    debug!("parse_json_catalog: {:?}", file);
    let mut builder = Builder::new();
    for p in file.parties.iter() {
        let party = Party {
            id: PartyId::new(&p.id),
            name: p.name.clone(),
            color: p.color.clone(),
            candidates: p
                .candidates
                .iter()
                .map(|c| Candidate {
                    id: CandidateId::new(&c.id),
                    name: c.name.clone(),
                    party: PartyId::new(&p.id),
                })
                .collect(),
        };
        builder.add_party(&party).context(InvalidCatalogSnafu {})?;
    }
    builder.build().context(InvalidCatalogSnafu {})
}

fn read_csv_catalog(path: &str) -> TerminalResult<Catalog> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    parse_csv_records(rdr)
}

fn csv_field(line: &csv::StringRecord, idx: usize, lineno: usize) -> TerminalResult<&str> {
    line.get(idx)
        .map(|s| s.trim())
        .context(CsvLineTooShortSnafu { lineno })
}

/// Builds a catalog from the rows `partyId,partyName,candidateId,candidateName`.
///
/// The parties are kept in the order of their first row.
pub fn parse_csv_records<R: std::io::Read>(rdr: csv::Reader<R>) -> TerminalResult<Catalog> {
    let mut builder = Builder::new();
    let mut seen_parties: Vec<String> = Vec::new();
    for (idx, record) in rdr.into_records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = record.context(CsvLineParseSnafu { lineno })?;
        debug!("parse_csv_records: lineno: {:?} row: {:?}", lineno, line);
        let party_id = csv_field(&line, 0, lineno)?;
        if !seen_parties.iter().any(|p| p == party_id) {
            builder = builder
                .party(party_id, csv_field(&line, 1, lineno)?)
                .context(InvalidCatalogSnafu {})?;
            seen_parties.push(party_id.to_string());
        }
        builder
            .add_candidate(party_id, csv_field(&line, 2, lineno)?, csv_field(&line, 3, lineno)?)
            .context(InvalidCatalogSnafu {})?;
    }
    builder.build().context(InvalidCatalogSnafu {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use panachage::CatalogError;

    #[test]
    fn json_catalog() {
        let js = r#"{"parties": [
            {"id": "a", "name": "Liste A", "color": "red",
             "candidates": [{"id": "a1", "name": "Alice"}, {"id": "a2", "name": "Anton"}]},
            {"id": "b", "name": "Liste B", "candidates": [{"id": "b1", "name": "Berta"}]}
        ]}"#;
        let catalog = parse_json_catalog(js).unwrap();
        assert_eq!(catalog.parties().len(), 2);
        let a = catalog.party(&PartyId::new("a")).unwrap();
        assert_eq!(a.color, Some("red".to_string()));
        assert_eq!(a.candidates.len(), 2);
        assert_eq!(catalog.party(&PartyId::new("b")).unwrap().color, None);
        let b1 = catalog.candidate(&CandidateId::new("b1")).unwrap();
        assert_eq!(b1.party, PartyId::new("b"));
    }

    #[test]
    fn json_catalog_rejects_duplicates() {
        let js = r#"{"parties": [
            {"id": "a", "name": "A", "candidates": [{"id": "x", "name": "X"}]},
            {"id": "b", "name": "B", "candidates": [{"id": "x", "name": "Y"}]}
        ]}"#;
        match parse_json_catalog(js) {
            Err(TerminalError::InvalidCatalog { source }) => {
                assert_eq!(source, CatalogError::DuplicateCandidate(CandidateId::new("x")))
            }
            x => panic!("unexpected result {:?}", x),
        }
        assert!(matches!(
            parse_json_catalog(r#"{"parties": []}"#),
            Err(TerminalError::InvalidCatalog { .. })
        ));
        assert!(matches!(
            parse_json_catalog("{"),
            Err(TerminalError::ParsingJson { .. })
        ));
    }

    #[test]
    fn csv_catalog_keeps_first_appearance_order() {
        let data = "partyId,partyName,candidateId,candidateName\n\
                    b,Liste B,b1,Berta\n\
                    a,Liste A,a1,Alice\n\
                    b,Liste B,b2,Bruno\n";
        let rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(data.as_bytes());
        let catalog = parse_csv_records(rdr).unwrap();
        let ids: Vec<&str> = catalog.parties().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(catalog.parties()[0].candidates.len(), 2);
    }

    #[test]
    fn csv_short_line() {
        let data = "partyId,partyName,candidateId,candidateName\na,Liste A,a1\n";
        let rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(data.as_bytes());
        assert!(matches!(
            parse_csv_records(rdr),
            Err(TerminalError::CsvLineTooShort { lineno: 2 })
        ));
    }
}
