use log::{debug, info, warn};

use panachage::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::io::Read;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

mod print_view;
mod reference_data;
mod render;

#[derive(Debug, Snafu)]
pub enum TerminalError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading the commands from the standard input"))]
    ReadingInput { source: std::io::Error },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing line {lineno} of the CSV file"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Line {lineno} of the CSV file is too short"))]
    CsvLineTooShort { lineno: usize },
    #[snafu(display("Invalid reference data"))]
    InvalidCatalog { source: CatalogError },
    #[snafu(display("Line {lineno}: unknown command {line:?}"))]
    UnknownCommand { lineno: usize, line: String },
    #[snafu(display("Line {lineno}: missing argument for {command}"))]
    MissingArgument { lineno: usize, command: String },
    #[snafu(display("Line {lineno}: invalid number {value:?}"))]
    InvalidNumber { lineno: usize, value: String },
    #[snafu(display("Difference detected between the ballot summary and the reference {path}"))]
    ReferenceMismatch { path: String },
}

pub type TerminalResult<T> = Result<T, TerminalError>;

/// One line of a command script.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ScriptLine {
    Apply(Command),
    /// Lets time pass on the session clock.
    Wait(Duration),
    /// Prints the ballot.
    Show,
}

/// Parses one line of a command script. Comments and empty lines give `None`.
///
/// `lineno` starts at 1 and is only used for the error messages.
pub fn parse_line(line: &str, lineno: usize) -> TerminalResult<Option<ScriptLine>> {
    let text = match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
    .trim();
    if text.is_empty() {
        return Ok(None);
    }
    let (keyword, rest) = match text.split_once(char::is_whitespace) {
        Some((k, r)) => (k, r.trim()),
        None => (text, ""),
    };
    let argument = |command: &str| -> TerminalResult<String> {
        if rest.is_empty() {
            MissingArgumentSnafu { lineno, command }.fail()
        } else {
            Ok(rest.to_string())
        }
    };
    let res = match keyword {
        "select" => {
            let list = argument(keyword)?;
            let selection = if list == "blank" {
                ListSelection::Blank
            } else {
                ListSelection::Party(PartyId::new(&list))
            };
            ScriptLine::Apply(Command::SelectList(selection))
        }
        "name" => ScriptLine::Apply(Command::SetCustomListName(rest.to_string())),
        "add" => ScriptLine::Apply(Command::AddCandidate(CandidateId::new(&argument(
            keyword,
        )?))),
        "remove" => {
            let value = argument(keyword)?;
            // The lines are numbered from 1 in scripts.
            let index = value
                .parse::<usize>()
                .ok()
                .filter(|n| *n >= 1)
                .context(InvalidNumberSnafu {
                    lineno,
                    value: value.as_str(),
                })?;
            ScriptLine::Apply(Command::RemoveLine(index - 1))
        }
        "reset" => ScriptLine::Apply(Command::Reset),
        "tally" => ScriptLine::Apply(Command::ShowResults),
        "tutorial" => match argument(keyword)?.as_str() {
            "start" => ScriptLine::Apply(Command::StartTutorial),
            "stop" => ScriptLine::Apply(Command::StopTutorial),
            _ => return UnknownCommandSnafu { lineno, line: text }.fail(),
        },
        "wait" => {
            let value = argument(keyword)?;
            let millis = value.parse::<u64>().ok().context(InvalidNumberSnafu {
                lineno,
                value: value.as_str(),
            })?;
            ScriptLine::Wait(Duration::from_millis(millis))
        }
        "show" => ScriptLine::Show,
        _ => return UnknownCommandSnafu { lineno, line: text }.fail(),
    };
    Ok(Some(res))
}

/// Plays a command script against the session.
///
/// The session runs on a simulated clock that starts at `start` and only moves with
/// `wait`, so that the pauses of the tutorial are reproducible. Refused commands are
/// reported and the script goes on. Returns the messages for the voter.
pub fn replay(session: &mut Session, script: &str, start: Instant) -> TerminalResult<Vec<String>> {
    let mut messages: Vec<String> = Vec::new();
    let mut elapsed = Duration::ZERO;
    for (idx, line) in script.lines().enumerate() {
        let lineno = idx + 1;
        let script_line = match parse_line(line, lineno)? {
            Some(x) => x,
            None => continue,
        };
        debug!("replay: line {}: {:?}", lineno, script_line);
        match script_line {
            ScriptLine::Wait(d) => {
                elapsed += d;
                if let Some(ev) = session.tick(start + elapsed) {
                    messages.push(render::event_message(&ev, session.tutorial()));
                }
            }
            ScriptLine::Show => messages.push(render::ballot_view(session.engine())),
            ScriptLine::Apply(command) => {
                let now = start + elapsed;
                if let Some(ev) = session.tick(now) {
                    messages.push(render::event_message(&ev, session.tutorial()));
                }
                let shows_results = command == Command::ShowResults;
                match session.apply(command, now) {
                    Ok(events) => {
                        for ev in events.iter() {
                            messages.push(render::event_message(ev, session.tutorial()));
                        }
                    }
                    Err(e) => {
                        warn!("line {}: command refused: {}", lineno, e);
                        messages.push(format!("Nicht möglich (Zeile {}): {}", lineno, e));
                    }
                }
                if let (true, Some((tally, seats))) = (shows_results, session.results()) {
                    messages.push(render::results_view(
                        session.engine().catalog(),
                        &tally,
                        &seats,
                    ));
                }
            }
        }
    }
    Ok(messages)
}

/// The final state of the session in JSON.
pub fn build_summary_js(session: &Session) -> JSValue {
    let engine = session.engine();
    let catalog = engine.catalog();
    let tally = engine.tally();
    let seats = compute_seats(&tally, catalog.parties(), engine.rules().max_seats);

    let list: JSValue = match engine.selection() {
        Some(ListSelection::Party(pid)) => json!(pid.as_str()),
        Some(ListSelection::Blank) => json!("blank"),
        None => JSValue::Null,
    };
    let entries: Vec<JSValue> = engine
        .entries()
        .iter()
        .map(|e| {
            json!({
                "candidate": e.candidate.id.as_str(),
                "name": e.candidate.name,
                "party": e.candidate.party.as_str(),
                "count": e.count,
            })
        })
        .collect();
    let candidates: Vec<JSValue> = tally
        .ranked_candidates()
        .iter()
        .map(|(cid, votes)| json!({"candidate": cid.as_str(), "votes": votes}))
        .collect();
    let parties: Vec<JSValue> = catalog
        .parties()
        .iter()
        .map(|p| {
            json!({
                "party": p.id.as_str(),
                "votes": tally.party(&p.id),
                "share": format!("{:.1}", tally.vote_share(&p.id)),
                "seats": seats.seats_for(&p.id),
            })
        })
        .collect();
    let tutorial = session.tutorial().state();

    json!({
        "ballot": {
            "list": list,
            "listName": engine.list_label(),
            "entries": entries,
            "usedVotes": engine.used_votes(),
            "emptyLines": engine.empty_lines(),
        },
        "results": {
            "candidates": candidates,
            "parties": parties,
            "listVotes": tally.list_votes,
            "totalVotes": tally.total_votes(),
            "seats": seats.total(),
        },
        "tutorial": {
            "phase": format!("{:?}", tutorial.phase),
            "completed": tutorial.completed,
        },
    })
}

fn read_summary(path: &str) -> TerminalResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    debug!("read content: {:?}", contents);
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

fn read_script(args: &Args) -> TerminalResult<String> {
    match &args.input {
        Some(path) => fs::read_to_string(path).context(OpeningFileSnafu { path }),
        None => {
            let mut script = String::new();
            std::io::stdin()
                .read_to_string(&mut script)
                .context(ReadingInputSnafu {})?;
            Ok(script)
        }
    }
}

pub fn run(args: &Args) -> TerminalResult<()> {
    let catalog = match &args.parties {
        Some(path) => reference_data::read_catalog(path)?,
        None => Catalog::sample(),
    };
    info!("Using {} parties", catalog.parties().len());
    let rules = BallotRules {
        max_seats: args
            .max_seats
            .unwrap_or(BallotRules::DEFAULT_RULES.max_seats),
        ..BallotRules::DEFAULT_RULES
    };
    debug!("rules: {:?}", rules);

    let script = read_script(args)?;
    let mut session = Session::new(
        BallotEngine::new(catalog, &rules),
        Tutorial::for_rules(&rules),
    );
    let messages = replay(&mut session, &script, Instant::now())?;
    for m in messages {
        println!("{}", m);
    }

    let summary = build_summary_js(&session);
    let pretty_js_stats = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;
    match args.out.as_deref() {
        Some("stdout") => println!("{}", pretty_js_stats),
        Some(path) => {
            info!("Writing the ballot summary to {:?}", path);
            fs::write(path, &pretty_js_stats).context(WritingFileSnafu { path })?;
        }
        None => {}
    }

    if let Some(path) = &args.print {
        let doc = print_view::render_document(session.engine(), chrono::Local::now().date_naive());
        info!("Writing the printable ballot to {:?}", path);
        fs::write(path, doc).context(WritingFileSnafu { path })?;
    }

    // The reference summary, if provided for comparison
    if let Some(path) = &args.reference {
        let summary_ref = read_summary(path)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            return ReferenceMismatchSnafu { path }.fail();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(
            BallotEngine::new(Catalog::sample(), &BallotRules::DEFAULT_RULES),
            Tutorial::reference(),
        )
    }

    #[test]
    fn parse_commands() {
        assert_eq!(parse_line("", 1).unwrap(), None);
        assert_eq!(parse_line("   # only a comment", 1).unwrap(), None);
        assert_eq!(
            parse_line("select sp  # the SP list", 1).unwrap(),
            Some(ScriptLine::Apply(Command::SelectList(ListSelection::Party(
                PartyId::new("sp")
            ))))
        );
        assert_eq!(
            parse_line("select blank", 1).unwrap(),
            Some(ScriptLine::Apply(Command::SelectList(ListSelection::Blank)))
        );
        assert_eq!(
            parse_line("name Meine  Liste", 1).unwrap(),
            Some(ScriptLine::Apply(Command::SetCustomListName(
                "Meine  Liste".to_string()
            )))
        );
        assert_eq!(
            parse_line("remove 2", 1).unwrap(),
            Some(ScriptLine::Apply(Command::RemoveLine(1)))
        );
        assert_eq!(
            parse_line("wait 1500", 1).unwrap(),
            Some(ScriptLine::Wait(Duration::from_millis(1500)))
        );
        assert_eq!(
            parse_line("tally", 1).unwrap(),
            Some(ScriptLine::Apply(Command::ShowResults))
        );
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(
            parse_line("remove 0", 3),
            Err(TerminalError::InvalidNumber { lineno: 3, .. })
        ));
        assert!(matches!(
            parse_line("add", 4),
            Err(TerminalError::MissingArgument { lineno: 4, .. })
        ));
        assert!(matches!(
            parse_line("vote sp", 5),
            Err(TerminalError::UnknownCommand { lineno: 5, .. })
        ));
        assert!(matches!(
            parse_line("tutorial pause", 6),
            Err(TerminalError::UnknownCommand { lineno: 6, .. })
        ));
    }

    #[test]
    fn replay_reports_refusals_and_goes_on() {
        let mut s = session();
        let script = "select svp\nadd sp1\nremove 1\nremove 1\nadd sp1\nadd sp1\nadd sp1\ntally\n";
        let messages = replay(&mut s, script, Instant::now()).unwrap();
        assert_eq!(messages.len(), 3);
        assert!(messages[0].starts_with("Nicht möglich (Zeile 2)"));
        assert!(messages[1].starts_with("Nicht möglich (Zeile 7)"));
        assert!(messages[2].starts_with("Ergebnisse"));
        let entries = s.engine().entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].count, 2);
        assert_eq!(s.engine().used_votes(), 4);
    }

    #[test]
    fn replay_waits_for_the_tutorial() {
        let mut s = session();
        let script = "tutorial start\nselect sp\nwait 1000\nwait 500\nshow\n";
        let messages = replay(&mut s, script, Instant::now()).unwrap();
        assert!(messages[0].starts_with("Tutorial gestartet"));
        assert_eq!(messages[1], "Aufgabe 1 gelöst!");
        assert!(messages[2].starts_with("Schritt 2 von 5"));
        assert!(messages[3].starts_with("Liste: (keine Liste gewählt)"));
        assert!(s.engine().entries().is_empty());
    }

    #[test]
    fn tutorial_on_a_three_seat_ballot() {
        let rules = BallotRules {
            max_seats: 3,
            ..BallotRules::DEFAULT_RULES
        };
        let mut s = Session::new(
            BallotEngine::new(Catalog::sample(), &rules),
            Tutorial::for_rules(&rules),
        );
        let script = "tutorial start\n\
                      select sp\nwait 1500\n\
                      select fdp\nremove 1\nwait 1500\n\
                      select gruene\nremove 1\nadd sp1\nwait 1500\n";
        let messages = replay(&mut s, script, Instant::now()).unwrap();
        assert!(messages.contains(&"Aufgabe 2 gelöst!".to_string()));
        assert!(messages.contains(&"Aufgabe 3 gelöst!".to_string()));
        assert!(messages.last().unwrap().starts_with("Schritt 4 von 5"));
    }

    #[test]
    fn summary_of_a_panachage_ballot() {
        let mut s = session();
        let script = "select gruene\nremove 3\nadd fdp4\n";
        replay(&mut s, script, Instant::now()).unwrap();
        let js = build_summary_js(&s);
        assert_eq!(js["ballot"]["list"], json!("gruene"));
        assert_eq!(js["ballot"]["usedVotes"], json!(4));
        assert_eq!(js["ballot"]["entries"][3]["candidate"], json!("fdp4"));
        assert_eq!(js["results"]["listVotes"], json!(0));
        assert_eq!(js["results"]["totalVotes"], json!(4));
        assert_eq!(js["results"]["seats"], json!(4));
        let parties = js["results"]["parties"].as_array().unwrap();
        assert_eq!(parties[1]["party"], json!("fdp"));
        assert_eq!(parties[1]["votes"], json!(1));
        assert_eq!(parties[1]["share"], json!("25.0"));
        assert_eq!(parties[3]["seats"], json!(3));
        assert_eq!(js["tutorial"]["phase"], json!("Inactive"));
    }
}
