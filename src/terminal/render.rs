// Plain-text views of the session.

use panachage::tutorial::StepStatus;
use panachage::*;

const BLANK_LINE: &str = "____________________";

pub fn ballot_view(engine: &BallotEngine) -> String {
    let mut res: Vec<String> = Vec::new();
    match engine.list_label() {
        Some(label) => res.push(format!("Liste: {}", label)),
        None => res.push("Liste: (keine Liste gewählt)".to_string()),
    }
    for (idx, line) in engine.lines().iter().enumerate() {
        match line {
            Some(entry) => {
                let mut text = format!(
                    "{:>2}. {} ({})",
                    idx + 1,
                    entry.candidate.name,
                    engine.catalog().party_name(&entry.candidate.party)
                );
                if entry.count > 1 {
                    text.push_str(&format!(" {}x", entry.count));
                }
                res.push(text);
            }
            None => res.push(format!("{:>2}. {}", idx + 1, BLANK_LINE)),
        }
    }
    res.push(format!(
        "Verwendete Stimmen: {} / {}",
        engine.used_votes(),
        engine.rules().max_seats
    ));
    res.push(format!("Leere Linien: {}", engine.empty_lines()));
    res.join("\n")
}

/// The candidate votes, the party votes and the seats.
pub fn results_view(
    catalog: &Catalog,
    tally: &TallyResult,
    seats: &SeatDistribution,
) -> String {
    let mut res: Vec<String> = vec!["Ergebnisse".to_string(), "Kandidatenstimmen:".to_string()];
    let ranked = tally.ranked_candidates();
    if ranked.is_empty() {
        res.push("  (keine)".to_string());
    }
    for (cid, votes) in ranked {
        let name = catalog
            .candidate(&cid)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| cid.to_string());
        res.push(format!("  {}: {}", name, votes));
    }
    res.push("Parteistimmen:".to_string());
    for party in catalog.parties() {
        res.push(format!(
            "  {}: {} ({:.1}%) - {} Sitze",
            party.name,
            tally.party(&party.id),
            tally.vote_share(&party.id),
            seats.seats_for(&party.id)
        ));
    }
    if tally.list_votes > 0 {
        res.push(format!("Listenstimmen (leere Linien): {}", tally.list_votes));
    }
    res.join("\n")
}

pub fn tutorial_view(tutorial: &Tutorial) -> String {
    let state = tutorial.state();
    let mut res: Vec<String> = Vec::new();
    if let Some(step) = tutorial.current_step() {
        res.push(format!(
            "Schritt {} von {}: {}",
            state.current_step + 1,
            tutorial.steps().len(),
            step.title
        ));
        res.push(format!("  {}", step.description));
        res.push(format!("  {}", step.instruction));
        if tutorial.is_completed(&step.id) {
            res.push("  Richtig! Weiter zur nächsten Aufgabe...".to_string());
        } else {
            res.push(format!("  Tipp: {}", step.hint));
        }
    }
    for (step, status) in tutorial.steps().iter().zip(tutorial.progress()) {
        let marker = match status {
            StepStatus::Completed => "[x]",
            StepStatus::Current => "[>]",
            StepStatus::Pending => "[ ]",
        };
        res.push(format!("{} {}", marker, step.title));
    }
    res.join("\n")
}

pub fn event_message(event: &TutorialEvent, tutorial: &Tutorial) -> String {
    match event {
        TutorialEvent::Started => format!("Tutorial gestartet\n{}", tutorial_view(tutorial)),
        TutorialEvent::StepSolved { step, .. } => {
            format!("Aufgabe {} gelöst!", step + 1)
        }
        TutorialEvent::Advanced { .. } => tutorial_view(tutorial),
        TutorialEvent::Finished => {
            "Gratulation! Sie haben alle Aufgaben des Tutorials gelöst.".to_string()
        }
        TutorialEvent::Cancelled => "Tutorial beendet".to_string(),
    }
}
