// The printable ballot: a standalone HTML document.

use chrono::NaiveDate;

use panachage::*;

const STYLE: &str = r#"
    body { font-family: Arial, sans-serif; margin: 40px; }
    .header { text-align: center; margin-bottom: 30px; }
    .header h1 { font-size: 24px; margin-bottom: 10px; }
    .list-name { font-size: 18px; margin-bottom: 20px; }
    .candidate-line { display: flex; padding: 8px 0; border-bottom: 1px solid #ccc; }
    .line-number { width: 30px; }
    .candidate-name { flex: 1; }
    .footer { margin-top: 30px; padding-top: 20px; border-top: 2px solid #ccc; }
    .results { margin-top: 40px; padding: 20px; background-color: #f9f9f9; border: 1px solid #ddd; }
    .results table { width: 100%; border-collapse: collapse; }
    .results th, .results td { padding: 8px; text-align: left; border-bottom: 1px solid #ddd; }
    .results .seats { font-weight: bold; text-align: center; }
    @media print { body { margin: 0; } }
"#;

const BLANK_RULE: &str = "_________________________________";

/// Escapes the characters with a meaning in HTML text and attributes.
pub fn escape_html(text: &str) -> String {
    let mut res = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => res.push_str("&amp;"),
            '<' => res.push_str("&lt;"),
            '>' => res.push_str("&gt;"),
            '"' => res.push_str("&quot;"),
            '\'' => res.push_str("&#39;"),
            _ => res.push(c),
        }
    }
    res
}

// The list printed on top of the ballot. A blank list without a name has none.
fn printed_list_name(engine: &BallotEngine) -> Option<String> {
    match engine.selection() {
        Some(ListSelection::Party(pid)) => Some(engine.catalog().party_name(pid)),
        Some(ListSelection::Blank) if !engine.custom_list_name().is_empty() => {
            Some(engine.custom_list_name().to_string())
        }
        _ => None,
    }
}

/// Renders the ballot and the seat table computed from it.
///
/// The numbers are the ones of [`compute_tally`] and [`compute_seats`], so they match
/// the results shown in the terminal.
pub fn render_document(engine: &BallotEngine, date: NaiveDate) -> String {
    let max_seats = engine.rules().max_seats;
    let catalog = engine.catalog();
    let tally = engine.tally();
    let seats = compute_seats(&tally, catalog.parties(), max_seats);

    let mut doc = String::new();
    doc.push_str(&format!(
        "<!DOCTYPE html>\n<html lang=\"de\">\n<head>\n<meta charset=\"utf-8\">\n<title>Wahlzettel</title>\n<style>{}</style>\n</head>\n<body>\n",
        STYLE
    ));
    doc.push_str(&format!(
        "<div class=\"header\">\n<h1>WAHLZETTEL</h1>\n<p>Nationalratswahl - {} Sitze</p>\n<p>Datum: {}</p>\n</div>\n",
        max_seats,
        date.format("%d.%m.%Y")
    ));
    if let Some(name) = printed_list_name(engine) {
        doc.push_str(&format!(
            "<div class=\"list-name\"><strong>Liste: {}</strong></div>\n",
            escape_html(&name)
        ));
    }

    doc.push_str("<div class=\"candidates\">\n");
    for (idx, line) in engine.lines().iter().enumerate() {
        let text = match line {
            Some(entry) => {
                let cumulated = if entry.count > 1 {
                    format!(" {}x", entry.count)
                } else {
                    String::new()
                };
                format!(
                    "{} ({}){}",
                    escape_html(&entry.candidate.name),
                    escape_html(&catalog.party_name(&entry.candidate.party)),
                    cumulated
                )
            }
            None => BLANK_RULE.to_string(),
        };
        doc.push_str(&format!(
            "<div class=\"candidate-line\"><span class=\"line-number\">{}.</span><span class=\"candidate-name\">{}</span></div>\n",
            idx + 1,
            text
        ));
    }
    doc.push_str("</div>\n");

    doc.push_str(&format!(
        "<div class=\"footer\">\n<p>Verwendete Stimmen: {} / {}</p>\n<p>Leere Linien: {}</p>\n</div>\n",
        engine.used_votes(),
        max_seats,
        engine.empty_lines()
    ));

    doc.push_str("<div class=\"results\">\n<h2>Sitzverteilung (basierend auf diesem Wahlzettel)</h2>\n<table>\n");
    doc.push_str("<thead><tr><th>Partei</th><th>Stimmen</th><th>Stimmenanteil</th><th class=\"seats\">Sitze</th></tr></thead>\n<tbody>\n");
    for party in catalog.parties() {
        let votes = tally.party(&party.id);
        if votes == 0 {
            continue;
        }
        doc.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{:.1}%</td><td class=\"seats\">{}</td></tr>\n",
            escape_html(&party.name),
            votes,
            tally.vote_share(&party.id),
            seats.seats_for(&party.id)
        ));
    }
    doc.push_str("</tbody>\n</table>\n");
    doc.push_str("<p>Hinweis: Die Sitzverteilung eines einzelnen Wahlzettels dient nur der Veranschaulichung.</p>\n</div>\n");
    doc.push_str("</body>\n</html>\n");
    doc
}
