//! The guided tutorial: a fixed sequence of exercises checked against the ballot.
//!
//! The tutorial only reads the ballot. Its single action on the ballot engine is a
//! full [`BallotEngine::reset`] when it starts, moves to the next exercise, finishes
//! or is cancelled.
//!
//! A solved exercise is not left immediately: the tutorial waits for
//! [`TutorialConfig::advance_delay`] so that the success can be shown. The pending
//! advance is described by a [`PendingAdvance`] ticket. Drivers either call
//! [`Tutorial::poll`] regularly, or schedule a timer and hand the ticket back to
//! [`Tutorial::fire`]. Tickets issued before a cancellation or a restart are ignored.

use log::{debug, info};
use std::time::Instant;

use crate::ballot::{BallotEngine, BallotView};
use crate::config::*;

/// The condition an exercise asks the voter to reach.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Exercise {
    /// The pre-printed list of `list`, without any change.
    KeepPrePrinted { list: PartyId },
    /// The pre-printed list of `list` with `struck` of its candidates struck.
    Strike { list: PartyId, struck: usize },
    /// The list of `list` with every line used, at least one of them by the party `added`.
    Panachage { list: PartyId, added: PartyId },
    /// A blank list with one candidate written twice.
    Cumulate,
    /// A blank list with candidates of at least `min_parties` different parties.
    MixedBlank { min_parties: usize },
}

impl Exercise {
    pub fn is_solved(&self, view: &BallotView<'_>) -> bool {
        match self {
            Exercise::KeepPrePrinted { list } => {
                let party = match view.catalog.party(list) {
                    Some(p) => p,
                    None => return false,
                };
                let printed: Vec<&CandidateId> = party
                    .candidates
                    .iter()
                    .take(view.rules.max_seats as usize)
                    .map(|c| &c.id)
                    .collect();
                let current: Vec<&CandidateId> =
                    view.entries.iter().map(|e| &e.candidate.id).collect();
                is_list(view, list)
                    && view.entries.iter().all(|e| e.count == 1)
                    && printed == current
            }
            Exercise::Strike { list, struck } => {
                let printed = match view.catalog.party(list) {
                    Some(p) => p.candidates.len().min(view.rules.max_seats as usize),
                    None => return false,
                };
                is_list(view, list)
                    && view.entries.iter().all(|e| e.candidate.party == *list)
                    && printed.checked_sub(*struck) == Some(view.entries.len())
            }
            Exercise::Panachage { list, added } => {
                is_list(view, list)
                    && view.contains_party(added)
                    && view.used_votes() == view.rules.max_seats
            }
            Exercise::Cumulate => is_blank(view) && view.entries.iter().any(|e| e.count >= 2),
            Exercise::MixedBlank { min_parties } => {
                let mut parties: Vec<&PartyId> =
                    view.entries.iter().map(|e| &e.candidate.party).collect();
                parties.sort();
                parties.dedup();
                is_blank(view) && parties.len() >= *min_parties
            }
        }
    }
}

fn is_list(view: &BallotView<'_>, pid: &PartyId) -> bool {
    matches!(view.selection, Some(ListSelection::Party(p)) if p == pid)
}

fn is_blank(view: &BallotView<'_>) -> bool {
    matches!(view.selection, Some(ListSelection::Blank))
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TutorialStep {
    pub id: String,
    pub title: String,
    pub description: String,
    pub instruction: String,
    pub hint: String,
    pub exercise: Exercise,
}

/// The exercises of the national council example, fitted to the ballot of `rules`.
///
/// They refer to the parties `sp`, `fdp` and `gruene` of [`crate::Catalog::sample`].
/// The five exercises are all present with the default rules. The cumulation exercise is
/// left out when the ballot does not allow a candidate twice.
pub fn reference_steps(rules: &BallotRules) -> Vec<TutorialStep> {
    let min_parties = rules.max_seats.min(3) as usize;
    let steps = vec![
        TutorialStep {
            id: "basic".to_string(),
            title: "Vorgedruckte Liste wählen".to_string(),
            description: "Wählen Sie die Liste der SP und behalten Sie alle Kandidaten."
                .to_string(),
            instruction:
                "Klicken Sie auf \"SP - Sozialdemokratische Partei\" bei der Listenauswahl."
                    .to_string(),
            hint: "Die vorgedruckten Kandidaten erscheinen automatisch auf Ihrem Wahlzettel."
                .to_string(),
            exercise: Exercise::KeepPrePrinted {
                list: PartyId::new("sp"),
            },
        },
        TutorialStep {
            id: "strike".to_string(),
            title: "Kandidaten streichen".to_string(),
            description: "Wählen Sie die FDP-Liste und streichen Sie einen Kandidaten."
                .to_string(),
            instruction: "Wählen Sie die FDP-Liste und entfernen Sie einen beliebigen Kandidaten."
                .to_string(),
            hint: "Streichen Sie eine Linie des Wahlzettels.".to_string(),
            exercise: Exercise::Strike {
                list: PartyId::new("fdp"),
                struck: 1,
            },
        },
        TutorialStep {
            id: "panaschieren".to_string(),
            title: "Panaschieren".to_string(),
            description: "Wählen Sie die GRÜNE-Liste und fügen Sie einen Kandidaten der SP hinzu."
                .to_string(),
            instruction: "Wählen Sie zuerst die GRÜNE-Liste, streichen Sie einen GRÜNEN-Kandidaten und fügen Sie dann einen SP-Kandidaten hinzu."
                .to_string(),
            hint: "Entfernen Sie zuerst einen Kandidaten, dann fügen Sie einen Kandidaten der SP hinzu."
                .to_string(),
            exercise: Exercise::Panachage {
                list: PartyId::new("gruene"),
                added: PartyId::new("sp"),
            },
        },
        TutorialStep {
            id: "kumulieren".to_string(),
            title: "Kumulieren".to_string(),
            description:
                "Wählen Sie eine leere Liste und fügen Sie denselben Kandidaten zweimal hinzu."
                    .to_string(),
            instruction: "Wählen Sie \"Leere Liste\", geben Sie einen Namen ein (z.B. \"Meine Liste\") und fügen Sie denselben Kandidaten zweimal hinzu."
                .to_string(),
            hint: "Fügen Sie denselben Kandidaten zweimal hinzu.".to_string(),
            exercise: Exercise::Cumulate,
        },
        TutorialStep {
            id: "mixed".to_string(),
            title: "Gemischte Liste".to_string(),
            description: format!(
                "Erstellen Sie eine leere Liste mit Kandidaten aus mindestens {} verschiedenen Parteien.",
                min_parties
            ),
            instruction: format!(
                "Wählen Sie \"Leere Liste\" und fügen Sie je einen Kandidaten von mindestens {} verschiedenen Parteien hinzu.",
                min_parties
            ),
            hint: "Wählen Sie Kandidaten aus verschiedenen Parteien aus.".to_string(),
            exercise: Exercise::MixedBlank { min_parties },
        },
    ];
    let can_cumulate = rules.max_seats >= 2 && rules.max_cumulation >= 2;
    steps
        .into_iter()
        .filter(|step| can_cumulate || step.exercise != Exercise::Cumulate)
        .enumerate()
        .map(|(idx, step)| TutorialStep {
            title: format!("Aufgabe {}: {}", idx + 1, step.title),
            ..step
        })
        .collect()
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TutorialPhase {
    Inactive,
    /// Waiting for the exercise at this index to be solved.
    Active(usize),
    /// The exercise at this index is solved, the next one follows after the delay.
    Transitioning(usize),
    Completed,
}

/// A scheduled move to the next exercise.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct PendingAdvance {
    pub step: usize,
    pub due: Instant,
    generation: u64,
}

/// What happened to the tutorial, for the renderers.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TutorialEvent {
    Started,
    /// The exercise was solved. The next one starts after the delay.
    StepSolved { step: usize, id: String },
    /// The ballot was reset and the exercise at `step` is now current.
    Advanced { step: usize },
    /// All the exercises are solved. The ballot was reset.
    Finished,
    Cancelled,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum StepStatus {
    Completed,
    Current,
    Pending,
}

/// Snapshot of the tutorial for display.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TutorialState {
    pub phase: TutorialPhase,
    pub current_step: usize,
    pub completed: Vec<String>,
    pub transitioning: bool,
}

#[derive(Debug, Clone)]
pub struct Tutorial {
    steps: Vec<TutorialStep>,
    config: TutorialConfig,
    phase: TutorialPhase,
    current_step: usize,
    completed: Vec<String>,
    pending: Option<PendingAdvance>,
    // Bumped on every start and cancellation, invalidates older tickets.
    generation: u64,
}

impl Tutorial {
    pub fn new(steps: Vec<TutorialStep>, config: &TutorialConfig) -> Tutorial {
        Tutorial {
            steps,
            config: *config,
            phase: TutorialPhase::Inactive,
            current_step: 0,
            completed: Vec::new(),
            pending: None,
            generation: 0,
        }
    }

    /// The reference exercises for the default ballot, with the default delay.
    pub fn reference() -> Tutorial {
        Tutorial::for_rules(&BallotRules::DEFAULT_RULES)
    }

    /// The reference exercises for a ballot with these rules, with the default delay.
    pub fn for_rules(rules: &BallotRules) -> Tutorial {
        Tutorial::new(reference_steps(rules), &TutorialConfig::DEFAULT_CONFIG)
    }

    /// Starts, or restarts, at the first exercise with an empty ballot.
    pub fn start(&mut self, engine: &mut BallotEngine) -> TutorialEvent {
        self.generation += 1;
        self.pending = None;
        self.completed.clear();
        self.current_step = 0;
        engine.reset();
        if self.steps.is_empty() {
            info!("tutorial: no exercise, nothing to do");
            self.phase = TutorialPhase::Completed;
            return TutorialEvent::Finished;
        }
        info!("tutorial: started with {} exercises", self.steps.len());
        self.phase = TutorialPhase::Active(0);
        TutorialEvent::Started
    }

    /// Leaves the tutorial from any phase and resets the ballot.
    /// A pending advance is dropped and will never apply.
    pub fn cancel(&mut self, engine: &mut BallotEngine) -> TutorialEvent {
        self.generation += 1;
        if let Some(p) = self.pending.take() {
            debug!("tutorial: dropping pending advance of step {}", p.step);
        }
        info!("tutorial: cancelled in phase {:?}", self.phase);
        self.phase = TutorialPhase::Inactive;
        engine.reset();
        TutorialEvent::Cancelled
    }

    /// Checks the current exercise against the ballot. Called after every change.
    ///
    /// Nothing is checked while a solved exercise waits for its advance.
    pub fn observe(&mut self, engine: &BallotEngine, now: Instant) -> Option<TutorialEvent> {
        let idx = match self.phase {
            TutorialPhase::Active(idx) => idx,
            _ => return None,
        };
        let step = self.steps.get(idx)?;
        if self.completed.contains(&step.id) || !step.exercise.is_solved(&engine.view()) {
            return None;
        }
        info!("tutorial: step {} ({}) solved", idx, step.id);
        let id = step.id.clone();
        self.completed.push(id.clone());
        self.phase = TutorialPhase::Transitioning(idx);
        self.pending = Some(PendingAdvance {
            step: idx,
            due: now + self.config.advance_delay,
            generation: self.generation,
        });
        Some(TutorialEvent::StepSolved { step: idx, id })
    }

    pub fn pending(&self) -> Option<PendingAdvance> {
        self.pending
    }

    /// Applies the pending advance if it is due.
    pub fn poll(&mut self, now: Instant, engine: &mut BallotEngine) -> Option<TutorialEvent> {
        match self.pending {
            Some(ticket) if now >= ticket.due => self.fire(&ticket, engine),
            _ => None,
        }
    }

    /// Applies a scheduled advance, unless the ticket is stale.
    pub fn fire(
        &mut self,
        ticket: &PendingAdvance,
        engine: &mut BallotEngine,
    ) -> Option<TutorialEvent> {
        let valid = self.pending.as_ref() == Some(ticket)
            && ticket.generation == self.generation
            && self.phase == TutorialPhase::Transitioning(ticket.step);
        if !valid {
            debug!("tutorial: ignoring stale advance {:?}", ticket);
            return None;
        }
        self.pending = None;
        engine.reset();
        let next = ticket.step + 1;
        if next < self.steps.len() {
            info!("tutorial: moving to step {}", next);
            self.current_step = next;
            self.phase = TutorialPhase::Active(next);
            Some(TutorialEvent::Advanced { step: next })
        } else {
            info!("tutorial: all exercises solved");
            self.phase = TutorialPhase::Completed;
            Some(TutorialEvent::Finished)
        }
    }

    pub fn phase(&self) -> TutorialPhase {
        self.phase
    }

    /// True while an exercise is shown, solved or not.
    pub fn is_active(&self) -> bool {
        matches!(
            self.phase,
            TutorialPhase::Active(_) | TutorialPhase::Transitioning(_)
        )
    }

    pub fn steps(&self) -> &[TutorialStep] {
        &self.steps
    }

    pub fn current_step(&self) -> Option<&TutorialStep> {
        if self.is_active() {
            self.steps.get(self.current_step)
        } else {
            None
        }
    }

    pub fn is_completed(&self, id: &str) -> bool {
        self.completed.iter().any(|c| c == id)
    }

    pub fn progress(&self) -> Vec<StepStatus> {
        self.steps
            .iter()
            .enumerate()
            .map(|(idx, step)| {
                if self.is_completed(&step.id) {
                    StepStatus::Completed
                } else if self.is_active() && idx == self.current_step {
                    StepStatus::Current
                } else {
                    StepStatus::Pending
                }
            })
            .collect()
    }

    pub fn state(&self) -> TutorialState {
        TutorialState {
            phase: self.phase,
            current_step: self.current_step,
            completed: self.completed.clone(),
            transitioning: matches!(self.phase, TutorialPhase::Transitioning(_)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use std::time::Duration;

    fn setup() -> (Tutorial, BallotEngine) {
        (
            Tutorial::reference(),
            BallotEngine::new(Catalog::sample(), &BallotRules::DEFAULT_RULES),
        )
    }

    fn sp() -> ListSelection {
        ListSelection::Party(PartyId::new("sp"))
    }

    #[test]
    fn inactive_tutorial_ignores_ballot() {
        let (mut t, mut e) = setup();
        e.select_list(sp()).unwrap();
        assert_eq!(t.observe(&e, Instant::now()), None);
        assert_eq!(t.phase(), TutorialPhase::Inactive);
    }

    #[test]
    fn start_resets_ballot() {
        let (mut t, mut e) = setup();
        e.select_list(sp()).unwrap();
        assert_eq!(t.start(&mut e), TutorialEvent::Started);
        assert!(e.selection().is_none());
        assert_eq!(t.phase(), TutorialPhase::Active(0));
        assert_eq!(t.current_step().unwrap().id, "basic");
    }

    #[test]
    fn solved_step_fires_once() {
        let (mut t, mut e) = setup();
        let now = Instant::now();
        t.start(&mut e);
        e.select_list(sp()).unwrap();
        assert_eq!(
            t.observe(&e, now),
            Some(TutorialEvent::StepSolved {
                step: 0,
                id: "basic".to_string()
            })
        );
        // Still solved, but the step is already transitioning.
        assert_eq!(t.observe(&e, now), None);
        assert_eq!(t.observe(&e, now + Duration::from_millis(10)), None);
        assert_eq!(t.phase(), TutorialPhase::Transitioning(0));
        assert!(t.state().transitioning);
        assert_eq!(t.progress()[0], StepStatus::Completed);
    }

    #[test]
    fn advance_waits_for_delay() {
        let (mut t, mut e) = setup();
        let now = Instant::now();
        t.start(&mut e);
        e.select_list(sp()).unwrap();
        t.observe(&e, now);
        assert_eq!(t.poll(now + Duration::from_millis(1000), &mut e), None);
        assert_eq!(e.entries().len(), 4);
        assert_eq!(
            t.poll(now + Duration::from_millis(1500), &mut e),
            Some(TutorialEvent::Advanced { step: 1 })
        );
        assert!(e.selection().is_none());
        assert_eq!(t.phase(), TutorialPhase::Active(1));
        assert_eq!(t.progress()[1], StepStatus::Current);
    }

    #[test]
    fn cancelled_advance_never_applies() {
        let (mut t, mut e) = setup();
        let now = Instant::now();
        t.start(&mut e);
        e.select_list(sp()).unwrap();
        t.observe(&e, now);
        let ticket = t.pending().unwrap();
        assert_eq!(t.cancel(&mut e), TutorialEvent::Cancelled);
        e.select_list(ListSelection::Blank).unwrap();
        assert_eq!(t.fire(&ticket, &mut e), None);
        assert_eq!(t.poll(now + Duration::from_secs(5), &mut e), None);
        assert_eq!(t.phase(), TutorialPhase::Inactive);
        assert_eq!(e.selection(), Some(&ListSelection::Blank));
    }

    #[test]
    fn restart_invalidates_old_ticket() {
        let (mut t, mut e) = setup();
        let now = Instant::now();
        t.start(&mut e);
        e.select_list(sp()).unwrap();
        t.observe(&e, now);
        let ticket = t.pending().unwrap();
        t.start(&mut e);
        e.select_list(sp()).unwrap();
        assert_eq!(t.fire(&ticket, &mut e), None);
        assert_eq!(t.phase(), TutorialPhase::Active(0));
    }

    #[test]
    fn last_step_completes() {
        let steps = vec![TutorialStep {
            id: "only".to_string(),
            title: String::new(),
            description: String::new(),
            instruction: String::new(),
            hint: String::new(),
            exercise: Exercise::Cumulate,
        }];
        let config = TutorialConfig {
            advance_delay: Duration::from_millis(0),
        };
        let mut t = Tutorial::new(steps, &config);
        let mut e = BallotEngine::new(Catalog::sample(), &BallotRules::DEFAULT_RULES);
        let now = Instant::now();
        t.start(&mut e);
        e.select_list(ListSelection::Blank).unwrap();
        e.add_candidate(&CandidateId::new("sp1")).unwrap();
        assert_eq!(t.observe(&e, now), None);
        e.add_candidate(&CandidateId::new("sp1")).unwrap();
        assert!(t.observe(&e, now).is_some());
        assert_eq!(t.poll(now, &mut e), Some(TutorialEvent::Finished));
        assert_eq!(t.phase(), TutorialPhase::Completed);
        assert!(!t.is_active());
        assert!(e.entries().is_empty());
    }

    #[test]
    fn keep_preprinted_requires_unchanged_list() {
        let (_, mut e) = setup();
        let ex = Exercise::KeepPrePrinted {
            list: PartyId::new("sp"),
        };
        e.select_list(sp()).unwrap();
        assert!(ex.is_solved(&e.view()));
        e.remove_candidate(1).unwrap();
        assert!(!ex.is_solved(&e.view()));
        e.add_candidate(&CandidateId::new("sp2")).unwrap();
        // Same candidates, different order.
        assert!(!ex.is_solved(&e.view()));
    }

    #[test]
    fn mixed_blank_counts_parties() {
        let (_, mut e) = setup();
        let ex = Exercise::MixedBlank { min_parties: 3 };
        e.select_list(ListSelection::Blank).unwrap();
        for c in ["sp1", "sp2", "fdp1"] {
            e.add_candidate(&CandidateId::new(c)).unwrap();
        }
        assert!(!ex.is_solved(&e.view()));
        e.add_candidate(&CandidateId::new("svp1")).unwrap();
        assert!(ex.is_solved(&e.view()));
    }

    #[test]
    fn strike_needs_a_struck_candidate() {
        let rules = BallotRules {
            max_seats: 3,
            ..BallotRules::DEFAULT_RULES
        };
        let mut e = BallotEngine::new(Catalog::sample(), &rules);
        let ex = Exercise::Strike {
            list: PartyId::new("fdp"),
            struck: 1,
        };
        e.select_list(ListSelection::Party(PartyId::new("fdp")))
            .unwrap();
        assert_eq!(e.entries().len(), 3);
        assert!(!ex.is_solved(&e.view()));
        e.remove_candidate(2).unwrap();
        assert!(ex.is_solved(&e.view()));
        // A foreign candidate on the struck line is panachage, not striking.
        e.add_candidate(&CandidateId::new("sp1")).unwrap();
        e.remove_candidate(0).unwrap();
        assert!(!ex.is_solved(&e.view()));
    }

    #[test]
    fn panachage_needs_a_full_ballot() {
        let rules = BallotRules {
            max_seats: 3,
            ..BallotRules::DEFAULT_RULES
        };
        let mut e = BallotEngine::new(Catalog::sample(), &rules);
        let ex = Exercise::Panachage {
            list: PartyId::new("gruene"),
            added: PartyId::new("sp"),
        };
        e.select_list(ListSelection::Party(PartyId::new("gruene")))
            .unwrap();
        e.remove_candidate(0).unwrap();
        assert!(!ex.is_solved(&e.view()));
        e.add_candidate(&CandidateId::new("sp1")).unwrap();
        assert!(ex.is_solved(&e.view()));
    }

    #[test]
    fn reference_steps_follow_the_rules() {
        let steps = reference_steps(&BallotRules::DEFAULT_RULES);
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[4].title, "Aufgabe 5: Gemischte Liste");
        assert_eq!(steps[4].exercise, Exercise::MixedBlank { min_parties: 3 });

        let single = BallotRules {
            max_seats: 1,
            ..BallotRules::DEFAULT_RULES
        };
        let steps = reference_steps(&single);
        let ids: Vec<&str> = steps.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["basic", "strike", "panaschieren", "mixed"]);
        assert_eq!(steps[3].title, "Aufgabe 4: Gemischte Liste");
        assert_eq!(steps[3].exercise, Exercise::MixedBlank { min_parties: 1 });
    }
}
