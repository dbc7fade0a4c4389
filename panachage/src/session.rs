//! One interactive session: the ballot engine and the tutorial, driven by commands.

use log::debug;
use std::time::Instant;

use crate::ballot::BallotEngine;
use crate::config::*;
use crate::tutorial::{Tutorial, TutorialEvent};

/// The actions a voter can take.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Command {
    SelectList(ListSelection),
    SetCustomListName(String),
    AddCandidate(CandidateId),
    /// Strikes a ballot line (0-based).
    RemoveLine(usize),
    Reset,
    ShowResults,
    StartTutorial,
    StopTutorial,
}

/// The state of one session. Every change of the ballot goes through [`Session::apply`],
/// which then lets the tutorial check its current exercise.
#[derive(Debug, Clone)]
pub struct Session {
    engine: BallotEngine,
    tutorial: Tutorial,
}

impl Session {
    pub fn new(engine: BallotEngine, tutorial: Tutorial) -> Session {
        Session { engine, tutorial }
    }

    /// Applies a command at time `now`.
    ///
    /// A refused command leaves the session unchanged and returns the reason.
    /// Otherwise, the events of the tutorial caused by the command are returned.
    pub fn apply(
        &mut self,
        command: Command,
        now: Instant,
    ) -> Result<Vec<TutorialEvent>, BallotError> {
        debug!("apply: {:?}", command);
        let mut events: Vec<TutorialEvent> = Vec::new();
        match command {
            Command::SelectList(selection) => self.engine.select_list(selection)?,
            Command::SetCustomListName(text) => self.engine.set_custom_list_name(&text),
            Command::AddCandidate(cid) => self.engine.add_candidate(&cid)?,
            Command::RemoveLine(index) => {
                self.engine.remove_candidate(index)?;
            }
            Command::Reset => self.engine.reset(),
            Command::ShowResults => {
                if self.tutorial.is_active() {
                    return Err(BallotError::TallyLockedDuringTutorial);
                }
                self.engine.show_results();
            }
            Command::StartTutorial => events.push(self.tutorial.start(&mut self.engine)),
            Command::StopTutorial => events.push(self.tutorial.cancel(&mut self.engine)),
        }
        // The ballot changed.
        events.extend(self.tutorial.observe(&self.engine, now));
        Ok(events)
    }

    /// Lets time pass: applies a due tutorial advance.
    pub fn tick(&mut self, now: Instant) -> Option<TutorialEvent> {
        self.tutorial.poll(now, &mut self.engine)
    }

    pub fn engine(&self) -> &BallotEngine {
        &self.engine
    }

    pub fn tutorial(&self) -> &Tutorial {
        &self.tutorial
    }

    /// The tally and the seats, when the results are displayed.
    pub fn results(&self) -> Option<(TallyResult, SeatDistribution)> {
        self.engine.results()
    }
}
