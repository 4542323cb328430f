/// The puzzle session state machine. A Session owns everything about the puzzle
/// being played: the guess buffer, the history, the phase, the blur level and the
/// letters learned so far. It never touches storage itself; profile changes go
/// through its Gateway.
///
/// Submitting a guess is split in two so the word can be checked without holding
/// the session: `begin_submission` reserves the single in-flight slot and
/// `complete_submission` applies the validator's verdict. Anything that loads a
/// new puzzle bumps the generation, and verdicts from an older generation are
/// dropped.
use std::sync::Arc;

use chrono::NaiveDate;
use log::*;

use crate::error::{DataIntegrityError, PlayError};
use crate::evaluator::{self, Letter, LetterHints};
use crate::puzzle::{Catalog, PuzzleRecord};
use crate::selector;
use crate::store::{Gateway, KeyValueStore};
use crate::validator::Verdict;

pub const MAX_ATTEMPTS: usize = 6;

/// Blur radii from most obscured to fully revealed.
pub const BLUR_LEVELS: [u8; 6] = [25, 20, 15, 10, 5, 0];

/// Phase represents the current player state of a puzzle.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Phase {
    Playing,
    Won,
    Lost,
}

impl Phase {
    pub fn is_over(&self) -> bool {
        !matches!(self, Phase::Playing)
    }
}

/// `blur_level` scales the best count onto BLUR_LEVELS. A puzzle still being
/// played never reaches zero; a finished one is always fully revealed.
pub fn blur_level(phase: Phase, best_correct: usize, answer_len: usize) -> u8 {
    if phase.is_over() {
        return 0;
    }
    let steps = BLUR_LEVELS.len() - 1;
    let index = (best_correct * steps)
        .checked_div(answer_len)
        .unwrap_or(0)
        .min(steps);
    BLUR_LEVELS[index]
}

/// GuessAttempt is one accepted guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessAttempt {
    /// Unique within the session, even across resets.
    pub id: u64,
    pub word: String,
}

/// Notice is a short message for the player, such as "Not in word list".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub text: String,
}

/// PendingGuess is a submission waiting for its verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingGuess {
    pub generation: u64,
    pub word: String,
}

/// Move is the result of an accepted guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Valid { exact_matches: usize },
    Won,
    Lost,
}

/// AttemptView is a history entry with its feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptView {
    pub id: u64,
    pub word: String,
    pub letters: Vec<Letter>,
}

/// SessionView is a snapshot of everything a front end needs to draw the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub puzzle_index: usize,
    pub puzzle_id: u32,
    pub image: String,
    pub hint: Option<String>,
    pub answer_len: usize,
    pub buffer: Vec<Option<char>>,
    pub cursor: usize,
    pub history: Vec<AttemptView>,
    pub attempts: usize,
    pub attempts_left: usize,
    pub phase: Phase,
    pub blur: u8,
    pub best_correct: usize,
    pub hints: LetterHints,
    pub notice: Option<Notice>,
    pub all_complete: bool,
    pub high_contrast: bool,
    pub streak: u32,
    /// Only revealed once the puzzle is over.
    pub answer: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Session<S> {
    catalog: Arc<Catalog>,
    gateway: Gateway<S>,

    // Per puzzle
    index: usize,
    puzzle: PuzzleRecord,
    attempts: usize,
    history: Vec<GuessAttempt>,
    buffer: Vec<Option<char>>,
    cursor: usize,
    phase: Phase,
    best_correct: usize,
    hints: LetterHints,
    blur: u8,
    notice: Option<Notice>,
    pending: Option<u64>,
    // Set when the puzzle turns out to be unplayable. Nothing more is accepted
    // until another puzzle is loaded.
    halted: Option<DataIntegrityError>,

    // Per session
    all_complete: bool,
    generation: u64,
    next_id: u64,
}

impl<S: KeyValueStore> Session<S> {
    /// Creates a session on the puzzle at `index`.
    pub fn new(
        catalog: Arc<Catalog>,
        index: usize,
        gateway: Gateway<S>,
    ) -> Result<Session<S>, PlayError> {
        let puzzle = Self::puzzle_at(&catalog, index)?;
        let mut session = Session {
            catalog,
            gateway,
            index,
            puzzle,
            attempts: 0,
            history: Vec::new(),
            buffer: Vec::new(),
            cursor: 0,
            phase: Phase::Playing,
            best_correct: 0,
            hints: LetterHints::default(),
            blur: BLUR_LEVELS[0],
            notice: None,
            pending: None,
            halted: None,
            all_complete: false,
            generation: 0,
            next_id: 0,
        };
        session.clear_puzzle_state();
        Ok(session)
    }

    fn puzzle_at(catalog: &Catalog, index: usize) -> Result<PuzzleRecord, DataIntegrityError> {
        let puzzle = catalog.get(index).ok_or_else(|| {
            DataIntegrityError::new(0, format!("no puzzle at index {} of {}", index, catalog.len()))
        })?;
        if puzzle.answer.is_empty() {
            return Err(DataIntegrityError::new(puzzle.id, "answer is empty"));
        }
        Ok(puzzle.clone())
    }

    fn clear_puzzle_state(&mut self) {
        self.attempts = 0;
        self.history.clear();
        self.buffer = vec![None; self.puzzle.answer.len()];
        self.cursor = 0;
        self.phase = Phase::Playing;
        self.best_correct = 0;
        self.hints.clear();
        self.blur = blur_level(self.phase, 0, self.puzzle.answer.len());
        self.notice = None;
        // Whatever was being checked belongs to the old puzzle now.
        self.pending = None;
        self.halted = None;
        self.generation += 1;
    }

    fn load(&mut self, index: usize) -> Result<(), PlayError> {
        self.puzzle = Self::puzzle_at(&self.catalog, index)?;
        self.index = index;
        self.clear_puzzle_state();
        info!(
            "Loaded puzzle {} (index {}), {} letters",
            self.puzzle.id,
            index,
            self.puzzle.answer.len()
        );
        Ok(())
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn catalog_len(&self) -> usize {
        self.catalog.len()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn gateway_mut(&mut self) -> &mut Gateway<S> {
        &mut self.gateway
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn set_notice(&mut self, text: String) {
        let id = self.next_id();
        self.notice = Some(Notice { id, text });
    }

    /// Clears the notice, unless a newer one has replaced it.
    pub fn clear_notice(&mut self, id: u64) {
        if self.notice.as_ref().map(|n| n.id) == Some(id) {
            self.notice = None;
        }
    }

    fn reject(&mut self, err: PlayError) -> PlayError {
        self.set_notice(err.to_string());
        err
    }

    /// Fails unless the puzzle is still taking guesses.
    fn check_open(&self) -> Result<(), PlayError> {
        if let Some(e) = &self.halted {
            return Err(PlayError::Data(e.clone()));
        }
        if self.phase.is_over() {
            return Err(PlayError::GameOver);
        }
        Ok(())
    }

    /// Types a letter at the cursor. The cursor sticks at the last slot.
    pub fn type_letter(&mut self, c: char) {
        if self.check_open().is_err() || !c.is_ascii_alphabetic() || self.buffer.is_empty() {
            return;
        }
        self.buffer[self.cursor] = Some(c.to_ascii_uppercase());
        self.cursor = (self.cursor + 1).min(self.buffer.len() - 1);
        self.notice = None;
    }

    /// Clears the slot under the cursor, or the one before it when it's empty.
    pub fn backspace(&mut self) {
        if self.check_open().is_err() || self.buffer.is_empty() {
            return;
        }
        if self.buffer[self.cursor].is_some() {
            self.buffer[self.cursor] = None;
        } else if self.cursor > 0 {
            self.cursor -= 1;
            self.buffer[self.cursor] = None;
        }
    }

    /// Replaces the buffer with a whole word.
    pub fn enter_word(&mut self, word: &str) -> Result<(), PlayError> {
        self.check_open()?;
        let letters: Vec<char> = word
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        let alphabetic = letters.iter().filter(|c| c.is_ascii_alphabetic()).count();
        if alphabetic != letters.len() || letters.len() != self.buffer.len() {
            return Err(self.reject(PlayError::InputLength {
                expected: self.buffer.len(),
                actual: alphabetic,
            }));
        }

        self.buffer = letters.into_iter().map(Some).collect();
        self.cursor = self.buffer.len() - 1;
        self.notice = None;
        Ok(())
    }

    fn clear_buffer(&mut self) {
        self.buffer = vec![None; self.puzzle.answer.len()];
        self.cursor = 0;
    }

    /// Takes the in-flight slot and returns the word to check.
    pub fn begin_submission(&mut self) -> Result<PendingGuess, PlayError> {
        self.check_open()?;
        if self.pending.is_some() {
            return Err(PlayError::Busy);
        }

        let word: String = self.buffer.iter().flatten().collect();
        if word.len() != self.puzzle.answer.len() {
            return Err(self.reject(PlayError::InputLength {
                expected: self.puzzle.answer.len(),
                actual: word.len(),
            }));
        }

        self.notice = None;
        self.pending = Some(self.generation);
        Ok(PendingGuess {
            generation: self.generation,
            word,
        })
    }

    /// Enters `word` and takes the in-flight slot in one step. The buffer is only
    /// touched once the slot is known to be free, so the word checked is always
    /// this one.
    pub fn begin_guess(&mut self, word: &str) -> Result<PendingGuess, PlayError> {
        self.check_open()?;
        if self.pending.is_some() {
            return Err(PlayError::Busy);
        }
        self.enter_word(word)?;
        self.begin_submission()
    }

    /// Gives back the in-flight slot of a submission that will never complete.
    /// A slot taken by a later generation is left alone.
    pub fn abandon_submission(&mut self, generation: u64) {
        if self.pending == Some(generation) {
            debug!("Releasing abandoned submission slot");
            self.pending = None;
        }
    }

    /// Applies the verdict for a pending guess. `today` is the day a win counts for.
    pub fn complete_submission(
        &mut self,
        pending: PendingGuess,
        verdict: Verdict,
        today: NaiveDate,
    ) -> Result<Move, PlayError> {
        if pending.generation != self.generation {
            debug!("Dropping verdict for {}: the puzzle has changed", pending.word);
            return Err(PlayError::Stale);
        }
        self.pending = None;

        match verdict {
            Verdict::Valid => {}
            Verdict::NotFound => return Err(self.reject(PlayError::WordNotFound(pending.word))),
            Verdict::Unavailable(reason) => {
                return Err(self.reject(PlayError::ValidatorUnavailable {
                    word: pending.word,
                    reason,
                }))
            }
        }

        let word = pending.word.to_ascii_uppercase();
        let answer_len = self.puzzle.answer.len();
        let evaluation = match evaluator::evaluate(&word, &self.puzzle.answer) {
            Ok(evaluation) => evaluation,
            Err(reason) => {
                let err = DataIntegrityError::new(self.puzzle.id, reason);
                error!("Halting puzzle {}: {}", self.puzzle.id, err);
                self.halted = Some(err.clone());
                return Err(PlayError::Data(err));
            }
        };

        self.hints.record(&evaluation);
        if evaluation.exact_matches > self.best_correct {
            self.best_correct = evaluation.exact_matches;
            self.gateway.set_best_count(self.best_correct);
            self.blur = blur_level(self.phase, self.best_correct, answer_len);
        }

        let id = self.next_id();
        self.history.push(GuessAttempt {
            id,
            word: word.clone(),
        });

        let result = if self.puzzle.accepts(&word) {
            self.phase = Phase::Won;
            self.best_correct = answer_len;
            let streak = self.gateway.record_win(today);
            info!(
                "Puzzle {} won with {} after {} guesses, streak {}",
                self.puzzle.id,
                word,
                self.history.len(),
                streak
            );
            Move::Won
        } else {
            self.attempts += 1;
            if self.attempts >= MAX_ATTEMPTS {
                self.phase = Phase::Lost;
                info!("Puzzle {} lost, last guess {}", self.puzzle.id, word);
                Move::Lost
            } else {
                Move::Valid {
                    exact_matches: evaluation.exact_matches,
                }
            }
        };

        self.blur = blur_level(self.phase, self.best_correct, answer_len);
        self.clear_buffer();
        Ok(result)
    }

    /// Starts the current puzzle over. The stored best count goes back to zero;
    /// the streak is left alone.
    pub fn reset(&mut self) {
        self.clear_puzzle_state();
        self.gateway.set_best_count(0);
        info!("Puzzle {} reset", self.puzzle.id);
    }

    /// Moves to the next puzzle in catalog order once this one is over.
    pub fn advance(&mut self) -> Result<usize, PlayError> {
        if !self.phase.is_over() {
            return Err(PlayError::StillPlaying);
        }
        let (next, wrapped) = selector::next_index(self.index, self.catalog.len());
        self.load(next)?;
        if wrapped {
            info!("All puzzles complete, starting over");
            self.all_complete = true;
        }
        Ok(next)
    }

    /// Switches to another day's puzzle, whatever the phase. The profile is untouched.
    pub fn roll_over(&mut self, index: usize) -> Result<(), PlayError> {
        self.load(index)?;
        self.all_complete = false;
        Ok(())
    }

    pub fn view(&self, today: NaiveDate) -> SessionView {
        let profile = self.gateway.profile();
        SessionView {
            puzzle_index: self.index,
            puzzle_id: self.puzzle.id,
            image: self.puzzle.image.clone(),
            hint: self.puzzle.hint.clone(),
            answer_len: self.puzzle.answer.len(),
            buffer: self.buffer.clone(),
            cursor: self.cursor,
            history: self
                .history
                .iter()
                .map(|attempt| AttemptView {
                    id: attempt.id,
                    word: attempt.word.clone(),
                    letters: evaluator::assess(&attempt.word, &self.puzzle.answer),
                })
                .collect(),
            attempts: self.attempts,
            attempts_left: MAX_ATTEMPTS - self.attempts,
            phase: self.phase,
            blur: self.blur,
            best_correct: self.best_correct,
            hints: self.hints.clone(),
            notice: self.notice.clone(),
            all_complete: self.all_complete,
            high_contrast: profile.high_contrast,
            streak: profile.current_streak(today),
            answer: self.phase.is_over().then(|| self.puzzle.answer.clone()),
        }
    }
}

/// Read access for tests.
#[cfg(test)]
impl<S: KeyValueStore> Session<S> {
    pub fn puzzle(&self) -> &PuzzleRecord {
        &self.puzzle
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn history(&self) -> &[GuessAttempt] {
        &self.history
    }

    pub fn buffer(&self) -> &[Option<char>] {
        &self.buffer
    }

    pub fn best_correct(&self) -> usize {
        self.best_correct
    }

    pub fn blur(&self) -> u8 {
        self.blur
    }

    pub fn hints(&self) -> &LetterHints {
        &self.hints
    }

    pub fn key_hint(&self, c: char) -> evaluator::KeyHint {
        self.hints.key(c)
    }

    pub fn all_complete(&self) -> bool {
        self.all_complete
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn gateway(&self) -> &Gateway<S> {
        &self.gateway
    }
}
