/// Compares a guess against the answer. The session only uses the counts and
/// letter sets; the per-letter feedback is for rendering history.
///
/// All functions expect normalized (uppercase) words of the same length.
use std::collections::{BTreeSet, HashMap};

/// Letter represents the position of a single letter in an attempted
/// word.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum Letter {
    Correct(char),
    CorrectButWrongPosition(char),
    Wrong(char),
}

impl Letter {
    pub fn char(&self) -> char {
        match self {
            Letter::Correct(c) | Letter::CorrectButWrongPosition(c) | Letter::Wrong(c) => *c,
        }
    }
}

/// `exact_match_count` counts positions where guess and answer agree.
pub fn exact_match_count(guess: &str, answer: &str) -> usize {
    guess
        .chars()
        .zip(answer.chars())
        .filter(|(g, a)| g == a)
        .count()
}

/// `present_letters` returns the distinct guess letters found anywhere in the answer.
/// A letter repeated in the guess is only counted once.
pub fn present_letters(guess: &str, answer: &str) -> BTreeSet<char> {
    guess.chars().filter(|c| answer.contains(*c)).collect()
}

/// `absent_letters` returns the distinct guess letters the answer doesn't have.
pub fn absent_letters(guess: &str, answer: &str) -> BTreeSet<char> {
    guess.chars().filter(|c| !answer.contains(*c)).collect()
}

/// `assess` returns one Letter per position. Duplicates follow the usual Wordle
/// rule: a letter is only marked misplaced as many times as the answer still has
/// unmatched copies of it.
pub fn assess(guess: &str, answer: &str) -> Vec<Letter> {
    let guess: Vec<char> = guess.chars().collect();
    let answer: Vec<char> = answer.chars().collect();

    // Copies of each answer letter not taken by an exact match.
    let mut unmatched = answer
        .iter()
        .zip(guess.iter())
        .filter(|(a, g)| a != g)
        .fold(HashMap::new(), |mut acc, (a, _)| {
            *acc.entry(*a).or_insert(0usize) += 1;
            acc
        });

    guess
        .iter()
        .zip(answer.iter())
        .map(|(&g, &a)| {
            if g == a {
                return Letter::Correct(g);
            }
            match unmatched.get_mut(&g) {
                Some(left) if *left > 0 => {
                    *left -= 1;
                    Letter::CorrectButWrongPosition(g)
                }
                _ => Letter::Wrong(g),
            }
        })
        .collect()
}

/// Evaluation is everything the session learns from one guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub exact_matches: usize,
    pub present: BTreeSet<char>,
    pub absent: BTreeSet<char>,
    pub letters: Vec<Letter>,
}

/// `evaluate` runs every comparison at once. The session checks lengths before
/// getting here, so a mismatch means the answer itself is bad.
pub fn evaluate(guess: &str, answer: &str) -> Result<Evaluation, String> {
    if answer.is_empty() {
        return Err("answer is empty".into());
    }
    if guess.len() != answer.len() {
        return Err(format!(
            "guess {} and answer have different lengths ({} vs {})",
            guess,
            guess.len(),
            answer.len()
        ));
    }
    if !answer.chars().all(|c| c.is_ascii_uppercase()) {
        return Err("answer is not normalized".into());
    }
    if !guess.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(format!("guess {} is not normalized", guess));
    }

    Ok(Evaluation {
        exact_matches: exact_match_count(guess, answer),
        present: present_letters(guess, answer),
        absent: absent_letters(guess, answer),
        letters: assess(guess, answer),
    })
}

/// LetterHints accumulates what the player has learned about each letter during
/// one puzzle. Used to shade the keyboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LetterHints {
    pub present: BTreeSet<char>,
    pub absent: BTreeSet<char>,
}

/// KeyHint is the state of a single keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyHint {
    Present,
    Absent,
    Unknown,
}

impl LetterHints {
    pub fn record(&mut self, evaluation: &Evaluation) {
        self.present.extend(evaluation.present.iter().copied());
        self.absent.extend(evaluation.absent.iter().copied());
    }

    pub fn key(&self, c: char) -> KeyHint {
        let c = c.to_ascii_uppercase();
        if self.present.contains(&c) {
            KeyHint::Present
        } else if self.absent.contains(&c) {
            KeyHint::Absent
        } else {
            KeyHint::Unknown
        }
    }

    pub fn clear(&mut self) {
        self.present.clear();
        self.absent.clear();
    }
}
