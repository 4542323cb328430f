/// The puzzle catalog: an ordered list of pictures and the words that go with them.
/// Records are normalized and checked once, when the catalog is built, and are
/// read-only after that.
use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::DataIntegrityError;

/// The catalog that ships with the binary.
const BUILTIN_PUZZLES: &str = include_str!("../data/puzzles.json");

/// PuzzleRecord is a single daily puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleRecord {
    pub id: u32,

    /// URI or path of the picture.
    pub image: String,

    /// The word to guess, uppercase once the record is in a catalog.
    pub answer: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,

    /// Other words that also win the puzzle.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternative_answers: Vec<String>,
}

/// `normalize_word` drops spaces, hyphens and apostrophes and uppercases the rest.
pub fn normalize_word(word: &str) -> String {
    word.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '\'')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

impl PuzzleRecord {
    /// `normalized` returns a copy with canonical answers, or the reason the record
    /// can't be played.
    pub fn normalized(&self) -> Result<PuzzleRecord, DataIntegrityError> {
        let answer = normalize_word(&self.answer);
        if answer.is_empty() {
            return Err(DataIntegrityError::new(self.id, "answer is empty"));
        }
        if !answer.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DataIntegrityError::new(
                self.id,
                format!("answer {:?} is not alphabetic", self.answer),
            ));
        }

        let mut alternative_answers = Vec::with_capacity(self.alternative_answers.len());
        for alt in &self.alternative_answers {
            let alt = normalize_word(alt);
            if alt.is_empty() || !alt.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(DataIntegrityError::new(
                    self.id,
                    format!("alternative answer {:?} is not alphabetic", alt),
                ));
            }
            alternative_answers.push(alt);
        }

        Ok(PuzzleRecord {
            answer,
            alternative_answers,
            ..self.clone()
        })
    }

    /// Returns true if the (normalized) guess wins this puzzle.
    pub fn accepts(&self, guess: &str) -> bool {
        self.answer == guess || self.alternative_answers.iter().any(|alt| alt == guess)
    }
}

/// Catalog is the ordered, validated list of puzzles.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    puzzles: Vec<PuzzleRecord>,
}

impl Catalog {
    pub fn new(records: Vec<PuzzleRecord>) -> Result<Catalog, DataIntegrityError> {
        if records.is_empty() {
            return Err(DataIntegrityError::new(0, "the catalog has no puzzles"));
        }

        let puzzles = records
            .iter()
            .map(PuzzleRecord::normalized)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Catalog { puzzles })
    }

    pub fn from_json(json: &str) -> anyhow::Result<Catalog> {
        let records: Vec<PuzzleRecord> =
            serde_json::from_str(json).context("Error parsing puzzle catalog")?;
        Ok(Catalog::new(records)?)
    }

    /// Loads a catalog from a JSON file.
    pub fn load(path: impl AsRef<str>) -> anyhow::Result<Catalog> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .context(format!("Error reading puzzle catalog {}", path))?;
        Catalog::from_json(&json).context(format!("Bad puzzle catalog in {}", path))
    }

    pub fn builtin() -> anyhow::Result<Catalog> {
        Catalog::from_json(BUILTIN_PUZZLES)
    }

    pub fn get(&self, index: usize) -> Option<&PuzzleRecord> {
        self.puzzles.get(index)
    }

    pub fn len(&self) -> usize {
        self.puzzles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u32, answer: &str) -> PuzzleRecord {
        PuzzleRecord {
            id,
            image: format!("/images/{}.jpg", id),
            answer: answer.into(),
            hint: None,
            alternative_answers: vec![],
        }
    }

    #[test]
    fn builtin_catalog_is_uppercase() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.len(), 9);
        assert_eq!(catalog.get(0).unwrap().answer, "CORAL");

        let lake = catalog.get(7).unwrap();
        assert_eq!(lake.alternative_answers, vec!["POND", "LAGOON", "WATER"]);
        assert!(lake.accepts("POND"));
        assert!(!lake.accepts("Pond"));
    }

    #[test]
    fn rejects_bad_answers() {
        assert!(Catalog::new(vec![]).is_err());

        let err = Catalog::new(vec![record(1, "lake"), record(2, "  ")]).unwrap_err();
        assert_eq!(err.puzzle_id, 2);

        let err = Catalog::new(vec![record(3, "r2d2")]).unwrap_err();
        assert_eq!(err.puzzle_id, 3);
    }

    #[test]
    fn normalizes_compound_words() {
        let catalog = Catalog::new(vec![record(1, "ice-cream cone")]).unwrap();
        assert_eq!(catalog.get(0).unwrap().answer, "ICECREAMCONE");
    }

    #[test]
    fn parses_json() {
        let catalog = Catalog::from_json(
            r#"[{"id": 4, "image": "a.jpg", "answer": "Tower", "alternativeAnswers": ["spire"]}]"#,
        )
        .unwrap();
        let puzzle = catalog.get(0).unwrap();
        assert_eq!(puzzle.hint, None);
        assert!(puzzle.accepts("SPIRE"));

        assert!(Catalog::from_json(r#"[{"id": 1, "answer": "x"}]"#).is_err());
    }
}
