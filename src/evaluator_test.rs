use std::collections::BTreeSet;

use crate::evaluator::*;

fn set(letters: &str) -> BTreeSet<char> {
    letters.chars().collect()
}

#[test]
fn it_works() {
    let letters = assess("BOLLE", "HELLO");

    assert_eq!(letters[0], Letter::Wrong('B'));
    assert_eq!(letters[1], Letter::CorrectButWrongPosition('O'));
    assert_eq!(letters[2], Letter::Correct('L'));
    assert_eq!(letters[3], Letter::Correct('L'));
    assert_eq!(letters[4], Letter::CorrectButWrongPosition('E'));
}

#[test]
fn exact_matches() {
    assert_eq!(exact_match_count("LAKE", "LAKE"), 4);
    assert_eq!(exact_match_count("LAND", "LAKE"), 2);
    assert_eq!(exact_match_count("PODS", "LAKE"), 0);
    // Shares letters, none in place.
    assert_eq!(exact_match_count("EKAL", "LAKE"), 0);
}

#[test]
fn present_letters_are_distinct() {
    assert_eq!(present_letters("LAND", "LAKE"), set("AL"));
    assert_eq!(present_letters("LLLL", "LAKE"), set("L"));
    assert_eq!(present_letters("PODS", "LAKE"), set(""));

    let present = present_letters("SALAD", "CORAL");
    assert!(present.len() <= "CORAL".len());
    assert!(present.iter().all(|c| "CORAL".contains(*c)));
}

#[test]
fn repeated_letters_are_not_double_counted() {
    // One A in the answer: only the first unmatched A is misplaced.
    assert_eq!(
        assess("AABBB", "XAXXA"),
        vec![
            Letter::CorrectButWrongPosition('A'),
            Letter::Correct('A'),
            Letter::Wrong('B'),
            Letter::Wrong('B'),
            Letter::Wrong('B'),
        ]
    );

    // An exact match consumes its copy before misplaced letters are counted.
    assert_eq!(
        assess("LLAMA", "LAKES"),
        vec![
            Letter::Correct('L'),
            Letter::Wrong('L'),
            Letter::CorrectButWrongPosition('A'),
            Letter::Wrong('M'),
            Letter::Wrong('A'),
        ]
    );
}

#[test]
fn evaluate_rejects_bad_input() {
    assert!(evaluate("LAKES", "LAKE").is_err());
    assert!(evaluate("lake", "LAKE").is_err());
    assert!(evaluate("", "").is_err());

    let evaluation = evaluate("LAND", "LAKE").unwrap();
    assert_eq!(evaluation.exact_matches, 2);
    assert_eq!(evaluation.present, set("AL"));
    assert_eq!(evaluation.absent, set("DN"));
}

#[test]
fn hints_accumulate() {
    let mut hints = LetterHints::default();
    hints.record(&evaluate("PODS", "LAKE").unwrap());
    hints.record(&evaluate("LAND", "LAKE").unwrap());

    assert_eq!(hints.present, set("AL"));
    assert_eq!(hints.absent, set("DNOPS"));
    assert_eq!(hints.key('p'), KeyHint::Absent);
    assert_eq!(hints.key('L'), KeyHint::Present);
    assert_eq!(hints.key('K'), KeyHint::Unknown);
}
