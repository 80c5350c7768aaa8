//! Per-letter guess feedback.

use std::collections::HashMap;

/// How one letter of a guess relates to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    /// Right letter, right place.
    Correct,
    /// The letter is in the target somewhere else.
    Present,
    /// Not in the target, or every occurrence is already accounted for.
    Absent,
}

impl Mark {
    /// The marker clients draw the letter's colour from.
    pub fn as_char(self) -> char {
        match self {
            Self::Correct => 'O',
            Self::Present => '!',
            Self::Absent => 'X',
        }
    }
}

/// Marks every letter of `guess` against `target`.
///
/// Exact matches consume their target letter first; the remaining letters
/// are then marked left to right, each `Present` using up one unmatched
/// occurrence. A letter guessed twice when the target holds it once is
/// therefore marked only once.
pub fn feedback(target: &str, guess: &str) -> Vec<Mark> {
    let target: Vec<char> = target.chars().collect();
    let guess: Vec<char> = guess.chars().collect();

    let mut unmatched: HashMap<char, usize> = HashMap::new();
    for (i, t) in target.iter().enumerate() {
        if guess.get(i) != Some(t) {
            *unmatched.entry(*t).or_default() += 1;
        }
    }

    guess
        .iter()
        .enumerate()
        .map(|(i, g)| {
            if target.get(i) == Some(g) {
                return Mark::Correct;
            }
            match unmatched.get_mut(g) {
                Some(left) if *left > 0 => {
                    *left -= 1;
                    Mark::Present
                }
                _ => Mark::Absent,
            }
        })
        .collect()
}

/// One `?feedback-history` entry: a marker then the letter, for every
/// letter of the guess. `LINEN` against `HONEY` is `XLXIONOEXN`.
pub fn history_entry(guess: &str, marks: &[Mark]) -> String {
    let mut entry = String::with_capacity(guess.len() * 2);
    for (letter, mark) in guess.chars().zip(marks) {
        entry.push(mark.as_char());
        entry.push(letter);
    }
    entry
}
