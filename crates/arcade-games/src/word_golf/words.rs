//! The pool target words are drawn from.

use std::path::Path;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::GameError;

const BUILTIN: &str = "\
ABOUT ACORN ACTOR ADOPT AGENT ALARM ALBUM ALERT ALIEN ANGLE
APPLE ARENA ARMOR ARROW AUDIO BACON BADGE BAKER BASIC BEACH
BENCH BERRY BLADE BLAME BLANK BLAST BLEND BLOCK BLOOM BOARD
BRAIN BRAVE BREAD BRICK BRUSH CABIN CABLE CAMEL CANDY CARGO
CHAIR CHALK CHARM CHEST CHILL CLIMB CLOCK CLOUD COAST CORAL
CRANE CREEK CROWN CURVE DAISY DANCE DELTA DEPTH DIARY DRAFT
DREAM DRIFT EAGLE EARTH EMBER EMPTY ENJOY EQUAL FAIRY FEAST
FENCE FIBER FIELD FLAME FLASH FLOAT FLOOR FLUTE FOCUS FORGE
FROST FRUIT GHOST GIANT GLASS GLOBE GRAIN GRAPE GRASS GUARD
HABIT HEART HONEY HOTEL HOUSE HUMOR IMAGE IVORY JELLY JEWEL
JUICE KAYAK KNIFE LABEL LASER LEMON LEVEL LIGHT LINEN LOGIC
LUNAR MAGIC MAPLE MARCH MEDAL METAL MODEL MOUSE MUSIC NERVE
NIGHT NOBLE NORTH NOVEL OCEAN OLIVE ORBIT OTTER PAINT PANEL
PEARL PIANO PILOT PLANE PLANT PLAZA POINT PRISM PROUD QUEEN
QUICK QUIET RADAR RANCH RAVEN REACH RIVER ROBIN ROBOT ROUTE
SALAD SCALE SCOUT SHADE SHARK SHELL SHINE SKATE SLATE SMILE
SNAKE SOLAR SPACE SPARK SPICE SPOON SPORT STACK STAGE STEAM
STONE STORM SUGAR SWORD TABLE TIGER TOAST TORCH TOWER TRAIL
TRAIN TRUCK TULIP UNCLE UNITY VALVE VAPOR VAULT VIVID VOICE
WAGON WATCH WATER WHALE WHEAT WHEEL WORLD YACHT YOUTH ZEBRA
";

/// A list of candidate target words, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordBank {
    words: Vec<String>,
}

impl WordBank {
    /// The built-in list of five-letter words.
    pub fn builtin() -> Self {
        Self {
            words: BUILTIN.split_whitespace().map(str::to_owned).collect(),
        }
    }

    /// Parses a word list: whitespace-separated words, `#` starts a
    /// comment line.
    ///
    /// # Errors
    /// A word with non-ASCII-letter characters, or no words at all.
    pub fn from_text(text: &str) -> Result<Self, GameError> {
        let mut words = Vec::new();
        for line in text.lines().filter(|l| !l.trim_start().starts_with('#')) {
            for word in line.split_whitespace() {
                if !word.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(GameError::InvalidWordBank(format!("unusable word '{word}'")));
                }
                let word = word.to_ascii_uppercase();
                if !words.contains(&word) {
                    words.push(word);
                }
            }
        }
        if words.is_empty() {
            return Err(GameError::InvalidWordBank("no words".into()));
        }
        Ok(Self { words })
    }

    /// Reads and parses a word list file.
    pub async fn load(path: &Path) -> Result<Self, GameError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| GameError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_text(&text)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w.eq_ignore_ascii_case(word))
    }

    /// Draws two disjoint queues of `per_player` words each from one
    /// shuffled sample. Smaller banks give shorter queues, split evenly.
    pub fn sample_disjoint<R: Rng + ?Sized>(&self, rng: &mut R, per_player: usize) -> [Vec<String>; 2] {
        let per_player = per_player.min(self.words.len() / 2);
        let mut pool = self.words.clone();
        pool.shuffle(rng);
        pool.truncate(per_player * 2);
        let second = pool.split_off(per_player);
        [pool, second]
    }
}

impl Default for WordBank {
    fn default() -> Self {
        Self::builtin()
    }
}
