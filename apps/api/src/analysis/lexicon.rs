//! Sentiment lexicon: token → mean valence on the VADER scale (roughly −4..+4).
//!
//! The embedded table carries the VADER valences for common English opinion
//! words, emoticons and the vocabulary that shows up in transit feedback.
//! Deployments that want the full 7.5k-entry VADER lexicon point
//! `VADER_LEXICON_PATH` at `vader_lexicon.txt` instead.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("Failed to read lexicon file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed lexicon line {line}: {content}")]
    Malformed { line: usize, content: String },

    #[error("Lexicon file contains no entries")]
    Empty,
}

/// Immutable word → valence table. Built once at startup and shared.
#[derive(Debug, Clone)]
pub struct Lexicon {
    valences: HashMap<String, f64>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::embedded()
    }
}

impl Lexicon {
    /// The compiled-in lexicon.
    pub fn embedded() -> Self {
        Self::from_pairs(EMBEDDED_VALENCES.iter().copied())
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        let valences = pairs
            .into_iter()
            .map(|(word, valence)| (word.to_lowercase(), valence))
            .collect();
        Self { valences }
    }

    /// Loads a VADER-format lexicon: `token<TAB>mean<TAB>stddev<TAB>ratings`.
    pub fn from_vader_file(path: &Path) -> Result<Self, LexiconError> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse_vader(&raw)
    }

    pub fn parse_vader(raw: &str) -> Result<Self, LexiconError> {
        let mut valences = HashMap::new();
        for (idx, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.split('\t');
            let (Some(token), Some(mean)) = (fields.next(), fields.next()) else {
                return Err(LexiconError::Malformed {
                    line: idx + 1,
                    content: line.to_string(),
                });
            };
            let valence = mean.trim().parse::<f64>().map_err(|_| LexiconError::Malformed {
                line: idx + 1,
                content: line.to_string(),
            })?;
            valences.insert(token.to_lowercase(), valence);
        }
        let lexicon = Self { valences };
        if lexicon.is_empty() {
            return Err(LexiconError::Empty);
        }
        Ok(lexicon)
    }

    /// Valence for an already-lowercased token.
    pub fn valence(&self, token: &str) -> Option<f64> {
        self.valences.get(token).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.valences.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.valences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valences.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rule vocabularies
// ────────────────────────────────────────────────────────────────────────────

/// Booster increment.
pub const B_INCR: f64 = 0.293;
/// Dampener decrement.
pub const B_DECR: f64 = -0.293;

/// Words that shift the intensity of the following sentiment word.
pub const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", B_INCR),
    ("amazingly", B_INCR),
    ("awfully", B_INCR),
    ("completely", B_INCR),
    ("considerable", B_INCR),
    ("considerably", B_INCR),
    ("decidedly", B_INCR),
    ("deeply", B_INCR),
    ("enormous", B_INCR),
    ("enormously", B_INCR),
    ("entirely", B_INCR),
    ("especially", B_INCR),
    ("exceptional", B_INCR),
    ("exceptionally", B_INCR),
    ("extreme", B_INCR),
    ("extremely", B_INCR),
    ("fabulously", B_INCR),
    ("fully", B_INCR),
    ("greatly", B_INCR),
    ("highly", B_INCR),
    ("hugely", B_INCR),
    ("incredible", B_INCR),
    ("incredibly", B_INCR),
    ("intensely", B_INCR),
    ("major", B_INCR),
    ("majorly", B_INCR),
    ("more", B_INCR),
    ("most", B_INCR),
    ("particularly", B_INCR),
    ("purely", B_INCR),
    ("quite", B_INCR),
    ("really", B_INCR),
    ("remarkably", B_INCR),
    ("so", B_INCR),
    ("substantially", B_INCR),
    ("thoroughly", B_INCR),
    ("total", B_INCR),
    ("totally", B_INCR),
    ("tremendous", B_INCR),
    ("tremendously", B_INCR),
    ("unbelievably", B_INCR),
    ("unusually", B_INCR),
    ("utter", B_INCR),
    ("utterly", B_INCR),
    ("very", B_INCR),
    ("almost", B_DECR),
    ("barely", B_DECR),
    ("hardly", B_DECR),
    ("kinda", B_DECR),
    ("kindof", B_DECR),
    ("kind-of", B_DECR),
    ("less", B_DECR),
    ("little", B_DECR),
    ("marginal", B_DECR),
    ("marginally", B_DECR),
    ("occasional", B_DECR),
    ("occasionally", B_DECR),
    ("partly", B_DECR),
    ("scarce", B_DECR),
    ("scarcely", B_DECR),
    ("slight", B_DECR),
    ("slightly", B_DECR),
    ("somewhat", B_DECR),
    ("sorta", B_DECR),
    ("sortof", B_DECR),
    ("sort-of", B_DECR),
    ("kind of", B_DECR),
    ("sort of", B_DECR),
    ("just enough", B_DECR),
];

pub fn booster(word_lower: &str) -> Option<f64> {
    BOOSTERS
        .iter()
        .find(|(w, _)| *w == word_lower)
        .map(|(_, v)| *v)
}

/// Negation cues. Any token containing "n't" also negates.
pub const NEGATIONS: &[&str] = &[
    "aint", "arent", "cannot", "cant", "couldnt", "darent", "didnt", "doesnt", "ain't", "aren't",
    "can't", "couldn't", "daren't", "didn't", "doesn't", "dont", "hadnt", "hasnt", "havent",
    "isnt", "mightnt", "mustnt", "neither", "don't", "hadn't", "hasn't", "haven't", "isn't",
    "mightn't", "mustn't", "neednt", "needn't", "never", "none", "nope", "nor", "not", "nothing",
    "nowhere", "oughtnt", "shant", "shouldnt", "uhuh", "wasnt", "werent", "oughtn't", "shan't",
    "shouldn't", "uh-uh", "wasn't", "weren't", "without", "wont", "wouldnt", "won't", "wouldn't",
    "rarely", "seldom", "despite",
];

pub fn is_negation(word_lower: &str) -> bool {
    NEGATIONS.contains(&word_lower) || word_lower.contains("n't")
}

/// Multi-word expressions whose valence replaces that of their last word.
pub const SPECIAL_IDIOMS: &[(&str, f64)] = &[
    ("the shit", 3.0),
    ("the bomb", 3.0),
    ("bad ass", 1.5),
    ("yeah right", -2.0),
    ("kiss of death", -1.5),
    ("to die for", 3.0),
    ("beating heart", 3.1),
    ("broken heart", -2.9),
];

// ────────────────────────────────────────────────────────────────────────────
// Embedded valences
// ────────────────────────────────────────────────────────────────────────────

const EMBEDDED_VALENCES: &[(&str, f64)] = &[
    // positive
    ("accessible", 1.3),
    ("admire", 2.1),
    ("agree", 1.5),
    ("amazing", 2.8),
    ("appreciate", 1.7),
    ("appreciated", 2.3),
    ("awesome", 3.1),
    ("beautiful", 2.9),
    ("best", 3.2),
    ("better", 1.9),
    ("brilliant", 2.8),
    ("calm", 1.3),
    ("care", 2.2),
    ("clean", 1.7),
    ("cleaner", 1.3),
    ("cleanest", 1.7),
    ("comfort", 1.5),
    ("comfortable", 2.3),
    ("convenient", 1.6),
    ("courteous", 2.3),
    ("delight", 2.9),
    ("delighted", 2.3),
    ("efficient", 1.8),
    ("enjoy", 2.2),
    ("enjoyed", 2.3),
    ("excellent", 2.7),
    ("fantastic", 2.6),
    ("favorite", 2.0),
    ("fine", 0.8),
    ("free", 2.3),
    ("friendly", 2.2),
    ("fun", 2.3),
    ("glad", 2.0),
    ("good", 1.9),
    ("great", 3.1),
    ("happy", 2.7),
    ("help", 1.7),
    ("helpful", 1.8),
    ("impressive", 2.3),
    ("improve", 1.9),
    ("improved", 2.1),
    ("improvement", 2.0),
    ("improves", 1.8),
    ("kind", 2.4),
    ("like", 2.0),
    ("liked", 1.8),
    ("likes", 1.8),
    ("love", 3.2),
    ("loved", 2.9),
    ("lovely", 2.8),
    ("loves", 2.7),
    ("nice", 1.8),
    ("ok", 1.2),
    ("okay", 0.9),
    ("perfect", 2.7),
    ("pleasant", 2.3),
    ("pleased", 1.9),
    ("polite", 2.1),
    ("positive", 2.6),
    ("professional", 1.9),
    ("punctual", 1.6),
    ("quick", 1.0),
    ("recommend", 1.5),
    ("reliable", 1.8),
    ("relaxed", 2.2),
    ("respect", 2.1),
    ("safe", 1.9),
    ("safety", 1.8),
    ("satisfied", 1.8),
    ("secure", 1.4),
    ("smooth", 1.4),
    ("success", 2.7),
    ("superb", 3.1),
    ("support", 1.7),
    ("thank", 1.5),
    ("thanks", 1.9),
    ("useful", 1.9),
    ("well", 1.1),
    ("win", 2.8),
    ("wonderful", 2.7),
    ("yes", 1.7),
    // negative
    ("abandoned", -2.1),
    ("afraid", -2.0),
    ("angry", -2.3),
    ("annoyed", -1.6),
    ("annoying", -1.7),
    ("awful", -2.0),
    ("bad", -2.5),
    ("boring", -1.3),
    ("broken", -2.1),
    ("careless", -1.5),
    ("chaos", -2.2),
    ("chaotic", -2.2),
    ("complain", -1.5),
    ("complaint", -1.2),
    ("crap", -1.6),
    ("crowded", -1.0),
    ("danger", -2.4),
    ("dangerous", -2.1),
    ("deficient", -1.4),
    ("delay", -1.3),
    ("delayed", -1.2),
    ("delays", -1.3),
    ("dirty", -1.9),
    ("disappointed", -1.9),
    ("disappointing", -2.2),
    ("disgusting", -2.4),
    ("disorder", -1.7),
    ("dislike", -1.6),
    ("expensive", -0.9),
    ("fail", -2.5),
    ("failed", -2.3),
    ("fails", -2.0),
    ("failure", -2.3),
    ("fear", -2.2),
    ("filthy", -2.4),
    ("frustrated", -2.4),
    ("frustrating", -1.9),
    ("hate", -2.7),
    ("hated", -3.2),
    ("horrible", -2.5),
    ("insecure", -1.4),
    ("irresponsible", -1.9),
    ("irresponsibly", -1.4),
    ("lack", -1.3),
    ("late", -0.8),
    ("mess", -1.5),
    ("miss", -0.6),
    ("missed", -1.2),
    ("no", -1.2),
    ("poor", -2.1),
    ("poorly", -1.8),
    ("problem", -1.7),
    ("problems", -1.7),
    ("rude", -2.0),
    ("sad", -2.1),
    ("scared", -2.1),
    ("shame", -2.1),
    ("slow", -1.0),
    ("stuck", -1.0),
    ("sucks", -1.5),
    ("terrible", -2.1),
    ("unacceptable", -2.0),
    ("uncomfortable", -1.6),
    ("unfair", -2.1),
    ("unhappy", -1.8),
    ("unreliable", -1.6),
    ("unsafe", -2.2),
    ("upset", -1.6),
    ("useless", -1.8),
    ("waste", -1.8),
    ("worse", -2.1),
    ("worst", -3.1),
    ("wrong", -2.1),
    // emoticons
    (":)", 2.0),
    (":-)", 1.3),
    (":D", 2.3),
    (":-D", 2.3),
    (";)", 0.9),
    ("<3", 1.9),
    (":(", -1.9),
    (":-(", -1.5),
    (":/", -1.4),
    (":'(", -2.2),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_lexicon_has_core_words() {
        let lex = Lexicon::embedded();
        assert!(lex.valence("love").unwrap() > 0.0);
        assert!(lex.valence("terrible").unwrap() < 0.0);
        assert!(lex.valence("bus").is_none());
    }

    #[test]
    fn test_embedded_emoticons_lowercased() {
        let lex = Lexicon::embedded();
        assert_eq!(lex.valence(":d"), Some(2.3));
    }

    #[test]
    fn test_parse_vader_format() {
        let raw = "good\t1.9\t0.9434\t[2, 1, 1, 3, 2, 4, 2, 2, 1, 1]\n\nugly\t-2.3\t0.9\t[-2]\n";
        let lex = Lexicon::parse_vader(raw).unwrap();
        assert_eq!(lex.len(), 2);
        assert_eq!(lex.valence("ugly"), Some(-2.3));
    }

    #[test]
    fn test_parse_vader_reports_bad_line() {
        let raw = "good\t1.9\nbroken-line\n";
        match Lexicon::parse_vader(raw) {
            Err(LexiconError::Malformed { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected malformed error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_vader_rejects_empty() {
        assert!(matches!(Lexicon::parse_vader("\n\n"), Err(LexiconError::Empty)));
    }

    #[test]
    fn test_negation_detects_contractions() {
        assert!(is_negation("not"));
        assert!(is_negation("shouldn't"));
        assert!(!is_negation("bus"));
    }

    #[test]
    fn test_booster_lookup() {
        assert_eq!(booster("very"), Some(B_INCR));
        assert_eq!(booster("slightly"), Some(B_DECR));
        assert_eq!(booster("bus"), None);
    }
}
