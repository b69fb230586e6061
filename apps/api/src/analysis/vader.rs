//! Polarity scoring: pluggable, trait-based scorer producing VADER-style
//! `{neg, neu, pos, compound}` vectors.
//!
//! Default: `VaderScorer` (lexicon + rules, deterministic, no I/O).
//!
//! The pipeline holds an `Arc<dyn PolarityScorer>`, so tests and deployments
//! can substitute any scorer with compatible output ranges.

use serde::{Deserialize, Serialize};

use crate::analysis::lexicon::{booster, is_negation, Lexicon, BOOSTERS, SPECIAL_IDIOMS};

/// ALL-CAPS emphasis increment.
const C_INCR: f64 = 0.733;
/// Negation scalar.
const N_SCALAR: f64 = -0.74;
/// Normalization constant approximating the maximum expected sum.
const ALPHA: f64 = 15.0;

const EXCLAMATION_WEIGHT: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;
const QUESTION_WEIGHT: f64 = 0.18;
const QUESTION_CAP: f64 = 0.96;

// ────────────────────────────────────────────────────────────────────────────
// Output model
// ────────────────────────────────────────────────────────────────────────────

/// Proportions of negative, neutral and positive mass (summing to 1) plus
/// the normalized compound polarity in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarityScores {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    pub compound: f64,
}

impl PolarityScores {
    pub const NEUTRAL: PolarityScores = PolarityScores {
        neg: 0.0,
        neu: 1.0,
        pos: 0.0,
        compound: 0.0,
    };
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap the scoring backend without touching the pipeline.
pub trait PolarityScorer: Send + Sync {
    fn polarity_scores(&self, text: &str) -> PolarityScores;
}

// ────────────────────────────────────────────────────────────────────────────
// VaderScorer
// ────────────────────────────────────────────────────────────────────────────

/// Valence-aware scorer following the VADER rule set.
///
/// Algorithm:
/// 1. Split on whitespace; strip surrounding punctuation from words (emoticons survive).
/// 2. Each lexicon token gets its valence, adjusted by ALL-CAPS emphasis,
///    preceding boosters/dampeners (3-word window, decaying), negations and idioms.
/// 3. A "but" halves everything before it and boosts everything after it by 1.5.
/// 4. `!` and `?` amplify the summed valence; compound = x / √(x² + 15).
pub struct VaderScorer {
    lexicon: Lexicon,
}

impl Default for VaderScorer {
    fn default() -> Self {
        Self::new(Lexicon::embedded())
    }
}

impl VaderScorer {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    fn sentiment_valence(&self, tokens: &[&str], lower: &[String], i: usize, cap_diff: bool) -> f64 {
        let Some(base) = self.lexicon.valence(&lower[i]) else {
            return 0.0;
        };
        let mut valence = base;

        // "no" as a determiner ahead of another lexicon word carries no valence itself
        if lower[i] == "no" && i + 1 < lower.len() && self.lexicon.contains(&lower[i + 1]) {
            valence = 0.0;
        }
        if (i > 0 && lower[i - 1] == "no")
            || (i > 1 && lower[i - 2] == "no")
            || (i > 2 && lower[i - 3] == "no" && matches!(lower[i - 1].as_str(), "or" | "nor"))
        {
            valence = base * N_SCALAR;
        }

        if cap_diff && is_all_caps(tokens[i]) {
            valence += if valence > 0.0 { C_INCR } else { -C_INCR };
        }

        for start_i in 0..3 {
            if i <= start_i {
                break;
            }
            let prev = i - (start_i + 1);
            if self.lexicon.contains(&lower[prev]) {
                continue;
            }
            let mut s = scalar_inc_dec(tokens[prev], &lower[prev], valence, cap_diff);
            if start_i == 1 {
                s *= 0.95;
            } else if start_i == 2 {
                s *= 0.9;
            }
            valence += s;
            valence = negation_check(valence, lower, start_i, i);
            if start_i == 2 {
                valence = special_idioms_check(valence, lower, i);
            }
        }

        least_check(valence, lower, i, &self.lexicon)
    }
}

impl PolarityScorer for VaderScorer {
    fn polarity_scores(&self, text: &str) -> PolarityScores {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return PolarityScores::NEUTRAL;
        }
        let lower: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
        let cap_diff = allcap_differential(&tokens);

        let mut sentiments = Vec::with_capacity(tokens.len());
        for i in 0..tokens.len() {
            let item = lower[i].as_str();
            if booster(item).is_some()
                || (item == "kind" && lower.get(i + 1).is_some_and(|next| next == "of"))
            {
                sentiments.push(0.0);
                continue;
            }
            sentiments.push(self.sentiment_valence(&tokens, &lower, i, cap_diff));
        }

        but_check(&lower, &mut sentiments);
        score_valence(&sentiments, text)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rule helpers
// ────────────────────────────────────────────────────────────────────────────

fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().map(strip_punctuation_if_word).collect()
}

/// Strips surrounding punctuation unless that would leave two characters or
/// fewer, which keeps emoticons such as `:)` and `<3` intact.
fn strip_punctuation_if_word(token: &str) -> &str {
    let stripped = token.trim_matches(|c: char| c.is_ascii_punctuation());
    if stripped.chars().count() <= 2 {
        token
    } else {
        stripped
    }
}

fn is_all_caps(token: &str) -> bool {
    token.chars().any(char::is_uppercase) && !token.chars().any(char::is_lowercase)
}

/// True when some, but not all, tokens are ALL CAPS.
fn allcap_differential(tokens: &[&str]) -> bool {
    let all_caps = tokens.iter().filter(|t| is_all_caps(t)).count();
    let differential = tokens.len() - all_caps;
    differential > 0 && differential < tokens.len()
}

fn scalar_inc_dec(token: &str, token_lower: &str, valence: f64, cap_diff: bool) -> f64 {
    let Some(mut scalar) = booster(token_lower) else {
        return 0.0;
    };
    if valence < 0.0 {
        scalar = -scalar;
    }
    if cap_diff && is_all_caps(token) {
        scalar += if valence > 0.0 { C_INCR } else { -C_INCR };
    }
    scalar
}

fn negation_check(valence: f64, lower: &[String], start_i: usize, i: usize) -> f64 {
    let word = |offset: usize| lower[i - offset].as_str();
    match start_i {
        0 => {
            if is_negation(word(1)) {
                return valence * N_SCALAR;
            }
        }
        1 => {
            if word(2) == "never" && matches!(word(1), "so" | "this") {
                return valence * 1.25;
            }
            if word(2) == "without" && word(1) == "doubt" {
                return valence;
            }
            if is_negation(word(2)) {
                return valence * N_SCALAR;
            }
        }
        2 => {
            if word(3) == "never"
                && (matches!(word(2), "so" | "this") || matches!(word(1), "so" | "this"))
            {
                return valence * 1.25;
            }
            if word(3) == "without" && (word(2) == "doubt" || word(1) == "doubt") {
                return valence;
            }
            if is_negation(word(3)) {
                return valence * N_SCALAR;
            }
        }
        _ => {}
    }
    valence
}

fn idiom(phrase: &str) -> Option<f64> {
    SPECIAL_IDIOMS
        .iter()
        .find(|(p, _)| *p == phrase)
        .map(|(_, v)| *v)
}

/// Only reached for `i >= 3`.
fn special_idioms_check(mut valence: f64, lower: &[String], i: usize) -> f64 {
    let w = |idx: usize| lower[idx].as_str();
    let one_zero = format!("{} {}", w(i - 1), w(i));
    let two_one_zero = format!("{} {} {}", w(i - 2), w(i - 1), w(i));
    let two_one = format!("{} {}", w(i - 2), w(i - 1));
    let three_two_one = format!("{} {} {}", w(i - 3), w(i - 2), w(i - 1));
    let three_two = format!("{} {}", w(i - 3), w(i - 2));

    if let Some(v) = [&one_zero, &two_one_zero, &two_one, &three_two_one, &three_two]
        .into_iter()
        .find_map(|seq| idiom(seq))
    {
        valence = v;
    }
    if lower.len() > i + 1 {
        if let Some(v) = idiom(&format!("{} {}", w(i), w(i + 1))) {
            valence = v;
        }
    }
    if lower.len() > i + 2 {
        if let Some(v) = idiom(&format!("{} {} {}", w(i), w(i + 1), w(i + 2))) {
            valence = v;
        }
    }

    // multi-word boosters such as "sort of"
    for n_gram in [&three_two_one, &three_two, &two_one] {
        if let Some((_, b)) = BOOSTERS.iter().find(|(word, _)| *word == n_gram.as_str()) {
            valence += b;
        }
    }
    valence
}

fn least_check(valence: f64, lower: &[String], i: usize, lexicon: &Lexicon) -> f64 {
    if i > 0 && lower[i - 1] == "least" && !lexicon.contains("least") {
        if i > 1 {
            if lower[i - 2] != "at" && lower[i - 2] != "very" {
                return valence * N_SCALAR;
            }
        } else {
            return valence * N_SCALAR;
        }
    }
    valence
}

fn but_check(lower: &[String], sentiments: &mut [f64]) {
    let Some(but_idx) = lower.iter().position(|w| w == "but") else {
        return;
    };
    for (idx, s) in sentiments.iter_mut().enumerate() {
        if idx < but_idx {
            *s *= 0.5;
        } else if idx > but_idx {
            *s *= 1.5;
        }
    }
}

fn punctuation_emphasis(text: &str) -> f64 {
    let exclamations = text.matches('!').count().min(MAX_EXCLAMATIONS);
    let questions = text.matches('?').count();
    let question_amp = match questions {
        0 | 1 => 0.0,
        2 | 3 => questions as f64 * QUESTION_WEIGHT,
        _ => QUESTION_CAP,
    };
    exclamations as f64 * EXCLAMATION_WEIGHT + question_amp
}

fn normalize(score: f64) -> f64 {
    (score / (score * score + ALPHA).sqrt()).clamp(-1.0, 1.0)
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

fn score_valence(sentiments: &[f64], text: &str) -> PolarityScores {
    if sentiments.is_empty() {
        return PolarityScores::NEUTRAL;
    }
    let punct = punctuation_emphasis(text);

    let mut sum: f64 = sentiments.iter().sum();
    if sum > 0.0 {
        sum += punct;
    } else if sum < 0.0 {
        sum -= punct;
    }
    let compound = round4(normalize(sum));

    // neutral words count as 1, so sentiment words are shifted by one in magnitude
    let mut pos_sum = 0.0;
    let mut neg_sum = 0.0;
    let mut neu_count = 0.0;
    for &s in sentiments {
        if s > 0.0 {
            pos_sum += s + 1.0;
        } else if s < 0.0 {
            neg_sum += s - 1.0;
        } else {
            neu_count += 1.0;
        }
    }
    if pos_sum > neg_sum.abs() {
        pos_sum += punct;
    } else if pos_sum < neg_sum.abs() {
        neg_sum -= punct;
    }

    let total = pos_sum + neg_sum.abs() + neu_count;
    if total <= 0.0 {
        return PolarityScores::NEUTRAL;
    }
    PolarityScores {
        neg: (neg_sum / total).abs(),
        neu: (neu_count / total).abs(),
        pos: (pos_sum / total).abs(),
        compound,
    }
}
