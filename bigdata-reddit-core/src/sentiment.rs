use {
    std::collections::HashMap,
    once_cell::sync::Lazy,
    serde::{Serialize, Deserialize},
    thiserror::Error,
    tracing::debug,
    crate::{
        filter::View,
        schema::Field,
    },
};

/// Failure inside a polarity estimator. Never leaves `SentimentScorer`.
#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    #[error("estimator rejected input: {0}")]
    Rejected(String),
    #[error("estimator returned a non-finite polarity")]
    NonFinite,
}

/// Anything that can put a number in [-1, 1] on a piece of text.
pub trait PolarityEstimator {
    fn estimate_polarity(&self, text: &str) -> Result<f64, ScoringError>;
}

impl<E: PolarityEstimator + ?Sized> PolarityEstimator for Box<E> {
    fn estimate_polarity(&self, text: &str) -> Result<f64, ScoringError> {
        (**self).estimate_polarity(text)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

pub struct SentimentScorer<E> {
    estimator: E,
}

impl<E: PolarityEstimator> SentimentScorer<E> {
    pub fn new(estimator: E) -> Self {
        Self {
            estimator,
        }
    }

    /// Polarity of `text`. Estimator failures score as neutral `0.0`.
    pub fn score(&self, text: &str) -> f64 {
        let result = self.estimator.estimate_polarity(text)
            .and_then(|polarity| if polarity.is_finite() { Ok(polarity) } else { Err(ScoringError::NonFinite) });

        match result {
            Ok(polarity) => polarity.clamp(-1.0, 1.0),
            Err(err) => {
                debug!("falling back to neutral sentiment: {}", err);
                0.0
            },
        }
    }

    /// One score per record of the view, or `None` if the text column is
    /// absent. Missing text scores as an empty string.
    pub fn score_view(&self, view: &View, text_field: Field) -> Option<Vec<f64>> {
        if !view.schema().has_field(text_field) {
            return None;
        }

        Some(view.records()
            .map(|record| self.score(record.text(text_field).unwrap_or("")))
            .collect())
    }
}

impl Default for SentimentScorer<LexiconEstimator> {
    fn default() -> Self {
        Self::new(LexiconEstimator::default())
    }
}

pub fn label(mean_polarity: f64) -> SentimentLabel {
    if mean_polarity > 0.1 {
        SentimentLabel::Positive
    } else if mean_polarity < -0.1 {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

pub fn mean(scores: &[f64]) -> Option<f64> {
    if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

static LEXICON: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| [
    ("good", 0.7), ("great", 0.8), ("amazing", 0.6), ("awesome", 1.0), ("excellent", 1.0),
    ("best", 1.0), ("better", 0.5), ("love", 0.5), ("loved", 0.7), ("nice", 0.6),
    ("happy", 0.8), ("glad", 0.5), ("beautiful", 0.85), ("wonderful", 1.0), ("fantastic", 0.4),
    ("cool", 0.35), ("fun", 0.3), ("interesting", 0.5), ("helpful", 0.5), ("perfect", 1.0),
    ("win", 0.8), ("free", 0.4), ("new", 0.14), ("easy", 0.43), ("fast", 0.2),
    ("thanks", 0.2), ("thank", 0.2), ("useful", 0.3), ("incredible", 0.9), ("brilliant", 0.9),
    ("bad", -0.7), ("worse", -0.4), ("worst", -1.0), ("terrible", -1.0), ("awful", -1.0),
    ("horrible", -1.0), ("hate", -0.8), ("sad", -0.5), ("angry", -0.5), ("ugly", -0.7),
    ("wrong", -0.5), ("stupid", -0.8), ("boring", -1.0), ("poor", -0.4), ("broken", -0.4),
    ("disappointing", -0.6), ("slow", -0.3), ("hard", -0.29), ("difficult", -0.5), ("scary", -0.5),
    ("dead", -0.2), ("fail", -0.5), ("failed", -0.5), ("crazy", -0.6), ("annoying", -0.8),
    ("useless", -0.5), ("dangerous", -0.6), ("fake", -0.5), ("problem", -0.2), ("lost", -0.3),
].into_iter().collect());

static INTENSIFIERS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| [
    ("very", 1.3), ("really", 1.2), ("extremely", 1.5), ("so", 1.2), ("super", 1.3),
    ("pretty", 1.1), ("slightly", 0.6), ("somewhat", 0.7),
].into_iter().collect());

const NEGATIONS: &[&str] = &["not", "no", "never", "dont", "doesnt", "isnt", "wasnt", "cant", "wont", "nothing"];

/// Small word-list estimator: averages the polarity of known words, scaling
/// by a preceding intensifier and flipping (at half strength) after a
/// negation. Text without known words is neutral.
#[derive(Default)]
pub struct LexiconEstimator {}

impl PolarityEstimator for LexiconEstimator {
    fn estimate_polarity(&self, text: &str) -> Result<f64, ScoringError> {
        let tokens: Vec<String> = text.split_whitespace()
            .map(|token| token.chars().filter(|c| c.is_alphabetic()).collect::<String>().to_lowercase())
            .filter(|token| !token.is_empty())
            .collect();

        let mut total = 0.0;
        let mut matched = 0;

        for (index, token) in tokens.iter().enumerate() {
            let polarity = match LEXICON.get(token.as_str()) {
                Some(v) => *v,
                None => continue,
            };

            let previous = index.checked_sub(1).map(|i| tokens[i].as_str());
            let before_previous = index.checked_sub(2).map(|i| tokens[i].as_str());

            let mut polarity = polarity;
            if let Some(multiplier) = previous.and_then(|word| INTENSIFIERS.get(word)) {
                polarity *= multiplier;
            }
            let negated = [previous, before_previous].iter()
                .flatten()
                .any(|word| NEGATIONS.contains(word));
            if negated {
                polarity *= -0.5;
            }

            total += polarity;
            matched += 1;
        }

        if matched == 0 {
            return Ok(0.0);
        }

        Ok((total / matched as f64).clamp(-1.0, 1.0))
    }
}

/// Transformer sentiment model from `rust-bert`. Downloads weights on first use.
#[cfg(feature = "bert")]
pub struct BertEstimator {
    model: rust_bert::pipelines::sentiment::SentimentModel,
}

#[cfg(feature = "bert")]
impl BertEstimator {
    pub fn new() -> Result<Self, rust_bert::RustBertError> {
        Ok(Self {
            model: rust_bert::pipelines::sentiment::SentimentModel::new(Default::default())?,
        })
    }
}

#[cfg(feature = "bert")]
impl PolarityEstimator for BertEstimator {
    fn estimate_polarity(&self, text: &str) -> Result<f64, ScoringError> {
        use rust_bert::pipelines::sentiment::SentimentPolarity;

        if text.trim().is_empty() {
            return Ok(0.0);
        }

        let output = self.model.predict(&[text]);
        let sentiment = output.first()
            .ok_or_else(|| ScoringError::Rejected("model returned no prediction".to_owned()))?;

        Ok(match sentiment.polarity {
            SentimentPolarity::Positive => sentiment.score,
            SentimentPolarity::Negative => -sentiment.score,
        })
    }
}
