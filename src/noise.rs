//! Filler event generator
//!
//! Produces synthetic "noise" events to give a stream something to carry
//! while it looks for a listener. Three text modes:
//!
//!   words  - random picks from a word list
//!   bytes  - clusters of hex digits
//!   markov - first-order chain over a tiny seed corpus
//!
//! Every event carries Shannon entropy metrics over its characters, and
//! over its whitespace tokens for `words` and `markov`.

use rand::seq::SliceRandom;
use rand::Rng;
use seekbeacon_core::iso_timestamp;
use seekbeacon_seeking::BeaconHints;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::str::FromStr;

pub const DEFAULT_WORDS: &[&str] = &[
    "aurora", "flux", "drift", "lattice", "vector", "oblique", "quantum", "slag", "orb", "haze",
    "spire", "mono", "delta", "prism", "ion", "fractal", "pulse", "shard", "sable", "echo",
    "proto", "zenith", "phase", "morph", "grain",
];

const SEED_CORPUS: &str = "flux lattice echo drift aurora phase prism ion shard zenith";
const HEX_DIGITS: &[u8] = b"0123456789abcdef";

/// Reported as-is in every event. Not measured.
pub const NOMINAL_ENTROPY_BITS: u32 = 128;

/// Most distinct tokens copied into a beacon's `tokens_hint`.
const TOKENS_HINT_MAX: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseMode {
    Words,
    Bytes,
    Markov,
}

impl NoiseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Words => "words",
            Self::Bytes => "bytes",
            Self::Markov => "markov",
        }
    }

    /// Token metrics only make sense for word-like text.
    pub fn has_tokens(&self) -> bool {
        !matches!(self, Self::Bytes)
    }
}

impl std::fmt::Display for NoiseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoiseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "words" => Ok(Self::Words),
            "bytes" => Ok(Self::Bytes),
            "markov" => Ok(Self::Markov),
            other => Err(format!("unknown noise mode '{other}' (expected words, bytes or markov)")),
        }
    }
}

/// Tempo band of the interval that preceded an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Hf,
    Mf,
    Lf,
}

impl Band {
    pub fn from_interval(interval_s: f64) -> Self {
        if interval_s < 1.0 {
            Self::Hf
        } else if interval_s < 2.0 {
            Self::Mf
        } else {
            Self::Lf
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hf => "hf",
            Self::Mf => "mf",
            Self::Lf => "lf",
        }
    }
}

/// Mean Shannon entropy in bits per symbol. Zero for no symbols.
pub fn shannon_entropy<T, I>(symbols: I) -> f64
where
    T: Eq + Hash,
    I: IntoIterator<Item = T>,
{
    let mut counts: HashMap<T, usize> = HashMap::new();
    let mut total = 0usize;
    for s in symbols {
        *counts.entry(s).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }
    counts
        .values()
        .map(|&c| {
            let p = c as f64 / total as f64;
            -p * p.log2()
        })
        .sum()
}

fn round_to(x: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (x * scale).round() / scale
}

/// (symbol count, bits per symbol, total bits). Both entropies rounded to 6 places.
fn entropy_metrics<T: Eq + Hash>(symbols: Vec<T>) -> (usize, f64, f64) {
    let n = symbols.len();
    if n == 0 {
        return (0, 0.0, 0.0);
    }
    let avg = shannon_entropy(symbols);
    (n, round_to(avg, 6), round_to(avg * n as f64, 6))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenMetrics {
    pub token_count: usize,
    pub token_entropy_avg_bits: f64,
    pub token_entropy_total_bits: f64,
}

/// One generated filler event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoiseEvent {
    pub session: String,
    pub mode: NoiseMode,
    /// Wall-clock milliseconds at generation.
    pub seq: u64,
    pub band: Band,
    pub interval_s: f64,
    pub entropy_bits: u32,
    pub char_len: usize,
    pub char_entropy_avg_bits: f64,
    pub char_entropy_total_bits: f64,
    pub text: String,
    pub ts: String,
    #[serde(flatten)]
    pub tokens: Option<TokenMetrics>,
}

impl NoiseEvent {
    /// Up to five distinct tokens in order of first appearance.
    pub fn distinct_tokens(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.text
            .split_whitespace()
            .filter(|t| seen.insert(*t))
            .take(TOKENS_HINT_MAX)
            .map(str::to_string)
            .collect()
    }

    /// `<band>:<avg char bits>`, e.g. `mf:3.42`.
    pub fn entropy_profile(&self) -> String {
        format!("{}:{:.2}", self.band.as_str(), self.char_entropy_avg_bits)
    }

    /// Beacon payload hints derived from this event.
    pub fn beacon_hints(&self) -> BeaconHints {
        BeaconHints::new()
            .entropy_profile(self.entropy_profile())
            .tokens_hint(self.distinct_tokens())
            .spore(self.session.clone())
    }
}

/// Everything the generator writes to its output, one JSON line each.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NoiseRecord {
    NoiseStart {
        session: String,
        mode: NoiseMode,
        entropy_bits: u32,
        ts: String,
    },
    NoiseMeta(NoiseEvent),
    NoiseStop {
        session: String,
        ts: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoiseConfig {
    pub mode: NoiseMode,
    /// Never empty.
    words: Vec<String>,
    pub max_words: usize,
    pub token_entropy: bool,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            mode: NoiseMode::Markov,
            words: DEFAULT_WORDS.iter().map(|w| w.to_string()).collect(),
            max_words: 8,
            token_entropy: true,
        }
    }
}

impl NoiseConfig {
    pub fn new(mode: NoiseMode) -> Self {
        Self { mode, ..Self::default() }
    }

    /// Comma separated override for the `words` list. Blank entries are
    /// dropped; an effectively empty list keeps the defaults.
    pub fn with_wordset(mut self, raw: &str) -> Self {
        let words: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        if !words.is_empty() {
            self.words = words;
        }
        self
    }

    pub fn with_token_entropy(mut self, enabled: bool) -> Self {
        self.token_entropy = enabled;
        self
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }
}

pub struct NoiseGenerator {
    config: NoiseConfig,
    session: String,
    corpus: Vec<&'static str>,
    chain: HashMap<&'static str, Vec<&'static str>>,
}

impl NoiseGenerator {
    pub fn new(config: NoiseConfig) -> Self {
        let mut session = uuid::Uuid::new_v4().simple().to_string();
        session.truncate(12);
        Self::with_session(config, session)
    }

    pub fn with_session(config: NoiseConfig, session: impl Into<String>) -> Self {
        let corpus: Vec<&'static str> = SEED_CORPUS.split_whitespace().collect();
        let mut chain: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
        for pair in corpus.windows(2) {
            chain.entry(pair[0]).or_default().push(pair[1]);
        }
        Self {
            config,
            session: session.into(),
            corpus,
            chain,
        }
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    pub fn config(&self) -> &NoiseConfig {
        &self.config
    }

    pub fn start_record(&self, now: f64) -> NoiseRecord {
        NoiseRecord::NoiseStart {
            session: self.session.clone(),
            mode: self.config.mode,
            entropy_bits: NOMINAL_ENTROPY_BITS,
            ts: iso_timestamp(now),
        }
    }

    pub fn stop_record(&self, now: f64) -> NoiseRecord {
        NoiseRecord::NoiseStop {
            session: self.session.clone(),
            ts: iso_timestamp(now),
        }
    }

    /// Generate one event for an interval of `interval_s` ending at `now`.
    pub fn event<R: Rng + ?Sized>(&self, rng: &mut R, interval_s: f64, now: f64) -> NoiseEvent {
        let text = self.text(rng);
        let (char_len, char_avg, char_total) = entropy_metrics(text.chars().collect());

        let tokens = (self.config.mode.has_tokens() && self.config.token_entropy).then(|| {
            let (token_count, avg, total) = entropy_metrics(text.split_whitespace().collect());
            TokenMetrics {
                token_count,
                token_entropy_avg_bits: avg,
                token_entropy_total_bits: total,
            }
        });

        NoiseEvent {
            session: self.session.clone(),
            mode: self.config.mode,
            seq: (now * 1000.0).max(0.0) as u64,
            band: Band::from_interval(interval_s),
            interval_s: round_to(interval_s, 3),
            entropy_bits: NOMINAL_ENTROPY_BITS,
            char_len,
            char_entropy_avg_bits: char_avg,
            char_entropy_total_bits: char_total,
            text,
            ts: iso_timestamp(now),
            tokens,
        }
    }

    pub fn text<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        match self.config.mode {
            NoiseMode::Words => self.word_text(rng),
            NoiseMode::Bytes => hex_text(rng),
            NoiseMode::Markov => self.markov_text(rng),
        }
    }

    fn word_count<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.gen_range(3..=self.config.max_words.max(3))
    }

    fn word_text<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let count = self.word_count(rng);
        (0..count)
            .filter_map(|_| self.config.words.choose(rng))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn markov_text<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let count = self.word_count(rng);
        let mut out = Vec::with_capacity(count);
        let mut current = self.corpus.choose(rng).copied();
        while let Some(token) = current {
            if out.len() == count {
                break;
            }
            out.push(token);
            // Dead ends restart from anywhere in the corpus.
            current = match self.chain.get(token) {
                Some(next) => next.choose(rng).copied(),
                None => self.corpus.choose(rng).copied(),
            };
        }
        out.join(" ")
    }
}

fn hex_text<R: Rng + ?Sized>(rng: &mut R) -> String {
    let clusters = rng.gen_range(4..=12) / 2;
    (0..clusters)
        .map(|_| {
            let len = 2 * rng.gen_range(2..=4);
            (0..len)
                .map(|_| HEX_DIGITS[rng.gen_range(0..HEX_DIGITS.len())] as char)
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(" ")
}
