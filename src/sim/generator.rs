/// Cypher text generator.
///
/// Fills a buffer of exactly `rows * columns` symbols with noise,
/// candidate words, and bracketed special tokens.
///
/// Each pass of the loop:
///   1. Noise run of `rnd(15) + 15 - L` chars (at least 1, cut to fit)
///   2. With `special_chance`: a special of `rnd(6) + 3` chars
///      otherwise: the next word of the shuffled list
///   3. A word/special that would reach the end of the buffer is skipped
///      for this pass
///
/// Every pass appends at least one cell, so the loop runs at most
/// `capacity` times.

use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::PuzzleConfig;
use crate::domain::symbol::{CandidateWord, Symbol};
use crate::error::TermlinkError;

/// Result of one generation: the full symbol stream plus its word list.
#[derive(Clone, Debug)]
pub struct Generated {
    pub symbols: Vec<Symbol>,
    pub candidates: Vec<CandidateWord>,
    /// Index into `candidates`.
    pub secret: usize,
    pub special_count: usize,
}

const BRACKETS: [(char, char); 3] = [('[', ']'), ('<', '>'), ('(', ')')];

pub fn generate<R: Rng + ?Sized>(
    words: &[String],
    length: usize,
    puzzle: &PuzzleConfig,
    rng: &mut R,
) -> Result<Generated, TermlinkError> {
    let max = puzzle.capacity();
    let mut shuffled: Vec<&String> = words.iter()
        .filter(|w| w.chars().count() == length)
        .collect();
    shuffled.shuffle(rng);

    let mut output: Vec<Symbol> = Vec::with_capacity(max);
    let mut candidates: Vec<CandidateWord> = Vec::new();
    let mut special_count = 0;

    while output.len() < max {
        let remaining = max - output.len();
        let run = (rng.gen_range(0..15) + 15_usize)
            .saturating_sub(length)
            .max(1)
            .min(remaining);
        push_noise(&mut output, run, &puzzle.noise, rng);

        if rng.gen::<f64>() < puzzle.special_chance {
            let special_len = rng.gen_range(0..6) + 3;
            if output.len() + special_len < max {
                push_special(&mut output, special_len, special_count, &puzzle.noise, rng);
                special_count += 1;
            }
        } else if let Some(word) = shuffled.get(candidates.len()) {
            if output.len() + length < max {
                let id = candidates.len();
                output.extend(word.chars().map(|c| Symbol::word(c, id)));
                candidates.push(CandidateWord { id, text: (*word).clone() });
            }
        }
    }

    if candidates.is_empty() {
        return Err(TermlinkError::NoCandidatePlaced { capacity: max, word_length: length });
    }

    let secret = rng.gen_range(0..candidates.len());
    info!(
        "generated {} cells: {} candidates, {} specials",
        output.len(), candidates.len(), special_count,
    );
    debug!("secret: {}", candidates[secret].text);

    Ok(Generated { symbols: output, candidates, secret, special_count })
}

/// Hex addresses for the row labels: a random base, then 1..=6 per row.
pub fn row_addresses<R: Rng + ?Sized>(rows: usize, rng: &mut R) -> Vec<u32> {
    let mut hex = rng.gen_range(0..0xF000_u32) + 0x0C00;
    (0..rows)
        .map(|_| {
            hex += rng.gen_range(0..6) + 1;
            hex
        })
        .collect()
}

fn noise_char<R: Rng + ?Sized>(noise: &[char], rng: &mut R) -> char {
    noise.choose(rng).copied().unwrap_or('.')
}

fn push_noise<R: Rng + ?Sized>(out: &mut Vec<Symbol>, n: usize, noise: &[char], rng: &mut R) {
    out.extend((0..n).map(|_| Symbol::noise(noise_char(noise, rng))));
}

/// Bracket pair odds: 0.3 / 0.3 / 0.4. Interior is at least one noise char.
fn push_special<R: Rng + ?Sized>(
    out: &mut Vec<Symbol>,
    len: usize,
    id: usize,
    noise: &[char],
    rng: &mut R,
) {
    let r: f64 = rng.gen();
    let (open, close) = if r < 0.3 {
        BRACKETS[0]
    } else if r < 0.6 {
        BRACKETS[1]
    } else {
        BRACKETS[2]
    };
    out.push(Symbol::special(open, id));
    for _ in 0..len.saturating_sub(2).max(1) {
        out.push(Symbol::special(noise_char(noise, rng), id));
    }
    out.push(Symbol::special(close, id));
}
