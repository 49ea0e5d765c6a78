//! Recursive separator-aware text chunking with overlap.
//!
//! ## Why recursive separators?
//!
//! A chunk cut mid-sentence reads as garbage to the model and produces
//! garbage cards. Splitting recursively on semantically larger separators
//! first — paragraph breaks, then line breaks, then whitespace — means
//! chunks end at natural boundaries whenever the text allows it; the hard
//! character cut is a last resort for pathological input (one giant
//! unbroken token run).
//!
//! The overlap repeats each chunk's trailing characters at the start of the
//! next chunk so context spanning a boundary is visible on both sides.
//!
//! All sizes are measured in characters, not bytes, so multi-byte scripts
//! never split inside a code point.

/// Separators in decreasing semantic weight. The empty-string fallback is
/// the hard character cut handled by [`hard_split`].
const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

/// Split `text` into ordered chunks of at most `max_size` characters, with
/// up to `overlap` trailing characters repeated at the start of the next
/// chunk.
///
/// Empty or whitespace-only input yields an empty vector. Input that
/// already fits in one chunk is returned whole (trimmed). Deterministic:
/// same input and parameters always produce the same sequence.
pub fn chunk_text(text: &str, max_size: usize, overlap: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() || max_size == 0 {
        return Vec::new();
    }
    if char_len(text) <= max_size {
        return vec![text.to_string()];
    }

    let units = split_units(text, 0, max_size);
    merge_units(&units, max_size, overlap)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Recursively break `text` into units no longer than `max_size`, trying
/// each separator in order and keeping separators attached to the unit they
/// terminate (so rejoining loses nothing).
fn split_units(text: &str, sep_idx: usize, max_size: usize) -> Vec<String> {
    if char_len(text) <= max_size {
        return vec![text.to_string()];
    }
    if sep_idx >= SEPARATORS.len() {
        return hard_split(text, max_size);
    }

    let sep = SEPARATORS[sep_idx];
    if !text.contains(sep) {
        return split_units(text, sep_idx + 1, max_size);
    }

    let mut units = Vec::new();
    for part in text.split_inclusive(sep) {
        if char_len(part) <= max_size {
            units.push(part.to_string());
        } else {
            units.extend(split_units(part, sep_idx + 1, max_size));
        }
    }
    units
}

/// Last-resort fixed-width cut for text with no separators in range.
fn hard_split(text: &str, max_size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_size)
        .map(|window| window.iter().collect())
        .collect()
}

/// Greedily pack units into chunks of at most `max_size` characters,
/// carrying up to `overlap` characters of trailing units into the next
/// chunk.
fn merge_units(units: &[String], max_size: usize, overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut total = 0usize;

    for unit in units {
        let unit_len = char_len(unit);
        if total + unit_len > max_size && !current.is_empty() {
            push_chunk(&mut chunks, &current);
            // Retain a tail of whole units as the overlap seed. Keep
            // popping until the seed fits the overlap budget and leaves
            // room for the incoming unit.
            while !current.is_empty() && (total > overlap || total + unit_len > max_size) {
                total -= char_len(current[0]);
                current.remove(0);
            }
        }
        current.push(unit);
        total += unit_len;
    }
    push_chunk(&mut chunks, &current);

    chunks
}

fn push_chunk(chunks: &mut Vec<String>, units: &[&str]) {
    let joined: String = units.concat();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}
