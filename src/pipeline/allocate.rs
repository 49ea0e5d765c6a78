//! Card-count distribution across chunks.
//!
//! The total requested card count is split so the per-chunk quotas sum to
//! the total *exactly*: integer division gives every chunk a base quota and
//! the remainder is front-loaded one card at a time. Front-loading (rather
//! than, say, rounding) keeps the distribution deterministic and biased
//! toward the start of the document, where source material usually carries
//! the densest context.

/// Split `total_cards` into `chunk_count` per-chunk quotas.
///
/// Returns a vector of length `chunk_count` summing to `total_cards`, each
/// entry within 1 of the mean, first `total_cards % chunk_count` entries one
/// higher. `chunk_count == 0` means no work: an empty vector, never a
/// divide-by-zero.
pub fn allocate(total_cards: usize, chunk_count: usize) -> Vec<usize> {
    if chunk_count == 0 {
        return Vec::new();
    }

    let base = total_cards / chunk_count;
    let remainder = total_cards % chunk_count;

    (0..chunk_count)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}
