//! Script detection for record values.
//!
//! Directory data mixes Latin and Bengali text. Values containing Bengali
//! get a style hint and `lang="bn"` when rendered.

use std::ops::RangeInclusive;

/// The Unicode Bengali block.
const BENGALI_BLOCK: RangeInclusive<char> = '\u{0980}'..='\u{09FF}';

/// Check if a string contains any character from the Bengali block.
pub fn contains_bengali(s: &str) -> bool {
    s.chars().any(|c| BENGALI_BLOCK.contains(&c))
}
