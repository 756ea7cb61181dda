//! Text normalization for the console and notification sinks.
//!
//! Event lines may carry target names and site labels written with
//! diacritics; downstream sinks (legacy console codepages, chat webhooks
//! with naive escaping) expect a constrained character set. All
//! human-readable output passes through [`fold_ascii`] before emission.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Strip diacritics from a string by decomposing it (NFD) and dropping the
/// combining marks. Characters that do not decompose keep their identity,
/// except for the Vietnamese crossed d which has no canonical decomposition
/// and is mapped by hand.
pub fn fold_ascii(input: &str) -> String {
    input
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            'đ' => 'd',
            'Đ' => 'D',
            c => c,
        })
        .collect()
}
