//! "Did you mean" hints for misspelled names.

use itertools::Itertools as _;

const MAX_SUGGESTIONS: usize = 5;

/// Options close enough to `input` to be suggested, closest first.
///
/// Distance is the optimal string alignment one: insertions, deletions,
/// substitutions and adjacent transpositions each cost one edit. An option
/// is kept when its distance to `input` is at most half the length of the
/// longer of the two, and never less than one edit.
pub(crate) fn suggestion_list<'o>(
    input: &str,
    options: impl IntoIterator<Item = &'o str>,
) -> Vec<&'o str> {
    let input_threshold = input.chars().count() as f64 / 2.0;
    options
        .into_iter()
        .filter_map(|option| {
            let distance = strsim::osa_distance(input, option);
            let threshold = input_threshold
                .max(option.chars().count() as f64 / 2.0)
                .max(1.0);
            (distance as f64 <= threshold).then_some((distance, option))
        })
        .sorted_by_key(|(distance, _)| *distance)
        .map(|(_, option)| option)
        .collect()
}

/// Renders at most five items as `"A", "B", or "C"`.
pub(crate) fn quoted_or_list(items: &[&str]) -> String {
    let selected = &items[..items.len().min(MAX_SUGGESTIONS)];
    let separator = if selected.len() > 2 { ", " } else { " " };
    selected
        .iter()
        .enumerate()
        .map(|(i, item)| {
            if i > 0 && i == selected.len() - 1 {
                format!("or \"{item}\"")
            } else {
                format!("\"{item}\"")
            }
        })
        .join(separator)
}

/// ` Did you mean ...?` suffix for a message, or nothing without
/// suggestions.
pub(crate) fn did_you_mean(suggestions: &[&str]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" Did you mean {}?", quoted_or_list(suggestions))
    }
}
