//! Shared numeric and sequence helpers
//!
//! Every metric averages through [`average`] or [`ratio`], so an empty set of
//! observations always yields 0.0 instead of a division by zero.

use crate::types::Label;

/// Arithmetic mean, 0.0 when there are no values
pub fn average<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// `numerator / denominator`, 0.0 when the denominator is zero
pub fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Consecutive (previous, current) pairs; empty for fewer than two items
pub fn adjacent_pairs<T>(items: &[T]) -> impl Iterator<Item = (&T, &T)> {
    items.windows(2).map(|pair| (&pair[0], &pair[1]))
}

/// A maximal stretch of consecutive equal community colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run<'a> {
    pub color: Option<&'a Label>,
    pub len: usize,
}

/// Split a color sequence into maximal runs.
///
/// A null color never continues a run, so every null entry forms its own run
/// of length 1 and also breaks the run of the colors around it.
pub fn runs<'a, I>(colors: I) -> Vec<Run<'a>>
where
    I: IntoIterator<Item = Option<&'a Label>>,
{
    let mut runs = Vec::new();
    let mut current: Option<Run<'a>> = None;

    for color in colors {
        match current.as_mut() {
            Some(run) if continues(run.color, color) => run.len += 1,
            _ => {
                if let Some(finished) = current.take() {
                    runs.push(finished);
                }
                current = Some(Run { color, len: 1 });
            }
        }
    }

    if let Some(last) = current {
        runs.push(last);
    }
    runs
}

fn continues(previous: Option<&Label>, next: Option<&Label>) -> bool {
    matches!((previous, next), (Some(a), Some(b)) if a == b)
}
