//! Descriptive statistics over finite samples

use std::hash::Hash;

use rustc_hash::FxHashMap;
use serde::Serialize;

/// Arithmetic mean; `None` for an empty sample.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median with the even-count midpoint rule; `None` for an empty sample.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Most frequent value(s). Ties are all reported, in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mode<T> {
    pub values: Vec<T>,
    pub frequency: usize,
}

impl<T> Mode<T> {
    pub fn is_tie(&self) -> bool {
        self.values.len() > 1
    }
}

/// Every value sharing the highest frequency; `None` for an empty sample.
pub fn modes<'a, T, I>(values: I) -> Option<Mode<T>>
where
    T: Hash + Eq + Ord + Clone + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut counts: FxHashMap<&T, usize> = FxHashMap::default();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }
    let frequency = counts.values().copied().max()?;
    let mut tied: Vec<T> = counts
        .into_iter()
        .filter(|&(_, n)| n == frequency)
        .map(|(v, _)| v.clone())
        .collect();
    tied.sort();
    Some(Mode {
        values: tied,
        frequency,
    })
}

/// Mode of an integer sample, kept only when some value repeats.
pub fn recurring_mode(values: &[u64]) -> Option<Mode<u64>> {
    modes(values).filter(|m| m.frequency > 1)
}

/// Summary of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Integer columns only; absent when every value is distinct
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode<u64>>,
}

impl Distribution {
    /// `None` for an empty sample.
    pub fn from_reals(values: &[f64]) -> Option<Self> {
        let mean = mean(values)?;
        let median = median(values)?;
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        Some(Self {
            count: values.len(),
            mean,
            median,
            min,
            max,
            mode: None,
        })
    }

    /// Like [`from_reals`](Self::from_reals), plus the mode.
    pub fn from_counts(values: &[u64]) -> Option<Self> {
        let reals: Vec<f64> = values.iter().map(|&v| v as f64).collect();
        let mut dist = Self::from_reals(&reals)?;
        dist.mode = recurring_mode(values);
        Some(dist)
    }
}
