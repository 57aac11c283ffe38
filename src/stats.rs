//! Rating histograms, derived statistics and the run-wide aggregator.

use std::{cmp::Ordering, fmt};

use indexmap::IndexMap;

use crate::{
    canon::CanonTable,
    data::{Item, Rating, MAX_RATING},
};

pub const BUCKETS: usize = MAX_RATING as usize + 1;

/// Fixed 11-bucket count of items by score, bucket 0 for unrated.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Histogram([u64; BUCKETS]);

impl Histogram {
    pub fn add(&mut self, score: Rating) {
        self.0[score as usize] += 1;
    }

    pub fn merge(&mut self, other: &Histogram) {
        for (a, b) in self.0.iter_mut().zip(&other.0) {
            *a += b;
        }
    }

    pub fn counts(&self) -> &[u64; BUCKETS] {
        &self.0
    }

    pub fn count(&self, score: Rating) -> u64 {
        self.0[score as usize]
    }

    /// Items with a nonzero score.
    pub fn ranked(&self) -> u64 {
        self.0[1..].iter().sum()
    }

    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    /// Largest single ranked bucket, for bar chart scaling.
    pub fn max_ranked(&self) -> u64 {
        self.0[1..].iter().copied().max().unwrap_or(0)
    }

    /// Weighted mean and standard deviation over the ranked buckets.
    /// Both come out NaN when nothing is ranked; that is not an error
    /// and such entries sort below everything else.
    pub fn stats(&self) -> Stats {
        let ranked = self.ranked();
        let sum: u64 = self
            .0
            .iter()
            .enumerate()
            .skip(1)
            .map(|(score, &n)| score as u64 * n)
            .sum();
        let mean = sum as f64 / ranked as f64;
        let var = self
            .0
            .iter()
            .enumerate()
            .skip(1)
            .map(|(score, &n)| n as f64 * (score as f64 - mean).powi(2))
            .sum::<f64>()
            / ranked as f64;
        Stats {
            total: self.total(),
            ranked,
            rating: Interval {
                mean,
                stdev: var.sqrt(),
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    pub mean: f64,
    pub stdev: f64,
}

impl Interval {
    pub fn is_nan(&self) -> bool {
        assert!(self.mean.is_nan() == self.stdev.is_nan());
        self.mean.is_nan()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}±{:.2}", self.mean, self.stdev)
    }
}

/// Statistics derived once from a finalized histogram.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stats {
    pub total: u64,
    pub ranked: u64,
    pub rating: Interval,
}

/// One canonical tag after variant merging. The display name is
/// whatever raw spelling was first accumulated for the key.
#[derive(Clone, Debug)]
pub struct TagRecord {
    pub display: String,
    pub hist: Histogram,
}

/// Shared accumulators for one run. `accumulate` is the only
/// mutation point during collection.
#[derive(Clone, Debug, Default)]
pub struct Aggregator {
    pub overall: Histogram,
    raw: IndexMap<String, Histogram>,
}

impl Aggregator {
    /// Record an accepted item: bump the overall histogram and every
    /// raw tag's histogram at the item's score. Tags on unrated
    /// items still count into bucket 0.
    pub fn accumulate(&mut self, item: &Item) {
        self.overall.add(item.score);
        for tag in &item.tags {
            self.raw.entry(tag.clone()).or_default().add(item.score);
        }
    }

    /// Fold raw spelling variants into canonical tags. Runs exactly
    /// once, after collection completes, since canonicalization
    /// wants the whole observed vocabulary at once. The result is
    /// never mutated again.
    pub fn merge_variants(self) -> Merged {
        let table = CanonTable::build(self.raw.keys().map(String::as_str));

        let mut tags: IndexMap<String, TagRecord> = IndexMap::new();
        for (raw, hist) in self.raw {
            let key = table.key(&raw).to_string();
            tags.entry(key)
                .or_insert_with(|| TagRecord {
                    display: raw,
                    hist: Histogram::default(),
                })
                .hist
                .merge(&hist);
        }

        Merged {
            overall: self.overall,
            tags,
        }
    }
}

/// Frozen output of the merge step.
#[derive(Clone, Debug, Default)]
pub struct Merged {
    pub overall: Histogram,
    pub tags: IndexMap<String, TagRecord>,
}

#[derive(Clone, Debug)]
pub struct TagStats {
    pub tag: String,
    pub stats: Stats,
}

impl Merged {
    /// Derive statistics for every canonical tag, ordered by the
    /// ranking rule: mean descending, then stdev ascending, then
    /// ranked and total descending. NaN means sink below every
    /// number. The sort is stable, so full ties keep merge insertion
    /// order.
    pub fn tag_stats(&self) -> Vec<TagStats> {
        let mut result: Vec<TagStats> = self
            .tags
            .values()
            .map(|rec| TagStats {
                tag: rec.display.clone(),
                stats: rec.hist.stats(),
            })
            .collect();
        result.sort_by(|l, r| {
            sort_key(&r.stats)
                .partial_cmp(&sort_key(&l.stats))
                .unwrap_or(Ordering::Equal)
        });
        result
    }
}

/// Descending composite sort key. NaN fields map to negative
/// infinity so the key tuple never contains a NaN and undefined
/// ratings order below all defined ones.
fn sort_key(stats: &Stats) -> (f64, f64, u64, u64) {
    let mean = if stats.rating.mean.is_nan() {
        f64::NEG_INFINITY
    } else {
        stats.rating.mean
    };
    // Lower stdev ranks higher, so negate it.
    let stdev = if stats.rating.stdev.is_nan() {
        f64::NEG_INFINITY
    } else {
        -stats.rating.stdev
    };
    (mean, stdev, stats.ranked, stats.total)
}
