use crate::models::{Metric, Snapshot, SnapshotStore};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum Baseline {
    #[default]
    Previous,
    Initial,
}

impl Baseline {
    pub fn toggle(self) -> Self {
        match self {
            Baseline::Previous => Baseline::Initial,
            Baseline::Initial => Baseline::Previous,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Baseline::Previous => "previous fetch",
            Baseline::Initial => "session start",
        }
    }

    pub fn resolve(self, store: &SnapshotStore) -> Option<&Snapshot> {
        match self {
            Baseline::Previous => store.previous(),
            Baseline::Initial => store.initial(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Comparison {
    /// Baseline slot is still empty, either side lacks the metric, or the
    /// difference does not fit in an `i64`.
    Unavailable,
    Delta { value: i64, trend: Trend },
}

pub fn compare(current: &Snapshot, baseline: &Snapshot, metric: Metric) -> Comparison {
    let (current, baseline) = match (current.get(metric), baseline.get(metric)) {
        (Some(current), Some(baseline)) => (current, baseline),
        _ => return Comparison::Unavailable,
    };

    let value = match current.checked_sub(baseline) {
        Some(value) => value,
        None => return Comparison::Unavailable,
    };
    let trend = match value.signum() {
        1 => Trend::Up,
        -1 => Trend::Down,
        _ => Trend::Flat,
    };

    Comparison::Delta { value, trend }
}

pub fn delta(store: &SnapshotStore, metric: Metric, baseline: Baseline) -> Comparison {
    match (store.current(), baseline.resolve(store)) {
        (Some(current), Some(baseline)) => compare(current, baseline, metric),
        _ => Comparison::Unavailable,
    }
}
