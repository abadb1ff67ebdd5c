use std::collections::BTreeMap;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    Articles,
    Edits,
    Images,
    Users,
    ActiveUsers,
    Admins,
}

pub static METRICS: &[Metric] = &[
    Metric::Articles,
    Metric::Edits,
    Metric::Images,
    Metric::Users,
    Metric::ActiveUsers,
    Metric::Admins,
];

impl Metric {
    pub fn label(self) -> &'static str {
        match self {
            Metric::Articles => "Total Articles",
            Metric::Edits => "Total Edits",
            Metric::Images => "Total Images",
            Metric::Users => "Total Users",
            Metric::ActiveUsers => "Active Users",
            Metric::Admins => "Admins",
        }
    }
}

/// One fetched set of statistics. A metric the server did not report is
/// simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    values: BTreeMap<Metric, i64>,
}

impl Snapshot {
    pub fn get(&self, metric: Metric) -> Option<i64> {
        self.values.get(&metric).copied()
    }
}

impl FromIterator<(Metric, i64)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (Metric, i64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Holds the current, previous and first-of-session snapshots.
///
/// `record_fetch` is the only way to change any of them.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: Option<Snapshot>,
    previous: Option<Snapshot>,
    initial: Option<Snapshot>,
}

impl SnapshotStore {
    pub fn record_fetch(&mut self, snapshot: Snapshot) {
        if self.initial.is_none() {
            self.initial = Some(snapshot.clone());
        }

        if let Some(current) = self.current.take() {
            self.previous = Some(current);
        }

        self.current = Some(snapshot);
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.current.as_ref()
    }

    pub fn previous(&self) -> Option<&Snapshot> {
        self.previous.as_ref()
    }

    pub fn initial(&self) -> Option<&Snapshot> {
        self.initial.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn articles(value: i64) -> Snapshot {
        [(Metric::Articles, value)].into_iter().collect()
    }

    #[test]
    fn initial_is_kept_from_first_fetch() {
        let mut store = SnapshotStore::default();

        for value in [100, 105, 103, 110] {
            store.record_fetch(articles(value));
            assert_eq!(store.initial(), Some(&articles(100)));
        }

        assert_eq!(store.current(), Some(&articles(110)));
    }

    #[test]
    fn previous_follows_current() {
        let mut store = SnapshotStore::default();

        store.record_fetch(articles(1));
        assert!(store.previous().is_none());

        store.record_fetch(articles(2));
        assert_eq!(store.previous(), Some(&articles(1)));

        store.record_fetch(articles(3));
        assert_eq!(store.previous(), Some(&articles(2)));
        assert_eq!(store.current(), Some(&articles(3)));
    }

    #[test]
    fn missing_metric_reads_as_absent() {
        let snapshot = articles(42);

        assert_eq!(snapshot.get(Metric::Articles), Some(42));
        assert_eq!(snapshot.get(Metric::Admins), None);
    }
}
