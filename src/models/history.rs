use chrono::{DateTime, Local};
use itertools::{Itertools, MinMaxResult};

use crate::models::{Metric, Snapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPoint {
    pub timestamp: DateTime<Local>,
    pub value: Option<i64>,
}

/// Records the tracked metric's value for every snapshot received since the
/// metric was last selected. The series is never capped.
#[derive(Debug, Default)]
pub struct History {
    tracked: Option<Metric>,
    series: Vec<HistoryPoint>,
}

impl History {
    /// Selecting always starts a fresh series, even for the same metric.
    pub fn select(&mut self, metric: Metric) {
        self.tracked = Some(metric);
        self.series.clear();
    }

    pub fn deselect(&mut self) {
        self.tracked = None;
        self.series.clear();
    }

    pub fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self.on_snapshot_at(snapshot, Local::now());
    }

    pub fn on_snapshot_at(&mut self, snapshot: &Snapshot, timestamp: DateTime<Local>) {
        if let Some(metric) = self.tracked {
            self.series.push(HistoryPoint {
                timestamp,
                value: snapshot.get(metric),
            });
        }
    }

    pub fn tracked(&self) -> Option<Metric> {
        self.tracked
    }

    pub fn series(&self) -> &[HistoryPoint] {
        &self.series
    }

    /// Chart coordinates: seconds since the first point, value. Points without
    /// a value are left out.
    pub fn points(&self) -> Vec<(f64, f64)> {
        let origin = match self.series.first() {
            Some(point) => point.timestamp,
            None => return Vec::new(),
        };

        self.series
            .iter()
            .filter_map(|point| {
                let value = point.value?;
                let secs = (point.timestamp - origin).num_milliseconds() as f64 / 1_000f64;

                Some((secs, value as f64))
            })
            .collect()
    }

    pub fn time_bounds(&self) -> [f64; 2] {
        match (self.series.first(), self.series.last()) {
            (Some(first), Some(last)) => {
                let span =
                    (last.timestamp - first.timestamp).num_milliseconds() as f64 / 1_000f64;

                [0f64, span.max(1f64)]
            }
            _ => [0f64, 1f64],
        }
    }

    /// Value range padded to the next power-of-ten step so a flat line does
    /// not sit on the chart border.
    pub fn value_bounds(&self) -> [f64; 2] {
        let (low, high) = match self.series.iter().filter_map(|p| p.value).minmax() {
            MinMaxResult::NoElements => return [0f64, 1f64],
            MinMaxResult::OneElement(value) => (value, value),
            MinMaxResult::MinMax(low, high) => (low, high),
        };

        let diff = high as f64 - low as f64;
        let mut incr = 10f64;
        let scale = loop {
            if diff - incr < 0f64 {
                break incr / 2f64;
            }

            incr *= 10f64;
        };

        [low as f64 - scale, high as f64 + scale]
    }
}
