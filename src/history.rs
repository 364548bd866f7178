// Trailing trend windows for the cluster charts. The first sample is padded with a
// short synthetic back-fill so a chart never starts with a single point.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use serde::Serialize;

use crate::fallback::{jitter, round2};
use crate::models::{AggregationResult, NodeResourceSample};

/// Points in the back-fill, including the live point at the end.
pub const BACKFILL_POINTS: usize = 3;
/// Spacing of back-filled points in seconds, matching the poll interval.
pub const BACKFILL_STEP_SECS: i64 = 30;

const CPU_JITTER: f64 = 2.5;
const MEMORY_JITTER: f64 = 1.5;

/// One chart point: a value per node at one time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub time: DateTime<Utc>,
    pub values: BTreeMap<String, f64>,
    /// Invented for display (back-fill or fallback data); never real history.
    pub synthetic: bool,
}

#[derive(Debug, Clone)]
pub struct SeriesWindow {
    points: VecDeque<SeriesPoint>,
    capacity: usize,
    jitter: f64,
}

impl SeriesWindow {
    pub fn new(capacity: usize, jitter: f64) -> Self {
        let capacity = capacity.max(BACKFILL_POINTS);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
            jitter,
        }
    }

    /// Appends a point. On an empty window the point is preceded by back-filled points.
    /// The oldest points are evicted once the window is full.
    pub fn push<R: Rng + ?Sized>(
        &mut self,
        time: DateTime<Utc>,
        values: BTreeMap<String, f64>,
        synthetic: bool,
        rng: &mut R,
    ) {
        if values.is_empty() {
            return;
        }
        if self.points.is_empty() {
            self.points
                .extend(backfill(time, &values, self.jitter, rng));
        }
        self.points.push_back(SeriesPoint {
            time,
            values,
            synthetic,
        });
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn points(&self) -> Vec<SeriesPoint> {
        self.points.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// The `BACKFILL_POINTS - 1` synthetic points that precede `time`, oldest first, each
/// value jittered by at most `half_width` and kept within 0..=100.
pub fn backfill<R: Rng + ?Sized>(
    time: DateTime<Utc>,
    values: &BTreeMap<String, f64>,
    half_width: f64,
    rng: &mut R,
) -> Vec<SeriesPoint> {
    (1..BACKFILL_POINTS)
        .rev()
        .map(|steps_back| SeriesPoint {
            time: time - TimeDelta::seconds(BACKFILL_STEP_SECS * steps_back as i64),
            values: values
                .iter()
                .map(|(node, v)| {
                    let jittered = (v + jitter(rng, half_width)).clamp(0.0, 100.0);
                    (node.clone(), round2(jittered))
                })
                .collect(),
            synthetic: true,
        })
        .collect()
}

/// CPU and memory trend windows for the whole cluster.
#[derive(Debug, Clone)]
pub struct ClusterHistory {
    cpu: SeriesWindow,
    memory: SeriesWindow,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistorySnapshot {
    pub cpu: Vec<SeriesPoint>,
    pub memory: Vec<SeriesPoint>,
}

impl ClusterHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            cpu: SeriesWindow::new(capacity, CPU_JITTER),
            memory: SeriesWindow::new(capacity, MEMORY_JITTER),
        }
    }

    /// Records one aggregation as-is. Points from fallback results are marked synthetic.
    pub fn record<R: Rng + ?Sized>(
        &mut self,
        result: &AggregationResult<NodeResourceSample>,
        rng: &mut R,
    ) {
        let time = result.timestamp;
        let synthetic = result.used_fallback;
        let cpu = per_node(&result.items, |s| s.cpu_usage_percent);
        let memory = per_node(&result.items, |s| s.memory_usage_percent);
        self.cpu.push(time, cpu, synthetic, rng);
        self.memory.push(time, memory, synthetic, rng);
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            cpu: self.cpu.points(),
            memory: self.memory.points(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cpu.is_empty()
    }
}

fn per_node(
    samples: &[NodeResourceSample],
    value: impl Fn(&NodeResourceSample) -> f64,
) -> BTreeMap<String, f64> {
    samples
        .iter()
        .map(|s| (s.node_id.clone(), value(s)))
        .collect()
}
