//! Level 3: click the outliers off a scatter plot.

use derive_getters::Getters;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, instrument};

/// Cluster points per plot.
pub const CLUSTER_POINTS: usize = 20;

/// Outlier anchors; each outlier lands within 5 units up and right of one.
const OUTLIER_ANCHORS: [(f64, f64); 5] = [(20.0, 20.0), (75.0, 25.0), (25.0, 75.0), (15.0, 50.0), (80.0, 80.0)];

const CLUSTER_ORIGIN: f64 = 40.0;
const CLUSTER_SPREAD: f64 = 20.0;
const OUTLIER_JITTER: f64 = 5.0;

/// A point on the plot, coordinates in percent of the plot area.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    id: String,
    x: f64,
    y: f64,
    is_outlier: bool,
    removed: bool,
}

/// Result of clicking a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// Outlier removed, others remain.
    Removed {
        /// Outliers still on the plot.
        remaining: u32,
    },
    /// The last outlier was removed.
    Cleared,
    /// The point belongs to the main cluster; nothing changed.
    NotAnOutlier,
    /// The point was already removed or does not exist.
    Ignored,
}

/// Transient level 3 state.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierPlot {
    points: Vec<DataPoint>,
}

impl OutlierPlot {
    /// Generates 20 clustered points and 5 outliers.
    #[instrument(skip(rng))]
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let cluster = (0..CLUSTER_POINTS).map(|i| DataPoint {
            id: format!("normal-{i}"),
            x: CLUSTER_ORIGIN + rng.random::<f64>() * CLUSTER_SPREAD,
            y: CLUSTER_ORIGIN + rng.random::<f64>() * CLUSTER_SPREAD,
            is_outlier: false,
            removed: false,
        });
        let mut points: Vec<DataPoint> = cluster.collect();

        for (i, (ax, ay)) in OUTLIER_ANCHORS.iter().enumerate() {
            points.push(DataPoint {
                id: format!("outlier-{i}"),
                x: ax + rng.random::<f64>() * OUTLIER_JITTER,
                y: ay + rng.random::<f64>() * OUTLIER_JITTER,
                is_outlier: true,
                removed: false,
            });
        }

        debug!(points = points.len(), "Generated scatter plot");
        Self { points }
    }

    /// All points, removed ones included.
    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    /// Points still drawn.
    pub fn visible_points(&self) -> impl Iterator<Item = &DataPoint> {
        self.points.iter().filter(|p| !p.removed)
    }

    /// Outliers not yet removed.
    pub fn outliers_remaining(&self) -> u32 {
        self.points.iter().filter(|p| p.is_outlier && !p.removed).count() as u32
    }

    /// Returns true once every outlier is gone.
    pub fn is_cleared(&self) -> bool {
        self.outliers_remaining() == 0
    }

    /// What clicking `id` would do, without doing it.
    pub fn classify(&self, id: &str) -> RemovalOutcome {
        match self.points.iter().find(|p| p.id == id) {
            None => RemovalOutcome::Ignored,
            Some(point) if point.removed => RemovalOutcome::Ignored,
            Some(point) if !point.is_outlier => RemovalOutcome::NotAnOutlier,
            Some(_) => match self.outliers_remaining() - 1 {
                0 => RemovalOutcome::Cleared,
                remaining => RemovalOutcome::Removed { remaining },
            },
        }
    }

    /// Clicks `id`: outliers are removed, anything else is left alone.
    #[instrument(skip(self))]
    pub fn click(&mut self, id: &str) -> RemovalOutcome {
        let outcome = self.classify(id);
        if matches!(outcome, RemovalOutcome::Removed { .. } | RemovalOutcome::Cleared) {
            if let Some(point) = self.points.iter_mut().find(|p| p.id == id) {
                point.removed = true;
            }
            info!(id, remaining = self.outliers_remaining(), "Outlier removed");
        } else {
            debug!(id, ?outcome, "Click did not remove a point");
        }
        outcome
    }
}
