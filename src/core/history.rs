//! Rolling window of (tick, rate) samples for charting.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const HISTORY_CAPACITY: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DataPoint {
    pub time: u64,
    pub rate: f64,
}

/// Chronological samples; the oldest is evicted once the window is full.
#[derive(Debug, Clone)]
pub struct History {
    points: Vec<DataPoint>,
}

impl History {
    pub fn new() -> Self {
        Self {
            points: Vec::with_capacity(HISTORY_CAPACITY + 1),
        }
    }

    /// Append a sample and return the (possibly truncated) window.
    pub fn append(&mut self, point: DataPoint) -> &[DataPoint] {
        self.points.push(point);
        if self.points.len() > HISTORY_CAPACITY {
            self.points.remove(0);
        }
        &self.points
    }

    #[inline]
    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    #[inline]
    pub fn latest(&self) -> Option<&DataPoint> {
        self.points.last()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
