use rand::Rng;
use serde::Serialize;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::room::Room;

/// Points shown on the temperature chart.
pub const CHART_POINTS: usize = 20;

const PLACEHOLDER_POINTS: i64 = 11;

/// Line dataset handed to the chart renderer in one piece.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Set when the points are a synthesized backfill rather than recorded history.
    pub placeholder: bool,
}

/// Chart component the adapter feeds.
pub trait ChartSink {
    fn replace_dataset(&mut self, dataset: Dataset);

    fn update(&mut self, animate: bool);
}

/// Last dataset pushed plus whether it was rendered animated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartView {
    #[serde(flatten)]
    pub dataset: Dataset,
    pub animated: bool,
}

impl ChartSink for ChartView {
    fn replace_dataset(&mut self, dataset: Dataset) {
        self.dataset = dataset;
    }

    fn update(&mut self, animate: bool) {
        self.animated = animate;
    }
}

#[derive(Debug, Clone)]
pub struct ChartAdapter {
    max_points: usize,
    offset: UtcOffset,
}

impl ChartAdapter {
    pub fn new(max_points: usize, offset: UtcOffset) -> Self {
        Self { max_points: max_points.max(1), offset }
    }

    /// Temperature series of `room`, the most recent `max_points` readings.
    ///
    /// An empty history yields an hourly backfill ending at the current
    /// reading, flagged as placeholder. The room itself is not modified.
    pub fn dataset<R: Rng + ?Sized>(&self, room: &Room, now: OffsetDateTime, rng: &mut R) -> Dataset {
        if room.history.is_empty() {
            let (labels, values) = (0..PLACEHOLDER_POINTS)
                .rev()
                .map(|hours_ago| {
                    let time = now - Duration::hours(hours_ago);
                    (self.label(time), room.temp - rng.random_range(0.0..2.0))
                })
                .unzip();

            return Dataset { labels, values, placeholder: true };
        }

        let skip = room.history.len().saturating_sub(self.max_points);
        let (labels, values) = room
            .history
            .iter()
            .skip(skip)
            .map(|reading| (self.label(reading.time), reading.value))
            .unzip();

        Dataset { labels, values, placeholder: false }
    }

    pub fn refresh<S, R>(&self, room: &Room, now: OffsetDateTime, rng: &mut R, sink: &mut S)
    where
        S: ChartSink + ?Sized,
        R: Rng + ?Sized,
    {
        sink.replace_dataset(self.dataset(room, now, rng));
        sink.update(false);
    }

    fn label(&self, time: OffsetDateTime) -> String {
        time.to_offset(self.offset)
            .format(format_description!("[hour]:[minute]:[second]"))
            .unwrap_or_default()
    }
}

impl Default for ChartAdapter {
    fn default() -> Self {
        Self::new(CHART_POINTS, UtcOffset::UTC)
    }
}
