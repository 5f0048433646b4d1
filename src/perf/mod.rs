/// Performance measurement utilities
/// Per-frame render metrics plus scoped timers
pub mod profiling;

pub use profiling::{CounterSnapshot, PipelineCounters, PIPELINE_COUNTERS};

use std::fmt;
use std::time::{Duration, Instant};

/// How often the `avg_*` timings are refreshed.
pub const AVERAGE_INTERVAL: Duration = Duration::from_millis(100);

pub struct PerfTimer {
    name: &'static str,
    start: Instant,
}

impl PerfTimer {
    #[inline]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for PerfTimer {
    fn drop(&mut self) {
        log::trace!("[PERF] {}: {}μs", self.name, self.elapsed().as_micros());
    }
}

/// Macro for easy performance measurement
#[macro_export]
macro_rules! perf_scope {
    ($name:expr) => {
        let _timer = $crate::perf::PerfTimer::new($name);
    };
}

/// Read-only record of one `render` call, reset at the start of every frame.
///
/// Timings accumulate over the frame. Every [`AVERAGE_INTERVAL`] the running
/// values are copied into the `avg_*` fields so overlays get a stable readout.
#[derive(Clone, Debug, Default)]
pub struct FrameMetrics {
    pub drawn_triangles: usize,
    pub total_triangles: usize,
    pub drawn_parts: usize,
    pub total_parts: usize,
    pub total_lights: usize,
    pub active_lights: usize,

    pub frame_time: Duration,
    /// Time spent posing parts into clip space.
    pub animation_time: Duration,
    pub lighting_time: Duration,

    pub avg_frame_time: Duration,
    pub avg_animation_time: Duration,
    pub avg_lighting_time: Duration,
    last_average: Option<Instant>,
}

impl FrameMetrics {
    /// Zero the counts and running timings. Averages survive.
    pub fn reset(&mut self) {
        self.drawn_triangles = 0;
        self.total_triangles = 0;
        self.drawn_parts = 0;
        self.total_parts = 0;
        self.total_lights = 0;
        self.active_lights = 0;
        self.frame_time = Duration::ZERO;
        self.animation_time = Duration::ZERO;
        self.lighting_time = Duration::ZERO;
    }

    /// Snapshot the running timings if the interval has elapsed.
    pub fn update_averages(&mut self, now: Instant) {
        let due = self
            .last_average
            .map_or(true, |last| now.duration_since(last) >= AVERAGE_INTERVAL);
        if due {
            self.avg_frame_time = self.frame_time;
            self.avg_animation_time = self.animation_time;
            self.avg_lighting_time = self.lighting_time;
            self.last_average = Some(now);
        }
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

impl fmt::Display for FrameMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "frame:      {:6.2}ms", millis(self.avg_frame_time))?;
        writeln!(f, "animation:  {:6.2}ms", millis(self.avg_animation_time))?;
        writeln!(f, "lighting:   {:6.2}ms", millis(self.avg_lighting_time))?;
        writeln!(f, "parts:      {}/{}", self.drawn_parts, self.total_parts)?;
        writeln!(f, "triangles:  {}/{}", self.drawn_triangles, self.total_triangles)?;
        write!(f, "lights:     {}/{}", self.active_lights, self.total_lights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_keeps_averages() {
        let mut metrics = FrameMetrics {
            drawn_triangles: 4,
            frame_time: Duration::from_millis(3),
            ..Default::default()
        };
        metrics.update_averages(Instant::now());
        metrics.reset();

        assert_eq!(metrics.drawn_triangles, 0);
        assert_eq!(metrics.frame_time, Duration::ZERO);
        assert_eq!(metrics.avg_frame_time, Duration::from_millis(3));
    }

    #[test]
    fn averages_refresh_on_interval() {
        let start = Instant::now();
        let mut metrics = FrameMetrics::default();

        metrics.frame_time = Duration::from_millis(1);
        metrics.update_averages(start);
        metrics.frame_time = Duration::from_millis(9);
        metrics.update_averages(start + Duration::from_millis(50));
        assert_eq!(metrics.avg_frame_time, Duration::from_millis(1));

        metrics.update_averages(start + AVERAGE_INTERVAL);
        assert_eq!(metrics.avg_frame_time, Duration::from_millis(9));
    }

    #[test]
    fn summary_lists_counts() {
        let metrics = FrameMetrics {
            drawn_parts: 2,
            total_parts: 3,
            ..Default::default()
        };
        assert!(metrics.to_string().contains("parts:      2/3"));
    }
}
