/// Instrumentation and profiling infrastructure
/// Pipeline event counters and optional hardware performance counters
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for pipeline events
pub struct PipelineCounters {
    pub render_calls: AtomicU64,
    pub parts_rendered: AtomicU64,

    // Triangle counters
    pub triangles_tested: AtomicU64,
    pub triangles_rejected_near_far: AtomicU64,
    pub triangles_rejected_offscreen: AtomicU64,
    pub triangles_culled_backface: AtomicU64,

    // Fragment counters
    pub fragments_shaded: AtomicU64,
    pub fragments_written: AtomicU64,
}

impl PipelineCounters {
    pub const fn new() -> Self {
        Self {
            render_calls: AtomicU64::new(0),
            parts_rendered: AtomicU64::new(0),
            triangles_tested: AtomicU64::new(0),
            triangles_rejected_near_far: AtomicU64::new(0),
            triangles_rejected_offscreen: AtomicU64::new(0),
            triangles_culled_backface: AtomicU64::new(0),
            fragments_shaded: AtomicU64::new(0),
            fragments_written: AtomicU64::new(0),
        }
    }

    fn all(&self) -> [&AtomicU64; 8] {
        [
            &self.render_calls,
            &self.parts_rendered,
            &self.triangles_tested,
            &self.triangles_rejected_near_far,
            &self.triangles_rejected_offscreen,
            &self.triangles_culled_backface,
            &self.fragments_shaded,
            &self.fragments_written,
        ]
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        for counter in self.all() {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> CounterSnapshot {
        let [
            render_calls,
            parts_rendered,
            triangles_tested,
            triangles_rejected_near_far,
            triangles_rejected_offscreen,
            triangles_culled_backface,
            fragments_shaded,
            fragments_written,
        ] = self.all().map(|c| c.load(Ordering::Relaxed));
        CounterSnapshot {
            render_calls,
            parts_rendered,
            triangles_tested,
            triangles_rejected_near_far,
            triangles_rejected_offscreen,
            triangles_culled_backface,
            fragments_shaded,
            fragments_written,
        }
    }
}

impl Default for PipelineCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of counter values at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub render_calls: u64,
    pub parts_rendered: u64,
    pub triangles_tested: u64,
    pub triangles_rejected_near_far: u64,
    pub triangles_rejected_offscreen: u64,
    pub triangles_culled_backface: u64,
    pub fragments_shaded: u64,
    pub fragments_written: u64,
}

impl fmt::Display for CounterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Pipeline Counters ===")?;
        writeln!(f, "  render calls:               {:12}", self.render_calls)?;
        writeln!(f, "  parts rendered:             {:12}", self.parts_rendered)?;
        writeln!(f, "  triangles tested:           {:12}", self.triangles_tested)?;
        writeln!(f, "  rejected near/far:          {:12}", self.triangles_rejected_near_far)?;
        writeln!(f, "  rejected offscreen:         {:12}", self.triangles_rejected_offscreen)?;
        writeln!(f, "  backface culled:            {:12}", self.triangles_culled_backface)?;
        writeln!(f, "  fragments shaded:           {:12}", self.fragments_shaded)?;
        write!(f, "  fragments written:          {:12}", self.fragments_written)?;
        if self.fragments_shaded > 0 {
            let rate = self.fragments_written as f64 / self.fragments_shaded as f64 * 100.0;
            write!(f, "\n  fragment write rate:        {:11.2}%", rate)?;
        }
        Ok(())
    }
}

/// Global pipeline counters instance
pub static PIPELINE_COUNTERS: PipelineCounters = PipelineCounters::new();

/// Macro for incrementing a counter (only when profiling feature is enabled)
#[macro_export]
macro_rules! count_call {
    ($counter:expr) => {
        #[cfg(feature = "profiling")]
        {
            $counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
        #[cfg(not(feature = "profiling"))]
        {
            let _ = &$counter;
        }
    };
}

/// Macro for adding to a counter (only when profiling feature is enabled)
#[macro_export]
macro_rules! count_add {
    ($counter:expr, $value:expr) => {
        #[cfg(feature = "profiling")]
        {
            $counter.fetch_add($value as u64, std::sync::atomic::Ordering::Relaxed);
        }
        #[cfg(not(feature = "profiling"))]
        {
            let _ = (&$counter, $value);
        }
    };
}

/// Hardware performance counter wrapper for benchmarking
#[cfg(feature = "profiling")]
pub mod hardware {
    use perf_event::events::Hardware;
    use perf_event::{Builder, Counter};

    const EVENTS: [(&str, Hardware); 4] = [
        ("cpu cycles", Hardware::CPU_CYCLES),
        ("instructions", Hardware::INSTRUCTIONS),
        ("cache misses", Hardware::CACHE_MISSES),
        ("branch misses", Hardware::BRANCH_MISSES),
    ];

    /// Counters that could not be opened (no permission, no PMU) read as zero.
    pub struct PerfCounters {
        counters: Vec<Option<Counter>>,
    }

    impl PerfCounters {
        pub fn new() -> Self {
            Self {
                counters: EVENTS
                    .iter()
                    .map(|(_, kind)| Builder::new().kind(kind.clone()).build().ok())
                    .collect(),
            }
        }

        pub fn enable_all(&mut self) {
            for c in self.counters.iter_mut().flatten() {
                let _ = c.enable();
            }
        }

        pub fn disable_all(&mut self) {
            for c in self.counters.iter_mut().flatten() {
                let _ = c.disable();
            }
        }

        pub fn reset_all(&mut self) {
            for c in self.counters.iter_mut().flatten() {
                let _ = c.reset();
            }
        }

        /// Name and value of every event.
        pub fn read_all(&mut self) -> Vec<(&'static str, u64)> {
            EVENTS
                .iter()
                .zip(self.counters.iter_mut())
                .map(|((name, _), c)| (*name, c.as_mut().and_then(|c| c.read().ok()).unwrap_or(0)))
                .collect()
        }
    }

    impl Default for PerfCounters {
        fn default() -> Self {
            Self::new()
        }
    }
}
