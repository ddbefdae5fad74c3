//! Optional CPU / memory sampling at the phase boundaries of a chart run.
//!
//! Sampling needs the `cli` feature (it pulls in `sysinfo`). Without it the
//! monitor keeps its API but never records anything.

use std::time::Duration;

#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::Instant;
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessesToUpdate, System};

/// Resource reading taken when a run phase ends.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseSample {
    pub phase: String,
    pub cpu_percent: f32,
    pub memory_mb: u64,
    /// Time since the monitor was created.
    pub since_start: Duration,
    /// Time since the previous sample.
    pub phase_time: Duration,
}

/// Roll-up of every sample of one run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunProfile {
    pub phases: usize,
    pub total_time: Duration,
    pub peak_memory_mb: u64,
    pub slowest_phase: Option<(String, Duration)>,
}

impl RunProfile {
    pub fn from_samples(samples: &[PhaseSample]) -> Self {
        let slowest_phase = samples
            .iter()
            .max_by_key(|sample| sample.phase_time)
            .map(|sample| (sample.phase.clone(), sample.phase_time));

        Self {
            phases: samples.len(),
            total_time: samples.last().map(|s| s.since_start).unwrap_or_default(),
            peak_memory_mb: samples.iter().map(|s| s.memory_mb).max().unwrap_or(0),
            slowest_phase,
        }
    }
}

#[cfg(feature = "cli")]
struct ProcessSampler {
    system: System,
    pid: Pid,
}

#[cfg(feature = "cli")]
impl ProcessSampler {
    fn current() -> Option<Self> {
        match sysinfo::get_current_pid() {
            Ok(pid) => Some(Self {
                system: System::new(),
                pid,
            }),
            Err(e) => {
                tracing::warn!("⚠️ Resource monitoring disabled: {}", e);
                None
            }
        }
    }

    /// CPU and resident memory (MB) of this process; zeros if it cannot be read.
    fn read(&mut self) -> (f32, u64) {
        self.system
            .refresh_processes(ProcessesToUpdate::Some(&[self.pid]), true);
        self.system
            .process(self.pid)
            .map(|process| (process.cpu_usage(), process.memory() / 1024 / 1024))
            .unwrap_or((0.0, 0))
    }
}

#[cfg(feature = "cli")]
pub struct SystemMonitor {
    sampler: Option<Mutex<ProcessSampler>>,
    samples: Mutex<Vec<PhaseSample>>,
    started: Instant,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let sampler = if enabled {
            ProcessSampler::current().map(Mutex::new)
        } else {
            None
        };

        Self {
            sampler,
            samples: Mutex::new(Vec::new()),
            started: Instant::now(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sampler.is_some()
    }

    /// Record the end of `phase`. Returns `None` when monitoring is off.
    pub fn sample(&self, phase: &str) -> Option<PhaseSample> {
        let (cpu_percent, memory_mb) = self.sampler.as_ref()?.lock().ok()?.read();
        let mut samples = self.samples.lock().ok()?;

        let since_start = self.started.elapsed();
        let previous = samples.last().map(|s| s.since_start).unwrap_or_default();
        let sample = PhaseSample {
            phase: phase.to_string(),
            cpu_percent,
            memory_mb,
            since_start,
            phase_time: since_start.saturating_sub(previous),
        };
        samples.push(sample.clone());
        Some(sample)
    }

    pub fn profile(&self) -> Option<RunProfile> {
        if !self.is_enabled() {
            return None;
        }
        let samples = self.samples.lock().ok()?;
        Some(RunProfile::from_samples(&samples))
    }

    pub fn log_stats(&self, phase: &str) {
        if let Some(sample) = self.sample(phase) {
            tracing::info!(
                phase = %sample.phase,
                cpu_percent = sample.cpu_percent,
                memory_mb = sample.memory_mb,
                phase_ms = sample.phase_time.as_millis() as u64,
                "📊 {} done in {:?}",
                sample.phase,
                sample.phase_time
            );
        }
    }

    pub fn log_final_stats(&self) {
        let Some(profile) = self.profile() else {
            return;
        };
        let (slowest, slowest_time) = profile
            .slowest_phase
            .clone()
            .unwrap_or_else(|| ("-".to_string(), Duration::ZERO));

        tracing::info!(
            phases = profile.phases,
            peak_memory_mb = profile.peak_memory_mb,
            total_ms = profile.total_time.as_millis() as u64,
            "📊 Run took {:?}, peak {}MB, slowest phase {} ({:?})",
            profile.total_time,
            profile.peak_memory_mb,
            slowest,
            slowest_time
        );
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// No-op stand-in when built without the `cli` feature.
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn is_enabled(&self) -> bool {
        false
    }

    pub fn sample(&self, _phase: &str) -> Option<PhaseSample> {
        None
    }

    pub fn profile(&self) -> Option<RunProfile> {
        None
    }

    pub fn log_stats(&self, _phase: &str) {}

    pub fn log_final_stats(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(phase: &str, memory_mb: u64, since_start_ms: u64, phase_ms: u64) -> PhaseSample {
        PhaseSample {
            phase: phase.to_string(),
            cpu_percent: 0.0,
            memory_mb,
            since_start: Duration::from_millis(since_start_ms),
            phase_time: Duration::from_millis(phase_ms),
        }
    }

    #[test]
    fn test_profile_rolls_up_samples() {
        let samples = vec![
            sample("Start", 12, 1, 1),
            sample("Load", 48, 41, 40),
            sample("Render", 30, 46, 5),
        ];

        let profile = RunProfile::from_samples(&samples);
        assert_eq!(profile.phases, 3);
        assert_eq!(profile.total_time, Duration::from_millis(46));
        assert_eq!(profile.peak_memory_mb, 48);
        assert_eq!(
            profile.slowest_phase,
            Some(("Load".to_string(), Duration::from_millis(40)))
        );
    }

    #[test]
    fn test_profile_of_no_samples_is_empty() {
        assert_eq!(RunProfile::from_samples(&[]), RunProfile::default());
    }

    #[test]
    fn test_disabled_monitor_records_nothing() {
        let monitor = SystemMonitor::new(false);
        assert!(!monitor.is_enabled());
        assert!(monitor.sample("Load").is_none());
        assert!(monitor.profile().is_none());
        monitor.log_stats("Load");
        monitor.log_final_stats();
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_enabled_monitor_keeps_phase_order() {
        let monitor = SystemMonitor::new(true);
        assert!(monitor.is_enabled());

        let load = monitor.sample("Load").unwrap();
        let render = monitor.sample("Render").unwrap();
        assert!(render.since_start >= load.since_start);
        assert_eq!(render.phase_time, render.since_start - load.since_start);

        let profile = monitor.profile().unwrap();
        assert_eq!(profile.phases, 2);
        assert_eq!(profile.total_time, render.since_start);
    }
}
