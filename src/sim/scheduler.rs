//! Frame scheduler: turns host timestamps into simulation steps
//!
//! The host calls `tick()` once per display refresh. Depending on the
//! `StepMode` the scheduler runs zero or more fixed steps, one variable
//! step, or one gated step, then renders exactly once.

use crate::consts::{MAX_CATCH_UP_STEPS, MAX_FRAME_DELTA_MS};
use crate::error::{ArcadeError, Result};

/// What the scheduler drives each tick
pub trait Simulatable {
    /// Advance the world by `dt_ms` milliseconds
    fn update(&mut self, dt_ms: f32) -> Result<()>;

    /// Issue this frame's draw calls
    fn render(&mut self) -> Result<()>;

    /// Interval override for `StepMode::Gated`
    fn gate_interval_ms(&self) -> Option<f64> {
        None
    }
}

/// Per-game stepping model
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepMode {
    /// Accumulator stepping in constant `step_ms` increments
    Fixed { step_ms: f64 },
    /// One update per tick with the (clamped) frame delta
    Variable,
    /// One update whenever more than `interval_ms` has elapsed
    Gated { interval_ms: f64 },
}

impl StepMode {
    pub fn fixed_hz(hz: u32) -> Self {
        StepMode::Fixed {
            step_ms: 1000.0 / hz.max(1) as f64,
        }
    }
}

/// Scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Constructed, never started
    Idle,
    Running,
    /// Still re-arming, but no update or render
    Paused,
    /// Deregistered from the host
    Stopped,
}

/// Outcome of one host tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Number of `update()` calls made
    pub steps: u32,
    pub rendered: bool,
    /// Whether the host should request another frame
    pub rearm: bool,
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    mode: StepMode,
    state: RunState,
    last_timestamp: Option<f64>,
    /// Fixed: unsimulated time. Gated: time since the last gated update.
    accumulator: f64,
    max_catch_up_steps: u32,
    max_frame_delta_ms: f64,
    total_steps: u64,
}

impl Scheduler {
    pub fn new(mode: StepMode) -> Self {
        Self {
            mode,
            state: RunState::Idle,
            last_timestamp: None,
            accumulator: 0.0,
            max_catch_up_steps: MAX_CATCH_UP_STEPS,
            max_frame_delta_ms: MAX_FRAME_DELTA_MS,
            total_steps: 0,
        }
    }

    pub fn with_limits(mut self, max_catch_up_steps: u32, max_frame_delta_ms: f64) -> Self {
        self.max_catch_up_steps = max_catch_up_steps.max(1);
        self.max_frame_delta_ms = max_frame_delta_ms;
        self
    }

    #[inline]
    pub fn mode(&self) -> StepMode {
        self.mode
    }

    #[inline]
    pub fn state(&self) -> RunState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Steps run since construction
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    pub fn start(&mut self) {
        log::info!("scheduler start ({:?})", self.mode);
        self.state = RunState::Running;
        self.reset_clock();
    }

    /// Stop simulating but keep re-arming. Idempotent.
    pub fn pause(&mut self) {
        if self.state == RunState::Running {
            log::debug!("scheduler paused");
            self.state = RunState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == RunState::Paused {
            log::debug!("scheduler resumed");
            self.state = RunState::Running;
            self.reset_clock();
        }
    }

    pub fn stop(&mut self) {
        if self.state != RunState::Stopped {
            log::info!("scheduler stopped after {} steps", self.total_steps);
        }
        self.state = RunState::Stopped;
    }

    /// Forget the previous timestamp so the next delta is zero
    fn reset_clock(&mut self) {
        self.last_timestamp = None;
        self.accumulator = 0.0;
    }

    /// Milliseconds since the previous tick; zero on the first tick and for
    /// timestamps that go backwards
    fn delta(&mut self, now_ms: f64) -> f64 {
        let delta = match self.last_timestamp {
            Some(last) => (now_ms - last).max(0.0),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);
        delta
    }

    /// Handle one host refresh
    pub fn tick<S: Simulatable + ?Sized>(&mut self, now_ms: f64, sim: &mut S) -> Result<TickReport> {
        match self.state {
            RunState::Idle => return Err(ArcadeError::NotStarted),
            RunState::Stopped => return Ok(TickReport::default()),
            RunState::Paused => {
                return Ok(TickReport {
                    rearm: true,
                    ..TickReport::default()
                });
            }
            RunState::Running => {}
        }

        let delta = self.delta(now_ms);
        let steps = match self.mode {
            StepMode::Fixed { step_ms } => self.run_fixed(step_ms, delta, sim)?,
            StepMode::Variable => {
                if delta > 0.0 {
                    sim.update(delta.min(self.max_frame_delta_ms) as f32)?;
                    1
                } else {
                    0
                }
            }
            StepMode::Gated { interval_ms } => {
                let interval = sim.gate_interval_ms().unwrap_or(interval_ms);
                self.accumulator += delta;
                if self.accumulator > interval {
                    let dt = self.accumulator.min(self.max_frame_delta_ms);
                    self.accumulator = 0.0;
                    sim.update(dt as f32)?;
                    1
                } else {
                    0
                }
            }
        };
        self.total_steps += steps as u64;

        sim.render()?;

        Ok(TickReport {
            steps,
            rendered: true,
            rearm: self.state != RunState::Stopped,
        })
    }

    fn run_fixed<S: Simulatable + ?Sized>(&mut self, step_ms: f64, delta: f64, sim: &mut S) -> Result<u32> {
        self.accumulator += delta;
        let mut steps = 0;
        while self.accumulator >= step_ms && steps < self.max_catch_up_steps {
            sim.update(step_ms as f32)?;
            self.accumulator -= step_ms;
            steps += 1;
        }
        if self.accumulator >= step_ms {
            let dropped = (self.accumulator / step_ms).floor();
            self.accumulator -= dropped * step_ms;
            log::debug!("dropped {} catch-up steps", dropped);
        }
        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Default)]
    struct Counter {
        updates: Vec<f32>,
        renders: u32,
        gate: Option<f64>,
    }

    impl Simulatable for Counter {
        fn update(&mut self, dt_ms: f32) -> Result<()> {
            self.updates.push(dt_ms);
            Ok(())
        }

        fn render(&mut self) -> Result<()> {
            self.renders += 1;
            Ok(())
        }

        fn gate_interval_ms(&self) -> Option<f64> {
            self.gate
        }
    }

    fn fixed(step_ms: f64) -> Scheduler {
        let mut s = Scheduler::new(StepMode::Fixed { step_ms });
        s.start();
        s
    }

    #[test]
    fn test_tick_before_start_fails() {
        let mut s = Scheduler::new(StepMode::Variable);
        let mut c = Counter::default();
        assert!(matches!(s.tick(0.0, &mut c), Err(ArcadeError::NotStarted)));
        assert_eq!(c.renders, 0);
    }

    #[test]
    fn test_first_tick_has_zero_delta() {
        let mut s = fixed(10.0);
        let mut c = Counter::default();
        let report = s.tick(5000.0, &mut c).unwrap();
        assert_eq!(report.steps, 0);
        assert!(report.rendered);
        assert!(report.rearm);
    }

    #[test]
    fn test_fixed_steps_and_single_render() {
        let mut s = fixed(10.0);
        let mut c = Counter::default();
        s.tick(0.0, &mut c).unwrap();
        let report = s.tick(35.0, &mut c).unwrap();
        assert_eq!(report.steps, 3);
        assert_eq!(c.updates, vec![10.0, 10.0, 10.0]);
        assert_eq!(c.renders, 2);
        // 5 ms carried over
        s.tick(40.0, &mut c).unwrap();
        assert_eq!(c.updates.len(), 4);
    }

    #[test]
    fn test_catch_up_is_capped_and_excess_dropped() {
        let mut s = fixed(10.0).with_limits(5, 250.0);
        let mut c = Counter::default();
        s.tick(0.0, &mut c).unwrap();
        let report = s.tick(10_003.0, &mut c).unwrap();
        assert_eq!(report.steps, 5);
        // backlog discarded, only the sub-step fraction remains
        let report = s.tick(10_010.0, &mut c).unwrap();
        assert_eq!(report.steps, 1);
    }

    #[test]
    fn test_pause_suppresses_update_and_render() {
        let mut s = fixed(10.0);
        let mut c = Counter::default();
        s.tick(0.0, &mut c).unwrap();
        s.pause();
        let report = s.tick(100.0, &mut c).unwrap();
        assert_eq!(report, TickReport { steps: 0, rendered: false, rearm: true });
        assert_eq!(c.renders, 1);
    }

    #[test]
    fn test_pause_is_idempotent() {
        let mut a = fixed(10.0);
        let mut b = fixed(10.0);
        a.pause();
        b.pause();
        b.pause();
        assert_eq!(a.state(), b.state());
        assert_eq!(a.last_timestamp, b.last_timestamp);
        assert_eq!(a.accumulator, b.accumulator);
    }

    #[test]
    fn test_resume_resets_timestamp() {
        let mut s = fixed(10.0);
        let mut c = Counter::default();
        s.tick(0.0, &mut c).unwrap();
        s.pause();
        s.resume();
        // long gap while paused produces no burst
        let report = s.tick(60_000.0, &mut c).unwrap();
        assert_eq!(report.steps, 0);
        let report = s.tick(60_020.0, &mut c).unwrap();
        assert_eq!(report.steps, 2);
    }

    #[test]
    fn test_stop_deregisters() {
        let mut s = fixed(10.0);
        let mut c = Counter::default();
        s.stop();
        let report = s.tick(10.0, &mut c).unwrap();
        assert!(!report.rearm);
        assert!(!report.rendered);
        assert_eq!(c.renders, 0);
    }

    #[test]
    fn test_variable_step_clamps_delta() {
        let mut s = Scheduler::new(StepMode::Variable).with_limits(5, 250.0);
        s.start();
        let mut c = Counter::default();
        s.tick(0.0, &mut c).unwrap();
        s.tick(16.0, &mut c).unwrap();
        s.tick(5000.0, &mut c).unwrap();
        assert_eq!(c.updates, vec![16.0, 250.0]);
        assert_eq!(c.renders, 3);
    }

    #[test]
    fn test_negative_delta_is_ignored() {
        let mut s = Scheduler::new(StepMode::Variable);
        s.start();
        let mut c = Counter::default();
        s.tick(100.0, &mut c).unwrap();
        let report = s.tick(50.0, &mut c).unwrap();
        assert_eq!(report.steps, 0);
    }

    #[test]
    fn test_gated_step_waits_for_interval() {
        let mut s = Scheduler::new(StepMode::Gated { interval_ms: 100.0 });
        s.start();
        let mut c = Counter::default();
        let mut steps = 0;
        for i in 0..=30 {
            steps += s.tick(i as f64 * 10.0, &mut c).unwrap().steps;
        }
        // strictly more than 100 ms per step: every 11th tick
        assert_eq!(steps, 2);
        assert_eq!(c.renders, 31);
    }

    #[test]
    fn test_gate_override_from_simulation() {
        let mut s = Scheduler::new(StepMode::Gated { interval_ms: 1000.0 });
        s.start();
        let mut c = Counter {
            gate: Some(20.0),
            ..Counter::default()
        };
        s.tick(0.0, &mut c).unwrap();
        assert_eq!(s.tick(25.0, &mut c).unwrap().steps, 1);
    }

    proptest! {
        #[test]
        fn prop_fixed_step_count_matches_elapsed(
            step in 5.0f64..40.0,
            deltas in proptest::collection::vec(0.0f64..1.0, 1..60),
        ) {
            // deltas are fractions of the catch-up budget so the cap never applies
            let mut s = fixed(step).with_limits(5, 250.0);
            let mut c = Counter::default();
            let mut now = 0.0;
            let mut ticks = 1;
            s.tick(now, &mut c).unwrap();
            for d in &deltas {
                now += d * step * 4.0;
                s.tick(now, &mut c).unwrap();
                ticks += 1;
            }
            let expected = (now / step).floor() as i64;
            let actual = c.updates.len() as i64;
            prop_assert!((actual - expected).abs() <= 1, "{} vs {}", actual, expected);
            prop_assert_eq!(c.renders, ticks);
        }
    }
}
