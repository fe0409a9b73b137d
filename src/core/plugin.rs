//! CorePlugin wires the simulation clock that every chatter system reads.
use bevy::prelude::*;
#[cfg(feature = "core_debug")]
use bevy::time::TimerMode;
use std::time::Duration;

const DEFAULT_TIME_SCALE: f32 = 1.0;
const MIN_TIME_SCALE: f32 = 0.001;

/// Game ticks per simulated second (a 30 second grace period is 1800 ticks).
pub const TICKS_PER_SECOND: f64 = 60.0;

#[cfg(feature = "core_debug")]
#[derive(Resource)]
struct DebugTickTimer {
    timer: Timer,
}

#[cfg(feature = "core_debug")]
impl Default for DebugTickTimer {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(1.0, TimerMode::Repeating),
        }
    }
}

/// Tracks scaled simulation time derived from real frame deltas.
///
/// Bubbles are timed in seconds (`elapsed_secs`), the per-colonist caches and
/// tick-driven components in whole game ticks (`ticks`). Both are monotonic.
#[derive(Resource, Debug)]
pub struct SimulationClock {
    time_scale: f32,
    last_real_delta: Duration,
    last_scaled_delta: Duration,
    elapsed: Duration,
    ticks: u64,
    ticks_this_frame: u64,
}

impl SimulationClock {
    /// Creates a new clock with the provided time-scale multiplier.
    pub fn new(time_scale: f32) -> Self {
        let clamped = time_scale.max(MIN_TIME_SCALE);
        Self {
            time_scale: clamped,
            last_real_delta: Duration::ZERO,
            last_scaled_delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            ticks: 0,
            ticks_this_frame: 0,
        }
    }

    /// Sets the time-scale multiplier (clamped to a small positive minimum).
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(MIN_TIME_SCALE);
    }

    /// Returns the current time-scale multiplier.
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Last real (unscaled) delta reported by Bevy's Time resource.
    #[cfg_attr(not(any(test, feature = "core_debug")), allow(dead_code))]
    pub fn last_real_delta(&self) -> Duration {
        self.last_real_delta
    }

    /// Last scaled delta after applying the multiplier.
    pub fn last_scaled_delta(&self) -> Duration {
        self.last_scaled_delta
    }

    /// Returns the total scaled duration elapsed since the clock was initialised.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Scaled seconds since start, the timestamp used for bubble lifetimes.
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Whole game ticks elapsed since start.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Number of ticks that elapsed during the last frame.
    pub fn ticks_this_frame(&self) -> u64 {
        self.ticks_this_frame
    }

    /// Returns true when a tick multiple of `interval` was crossed this frame.
    ///
    /// Frames can span several ticks, so an exact `ticks % interval == 0` test
    /// would skip intervals at low frame rates.
    pub fn crossed_interval(&self, interval: u64) -> bool {
        self.intervals_crossed(interval) > 0
    }

    /// Number of tick multiples of `interval` crossed this frame.
    pub fn intervals_crossed(&self, interval: u64) -> u64 {
        if interval == 0 || self.ticks_this_frame == 0 {
            return 0;
        }
        let previous = self.ticks - self.ticks_this_frame;
        self.ticks / interval - previous / interval
    }

    /// Applies a real delta to the clock, storing both the real and scaled durations.
    pub fn tick(&mut self, real_delta: Duration) {
        self.last_real_delta = real_delta;
        self.last_scaled_delta = real_delta.mul_f32(self.time_scale);
        self.elapsed += self.last_scaled_delta;

        let total_ticks = (self.elapsed.as_secs_f64() * TICKS_PER_SECOND).floor() as u64;
        self.ticks_this_frame = total_ticks.saturating_sub(self.ticks);
        self.ticks = total_ticks.max(self.ticks);
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_SCALE)
    }
}

/// Registers simulation timing systems and resources.
#[derive(Debug, Clone, Copy)]
pub struct CorePlugin {
    time_scale: f32,
}

impl CorePlugin {
    /// Creates a CorePlugin with the provided time-scale multiplier.
    pub const fn with_time_scale(time_scale: f32) -> Self {
        Self { time_scale }
    }
}

impl Default for CorePlugin {
    fn default() -> Self {
        Self::with_time_scale(DEFAULT_TIME_SCALE)
    }
}

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(SimulationClock::new(self.time_scale))
            .add_systems(Startup, log_startup_time_scale)
            .add_systems(PreUpdate, update_simulation_clock);

        #[cfg(feature = "core_debug")]
        {
            app.insert_resource(DebugTickTimer::default())
                .add_systems(Update, log_scaled_ticks);
        }
    }
}

fn update_simulation_clock(mut clock: ResMut<SimulationClock>, time: Res<Time>) {
    clock.tick(time.delta());
}

fn log_startup_time_scale(clock: Res<SimulationClock>) {
    info!(
        "CorePlugin initialised with time scale: {:.3} ({} ticks/s)",
        clock.time_scale(),
        TICKS_PER_SECOND
    );
}

#[cfg(feature = "core_debug")]
fn log_scaled_ticks(mut timer: ResMut<DebugTickTimer>, clock: Res<SimulationClock>) {
    if timer.timer.tick(clock.last_scaled_delta()).just_finished() {
        info!(
            target: "core_debug",
            "Sim elapsed: {:.2}s | ticks: {} | scale: {:.3} | real dt: {:.4}s | scaled dt: {:.4}s",
            clock.elapsed().as_secs_f32(),
            clock.ticks(),
            clock.time_scale(),
            clock.last_real_delta().as_secs_f32(),
            clock.last_scaled_delta().as_secs_f32(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_scales_delta_with_multiplier() {
        let mut clock = SimulationClock::new(2.5);
        clock.tick(Duration::from_secs_f32(1.2));

        assert_eq!(clock.time_scale(), 2.5);
        assert_eq!(clock.last_real_delta(), Duration::from_secs_f32(1.2));
        assert_eq!(
            clock.last_scaled_delta(),
            Duration::from_secs_f32(1.2).mul_f32(2.5)
        );
        assert_eq!(clock.elapsed(), Duration::from_secs_f32(1.2).mul_f32(2.5));
    }

    #[test]
    fn clock_clamps_min_time_scale() {
        let mut clock = SimulationClock::new(0.0);
        assert!((clock.time_scale() - MIN_TIME_SCALE).abs() < f32::EPSILON);

        clock.set_time_scale(-5.0);
        assert!((clock.time_scale() - MIN_TIME_SCALE).abs() < f32::EPSILON);
    }

    #[test]
    fn clock_counts_whole_ticks() {
        let mut clock = SimulationClock::default();
        clock.tick(Duration::from_millis(500));
        assert_eq!(clock.ticks(), 30);
        assert_eq!(clock.ticks_this_frame(), 30);

        clock.tick(Duration::from_millis(5));
        assert_eq!(clock.ticks(), 30);
        assert_eq!(clock.ticks_this_frame(), 0);
    }

    #[test]
    fn crossed_interval_survives_long_frames() {
        let mut clock = SimulationClock::default();
        // 240 ticks, then a frame that jumps from 240 to 270 and crosses 250.
        clock.tick(Duration::from_secs(4));
        assert!(!clock.crossed_interval(250));
        clock.tick(Duration::from_millis(500));
        assert!(clock.crossed_interval(250));
        assert!(!clock.crossed_interval(0));
    }

    #[test]
    fn intervals_crossed_counts_every_boundary() {
        let mut clock = SimulationClock::default();
        clock.tick(Duration::from_secs(10));
        assert_eq!(clock.ticks(), 600);
        assert_eq!(clock.intervals_crossed(250), 2);
        assert_eq!(clock.intervals_crossed(1000), 0);
    }
}
