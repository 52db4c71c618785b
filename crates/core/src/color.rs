//! Time driven hue scheduling.
//!
//! The scheduler walks the hue wheel at a constant angular speed, one full pass over
//! the configured hue range per [`CycleConfig::cycle_duration`].

use core::time::Duration;

use tokio::time::Instant;

use crate::{errors::Error, Result};

/// Hue cycle parameters, fixed for the whole process lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleConfig {
    hue_min: f64,
    hue_max: f64,
    saturation: f64,
    value: f64,
    cycle_duration: Duration,
    tick_interval: Duration,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            hue_min: 0.0,
            hue_max: 1.0,
            saturation: 1.0,
            value: 1.0,
            cycle_duration: Duration::from_secs(5),
            tick_interval: Duration::from_millis(50),
        }
    }
}

impl CycleConfig {
    /// Creates a new cycle configuration and checks its invariants.
    pub fn new(
        hue_min: f64,
        hue_max: f64,
        saturation: f64,
        value: f64,
        cycle_duration: Duration,
        tick_interval: Duration,
    ) -> Result<Self> {
        let unit = 0.0..=1.0;
        if !(unit.contains(&hue_min) && unit.contains(&hue_max) && hue_min < hue_max) {
            return Err(Error::InvalidHueRange {
                min: hue_min,
                max: hue_max,
            });
        }
        if !unit.contains(&saturation) {
            return Err(Error::invalid_level("saturation", saturation));
        }
        if !unit.contains(&value) {
            return Err(Error::invalid_level("value", value));
        }
        if cycle_duration.is_zero() {
            return Err(Error::InvalidDuration { name: "cycle" });
        }
        if tick_interval.is_zero() {
            return Err(Error::InvalidDuration { name: "tick" });
        }

        Ok(Self {
            hue_min,
            hue_max,
            saturation,
            value,
            cycle_duration,
            tick_interval,
        })
    }

    pub fn hue_min(&self) -> f64 {
        self.hue_min
    }

    pub fn hue_max(&self) -> f64 {
        self.hue_max
    }

    pub fn saturation(&self) -> f64 {
        self.saturation
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Time it takes to pass the whole hue range once.
    pub fn cycle_duration(&self) -> Duration {
        self.cycle_duration
    }

    /// Pause between two consecutive color updates.
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Returns the color for the given hue with the configured saturation and value.
    pub fn color_at(&self, hue: f64) -> ColorSample {
        to_rgb(hue, self.saturation, self.value)
    }
}

/// Position of the animation on the hue wheel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleState {
    current_hue: f64,
    last_timestamp: Instant,
}

impl CycleState {
    /// Creates a new state at the beginning of the hue range.
    pub fn new(config: &CycleConfig, now: Instant) -> Self {
        Self::with_hue(config.hue_min, now)
    }

    /// Creates a new state with the given hue.
    pub fn with_hue(hue: f64, now: Instant) -> Self {
        Self {
            current_hue: hue,
            last_timestamp: now,
        }
    }

    pub fn hue(&self) -> f64 {
        self.current_hue
    }

    pub fn last_timestamp(&self) -> Instant {
        self.last_timestamp
    }

    /// Moves the hue forward by the time elapsed since the previous update.
    ///
    /// When the hue overshoots the upper bound only the fractional part of the overflowed
    /// value is carried over, which is exact for ranges starting at zero and an
    /// approximation otherwise.
    #[must_use]
    pub fn advance(&self, config: &CycleConfig, now: Instant) -> Self {
        // A clock going backwards must not rewind the animation.
        let elapsed = now.saturating_duration_since(self.last_timestamp);
        let hue_delta = elapsed.as_secs_f64() / config.cycle_duration.as_secs_f64()
            * (config.hue_max - config.hue_min);

        let mut hue = self.current_hue + hue_delta;
        if hue > config.hue_max {
            hue = config.hue_min + hue.fract();
        }

        Self {
            current_hue: hue,
            last_timestamp: now,
        }
    }
}

/// A 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorSample {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorSample {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<(u8, u8, u8)> for ColorSample {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self { r, g, b }
    }
}

/// Converts an HSV color into RGB, every channel is truncated towards zero.
pub fn to_rgb(hue: f64, saturation: f64, value: f64) -> ColorSample {
    if saturation == 0.0 {
        let v = channel(value);
        return ColorSample::new(v, v, v);
    }

    let scaled = hue * 6.0;
    let sector = scaled.trunc();
    let f = scaled - sector;

    let p = value * (1.0 - saturation);
    let q = value * (1.0 - saturation * f);
    let t = value * (1.0 - saturation * (1.0 - f));

    #[allow(clippy::cast_possible_truncation)]
    let (r, g, b) = match (sector as i64).rem_euclid(6) {
        0 => (value, t, p),
        1 => (q, value, p),
        2 => (p, value, t),
        3 => (p, q, value),
        4 => (t, p, value),
        _ => (value, p, q),
    };
    ColorSample::new(channel(r), channel(g), channel(b))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn channel(level: f64) -> u8 {
    (level * 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(value: f64) -> Duration {
        Duration::from_secs_f64(value)
    }

    #[test]
    fn canonical_hues() {
        assert_eq!(to_rgb(0.0, 1.0, 1.0), ColorSample::new(255, 0, 0));
        assert_eq!(to_rgb(1.0 / 3.0, 1.0, 1.0), ColorSample::new(0, 255, 0));
        assert_eq!(to_rgb(2.0 / 3.0, 1.0, 1.0), ColorSample::new(0, 0, 255));
        assert_eq!(to_rgb(0.5, 1.0, 1.0), ColorSample::new(0, 255, 255));
    }

    #[test]
    fn full_saturation_keeps_a_saturated_channel() {
        for step in 0..1000 {
            let hue = f64::from(step) / 1000.0;
            let color = to_rgb(hue, 1.0, 1.0);
            assert!(
                color.to_bytes().contains(&255),
                "hue {hue} produced {color:?}"
            );
        }
    }

    #[test]
    fn gray_and_dim_colors() {
        assert_eq!(to_rgb(0.3, 0.0, 0.5), ColorSample::new(127, 127, 127));
        assert_eq!(to_rgb(0.0, 1.0, 0.0), ColorSample::new(0, 0, 0));
        assert_eq!(to_rgb(0.0, 0.5, 1.0), ColorSample::new(255, 127, 127));
    }

    #[test]
    fn config_validation() {
        let cycle = secs(5.0);
        let tick = secs(0.05);

        assert!(CycleConfig::new(0.0, 1.0, 1.0, 1.0, cycle, tick).is_ok());
        assert!(matches!(
            CycleConfig::new(0.5, 0.5, 1.0, 1.0, cycle, tick),
            Err(Error::InvalidHueRange { .. })
        ));
        assert!(matches!(
            CycleConfig::new(0.0, 1.5, 1.0, 1.0, cycle, tick),
            Err(Error::InvalidHueRange { .. })
        ));
        assert!(matches!(
            CycleConfig::new(0.0, 1.0, f64::NAN, 1.0, cycle, tick),
            Err(Error::InvalidLevel {
                name: "saturation",
                ..
            })
        ));
        assert!(matches!(
            CycleConfig::new(0.0, 1.0, 1.0, -0.1, cycle, tick),
            Err(Error::InvalidLevel { name: "value", .. })
        ));
        assert!(matches!(
            CycleConfig::new(0.0, 1.0, 1.0, 1.0, Duration::ZERO, tick),
            Err(Error::InvalidDuration { name: "cycle" })
        ));
        assert!(matches!(
            CycleConfig::new(0.0, 1.0, 1.0, 1.0, cycle, Duration::ZERO),
            Err(Error::InvalidDuration { name: "tick" })
        ));
    }

    #[test]
    fn advance_is_proportional_to_elapsed_time() {
        let config = CycleConfig::default();
        let start = Instant::now();

        let state = CycleState::new(&config, start).advance(&config, start + secs(2.5));
        assert!((state.hue() - 0.5).abs() < 1e-9);
        assert_eq!(state.last_timestamp(), start + secs(2.5));
    }

    #[test]
    fn advance_scales_with_hue_range() {
        let config = CycleConfig::new(0.0, 0.5, 1.0, 1.0, secs(4.0), secs(0.1)).unwrap();
        let start = Instant::now();

        let state = CycleState::new(&config, start).advance(&config, start + secs(1.0));
        assert!((state.hue() - 0.125).abs() < 1e-9);
    }

    #[test]
    fn advance_wraps_to_fractional_part() {
        let config = CycleConfig::default();
        let start = Instant::now();

        for step in 0..10 {
            let d = f64::from(step) / 10.0;
            let state = CycleState::with_hue(0.95, start);
            let next = state.advance(&config, start + config.cycle_duration().mul_f64(d));

            let expected = (0.95 + d).fract();
            assert!((next.hue() - expected).abs() < 1e-9, "d = {d}");
            assert!((0.0..1.0).contains(&next.hue()));
        }
    }

    #[test]
    fn advance_wrap_with_nonzero_minimum_is_approximate() {
        let config = CycleConfig::new(0.25, 0.75, 1.0, 1.0, secs(1.0), secs(0.1)).unwrap();
        let start = Instant::now();

        // 0.7 + 0.1 overshoots 0.75 and lands on 0.25 + fract(0.8).
        let state = CycleState::with_hue(0.7, start).advance(&config, start + secs(0.2));
        assert!((state.hue() - 1.05).abs() < 1e-9);
    }

    #[test]
    fn advance_ignores_clock_going_backwards() {
        let config = CycleConfig::default();
        let later = Instant::now() + secs(10.0);
        let earlier = later - secs(1.0);

        let state = CycleState::with_hue(0.3, later).advance(&config, earlier);
        assert!((state.hue() - 0.3).abs() < f64::EPSILON);
        assert_eq!(state.last_timestamp(), earlier);
    }
}
