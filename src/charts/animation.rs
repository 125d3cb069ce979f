//! Bar growth animation with a staggered start per bar.

/// Cubic ease-in-out over t in [0, 1].
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

/// Timing of the initial bar growth: each bar starts `stagger` seconds after
/// the previous one and grows for `duration` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthAnimation {
    duration: f64,
    stagger: f64,
    bars: usize,
}

impl GrowthAnimation {
    pub fn new(duration_ms: u64, stagger_ms: u64, bars: usize) -> Self {
        Self {
            duration: duration_ms as f64 / 1000.0,
            stagger: stagger_ms as f64 / 1000.0,
            bars,
        }
    }

    /// Eased fraction of bar `index` drawn after `elapsed` seconds.
    pub fn progress(&self, index: usize, elapsed: f64) -> f64 {
        let local = elapsed - self.stagger * index as f64;
        if local <= 0.0 {
            0.0
        } else if self.duration <= 0.0 || local >= self.duration {
            1.0
        } else {
            ease_cubic_in_out(local / self.duration)
        }
    }

    /// Time until the last bar has finished growing.
    pub fn total_duration(&self) -> f64 {
        if self.bars == 0 {
            return 0.0;
        }
        self.stagger * (self.bars - 1) as f64 + self.duration
    }

    pub fn is_complete(&self, elapsed: f64) -> bool {
        elapsed >= self.total_duration()
    }
}

/// Opacity ramp that starts once another animation has completed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeIn {
    duration: f64,
}

impl FadeIn {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration: duration_ms as f64 / 1000.0,
        }
    }

    /// Opacity `since` seconds after the fade was triggered (`None`: not yet).
    pub fn opacity(&self, since: Option<f64>) -> f64 {
        match since {
            None => 0.0,
            Some(t) if t <= 0.0 => 0.0,
            Some(t) if self.duration <= 0.0 || t >= self.duration => 1.0,
            Some(t) => t / self.duration,
        }
    }

    pub fn is_complete(&self, since: Option<f64>) -> bool {
        self.opacity(since) >= 1.0
    }
}

/// Per-chart clock measuring time since the chart was (re)rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationClock {
    started_at: Option<f64>,
}

impl AnimationClock {
    pub fn reset(&mut self) {
        self.started_at = None;
    }

    /// Seconds since the first tick after the last reset.
    pub fn elapsed(&mut self, now: f64) -> f64 {
        let start = *self.started_at.get_or_insert(now);
        (now - start).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_hits_endpoints_and_midpoint() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(0.5), 0.5);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        assert!(ease_cubic_in_out(0.25) < 0.25);
        assert!(ease_cubic_in_out(0.75) > 0.75);
    }

    #[test]
    fn bars_start_in_turn() {
        let growth = GrowthAnimation::new(800, 30, 3);

        assert_eq!(growth.progress(0, 0.0), 0.0);
        assert_eq!(growth.progress(1, 0.03), 0.0);
        assert!(growth.progress(1, 0.2) > 0.0);
        assert!(growth.progress(0, 0.2) > growth.progress(1, 0.2));
        assert_eq!(growth.progress(2, 0.9), 1.0);
        assert!((growth.total_duration() - 0.86).abs() < 1e-12);
        assert!(growth.is_complete(0.9));
        assert!(!growth.is_complete(0.5));
    }

    #[test]
    fn empty_chart_is_immediately_complete() {
        assert!(GrowthAnimation::new(1000, 100, 0).is_complete(0.0));
    }

    #[test]
    fn fade_waits_for_trigger() {
        let fade = FadeIn::new(500);
        assert_eq!(fade.opacity(None), 0.0);
        assert_eq!(fade.opacity(Some(0.25)), 0.5);
        assert!(fade.is_complete(Some(0.5)));
    }

    #[test]
    fn clock_restarts_after_reset() {
        let mut clock = AnimationClock::default();
        assert_eq!(clock.elapsed(10.0), 0.0);
        assert_eq!(clock.elapsed(12.5), 2.5);
        clock.reset();
        assert_eq!(clock.elapsed(20.0), 0.0);
    }
}
