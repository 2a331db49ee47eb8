use crate::core::track::{Position, Track};

/// Position of a vehicle along the track polyline, expressed as a segment
/// index and a progress fraction. Owned exclusively by its vehicle and
/// mutated only by `advance`.
#[derive(Debug, Clone, Copy)]
pub struct KinematicState {
    pub segment_index: usize,
    /// Fraction of the current segment already covered, in [0, 1).
    pub progress: f64,
    /// (km/h) Current speed, set by the driver model before each advance.
    pub speed: f64,
}

impl KinematicState {
    pub fn at_start(progress: f64) -> KinematicState {
        KinematicState {
            segment_index: 0,
            progress,
            speed: 0.0,
        }
    }

    /// The method advances the state along the track by `speed * dt` and
    /// returns true if the start/finish line (start of segment 0) was
    /// crossed during this step.
    ///
    /// When a segment boundary is overrun, the overshoot is re-expressed in
    /// the next segment's units by scaling with the length ratio of the old
    /// segment to the new one. This keeps the linear overshoot distance
    /// consistent across segments of very different length.
    pub fn advance(&mut self, track: &Track, dt_ms: f64) -> bool {
        let progress_advance = (self.speed * dt_ms) / track.movement_scale_factor;
        let segment_count = track.segment_count();
        let mut segment_length = track.segment(self.segment_index).length;

        if segment_length > 0.0 {
            self.progress += progress_advance / segment_length;
        }

        let mut crossed_start = false;
        while self.progress >= 1.0 {
            let overshoot = self.progress - 1.0;
            let old_length = segment_length;

            self.segment_index = (self.segment_index + 1) % segment_count;
            if self.segment_index == 0 {
                crossed_start = true;
            }

            segment_length = track.segment(self.segment_index).length;
            self.progress = overshoot * (old_length / segment_length);
        }

        crossed_start
    }

    pub fn resolve(&self, track: &Track) -> Position {
        track.resolve(self.segment_index, self.progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::track::{TrackPars, TrackPoint};
    use approx::assert_relative_eq;

    fn track_from(points: &[(f64, f64)], scale: f64) -> Track {
        let pars = TrackPars {
            name: "test".to_string(),
            points: points
                .iter()
                .map(|&(x, y)| TrackPoint { x, y })
                .collect(),
            braking_zones: vec![],
            movement_scale_factor: scale,
            sector_splits: [1, 2],
            centerline_csv: None,
        };
        Track::new(&pars).unwrap()
    }

    fn unit_square(scale: f64) -> Track {
        track_from(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)], scale)
    }

    #[test]
    fn advance_within_one_segment() {
        // four equal unit segments; dt chosen so the advance is exactly 0.5
        let track = unit_square(350_000.0);
        let mut state = KinematicState::at_start(0.0);
        state.speed = 100.0;
        let dt_ms = 0.5 * 350_000.0 / 100.0;

        let crossed = state.advance(&track, dt_ms);

        assert!(!crossed);
        assert_eq!(state.segment_index, 0);
        assert_relative_eq!(state.progress, 0.5);
    }

    #[test]
    fn overshoot_is_rescaled_by_segment_length_ratio() {
        // segment 0 has length 1, segment 1 has length 2; an advance of 1.3
        // within segment 0 must land at 0.3 * (1/2) into segment 1
        let track = track_from(&[(0.0, 0.0), (1.0, 0.0), (1.0, 2.0), (0.0, 2.0)], 1.0);
        let mut state = KinematicState::at_start(0.0);
        state.speed = 1.3;

        state.advance(&track, 1.0);

        assert_eq!(state.segment_index, 1);
        assert_relative_eq!(state.progress, 0.15);
    }

    #[test]
    fn multiple_segments_in_one_step() {
        let track = unit_square(1.0);
        let mut state = KinematicState::at_start(0.0);
        state.speed = 2.6;

        let crossed = state.advance(&track, 1.0);

        assert!(!crossed);
        assert_eq!(state.segment_index, 2);
        assert_relative_eq!(state.progress, 0.6);
    }

    #[test]
    fn wrap_past_last_segment_reports_a_crossing() {
        let track = unit_square(1.0);
        let mut state = KinematicState {
            segment_index: 3,
            progress: 0.9,
            speed: 0.2,
        };

        let crossed = state.advance(&track, 1.0);

        assert!(crossed);
        assert_eq!(state.segment_index, 0);
        assert_relative_eq!(state.progress, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn passes_through_a_degenerate_segment() {
        // repeated point: segment 1 is zero-length, recovered with length 1
        let track = track_from(
            &[(0.0, 0.0), (1.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)],
            1.0,
        );
        let mut state = KinematicState::at_start(0.5);
        state.speed = 1.0;

        state.advance(&track, 1.0);

        assert_eq!(state.segment_index, 1);
        assert_relative_eq!(state.progress, 0.5);
    }

    #[test]
    fn progress_stays_in_bounds_over_many_ticks() {
        let track = unit_square(10.0);
        let mut state = KinematicState::at_start(0.0);
        state.speed = 3.7;

        for _ in 0..1000 {
            state.advance(&track, 1.0);
            assert!(state.progress >= 0.0 && state.progress < 1.0);
            assert!(state.segment_index < track.segment_count());
        }
    }
}
