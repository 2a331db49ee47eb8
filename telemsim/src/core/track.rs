use serde::Deserialize;
use thiserror::Error;

/// A single point of the track centerline in abstract map units.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub x: f64,
    pub y: f64,
}

/// One edge of the closed track polyline with its derived geometry.
/// Immutable after construction.
#[derive(Debug, Clone)]
pub struct TrackSegment {
    pub start: TrackPoint,
    pub end: TrackPoint,
    /// Effective length in map units, never zero (degenerate segments are
    /// stored with length 1.0 and flagged in `Track::degenerate_segments`).
    pub length: f64,
    /// Direction of travel in radians.
    pub heading: f64,
}

/// Managed-braking policy for one segment. At most one zone per segment;
/// segments without a zone are taken flat out.
///
/// * `segment_index` - Segment the zone belongs to
/// * `brake_start` - Fraction of the segment at which braking begins, in (0, 1)
/// * `brake_target` - Brake pedal target in percent
/// * `target_gear` - Gear the driver model shifts down to
/// * `downshift_step` - Gears dropped per tick while above the target (2 for tight corners)
/// * `min_corner_speed` - (km/h) Corner speed floor used by the simplified model
/// * `braking_power` - Deceleration severity in [0, 1] used by the simplified model
#[derive(Debug, Deserialize, Clone)]
pub struct BrakingZone {
    pub segment_index: usize,
    pub brake_start: f64,
    pub brake_target: f64,
    pub target_gear: u8,
    #[serde(default = "default_downshift_step")]
    pub downshift_step: u8,
    #[serde(default = "default_min_corner_speed")]
    pub min_corner_speed: f64,
    #[serde(default = "default_braking_power")]
    pub braking_power: f64,
}

fn default_downshift_step() -> u8 {
    1
}

fn default_min_corner_speed() -> f64 {
    80.0
}

fn default_braking_power() -> f64 {
    1.0
}

/// * `name` - Track name
/// * `points` - Ordered centerline points; the loop is closed by repeating the
/// first point as the last (it is appended automatically if missing)
/// * `braking_zones` - Braking-zone table, at most one entry per segment
/// * `movement_scale_factor` - Divides speed (km/h) times tick period (ms) into
/// linear advance along the centerline
/// * `sector_splits` - Segment indices at which sectors 2 and 3 begin
/// * `centerline_csv` - Optional CSV file (`x_m`, `y_m` columns) to load the
/// points from when `points` is empty
#[derive(Debug, Deserialize, Clone)]
pub struct TrackPars {
    pub name: String,
    #[serde(default)]
    pub points: Vec<TrackPoint>,
    pub braking_zones: Vec<BrakingZone>,
    pub movement_scale_factor: f64,
    pub sector_splits: [usize; 2],
    #[serde(default)]
    pub centerline_csv: Option<String>,
}

/// Construction-time track faults. These are fatal: a malformed track
/// definition prevents the engine from starting.
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("track needs at least 3 points to form a closed loop, got {0}")]
    TooFewPoints(usize),
    #[error("braking zone references segment {zone_segment} but track has {segment_count} segments")]
    ZoneOutOfRange {
        zone_segment: usize,
        segment_count: usize,
    },
    #[error("more than one braking zone on segment {0}")]
    DuplicateZone(usize),
    #[error("braking zone brake_start must be in (0, 1), got {0}")]
    BrakeStartOutOfRange(f64),
}

/// Cartesian position on the track plane, resolved from a segment index and
/// a progress fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

/// Immutable closed track polyline with precomputed segment geometry and the
/// braking-zone table keyed by segment index.
#[derive(Debug)]
pub struct Track {
    pub name: String,
    segments: Vec<TrackSegment>,
    zones: Vec<Option<BrakingZone>>,
    cumulative_length: Vec<f64>,
    pub total_length: f64,
    /// Indices of zero-length segments that were recovered with length 1.0.
    pub degenerate_segments: Vec<usize>,
    pub movement_scale_factor: f64,
    sector_splits: [usize; 2],
}

impl Track {
    pub fn new(track_pars: &TrackPars) -> Result<Track, TrackError> {
        // close the loop if the caller did not repeat the first point
        let mut points = track_pars.points.clone();
        if points.first() != points.last() {
            if let Some(&first) = points.first() {
                points.push(first);
            }
        }

        let segment_count = points.len().saturating_sub(1);
        if segment_count < 3 {
            return Err(TrackError::TooFewPoints(segment_count));
        }

        let mut segments = Vec::with_capacity(segment_count);
        let mut degenerate_segments = Vec::new();
        let mut cumulative_length = Vec::with_capacity(segment_count);
        let mut total_length = 0.0;

        for i in 0..segment_count {
            let start = points[i];
            let end = points[i + 1];
            let dx = end.x - start.x;
            let dy = end.y - start.y;
            let mut length = (dx * dx + dy * dy).sqrt();

            // zero length would break the progress division later on; store
            // an effective length of 1.0 and flag the segment
            if length == 0.0 {
                degenerate_segments.push(i);
                length = 1.0;
            }

            cumulative_length.push(total_length);
            total_length += length;

            segments.push(TrackSegment {
                start,
                end,
                length,
                heading: dy.atan2(dx),
            });
        }

        // build the per-segment zone lookup
        let mut zones: Vec<Option<BrakingZone>> = vec![None; segment_count];

        for zone in track_pars.braking_zones.iter() {
            if zone.segment_index >= segment_count {
                return Err(TrackError::ZoneOutOfRange {
                    zone_segment: zone.segment_index,
                    segment_count,
                });
            }
            if !(zone.brake_start > 0.0 && zone.brake_start < 1.0) {
                return Err(TrackError::BrakeStartOutOfRange(zone.brake_start));
            }
            if zones[zone.segment_index].is_some() {
                return Err(TrackError::DuplicateZone(zone.segment_index));
            }
            zones[zone.segment_index] = Some(zone.to_owned());
        }

        Ok(Track {
            name: track_pars.name.to_owned(),
            segments,
            zones,
            cumulative_length,
            total_length,
            degenerate_segments,
            movement_scale_factor: track_pars.movement_scale_factor,
            sector_splits: track_pars.sector_splits,
        })
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn segment(&self, index: usize) -> &TrackSegment {
        &self.segments[index]
    }

    pub fn zone(&self, segment_index: usize) -> Option<&BrakingZone> {
        self.zones[segment_index].as_ref()
    }

    /// The method resolves a (segment, progress) pair to a Cartesian position
    /// by linear interpolation between the segment endpoints.
    pub fn resolve(&self, segment_index: usize, progress: f64) -> Position {
        let seg = &self.segments[segment_index];
        Position {
            x: seg.start.x + (seg.end.x - seg.start.x) * progress,
            y: seg.start.y + (seg.end.y - seg.start.y) * progress,
            heading: seg.heading,
        }
    }

    /// The method returns the fraction of one lap covered at the given
    /// (segment, progress) pair, in [0, 1).
    pub fn lap_fraction(&self, segment_index: usize, progress: f64) -> f64 {
        let covered =
            self.cumulative_length[segment_index] + self.segments[segment_index].length * progress;
        covered / self.total_length
    }

    /// The method returns the timing sector (0, 1 or 2) a segment belongs to.
    pub fn sector_of(&self, segment_index: usize) -> usize {
        if segment_index < self.sector_splits[0] {
            0
        } else if segment_index < self.sector_splits[1] {
            1
        } else {
            2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pars_for(points: Vec<TrackPoint>) -> TrackPars {
        TrackPars {
            name: "test".to_string(),
            points,
            braking_zones: vec![],
            movement_scale_factor: 1.0,
            sector_splits: [1, 2],
            centerline_csv: None,
        }
    }

    fn pt(x: f64, y: f64) -> TrackPoint {
        TrackPoint { x, y }
    }

    fn zone_on(segment_index: usize) -> BrakingZone {
        BrakingZone {
            segment_index,
            brake_start: 0.9,
            brake_target: 80.0,
            target_gear: 3,
            downshift_step: 1,
            min_corner_speed: 80.0,
            braking_power: 1.0,
        }
    }

    #[test]
    fn rejects_too_few_points() {
        let pars = pars_for(vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(0.0, 0.0)]);
        assert!(matches!(Track::new(&pars), Err(TrackError::TooFewPoints(2))));
    }

    #[test]
    fn closes_an_open_loop() {
        let pars = pars_for(vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(1.0, 1.0), pt(0.0, 1.0)]);
        let track = Track::new(&pars).unwrap();
        assert_eq!(track.segment_count(), 4);
        assert_relative_eq!(track.total_length, 4.0);
    }

    #[test]
    fn flags_zero_length_segments_and_recovers() {
        let pars = pars_for(vec![
            pt(0.0, 0.0),
            pt(1.0, 0.0),
            pt(1.0, 0.0),
            pt(1.0, 1.0),
            pt(0.0, 1.0),
            pt(0.0, 0.0),
        ]);
        let track = Track::new(&pars).unwrap();
        assert_eq!(track.degenerate_segments, vec![1]);
        assert_eq!(track.segment(1).length, 1.0);
    }

    #[test]
    fn resolve_interpolates_between_endpoints() {
        let pars = pars_for(vec![pt(0.0, 0.0), pt(2.0, 0.0), pt(2.0, 2.0), pt(0.0, 2.0)]);
        let track = Track::new(&pars).unwrap();
        let pos = track.resolve(0, 0.25);
        assert_relative_eq!(pos.x, 0.5);
        assert_relative_eq!(pos.y, 0.0);
        assert_relative_eq!(pos.heading, 0.0);
    }

    #[test]
    fn rejects_zone_beyond_last_segment() {
        let mut pars = pars_for(vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(1.0, 1.0), pt(0.0, 1.0)]);
        pars.braking_zones.push(zone_on(4));
        assert!(matches!(
            Track::new(&pars),
            Err(TrackError::ZoneOutOfRange { .. })
        ));
    }

    #[test]
    fn rejects_two_zones_on_one_segment() {
        let mut pars = pars_for(vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(1.0, 1.0), pt(0.0, 1.0)]);
        pars.braking_zones.push(zone_on(1));
        pars.braking_zones.push(zone_on(1));
        assert!(matches!(Track::new(&pars), Err(TrackError::DuplicateZone(1))));
    }

    #[test]
    fn lap_fraction_covers_the_loop() {
        let pars = pars_for(vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(1.0, 1.0), pt(0.0, 1.0)]);
        let track = Track::new(&pars).unwrap();
        assert_relative_eq!(track.lap_fraction(0, 0.0), 0.0);
        assert_relative_eq!(track.lap_fraction(2, 0.5), 0.625);
    }

    #[test]
    fn sector_lookup_follows_the_splits() {
        let mut pars = pars_for(vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(1.0, 1.0), pt(0.0, 1.0)]);
        pars.sector_splits = [1, 3];
        let track = Track::new(&pars).unwrap();
        assert_eq!(track.sector_of(0), 0);
        assert_eq!(track.sector_of(1), 1);
        assert_eq!(track.sector_of(2), 1);
        assert_eq!(track.sector_of(3), 2);
    }
}
