//! Track centreline curve
//!
//! The track is a 1D-parametrized path sampled once at level load:
//! - `t ∈ [0, 1]`: normalized fraction of total arc length
//! - `z = t · length`, `x = A1·sin(ω1·t) + A2·sin(ω2·t)`, flat in y
//!
//! Queries interpolate by arc length, so equal steps in `t` cover equal
//! distance regardless of how the raw samples bunch up in tight bends.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::{normalize_angle, yaw_of};

/// One sinusoidal term of the track generator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    pub amplitude: f64,
    /// Angular frequency over `t ∈ [0, 1]` (radians)
    pub frequency: f64,
}

impl Wave {
    #[inline]
    pub fn sample(&self, t: f64) -> f64 {
        self.amplitude * (self.frequency * t).sin()
    }
}

/// Sampled, immutable track centreline
///
/// Only constructed through [`TrackCurve::build`], which always yields at
/// least two samples.
#[derive(Debug, Clone, Serialize)]
pub struct TrackCurve {
    /// `segments + 1` sampled points
    points: Vec<DVec3>,
    /// Cumulative arc length at each point (non-decreasing, starts at 0)
    distances: Vec<f64>,
    total: f64,
    half_width: f64,
}

impl TrackCurve {
    /// Sample the generator into a curve
    ///
    /// `segments` is clamped to at least 1.
    pub fn build(length: f64, segments: usize, half_width: f64, major: Wave, minor: Wave) -> Self {
        let segments = segments.max(1);
        let mut points = Vec::with_capacity(segments + 1);
        let mut distances = Vec::with_capacity(segments + 1);
        let mut total = 0.0;

        for i in 0..=segments {
            let t = i as f64 / segments as f64;
            let point = DVec3::new(major.sample(t) + minor.sample(t), 0.0, t * length);
            if let Some(prev) = points.last() {
                total += point.distance(*prev);
            }
            points.push(point);
            distances.push(total);
        }

        Self {
            points,
            distances,
            total,
            half_width,
        }
    }

    /// Total arc length
    #[inline]
    pub fn total(&self) -> f64 {
        self.total
    }

    #[inline]
    pub fn half_width(&self) -> f64 {
        self.half_width
    }

    /// Number of segments between samples
    #[inline]
    pub fn segments(&self) -> usize {
        self.points.len() - 1
    }

    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Parameter step used for finite differences
    #[inline]
    fn dt(&self) -> f64 {
        1.0 / self.segments() as f64
    }

    /// Centreline position at fraction `t` (clamped to [0, 1])
    pub fn point_at(&self, t: f64) -> DVec3 {
        let last = self.points.len() - 1;
        if t.is_nan() || t <= 0.0 {
            return self.points[0];
        }
        if t >= 1.0 {
            return self.points[last];
        }

        let target = t * self.total;
        // First sample whose distance reaches the target
        let idx = self.distances.partition_point(|&d| d < target).clamp(1, last);

        let prev_dist = self.distances[idx - 1];
        let span = self.distances[idx] - prev_dist;
        let ratio = if span > 0.0 {
            ((target - prev_dist) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.points[idx - 1].lerp(self.points[idx], ratio)
    }

    /// Unit tangent at `t`
    ///
    /// Central difference in the interior, one-sided at the ends.
    pub fn tangent_at(&self, t: f64) -> DVec3 {
        let last = self.points.len() - 1;
        if t >= 1.0 {
            return (self.points[last] - self.points[last - 1]).normalize_or(DVec3::Z);
        }
        if t <= 0.0 {
            return (self.points[1] - self.points[0]).normalize_or(DVec3::Z);
        }

        let dt = self.dt();
        let ahead = self.point_at((t + dt).min(1.0));
        let behind = self.point_at((t - dt).max(0.0));
        (ahead - behind).normalize_or(DVec3::Z)
    }

    /// Unit ground-plane normal that positive lateral offsets point along
    ///
    /// `(-tz, 0, tx)`: with the track heading +Z this is -X, the driver's
    /// right when viewed from the chase camera.
    #[inline]
    pub fn side_at(&self, t: f64) -> DVec3 {
        let tangent = self.tangent_at(t);
        DVec3::new(-tangent.z, 0.0, tangent.x).normalize_or(DVec3::X)
    }

    /// Track heading at `t` (radians, from +Z toward +X)
    #[inline]
    pub fn heading_at(&self, t: f64) -> f64 {
        yaw_of(self.tangent_at(t))
    }

    /// Signed turn-rate proxy at `t`
    ///
    /// Heading change across `[t - dt, t + dt]`, wrapped into (-π, π]. This
    /// scales with sample spacing and is not a geometric curvature.
    pub fn curvature_at(&self, t: f64) -> f64 {
        let dt = self.dt();
        let t0 = (t - dt).max(0.0);
        let t1 = (t + dt).min(1.0);
        normalize_angle(self.heading_at(t1) - self.heading_at(t0))
    }

    /// World position offset sideways from the centreline
    pub fn world_at(&self, t: f64, lateral: f64) -> DVec3 {
        self.point_at(t) + self.side_at(t) * lateral
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    fn stock_track() -> TrackCurve {
        TrackCurve::build(
            800.0,
            200,
            6.0,
            Wave {
                amplitude: 12.0,
                frequency: PI * 4.0,
            },
            Wave {
                amplitude: 6.0,
                frequency: PI * 1.5,
            },
        )
    }

    fn straight_track() -> TrackCurve {
        let flat = Wave {
            amplitude: 0.0,
            frequency: 0.0,
        };
        TrackCurve::build(400.0, 50, 6.0, flat, flat)
    }

    #[test]
    fn test_degenerate_build_still_queryable() {
        let flat = Wave {
            amplitude: 0.0,
            frequency: 0.0,
        };
        let track = TrackCurve::build(0.0, 0, 6.0, flat, flat);
        assert_eq!(track.segments(), 1);
        assert_eq!(track.points().len(), 2);
        assert_eq!(track.point_at(0.5), DVec3::ZERO);
        assert_eq!(track.tangent_at(0.5), DVec3::Z);
        assert_eq!(track.curvature_at(0.5), 0.0);
    }

    #[test]
    fn test_endpoints_exact() {
        let track = stock_track();
        assert_eq!(track.point_at(0.0), track.points()[0]);
        assert_eq!(track.point_at(1.0), *track.points().last().unwrap());
        assert_eq!(track.point_at(-3.0), track.points()[0]);
        assert_eq!(track.point_at(7.0), *track.points().last().unwrap());
    }

    #[test]
    fn test_distances_monotonic_and_total() {
        let track = stock_track();
        let d = track.distances();
        assert_eq!(d.len(), 201);
        assert_eq!(d[0], 0.0);
        assert!(d.windows(2).all(|w| w[1] >= w[0]));
        assert_eq!(*d.last().unwrap(), track.total());
        // Winding path is longer than its straight-line span
        assert!(track.total() > 800.0);
    }

    #[test]
    fn test_straight_track_is_linear() {
        let track = straight_track();
        assert!((track.total() - 400.0).abs() < 1e-9);
        let p = track.point_at(0.25);
        assert!((p.z - 100.0).abs() < 1e-9);
        assert!(p.x.abs() < 1e-12);
        assert!(track.curvature_at(0.5).abs() < 1e-12);
        assert!((track.tangent_at(0.5) - DVec3::Z).length() < 1e-12);
        assert!((track.side_at(0.5) - DVec3::new(-1.0, 0.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_tangent_is_unit_everywhere() {
        let track = stock_track();
        for i in 0..=100 {
            let t = i as f64 / 100.0;
            assert!((track.tangent_at(t).length() - 1.0).abs() < 1e-9, "t={t}");
        }
    }

    #[test]
    fn test_curvature_sign_follows_bend() {
        // x = 10 sin(πt): heading swings toward +x then back, so the yaw
        // decreases through the crest
        let track = TrackCurve::build(
            200.0,
            100,
            6.0,
            Wave {
                amplitude: 10.0,
                frequency: PI,
            },
            Wave {
                amplitude: 0.0,
                frequency: 0.0,
            },
        );
        assert!(track.curvature_at(0.5) < 0.0);
        // End samples use one-sided differences and stay finite
        assert!(track.curvature_at(0.0).is_finite());
        assert!(track.curvature_at(1.0).is_finite());
    }

    #[test]
    fn test_degenerate_segments_clamped() {
        let flat = Wave {
            amplitude: 0.0,
            frequency: 0.0,
        };
        let track = TrackCurve::build(10.0, 0, 3.0, flat, flat);
        assert_eq!(track.segments(), 1);
        assert!((track.point_at(0.5).z - 5.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_point_at_is_pure(t in -0.5f64..1.5) {
            let track = stock_track();
            prop_assert_eq!(track.point_at(t), track.point_at(t));
        }

        #[test]
        fn prop_point_at_is_continuous(t in 0.0f64..0.999) {
            let track = stock_track();
            let step = 1e-4;
            let jump = track.point_at(t).distance(track.point_at(t + step));
            // A small step in t covers at most its share of arc length
            prop_assert!(jump <= track.total() * step + 1e-6);
        }

        #[test]
        fn prop_point_at_tracks_arc_length(t in 0.0f64..=1.0) {
            let track = stock_track();
            let p = track.point_at(t);
            let walked = track.point_at(0.0).distance(p);
            // Chord never exceeds arc length
            prop_assert!(walked <= t * track.total() + 1e-6);
        }
    }
}
