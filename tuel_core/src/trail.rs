// Copyright 2026 the TUEL Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded, time-limited pointer trail.

use alloc::collections::VecDeque;

use kurbo::{BezPath, Point};

use crate::error::ConfigError;
use crate::time::{Duration, HostTime};

/// Trail options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrailConfig {
    /// Most points kept; the oldest is evicted first.
    pub max_points: usize,
    /// Age after which a point is pruned.
    pub lifetime: Duration,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            max_points: 20,
            lifetime: Duration::from_millis(500),
        }
    }
}

/// One pointer sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailPoint {
    /// Pointer position.
    pub position: Point,
    /// When it was sampled.
    pub at: HostTime,
}

/// Recent pointer positions, oldest first.
#[derive(Clone, Debug)]
pub struct PointerTrail {
    config: TrailConfig,
    points: VecDeque<TrailPoint>,
}

impl PointerTrail {
    /// Creates an empty trail.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `max_points` or `lifetime` is zero.
    pub fn new(config: TrailConfig) -> Result<Self, ConfigError> {
        if config.max_points == 0 {
            return Err(ConfigError::ZeroTrailCapacity);
        }
        if config.lifetime.is_zero() {
            return Err(ConfigError::ZeroTrailLifetime);
        }
        Ok(Self {
            config,
            points: VecDeque::with_capacity(config.max_points),
        })
    }

    /// Appends a sample, pruning expired points and evicting the oldest once
    /// full.
    pub fn push(&mut self, position: Point, at: HostTime) {
        self.prune(at);
        if self.points.len() == self.config.max_points {
            self.points.pop_front();
        }
        self.points.push_back(TrailPoint { position, at });
    }

    /// Drops points older than the lifetime at `now`.
    pub fn prune(&mut self, now: HostTime) {
        let lifetime = self.config.lifetime;
        while let Some(oldest) = self.points.front() {
            if now.saturating_duration_since(oldest.at) > lifetime {
                self.points.pop_front();
            } else {
                break;
            }
        }
    }

    /// Opacity of `point` at `now`: 1 when fresh, 0 at the end of its lifetime.
    #[must_use]
    pub fn fade(&self, point: &TrailPoint, now: HostTime) -> f64 {
        1.0 - now
            .saturating_duration_since(point.at)
            .fraction_of(self.config.lifetime)
    }

    /// The points, oldest first.
    pub fn points(&self) -> impl Iterator<Item = &TrailPoint> {
        self.points.iter()
    }

    /// A polyline through the points, oldest first.
    #[must_use]
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut points = self.points.iter();
        if let Some(first) = points.next() {
            path.move_to(first.position);
            for p in points {
                path.line_to(p.position);
            }
        }
        path
    }

    /// Forgets every point.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Number of points held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if no points are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The trail's configuration.
    #[must_use]
    pub fn config(&self) -> &TrailConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    fn ms(ms: u64) -> HostTime {
        HostTime::ZERO + Duration::from_millis(ms)
    }

    #[test]
    fn zero_config_is_rejected() {
        let no_points = TrailConfig {
            max_points: 0,
            ..TrailConfig::default()
        };
        assert_eq!(
            PointerTrail::new(no_points).unwrap_err(),
            ConfigError::ZeroTrailCapacity
        );
        let no_life = TrailConfig {
            lifetime: Duration::ZERO,
            ..TrailConfig::default()
        };
        assert_eq!(
            PointerTrail::new(no_life).unwrap_err(),
            ConfigError::ZeroTrailLifetime
        );
    }

    #[test]
    fn capacity_evicts_oldest() {
        let config = TrailConfig {
            max_points: 3,
            ..TrailConfig::default()
        };
        let mut trail = PointerTrail::new(config).unwrap();
        for i in 0..5_u32 {
            trail.push(Point::new(f64::from(i), 0.0), ms(u64::from(i)));
        }
        let xs: Vec<f64> = trail.points().map(|p| p.position.x).collect();
        assert_eq!(xs, [2.0, 3.0, 4.0]);
    }

    #[test]
    fn expired_points_are_pruned() {
        let mut trail = PointerTrail::new(TrailConfig::default()).unwrap();
        trail.push(Point::new(0.0, 0.0), ms(0));
        trail.push(Point::new(1.0, 1.0), ms(300));
        trail.prune(ms(500));
        assert_eq!(trail.len(), 2, "exactly at lifetime is kept");
        trail.prune(ms(600));
        assert_eq!(trail.len(), 1, "first point expired");
        trail.push(Point::new(2.0, 2.0), ms(900));
        assert_eq!(trail.len(), 1, "push prunes too");
        trail.clear();
        assert!(trail.is_empty());
    }

    #[test]
    fn fade_is_linear_in_age() {
        let mut trail = PointerTrail::new(TrailConfig::default()).unwrap();
        trail.push(Point::new(0.0, 0.0), ms(0));
        let point = *trail.points().next().unwrap();
        assert!((trail.fade(&point, ms(0)) - 1.0).abs() < 1e-9);
        assert!((trail.fade(&point, ms(250)) - 0.5).abs() < 1e-9);
        assert!(trail.fade(&point, ms(900)).abs() < 1e-9, "clamped at zero");
    }

    #[test]
    fn path_follows_points() {
        let mut trail = PointerTrail::new(TrailConfig::default()).unwrap();
        assert!(trail.to_path().elements().is_empty(), "empty trail");
        trail.push(Point::new(0.0, 0.0), ms(0));
        trail.push(Point::new(10.0, 0.0), ms(10));
        trail.push(Point::new(10.0, 10.0), ms(20));
        assert_eq!(trail.to_path().elements().len(), 3, "move + two lines");
    }
}
