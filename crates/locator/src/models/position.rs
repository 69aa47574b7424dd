//! Position fixes as delivered by a location provider.

use geo::Point;

/// A single position fix.
///
/// `accuracy` is the reported uncertainty radius in meters and `speed` the
/// ground speed in meters per second. Fixes are immutable once created.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub altitude: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub accuracy: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub speed: f64,
}

impl Position {
    /// A fix with zero accuracy radius and zero speed.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            accuracy: 0.0,
            speed: 0.0,
        }
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = accuracy;
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    /// Location as a `geo::Point` (x = longitude, y = latitude)
    pub fn point(&self) -> Point {
        Point::new(self.longitude, self.latitude)
    }

    /// Whether the fix can be classified at all.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
            && self.accuracy.is_finite()
            && self.accuracy >= 0.0
            && self.speed.is_finite()
            && self.altitude.map_or(true, f64::is_finite)
    }
}
