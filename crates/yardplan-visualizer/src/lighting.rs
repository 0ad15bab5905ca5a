//! # Sun lighting
//!
//! The sun is placed from the season and time of day through a
//! [`SunPositionProvider`]. [`SolarCalculator`] uses the NOAA low-precision
//! ephemeris, good to a fraction of a degree, which is plenty for shading a
//! garden plan.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use glam::Vec3;
use std::f64::consts::PI;

use yardplan_designer::Season;

/// Sun direction in horizon coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunPosition {
    /// Degrees above the horizon; negative at night.
    pub altitude_deg: f64,
    /// Degrees clockwise from north.
    pub azimuth_deg: f64,
}

pub trait SunPositionProvider {
    fn sun_position(&self, at: DateTime<Utc>, latitude: f64, longitude: f64) -> SunPosition;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SolarCalculator;

impl SunPositionProvider for SolarCalculator {
    fn sun_position(&self, at: DateTime<Utc>, latitude: f64, longitude: f64) -> SunPosition {
        let day = at.ordinal() as f64;
        let hour = at.hour() as f64 + at.minute() as f64 / 60.0 + at.second() as f64 / 3600.0;

        // Fractional year, radians
        let g = 2.0 * PI / 365.0 * (day - 1.0 + (hour - 12.0) / 24.0);

        let eqtime = 229.18
            * (0.000075 + 0.001868 * g.cos()
                - 0.032077 * g.sin()
                - 0.014615 * (2.0 * g).cos()
                - 0.040849 * (2.0 * g).sin());
        let decl = 0.006918 - 0.399912 * g.cos() + 0.070257 * g.sin()
            - 0.006758 * (2.0 * g).cos()
            + 0.000907 * (2.0 * g).sin()
            - 0.002697 * (3.0 * g).cos()
            + 0.00148 * (3.0 * g).sin();

        let true_solar_minutes = hour * 60.0 + eqtime + 4.0 * longitude;
        let hour_angle = (true_solar_minutes / 4.0 - 180.0).to_radians();
        let lat = latitude.to_radians();

        let cos_zenith = (lat.sin() * decl.sin() + lat.cos() * decl.cos() * hour_angle.cos())
            .clamp(-1.0, 1.0);
        let altitude = 90.0 - cos_zenith.acos().to_degrees();

        let from_south = hour_angle
            .sin()
            .atan2(hour_angle.cos() * lat.sin() - decl.tan() * lat.cos());
        let azimuth = (from_south.to_degrees() + 180.0).rem_euclid(360.0);

        SunPosition {
            altitude_deg: altitude,
            azimuth_deg: azimuth,
        }
    }
}

/// Where the yard is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Local clock offset from UTC, hours.
    pub utc_offset_hours: f64,
}

impl Default for SiteLocation {
    fn default() -> Self {
        Self {
            latitude: yardplan_core::constants::DEFAULT_LATITUDE,
            longitude: yardplan_core::constants::DEFAULT_LONGITUDE,
            utc_offset_hours: -5.0,
        }
    }
}

impl SiteLocation {
    /// UTC instant for a local clock time on the season's reference day.
    pub fn instant(&self, season: Season, time_of_day: f64, year: i32) -> DateTime<Utc> {
        let (month, day) = season.reference_date();
        let date = NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default();
        let millis = ((time_of_day - self.utc_offset_hours) * 3_600_000.0).round() as i64;
        (date.and_time(chrono::NaiveTime::MIN) + Duration::milliseconds(millis)).and_utc()
    }
}

/// Directional sun plus a constant ambient term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunLight {
    pub position: SunPosition,
    /// Unit vector from the scene towards the sun (world, z up).
    pub direction: Vec3,
    /// `0..=peak`; zero below the horizon.
    pub intensity: f32,
    pub color: [f32; 3],
    pub ambient: f32,
}

pub const PEAK_INTENSITY: f32 = 1.0;
pub const AMBIENT_INTENSITY: f32 = 0.3;
/// Distance of the sun from the lot centre when a position is needed.
pub const SUN_DISTANCE: f32 = 500.0;

impl Default for SunLight {
    fn default() -> Self {
        Self::from_position(SunPosition {
            altitude_deg: 60.0,
            azimuth_deg: 180.0,
        })
    }
}

impl SunLight {
    pub fn from_position(position: SunPosition) -> Self {
        let alt = (position.altitude_deg as f32).to_radians();
        let az = (position.azimuth_deg as f32).to_radians();
        let direction = Vec3::new(az.sin() * alt.cos(), az.cos() * alt.cos(), alt.sin());
        let intensity = (PEAK_INTENSITY * alt.sin()).clamp(0.0, PEAK_INTENSITY);
        // Warmer light towards the horizon
        let warmth = 1.0 - (position.altitude_deg as f32 / 45.0).clamp(0.0, 1.0);
        let color = [1.0, 1.0 - 0.15 * warmth, 1.0 - 0.35 * warmth];
        Self {
            position,
            direction,
            intensity,
            color,
            ambient: AMBIENT_INTENSITY,
        }
    }

    /// Sun for the design's season and local time at `site`.
    pub fn compute(
        provider: &dyn SunPositionProvider,
        site: &SiteLocation,
        season: Season,
        time_of_day: f64,
        year: i32,
    ) -> Self {
        let at = site.instant(season, time_of_day, year);
        let position = provider.sun_position(at, site.latitude, site.longitude);
        tracing::debug!(
            "Sun for {} {:.2}h: altitude {:.1}, azimuth {:.1}",
            season,
            time_of_day,
            position.altitude_deg,
            position.azimuth_deg
        );
        Self::from_position(position)
    }

    /// [`compute`](Self::compute) for the current year.
    pub fn for_now(
        provider: &dyn SunPositionProvider,
        site: &SiteLocation,
        season: Season,
        time_of_day: f64,
    ) -> Self {
        Self::compute(provider, site, season, time_of_day, Utc::now().year())
    }

    pub fn world_position(&self) -> Vec3 {
        self.direction * SUN_DISTANCE
    }

    pub fn is_up(&self) -> bool {
        self.position.altitude_deg > 0.0
    }

    /// Brightness of a surface with unit `normal`, `0..=1`.
    pub fn shade(&self, normal: Vec3) -> f32 {
        let diffuse = normal.dot(self.direction).max(0.0) * self.intensity;
        (self.ambient + diffuse).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sun(season: Season, hour: f64) -> SunLight {
        SunLight::compute(&SolarCalculator, &SiteLocation::default(), season, hour, 2024)
    }

    #[test]
    fn test_noon_altitude_tracks_season() {
        let summer = sun(Season::Summer, 12.0);
        let winter = sun(Season::Winter, 12.0);
        // 90 - 40 +/- 23.4
        assert!((summer.position.altitude_deg - 73.4).abs() < 2.0);
        assert!((winter.position.altitude_deg - 26.6).abs() < 2.0);
        assert!((summer.position.azimuth_deg - 180.0).abs() < 10.0);
        assert!(summer.intensity > winter.intensity);
    }

    #[test]
    fn test_night_has_only_ambient() {
        let night = sun(Season::Summer, 0.0);
        assert!(!night.is_up());
        assert_eq!(night.intensity, 0.0);
        assert!((night.shade(Vec3::Z) - AMBIENT_INTENSITY).abs() < 1e-6);
    }

    #[test]
    fn test_morning_sun_is_east() {
        let morning = sun(Season::Spring, 8.0);
        assert!(morning.is_up());
        assert!(morning.position.azimuth_deg > 60.0 && morning.position.azimuth_deg < 150.0);
        assert!(morning.direction.x > 0.0);
    }

    #[test]
    fn test_instant_applies_utc_offset() {
        let site = SiteLocation::default();
        let at = site.instant(Season::Summer, 12.0, 2024);
        assert_eq!(at.hour(), 17);
        assert_eq!((at.month(), at.day()), (6, 21));
    }
}
