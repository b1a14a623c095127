//! Data type and methods to store a fine grained atmospheric sounding.

use chrono::NaiveDateTime;
use itertools::izip;
use metfor::{Celsius, Meters};
use optional::Optioned;

/// One level of a sounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundingPoint {
    /// Ambient temperature.
    pub temperature: Celsius,
    /// Ambient dew point.
    pub dew_point: Celsius,
    /// Altitude above mean sea level.
    pub altitude: Meters,
}

/// A sounding for the index locator. The points are ordered by increasing altitude and the lowest
/// point is taken as the surface.
#[derive(Clone, Debug, Default)]
pub struct Sounding {
    // Description of the source of the sounding.
    source: Option<String>,

    // Valid time of sounding
    valid_time: Option<NaiveDateTime>,

    // The day's forecast maximum temperature, the default candidate for the locator.
    forecast_max_t: Optioned<Celsius>,

    points: Vec<SoundingPoint>,
}

impl Sounding {
    /// Create a new, empty sounding. This is a proxy for default with a clearer name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use soaring_analysis::Sounding;
    ///
    /// let snd = Sounding::new();
    /// assert!(snd.points().is_empty());
    /// ```
    #[inline]
    pub fn new() -> Self {
        Sounding::default()
    }

    /// Build a sounding from parallel profiles that may have missing values. Rows missing any of
    /// the three values are skipped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use metfor::{Celsius, Meters};
    /// use optional::{none, some};
    /// use soaring_analysis::Sounding;
    ///
    /// let t = vec![some(Celsius(20.0)), some(Celsius(15.0)), some(Celsius(10.0))];
    /// let dp = vec![some(Celsius(10.0)), none(), some(Celsius(0.0))];
    /// let z = vec![some(Meters(1000.0)), some(Meters(1500.0)), some(Meters(2000.0))];
    ///
    /// let snd = Sounding::from_profiles(&t, &dp, &z);
    /// assert_eq!(snd.points().len(), 2);
    /// assert_eq!(snd.surface_altitude().unwrap(), Meters(1000.0));
    /// ```
    pub fn from_profiles(
        temperature: &[Optioned<Celsius>],
        dew_point: &[Optioned<Celsius>],
        altitude: &[Optioned<Meters>],
    ) -> Self {
        let points = izip!(temperature, dew_point, altitude)
            .filter_map(|(t, dp, z)| {
                if let (Some(t), Some(dp), Some(z)) =
                    (t.into_option(), dp.into_option(), z.into_option())
                {
                    Some(SoundingPoint {
                        temperature: t,
                        dew_point: dp,
                        altitude: z,
                    })
                } else {
                    None
                }
            })
            .collect();

        Sounding::new().with_points(points)
    }

    /// Builder method for the points of the sounding.
    #[inline]
    pub fn with_points(self, points: Vec<SoundingPoint>) -> Self {
        Self { points, ..self }
    }

    /// Get the points, bottom up.
    #[inline]
    pub fn points(&self) -> &[SoundingPoint] {
        &self.points
    }

    /// Add a source description to this sounding.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use soaring_analysis::Sounding;
    ///
    /// let snd = Sounding::new().with_source_description("An empty sounding.".to_owned());
    /// assert_eq!(snd.source_description().unwrap(), "An empty sounding.");
    ///
    /// let snd = snd.with_source_description(None);
    /// assert!(snd.source_description().is_none());
    /// ```
    #[inline]
    pub fn with_source_description<S>(mut self, desc: S) -> Self
    where
        Option<String>: From<S>,
    {
        self.source = Option::from(desc);
        self
    }

    /// Retrieve a source description for this sounding.
    #[inline]
    pub fn source_description(&self) -> Option<&str> {
        self.source.as_ref().map(|s| s.as_ref())
    }

    /// Builder method to set the valid time of the sounding.
    #[inline]
    pub fn with_valid_time<T>(mut self, valid_time: T) -> Self
    where
        Option<NaiveDateTime>: From<T>,
    {
        self.valid_time = Option::from(valid_time);
        self
    }

    /// Valid time of the sounding.
    #[inline]
    pub fn valid_time(&self) -> Option<NaiveDateTime> {
        self.valid_time
    }

    /// Set the forecast maximum temperature for the day.
    ///
    /// # Examples
    ///```rust
    /// use metfor::{Celsius, Fahrenheit};
    /// use optional::{none, some};
    /// use soaring_analysis::Sounding;
    ///
    /// let _snd = Sounding::new().with_forecast_max_temperature(Celsius(28.0));
    /// let _snd = Sounding::new().with_forecast_max_temperature(some(Celsius(28.0)));
    /// let _snd = Sounding::new().with_forecast_max_temperature(none::<Celsius>());
    /// let snd = Sounding::new().with_forecast_max_temperature(Fahrenheit(86.0));
    ///
    /// let t = snd.default_candidate_temperature().unwrap();
    /// assert!((t.0 - 30.0).abs() < 1.0e-9);
    ///```
    #[inline]
    pub fn with_forecast_max_temperature<T, U>(mut self, value: T) -> Self
    where
        Optioned<U>: From<T>,
        U: optional::Noned + metfor::Temperature,
        Celsius: From<U>,
    {
        let max_t: Optioned<U> = Optioned::from(value);
        self.forecast_max_t = max_t.map_t(Celsius::from);
        self
    }

    /// The candidate surface temperature to use when the caller doesn't supply one, the day's
    /// forecast maximum.
    #[inline]
    pub fn default_candidate_temperature(&self) -> Optioned<Celsius> {
        self.forecast_max_t
    }

    /// Altitude of the lowest point.
    #[inline]
    pub fn surface_altitude(&self) -> Optioned<Meters> {
        Optioned::from(self.points.first().map(|pnt| pnt.altitude))
    }
}
