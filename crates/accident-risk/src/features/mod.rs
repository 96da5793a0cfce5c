//! Turns the handful of fields a caller types in (place, area, optional
//! vehicle, weather, and time) into the dense, positionally aligned row the
//! classifier was trained on.
//!
//! Every slot starts at zero, meaning "absent / typical". Only the temporal
//! slots and the one-hot slots for recognized categories are ever written;
//! offense, severity, and driver-behavior columns stay at their baseline.

mod normalizer;
mod schema;
mod timestamp;

pub use schema::FeatureSchema;
pub use timestamp::{parse_timestamp, resolve_timestamp};

use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use ndarray::{Array2, ArrayView1, ArrayView2};
use normalizer::normalize_category;

pub const MONTH: &str = "month";
pub const DAY_OF_WEEK: &str = "day_of_week";
pub const HOUR: &str = "hour";
/// Reserved for a composite place/area encoding that is never computed; the
/// slot is kept at zero so columns stay aligned with the trained model.
pub const LOCATION_KEY: &str = "location_key";

/// Categorical inputs that map onto one-hot columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFeature {
    Station,
    PlaceOfAccident,
    VehiclesInvolved,
    WeatherCondition,
}

impl CategoryFeature {
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Station => "Station_",
            Self::PlaceOfAccident => "Place_of_Accident_",
            Self::VehiclesInvolved => "Vehicles_involved_",
            Self::WeatherCondition => "Weather_Condition_",
        }
    }

    /// Column name a raw value would occupy if the model knows it.
    pub fn feature_name(self, raw: &str) -> String {
        format!("{}{}", self.prefix(), normalize_category(raw))
    }
}

/// Raw fields describing the location and moment being assessed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocationQuery<'a> {
    pub place: &'a str,
    pub area: &'a str,
    pub timestamp: Option<&'a str>,
    pub vehicle_type: Option<&'a str>,
    pub weather: Option<&'a str>,
}

impl<'a> LocationQuery<'a> {
    pub fn new(place: &'a str, area: &'a str) -> Self {
        Self {
            place,
            area,
            ..Self::default()
        }
    }

    pub fn with_timestamp(mut self, timestamp: Option<&'a str>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_vehicle_type(mut self, vehicle_type: Option<&'a str>) -> Self {
        self.vehicle_type = vehicle_type;
        self
    }

    pub fn with_weather(mut self, weather: Option<&'a str>) -> Self {
        self.weather = weather;
        self
    }
}

/// One-row matrix in schema order, the shape the classifier's batch API takes.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Array2<f64>,
}

impl FeatureVector {
    fn zeros(width: usize) -> Self {
        Self {
            values: Array2::zeros((1, width)),
        }
    }

    /// Wrap an arbitrary matrix, e.g. one produced outside the encoder.
    pub fn from_array(values: Array2<f64>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.values.ncols() == 0
    }

    pub fn rows(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// The first row; `None` for a matrix with no rows.
    pub fn row(&self) -> Option<ArrayView1<'_, f64>> {
        (self.values.nrows() > 0).then(|| self.values.row(0))
    }

    pub fn count_nonzero(&self) -> usize {
        self.values.iter().filter(|value| **value != 0.0).count()
    }

    fn set(&mut self, positions: &[usize], value: f64) {
        for &position in positions {
            self.values[[0, position]] = value;
        }
    }
}

/// Stateless encoder bound to a fixed schema.
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    schema: FeatureSchema,
}

impl FeatureEncoder {
    pub fn new(schema: FeatureSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Encode using the current local time when the query carries no usable
    /// timestamp.
    pub fn encode(&self, query: &LocationQuery<'_>) -> FeatureVector {
        self.encode_at(query, Local::now().naive_local())
    }

    /// Encode with an explicit fallback time for missing or malformed
    /// timestamps.
    pub fn encode_at(&self, query: &LocationQuery<'_>, fallback: NaiveDateTime) -> FeatureVector {
        let moment = resolve_timestamp(query.timestamp, fallback);
        let mut vector = FeatureVector::zeros(self.schema.len());

        self.assign(&mut vector, MONTH, f64::from(moment.month()));
        self.assign(
            &mut vector,
            DAY_OF_WEEK,
            f64::from(moment.weekday().num_days_from_monday()),
        );
        self.assign(&mut vector, HOUR, f64::from(moment.hour()));
        self.assign(&mut vector, LOCATION_KEY, 0.0);

        self.activate(&mut vector, CategoryFeature::Station, Some(query.area));
        self.activate(&mut vector, CategoryFeature::PlaceOfAccident, Some(query.place));
        self.activate(&mut vector, CategoryFeature::VehiclesInvolved, query.vehicle_type);
        self.activate(&mut vector, CategoryFeature::WeatherCondition, query.weather);

        vector
    }

    /// Index of a named slot, if the schema has it.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.schema.positions(name).first().copied()
    }

    fn assign(&self, vector: &mut FeatureVector, name: &str, value: f64) {
        vector.set(self.schema.positions(name), value);
    }

    /// Returns whether a column was switched on; unknown categories are a no-op.
    fn activate(
        &self,
        vector: &mut FeatureVector,
        category: CategoryFeature,
        raw: Option<&str>,
    ) -> bool {
        let Some(raw) = raw.filter(|value| !value.trim().is_empty()) else {
            return false;
        };
        let name = category.feature_name(raw);
        if !self.schema.contains(&name) {
            return false;
        }
        vector.set(self.schema.positions(&name), 1.0);
        true
    }
}
