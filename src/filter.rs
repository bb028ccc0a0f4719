//! Advanced approach filters.
//!
//! Holds the filter form state (one date floor, four min/max slider pairs and
//! a hazard choice) and assembles the parameterized filter query from it.

use crate::db::Value;
use crate::error::{Result, TrackerError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::macros::{date, format_description};
use time::{Date, Duration, Month};

/// Date the filter form starts at.
pub const DEFAULT_DATE: Date = date!(2024 - 01 - 01);

/// Coverage of the bundled dataset, shown next to the date field.
pub const DATA_RANGE_NOTE: &str = "Data Range: January 1, 2024 - December 31, 2024";

const FILTER_SELECT: &str = "SELECT a.name, ca.close_approach_date, ca.relative_velocity_km_per_hour, \
ca.miss_distance_km, ca.miss_distance_lunar, a.estimated_diameter_min_km, \
a.estimated_diameter_max_km, a.is_potentially_hazardous_asteroid \
FROM close_approach ca \
JOIN asteroids a ON ca.neo_reference_id = a.id \
WHERE DATE(ca.close_approach_date) >= DATE(?) \
AND ca.astronomical BETWEEN ? AND ? \
AND ca.miss_distance_lunar BETWEEN ? AND ? \
AND ca.relative_velocity_km_per_hour BETWEEN ? AND ? \
AND a.estimated_diameter_max_km BETWEEN ? AND ?";

/// Hazard classification filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Hazard {
    #[default]
    Both,
    Yes,
    No,
}

impl Hazard {
    /// The next choice, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Hazard::Both => Hazard::Yes,
            Hazard::Yes => Hazard::No,
            Hazard::No => Hazard::Both,
        }
    }

    /// The previous choice, wrapping around.
    pub fn prev(self) -> Self {
        match self {
            Hazard::Both => Hazard::No,
            Hazard::Yes => Hazard::Both,
            Hazard::No => Hazard::Yes,
        }
    }

    fn clause(self) -> Option<&'static str> {
        match self {
            Hazard::Both => None,
            Hazard::Yes => Some(" AND a.is_potentially_hazardous_asteroid = 1"),
            Hazard::No => Some(" AND a.is_potentially_hazardous_asteroid = 0"),
        }
    }
}

impl fmt::Display for Hazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Hazard::Both => "Both",
            Hazard::Yes => "Yes",
            Hazard::No => "No",
        };
        f.write_str(s)
    }
}

impl FromStr for Hazard {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "both" => Ok(Hazard::Both),
            "yes" => Ok(Hazard::Yes),
            "no" => Ok(Hazard::No),
            _ => Err(TrackerError::config(format!(
                "Invalid hazard choice '{s}'. Expected Both, Yes or No"
            ))),
        }
    }
}

/// A single slider: fixed bounds and step, clamped value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slider {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub value: f64,
}

impl Slider {
    pub const fn new(min: f64, max: f64, step: f64, value: f64) -> Self {
        Self {
            min,
            max,
            step,
            value,
        }
    }

    /// Sets the value, clamped to the slider bounds.
    pub fn set(&mut self, value: f64) {
        self.value = value.clamp(self.min, self.max);
    }

    pub fn step_up(&mut self) {
        self.set(self.snap(self.value + self.step));
    }

    pub fn step_down(&mut self) {
        self.set(self.snap(self.value - self.step));
    }

    /// Rounds to a whole number of steps above `min`, dropping float drift.
    fn snap(&self, value: f64) -> f64 {
        let steps = ((value - self.min) / self.step).round();
        let snapped = self.min + steps * self.step;
        // Keep two decimals more than the step resolution
        let scale = 10f64.powi(decimals(self.step) as i32 + 2);
        (snapped * scale).round() / scale
    }
}

fn decimals(step: f64) -> usize {
    let mut decimals = 0;
    let mut scaled = step;
    while decimals < 6 && (scaled - scaled.round()).abs() > 1e-9 {
        scaled *= 10.0;
        decimals += 1;
    }
    decimals
}

/// A min/max slider pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: Slider,
    pub max: Slider,
}

impl Range {
    const fn new(lower: f64, upper: f64, step: f64, default_min: f64, default_max: f64) -> Self {
        Self {
            min: Slider::new(lower, upper, step, default_min),
            max: Slider::new(lower, upper, step, default_max),
        }
    }

    /// Bind values for `BETWEEN ? AND ?`. Min above max is passed through as is.
    fn bounds(&self) -> [Value; 2] {
        [Value::Float(self.min.value), Value::Float(self.max.value)]
    }
}

/// Filter form fields in navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterField {
    #[default]
    Date,
    MinVelocity,
    MaxVelocity,
    MinDiameter,
    MaxDiameter,
    MinAu,
    MaxAu,
    MinLd,
    MaxLd,
    Hazard,
}

impl FilterField {
    pub const ALL: [FilterField; 10] = [
        FilterField::Date,
        FilterField::MinVelocity,
        FilterField::MaxVelocity,
        FilterField::MinDiameter,
        FilterField::MaxDiameter,
        FilterField::MinAu,
        FilterField::MaxAu,
        FilterField::MinLd,
        FilterField::MaxLd,
        FilterField::Hazard,
    ];

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    /// Field below this one; stays on the last field.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1).min(Self::ALL.len() - 1)]
    }

    /// Field above this one; stays on the first field.
    pub fn prev(self) -> Self {
        Self::ALL[self.index().saturating_sub(1)]
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterField::Date => "Close Approach Date (after)",
            FilterField::MinVelocity => "Minimum Relative Velocity (km/h)",
            FilterField::MaxVelocity => "Maximum Relative Velocity (km/h)",
            FilterField::MinDiameter => "Minimum Estimated Diameter (km)",
            FilterField::MaxDiameter => "Maximum Estimated Diameter (km)",
            FilterField::MinAu => "Minimum AU",
            FilterField::MaxAu => "Maximum AU",
            FilterField::MinLd => "Minimum LD",
            FilterField::MaxLd => "Maximum LD",
            FilterField::Hazard => "Potentially Hazardous?",
        }
    }
}

/// Complete filter form state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub date: Date,
    pub velocity: Range,
    pub diameter: Range,
    pub au: Range,
    pub ld: Range,
    pub hazard: Hazard,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            date: DEFAULT_DATE,
            velocity: Range::new(0.0, 100_000.0, 1000.0, 0.0, 50_000.0),
            diameter: Range::new(0.0, 50.0, 0.1, 0.0, 5.0),
            au: Range::new(0.0, 1.0, 0.01, 0.0, 0.05),
            ld: Range::new(0.0, 100.0, 1.0, 0.0, 10.0),
            hazard: Hazard::Both,
        }
    }
}

impl FilterState {
    /// Mutable slider behind a field, if the field is a slider.
    pub fn slider_mut(&mut self, field: FilterField) -> Option<&mut Slider> {
        match field {
            FilterField::MinVelocity => Some(&mut self.velocity.min),
            FilterField::MaxVelocity => Some(&mut self.velocity.max),
            FilterField::MinDiameter => Some(&mut self.diameter.min),
            FilterField::MaxDiameter => Some(&mut self.diameter.max),
            FilterField::MinAu => Some(&mut self.au.min),
            FilterField::MaxAu => Some(&mut self.au.max),
            FilterField::MinLd => Some(&mut self.ld.min),
            FilterField::MaxLd => Some(&mut self.ld.max),
            FilterField::Date | FilterField::Hazard => None,
        }
    }

    /// Slider behind a field, if the field is a slider.
    pub fn slider(&self, field: FilterField) -> Option<&Slider> {
        match field {
            FilterField::MinVelocity => Some(&self.velocity.min),
            FilterField::MaxVelocity => Some(&self.velocity.max),
            FilterField::MinDiameter => Some(&self.diameter.min),
            FilterField::MaxDiameter => Some(&self.diameter.max),
            FilterField::MinAu => Some(&self.au.min),
            FilterField::MaxAu => Some(&self.au.max),
            FilterField::MinLd => Some(&self.ld.min),
            FilterField::MaxLd => Some(&self.ld.max),
            FilterField::Date | FilterField::Hazard => None,
        }
    }

    /// Moves a field one step up (`forward`) or down.
    pub fn adjust(&mut self, field: FilterField, forward: bool) {
        match field {
            FilterField::Date => {
                let day = if forward {
                    Duration::days(1)
                } else {
                    Duration::days(-1)
                };
                if let Some(date) = self.date.checked_add(day) {
                    self.date = date;
                }
            }
            FilterField::Hazard => {
                self.hazard = if forward {
                    self.hazard.next()
                } else {
                    self.hazard.prev()
                };
            }
            _ => {
                if let Some(slider) = self.slider_mut(field) {
                    if forward {
                        slider.step_up();
                    } else {
                        slider.step_down();
                    }
                }
            }
        }
    }

    /// Moves the date one calendar month, keeping the day where the target
    /// month allows it (Jan 31 becomes the last day of February).
    pub fn shift_date_months(&mut self, forward: bool) {
        let (year, month) = match (forward, self.date.month()) {
            (true, Month::December) => (self.date.year() + 1, Month::January),
            (false, Month::January) => (self.date.year() - 1, Month::December),
            (true, month) => (self.date.year(), month.next()),
            (false, month) => (self.date.year(), month.previous()),
        };
        let day = self
            .date
            .day()
            .min(time::util::days_in_year_month(year, month));
        if let Ok(date) = Date::from_calendar_date(year, month, day) {
            self.date = date;
        }
    }

    /// Display text for a field's current value.
    pub fn display_value(&self, field: FilterField) -> String {
        match field {
            FilterField::Date => format_date(self.date),
            FilterField::Hazard => self.hazard.to_string(),
            _ => self
                .slider(field)
                .map(|s| format!("{:.*}", decimals(s.step), s.value))
                .unwrap_or_default(),
        }
    }
}

/// Formats a date as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<Date> {
    Date::parse(s.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|e| TrackerError::config(format!("Invalid date '{s}': {e}")))
}

/// The assembled filter statement and its positional parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Builds the filter query.
///
/// All user values are bound as parameters in this order: date, AU min/max,
/// LD min/max, velocity min/max, diameter min/max. Only the hazard clause is
/// literal SQL, chosen from a closed set.
pub fn build_filter_query(state: &FilterState) -> FilterQuery {
    let mut sql = String::from(FILTER_SELECT);
    if let Some(clause) = state.hazard.clause() {
        sql.push_str(clause);
    }

    let mut params = Vec::with_capacity(9);
    params.push(Value::String(format_date(state.date)));
    params.extend(state.au.bounds());
    params.extend(state.ld.bounds());
    params.extend(state.velocity.bounds());
    params.extend(state.diameter.bounds());

    FilterQuery { sql, params }
}
