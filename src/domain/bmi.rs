//! BMI classification
//!
//! Pure computation: `weight / height²` mapped onto ordered, half-open bands.

use std::fmt;

use thiserror::Error;

/// Lower bound (inclusive) of the healthy band
const HEALTHY_FROM: f64 = 18.5;
/// Lower bound (inclusive) of the overweight band
const OVERWEIGHT_FROM: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum BmiError {
    #[error("invalid input: {field} must be {requirement} (got {value})")]
    InvalidInput {
        field: &'static str,
        requirement: &'static str,
        value: f64,
    },
}

impl BmiError {
    const fn invalid(field: &'static str, requirement: &'static str, value: f64) -> Self {
        Self::InvalidInput {
            field,
            requirement,
            value,
        }
    }
}

/// Weight-status band, ordered from lowest to highest BMI
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Underweight,
    HealthyWeight,
    Overweight,
}

impl Category {
    /// Band for a raw (unrounded) BMI value
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < HEALTHY_FROM {
            Self::Underweight
        } else if bmi < OVERWEIGHT_FROM {
            Self::HealthyWeight
        } else {
            Self::Overweight
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Underweight => "Underweight",
            Self::HealthyWeight => "Healthy weight",
            Self::Overweight => "Overweight",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Height in meters (finite, above zero) and weight in kilograms (finite)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    height_m: f64,
    weight_kg: f64,
}

impl Measurement {
    pub fn new(height_m: f64, weight_kg: f64) -> Result<Self, BmiError> {
        if !height_m.is_finite() || height_m <= 0.0 {
            return Err(BmiError::invalid(
                "height",
                "a finite number above zero",
                height_m,
            ));
        }
        if !weight_kg.is_finite() {
            return Err(BmiError::invalid("weight", "a finite number", weight_kg));
        }
        Ok(Self {
            height_m,
            weight_kg,
        })
    }

    pub fn bmi(&self) -> f64 {
        self.weight_kg / (self.height_m * self.height_m)
    }

    pub fn classify(&self) -> Reading {
        let bmi = self.bmi();
        Reading {
            bmi,
            category: Category::from_bmi(bmi),
        }
    }
}

/// Result of a classification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Unrounded BMI in kg/m²
    pub bmi: f64,
    pub category: Category,
}

impl Reading {
    /// BMI rounded to two decimal places
    pub fn rounded(&self) -> f64 {
        (self.bmi * 100.0).round() / 100.0
    }
}

/// Compute and classify a BMI.
///
/// The band is chosen from the unrounded value, so `18.4999` stays
/// underweight even though it displays as `18.50`.
pub fn classify(height_m: f64, weight_kg: f64) -> Result<Reading, BmiError> {
    Measurement::new(height_m, weight_kg).map(|m| m.classify())
}
