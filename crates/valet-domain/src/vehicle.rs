//! Vehicle domain types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::UnknownVariant;

/// Body style of a registered vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Car,
    Bike,
    ThreeWheeler,
}

impl VehicleType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Bike => "bike",
            Self::ThreeWheeler => "three_wheeler",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "car" => Ok(Self::Car),
            "bike" => Ok(Self::Bike),
            "three_wheeler" => Ok(Self::ThreeWheeler),
            other => Err(UnknownVariant {
                kind: "vehicle type",
                value: other.to_owned(),
            }),
        }
    }
}
