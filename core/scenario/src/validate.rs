//! FILENAME: core/scenario/src/validate.rs
// PURPOSE: Builds a Scenario from an untyped JSON request body.
// CONTEXT: The request body arrives as a serde_json::Value so that field
// errors can name the field, echo the received value, and state the allowed
// domain. Enumeration matching is type-exact: the number 0.8 is a member of
// the furnace efficiency domain, the string "0.8" is not.

use serde_json::Value;
use thiserror::Error;

use crate::scenario::{
    BuildYear, FurnaceEfficiency, HeatPumpUnit, PriceOutlook, Scenario,
    DEFAULT_HEAT_PUMP_INSTALL_ESTIMATE, DEFAULT_HEF_UPGRADE_ESTIMATE,
    DEFAULT_SOLAR_PV_INSTALL_ESTIMATE,
};

// ============================================================================
// VALIDATION ERRORS
// ============================================================================

/// A request that failed schema validation. Always a client fault; surfaced
/// before any engine interaction happens.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: got {received}, allowed: {allowed}")]
    InvalidValue {
        field: &'static str,
        /// The offending value, rendered as JSON (so text stays quoted).
        received: String,
        allowed: &'static str,
    },
}

impl ValidationError {
    /// The field this error is about, when there is one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::NotAnObject => None,
            ValidationError::MissingField { field } => Some(field),
            ValidationError::InvalidValue { field, .. } => Some(field),
        }
    }
}

// Allowed-domain descriptions, echoed back in InvalidValue errors.
const BUILD_YEAR_ALLOWED: &str = "one of \"<1949\", \"1950-1959\", \"1960-1981\", \
     \"1982-1990\", \"1991-1997\", \"1998-2006\", \"2007-2014\", \"2015-present\"";
const SIZE_OF_HOME_ALLOWED: &str = "a whole number greater than zero";
const ESTIMATE_ALLOWED: &str = "a non-negative whole number";
const FURNACE_EFFICIENCY_ALLOWED: &str = "\"unknown\" or one of the numbers 0.8, 0.92, 0.97";
const HEAT_PUMP_ALLOWED: &str = "one of \"Unit 1\" through \"Unit 5\"";
const PRICE_OUTLOOK_ALLOWED: &str = "one of \"High\", \"Current\", \"Low\"";

fn invalid(field: &'static str, received: &Value, allowed: &'static str) -> ValidationError {
    ValidationError::InvalidValue {
        field,
        received: received.to_string(),
        allowed,
    }
}

// ============================================================================
// FIELD PARSERS
// ============================================================================

/// Whole number strictly greater than zero. Floats, strings, and negative
/// numbers all fail; there is no coercion.
fn positive_int(field: &'static str, value: &Value) -> Result<u32, ValidationError> {
    match value.as_u64().and_then(|n| u32::try_from(n).ok()) {
        Some(n) if n > 0 => Ok(n),
        _ => Err(invalid(field, value, SIZE_OF_HOME_ALLOWED)),
    }
}

/// Whole number greater than or equal to zero.
fn non_negative_int(field: &'static str, value: &Value) -> Result<u32, ValidationError> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| invalid(field, value, ESTIMATE_ALLOWED))
}

fn build_year(value: &Value) -> Result<BuildYear, ValidationError> {
    value
        .as_str()
        .and_then(BuildYear::from_label)
        .ok_or_else(|| invalid("buildYear", value, BUILD_YEAR_ALLOWED))
}

fn furnace_efficiency(value: &Value) -> Result<FurnaceEfficiency, ValidationError> {
    match value {
        Value::String(s) if s == FurnaceEfficiency::UNKNOWN_LABEL => {
            Ok(FurnaceEfficiency::Unknown)
        }
        Value::Number(n) => n
            .as_f64()
            .and_then(FurnaceEfficiency::from_number)
            .ok_or_else(|| {
                invalid("existingFurnaceEfficiency", value, FURNACE_EFFICIENCY_ALLOWED)
            }),
        _ => Err(invalid(
            "existingFurnaceEfficiency",
            value,
            FURNACE_EFFICIENCY_ALLOWED,
        )),
    }
}

fn heat_pump(value: &Value) -> Result<HeatPumpUnit, ValidationError> {
    value
        .as_str()
        .and_then(HeatPumpUnit::from_label)
        .ok_or_else(|| invalid("heatPumpSelector", value, HEAT_PUMP_ALLOWED))
}

fn price_outlook(field: &'static str, value: &Value) -> Result<PriceOutlook, ValidationError> {
    value
        .as_str()
        .and_then(PriceOutlook::from_label)
        .ok_or_else(|| invalid(field, value, PRICE_OUTLOOK_ALLOWED))
}

// ============================================================================
// SCHEMA
// ============================================================================

impl Scenario {
    /// Validates a decoded request body into a `Scenario`.
    ///
    /// Construction is all-or-nothing: the first failing field aborts with
    /// its error and no partially valid scenario ever exists. Absent
    /// optional fields take their documented defaults. Keys outside the
    /// schema are ignored on purpose - the schema walks its own field table
    /// and never enumerates the caller's keys.
    pub fn from_json(raw: &Value) -> Result<Scenario, ValidationError> {
        let obj = raw.as_object().ok_or(ValidationError::NotAnObject)?;

        let build_year = match obj.get("buildYear") {
            Some(value) => build_year(value)?,
            None => return Err(ValidationError::MissingField { field: "buildYear" }),
        };
        let size_of_home = match obj.get("sizeOfHome") {
            Some(value) => positive_int("sizeOfHome", value)?,
            None => return Err(ValidationError::MissingField { field: "sizeOfHome" }),
        };
        let furnace_efficiency = match obj.get("existingFurnaceEfficiency") {
            Some(value) => furnace_efficiency(value)?,
            None => FurnaceEfficiency::default(),
        };
        let heat_pump = match obj.get("heatPumpSelector") {
            Some(value) => heat_pump(value)?,
            None => HeatPumpUnit::default(),
        };
        let hef_upgrade_estimate = match obj.get("HEFUpgradeEstimate") {
            Some(value) => non_negative_int("HEFUpgradeEstimate", value)?,
            None => DEFAULT_HEF_UPGRADE_ESTIMATE,
        };
        let heat_pump_install_estimate = match obj.get("heatPumpHEFInstallEstimate") {
            Some(value) => non_negative_int("heatPumpHEFInstallEstimate", value)?,
            None => DEFAULT_HEAT_PUMP_INSTALL_ESTIMATE,
        };
        let solar_pv_install_estimate = match obj.get("solarPVInstallEstimate") {
            Some(value) => non_negative_int("solarPVInstallEstimate", value)?,
            None => DEFAULT_SOLAR_PV_INSTALL_ESTIMATE,
        };
        let natural_gas_cost = match obj.get("costOfNaturalGas") {
            Some(value) => price_outlook("costOfNaturalGas", value)?,
            None => PriceOutlook::default(),
        };
        let electricity_cost = match obj.get("costOfElectricity") {
            Some(value) => price_outlook("costOfElectricity", value)?,
            None => PriceOutlook::default(),
        };

        Ok(Scenario {
            build_year,
            size_of_home,
            furnace_efficiency,
            heat_pump,
            hef_upgrade_estimate,
            heat_pump_install_estimate,
            solar_pv_install_estimate,
            natural_gas_cost,
            electricity_cost,
        })
    }
}
