use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A medium-voltage network. The owning substation is carried as a scalar id,
/// so serializing a network never recurses back into its substation.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Network {
    pub id: i32,
    pub substation_id: i32,
    pub code: String,
    pub name: Option<String>,
    pub nominal_voltage: Option<Decimal>,
}

/// Fields to persist for a network create or full-replace update.
#[derive(Debug, Clone)]
pub struct NetworkDraft {
    pub substation_id: i32,
    pub code: String,
    pub name: Option<String>,
    pub nominal_voltage: Option<Decimal>,
}

/// Inbound network body. `substation_id` is optional at the marshaling level;
/// the network manager decides whether its absence is an error.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkPayload {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nominal_voltage: Option<Decimal>,
    #[serde(default)]
    pub substation_id: Option<i32>,
}

impl NetworkPayload {
    pub fn validate(&self) -> Result<(), String> {
        if self.code.trim().is_empty() {
            return Err("Network code is required".to_string());
        }
        if self.code.chars().count() > 5 {
            return Err("Network code must be at most 5 characters".to_string());
        }
        if let Some(name) = &self.name {
            if name.chars().count() > 100 {
                return Err("Network name must be at most 100 characters".to_string());
            }
        }
        if let Some(voltage) = self.nominal_voltage {
            if voltage < Decimal::from(1) || voltage > Decimal::from(500) {
                return Err("Nominal voltage must be between 1.0 and 500.0".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn payload() -> NetworkPayload {
        NetworkPayload {
            code: "MT001".to_string(),
            name: Some("Feeder 1".to_string()),
            nominal_voltage: Some(Decimal::from_str("13.8").unwrap()),
            substation_id: Some(1),
        }
    }

    #[test]
    fn accepts_valid_payload() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn rejects_blank_and_long_codes() {
        let mut p = payload();
        p.code = "".to_string();
        assert!(p.validate().is_err());

        let mut p = payload();
        p.code = "MT0001".to_string();
        assert!(p.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_voltage() {
        let mut p = payload();
        p.nominal_voltage = Some(Decimal::from_str("0.5").unwrap());
        assert!(p.validate().is_err());

        let mut p = payload();
        p.nominal_voltage = Some(Decimal::from(501));
        assert!(p.validate().is_err());
    }

    #[test]
    fn voltage_bounds_are_inclusive() {
        let mut p = payload();
        p.nominal_voltage = Some(Decimal::from(1));
        assert!(p.validate().is_ok());
        p.nominal_voltage = Some(Decimal::from(500));
        assert!(p.validate().is_ok());
    }
}
