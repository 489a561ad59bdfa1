use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::network::{Network, NetworkPayload};

/// Scalar columns of a substation, as stored. The owned network list is
/// assembled separately from the networks that reference this record.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SubstationRecord {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
}

/// A substation with its owned medium-voltage networks.
#[derive(Debug, Clone, Serialize)]
pub struct Substation {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub networks: Vec<Network>,
}

impl Substation {
    pub fn from_record(record: SubstationRecord, networks: Vec<Network>) -> Self {
        Self {
            id: record.id,
            code: record.code,
            name: record.name,
            latitude: record.latitude,
            longitude: record.longitude,
            networks,
        }
    }
}

/// Scalar fields to persist for a substation create or full-replace update.
#[derive(Debug, Clone)]
pub struct SubstationDraft {
    pub code: String,
    pub name: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
}

/// Inbound substation body with its nested network list.
#[derive(Debug, Clone, Deserialize)]
pub struct SubstationPayload {
    pub code: String,
    pub name: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
    #[serde(default)]
    pub networks: Vec<NetworkPayload>,
}

impl SubstationPayload {
    pub fn validate(&self) -> Result<(), String> {
        if self.code.trim().is_empty() {
            return Err("Substation code is required".to_string());
        }
        if self.code.chars().count() > 3 {
            return Err("Substation code must be at most 3 characters".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("Substation name is required".to_string());
        }
        if self.name.chars().count() > 100 {
            return Err("Substation name must be at most 100 characters".to_string());
        }
        if self.latitude < Decimal::from(-90) || self.latitude > Decimal::from(90) {
            return Err("Latitude must be between -90 and 90".to_string());
        }
        if self.longitude < Decimal::from(-180) || self.longitude > Decimal::from(180) {
            return Err("Longitude must be between -180 and 180".to_string());
        }
        for network in &self.networks {
            network.validate()?;
        }
        Ok(())
    }

    pub fn draft(&self) -> SubstationDraft {
        SubstationDraft {
            code: self.code.clone(),
            name: self.name.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn payload() -> SubstationPayload {
        SubstationPayload {
            code: "SP1".to_string(),
            name: "Pinheiros".to_string(),
            latitude: Decimal::from_str("-23.561684").unwrap(),
            longitude: Decimal::from_str("-46.655981").unwrap(),
            networks: vec![],
        }
    }

    #[test]
    fn accepts_valid_payload() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn rejects_blank_code() {
        let mut p = payload();
        p.code = "  ".to_string();
        assert!(p.validate().is_err());
    }

    #[test]
    fn rejects_long_code() {
        let mut p = payload();
        p.code = "ABCD".to_string();
        assert!(p.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let mut p = payload();
        p.latitude = Decimal::from(91);
        assert!(p.validate().is_err());

        let mut p = payload();
        p.longitude = Decimal::from(-181);
        assert!(p.validate().is_err());
    }

    #[test]
    fn rejects_invalid_nested_network() {
        let mut p = payload();
        p.networks.push(NetworkPayload {
            code: "TOOLONG".to_string(),
            name: None,
            nominal_voltage: None,
            substation_id: None,
        });
        assert!(p.validate().is_err());
    }
}
