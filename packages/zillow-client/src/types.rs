use serde::Deserialize;

/// Envelope returned by `/pro/byaddress`.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyResponse {
    #[serde(rename = "propertyDetails")]
    pub property_details: Option<PropertyDetails>,
}

/// The subset of a property record this client exposes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PropertyDetails {
    pub bedrooms: Option<f64>,
    pub bathrooms: Option<f64>,
    #[serde(rename = "livingArea")]
    pub living_area: Option<f64>,
    #[serde(rename = "lotAreaValue")]
    pub lot_area_value: Option<f64>,
    /// e.g. "Square Feet" or "Acres"
    #[serde(rename = "lotAreaUnits")]
    pub lot_area_units: Option<String>,
    pub zestimate: Option<f64>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_property_details() {
        let body = r#"{
            "propertyDetails": {
                "bedrooms": 3,
                "bathrooms": 2.5,
                "livingArea": 1850,
                "lotAreaValue": 8712,
                "lotAreaUnits": "Square Feet",
                "zestimate": 415000,
                "city": "Richmond",
                "state": "VA",
                "zipcode": "23220",
                "homeType": "SINGLE_FAMILY"
            }
        }"#;

        let resp: PropertyResponse = serde_json::from_str(body).unwrap();
        let details = resp.property_details.unwrap();
        assert_eq!(details.bedrooms, Some(3.0));
        assert_eq!(details.bathrooms, Some(2.5));
        assert_eq!(details.living_area, Some(1850.0));
        assert_eq!(details.lot_area_units.as_deref(), Some("Square Feet"));
        assert_eq!(details.zestimate, Some(415_000.0));
    }

    #[test]
    fn test_missing_details() {
        let resp: PropertyResponse = serde_json::from_str(r#"{"message":"not found"}"#).unwrap();
        assert!(resp.property_details.is_none());
    }
}
