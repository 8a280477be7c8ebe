//! Extraction module - turn a capability response into a feature map.
//!
//! A response is one of three shapes:
//! - the `N/A` sentinel: nothing usable, an empty map
//! - an address object (non-blank `street`): resolved through the property lookup
//! - a feature object: values normalized to numbers and validated
//!
//! Responses are parsed as JSON objects. Prose around the object is cut away
//! and single-quoted objects get one retry with double quotes; anything that
//! still fails, or holds values that are not strings, numbers or null, is
//! rejected rather than guessed at.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::error::{ProphecyError, Result};
use crate::pipeline::prompts::NO_DATA_SENTINEL;
use crate::traits::{extractor::ExtractionCapability, lookup::PropertyLookup};
use crate::types::{
    features::{AddressQuery, Feature, FeatureMap, ZipCode, ZIP_CODE_KEY},
    geography::GeographyKey,
};

lazy_static! {
    static ref NUMERIC_RUN: Regex = Regex::new(r"\d+(\.\d+)?").unwrap();
}

/// Address components exactly as the capability stated them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress {
    pub street: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

/// Classified capability response.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResponse {
    NoData,
    Address(ParsedAddress),
    Features(FeatureMap),
}

/// Extract a feature map from a free-text description.
///
/// Address-shaped responses are looked up with the street and zip the text
/// gave and the city/state of the selected geography.
#[instrument(skip(description, capability, lookup), fields(geography = %geography))]
pub async fn extract<E, L>(
    description: &str,
    capability: &E,
    lookup: &L,
    geography: &GeographyKey,
) -> Result<FeatureMap>
where
    E: ExtractionCapability + ?Sized,
    L: PropertyLookup + ?Sized,
{
    let vocabulary = Feature::vocabulary();
    let response = capability
        .extract_structured(description, &vocabulary)
        .await?;
    debug!(response = %response, "Extraction capability responded");

    match parse_extraction_response(&response)? {
        ExtractionResponse::NoData => {
            info!("No recognizable features in description");
            Ok(FeatureMap::new())
        }
        ExtractionResponse::Address(address) => {
            let query = AddressQuery {
                street: address.street,
                city: geography.city.clone(),
                state: geography.state.clone(),
                zip: address.zip,
            };
            info!(address = %query.full_address(), "Description is an address, looking up property");
            lookup.lookup(&query).await
        }
        ExtractionResponse::Features(features) => {
            info!(
                features = features.numeric().count(),
                zip_code = ?features.zip_code(),
                "Extracted features from description"
            );
            Ok(features)
        }
    }
}

/// Classify and validate a raw capability response.
pub fn parse_extraction_response(response: &str) -> Result<ExtractionResponse> {
    if is_no_data(response) {
        return Ok(ExtractionResponse::NoData);
    }

    let mut object = parse_object(response)?;

    if has_street(&object) {
        return parse_address(&object, response).map(ExtractionResponse::Address);
    }
    if is_blank(object.get("street")) {
        object.remove("street");
        debug!("Blank street in extraction response, reading it as features");
    }

    parse_features(&object, response).map(ExtractionResponse::Features)
}

/// First numeric run (integer or decimal) in a string.
pub fn first_number(text: &str) -> Option<f64> {
    NUMERIC_RUN
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

fn is_no_data(response: &str) -> bool {
    response
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`')
        .trim()
        .eq_ignore_ascii_case(NO_DATA_SENTINEL)
}

fn parse_object(response: &str) -> Result<Map<String, Value>> {
    let trimmed = response.trim();
    let candidate = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => value,
        Err(_) => {
            let span = object_span(trimmed)
                .ok_or_else(|| ProphecyError::parse("no object found", response))?;
            match serde_json::from_str::<Value>(span) {
                Ok(value) => value,
                Err(_) => serde_json::from_str::<Value>(&span.replace('\'', "\"")).map_err(|e| {
                    ProphecyError::parse(format!("invalid object: {}", e), response)
                })?,
            }
        }
    };

    match candidate {
        Value::Object(map) => Ok(map),
        other => Err(ProphecyError::parse(
            format!("expected an object, found {}", json_kind(&other)),
            response,
        )),
    }
}

/// Address-shaped only when the street carries a value.
fn has_street(object: &Map<String, Value>) -> bool {
    match object.get("street") {
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Number(_)) => true,
        _ => false,
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

/// Substring from the first `{` to the last `}`.
fn object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn parse_address(object: &Map<String, Value>, response: &str) -> Result<ParsedAddress> {
    let component = |key: &str| -> Result<Option<String>> {
        match object.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(ProphecyError::parse(
                format!("address component '{}' is {}", key, json_kind(other)),
                response,
            )),
        }
    };

    let street = component("street")?
        .ok_or_else(|| ProphecyError::parse("address has an empty street", response))?;

    Ok(ParsedAddress {
        street,
        city: component("city")?,
        state: component("state")?,
        zip: component("zip")?,
    })
}

fn parse_features(object: &Map<String, Value>, response: &str) -> Result<FeatureMap> {
    let mut features = FeatureMap::new();

    for (key, value) in object {
        let number = match value {
            Value::String(s) => first_number(s),
            Value::Number(n) => n.as_f64(),
            Value::Null => None,
            other => {
                return Err(ProphecyError::parse(
                    format!("value of '{}' is {}", key, json_kind(other)),
                    response,
                ))
            }
        };

        if let Some(feature) = Feature::from_name(key) {
            features.set(feature, number);
        } else if key == ZIP_CODE_KEY {
            match number {
                Some(n) => {
                    let zip = ZipCode::from_f64(n).ok_or_else(|| {
                        ProphecyError::parse(format!("'{}' is not a valid zip code", n), response)
                    })?;
                    features.set_zip_code(Some(zip));
                }
                None => warn!("Zip code present without a number, ignoring"),
            }
        } else {
            debug!(key = %key, "Keeping unrecognized extraction key");
            features.set_extra(key.clone(), number);
        }
    }

    Ok(features)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
