//! Query-string codec
//!
//! Every record contributes one value to each of the keys `id`, `field`,
//! `condition`, `input`, `badgeId`, `deletable` and `editable`; the n-th value
//! of every key belongs to the n-th record.

use crate::persistence::error::CodecError;
use crate::persistence::record::ConditionRecord;
use crate::types::condition::BadgeId;
use std::collections::HashMap;

pub const QUERY_COMPONENT_ID: &str = "id";
pub const QUERY_FIELD: &str = "field";
pub const QUERY_CONDITION: &str = "condition";
pub const QUERY_INPUT: &str = "input";
pub const QUERY_BADGE_ID: &str = "badgeId";
pub const QUERY_DELETABLE: &str = "deletable";
pub const QUERY_EDITABLE: &str = "editable";

const REQUIRED_KEYS: [&str; 4] = [QUERY_COMPONENT_ID, QUERY_FIELD, QUERY_CONDITION, QUERY_INPUT];

const OPTIONAL_KEYS: [&str; 3] = [QUERY_BADGE_ID, QUERY_DELETABLE, QUERY_EDITABLE];

/// An engine without identifier writes a blank `id`
const BLANK_ALLOWED_KEYS: [&str; 2] = [QUERY_COMPONENT_ID, QUERY_INPUT];

const VALID_PARAMETER_COUNTS: [usize; 3] = [4, 5, 7];

pub fn encode_query(records: &[ConditionRecord]) -> String {
    let mut pairs = Vec::with_capacity(records.len() * 7);

    for record in records {
        pairs.push(pair(QUERY_COMPONENT_ID, &record.component_id));
        pairs.push(pair(QUERY_FIELD, &record.field));
        pairs.push(pair(QUERY_CONDITION, &record.condition));
        pairs.push(pair(QUERY_INPUT, &record.input));
        pairs.push(pair(QUERY_BADGE_ID, record.badge_id.as_str()));
        pairs.push(pair(QUERY_DELETABLE, &record.deletable.to_string()));
        pairs.push(pair(QUERY_EDITABLE, &record.editable.to_string()));
    }

    pairs.join("&")
}

fn pair(key: &str, value: &str) -> String {
    format!("{}={}", key, urlencoding::encode(value))
}

/// Decode a query string. A blank query decodes to no records.
pub fn decode_query(query: &str) -> Result<Vec<ConditionRecord>, CodecError> {
    let query = query.trim().trim_start_matches('?');
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let mut parameters: HashMap<String, Vec<String>> = HashMap::new();
    for part in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = part.split_once('=').unwrap_or((part, ""));
        parameters
            .entry(decode_component(key)?)
            .or_default()
            .push(decode_component(value)?);
    }

    validate_parameters(&parameters)?;

    let count = parameters[QUERY_COMPONENT_ID].len();
    let mut records = Vec::with_capacity(count);

    for i in 0..count {
        records.push(ConditionRecord {
            component_id: parameters[QUERY_COMPONENT_ID][i].clone(),
            field: parameters[QUERY_FIELD][i].clone(),
            condition: parameters[QUERY_CONDITION][i].clone(),
            input: parameters[QUERY_INPUT][i].clone(),
            badge_id: parameters
                .get(QUERY_BADGE_ID)
                .map(|values| BadgeId::from(values[i].as_str()))
                .unwrap_or(BadgeId::NoBadge),
            deletable: parse_flag(&parameters, QUERY_DELETABLE, i, true)?,
            editable: parse_flag(&parameters, QUERY_EDITABLE, i, false)?,
        });
    }

    Ok(records)
}

fn decode_component(raw: &str) -> Result<String, CodecError> {
    Ok(urlencoding::decode(&raw.replace('+', " "))?.into_owned())
}

/// Check key set, value counts and blank values (only `id` and `input` may be blank)
pub fn validate_parameters(parameters: &HashMap<String, Vec<String>>) -> Result<(), CodecError> {
    if let Some(unknown) = parameters
        .keys()
        .find(|key| !REQUIRED_KEYS.contains(&key.as_str()) && !OPTIONAL_KEYS.contains(&key.as_str()))
    {
        return Err(CodecError::UnknownParameter(unknown.clone()));
    }

    if !VALID_PARAMETER_COUNTS.contains(&parameters.len()) {
        return Err(CodecError::InvalidParameterCount(parameters.len()));
    }

    for key in REQUIRED_KEYS {
        match parameters.get(key) {
            Some(values) if !values.is_empty() => {}
            _ => return Err(CodecError::MissingParameter(key)),
        }
    }

    let expected = parameters[QUERY_COMPONENT_ID].len();
    for (key, values) in parameters {
        if values.len() != expected {
            return Err(CodecError::LengthMismatch {
                key: key.clone(),
                expected,
                actual: values.len(),
            });
        }

        if !BLANK_ALLOWED_KEYS.contains(&key.as_str()) && values.iter().any(|v| v.trim().is_empty()) {
            return Err(CodecError::BlankValue(key.clone()));
        }
    }

    Ok(())
}

fn parse_flag(
    parameters: &HashMap<String, Vec<String>>,
    key: &str,
    index: usize,
    default: bool,
) -> Result<bool, CodecError> {
    let value = match parameters.get(key) {
        Some(values) => &values[index],
        None => return Ok(default),
    };

    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(CodecError::InvalidBoolean {
            key: key.to_string(),
            value: value.clone(),
        }),
    }
}
