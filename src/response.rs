use log::warn;
use serde_json::Value;

use crate::fault::SchemaFault;

/// A status API response that passed shape validation.
#[derive(Debug, PartialEq)]
pub(crate) struct ValidatedResponse {
    pub(crate) homeworks: Vec<Value>,
    /// Next watermark, if the API supplied one.
    pub(crate) current_date: Option<i64>,
}

/// Checks the response shape in order: mapping, `homeworks` list, then
/// `current_date`. A missing `current_date` is tolerated, a non-integer one
/// is not.
pub(crate) fn validate(raw: Value) -> Result<ValidatedResponse, SchemaFault> {
    let Value::Object(mut map) = raw else {
        return Err(SchemaFault::NotAMapping);
    };

    let homeworks = match map.remove("homeworks") {
        None => return Err(SchemaFault::MissingHomeworks),
        Some(Value::Array(homeworks)) => homeworks,
        Some(_) => return Err(SchemaFault::InvalidHomeworks),
    };

    let current_date = match map.get("current_date") {
        None => {
            warn!("Response has no current_date, keeping the previous watermark");
            None
        }
        Some(value) => Some(value.as_i64().ok_or(SchemaFault::InvalidCurrentDate)?),
    };

    Ok(ValidatedResponse {
        homeworks,
        current_date,
    })
}
