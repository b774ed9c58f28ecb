use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ParamsError;

/// Build a parameter record from request keyword inputs, with JSON-path context on failure.
pub fn from_kwargs<T: DeserializeOwned>(kwargs: &Map<String, Value>) -> Result<T, ParamsError> {
    from_value_with_path(Value::Object(kwargs.clone()))
}

pub fn from_value_with_path<T: DeserializeOwned>(value: Value) -> Result<T, ParamsError> {
    match serde_path_to_error::deserialize::<_, T>(value) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(ParamsError { path, source: err.into_inner() })
        }
    }
}
