use nalgebra::Vector3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid vector '{0}'. Expected three comma-separated numbers (e.g., '0,0,1').")]
    InvalidVector(String),

    #[error("Invalid assignment '{0}'. Expected KEY=VALUE.")]
    InvalidAssignment(String),

    #[error("Invalid value for '{key}': '{value}'.")]
    InvalidValue { key: String, value: String },

    #[error("Component '{component}' cannot be empty in '{input}'.")]
    EmptyComponent {
        component: &'static str,
        input: String,
    },
}

/// Parses `x,y,z` into a vector; surrounding whitespace is ignored.
pub fn parse_vector(input: &str) -> Result<Vector3<f64>, ParseError> {
    let invalid = || ParseError::InvalidVector(input.to_string());
    let components = input
        .split(',')
        .map(|part| part.trim().parse::<f64>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;
    match components.as_slice() {
        [x, y, z] if components.iter().all(|c| c.is_finite()) => Ok(Vector3::new(*x, *y, *z)),
        _ => Err(invalid()),
    }
}

/// Splits a `-S key=value` assignment at the first `=`.
pub fn parse_assignment(input: &str) -> Result<(&str, &str), ParseError> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| ParseError::InvalidAssignment(input.to_string()))?;
    let (key, value) = (key.trim(), value.trim());
    if key.is_empty() {
        return Err(ParseError::EmptyComponent {
            component: "key",
            input: input.to_string(),
        });
    }
    if value.is_empty() {
        return Err(ParseError::EmptyComponent {
            component: "value",
            input: input.to_string(),
        });
    }
    Ok((key, value))
}

/// Parses the value of a `-S` assignment into the type of its target field.
pub fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
