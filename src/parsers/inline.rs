//! Flows and boundaries given on the command line.

use crate::error::{InputErrorKind, Result, StrideError};
use crate::model::{DataFlow, TrustBoundary};

fn invalid(value: &str, reason: &str) -> StrideError {
    StrideError::input(
        "command line",
        InputErrorKind::InvalidInline {
            value: value.to_string(),
            reason: reason.to_string(),
        },
    )
}

/// Parse `"source,destination,data type"`.
///
/// The data type is everything after the second comma, so it may itself
/// contain commas.
pub fn parse_flow_arg(value: &str) -> Result<DataFlow> {
    let mut parts = value.splitn(3, ',').map(str::trim);
    let (Some(source), Some(destination), Some(data_type)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid(value, "expected 'source,destination,data type'"));
    };

    for (field, text) in [("source", source), ("destination", destination), ("data type", data_type)] {
        if text.is_empty() {
            return Err(invalid(value, &format!("{field} is empty")));
        }
    }
    Ok(DataFlow::new(source, destination, data_type))
}

/// Parse `"name:description"`.
///
/// The description is everything after the first colon.
pub fn parse_boundary_arg(value: &str) -> Result<TrustBoundary> {
    let Some((name, description)) = value.split_once(':') else {
        return Err(invalid(value, "expected 'name:description'"));
    };
    for (field, text) in [("name", name.trim()), ("description", description.trim())] {
        if text.is_empty() {
            return Err(invalid(value, &format!("boundary {field} is empty")));
        }
    }
    Ok(TrustBoundary::new(name.trim(), description.trim()))
}
