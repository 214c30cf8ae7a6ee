//! Manifest loading and fatal validation.
//!
//! Parse, then validate the whole document before anything downstream sees
//! it. Validation failures carry a pointer into the manifest so authors can
//! find the offending declaration.

use crate::spec::{Contract, Endpoint, FieldKind, FieldSpec, LifecycleRole, ManifestSet};
use crate::ManifestError;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Read a manifest from disk and validate it.
pub fn load_manifest(path: impl AsRef<Path>) -> Result<ManifestSet, ManifestError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path).map_err(|source| ManifestError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    parse_with_origin(&data, &path.display().to_string())
}

/// Parse and validate manifest JSON from a string.
pub fn parse_manifest(data: &str) -> Result<ManifestSet, ManifestError> {
    parse_with_origin(data, "<inline>")
}

fn parse_with_origin(data: &str, origin: &str) -> Result<ManifestSet, ManifestError> {
    let manifest: ManifestSet =
        serde_json::from_str(data).map_err(|source| ManifestError::ParseJson {
            path: origin.to_string(),
            source,
        })?;
    validate(&manifest)?;
    Ok(manifest)
}

fn invalid(path: String, reason: impl Into<String>) -> ManifestError {
    ManifestError::Invalid {
        path,
        reason: reason.into(),
    }
}

/// Check every manifest invariant. Called once at load; rules may assume
/// all of these hold.
pub(crate) fn validate(manifest: &ManifestSet) -> Result<(), ManifestError> {
    if manifest.manifest_version.trim().is_empty() {
        return Err(invalid(
            "manifestVersion".to_string(),
            "manifest version must be set",
        ));
    }
    if manifest.contracts.is_empty() {
        return Err(invalid(
            "contracts".to_string(),
            "at least one contract is required",
        ));
    }

    let mut seen_ids = BTreeSet::new();
    for (ci, contract) in manifest.contracts.iter().enumerate() {
        let cpath = format!("contracts[{ci}]");
        if contract.id.trim().is_empty() {
            return Err(invalid(format!("{cpath}.id"), "contract id must be set"));
        }
        if !seen_ids.insert(contract.id.clone()) {
            return Err(invalid(
                format!("{cpath}.id"),
                format!("duplicate contract id {:?}", contract.id),
            ));
        }
        validate_contract(contract, &cpath)?;
    }
    Ok(())
}

fn validate_contract(contract: &Contract, cpath: &str) -> Result<(), ManifestError> {
    if contract.endpoints.is_empty() {
        return Err(invalid(
            format!("{cpath}.endpoints"),
            "contract declares no endpoints",
        ));
    }

    // Facts are joined on "METHOD path-template"; a duplicate key would
    // silently merge findings from two distinct declarations.
    let mut seen_keys = BTreeSet::new();
    for (ei, endpoint) in contract.endpoints.iter().enumerate() {
        let epath = format!("{cpath}.endpoints[{ei}]");
        validate_endpoint(endpoint, &epath)?;
        if !seen_keys.insert(endpoint.key()) {
            return Err(invalid(
                epath,
                format!("duplicate endpoint {:?} in contract", endpoint.key()),
            ));
        }
    }
    validate_lifecycle_groups(contract, cpath)
}

fn validate_endpoint(endpoint: &Endpoint, epath: &str) -> Result<(), ManifestError> {
    if endpoint.method.trim().is_empty() {
        return Err(invalid(format!("{epath}.method"), "method must be set"));
    }
    if !endpoint.path.starts_with('/') {
        return Err(invalid(
            format!("{epath}.path"),
            format!("path template must start with '/', got {:?}", endpoint.path),
        ));
    }
    if endpoint.status_codes.is_empty() {
        return Err(invalid(
            format!("{epath}.statusCodes"),
            "endpoint declares no status codes",
        ));
    }
    for code in &endpoint.status_codes {
        if !(100..=599).contains(code) {
            return Err(invalid(
                format!("{epath}.statusCodes"),
                format!("status code {code} is outside 100-599"),
            ));
        }
    }

    for (section, fields) in [
        ("request.headers", &endpoint.request.headers),
        ("request.pathParams", &endpoint.request.path_params),
        ("request.queryParams", &endpoint.request.query_params),
        ("request.body", &endpoint.request.body),
        ("response.headers", &endpoint.response.headers),
        ("response.body", &endpoint.response.body),
    ] {
        validate_fields(fields, &format!("{epath}.{section}"))?;
    }

    if let Some(shape) = &endpoint.error_shape {
        if shape.required_fields.is_empty() {
            return Err(invalid(
                format!("{epath}.errorShape.requiredFields"),
                "error shape must name at least one required field",
            ));
        }
    }
    Ok(())
}

fn validate_fields(
    fields: &BTreeMap<String, FieldSpec>,
    section_path: &str,
) -> Result<(), ManifestError> {
    for (name, field) in fields {
        let fpath = format!("{section_path}.{name}");

        match field.kind {
            FieldKind::Enum => {
                if field.values.is_empty() {
                    return Err(invalid(
                        format!("{fpath}.values"),
                        "enum field must declare at least one value",
                    ));
                }
            }
            _ => {
                if !field.values.is_empty() {
                    return Err(invalid(
                        format!("{fpath}.values"),
                        "values are only valid on enum fields",
                    ));
                }
            }
        }

        if let Some(range) = &field.range {
            if field.kind != FieldKind::Integer {
                return Err(invalid(
                    format!("{fpath}.range"),
                    "range is only valid on integer fields",
                ));
            }
            if range.min > range.max {
                return Err(invalid(
                    format!("{fpath}.range"),
                    format!("range.min {} exceeds range.max {}", range.min, range.max),
                ));
            }
        }

        if let Some(length) = &field.length {
            if length.min > length.max {
                return Err(invalid(
                    format!("{fpath}.length"),
                    format!("length.min {} exceeds length.max {}", length.min, length.max),
                ));
            }
        }

        if let Some(format) = &field.format {
            format
                .validate()
                .map_err(|reason| invalid(format!("{fpath}.format"), reason))?;
            // Declared enum values must satisfy their own format.
            for value in &field.values {
                if !format.matches(value) {
                    return Err(invalid(
                        format!("{fpath}.values"),
                        format!("enum value {value:?} does not match format {format}"),
                    ));
                }
            }
        }
    }
    Ok(())
}

fn validate_lifecycle_groups(contract: &Contract, cpath: &str) -> Result<(), ManifestError> {
    let mut groups: BTreeMap<&str, Vec<(usize, &Endpoint)>> = BTreeMap::new();
    for (ei, endpoint) in contract.endpoints.iter().enumerate() {
        if let Some(lifecycle) = &endpoint.lifecycle {
            groups
                .entry(lifecycle.protocol.as_str())
                .or_default()
                .push((ei, endpoint));
        }
    }

    for (protocol, members) in groups {
        let gpath = format!("{cpath}.lifecycle[{protocol}]");
        if members.len() < 2 {
            return Err(invalid(
                gpath,
                "a lifecycle protocol must group at least two endpoints",
            ));
        }

        let mut orders = BTreeSet::new();
        let mut has_terminal = false;
        for (ei, endpoint) in &members {
            let lifecycle = endpoint.lifecycle.as_ref().expect("grouped by lifecycle");
            if !orders.insert(lifecycle.order) {
                return Err(invalid(
                    format!("{cpath}.endpoints[{ei}].lifecycle.order"),
                    format!(
                        "duplicate order {} in protocol {protocol:?}",
                        lifecycle.order
                    ),
                ));
            }
            if lifecycle.role == LifecycleRole::Terminal {
                has_terminal = true;
            }
        }
        if !has_terminal {
            return Err(invalid(
                gpath,
                "a lifecycle protocol must declare a terminal milestone",
            ));
        }
    }
    Ok(())
}
