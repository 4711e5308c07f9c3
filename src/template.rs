//! URL builder: substitutes an encoded query into an endpoint template.
//!
//! Templates carry exactly one [`QUERY_MARKER`]; registry validation
//! enforces this at load time, so the builder's marker check is defensive.

use crate::error::DispatchError;

/// Substitution marker every endpoint template must contain.
pub const QUERY_MARKER: &str = "{query}";

/// Percent-encode a query string for use in a URL query component.
///
/// Uses `application/x-www-form-urlencoded` rules (spaces become `+`),
/// matching what the endpoints' own search forms submit.
pub fn encode_query(query: &str) -> String {
    url::form_urlencoded::byte_serialize(query.as_bytes()).collect()
}

/// Build the request URL for one endpoint by replacing the template's
/// query marker with the encoded query.
///
/// # Errors
///
/// Returns [`DispatchError::Template`] if the marker is absent. This
/// should not occur for templates that passed registry validation.
pub fn build_url(template: &str, query: &str) -> Result<String, DispatchError> {
    if !template.contains(QUERY_MARKER) {
        return Err(DispatchError::Template(format!(
            "no {QUERY_MARKER} marker in \"{template}\""
        )));
    }
    Ok(template.replace(QUERY_MARKER, &encode_query(query)))
}
