//! Request execution and error-response mapping

use authkit_domain::{AssuranceLevel, AuthError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::ports::{HttpRequest, HttpResponse, HttpTransport};

/// Error body as sent by the auth API. Every field is optional so unknown
/// shapes still map to something.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    current_level: Option<String>,
    #[serde(default, alias = "target_level")]
    required_level: Option<String>,
}

/// Translate a non-2xx response into the matching [`AuthError`].
///
/// - 401 with `token_expired` becomes `TokenExpired`, any other 401
///   `Unauthorized`
/// - `invalid_grant` / `invalid_client` become `Unauthorized`
/// - 403 with `step_up_required` / `insufficient_assurance` becomes
///   `StepUpRequired`
/// - everything else is a `Server` error carrying status and body
#[must_use]
pub fn map_error_response(response: &HttpResponse) -> AuthError {
    let body: ErrorBody = serde_json::from_str(&response.body).unwrap_or_default();
    let description = body.error_description.or(body.message);
    let error = body.error.unwrap_or_else(|| format!("http_{}", response.status));
    let detail = || description.clone().unwrap_or_else(|| error.clone());

    match (response.status, error.as_str()) {
        (401, "token_expired") => AuthError::TokenExpired,
        (401, _) | (_, "invalid_grant" | "invalid_client") => AuthError::Unauthorized(detail()),
        (403, "step_up_required" | "insufficient_assurance") => AuthError::StepUpRequired {
            current: body.current_level.as_deref().and_then(AssuranceLevel::from_acr),
            required: body.required_level.as_deref().and_then(AssuranceLevel::from_acr),
        },
        (status, _) => AuthError::Server { status: Some(status), error, description },
    }
}

/// Execute `request`, returning the response whatever its status.
///
/// # Errors
/// Returns `AuthError::Network` when no response was received.
pub async fn send<T: HttpTransport + ?Sized>(
    transport: &T,
    request: HttpRequest,
) -> Result<HttpResponse> {
    let method = request.method;
    let url = request.url.clone();
    debug!(%method, %url, "sending auth request");

    match transport.execute(request).await {
        Ok(response) => {
            debug!(%method, %url, status = response.status, "received auth response");
            Ok(response)
        }
        Err(err) => {
            debug!(%method, %url, error = %err, "auth request failed");
            Err(err.into())
        }
    }
}

/// Parse a successful JSON response, or map the error response.
///
/// # Errors
/// Returns the mapped error for non-2xx statuses and
/// `AuthError::InvalidResponse` when the body does not parse.
pub fn expect_json<R: DeserializeOwned>(response: &HttpResponse) -> Result<R> {
    if !response.is_success() {
        return Err(map_error_response(response));
    }
    response.json().map_err(|e| AuthError::InvalidResponse(e.to_string()))
}

/// Accept any 2xx response, ignoring the body.
///
/// # Errors
/// Returns the mapped error for non-2xx statuses.
pub fn expect_success(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        Ok(())
    } else {
        Err(map_error_response(response))
    }
}
