//! Conversions from reqwest errors into transport errors.

use authkit_core::TransportError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the core transport error.
#[derive(Debug)]
pub struct InfraError(pub TransportError);

impl From<InfraError> for TransportError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<TransportError> for InfraError {
    fn from(value: TransportError) -> Self {
        Self(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoTransportError {
    fn into_transport(self) -> TransportError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → TransportError */
/* -------------------------------------------------------------------------- */

impl IntoTransportError for HttpError {
    fn into_transport(self) -> TransportError {
        if self.is_timeout() {
            return TransportError::Timeout(self.to_string());
        }

        if self.is_connect() {
            return TransportError::Connect(self.to_string());
        }

        if self.is_builder() {
            return TransportError::InvalidRequest(self.to_string());
        }

        if self.is_body() || self.is_decode() {
            return TransportError::Body(self.to_string());
        }

        TransportError::Other(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_transport())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
