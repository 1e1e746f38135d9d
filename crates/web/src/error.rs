//! Failures a mocked endpoint can answer with

use axum::http::StatusCode;
use pizzamock_common::ErrorBody;
use thiserror::Error;

use crate::dispatch::{MockResponse, Outcome};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MockError {
    /// Unknown email or wrong password
    #[error("Unauthorized")]
    Unauthorized,
}

impl MockError {
    pub fn status(&self) -> StatusCode {
        match self {
            MockError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn to_response(&self) -> MockResponse {
        MockResponse::json(
            self.status(),
            ErrorBody {
                error: self.to_string(),
            },
        )
    }
}

impl From<MockError> for Outcome {
    fn from(e: MockError) -> Self {
        Outcome::Fulfill(e.to_response())
    }
}
