//! Login, registration and logout on `/api/auth`

use pizzamock_common::{AuthResponse, LoginRequest, MessageResponse, RegisterRequest};
use tracing::{debug, info};

use crate::dispatch::{Call, MockResponse, Outcome};
use crate::error::MockError;
use crate::mock::MockState;

pub const LOGOUT_MESSAGE: &str = "logout successful";

/// `PUT /api/auth`
pub fn login(state: &mut MockState, call: &Call<'_>) -> Outcome {
    let req: LoginRequest = call.json();
    let Some(user) = state.directory.authenticate(&req.email, &req.password) else {
        debug!("rejected login for {:?}", req.email);
        return MockError::Unauthorized.into();
    };

    let user = user.clone();
    info!("logged in {} ({})", user.email, user.id);
    state.session.begin(user.id.clone());
    Outcome::Fulfill(MockResponse::ok(AuthResponse {
        user,
        token: state.auth_token.clone(),
    }))
}

/// `POST /api/auth`. The new user is logged in straight away.
pub fn register(state: &mut MockState, call: &Call<'_>) -> Outcome {
    let req: RegisterRequest = call.json();
    let user = state.directory.register(&req.name, &req.email, &req.password);

    info!("registered {} ({})", user.email, user.id);
    state.session.begin(user.id.clone());
    Outcome::Fulfill(MockResponse::ok(AuthResponse {
        user,
        token: state.auth_token.clone(),
    }))
}

/// `DELETE /api/auth`
pub fn logout(state: &mut MockState, _call: &Call<'_>) -> Outcome {
    if let Some(id) = state.session.end() {
        info!("logged out {}", id);
    }
    Outcome::Fulfill(MockResponse::ok(MessageResponse {
        message: LOGOUT_MESSAGE.to_string(),
    }))
}
