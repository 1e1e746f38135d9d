//! Current user, profile updates and the admin user list

use pizzamock_common::{AuthResponse, UserList, UserPatch};
use tracing::{debug, info};

use crate::dispatch::{Call, MockResponse, Outcome};
use crate::mock::MockState;

/// `GET /api/user/me`. Answers `null` when nobody is logged in.
pub fn current_user(state: &mut MockState, _call: &Call<'_>) -> Outcome {
    Outcome::Fulfill(MockResponse::ok(
        state.session.current_user(&state.directory),
    ))
}

/// `PUT /api/user/{id}`
///
/// The id in the body wins over the path segment. Unknown ids fall through
/// instead of inventing a record.
pub fn update_user(state: &mut MockState, call: &Call<'_>) -> Outcome {
    let patch = call
        .request
        .body
        .as_ref()
        .map(UserPatch::from_value)
        .unwrap_or_default();
    let Some(id) = patch
        .id
        .as_ref()
        .map(ToString::to_string)
        .or_else(|| call.capture(0).map(str::to_string))
    else {
        return Outcome::Fallback;
    };

    let Some(user) = state.directory.update(&id, &patch) else {
        debug!("update for unknown user {}", id);
        return Outcome::Fallback;
    };

    info!("updated user {}", id);
    Outcome::Fulfill(MockResponse::ok(AuthResponse {
        user: user.clone(),
        token: state.auth_token.clone(),
    }))
}

/// `GET /api/user?name=*filter*`
pub fn list_users(state: &mut MockState, call: &Call<'_>) -> Outcome {
    let users = state.directory.list(call.request.query_param("name"));
    Outcome::Fulfill(MockResponse::ok(UserList { users, more: false }))
}
