//! One self-contained mock backend instance

use pizzamock_common::fixtures::AUTH_TOKEN;
use pizzamock_common::{Catalog, Fixture, FixtureKind, Result, User};
use tracing::info;

use crate::directory::Directory;
use crate::dispatch::{Dispatch, MockRequest, RouteTable};
use crate::handlers;
use crate::session::Session;

/// Everything a handler may read or change
#[derive(Debug, Clone)]
pub struct MockState {
    pub directory: Directory,
    pub session: Session,
    pub catalog: Catalog,
    pub auth_token: String,
}

impl MockState {
    pub fn seeded(fixture: &Fixture, auth_token: impl Into<String>) -> Self {
        Self {
            directory: Directory::from_fixture(fixture),
            session: Session::new(),
            catalog: fixture.catalog.clone(),
            auth_token: auth_token.into(),
        }
    }
}

/// Route table plus the state it mutates. Instances share nothing, so any
/// number of them can live in one process.
pub struct MockApi {
    routes: RouteTable<MockState>,
    fixture: Fixture,
    state: MockState,
}

impl MockApi {
    pub fn new(kind: FixtureKind) -> Result<Self> {
        Self::with_token(kind, AUTH_TOKEN)
    }

    pub fn with_token(kind: FixtureKind, auth_token: impl Into<String>) -> Result<Self> {
        let fixture = Fixture::load(kind);
        let state = MockState::seeded(&fixture, auth_token);
        Ok(Self {
            routes: handlers::routes()?,
            fixture,
            state,
        })
    }

    pub fn handle(&mut self, request: &MockRequest) -> Dispatch {
        self.routes.dispatch(&mut self.state, request)
    }

    /// Drop all changes and start over from the fixture seed
    pub fn reset(&mut self) {
        let token = std::mem::take(&mut self.state.auth_token);
        self.state = MockState::seeded(&self.fixture, token);
        info!("mock state reset to {} fixture", self.fixture.kind);
    }

    /// Switch to another seed and reset onto it
    pub fn reset_to(&mut self, kind: FixtureKind) {
        if kind != self.fixture.kind {
            self.fixture = Fixture::load(kind);
        }
        self.reset();
    }

    pub fn fixture_kind(&self) -> FixtureKind {
        self.fixture.kind
    }

    pub fn routes(&self) -> &RouteTable<MockState> {
        &self.routes
    }

    pub fn state(&self) -> &MockState {
        &self.state
    }

    pub fn current_user(&self) -> Option<&User> {
        self.state.session.current_user(&self.state.directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    fn call(api: &mut MockApi, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = MockRequest::new(method, path);
        if let Some(body) = body {
            req = req.with_body(body);
        }
        match api.handle(&req) {
            Dispatch::Fulfilled { response, .. } => (response.status, response.body),
            Dispatch::Passthrough => panic!("{} was not mocked", path),
        }
    }

    #[test]
    fn test_login_then_logout() {
        let mut api = MockApi::new(FixtureKind::Storefront).unwrap();
        let (status, body) = call(
            &mut api,
            Method::PUT,
            "/api/auth",
            Some(json!({"email": "d@jwt.com", "password": "a"})),
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["name"], "Kai Chen");
        assert_eq!(body["token"], "abcdef");
        assert_eq!(api.current_user().unwrap().name, "Kai Chen");

        let (_, body) = call(&mut api, Method::DELETE, "/api/auth", None);
        assert_eq!(body["message"], handlers::auth::LOGOUT_MESSAGE);
        assert!(api.current_user().is_none());

        let (status, body) = call(&mut api, Method::GET, "/api/user/me", None);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);
    }

    #[test]
    fn test_wrong_password_leaves_session_unset() {
        let mut api = MockApi::new(FixtureKind::Storefront).unwrap();
        let (status, body) = call(
            &mut api,
            Method::PUT,
            "/api/auth",
            Some(json!({"email": "d@jwt.com", "password": "wrongpassword"})),
        );
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": "Unauthorized"}));
        assert!(api.current_user().is_none());
    }

    #[test]
    fn test_every_seed_user_can_log_in() {
        for kind in [FixtureKind::Storefront, FixtureKind::Profiles] {
            let fixture = Fixture::load(kind);
            let mut api = MockApi::new(kind).unwrap();
            for user in &fixture.users {
                let (status, body) = call(
                    &mut api,
                    Method::PUT,
                    "/api/auth",
                    Some(json!({"email": user.email, "password": user.password})),
                );
                assert_eq!(status, StatusCode::OK);
                assert_eq!(body["user"], serde_json::to_value(user).unwrap());
                assert_eq!(api.current_user(), Some(user));
            }
        }
    }

    #[test]
    fn test_register_logs_in_as_diner() {
        let mut api = MockApi::new(FixtureKind::Profiles).unwrap();
        let (_, body) = call(
            &mut api,
            Method::POST,
            "/api/auth",
            Some(json!({"name": "pizza diner", "email": "pd@jwt.com", "password": "diner"})),
        );
        assert_eq!(body["user"]["id"], "100");
        assert_eq!(body["user"]["roles"], json!([{"role": "diner"}]));

        let (_, me) = call(&mut api, Method::GET, "/api/user/me", None);
        assert_eq!(me["name"], "pizza diner");
        assert_eq!(me["email"], "pd@jwt.com");
    }

    #[test]
    fn test_update_name_keeps_credentials() {
        let mut api = MockApi::new(FixtureKind::Profiles).unwrap();
        call(
            &mut api,
            Method::PUT,
            "/api/auth",
            Some(json!({"email": "f@jwt.com", "password": "f"})),
        );
        let (_, body) = call(
            &mut api,
            Method::PUT,
            "/api/user/3",
            Some(json!({"id": 3, "name": "franchisee42"})),
        );
        assert_eq!(body["user"]["name"], "franchisee42");
        assert_eq!(body["user"]["email"], "f@jwt.com");
        assert_eq!(body["token"], "abcdef");
        assert_eq!(api.current_user().unwrap().name, "franchisee42");

        call(&mut api, Method::DELETE, "/api/auth", None);
        let (status, body) = call(
            &mut api,
            Method::PUT,
            "/api/auth",
            Some(json!({"email": "f@jwt.com", "password": "f"})),
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["name"], "franchisee42");
    }

    #[test]
    fn test_update_uses_path_id_when_body_has_none() {
        let mut api = MockApi::new(FixtureKind::Profiles).unwrap();
        let (_, body) = call(
            &mut api,
            Method::PUT,
            "/api/user/1",
            Some(json!({"email": "boss@jwt.com"})),
        );
        assert_eq!(body["user"]["email"], "boss@jwt.com");
        assert_eq!(body["user"]["name"], "Ad Min");
    }

    #[test]
    fn test_update_unknown_user_passes_through() {
        let mut api = MockApi::new(FixtureKind::Profiles).unwrap();
        let req = MockRequest::new(Method::PUT, "/api/user/999").with_body(json!({"name": "x"}));
        assert_eq!(api.handle(&req), Dispatch::Passthrough);
    }

    #[test]
    fn test_list_users_filter() {
        let mut api = MockApi::new(FixtureKind::Profiles).unwrap();
        let (_, body) = call(&mut api, Method::GET, "/api/user?page=0&limit=10&name=*min*", None);
        assert_eq!(body["more"], false);
        let users = body["users"].as_array().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["name"], "Ad Min");
    }

    #[test]
    fn test_create_store_echo() {
        let mut api = MockApi::new(FixtureKind::Storefront).unwrap();
        let (_, body) = call(
            &mut api,
            Method::POST,
            "/api/franchise/2/store",
            Some(json!({"name": "Center Street"})),
        );
        assert_eq!(
            body,
            json!({"store": {"name": "Center Street", "id": 31}, "jwt": "eyJpYXQ"})
        );
    }

    #[test]
    fn test_menu() {
        let mut api = MockApi::new(FixtureKind::Storefront).unwrap();
        let (_, body) = call(&mut api, Method::GET, "/api/order/menu", None);
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["id"], 1);
        assert_eq!(items[0]["title"], "Veggie");
        assert_eq!(items[0]["price"], 0.0038);
        assert_eq!(items[1]["id"], 2);
        assert_eq!(items[1]["title"], "Pepperoni");
        assert_eq!(items[1]["price"], 0.0042);
    }

    #[test]
    fn test_creations_do_not_change_reads() {
        let mut api = MockApi::new(FixtureKind::Storefront).unwrap();
        let (_, before) = call(&mut api, Method::GET, "/api/franchise", None);
        let (_, created) = call(
            &mut api,
            Method::POST,
            "/api/franchise",
            Some(json!({"name": "Papa Tom", "admins": [{"email": "a@jwt.com"}]})),
        );
        assert_eq!(created["order"]["id"], 35);
        assert_eq!(created["order"]["name"], "Papa Tom");
        let (_, after) = call(&mut api, Method::GET, "/api/franchise", None);
        assert_eq!(before, after);
    }

    #[test]
    fn test_reset_restores_seed_and_keeps_token() {
        let mut api = MockApi::with_token(FixtureKind::Profiles, "tok").unwrap();
        call(
            &mut api,
            Method::POST,
            "/api/auth",
            Some(json!({"name": "n", "email": "n@jwt.com", "password": "p"})),
        );
        assert_eq!(api.state().directory.len(), 4);

        api.reset();
        assert_eq!(api.state().directory.len(), 3);
        assert!(api.current_user().is_none());
        assert_eq!(api.state().auth_token, "tok");
        assert_eq!(api.fixture_kind(), FixtureKind::Profiles);
    }

    #[test]
    fn test_reset_to_other_fixture() {
        let mut api = MockApi::new(FixtureKind::Storefront).unwrap();
        api.reset_to(FixtureKind::Profiles);
        let (status, body) = call(
            &mut api,
            Method::PUT,
            "/api/auth",
            Some(json!({"email": "d@jwt.com", "password": "d"})),
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["name"], "Di Ner");
    }

    #[test]
    fn test_instances_are_isolated() {
        let mut a = MockApi::new(FixtureKind::Storefront).unwrap();
        let b = MockApi::new(FixtureKind::Storefront).unwrap();
        call(
            &mut a,
            Method::PUT,
            "/api/auth",
            Some(json!({"email": "a@jwt.com", "password": "z"})),
        );
        assert!(a.current_user().is_some());
        assert!(b.current_user().is_none());
    }
}
