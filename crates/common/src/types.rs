//! Core types for PizzaMock
//!
//! Field names on the wire follow what the storefront UI reads, which is why
//! several structs rename to camelCase.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Role a user holds in the storefront
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Diner,
    Admin,
    Franchisee,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Diner => write!(f, "diner"),
            Role::Admin => write!(f, "admin"),
            Role::Franchisee => write!(f, "franchisee"),
        }
    }
}

/// One entry of a user's `roles` array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub role: Role,
}

/// A user record as stored in the directory and returned to the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub roles: Vec<RoleAssignment>,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            password: password.into(),
            roles: vec![RoleAssignment { role }],
        }
    }
}

/// An identifier the UI may send either as a JSON string or a number
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LooseId {
    Number(u64),
    Text(String),
}

impl LooseId {
    /// Accepts a string, an unsigned integer or an integral float such as `3.0`
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(LooseId::Text(s.clone())),
            Value::Number(n) => n
                .as_u64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
                        .map(|f| f as u64)
                })
                .map(LooseId::Number),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for LooseId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value)
            .ok_or_else(|| de::Error::custom(format!("not a usable id: {}", value)))
    }
}

impl std::fmt::Display for LooseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LooseId::Number(n) => write!(f, "{}", n),
            LooseId::Text(s) => write!(f, "{}", s.trim()),
        }
    }
}

/// Partial profile update. Absent or empty fields leave the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default)]
    pub id: Option<LooseId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl UserPatch {
    /// Decode field by field. A mistyped field is dropped on its own and
    /// never takes the other supplied fields with it.
    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            id: value.get("id").and_then(LooseId::from_value),
            name: text("name"),
            email: text("email"),
            password: text("password"),
        }
    }

    /// Apply the supplied fields to `user`, returning whether anything changed
    pub fn apply(&self, user: &mut User) -> bool {
        let mut changed = false;
        for (value, slot) in [
            (&self.name, &mut user.name),
            (&self.email, &mut user.email),
            (&self.password, &mut user.password),
        ] {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                if slot.as_str() != v {
                    *slot = v.to_string();
                    changed = true;
                }
            }
        }
        changed
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// A pizza on the menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: u64,
    pub title: String,
    pub image: String,
    pub price: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Franchise {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub stores: Vec<Store>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: u64,
    pub menu_id: u64,
    pub description: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: u64,
    pub franchise_id: u64,
    pub store_id: u64,
    pub date: String,
    pub items: Vec<OrderItem>,
}

// ============================================================================
// Request / response bodies
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserList {
    pub users: Vec<User>,
    pub more: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FranchiseList {
    pub franchises: Vec<Franchise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHistory {
    pub diner_id: u64,
    pub orders: Vec<Order>,
    pub page: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn diner() -> User {
        User::new("2", "Di Ner", "d@jwt.com", "d", Role::Diner)
    }

    #[test]
    fn test_user_wire_shape() {
        let v = serde_json::to_value(diner()).unwrap();
        assert_eq!(
            v,
            json!({
                "id": "2",
                "name": "Di Ner",
                "email": "d@jwt.com",
                "password": "d",
                "roles": [{"role": "diner"}]
            })
        );
    }

    #[test]
    fn test_patch_only_touches_supplied_fields() {
        let mut user = diner();
        let patch = UserPatch {
            name: Some("Di Nerx".to_string()),
            ..Default::default()
        };
        assert!(patch.apply(&mut user));
        assert_eq!(user.name, "Di Nerx");
        assert_eq!(user.email, "d@jwt.com");
        assert_eq!(user.password, "d");
    }

    #[test]
    fn test_patch_ignores_empty_strings() {
        let mut user = diner();
        let patch: UserPatch =
            serde_json::from_value(json!({"id": 2, "name": "", "email": "", "password": ""}))
                .unwrap();
        assert!(!patch.apply(&mut user));
        assert_eq!(user, diner());
    }

    #[test]
    fn test_loose_id_accepts_number_and_string() {
        let a: UserPatch = serde_json::from_value(json!({"id": 100})).unwrap();
        let b: UserPatch = serde_json::from_value(json!({"id": "100"})).unwrap();
        assert_eq!(a.id.unwrap().to_string(), "100");
        assert_eq!(b.id.unwrap().to_string(), "100");
    }

    #[test]
    fn test_loose_id_accepts_integral_float() {
        let patch: UserPatch = serde_json::from_value(json!({"id": 3.0})).unwrap();
        assert_eq!(patch.id.unwrap().to_string(), "3");
        assert!(serde_json::from_value::<UserPatch>(json!({"id": 3.5})).is_err());
    }

    #[test]
    fn test_patch_from_value_keeps_good_fields() {
        let patch = UserPatch::from_value(&json!({"id": 3.0, "name": "Renamed", "email": 7}));
        assert_eq!(patch.id, Some(LooseId::Number(3)));
        assert_eq!(patch.name.as_deref(), Some("Renamed"));
        assert_eq!(patch.email, None);

        let patch = UserPatch::from_value(&json!({"id": [1], "name": "Renamed"}));
        assert_eq!(patch.id, None);
        assert_eq!(patch.name.as_deref(), Some("Renamed"));
    }

    #[test]
    fn test_order_history_is_camel_case() {
        let history = OrderHistory {
            diner_id: 3,
            orders: vec![],
            page: 1,
        };
        let v = serde_json::to_value(history).unwrap();
        assert_eq!(v, json!({"dinerId": 3, "orders": [], "page": 1}));
    }

    #[test]
    fn test_login_request_tolerates_missing_fields() {
        let req: LoginRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.email.is_empty());
        assert!(req.password.is_empty());
    }
}
