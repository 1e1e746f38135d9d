//! Menu, franchise, store and order endpoints
//!
//! These answer from the fixture catalog. Creation echoes the submitted body
//! with a fixed id and never feeds back into later reads.

use pizzamock_common::fixtures::{
    CREATED_FRANCHISE_ID, CREATED_ORDER_ID, CREATED_STORE_ID, SIGNED_JWT,
};
use pizzamock_common::{FranchiseList, MessageResponse};
use serde_json::{json, Value};

use crate::dispatch::{Call, MockResponse, Outcome};
use crate::mock::MockState;

pub const STORE_DELETED_MESSAGE: &str = "store deleted";

/// Copy of the request object with `id` set. Non-object bodies echo as `{id}`.
pub fn echo_with_id(body: Option<&Value>, id: u64) -> Value {
    match body {
        Some(Value::Object(map)) => {
            let mut map = map.clone();
            map.insert("id".to_string(), json!(id));
            Value::Object(map)
        }
        _ => json!({ "id": id }),
    }
}

fn signed_echo(key: &str, call: &Call<'_>, id: u64) -> Outcome {
    let mut body = serde_json::Map::new();
    body.insert(key.to_string(), echo_with_id(call.request.body.as_ref(), id));
    body.insert("jwt".to_string(), json!(SIGNED_JWT));
    Outcome::Fulfill(MockResponse::ok(Value::Object(body)))
}

/// `GET /api/order/menu`
pub fn menu(state: &mut MockState, _call: &Call<'_>) -> Outcome {
    Outcome::Fulfill(MockResponse::ok(&state.catalog.menu))
}

/// `GET /api/franchise`. Paging and name query parameters are ignored.
pub fn list_franchises(state: &mut MockState, _call: &Call<'_>) -> Outcome {
    Outcome::Fulfill(MockResponse::ok(FranchiseList {
        franchises: state.catalog.franchises.clone(),
    }))
}

/// `POST /api/franchise`. The echo sits under `order`, which is the key the
/// storefront has always been served.
pub fn create_franchise(_state: &mut MockState, call: &Call<'_>) -> Outcome {
    signed_echo("order", call, CREATED_FRANCHISE_ID)
}

/// `GET /api/franchise/{userId}`
pub fn user_franchises(state: &mut MockState, _call: &Call<'_>) -> Outcome {
    Outcome::Fulfill(MockResponse::ok(&state.catalog.user_franchises))
}

/// `POST /api/franchise/{id}/store`
pub fn create_store(_state: &mut MockState, call: &Call<'_>) -> Outcome {
    signed_echo("store", call, CREATED_STORE_ID)
}

/// `DELETE /api/franchise/{id}/store/{storeId}`
pub fn delete_store(_state: &mut MockState, _call: &Call<'_>) -> Outcome {
    Outcome::Fulfill(MockResponse::ok(MessageResponse {
        message: STORE_DELETED_MESSAGE.to_string(),
    }))
}

/// `POST /api/order`
pub fn create_order(_state: &mut MockState, call: &Call<'_>) -> Outcome {
    signed_echo("order", call, CREATED_ORDER_ID)
}

/// `GET /api/order`
pub fn order_history(state: &mut MockState, _call: &Call<'_>) -> Outcome {
    Outcome::Fulfill(MockResponse::ok(&state.catalog.order_history))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_merges_object() {
        let body = json!({"name": "Center Street", "id": 0});
        assert_eq!(
            echo_with_id(Some(&body), 31),
            json!({"name": "Center Street", "id": 31})
        );
    }

    #[test]
    fn test_echo_without_object_body() {
        assert_eq!(echo_with_id(None, 23), json!({"id": 23}));
        assert_eq!(echo_with_id(Some(&json!([1, 2])), 23), json!({"id": 23}));
    }
}
