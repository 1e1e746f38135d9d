//! Mocked endpoint handlers and the route table that wires them up

pub mod auth;
pub mod catalog;
pub mod user;

use axum::http::Method;
use pizzamock_common::Result;

use crate::dispatch::RouteTable;
use crate::mock::MockState;

/// Build the full route table for the storefront API
pub fn routes() -> Result<RouteTable<MockState>> {
    let mut table = RouteTable::new();

    // Auth
    table.register(Method::PUT, "/api/auth", "auth.login", auth::login)?;
    table.register(Method::POST, "/api/auth", "auth.register", auth::register)?;
    table.register(Method::DELETE, "/api/auth", "auth.logout", auth::logout)?;

    // Users
    table.register(Method::GET, "/api/user/me", "user.me", user::current_user)?;
    table.register(Method::PUT, "/api/user/*", "user.update", user::update_user)?;
    table.register(Method::GET, "/api/user", "user.list", user::list_users)?;

    // Menu and orders
    table.register(Method::GET, "/api/order/menu", "order.menu", catalog::menu)?;
    table.register(Method::POST, "/api/order", "order.create", catalog::create_order)?;
    table.register(Method::GET, "/api/order", "order.history", catalog::order_history)?;

    // Franchises and stores
    table.register(Method::GET, "/api/franchise", "franchise.list", catalog::list_franchises)?;
    table.register(Method::POST, "/api/franchise", "franchise.create", catalog::create_franchise)?;
    table.register(Method::GET, "/api/franchise/*", "franchise.for_user", catalog::user_franchises)?;
    table.register(Method::POST, "/api/franchise/*/store", "store.create", catalog::create_store)?;
    table.register(
        Method::DELETE,
        "/api/franchise/*/store/*",
        "store.delete",
        catalog::delete_store,
    )?;

    Ok(table)
}
