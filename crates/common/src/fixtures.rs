//! Seed data for mock instances
//!
//! A fixture supplies the initial user directory and the catalog every mock
//! instance answers from. Two seeds exist because the storefront flows and the
//! profile-editing flows were written against different user sets.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;
use crate::types::{Franchise, MenuItem, Order, OrderHistory, OrderItem, Role, Store, User};

/// Opaque token handed out by the auth and user endpoints
pub const AUTH_TOKEN: &str = "abcdef";

/// Placeholder signing token attached to commerce echoes
pub const SIGNED_JWT: &str = "eyJpYXQ";

/// Id assigned to every created franchise
pub const CREATED_FRANCHISE_ID: u64 = 35;

/// Id assigned to every created store
pub const CREATED_STORE_ID: u64 = 31;

/// Id assigned to every created order
pub const CREATED_ORDER_ID: u64 = 23;

/// Which seed a mock instance starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixtureKind {
    /// Ordering, franchise and store flows
    #[default]
    Storefront,
    /// Profile editing and user administration flows
    Profiles,
}

impl std::fmt::Display for FixtureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FixtureKind::Storefront => write!(f, "storefront"),
            FixtureKind::Profiles => write!(f, "profiles"),
        }
    }
}

impl FromStr for FixtureKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "storefront" => Ok(Self::Storefront),
            "profiles" => Ok(Self::Profiles),
            other => Err(Error::InvalidFixture(other.to_string())),
        }
    }
}

/// A complete seed: users plus the id the next registration receives
#[derive(Debug, Clone)]
pub struct Fixture {
    pub kind: FixtureKind,
    pub users: Vec<User>,
    pub next_user_id: u64,
    pub catalog: Catalog,
}

impl Fixture {
    pub fn load(kind: FixtureKind) -> Self {
        match kind {
            FixtureKind::Storefront => Self {
                kind,
                users: vec![
                    User::new("3", "Kai Chen", "d@jwt.com", "a", Role::Diner),
                    User::new("2", "Min Ad", "a@jwt.com", "z", Role::Admin),
                    User::new("4", "Fran Chise", "f@jwt.com", "g", Role::Franchisee),
                ],
                next_user_id: 8,
                catalog: Catalog::standard(),
            },
            FixtureKind::Profiles => Self {
                kind,
                users: vec![
                    User::new("1", "Ad Min", "a@jwt.com", "a", Role::Admin),
                    User::new("2", "Di Ner", "d@jwt.com", "d", Role::Diner),
                    User::new("3", "Fran Chisee", "f@jwt.com", "f", Role::Franchisee),
                ],
                next_user_id: 100,
                catalog: Catalog::standard(),
            },
        }
    }
}

/// Static menu, franchise and order data
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub menu: Vec<MenuItem>,
    pub franchises: Vec<Franchise>,
    pub user_franchises: Vec<Franchise>,
    pub order_history: OrderHistory,
}

impl Catalog {
    pub fn standard() -> Self {
        let store = |id: u64, name: &str| Store {
            id,
            name: name.to_string(),
        };
        let pizza_corp = Franchise {
            id: 3,
            name: "PizzaCorp".to_string(),
            stores: vec![store(7, "Spanish Fork")],
        };

        Self {
            menu: vec![
                MenuItem {
                    id: 1,
                    title: "Veggie".to_string(),
                    image: "pizza1.png".to_string(),
                    price: 0.0038,
                    description: "A garden of delight".to_string(),
                },
                MenuItem {
                    id: 2,
                    title: "Pepperoni".to_string(),
                    image: "pizza2.png".to_string(),
                    price: 0.0042,
                    description: "Spicy treat".to_string(),
                },
            ],
            franchises: vec![
                Franchise {
                    id: 2,
                    name: "LotaPizza".to_string(),
                    stores: vec![
                        store(4, "Lehi"),
                        store(5, "Springville"),
                        store(6, "American Fork"),
                    ],
                },
                pizza_corp.clone(),
                Franchise {
                    id: 4,
                    name: "topSpot".to_string(),
                    stores: vec![],
                },
            ],
            user_franchises: vec![pizza_corp],
            order_history: OrderHistory {
                diner_id: 3,
                orders: vec![
                    Order {
                        id: 1,
                        franchise_id: 2,
                        store_id: 6,
                        date: "2025-10-07T20:24:47.000Z".to_string(),
                        items: vec![OrderItem {
                            id: 1,
                            menu_id: 1,
                            description: "Veggie".to_string(),
                            price: 0.0038,
                        }],
                    },
                    Order {
                        id: 2,
                        franchise_id: 3,
                        store_id: 7,
                        date: "2025-10-07T20:27:25.000Z".to_string(),
                        items: vec![OrderItem {
                            id: 2,
                            menu_id: 2,
                            description: "Pepperoni".to_string(),
                            price: 0.0042,
                        }],
                    },
                ],
                page: 1,
            },
        }
    }
}
