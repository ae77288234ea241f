use std::collections::{BTreeSet, HashMap};

use dirty_core::trackable;

trackable! {
    /// Record shape used across the integration tests
    #[derive(Debug, Clone, Default)]
    pub struct User {
        pub id: i32,
        pub id_ptr: Option<i32>,
        pub name: String,
        pub name_ptr: Option<String>,
        pub active: bool,
        pub balance: f64,
        pub visits: u32,
        pub slice: Vec<bool>,
        pub set: BTreeSet<String>,
        pub map: HashMap<i32, bool>,
    }
}

/// Create a user with every scalar field set to a non-zero value
#[allow(dead_code)]
pub fn populated_user() -> User {
    User {
        id: 1,
        id_ptr: Some(2),
        name: "Ada".to_string(),
        name_ptr: Some("ada@example.com".to_string()),
        active: true,
        balance: 12.5,
        visits: 3,
        ..Default::default()
    }
}
