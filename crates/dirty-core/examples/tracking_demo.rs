//! Change Tracking Demonstration
//!
//! Walks through the tracker lifecycle on a small user record.
//!
//! Key concepts illustrated:
//! 1. Track, mutate, inspect changes
//! 2. Zero-like equivalence of `None`, `0` and `""`
//! 3. Container fields are invisible to the tracker
//! 4. Re-tracking to re-baseline, forgetting to release
//!
//! Run with `RUST_LOG=dirty_core=debug` to see the operation events.

use std::collections::HashMap;

use dirty_core::logging_facility::{init, Profile};
use dirty_core::{trackable, Tracker};

trackable! {
    #[derive(Debug, Default)]
    struct User {
        id: i64,
        email: Option<String>,
        name: String,
        verified: bool,
        roles: Vec<String>,
        settings: HashMap<String, String>,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init(Profile::Development);
    println!("=== Dirty Tracking Demo ===\n");

    let mut tracker = Tracker::new();
    let mut user = User::default();

    // ===== Part 1: Track and mutate =====
    println!("## Part 1: Track and mutate\n");
    tracker.track(&user);
    println!("tracked fields: {:?}", tracker.tracked_fields(&user));

    user.name = "John Doe".to_string();
    user.verified = true;
    println!("changed: {}", tracker.try_changed(&user)?);
    print!("{}", tracker.try_changes(&user)?);

    // ===== Part 2: Zero-like values =====
    println!("\n## Part 2: Zero-like values\n");
    tracker.track(&user);
    user.email = Some(String::new());
    user.id = 0;
    println!(
        "None -> Some(\"\") and 0 -> 0 changed: {}",
        tracker.try_changed(&user)?
    );

    // ===== Part 3: Containers =====
    println!("\n## Part 3: Containers\n");
    user.roles.push("admin".to_string());
    user.settings.insert("theme".to_string(), "dark".to_string());
    println!("after container edits changed: {}", tracker.try_changed(&user)?);

    // ===== Part 4: Release =====
    println!("\n## Part 4: Release\n");
    tracker.forget(&user);
    match tracker.try_changes(&user) {
        Ok(_) => println!("unexpected: still tracked"),
        Err(err) => println!("after forget: {}", err),
    }

    Ok(())
}
