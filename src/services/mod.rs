//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and persistence concerns so route
//! handlers can stay focused on request parsing, auth, and status codes.

pub mod account;
pub mod content;
pub mod mailer;
pub mod meal;
pub mod menu_scan;
pub mod session;
pub mod workouts;
