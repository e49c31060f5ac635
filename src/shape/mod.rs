//! Shape adapters between the dashboard's and the backend's JSON conventions.
//!
//! # Data Flow
//! ```text
//! GET /api/menu:   backend reply → menu.rs (menu_response_for_ui) → caller
//! item writes:     caller body   → menu.rs (item_body_for_backend) → backend
//! multipart:       form field    → menu.rs (sub_categories_field_for_backend) → backend
//! ```

pub mod menu;
pub mod options;
pub mod price;

pub use options::{to_backend, to_ui, BackendGroup, BackendOption, OptionGroup, OptionItem};
pub use price::PriceDelta;
