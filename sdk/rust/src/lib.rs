//! Client for the shop console API.
//!
//! ```no_run
//! # async fn run() -> Result<(), shop_console_sdk::ClientError> {
//! use shop_console_sdk::{ConsoleClient, LoginInput};
//!
//! let client = ConsoleClient::new("http://localhost:3000")?;
//! client
//!     .login(&LoginInput {
//!         email: "owner@example.com".into(),
//!         password: "secret".into(),
//!     })
//!     .await?;
//! let menu = client.menu_categories().await?;
//! println!("{} categories", menu.count);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod types;

pub use client::ConsoleClient;
pub use error::ClientError;
pub use types::*;
