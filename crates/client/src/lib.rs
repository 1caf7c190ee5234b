//! Balances Client - HTTP access to the Balances REST backend and the store
//! that feeds responses into the core state.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use balances_client::{BalancesClient, BalancesStore, StoreOptions};
//! use balances_core::session::{Credentials, MemorySessionStore};
//!
//! let client = BalancesClient::new("http://localhost:8080/", Duration::from_secs(30))?;
//! let mut store = BalancesStore::new(
//!     Arc::new(client),
//!     Arc::new(MemorySessionStore::new()),
//!     StoreOptions::default(),
//! );
//! store.authenticate(&Credentials::new("jane", "secret")).await?;
//! ```

mod client;
mod error;
mod store;
mod types;

pub use client::{BalancesApi, BalancesClient};
pub use error::{ApiFailure, ClientError, FailureCode, Result};
pub use store::{BalancesStore, StoreOptions};
pub use types::{resource_path, PageResult};
