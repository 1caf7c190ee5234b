use std::sync::Arc;

use balances_client::{BalancesClient, BalancesStore, StoreOptions};
use balances_core::session::{CookieNames, FileSessionStore, SessionStore};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

/// Installs the global subscriber. `log` records from the library crates
/// are forwarded into it.
pub fn init_tracing() {
    let log_format = std::env::var("BALANCES_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

pub fn build_store(config: &Config) -> anyhow::Result<BalancesStore> {
    let client = BalancesClient::new(&config.api_base_url, config.request_timeout)?;
    tracing::debug!("Backend at {}", client.base_url());

    let names = CookieNames {
        token: config.cookie_token.clone(),
        user_data: config.cookie_user_data.clone(),
    };
    let sessions: Arc<dyn SessionStore> =
        Arc::new(FileSessionStore::new(config.session_file.clone(), names));

    let options = StoreOptions {
        default_page_size: config.default_page_size,
        ready_timeout: config.ready_timeout,
        default_locale: config.default_locale.clone(),
    };
    Ok(BalancesStore::new(Arc::new(client), sessions, options))
}
