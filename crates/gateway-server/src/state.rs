//! Application state shared across handlers.

use crate::upstream::UpstreamClient;
use gateway_accounts::AccountStore;
use gateway_config::BillingConfig;
use gateway_core::{CancellationToken, GatewayError, GatewayResult};
use gateway_providers::{ChannelTable, ProviderRegistry};
use std::sync::Arc;

/// Shared application state. Cheap to clone; everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Account store.
    pub accounts: Arc<dyn AccountStore>,
    /// Provider adaptors.
    pub providers: Arc<ProviderRegistry>,
    /// Channel table.
    pub channels: Arc<ChannelTable>,
    /// Upstream HTTP client.
    pub upstream: Arc<dyn UpstreamClient>,
    /// Quota display settings.
    pub billing: BillingConfig,
    /// Cancelled when the server shuts down; streams use child tokens.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Create a new state builder.
    #[must_use]
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::default()
    }
}

/// Builder for [`AppState`].
#[derive(Default)]
pub struct AppStateBuilder {
    accounts: Option<Arc<dyn AccountStore>>,
    providers: Option<ProviderRegistry>,
    channels: Option<ChannelTable>,
    upstream: Option<Arc<dyn UpstreamClient>>,
    billing: Option<BillingConfig>,
    shutdown: Option<CancellationToken>,
}

impl AppStateBuilder {
    /// Set the account store.
    #[must_use]
    pub fn accounts(mut self, accounts: Arc<dyn AccountStore>) -> Self {
        self.accounts = Some(accounts);
        self
    }

    /// Set the provider registry. Defaults to the built-in adaptors.
    #[must_use]
    pub fn providers(mut self, providers: ProviderRegistry) -> Self {
        self.providers = Some(providers);
        self
    }

    /// Set the channel table. Defaults to an empty table.
    #[must_use]
    pub fn channels(mut self, channels: ChannelTable) -> Self {
        self.channels = Some(channels);
        self
    }

    /// Set the upstream client.
    #[must_use]
    pub fn upstream(mut self, upstream: Arc<dyn UpstreamClient>) -> Self {
        self.upstream = Some(upstream);
        self
    }

    /// Set billing display settings.
    #[must_use]
    pub fn billing(mut self, billing: BillingConfig) -> Self {
        self.billing = Some(billing);
        self
    }

    /// Use an existing shutdown token.
    #[must_use]
    pub fn shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    /// Build the state. The account store and upstream client are required.
    pub fn build(self) -> GatewayResult<AppState> {
        let accounts = self
            .accounts
            .ok_or_else(|| GatewayError::configuration("account store is required"))?;
        let upstream = self
            .upstream
            .ok_or_else(|| GatewayError::configuration("upstream client is required"))?;

        Ok(AppState {
            accounts,
            providers: Arc::new(self.providers.unwrap_or_else(ProviderRegistry::builtin)),
            channels: Arc::new(self.channels.unwrap_or_default()),
            upstream,
            billing: self.billing.unwrap_or_default(),
            shutdown: self.shutdown.unwrap_or_default(),
        })
    }
}
