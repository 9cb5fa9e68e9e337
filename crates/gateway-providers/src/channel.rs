//! Channels: which provider and base address serve a group of accounts.

use crate::registry::ProviderRegistry;
use gateway_config::ChannelConfig;
use gateway_core::{GatewayResult, ProviderKind, RelayMode};
use secrecy::SecretString;
use tracing::{info, warn};

/// A configured channel with its base address resolved.
#[derive(Debug, Clone)]
pub struct Channel {
    /// Unique channel name.
    pub name: String,
    /// Provider serving the channel.
    pub provider: ProviderKind,
    /// Base address: the configured override or the adaptor default.
    pub base_url: String,
    /// Key sent upstream as a bearer token.
    pub api_key: SecretString,
    /// Account group the channel serves.
    pub group: String,
    /// Disabled channels are never selected.
    pub enabled: bool,
}

/// Read-only channel table, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct ChannelTable {
    channels: Vec<Channel>,
}

impl ChannelTable {
    /// Build the table, resolving default base addresses from `registry`.
    ///
    /// Fails with `UnsupportedProvider` if a channel names a provider the
    /// registry does not know.
    pub fn from_config(configs: &[ChannelConfig], registry: &ProviderRegistry) -> GatewayResult<Self> {
        let mut channels = Vec::with_capacity(configs.len());
        for config in configs {
            let adaptor = registry.get(config.provider)?;
            let base_url = config
                .base_url
                .clone()
                .unwrap_or_else(|| adaptor.default_base_url().to_string());
            channels.push(Channel {
                name: config.name.clone(),
                provider: config.provider,
                base_url,
                api_key: config.api_key.clone(),
                group: config.group.clone(),
                enabled: config.enabled,
            });
        }

        if channels.iter().all(|c| !c.enabled) {
            warn!("No enabled channels configured; relay requests will be rejected");
        }
        info!(channels = channels.len(), "Channel table built");
        Ok(Self { channels })
    }

    /// First enabled channel serving `group`.
    #[must_use]
    pub fn for_group(&self, group: &str) -> Option<&Channel> {
        self.channels
            .iter()
            .find(|channel| channel.enabled && channel.group == group)
    }

    /// Upstream URL for `mode` on `channel`.
    pub fn resolve(
        &self,
        registry: &ProviderRegistry,
        channel: &Channel,
        mode: RelayMode,
    ) -> GatewayResult<String> {
        registry.resolve(channel.provider, &channel.base_url, mode)
    }

    /// All channels.
    #[must_use]
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Number of channels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
