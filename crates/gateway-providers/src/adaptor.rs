//! The provider adaptor contract.

use gateway_core::{GatewayError, GatewayResult, ProviderKind, RelayMode};

/// Mode-to-endpoint table of one upstream provider.
///
/// Implementations only describe data; URL construction is shared through the
/// provided [`resolve_endpoint`](ProviderAdaptor::resolve_endpoint).
pub trait ProviderAdaptor: Send + Sync {
    /// Registry key of this adaptor.
    fn kind(&self) -> ProviderKind;

    /// Human readable provider name.
    fn name(&self) -> &'static str;

    /// Supported modes and the path suffix each one is served at.
    fn routes(&self) -> &'static [(RelayMode, &'static str)];

    /// Base address used when a channel does not override it.
    fn default_base_url(&self) -> &'static str;

    /// Whether the adaptor has a route for `mode`.
    fn supports(&self, mode: RelayMode) -> bool {
        self.routes().iter().any(|(m, _)| *m == mode)
    }

    /// Build the upstream URL for `mode` under `base_url`.
    ///
    /// Pure and deterministic. A trailing `/` on `base_url` is dropped before
    /// the suffix is appended.
    fn resolve_endpoint(&self, base_url: &str, mode: RelayMode) -> GatewayResult<String> {
        let suffix = self
            .routes()
            .iter()
            .find_map(|(m, suffix)| (*m == mode).then_some(*suffix))
            .ok_or(GatewayError::UnsupportedMode {
                mode,
                provider: self.kind(),
            })?;
        Ok(format!("{}{suffix}", base_url.trim_end_matches('/')))
    }
}
