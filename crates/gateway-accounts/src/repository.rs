//! Account store contract.

use async_trait::async_trait;
use gateway_core::{
    Account, AccountId, CancellationToken, GatewayResult, NewAccount, OrderKey, Page,
};

/// Persistence for account records.
///
/// Every operation observes `cancel` and returns
/// [`GatewayError::Cancelled`](gateway_core::GatewayError::Cancelled) once it
/// fires. Errors are surfaced as-is; the store never retries.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Hash the password and insert one account. The returned record has its
    /// sensitive fields redacted. `inviter_id` is recorded, not validated.
    async fn create(
        &self,
        request: &NewAccount,
        inviter_id: AccountId,
        cancel: &CancellationToken,
    ) -> GatewayResult<Account>;

    /// Exact username lookup returning the full record, whatever its status.
    async fn get_by_username(
        &self,
        username: &str,
        cancel: &CancellationToken,
    ) -> GatewayResult<Account>;

    /// Non-deleted accounts sorted descending by `order`, then by id.
    async fn list(
        &self,
        page: Page,
        order: OrderKey,
        cancel: &CancellationToken,
    ) -> GatewayResult<Vec<Account>>;

    /// Accounts whose username, email or display name starts with `keyword`.
    ///
    /// Deleted accounts are included.
    async fn search(&self, keyword: &str, cancel: &CancellationToken)
        -> GatewayResult<Vec<Account>>;

    /// Exact id lookup. Without `include_sensitive` the password hash and
    /// access token are empty.
    async fn get_by_id(
        &self,
        id: AccountId,
        include_sensitive: bool,
        cancel: &CancellationToken,
    ) -> GatewayResult<Account>;
}
