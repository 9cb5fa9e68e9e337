//! SQLite-backed account store.

use crate::password::{generate_aff_code, hash_password, PasswordParams};
use crate::repository::AccountStore;
use crate::{pool, schema};
use async_trait::async_trait;
use gateway_config::DatabaseConfig;
use gateway_core::account::{DEFAULT_GROUP, ROLE_COMMON};
use gateway_core::{
    with_cancellation, Account, AccountId, AccountStatus, CancellationToken, GatewayError,
    GatewayResult, NewAccount, OrderKey, Page, Visibility,
};
use secrecy::ExposeSecret;
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info, instrument};

const COLUMNS: &str = r#"id, username, password, display_name, role, status, email, access_token,
    quota, used_quota, request_count, "group", aff_code, inviter_id"#;

/// Stored account row.
#[derive(Debug, FromRow)]
struct AccountRow {
    id: i64,
    username: String,
    password: String,
    display_name: String,
    role: i32,
    status: i64,
    email: String,
    access_token: String,
    quota: i64,
    used_quota: i64,
    request_count: i64,
    group: String,
    aff_code: String,
    inviter_id: i64,
}

impl AccountRow {
    /// The only way a stored row becomes an [`Account`].
    fn into_account(self, visibility: Visibility) -> GatewayResult<Account> {
        let status = AccountStatus::from_code(self.status).ok_or_else(|| {
            GatewayError::storage(format!(
                "account {} has unknown status {}",
                self.id, self.status
            ))
        })?;
        let (password, access_token) = if visibility.exposes_sensitive() {
            (self.password, self.access_token)
        } else {
            (String::new(), String::new())
        };

        Ok(Account {
            id: self.id,
            username: self.username,
            password,
            display_name: self.display_name,
            role: self.role,
            status,
            email: self.email,
            access_token,
            quota: self.quota,
            used_quota: self.used_quota,
            request_count: self.request_count,
            group: self.group,
            aff_code: self.aff_code,
            inviter_id: self.inviter_id,
        })
    }
}

fn into_accounts(rows: Vec<AccountRow>, visibility: Visibility) -> GatewayResult<Vec<Account>> {
    rows.into_iter()
        .map(|row| row.into_account(visibility))
        .collect()
}

/// Map a sqlx error onto the gateway taxonomy.
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> GatewayError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            GatewayError::conflict("username already exists")
        }
        _ => GatewayError::storage(err.to_string()),
    }
}

/// Turn a search keyword into a literal `LIKE` prefix pattern (escape `\`).
fn like_prefix(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 1);
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Account store over a sqlx SQLite pool.
#[derive(Clone)]
pub struct SqlAccountStore {
    pool: SqlitePool,
    params: PasswordParams,
}

impl SqlAccountStore {
    /// Connect to the configured database and apply the schema.
    pub async fn connect(config: &DatabaseConfig) -> GatewayResult<Self> {
        let pool = pool::connect(config).await?;
        schema::apply(&pool).await?;
        info!(url = %config.url, "Account store ready");
        Ok(Self::new(pool, PasswordParams::from_config(config)))
    }

    /// Wrap an existing pool. The schema must already be applied.
    #[must_use]
    pub fn new(pool: SqlitePool, params: PasswordParams) -> Self {
        Self { pool, params }
    }

    /// Underlying pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn insert(&self, request: &NewAccount, inviter_id: AccountId) -> GatewayResult<Account> {
        let params = self.params;
        let plaintext = request.password.clone();
        let hash = tokio::task::spawn_blocking(move || hash_password(plaintext.expose_secret(), params))
            .await
            .map_err(|e| GatewayError::credential(format!("hashing task failed: {e}")))??;

        let display_name = request
            .display_name
            .clone()
            .unwrap_or_else(|| request.username.clone());
        let group = request
            .group
            .clone()
            .unwrap_or_else(|| DEFAULT_GROUP.to_string());

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let id = sqlx::query(
            r#"INSERT INTO accounts
                (username, password, display_name, role, status, email, access_token,
                 quota, "group", aff_code, inviter_id)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&request.username)
        .bind(&hash)
        .bind(&display_name)
        .bind(request.role.unwrap_or(ROLE_COMMON))
        .bind(AccountStatus::Active.code())
        .bind(request.email.as_deref().unwrap_or_default())
        .bind(request.access_token.as_deref().unwrap_or_default())
        .bind(request.quota)
        .bind(&group)
        .bind(generate_aff_code())
        .bind(inviter_id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?
        .last_insert_rowid();

        let query = format!("SELECT {COLUMNS} FROM accounts WHERE id = ?");
        let row: AccountRow = sqlx::query_as(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        info!(account_id = id, inviter_id, "Account created");
        row.into_account(Visibility::Redacted)
    }

    async fn fetch_by_username(&self, username: &str) -> GatewayResult<Account> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE username = ?");
        let row: Option<AccountRow> = sqlx::query_as(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        row.ok_or_else(|| GatewayError::account_not_found(username))?
            .into_account(Visibility::Full)
    }

    async fn fetch_page(&self, page: Page, order: OrderKey) -> GatewayResult<Vec<Account>> {
        let order_by = match order {
            OrderKey::Id => "id DESC".to_string(),
            key => format!("{} DESC, id DESC", key.column()),
        };
        let query = format!(
            "SELECT {COLUMNS} FROM accounts WHERE status != ? ORDER BY {order_by} LIMIT ? OFFSET ?"
        );
        let rows: Vec<AccountRow> = sqlx::query_as(&query)
            .bind(AccountStatus::Deleted.code())
            .bind(i64::from(page.limit))
            .bind(i64::from(page.offset))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        into_accounts(rows, Visibility::Redacted)
    }

    async fn fetch_matching(&self, keyword: &str) -> GatewayResult<Vec<Account>> {
        let pattern = like_prefix(keyword);
        let query = format!(
            r"SELECT {COLUMNS} FROM accounts
              WHERE username LIKE ?1 ESCAPE '\'
                 OR email LIKE ?1 ESCAPE '\'
                 OR display_name LIKE ?1 ESCAPE '\'
              ORDER BY id ASC"
        );
        let rows: Vec<AccountRow> = sqlx::query_as(&query)
            .bind(&pattern)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        into_accounts(rows, Visibility::Redacted)
    }

    async fn fetch_by_id(&self, id: AccountId, visibility: Visibility) -> GatewayResult<Account> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE id = ?");
        let row: Option<AccountRow> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        row.ok_or_else(|| GatewayError::account_not_found(id))?
            .into_account(visibility)
    }
}

#[async_trait]
impl AccountStore for SqlAccountStore {
    #[instrument(skip(self, request, cancel), fields(username = %request.username), err)]
    async fn create(
        &self,
        request: &NewAccount,
        inviter_id: AccountId,
        cancel: &CancellationToken,
    ) -> GatewayResult<Account> {
        with_cancellation(cancel, self.insert(request, inviter_id)).await
    }

    #[instrument(skip(self, cancel), err)]
    async fn get_by_username(
        &self,
        username: &str,
        cancel: &CancellationToken,
    ) -> GatewayResult<Account> {
        with_cancellation(cancel, self.fetch_by_username(username)).await
    }

    #[instrument(skip(self, cancel), err)]
    async fn list(
        &self,
        page: Page,
        order: OrderKey,
        cancel: &CancellationToken,
    ) -> GatewayResult<Vec<Account>> {
        let accounts = with_cancellation(cancel, self.fetch_page(page, order)).await?;
        debug!(count = accounts.len(), "Listed accounts");
        Ok(accounts)
    }

    #[instrument(skip(self, cancel), err)]
    async fn search(
        &self,
        keyword: &str,
        cancel: &CancellationToken,
    ) -> GatewayResult<Vec<Account>> {
        let accounts = with_cancellation(cancel, self.fetch_matching(keyword)).await?;
        debug!(count = accounts.len(), "Searched accounts");
        Ok(accounts)
    }

    #[instrument(skip(self, cancel), err)]
    async fn get_by_id(
        &self,
        id: AccountId,
        include_sensitive: bool,
        cancel: &CancellationToken,
    ) -> GatewayResult<Account> {
        with_cancellation(
            cancel,
            self.fetch_by_id(id, Visibility::for_sensitive(include_sensitive)),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::verify_password;

    async fn store() -> SqlAccountStore {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            password_memory_kib: 64,
            password_iterations: 1,
            password_parallelism: 1,
            ..DatabaseConfig::default()
        };
        SqlAccountStore::connect(&config).await.unwrap()
    }

    async fn seed(store: &SqlAccountStore, username: &str, quota: i64) -> Account {
        let token = CancellationToken::new();
        store
            .create(&NewAccount::new(username, "secret").with_quota(quota), 0, &token)
            .await
            .unwrap()
    }

    async fn set_status(store: &SqlAccountStore, username: &str, status: AccountStatus) {
        sqlx::query("UPDATE accounts SET status = ? WHERE username = ?")
            .bind(status.code())
            .bind(username)
            .execute(store.pool())
            .await
            .unwrap();
    }

    async fn set_usage(store: &SqlAccountStore, username: &str, used_quota: i64, requests: i64) {
        sqlx::query("UPDATE accounts SET used_quota = ?, request_count = ? WHERE username = ?")
            .bind(used_quota)
            .bind(requests)
            .bind(username)
            .execute(store.pool())
            .await
            .unwrap();
    }

    fn names(accounts: &[Account]) -> Vec<&str> {
        accounts.iter().map(|a| a.username.as_str()).collect()
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let store = store().await;
        let token = CancellationToken::new();

        let created = store
            .create(&NewAccount::new("alice", "p@ss").with_quota(100), 7, &token)
            .await
            .unwrap();
        assert!(created.id > 0);
        assert!(created.password.is_empty());
        assert_eq!(created.inviter_id, 7);

        let full = store.get_by_username("alice", &token).await.unwrap();
        assert_eq!(full.id, created.id);
        assert_eq!(full.quota, 100);
        assert_eq!(full.status, AccountStatus::Active);
        assert_eq!(full.display_name, "alice");
        assert_eq!(full.group, DEFAULT_GROUP);
        assert_eq!(full.role, ROLE_COMMON);
        assert_eq!(full.inviter_id, 7);
        assert_eq!(full.aff_code.len(), crate::password::AFF_CODE_LEN);
        assert_ne!(full.password, "p@ss");
        assert!(verify_password("p@ss", &full.password).unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = store().await;
        let token = CancellationToken::new();
        seed(&store, "alice", 1).await;

        let err = store
            .create(&NewAccount::new("alice", "other"), 0, &token)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Conflict { .. }));

        let all = store.list(Page::new(0, 10), OrderKey::Id, &token).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_list_ordering_and_window() {
        let store = store().await;
        let token = CancellationToken::new();
        seed(&store, "a", 10).await;
        seed(&store, "b", 30).await;
        seed(&store, "c", 30).await;
        seed(&store, "d", 5).await;

        let by_quota = store.list(Page::new(0, 10), OrderKey::Quota, &token).await.unwrap();
        assert_eq!(names(&by_quota), ["c", "b", "a", "d"]);

        let first = store.list(Page::new(0, 2), OrderKey::Quota, &token).await.unwrap();
        assert_eq!(names(&first), ["c", "b"]);

        let second = store.list(Page::new(2, 2), OrderKey::Quota, &token).await.unwrap();
        assert_eq!(names(&second), ["a", "d"]);

        let by_id = store.list(Page::new(0, 10), OrderKey::Id, &token).await.unwrap();
        assert_eq!(names(&by_id), ["d", "c", "b", "a"]);

        let empty = store.list(Page::new(0, 0), OrderKey::Id, &token).await.unwrap();
        assert!(empty.is_empty());

        let past_end = store.list(Page::new(10, 5), OrderKey::Id, &token).await.unwrap();
        assert!(past_end.is_empty());
    }

    #[tokio::test]
    async fn test_list_by_usage_columns() {
        let store = store().await;
        let token = CancellationToken::new();
        for name in ["a", "b", "c", "d"] {
            seed(&store, name, 1).await;
        }
        set_usage(&store, "a", 5, 9).await;
        set_usage(&store, "b", 20, 0).await;
        set_usage(&store, "c", 20, 3).await;
        set_usage(&store, "d", 1, 9).await;

        let by_used = store.list(Page::new(0, 10), OrderKey::UsedQuota, &token).await.unwrap();
        assert_eq!(names(&by_used), ["c", "b", "a", "d"]);

        let by_requests = store
            .list(Page::new(0, 10), OrderKey::RequestCount, &token)
            .await
            .unwrap();
        assert_eq!(names(&by_requests), ["d", "a", "c", "b"]);

        let window = store
            .list(Page::new(1, 2), OrderKey::RequestCount, &token)
            .await
            .unwrap();
        assert_eq!(names(&window), ["a", "c"]);
    }

    #[tokio::test]
    async fn test_list_redacts_and_skips_deleted() {
        let store = store().await;
        let token = CancellationToken::new();
        seed(&store, "a", 1).await;
        seed(&store, "b", 1).await;
        seed(&store, "c", 1).await;
        set_status(&store, "b", AccountStatus::Deleted).await;
        set_status(&store, "c", AccountStatus::Disabled).await;

        let listed = store.list(Page::new(0, 10), OrderKey::Id, &token).await.unwrap();
        assert_eq!(names(&listed), ["c", "a"]);
        assert!(listed.iter().all(|a| a.password.is_empty()));

        let deleted = store.get_by_username("b", &token).await.unwrap();
        assert_eq!(deleted.status, AccountStatus::Deleted);
    }

    #[tokio::test]
    async fn test_search_is_prefix_match() {
        let store = store().await;
        let token = CancellationToken::new();
        let request = NewAccount::new("alice", "secret")
            .with_email("alice@example.com")
            .with_access_token("tok123");
        store.create(&request, 0, &token).await.unwrap();
        store
            .create(
                &NewAccount::new("zed", "secret").with_display_name("Mallory"),
                0,
                &token,
            )
            .await
            .unwrap();
        store
            .create(
                &NewAccount::new("bob", "secret").with_email("robert@example.com"),
                0,
                &token,
            )
            .await
            .unwrap();

        let found = store.search("ali", &token).await.unwrap();
        assert_eq!(names(&found), ["alice"]);
        assert!(found[0].password.is_empty());
        assert!(found[0].access_token.is_empty());

        let by_email = store.search("rob", &token).await.unwrap();
        assert_eq!(names(&by_email), ["bob"]);

        let by_display = store.search("Mal", &token).await.unwrap();
        assert_eq!(names(&by_display), ["zed"]);

        let everyone = store.search("", &token).await.unwrap();
        assert_eq!(names(&everyone), ["alice", "zed", "bob"]);
    }

    #[tokio::test]
    async fn test_search_includes_deleted_accounts() {
        let store = store().await;
        let token = CancellationToken::new();
        seed(&store, "ghost", 1).await;
        set_status(&store, "ghost", AccountStatus::Deleted).await;

        let found = store.search("gh", &token).await.unwrap();
        assert_eq!(names(&found), ["ghost"]);
        assert_eq!(found[0].status, AccountStatus::Deleted);
    }

    #[tokio::test]
    async fn test_search_escapes_wildcards() {
        let store = store().await;
        let token = CancellationToken::new();
        seed(&store, "a_b", 1).await;
        seed(&store, "axb", 1).await;

        let found = store.search("a_", &token).await.unwrap();
        assert_eq!(names(&found), ["a_b"]);

        let none = store.search("%", &token).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_get_by_id_redaction() {
        let store = store().await;
        let token = CancellationToken::new();
        let created = store
            .create(
                &NewAccount::new("carol", "secret").with_access_token("tok123"),
                0,
                &token,
            )
            .await
            .unwrap();

        let redacted = store.get_by_id(created.id, false, &token).await.unwrap();
        assert_eq!(redacted.access_token, "");
        assert_eq!(redacted.password, "");
        assert_eq!(redacted.username, "carol");

        let full = store.get_by_id(created.id, true, &token).await.unwrap();
        assert_eq!(full.access_token, "tok123");
        assert!(!full.password.is_empty());
    }

    #[tokio::test]
    async fn test_not_found() {
        let store = store().await;
        let token = CancellationToken::new();

        let err = store.get_by_id(999, false, &token).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { .. }));

        let err = store.get_by_username("nobody", &token).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_cancelled_create_inserts_nothing() {
        let store = store().await;
        let cancelled = CancellationToken::new();
        cancelled.cancel();

        let err = store
            .create(&NewAccount::new("alice", "p@ss"), 0, &cancelled)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Cancelled));

        let err = store.search("", &cancelled).await.unwrap_err();
        assert!(matches!(err, GatewayError::Cancelled));

        let token = CancellationToken::new();
        let all = store.list(Page::new(0, 10), OrderKey::Id, &token).await.unwrap();
        assert!(all.is_empty());
    }

    #[test]
    fn test_like_prefix() {
        assert_eq!(like_prefix("ali"), "ali%");
        assert_eq!(like_prefix("a_b%"), r"a\_b\%%");
        assert_eq!(like_prefix(r"c:\"), r"c:\\%");
    }
}
