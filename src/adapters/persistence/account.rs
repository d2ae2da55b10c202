use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::account::{
        AccountFilter, AccountMutation, AccountOrder, AccountRepo, Patch, StatusCounts,
    },
    domain::entities::account::{Account, NewAccount, VerificationStatus},
};

const SELECT_COLS: &str = "id, external_login_id, email, display_name, verification_status, \
     external_handle, verification_token, submission_reference, credential_hash, credential_set, \
     reset_token_hash, reset_token_expires_at, created_at, updated_at";

fn row_to_account(row: sqlx::postgres::PgRow) -> Account {
    Account {
        id: row.get("id"),
        external_login_id: row.get("external_login_id"),
        email: row.get("email"),
        display_name: row.get("display_name"),
        verification_status: row.get("verification_status"),
        external_handle: row.get("external_handle"),
        verification_token: row.get("verification_token"),
        submission_reference: row.get("submission_reference"),
        credential_hash: row.get("credential_hash"),
        credential_set: row.get("credential_set"),
        reset_token_hash: row.get("reset_token_hash"),
        reset_token_expires_at: row.get("reset_token_expires_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Pushes `, column = <value>` for a patched column. `Keep` pushes nothing.
fn push_patch<'a, T>(builder: &mut QueryBuilder<'a, Postgres>, column: &str, patch: Patch<T>)
where
    T: 'a + sqlx::Encode<'a, Postgres> + sqlx::Type<Postgres> + Send,
{
    match patch {
        Patch::Keep => {}
        Patch::Set(value) => {
            builder.push(", ").push(column).push(" = ").push_bind(value);
        }
        Patch::Clear => {
            builder.push(", ").push(column).push(" = NULL");
        }
    }
}

/// Password reset write. The window check and the write share one statement,
/// so one secret can set the credential at most once.
fn consume_reset_query(
    id: Uuid,
    expected_reset_hash: &str,
    credential_hash: String,
    now: chrono::NaiveDateTime,
) -> QueryBuilder<'static, Postgres> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "UPDATE accounts SET updated_at = CURRENT_TIMESTAMP, credential_set = TRUE",
    );
    push_patch(&mut builder, "credential_hash", Patch::Set(credential_hash));
    push_patch::<String>(&mut builder, "reset_token_hash", Patch::Clear);
    push_patch::<chrono::NaiveDateTime>(&mut builder, "reset_token_expires_at", Patch::Clear);
    builder.push(" WHERE id = ").push_bind(id);
    builder
        .push(" AND verification_status = ")
        .push_bind(VerificationStatus::Approved);
    builder
        .push(" AND reset_token_hash = ")
        .push_bind(expected_reset_hash.to_owned());
    builder.push(" AND reset_token_expires_at > ").push_bind(now);
    builder.push(" RETURNING ").push(SELECT_COLS);
    builder
}

/// Pushes account list filters. Caller must ensure builder already ends in a
/// WHERE clause.
fn push_account_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &AccountFilter) {
    if !filter.statuses.is_empty() {
        builder.push(" AND verification_status IN (");
        let mut separated = builder.separated(", ");
        for status in &filter.statuses {
            separated.push_bind(*status);
        }
        separated.push_unseparated(")");
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", escape_like(search));
        builder
            .push(" AND (email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR external_handle ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR display_name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Escapes LIKE wildcards so the search term matches literally.
fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl AccountRepo for PostgresPersistence {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        let row = sqlx::query(&format!("SELECT {SELECT_COLS} FROM accounts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(row.map(row_to_account))
    }

    async fn find_by_external_login_id(
        &self,
        external_login_id: &str,
    ) -> AppResult<Option<Account>> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLS} FROM accounts WHERE external_login_id = $1"
        ))
        .bind(external_login_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_account))
    }

    async fn find_by_handle(
        &self,
        handle: &str,
        status: VerificationStatus,
    ) -> AppResult<Option<Account>> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLS} FROM accounts \
             WHERE lower(external_handle) = lower($1) AND verification_status = $2 \
             LIMIT 1"
        ))
        .bind(handle)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_account))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        // Email is not unique; the oldest account wins.
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLS} FROM accounts WHERE lower(email) = lower($1) \
             ORDER BY created_at ASC LIMIT 1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_account))
    }

    async fn create(&self, account: NewAccount) -> AppResult<Account> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO accounts (id, external_login_id, email, display_name)
            VALUES ($1, $2, $3, $4)
            RETURNING {SELECT_COLS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&account.external_login_id)
        .bind(&account.email)
        .bind(&account.display_name)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_account(row))
    }

    async fn conditional_update(
        &self,
        id: Uuid,
        expected: VerificationStatus,
        mutation: AccountMutation,
    ) -> AppResult<Option<Account>> {
        let AccountMutation {
            status,
            external_handle,
            verification_token,
            submission_reference,
            credential_hash,
            reset_token_hash,
            reset_token_expires_at,
        } = mutation;

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE accounts SET updated_at = CURRENT_TIMESTAMP");
        if let Some(status) = status {
            builder.push(", verification_status = ").push_bind(status);
        }
        if matches!(credential_hash, Patch::Set(_)) {
            builder.push(", credential_set = TRUE");
        }
        push_patch(&mut builder, "external_handle", external_handle);
        push_patch(&mut builder, "verification_token", verification_token);
        push_patch(&mut builder, "submission_reference", submission_reference);
        push_patch(&mut builder, "credential_hash", credential_hash);
        push_patch(&mut builder, "reset_token_hash", reset_token_hash);
        push_patch(&mut builder, "reset_token_expires_at", reset_token_expires_at);

        // Guard and write in one statement.
        builder.push(" WHERE id = ").push_bind(id);
        builder
            .push(" AND verification_status = ")
            .push_bind(expected);
        builder.push(" RETURNING ").push(SELECT_COLS);

        let row = builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(row.map(row_to_account))
    }

    async fn consume_reset(
        &self,
        id: Uuid,
        expected_reset_hash: &str,
        credential_hash: String,
        now: chrono::NaiveDateTime,
    ) -> AppResult<Option<Account>> {
        let mut builder = consume_reset_query(id, expected_reset_hash, credential_hash, now);
        let row = builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(row.map(row_to_account))
    }

    async fn refresh_profile(
        &self,
        id: Uuid,
        email: &str,
        display_name: &str,
    ) -> AppResult<Account> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE accounts
            SET email = $2, display_name = $3, updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING {SELECT_COLS}
            "#
        ))
        .bind(id)
        .bind(email)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_account(row))
    }

    async fn delete_unless(&self, id: Uuid, protected: VerificationStatus) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM accounts WHERE id = $1 AND verification_status <> $2")
                .bind(id)
                .bind(protected)
                .execute(&self.pool)
                .await
                .map_err(AppError::from)?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_by_status(&self) -> AppResult<StatusCounts> {
        let rows = sqlx::query(
            "SELECT verification_status, COUNT(*) AS count FROM accounts GROUP BY verification_status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;

        let mut counts = StatusCounts::default();
        for row in rows {
            let status: VerificationStatus = row.get("verification_status");
            counts.add(status, row.get("count"));
        }

        counts.with_credential =
            sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE credential_set")
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::from)?;
        Ok(counts)
    }

    async fn list(&self, filter: &AccountFilter) -> AppResult<Vec<Account>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {SELECT_COLS} FROM accounts WHERE TRUE"));
        push_account_filters(&mut builder, filter);
        builder.push(match filter.order {
            AccountOrder::NewestUpdated => " ORDER BY updated_at DESC",
            AccountOrder::NewestCreated => " ORDER BY created_at DESC",
        });

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_account).collect())
    }
}
