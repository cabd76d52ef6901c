//! Message Repository Implementation
//!
//! PostgreSQL implementation of message storage, version-checked reaction
//! writes and the mention inbox read state.
//!
//! Mentions are stored denormalized in a `BIGINT[]` column (GIN-indexed) and
//! reactions as a JSONB object of emoji → user ID array.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::domain::{
    MentionFilter, MentionQuery, MentionRepository, MentionSlice, Message, MessageRepository,
    MessageTarget, PageRequest, ReactionMap, SortOrder,
};
use crate::shared::error::AppError;

const MESSAGE_COLUMNS: &str =
    "id, author_id, content, channel_id, recipient_id, mentions, reactions, read, version, created_at";

/// PostgreSQL message repository implementation.
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for message queries.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i64,
    author_id: i64,
    content: String,
    channel_id: Option<i64>,
    recipient_id: Option<i64>,
    mentions: Vec<i64>,
    reactions: Json<ReactionMap>,
    read: bool,
    version: i64,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    fn into_message(self) -> Result<Message, AppError> {
        let target = MessageTarget::from_parts(self.channel_id, self.recipient_id).ok_or_else(|| {
            AppError::Internal(format!("Message {} has no single delivery target", self.id))
        })?;

        Ok(Message {
            id: self.id,
            author_id: self.author_id,
            content: self.content,
            target,
            mentions: self.mentions,
            reactions: self.reactions.0,
            read: self.read,
            version: self.version,
            created_at: self.created_at,
        })
    }
}

/// Predicate matching messages that mention the user bound at `$param`.
///
/// Written as array containment so the GIN index on `mentions` applies.
fn mentions_user(param: u8) -> String {
    format!("mentions @> ARRAY[${param}]::BIGINT[]")
}

/// Extra WHERE clause for a mention filter.
fn filter_clause(filter: MentionFilter) -> &'static str {
    match filter {
        MentionFilter::All => "",
        MentionFilter::Unread => "AND read = FALSE",
        MentionFilter::Read => "AND read = TRUE",
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Message>, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(MessageRow::into_message).transpose()
    }

    /// The database assigns `created_at`; the returned row carries it.
    async fn create(&self, message: &Message) -> Result<Message, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            r#"
            INSERT INTO messages (id, author_id, content, channel_id, recipient_id, mentions, reactions)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(message.id)
        .bind(message.author_id)
        .bind(&message.content)
        .bind(message.channel_id())
        .bind(message.recipient_id())
        .bind(&message.mentions)
        .bind(Json(&message.reactions))
        .fetch_one(&self.pool)
        .await?;

        row.into_message()
    }

    async fn update_reactions(
        &self,
        id: i64,
        expected_version: i64,
        reactions: &ReactionMap,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET reactions = $3, version = version + 1
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(id)
        .bind(expected_version)
        .bind(Json(reactions))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl MentionRepository for PgMessageRepository {
    async fn find_mentions(&self, user_id: i64, query: &MentionQuery) -> Result<MentionSlice, AppError> {
        let filter = filter_clause(query.filter);
        let mentioned = mentions_user(1);

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM messages WHERE {mentioned} {filter}"
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, MessageRow>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE {mentioned} {filter}
            ORDER BY {order}
            LIMIT $2 OFFSET $3
            "#,
            order = query.sort.as_sql(),
        ))
        .bind(user_id)
        .bind(query.page.limit() as i64)
        .bind(query.page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let messages = rows
            .into_iter()
            .map(MessageRow::into_message)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MentionSlice {
            messages,
            total: total.max(0) as u64,
        })
    }

    async fn count_unread(&self, user_id: i64) -> Result<u64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM messages WHERE {} AND read = FALSE",
            mentions_user(1),
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }

    async fn mark_read(&self, user_id: i64, message_ids: &[i64]) -> Result<u64, AppError> {
        if message_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(&format!(
            r#"
            UPDATE messages
            SET read = TRUE
            WHERE id = ANY($1) AND {} AND read = FALSE
            "#,
            mentions_user(2),
        ))
        .bind(message_ids)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Selection and update happen in one statement; the row locks keep a
    /// concurrent view from counting the same messages.
    async fn mark_unread_as_read(
        &self,
        user_id: i64,
        window: Option<(PageRequest, SortOrder)>,
    ) -> Result<u64, AppError> {
        let mentioned = mentions_user(1);
        let result = match window {
            None => {
                sqlx::query(&format!(
                    r#"
                    UPDATE messages
                    SET read = TRUE
                    WHERE {mentioned} AND read = FALSE
                    "#
                ))
                .bind(user_id)
                .execute(&self.pool)
                .await?
            }
            Some((page, sort)) => {
                sqlx::query(&format!(
                    r#"
                    UPDATE messages
                    SET read = TRUE
                    WHERE read = FALSE AND id IN (
                        SELECT id FROM messages
                        WHERE {mentioned} AND read = FALSE
                        ORDER BY {order}
                        LIMIT $2 OFFSET $3
                        FOR UPDATE
                    )
                    "#,
                    order = sort.as_sql(),
                ))
                .bind(user_id)
                .bind(page.limit() as i64)
                .bind(page.offset() as i64)
                .execute(&self.pool)
                .await?
            }
        };

        Ok(result.rows_affected())
    }

    async fn mark_unread(&self, user_id: i64, message_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(&format!(
            r#"
            UPDATE messages
            SET read = FALSE
            WHERE id = $1 AND {}
            "#,
            mentions_user(2),
        ))
        .bind(message_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(channel_id: Option<i64>, recipient_id: Option<i64>) -> MessageRow {
        MessageRow {
            id: 1,
            author_id: 2,
            content: "hi".into(),
            channel_id,
            recipient_id,
            mentions: vec![3],
            reactions: Json(ReactionMap::new()),
            read: false,
            version: 0,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_row_maps_target() {
        let message = row(None, Some(5)).into_message().unwrap();
        assert_eq!(message.target, MessageTarget::Direct(5));
        assert_eq!(message.mentions, vec![3]);
    }

    #[test]
    fn test_row_without_target_is_internal_error() {
        assert!(matches!(row(None, None).into_message(), Err(AppError::Internal(_))));
        assert!(matches!(row(Some(1), Some(2)).into_message(), Err(AppError::Internal(_))));
    }

    #[test]
    fn test_filter_clause() {
        assert_eq!(filter_clause(MentionFilter::All), "");
        assert_eq!(filter_clause(MentionFilter::Unread), "AND read = FALSE");
    }

    #[test]
    fn test_mention_predicate_uses_containment() {
        assert_eq!(mentions_user(1), "mentions @> ARRAY[$1]::BIGINT[]");
        assert_eq!(mentions_user(2), "mentions @> ARRAY[$2]::BIGINT[]");
        assert!(!mentions_user(1).contains("ANY"));
    }
}
