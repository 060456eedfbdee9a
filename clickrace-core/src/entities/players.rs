use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use uuid::Uuid;

/// A row of the `players` table.
///
/// Players are created by the identity system; the game only reads them
/// and bumps `nb_wins`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Player {
    pub user_id: Uuid,
    pub user_name: String,
    pub nb_wins: i64,
    pub created_at: time::PrimitiveDateTime,
}

#[derive(Debug, Clone)]
/// Add one win to a player.
///
/// Returns the number of rows updated (0 if the player does not exist).
pub struct IncrementWinCount {
    pub user_id: Uuid,
}

impl Processor<IncrementWinCount> for DatabaseProcessor {
    type Output = u64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:IncrementWinCount")]
    async fn process(&self, update: IncrementWinCount) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE players
            SET nb_wins = nb_wins + 1
            WHERE user_id = $1
            "#,
        )
        .bind(update.user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone)]
/// Get a player by user id.
pub struct GetPlayerById {
    pub user_id: Uuid,
}

impl Processor<GetPlayerById> for DatabaseProcessor {
    type Output = Option<Player>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetPlayerById")]
    async fn process(&self, query: GetPlayerById) -> Result<Option<Player>, sqlx::Error> {
        let player = sqlx::query_as::<_, Player>(
            r#"
            SELECT user_id, user_name, nb_wins, created_at
            FROM players
            WHERE user_id = $1
            "#,
        )
        .bind(query.user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(player)
    }
}

#[derive(Debug, Clone)]
/// Players with the most wins, ties broken by name.
pub struct GetLeaderboard {
    pub limit: i64,
}

impl Processor<GetLeaderboard> for DatabaseProcessor {
    type Output = Vec<Player>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetLeaderboard")]
    async fn process(&self, query: GetLeaderboard) -> Result<Vec<Player>, sqlx::Error> {
        let players = sqlx::query_as::<_, Player>(
            r#"
            SELECT user_id, user_name, nb_wins, created_at
            FROM players
            ORDER BY nb_wins DESC, user_name ASC
            LIMIT $1
            "#,
        )
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(players)
    }
}
