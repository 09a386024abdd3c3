use anyhow::Context;
use teloxide::types::ChatId;
use crate::repository;

repository!(Destinations,
    pub async fn register(&self, chat_id: ChatId) -> anyhow::Result<()> {
        sqlx::query("INSERT OR IGNORE INTO Destinations (chat_id) VALUES (?)")
            .bind(chat_id.0)
            .execute(&self.pool)
            .await
            .map(|_| ())
            .context(format!("couldn't register the destination chat with id = {chat_id}"))
    }
,
    pub async fn deregister(&self, chat_id: ChatId) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM Destinations WHERE chat_id = ?")
            .bind(chat_id.0)
            .execute(&self.pool)
            .await
            .map(|_| ())
            .context(format!("couldn't deregister the destination chat with id = {chat_id}"))
    }
,
    // Registration order, to keep the fan-out order deterministic.
    pub async fn list(&self) -> anyhow::Result<Vec<ChatId>> {
        sqlx::query_scalar::<_, i64>("SELECT chat_id FROM Destinations ORDER BY rowid")
            .fetch_all(&self.pool)
            .await
            .map(|ids| ids.into_iter().map(ChatId).collect())
            .context("couldn't fetch the list of destination chats")
    }
);
