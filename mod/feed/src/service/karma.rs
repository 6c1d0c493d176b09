use chrono::{Duration, Utc};

use karmafeed_core::{ServiceError, new_id, now_rfc3339};
use karmafeed_sql::{SQLConn, SQLError, Value};

use super::{FeedService, storage_err};
use crate::model::{KarmaEvent, KarmaEventKind, LeaderboardEntry, LikeTarget};

/// Append one karma event inside the caller's transaction.
///
/// Only the like coordinator calls this, and only after filtering
/// self-likes — the ledger itself just records. The timestamp is taken
/// from the server clock here; nothing a client sends reaches it.
pub(crate) fn record_like_karma(
    tx: &dyn SQLConn,
    recipient_id: &str,
    actor_id: &str,
    target: &LikeTarget,
) -> Result<(), SQLError> {
    let kind = KarmaEventKind::for_target(target);
    let event = KarmaEvent {
        id: new_id(),
        recipient_id: recipient_id.to_string(),
        actor_id: actor_id.to_string(),
        kind,
        karma_delta: kind.delta(),
        target: target.clone(),
        create_at: now_rfc3339(),
    };
    let data = serde_json::to_string(&event)
        .map_err(|e| SQLError::Execution(format!("serialize karma event: {e}")))?;

    tx.exec(
        "INSERT INTO karma_events \
         (id, data, recipient_id, actor_id, kind, karma_delta, create_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        &[
            Value::Text(event.id),
            Value::Text(data),
            Value::Text(event.recipient_id),
            Value::Text(event.actor_id),
            Value::Text(event.kind.as_str().to_string()),
            Value::Integer(event.karma_delta),
            Value::Text(event.create_at),
        ],
    )?;
    Ok(())
}

impl FeedService {
    /// Top earners over a rolling window, highest total first.
    ///
    /// Recomputed from the raw event log on every call — there is no
    /// cached total to drift or to lose an update. Ties break on the
    /// lower recipient id so the ordering is deterministic.
    pub fn leaderboard(
        &self,
        window: Duration,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, ServiceError> {
        let limit = limit.clamp(1, 100) as i64;
        let cutoff = (Utc::now() - window).to_rfc3339();

        let rows = self
            .sql
            .query(
                "SELECT k.recipient_id AS user_id, u.username AS username, \
                        SUM(k.karma_delta) AS total_karma \
                 FROM karma_events k \
                 JOIN users u ON u.id = k.recipient_id \
                 WHERE k.create_at >= ?1 \
                 GROUP BY k.recipient_id, u.username \
                 ORDER BY total_karma DESC, k.recipient_id ASC \
                 LIMIT ?2",
                &[Value::Text(cutoff), Value::Integer(limit)],
            )
            .map_err(storage_err)?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            let (Some(user_id), Some(username), Some(total_karma)) = (
                row.get_str("user_id"),
                row.get_str("username"),
                row.get_i64("total_karma"),
            ) else {
                return Err(ServiceError::Internal(
                    "malformed leaderboard row".into(),
                ));
            };
            entries.push(LeaderboardEntry {
                user_id: user_id.to_string(),
                username: username.to_string(),
                total_karma,
            });
        }
        Ok(entries)
    }

    /// One user's karma over a rolling window; 0 without events.
    pub fn user_karma(&self, user_id: &str, window: Duration) -> Result<i64, ServiceError> {
        self.get_user(user_id)?;
        let cutoff = (Utc::now() - window).to_rfc3339();

        let rows = self
            .sql
            .query(
                "SELECT COALESCE(SUM(karma_delta), 0) AS total \
                 FROM karma_events \
                 WHERE recipient_id = ?1 AND create_at >= ?2",
                &[Value::Text(user_id.to_string()), Value::Text(cutoff)],
            )
            .map_err(storage_err)?;

        Ok(rows.first().and_then(|r| r.get_i64("total")).unwrap_or(0))
    }
}
