//! Bootstrap — startup checks and demo data seeding.

use feed::FeedService;
use feed::model::LikeTarget;
use karmafeed_core::ServiceError;
use tracing::info;

use crate::config::ServerConfig;

/// Verify server configuration is ready for use.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    if let Some(depth) = config.feed.max_comment_depth {
        if depth < 0 {
            anyhow::bail!("feed.max_comment_depth must not be negative.");
        }
    }
    Ok(())
}

/// Insert a small demo dataset: three users, two posts, a short comment
/// thread, and a handful of likes. Skipped when the users already exist.
pub fn seed_demo_data(svc: &FeedService) -> anyhow::Result<()> {
    let alice = match svc.create_user("alice") {
        Ok(user) => user,
        Err(ServiceError::Conflict(_)) => {
            info!("Demo data already present, skipping seed");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let bobby = svc.create_user("bobby")?;
    let carol = svc.create_user("carol")?;

    let first = svc.create_post(
        &alice.id,
        "Hello, KarmaFeed",
        "First post on the demo instance. Say hi below!",
    )?;
    let second = svc.create_post(
        &bobby.id,
        "Threading test",
        "Replies should nest arbitrarily deep. Try it out.",
    )?;

    let greeting = svc.create_comment(&first.id, &bobby.id, None, "hi alice!")?;
    let reply = svc.create_comment(&first.id, &alice.id, Some(&greeting.id), "welcome aboard")?;
    svc.create_comment(&first.id, &carol.id, Some(&reply.id), "hello from carol")?;

    svc.toggle_like(&bobby.id, &LikeTarget::Post(first.id.clone()))?;
    svc.toggle_like(&carol.id, &LikeTarget::Post(first.id.clone()))?;
    svc.toggle_like(&alice.id, &LikeTarget::Post(second.id.clone()))?;
    svc.toggle_like(&carol.id, &LikeTarget::Comment(greeting.id.clone()))?;

    info!("Seeded demo data: 3 users, 2 posts, 3 comments, 4 likes");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_config_rejects_empty_data_dir() {
        let config: ServerConfig = toml::from_str(
            r#"
            [storage]
            data_dir = ""
            "#,
        )
        .unwrap();
        assert!(verify_config(&config).is_err());
    }

    #[test]
    fn seed_is_idempotent() {
        use std::sync::Arc;

        let sql = Arc::new(karmafeed_sql::SqliteStore::open_in_memory().unwrap());
        let svc = FeedService::new(sql, feed::FeedConfig::default()).unwrap();

        seed_demo_data(&svc).unwrap();
        // Second run hits the username conflict and backs off cleanly.
        seed_demo_data(&svc).unwrap();

        let page = svc.feed_page(None, Some(10)).unwrap();
        assert_eq!(page.posts.len(), 2);
    }
}
