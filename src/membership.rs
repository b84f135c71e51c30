use crate::error::{BotError, BotResult};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// What is stored for one requester: the backend id they registered with and the
/// closed leaderboards they were added to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MembershipEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub leaderboards: Vec<String>,
}

impl MembershipEntry {
    pub fn is_member_of(&self, leaderboard: &str) -> bool {
        self.leaderboards.iter().any(|lb| lb == leaderboard)
    }

    /// Puts the leaderboard first and drops any other occurrence of it.
    pub fn join(&mut self, leaderboard: &str) {
        self.leaderboards.retain(|lb| lb != leaderboard);
        self.leaderboards.insert(0, leaderboard.to_string());
    }

    pub fn leave(&mut self, leaderboard: &str) {
        self.leaderboards.retain(|lb| lb != leaderboard);
    }
}

type Entries = BTreeMap<String, MembershipEntry>;

/// Key-value store of membership entries, persisted as a single JSON object.
/// Every update is a read-modify-write-persist cycle run under one lock.
#[derive(Debug, Clone)]
pub struct MembershipStore {
    path: PathBuf,
    entries: Arc<Mutex<Entries>>,
}

impl MembershipStore {
    /// Load the store from disk. A missing file gives an empty store.
    pub async fn load(path: impl AsRef<Path>) -> BotResult<MembershipStore> {
        let path = path.as_ref().to_path_buf();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Entries::new(),
            Ok(content) => serde_json::from_str::<Entries>(&content).map_err(|e| {
                BotError::Storage(format!("could not parse {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No membership file at {}, starting empty.", path.display());
                Entries::new()
            }
            Err(e) => return Err(e.into()),
        };
        info!("Loaded {} membership entries.", entries.len());

        Ok(MembershipStore {
            path,
            entries: Arc::new(Mutex::new(entries)),
        })
    }

    /// Entry of a requester, or an empty one if they were never stored.
    pub async fn get(&self, key: &str) -> MembershipEntry {
        self.entries
            .lock()
            .await
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Apply `mutate` to the entry of `key` and persist the whole store. The
    /// in-memory entry is only replaced once the file is written.
    pub async fn update<F>(&self, key: &str, mutate: F) -> BotResult<MembershipEntry>
    where
        F: FnOnce(&mut MembershipEntry),
    {
        let mut entries = self.entries.lock().await;
        let mut entry = entries.get(key).cloned().unwrap_or_default();
        mutate(&mut entry);

        let previous = entries.insert(key.to_string(), entry.clone());
        if let Err(e) = self.persist(&entries).await {
            match previous {
                Some(previous) => entries.insert(key.to_string(), previous),
                None => entries.remove(key),
            };
            return Err(e);
        }
        debug!("Membership entry for {key} updated: {entry:?}");

        Ok(entry)
    }

    /// Copy of every stored entry, in key order.
    pub async fn entries(&self) -> Vec<(String, MembershipEntry)> {
        self.entries
            .lock()
            .await
            .iter()
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect()
    }

    async fn persist(&self, entries: &Entries) -> BotResult<()> {
        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| BotError::Storage(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_moves_leaderboard_first() {
        let mut entry = MembershipEntry {
            id: None,
            leaderboards: vec!["a".to_string(), "b".to_string()],
        };
        entry.join("b");
        entry.join("b");
        assert_eq!(entry.leaderboards, vec!["b", "a"]);

        entry.leave("b");
        assert_eq!(entry.leaderboards, vec!["a"]);
        assert!(!entry.is_member_of("b"));
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = MembershipStore::load(dir.path().join("db.json")).await.unwrap();

        assert!(store.entries().await.is_empty());
        assert_eq!(store.get("someone").await, MembershipEntry::default());
        // reading does not create entries
        assert!(store.entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");

        let store = MembershipStore::load(&path).await.unwrap();
        store
            .update("discord-1", |e| e.id = Some("cpc-1".to_string()))
            .await
            .unwrap();
        store.update("discord-1", |e| e.join("fall")).await.unwrap();

        let reloaded = MembershipStore::load(&path).await.unwrap();
        let entry = reloaded.get("discord-1").await;
        assert_eq!(entry.id.as_deref(), Some("cpc-1"));
        assert_eq!(entry.leaderboards, vec!["fall"]);
    }

    #[tokio::test]
    async fn test_reads_existing_db_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(
            &path,
            r#"{"111": {"id": "abc", "leaderboards": ["fall"]}, "222": {"leaderboards": []}}"#,
        )
        .unwrap();

        let store = MembershipStore::load(&path).await.unwrap();
        let entries = store.entries().await;

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].1.id.as_deref(), Some("abc"));
        assert!(entries[0].1.is_member_of("fall"));
        assert_eq!(entries[1].1.id, None);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_entry() {
        let dir = tempfile::tempdir().unwrap();
        // a directory cannot be replaced by the temporary file
        let path = dir.path().join("db.json");
        std::fs::create_dir(&path).unwrap();
        let store = MembershipStore {
            path,
            entries: Arc::new(Mutex::new(Entries::new())),
        };

        let result = store
            .update("discord-1", |e| e.id = Some("cpc-1".to_string()))
            .await;

        assert!(matches!(result, Err(BotError::Storage(_))));
        assert_eq!(store.get("discord-1").await, MembershipEntry::default());
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = MembershipStore::load(dir.path().join("db.json")).await.unwrap();

        let handles = (0..10)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .update("discord-1", |e| e.join(&format!("lb{i}")))
                        .await
                        .unwrap();
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.get("discord-1").await.leaderboards.len(), 10);
    }
}
