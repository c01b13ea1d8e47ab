use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Remembers which fields act as parent links for a `(project, issue type)`
/// pair.
///
/// Entries expire after `ttl` and are then treated as absent; they are never
/// evicted otherwise. The key space (projects times issue types) is small.
pub struct SchemaCache {
    ttl: Duration,
    entries: Mutex<HashMap<(String, String), CacheEntry>>,
}

struct CacheEntry {
    fields: Vec<String>,
    stored_at: Instant,
}

impl SchemaCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, project: &str, issue_type: &str) -> Option<Vec<String>> {
        let entries = self.entries.lock().await;
        let entry = entries.get(&(project.to_string(), issue_type.to_string()))?;
        if entry.stored_at.elapsed() < self.ttl {
            Some(entry.fields.clone())
        } else {
            None
        }
    }

    pub async fn put(&self, project: &str, issue_type: &str, fields: Vec<String>) {
        self.entries.lock().await.insert(
            (project.to_string(), issue_type.to_string()),
            CacheEntry {
                fields,
                stored_at: Instant::now(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn entry_is_served_until_ttl_elapses() {
        let cache = SchemaCache::new(Duration::from_millis(500));
        cache
            .put("PROJ", "Story", vec!["customfield_10014".to_string()])
            .await;

        tokio::time::advance(Duration::from_millis(499)).await;
        assert_eq!(
            cache.get("PROJ", "Story").await,
            Some(vec!["customfield_10014".to_string()])
        );

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(cache.get("PROJ", "Story").await, None);
    }

    #[tokio::test]
    async fn keys_are_project_and_issue_type() {
        let cache = SchemaCache::new(Duration::from_secs(60));
        cache.put("PROJ", "Story", vec!["a".to_string()]).await;

        assert_eq!(cache.get("PROJ", "Bug").await, None);
        assert_eq!(cache.get("OTHER", "Story").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn put_overwrites_expired_entry() {
        let cache = SchemaCache::new(Duration::from_millis(100));
        cache.put("PROJ", "Story", vec!["old".to_string()]).await;
        tokio::time::advance(Duration::from_millis(200)).await;

        cache.put("PROJ", "Story", vec!["new".to_string()]).await;
        assert_eq!(cache.get("PROJ", "Story").await, Some(vec!["new".to_string()]));
    }

    #[tokio::test]
    async fn empty_lists_are_cached() {
        let cache = SchemaCache::new(Duration::from_secs(60));
        cache.put("PROJ", "Task", Vec::new()).await;
        assert_eq!(cache.get("PROJ", "Task").await, Some(Vec::new()));
    }
}
