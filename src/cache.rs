//! Client-side data cache
//!
//! [`DataCache`] keeps the list of websites shown to the user. It mirrors the
//! server's records and overlays the access counts from the local
//! [`CountStore`]. All mutations go through the HTTP API first; local state
//! only changes after the server accepted them.
//!
//! Access counts are owned by the client: [`DataCache::record_access`] never
//! contacts the server, and counts are not synchronized between devices.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::client::{ApiClient, ClientError};
use crate::count_store::CountStore;
use crate::model::Website;

/// Number of entries in [`Statistics::top`]
pub const TOP_SITES: usize = 5;

const LOAD_FAILED_MESSAGE: &str = "Could not load websites. Please try again later.";

/// Usage statistics derived from the cached websites
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statistics {
    /// All websites, most accessed first; ties keep list order
    pub ranked: Vec<Website>,
    pub total_accesses: u64,
}

impl Statistics {
    /// The [`TOP_SITES`] most accessed websites
    pub fn top(&self) -> &[Website] {
        &self.ranked[..self.ranked.len().min(TOP_SITES)]
    }
}

pub struct DataCache {
    api: ApiClient,
    counts: CountStore,
    websites: Vec<Website>,
    loaded: bool,
    last_error: Option<String>,
}

impl DataCache {
    pub fn new(api: ApiClient, counts: CountStore) -> Self {
        Self {
            api,
            counts,
            websites: Vec::new(),
            loaded: false,
            last_error: None,
        }
    }

    pub fn websites(&self) -> &[Website] {
        &self.websites
    }

    /// True once a load attempt finished, whether it succeeded or not
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Message describing the last failed operation, if any
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn api_mut(&mut self) -> &mut ApiClient {
        &mut self.api
    }

    /// Fetches all records and merges the local counts onto them
    ///
    /// Records without a local count show 0. Local counts for ids the
    /// server no longer knows are dropped, except when the server returns an
    /// empty list: a freshly created record file looks the same as one whose
    /// records were all deleted, so the counts are kept until a non-empty
    /// list shows which ids are gone. On failure the previously cached list
    /// is kept and [`last_error`](Self::last_error) is set.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        self.loaded = false;
        let result = self.fetch_merged().await;
        self.loaded = true;

        match result {
            Ok(websites) => {
                self.websites = websites;
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "failed to load websites");
                self.last_error = Some(LOAD_FAILED_MESSAGE.to_string());
                Err(err)
            }
        }
    }

    async fn fetch_merged(&self) -> Result<Vec<Website>, ClientError> {
        let mut websites = self.api.list().await?;

        if websites.is_empty() {
            debug!("server returned no websites, keeping local access counts");
        } else {
            let ids: HashSet<&str> = websites.iter().map(|site| site.id.as_str()).collect();
            let pruned = self.counts.retain(&ids)?;
            if pruned > 0 {
                debug!(pruned, "dropped access counts of removed websites");
            }
        }

        let counts = self.counts.all()?;
        for site in &mut websites {
            site.count = counts.get(&site.id).copied().unwrap_or(0);
        }
        Ok(websites)
    }

    /// Adds a website through the API
    ///
    /// A [`ClientError::VerificationFailed`] means the URL looked unreachable;
    /// calling again with `force = true` stores it anyway.
    pub async fn add(&mut self, name: &str, url: &str, force: bool) -> Result<Website, ClientError> {
        let result = self.api.create(name, url, force).await;
        let mut website = self.track(result)?;
        website.count = 0;
        self.websites.push(website.clone());
        Ok(website)
    }

    /// Updates name and URL, keeping the count currently shown for the website
    pub async fn edit(
        &mut self,
        id: &str,
        name: &str,
        url: &str,
        force: bool,
    ) -> Result<Website, ClientError> {
        let result = self.api.update(id, name, url, force).await;
        let mut updated = self.track(result)?;

        match self.websites.iter_mut().find(|site| site.id == id) {
            Some(site) => {
                updated.count = site.count;
                *site = updated.clone();
            }
            None => {
                updated.count = self.counts.get(id)?;
                self.websites.push(updated.clone());
            }
        }
        Ok(updated)
    }

    /// Deletes a website and purges its local access count
    ///
    /// A website the server no longer knows (404) was deleted elsewhere and
    /// is purged locally all the same.
    pub async fn delete(&mut self, id: &str) -> Result<(), ClientError> {
        let result = match self.api.delete(id).await {
            Err(ClientError::Rejected { status: 404, .. }) => {
                debug!(id, "website already deleted on the server");
                Ok(())
            }
            other => other,
        };
        self.track(result)?;

        self.websites.retain(|site| site.id != id);
        let result = self.counts.remove(id).map_err(ClientError::from);
        self.track(result)
    }

    /// Counts one access to a website, locally only
    ///
    /// Returns the new count, or `None` if the id is not in the cache. The
    /// displayed count only changes once the store has committed the new
    /// value.
    pub fn record_access(&mut self, id: &str) -> Result<Option<u64>, ClientError> {
        let Some(index) = self.websites.iter().position(|site| site.id == id) else {
            return Ok(None);
        };

        let result = self.counts.increment(id).map_err(ClientError::from);
        let count = self.track(result)?;
        self.websites[index].count = count;
        Ok(Some(count))
    }

    pub fn statistics(&self) -> Statistics {
        let mut ranked = self.websites.clone();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        let total_accesses = ranked.iter().map(|site| site.count).sum();

        Statistics {
            ranked,
            total_accesses,
        }
    }

    /// Records the outcome of an API call in `last_error`
    fn track<T>(&mut self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        match &result {
            Ok(_) => self.last_error = None,
            Err(err) if err.is_verification_failed() => {}
            Err(err) => self.last_error = Some(err.user_message()),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(id: &str, count: u64) -> Website {
        Website {
            id: id.to_string(),
            name: id.to_uppercase(),
            url: format!("https://{}.dev", id),
            count,
        }
    }

    fn cache_with(websites: Vec<Website>) -> (DataCache, tempfile::TempDir) {
        let dir = tempfile::TempDir::new().unwrap();
        let counts = CountStore::open(dir.path().join("counts.redb")).unwrap();
        let mut cache = DataCache::new(ApiClient::new("http://127.0.0.1:9"), counts);
        cache.websites = websites;
        cache.loaded = true;
        (cache, dir)
    }

    #[test]
    fn test_statistics_ranks_by_count() {
        let (cache, _dir) = cache_with(vec![
            site("a", 1),
            site("b", 9),
            site("c", 4),
            site("d", 4),
            site("e", 0),
            site("f", 2),
        ]);

        let stats = cache.statistics();
        let order: Vec<&str> = stats.ranked.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "d", "f", "a", "e"]);
        assert_eq!(stats.top().len(), TOP_SITES);
        assert_eq!(stats.total_accesses, 20);
    }

    #[test]
    fn test_record_access_persists_count() {
        let (mut cache, _dir) = cache_with(vec![site("a", 0), site("b", 0)]);

        for expected in 1..=5 {
            assert_eq!(cache.record_access("a").unwrap(), Some(expected));
            assert_eq!(cache.counts.get("a").unwrap(), expected);
            assert_eq!(cache.websites[0].count, expected);
        }
        assert_eq!(cache.record_access("b").unwrap(), Some(1));
        assert_eq!(cache.counts.get("a").unwrap(), 5);
        assert_eq!(cache.counts.get("b").unwrap(), 1);
    }

    #[test]
    fn test_record_access_continues_from_stored_count() {
        let (mut cache, _dir) = cache_with(vec![site("a", 0)]);
        cache.counts.set("a", 3).unwrap();
        cache.websites[0].count = 3;

        assert_eq!(cache.record_access("a").unwrap(), Some(4));
        assert_eq!(cache.counts.get("a").unwrap(), 4);
        assert!(cache.last_error().is_none());
    }

    #[test]
    fn test_record_access_unknown_id_is_noop() {
        let (mut cache, _dir) = cache_with(vec![site("a", 0)]);

        assert_eq!(cache.record_access("zzz").unwrap(), None);
        assert!(cache.counts.all().unwrap().is_empty());
    }
}
