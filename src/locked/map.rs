use super::codec::{Group, KeyIndex, decode_group, decode_key_index, encode};
use super::errors::MapError;
use super::retry::{Attempt, DEFAULT_RETRY_DELAY, retry_on_conflict};
use crate::storage::store::{Cluster, ConditionalStore};

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Primary key under which the key index is stored.
pub const KEY_INDEX: &str = "_keys";

/// A cluster-shared map of groups: primary key -> secondary key -> value.
///
/// No locks are taken. Every mutation reads the current blob, changes it in
/// memory and writes it back with a compare-and-swap; a lost race reruns the
/// whole attempt. A primary key is added to the key index after its group is
/// written, and is never taken out again, so the index may list keys whose
/// groups have since been deleted.
#[derive(Clone)]
pub struct LockedGroupMap {
    name: String,
    store: Arc<dyn ConditionalStore>,
    retry_delay: Duration,
}

impl LockedGroupMap {
    /// Binds to the shared structure `name` on `cluster`.
    pub async fn init(cluster: &dyn Cluster, name: &str) -> Result<Self, MapError> {
        let store = cluster.shared_map(name).await.map_err(|e| {
            tracing::error!("Failed to bind shared map {}: {}", name, e);
            MapError::from(e)
        })?;
        Ok(Self::new(name, store))
    }

    pub fn new(name: &str, store: Arc<dyn ConditionalStore>) -> Self {
        Self {
            name: name.to_string(),
            store,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn get_value(&self, primary_key: &str, secondary_key: &str) -> Result<String, MapError> {
        let not_found = || MapError::NotFound(format!("{}/{}", primary_key, secondary_key));
        if primary_key == KEY_INDEX {
            return Err(not_found());
        }
        let Some(blob) = self.store.get(primary_key).await? else {
            return Err(not_found());
        };
        decode_group(&blob)?
            .get(secondary_key)
            .map(str::to_string)
            .ok_or_else(not_found)
    }

    /// All values stored under `primary_key`; empty when the key has no group.
    pub async fn get_group_values(&self, primary_key: &str) -> Result<Vec<String>, MapError> {
        if primary_key == KEY_INDEX {
            return Ok(Vec::new());
        }
        match self.store.get(primary_key).await? {
            Some(blob) => Ok(decode_group(&blob)?.values()),
            None => Ok(Vec::new()),
        }
    }

    /// Every primary key ever added, sorted. May include keys with no data left.
    pub async fn get_all_keys(&self) -> Result<BTreeSet<String>, MapError> {
        match self.store.get(KEY_INDEX).await? {
            Some(blob) => Ok(decode_key_index(&blob)?.into_keys()),
            None => Ok(BTreeSet::new()),
        }
    }

    /// Sets `secondary_key` to `value` in the group at `primary_key`, then
    /// makes sure `primary_key` is in the key index.
    ///
    /// With `allow_replace == false` an existing `secondary_key` is rejected
    /// with [`MapError::User`] and nothing is written.
    pub async fn add_or_replace(
        &self,
        allow_replace: bool,
        primary_key: &str,
        secondary_key: &str,
        value: &str,
    ) -> Result<(), MapError> {
        reject_reserved(primary_key)?;
        let map = self.clone();
        let (primary_key, secondary_key, value) = (
            primary_key.to_string(),
            secondary_key.to_string(),
            value.to_string(),
        );
        run_detached(async move {
            map.write_group(allow_replace, &primary_key, &secondary_key, &value)
                .await?;
            map.index_key(&primary_key).await
        })
        .await
    }

    /// Removes `secondary_key` from the group at `primary_key`.
    ///
    /// Returns true when that was the last entry and the whole group was
    /// deleted. The key index is left alone.
    pub async fn remove(&self, primary_key: &str, secondary_key: &str) -> Result<bool, MapError> {
        reject_reserved(primary_key)?;
        let map = self.clone();
        let (primary_key, secondary_key) = (primary_key.to_string(), secondary_key.to_string());
        run_detached(async move {
            let this = &map;
            let (pk, sk) = (primary_key.as_str(), secondary_key.as_str());
            retry_on_conflict(pk, this.retry_delay, move || this.try_remove(pk, sk)).await
        })
        .await
    }

    async fn write_group(
        &self,
        allow_replace: bool,
        primary_key: &str,
        secondary_key: &str,
        value: &str,
    ) -> Result<(), MapError> {
        retry_on_conflict(primary_key, self.retry_delay, move || {
            self.try_write_group(allow_replace, primary_key, secondary_key, value)
        })
        .await
    }

    async fn index_key(&self, primary_key: &str) -> Result<(), MapError> {
        retry_on_conflict(KEY_INDEX, self.retry_delay, move || {
            self.try_index_key(primary_key)
        })
        .await
    }

    async fn try_write_group(
        &self,
        allow_replace: bool,
        primary_key: &str,
        secondary_key: &str,
        value: &str,
    ) -> Result<Attempt<()>, MapError> {
        let old = self.store.get(primary_key).await?;
        let mut group = match &old {
            Some(blob) => decode_group(blob)?,
            None => Group::new(),
        };
        if !allow_replace && group.contains(secondary_key) {
            return Err(MapError::User(format!("Duplicate instance {}", secondary_key)));
        }
        group.insert(secondary_key, value);
        self.swap(primary_key, old, encode(&group)?).await
    }

    async fn try_index_key(&self, primary_key: &str) -> Result<Attempt<()>, MapError> {
        let old = self.store.get(KEY_INDEX).await?;
        let mut index = match &old {
            Some(blob) => decode_key_index(blob)?,
            None => KeyIndex::default(),
        };
        if !index.insert(primary_key) {
            return Ok(Attempt::Done(()));
        }
        self.swap(KEY_INDEX, old, encode(&index)?).await
    }

    async fn try_remove(
        &self,
        primary_key: &str,
        secondary_key: &str,
    ) -> Result<Attempt<bool>, MapError> {
        let Some(old) = self.store.get(primary_key).await? else {
            return Err(MapError::NotFound(primary_key.to_string()));
        };
        let mut group = decode_group(&old)?;
        if group.remove(secondary_key).is_none() {
            return Err(MapError::NotFound(format!("{}/{}", primary_key, secondary_key)));
        }

        if group.is_empty() {
            // The key stays in the index: dropping it here could race with a
            // concurrent add that has written its group but not yet its index entry.
            if self.store.remove_if_matches(primary_key, &old).await? {
                tracing::trace!("Deleted group {} in {}", primary_key, self.name);
                return Ok(Attempt::Done(true));
            }
            return Ok(Attempt::Conflict);
        }

        Ok(match self.swap(primary_key, Some(old), encode(&group)?).await? {
            Attempt::Done(()) => Attempt::Done(false),
            Attempt::Conflict => Attempt::Conflict,
        })
    }

    /// Creates `key` when nothing was read, otherwise replaces what was read.
    async fn swap(
        &self,
        key: &str,
        old: Option<String>,
        new: String,
    ) -> Result<Attempt<()>, MapError> {
        let applied = match old {
            None => self.store.create_if_absent(key, new).await?.is_none(),
            Some(old) => self.store.replace_if_matches(key, &old, new).await?,
        };
        if applied {
            tracing::trace!("Wrote {} in {}", key, self.name);
            Ok(Attempt::Done(()))
        } else {
            Ok(Attempt::Conflict)
        }
    }
}

fn reject_reserved(primary_key: &str) -> Result<(), MapError> {
    if primary_key == KEY_INDEX {
        return Err(MapError::User(format!("Reserved key {}", primary_key)));
    }
    Ok(())
}

/// Runs an operation on its own task so it completes even if the caller
/// stops waiting for it.
async fn run_detached<T, F>(operation: F) -> Result<T, MapError>
where
    T: Send + 'static,
    F: Future<Output = Result<T, MapError>> + Send + 'static,
{
    tokio::spawn(operation)
        .await
        .map_err(|e| MapError::Internal(format!("operation task failed: {}", e)))?
}
