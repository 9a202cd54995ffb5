//! Batched, per-request loading of users.
//!
//! The attendance lists of a single event can reference the same user several
//! times across lists, and several events in one query can reference the same
//! users again. The loader makes sure every user is fetched at most once per
//! request: all keys of one list are fetched with a single query, and the
//! results (including "does not exist") are cached for the lifetime of the
//! request context. There is deliberately no cross-request caching.

use std::collections::{HashMap, HashSet};

use tokio::sync::Mutex;

use crate::{
    db::Db,
    model::Key,
};

use super::{
    err::{internal_server_error, ApiResult},
    model::user::User,
};


type Cache = HashMap<Key, Option<User>>;

pub(crate) struct UserLoader {
    cache: Mutex<Cache>,
}

impl UserLoader {
    pub(crate) fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Loads a single user, consulting and filling the cache. `Ok(None)`
    /// means the user does not exist.
    pub(crate) async fn load(&self, db: &Db, key: Key) -> ApiResult<Option<User>> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.get(&key) {
            return Ok(cached.clone());
        }

        let query = format!("select {} from users where id = $1", User::COLUMNS);
        let user = db.query_opt(&query, &[&key]).await?
            .map(|row| User::from_row(&row));
        cache.insert(key, user.clone());
        Ok(user)
    }

    /// Resolves all given keys to users, preserving order. Keys that are
    /// already cached are not fetched again; all remaining ones are fetched
    /// with a single query.
    ///
    /// A key that refers to no existing user is a broken reference in the
    /// stored data and fails the whole lookup.
    pub(crate) async fn load_many(&self, db: &Db, keys: &[Key]) -> ApiResult<Vec<User>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut cache = self.cache.lock().await;

        let missing = missing_keys(&cache, keys);
        if !missing.is_empty() {
            let query = format!("select {} from users where id = any($1)", User::COLUMNS);
            let rows = db.query(&query, &[&missing]).await?;

            // The cache must only be touched after the query succeeded. A
            // transient DB error has to leave the keys uncached, otherwise a
            // later lookup in the same request would report existing users
            // as missing.
            apply_fetched(&mut cache, &missing, rows.iter().map(User::from_row));
        }

        resolve_from_cache(&cache, keys)
    }
}

/// Returns the keys that have to be fetched, i.e. all given keys that are
/// not cached yet, deduplicated.
fn missing_keys(cache: &Cache, keys: &[Key]) -> Vec<Key> {
    keys.iter()
        .copied()
        .filter(|key| !cache.contains_key(key))
        .collect::<HashSet<_>>()
        .into_iter()
        .collect()
}

/// Inserts the result of one batch fetch into the cache. Every fetched key
/// not part of `users` does not exist; that is remembered too, so dangling
/// keys are not looked up again.
fn apply_fetched(cache: &mut Cache, fetched: &[Key], users: impl Iterator<Item = User>) {
    for user in users {
        cache.insert(user.key, Some(user));
    }
    for key in fetched {
        cache.entry(*key).or_insert(None);
    }
}

/// Maps the ordered key list to full users, entirely from the cache. Must
/// only be called once all keys are cached.
fn resolve_from_cache(cache: &Cache, keys: &[Key]) -> ApiResult<Vec<User>> {
    keys.iter()
        .map(|key| {
            cache.get(key)
                .expect("user key neither fetched nor cached")
                .clone()
                .ok_or_else(|| internal_server_error!(
                    key = "event.broken-user-reference",
                    "user list references non-existing user {key:?}",
                ))
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    fn user(key: u64) -> User {
        User {
            key: Key(key),
            username: format!("user{key}"),
            display_name: format!("User {key}"),
            email: None,
        }
    }

    #[test]
    fn empty_key_list_needs_no_fetch() {
        let cache = Cache::new();
        assert!(missing_keys(&cache, &[]).is_empty());
        assert!(resolve_from_cache(&cache, &[]).unwrap().is_empty());
    }

    #[test]
    fn cached_and_duplicate_keys_are_fetched_once() {
        let mut cache = Cache::new();
        cache.insert(Key(1), Some(user(1)));

        let missing = missing_keys(&cache, &[Key(1), Key(2), Key(2), Key(3)]);
        assert_eq!(missing.len(), 2);
        assert!(missing.contains(&Key(2)));
        assert!(missing.contains(&Key(3)));
    }

    #[test]
    fn resolution_preserves_key_order() {
        let mut cache = Cache::new();
        apply_fetched(&mut cache, &[Key(1), Key(2)], vec![user(2), user(1)].into_iter());

        let users = resolve_from_cache(&cache, &[Key(2), Key(1), Key(2)]).unwrap();
        assert_eq!(
            users.iter().map(|u| u.key).collect::<Vec<_>>(),
            [Key(2), Key(1), Key(2)],
        );
    }

    #[test]
    fn dangling_reference_is_an_error() {
        let mut cache = Cache::new();
        apply_fetched(&mut cache, &[Key(1), Key(2)], vec![user(1)].into_iter());

        assert!(matches!(cache.get(&Key(2)), Some(None)));
        assert!(resolve_from_cache(&cache, &[Key(1), Key(2)]).is_err());
    }

    #[test]
    fn failed_fetch_leaves_keys_uncached() {
        // When the batch query errors, `load_many` bails before
        // `apply_fetched`, so the keys must still be absent from the cache
        // (not marked as non-existing). A later lookup then fetches them
        // again instead of reporting broken references for existing users.
        let cache = Cache::new();
        let keys = [Key(1), Key(2)];
        let missing = missing_keys(&cache, &keys);
        assert_eq!(missing.len(), 2);

        assert!(cache.get(&Key(1)).is_none());
        assert!(cache.get(&Key(2)).is_none());
        assert_eq!(missing_keys(&cache, &keys).len(), 2);
    }
}
