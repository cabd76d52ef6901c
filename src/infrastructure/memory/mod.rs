//! In-Memory Store
//!
//! A process-local implementation of every repository trait, used for
//! development, tests and single-node deployments without PostgreSQL.
//!
//! Messages live behind one lock so that read-state transitions and
//! version-checked reaction writes are atomic with respect to each other.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::{
    Channel, ChannelRepository, MentionQuery, MentionRepository, MentionSlice, Message,
    MessageRepository, PageRequest, ReactionMap, SortOrder, User, UserDirectory,
};
use crate::shared::error::AppError;

/// Thread-safe in-memory storage for users, channels and messages.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<BTreeMap<i64, User>>,
    channels: RwLock<BTreeMap<i64, Channel>>,
    messages: RwLock<HashMap<i64, Message>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user.
    pub fn insert_user(&self, user: User) {
        self.users.write().insert(user.id, user);
    }

    /// Insert or replace a channel.
    pub fn insert_channel(&self, channel: Channel) {
        self.channels.write().insert(channel.id, channel);
    }

    /// Insert or replace a message as-is, keeping its timestamp and read flag.
    pub fn insert_message(&self, message: Message) {
        self.messages.write().insert(message.id, message);
    }

    /// Snapshot of a stored message.
    pub fn message(&self, id: i64) -> Option<Message> {
        self.messages.read().get(&id).cloned()
    }

    pub fn message_count(&self) -> usize {
        self.messages.read().len()
    }

    /// Force the shared read flag of a message. No-op for unknown IDs.
    pub fn set_read(&self, id: i64, read: bool) {
        if let Some(message) = self.messages.write().get_mut(&id) {
            message.read = read;
        }
    }
}

/// Mentions of `user_id` in `messages` that pass `keep`, ordered by `sort`.
fn sorted_mentions<'a>(
    messages: &'a HashMap<i64, Message>,
    user_id: i64,
    sort: SortOrder,
    keep: impl Fn(&Message) -> bool,
) -> Vec<&'a Message> {
    let mut found: Vec<&Message> = messages
        .values()
        .filter(|m| m.mentions_user(user_id) && keep(m))
        .collect();

    found.sort_by_key(|m| (m.created_at, m.id));
    if sort == SortOrder::Newest {
        found.reverse();
    }
    found
}

fn page_of<T>(items: Vec<T>, page: &PageRequest) -> impl Iterator<Item = T> {
    items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.users.read().get(&id).cloned())
    }

    async fn find_by_handle(&self, handle: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.username == handle)
            .cloned())
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<User>, AppError> {
        let needle = query.to_lowercase();
        let mut found: Vec<User> = self
            .users
            .read()
            .values()
            .filter(|u| u.username.to_lowercase().contains(&needle))
            .cloned()
            .collect();

        found.sort_by(|a, b| a.username.cmp(&b.username));
        found.truncate(limit as usize);
        Ok(found)
    }
}

#[async_trait]
impl ChannelRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Channel>, AppError> {
        Ok(self.channels.read().get(&id).cloned())
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Message>, AppError> {
        Ok(self.message(id))
    }

    async fn create(&self, message: &Message) -> Result<Message, AppError> {
        let mut messages = self.messages.write();
        if messages.contains_key(&message.id) {
            return Err(AppError::Conflict(format!("Message {} already exists", message.id)));
        }
        messages.insert(message.id, message.clone());
        Ok(message.clone())
    }

    async fn update_reactions(
        &self,
        id: i64,
        expected_version: i64,
        reactions: &ReactionMap,
    ) -> Result<bool, AppError> {
        let mut messages = self.messages.write();
        match messages.get_mut(&id) {
            Some(message) if message.version == expected_version => {
                message.reactions = reactions.clone();
                message.version += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl MentionRepository for MemoryStore {
    async fn find_mentions(&self, user_id: i64, query: &MentionQuery) -> Result<MentionSlice, AppError> {
        let messages = self.messages.read();
        let matching = sorted_mentions(&messages, user_id, query.sort, |m| query.filter.matches(m.read));
        let total = matching.len() as u64;

        Ok(MentionSlice {
            messages: page_of(matching, &query.page).cloned().collect(),
            total,
        })
    }

    async fn count_unread(&self, user_id: i64) -> Result<u64, AppError> {
        let count = self
            .messages
            .read()
            .values()
            .filter(|m| !m.read && m.mentions_user(user_id))
            .count();
        Ok(count as u64)
    }

    async fn mark_read(&self, user_id: i64, message_ids: &[i64]) -> Result<u64, AppError> {
        let mut messages = self.messages.write();
        let mut count = 0;
        for id in message_ids {
            if let Some(message) = messages.get_mut(id) {
                if !message.read && message.mentions_user(user_id) {
                    message.read = true;
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    async fn mark_unread_as_read(
        &self,
        user_id: i64,
        window: Option<(PageRequest, SortOrder)>,
    ) -> Result<u64, AppError> {
        let mut messages = self.messages.write();

        let sort = window.map_or(SortOrder::default(), |(_, sort)| sort);
        let unread = sorted_mentions(&messages, user_id, sort, |m| !m.read);
        let selected: Vec<i64> = match window {
            Some((page, _)) => page_of(unread, &page).map(|m| m.id).collect(),
            None => unread.into_iter().map(|m| m.id).collect(),
        };

        for id in &selected {
            if let Some(message) = messages.get_mut(id) {
                message.read = true;
            }
        }
        Ok(selected.len() as u64)
    }

    async fn mark_unread(&self, user_id: i64, message_id: i64) -> Result<bool, AppError> {
        let mut messages = self.messages.write();
        match messages.get_mut(&message_id) {
            Some(message) if message.mentions_user(user_id) => {
                message.read = false;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MentionFilter, MessageTarget};
    use pretty_assertions::assert_eq;

    fn store_with_users(names: &[&str]) -> MemoryStore {
        let store = MemoryStore::new();
        for (i, name) in names.iter().enumerate() {
            store.insert_user(User::new(i as i64 + 1, *name));
        }
        store
    }

    #[tokio::test]
    async fn test_find_by_handle_is_exact() {
        let store = store_with_users(&["bob", "bobby"]);

        let found = store.find_by_handle("bob").await.unwrap();

        assert_eq!(found.map(|u| u.id), Some(1));
        assert!(store.find_by_handle("Bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_limited() {
        let store = store_with_users(&["Bobby", "alice", "bob", "robert", "jbo"]);

        let found = store.search("BO", 2).await.unwrap();

        let names: Vec<_> = found.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["Bobby", "bob"]);
    }

    #[tokio::test]
    async fn test_update_reactions_checks_version() {
        let store = MemoryStore::new();
        store.insert_message(Message::new(1, 1, "hi".into(), MessageTarget::Channel(7), vec![]));
        let next = ReactionMap::new().toggle("👍", 2).reactions;

        assert!(store.update_reactions(1, 0, &next).await.unwrap());
        assert!(!store.update_reactions(1, 0, &ReactionMap::new()).await.unwrap());
        assert!(!store.update_reactions(99, 0, &next).await.unwrap());

        let stored = store.message(1).unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.reactions, next);
    }

    #[tokio::test]
    async fn test_mark_read_skips_other_users_and_read_messages() {
        let store = MemoryStore::new();
        store.insert_message(Message::new(1, 1, "@bob".into(), MessageTarget::Channel(7), vec![2]));
        store.insert_message(Message::new(2, 1, "@carol".into(), MessageTarget::Channel(7), vec![3]));
        store.insert_message(Message::new(3, 1, "@bob".into(), MessageTarget::Channel(7), vec![2]));
        store.set_read(3, true);

        let count = store.mark_read(2, &[1, 2, 3, 4]).await.unwrap();

        assert_eq!(count, 1);
        assert!(!store.message(2).unwrap().read);
    }

    #[tokio::test]
    async fn test_find_mentions_counts_whole_filtered_set() {
        let store = MemoryStore::new();
        for id in 1..=4 {
            store.insert_message(Message::new(id, 1, "@bob".into(), MessageTarget::Channel(7), vec![2]));
        }
        store.set_read(4, true);
        let query = MentionQuery {
            filter: MentionFilter::Unread,
            sort: SortOrder::Oldest,
            page: PageRequest::new(2, 2),
        };

        let slice = store.find_mentions(2, &query).await.unwrap();

        assert_eq!(slice.total, 3);
        assert_eq!(slice.messages.len(), 1);
    }
}
