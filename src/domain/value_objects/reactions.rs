//! Reaction map value object.
//!
//! A message's reactions are a mapping from emoji to the set of users who
//! applied it. Toggling never mutates a stored map in place: it takes the
//! current snapshot and produces the next one, which the caller writes back
//! with a version check.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Emoji → reacting user IDs.
///
/// Invariant: no emoji key maps to an empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, BTreeSet<i64>>")]
pub struct ReactionMap(BTreeMap<String, BTreeSet<i64>>);

/// Whether a toggle added or removed the user's reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    Added,
    Removed,
}

impl ToggleOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
        }
    }
}

/// Result of toggling one (emoji, user) pair on a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionToggle {
    /// The new snapshot to persist
    pub reactions: ReactionMap,
    pub outcome: ToggleOutcome,
    /// Number of users left under the emoji (0 when the key was removed)
    pub count: usize,
}

impl ReactionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the snapshot that results from `user_id` toggling `emoji`.
    pub fn toggle(&self, emoji: &str, user_id: i64) -> ReactionToggle {
        let mut next = self.0.clone();

        let outcome = match next.get_mut(emoji) {
            Some(users) => {
                if users.remove(&user_id) {
                    ToggleOutcome::Removed
                } else {
                    users.insert(user_id);
                    ToggleOutcome::Added
                }
            }
            None => {
                next.insert(emoji.to_string(), BTreeSet::from([user_id]));
                ToggleOutcome::Added
            }
        };

        if next.get(emoji).is_some_and(BTreeSet::is_empty) {
            next.remove(emoji);
        }

        let reactions = Self(next);
        let count = reactions.count(emoji);

        ReactionToggle {
            reactions,
            outcome,
            count,
        }
    }

    pub fn count(&self, emoji: &str) -> usize {
        self.0.get(emoji).map_or(0, BTreeSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<i64>)> {
        self.0.iter().map(|(emoji, users)| (emoji.as_str(), users))
    }
}

impl TryFrom<BTreeMap<String, BTreeSet<i64>>> for ReactionMap {
    type Error = &'static str;

    fn try_from(map: BTreeMap<String, BTreeSet<i64>>) -> Result<Self, Self::Error> {
        // Stored rows written before the invariant held may carry empty sets
        Ok(Self(map.into_iter().filter(|(_, users)| !users.is_empty()).collect()))
    }
}

impl<const N: usize> From<[(&str, &[i64]); N]> for ReactionMap {
    fn from(entries: [(&str, &[i64]); N]) -> Self {
        Self(
            entries
                .into_iter()
                .filter(|(_, users)| !users.is_empty())
                .map(|(emoji, users)| (emoji.to_string(), users.iter().copied().collect()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const THUMBS_UP: &str = "👍";

    #[test]
    fn test_toggle_adds_to_empty_map() {
        let toggle = ReactionMap::new().toggle(THUMBS_UP, 1);

        assert_eq!(toggle.outcome, ToggleOutcome::Added);
        assert_eq!(toggle.count, 1);
        assert_eq!(toggle.reactions, ReactionMap::from([(THUMBS_UP, &[1][..])]));
    }

    #[test]
    fn test_toggle_last_user_removes_key() {
        let map = ReactionMap::from([(THUMBS_UP, &[1][..])]);

        let toggle = map.toggle(THUMBS_UP, 1);

        assert_eq!(toggle.outcome, ToggleOutcome::Removed);
        assert_eq!(toggle.count, 0);
        assert!(toggle.reactions.is_empty());
    }

    #[test]
    fn test_toggle_other_user_after_removal() {
        let map = ReactionMap::from([(THUMBS_UP, &[1][..])]);

        let cleared = map.toggle(THUMBS_UP, 1).reactions;
        let toggle = cleared.toggle(THUMBS_UP, 2);

        assert_eq!(toggle.reactions, ReactionMap::from([(THUMBS_UP, &[2][..])]));
    }

    #[test]
    fn test_toggle_twice_restores_snapshot() {
        let map = ReactionMap::from([(THUMBS_UP, &[1, 2][..]), ("🎉", &[3][..])]);

        for (emoji, user) in [(THUMBS_UP, 1), (THUMBS_UP, 9), ("🎉", 3), ("🔥", 4)] {
            let once = map.toggle(emoji, user).reactions;
            let twice = once.toggle(emoji, user).reactions;
            assert_eq!(twice, map, "toggle({emoji}, {user}) twice");
        }
    }

    #[test]
    fn test_toggle_leaves_input_snapshot_untouched() {
        let map = ReactionMap::from([(THUMBS_UP, &[1][..])]);
        let _ = map.toggle(THUMBS_UP, 1);
        assert_eq!(map.count(THUMBS_UP), 1);
    }

    #[test]
    fn test_no_empty_sets_after_toggle_sequence() {
        let mut map = ReactionMap::new();
        let ops = [
            ("a", 1), ("a", 2), ("b", 1), ("a", 1), ("b", 1), ("a", 2), ("c", 3), ("c", 3),
        ];
        for (emoji, user) in ops {
            map = map.toggle(emoji, user).reactions;
            assert!(map.iter().all(|(_, users)| !users.is_empty()));
        }
        assert!(map.is_empty());
    }

    #[test]
    fn test_deserialize_drops_empty_sets() {
        let map: ReactionMap = serde_json::from_str(r#"{"👍": [1, 2], "😢": []}"#).unwrap();
        assert_eq!(map.iter().map(|(emoji, _)| emoji).collect::<Vec<_>>(), vec![THUMBS_UP]);
        assert_eq!(map.count(THUMBS_UP), 2);
    }
}
