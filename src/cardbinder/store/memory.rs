use super::KeyValueStore;
use crate::error::Result;
use std::collections::HashMap;

/// In-memory storage for testing and development.
/// Does NOT persist data.
#[derive(Default, Debug, Clone)]
pub struct InMemoryStore {
    values: HashMap<String, String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::Card;
    use crate::persist::{PersistedState, STATE_KEY};

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        /// Seeds a saved binder with `count` cards packed from slot 0.
        pub fn with_cards(mut self, layout: usize, count: usize) -> Self {
            let capacity = layout * layout;
            let total = count.div_ceil(capacity).max(1) * capacity;
            let mut cards_data: Vec<Option<Card>> = (0..count)
                .map(|i| {
                    Some(
                        Card::new(format!("https://img.example/{}.png", i), format!("Card {}", i + 1))
                            .with_hue(Some((i * 30 % 360) as f64)),
                    )
                })
                .collect();
            cards_data.resize(total, None);
            self.with_state(PersistedState::current(cards_data, Some(layout as i64), 1))
        }

        pub fn with_state(mut self, state: PersistedState) -> Self {
            let json = serde_json::to_string(&state).unwrap();
            self.store.set(STATE_KEY, &json).unwrap();
            self
        }

        pub fn with_raw(mut self, key: &str, value: &str) -> Self {
            self.store.set(key, value).unwrap();
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let mut store = InMemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.is_empty());
    }
}
