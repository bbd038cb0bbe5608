//! Bounded in-memory store of rendered images, keyed by piece id.
//!
//! Nothing is persisted. When full, the oldest image is evicted.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct Shelves {
    images: HashMap<String, Arc<Vec<u8>>>,
    order: VecDeque<String>,
}

#[derive(Debug)]
pub struct Gallery {
    capacity: usize,
    shelves: RwLock<Shelves>,
}

impl Gallery {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            shelves: RwLock::new(Shelves::default()),
        }
    }

    pub async fn insert(&self, id: String, png: Vec<u8>) {
        let mut shelves = self.shelves.write().await;
        if shelves.images.insert(id.clone(), Arc::new(png)).is_none() {
            shelves.order.push_back(id);
        }
        while shelves.order.len() > self.capacity {
            if let Some(oldest) = shelves.order.pop_front() {
                debug!(id = %oldest, "evicting image");
                shelves.images.remove(&oldest);
            }
        }
    }

    pub async fn get(&self, id: &str) -> Option<Arc<Vec<u8>>> {
        self.shelves.read().await.images.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.shelves.read().await.images.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn evicts_oldest_first() {
        let gallery = Gallery::new(2);
        gallery.insert("a".into(), vec![1]).await;
        gallery.insert("b".into(), vec![2]).await;
        gallery.insert("c".into(), vec![3]).await;

        assert_eq!(gallery.len().await, 2);
        assert!(gallery.get("a").await.is_none());
        assert_eq!(gallery.get("c").await.as_deref(), Some(&vec![3]));
    }

    #[tokio::test]
    async fn reinserting_keeps_one_entry() {
        let gallery = Gallery::new(4);
        gallery.insert("a".into(), vec![1]).await;
        gallery.insert("a".into(), vec![9]).await;
        assert_eq!(gallery.len().await, 1);
        assert_eq!(gallery.get("a").await.as_deref(), Some(&vec![9]));
        assert!(!gallery.is_empty().await);
    }
}
