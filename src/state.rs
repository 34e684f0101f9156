use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use crate::hn_client::StorySource;
use crate::models::{Category, Story};
use crate::query::{Notify, QueryCache, QueryState};

/// Rows shown per category.
pub const VISIBLE_STORIES: usize = 10;

/// First [`VISIBLE_STORIES`] ids, last one first.
pub fn visible_story_ids(ids: &[u64]) -> Vec<u64> {
    ids.iter().take(VISIBLE_STORIES).rev().copied().collect()
}

/// What the root view should draw for the selected category.
#[derive(Debug, Clone, PartialEq)]
pub enum ListView {
    Loading,
    Error(String),
    Loaded(Vec<u64>),
}

pub struct AppState {
    category: Category,
    story_ids: QueryCache<Category, Vec<u64>>,
    stories: QueryCache<u64, Story>,
}

impl AppState {
    pub fn new(source: Arc<dyn StorySource>, category: Category, notify: Notify) -> Self {
        let list_source = source.clone();
        let story_ids = QueryCache::new(
            "story_ids",
            Arc::new(move |category: &Category| list_source.fetch_story_ids(*category)),
            notify.clone(),
        );
        let stories = QueryCache::new(
            "stories",
            Arc::new(move |id: &u64| source.fetch_story(*id)),
            notify,
        );

        Self {
            category,
            story_ids,
            stories,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Switch categories and request the new list. Returns false when
    /// `category` is already selected.
    pub fn select_category(&mut self, category: Category) -> bool {
        if self.category == category {
            return false;
        }
        info!(from = ?self.category, to = ?category, "category changed");
        self.category = category;
        self.story_ids.refetch(&category);
        true
    }

    /// Apply finished fetches. Call once per frame before rendering.
    pub fn poll(&mut self) -> usize {
        let lists = self.story_ids.poll();
        if lists > 0 {
            self.prune_stories();
        }
        lists + self.stories.poll()
    }

    /// Forget stories no loaded list shows any more.
    fn prune_stories(&mut self) {
        let visible: HashSet<u64> = self
            .story_ids
            .loaded()
            .flat_map(|ids| ids.iter().take(VISIBLE_STORIES).copied())
            .collect();
        self.stories.retain(|id| visible.contains(id));
    }

    pub fn list_view(&mut self) -> ListView {
        match self.story_ids.query(&self.category) {
            QueryState::Loading => ListView::Loading,
            QueryState::Error(message) => ListView::Error(message.clone()),
            QueryState::Loaded(ids) => ListView::Loaded(visible_story_ids(ids)),
        }
    }

    pub fn is_list_fetching(&self) -> bool {
        self.story_ids.is_fetching(&self.category)
    }

    pub fn story_state(&mut self, id: u64) -> &QueryState<Story> {
        self.stories.query(&id)
    }

    /// Drop everything cached and reload the current category.
    pub fn refresh(&mut self) {
        info!(category = ?self.category, "refresh");
        self.story_ids.invalidate_all();
        self.stories.invalidate_all();
        self.story_ids.query(&self.category);
    }

    /// Poll like the UI does until nothing is in flight.
    #[cfg(test)]
    fn settle(&mut self) {
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        loop {
            self.poll();
            if !self.story_ids.is_busy() && !self.stories.is_busy() {
                break;
            }
            assert!(std::time::Instant::now() < deadline, "fetches still running");
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
    }
}
