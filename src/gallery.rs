//! In-memory gallery of resolved screenshots.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::image::types::Screenshot;
use crate::types::ScreenType;

/// One resolved screenshot in the gallery.
///
/// Entries are immutable after creation; the screenshot inside is always
/// fully resolved, so rendering or saving an entry needs no network access.
#[derive(Debug, Clone)]
pub struct GalleryEntry {
    /// Unique entry id.
    pub id: Uuid,
    /// Which screen this image depicts.
    pub screen_type: ScreenType,
    /// The resolved image.
    pub screenshot: Screenshot,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
}

impl GalleryEntry {
    /// Creates a new entry with a fresh id.
    pub fn new(screen_type: ScreenType, screenshot: Screenshot) -> Self {
        Self {
            id: Uuid::new_v4(),
            screen_type,
            screenshot,
            created_at: Utc::now(),
        }
    }
}

/// Ordered collection of generated screenshots, most recent first.
///
/// All mutations go through one lock, so two pipelines finishing at the same
/// time cannot lose each other's insert.
#[derive(Debug, Default)]
pub struct Gallery {
    entries: Mutex<Vec<GalleryEntry>>,
}

impl Gallery {
    /// Creates an empty gallery.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends an entry and returns its id.
    pub fn insert(&self, entry: GalleryEntry) -> Uuid {
        let id = entry.id;
        let mut entries = self.entries.lock().expect("gallery lock poisoned");
        entries.insert(0, entry);
        id
    }

    /// Removes the entry with the given id. Returns whether it existed.
    pub fn remove(&self, id: Uuid) -> bool {
        let mut entries = self.entries.lock().expect("gallery lock poisoned");
        let before = entries.len();
        entries.retain(|e| e.id != id);
        entries.len() != before
    }

    /// Returns a snapshot of all entries, most recent first.
    pub fn entries(&self) -> Vec<GalleryEntry> {
        self.entries.lock().expect("gallery lock poisoned").clone()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("gallery lock poisoned").len()
    }

    /// True if the gallery holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::types::ImageFormat;

    fn entry(screen_type: ScreenType) -> GalleryEntry {
        GalleryEntry::new(
            screen_type,
            Screenshot {
                data: vec![1, 2, 3],
                format: ImageFormat::Png,
            },
        )
    }

    #[test]
    fn test_insert_prepends() {
        let gallery = Gallery::new();
        let a = gallery.insert(entry(ScreenType::MainMenu));
        let b = gallery.insert(entry(ScreenType::Gameplay));

        let entries = gallery.entries();
        assert_eq!(entries.len(), 2);
        // Most recent first: [B, A].
        assert_eq!(entries[0].id, b);
        assert_eq!(entries[1].id, a);
    }

    #[test]
    fn test_remove_by_id() {
        let gallery = Gallery::new();
        let a = gallery.insert(entry(ScreenType::MainMenu));
        let b = gallery.insert(entry(ScreenType::Gameplay));

        assert!(gallery.remove(a));
        let entries = gallery.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, b);

        // Removing again is a no-op.
        assert!(!gallery.remove(a));
        assert_eq!(gallery.len(), 1);
    }

    #[test]
    fn test_ids_are_unique() {
        let gallery = Gallery::new();
        let a = gallery.insert(entry(ScreenType::MainMenu));
        let b = gallery.insert(entry(ScreenType::MainMenu));
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_gallery() {
        let gallery = Gallery::new();
        assert!(gallery.is_empty());
        assert!(gallery.entries().is_empty());
    }
}
