//! Orchestrates the whole pipeline: concept, screenshots, gallery.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::concept::ConceptClient;
use crate::error::{Result, ScreenforgeError};
use crate::gallery::{Gallery, GalleryEntry};
use crate::image::client::ImageClient;
use crate::image::types::Screenshot;
use crate::types::{GameConcept, ScreenType};

#[derive(Debug, Default)]
struct ConceptState {
    current: Option<GameConcept>,
    /// Bumped whenever a new concept is requested; screenshots started under
    /// an older epoch are discarded instead of entering the gallery.
    epoch: u64,
}

/// The pipeline front door: holds the current concept, the gallery, and a
/// per-screen-type in-flight guard.
///
/// Clients are injected at construction; nothing reads ambient globals after
/// that point.
pub struct Studio {
    concepts: ConceptClient,
    images: ImageClient,
    gallery: Gallery,
    state: Mutex<ConceptState>,
    in_flight: Mutex<HashSet<ScreenType>>,
}

impl Studio {
    /// Creates a studio from preconfigured clients.
    pub fn new(concepts: ConceptClient, images: ImageClient) -> Self {
        Self {
            concepts,
            images,
            gallery: Gallery::new(),
            state: Mutex::new(ConceptState::default()),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Creates a studio with both clients built from the environment token.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(
            ConceptClient::builder().build()?,
            ImageClient::builder().build()?,
        ))
    }

    /// The gallery of resolved screenshots.
    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    /// The currently active concept, if one has been generated.
    pub fn current_concept(&self) -> Option<GameConcept> {
        self.state.lock().expect("state lock poisoned").current.clone()
    }

    /// Requests a new concept, replacing and invalidating the current one.
    ///
    /// The old concept is discarded as soon as the request starts, so
    /// screenshots still in flight for it can no longer reach the gallery.
    pub async fn new_concept(&self, idea: &str) -> Result<GameConcept> {
        let epoch = {
            let mut state = self.state.lock().expect("state lock poisoned");
            state.current = None;
            state.epoch += 1;
            state.epoch
        };

        let concept = self.concepts.request_concept(idea).await?;

        let mut state = self.state.lock().expect("state lock poisoned");
        if state.epoch == epoch {
            state.current = Some(concept.clone());
        }
        Ok(concept)
    }

    /// Generates a screenshot of the given screen for the current concept
    /// and adds it to the gallery.
    ///
    /// At most one generation per screen type runs at a time; a second
    /// request while one is in flight fails fast with [`ScreenforgeError::Busy`]
    /// instead of submitting a duplicate job. A failure here leaves the
    /// concept intact so only the image step needs retrying.
    pub async fn generate_screenshot(&self, screen_type: ScreenType) -> Result<GalleryEntry> {
        let (epoch, concept) = {
            let state = self.state.lock().expect("state lock poisoned");
            let concept = state.current.clone().ok_or_else(|| {
                ScreenforgeError::InvalidRequest("generate a concept first".into())
            })?;
            (state.epoch, concept)
        };

        let _guard = self.claim(screen_type)?;
        let screenshot = self.images.generate(&concept, screen_type).await?;
        self.commit(epoch, screen_type, screenshot)
    }

    /// Marks a screen type as in flight; released when the guard drops.
    fn claim(&self, screen_type: ScreenType) -> Result<InFlightGuard<'_>> {
        let mut in_flight = self.in_flight.lock().expect("in-flight lock poisoned");
        if !in_flight.insert(screen_type) {
            return Err(ScreenforgeError::Busy(screen_type.label().into()));
        }
        Ok(InFlightGuard {
            set: &self.in_flight,
            screen_type,
        })
    }

    /// Inserts a resolved screenshot unless the concept changed underneath it.
    fn commit(
        &self,
        epoch: u64,
        screen_type: ScreenType,
        screenshot: Screenshot,
    ) -> Result<GalleryEntry> {
        let state = self.state.lock().expect("state lock poisoned");
        if state.epoch != epoch {
            tracing::warn!(screen = %screen_type, "concept replaced mid-generation, discarding screenshot");
            return Err(ScreenforgeError::InvalidRequest(
                "concept was replaced while generating; stale screenshot discarded".into(),
            ));
        }
        drop(state);

        let entry = GalleryEntry::new(screen_type, screenshot);
        self.gallery.insert(entry.clone());
        Ok(entry)
    }
}

/// RAII release of the in-flight claim, error paths included.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<ScreenType>>,
    screen_type: ScreenType,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .expect("in-flight lock poisoned")
            .remove(&self.screen_type);
    }
}
