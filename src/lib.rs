#![warn(missing_docs)]
//! Screenforge - mobile game concepts and screenshots via AI endpoints.
//!
//! Turns a free-text game idea into a structured [`GameConcept`] through a
//! chat-completions endpoint, then generates 9:16 mobile game screenshots for
//! chosen [`ScreenType`]s through an asynchronous image endpoint
//! (submit, poll, resolve), collecting the results in an in-memory
//! [`Gallery`].
//!
//! # Quick Start
//!
//! ```no_run
//! use screenforge::{ScreenType, Studio};
//!
//! #[tokio::main]
//! async fn main() -> screenforge::Result<()> {
//!     let studio = Studio::from_env()?;
//!
//!     let concept = studio.new_concept("a cozy potion-sorting puzzle").await?;
//!     println!("concept: {}", concept.title);
//!
//!     let entry = studio.generate_screenshot(ScreenType::Gameplay).await?;
//!     entry.screenshot.save("gameplay.png")?;
//!     Ok(())
//! }
//! ```
//!
//! The clients can also be used on their own: [`ConceptClient`] for concepts,
//! [`ImageClient`] for the submit/poll/resolve pipeline. Both read the API
//! token from `MODELSCOPE_API_TOKEN` unless one is passed explicitly.

pub mod concept;
pub mod config;
mod error;
pub mod gallery;
pub mod image;
pub mod studio;
pub mod types;

pub use concept::{ConceptClient, ConceptClientBuilder};
pub use error::{Result, ScreenforgeError};
pub use gallery::{Gallery, GalleryEntry};
pub use image::{
    ImageClient, ImageClientBuilder, ImageFormat, ImageOutput, ImageResolver, Screenshot,
    TaskStatus,
};
pub use studio::Studio;
pub use types::{GameConcept, ScreenType};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::concept::ConceptClient;
    pub use crate::error::{Result, ScreenforgeError};
    pub use crate::gallery::{Gallery, GalleryEntry};
    pub use crate::image::{ImageClient, Screenshot};
    pub use crate::studio::Studio;
    pub use crate::types::{GameConcept, ScreenType};
}
