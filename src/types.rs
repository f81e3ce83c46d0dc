//! Core domain types: game concepts and screen kinds.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScreenforgeError};

/// The kind of mobile screen to depict in a generated screenshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScreenType {
    /// Title screen with play/settings buttons.
    MainMenu,
    /// Mid-action gameplay with HUD.
    Gameplay,
    /// Inventory or equipment management screen.
    Inventory,
    /// Level or world selection map.
    LevelSelect,
    /// Game over / victory summary screen.
    GameOver,
    /// Dialogue or story cutscene screen.
    Dialogue,
}

impl ScreenType {
    /// All screen types, in presentation order.
    pub const ALL: [ScreenType; 6] = [
        Self::MainMenu,
        Self::Gameplay,
        Self::Inventory,
        Self::LevelSelect,
        Self::GameOver,
        Self::Dialogue,
    ];

    /// Human-readable label, also used verbatim in image prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MainMenu => "Main Menu",
            Self::Gameplay => "Gameplay Action",
            Self::Inventory => "Inventory/Equipment",
            Self::LevelSelect => "Level Selection",
            Self::GameOver => "Game Over/Victory",
            Self::Dialogue => "Dialogue/Story",
        }
    }

    /// Filesystem-safe slug for output filenames.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::MainMenu => "main-menu",
            Self::Gameplay => "gameplay",
            Self::Inventory => "inventory",
            Self::LevelSelect => "level-select",
            Self::GameOver => "game-over",
            Self::Dialogue => "dialogue",
        }
    }
}

impl std::fmt::Display for ScreenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A structured creative brief for a mobile game.
///
/// Produced once per user idea and reused for every screenshot request so all
/// generated screens share the same art direction. Field names follow the
/// wire format of the concept endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConcept {
    /// Game title.
    pub title: String,
    /// Game genre.
    pub genre: String,
    /// Art style, e.g. "Low poly", "Pixel art", "Watercolor".
    pub art_style: String,
    /// Detailed description of visual atmosphere, lighting, and textures.
    pub visual_description: String,
    /// Color palette, e.g. "Gold and Black".
    pub color_palette: String,
    /// Core gameplay mechanic.
    pub gameplay_mechanic: String,
}

impl GameConcept {
    /// Validates that every field is non-empty after trimming.
    ///
    /// A concept is all-or-nothing: a partially populated one is never
    /// returned to callers.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        for (name, value) in [
            ("title", &self.title),
            ("genre", &self.genre),
            ("artStyle", &self.art_style),
            ("visualDescription", &self.visual_description),
            ("colorPalette", &self.color_palette),
            ("gameplayMechanic", &self.gameplay_mechanic),
        ] {
            if value.trim().is_empty() {
                missing.push(name);
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ScreenforgeError::Validation(format!(
                "missing or empty fields: {}",
                missing.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_concept() -> GameConcept {
        GameConcept {
            title: "Potion Parlor".into(),
            genre: "Puzzle".into(),
            art_style: "Watercolor".into(),
            visual_description: "Soft washes of color over a cozy apothecary shelf".into(),
            color_palette: "Lavender and Honey".into(),
            gameplay_mechanic: "Sort potions by hue before the timer runs out".into(),
        }
    }

    #[test]
    fn test_screen_type_labels() {
        assert_eq!(ScreenType::MainMenu.label(), "Main Menu");
        assert_eq!(ScreenType::Gameplay.label(), "Gameplay Action");
        assert_eq!(ScreenType::Inventory.label(), "Inventory/Equipment");
        assert_eq!(ScreenType::LevelSelect.label(), "Level Selection");
        assert_eq!(ScreenType::GameOver.label(), "Game Over/Victory");
        assert_eq!(ScreenType::Dialogue.label(), "Dialogue/Story");
    }

    #[test]
    fn test_screen_type_all_is_exhaustive() {
        assert_eq!(ScreenType::ALL.len(), 6);
        let slugs: Vec<_> = ScreenType::ALL.iter().map(|s| s.slug()).collect();
        let mut deduped = slugs.clone();
        deduped.dedup();
        assert_eq!(slugs, deduped);
    }

    #[test]
    fn test_concept_wire_format_is_camel_case() {
        let json = serde_json::to_value(sample_concept()).unwrap();
        assert!(json.get("artStyle").is_some());
        assert!(json.get("visualDescription").is_some());
        assert!(json.get("colorPalette").is_some());
        assert!(json.get("gameplayMechanic").is_some());
        assert!(json.get("art_style").is_none());
    }

    #[test]
    fn test_validate_accepts_complete_concept() {
        assert!(sample_concept().validate().is_ok());
    }

    #[test]
    fn test_validate_reports_every_empty_field() {
        let mut concept = sample_concept();
        concept.genre = String::new();
        concept.color_palette = "   ".into();

        let err = concept.validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("genre"));
        assert!(msg.contains("colorPalette"));
        assert!(!msg.contains("title"));
    }
}
