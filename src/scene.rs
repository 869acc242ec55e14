//! Scene decks: the images to play and their ground truth.
//!
//! A deck is a JSON file listing rounds. Each round names an image (relative
//! to the deck file), its original pixel size, the labels offered to the
//! player and the target rectangles in original-image pixels.

use crate::error::SceneError;
use crate::geometry::ImageSize;
use crate::model::{GroundTruthAnnotation, Region};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRound {
    pub image: PathBuf,
    pub width: f32,
    pub height: f32,
    pub labels: Vec<String>,
    #[serde(default)]
    pub targets: Vec<GroundTruthAnnotation>,
}

impl SceneRound {
    pub fn image_size(&self) -> ImageSize {
        ImageSize::new(self.width, self.height)
    }

    fn validate(&self, index: usize) -> Result<(), SceneError> {
        if self.labels.is_empty() {
            return Err(SceneError::InvalidRound {
                index,
                message: "label set is empty".to_string(),
            });
        }
        if !self.image_size().is_measurable() {
            return Err(SceneError::InvalidRound {
                index,
                message: format!("image size {}x{} is not positive", self.width, self.height),
            });
        }
        for target in &self.targets {
            if !self.labels.contains(&target.label) {
                log::warn!(
                    "Round {}: target {} has label '{}' outside the label set",
                    index,
                    target.id,
                    target.label
                );
            }
            if target.bounds().is_none() {
                log::warn!(
                    "Round {}: target {} has fewer than two corners and will never score",
                    index,
                    target.id
                );
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDeck {
    pub rounds: Vec<SceneRound>,
}

impl SceneDeck {
    /// Load a deck, resolving image paths against the deck's directory.
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let data = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut deck = Self::from_json(&data)?;
        if let Some(dir) = path.parent() {
            for round in &mut deck.rounds {
                if round.image.is_relative() {
                    round.image = dir.join(&round.image);
                }
            }
        }
        log::info!(
            "Loaded {} rounds from {}",
            deck.rounds.len(),
            path.display()
        );
        Ok(deck)
    }

    /// Parse and validate a deck. Image paths are left as written.
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        let deck: SceneDeck = serde_json::from_str(json)?;
        if deck.rounds.is_empty() {
            return Err(SceneError::Empty);
        }
        for (index, round) in deck.rounds.iter().enumerate() {
            round.validate(index)?;
        }
        Ok(deck)
    }
}
