//! Folk story catalog
//!
//! A small embedded dataset of regional stories with region and theme
//! filtering.

mod types;

pub use types::{FolkStory, Language, Region};

use crate::{Error, Result};

/// Embedded story dataset
const BUILTIN_STORIES: &str = include_str!("../../data/stories.json");

/// Maximum number of themes offered for one region
const MAX_THEMES: usize = 10;

/// Browsable collection of folk stories
#[derive(Debug, Clone)]
pub struct Catalog {
    stories: Vec<FolkStory>,
}

impl Catalog {
    /// Create a catalog from stories
    #[must_use]
    pub const fn new(stories: Vec<FolkStory>) -> Self {
        Self { stories }
    }

    /// Load the embedded dataset
    ///
    /// # Errors
    ///
    /// Returns error if the embedded JSON is invalid
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_STORIES)
    }

    /// Parse a JSON array of stories
    ///
    /// # Errors
    ///
    /// Returns error if the JSON does not match the story schema
    pub fn from_json(json: &str) -> Result<Self> {
        let stories: Vec<FolkStory> = serde_json::from_str(json)?;
        tracing::debug!(count = stories.len(), "loaded story catalog");
        Ok(Self::new(stories))
    }

    /// All stories
    #[must_use]
    pub fn stories(&self) -> &[FolkStory] {
        &self.stories
    }

    /// Look up a story by id
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for unknown ids
    pub fn find(&self, id: &str) -> Result<&FolkStory> {
        self.stories
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::NotFound(format!("story {id}")))
    }

    /// Stories from `region`, optionally narrowed to a theme
    ///
    /// A story matches a theme when its kind contains the theme or its theme
    /// list holds it exactly.
    #[must_use]
    pub fn stories_for(&self, region: Region, theme: Option<&str>) -> Vec<&FolkStory> {
        self.stories
            .iter()
            .filter(|s| s.region == region)
            .filter(|s| theme.is_none_or(|t| s.matches_theme(t)))
            .collect()
    }

    /// Themes offered for a region, in first-seen order
    ///
    /// Each story contributes the first word of its kind plus all of its
    /// themes.
    #[must_use]
    pub fn themes_for(&self, region: Region) -> Vec<String> {
        let mut themes: Vec<String> = Vec::new();

        for story in self.stories.iter().filter(|s| s.region == region) {
            let lead = story.kind.split(' ').next().unwrap_or_default();
            for theme in std::iter::once(lead).chain(story.themes.iter().map(String::as_str)) {
                if !theme.is_empty() && !themes.iter().any(|t| t == theme) {
                    themes.push(theme.to_string());
                }
            }
        }

        themes.truncate(MAX_THEMES);
        themes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(id: &str, region: Region, kind: &str, themes: &[&str]) -> FolkStory {
        FolkStory {
            id: id.to_string(),
            title: id.to_string(),
            region,
            kind: kind.to_string(),
            era: "Ancient".to_string(),
            themes: themes.iter().map(ToString::to_string).collect(),
            summary: String::new(),
        }
    }

    fn sample() -> Catalog {
        Catalog::new(vec![
            story("a", Region::Tamil, "Epic Legend", &["Justice", "Devotion"]),
            story("b", Region::Tamil, "Trickster Tale", &["Wit"]),
            story("c", Region::Bengali, "Epic Legend", &["Courage"]),
            story("d", Region::Tamil, "Moral Fable", &["Devotion"]),
        ])
    }

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert!(!catalog.stories().is_empty());

        for region in Region::ALL {
            assert!(!catalog.stories_for(region, None).is_empty(), "{region} has no stories");
        }
    }

    #[test]
    fn test_builtin_ids_unique() {
        let catalog = Catalog::builtin().unwrap();
        let mut ids: Vec<&str> = catalog.stories().iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalog.stories().len());
    }

    #[test]
    fn test_filter_by_region() {
        let catalog = sample();
        let ids: Vec<&str> = catalog
            .stories_for(Region::Tamil, None)
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, ["a", "b", "d"]);
        assert!(catalog.stories_for(Region::Kerala, None).is_empty());
    }

    #[test]
    fn test_filter_by_theme() {
        let catalog = sample();

        // Exact theme match
        let devotion: Vec<&str> = catalog
            .stories_for(Region::Tamil, Some("Devotion"))
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(devotion, ["a", "d"]);

        // Substring of kind
        let epic = catalog.stories_for(Region::Tamil, Some("Epic"));
        assert_eq!(epic.len(), 1);
        assert_eq!(epic[0].id, "a");

        // Themes are not substring-matched
        assert!(catalog.stories_for(Region::Tamil, Some("Just")).is_empty());
    }

    #[test]
    fn test_themes_first_seen_order() {
        let catalog = sample();
        assert_eq!(
            catalog.themes_for(Region::Tamil),
            ["Epic", "Justice", "Devotion", "Trickster", "Wit", "Moral"]
        );
    }

    #[test]
    fn test_themes_capped() {
        let stories = (0..8)
            .map(|i| {
                story(
                    &format!("s{i}"),
                    Region::Kerala,
                    &format!("Kind{i} Tale"),
                    &[format!("Theme{i}").as_str()],
                )
            })
            .collect();
        let catalog = Catalog::new(stories);
        assert_eq!(catalog.themes_for(Region::Kerala).len(), MAX_THEMES);
    }

    #[test]
    fn test_find() {
        let catalog = sample();
        assert_eq!(catalog.find("c").unwrap().region, Region::Bengali);
        assert!(matches!(catalog.find("zzz"), Err(Error::NotFound(_))));
    }
}
