//! Story browsing endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiState};
use crate::catalog::{FolkStory, Region};

/// Build story router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/stories", get(list_stories))
        .route("/regions/{region}/themes", get(list_themes))
        .with_state(state)
}

/// Story list filter
#[derive(Debug, Deserialize)]
pub struct StoryQuery {
    pub region: Option<String>,
    pub theme: Option<String>,
}

/// Story list response
#[derive(Debug, Serialize)]
pub struct StoriesResponse {
    pub stories: Vec<FolkStory>,
}

/// Theme list response
#[derive(Debug, Serialize)]
pub struct ThemesResponse {
    pub region: Region,
    pub themes: Vec<String>,
}

/// List stories, optionally by region and theme
///
/// Without a region every story is returned and the theme is ignored.
async fn list_stories(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<StoryQuery>,
) -> Result<Json<StoriesResponse>, ApiError> {
    let stories = match query.region.as_deref() {
        Some(region) => {
            let region: Region = region.parse()?;
            let theme = query.theme.as_deref().filter(|t| !t.is_empty());
            state
                .catalog
                .stories_for(region, theme)
                .into_iter()
                .cloned()
                .collect()
        }
        None => state.catalog.stories().to_vec(),
    };

    Ok(Json(StoriesResponse { stories }))
}

/// Themes offered for a region
async fn list_themes(
    State(state): State<Arc<ApiState>>,
    Path(region): Path<String>,
) -> Result<Json<ThemesResponse>, ApiError> {
    let region: Region = region.parse()?;
    Ok(Json(ThemesResponse {
        region,
        themes: state.catalog.themes_for(region),
    }))
}
