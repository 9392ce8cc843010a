use crate::{AppError, AppResult};

use flicker_monitor_core::Recipe;

use std::{fs, panic::Location, path::Path};

use error_location::ErrorLocation;
use tracing::{info, instrument};

/// Read a recipe from a TOML file.
///
/// ```toml
/// name = "warm-up"
///
/// [[actions]]
/// type = "start_flicker"
///
/// [[actions]]
/// type = "delay"
/// seconds = 2.5
/// ```
#[track_caller]
#[instrument]
pub(crate) fn load_recipe(path: &Path) -> AppResult<Recipe> {
    let contents = fs::read_to_string(path).map_err(|e| AppError::RecipeFileError {
        path: path.to_path_buf(),
        reason: format!("Failed to read: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let recipe = parse_recipe(&contents).map_err(|reason| AppError::RecipeFileError {
        path: path.to_path_buf(),
        reason,
        location: ErrorLocation::from(Location::caller()),
    })?;

    info!(
        recipe_path = ?path,
        name = recipe.name.as_deref().unwrap_or("<unnamed>"),
        steps = recipe.len(),
        "Recipe loaded"
    );

    Ok(recipe)
}

/// Parse and validate recipe text.
pub(crate) fn parse_recipe(contents: &str) -> Result<Recipe, String> {
    let recipe: Recipe =
        toml::from_str(contents).map_err(|e| format!("Failed to parse: {}", e))?;

    recipe.validate().map_err(|e| e.to_string())?;

    Ok(recipe)
}
