//! Shared serving state

use crate::error::Result;
use crate::paths::ProjectPaths;
use crate::preprocessing::Preprocessor;
use crate::training::{ModelKind, TrainedRegressor};
use std::collections::HashMap;

/// Artifacts shared by every request: the fitted preprocessor and one
/// model per kind. Built once at startup and never mutated afterwards.
pub struct AppState {
    pub preprocessor: Preprocessor,
    models: HashMap<ModelKind, TrainedRegressor>,
}

impl AppState {
    /// Load the preprocessor and all three models from the models
    /// directory. Any missing artifact is a startup error.
    pub fn load(paths: &ProjectPaths) -> Result<Self> {
        let preprocessor = Preprocessor::load(&paths.preprocessor())?;

        let mut models = HashMap::new();
        for kind in ModelKind::ALL {
            let model = TrainedRegressor::load(&paths.model(kind.as_str()))?;
            models.insert(kind, model);
        }

        Ok(Self {
            preprocessor,
            models,
        })
    }

    /// Build state directly from artifacts already in memory.
    pub fn from_parts(
        preprocessor: Preprocessor,
        models: HashMap<ModelKind, TrainedRegressor>,
    ) -> Self {
        Self {
            preprocessor,
            models,
        }
    }

    /// Look up a model, falling back to the random forest default on an
    /// unrecognized or absent name. `None` only if the default itself is
    /// not loaded.
    pub fn resolve_model(&self, requested: Option<&str>) -> Option<(ModelKind, &TrainedRegressor)> {
        let kind = requested
            .and_then(|name| name.parse::<ModelKind>().ok())
            .unwrap_or(ModelKind::RandomForest);
        let kind = if self.models.contains_key(&kind) {
            kind
        } else {
            ModelKind::RandomForest
        };
        self.models.get(&kind).map(|model| (kind, model))
    }

    pub fn n_models(&self) -> usize {
        self.models.len()
    }
}
