//! Feature encoding: standard-scaled numerics + one-hot categoricals
//!
//! The dataset schema is fixed: three numeric features, two categorical
//! features, one numeric target. [`Preprocessor`] composes a
//! [`StandardScaler`] and a [`OneHotEncoder`] column-wise and turns a
//! cleaned DataFrame into an `ndarray` feature matrix.

mod encoder;
mod pipeline;
mod scaler;

pub use encoder::OneHotEncoder;
pub use pipeline::Preprocessor;
pub use scaler::StandardScaler;

use crate::data::load_and_clean;
use crate::error::Result;
use crate::paths::ProjectPaths;
use tracing::info;

/// Numeric feature columns, in matrix order.
pub const NUMERIC_FEATURES: [&str; 3] = ["year", "female_enrollment", "gender_gap_index"];

/// Categorical feature columns, in matrix order.
pub const CATEGORICAL_FEATURES: [&str; 2] = ["country", "stem_fields"];

/// Target column.
pub const TARGET: &str = "female_graduation_rate";

/// Full preprocess stage: load and clean the raw CSV, fit the preprocessor,
/// and persist the transformed matrices plus the fitted preprocessor.
pub fn run_preprocess(paths: &ProjectPaths) -> Result<()> {
    let df = load_and_clean(&paths.raw_data())?;
    info!(rows = df.height(), cols = df.width(), "Loaded raw dataset");

    let mut preprocessor = Preprocessor::new();
    let (x, y) = preprocessor.fit_transform(&df)?;
    info!(
        rows = x.nrows(),
        features = x.ncols(),
        "Fitted preprocessor and transformed features"
    );

    std::fs::create_dir_all(paths.processed_dir())?;
    std::fs::create_dir_all(paths.models_dir())?;

    std::fs::write(paths.features_matrix(), serde_json::to_string(&x)?)?;
    std::fs::write(paths.target_vector(), serde_json::to_string(&y)?)?;
    preprocessor.save(&paths.preprocessor())?;

    info!(
        x = %paths.features_matrix().display(),
        y = %paths.target_vector().display(),
        preprocessor = %paths.preprocessor().display(),
        "Preprocessing artifacts written"
    );
    Ok(())
}
