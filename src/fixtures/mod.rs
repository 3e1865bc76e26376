//! Fixtures
//!
//! Cart snapshots stored on disk, used by the `quote` command and the tests.

use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::cart::state::CartState;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file {path}: {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// File extension is neither JSON nor YAML
    #[error("Unsupported snapshot format: {0}")]
    UnsupportedFormat(String),
}

/// Loads a cart snapshot from a `.json`, `.yml` or `.yaml` file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or has an unknown extension.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<CartState, FixtureError> {
    let path = path.as_ref();

    let contents = fs::read_to_string(path).map_err(|source| FixtureError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "json" => Ok(serde_json::from_str(&contents)?),
        "yml" | "yaml" => Ok(serde_norway::from_str(&contents)?),
        other => Err(FixtureError::UnsupportedFormat(other.to_string())),
    }
}

/// Loads a named snapshot from `fixtures/carts/<name>.yml`.
///
/// # Errors
///
/// Returns an error if the fixture cannot be read or parsed.
pub fn cart_fixture(name: &str) -> Result<CartState, FixtureError> {
    load_snapshot(
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures")
            .join("carts")
            .join(format!("{name}.yml")),
    )
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::Builder;
    use testresult::TestResult;

    use super::*;
    use crate::{amounts::Amount, cart::models::PaymentType};

    #[test]
    fn loads_json_snapshot() -> TestResult {
        let mut file = Builder::new().suffix(".json").tempfile()?;

        write!(
            file,
            r#"{{"cart_data": {{"total_service_amount": "500"}}, "selected_tip": "50"}}"#
        )?;

        let state = load_snapshot(file.path())?;

        assert_eq!(
            state.cart_data.map(|cart| cart.total_service_amount),
            Some(Amount::from_major(500))
        );
        assert_eq!(state.selected_tip, Amount::from_major(50));
        assert_eq!(state.payment_type, PaymentType::FullAmount);

        Ok(())
    }

    #[test]
    fn rejects_unknown_extension() -> TestResult {
        let file = Builder::new().suffix(".toml").tempfile()?;

        let result = load_snapshot(file.path());

        assert!(
            matches!(&result, Err(FixtureError::UnsupportedFormat(ext)) if ext == "toml"),
            "expected UnsupportedFormat, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = load_snapshot("/definitely/not/here.yml");

        assert!(matches!(result, Err(FixtureError::Io { .. })));
    }

    #[test]
    fn bundled_fixture_loads() -> TestResult {
        let state = cart_fixture("full_amount")?;

        assert!(state.cart_data.is_some());

        Ok(())
    }
}
