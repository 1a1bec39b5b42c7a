// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Plain data shapes shared with other parts of the application.
//!
//! These are transport records: deserialization only checks that the declared
//! fields are present with the right types.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

mod pattern;
mod user;

pub use pattern::{DrumPattern, TimeSignature};
pub use user::User;

/// Errors produced when reading or interpreting a model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid time signature '{0}'")]
    TimeSignature(String),

    #[error("Unsupported file extension for {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads a model from a JSON or YAML file, chosen by extension.
pub(crate) fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    let contents = std::fs::read_to_string(path)?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(serde_json::from_str(&contents)?),
        Some("yaml") | Some("yml") => Ok(serde_yml::from_str(&contents)?),
        _ => Err(ModelError::UnsupportedFormat(path.to_path_buf())),
    }
}
