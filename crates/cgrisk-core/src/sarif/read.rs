//! Reading SARIF inputs and recording their identity.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Report-facing record of one SARIF input file.
///
/// The fingerprint depends only on file bytes; filesystem metadata is
/// ignored so identical inputs always produce identical run metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputArtifact {
    pub path: String,
    pub size_bytes: u64,
    pub sha256: String,
}

/// Raw input context: exact bytes plus fingerprint.
#[derive(Debug, Clone)]
pub struct SarifInput {
    pub bytes: Vec<u8>,
    pub artifact: InputArtifact,
}

pub fn read_sarif_input(path: &Path) -> Result<SarifInput> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read SARIF input: {}", path.display()))?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hasher.finalize();

    let artifact = InputArtifact {
        path: path.display().to_string(),
        size_bytes: bytes.len() as u64,
        sha256: hex::encode(digest),
    };
    Ok(SarifInput { bytes, artifact })
}
