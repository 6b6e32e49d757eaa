// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Topology document parsing (TOML, HCL, JSON) and source resolution (§4.2,
//! §6 `TopologySource`).

use crate::doc::TopologyDocument;
use odc_core::error::{ErrorCode, OdcError};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Topology document format, inferred from the file extension or defaulted
/// to TOML for literal content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Hcl,
    Json,
}

impl Format {
    pub fn from_extension(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("hcl") => Format::Hcl,
            Some("json") => Format::Json,
            _ => Format::Toml,
        }
    }
}

/// Errors that can occur during topology parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HCL parse error: {0}")]
    Hcl(#[from] hcl::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read topology file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("topology script {program} failed: {details}")]
    Script { program: String, details: String },
}

impl From<ParseError> for OdcError {
    fn from(err: ParseError) -> Self {
        OdcError::new(ErrorCode::TopologyFailed, err.to_string())
    }
}

/// Parse topology document content in the given format.
pub fn parse_document(content: &str, format: Format) -> Result<TopologyDocument, ParseError> {
    let doc = match format {
        Format::Toml => toml::from_str(content)?,
        Format::Hcl => hcl::from_str(content)?,
        Format::Json => serde_json::from_str(content)?,
    };
    Ok(doc)
}

/// Resolve a [`odc_core::params::TopologySource`] into document content and
/// its inferred format. `File` is read from disk; `Content` is used
/// verbatim (TOML); `Script` is invoked through `odc-shell` with a timeout
/// and its stdout is taken as the document (§4.2, §4.3).
pub async fn resolve_source(
    source: &odc_core::params::TopologySource,
    timeout: Duration,
) -> Result<(String, Format), ParseError> {
    use odc_core::params::TopologySource::*;
    match source {
        File(path) => {
            let format = Format::from_extension(Path::new(path));
            let content =
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| ParseError::Io {
                        path: path.clone(),
                        source,
                    })?;
            Ok((content, format))
        }
        Content(content) => Ok((content.clone(), Format::Toml)),
        Script(program) => {
            let output = odc_shell::run(program, &[], None, None, timeout)
                .await
                .map_err(|e| ParseError::Script {
                    program: program.clone(),
                    details: e.to_string(),
                })?;
            if !output.success() {
                return Err(ParseError::Script {
                    program: program.clone(),
                    details: format!(
                        "exit code {:?}: {}",
                        output.exit_code,
                        output.stderr.trim()
                    ),
                });
            }
            Ok((output.stdout, Format::Json))
        }
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
