//! Plan renderers and output files.

mod geojson;
mod naming;
mod style;
mod svg;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::Issue;

pub use geojson::{feature_collection, render_geojson, Feature, FeatureCollection, FeatureProperties};
pub use naming::{expand_pattern, sanitize_name};
pub use style::{LineStyle, StyleSheet};
pub use svg::{render_svg, view_box, SvgOptions, SvgWriter};

/// Kind of a per-storey output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    Drawing,
    Geometry,
}

/// Whether an output file reached the disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStatus {
    Written,
    Failed,
}

/// One output file of a storey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputFile {
    pub kind: OutputKind,
    /// File name relative to the output directory.
    pub file: String,
    pub status: OutputStatus,
}

/// Write `content` to `dir/file`. A failure is returned as a recoverable
/// `WriteFailed` issue alongside the failed output record.
pub fn write_output(
    dir: &Path,
    file: &str,
    kind: OutputKind,
    content: &str,
) -> (OutputFile, Option<Issue>) {
    let path: PathBuf = dir.join(file);
    match std::fs::write(&path, content) {
        Ok(()) => {
            debug!("Wrote {}", path.display());
            (
                OutputFile {
                    kind,
                    file: file.to_string(),
                    status: OutputStatus::Written,
                },
                None,
            )
        }
        Err(e) => {
            error!("Failed to write {}: {}", path.display(), e);
            (
                OutputFile {
                    kind,
                    file: file.to_string(),
                    status: OutputStatus::Failed,
                },
                Some(Issue::write_failed(path, e)),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_write_output_written() {
        let dir = tempfile::tempdir().unwrap();
        let (output, issue) = write_output(dir.path(), "00_G.svg", OutputKind::Drawing, "<svg/>");
        assert_eq!(output.status, OutputStatus::Written);
        assert!(issue.is_none());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("00_G.svg")).unwrap(),
            "<svg/>"
        );
    }

    #[test]
    fn test_write_output_failure_is_issue() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let (output, issue) = write_output(&missing, "00_G.svg", OutputKind::Drawing, "<svg/>");
        assert_eq!(output.status, OutputStatus::Failed);
        let issue = issue.unwrap();
        assert_eq!(issue.code, ErrorCode::WriteFailed);
        assert_eq!(issue.path, Some(missing.join("00_G.svg")));
    }
}
