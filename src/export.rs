//! Style artifact serialization.
//!
//! The exported artifact is a self-contained, versioned JSON layer
//! definition: group hierarchy, per-layer style and the stable
//! feature-store layer names, re-importable without loss. This is a pure
//! serialization step; no coordinate computation happens here.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};
use crate::styling::StyleProject;

/// Current artifact schema version.
pub const ARTIFACT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct StyleArtifact {
    version: u32,
    project: StyleProject,
}

/// Serialize a style project to a writer.
pub fn write_project_to<W: Write>(project: &StyleProject, writer: W) -> Result<()> {
    let artifact = StyleArtifact {
        version: ARTIFACT_VERSION,
        project: project.clone(),
    };
    serde_json::to_writer_pretty(writer, &artifact)?;
    Ok(())
}

/// Serialize a style project to a file.
pub fn write_project(project: &StyleProject, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_project_to(project, BufWriter::new(file))
}

/// Deserialize a style project from a reader.
pub fn read_project_from<R: Read>(reader: R) -> Result<StyleProject> {
    let artifact: StyleArtifact = serde_json::from_reader(reader)?;
    if artifact.version != ARTIFACT_VERSION {
        return Err(IndexError::UnsupportedArtifactVersion {
            version: artifact.version,
            expected: ARTIFACT_VERSION,
        });
    }
    Ok(artifact.project)
}

/// Deserialize a style project from a file.
pub fn read_project(path: &Path) -> Result<StyleProject> {
    let file = File::open(path)?;
    read_project_from(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styling::{
        AvailabilityStatus, Color, InstitutionGroup, StyledLayer, SymbolShape,
    };
    use crate::GeometryKind;

    fn sample_project() -> StyleProject {
        StyleProject {
            crs: "EPSG:3031".to_string(),
            groups: vec![InstitutionGroup {
                institution: "UTIG".to_string(),
                layers: vec![StyledLayer {
                    layer_name: "utig_2018_thwaites".to_string(),
                    campaign: "2018_Thwaites".to_string(),
                    kind: GeometryKind::LineString,
                    status: AvailabilityStatus::Supported,
                    color: Color::BLUE,
                    symbol: SymbolShape::Line,
                }],
            }],
        }
    }

    #[test]
    fn round_trip_preserves_project() {
        let project = sample_project();
        let mut buf = Vec::new();
        write_project_to(&project, &mut buf).unwrap();
        let restored = read_project_from(buf.as_slice()).unwrap();
        assert_eq!(restored, project);
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let json = r#"{"version": 99, "project": {"crs": "EPSG:3031", "groups": []}}"#;
        let err = read_project_from(json.as_bytes());
        assert!(matches!(
            err,
            Err(IndexError::UnsupportedArtifactVersion { version: 99, .. })
        ));
    }
}
