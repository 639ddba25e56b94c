//! Flat tunable parameter set and its JSON persistence.
//!
//! Loading never takes the simulation down: a missing or malformed file
//! falls back to defaults, and keys absent from the file keep their default.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::world::Boundary;

/// Default parameter file, relative to the working directory.
pub const DEFAULT_PATH: &str = "config.json";

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("failed to read or write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid parameter file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Which boundary policy the world runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    Wrap,
    Reflect,
}

/// Every knob the parameter panel can turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    pub avoidance_factor: f64,
    pub alignment_factor: f64,
    pub gathering_factor: f64,
    pub avoidance_radius: f64,
    pub detection_radius: f64,
    pub max_speed: f64,
    pub wall_margin: f64,
    pub wall_force: f64,
    pub boundary: BoundaryKind,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            avoidance_factor: 1.0,
            alignment_factor: 0.003,
            gathering_factor: 0.0005,
            avoidance_radius: 20.0,
            detection_radius: 100.0,
            max_speed: 3.0,
            wall_margin: 75.0,
            wall_force: 1.5,
            boundary: BoundaryKind::Reflect,
        }
    }
}

impl Params {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParamsError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ParamsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ParamsError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`Params::load`], but any failure degrades to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(params) => {
                log::info!("Loaded parameters from {}", path.display());
                params
            }
            Err(ParamsError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                log::info!("No parameter file at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("{e}; using defaults");
                Self::default()
            }
        }
    }

    /// Write as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ParamsError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|source| ParamsError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| ParamsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn boundary(&self) -> Boundary {
        match self.boundary {
            BoundaryKind::Wrap => Boundary::Wrap,
            BoundaryKind::Reflect => Boundary::Reflect {
                margin: self.wall_margin,
                force: self.wall_force,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("swarmlings-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn defaults() {
        let p = Params::default();
        assert_eq!(p.avoidance_factor, 1.0);
        assert_eq!(p.avoidance_radius, 20.0);
        assert_eq!(p.detection_radius, 100.0);
        assert_eq!(p.max_speed, 3.0);
        assert_eq!(p.boundary, BoundaryKind::Reflect);
        assert_eq!(p.boundary(), Boundary::Reflect { margin: 75.0, force: 1.5 });
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let p: Params = serde_json::from_str(r#"{"max_speed": 5.5, "boundary": "wrap"}"#).unwrap();
        assert_eq!(p.max_speed, 5.5);
        assert_eq!(p.boundary(), Boundary::Wrap);
        assert_eq!(p.detection_radius, Params::default().detection_radius);
    }

    #[test]
    fn save_then_load() {
        let path = scratch_path("roundtrip");
        let p = Params {
            gathering_factor: 0.002,
            wall_margin: 40.0,
            ..Params::default()
        };
        p.save(&path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"gathering_factor\": 0.002"));
        assert!(text.contains("\"boundary\": \"reflect\""));
        assert_eq!(Params::load(&path).unwrap(), p);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_file_falls_back() {
        let path = scratch_path("does-not-exist");
        assert!(matches!(Params::load(&path), Err(ParamsError::Io { .. })));
        assert_eq!(Params::load_or_default(&path), Params::default());
    }

    #[test]
    fn malformed_file_falls_back() {
        let path = scratch_path("malformed");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Params::load(&path), Err(ParamsError::Json { .. })));
        assert_eq!(Params::load_or_default(&path), Params::default());
        let _ = fs::remove_file(&path);
    }
}
