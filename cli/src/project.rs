//! Project and template bookkeeping.
//!
//! A project is any directory holding a `.bro/` directory. Inside it,
//! `bro.json` names the template the project commits into and `_stage/`
//! mirrors the files waiting to be committed. Templates are plain
//! directories in the template store (`~/.bros` unless overridden).

use crate::{CliError, CliResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

pub(crate) const BRO_DIR: &str = ".bro";
pub(crate) const STAGE_DIR: &str = "_stage";
pub(crate) const CONFIG_FILE: &str = "bro.json";
const STORE_DIR: &str = ".bros";

/// Contents of `.bro/bro.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ProjectConfig {
    /// Tracked template; empty means untracked
    #[serde(rename = "bro", default)]
    pub template: String,
}

impl ProjectConfig {
    pub(crate) fn tracking(name: &str) -> Self {
        Self {
            template: name.to_string(),
        }
    }

    pub(crate) fn tracked(&self) -> Option<&str> {
        let name = self.template.trim();
        (!name.is_empty()).then_some(name)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Project {
    root: PathBuf,
}

impl Project {
    /// Find the nearest enclosing project, starting at `start`.
    pub(crate) fn discover(start: &Path) -> CliResult<Self> {
        start
            .ancestors()
            .find(|dir| dir.join(BRO_DIR).is_dir())
            .map(|root| Self {
                root: root.to_path_buf(),
            })
            .ok_or_else(|| CliError::NotAProject {
                path: start.to_path_buf(),
            })
    }

    /// Make `dir` a project, keeping any existing `.bro/` as is.
    pub(crate) fn init(dir: &Path) -> CliResult<Self> {
        let bro_dir = dir.join(BRO_DIR);
        fs::create_dir_all(&bro_dir).map_err(|source| CliError::Io {
            action: "create",
            path: bro_dir,
            source,
        })?;
        Ok(Self {
            root: dir.to_path_buf(),
        })
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn bro_dir(&self) -> PathBuf {
        self.root.join(BRO_DIR)
    }

    pub(crate) fn stage_dir(&self) -> PathBuf {
        self.bro_dir().join(STAGE_DIR)
    }

    pub(crate) fn config_path(&self) -> PathBuf {
        self.bro_dir().join(CONFIG_FILE)
    }

    /// Read the project config; a missing file means untracked.
    pub(crate) fn load_config(&self) -> CliResult<ProjectConfig> {
        let path = self.config_path();
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ProjectConfig::default()),
            Err(source) => {
                return Err(CliError::Io {
                    action: "read",
                    path,
                    source,
                });
            }
        };
        serde_json::from_slice(&raw).map_err(|source| CliError::ConfigParse { path, source })
    }

    pub(crate) fn save_config(&self, config: &ProjectConfig) -> CliResult<()> {
        let json = serde_json::to_vec_pretty(config)
            .map_err(|source| CliError::JsonSerialize { source })?;
        let path = self.config_path();
        fs::write(&path, json).map_err(|source| CliError::Io {
            action: "write",
            path,
            source,
        })
    }
}

/// Directory holding one subdirectory per template.
#[derive(Debug, Clone)]
pub(crate) struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    /// Open the store at `home`, or at `~/.bros` when not given, creating it if needed.
    pub(crate) fn locate(home: Option<&Path>) -> CliResult<Self> {
        let dir = match home {
            Some(dir) => dir.to_path_buf(),
            None => dirs::home_dir().ok_or(CliError::NoHome)?.join(STORE_DIR),
        };
        fs::create_dir_all(&dir).map_err(|source| CliError::Io {
            action: "create",
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Create a new, empty template.
    pub(crate) fn create(&self, name: &str) -> CliResult<PathBuf> {
        let name = validate_name(name)?;
        let path = self.dir.join(name);
        match fs::create_dir(&path) {
            Ok(()) => Ok(path),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(CliError::TemplateExists {
                name: name.to_string(),
            }),
            Err(source) => Err(CliError::Io {
                action: "create",
                path,
                source,
            }),
        }
    }

    /// Path of an existing template.
    pub(crate) fn existing(&self, name: &str) -> CliResult<PathBuf> {
        let name = validate_name(name)?;
        let path = self.dir.join(name);
        if path.is_dir() {
            Ok(path)
        } else {
            Err(CliError::TemplateNotFound {
                name: name.to_string(),
            })
        }
    }
}

/// Template names become a single directory name in the store.
pub(crate) fn validate_name(name: &str) -> CliResult<&str> {
    let trimmed = name.trim();
    let mut components = Path::new(trimmed).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(trimmed),
        _ => Err(CliError::InvalidTemplateName {
            name: name.to_string(),
        }),
    }
}
