use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::embed::error::{ConfigError, InitError};

/// System image location used when none is given, relative to the home dir.
pub const DEFAULT_IMAGE_PATH: &str = "../lib/flux/sys.fxi";

/// Environment variable consulted when no home directory is passed.
pub const HOME_ENV_VAR: &str = "FLUX_HOME";

/// Process configuration recorded once by the lifecycle controller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Runtime install root. Empty means "guess".
    pub home_dir: PathBuf,
    /// System image, relative to `home_dir`. `None` means the default image.
    pub image_file: Option<PathBuf>,
    /// Directory of the host binary, when known.
    pub bin_dir: Option<PathBuf>,
    /// Bound to `ARGS` inside the runtime.
    pub args: Vec<String>,
    pub nprocs: Option<usize>,
    pub bind_addr: Option<String>,
    pub gc_threshold: Option<usize>,
    pub trace: bool,
}

impl RuntimeConfig {
    pub fn new(home_dir: impl Into<PathBuf>) -> Self {
        Self {
            home_dir: home_dir.into(),
            ..Self::default()
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_image(mut self, image_file: impl Into<PathBuf>) -> Self {
        self.image_file = Some(image_file.into());
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_nprocs(mut self, nprocs: usize) -> Self {
        self.nprocs = Some(nprocs);
        self
    }

    pub fn with_bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = Some(addr.into());
        self
    }

    pub fn with_gc_threshold(mut self, threshold: usize) -> Self {
        self.gc_threshold = Some(threshold);
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Image path as configured, or the default image.
    pub fn image_relative_path(&self) -> &Path {
        self.image_file
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_IMAGE_PATH))
    }

    /// Image path joined onto the home directory.
    pub fn resolved_image_path(&self) -> PathBuf {
        self.home_dir.join(self.image_relative_path())
    }

    pub fn uses_default_image(&self) -> bool {
        self.image_file.is_none()
    }

    /// Fills in the home and binary directories from the process environment.
    pub(crate) fn resolve_platform(mut self) -> Result<Self, InitError> {
        let exe_dir = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));

        if self.home_dir.as_os_str().is_empty() {
            self.home_dir = match env::var_os(HOME_ENV_VAR) {
                Some(home) if !home.is_empty() => PathBuf::from(home),
                _ => exe_dir.clone().ok_or(InitError::HomeNotFound)?,
            };
        }
        if self.bin_dir.is_none() {
            self.bin_dir = exe_dir;
        }
        Ok(self)
    }
}
