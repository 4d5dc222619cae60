use std::path::{Path, PathBuf};

use crate::embed::{
    Embedding, InitError, ManagedRuntime, RuntimeConfig, trace,
};

/// Managed-side configuration run once, in order, after the runtime boots.
pub const BOOTSTRAP_REQUESTS: [&str; 3] = [
    "Base.init_parallel()",
    "Base.init_bind_addr(ARGS)",
    "Base.init_head_sched()",
];

impl<R: ManagedRuntime> Embedding<R> {
    pub fn is_initialized(&self) -> bool {
        self.config.get().is_some()
    }

    /// Initializes the runtime rooted at `home_dir` with the default image.
    pub fn initialize(&self, home_dir: impl AsRef<Path>) -> Result<(), InitError> {
        self.initialize_with_image(home_dir, None)
    }

    /// Initializes the runtime; `image_relative_path` is resolved against
    /// `home_dir`. An empty `home_dir` is guessed from the environment.
    pub fn initialize_with_image(
        &self,
        home_dir: impl AsRef<Path>,
        image_relative_path: Option<&Path>,
    ) -> Result<(), InitError> {
        let mut config = RuntimeConfig::new(home_dir.as_ref());
        config.image_file = image_relative_path.map(Path::to_path_buf);
        self.initialize_with_config(config)
    }

    /// One-shot initialization. Later calls are no-ops and keep the first
    /// configuration.
    ///
    /// Failures of the bootstrap requests are not reported here: like any
    /// evaluation failure they pass through the exception channel, which is
    /// cleared before returning.
    pub fn initialize_with_config(&self, config: RuntimeConfig) -> Result<(), InitError> {
        if self.is_initialized() {
            if self.trace.get() {
                trace::lifecycle_event("initialize: already initialized");
            }
            return Ok(());
        }

        let config = config.resolve_platform()?;
        let trace = config.trace;
        if !config.uses_default_image() {
            let image = config.resolved_image_path();
            if !image.is_file() {
                return Err(InitError::ImageNotFound(image));
            }
        }

        if trace || self.trace.get() {
            trace::lifecycle_event(&format!(
                "initialize: home={} image={}",
                config.home_dir.display(),
                config.resolved_image_path().display()
            ));
        }

        self.with_runtime(|runtime, boundary| runtime.bootstrap(boundary, &config))
            .map_err(InitError::Bootstrap)?;
        let _ = self.config.set(config);
        if trace {
            self.set_trace(true);
        }

        for request in BOOTSTRAP_REQUESTS {
            self.evaluate(request);
        }
        self.exception.clear();
        Ok(())
    }

    pub fn config(&self) -> Option<&RuntimeConfig> {
        self.config.get()
    }

    pub fn home_dir(&self) -> Option<&Path> {
        self.config.get().map(|config| config.home_dir.as_path())
    }

    /// Image path as configured, relative to the home directory.
    pub fn image_path(&self) -> Option<&Path> {
        self.config.get().map(RuntimeConfig::image_relative_path)
    }

    pub fn resolved_image_path(&self) -> Option<PathBuf> {
        self.config.get().map(RuntimeConfig::resolved_image_path)
    }

    pub fn bin_dir(&self) -> Option<&Path> {
        self.config.get().and_then(|config| config.bin_dir.as_deref())
    }
}
