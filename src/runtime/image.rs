//! System image loading.
//!
//! An image is plain source evaluated into `Base` before `Main` exists. Its
//! SHA-256 is kept so hosts can tell which image a runtime booted from.

use std::{fmt::Write, fs};

use sha2::{Digest, Sha256};

use crate::{
    embed::BoundaryView,
    runtime::{FluxRuntime, value::Value},
    syntax,
};

pub fn hash_bytes(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&result);
    out
}

pub fn to_hex(bytes: &[u8; 32]) -> String {
    let mut out = String::with_capacity(64);
    for byte in bytes {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

impl FluxRuntime {
    /// Evaluates the configured image, if one exists on disk.
    pub(crate) fn load_image(&mut self, boundary: &BoundaryView<'_, Value>) -> Result<(), String> {
        let image = self.config.resolved_image_path();
        if !image.is_file() {
            return Ok(());
        }

        let source = fs::read_to_string(&image)
            .map_err(|err| format!("cannot read system image {}: {}", image.display(), err))?;
        let program = syntax::parse(&source)
            .map_err(|err| format!("{}:{}", image.display(), err))?;

        let mark = self.stack.len();
        let result = self.run_program(boundary, &program);
        self.stack.truncate(mark);
        self.depth = 0;
        if let Err(err) = result {
            let exception = self.exception_value(err);
            return Err(format!(
                "error loading {}: {}",
                image.display(),
                self.repr(exception)
            ));
        }

        self.image_digest = Some(hash_bytes(source.as_bytes()));
        Ok(())
    }
}
