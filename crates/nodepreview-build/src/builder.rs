//! Build tool for package descriptors
//!
//! Each extension module is compiled into a staging file and moved to
//! `<out_dir>/<module><ext_suffix>` only once the toolchain succeeded, so a
//! failed build never leaves a fresh artifact behind. Modules are compiled in
//! parallel. The build record (`nodepreview-build.toml` in the output
//! directory) keeps exactly one entry per module identifier.

use crate::descriptor::{ExtensionModule, PackageDescriptor};
use crate::errors::BuildError;
use crate::registry::Registry;
use crate::toolchain::Toolchain;
use nodepreview_logger as logger;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// File name of the build record inside the output directory
pub const BUILD_RECORD: &str = "nodepreview-build.toml";

#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Directory source paths are resolved against
    pub source_dir: PathBuf,
    /// Directory receiving artifacts and the build record
    pub out_dir: PathBuf,
    /// Appended to the module identifier to form the artifact file name
    pub ext_suffix: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltArtifact {
    pub module: Arc<str>,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub artifacts: Vec<BuiltArtifact>,
    pub record: PathBuf,
}

pub struct Builder<T: Toolchain> {
    toolchain: T,
}

impl<T: Toolchain> Builder<T> {
    pub fn new(toolchain: T) -> Self {
        Builder { toolchain }
    }

    pub fn toolchain(&self) -> &T {
        &self.toolchain
    }

    /// Build every extension module of `package`
    pub fn build(
        &self,
        package: &PackageDescriptor,
        options: &BuildOptions,
    ) -> Result<BuildReport, BuildError> {
        // Identifiers must be unique within the package before anything is compiled
        let mut namespace = Registry::default();
        namespace.register_package(package)?;

        logger::step(&format!(
            "Building {} {} ({} extension module(s)) with {}",
            package.name,
            package.version,
            package.ext_modules.len(),
            self.toolchain.name()
        ));
        fs::create_dir_all(&options.out_dir)?;

        let artifacts = package
            .ext_modules
            .par_iter()
            .map(|module| self.build_module(module, options))
            .collect::<Result<Vec<_>, _>>()?;

        let record = options.out_dir.join(BUILD_RECORD);
        let mut registry = Registry::load_from_path(&record)?;
        for (module, artifact) in package.ext_modules.iter().zip(&artifacts) {
            let file_name = artifact
                .path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            registry.record_build(module, &file_name);
        }
        registry.save_to_path(&record)?;

        info!(
            "Built {} artifact(s) for {}",
            artifacts.len(),
            package.name
        );
        Ok(BuildReport { artifacts, record })
    }

    fn build_module(
        &self,
        module: &ExtensionModule,
        options: &BuildOptions,
    ) -> Result<BuiltArtifact, BuildError> {
        let sources = resolve_sources(module, &options.source_dir)?;

        let artifact_name = module.artifact_name(&options.ext_suffix);
        let artifact = options.out_dir.join(&artifact_name);
        let staging = options.out_dir.join(format!(".{}.partial", artifact_name));

        debug!("Compiling {} from {:?}", module.name, sources);
        if let Err(err) = self.toolchain.compile(&sources, &staging) {
            let _ = fs::remove_file(&staging);
            return Err(err);
        }

        if !staging.is_file() {
            return Err(BuildError::NoArtifact(module.name.to_string()));
        }
        fs::rename(&staging, &artifact)?;
        logger::debug(&format!("Wrote {}", artifact.display()));

        Ok(BuiltArtifact {
            module: module.name.clone(),
            path: artifact,
        })
    }
}

/// Resolve a module's sources against `source_dir`, failing on the first missing one
fn resolve_sources(module: &ExtensionModule, source_dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    module
        .sources
        .iter()
        .map(|source| {
            let path = source_dir.join(source.as_ref());
            if path.is_file() {
                Ok(path)
            } else {
                Err(BuildError::MissingSource {
                    module: module.name.to_string(),
                    path,
                })
            }
        })
        .collect()
}
