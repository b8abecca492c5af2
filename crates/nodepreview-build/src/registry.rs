//! Extension module registry
//!
//! The registry is the namespace extension modules are registered into. Module
//! identifiers are unique: registering an identical module twice is a no-op,
//! registering different sources under a taken identifier is rejected.
//!
//! The builder persists a registry next to its artifacts as the build record.

use crate::descriptor::{ExtensionModule, PackageDescriptor};
use crate::errors::DescriptorError;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// A registered extension module and, once built, its artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<Arc<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub built_at: Option<Arc<str>>,
    pub module: ExtensionModule,
}

/// Result of [`Registry::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Inserted,
    Unchanged,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registry {
    pub version: Arc<str>,
    pub generated_at: Arc<str>,
    #[serde(default)]
    pub modules: Vec<Registration>,

    /// Runtime only - rebuilt on load for O(1) lookup
    #[serde(skip)]
    index: AHashMap<Arc<str>, usize>,
}

impl Default for Registry {
    fn default() -> Self {
        Registry {
            version: Arc::from("1.0"),
            generated_at: Arc::from(chrono::Utc::now().to_rfc3339()),
            modules: Vec::new(),
            index: AHashMap::new(),
        }
    }
}

impl Registry {
    /// Load a registry, returning an empty one if the file doesn't exist
    pub fn load_from_path(path: &Path) -> Result<Self, DescriptorError> {
        if !path.exists() {
            return Ok(Registry::default());
        }

        let content = std::fs::read_to_string(path)?;
        let mut registry: Registry = toml::from_str(&content)?;
        registry.rebuild_index();
        debug!(
            "Loaded registry from {:?} with {} modules",
            path,
            registry.modules.len()
        );
        Ok(registry)
    }

    /// Save with atomic write: temp file then rename
    pub fn save_to_path(&self, path: &Path) -> Result<(), DescriptorError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;

        let temp_path = path.with_extension("toml.tmp");
        {
            let file = std::fs::File::create(&temp_path)?;
            let mut writer = std::io::BufWriter::new(file);
            writer.write_all(content.as_bytes())?;
            writer.flush()?;
        }

        std::fs::rename(&temp_path, path)?;
        Ok(())
    }

    pub fn rebuild_index(&mut self) {
        self.index = self
            .modules
            .iter()
            .enumerate()
            .map(|(idx, reg)| (reg.module.name.clone(), idx))
            .collect();
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Registration> {
        self.index.get(name).map(|&idx| &self.modules[idx])
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Register a module under its identifier
    pub fn register(&mut self, module: &ExtensionModule) -> Result<RegisterOutcome, DescriptorError> {
        if let Some(existing) = self.get(&module.name) {
            if existing.module == *module {
                return Ok(RegisterOutcome::Unchanged);
            }
            return Err(DescriptorError::DuplicateModule(module.name.to_string()));
        }

        self.index.insert(module.name.clone(), self.modules.len());
        self.modules.push(Registration {
            artifact: None,
            built_at: None,
            module: module.clone(),
        });
        Ok(RegisterOutcome::Inserted)
    }

    /// Register every extension module of a package
    pub fn register_package(&mut self, package: &PackageDescriptor) -> Result<(), DescriptorError> {
        for module in &package.ext_modules {
            self.register(module)?;
        }
        Ok(())
    }

    /// Record a built artifact, replacing any previous record for the module
    ///
    /// Unlike [`Registry::register`] this follows the latest definition, so a
    /// descriptor whose sources changed between builds still has one entry.
    pub fn record_build(&mut self, module: &ExtensionModule, artifact: &str) {
        let registration = Registration {
            artifact: Some(Arc::from(artifact)),
            built_at: Some(Arc::from(chrono::Utc::now().to_rfc3339())),
            module: module.clone(),
        };

        match self.index.get(module.name.as_ref()).copied() {
            Some(idx) => self.modules[idx] = registration,
            None => {
                self.index.insert(module.name.clone(), self.modules.len());
                self.modules.push(registration);
            }
        }
    }
}
