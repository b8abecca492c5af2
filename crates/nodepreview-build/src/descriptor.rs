//! Extension build descriptor
//!
//! A [`PackageDescriptor`] names the package, its version and description,
//! and the extension modules it ships. Each [`ExtensionModule`] maps a module
//! identifier to the ordered list of compilation units it is built from.

use crate::errors::DescriptorError;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;

/// The single compilation unit of the worker extension
pub const WORKER_SOURCE: &str = "workermodule.cpp";

/// Package version attached to the worker artifact
pub const WORKER_VERSION: &str = "1.0";

/// Human-readable summary of the worker package
pub const WORKER_DESCRIPTION: &str = "Node Preview Worker";

/// One natively compiled, loadable extension module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionModule {
    /// Name under which the compiled artifact is loadable
    pub name: Arc<str>,
    /// Compilation units, in build order
    pub sources: SmallVec<[Arc<str>; 1]>,
}

impl ExtensionModule {
    pub fn new<I, S>(name: &str, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ExtensionModule {
            name: Arc::from(name),
            sources: sources.into_iter().map(|s| Arc::from(s.as_ref())).collect(),
        }
    }

    /// File name of the built artifact, e.g. `nodepreview_worker.abi3.so`
    pub fn artifact_name(&self, ext_suffix: &str) -> String {
        format!("{}{}", self.name, ext_suffix)
    }
}

/// Top-level package metadata plus the extension modules it builds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    pub name: Arc<str>,
    pub version: Arc<str>,
    pub description: Arc<str>,
    #[serde(default)]
    pub ext_modules: Vec<ExtensionModule>,
}

impl PackageDescriptor {
    /// Look up an extension module by identifier
    pub fn extension(&self, name: &str) -> Option<&ExtensionModule> {
        self.ext_modules.iter().find(|m| m.name.as_ref() == name)
    }

    pub fn to_toml(&self) -> Result<String, DescriptorError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn from_toml(content: &str) -> Result<Self, DescriptorError> {
        Ok(toml::from_str(content)?)
    }
}

/// Descriptor of the `nodepreview_worker` package
///
/// The package is named after its only extension module.
pub fn worker_descriptor() -> PackageDescriptor {
    let module = ExtensionModule::new(nodepreview_worker::MODULE_NAME, [WORKER_SOURCE]);

    PackageDescriptor {
        name: module.name.clone(),
        version: Arc::from(WORKER_VERSION),
        description: Arc::from(WORKER_DESCRIPTION),
        ext_modules: vec![module],
    }
}

#[cfg(test)]
mod tests {
    use crate::descriptor::*;

    #[test]
    fn test_worker_module_identifier() {
        let descriptor = worker_descriptor();
        assert_eq!(descriptor.ext_modules.len(), 1);
        assert_eq!(descriptor.ext_modules[0].name.as_ref(), "nodepreview_worker");
        assert_eq!(descriptor.name.as_ref(), "nodepreview_worker");
    }

    #[test]
    fn test_worker_sources() {
        let descriptor = worker_descriptor();
        let sources: Vec<&str> = descriptor.ext_modules[0]
            .sources
            .iter()
            .map(AsRef::as_ref)
            .collect();
        assert_eq!(sources, vec!["workermodule.cpp"]);
    }

    #[test]
    fn test_worker_metadata() {
        let descriptor = worker_descriptor();
        assert_eq!(descriptor.version.as_ref(), "1.0");
        assert_eq!(descriptor.description.as_ref(), "Node Preview Worker");
    }

    #[test]
    fn test_extension_lookup() {
        let descriptor = worker_descriptor();
        assert!(descriptor.extension("nodepreview_worker").is_some());
        assert!(descriptor.extension("other").is_none());
    }

    #[test]
    fn test_artifact_name() {
        let module = ExtensionModule::new("nodepreview_worker", ["workermodule.cpp"]);
        assert_eq!(
            module.artifact_name(".cpython-311-x86_64-linux-gnu.so"),
            "nodepreview_worker.cpython-311-x86_64-linux-gnu.so"
        );
    }

    #[test]
    fn test_toml_keeps_source_order() {
        let mut descriptor = worker_descriptor();
        descriptor.ext_modules.push(ExtensionModule::new(
            "helper",
            ["b.cpp", "a.cpp", "c.cpp"],
        ));

        let toml = descriptor.to_toml();
        assert!(toml.is_ok());
        let toml = toml.unwrap_or_default();
        assert!(toml.contains("name = \"nodepreview_worker\""));
        assert!(toml.contains("description = \"Node Preview Worker\""));

        let parsed = PackageDescriptor::from_toml(&toml);
        assert!(parsed.is_ok_and(|p| p == descriptor));
    }
}
