//! NodePreview extension build descriptor
//!
//! Declares the `nodepreview_worker` extension module (its sources and
//! package metadata) and provides the build tool that turns a descriptor into
//! one loadable artifact per extension module.
//!
//! The descriptor is pure data and raises no errors of its own; everything
//! that can go wrong during a build (missing sources, compiler failures) is
//! reported by [`Builder`].

pub mod builder;
pub mod descriptor;
pub mod errors;
pub mod registry;
pub mod toolchain;

pub use builder::{BuildOptions, BuildReport, BuiltArtifact, Builder, BUILD_RECORD};
pub use descriptor::{worker_descriptor, ExtensionModule, PackageDescriptor};
pub use errors::{BuildError, DescriptorError};
pub use registry::{RegisterOutcome, Registration, Registry};
pub use toolchain::{CommandToolchain, Toolchain};
