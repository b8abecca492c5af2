//! Native toolchain used by the builder
//!
//! [`CommandToolchain`] drives a C++ compiler as an external process. Python
//! include paths and the extension suffix are asked from the interpreter
//! itself through `sysconfig`.

use crate::errors::BuildError;
use nodepreview_logger as logger;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Compiles a set of sources into one shared library
pub trait Toolchain: Sync {
    /// Name used in log lines and error messages
    fn name(&self) -> String;

    /// Compile and link `sources` into the shared library at `output`
    fn compile(&self, sources: &[PathBuf], output: &Path) -> Result<(), BuildError>;
}

/// A C++ compiler invoked as an external command
#[derive(Debug, Clone)]
pub struct CommandToolchain {
    compiler: PathBuf,
    include_dirs: Vec<PathBuf>,
    extra_args: Vec<String>,
}

impl CommandToolchain {
    pub fn new(compiler: impl Into<PathBuf>) -> Self {
        CommandToolchain {
            compiler: compiler.into(),
            include_dirs: Vec::new(),
            extra_args: Vec::new(),
        }
    }

    pub fn with_include_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_dirs.push(dir.into());
        self
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Add the interpreter's header directory when it can be determined
    pub fn with_python(self, python: &Path) -> Self {
        match python_include_dir(python) {
            Some(dir) => self.with_include_dir(dir),
            None => {
                logger::warn(&format!(
                    "Could not determine Python include directory from {}",
                    python.display()
                ));
                self
            }
        }
    }

    /// Arguments passed to the compiler for one shared library
    pub fn args(&self, sources: &[PathBuf], output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-shared", "-fPIC", "-O2", "-std=c++17"]
            .iter()
            .map(OsString::from)
            .collect();

        if cfg!(target_os = "macos") {
            args.push("-undefined".into());
            args.push("dynamic_lookup".into());
        }

        for dir in &self.include_dirs {
            let mut flag = OsString::from("-I");
            flag.push(dir);
            args.push(flag);
        }
        args.extend(self.extra_args.iter().map(OsString::from));
        args.extend(sources.iter().map(|s| s.as_os_str().to_owned()));
        args.push("-o".into());
        args.push(output.as_os_str().to_owned());
        args
    }
}

impl Toolchain for CommandToolchain {
    fn name(&self) -> String {
        self.compiler.display().to_string()
    }

    fn compile(&self, sources: &[PathBuf], output: &Path) -> Result<(), BuildError> {
        let args = self.args(sources, output);
        logger::debug(&format!("Running {} {:?}", self.name(), args));

        let result = Command::new(&self.compiler)
            .args(&args)
            .output()
            .map_err(|source| BuildError::ToolchainUnavailable {
                tool: self.name(),
                source,
            })?;
        logger::capture_output(&self.name(), &result);

        if !result.status.success() {
            return Err(BuildError::Toolchain {
                tool: self.name(),
                code: result.status.code(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Evaluate a `sysconfig` expression with the given interpreter
fn python_sysconfig(python: &Path, expr: &str) -> Option<String> {
    let output = Command::new(python)
        .args(["-c", &format!("import sysconfig; print({expr})")])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8(output.stdout).ok()?;
    let value = value.trim();
    if value.is_empty() || value == "None" {
        return None;
    }
    Some(value.to_string())
}

/// Directory containing `Python.h` for the interpreter
pub fn python_include_dir(python: &Path) -> Option<PathBuf> {
    python_sysconfig(python, "sysconfig.get_paths()['include']").map(PathBuf::from)
}

/// Extension module suffix of the interpreter, e.g. `.cpython-311-x86_64-linux-gnu.so`
pub fn python_ext_suffix(python: &Path) -> Option<String> {
    python_sysconfig(python, "sysconfig.get_config_var('EXT_SUFFIX')")
}

/// Suffix used when no interpreter is available to ask
pub fn default_ext_suffix() -> &'static str {
    if cfg!(windows) {
        ".pyd"
    } else {
        ".so"
    }
}
