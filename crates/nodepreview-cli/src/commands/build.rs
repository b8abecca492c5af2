//! `nodepreview build`: compile the worker extension from its descriptor

use crate::errors::CliError;
use crate::logger;
use clap::Args;
use nodepreview_build::toolchain::{default_ext_suffix, python_ext_suffix};
use nodepreview_build::{worker_descriptor, BuildOptions, Builder, CommandToolchain};
use nodepreview_config::Config;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct BuildCommand {
    /// Directory containing the extension sources
    #[arg(long, default_value = ".")]
    pub source_dir: PathBuf,
    /// Output directory for the artifact (default: config `output-dir`)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
    /// Artifact suffix, e.g. `.so` (default: asked from the Python interpreter)
    #[arg(long)]
    pub ext_suffix: Option<String>,
    /// C++ compiler to use (default: config `compiler`, then PATH)
    #[arg(long)]
    pub compiler: Option<PathBuf>,
}

pub fn handle_build(cmd: BuildCommand) -> Result<(), CliError> {
    let mut config = Config::load()?;

    let compiler = match cmd.compiler {
        Some(compiler) => compiler,
        None => config.ensure_compiler()?,
    };
    let python = match config.ensure_python() {
        Ok(python) => Some(python),
        Err(e) => {
            logger::debug(&format!("No Python interpreter: {}", e));
            None
        }
    };
    if let Err(e) = config.save() {
        logger::warn(&format!("Failed to save config: {}", e));
    }

    let ext_suffix = cmd
        .ext_suffix
        .or_else(|| python.as_deref().and_then(python_ext_suffix))
        .unwrap_or_else(|| default_ext_suffix().to_string());

    let mut toolchain = CommandToolchain::new(compiler);
    if let Some(python) = python.as_deref() {
        toolchain = toolchain.with_python(python);
    }

    let options = BuildOptions {
        source_dir: cmd.source_dir,
        out_dir: cmd.out_dir.unwrap_or_else(|| config.output_dir()),
        ext_suffix,
    };
    let descriptor = worker_descriptor();

    logger::spinner_start(&format!("Building {}...", descriptor.name));
    match Builder::new(toolchain).build(&descriptor, &options) {
        Ok(report) => {
            logger::spinner_success(&format!("Built {}", descriptor.name));
            for artifact in &report.artifacts {
                logger::success(&format!(
                    "{} -> {}",
                    artifact.module,
                    artifact.path.display()
                ));
            }
            logger::info(&format!("Build record: {}", report.record.display()));
            Ok(())
        }
        Err(e) => {
            logger::spinner_error(&format!("Failed to build {}", descriptor.name));
            logger::show_log_path();
            Err(e.into())
        }
    }
}
