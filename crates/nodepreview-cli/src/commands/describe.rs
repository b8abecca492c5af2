//! `nodepreview describe`: print the extension build descriptor

use crate::errors::CliError;
use clap::ValueEnum;
use colored::Colorize;
use nodepreview_build::{worker_descriptor, PackageDescriptor};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescribeFormat {
    Json,
    Toml,
}

/// Render the worker descriptor in a machine-readable format
pub fn render_descriptor(format: DescribeFormat) -> Result<String, CliError> {
    let descriptor = worker_descriptor();
    match format {
        DescribeFormat::Json => Ok(serde_json::to_string_pretty(&descriptor)?),
        DescribeFormat::Toml => Ok(descriptor.to_toml()?),
    }
}

pub fn handle_describe(format: Option<DescribeFormat>) -> Result<(), CliError> {
    match format {
        Some(format) => println!("{}", render_descriptor(format)?),
        None => print_summary(&worker_descriptor()),
    }
    Ok(())
}

fn print_summary(descriptor: &PackageDescriptor) {
    println!(
        "{} {} - {}",
        descriptor.name.bold().green(),
        descriptor.version,
        descriptor.description
    );
    for module in &descriptor.ext_modules {
        println!("  {} {}", "extension:".cyan(), module.name);
        for source in &module.sources {
            println!("    {}", source);
        }
    }
}
