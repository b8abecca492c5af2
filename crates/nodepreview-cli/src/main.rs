use clap::{Parser, Subcommand};
use nodepreview::{
    commands::{
        build::{self, BuildCommand},
        config::{self, ConfigAction},
        describe::{self, DescribeFormat},
        preview,
    },
    logger, GlobalOpts,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "nodepreview")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Node Preview Worker tools",
    long_about = "NodePreview worker tools: build the nodepreview_worker extension and render node preview thumbnails."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the extension build descriptor
    Describe {
        /// Machine-readable output format
        #[arg(long, value_enum)]
        format: Option<DescribeFormat>,
    },
    /// Compile the nodepreview_worker extension module
    Build(BuildCommand),
    /// Render an RGBA float thumbnail of an image
    Thumbnail {
        path: PathBuf,
        /// Length of the longer thumbnail side (default: config `thumbnail-size`)
        #[arg(short = 's', long)]
        max_size: Option<u32>,
        /// Write the thumbnail as an 8-bit image
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Load an image's raw samples into a buffer
    Load {
        path: PathBuf,
        /// Buffer size in bytes (default: exactly the image size)
        #[arg(long)]
        size: Option<usize>,
    },
    /// Convert a name into an identifier-safe string
    Identifier { name: String },
    /// Configure the nodepreview tools
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

fn init_tracing() {
    let level = logger::verbosity_to_filter();
    let default_filter = format!(
        "nodepreview={level},nodepreview_build={level},nodepreview_worker={level}"
    );
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level(), false) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing();

    let result = match cli.command {
        Commands::Describe { format } => describe::handle_describe(format),
        Commands::Build(cmd) => build::handle_build(cmd),
        Commands::Thumbnail {
            path,
            max_size,
            output,
        } => preview::handle_thumbnail(&path, max_size, output),
        Commands::Load { path, size } => preview::handle_load(&path, size),
        Commands::Identifier { name } => {
            preview::handle_identifier(&name);
            Ok(())
        }
        Commands::Config { action } => config::handle_config(action, &cli.global),
    };

    if let Err(e) = result {
        logger::error(&e.to_string());
        std::process::exit(1);
    }
}
