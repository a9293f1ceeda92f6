use clap::{Parser, Subcommand};
use logocraft::config::{self, LogocraftConfig};
use logocraft::formats::{FormatCatalog, FormatId};
use logocraft::imaging::RustBackend;
use logocraft::process::{BatchControl, Processor};
use logocraft::removal::RemovalMethod;
use logocraft::{logging, output, validate};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;

fn version_string() -> &'static str {
    let on_tag = env!("LOGOCRAFT_ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("LOGOCRAFT_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once; version_string runs a single time per process
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "logocraft")]
#[command(about = "Generate app icons, splash screens and logos from one image")]
#[command(long_about = "\
Generate app icons, splash screens and logos from one image

One source image is fanned out into a fixed catalogue of formats, each
written as <FORMAT_ID>.PNG into the output directory:

  APPICON          1024×1024  transparent
  LOGO             1024×1024  transparent
  LOGO_WIDE        1024×500   transparent
  FEATURE_GRAPHIC  1024×500   white
  DEFAULT          1242×1902  white
  DEFAULT_LG       1242×2208  white
  DEFAULT_XL       1242×2688  white
  PUSH             96×96      monochrome glyph on transparent

Accepted inputs: .png .jpg .jpeg .gif .bmp .tiff .jfif, 90 to 5000 px per
side, at most 50 MB.

With --remove-background, flat (mostly white-bordered) backgrounds are
keyed out for the transparent formats. The PUSH glyph is always keyed out.

Settings are read from ./logocraft.toml when present.
Run 'logocraft gen-config' to generate a documented logocraft.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (default: ./logocraft.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error, off (RUST_LOG overrides)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct ProcessArgs {
    /// Source image
    input: PathBuf,

    /// Output directory (created if absent)
    #[arg(short, long, default_value = "assets")]
    output: PathBuf,

    /// Format to generate; repeat for several (default: all)
    #[arg(short, long = "format", value_name = "ID")]
    formats: Vec<String>,

    /// Generate every format in the catalogue
    #[arg(long, conflicts_with = "formats")]
    all: bool,

    /// Key out flat backgrounds for transparent formats (PUSH always is)
    #[arg(long)]
    remove_background: bool,

    /// Background-removal strategy (overrides the config file)
    #[arg(long, value_name = "METHOD")]
    method: Option<RemovalMethod>,

    /// Process formats in parallel
    #[arg(long)]
    parallel: bool,

    /// Write a JSON report of all results to this file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate formats from a source image
    Process(ProcessArgs),
    /// List the format catalogue
    Formats,
    /// Validate a source image without generating anything
    Check {
        /// Source image
        input: PathBuf,
    },
    /// Print a stock logocraft.toml with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
        config.validate()?;
    }
    // A subscriber can only be missing here if something else set one first.
    logging::init(&config.logging.level).ok();
    debug!(?config, "Configuration loaded");

    match cli.command {
        Command::Process(args) => return run_process(args, config),
        Command::Formats => {
            output::print_catalog(FormatCatalog::standard());
        }
        Command::Check { input } => {
            let limits = config.validation.limits();
            let dims = validate::validate_source(&RustBackend::new(), &input, &limits)?;
            output::print_check_output(&input, dims);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn run_process(
    args: ProcessArgs,
    mut config: LogocraftConfig,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if let Some(method) = args.method {
        config.removal.method = method;
    }
    let format_ids: Vec<String> = if args.all || args.formats.is_empty() {
        FormatId::ALL.iter().map(|id| id.as_str().to_string()).collect()
    } else {
        args.formats
    };

    let processor = Processor::from_config(RustBackend::new(), FormatCatalog::standard(), &config);

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_process_event(&event) {
                println!("{}", line);
            }
        }
    });

    let control = BatchControl::with_progress(tx);
    let results = if args.parallel {
        init_thread_pool(&config.processing);
        processor.process_batch_parallel(
            &args.input,
            &args.output,
            &format_ids,
            args.remove_background,
            &control,
        )
    } else {
        processor.process_batch_with(
            &args.input,
            &args.output,
            &format_ids,
            args.remove_background,
            &control,
        )
    };
    drop(control);
    printer.join().map_err(|_| "progress printer panicked")?;

    output::print_batch_summary(&results);
    if let Some(report) = &args.report {
        let json = serde_json::to_string_pretty(&results)?;
        std::fs::write(report, json)?;
    }

    if results.iter().all(|r| r.is_success()) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Explicit `--config` must exist; otherwise `./logocraft.toml` is optional.
fn load_config(explicit: Option<&Path>) -> Result<LogocraftConfig, config::ConfigError> {
    match explicit {
        Some(path) => config::load_config_file(path),
        None => config::load_config(Path::new(".")),
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: users can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
