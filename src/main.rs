use clap::{Parser, Subcommand};
use sticker_slicer::config::{self, StickerConfig};
use sticker_slicer::imaging::Threshold;
use sticker_slicer::{naming, output, package};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sticker-slicer")]
#[command(about = "Slice a sticker sheet into a LINE sticker package")]
#[command(long_about = "\
Slice a sticker sheet into a LINE sticker package

The sheet is split into an evenly divisible grid of 8, 16, 24, 32 or 40
tiles. The grid is detected from the image dimensions alone: the layout
whose tiles come closest to the 370:320 sticker aspect wins.

Package structure:

  cats_line_stickers/
  ├── 01.png         # tiles in row-major order, resized to 370x320
  ├── ...
  ├── 32.png
  ├── main.png       # tile 01 at 240x240
  ├── tab.png        # tile 01 at 96x74
  └── manifest.json  # layout, tile size and file list

With --zip the same files are also bundled into cats_line_stickers.zip
next to the directory, ready to upload.

Background removal keys out every pixel close to the color of each tile's
top-left corner. It works best on sheets with a flat background.

Run 'sticker-slicer gen-config' to generate a documented stickers.toml.")]
#[command(version)]
struct Cli {
    /// Config file (missing file means stock defaults)
    #[arg(long, default_value = "stickers.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

/// Background removal flags for `build`.
#[derive(clap::Args, Clone)]
struct BackgroundArgs {
    /// Make pixels matching the tile corner color transparent
    #[arg(long, conflicts_with = "keep_background")]
    remove_background: bool,

    /// Keep the background even if the config enables removal
    #[arg(long)]
    keep_background: bool,

    /// Color distance below which a pixel counts as background
    #[arg(long)]
    threshold: Option<f64>,
}

#[derive(Subcommand)]
enum Command {
    /// Detect the grid layout of a sheet without writing anything
    Detect {
        /// Sticker sheet (PNG, JPEG or WebP)
        image: PathBuf,
    },
    /// Slice a sheet into a sticker package directory
    Build {
        /// Sticker sheet (PNG, JPEG or WebP)
        image: PathBuf,

        /// Package directory [default: <stem>_line_stickers]
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Also bundle the package into <package>.zip
        #[arg(long)]
        zip: bool,

        #[command(flatten)]
        background: BackgroundArgs,
    },
    /// Print a stock stickers.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match cli.command {
        Command::Detect { image } => {
            let config = config::load_config(&cli.config)?;
            let detection = package::detect(&image, &config)?;
            output::print_detection(&detection, &image, &config.layout.allowed_counts);
            if detection.layout.is_none() {
                std::process::exit(1);
            }
        }
        Command::Build {
            image,
            output: output_dir,
            zip,
            background,
        } => {
            let config = config::load_config(&cli.config)?;
            init_thread_pool(&config.processing);

            let output_dir =
                output_dir.unwrap_or_else(|| PathBuf::from(naming::package_dir_name(&image)));
            let threshold = resolve_background(&background, &config);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_package_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = package::build_package(&image, &output_dir, &config, threshold, Some(tx));
            printer.join().ok();
            let manifest = result?;

            let archive = if zip {
                let archive = naming::archive_path(&output_dir)
                    .ok_or_else(|| package::PackageError::OutputNotPackage(output_dir.clone()))?;
                package::write_archive(&output_dir, &manifest, &archive)?;
                Some(archive)
            } else {
                None
            };
            output::print_package_summary(&manifest, &output_dir, archive.as_deref());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// CLI flags win over `[background]` in the config.
fn resolve_background(args: &BackgroundArgs, config: &StickerConfig) -> Option<Threshold> {
    let remove = if args.keep_background {
        false
    } else {
        args.remove_background || config.background.remove
    };
    remove.then(|| {
        args.threshold
            .map(Threshold::new)
            .unwrap_or_else(|| config.threshold())
    })
}
