use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use gapfill_rs::gap_fill::{
    DetectorRegistry, GapFillConfig, GapFillPipeline, ImageWriter, MaskSource, OffsetUnit,
    StandardTiffWriter, TiffCompression,
};
use gapfill_rs::logger;

use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "gapfill", about = "Fill detector module gaps from translated exposures")]
struct Cli {
    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill the gaps of BASE using one or two translated exposures
    Fill(FillArgs),
    /// Write the stock gap mask of a detector model as TIFF
    Mask {
        #[arg(short, long, default_value = "Eiger1M")]
        detector: String,
        output: PathBuf,
    },
    /// List supported detector models
    Detectors,
}

#[derive(clap::Args, Debug)]
struct FillArgs {
    /// Exposure whose gaps are filled
    base: PathBuf,
    /// First translated exposure
    move1: PathBuf,
    /// Second translated exposure, used where the first one is gapped too
    move2: Option<PathBuf>,

    #[arg(short, long, default_value = "Eiger1M")]
    detector: String,

    /// Custom mask image used instead of the detector mask
    #[arg(long)]
    mask: Option<PathBuf>,

    /// Flat-field correction image
    #[arg(long)]
    flatfield: Option<PathBuf>,

    /// Offset of the first exposure, right/down positive
    #[arg(long, num_args = 2, value_names = ["DX", "DY"], default_values_t = [3.0, -4.0], allow_negative_numbers = true)]
    offset1: Vec<f64>,

    /// Offset of the second exposure, right/down positive
    #[arg(long, num_args = 2, value_names = ["DX", "DY"], default_values_t = [6.0, -8.0], allow_negative_numbers = true)]
    offset2: Vec<f64>,

    /// Interpret offsets in millimetres
    #[arg(long)]
    mm: bool,

    /// Pixel size in millimetres, overriding the detector table
    #[arg(long)]
    pixel_size: Option<f64>,

    #[arg(long, value_enum, default_value_t = Compression::None)]
    compression: Compression,

    /// Output path, defaults to filled_<base>.tif next to BASE
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Compression {
    None,
    Lzw,
    Deflate,
}

impl From<Compression> for TiffCompression {
    fn from(value: Compression) -> Self {
        match value {
            Compression::None => TiffCompression::None,
            Compression::Lzw => TiffCompression::Lzw,
            Compression::Deflate => TiffCompression::DeflateBalanced,
        }
    }
}

fn run_fill(args: FillArgs) -> anyhow::Result<()> {
    let config = GapFillConfig::builder()
        .detector(args.detector)
        .mask(match args.mask {
            Some(path) => MaskSource::File(path),
            None => MaskSource::Detector,
        })
        .flatfield(args.flatfield)
        .offset1(args.offset1[0], args.offset1[1])
        .offset2(args.offset2[0], args.offset2[1])
        .unit(if args.mm { OffsetUnit::Millimetre } else { OffsetUnit::Pixel })
        .pixel_size(args.pixel_size)
        .compression(args.compression.into())
        .build();

    let pipeline = GapFillPipeline::new(config)?;
    info!("Gap-fill pipeline initialized");
    info!("Detector: {}", pipeline.config().detector);
    info!("Mask: {:?}", pipeline.config().mask);

    let written = pipeline.fill_files(
        &args.base,
        Some(args.move1.as_path()),
        args.move2.as_deref(),
        args.output.as_deref(),
    )?;
    println!("{}", written.display());
    Ok(())
}

fn run_mask(detector: &str, output: &Path) -> anyhow::Result<()> {
    let registry = DetectorRegistry::builtin();
    let mask = registry.generate_mask(detector)?;
    let image = mask.mapv(f64::from);

    let config = GapFillConfig::builder().detector(detector).build();
    let mut file = std::fs::File::create(output)
        .with_context(|| format!("creating {}", output.display()))?;
    StandardTiffWriter.write_image(&image, &mut file, &config)?;
    info!(detector, output = %output.display(), "Wrote detector mask");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init(if cli.verbose { "debug" } else { "info" });

    let result = match cli.command {
        Command::Fill(args) => run_fill(args),
        Command::Mask { detector, output } => run_mask(&detector, &output),
        Command::Detectors => {
            let registry = DetectorRegistry::builtin();
            for &model in registry.models() {
                let geometry = registry.geometry(model)?;
                println!(
                    "{:<15} {:>5} x {:<5} {:.3} mm",
                    model, geometry.height, geometry.width, geometry.pixel_size_mm
                );
            }
            Ok(())
        }
    };

    if let Err(e) = &result {
        error!("Gap fill failed: {:#}", e);
    }
    result
}
