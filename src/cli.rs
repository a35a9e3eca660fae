use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::backends::ExportFormat;
use crate::config::PageSize;

/// Inspect and recolor SVG documents.
#[derive(Parser, Debug)]
#[command(name = "svgtint", version, about)]
pub struct Args {
    /// TOML config file (history limit, zoom range, export defaults)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the document's colors by usage
    Palette {
        input: PathBuf,

        /// Print the palette as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace every use of one color with another
    Replace {
        input: PathBuf,
        /// Color to replace (any CSS notation)
        from: String,
        /// New color, or `transparent`
        to: String,
        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Make every use of a color transparent
    Erase {
        input: PathBuf,
        color: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Map the most frequent colors onto a new palette, in rank order
    Remap {
        input: PathBuf,
        /// Target colors, most frequent source first
        #[arg(required = true)]
        colors: Vec<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fold the palette down to its N most frequent colors
    Reduce {
        input: PathBuf,
        /// Number of colors to keep
        #[arg(short = 'n', long = "colors")]
        colors: usize,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export the document as SVG or a bitmap
    Export {
        input: PathBuf,
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
        /// Output format (guessed from the output extension if omitted)
        #[arg(short, long, value_enum)]
        format: Option<ExportFormat>,
        /// Round geometric attributes (SVG only)
        #[arg(long)]
        round: bool,
        /// Decimal places kept by --round
        #[arg(long)]
        precision: Option<u8>,
        /// Bitmap scale relative to the canvas size
        #[arg(long)]
        scale: Option<f32>,
        /// JPEG quality, 1-100
        #[arg(long)]
        quality: Option<u8>,
        /// Print resolution
        #[arg(long)]
        dpi: Option<u32>,
        /// Print page size
        #[arg(long, value_enum)]
        page: Option<PageSize>,
    },

    /// Open the interactive editor
    Edit {
        input: PathBuf,
        /// Save target (defaults to the input file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
