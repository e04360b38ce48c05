//! Command-line arguments for the snapshot binary

use clap::Parser;
use std::path::PathBuf;

use crate::VERSION;

/// Render a UPS and its outlets to a PNG snapshot
#[derive(Parser, Debug)]
#[command(name = "upsview")]
#[command(version = VERSION)]
#[command(about = "Render a UPS and its outlets to a PNG snapshot", long_about = None)]
pub struct Cli {
    /// Asset document (JSON)
    pub asset: PathBuf,

    /// Output image, defaults to the asset path with a .png extension
    pub output: Option<PathBuf>,

    /// Style configuration file (JSON or TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Where the PNG is written.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.asset.with_extension("png"))
    }

    /// Device id used on the stage, taken from the asset file name.
    pub fn asset_id(&self) -> String {
        self.asset
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("ups")
            .to_string()
    }
}
