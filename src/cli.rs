use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "pestpress",
    version,
    about = "Lead-form export tooling for pest pressure bulk imports"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Generate(GenerateArgs),
    Split(SplitArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    pub csv_path: PathBuf,

    pub company_id: String,

    #[arg(long, default_value = "")]
    pub default_state: String,

    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub report_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SplitArgs {
    pub script_path: PathBuf,

    #[arg(long, default_value_t = 1000)]
    pub chunk_size: usize,

    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}
