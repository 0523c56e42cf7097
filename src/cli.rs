use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "orderfill",
    version,
    about = "Inspect and fill movie order forms in .docx documents"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Inspect(InspectArgs),
    Update(UpdateArgs),
    Status(StatusArgs),
    Fill(FillArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub report_path: Option<PathBuf>,

    #[arg(long)]
    pub structure_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    #[arg(long, default_value = "order.json")]
    pub data: PathBuf,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub street: Option<String>,

    #[arg(long)]
    pub postal_code_city: Option<String>,

    #[arg(long)]
    pub country: Option<String>,

    #[arg(long = "movie")]
    pub movies: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "order.json")]
    pub data: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct FillArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long, default_value = "order.json")]
    pub data: PathBuf,

    #[arg(long)]
    pub structure: Option<PathBuf>,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub report_path: Option<PathBuf>,
}
