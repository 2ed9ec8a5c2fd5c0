use std::path::PathBuf;

use webmap::UnmatchedPolicy;

/// Static web map compiler (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "webmap", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv, -vvv); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Compile the map document (forbids stdout)
    Build(BuildArgs),

    /// Print a shapefile's record count, geometry mix, CRS and fields
    Inspect(InspectArgs),
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, clap::ValueEnum)]
pub enum Unmatched { Drop, Keep }

impl From<Unmatched> for UnmatchedPolicy {
    fn from(value: Unmatched) -> Self {
        match value {
            Unmatched::Drop => UnmatchedPolicy::Drop,
            Unmatched::Keep => UnmatchedPolicy::Keep,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct BuildArgs {
    /// JSON configuration file; relative paths in it resolve against its directory
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Geometry shapefile (.shp)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub geometry: Option<PathBuf>,

    /// Attribute table (.csv)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub attributes: Option<PathBuf>,

    /// Output document (must be a file path; "-" is rejected)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Join key attribute; repeat for a composite key
    #[arg(long = "join-key")]
    pub join_keys: Vec<String>,

    /// What to do with geometry records that match no attribute row
    #[arg(long, value_enum)]
    pub unmatched: Option<Unmatched>,

    /// Source coordinate system, e.g. EPSG:32645; overrides the .prj sidecar
    #[arg(long)]
    pub crs: Option<String>,

    /// Attribute holding the display name (tooltip and search key)
    #[arg(long)]
    pub name_field: Option<String>,

    /// Attribute holding the stroke color
    #[arg(long)]
    pub color_field: Option<String>,

    /// Attribute holding the stroke width
    #[arg(long)]
    pub width_field: Option<String>,

    /// Title banner text
    #[arg(long)]
    pub title: Option<String>,

    /// Initial zoom level
    #[arg(long)]
    pub zoom: Option<u8>,

    /// Legend image path or URL
    #[arg(long)]
    pub legend: Option<String>,

    /// Footer HTML snippet, inserted as-is
    #[arg(long)]
    pub footer: Option<String>,

    /// Overwrite if the file exists
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct InspectArgs {
    /// Shapefile to describe (.shp)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub shapefile: PathBuf,
}
