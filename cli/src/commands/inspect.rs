use anyhow::Result;
use webmap::io::{ShapefileSummary, read_shapefile};

use crate::cli::{Cli, InspectArgs};

pub fn run(cli: &Cli, args: &InspectArgs) -> Result<()> {
    if cli.verbose > 0 {
        eprintln!("[inspect] reading {}", args.shapefile.display());
    }

    let summary = ShapefileSummary::of(&read_shapefile(&args.shapefile)?);

    println!("records: {}", summary.records);
    match &summary.crs {
        Some(crs) => println!("crs:     {crs}"),
        None => println!("crs:     undeclared (no .prj sidecar)"),
    }
    println!("geometry:");
    for (kind, count) in &summary.geometry_mix {
        println!("  {kind:<18} {count}");
    }
    println!("fields:");
    for (name, sample) in &summary.fields {
        println!("  {name:<18} {sample}");
    }
    Ok(())
}
