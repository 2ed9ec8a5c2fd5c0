use std::path::Path;

use anyhow::{Result, bail};
use webmap::{MapConfig, pipeline};

use crate::cli::{BuildArgs, Cli};

fn assert_not_stdout(path: &Path) -> Result<()> {
    if path == Path::new("-") {
        bail!("[build] stdout is not supported; provide a real file path.");
    }
    Ok(())
}

/// Load the config file (or defaults) and layer the command-line overrides on top.
fn load_config(args: &BuildArgs) -> Result<MapConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let base = path.parent().unwrap_or(Path::new(""));
            MapConfig::from_path(path)?.relative_to(base)
        }
        None => MapConfig::default(),
    };

    if let Some(geometry) = &args.geometry { config.geometry = geometry.clone() }
    if let Some(attributes) = &args.attributes { config.attributes = attributes.clone() }
    if let Some(output) = &args.output { config.output = output.clone() }
    if !args.join_keys.is_empty() { config.join.keys = args.join_keys.clone() }
    if let Some(unmatched) = args.unmatched { config.join.unmatched = unmatched.into() }
    if let Some(crs) = &args.crs { config.crs = Some(crs.clone()) }
    if let Some(name) = &args.name_field { config.fields.name = name.clone() }
    if let Some(color) = &args.color_field { config.fields.color = color.clone() }
    if let Some(width) = &args.width_field { config.fields.width = width.clone() }
    if let Some(title) = &args.title { config.panels.title = Some(title.clone()) }
    if let Some(zoom) = args.zoom { config.view.zoom = zoom }
    if let Some(legend) = &args.legend { config.panels.legend = Some(legend.clone()) }
    if let Some(footer) = &args.footer { config.panels.footer = Some(footer.clone()) }

    config.validate()?;
    Ok(config)
}

pub fn run(cli: &Cli, args: &BuildArgs) -> Result<()> {
    let config = load_config(args)?;
    assert_not_stdout(&config.output)?;
    if !args.force && config.output.exists() {
        bail!("[build] Refusing to overwrite existing file: {} (use --force)", config.output.display());
    }

    if cli.verbose > 0 {
        eprintln!(
            "[build] geometry={} attributes={} -> {}",
            config.geometry.display(),
            config.attributes.display(),
            config.output.display()
        );
    }

    let document = pipeline::run(&config)?;
    println!(
        "[build] wrote {} ({} features, {} searchable)",
        config.output.display(),
        document.overlay().features.len(),
        document.search().index.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use webmap::UnmatchedPolicy;

    use super::*;
    use crate::cli::Commands;

    fn build_args(argv: &[&str]) -> BuildArgs {
        let cli = Cli::parse_from(std::iter::once("webmap").chain(argv.iter().copied()));
        match cli.command {
            Commands::Build(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn overrides_replace_defaults() {
        let config = load_config(&build_args(&[
            "build", "--join-key", "Group", "--join-key", "Sub_Group",
            "--unmatched", "keep", "--crs", "EPSG:32645", "--zoom", "9", "--title", "Projects",
            "--name-field", "Name",
        ])).unwrap();

        assert_eq!(config.join.keys, vec!["Group", "Sub_Group"]);
        assert_eq!(config.join.unmatched, UnmatchedPolicy::Keep);
        assert_eq!(config.crs.as_deref(), Some("EPSG:32645"));
        assert_eq!(config.view.zoom, 9);
        assert_eq!(config.panels.title.as_deref(), Some("Projects"));
        assert_eq!(config.fields.name, "Name");
        assert_eq!(config.fields.color, "Color");
    }

    #[test]
    fn config_file_paths_resolve_against_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.json");
        std::fs::write(&path, r#"{ "geometry": "layers/AllGroup.shp", "join": { "unmatched": "keep" } }"#).unwrap();

        let config = load_config(&build_args(&["build", "--config", path.to_str().unwrap()])).unwrap();
        assert_eq!(config.geometry, dir.path().join("layers/AllGroup.shp"));
        assert_eq!(config.output, dir.path().join("index.html"));
        assert_eq!(config.join.unmatched, UnmatchedPolicy::Keep);
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        assert!(load_config(&build_args(&["build", "--crs", "NAD27"])).is_err());
        assert!(load_config(&build_args(&["build", "--zoom", "40"])).is_err());
    }

    #[test]
    fn stdout_is_rejected() {
        assert!(assert_not_stdout(Path::new("-")).is_err());
        assert!(assert_not_stdout(Path::new("index.html")).is_ok());
    }

    #[test]
    fn existing_output_needs_force() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("index.html");
        std::fs::write(&output, "old").unwrap();

        let cli = Cli::parse_from(["webmap", "build", "--output", output.to_str().unwrap()]);
        let Commands::Build(args) = &cli.command else { unreachable!() };
        let err = run(&cli, args).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "old");
    }
}
