// src/main.rs
use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use sentinel_index::cli::{Cli, Commands};
use sentinel_index::processing::indices::{lookup, names, resolve_vis};
use sentinel_index::processing::legend::build_legend;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    match &cli.command {
        Commands::Indices => {
            for name in names() {
                let definition = lookup(name)?;
                let vis = resolve_vis(name)?;
                println!(
                    "{:<20} [{}] range {}..{}  {}",
                    definition.name,
                    definition.bands.join(", "),
                    vis.min,
                    vis.max,
                    definition.description
                );
            }
        }
        Commands::Legend { index, width } => {
            let definition = lookup(index)?;
            let vis = resolve_vis(definition.name)?;
            let legend = build_legend(definition.name, &vis, *width)?;
            println!("{}", serde_json::to_string_pretty(&legend)?);
        }
        #[cfg(feature = "gdal")]
        Commands::Run {
            catalog,
            aoi,
            center,
            side,
            date,
            index,
            config,
            legend,
            preview,
            rgb,
        } => {
            use sentinel_index::io::{write_products, CatalogSource, OutputPaths, WriteOptions};
            use sentinel_index::{Aoi, CancelToken, Pipeline, PipelineConfig, PipelineRequest};

            let config = match config {
                Some(path) => PipelineConfig::from_json_file(path)?,
                None => PipelineConfig::default(),
            };
            let pipeline = Pipeline::new(config)?;
            let source = CatalogSource::open(catalog)?;

            let aoi = match (aoi, center.as_deref()) {
                (Some(path), _) => Aoi::from_geojson(&std::fs::read_to_string(path)?)?,
                (None, Some([lon, lat])) => Aoi::square(*lon, *lat, *side)?,
                _ => anyhow::bail!("give either --aoi or --center LON,LAT"),
            };
            let request = PipelineRequest::from_aoi(&aoi, date.as_str(), index.as_str());
            let output = pipeline.run(&request, &source, &CancelToken::new())?;

            let options = WriteOptions {
                fixed_point: cli.fixed_point,
                scale_factor: cli.scale_factor,
                ..WriteOptions::default()
            };
            let paths = OutputPaths {
                index: cli.output.clone(),
                legend: legend.clone(),
                preview: preview.clone(),
                rgb: rgb.clone(),
            };
            write_products(&output, &paths, &options)?;
            println!("Processing complete: {}", cli.output.display());
        }
        #[cfg(feature = "gdal")]
        Commands::Batch { config } => {
            sentinel_index::batch::process_batch(config)?;
        }
        #[cfg(not(feature = "gdal"))]
        Commands::Run { .. } | Commands::Batch { .. } => {
            anyhow::bail!("this build has no GDAL support; rebuild with --features gdal")
        }
    }

    Ok(())
}
