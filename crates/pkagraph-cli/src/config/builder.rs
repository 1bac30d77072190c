use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::cli::PrepareArgs;
use crate::error::{CliError, Result};
use pkagraph::pipeline::config::{OutputMode, PipelineConfigBuilder};
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn build_config(args: &PrepareArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let features_file = file_config.features.take().unwrap_or_default();
    let node_features = args
        .node_features
        .clone()
        .or(features_file.node)
        .unwrap_or(defaults.node_features);
    let edge_features = args
        .edge_features
        .clone()
        .or(features_file.edge)
        .unwrap_or(defaults.edge_features);

    let output_file = file_config.output.take().unwrap_or_default();
    let output = match (args.output_mode.paired, args.output_mode.single.as_deref()) {
        (true, _) => OutputMode::Paired,
        (false, Some(side)) => OutputMode::from_flags(false, side)
            .map_err(|e| CliError::Argument(e.to_string()))?,
        (false, None) => OutputMode::from_flags(
            output_file.paired.unwrap_or(defaults.paired),
            output_file.mode.as_deref().unwrap_or(&defaults.mode),
        )
        .map_err(|e| CliError::Config(e.to_string()))?,
    };

    let conjugate_file = file_config.conjugate.take().unwrap_or_default();
    let ph = args.ph.or(conjugate_file.ph).unwrap_or(defaults.ph);
    let ignore_danger = match (args.danger.ignore_danger, args.danger.respect_danger) {
        (true, false) => true,
        (false, true) => false,
        _ => conjugate_file
            .ignore_danger
            .unwrap_or(defaults.ignore_danger),
    };

    if args.folds == Some(0) {
        return Err(CliError::Argument(
            "The number of folds must be at least 1".to_string(),
        ));
    }

    let mut builder = PipelineConfigBuilder::new()
        .node_features(node_features)
        .edge_features(edge_features)
        .output(output)
        .ph(ph)
        .ignore_danger(ignore_danger);

    for (name, path) in file_config.datasets {
        builder = builder.dataset(name, path);
    }
    for input in &args.inputs {
        let (name, path) = parse_input(input)?;
        debug!(dataset = %name, path = %path.display(), "Adding dataset from the command line.");
        builder = builder.dataset(name, path);
    }

    let pipeline = builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    if pipeline.datasets.is_empty() {
        return Err(CliError::Config(
            "No datasets given. Add a [datasets] table to the config file or pass --input."
                .to_string(),
        ));
    }

    Ok(AppConfig {
        output_dir: args.output_dir.clone(),
        folds: args.folds,
        pipeline,
    })
}

/// Splits `NAME=PATH`; a bare path is named after its file stem.
fn parse_input(input: &str) -> Result<(String, PathBuf)> {
    if let Some((name, path)) = input.split_once('=') {
        if name.is_empty() || path.is_empty() {
            return Err(CliError::Argument(format!(
                "Invalid --input value: '{}'. Expected NAME=PATH or PATH.",
                input
            )));
        }
        return Ok((name.to_string(), PathBuf::from(path)));
    }

    let path = Path::new(input);
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            CliError::Argument(format!("Cannot derive a dataset name from '{}'", input))
        })?;
    Ok((name.to_string(), path.to_path_buf()))
}

fn split_names(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    if set_values.is_empty() {
        return Ok(config);
    }
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "features.node" => {
                config.features.get_or_insert_with(Default::default).node =
                    Some(split_names(value_str));
            }
            "features.edge" => {
                config.features.get_or_insert_with(Default::default).edge =
                    Some(split_names(value_str));
            }
            "output.paired" => {
                config.output.get_or_insert_with(Default::default).paired =
                    Some(value_str.parse().map_err(|_| {
                        CliError::Config(format!("Invalid boolean value for {}: {}", key, value_str))
                    })?);
            }
            "output.mode" => {
                config.output.get_or_insert_with(Default::default).mode =
                    Some(value_str.to_string());
            }
            "conjugate.ph" => {
                config.conjugate.get_or_insert_with(Default::default).ph =
                    Some(value_str.parse().map_err(|_| {
                        CliError::Config(format!("Invalid float value for {}: {}", key, value_str))
                    })?);
            }
            "conjugate.ignore-danger" => {
                config
                    .conjugate
                    .get_or_insert_with(Default::default)
                    .ignore_danger = Some(value_str.parse().map_err(|_| {
                    CliError::Config(format!("Invalid boolean value for {}: {}", key, value_str))
                })?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
