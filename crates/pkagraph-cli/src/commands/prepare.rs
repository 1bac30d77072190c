use crate::cli::PrepareArgs;
use crate::config::{AppConfig, build_config};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use pkagraph::{
    core::features::Vocabulary,
    pipeline::{config::OutputMode, progress::ProgressReporter, sample::Sample},
    workflows::{
        self,
        dataset::{DatasetRow, RowStatus},
        error::WorkflowError,
    },
};
use std::path::Path;
use tracing::{info, warn};

pub fn run(args: PrepareArgs) -> Result<()> {
    info!("Building configuration from defaults, file and CLI arguments...");
    let config = build_config(&args)?;
    let pipeline = &config.pipeline;

    let vocabulary = Vocabulary::standard();
    let features = vocabulary
        .feature_set(
            pipeline.features.node.as_slice(),
            pipeline.features.edge.as_slice(),
        )
        .map_err(WorkflowError::from)?;
    info!(
        node_width = features.node_width(),
        edge_width = features.edge_width(),
        output = %pipeline.output,
        "Feature selection resolved."
    );

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let generator = pipeline.conjugate.generator();

    println!(
        "Preparing {} dataset(s) ({} output)...",
        pipeline.datasets.len(),
        pipeline.output
    );
    let prepared = workflows::preprocess::preprocess_all(
        &pipeline.datasets,
        &generator,
        pipeline.conjugate.ignore_danger,
        &reporter,
    )?;

    for (name, rows) in prepared {
        let samples = workflows::dataset::materialize(&rows, &features, pipeline.output, &reporter)?;
        print_summary(&name, &rows, &samples);

        if let Some(dir) = &config.output_dir {
            write_outputs(dir, &name, samples, &config)?;
        }
    }

    if progress_handler.flagged_rows() > 0 {
        warn!(
            rows = progress_handler.flagged_rows(),
            "Some rows have ambiguous or degraded conjugate pairs."
        );
    }
    if config.output_dir.is_none() {
        println!("No output directory given; nothing was written.");
    }
    Ok(())
}

fn print_summary(name: &str, rows: &[DatasetRow], samples: &[Sample]) {
    let ambiguous = rows
        .iter()
        .filter(|r| r.status == RowStatus::Ambiguous)
        .count();
    let degraded = rows
        .iter()
        .filter(|r| matches!(r.status, RowStatus::Degraded(_)))
        .count();
    println!(
        "✓ {}: {} sample(s) ({} ambiguous, {} degraded)",
        name,
        samples.len(),
        ambiguous,
        degraded
    );
}

fn write_outputs(dir: &Path, name: &str, samples: Vec<Sample>, config: &AppConfig) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let mode: OutputMode = config.pipeline.output;

    match config.folds {
        None => {
            let path = dir.join(format!("{name}.csv"));
            let written = workflows::manifest::write_manifest_file(&path, &samples, mode)?;
            println!("  Manifest with {} record(s) written to: {}", written, path.display());
        }
        Some(k) => {
            let folds = workflows::folds::slice_into_folds(samples, k)?;
            for (index, fold) in folds.iter().enumerate() {
                let path = dir.join(format!("{name}.fold-{index}.csv"));
                let written = workflows::manifest::write_manifest_file(&path, fold, mode)?;
                println!("  Fold {} ({} record(s)) written to: {}", index, written, path.display());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{DangerArgs, OutputModeArgs};
    use crate::error::CliError;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn record(id: &str, pka: f64) -> String {
        format!(
            "methanol\n  test\n\n  2  1  0  0  0  0  0  0  0  0999 V2000\n\
             \x20   0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0\n\
             \x20   1.4000    0.0000    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0\n\
             \x20 1  2  1  0\nM  END\n> <marvin_atom>\n1\n\n> <marvin_pKa>\n{pka}\n\n\
             > <pKa>\n{pka}\n\n> <ID>\n{id}\n\n$$$$\n"
        )
    }

    fn args(input: PathBuf, output_dir: PathBuf) -> PrepareArgs {
        PrepareArgs {
            config: None,
            inputs: vec![format!("train={}", input.display())],
            output_dir: Some(output_dir),
            output_mode: OutputModeArgs::default(),
            folds: None,
            ph: None,
            danger: DangerArgs::default(),
            node_features: None,
            edge_features: None,
            set_values: Vec::new(),
        }
    }

    #[test]
    fn prepare_writes_one_manifest_per_dataset() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("train.sdf");
        fs::write(&input, record("m1", 15.5) + &record("m2", 16.0)).unwrap();
        let out = dir.path().join("out");

        run(args(input, out.clone())).unwrap();

        let manifest = fs::read_to_string(out.join("train.csv")).unwrap();
        let lines: Vec<&str> = manifest.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("m1,15.5,1,"));
        assert!(lines[2].starts_with("m2,16.0,1,"));
    }

    #[test]
    fn folds_are_written_separately() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("train.sdf");
        let content: String = (0..5).map(|i| record(&format!("m{i}"), 15.5)).collect();
        fs::write(&input, content).unwrap();
        let out = dir.path().join("out");

        let mut args = args(input, out.clone());
        args.folds = Some(2);
        run(args).unwrap();

        let first = fs::read_to_string(out.join("train.fold-0.csv")).unwrap();
        let second = fs::read_to_string(out.join("train.fold-1.csv")).unwrap();
        assert_eq!(first.lines().count(), 4);
        assert_eq!(second.lines().count(), 3);
    }

    #[test]
    fn unknown_features_fail_before_any_input_is_read() {
        let dir = tempdir().unwrap();
        let mut args = args(dir.path().join("missing.sdf"), dir.path().join("out"));
        args.node_features = Some(vec!["electronegativity".to_string()]);

        assert!(matches!(
            run(args),
            Err(CliError::Core(WorkflowError::Features(_)))
        ));
    }
}
