//! The `lumen classify` command for classifying images.

use clap::{Args, ValueEnum};
use lumen_core::output::OutputFormat as CoreOutputFormat;
use lumen_core::{ClassifiedImage, Config, ImageClassifier, OutputWriter, RankOptions};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

/// Arguments for the `classify` command.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Image files to classify
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (defaults to the configured output.format)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Minimum confidence for a class to become a label, 0.0-1.0 (overrides config)
    #[arg(long, value_name = "FLOAT")]
    pub threshold: Option<f32>,

    /// Maximum number of labels per image (overrides config)
    #[arg(long, value_name = "N")]
    pub max_results: Option<usize>,
}

/// Supported output formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON array
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Execute the classify command.
pub async fn execute(args: ClassifyArgs, config: &Config) -> anyhow::Result<()> {
    let options = resolve_options(&args, config)?;

    let classifier =
        ImageClassifier::with_options(config.active_model_dir(), config.classify.disabled, options);

    if classifier.is_disabled() {
        tracing::warn!("Classification is disabled in the configuration; results will be empty");
    } else if let Err(e) = classifier.initialize() {
        anyhow::bail!(
            "Failed to load the model from {:?}: {e}\n\n  \
             Hint: the model directory must contain model.onnx and labels.txt.",
            config.active_model_dir()
        );
    }

    let output_format = args
        .format
        .map(|f| match f {
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
        })
        .unwrap_or_else(|| {
            CoreOutputFormat::parse(&config.output.format).unwrap_or(CoreOutputFormat::Json)
        });

    // JSONL to stdout streams one record per image as results arrive;
    // every other target collects first.
    let stream_stdout = args.output.is_none() && output_format == CoreOutputFormat::JsonLines;

    let mut results = Vec::new();
    let mut succeeded: usize = 0;
    let mut failed: usize = 0;

    for path in &args.paths {
        match classifier.classify_file(path) {
            Ok(labels) => {
                succeeded += 1;
                let record = ClassifiedImage::new(path, labels);
                if stream_stdout {
                    println!("{}", serde_json::to_string(&record)?);
                } else {
                    results.push(record);
                }
            }
            Err(e) => {
                failed += 1;
                tracing::error!("Failed: {:?} - {}", path, e);
            }
        }
    }

    if succeeded == 0 {
        anyhow::bail!("All {} image(s) failed to classify", failed);
    }
    if failed > 0 {
        tracing::warn!(
            "{} of {} image(s) failed to classify",
            failed,
            args.paths.len()
        );
    }

    if let Some(output_path) = &args.output {
        let file = File::create(output_path)?;
        let mut writer =
            OutputWriter::new(BufWriter::new(file), output_format, config.output.pretty);
        writer.write_all(&results)?;
        writer.flush()?;
        tracing::info!("Output written to {:?}", output_path);
    } else if output_format == CoreOutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    Ok(())
}

/// Merge the configured ranking options with CLI overrides.
fn resolve_options(args: &ClassifyArgs, config: &Config) -> anyhow::Result<RankOptions> {
    let mut options = config.classify.rank_options();

    if let Some(threshold) = args.threshold {
        if !(0.0..=1.0).contains(&threshold) {
            anyhow::bail!("--threshold must be between 0.0 and 1.0, got {threshold}");
        }
        options.threshold = threshold;
    }

    if let Some(max_results) = args.max_results {
        if max_results == 0 {
            anyhow::bail!("--max-results must be at least 1");
        }
        options.max_results = max_results;
    }

    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_with(threshold: Option<f32>, max_results: Option<usize>) -> ClassifyArgs {
        ClassifyArgs {
            paths: vec![PathBuf::from("photo.jpg")],
            output: None,
            format: None,
            threshold,
            max_results,
        }
    }

    #[test]
    fn resolve_options_defaults_from_config() {
        let config = Config::default();
        let options = resolve_options(&args_with(None, None), &config).unwrap();
        assert!((options.threshold - config.classify.threshold).abs() < f32::EPSILON);
        assert_eq!(options.max_results, config.classify.max_results);
    }

    #[test]
    fn resolve_options_applies_overrides() {
        let config = Config::default();
        let options = resolve_options(&args_with(Some(0.3), Some(5)), &config).unwrap();
        assert!((options.threshold - 0.3).abs() < f32::EPSILON);
        assert_eq!(options.max_results, 5);
    }

    #[test]
    fn resolve_options_rejects_out_of_range_threshold() {
        let config = Config::default();
        let err = resolve_options(&args_with(Some(1.5), None), &config).unwrap_err();
        assert!(err.to_string().contains("--threshold"));
    }

    #[test]
    fn resolve_options_rejects_zero_max_results() {
        let config = Config::default();
        let err = resolve_options(&args_with(None, Some(0)), &config).unwrap_err();
        assert!(err.to_string().contains("--max-results"));
    }
}
