use anyhow::{Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::app_config::Config;
use crate::errors::DocumentError;
use crate::file_utils::FileManager;
use crate::providers::{self, Provider};
use crate::translation::{
    process_document, BatchThrottle, CascadeDispatcher, DocumentOptions, DocumentStats,
};

// @module: Application controller for script translation runs

/// What happened to one input document
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// Translated and written
    Translated {
        output: PathBuf,
        mapping: PathBuf,
        stats: DocumentStats,
    },
    /// Output already present and overwriting was not requested
    AlreadyTranslated(PathBuf),
}

/// Totals of a finished run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub translated: usize,
    pub already_translated: usize,
    /// Missing or unreadable inputs
    pub skipped: usize,
    /// Session file, when it could be written
    pub session_log: Option<PathBuf>,
}

/// Main application controller for script translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    dispatcher: CascadeDispatcher,
    throttle: BatchThrottle,
}

impl Controller {
    // @method: Create a new controller with the engines the configuration enables
    pub fn with_config(config: Config) -> Result<Self> {
        let providers = providers::build_providers(&config)?;
        Ok(Self::with_providers(config, providers))
    }

    /// Create a controller over an explicit engine chain
    pub fn with_providers(config: Config, providers: Vec<Box<dyn Provider>>) -> Self {
        let dispatcher = CascadeDispatcher::new(providers, config.blocking.clone());
        let throttle = BatchThrottle::new(&config.batch);
        Self {
            config,
            dispatcher,
            throttle,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dispatcher(&self) -> &CascadeDispatcher {
        &self.dispatcher
    }

    fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.output.directory)
    }

    /// Translate `documents` in order.
    ///
    /// The session log and run statistics are written whether or not the
    /// run completes.
    pub async fn run(&mut self, documents: &[PathBuf], force_overwrite: bool) -> Result<RunSummary> {
        let start_time = Instant::now();
        info!(
            "Starting run: {} documents, engines [{}], batch of {} with {}s cool-down",
            documents.len(),
            self.dispatcher.engine_names().join(" -> "),
            self.config.batch.size,
            self.config.batch.delay_secs
        );

        let result = self.run_documents(documents, force_overwrite).await;
        if let Err(e) = &result {
            error!("Run aborted: {:#}", e);
        }

        let log_dir = FileManager::log_dir(self.output_dir());
        let session_log = match self
            .dispatcher
            .session()
            .save(&log_dir, self.dispatcher.stats())
        {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Failed to write session log: {:#}", e);
                None
            }
        };

        self.dispatcher.log_report();
        info!("Run finished in {}", Self::format_duration(start_time.elapsed()));

        let mut summary = result?;
        summary.session_log = session_log;
        Ok(summary)
    }

    async fn run_documents(&mut self, documents: &[PathBuf], force_overwrite: bool) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        let multi_progress = MultiProgress::new();
        let files_pb = multi_progress.add(ProgressBar::new(documents.len() as u64));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        files_pb.set_style(style.progress_chars("#>-"));

        for document in documents {
            let file_name = document
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| document.display().to_string());
            files_pb.set_message(file_name.clone());

            match self.process_file(document, force_overwrite, &multi_progress).await {
                Ok(FileOutcome::Translated { output, stats, .. }) => {
                    info!(
                        "Saved {} ({} translated, {} failed, {} skipped)",
                        output.display(),
                        stats.translated,
                        stats.failed,
                        stats.skipped
                    );
                    summary.translated += 1;
                    self.dispatcher.stats_mut().documents_processed += 1;
                    self.throttle.handle_file_completed(&mut self.dispatcher).await;
                }
                Ok(FileOutcome::AlreadyTranslated(output)) => {
                    warn!(
                        "Skipping {}, translation already exists at {} (use --force to overwrite)",
                        file_name,
                        output.display()
                    );
                    summary.already_translated += 1;
                }
                Err(e) => {
                    let skippable = matches!(
                        e.downcast_ref::<DocumentError>(),
                        Some(DocumentError::NotFound(_) | DocumentError::Unreadable { .. })
                    );
                    if !skippable {
                        return Err(e).with_context(|| format!("Failed to process {}", file_name));
                    }
                    error!("Skipping {}: {}", file_name, e);
                    summary.skipped += 1;
                    self.dispatcher.stats_mut().documents_skipped += 1;
                }
            }
            files_pb.inc(1);
        }

        files_pb.finish_with_message("done");
        Ok(summary)
    }

    /// Translate one document and write its output and mapping files
    pub async fn process_file(
        &mut self,
        input: &Path,
        force_overwrite: bool,
        multi_progress: &MultiProgress,
    ) -> Result<FileOutcome> {
        let output_dir = self.output_dir();
        let output_path =
            FileManager::generate_output_path(input, &output_dir, &self.config.target_language);
        if output_path.exists() && !force_overwrite {
            return Ok(FileOutcome::AlreadyTranslated(output_path));
        }

        let content = Self::read_document(input)?;
        info!("Translating {}", input.display());

        let line_count = content.lines().count() as u64;
        let lines_pb = multi_progress.add(ProgressBar::new(line_count));
        let style = ProgressStyle::default_bar()
            .template("  [{bar:40.green/white}] {pos}/{len} lines")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        lines_pb.set_style(style);

        let options = DocumentOptions {
            restore_placeholders: self.config.output.restore_placeholders,
        };
        let processed = process_document(&content, &mut self.dispatcher, &options, |done, _| {
            lines_pb.set_position(done as u64);
        })
        .await;
        lines_pb.finish_and_clear();
        multi_progress.remove(&lines_pb);

        debug!(
            "{}: {} placeholders, {} units",
            input.display(),
            processed.placeholders.len(),
            processed.units.len()
        );

        let mapping_path = FileManager::generate_mapping_path(input, &output_dir);
        Self::write_output(&output_path, &processed.content)?;
        Self::write_output(&mapping_path, &processed.mapping())?;

        Ok(FileOutcome::Translated {
            output: output_path,
            mapping: mapping_path,
            stats: processed.stats,
        })
    }

    fn read_document(path: &Path) -> Result<String, DocumentError> {
        if !FileManager::file_exists(path) {
            return Err(DocumentError::NotFound(path.display().to_string()));
        }
        std::fs::read_to_string(path).map_err(|e| DocumentError::Unreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn write_output(path: &Path, content: &str) -> Result<(), DocumentError> {
        FileManager::write_to_file(path, content).map_err(|e| DocumentError::WriteFailed {
            path: path.display().to_string(),
            message: format!("{:#}", e),
        })
    }

    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;
        if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
