use std::path::{Path, PathBuf};

use anyhow::Result;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::core::config::RosterConfig;
use crate::core::error::{BatchError, ConfigError};
use crate::core::model::{
    Confidence, ImageId, RawLine, Report, ReviewEntry, ReviewReason, ValidatedCandidate, Verdict,
};
use crate::export::{exporter_for, ExportFormat};
use crate::ocr::{ImageCropper, LineSource};
use crate::parser::{validate, RosterParser};
use crate::reconcile::{MaxPowerReconciler, Reconciler};
use crate::report::build_report;

/// OCR result of one image as handed over by the collaborator.
#[derive(Debug)]
pub struct ImageInput {
    pub image: ImageId,
    pub lines: Result<Vec<RawLine>>,
}

/// Per-image output of normalize, parse and validate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageOutcome {
    pub validated: Vec<ValidatedCandidate>,
    pub review: Vec<ReviewEntry>,
}

#[derive(Debug)]
pub struct RosterPipeline {
    parser: RosterParser,
    reconciler: MaxPowerReconciler,
}

impl RosterPipeline {
    pub fn new(config: RosterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            parser: RosterParser::new(config),
            reconciler: MaxPowerReconciler::new(),
        })
    }

    pub fn config(&self) -> &RosterConfig {
        self.parser.config()
    }

    pub fn process_image(&self, lines: &[RawLine]) -> ImageOutcome {
        let parsed = self.parser.parse_image(lines);
        let mut review = parsed.review;
        let mut validated = Vec::with_capacity(parsed.candidates.len());

        for candidate in parsed.candidates {
            let checked = validate(candidate, self.config());
            let reason = match checked.verdict {
                Verdict::SuspectMalformedDigits => Some(ReviewReason::MalformedDigits),
                Verdict::SuspectMalformedName => Some(ReviewReason::MalformedName),
                Verdict::SuspectLowPower => {
                    Some(ReviewReason::LowPower(checked.candidate.power.unwrap_or(0)))
                }
                Verdict::Valid if checked.candidate.confidence == Confidence::Suspect => {
                    Some(ReviewReason::LowConfidence)
                }
                Verdict::Valid => None,
            };
            if let Some(reason) = reason {
                review.push(ReviewEntry {
                    image: checked.candidate.source_image.clone(),
                    line_index: Some(checked.candidate.line_index),
                    raw_text: checked.candidate.raw_text.clone(),
                    reason,
                });
            }
            validated.push(checked);
        }

        ImageOutcome { validated, review }
    }

    fn check_batch_size(&self, count: usize) -> Result<(), BatchError> {
        if count == 0 {
            return Err(BatchError::Empty);
        }
        let max = self.config().max_images;
        if count > max {
            return Err(BatchError::TooManyImages { count, max });
        }
        Ok(())
    }

    fn outcome_for(&self, image: &ImageId, lines: Result<Vec<RawLine>>) -> ImageOutcome {
        match lines {
            Ok(lines) => {
                let outcome = self.process_image(&lines);
                info!(
                    image = %image,
                    lines = lines.len(),
                    candidates = outcome.validated.len(),
                    "processed image"
                );
                outcome
            }
            Err(err) => {
                warn!(image = %image, error = %err, "image failed");
                ImageOutcome {
                    validated: Vec::new(),
                    review: vec![ReviewEntry::for_image(image, format!("{err:#}"))],
                }
            }
        }
    }

    /// Folds per-image outcomes into the final report. Runs once per batch,
    /// after every image is done.
    pub fn finish(&self, outcomes: Vec<ImageOutcome>) -> Report {
        let mut validated = Vec::new();
        let mut review = Vec::new();
        for outcome in outcomes {
            validated.extend(outcome.validated);
            review.extend(outcome.review);
        }
        let records = self.reconciler.reconcile(&validated);
        let report = build_report(&records).with_review(review);
        let summary = report.summary();
        info!(
            players = summary.total_players,
            flagged = summary.flagged_players,
            review = report.review.len(),
            "batch reconciled"
        );
        report
    }

    /// Processes OCR output that is already in memory.
    pub fn process_lines(&self, batch: Vec<ImageInput>) -> Result<Report, BatchError> {
        self.check_batch_size(batch.len())?;
        let outcomes = batch
            .into_iter()
            .map(|input| self.outcome_for(&input.image, input.lines))
            .collect();
        Ok(self.finish(outcomes))
    }

    /// Crops (optionally), OCRs and parses the images in parallel, then
    /// reconciles the whole batch.
    pub fn process_images(
        &self,
        paths: &[PathBuf],
        source: &dyn LineSource,
        cropper: Option<&dyn ImageCropper>,
    ) -> Result<Report, BatchError> {
        self.check_batch_size(paths.len())?;
        info!(images = paths.len(), engine = source.name(), "processing batch");

        let images: Vec<ImageId> = paths
            .iter()
            .enumerate()
            .map(|(ordinal, path)| ImageId::new(ordinal, display_name(path)))
            .collect();

        // Images are independent until reconciliation.
        let outcomes: Vec<ImageOutcome> = images
            .par_iter()
            .zip(paths.par_iter())
            .map(|(image, path)| {
                let lines = extract(image, path, source, cropper);
                self.outcome_for(image, lines)
            })
            .collect();

        Ok(self.finish(outcomes))
    }
}

fn extract(
    image: &ImageId,
    path: &Path,
    source: &dyn LineSource,
    cropper: Option<&dyn ImageCropper>,
) -> Result<Vec<RawLine>> {
    match cropper {
        Some(cropper) => {
            let cropped = cropper.crop(image, path)?;
            source.extract_lines(image, &cropped)
        }
        None => source.extract_lines(image, path),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn export_report(report: &Report, output: &Path, formats: &[ExportFormat]) -> Result<()> {
    for format in formats {
        exporter_for(*format, output.to_path_buf()).export(report)?;
    }
    Ok(())
}
