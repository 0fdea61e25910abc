//! Batch steps run per season type against a [`DataLayout`].
//!
//! A season whose step fails is logged with the file it was reading and does not stop the other
//! season; the step as a whole still reports failure afterwards.

use crate::clean;
use crate::config::{DataLayout, PipelineConfig};
use crate::error::{Result, StatsError};
use crate::key_stats;
use crate::labeler;
use crate::ml::{analysis, prepare, train};
use crate::model::SeasonType;
use std::fmt;
use std::path::PathBuf;

/// One batch step of the pipeline, in run order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Clean,
    KeyStats,
    Label,
    Prepare,
    Analyze,
    Train,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Step::Clean,
        Step::KeyStats,
        Step::Label,
        Step::Prepare,
        Step::Analyze,
        Step::Train,
    ];

    /// The file this step reads for a season
    pub fn input(&self, layout: &DataLayout, season: SeasonType) -> PathBuf {
        match self {
            Step::Clean => layout.raw(season),
            Step::KeyStats | Step::Prepare => layout.cleaned(season),
            Step::Label | Step::Train => layout.key_stats(season),
            Step::Analyze => layout.ml_ready(season),
        }
    }

    pub fn run(&self, layout: &DataLayout, season: SeasonType, config: &PipelineConfig) -> Result<()> {
        match self {
            Step::Clean => {
                let count = clean::clean_season(
                    &layout.raw(season),
                    &layout.cleaned(season),
                    &layout.workbook(season),
                    season,
                    config,
                )?;
                log::info!("{}: cleaned {} players", season, count);
            }
            Step::KeyStats => {
                key_stats::write_key_stats(&layout.cleaned(season), &layout.key_stats(season))?;
            }
            Step::Label => {
                let count = labeler::label_season(&layout.key_stats(season), &layout.clustered(season))?;
                log::info!("{}: labeled {} players", season, count);
            }
            Step::Prepare => {
                prepare::prepare_season(
                    &layout.cleaned(season),
                    &layout.ml_ready(season),
                    &layout.player_mapping(season),
                    config.position_policy,
                )?;
            }
            Step::Analyze => {
                let summary = analysis::analyze_season(
                    &layout.ml_ready(season),
                    &layout.correlation_report(season),
                    &layout.pca_report(season),
                )?;
                log::info!(
                    "{}: {} features over {} complete rows",
                    season,
                    summary.features,
                    summary.complete_rows
                );
            }
            Step::Train => {
                train::train_season(
                    &layout.key_stats(season),
                    &layout.scaler(season),
                    &layout.cluster_model(season),
                    &config.clustering,
                )?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Clean => "clean",
            Step::KeyStats => "key-stats",
            Step::Label => "label",
            Step::Prepare => "prepare",
            Step::Analyze => "analyze",
            Step::Train => "train",
        };
        write!(f, "{}", name)
    }
}

/// Run `step` for every season, logging a failing season with its input file and carrying on
pub fn for_each_season<P, F>(name: &str, seasons: &[SeasonType], input: P, mut step: F) -> Result<()>
where
    P: Fn(SeasonType) -> PathBuf,
    F: FnMut(SeasonType) -> Result<()>,
{
    let mut failed = Vec::new();
    for &season in seasons {
        if let Err(e) = step(season) {
            log::error!("An error occurred while processing {}: {}", input(season).display(), e);
            failed.push(season.to_string());
        }
    }

    if !failed.is_empty() {
        return Err(StatsError::StepFailed {
            step: name.to_string(),
            seasons: failed.join(", "),
        });
    }
    Ok(())
}

/// Run one step for each season
pub fn run_step(step: Step, layout: &DataLayout, seasons: &[SeasonType], config: &PipelineConfig) -> Result<()> {
    for_each_season(
        &step.to_string(),
        seasons,
        |season| step.input(layout, season),
        |season| step.run(layout, season, config),
    )
}

/// Run every step in order for each season. A season stops at its first failing step.
pub fn run_pipeline(layout: &DataLayout, seasons: &[SeasonType], config: &PipelineConfig) -> Result<()> {
    for_each_season(
        "pipeline",
        seasons,
        |season| layout.raw(season),
        |season| {
            for step in Step::ALL {
                if let Err(e) = step.run(layout, season, config) {
                    log::error!("{} step failed on {}", step, step.input(layout, season).display());
                    return Err(e);
                }
            }
            Ok(())
        },
    )
}
