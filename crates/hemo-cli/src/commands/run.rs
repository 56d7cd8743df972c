use anyhow::{Context, Result};
use clap::Args;
use hemo_application::{
    SessionLifecycle, SessionReport, SessionStore, SessionSweeper, UploadOutcome,
};
use hemo_core::HemoError;
use hemo_infrastructure::{ConfigService, HttpDetector};
use hemo_types::{ErrorResponse, FinalizeResponse, UploadResponse};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args)]
pub struct RunArgs {
    /// Analysis mode id (see `hemo modes`)
    #[arg(long)]
    pub mode: String,

    /// Magnification tag; the configured default when omitted
    #[arg(long)]
    pub magnification: Option<String>,

    /// Base URL of the detection service
    #[arg(long)]
    pub detector_url: String,

    /// Image files, uploaded in order
    #[arg(required = true)]
    pub images: Vec<PathBuf>,
}

/// An image that was left out of the session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedImage {
    pub path: String,
    pub error: ErrorResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutput {
    pub report: FinalizeResponse,
    pub skipped: Vec<SkippedImage>,
}

pub async fn run(config_path: Option<&Path>, args: RunArgs) -> Result<()> {
    let config = ConfigService::from_env(config_path)?.get_config()?;
    let store = Arc::new(SessionStore::new(config.clone()));
    let sweeper = SessionSweeper::spawn(
        store.clone(),
        config.engine.session_ttl(),
        config.engine.sweep_interval(),
    );

    let detector = HttpDetector::new(&args.detector_url);
    tracing::info!("[Run] Using detector at {}", detector.endpoint());
    let lifecycle = SessionLifecycle::new(config, store, Arc::new(detector));

    let output = run_batch(
        &lifecycle,
        &args.mode,
        args.magnification.as_deref(),
        &args.images,
    )
    .await;
    sweeper.shutdown();

    let json = serde_json::to_string_pretty(&output?).context("Failed to serialize report")?;
    println!("{json}");
    Ok(())
}

/// Starts a session, uploads every image and finalizes.
///
/// Images that cannot be read or whose detection fails are logged and
/// skipped; the batch continues with the next image.
pub async fn run_batch(
    lifecycle: &SessionLifecycle,
    mode: &str,
    magnification: Option<&str>,
    images: &[PathBuf],
) -> Result<RunOutput> {
    let session_id = lifecycle.start_session(mode, magnification).await?;
    let mut skipped = Vec::new();

    for path in images {
        match upload(lifecycle, &session_id, path).await {
            Ok(response) => {
                tracing::info!(
                    "[Run] {} -> image #{} ({:?})",
                    path.display(),
                    response.image_index,
                    response.counts_by_class
                );
            }
            Err(e) => {
                tracing::warn!("[Run] Skipping {}: {}", path.display(), e);
                skipped.push(SkippedImage {
                    path: path.display().to_string(),
                    error: ErrorResponse::from(&e),
                });
            }
        }
    }

    let report = lifecycle
        .finalize_session(&session_id)
        .await
        .with_context(|| format!("Failed to finalize session {session_id}"))?;

    Ok(RunOutput {
        report: finalize_response(report),
        skipped,
    })
}

fn finalize_response(report: SessionReport) -> FinalizeResponse {
    FinalizeResponse::new(
        report.session_id,
        report.mode,
        report.magnification,
        report.aggregation,
        report.interpretation,
    )
}

fn upload_response(outcome: UploadOutcome) -> UploadResponse {
    UploadResponse::new(
        outcome.session_id,
        outcome.image_index,
        outcome.counts,
        &outcome.annotated_image,
    )
}

async fn upload(
    lifecycle: &SessionLifecycle,
    session_id: &str,
    path: &Path,
) -> std::result::Result<UploadResponse, HemoError> {
    let image = tokio::fs::read(path).await?;
    let outcome = lifecycle.upload_image(session_id, &image, None).await?;
    Ok(upload_response(outcome))
}
