// src/pipeline/pipeline.rs

use crate::error::Result;
use crate::models::Config;

use super::content::run_content;
use super::data::run_data;
use super::export::run_export;

/// Run the full build: data, then content, then export.
pub async fn run_build(config: &Config, skip_content: bool) -> Result<()> {
    log::info!("Starting site build");

    let total_steps = if skip_content { 2 } else { 3 };
    let mut current_step = 1;

    log::info!("Step {}/{}: Data - Loading makers and hadatai", current_step, total_steps);
    let data = run_data(config).await?;
    current_step += 1;

    if !skip_content {
        log::info!("Step {}/{}: Content - Resolving embeds and rendering", current_step, total_steps);
        run_content(config).await?;
        current_step += 1;
    }

    log::info!("Step {}/{}: Export - Writing plain-text index", current_step, total_steps);
    let exported = run_export(config).await?;

    log::info!(
        "Build complete: {} maker(s), {} hadatai, {} document(s) exported",
        data.makers.len(),
        data.hadatai.len(),
        exported
    );
    Ok(())
}
