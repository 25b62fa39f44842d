//! deckgen - assembles the slide deck described by the content manifest.
//!
//! Takes no arguments. The manifest path comes from `DECKGEN_MANIFEST`
//! (default `presentation/deck.yaml`) and verbosity from `RUST_LOG`
//! (default `info`).

use deckgen::config::DEFAULT_LOG_FILTER;
use deckgen::preview::render_previews_with_width;
use deckgen::{Config, DeckAssembler, Manifest, write_deck};
use log::{error, info, warn};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER)).init();

    match run(&Config::from_env()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        },
    }
}

fn run(config: &Config) -> deckgen::Result<()> {
    info!("Loading manifest {}", config.manifest_path.display());
    let manifest = Manifest::load(&config.manifest_path)?;

    let assembler = DeckAssembler::for_manifest(&manifest);
    let (deck, report) = assembler.build_deck_with_report(&manifest.slides, &manifest.metadata)?;
    if !report.is_clean() {
        warn!(
            "{} slide(s) skipped, {} overlay(s) dropped",
            report.skipped.len(),
            report.dropped_overlays.len()
        );
    }

    let output = manifest.output_path();
    write_deck(&deck, &output)?;
    info!("Presentation saved to {} ({} slides)", output.display(), deck.slide_count());

    if manifest.previews.enabled {
        let preview_dir = manifest.preview_dir();
        match render_previews_with_width(&output, &preview_dir, manifest.previews.width) {
            Ok(paths) => info!("Wrote {} thumbnail(s) to {}", paths.len(), preview_dir.display()),
            Err(e) => warn!("Skipping thumbnails: {}", e),
        }
    }

    Ok(())
}
