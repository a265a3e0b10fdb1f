//! Audio recording and transcription workflow.
//!
//! Drives the full session: capture with live spectrum visualization, webhook
//! upload, typewriter reveal of the result, and history append. Supports
//! external stop triggers via SIGUSR1 signal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::audio::{tones::Tone, AudioContext, ToneGenerator};
use crate::config::VoxlogConfig;
use crate::history::{word_count, HistoryStore};
use crate::recording::{
    CaptureSession, RecorderTui, RecordingCommand, ResultCommand, SpectrumAnalyzer, StateMachine,
    MIC_DENIED_MESSAGE, PROCESSING_FAILED_MESSAGE,
};
use crate::ui::TypewriterAnimation;
use crate::upload::WebhookClient;

/// Number of frequency bins in the spectrum feed.
const SPECTRUM_BINS: usize = 48;

/// Runs the recording workflow until the user quits.
///
/// Each pass records one session, uploads it, and reveals the result; the
/// user can chain sessions with 'r' from the Success and Error screens.
pub async fn handle_record(config: &VoxlogConfig, data_dir: &std::path::Path) -> anyhow::Result<()> {
    tracing::info!("=== voxlog recorder started ===");
    tracing::info!(
        "Configuration: device={}, sample_rate={}Hz, reference_level={}dBFS, webhook={}",
        config.audio.device,
        config.audio.sample_rate,
        config.audio.reference_level_db,
        config.webhook.url
    );

    let ctx = AudioContext::new();
    let tones = ToneGenerator::new(&ctx, config.ui.sounds);
    let client = WebhookClient::new(&config.webhook)?;
    let mut store = HistoryStore::open(data_dir)?;
    let mut machine = StateMachine::new();

    let mut tui = RecorderTui::new().map_err(|e| anyhow::anyhow!("Failed to initialize UI: {e}"))?;

    let external_stop = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, Arc::clone(&external_stop))
        .map_err(|e| anyhow::anyhow!("Failed to register signal handler: {e}"))?;

    let result = run_sessions(
        config,
        &ctx,
        &tones,
        &client,
        &mut store,
        &mut machine,
        &mut tui,
        &external_stop,
    )
    .await;

    tui.cleanup()
        .map_err(|e| anyhow::anyhow!("Cleanup failed: {e}"))?;

    // Echo the last transcription to stdout so it survives the alternate screen
    if let Some(text) = machine.transcription() {
        println!("{text}");
    }

    if let Err(e) = &result {
        tracing::error!("Recorder exited with error: {e}");
    }

    tracing::info!("=== voxlog recorder exited ===");
    result
}

/// Session loop: record, upload, reveal, then reset or quit on user input.
#[allow(clippy::too_many_arguments)]
async fn run_sessions(
    config: &VoxlogConfig,
    ctx: &AudioContext,
    tones: &ToneGenerator,
    client: &WebhookClient,
    store: &mut HistoryStore,
    machine: &mut StateMachine,
    tui: &mut RecorderTui,
    external_stop: &Arc<AtomicBool>,
) -> anyhow::Result<()> {
    loop {
        if !machine.try_start() {
            machine.reset();
            continue;
        }

        let outcome = record_one_session(config, ctx, tones, tui, external_stop).await?;

        let payload = match outcome {
            SessionOutcome::Payload(payload) => payload,
            SessionOutcome::Cancelled => {
                machine.reset();
                return Ok(());
            }
            SessionOutcome::MicDenied => {
                machine.fail(MIC_DENIED_MESSAGE);
                match show_error_screen(machine, tui)? {
                    ResultCommand::NewRecording => continue,
                    _ => return Ok(()),
                }
            }
        };

        machine.begin_processing();
        upload_and_reveal(config, tones, client, store, machine, tui, payload).await?;

        match machine.transcription() {
            Some(_) => match wait_for_result_input(tui)? {
                ResultCommand::NewRecording => {
                    machine.reset();
                    continue;
                }
                _ => return Ok(()),
            },
            None => match show_error_screen(machine, tui)? {
                ResultCommand::NewRecording => continue,
                _ => return Ok(()),
            },
        }
    }
}

enum SessionOutcome {
    /// Capture finished, payload ready for upload
    Payload(Vec<u8>),
    /// User cancelled, nothing to upload
    Cancelled,
    /// Microphone could not be opened
    MicDenied,
}

/// Captures one recording with live spectrum rendering.
///
/// The spectrum is rendered only while the capture session is active; once
/// the user stops or cancels, no further frames are drawn.
async fn record_one_session(
    config: &VoxlogConfig,
    ctx: &AudioContext,
    tones: &ToneGenerator,
    tui: &mut RecorderTui,
    external_stop: &Arc<AtomicBool>,
) -> anyhow::Result<SessionOutcome> {
    let mut capture = CaptureSession::new(config.audio.sample_rate, config.audio.device.clone());

    if let Err(e) = capture.start(ctx) {
        tracing::error!("Failed to start capture: {e}");
        return Ok(SessionOutcome::MicDenied);
    }

    tones.play(Tone::Start);
    tui.mark_recording_start();
    external_stop.store(false, Ordering::Relaxed);

    let sample_rate = capture.sample_rate();
    let mut analyzer = SpectrumAnalyzer::new(SPECTRUM_BINS);

    tracing::debug!("Entering recording loop. Enter transcribes, Escape/q cancels.");
    let mut frame_count = 0u64;

    let stopped_by_user = loop {
        if external_stop.load(Ordering::Relaxed) {
            tracing::info!("Received SIGUSR1: stopping via external trigger");
            break true;
        }

        match tui.handle_recording_input()? {
            RecordingCommand::Continue => {
                frame_count += 1;
                if frame_count % 60 == 0 {
                    let duration_secs = capture.sample_count() as f32 / sample_rate as f32;
                    tracing::debug!("Recording: {:.1}s captured", duration_secs);
                }

                let samples = capture.samples();
                analyzer.update(&samples, sample_rate, config.audio.reference_level_db);
                tui.render_spectrum(analyzer.data())
                    .map_err(|e| anyhow::anyhow!("Render failed: {e}"))?;
            }
            RecordingCommand::Transcribe => break true,
            RecordingCommand::Cancel => break false,
        }
    };

    // The stop tone only makes sense while the device is still held
    if capture.is_active() {
        tones.play(Tone::Stop);
    }

    let payload = capture.stop()?;
    if !stopped_by_user {
        tracing::debug!("Recording cancelled, discarding payload");
        return Ok(SessionOutcome::Cancelled);
    }

    match payload {
        Some(payload) => Ok(SessionOutcome::Payload(payload)),
        None => Ok(SessionOutcome::Cancelled),
    }
}

/// Uploads the payload, then reveals the transcription with the typewriter
/// animation and appends it to history.
async fn upload_and_reveal(
    config: &VoxlogConfig,
    tones: &ToneGenerator,
    client: &WebhookClient,
    store: &mut HistoryStore,
    machine: &mut StateMachine,
    tui: &mut RecorderTui,
    payload: Vec<u8>,
) -> anyhow::Result<()> {
    let url = config.webhook.url.clone();
    tracing::debug!("Uploading recording to {url}");

    let client_clone = client.clone();
    let upload_handle = tokio::spawn(async move { client_clone.send(payload).await });

    loop {
        if let Err(e) = tui.render_processing() {
            tracing::warn!("Failed to render progress: {e}");
        }

        if upload_handle.is_finished() {
            break;
        }

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    let text = match upload_handle.await {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            tracing::error!("Upload failed: {e}");
            machine.fail(PROCESSING_FAILED_MESSAGE);
            return Ok(());
        }
        Err(e) => {
            tracing::error!("Upload task failed: {e}");
            machine.fail(PROCESSING_FAILED_MESSAGE);
            return Ok(());
        }
    };

    let text = text.trim().to_string();
    tracing::info!("Transcription received: {} characters", text.len());

    machine.complete(text.clone());

    if let Err(e) = store.append(&text) {
        tracing::warn!("Failed to save transcription to history: {e}");
    }

    let entry_words = word_count(&text);
    let total_words = store.word_total().unwrap_or(entry_words as u64);

    let interval = std::time::Duration::from_millis(config.ui.typewriter_interval_ms);
    let mut animation = TypewriterAnimation::new(&text, interval);

    while !animation.is_complete() && !animation.is_cancelled() {
        if animation.advance().is_some() {
            tones.play(Tone::Key);
        }

        tui.render_transcription(&animation, entry_words, total_words)?;

        // Enter skips to the full text, Escape/q stops the reveal where it is
        match tui.handle_recording_input()? {
            RecordingCommand::Continue => {}
            RecordingCommand::Transcribe => animation.finish(),
            RecordingCommand::Cancel => animation.cancel(),
        }

        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    tui.render_transcription(&animation, entry_words, total_words)?;
    Ok(())
}

/// Shows the Error screen until the user retries or quits.
fn show_error_screen(
    machine: &mut StateMachine,
    tui: &mut RecorderTui,
) -> anyhow::Result<ResultCommand> {
    let message = machine
        .error_message()
        .unwrap_or(PROCESSING_FAILED_MESSAGE)
        .to_string();

    loop {
        tui.render_error(&message)?;
        match tui.handle_result_input()? {
            ResultCommand::Continue => {}
            command => return Ok(command),
        }
    }
}

/// Holds the Success screen until the user starts over or quits.
fn wait_for_result_input(tui: &mut RecorderTui) -> anyhow::Result<ResultCommand> {
    loop {
        match tui.handle_result_input()? {
            ResultCommand::Continue => {}
            command => return Ok(command),
        }
    }
}
