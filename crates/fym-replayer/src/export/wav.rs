//! WAV file export functionality

use std::path::Path;

use super::{to_i16, RenderLimit};
use crate::{FymPlayer, ReplayerError, Result};

/// Stereo frames rendered per chunk
const FRAMES_PER_CHUNK: usize = 4096;

/// Export `seconds` of playback to a 16-bit stereo WAV file
///
/// Returns the number of stereo frames written.
///
/// # Examples
///
/// ```no_run
/// use emu8910::ChipConfig;
/// use fym_replayer::{export::export_to_wav, FymPlayer};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut player = FymPlayer::load_file("song.fym", ChipConfig::default())?;
/// export_to_wav(&mut player, "output.wav", 30.0)?;
/// # Ok(())
/// # }
/// ```
pub fn export_to_wav<P: AsRef<Path>>(
    player: &mut FymPlayer,
    path: P,
    seconds: f64,
) -> Result<usize> {
    render_to_wav(player, path, RenderLimit::Seconds(seconds))
}

/// Export playback to a 16-bit stereo WAV file until `limit` is reached
///
/// Loop limits are checked per chunk, so the file may run up to one chunk
/// past the loop point.
pub fn render_to_wav<P: AsRef<Path>>(
    player: &mut FymPlayer,
    path: P,
    limit: RenderLimit,
) -> Result<usize> {
    let sample_rate = player.sample_rate();
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: sample_rate.round() as u32,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let path = path.as_ref();
    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| ReplayerError::ExportError(format!("Failed to create WAV file: {e}")))?;

    let max_frames = limit.max_samples(sample_rate);
    let mut buffer = vec![0.0f32; FRAMES_PER_CHUNK * 2];
    let mut frames_written = 0;

    tracing::info!(path = %path.display(), ?limit, "exporting WAV");

    while frames_written < max_frames {
        if limit.loops().is_some_and(|loops| player.loop_count() >= loops) {
            break;
        }

        let frames = (max_frames - frames_written).min(FRAMES_PER_CHUNK);
        let chunk = &mut buffer[..frames * 2];
        player.render(chunk);

        for &sample in chunk.iter() {
            writer
                .write_sample(to_i16(sample))
                .map_err(|e| ReplayerError::ExportError(format!("Failed to write sample: {e}")))?;
        }
        frames_written += frames;
    }

    writer
        .finalize()
        .map_err(|e| ReplayerError::ExportError(format!("Failed to finalize WAV file: {e}")))?;

    tracing::debug!(frames = frames_written, "WAV export complete");
    Ok(frames_written)
}
