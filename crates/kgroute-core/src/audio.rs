//! PCM ↔ WAV helpers.
//!
//! Device audio arrives as bare s16le PCM; hosted speech APIs want a WAV
//! container. The CLI goes the other way when it reads a recording from disk.

use std::io::Cursor;
use std::path::Path;

use anyhow::{bail, Context};

use crate::types::AudioClip;

/// Wrap the clip's PCM in a 16-bit mono WAV document.
pub fn pcm_to_wav(clip: &AudioClip) -> anyhow::Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: clip.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(clip.pcm.len() + 44));
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        // A trailing odd byte is not a sample; drop it.
        for pair in clip.pcm.chunks_exact(2) {
            writer.write_sample(i16::from_le_bytes([pair[0], pair[1]]))?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Read a 16-bit integer WAV file into a mono clip.
///
/// Multi-channel recordings are downmixed by averaging each frame.
pub fn read_wav_file(path: &Path) -> anyhow::Result<AudioClip> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("failed to open WAV file {}", path.display()))?;
    let spec = reader.spec();

    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        bail!(
            "unsupported WAV format in {}: {} bits {:?} (need 16-bit integer PCM)",
            path.display(),
            spec.bits_per_sample,
            spec.sample_format
        );
    }

    let channels = usize::from(spec.channels.max(1));
    let samples: Vec<i16> = reader
        .samples::<i16>()
        .collect::<Result<_, _>>()
        .context("failed to decode WAV samples")?;

    let mut pcm = Vec::with_capacity(samples.len() / channels * 2);
    for frame in samples.chunks(channels) {
        let sum: i32 = frame.iter().map(|s| i32::from(*s)).sum();
        let mono = (sum / frame.len() as i32) as i16;
        pcm.extend_from_slice(&mono.to_le_bytes());
    }

    Ok(AudioClip::new(pcm, spec.sample_rate))
}
