//! Minimal RIFF/WAVE reading and writing for the command-line tool.

use crate::core::types::{AudioBuffer, Channels, Sample};
use crate::error::ReduceError;
use std::io::{Read, Write};

/// WAV audio format codes.
const WAV_FORMAT_PCM: u16 = 1;
const WAV_FORMAT_IEEE_FLOAT: u16 = 3;

/// Sample encoding for written files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavSampleFormat {
    /// 16-bit signed integer PCM.
    Pcm16,
    /// 32-bit IEEE float.
    Float32,
}

/// Decodes a WAV file from a byte slice.
///
/// Accepts 16- and 24-bit PCM and 32-bit float, mono or stereo.
pub fn read_wav(data: &[u8]) -> Result<AudioBuffer, ReduceError> {
    if data.len() < 44 || &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
        return Err(ReduceError::InvalidFormat(
            "not a RIFF/WAVE file".to_string(),
        ));
    }

    let mut format_code: u16 = 0;
    let mut num_channels: u16 = 0;
    let mut sample_rate: u32 = 0;
    let mut bits_per_sample: u16 = 0;
    let mut audio_data: &[u8] = &[];

    // Walk the chunk list for fmt and data.
    let mut cursor = 12;
    while cursor + 8 <= data.len() {
        let chunk_id = &data[cursor..cursor + 4];
        let chunk_size = u32::from_le_bytes(data[cursor + 4..cursor + 8].try_into().unwrap_or([0; 4])) as usize;
        cursor += 8;

        match chunk_id {
            b"fmt " => {
                if cursor + 16 > data.len() {
                    return Err(ReduceError::InvalidFormat("fmt chunk too short".to_string()));
                }
                format_code = u16::from_le_bytes([data[cursor], data[cursor + 1]]);
                num_channels = u16::from_le_bytes([data[cursor + 2], data[cursor + 3]]);
                sample_rate = u32::from_le_bytes([
                    data[cursor + 4],
                    data[cursor + 5],
                    data[cursor + 6],
                    data[cursor + 7],
                ]);
                bits_per_sample = u16::from_le_bytes([data[cursor + 14], data[cursor + 15]]);
            }
            b"data" => {
                let end = (cursor + chunk_size).min(data.len());
                audio_data = &data[cursor..end];
            }
            _ => {}
        }

        cursor += chunk_size;
        // Chunks are word-aligned.
        if chunk_size % 2 == 1 {
            cursor += 1;
        }
    }

    if sample_rate == 0 {
        return Err(ReduceError::InvalidFormat("no fmt chunk found".to_string()));
    }
    let channels = match num_channels {
        1 => Channels::Mono,
        2 => Channels::Stereo,
        n => {
            return Err(ReduceError::InvalidFormat(format!(
                "unsupported channel count: {}",
                n
            )))
        }
    };

    let samples: Vec<Sample> = match (format_code, bits_per_sample) {
        (WAV_FORMAT_PCM, 16) => audio_data
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0)
            .collect(),
        (WAV_FORMAT_PCM, 24) => audio_data
            .chunks_exact(3)
            .map(|b| {
                let raw = (b[0] as i32) | ((b[1] as i32) << 8) | ((b[2] as i32) << 16);
                // Sign extend from 24 bits.
                let raw = (raw << 8) >> 8;
                raw as f32 / 8388608.0
            })
            .collect(),
        (WAV_FORMAT_IEEE_FLOAT, 32) => audio_data
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
        (fmt, bits) => {
            return Err(ReduceError::InvalidFormat(format!(
                "unsupported WAV format: code={}, bits={}",
                fmt, bits
            )))
        }
    };

    Ok(AudioBuffer::new(samples, sample_rate, channels))
}

/// Reads a WAV file from disk.
pub fn read_wav_file(path: &str) -> Result<AudioBuffer, ReduceError> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| ReduceError::IoError(format!("{}: {}", path, e)))?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)
        .map_err(|e| ReduceError::IoError(format!("{}: {}", path, e)))?;
    read_wav(&data)
}

/// Encodes an audio buffer as a WAV file in the given sample format.
pub fn write_wav(buffer: &AudioBuffer, format: WavSampleFormat) -> Vec<u8> {
    let num_channels = buffer.channels.count() as u16;
    let (format_code, bytes_per_sample) = match format {
        WavSampleFormat::Pcm16 => (WAV_FORMAT_PCM, 2u16),
        WavSampleFormat::Float32 => (WAV_FORMAT_IEEE_FLOAT, 4u16),
    };
    let bits_per_sample = bytes_per_sample * 8;
    let byte_rate = buffer.sample_rate * num_channels as u32 * bytes_per_sample as u32;
    let block_align = num_channels * bytes_per_sample;
    let data_size = (buffer.data.len() * bytes_per_sample as usize) as u32;

    let mut out = Vec::with_capacity(44 + data_size as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_size).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&format_code.to_le_bytes());
    out.extend_from_slice(&num_channels.to_le_bytes());
    out.extend_from_slice(&buffer.sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits_per_sample.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());
    match format {
        WavSampleFormat::Pcm16 => {
            for &sample in &buffer.data {
                let raw = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
                out.extend_from_slice(&raw.to_le_bytes());
            }
        }
        WavSampleFormat::Float32 => {
            for &sample in &buffer.data {
                out.extend_from_slice(&sample.to_le_bytes());
            }
        }
    }
    out
}

/// Writes a WAV file to disk.
pub fn write_wav_file(
    path: &str,
    buffer: &AudioBuffer,
    format: WavSampleFormat,
) -> Result<(), ReduceError> {
    let data = write_wav(buffer, format);
    let mut file = std::fs::File::create(path)
        .map_err(|e| ReduceError::IoError(format!("{}: {}", path, e)))?;
    file.write_all(&data)
        .map_err(|e| ReduceError::IoError(format!("{}: {}", path, e)))?;
    Ok(())
}
