use std::path::Path;

use ffmpeg_next::format::sample::Type as SampleLayout;
use ffmpeg_next::format::Sample;
use ffmpeg_next::software::resampling;
use ffmpeg_next::util::frame::audio::Audio;

use crate::audio::domain::audio_buffer::AudioBuffer;
use crate::audio::domain::audio_reader::AudioReader;
use crate::shared::SendError;

/// Decodes any container/codec ffmpeg understands (wav, mp3, flac, ogg,
/// m4a, aac, wma, ...) and resamples it to mono f32.
pub struct FfmpegAudioReader;

impl FfmpegAudioReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FfmpegAudioReader {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioReader for FfmpegAudioReader {
    fn read_audio(
        &self,
        path: &Path,
        target_sample_rate: u32,
    ) -> Result<Option<AudioBuffer>, SendError> {
        ffmpeg_next::init()?;
        ffmpeg_next::util::log::set_level(ffmpeg_next::util::log::Level::Error);

        let mut ictx = ffmpeg_next::format::input(path)?;

        let (stream_index, params) = match ictx.streams().best(ffmpeg_next::media::Type::Audio) {
            Some(stream) => (stream.index(), stream.parameters()),
            None => return Ok(None),
        };

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(params)?;
        let mut decoder = codec_ctx.decoder().audio()?;

        let mut resampler = resampling::Context::get(
            decoder.format(),
            decoder.channel_layout(),
            decoder.rate(),
            Sample::F32(SampleLayout::Planar),
            ffmpeg_next::ChannelLayout::MONO,
            target_sample_rate,
        )?;

        let mut samples: Vec<f32> = Vec::new();
        let mut decoded = Audio::empty();
        let mut resampled = Audio::empty();

        for (stream, packet) in ictx.packets() {
            if stream.index() != stream_index {
                continue;
            }
            decoder.send_packet(&packet)?;
            drain_decoder(&mut decoder, &mut resampler, &mut decoded, &mut resampled, &mut samples)?;
        }

        decoder.send_eof()?;
        drain_decoder(&mut decoder, &mut resampler, &mut decoded, &mut resampled, &mut samples)?;

        // The resampler may still hold a tail of buffered samples.
        if let Ok(Some(delay)) = resampler.flush(&mut resampled) {
            if delay.output > 0 {
                append_mono(&resampled, &mut samples);
            }
        }

        log::debug!(
            "Decoded {} ({} samples at {target_sample_rate} Hz)",
            path.display(),
            samples.len()
        );
        Ok(Some(AudioBuffer::new(samples, target_sample_rate)))
    }
}

fn drain_decoder(
    decoder: &mut ffmpeg_next::decoder::Audio,
    resampler: &mut resampling::Context,
    decoded: &mut Audio,
    resampled: &mut Audio,
    out: &mut Vec<f32>,
) -> Result<(), SendError> {
    while decoder.receive_frame(decoded).is_ok() {
        resampler.run(decoded, resampled)?;
        append_mono(resampled, out);
    }
    Ok(())
}

fn append_mono(frame: &Audio, out: &mut Vec<f32>) {
    if frame.samples() == 0 {
        return;
    }
    out.extend_from_slice(frame.plane::<f32>(0));
}
