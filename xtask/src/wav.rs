//! Streaming 16-bit stereo PCM WAV writer.

use std::io::{self, Seek, SeekFrom, Write};

use platform::StereoFrame;

const CHANNELS: u16 = 2;
const BITS_PER_SAMPLE: u16 = 16;
const BLOCK_ALIGN: u16 = CHANNELS * (BITS_PER_SAMPLE / 8);
const HEADER_LEN: usize = 44;

/// Writes the header first with placeholder sizes, then frames as they
/// arrive; [`finish`](WavWriter::finish) patches the sizes.
pub struct WavWriter<W: Write + Seek> {
    inner: W,
    frame_count: u32,
    sample_rate: u32,
}

impl<W: Write + Seek> WavWriter<W> {
    pub fn new(mut writer: W, sample_rate: u32) -> io::Result<Self> {
        writer.write_all(&[0u8; HEADER_LEN])?;
        Ok(Self {
            inner: writer,
            frame_count: 0,
            sample_rate,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn write_frames(&mut self, frames: &[StereoFrame]) -> io::Result<()> {
        let mut bytes = Vec::with_capacity(frames.len().saturating_mul(4));
        for frame in frames {
            bytes.extend_from_slice(&to_i16(frame.left).to_le_bytes());
            bytes.extend_from_slice(&to_i16(frame.right).to_le_bytes());
        }
        self.inner.write_all(&bytes)?;
        let added = u32::try_from(frames.len()).unwrap_or(u32::MAX);
        self.frame_count = self.frame_count.saturating_add(added);
        Ok(())
    }

    /// Patch the header with the final sizes and return the writer.
    pub fn finish(mut self) -> io::Result<W> {
        let data_size = self.frame_count.saturating_mul(u32::from(BLOCK_ALIGN));
        let riff_size = data_size.saturating_add(36);
        let byte_rate = self.sample_rate.saturating_mul(u32::from(BLOCK_ALIGN));

        self.inner.seek(SeekFrom::Start(0))?;

        // RIFF header
        self.inner.write_all(b"RIFF")?;
        self.inner.write_all(&riff_size.to_le_bytes())?;
        self.inner.write_all(b"WAVE")?;

        // fmt sub-chunk
        self.inner.write_all(b"fmt ")?;
        self.inner.write_all(&16u32.to_le_bytes())?;
        self.inner.write_all(&1u16.to_le_bytes())?; // PCM
        self.inner.write_all(&CHANNELS.to_le_bytes())?;
        self.inner.write_all(&self.sample_rate.to_le_bytes())?;
        self.inner.write_all(&byte_rate.to_le_bytes())?;
        self.inner.write_all(&BLOCK_ALIGN.to_le_bytes())?;
        self.inner.write_all(&BITS_PER_SAMPLE.to_le_bytes())?;

        // data sub-chunk
        self.inner.write_all(b"data")?;
        self.inner.write_all(&data_size.to_le_bytes())?;

        self.inner.seek(SeekFrom::End(0))?;
        Ok(self.inner)
    }
}

/// Back to 16-bit, saturating anything a gain above unity pushed past full
/// scale.
#[allow(clippy::cast_possible_truncation)] // clamped to the i16 range first
fn to_i16(sample: f32) -> i16 {
    (sample * 32768.0).round().clamp(-32768.0, 32767.0) as i16
}

#[cfg(test)]
mod tests {
    #![allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]

    use std::io::Cursor;

    use super::*;

    fn u32_at(buf: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(buf[at..at + 4].try_into().unwrap())
    }

    #[test]
    fn header_describes_stereo_pcm() {
        let mut w = WavWriter::new(Cursor::new(Vec::new()), 48_000).unwrap();
        w.write_frames(&[StereoFrame::SILENCE; 10]).unwrap();
        let buf = w.finish().unwrap().into_inner();

        assert_eq!(&buf[0..4], b"RIFF");
        assert_eq!(u32_at(&buf, 4), 36 + 40);
        assert_eq!(&buf[8..12], b"WAVE");
        assert_eq!(&buf[12..16], b"fmt ");
        assert_eq!(u16::from_le_bytes([buf[22], buf[23]]), 2);
        assert_eq!(u32_at(&buf, 24), 48_000);
        assert_eq!(u32_at(&buf, 28), 48_000 * 4);
        assert_eq!(&buf[36..40], b"data");
        assert_eq!(u32_at(&buf, 40), 40);
        assert_eq!(buf.len(), 44 + 40);
    }

    #[test]
    fn samples_are_interleaved_and_clamped() {
        let mut w = WavWriter::new(Cursor::new(Vec::new()), 44_100).unwrap();
        w.write_frames(&[
            StereoFrame::from_i16(100, -100),
            StereoFrame::new(2.0, -2.0),
        ])
        .unwrap();
        assert_eq!(w.frame_count(), 2);
        let buf = w.finish().unwrap().into_inner();

        let pcm: Vec<i16> = buf[44..]
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(pcm, [100, -100, i16::MAX, i16::MIN]);
    }
}
