//! Save-state encode, decode and restore.

#![allow(clippy::expect_used, clippy::indexing_slicing)]

use mas3507d::snapshot::{DeviceSnapshot, SnapshotError, HEADER_LEN, MAGIC};
use mas3507d::Mas3507d;
use platform::mocks::RecordingSignals;
use platform::{AudioSource, BitBangMaster, StereoFrame};
use playback::engine::RestoreError;
use playback::mocks::{frame, ScriptedDecoder};

type Device<const RING: usize> = Mas3507d<ScriptedDecoder, RecordingSignals, RING>;

fn device<const RING: usize>() -> Device<RING> {
    Mas3507d::new(ScriptedDecoder::new(), RecordingSignals::new())
}

/// Device mid-stream: gain programmed, 48 kHz frame half played, a second
/// frame buffered behind it.
fn busy_device() -> Device<0xe00> {
    let mut d = device();
    BitBangMaster::new(&mut d)
        .write(0x3a, &[0x68, 0xb0, 0x00, 0x00, 0x01, 0x07, 0xf8, 0x00, 0x00, 0x00, 0x08])
        .expect("gain write acknowledged");
    for b in frame(9, 1, 4, 2).into_iter().chain(frame(9, 1, 4, 2)) {
        d.feed_byte(b);
    }
    d.feed_byte(0);
    let mut out = [StereoFrame::SILENCE; 2];
    assert_eq!(d.produce(&mut out), 2);
    d
}

#[test]
fn save_restore_resumes_mid_frame() {
    let mut original = busy_device();
    let bytes = original.save_state().expect("encodes");
    assert_eq!(bytes[..4], MAGIC);

    let mut restored = device::<0xe00>();
    restored.restore_state(&bytes).expect("restores");

    assert_eq!(restored.snapshot(), original.snapshot());
    assert_eq!(restored.sample_rate(), 48_000);
    assert!(restored.frame_buffered(), "detection recomputed on restore");
    assert_eq!(restored.config().output_gain(), original.config().output_gain());

    let mut a = [StereoFrame::SILENCE; 6];
    let mut b = [StereoFrame::SILENCE; 6];
    assert_eq!(original.produce(&mut a), 6);
    assert_eq!(restored.produce(&mut b), 6);
    assert_eq!(a, b);
    assert_eq!(restored.decoded_frame_count(), 2);
}

#[test]
fn corrupted_body_fails_checksum() {
    let mut bytes = busy_device().save_state().expect("encodes");
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    assert!(matches!(
        DeviceSnapshot::decode(&bytes),
        Err(SnapshotError::ChecksumMismatch { .. })
    ));
}

#[test]
fn foreign_bytes_are_rejected() {
    let mut bytes = busy_device().save_state().expect("encodes");
    bytes[0] = b'X';
    assert!(matches!(DeviceSnapshot::decode(&bytes), Err(SnapshotError::BadMagic)));
}

#[test]
fn newer_version_is_rejected() {
    let mut bytes = busy_device().save_state().expect("encodes");
    bytes[4] = 9;
    assert!(matches!(
        DeviceSnapshot::decode(&bytes),
        Err(SnapshotError::UnsupportedVersion(9))
    ));
}

#[test]
fn short_input_is_truncated() {
    let bytes = busy_device().save_state().expect("encodes");
    assert!(matches!(
        DeviceSnapshot::decode(&bytes[..HEADER_LEN - 1]),
        Err(SnapshotError::Truncated(8))
    ));
}

#[test]
fn oversized_ring_is_refused_and_device_untouched() {
    let mut big = device::<0xe00>();
    for _ in 0..40 {
        big.feed_byte(0);
    }
    let bytes = big.save_state().expect("encodes");

    let mut small = device::<16>();
    BitBangMaster::new(&mut small)
        .write(0x3a, &[0x68, 0x9a, 0xa1, 0x00, 0x00])
        .expect("mute acknowledged");
    for b in frame(8, 0, 1, 2) {
        small.feed_byte(b);
    }
    small.feed_byte(0);
    assert!(small.frame_buffered());
    let before = small.snapshot();

    let err = small.restore_state(&bytes).expect_err("ring too small");
    assert!(matches!(
        err,
        SnapshotError::Restore(RestoreError::RingOverflow { len: 40, capacity: 16 })
    ));
    assert_eq!(small.snapshot(), before);
    assert!(small.config().is_muted(), "configuration kept");
    assert_eq!(small.pipeline().buffered_bytes(), 9);
    assert!(small.frame_buffered(), "buffered frame kept");

    let mut out = [StereoFrame::SILENCE; 1];
    assert_eq!(small.produce(&mut out), 1);
    assert_eq!(small.decoded_frame_count(), 1);
}

#[test]
fn error_messages_name_the_problem() {
    let err = SnapshotError::UnsupportedVersion(3);
    assert_eq!(err.to_string(), "unsupported snapshot version 3");
    let err = SnapshotError::from(RestoreError::BadChannels(5));
    assert_eq!(err.to_string(), "unsupported channel count 5");
}
