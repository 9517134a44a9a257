mod common;

use std::path::PathBuf;

use vidrestore_core::io::encoder::{gop_policy, EncodeJob, Encoder, EncoderSettings, FallbackEncoder};
use vidrestore_core::io::frame_store::{frame_path, FrameStore};
use vidrestore_core::io::image_io::{load_frame, save_frame};

use common::{gray_frame, textured_frame};

// ---------------------------------------------------------------------------
// GOP policy
// ---------------------------------------------------------------------------

#[test]
fn test_gop_policy_boundary() {
    assert_eq!(gop_policy(24.0), (90, 30));
    assert_eq!(gop_policy(30.0), (90, 30));
    assert_eq!(gop_policy(30.1), (180, 60));
    assert_eq!(gop_policy(60.0), (180, 60));
}

// ---------------------------------------------------------------------------
// Frame store
// ---------------------------------------------------------------------------

#[test]
fn test_png_roundtrip_is_lossless() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f.png");
    let frame = textured_frame(33, 17);
    save_frame(&frame, &path).unwrap();
    assert_eq!(load_frame(&path).unwrap().data, frame.data);
}

#[test]
fn test_frame_store_numbers_from_zero() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FrameStore::new(&dir.path().join("frames")).unwrap();

    let first = store.push(&gray_frame(8, 6)).unwrap();
    let second = store.push(&textured_frame(8, 6)).unwrap();

    assert_eq!(store.count(), 2);
    assert_eq!(first.file_name().unwrap(), "frame_000000.png");
    assert_eq!(second.file_name().unwrap(), "frame_000001.png");
    assert_eq!(store.paths(), vec![first, second.clone()]);
    assert_eq!(frame_path(store.dir(), 1), second);

    let loaded = store.load(1).unwrap();
    assert_eq!(loaded.index(), 1);
    assert_eq!(loaded.data, textured_frame(8, 6).data);
}

#[test]
fn test_frame_store_pattern_matches_names() {
    let dir = tempfile::tempdir().unwrap();
    let store = FrameStore::new(dir.path()).unwrap();
    assert_eq!(store.pattern(), dir.path().join("frame_%06d.png"));
}

// ---------------------------------------------------------------------------
// Fallback encoder
// ---------------------------------------------------------------------------

fn stored_job(dir: &std::path::Path, count: usize, output: PathBuf) -> EncodeJob {
    let mut store = FrameStore::new(&dir.join("frames")).unwrap();
    for i in 0..count {
        store.push(&textured_frame(64, 48).with_index(i)).unwrap();
    }
    EncodeJob {
        frames_dir: store.dir().to_path_buf(),
        frame_count: store.count(),
        width: 64,
        height: 48,
        fps: 25.0,
        audio: None,
        output,
    }
}

#[test]
fn test_fallback_writes_raw_avi_without_ffmpeg() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.avi");
    let job = stored_job(dir.path(), 3, output.clone());

    let encoder = FallbackEncoder::new(EncoderSettings::default());
    encoder.encode(&job).unwrap();

    let bytes = std::fs::read(&output).unwrap();
    assert!(bytes.len() > 1000);
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"AVI ");
    assert!(!job.frames_dir.join("fallback_raw.avi").exists());
}

#[test]
fn test_fallback_rejects_empty_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.avi");
    let job = stored_job(dir.path(), 0, output.clone());

    let encoder = FallbackEncoder::new(EncoderSettings::default());
    assert!(encoder.encode(&job).is_err());
    assert!(!output.exists());
}

#[test]
fn test_encoder_settings_defaults() {
    let settings = EncoderSettings::default();
    assert_eq!(settings.crf, 23);
    assert_eq!(settings.preset, "medium");
    assert_eq!(settings.min_output_bytes, 1000);
}
