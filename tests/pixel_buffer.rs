//! Pixel buffer lifecycle: caching, invalidation, concurrent readers, pooling.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use camframe::format;
use camframe::synth;
use camframe::{FrameError, FrameRate, LengthPolicy, PixelBuffer, VideoCharacteristics};

fn mode(name: &str, width: u32, height: u32) -> Arc<VideoCharacteristics> {
    let fmt = format::by_name(name).unwrap();
    Arc::new(VideoCharacteristics::new(width, height, FrameRate::default(), fmt).unwrap())
}

fn frame(mode: &VideoCharacteristics, color: [u8; 3]) -> Vec<u8> {
    synth::solid(mode.format(), mode.width(), mode.height(), color).unwrap()
}

#[test]
fn test_extract_before_capture() {
    let buffer = PixelBuffer::new();
    assert!(!buffer.is_captured());
    assert_eq!(buffer.extract_image(), Err(FrameError::BufferNotCaptured));
}

#[test]
fn test_extract_is_idempotent_and_defensive() {
    let yuy2 = mode("YUY2", 8, 4);
    let mut buffer = PixelBuffer::new();
    buffer
        .capture(&frame(&yuy2, [16, 160, 240]), Duration::ZERO, &yuy2)
        .unwrap();

    let mut first = buffer.extract_image().unwrap();
    let second = buffer.extract_image().unwrap();
    assert_eq!(first, second);

    first.iter_mut().for_each(|b| *b = 0xAA);
    let third = buffer.extract_image().unwrap();
    assert_eq!(third, second);
}

#[test]
fn test_second_capture_replaces_first() {
    let nv12 = mode("NV12", 6, 4);
    let mut buffer = PixelBuffer::new();

    buffer
        .capture(&frame(&nv12, [255, 255, 255]), Duration::ZERO, &nv12)
        .unwrap();
    let white = buffer.extract_image().unwrap();

    buffer
        .capture(&frame(&nv12, [0, 0, 0]), Duration::from_millis(33), &nv12)
        .unwrap();
    let black = buffer.extract_image().unwrap();

    assert_ne!(white, black);
    assert!(black.iter().all(|&b| b <= 2), "stale pixels in {:?}", black);
    assert_eq!(buffer.timestamp(), Duration::from_millis(33));
    assert_eq!(buffer.sequence(), 2);
}

#[test]
fn test_capture_switches_mode() {
    let small = mode("RGB24", 2, 2);
    let large = mode("UYVY", 10, 6);
    let mut buffer = PixelBuffer::new();

    buffer
        .capture(&frame(&small, [1, 2, 3]), Duration::ZERO, &small)
        .unwrap();
    assert_eq!(buffer.extract_image().unwrap().len(), 2 * 2 * 3);

    buffer
        .capture(&frame(&large, [0, 0, 0]), Duration::ZERO, &large)
        .unwrap();
    assert_eq!(buffer.extract_image().unwrap().len(), 10 * 6 * 3);
    assert_eq!(buffer.characteristics(), Some(&large));
}

#[test]
fn test_truncated_capture_keeps_previous_frame() {
    let gray = mode("Y800", 4, 4);
    let mut buffer = PixelBuffer::new();
    buffer.capture(&[200u8; 16], Duration::ZERO, &gray).unwrap();
    let before = buffer.extract_image().unwrap();

    let err = buffer
        .capture(&[10u8; 7], Duration::from_secs(1), &gray)
        .unwrap_err();

    assert_eq!(
        err,
        FrameError::TruncatedFrame {
            expected: 16,
            actual: 7
        }
    );
    assert_eq!(buffer.extract_image().unwrap(), before);
    assert_eq!(buffer.timestamp(), Duration::ZERO);

    // A correctly sized frame still goes through afterwards
    buffer.capture(&[10u8; 16], Duration::from_secs(2), &gray).unwrap();
    assert!(buffer.extract_image().unwrap().iter().all(|&b| b == 10));
}

#[test]
fn test_unaddressable_mode_never_reaches_capture() {
    let rgb32 = format::by_name("RGB32").unwrap();
    let result = VideoCharacteristics::new(1 << 31, 1 << 31, FrameRate::default(), rgb32);
    assert_eq!(
        result.unwrap_err(),
        FrameError::InvalidDimensions {
            width: 1 << 31,
            height: 1 << 31
        }
    );

    // The largest addressable modes still demand their full size
    let wide = mode("RGB32", 1 << 16, 1 << 12);
    let mut buffer = PixelBuffer::new();
    assert_eq!(
        buffer.capture(&[], Duration::ZERO, &wide),
        Err(FrameError::TruncatedFrame {
            expected: (1 << 16) * (1 << 12) * 4,
            actual: 0
        })
    );
    assert!(!buffer.is_captured());
    assert_eq!(buffer.capacity(), 0);
}

#[test]
fn test_zero_fill_policy_pads_short_frames() {
    let gray = mode("Y800", 4, 2);
    let mut buffer = PixelBuffer::with_options(LengthPolicy::ZeroFill, 1);

    buffer.capture(&[90u8; 4], Duration::ZERO, &gray).unwrap();

    let image = buffer.extract_image().unwrap();
    assert!(image[..12].iter().all(|&b| b == 90));
    assert!(image[12..].iter().all(|&b| b == 0));
}

#[test]
fn test_concurrent_readers_agree() {
    let i420 = mode("I420", 320, 240);
    let rgb = synth::color_bars_rgb(320, 240, 7);
    let raw = synth::encode(i420.format(), &rgb, 320, 240, i420.row_order()).unwrap();

    let mut buffer = PixelBuffer::new();
    buffer.capture(&raw, Duration::ZERO, &i420).unwrap();
    let buffer = Arc::new(buffer);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || buffer.extract_image().unwrap())
        })
        .collect();

    let results: Vec<Vec<u8>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results[0].len(), 320 * 240 * 3);
    assert!(results.iter().all(|r| *r == results[0]));
}

#[test]
fn test_pooled_buffer_matches_fresh_buffer() {
    let big = mode("RGB32", 64, 48);
    let small = mode("YVYU", 6, 2);
    let payload = frame(&small, [200, 100, 50]);

    let mut pooled = PixelBuffer::new();
    pooled
        .capture(&frame(&big, [255, 0, 0]), Duration::ZERO, &big)
        .unwrap();
    pooled.extract_image().unwrap();
    let capacity = pooled.capacity();

    pooled.capture(&payload, Duration::ZERO, &small).unwrap();

    let mut fresh = PixelBuffer::new();
    fresh.capture(&payload, Duration::ZERO, &small).unwrap();

    assert_eq!(pooled.raw(), fresh.raw());
    assert_eq!(pooled.extract_image().unwrap(), fresh.extract_image().unwrap());
    assert!(pooled.capacity() >= capacity);

    let mut reused = vec![0xFFu8; 1024];
    pooled.extract_image_into(&mut reused).unwrap();
    assert_eq!(reused, fresh.extract_image().unwrap());
}
