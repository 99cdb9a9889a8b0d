/*!
 * Tests for window clipping and rebasing
 */

use clipsub::captions::clipper;
use clipsub::captions::{ClipWindow, Cue, CueParser, TimeSpan, WindowClipper};
use crate::common;

fn cue(start_ms: u64, end_ms: u64, text: &str) -> Cue {
    Cue::new(TimeSpan::new(start_ms, end_ms), text)
}

/// Test that a cue crossing the window end is truncated and rebased
#[test]
fn test_clip_withCueCrossingEnd_shouldTruncateAndRebase() {
    let window = ClipWindow::new(8_000, 11_000).unwrap();
    let clipped = clipper::clip(&[cue(8_200, 11_300, "Hello<00:00:09.000><c> world</c>")], window);

    assert_eq!(clipped.len(), 1);
    assert_eq!(clipped[0].span, TimeSpan::new(200, 3_000));
    assert_eq!(clipped[0].text, "Hello<00:00:01.000><c> world</c>");
}

/// Test that cues outside the window, or only touching it, are dropped
#[test]
fn test_clip_withTouchingCues_shouldDropThem() {
    let window = ClipWindow::new(10_000, 20_000).unwrap();
    let cues = vec![
        cue(1_000, 10_000, "ends at window start"),
        cue(9_999, 10_001, "one ms inside"),
        cue(20_000, 21_000, "starts at window end"),
        cue(25_000, 26_000, "after"),
    ];
    let clipped = WindowClipper::new(window).clip(&cues);

    assert_eq!(clipped.len(), 1);
    assert_eq!(clipped[0].text, "one ms inside");
    assert_eq!(clipped[0].span, TimeSpan::new(0, 1));
}

/// Test that markers outside the window are clamped to its edges
#[test]
fn test_rebase_inline_markers_withOutOfWindowMarkers_shouldClamp() {
    let clipper = WindowClipper::new(ClipWindow::new(5_000, 7_000).unwrap());

    assert_eq!(
        clipper.rebase_inline_markers("a<00:00:04.000> b<00:00:06.250> c<00:00:09.000> d"),
        "a<00:00:00.000> b<00:00:01.250> c<00:00:02.000> d"
    );
}

/// Test that style tags and literal angle brackets survive rebasing
#[test]
fn test_rebase_inline_markers_withTagsAndLiterals_shouldKeepThem() {
    let clipper = WindowClipper::new(ClipWindow::new(1_000, 2_000).unwrap());

    assert_eq!(
        clipper.rebase_inline_markers("<i>x < y</i><00:00:01.500><c.red> z</c>"),
        "<i>x < y</i><00:00:00.500><c.red> z</c>"
    );
}

/// Test that the clipped sample track keeps order and window-relative times
#[test]
fn test_clip_withSampleTrack_shouldKeepOrder() {
    let cues = CueParser::parse(common::SAMPLE_VTT);
    let window = ClipWindow::from_start_and_duration("00:00:08.000", 6.0).unwrap();
    let clipped = clipper::clip(&cues, window);

    let spans: Vec<(u64, u64)> = clipped.iter().map(|c| (c.start_ms(), c.end_ms())).collect();
    assert_eq!(spans, vec![(200, 3_300), (3_300, 5_000), (5_000, 6_000)]);
    assert!(clipped.iter().all(|c| c.end_ms() <= window.duration_ms()));
}

/// Test that an empty cue list clips to nothing
#[test]
fn test_clip_withNoCues_shouldReturnEmpty() {
    let window = ClipWindow::new(0, 1_000).unwrap();
    assert!(clipper::clip(&[], window).is_empty());
}
