/*!
 * End-to-end tests for caption processing: parse, clip, render and trim
 */

use anyhow::Result;
use clipsub::captions::{CaptionPipeline, CaptionStyle, ClipWindow, CueParser, CueWriter};
use clipsub::file_utils::FileManager;
use crate::common;

/// Test the full pipeline over the sample track
#[test]
fn test_pipeline_withSampleTrack_shouldRenderWindowOnly() {
    let pipeline = CaptionPipeline::new(CaptionStyle::default());
    let window = ClipWindow::from_start_and_duration("00:00:08.000", 3.0).unwrap();

    let rendered = pipeline.run(common::SAMPLE_VTT, window).expect("captions in window");
    let events: Vec<&str> = rendered
        .document
        .lines()
        .filter(|line| line.starts_with("Dialogue:"))
        .collect();

    assert_eq!(rendered.event_count, 1);
    assert_eq!(
        events,
        vec!["Dialogue: 0,0:00:00.20,0:00:03.00,Default,,0,0,0,,{\\k80}Hello {\\k200}world"]
    );
    assert!(rendered.document.starts_with("[Script Info]\n"));
}

/// Test that a window with no cues produces no captions at all
#[test]
fn test_pipeline_withEmptyWindow_shouldReturnNone() {
    let pipeline = CaptionPipeline::default();
    let window = ClipWindow::from_start_and_duration("00:00:05.000", 3.0).unwrap();

    assert!(pipeline.run(common::SAMPLE_VTT, window).is_none());
    assert!(pipeline.run("", window).is_none());
    assert!(pipeline.run("not a caption file at all", window).is_none());
}

/// Test that a long window keeps every cue in order
#[test]
fn test_pipeline_withWholeTrackWindow_shouldKeepCueOrder() {
    let pipeline = CaptionPipeline::default();
    let window = ClipWindow::new(0, 60_000).unwrap();

    let rendered = pipeline.run(common::SAMPLE_VTT, window).unwrap();
    let starts: Vec<&str> = rendered
        .document
        .lines()
        .filter_map(|line| line.strip_prefix("Dialogue: 0,"))
        .map(|rest| &rest[..10])
        .collect();

    assert_eq!(starts, vec!["0:00:01.00", "0:00:08.20", "0:00:11.30", "0:00:13.00"]);
}

/// Test that a trimmed track parses back to the clipped cues
#[test]
fn test_trim_withSampleTrack_shouldReparseToClippedCues() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let pipeline = CaptionPipeline::default();
    let window = ClipWindow::from_start_and_duration("00:00:09.000", 4.5).unwrap();

    let clipped = pipeline.clip_document(common::SAMPLE_VTT, window);
    let path = temp_dir.path().join("sample.trim.vtt");
    FileManager::write_to_file(&path, &CueWriter::write_vtt(&clipped, "fr"))?;

    let written = FileManager::read_to_string(&path)?;
    assert!(written.starts_with("WEBVTT\nKind: captions\nLanguage: fr\n\n"));
    assert!(written.contains("00:00:00.000 --> 00:00:02.300\nHello<00:00:00.000><c> world</c>\n"));

    let reparsed = CueParser::parse(&written);
    assert_eq!(reparsed, clipped);

    Ok(())
}

/// Test that rendering the trimmed track from zero matches rendering the source window
#[test]
fn test_trim_thenRender_shouldMatchDirectRender() {
    let pipeline = CaptionPipeline::default();
    let window = ClipWindow::from_start_and_duration("00:00:08.500", 5.0).unwrap();

    let direct = pipeline.run(common::SAMPLE_VTT, window).unwrap();

    let trimmed = CueWriter::write_vtt(&pipeline.clip_document(common::SAMPLE_VTT, window), "fr");
    let rebased_window = ClipWindow::new(0, window.duration_ms()).unwrap();
    let from_trimmed = pipeline.run(&trimmed, rebased_window).unwrap();

    assert_eq!(direct, from_trimmed);
}
