/*!
 * Tests for karaoke subtitle rendering
 */

use clipsub::captions::renderer::{self, karaoke_centiseconds, PLAY_RES_X, PLAY_RES_Y};
use clipsub::captions::{CaptionColor, CaptionRenderer, CaptionStyle, ClipWindow, Cue, CueParser, TimeSpan, WindowClipper};
use crate::common;

fn dialogue_lines(document: &str) -> Vec<String> {
    document
        .lines()
        .filter(|line| line.starts_with("Dialogue:"))
        .map(str::to_string)
        .collect()
}

/// Test the reference scenario: clipped cue with one inline marker
#[test]
fn test_render_withClippedCue_shouldEmitRebasedKaraoke() {
    let cues = vec![Cue::new(TimeSpan::new(8_200, 11_300), "Hello<00:00:09.000><c> world</c>")];
    let clipped = WindowClipper::new(ClipWindow::new(8_000, 11_000).unwrap()).clip(&cues);
    let rendered = renderer::render(&clipped, &CaptionStyle::default());

    assert_eq!(
        dialogue_lines(&rendered.document),
        vec!["Dialogue: 0,0:00:00.20,0:00:03.00,Default,,0,0,0,,{\\k80}Hello {\\k200}world"]
    );
}

/// Test that events follow cue order for the whole sample track
#[test]
fn test_render_withSampleTrack_shouldEmitOneEventPerCue() {
    let cues = CueParser::parse(common::SAMPLE_VTT);
    let rendered = CaptionRenderer::new(CaptionStyle::default()).render(&cues);
    let lines = dialogue_lines(&rendered.document);

    assert_eq!(rendered.event_count, 4);
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Dialogue: 0,0:00:01.00,0:00:05.00,"));
    assert!(lines[2].ends_with(",,{\\k1}Hello {\\k1}world {\\k70}and {\\k50}more {\\k50}words"));
    assert_eq!(
        lines[3],
        "Dialogue: 0,0:00:13.00,0:00:15.00,Default,,0,0,0,,{\\k200}plain \\{braced\\} cue"
    );
}

/// Test that a custom style reaches the style line
#[test]
fn test_header_withCustomStyle_shouldEncodeColorsAndMargins() {
    let style = CaptionStyle {
        font_name: "Inter".to_string(),
        font_size: 48,
        margin_vertical: 300,
        margin_horizontal: 40,
        bold: false,
        alignment: 8,
        primary_color: "#FFD700".parse::<CaptionColor>().unwrap(),
        background_color: CaptionColor::new(0x10, 0x20, 0x30, 0x40),
        ..CaptionStyle::default()
    };
    let header = CaptionRenderer::new(style).header();

    assert!(header.contains(&format!("PlayResX: {}\n", PLAY_RES_X)));
    assert!(header.contains(&format!("PlayResY: {}\n", PLAY_RES_Y)));
    assert!(header.contains(
        "Style: Default,Inter,48,&H0000D7FF,&H00FFFFFF,&H80000000,&H40302010,0,0,0,0,100,100,0,0,3,3,0.6,8,40,40,300,1\n"
    ));
}

/// Test the karaoke duration conversion
#[test]
fn test_karaoke_centiseconds_shouldRoundAndFloorAtOne() {
    assert_eq!(karaoke_centiseconds(0), 1);
    assert_eq!(karaoke_centiseconds(4), 1);
    assert_eq!(karaoke_centiseconds(15), 2);
    assert_eq!(karaoke_centiseconds(800), 80);
    assert_eq!(karaoke_centiseconds(2_304), 230);
}

/// Test that a cue with only markup emits no event
#[test]
fn test_render_withMarkupOnlyCue_shouldSkipEvent() {
    let cues = vec![
        Cue::new(TimeSpan::new(0, 1_000), "<c></c><00:00:00.500><c> </c>"),
        Cue::new(TimeSpan::new(1_000, 2_000), "kept"),
    ];
    let rendered = renderer::render(&cues, &CaptionStyle::default());

    assert_eq!(rendered.event_count, 1);
    assert_eq!(dialogue_lines(&rendered.document).len(), 1);
    assert!(rendered.document.ends_with("{\\k100}kept\n"));
}
