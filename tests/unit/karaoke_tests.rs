/*!
 * Tests for per-word karaoke timing
 */

use clipsub::captions::karaoke::MIN_WORD_DURATION_MS;
use clipsub::captions::{ClipWindow, Cue, CueParser, KaraokeSegmenter, TimeSpan, TimingRegime, WindowClipper};
use crate::common;

fn words(cue: &Cue) -> Vec<(u64, u64, String)> {
    KaraokeSegmenter::segment(cue)
        .words
        .into_iter()
        .map(|w| (w.span.start_ms(), w.span.end_ms(), w.text))
        .collect()
}

/// Test timing of a rolling two-line cue from the sample track
#[test]
fn test_segment_withRollingCue_shouldAnchorLeadingTextAtCueStart() {
    let cues = CueParser::parse(common::SAMPLE_VTT);
    let line = KaraokeSegmenter::segment(&cues[2]);

    assert_eq!(line.regime, TimingRegime::PerWord);
    assert_eq!(
        words(&cues[2]),
        vec![
            (11_300, 11_300, "Hello".to_string()),
            (11_300, 11_300, "world".to_string()),
            (11_300, 12_000, "and".to_string()),
            (12_000, 12_500, "more".to_string()),
            (12_500, 13_000, "words".to_string()),
        ]
    );
}

/// Test the ordering invariants over every timed cue of a clipped track
#[test]
fn test_segment_withClippedTrack_shouldKeepWordsInsideCue() {
    let cues = CueParser::parse(common::SAMPLE_VTT);
    let window = ClipWindow::new(8_500, 12_200).unwrap();

    for cue in WindowClipper::new(window).clip(&cues) {
        let line = KaraokeSegmenter::segment(&cue);
        if line.regime != TimingRegime::PerWord {
            continue;
        }
        let starts: Vec<u64> = line.words.iter().map(|w| w.span.start_ms()).collect();
        assert!(starts.windows(2).all(|pair| pair[0] <= pair[1]), "{:?}", starts);
        assert_eq!(line.words.last().unwrap().span.end_ms(), cue.end_ms());
        assert!(line.words.iter().all(|w| w.span.end_ms() >= w.span.start_ms()));
    }
}

/// Test that a duplicate anchor produces a zero-length word rather than a repair
#[test]
fn test_segment_withDuplicateAnchors_shouldNotApplyFloor() {
    let cue = Cue::new(TimeSpan::new(0, 2_000), "a<00:00:01.000> b<00:00:01.000> c");

    assert_eq!(
        words(&cue),
        vec![
            (0, 1_000, "a".to_string()),
            (1_000, 1_000, "b".to_string()),
            (1_000, 2_000, "c".to_string()),
        ]
    );
}

/// Test that a backwards marker is repaired with the minimum duration
#[test]
fn test_segment_withBackwardsMarker_shouldApplyFloor() {
    let cue = Cue::new(TimeSpan::new(0, 4_000), "a<00:00:02.000> b<00:00:00.500> c");
    let timed = words(&cue);

    assert_eq!(timed[1], (2_000, 2_000 + MIN_WORD_DURATION_MS, "b".to_string()));
    assert_eq!(timed[2], (500, 4_000, "c".to_string()));
}

/// Test that character references are decoded before splitting words
#[test]
fn test_segment_withCharacterReferences_shouldDecode() {
    let cue = Cue::new(TimeSpan::new(0, 1_000), "Tom&nbsp;&amp;<00:00:00.500> Jerry");
    let texts: Vec<String> = words(&cue).into_iter().map(|(_, _, text)| text).collect();

    assert_eq!(texts, vec!["Tom", "&", "Jerry"]);
}

/// Test that plain cues keep every word over the full cue span
#[test]
fn test_segment_withPlainCue_shouldUseWholeCue() {
    let cues = CueParser::parse(common::SAMPLE_VTT);
    let line = KaraokeSegmenter::segment(&cues[3]);

    assert_eq!(line.regime, TimingRegime::WholeCue);
    assert_eq!(line.words.len(), 3);
    assert!(line.words.iter().all(|w| w.span == cues[3].span));
}
