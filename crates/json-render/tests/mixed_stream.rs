//! Prose/patch classification, line-level and character-level.

use json_render::{
    classify, Classified, MixedStreamParser, MixedStreamSink, Op, SpecStreamTransform, StreamPart,
};
use proptest::prelude::*;

const MIXED: &str = concat!(
    "Here is a dashboard for you.\n",
    "{\"op\":\"add\",\"path\":\"/root\",\"value\":\"main\"}\n",
    "It has a card:\n",
    "```spec\n",
    "{\"op\":\"add\",\"path\":\"/elements/main\",\"value\":{\"type\":\"Card\",\"props\":{}}}\n",
    "this line is not a patch and is dropped\n",
    "\n",
    "{\"op\":\"add\",\"path\":\"/elements/main/props/title\",\"value\":\"Sales · Q3\"}\n",
    "```\n",
    "  {not json either}\n",
    "`inline code` stays prose\n",
    "Enjoy! ✓",
);

#[derive(Default)]
struct Events(Vec<String>);

impl MixedStreamSink for Events {
    fn on_text(&mut self, text: &str) {
        self.0.push(format!("text:{text}"));
    }

    fn on_patch(&mut self, op: Op) {
        self.0.push(format!("patch:{}", op.path()));
    }
}

#[test]
fn classify_prose_and_patches() {
    let out = classify("Hello\n{\"op\":\"add\",\"path\":\"/root\",\"value\":\"main\"}\n");
    assert_eq!(out.text, vec!["Hello"]);
    assert_eq!(out.patches.len(), 1);
    assert_eq!(out.patches[0].path(), "/root");
}

#[test]
fn events_in_order() {
    let mut parser = MixedStreamParser::new(Events::default());
    parser.push(MIXED);
    assert!(!parser.is_in_fence());
    parser.flush();
    assert_eq!(
        parser.into_sink().0,
        vec![
            "text:Here is a dashboard for you.",
            "patch:/root",
            "text:It has a card:",
            "patch:/elements/main",
            "patch:/elements/main/props/title",
            "text:  {not json either}",
            "text:`inline code` stays prose",
            "text:Enjoy! ✓",
        ]
    );
}

#[test]
fn fence_state_spans_chunks() {
    let mut parser = MixedStreamParser::new(Classified::default());
    parser.push("```sp");
    assert!(!parser.is_in_fence());
    parser.push("ec\nplain words\n");
    assert!(parser.is_in_fence());
    parser.push("```\nplain words\n");
    assert!(!parser.is_in_fence());
    assert_eq!(parser.sink().text, vec!["plain words"]);
}

#[test]
fn flush_classifies_the_tail() {
    let mut parser = MixedStreamParser::new(Classified::default());
    parser.push("{\"op\":\"remove\",\"path\":\"/a\"}");
    assert!(parser.sink().patches.is_empty());
    parser.flush();
    assert_eq!(parser.sink().patches, vec![Op::Remove { path: "/a".into() }]);
}

/// Runs the transform and returns (patches, prose lines, well-formed).
fn run_transform(chunks: &[&str]) -> (Vec<Op>, Vec<String>, bool) {
    let mut transform = SpecStreamTransform::new();
    let mut parts = Vec::new();
    for chunk in chunks {
        parts.extend(transform.push(chunk));
    }
    parts.extend(transform.flush());

    let mut patches = Vec::new();
    let mut prose = String::new();
    let mut open: Option<String> = None;
    let mut well_formed = true;
    for part in parts {
        match part {
            StreamPart::TextStart { id } => {
                well_formed &= open.is_none();
                open = Some(id);
            }
            StreamPart::TextDelta { id, delta } => {
                well_formed &= open.as_deref() == Some(id.as_str());
                prose.push_str(&delta);
            }
            StreamPart::TextEnd { id } => {
                well_formed &= open.take().as_deref() == Some(id.as_str());
                prose.push('\n');
            }
            StreamPart::Patch { op } => {
                well_formed &= open.is_none();
                patches.push(op);
            }
        }
    }
    well_formed &= open.is_none();
    let lines = prose
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();
    (patches, lines, well_formed)
}

fn trimmed(text: &[String]) -> Vec<String> {
    text.iter().map(|line| line.trim().to_string()).collect()
}

#[test]
fn transform_matches_classifier_whole() {
    let expected = classify(MIXED);
    let (patches, prose, well_formed) = run_transform(&[MIXED]);
    assert!(well_formed);
    assert_eq!(patches, expected.patches);
    assert_eq!(prose, trimmed(&expected.text));
}

#[test]
fn transform_block_ids_are_sequential() {
    let mut transform = SpecStreamTransform::new();
    let mut parts = transform.push(MIXED);
    parts.extend(transform.flush());
    let ids: Vec<String> = parts
        .into_iter()
        .filter_map(|part| match part {
            StreamPart::TextStart { id } => Some(id),
            _ => None,
        })
        .collect();
    assert_eq!(ids, vec!["text-0", "text-1", "text-2"]);
}

fn split_at_offsets(text: &str, mut offsets: Vec<usize>) -> Vec<&str> {
    offsets.sort_unstable();
    let mut chunks = Vec::new();
    let mut start = 0;
    for mut offset in offsets {
        while offset < text.len() && !text.is_char_boundary(offset) {
            offset += 1;
        }
        if offset > start {
            chunks.push(&text[start..offset]);
            start = offset;
        }
    }
    chunks.push(&text[start..]);
    chunks
}

proptest! {
    #[test]
    fn transform_matches_classifier_for_any_chunking(
        offsets in prop::collection::vec(0..MIXED.len(), 0..16)
    ) {
        let expected = classify(MIXED);
        let chunks = split_at_offsets(MIXED, offsets);

        let mut parser = MixedStreamParser::new(Classified::default());
        for chunk in &chunks {
            parser.push(chunk);
        }
        parser.flush();
        let chunked = parser.into_sink();
        prop_assert_eq!(&chunked, &expected);

        let (patches, prose, well_formed) = run_transform(&chunks);
        prop_assert!(well_formed);
        prop_assert_eq!(patches, expected.patches.clone());
        prop_assert_eq!(prose, trimmed(&expected.text));
    }
}
