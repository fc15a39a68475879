//! Separates prose from patch lines in a mixed model response.
//!
//! Outside a fence every line is classified on its own: a line that parses as
//! a patch is a patch, anything else is text. Between the fence markers
//! (```` ```spec ```` and ```` ``` ```` by default) every line is a patch or
//! dropped, and the marker lines themselves are swallowed.

use tracing::debug;

use crate::json_patch::Op;
use crate::spec_stream::{parse_spec_stream_line, StreamOptions};

/// Receives the classified lines.
pub trait MixedStreamSink {
    /// A prose line, without its line terminator.
    fn on_text(&mut self, text: &str);
    fn on_patch(&mut self, op: Op);
}

impl<S: MixedStreamSink + ?Sized> MixedStreamSink for &mut S {
    fn on_text(&mut self, text: &str) {
        (**self).on_text(text);
    }

    fn on_patch(&mut self, op: Op) {
        (**self).on_patch(op);
    }
}

/// Everything a whole text classified into.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classified {
    pub text: Vec<String>,
    pub patches: Vec<Op>,
}

impl MixedStreamSink for Classified {
    fn on_text(&mut self, text: &str) {
        self.text.push(text.to_string());
    }

    fn on_patch(&mut self, op: Op) {
        self.patches.push(op);
    }
}

#[derive(Debug)]
pub struct MixedStreamParser<S> {
    sink: S,
    options: StreamOptions,
    buffer: String,
    in_fence: bool,
}

impl<S: MixedStreamSink> MixedStreamParser<S> {
    pub fn new(sink: S) -> Self {
        Self::with_options(sink, StreamOptions::default())
    }

    pub fn with_options(sink: S, options: StreamOptions) -> Self {
        Self {
            sink,
            options,
            buffer: String::new(),
            in_fence: false,
        }
    }

    /// Feeds a chunk; every completed line is classified.
    pub fn push(&mut self, chunk: &str) {
        self.buffer.push_str(chunk);
        let mut buffer = std::mem::take(&mut self.buffer);
        let mut consumed = 0;
        while let Some(offset) = buffer[consumed..].find('\n') {
            let end = consumed + offset + 1;
            self.process_line(&buffer[consumed..end]);
            consumed = end;
        }
        buffer.drain(..consumed);
        self.buffer = buffer;
    }

    /// Classifies the unterminated tail, if any.
    pub fn flush(&mut self) {
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.process_line(&line);
        }
    }

    pub fn is_in_fence(&self) -> bool {
        self.in_fence
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn process_line(&mut self, line: &str) {
        let line = line.trim_end_matches(['\n', '\r']);
        let trimmed = line.trim();
        if !self.in_fence && trimmed == self.options.fence_open {
            self.in_fence = true;
            return;
        }
        if self.in_fence && trimmed == self.options.fence_close {
            self.in_fence = false;
            return;
        }
        if trimmed.is_empty() {
            return;
        }
        match parse_spec_stream_line(trimmed) {
            Some(op) => self.sink.on_patch(op),
            None if self.in_fence => debug!("dropping malformed line inside fence"),
            None => self.sink.on_text(line),
        }
    }
}

/// Classifies a complete text with the default fence markers.
///
/// # Example
///
/// ```
/// use json_render::mixed_stream::classify;
///
/// let out = classify("Hello\n{\"op\":\"add\",\"path\":\"/root\",\"value\":\"main\"}\n");
/// assert_eq!(out.text, vec!["Hello"]);
/// assert_eq!(out.patches[0].path(), "/root");
/// ```
pub fn classify(text: &str) -> Classified {
    classify_with(text, StreamOptions::default())
}

pub fn classify_with(text: &str, options: StreamOptions) -> Classified {
    let mut parser = MixedStreamParser::with_options(Classified::default(), options);
    parser.push(text);
    parser.flush();
    parser.into_sink()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_lines_are_patches_only() {
        let text = "Intro\n```spec\n{\"op\":\"add\",\"path\":\"/a\",\"value\":1}\nnot json\n```\nOutro";
        let out = classify(text);
        assert_eq!(out.text, vec!["Intro", "Outro"]);
        assert_eq!(out.patches.len(), 1);
    }

    #[test]
    fn markers_are_compared_trimmed() {
        let out = classify("  ```spec  \r\n{\"op\":\"remove\",\"path\":\"/a\"}\r\n ``` \r\nDone\r\n");
        assert_eq!(out.text, vec!["Done"]);
        assert_eq!(out.patches, vec![Op::Remove { path: "/a".into() }]);
    }

    #[test]
    fn custom_markers() {
        let options = StreamOptions {
            fence_open: "<patch>".into(),
            fence_close: "</patch>".into(),
            ..StreamOptions::default()
        };
        let out = classify_with("<patch>\n{\"op\":\"remove\",\"path\":\"/a\"}\n</patch>\n```\n", options);
        assert_eq!(out.patches.len(), 1);
        assert_eq!(out.text, vec!["```"]);
    }

    #[test]
    fn many_lines_in_one_push() {
        let text: String = (0..5_000)
            .map(|i| format!("line {i}\n{{\"op\":\"remove\",\"path\":\"/{i}\"}}\n"))
            .collect();
        let mut parser = MixedStreamParser::new(Classified::default());
        parser.push(&text);
        parser.push("tail");
        assert_eq!(parser.sink().text.len(), 5_000);
        assert_eq!(parser.sink().patches.len(), 5_000);
        parser.flush();
        assert_eq!(parser.sink().text.last().map(String::as_str), Some("tail"));
    }

    #[test]
    fn sink_by_reference() {
        let mut collected = Classified::default();
        {
            let mut parser = MixedStreamParser::new(&mut collected);
            parser.push("a\nb");
            parser.flush();
        }
        assert_eq!(collected.text, vec!["a", "b"]);
    }
}
