//! Character-level variant of the mixed stream classifier.
//!
//! Prose is forwarded as soon as it arrives so a UI can type it out. Only a
//! line that might be a patch (its first non-blank character is `{`) or a
//! fence marker (it starts like the opening marker) is held until its newline,
//! then classified like [`crate::mixed_stream::MixedStreamParser`] would.

use serde::Serialize;
use tracing::debug;

use crate::json_patch::Op;
use crate::spec_stream::{parse_spec_stream_line, StreamOptions};

/// One output event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StreamPart {
    TextStart { id: String },
    TextDelta { id: String, delta: String },
    TextEnd { id: String },
    Patch {
        #[serde(serialize_with = "serialize_op")]
        op: Op,
    },
}

fn serialize_op<S: serde::Serializer>(op: &Op, serializer: S) -> Result<S::Ok, S::Error> {
    crate::json_patch::to_json(op).serialize(serializer)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineMode {
    /// Nothing but blanks seen on the current line.
    Start,
    /// The line is prose and is being forwarded.
    Prose,
    /// The line is held until its newline.
    Buffered,
}

#[derive(Debug)]
pub struct SpecStreamTransform {
    options: StreamOptions,
    mode: LineMode,
    line: String,
    in_fence: bool,
    open_block: Option<String>,
    next_block: usize,
}

impl Default for SpecStreamTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecStreamTransform {
    pub fn new() -> Self {
        Self::with_options(StreamOptions::default())
    }

    pub fn with_options(options: StreamOptions) -> Self {
        Self {
            options,
            mode: LineMode::Start,
            line: String::new(),
            in_fence: false,
            open_block: None,
            next_block: 0,
        }
    }

    /// Feeds a text delta and returns the parts it produced.
    ///
    /// # Example
    ///
    /// ```
    /// use json_render::transform::{SpecStreamTransform, StreamPart};
    ///
    /// let mut transform = SpecStreamTransform::new();
    /// let mut parts = transform.push("Hi!\n{\"op\":\"add\",\"path\":\"/root\",");
    /// assert_eq!(
    ///     parts,
    ///     vec![
    ///         StreamPart::TextStart { id: "text-0".into() },
    ///         StreamPart::TextDelta { id: "text-0".into(), delta: "Hi!\n".into() },
    ///     ]
    /// );
    /// parts = transform.push("\"value\":\"main\"}\n");
    /// assert!(matches!(parts[0], StreamPart::TextEnd { .. }));
    /// assert!(matches!(parts[1], StreamPart::Patch { .. }));
    /// ```
    pub fn push(&mut self, chunk: &str) -> Vec<StreamPart> {
        let mut out = Vec::new();
        for c in chunk.chars() {
            self.push_char(c, &mut out);
        }
        out
    }

    /// Classifies anything still held and closes the open text block.
    pub fn flush(&mut self) -> Vec<StreamPart> {
        let mut out = Vec::new();
        let line = std::mem::take(&mut self.line);
        if self.mode == LineMode::Buffered {
            self.finish_line(&line, false, &mut out);
        }
        self.mode = LineMode::Start;
        self.close_text(&mut out);
        out
    }

    fn push_char(&mut self, c: char, out: &mut Vec<StreamPart>) {
        match self.mode {
            LineMode::Start => {
                if c == '\n' {
                    let mut blank = std::mem::take(&mut self.line);
                    if !self.in_fence && self.open_block.is_some() {
                        blank.push(c);
                        self.emit_text(&blank, out);
                    }
                } else if c.is_whitespace() {
                    self.line.push(c);
                } else if self.in_fence || c == '{' || self.could_open_fence(c) {
                    self.line.push(c);
                    self.mode = LineMode::Buffered;
                } else {
                    let mut text = std::mem::take(&mut self.line);
                    text.push(c);
                    self.emit_text(&text, out);
                    self.mode = LineMode::Prose;
                }
            }
            LineMode::Prose => {
                let mut buf = [0u8; 4];
                self.emit_text(c.encode_utf8(&mut buf), out);
                if c == '\n' {
                    self.mode = LineMode::Start;
                }
            }
            LineMode::Buffered => {
                if c == '\n' {
                    let line = std::mem::take(&mut self.line);
                    self.finish_line(&line, true, out);
                    self.mode = LineMode::Start;
                } else {
                    self.line.push(c);
                }
            }
        }
    }

    fn could_open_fence(&self, first: char) -> bool {
        self.options.fence_open.trim_start().starts_with(first)
    }

    fn finish_line(&mut self, line: &str, terminated: bool, out: &mut Vec<StreamPart>) {
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
            Some(op) => {
                self.close_text(out);
                out.push(StreamPart::Patch { op });
            }
            None if self.in_fence => debug!("dropping malformed line inside fence"),
            None => {
                self.emit_text(line, out);
                if terminated {
                    self.emit_text("\n", out);
                }
            }
        }
    }

    /// Appends prose to the open block, opening one when needed. Consecutive
    /// text within one push is coalesced into a single delta.
    fn emit_text(&mut self, text: &str, out: &mut Vec<StreamPart>) {
        if text.is_empty() {
            return;
        }
        let id = match &self.open_block {
            Some(id) => id.clone(),
            None => {
                let id = format!("text-{}", self.next_block);
                self.next_block += 1;
                out.push(StreamPart::TextStart { id: id.clone() });
                self.open_block = Some(id.clone());
                id
            }
        };
        if let Some(StreamPart::TextDelta { id: last, delta }) = out.last_mut() {
            if *last == id {
                delta.push_str(text);
                return;
            }
        }
        out.push(StreamPart::TextDelta {
            id,
            delta: text.to_string(),
        });
    }

    fn close_text(&mut self, out: &mut Vec<StreamPart>) {
        if let Some(id) = self.open_block.take() {
            out.push(StreamPart::TextEnd { id });
        }
    }
}
