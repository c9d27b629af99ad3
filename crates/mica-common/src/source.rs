//! Source file management.
//!
//! Files are registered in a [`SourceMap`] and assigned a base offset in the
//! global position space, so any [`Span`] resolves to a file and a local
//! range without carrying a file id alongside it.

use std::fmt;
use std::sync::Arc;

use crate::span::{BytePos, Span};

/// Identifies a source file within a [`SourceMap`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(u32);

impl FileId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self.0)
    }
}

/// 1-indexed line and column of a position.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

/// One registered source file: its name, contents, and the base offset of
/// its range in the global position space.
pub struct SourceFile {
    id: FileId,
    name: Arc<str>,
    source: Arc<str>,
    base: u32,
    /// Byte offset (local) of the start of each line.
    line_starts: Vec<u32>,
}

impl SourceFile {
    fn new(id: FileId, name: impl Into<Arc<str>>, source: impl Into<Arc<str>>, base: u32) -> Self {
        let source: Arc<str> = source.into();
        let mut line_starts = vec![0u32];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        Self {
            id,
            name: name.into(),
            source,
            base,
            line_starts,
        }
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// First global position past the end of this file.
    pub fn end_pos(&self) -> u32 {
        self.base + self.source.len() as u32
    }

    pub fn contains_pos(&self, pos: BytePos) -> bool {
        pos.0 >= self.base && pos.0 <= self.end_pos()
    }

    /// Converts a global position to a byte offset within this file.
    pub fn local_offset(&self, pos: BytePos) -> u32 {
        pos.0.saturating_sub(self.base)
    }

    /// Line and column of a global position.
    pub fn line_col(&self, pos: BytePos) -> LineCol {
        let local = self.local_offset(pos);
        let line = match self.line_starts.binary_search(&local) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        LineCol {
            line: line as u32 + 1,
            column: local - self.line_starts[line] + 1,
        }
    }

    /// The text covered by a global span.
    pub fn span_text(&self, span: Span) -> &str {
        let start = self.local_offset(span.start) as usize;
        let end = (self.local_offset(span.end) as usize).min(self.source.len());
        &self.source[start.min(end)..end]
    }
}

/// All source files of a compilation, in one global position space.
#[derive(Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
    next_base: u32,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a file and returns its id. The file is assigned the next
    /// free range of the global position space (plus a one-byte gap so that
    /// end positions stay unambiguous).
    pub fn add_file(&mut self, name: impl Into<Arc<str>>, source: impl Into<Arc<str>>) -> FileId {
        let id = FileId(self.files.len() as u32);
        let file = SourceFile::new(id, name, source, self.next_base);
        self.next_base = file.end_pos() + 1;
        self.files.push(file);
        id
    }

    pub fn get_file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.0 as usize)
    }

    /// Finds the file owning a global position.
    pub fn lookup_pos(&self, pos: BytePos) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.contains_pos(pos))
    }

    /// Finds the file owning a span (by its start position).
    pub fn lookup_span(&self, span: Span) -> Option<&SourceFile> {
        self.lookup_pos(span.start)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter()
    }

    /// Renders a span as `name:line:col` for one-line error output.
    pub fn format_span(&self, span: Span) -> String {
        match self.lookup_span(span) {
            Some(file) => {
                let lc = file.line_col(span.start);
                format!("{}:{}:{}", file.name(), lc.line, lc.column)
            }
            None => format!("<unknown>:{}", span),
        }
    }
}
