//! Diagnostic reporting.
//!
//! Errors and warnings are accumulated in a [`DiagnosticSink`] as the
//! compiler works and rendered at the end through [`DiagnosticEmitter`],
//! which delegates source-snippet formatting to `codespan-reporting`.

use std::fmt;

use codespan_reporting::diagnostic::{
    Diagnostic as CsDiagnostic, Label as CsLabel, LabelStyle, Severity as CsSeverity,
};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term::{
    self,
    termcolor::{Buffer, ColorChoice, StandardStream, WriteColor},
    Config,
};

use crate::source::SourceMap;
use crate::span::Span;

/// Severity level of a diagnostic.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Severity {
    /// Prevents compilation.
    Error,
    /// Reported but does not prevent compilation.
    Warning,
    /// Additional information attached to another diagnostic.
    Note,
}

impl Severity {
    #[inline]
    pub const fn is_error(self) -> bool {
        matches!(self, Severity::Error)
    }

    #[inline]
    pub const fn is_warning(self) -> bool {
        matches!(self, Severity::Warning)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

impl From<Severity> for CsSeverity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => CsSeverity::Error,
            Severity::Warning => CsSeverity::Warning,
            Severity::Note => CsSeverity::Note,
        }
    }
}

/// A label pointing at a source location. The span alone identifies the
/// file (global position space).
#[derive(Clone, Debug)]
pub struct Label {
    pub style: LabelStyle,
    pub span: Span,
    pub message: Option<String>,
}

impl Label {
    /// The main location of a diagnostic.
    pub fn primary(span: impl Into<Span>) -> Self {
        Self {
            style: LabelStyle::Primary,
            span: span.into(),
            message: None,
        }
    }

    /// Additional context.
    pub fn secondary(span: impl Into<Span>) -> Self {
        Self {
            style: LabelStyle::Secondary,
            span: span.into(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// A diagnostic: severity, optional numeric code, message, labels, notes.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<u16>,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }

    #[inline]
    pub fn is_warning(&self) -> bool {
        self.severity.is_warning()
    }
}

/// Accumulates diagnostics during a compiler pass.
#[derive(Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Note => {}
        }
        self.diagnostics.push(diagnostic);
    }

    #[inline]
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    #[inline]
    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    #[inline]
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Drains all diagnostics, leaving the sink empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        self.error_count = 0;
        self.warning_count = 0;
        std::mem::take(&mut self.diagnostics)
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
        self.error_count = 0;
        self.warning_count = 0;
    }

    pub fn extend(&mut self, other: DiagnosticSink) {
        self.error_count += other.error_count;
        self.warning_count += other.warning_count;
        self.diagnostics.extend(other.diagnostics);
    }
}

impl fmt::Debug for DiagnosticSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticSink")
            .field("errors", &self.error_count)
            .field("warnings", &self.warning_count)
            .field("total", &self.diagnostics.len())
            .finish()
    }
}

/// Renders diagnostics with source snippets.
pub struct DiagnosticEmitter<'a> {
    source_map: &'a SourceMap,
    config: Config,
}

impl<'a> DiagnosticEmitter<'a> {
    pub fn new(source_map: &'a SourceMap) -> Self {
        Self {
            source_map,
            config: Config::default(),
        }
    }

    /// Writes one diagnostic to stderr with colors.
    pub fn emit(&self, diagnostic: &Diagnostic) {
        let writer = StandardStream::stderr(ColorChoice::Auto);
        self.emit_to(&mut writer.lock(), diagnostic);
    }

    pub fn emit_to<W: WriteColor>(&self, writer: &mut W, diagnostic: &Diagnostic) {
        let files = self.build_files();
        let cs = self.to_codespan(diagnostic);
        let _ = term::emit(writer, &self.config, &files, &cs);
    }

    pub fn emit_to_string(&self, diagnostic: &Diagnostic) -> String {
        let mut buffer = Buffer::no_color();
        self.emit_to(&mut buffer, diagnostic);
        String::from_utf8_lossy(buffer.as_slice()).into_owned()
    }

    pub fn emit_all(&self, sink: &DiagnosticSink) {
        for diagnostic in sink.iter() {
            self.emit(diagnostic);
        }
    }

    pub fn emit_all_to_string(&self, sink: &DiagnosticSink) -> String {
        let mut out = String::new();
        for diagnostic in sink.iter() {
            out.push_str(&self.emit_to_string(diagnostic));
        }
        out
    }

    fn build_files(&self) -> SimpleFiles<&str, &str> {
        let mut files = SimpleFiles::new();
        for file in self.source_map.files() {
            files.add(file.name(), file.source());
        }
        files
    }

    fn to_codespan(&self, diagnostic: &Diagnostic) -> CsDiagnostic<usize> {
        let mut cs =
            CsDiagnostic::new(diagnostic.severity.into()).with_message(&diagnostic.message);
        if let Some(code) = diagnostic.code {
            cs = cs.with_code(format!("E{:04}", code));
        }
        let labels: Vec<CsLabel<usize>> = diagnostic
            .labels
            .iter()
            .filter_map(|label| {
                let file = self.source_map.lookup_span(label.span)?;
                let file_id = file.id().as_u32() as usize;
                let start = file.local_offset(label.span.start) as usize;
                let end = file.local_offset(label.span.end) as usize;
                let mut cs_label = CsLabel::new(label.style, file_id, start..end);
                if let Some(msg) = &label.message {
                    cs_label = cs_label.with_message(msg);
                }
                Some(cs_label)
            })
            .collect();
        cs.with_labels(labels).with_notes(diagnostic.notes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity() {
        assert!(Severity::Error.is_error());
        assert!(!Severity::Error.is_warning());
        assert!(Severity::Warning.is_warning());
        assert_eq!(format!("{}", Severity::Error), "error");
    }

    #[test]
    fn test_diagnostic_builder() {
        let diag = Diagnostic::error("undeclared name")
            .with_code(3200)
            .with_label(Label::primary(0u32..4u32).with_message("not found"))
            .with_note("declared names are visible file-wide");

        assert!(diag.is_error());
        assert_eq!(diag.code, Some(3200));
        assert_eq!(diag.labels.len(), 1);
        assert_eq!(diag.notes.len(), 1);
    }

    #[test]
    fn test_sink_counts() {
        let mut sink = DiagnosticSink::new();
        assert!(sink.is_empty());

        sink.emit(Diagnostic::error("e1"));
        sink.emit(Diagnostic::warning("w1"));
        sink.emit(Diagnostic::error("e2"));

        assert_eq!(sink.len(), 3);
        assert_eq!(sink.error_count(), 2);
        assert_eq!(sink.warning_count(), 1);
        assert!(sink.has_errors());
    }

    #[test]
    fn test_sink_take() {
        let mut sink = DiagnosticSink::new();
        sink.emit(Diagnostic::error("e"));
        let drained = sink.take();
        assert_eq!(drained.len(), 1);
        assert!(sink.is_empty());
        assert_eq!(sink.error_count(), 0);
    }

    #[test]
    fn test_sink_extend() {
        let mut a = DiagnosticSink::new();
        a.emit(Diagnostic::error("e1"));
        let mut b = DiagnosticSink::new();
        b.emit(Diagnostic::warning("w1"));
        a.extend(b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.warning_count(), 1);
    }

    #[test]
    fn test_emitter_renders_message() {
        let mut map = SourceMap::new();
        map.add_file("t.mica", "var x bool = 3");

        let emitter = DiagnosticEmitter::new(&map);
        let diag = Diagnostic::error("cannot assign 3 to bool")
            .with_label(Label::primary(13u32..14u32));
        let out = emitter.emit_to_string(&diag);

        assert!(out.contains("error"));
        assert!(out.contains("cannot assign 3 to bool"));
    }
}
