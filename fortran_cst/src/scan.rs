//! Splits raw free-form source into spliced logical statements.
//!
//! This layer owns everything the statement grammar must not re-derive:
//! comment stripping, `&` line continuation, and the three end-of-statement
//! spellings (newline, semicolon, end of input). The output is a sequence of
//! [`LogicalStatement`]s whose `text` contains a single statement with all
//! continuations spliced out, plus a [`SpanMap`] that converts offsets in the
//! spliced text back to byte offsets in the original source.

/// Byte range in the original source text.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Smallest span containing both `self` and `other`.
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl std::fmt::Debug for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

/// A `!` comment, recorded as trivia next to the statement it followed.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub span: Span,
    /// Comment text without the leading `!`.
    pub text: String,
}

/// Maps byte offsets in a spliced statement back to source byte offsets.
///
/// Splicing only ever drops characters (continuation markers, comments,
/// newlines), so the map is a sorted list of contiguous runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpanMap {
    chunks: Vec<Chunk>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Chunk {
    logical: usize,
    source: usize,
    len: usize,
}

impl SpanMap {
    /// Record that logical byte `logical` came from source byte `source`.
    /// Bytes must be recorded in increasing logical order.
    fn note(&mut self, logical: usize, source: usize) {
        if let Some(c) = self.chunks.last_mut() {
            if c.logical + c.len == logical && c.source + c.len == source {
                c.len += 1;
                return;
            }
        }
        self.chunks.push(Chunk {
            logical,
            source,
            len: 1,
        });
    }

    /// Drop mappings at or beyond logical offset `len`.
    fn truncate(&mut self, len: usize) {
        while let Some(c) = self.chunks.last_mut() {
            if c.logical >= len {
                self.chunks.pop();
            } else {
                if c.logical + c.len > len {
                    c.len = len - c.logical;
                }
                break;
            }
        }
    }

    /// Source byte offset for a logical byte offset (clamped to the end of
    /// the run it falls into).
    pub fn source_pos(&self, logical: usize) -> usize {
        if self.chunks.is_empty() {
            return 0;
        }
        let i = self.chunks.partition_point(|c| c.logical <= logical);
        let c = if i == 0 { self.chunks[0] } else { self.chunks[i - 1] };
        c.source + (logical.saturating_sub(c.logical)).min(c.len)
    }

    /// Source offset for an exclusive logical end offset.
    pub fn source_end(&self, logical_end: usize) -> usize {
        if logical_end == 0 {
            self.source_pos(0)
        } else {
            self.source_pos(logical_end - 1) + 1
        }
    }

    /// Convert a logical byte range into a source [`Span`].
    pub fn span(&self, start: usize, end: usize) -> Span {
        Span::new(self.source_pos(start), self.source_end(end))
    }
}

/// One spliced statement: code with comments/continuations removed, the map
/// back to source offsets, and the comment trivia collected along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalStatement {
    pub span: Span,
    pub text: String,
    pub map: SpanMap,
    pub comments: Vec<Comment>,
}

/// Boundary classifier collaborator: decides whether an upcoming newline is a
/// real end-of-statement or is suppressed by a continuation marker.
///
/// The statement grammar consumes boundaries opaquely; all continuation logic
/// lives behind this trait. Fixed-form column-based continuation would be a
/// second implementation of the same interface.
pub trait BoundaryClassifier {
    /// Called just before a newline with the statement text spliced so far.
    /// Returns the number of trailing bytes forming a continuation marker
    /// (they are removed and the newline boundary is suppressed), or `None`
    /// if the newline really ends the statement.
    fn suppress(&self, pending: &str, in_string: bool) -> Option<usize>;

    /// Called at the start of a continuation line; returns the number of
    /// leading bytes to skip before splicing resumes.
    fn resume(&self, rest: &str, in_string: bool) -> usize;
}

/// Free-form rules: a trailing `&` (optionally followed by blanks or a
/// comment) suppresses the newline; the next line's leading blanks and
/// optional leading `&` are consumed. Inside a character literal the `&` pair
/// is required by the standard; we accept a missing leading `&` and resume at
/// the first column.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreeForm;

impl BoundaryClassifier for FreeForm {
    fn suppress(&self, pending: &str, _in_string: bool) -> Option<usize> {
        let trimmed = pending.trim_end_matches([' ', '\t']);
        if trimmed.ends_with('&') {
            Some(pending.len() - trimmed.len() + 1)
        } else {
            None
        }
    }

    fn resume(&self, rest: &str, in_string: bool) -> usize {
        let trimmed = rest.trim_start_matches([' ', '\t']);
        if trimmed.starts_with('&') {
            rest.len() - trimmed.len() + 1
        } else if in_string {
            // Missing leading `&` inside a literal; resume at column one.
            0
        } else {
            rest.len() - trimmed.len()
        }
    }
}

struct Splicer<'a, B: BoundaryClassifier + ?Sized> {
    source: &'a str,
    classifier: &'a B,
    pos: usize,
    text: String,
    map: SpanMap,
    comments: Vec<Comment>,
    out: Vec<LogicalStatement>,
}

impl<'a, B: BoundaryClassifier + ?Sized> Splicer<'a, B> {
    fn new(source: &'a str, classifier: &'a B) -> Self {
        Splicer {
            source,
            classifier,
            pos: 0,
            text: String::new(),
            map: SpanMap::default(),
            comments: Vec::new(),
            out: Vec::new(),
        }
    }

    fn push(&mut self, c: char) {
        // Leading blanks carry no syntax; skip them so statement spans start
        // at the first code character.
        if self.text.is_empty() && (c == ' ' || c == '\t') {
            return;
        }
        for k in 0..c.len_utf8() {
            self.map.note(self.text.len() + k, self.pos + k);
        }
        self.text.push(c);
    }

    fn trim_trailing_blanks(&mut self) {
        let trimmed = self.text.trim_end_matches([' ', '\t']).len();
        self.text.truncate(trimmed);
        self.map.truncate(trimmed);
    }

    fn end_statement(&mut self) {
        self.trim_trailing_blanks();
        if self.text.is_empty() && self.comments.is_empty() {
            return;
        }
        let span = if self.text.is_empty() {
            let first = self.comments[0].span;
            self.comments.iter().fold(first, |s, c| s.cover(c.span))
        } else {
            self.map.span(0, self.text.len())
        };
        self.out.push(LogicalStatement {
            span,
            text: std::mem::take(&mut self.text),
            map: std::mem::take(&mut self.map),
            comments: std::mem::take(&mut self.comments),
        });
    }

    /// Handle a newline at `self.pos`; `in_string` is the splice state.
    /// Returns true if the boundary was suppressed by a continuation.
    fn newline(&mut self, in_string: bool) -> bool {
        let cut = self.classifier.suppress(&self.text, in_string);
        self.pos += 1;
        match cut {
            Some(cut) => {
                let keep = self.text.len().saturating_sub(cut);
                self.text.truncate(keep);
                self.map.truncate(keep);
                self.skip_comment_lines();
                self.pos += self.classifier.resume(&self.source[self.pos..], in_string);
                true
            }
            None => false,
        }
    }

    /// Comment-only lines may sit between a continuation and its
    /// continuation line; their trivia still belongs to the statement.
    fn skip_comment_lines(&mut self) {
        loop {
            let rest = &self.source[self.pos..];
            let blank = rest.len() - rest.trim_start_matches([' ', '\t']).len();
            let after = &rest[blank..];
            if !after.starts_with('!') {
                return;
            }
            let len = after.find('\n').unwrap_or(after.len());
            self.comments.push(Comment {
                span: Span::new(self.pos + blank, self.pos + blank + len),
                text: after[1..len].to_owned(),
            });
            self.pos += blank + len;
            if self.pos < self.source.len() {
                // The newline ending the comment line.
                self.pos += 1;
            }
        }
    }

    fn run(mut self) -> Vec<LogicalStatement> {
        let mut in_string: Option<char> = None;
        while self.pos < self.source.len() {
            let Some(c) = self.source[self.pos..].chars().next() else {
                break;
            };
            match in_string {
                Some(delim) => {
                    if c == '\n' {
                        if !self.newline(true) {
                            // Unterminated string literal; the statement ends
                            // here and the grammar reports it.
                            in_string = None;
                            self.end_statement();
                        }
                    } else if c == delim {
                        self.push(c);
                        self.pos += c.len_utf8();
                        if self.source[self.pos..].starts_with(delim) {
                            // Doubled quote stays inside the literal.
                            self.push(delim);
                            self.pos += delim.len_utf8();
                        } else {
                            in_string = None;
                        }
                    } else {
                        self.push(c);
                        self.pos += c.len_utf8();
                    }
                }
                None => match c {
                    '!' => {
                        let start = self.pos;
                        let line = &self.source[self.pos..];
                        let len = line.find('\n').unwrap_or(line.len());
                        self.comments.push(Comment {
                            span: Span::new(start, start + len),
                            text: line[1..len].to_owned(),
                        });
                        self.pos += len;
                    }
                    '\n' => {
                        if !self.newline(false) {
                            self.end_statement();
                        }
                    }
                    ';' => {
                        self.end_statement();
                        self.pos += 1;
                    }
                    '\r' => {
                        self.pos += 1;
                    }
                    '\'' | '"' => {
                        in_string = Some(c);
                        self.push(c);
                        self.pos += 1;
                    }
                    _ => {
                        self.push(c);
                        self.pos += c.len_utf8();
                    }
                },
            }
        }
        // End of input implicitly closes the last statement.
        self.end_statement();
        self.out
    }
}

/// Split source text into logical statements using `classifier` for
/// continuation decisions.
pub fn split_statements<B: BoundaryClassifier + ?Sized>(
    source: &str,
    classifier: &B,
) -> Vec<LogicalStatement> {
    Splicer::new(source, classifier).run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(src: &str) -> Vec<String> {
        split_statements(src, &FreeForm)
            .into_iter()
            .map(|s| s.text)
            .collect()
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(texts("A = 1\nB = 2"), ["A = 1", "B = 2"]);
        assert_eq!(texts("A = 1; B = 2"), ["A = 1", "B = 2"]);
        assert_eq!(texts("A = 1;;; B = 2;"), ["A = 1", "B = 2"]);
        assert_eq!(texts("A = 1"), ["A = 1"]);
        assert_eq!(texts("  \n \t\n"), Vec::<String>::new());
    }

    #[test]
    fn test_continuation() {
        assert_eq!(texts("A = B + &\n    C"), ["A = B + C"]);
        assert_eq!(texts("A = B + &\n    & C"), ["A = B +  C"]);
        assert_eq!(texts("A = B + & ! trailing\n    C"), ["A = B + C"]);
        // A continuation inside a character literal resumes after the `&`.
        assert_eq!(texts("S = 'AB&\n     &CD'"), ["S = 'ABCD'"]);
    }

    #[test]
    fn test_comment_lines_inside_continuation() {
        let stmts = split_statements("A = B + &\n! note\n  ! more\n    C", &FreeForm);
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].text, "A = B + C");
        let texts: Vec<_> = stmts[0].comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, [" note", " more"]);
    }

    #[test]
    fn test_comments() {
        let stmts = split_statements("A = 1 ! one\n! lonely\nB = 2", &FreeForm);
        assert_eq!(stmts.len(), 3);
        assert_eq!(stmts[0].text, "A = 1");
        assert_eq!(stmts[0].comments.len(), 1);
        assert_eq!(stmts[0].comments[0].text, " one");
        assert_eq!(stmts[1].text, "");
        assert_eq!(stmts[1].comments[0].text, " lonely");
        assert_eq!(stmts[2].text, "B = 2");
    }

    #[test]
    fn test_strings_hide_boundaries() {
        assert_eq!(texts("S = 'a;b!c'"), ["S = 'a;b!c'"]);
        assert_eq!(texts("S = \"it\"\"s\""), ["S = \"it\"\"s\""]);
    }

    #[test]
    fn test_span_map() {
        let stmts = split_statements("  A = &\n  B", &FreeForm);
        assert_eq!(stmts[0].text, "A = B");
        // "A" is at source offset 2, "B" at source offset 10.
        assert_eq!(stmts[0].map.source_pos(0), 2);
        assert_eq!(stmts[0].map.span(4, 5), Span::new(10, 11));
        assert_eq!(stmts[0].span, Span::new(2, 11));
    }
}
