use std::fmt;

/// Grammar rule a path fragment was classified under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Dotted names: `a.b.c`, `"na.me".x`
    Plain,
    /// Key fragment containing `*`: `*_name`
    Glob,
    /// Fragment containing a parenthesized clause: `[?(@.v > 1)]`
    FilterExpr,
    /// Two or three dots, optionally followed by dotted names: `..name`, `...`
    Descendant,
    /// Bracketed operator: `[0]`, `[1:3,-1]`, `[*]`, `['key']`
    ArrayOp,
    /// No rule matched
    Unrecognized,
}

impl SegmentKind {
    /// Classification priority. Patterns overlap, so the first full match in
    /// this order wins.
    pub const PRIORITY: [SegmentKind; 5] = [
        SegmentKind::Plain,
        SegmentKind::Glob,
        SegmentKind::FilterExpr,
        SegmentKind::Descendant,
        SegmentKind::ArrayOp,
    ];
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SegmentKind::Plain => "plain",
            SegmentKind::Glob => "glob",
            SegmentKind::FilterExpr => "filter",
            SegmentKind::Descendant => "descendant",
            SegmentKind::ArrayOp => "array",
            SegmentKind::Unrecognized => "unrecognized",
        };
        f.pad(name)
    }
}

/// One piece of an index/slice list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlicePiece {
    /// `[n]`: a single element, negative counts from the end
    Index(i64),
    /// `[start:end]`: either bound may be omitted, negative counts from the end
    Range { start: Option<i64>, end: Option<i64> },
}

/// Operation selected by a bracketed array segment.
#[derive(Debug, Clone, PartialEq)]
pub enum ArraySelector {
    /// `[*]`
    All,
    /// `[0]`, `[:3]`, `[1:2,-1]`
    Slices(Vec<SlicePiece>),
    /// `['name']`, `["name"]`, ``[`name`]``
    Key(String),
}

/// A classified, parsed unit of a path.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Names to walk, quotes already removed
    Plain(Vec<String>),
    /// Key pattern with `*` wildcards
    Glob(String),
    /// Unbounded-depth search, applying `trailing` at every reachable
    /// container. `..` and `...` search alike.
    Descendant { trailing: Option<Vec<String>> },
    Array(ArraySelector),
    /// Filter expression text with the surrounding `[`, `]` and `?` removed
    Filter(String),
    /// Raw fragment that matched no rule
    Unrecognized(String),
}

impl Segment {
    pub fn kind(&self) -> SegmentKind {
        match self {
            Segment::Plain(_) => SegmentKind::Plain,
            Segment::Glob(_) => SegmentKind::Glob,
            Segment::Descendant { .. } => SegmentKind::Descendant,
            Segment::Array(_) => SegmentKind::ArrayOp,
            Segment::Filter(_) => SegmentKind::FilterExpr,
            Segment::Unrecognized(_) => SegmentKind::Unrecognized,
        }
    }
}
