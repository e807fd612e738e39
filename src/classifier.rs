//! Path grammar: splitting a path into fragments and classifying each one.
//!
//! A path is read left to right as repeated groups of up to four fragments,
//! in this order, each optional:
//!
//! 1. a glob fragment (only while a `*` and a word character remain ahead),
//! 2. dotted plain names,
//! 3. a descendant marker (`..`/`...`) with optional trailing names,
//! 4. one bracketed operator.
//!
//! Every non-empty fragment is then classified independently by trying the
//! rules in [`SegmentKind::PRIORITY`] order and keeping the first full match.

use regex::{Captures, Regex};

use crate::{
    ast::{ArraySelector, Segment, SegmentKind, SlicePiece},
    lazy::Lazy,
};

const NAME: &str = r#"(?:\w+|"[^"]+")"#;

/// Classifies and parses path fragments. Holds only compiled patterns.
#[derive(Debug, Clone)]
pub struct PathClassifier {
    plain: Regex,
    glob: Regex,
    word: Regex,
    filter: Regex,
    descendant: Regex,
    array: Regex,
    integer: Regex,
}

impl Default for PathClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PathClassifier {
    pub fn new() -> Self {
        let plain_body = format!(r"{NAME}(?:\.{NAME})*");
        PathClassifier {
            plain: pattern(&format!("^{plain_body}$")),
            glob: pattern(r#"^[^.\[\]()?'"]*$"#),
            word: pattern(r"\w"),
            filter: pattern(r"^.*\[?\??\(.*\)\]?$"),
            descendant: pattern(&format!(r"^\.{{2,3}}(?:{plain_body})?$")),
            array: pattern(concat!(
                r"^\[(?:",
                r"(?P<filter>\??\(.+\))",
                r"|(?P<slices>-?\d*:?-?\d*(?:,-?\d*:?-?\d*)*)",
                r"|(?P<all>\*)",
                r"|'(?P<single>.+?)'",
                r#"|"(?P<double>.+?)""#,
                r"|`(?P<tick>.+?)`",
                r")\]$",
            )),
            integer: pattern(r"^\d+$"),
        }
    }

    /// Whether `fragment` fully matches the rule for `kind`.
    pub fn matches(&self, kind: SegmentKind, fragment: &str) -> bool {
        match kind {
            SegmentKind::Plain => self.plain.is_match(fragment),
            SegmentKind::Glob => {
                fragment.contains('*')
                    && self.word.is_match(fragment)
                    && self.glob.is_match(fragment)
            }
            SegmentKind::FilterExpr => self.filter.is_match(fragment),
            SegmentKind::Descendant => self.descendant.is_match(fragment),
            SegmentKind::ArrayOp => self.array.is_match(fragment),
            SegmentKind::Unrecognized => false,
        }
    }

    /// The first rule, in priority order, that fully matches `fragment`.
    pub fn classify(&self, fragment: &str) -> SegmentKind {
        Lazy::from_iter(SegmentKind::PRIORITY)
            .filter(|kind| self.matches(*kind, fragment))
            .first()
            .unwrap_or(SegmentKind::Unrecognized)
    }

    /// Whether `text` is a non-negative decimal integer.
    pub fn is_integer(&self, text: &str) -> bool {
        self.integer.is_match(text)
    }

    /// Splits a path into raw fragments, in order.
    ///
    /// A leading `$` is dropped, then a single leading `.` unless it starts a
    /// descendant marker. An empty result means the path names the root.
    pub fn split(&self, path: &str) -> Vec<String> {
        let body = strip_root(path);
        let scanners: [fn(&str) -> usize; 4] =
            [scan_glob, scan_plain, scan_descendant, scan_bracket];
        let mut fragments = Vec::new();
        let mut pos = 0;

        while pos < body.len() {
            let rest = &body[pos..];
            let mut end = 0;
            let mut found = Vec::with_capacity(4);

            for scan in scanners {
                let len = scan(&rest[end..]);
                if len > 0 {
                    found.push(&rest[end..end + len]);
                    end += len;
                }
            }

            if end == 0 {
                // Nothing starts here; move on one character.
                pos += rest.chars().next().map_or(1, char::len_utf8);
                continue;
            }
            fragments.extend(found.into_iter().map(str::to_string));
            pos += end;
        }

        fragments
    }

    /// Splits, classifies and parses a full path.
    pub fn parse(&self, path: &str) -> Vec<Segment> {
        self.split(path)
            .iter()
            .map(|fragment| self.segment(fragment))
            .collect()
    }

    /// Classifies and parses a single fragment.
    pub fn segment(&self, fragment: &str) -> Segment {
        match self.classify(fragment) {
            SegmentKind::Plain => Segment::Plain(split_names(fragment)),
            SegmentKind::Glob => Segment::Glob(fragment.to_string()),
            SegmentKind::FilterExpr => Segment::Filter(filter_body(fragment)),
            SegmentKind::Descendant => {
                let trailing = fragment.trim_start_matches('.');
                Segment::Descendant {
                    trailing: (!trailing.is_empty()).then(|| split_names(trailing)),
                }
            }
            SegmentKind::ArrayOp => match self.array.captures(fragment) {
                Some(caps) => array_segment(&caps),
                None => Segment::Unrecognized(fragment.to_string()),
            },
            SegmentKind::Unrecognized => Segment::Unrecognized(fragment.to_string()),
        }
    }
}

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("built-in path pattern must compile")
}

fn strip_root(path: &str) -> &str {
    let body = path.trim_start_matches('$');
    if body.starts_with('.') && !body.starts_with("..") {
        &body[1..]
    } else {
        body
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Glob run: needs a `*` and a word character somewhere ahead on the line,
/// then takes everything up to a `.`, bracket, parenthesis, `?` or quote.
fn scan_glob(s: &str) -> usize {
    let line = s.split('\n').next().unwrap_or_default();
    if !line.contains('*') || !line.chars().any(is_word) {
        return 0;
    }
    s.find(|c: char| ".[]()?'\"".contains(c)).unwrap_or(s.len())
}

/// One name: a word run or a non-empty double-quoted string.
fn scan_name(s: &str) -> usize {
    if let Some(quoted) = s.strip_prefix('"') {
        return match quoted.find('"') {
            Some(close) if close > 0 => close + 2,
            _ => 0,
        };
    }
    s.find(|c: char| !is_word(c)).unwrap_or(s.len())
}

/// Dotted names, never consuming a dot that is not followed by a name.
fn scan_plain(s: &str) -> usize {
    let mut end = scan_name(s);
    if end == 0 {
        return 0;
    }
    while let Some(after_dot) = s[end..].strip_prefix('.') {
        let next = scan_name(after_dot);
        if next == 0 {
            break;
        }
        end += 1 + next;
    }
    end
}

/// Two or three dots, then optional dotted names.
fn scan_descendant(s: &str) -> usize {
    let dots = s.chars().take_while(|c| *c == '.').count();
    if dots < 2 {
        return 0;
    }
    let dots = dots.min(3);
    dots + scan_plain(&s[dots..])
}

/// `[` + at least one non-`]` + `]`.
fn scan_bracket(s: &str) -> usize {
    if !s.starts_with('[') {
        return 0;
    }
    match s[1..].find(']') {
        Some(close) if close > 0 => close + 2,
        _ => 0,
    }
}

/// Splits dotted names, honoring double quotes, and unquotes each name.
fn split_names(fragment: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = fragment;
    loop {
        let len = scan_name(rest).max(rest.find('.').unwrap_or(rest.len()));
        let name = &rest[..len];
        names.push(unquote(name).to_string());
        match rest[len..].strip_prefix('.') {
            Some(next) => rest = next,
            None => break,
        }
    }
    names
}

fn unquote(name: &str) -> &str {
    name.strip_prefix('"')
        .and_then(|n| n.strip_suffix('"'))
        .unwrap_or(name)
}

/// `[?(expr)]` → `(expr)`.
fn filter_body(fragment: &str) -> String {
    let trimmed = fragment.trim();
    let inner = match trimmed.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        Some(inner) => inner,
        None => trimmed,
    };
    inner.trim_start().trim_start_matches('?').to_string()
}

fn array_segment(caps: &Captures<'_>) -> Segment {
    if let Some(filter) = caps.name("filter") {
        return Segment::Filter(filter.as_str().trim_start_matches('?').to_string());
    }
    if caps.name("all").is_some() {
        return Segment::Array(ArraySelector::All);
    }
    if let Some(slices) = caps.name("slices") {
        return Segment::Array(ArraySelector::Slices(parse_slices(slices.as_str())));
    }
    let key = ["single", "double", "tick"]
        .into_iter()
        .find_map(|name| caps.name(name))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    Segment::Array(ArraySelector::Key(key))
}

/// `1:3,-1,:2` → pieces; empty or unreadable pieces are ignored.
fn parse_slices(text: &str) -> Vec<SlicePiece> {
    text.split(',')
        .filter_map(|piece| match piece.split_once(':') {
            None => piece.parse().ok().map(SlicePiece::Index),
            Some((start, end)) => Some(SlicePiece::Range {
                start: start.parse().ok(),
                end: end.parse().ok(),
            }),
        })
        .collect()
}
