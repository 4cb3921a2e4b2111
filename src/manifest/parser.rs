//! Scanner for the dependency arrays of a PKGBUILD.
//!
//! Parsing happens in four explicit passes over each array body:
//! 1. [`array_bodies`] - locate `key=(` at a word boundary and cut at the first `)`
//! 2. [`strip_comments`] - drop everything from `#` to the end of each line
//! 3. [`segments`] - cut the body into `'…'` / `"…"` entries, which may contain
//!    spaces, and the bare text between them, in source order
//! 4. bare tokens - whitespace-split the bare text, skipping comparators and connectives
//!
//! Every surviving entry goes through [`base_name`], which cuts the version
//! constraint and rejects variable references.

use super::{DependencyLists, DependencySet};
use crate::constants::{BUILD_DEPENDS_KEY, RUN_DEPENDS_KEY};

/// Tokens that only ever appear between a name and its version.
const COMPARATORS: &[&str] = &[">=", "<=", "=", ">", "<"];

/// Boolean connectives occasionally written between alternatives.
const CONNECTIVES: &[&str] = &["and", "or"];

/// Extract the build-time and run-time dependency sets from manifest text.
///
/// Arrays that do not appear yield empty sets. When an array is assigned more
/// than once (split packages assign `depends` inside each `package_*()`
/// function) the entries of every assignment are merged.
///
/// ```rust
/// use srcpkg_cli::manifest::parse;
///
/// let lists = parse("depends=('foo>=1.2' bar \"baz<=3\")");
/// assert_eq!(lists.run.iter().collect::<Vec<_>>(), vec!["foo", "bar", "baz"]);
/// assert!(lists.build.is_empty());
/// ```
#[must_use]
pub fn parse(text: &str) -> DependencyLists {
    DependencyLists {
        build: parse_array(text, BUILD_DEPENDS_KEY),
        run: parse_array(text, RUN_DEPENDS_KEY),
    }
}

fn parse_array(text: &str, key: &str) -> DependencySet {
    let mut set = DependencySet::new();
    for body in array_bodies(text, key) {
        parse_entries(body, &mut set);
    }
    set
}

/// Bodies of every `key=( … )` assignment in `text`.
///
/// The key must not be preceded by an identifier character, so `depends` does
/// not match inside `makedepends`, `optdepends` or `checkdepends`. The body ends
/// at the first `)`; an assignment without one is ignored.
fn array_bodies<'a>(text: &'a str, key: &str) -> Vec<&'a str> {
    let opening = format!("{key}=(");
    let mut bodies = Vec::new();
    let mut offset = 0;

    while let Some(found) = text[offset..].find(&opening) {
        let start = offset + found;
        let body_start = start + opening.len();
        offset = body_start;

        let at_boundary = text[..start].chars().next_back().is_none_or(|c| !is_identifier_char(c));
        if !at_boundary {
            continue;
        }

        let rest = &text[body_start..];
        let Some(end) = rest.find(')') else {
            break;
        };
        bodies.push(&rest[..end]);
        offset = body_start + end + 1;
    }

    bodies
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn parse_entries(body: &str, set: &mut DependencySet) {
    let uncommented = strip_comments(body);

    for segment in segments(&uncommented) {
        match segment {
            Segment::Quoted(entry) => {
                if let Some(name) = base_name(entry) {
                    set.insert(name);
                }
            }
            Segment::Bare(text) => {
                for token in text.split_whitespace() {
                    let token = token.trim_matches(|c| c == '\'' || c == '"' || c == ' ');
                    if token.is_empty()
                        || COMPARATORS.contains(&token)
                        || CONNECTIVES.contains(&token)
                    {
                        continue;
                    }
                    if let Some(name) = base_name(token) {
                        set.insert(name);
                    }
                }
            }
        }
    }
}

/// Remove `#` comments up to the end of each line.
fn strip_comments(body: &str) -> String {
    body.lines()
        .map(|line| match line.find('#') {
            Some(idx) => &line[..idx],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A piece of an array body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    /// Contents of a `'…'` or `"…"` entry, without the quotes
    Quoted(&'a str),
    /// Unquoted text, still to be split on whitespace
    Bare(&'a str),
}

/// Cut `text` into quoted entries and the bare text around them.
///
/// A quoted entry runs from a `'` or `"` to the next quote of the same kind.
/// Segments come back in source order, so `glibc 'zlib'` yields `glibc` before
/// `zlib`. Text on either side of a quoted entry ends up in separate bare
/// segments. An unterminated quote is left in the trailing bare segment, where
/// token trimming removes the stray quote character.
fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find(['\'', '"']) {
        let quote = rest[open..].chars().next().unwrap_or('\'');
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find(quote) else {
            break;
        };

        if open > 0 {
            segments.push(Segment::Bare(&rest[..open]));
        }
        let entry = &after_open[..close];
        if !entry.is_empty() {
            segments.push(Segment::Quoted(entry));
        }
        rest = &after_open[close + 1..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Bare(rest));
    }
    segments
}

/// Cut `entry` at its first version comparator and trim it.
///
/// Returns `None` for empty names and `$` variable references.
fn base_name(entry: &str) -> Option<&str> {
    let name = entry.split(['<', '>', '=']).next().unwrap_or_default().trim();
    if name.is_empty() || name.starts_with('$') {
        None
    } else {
        Some(name)
    }
}
