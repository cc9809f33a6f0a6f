use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Minimum run of hex digits treated as an identifier rather than a slug.
const MIN_HEX_ID_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTableError {
    #[error("route pattern must start with '/': {0}")]
    NotAbsolute(String),
    #[error("unknown placeholder '{placeholder}' in pattern {pattern}")]
    UnknownPlaceholder { pattern: String, placeholder: String },
    #[error("duplicate route pattern {0}")]
    Duplicate(String),
    #[error("route {pattern} names unknown parent {parent}")]
    UnknownParent { pattern: String, parent: String },
    #[error("route {0} is its own ancestor")]
    ParentCycle(String),
}

/// One segment of a route pattern.
///
/// Variant order is specificity order: literals beat `:id`, which beats `:slug`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternSegment {
    Literal(String),
    Id,
    Slug,
}

impl PatternSegment {
    fn rank(&self) -> u8 {
        match self {
            PatternSegment::Literal(_) => 2,
            PatternSegment::Id => 1,
            PatternSegment::Slug => 0,
        }
    }

    fn matches(&self, segment: &str) -> bool {
        match self {
            PatternSegment::Literal(literal) => literal == segment,
            PatternSegment::Id => is_hex_id(segment),
            PatternSegment::Slug => is_slug(segment),
        }
    }
}

/// A parsed path pattern such as `/contests/:id/problems/:slug`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoutePattern {
    segments: Vec<PatternSegment>,
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Result<Self, RouteTableError> {
        if !pattern.starts_with('/') {
            return Err(RouteTableError::NotAbsolute(pattern.to_string()));
        }
        let segments = split_segments(pattern)
            .map(|segment| match segment.strip_prefix(':') {
                Some("id") => Ok(PatternSegment::Id),
                Some("slug") => Ok(PatternSegment::Slug),
                Some(other) => Err(RouteTableError::UnknownPlaceholder {
                    pattern: pattern.to_string(),
                    placeholder: other.to_string(),
                }),
                None => Ok(PatternSegment::Literal(segment.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PatternSegment] {
        &self.segments
    }

    pub fn is_literal(&self) -> bool {
        self.segments
            .iter()
            .all(|segment| matches!(segment, PatternSegment::Literal(_)))
    }

    fn matches(&self, segments: &[&str]) -> bool {
        self.segments.len() == segments.len()
            && self
                .segments
                .iter()
                .zip(segments)
                .all(|(pattern, segment)| pattern.matches(segment))
    }

    /// Compares specificity from the last segment backwards.
    fn specificity(&self, other: &Self) -> Ordering {
        self.segments
            .iter()
            .rev()
            .map(PatternSegment::rank)
            .cmp(other.segments.iter().rev().map(PatternSegment::rank))
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            match segment {
                PatternSegment::Literal(literal) => write!(f, "/{literal}")?,
                PatternSegment::Id => f.write_str("/:id")?,
                PatternSegment::Slug => f.write_str("/:slug")?,
            }
        }
        Ok(())
    }
}

/// Title and optional parent linkage for one pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub pattern: RoutePattern,
    pub title: String,
    pub parent: Option<RoutePattern>,
}

impl RouteEntry {
    pub fn new(pattern: &str, title: impl Into<String>) -> Result<Self, RouteTableError> {
        Ok(Self {
            pattern: RoutePattern::parse(pattern)?,
            title: title.into(),
            parent: None,
        })
    }

    pub fn with_parent(mut self, parent: &str) -> Result<Self, RouteTableError> {
        self.parent = Some(RoutePattern::parse(parent)?);
        Ok(self)
    }
}

/// Ordered static mapping from path patterns to breadcrumb titles.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    literals: HashMap<String, usize>,
}

impl RouteTable {
    pub fn new(entries: Vec<RouteEntry>) -> Result<Self, RouteTableError> {
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            if index.insert(entry.pattern.clone(), position).is_some() {
                return Err(RouteTableError::Duplicate(entry.pattern.to_string()));
            }
        }
        for entry in &entries {
            if let Some(parent) = &entry.parent {
                if !index.contains_key(parent) {
                    return Err(RouteTableError::UnknownParent {
                        pattern: entry.pattern.to_string(),
                        parent: parent.to_string(),
                    });
                }
            }
        }

        let literals = entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.pattern.is_literal())
            .map(|(position, entry)| (entry.pattern.to_string(), position))
            .collect();
        let table = Self { entries, literals };

        for entry in &table.entries {
            table.ancestors(&entry.pattern)?;
        }
        Ok(table)
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds the entry for a concrete path, most specific pattern first.
    pub fn lookup(&self, path: &str) -> Option<&RouteEntry> {
        let path = strip_query(path);
        let segments: Vec<&str> = split_segments(path).collect();
        if let Some(&position) = self.literals.get(&canonical_path(path)) {
            return self.entries.get(position);
        }

        // Ties keep table order.
        self.entries
            .iter()
            .filter(|entry| !entry.pattern.is_literal() && entry.pattern.matches(&segments))
            .fold(None, |best: Option<&RouteEntry>, candidate| match best {
                Some(current)
                    if candidate.pattern.specificity(&current.pattern) != Ordering::Greater =>
                {
                    Some(current)
                }
                _ => Some(candidate),
            })
    }

    /// Parent chain of `pattern`, nearest parent first.
    pub fn ancestors(&self, pattern: &RoutePattern) -> Result<Vec<&RouteEntry>, RouteTableError> {
        let mut chain = Vec::new();
        let mut current = self.entry_for(pattern).and_then(|entry| entry.parent.as_ref());
        while let Some(parent) = current {
            if parent == pattern || chain.len() > self.entries.len() {
                return Err(RouteTableError::ParentCycle(pattern.to_string()));
            }
            let Some(entry) = self.entry_for(parent) else {
                break;
            };
            chain.push(entry);
            current = entry.parent.as_ref();
        }
        Ok(chain)
    }

    fn entry_for(&self, pattern: &RoutePattern) -> Option<&RouteEntry> {
        self.entries.iter().find(|entry| &entry.pattern == pattern)
    }
}

pub(crate) fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

pub(crate) fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

/// The form every path is keyed and matched by: no query or fragment, no
/// empty segments, a leading `/` and no trailing one.
pub fn canonical_path(path: &str) -> String {
    let canonical: String = split_segments(strip_query(path))
        .map(|segment| format!("/{segment}"))
        .collect();
    if canonical.is_empty() {
        "/".to_string()
    } else {
        canonical
    }
}

/// A 24-character object id, or any other long run of hex digits.
pub fn is_hex_id(segment: &str) -> bool {
    segment.len() >= MIN_HEX_ID_LEN && segment.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Lowercase alphanumerics and hyphens.
pub fn is_slug(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}
