//! Range sets over child positions
//!
//! A [`RangeSet`] is a compact description of integer positions, evaluated
//! lazily against a length. It is how tokens declare where a given kind of
//! child may sit, and which child positions can never be removed.
//!
//! ## Syntax
//!
//! Items are separated by commas:
//!
//! - `3`: a single index; negative values count from the end (`-1` is last)
//! - `start:end:step`: half-open slice, every part optional, `step >= 1`
//! - `odd` / `even`: shorthands for `1::2` and `::2`
//!
//! ```text
//! "0"        -> first child only
//! "1:"       -> everything but the first child
//! "0,-1"     -> first and last
//! "::2"      -> 0, 2, 4, …
//! ```
//!
//! Negative indices are resolved against the length passed to
//! [`RangeSet::contains`], so one declaration adapts as a token grows.

use std::fmt;
use std::str::FromStr;

/// Error raised for a malformed range expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeSetError {
    /// An index or slice bound is not an integer
    InvalidNumber(String),
    /// Slice step must be at least 1
    InvalidStep(String),
    /// More than three `:`-separated parts
    TooManyParts(String),
}

impl fmt::Display for RangeSetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeSetError::InvalidNumber(item) => write!(f, "Invalid range number in '{}'", item),
            RangeSetError::InvalidStep(item) => {
                write!(f, "Range step must be a positive integer in '{}'", item)
            }
            RangeSetError::TooManyParts(item) => {
                write!(f, "Range slice has too many parts: '{}'", item)
            }
        }
    }
}

impl std::error::Error for RangeSetError {}

/// One item of a range set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeItem {
    Index(isize),
    Slice {
        start: Option<isize>,
        end: Option<isize>,
        step: usize,
    },
}

impl RangeItem {
    /// Whether `index` is covered by this item when the sequence has `len` elements
    pub fn contains(&self, index: usize, len: usize) -> bool {
        match *self {
            RangeItem::Index(i) => resolve(i, len).is_some_and(|i| i == index && i < len),
            RangeItem::Slice { start, end, step } => {
                let start = start.map_or(0, |s| clamp(s, len));
                let end = end.map_or(len, |e| clamp(e, len));
                index >= start && index < end && (index - start) % step == 0
            }
        }
    }
}

fn resolve(i: isize, len: usize) -> Option<usize> {
    if i >= 0 {
        Some(i as usize)
    } else {
        let back = i.unsigned_abs();
        len.checked_sub(back)
    }
}

fn clamp(i: isize, len: usize) -> usize {
    if i >= 0 {
        (i as usize).min(len)
    } else {
        len.saturating_sub(i.unsigned_abs())
    }
}

impl fmt::Display for RangeItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeItem::Index(i) => write!(f, "{}", i),
            RangeItem::Slice { start, end, step } => {
                if let Some(start) = start {
                    write!(f, "{}", start)?;
                }
                write!(f, ":")?;
                if let Some(end) = end {
                    write!(f, "{}", end)?;
                }
                if *step != 1 {
                    write!(f, ":{}", step)?;
                }
                Ok(())
            }
        }
    }
}

/// A set of positions made of indices and slices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSet {
    items: Vec<RangeItem>,
}

impl RangeSet {
    /// The empty set
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Every position
    pub fn all() -> Self {
        Self {
            items: vec![RangeItem::Slice {
                start: None,
                end: None,
                step: 1,
            }],
        }
    }

    /// Exactly the given indices
    pub fn at(indices: &[isize]) -> Self {
        Self {
            items: indices.iter().map(|&i| RangeItem::Index(i)).collect(),
        }
    }

    /// Every position from `start` on, `start:` in range syntax
    pub fn starting_at(start: isize) -> Self {
        Self {
            items: vec![RangeItem::Slice {
                start: Some(start),
                end: None,
                step: 1,
            }],
        }
    }

    pub fn from_items(items: Vec<RangeItem>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[RangeItem] {
        &self.items
    }

    pub fn push(&mut self, item: RangeItem) {
        self.items.push(item);
    }

    /// Whether `index` belongs to the set for a sequence of `len` elements
    pub fn contains(&self, index: usize, len: usize) -> bool {
        self.items.iter().any(|item| item.contains(index, len))
    }

    /// All covered indices below `len`, in ascending order
    pub fn indices(&self, len: usize) -> Vec<usize> {
        (0..len).filter(|&i| self.contains(i, len)).collect()
    }
}

impl FromStr for RangeSet {
    type Err = RangeSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut items = Vec::new();
        for raw in s.split(',') {
            let item = raw.trim();
            if item.is_empty() {
                continue;
            }
            items.push(parse_item(item)?);
        }
        Ok(Self { items })
    }
}

fn parse_item(item: &str) -> Result<RangeItem, RangeSetError> {
    match item {
        "odd" => {
            return Ok(RangeItem::Slice {
                start: Some(1),
                end: None,
                step: 2,
            })
        }
        "even" => {
            return Ok(RangeItem::Slice {
                start: None,
                end: None,
                step: 2,
            })
        }
        _ => {}
    }

    let parts: Vec<&str> = item.split(':').collect();
    let number = |part: &str| -> Result<Option<isize>, RangeSetError> {
        let part = part.trim();
        if part.is_empty() {
            return Ok(None);
        }
        part.parse::<isize>()
            .map(Some)
            .map_err(|_| RangeSetError::InvalidNumber(item.to_string()))
    };

    match parts.as_slice() {
        [single] => number(single)?
            .map(RangeItem::Index)
            .ok_or_else(|| RangeSetError::InvalidNumber(item.to_string())),
        [start, end] => Ok(RangeItem::Slice {
            start: number(start)?,
            end: number(end)?,
            step: 1,
        }),
        [start, end, step] => {
            let step = match number(step)? {
                None => 1,
                Some(s) if s >= 1 => s as usize,
                Some(_) => return Err(RangeSetError::InvalidStep(item.to_string())),
            };
            Ok(RangeItem::Slice {
                start: number(start)?,
                end: number(end)?,
                step,
            })
        }
        _ => Err(RangeSetError::TooManyParts(item.to_string())),
    }
}

impl fmt::Display for RangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.items.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", rendered.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(s: &str) -> RangeSet {
        s.parse().unwrap()
    }

    #[test]
    fn test_single_index() {
        let r = set("1");
        assert!(!r.contains(0, 3));
        assert!(r.contains(1, 3));
        assert!(!r.contains(1, 1));
    }

    #[test]
    fn test_negative_index_tracks_length() {
        let r = set("-1");
        assert!(r.contains(2, 3));
        assert!(r.contains(4, 5));
        assert!(!r.contains(2, 5));
        assert!(!r.contains(0, 0));
    }

    #[test]
    fn test_open_slice() {
        let r = set("1:");
        assert_eq!(r.indices(4), vec![1, 2, 3]);
    }

    #[test]
    fn test_bounded_slice_with_step() {
        let r = set("1:6:2");
        assert_eq!(r.indices(10), vec![1, 3, 5]);
    }

    #[test]
    fn test_negative_slice_bounds() {
        let r = set(":-1");
        assert_eq!(r.indices(4), vec![0, 1, 2]);
        let r = set("-2:");
        assert_eq!(r.indices(4), vec![2, 3]);
    }

    #[test]
    fn test_odd_even() {
        assert_eq!(set("odd").indices(6), vec![1, 3, 5]);
        assert_eq!(set("even").indices(5), vec![0, 2, 4]);
    }

    #[test]
    fn test_union() {
        assert_eq!(set("0,-1").indices(4), vec![0, 3]);
        assert_eq!(set("0, 2:4").indices(5), vec![0, 2, 3]);
    }

    #[test]
    fn test_constructors_match_parsed_sets() {
        assert_eq!(RangeSet::at(&[0, -1]).indices(4), set("0,-1").indices(4));
        assert_eq!(RangeSet::starting_at(2).indices(5), set("2:").indices(5));
        assert_eq!(RangeSet::all().indices(3), vec![0, 1, 2]);
        assert!(RangeSet::new().indices(3).is_empty());
    }

    #[test]
    fn test_invalid_expressions() {
        assert!(matches!(
            "a".parse::<RangeSet>(),
            Err(RangeSetError::InvalidNumber(_))
        ));
        assert!(matches!(
            "::0".parse::<RangeSet>(),
            Err(RangeSetError::InvalidStep(_))
        ));
        assert!(matches!(
            "1:2:3:4".parse::<RangeSet>(),
            Err(RangeSetError::TooManyParts(_))
        ));
    }

    #[test]
    fn test_display_round_trip() {
        for expr in ["0", "-1", "1:", ":3", "1:6:2", "0,-1"] {
            assert_eq!(set(expr).to_string(), expr);
        }
        assert_eq!(set("odd").to_string(), "1::2");
    }
}
