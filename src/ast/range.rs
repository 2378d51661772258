use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lower bound {lower} is not below upper bound {upper}")]
pub struct RangeError {
    pub lower: usize,
    pub upper: usize,
}

/// A half-open `lower..upper` byte range into the source buffer.
///
/// A range never owns text. [`Range::slice`] re-borrows the shared source
/// whenever the text is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    lower: usize,
    upper: usize,
}

impl Range {
    pub fn new(lower: usize, upper: usize) -> Self {
        Range { lower, upper }
    }

    /// A range that starts at `lower` and has not grown yet.
    pub fn starting_at(lower: usize) -> Self {
        Range {
            lower,
            upper: lower,
        }
    }

    pub fn lower(&self) -> usize {
        self.lower
    }

    pub fn upper(&self) -> usize {
        self.upper
    }

    pub fn extend_upper_bound(&mut self, upper: usize) {
        self.upper = upper;
    }

    /// The same range with `n` bytes dropped from the end, e.g. a label's
    /// trailing colon.
    pub fn trim_end(&self, n: usize) -> Self {
        Range {
            lower: self.lower,
            upper: self.upper.saturating_sub(n).max(self.lower),
        }
    }

    pub fn len(&self) -> usize {
        self.upper.saturating_sub(self.lower)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks `lower < upper`. Not enforced on construction; a range is
    /// allowed to be empty while the parser is still growing it.
    pub fn validate(&self) -> Result<(), RangeError> {
        if self.lower < self.upper {
            return Ok(());
        }

        Err(RangeError {
            lower: self.lower,
            upper: self.upper,
        })
    }

    pub fn to_array(&self) -> [usize; 2] {
        [self.lower, self.upper]
    }

    /// Materializes the referenced text.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds for `source` or does not fall on
    /// character boundaries. Ranges produced by the parser always satisfy both
    /// for the source they were parsed from.
    pub fn slice<'src>(&self, source: &'src str) -> &'src str {
        &source[self.lower..self.upper]
    }

    /// Like [`Range::slice`], but `None` when the range does not fit `source`.
    pub fn get<'src>(&self, source: &'src str) -> Option<&'src str> {
        source.get(self.lower..self.upper)
    }
}

impl From<Range> for std::ops::Range<usize> {
    fn from(range: Range) -> Self {
        range.lower..range.upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_is_half_open() {
        let range = Range::new(2, 5);
        assert_eq!(range.slice("abcdefg"), "cde");
    }

    #[test]
    fn test_extend_upper_bound() {
        let mut range = Range::starting_at(1);
        assert!(range.is_empty());
        range.extend_upper_bound(4);
        assert_eq!(range.to_array(), [1, 4]);
        assert_eq!(range.slice("label: x"), "abe");
    }

    #[test]
    fn test_trim_end_drops_colon() {
        let source = "loop: nop";
        let range = Range::new(0, 5);
        assert_eq!(range.trim_end(1).slice(source), "loop");
    }

    #[test]
    fn test_trim_end_never_crosses_lower() {
        let range = Range::new(3, 4);
        assert_eq!(range.trim_end(5), Range::new(3, 3));
    }

    #[test]
    fn test_validate_is_on_demand() {
        let empty = Range::starting_at(7);
        assert!(empty.validate().is_err());
        assert!(Range::new(7, 8).validate().is_ok());

        let err = Range::new(9, 2).validate().unwrap_err();
        assert_eq!((err.lower, err.upper), (9, 2));
    }

    #[test]
    fn test_get_rejects_foreign_source() {
        assert_eq!(Range::new(2, 5).get("abcdefg"), Some("cde"));
        assert_eq!(Range::new(2, 9).get("abc"), None);
        // 'é' occupies bytes 1..3
        assert_eq!(Range::new(2, 3).get("xé"), None);
    }

    #[test]
    fn test_into_std_range() {
        let std_range: std::ops::Range<usize> = Range::new(1, 3).into();
        assert_eq!(std_range, 1..3);
    }
}
