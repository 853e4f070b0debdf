//! Textual class label to integer code mapping.

use std::collections::BTreeSet;

/// Maps distinct label strings to integer codes `0..k`.
///
/// Codes follow the lexicographic order of the label strings, so the same
/// set of labels always encodes the same way regardless of row order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Learn the label vocabulary from `labels`.
    pub fn fit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let classes: BTreeSet<String> = labels
            .into_iter()
            .map(|l| l.as_ref().to_string())
            .collect();
        Self {
            classes: classes.into_iter().collect(),
        }
    }

    /// Learn the vocabulary from `labels` and encode them in one pass.
    pub fn fit_transform<S: AsRef<str>>(labels: &[S]) -> (Self, Vec<usize>) {
        let encoder = Self::fit(labels);
        let codes = labels
            .iter()
            .filter_map(|l| encoder.code(l.as_ref()))
            .collect();
        (encoder, codes)
    }

    /// Return the code for `label`, or `None` if it was never seen.
    #[must_use]
    pub fn code(&self, label: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .ok()
    }

    /// Return the label string for `code`, or `None` if out of range.
    #[must_use]
    pub fn label(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    /// Return the class names indexed by code.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Return the number of distinct classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_sorted_order() {
        let (enc, codes) = LabelEncoder::fit_transform(&["R", "M", "R", "M", "M"]);
        assert_eq!(enc.classes(), &["M", "R"]);
        assert_eq!(codes, vec![1, 0, 1, 0, 0]);
    }

    #[test]
    fn row_order_does_not_change_codes() {
        let a = LabelEncoder::fit(["b", "a", "c"]);
        let b = LabelEncoder::fit(["c", "b", "a", "a"]);
        assert_eq!(a, b);
    }

    #[test]
    fn lookups() {
        let enc = LabelEncoder::fit(["setosa", "versicolor", "virginica"]);
        assert_eq!(enc.code("versicolor"), Some(1));
        assert_eq!(enc.code("unknown"), None);
        assert_eq!(enc.label(2), Some("virginica"));
        assert_eq!(enc.label(3), None);
        assert_eq!(enc.n_classes(), 3);
    }
}
