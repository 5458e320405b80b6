//! Input checks run before an analysis
//!
//! The checks return structured reports instead of failing right away, so the caller decides
//! how to present missing samples or a malformed metadata header.
use std::collections::HashSet;
use std::fmt;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The kind of identifiers a check is about
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Samples,
    Features,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Samples => write!(f, "samples"),
            ItemKind::Features => write!(f, "features"),
        }
    }
}

/// Outcome of checking that a requested list of identifiers is contained in the data
#[derive(Debug, Clone, PartialEq)]
pub struct SubsetReport {
    kind: ItemKind,
    missing: Vec<String>,
}

impl SubsetReport {
    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Requested identifiers absent from the data, in request order
    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    pub fn is_subset(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn into_result(self) -> Result<()> {
        if self.is_subset() {
            Ok(())
        } else {
            Err(Error::NotASubset {
                kind: self.kind,
                missing: self.missing,
            })
        }
    }
}

/// Check that every requested identifier is present in `available`
///
/// Duplicated requests are reported once.
pub fn check_subset<S: AsRef<str>, T: AsRef<str>>(
    requested: &[S],
    available: &[T],
    kind: ItemKind,
) -> SubsetReport {
    let available = available.iter().map(AsRef::as_ref).collect::<HashSet<_>>();
    let mut reported = HashSet::new();

    let missing = requested
        .iter()
        .map(AsRef::as_ref)
        .filter(|id| !available.contains(id) && reported.insert(*id))
        .map(String::from)
        .collect();

    SubsetReport { kind, missing }
}

/// Outcome of checking the header of a sample metadata table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderCheck {
    Valid,
    /// The header does not have exactly two columns
    WrongColumnCount(usize),
    /// Two columns, but not named `name` and `group`
    WrongNames { found: Vec<String> },
}

impl HeaderCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, HeaderCheck::Valid)
    }
}

/// Check that a metadata header reads `name,group`
///
/// Surrounding whitespace of the column names is ignored.
pub fn check_metadata_header<S: AsRef<str>>(header: &[S]) -> HeaderCheck {
    if header.len() != 2 {
        return HeaderCheck::WrongColumnCount(header.len());
    }

    let found = header
        .iter()
        .map(|x| x.as_ref().trim().to_string())
        .collect::<Vec<_>>();

    if found[0] == "name" && found[1] == "group" {
        HeaderCheck::Valid
    } else {
        HeaderCheck::WrongNames { found }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subset_lists_missing_once() {
        let report = check_subset(
            &["s1", "s9", "s9", "s2"],
            &["s1", "s2", "s3"],
            ItemKind::Samples,
        );

        assert!(!report.is_subset());
        assert_eq!(report.missing(), &["s9"]);
        assert!(matches!(
            report.into_result(),
            Err(Error::NotASubset {
                kind: ItemKind::Samples,
                ..
            })
        ));
    }

    #[test]
    fn subset_accepts_contained_lists() {
        let report = check_subset(&["g2"], &["g1", "g2"], ItemKind::Features);
        assert!(report.is_subset());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn header_checks() {
        assert!(check_metadata_header(&["name", " group"]).is_valid());
        assert_eq!(
            check_metadata_header(&["name"]),
            HeaderCheck::WrongColumnCount(1)
        );
        assert_eq!(
            check_metadata_header(&["sample", "group"]),
            HeaderCheck::WrongNames {
                found: vec!["sample".into(), "group".into()]
            }
        );
    }
}
