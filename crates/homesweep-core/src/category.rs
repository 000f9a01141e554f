//! Cleanup categories.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, FromRepr, IntoStaticStr};

/// The six disjoint-ish buckets a scan sorts files into.
///
/// Large and old overlap; every other pair is exclusive. The numeric
/// representation is the menu number shown to the operator.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    FromRepr,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[repr(u8)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Files with identical content.
    Duplicates = 1,
    /// Zero-byte files.
    EmptyFiles = 2,
    /// Directories with no retained children.
    EmptyDirs = 3,
    /// OS and application metadata files.
    JunkFiles = 4,
    /// Files at or above the large threshold.
    LargeFiles = 5,
    /// Files not modified within the old threshold.
    OldFiles = 6,
}

impl Category {
    /// Menu number of this category (1-6).
    pub fn number(self) -> u8 {
        self as u8
    }

    /// Look up a category by its menu number.
    pub fn from_number(number: u8) -> Option<Self> {
        Self::from_repr(number)
    }

    /// Human-readable title.
    pub fn title(self) -> &'static str {
        match self {
            Self::Duplicates => "Duplicate files",
            Self::EmptyFiles => "Empty files",
            Self::EmptyDirs => "Empty directories",
            Self::JunkFiles => "Junk files",
            Self::LargeFiles => "Large files",
            Self::OldFiles => "Old files",
        }
    }

    /// Whether the category lists directories rather than files.
    pub fn is_directory_category(self) -> bool {
        matches!(self, Self::EmptyDirs)
    }
}
