//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`StationId`] - Validated station identifier
//! - [`Direction`] - Traversal direction (`left` toward parents, `right` toward children)
//! - [`BranchType`] - Through / non-through branch classification
//! - [`BranchEntry`] - Per-station, per-direction branch annotation
//! - [`BranchSlot`] - Upper/lower slot of a branch at a branch point
//! - [`Fingerprint`] - Topology hash for change detection
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use branchwork::core::types::{BranchEntry, BranchType, Direction, StationId};
//!
//! let id = StationId::new("shd8x2").unwrap();
//! assert_eq!(Direction::Right.mirror(), Direction::Left);
//!
//! let entry = BranchEntry::new(BranchType::Through, id.clone());
//! assert_eq!(entry.first(), Some(&id));
//! assert!(BranchEntry::Empty.is_empty());
//!
//! assert!(StationId::new("").is_err());
//! assert!(StationId::new("has space").is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid station id: {0}")]
    InvalidStationId(String),

    #[error("invalid direction: {0}")]
    InvalidDirection(String),

    #[error("invalid branch type: {0}")]
    InvalidBranchType(String),

    #[error("invalid branch slot: {0}")]
    InvalidBranchSlot(String),

    #[error("invalid branch entry: {0}")]
    InvalidBranchEntry(String),
}

/// A validated station identifier.
///
/// Identifiers are opaque keys into the station arena. They must be
/// non-empty and contain no whitespace or control characters. The line
/// terminals `linestart` and `lineend` are ordinary identifiers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StationId(String);

impl StationId {
    /// Create a new validated station id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidStationId` if the id is empty or contains
    /// whitespace or control characters.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.is_empty() {
            return Err(TypeError::InvalidStationId(
                "station id cannot be empty".into(),
            ));
        }
        if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(TypeError::InvalidStationId(format!(
                "station id '{}' cannot contain whitespace or control characters",
                id.escape_debug()
            )));
        }
        Ok(Self(id))
    }

    /// Get the station id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StationId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StationId> for String {
    fn from(id: StationId) -> Self {
        id.0
    }
}

impl FromStr for StationId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for StationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which neighbour list a direction reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Parents,
    Children,
}

/// Traversal direction relative to a station.
///
/// `Left` looks toward parents, `Right` toward children. Every
/// direction-dependent operation in the crate is written once against
/// this enum and uses [`Direction::side`] and [`Direction::mirror`]
/// instead of duplicating the left/right cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Both directions, left first.
    pub const ALL: [Direction; 2] = [Direction::Left, Direction::Right];

    /// The neighbour list this direction reads.
    pub fn side(self) -> Side {
        match self {
            Direction::Left => Side::Parents,
            Direction::Right => Side::Children,
        }
    }

    /// The direction the paired endpoint of a branch run looks back along.
    pub fn mirror(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl FromStr for Direction {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            other => Err(TypeError::InvalidDirection(other.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Branch classification at a branch point.
///
/// `Through` means trains continue across the branch point;
/// `NonThrough` means they terminate or originate there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchType {
    Through,
    #[serde(rename = "nonthrough")]
    NonThrough,
}

impl BranchType {
    pub fn as_str(self) -> &'static str {
        match self {
            BranchType::Through => "through",
            BranchType::NonThrough => "nonthrough",
        }
    }
}

impl FromStr for BranchType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "through" => Ok(BranchType::Through),
            "nonthrough" => Ok(BranchType::NonThrough),
            other => Err(TypeError::InvalidBranchType(other.to_string())),
        }
    }
}

impl fmt::Display for BranchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical slot of a branch at a branch point.
///
/// The slot is the index of the branch's first neighbour within the
/// two-entry neighbour list: index 0 is upper, index 1 is lower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchSlot {
    Upper,
    Lower,
}

impl BranchSlot {
    /// Neighbour-list index for this slot.
    pub fn index(self) -> usize {
        match self {
            BranchSlot::Upper => 0,
            BranchSlot::Lower => 1,
        }
    }

    /// Slot for a neighbour-list index. Anything past the first entry is lower.
    pub fn from_index(index: usize) -> Self {
        if index == 0 {
            BranchSlot::Upper
        } else {
            BranchSlot::Lower
        }
    }
}

impl FromStr for BranchSlot {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upper" => Ok(BranchSlot::Upper),
            "lower" => Ok(BranchSlot::Lower),
            other => Err(TypeError::InvalidBranchSlot(other.to_string())),
        }
    }
}

impl fmt::Display for BranchSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BranchSlot::Upper => "upper",
            BranchSlot::Lower => "lower",
        })
    }
}

/// Branch annotation for one side of a station.
///
/// Serialized the way parameter documents store it: `[]` when empty,
/// `["through", "<first>"]` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub enum BranchEntry {
    #[default]
    Empty,
    Branch {
        branch_type: BranchType,
        first: StationId,
    },
}

impl BranchEntry {
    pub fn new(branch_type: BranchType, first: StationId) -> Self {
        BranchEntry::Branch { branch_type, first }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, BranchEntry::Empty)
    }

    pub fn branch_type(&self) -> Option<BranchType> {
        match self {
            BranchEntry::Empty => None,
            BranchEntry::Branch { branch_type, .. } => Some(*branch_type),
        }
    }

    pub fn first(&self) -> Option<&StationId> {
        match self {
            BranchEntry::Empty => None,
            BranchEntry::Branch { first, .. } => Some(first),
        }
    }
}

impl TryFrom<Vec<String>> for BranchEntry {
    type Error = TypeError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        match value.as_slice() {
            [] => Ok(BranchEntry::Empty),
            [branch_type, first] => Ok(BranchEntry::Branch {
                branch_type: branch_type.parse()?,
                first: StationId::new(first.as_str())?,
            }),
            other => Err(TypeError::InvalidBranchEntry(format!(
                "expected 0 or 2 elements, found {}",
                other.len()
            ))),
        }
    }
}

impl From<BranchEntry> for Vec<String> {
    fn from(entry: BranchEntry) -> Self {
        match entry {
            BranchEntry::Empty => Vec::new(),
            BranchEntry::Branch { branch_type, first } => {
                vec![branch_type.as_str().to_string(), first.into()]
            }
        }
    }
}

impl fmt::Display for BranchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchEntry::Empty => f.write_str("-"),
            BranchEntry::Branch { branch_type, first } => write!(f, "{} via {}", branch_type, first),
        }
    }
}

/// Topology fingerprint for change detection.
///
/// A SHA-256 digest over every station's neighbour lists and branch
/// entries, fed in identifier order so the same topology always hashes
/// the same. Display fields do not contribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute a fingerprint from `(station, parents, children, left, right)` rows.
    ///
    /// Rows are sorted by station id before hashing.
    pub fn compute<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<
            Item = (
                &'a StationId,
                &'a [StationId],
                &'a [StationId],
                &'a BranchEntry,
                &'a BranchEntry,
            ),
        >,
    {
        let mut sorted: Vec<_> = rows.into_iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let mut hasher = Sha256::new();
        for (id, parents, children, left, right) in sorted {
            hasher.update(id.as_str().as_bytes());
            hasher.update(b"\0");
            for parent in parents {
                hasher.update(parent.as_str().as_bytes());
                hasher.update(b",");
            }
            hasher.update(b"\0");
            for child in children {
                hasher.update(child.as_str().as_bytes());
                hasher.update(b",");
            }
            hasher.update(b"\0");
            hasher.update(left.to_string().as_bytes());
            hasher.update(b"\0");
            hasher.update(right.to_string().as_bytes());
            hasher.update(b"\n");
        }

        Self(hex::encode(hasher.finalize()))
    }

    /// Get the fingerprint as a hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
