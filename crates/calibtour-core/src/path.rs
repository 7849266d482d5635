//! References to planner-owned paths and the trajectory assembled from them.
//!
//! Paths live inside the external planner. This side only holds positions in
//! the planner's shared path registry ([`PathId`]) or opaque references to
//! path objects that are not registered yet ([`PieceRef`]).

use std::fmt;

use crate::configuration::HandleId;

/// Position of a path in the planner's ordered path registry.
///
/// Positions shift when an earlier entry is erased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathId(pub usize);

impl fmt::Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "path#{}", self.0)
    }
}

/// Opaque reference to an unregistered path object held by the planner
/// (a planned piece or an optimizer output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PieceRef(pub u64);

/// What a segment moves between.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SegmentKind {
    /// Unconstrained transfer between two configurations.
    FreeMotion,
    /// Pre-grasp to contact on a handle and back.
    Contact { handle: HandleId },
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FreeMotion => f.write_str("free motion"),
            Self::Contact { handle } => write!(f, "contact on {handle}"),
        }
    }
}

/// Bookkeeping for one planned segment of the trajectory.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathSegment {
    /// Position of the segment in the trajectory.
    pub index: usize,
    pub kind: SegmentKind,
    /// Path pieces the segment produced, discarded ones included.
    pub pieces: usize,
    /// Registry entries the segment left behind after pruning.
    pub registered: usize,
    /// Registry entries erased as planning/optimization artifacts.
    pub discarded: usize,
    /// Optimizer outputs dropped because they matched their input.
    pub skipped_optimizations: usize,
}

/// Ordered segments merged into one continuous path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trajectory {
    segments: Vec<PathSegment>,
    path: Option<PathId>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_segment(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Total pieces across all segments.
    pub fn piece_count(&self) -> usize {
        self.segments.iter().map(|s| s.pieces).sum()
    }

    /// Total registry entries discarded while building.
    pub fn discarded_count(&self) -> usize {
        self.segments.iter().map(|s| s.discarded).sum()
    }

    /// Pieces that survive into the merged path.
    pub fn kept_piece_count(&self) -> usize {
        self.piece_count() - self.discarded_count()
    }

    /// Registry entries before the final merge.
    pub fn registered_count(&self) -> usize {
        self.segments.iter().map(|s| s.registered).sum()
    }

    /// Registry entry holding the merged trajectory, once merged.
    pub fn path(&self) -> Option<PathId> {
        self.path
    }

    pub fn set_path(&mut self, path: PathId) {
        self.path = Some(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(index: usize, pieces: usize, discarded: usize) -> PathSegment {
        PathSegment {
            index,
            kind: SegmentKind::FreeMotion,
            pieces,
            registered: pieces - discarded,
            discarded,
            skipped_optimizations: 0,
        }
    }

    #[test]
    fn test_trajectory_counts() {
        let mut trajectory = Trajectory::new();
        trajectory.push_segment(segment(0, 3, 2));
        trajectory.push_segment(PathSegment {
            kind: SegmentKind::Contact {
                handle: HandleId::from("box/handle_0"),
            },
            ..segment(1, 2, 0)
        });

        assert_eq!(trajectory.segment_count(), 2);
        assert_eq!(trajectory.piece_count(), 5);
        assert_eq!(trajectory.discarded_count(), 2);
        assert_eq!(trajectory.kept_piece_count(), 3);
        assert_eq!(trajectory.registered_count(), 3);
        assert_eq!(trajectory.path(), None);

        trajectory.set_path(PathId(0));
        assert_eq!(trajectory.path(), Some(PathId(0)));
    }

    #[test]
    fn test_segment_kind_display() {
        assert_eq!(SegmentKind::FreeMotion.to_string(), "free motion");
        let contact = SegmentKind::Contact {
            handle: HandleId::from("box/handle_0"),
        };
        assert_eq!(contact.to_string(), "contact on box/handle_0");
    }
}
