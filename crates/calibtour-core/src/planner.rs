//! Capability interfaces of the external motion planner.
//!
//! The planner is a remote service holding mutable shared state: one current
//! problem and one ordered registry of stored paths. Every call is a
//! synchronous round trip that may fail with an implementation-defined
//! [`PlannerError`]. Nothing here is safe to call concurrently.
//!
//! The capabilities are split the way the planner exposes them so that
//! drivers only ask for what they use; [`Planner`] bundles all of them.

use std::fmt;

use crate::configuration::{Configuration, HandleId};
use crate::error::PlannerError;
use crate::path::{PathId, PieceRef};

/// Result of a single planner call.
pub type PlannerResult<T> = std::result::Result<T, PlannerError>;

/// The planner's shared, ordered registry of stored paths.
///
/// Erasing entry `k` shifts every later entry down by one.
pub trait PathRegistry {
    fn number_paths(&mut self) -> PlannerResult<usize>;

    fn erase_path(&mut self, id: PathId) -> PlannerResult<()>;

    /// Appends path `end` onto path `start`, in place. `end` stays stored.
    fn concatenate_path(&mut self, start: PathId, end: PathId) -> PlannerResult<()>;

    /// Stores a path object at the end of the registry.
    fn add_path(&mut self, piece: PieceRef) -> PlannerResult<PathId>;
}

/// Value of a named planner parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterValue {
    Float(f64),
    Integer(i64),
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for ParameterValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
        }
    }
}

/// The planner's current problem: initial/goal configurations, selected
/// optimizers, parameters and `solve()`.
pub trait ProblemSolver: PathRegistry {
    fn set_initial_config(&mut self, q: &Configuration) -> PlannerResult<()>;

    fn reset_goal_configs(&mut self) -> PlannerResult<()>;

    fn add_goal_config(&mut self, q: &Configuration) -> PlannerResult<()>;

    /// Plans from the initial to the goal configurations.
    ///
    /// Stores the raw path and then one path per selected optimizer; the
    /// last stored entry is the fully optimized one.
    fn solve(&mut self) -> PlannerResult<()>;

    fn clear_path_optimizers(&mut self) -> PlannerResult<()>;

    fn add_path_optimizer(&mut self, name: &str) -> PlannerResult<()>;

    fn set_parameter(&mut self, name: &str, value: ParameterValue) -> PlannerResult<()>;

    fn set_max_iter_path_planning(&mut self, iterations: usize) -> PlannerResult<()>;

    /// Distance between two configurations as the planner measures it.
    fn distance(&mut self, a: &Configuration, b: &Configuration) -> PlannerResult<f64>;
}

/// Outcome of projecting a configuration onto a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Projected(Configuration),
    Failed(String),
}

/// Outcome of a validity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid(String),
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Configuration sampling, projection and validation.
pub trait ConfigurationSpace {
    fn shoot_random_config(&mut self) -> PlannerResult<Configuration>;

    /// Projects `target` onto the leaf of `transition` reachable from `seed`.
    fn generate_target_config(
        &mut self,
        transition: &str,
        seed: &Configuration,
        target: &Configuration,
    ) -> PlannerResult<Projection>;

    fn is_config_valid(&mut self, q: &Configuration) -> PlannerResult<Validity>;
}

/// A straight path stored by `direct_path`, with its validation verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectPath {
    pub path: PathId,
    pub valid: bool,
    pub message: String,
}

/// The planner's roadmap.
pub trait Roadmap: PathRegistry {
    fn add_config_to_roadmap(&mut self, q: &Configuration) -> PlannerResult<()>;

    /// Stores the straight path from `a` to `b`, optionally validating it.
    fn direct_path(
        &mut self,
        a: &Configuration,
        b: &Configuration,
        validate: bool,
    ) -> PlannerResult<DirectPath>;

    fn add_edge_to_roadmap(
        &mut self,
        a: &Configuration,
        b: &Configuration,
        path: PathId,
        both_ways: bool,
    ) -> PlannerResult<()>;
}

/// One segment to plan: from a configuration to another, optionally through
/// a contact on a handle.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRequest {
    pub index: usize,
    pub from: Configuration,
    pub to: Configuration,
    /// Contact configuration reached between `from` and `to`.
    pub via: Option<Configuration>,
    pub handle: Option<HandleId>,
}

impl SegmentRequest {
    pub fn free_motion(index: usize, from: Configuration, to: Configuration) -> Self {
        Self {
            index,
            from,
            to,
            via: None,
            handle: None,
        }
    }

    pub fn contact(
        index: usize,
        pregrasp: Configuration,
        contact: Configuration,
        handle: HandleId,
    ) -> Self {
        Self {
            index,
            from: pregrasp.clone(),
            to: pregrasp,
            via: Some(contact),
            handle: Some(handle),
        }
    }

    /// Short human-readable label for logs and errors.
    pub fn description(&self) -> String {
        match &self.handle {
            Some(handle) => format!("contact on {handle}"),
            None => "free motion".to_string(),
        }
    }
}

/// In-state planning of segment pieces and per-piece optimization.
///
/// Pieces are unregistered path objects referenced by [`PieceRef`]. Each
/// reference holds the object alive until [`release_piece`] is called on
/// it; two references may point to objects with equal content.
///
/// [`release_piece`]: SegmentPlanner::release_piece
pub trait SegmentPlanner {
    /// Plans the pieces of one segment, in order.
    fn plan_pieces(&mut self, request: &SegmentRequest) -> PlannerResult<Vec<PieceRef>>;

    fn set_segment_parameter(&mut self, name: &str, value: ParameterValue) -> PlannerResult<()>;

    /// Runs the named optimizer on a piece. The output may equal the input
    /// when no improvement was found.
    fn optimize_piece(&mut self, optimizer: &str, piece: PieceRef) -> PlannerResult<PieceRef>;

    /// Content equality of two pieces.
    fn pieces_equal(&mut self, a: PieceRef, b: PieceRef) -> PlannerResult<bool>;

    /// Builds one piece from several, in order.
    fn concatenate_pieces(&mut self, pieces: &[PieceRef]) -> PlannerResult<PieceRef>;

    fn release_piece(&mut self, piece: PieceRef) -> PlannerResult<()>;
}

/// Every planner capability at once.
pub trait Planner: ProblemSolver + ConfigurationSpace + Roadmap + SegmentPlanner {}

impl<T> Planner for T where T: ProblemSolver + ConfigurationSpace + Roadmap + SegmentPlanner {}
