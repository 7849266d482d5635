//! In-memory planner.
//!
//! [`FakePlanner`] implements every planner capability over plain vectors:
//! paths are lists of [`Leg`]s, the registry is a `Vec`, pieces live in a
//! map until released. Every call is logged by its planner operation name
//! and any call can be made to fail on its n-th invocation.
//!
//! # Example
//!
//! ```
//! use calibtour_core::{Configuration, PathRegistry, ProblemSolver};
//! use calibtour_test::FakePlanner;
//!
//! let mut planner = FakePlanner::new().with_optimizers(&["A", "B"]);
//! planner.set_initial_config(&Configuration::new(vec![0.0])).unwrap();
//! planner.add_goal_config(&Configuration::new(vec![1.0])).unwrap();
//! planner.solve().unwrap();
//!
//! // raw path plus one per optimizer
//! assert_eq!(planner.number_paths().unwrap(), 3);
//! ```

use std::collections::HashMap;

use calibtour_core::{
    Configuration, ConfigurationSpace, DirectPath, DistanceMatrix, ParameterValue, PathId,
    PathRegistry, PieceRef, PlannerError, PlannerResult, ProblemSolver, Projection, Roadmap,
    SegmentPlanner, SegmentRequest, Validity,
};

/// One straight motion, with the optimizers that processed it.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub from: Configuration,
    pub to: Configuration,
    pub optimized_by: Vec<String>,
}

impl Leg {
    pub fn new(from: Configuration, to: Configuration) -> Self {
        Self {
            from,
            to,
            optimized_by: Vec::new(),
        }
    }
}

/// Path content. Equality is content equality.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FakePath {
    pub legs: Vec<Leg>,
}

impl FakePath {
    fn single(from: &Configuration, to: &Configuration) -> Self {
        Self {
            legs: vec![Leg::new(from.clone(), to.clone())],
        }
    }

    fn optimized(&self, optimizer: &str) -> Self {
        let mut out = self.clone();
        for leg in &mut out.legs {
            leg.optimized_by.push(optimizer.to_string());
        }
        out
    }

    /// True if each leg starts where the previous one ended.
    pub fn is_continuous(&self) -> bool {
        self.legs.windows(2).all(|w| w[0].to == w[1].from)
    }

    pub fn start(&self) -> Option<&Configuration> {
        self.legs.first().map(|l| &l.from)
    }

    pub fn end(&self) -> Option<&Configuration> {
        self.legs.last().map(|l| &l.to)
    }
}

/// In-memory planner with scripted behavior.
#[derive(Debug, Default)]
pub struct FakePlanner {
    registry: Vec<FakePath>,
    pieces: HashMap<u64, FakePath>,
    next_piece: u64,

    initial: Option<Configuration>,
    goals: Vec<Configuration>,
    optimizers: Vec<String>,
    parameters: Vec<(String, ParameterValue)>,
    segment_parameters: Vec<(String, ParameterValue)>,
    max_iter_path_planning: Option<usize>,

    roadmap_nodes: Vec<Configuration>,
    roadmap_edges: Vec<(Configuration, Configuration, PathId)>,

    distance_table: Option<DistanceMatrix>,
    unchanged_optimizers: Vec<String>,
    unreachable: Vec<Configuration>,
    invalid: Vec<Configuration>,
    unprojectable: Vec<Configuration>,
    failing_transitions: Vec<String>,
    blocked_edges: Vec<(Configuration, Configuration)>,
    random_configs: Vec<Configuration>,
    random_cursor: usize,

    failures: HashMap<&'static str, usize>,
    call_counts: HashMap<&'static str, usize>,
    calls: Vec<&'static str>,
}

impl FakePlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-selects path optimizers, as a planner configured elsewhere would.
    pub fn with_optimizers(mut self, names: &[&str]) -> Self {
        self.optimizers = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Answers `distance` from a table indexed by first coordinate instead
    /// of the Euclidean norm.
    pub fn with_distance_table(mut self, matrix: DistanceMatrix) -> Self {
        self.distance_table = Some(matrix);
        self
    }

    /// The named optimizer returns a piece equal to its input.
    pub fn with_unchanged_optimizer(mut self, name: &str) -> Self {
        self.unchanged_optimizers.push(name.to_string());
        self
    }

    /// Planning towards or through `q` fails.
    pub fn with_unreachable(mut self, q: Configuration) -> Self {
        self.unreachable.push(q);
        self
    }

    pub fn with_invalid(mut self, q: Configuration) -> Self {
        self.invalid.push(q);
        self
    }

    /// Projection of `q` fails on every transition.
    pub fn with_unprojectable(mut self, q: Configuration) -> Self {
        self.unprojectable.push(q);
        self
    }

    /// Every projection on `transition` fails.
    pub fn with_failing_transition(mut self, transition: &str) -> Self {
        self.failing_transitions.push(transition.to_string());
        self
    }

    /// Direct paths between `a` and `b` fail validation.
    pub fn with_blocked_edge(mut self, a: Configuration, b: Configuration) -> Self {
        self.blocked_edges.push((a, b));
        self
    }

    /// Configurations returned by `shoot_random_config`, cycled.
    pub fn with_random_configs(mut self, configs: Vec<Configuration>) -> Self {
        self.random_configs = configs;
        self
    }

    /// Makes the `nth` call (1-based) to `operation` fail.
    pub fn failing_on(mut self, operation: &'static str, nth: usize) -> Self {
        self.failures.insert(operation, nth);
        self
    }

    pub fn registry(&self) -> &[FakePath] {
        &self.registry
    }

    /// Pieces not yet released.
    pub fn live_pieces(&self) -> usize {
        self.pieces.len()
    }

    pub fn calls(&self) -> &[&'static str] {
        &self.calls
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.call_counts.get(operation).copied().unwrap_or(0)
    }

    pub fn optimizers(&self) -> &[String] {
        &self.optimizers
    }

    pub fn parameters(&self) -> &[(String, ParameterValue)] {
        &self.parameters
    }

    pub fn segment_parameters(&self) -> &[(String, ParameterValue)] {
        &self.segment_parameters
    }

    pub fn max_iter_path_planning(&self) -> Option<usize> {
        self.max_iter_path_planning
    }

    pub fn roadmap_nodes(&self) -> &[Configuration] {
        &self.roadmap_nodes
    }

    pub fn roadmap_edges(&self) -> &[(Configuration, Configuration, PathId)] {
        &self.roadmap_edges
    }

    fn enter(&mut self, operation: &'static str) -> PlannerResult<()> {
        let count = self.call_counts.entry(operation).or_insert(0);
        *count += 1;
        let count = *count;
        self.calls.push(operation);
        if self.failures.get(operation) == Some(&count) {
            return Err(PlannerError::new(operation, "injected failure"));
        }
        Ok(())
    }

    fn stored(&self, operation: &'static str, id: PathId) -> PlannerResult<&FakePath> {
        self.registry
            .get(id.0)
            .ok_or_else(|| PlannerError::new(operation, format!("no stored {id}")))
    }

    fn piece(&self, operation: &'static str, piece: PieceRef) -> PlannerResult<&FakePath> {
        self.pieces
            .get(&piece.0)
            .ok_or_else(|| PlannerError::new(operation, format!("dangling piece {}", piece.0)))
    }

    fn new_piece(&mut self, path: FakePath) -> PieceRef {
        let id = self.next_piece;
        self.next_piece += 1;
        self.pieces.insert(id, path);
        PieceRef(id)
    }

    fn reachable(&self, q: &Configuration) -> bool {
        !self.unreachable.contains(q)
    }
}

impl PathRegistry for FakePlanner {
    fn number_paths(&mut self) -> PlannerResult<usize> {
        self.enter("numberPaths")?;
        Ok(self.registry.len())
    }

    fn erase_path(&mut self, id: PathId) -> PlannerResult<()> {
        self.enter("erasePath")?;
        self.stored("erasePath", id)?;
        self.registry.remove(id.0);
        Ok(())
    }

    fn concatenate_path(&mut self, start: PathId, end: PathId) -> PlannerResult<()> {
        self.enter("concatenatePath")?;
        let tail = self.stored("concatenatePath", end)?.legs.clone();
        self.stored("concatenatePath", start)?;
        self.registry[start.0].legs.extend(tail);
        Ok(())
    }

    fn add_path(&mut self, piece: PieceRef) -> PlannerResult<PathId> {
        self.enter("addPath")?;
        let path = self.piece("addPath", piece)?.clone();
        self.registry.push(path);
        Ok(PathId(self.registry.len() - 1))
    }
}

impl ProblemSolver for FakePlanner {
    fn set_initial_config(&mut self, q: &Configuration) -> PlannerResult<()> {
        self.enter("setInitialConfig")?;
        self.initial = Some(q.clone());
        Ok(())
    }

    fn reset_goal_configs(&mut self) -> PlannerResult<()> {
        self.enter("resetGoalConfigs")?;
        self.goals.clear();
        Ok(())
    }

    fn add_goal_config(&mut self, q: &Configuration) -> PlannerResult<()> {
        self.enter("addGoalConfig")?;
        self.goals.push(q.clone());
        Ok(())
    }

    fn solve(&mut self) -> PlannerResult<()> {
        self.enter("solve")?;
        let (Some(initial), Some(goal)) = (self.initial.clone(), self.goals.first().cloned())
        else {
            return Err(PlannerError::new("solve", "problem is not fully defined"));
        };
        if !self.reachable(&goal) || !self.reachable(&initial) {
            return Err(PlannerError::new("solve", "no path found"));
        }
        let mut path = FakePath::single(&initial, &goal);
        self.registry.push(path.clone());
        for optimizer in &self.optimizers {
            path = path.optimized(optimizer);
            self.registry.push(path.clone());
        }
        Ok(())
    }

    fn clear_path_optimizers(&mut self) -> PlannerResult<()> {
        self.enter("clearPathOptimizers")?;
        self.optimizers.clear();
        Ok(())
    }

    fn add_path_optimizer(&mut self, name: &str) -> PlannerResult<()> {
        self.enter("addPathOptimizer")?;
        self.optimizers.push(name.to_string());
        Ok(())
    }

    fn set_parameter(&mut self, name: &str, value: ParameterValue) -> PlannerResult<()> {
        self.enter("setParameter")?;
        self.parameters.push((name.to_string(), value));
        Ok(())
    }

    fn set_max_iter_path_planning(&mut self, iterations: usize) -> PlannerResult<()> {
        self.enter("setMaxIterPathPlanning")?;
        self.max_iter_path_planning = Some(iterations);
        Ok(())
    }

    fn distance(&mut self, a: &Configuration, b: &Configuration) -> PlannerResult<f64> {
        self.enter("getDistance")?;
        if a.dim() != b.dim() {
            return Err(PlannerError::new(
                "getDistance",
                format!("sizes {} and {} differ", a.dim(), b.dim()),
            ));
        }
        if let Some(table) = &self.distance_table {
            let index = |q: &Configuration| {
                let i = q.as_slice().first().copied().unwrap_or(-1.0);
                (i >= 0.0 && (i as usize) < table.size()).then_some(i as usize)
            };
            return match (index(a), index(b)) {
                (Some(i), Some(j)) => Ok(table.get(i, j)),
                _ => Err(PlannerError::new("getDistance", "configuration not in table")),
            };
        }
        let sum: f64 = a
            .as_slice()
            .iter()
            .zip(b.as_slice())
            .map(|(x, y)| (x - y) * (x - y))
            .sum();
        Ok(sum.sqrt())
    }
}

impl ConfigurationSpace for FakePlanner {
    fn shoot_random_config(&mut self) -> PlannerResult<Configuration> {
        self.enter("shootRandomConfig")?;
        if self.random_configs.is_empty() {
            return Err(PlannerError::new("shootRandomConfig", "nothing scripted"));
        }
        let q = self.random_configs[self.random_cursor % self.random_configs.len()].clone();
        self.random_cursor += 1;
        Ok(q)
    }

    fn generate_target_config(
        &mut self,
        transition: &str,
        _seed: &Configuration,
        target: &Configuration,
    ) -> PlannerResult<Projection> {
        self.enter("generateTargetConfig")?;
        if self.failing_transitions.iter().any(|t| t == transition)
            || self.unprojectable.contains(target)
        {
            return Ok(Projection::Failed(format!(
                "projection on '{transition}' did not converge"
            )));
        }
        Ok(Projection::Projected(target.clone()))
    }

    fn is_config_valid(&mut self, q: &Configuration) -> PlannerResult<Validity> {
        self.enter("isConfigValid")?;
        if self.invalid.contains(q) {
            Ok(Validity::Invalid("collision".to_string()))
        } else {
            Ok(Validity::Valid)
        }
    }
}

impl Roadmap for FakePlanner {
    fn add_config_to_roadmap(&mut self, q: &Configuration) -> PlannerResult<()> {
        self.enter("addConfigToRoadmap")?;
        if !self.roadmap_nodes.contains(q) {
            self.roadmap_nodes.push(q.clone());
        }
        Ok(())
    }

    fn direct_path(
        &mut self,
        a: &Configuration,
        b: &Configuration,
        validate: bool,
    ) -> PlannerResult<DirectPath> {
        self.enter("directPath")?;
        let blocked = self
            .blocked_edges
            .iter()
            .any(|(x, y)| (x == a && y == b) || (x == b && y == a));
        self.registry.push(FakePath::single(a, b));
        let valid = !(validate && blocked);
        Ok(DirectPath {
            path: PathId(self.registry.len() - 1),
            valid,
            message: if valid {
                String::new()
            } else {
                "collision along path".to_string()
            },
        })
    }

    fn add_edge_to_roadmap(
        &mut self,
        a: &Configuration,
        b: &Configuration,
        path: PathId,
        _both_ways: bool,
    ) -> PlannerResult<()> {
        self.enter("addEdgeToRoadmap")?;
        self.stored("addEdgeToRoadmap", path)?;
        self.roadmap_edges.push((a.clone(), b.clone(), path));
        Ok(())
    }
}

impl SegmentPlanner for FakePlanner {
    fn plan_pieces(&mut self, request: &SegmentRequest) -> PlannerResult<Vec<PieceRef>> {
        self.enter("planPieces")?;
        let mut waypoints = vec![request.from.clone()];
        waypoints.extend(request.via.iter().cloned());
        waypoints.push(request.to.clone());
        if !waypoints.iter().all(|q| self.reachable(q)) {
            return Err(PlannerError::new("planPieces", "no path found"));
        }
        let paths: Vec<FakePath> = waypoints
            .windows(2)
            .map(|w| FakePath::single(&w[0], &w[1]))
            .collect();
        Ok(paths.into_iter().map(|p| self.new_piece(p)).collect())
    }

    fn set_segment_parameter(&mut self, name: &str, value: ParameterValue) -> PlannerResult<()> {
        self.enter("setSegmentParameter")?;
        self.segment_parameters.push((name.to_string(), value));
        Ok(())
    }

    fn optimize_piece(&mut self, optimizer: &str, piece: PieceRef) -> PlannerResult<PieceRef> {
        self.enter("optimize")?;
        let input = self.piece("optimize", piece)?;
        let output = if self.unchanged_optimizers.iter().any(|o| o == optimizer) {
            input.clone()
        } else {
            input.optimized(optimizer)
        };
        Ok(self.new_piece(output))
    }

    fn pieces_equal(&mut self, a: PieceRef, b: PieceRef) -> PlannerResult<bool> {
        self.enter("equals")?;
        Ok(self.piece("equals", a)? == self.piece("equals", b)?)
    }

    fn concatenate_pieces(&mut self, pieces: &[PieceRef]) -> PlannerResult<PieceRef> {
        self.enter("concatenatePieces")?;
        let mut out = FakePath::default();
        for &piece in pieces {
            out.legs
                .extend(self.piece("concatenatePieces", piece)?.legs.iter().cloned());
        }
        Ok(self.new_piece(out))
    }

    fn release_piece(&mut self, piece: PieceRef) -> PlannerResult<()> {
        self.enter("releasePiece")?;
        self.pieces
            .remove(&piece.0)
            .map(|_| ())
            .ok_or_else(|| PlannerError::new("releasePiece", format!("dangling piece {}", piece.0)))
    }
}
