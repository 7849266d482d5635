//! Roadmap seeding.

use calibtour_config::RoadmapConfig;
use calibtour_core::{ConfigurationSet, PathId, ProblemSolver, Result, Roadmap};
use calibtour_solver::DistanceMatrixBuilder;
use tracing::info;

use crate::oracle::PlannerDistance;
use crate::session::PlanningSession;

/// What [`RoadmapBuilder::build`] added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoadmapSummary {
    pub nodes: usize,
    pub edges: usize,
    /// Direct paths that failed validation.
    pub rejected: usize,
}

/// Seeds the planner roadmap with configurations and short direct edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoadmapBuilder {
    closest_count: usize,
}

impl RoadmapBuilder {
    pub fn new(closest_count: usize) -> Self {
        Self { closest_count }
    }

    pub fn from_config(config: &RoadmapConfig) -> Self {
        Self::new(config.closest_count)
    }

    /// Adds every configuration as a node, links each `i` to its
    /// `closest_count` nearest `j > i` at non-zero distance with a validated
    /// direct path, then erases every stored path.
    pub fn build<P>(
        &self,
        session: &mut PlanningSession<'_, P>,
        set: &ConfigurationSet,
    ) -> Result<RoadmapSummary>
    where
        P: ProblemSolver + Roadmap + ?Sized,
    {
        if set.is_empty() {
            return Ok(RoadmapSummary::default());
        }
        let matrix = DistanceMatrixBuilder::new(PlannerDistance::new(session.planner_mut()))
            .build(set)?;

        let planner = session.planner_mut();
        let configurations = set.configurations();
        for q in configurations {
            planner.add_config_to_roadmap(q)?;
        }

        let mut summary = RoadmapSummary {
            nodes: configurations.len(),
            ..RoadmapSummary::default()
        };
        for (i, qi) in configurations.iter().enumerate() {
            for j in matrix.closest(i, self.closest_count) {
                if j <= i || matrix.get(i, j) == 0.0 {
                    continue;
                }
                let qj = &configurations[j];
                let direct = planner.direct_path(qi, qj, true)?;
                if direct.valid {
                    planner.add_edge_to_roadmap(qi, qj, direct.path, true)?;
                    summary.edges += 1;
                } else {
                    summary.rejected += 1;
                }
            }
        }

        for i in (0..planner.number_paths()?).rev() {
            planner.erase_path(PathId(i))?;
        }

        info!(
            event = "roadmap_built",
            nodes = summary.nodes,
            edges = summary.edges,
            rejected = summary.rejected,
        );
        Ok(summary)
    }
}
