//! Calibtour Planner - Drives an external motion planner through a tour
//!
//! This crate provides:
//! - An explicit planning session around the planner's shared state
//! - The segment path requester (plan, optimize, compare-and-skip)
//! - The trajectory concatenator (artifact pruning, merge-down)
//! - Free-motion tours and full calibration runs
//! - Random target generation and roadmap seeding
//!
//! Every component takes the session by `&mut`; nothing is global and the
//! planner is only reached through the capability traits of
//! `calibtour-core`, so tests run against an in-memory fake.

pub mod calibration;
pub mod concatenate;
pub mod generate;
pub mod oracle;
pub mod roadmap;
pub mod segment;
pub mod session;
pub mod tour_planner;

pub use calibration::{CalibrationPlanner, CalibrationReport};
pub use concatenate::TrajectoryConcatenator;
pub use generate::TargetGenerator;
pub use oracle::PlannerDistance;
pub use roadmap::{RoadmapBuilder, RoadmapSummary};
pub use segment::SegmentPathRequester;
pub use session::{PlanningSession, PlanningStatistics};
pub use tour_planner::{TourPlan, TourPlanner};
