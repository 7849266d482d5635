//! Segment path requests.
//!
//! Free-motion segments go through the planner's current problem and
//! `solve()`. Contact segments are planned piece by piece and each piece
//! past the pre-parameterized ones runs through the optimizer pipeline.

use calibtour_config::{CalibrationConfig, TimeParameterizationConfig};
use calibtour_core::{
    CalibrationError, PathRegistry, PathSegment, PieceRef, PlannerError, ProblemSolver, Result,
    SegmentKind, SegmentPlanner, SegmentRequest,
};
use tracing::{debug, info};

use crate::concatenate::TrajectoryConcatenator;
use crate::session::PlanningSession;

/// Requests one segment at a time from the planner.
///
/// Optimizer outputs are compared with their input: an output equal in
/// content is released and the input kept, so identical content is never
/// held twice.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentPathRequester {
    optimizers: Vec<String>,
    pre_parameterized_pieces: usize,
    initial: TimeParameterizationConfig,
    refine: TimeParameterizationConfig,
    concatenator: TrajectoryConcatenator,
}

impl SegmentPathRequester {
    pub fn from_config(config: &CalibrationConfig) -> Self {
        Self {
            optimizers: config.segment.optimizers.clone(),
            pre_parameterized_pieces: config.segment.pre_parameterized_pieces,
            initial: config.segment.initial,
            refine: config.segment.refine,
            concatenator: TrajectoryConcatenator::new(config.artifacts_per_solve),
        }
    }

    pub fn concatenator(&self) -> &TrajectoryConcatenator {
        &self.concatenator
    }

    /// Plans `request.from -> request.to` with `solve()` and prunes the
    /// artifacts it stored.
    ///
    /// # Errors
    ///
    /// `NoPathFound` if the solve fails; `Planner` for any other call.
    pub fn plan_free_motion<P>(
        &self,
        session: &mut PlanningSession<'_, P>,
        request: &SegmentRequest,
    ) -> Result<PathSegment>
    where
        P: ProblemSolver + ?Sized,
    {
        let before = session.planner_mut().number_paths()?;
        {
            let planner = session.planner_mut();
            planner.reset_goal_configs()?;
            planner.set_initial_config(&request.from)?;
            planner.add_goal_config(&request.to)?;
        }
        session.statistics_mut().solves += 1;
        session
            .planner_mut()
            .solve()
            .map_err(|e| no_path(request, e))?;
        let after = session.planner_mut().number_paths()?;
        let produced = after.saturating_sub(before);

        let discarded = self.concatenator.discard_artifacts(session, produced)?;
        session.statistics_mut().segments += 1;

        info!(
            event = "segment_planned",
            segment = request.index,
            kind = "free_motion",
            pieces = produced,
            discarded = discarded,
        );
        Ok(PathSegment {
            index: request.index,
            kind: SegmentKind::FreeMotion,
            pieces: produced,
            registered: produced - discarded,
            discarded,
            skipped_optimizations: 0,
        })
    }

    /// Plans a contact segment: pre-grasp, contact on the handle, back.
    ///
    /// The leading `pre_parameterized_pieces` are stored as delivered, each
    /// as its own registry entry; the rest are optimized with the refine
    /// profile, concatenated and stored as one entry.
    ///
    /// # Errors
    ///
    /// `NoPathFound` if planning yields no pieces; `Planner` for any other
    /// call.
    pub fn plan_contact<P>(
        &self,
        session: &mut PlanningSession<'_, P>,
        request: &SegmentRequest,
    ) -> Result<PathSegment>
    where
        P: SegmentPlanner + PathRegistry + ?Sized,
    {
        let Some(handle) = request.handle.clone() else {
            return Err(CalibrationError::InvalidInput(format!(
                "segment {} has no handle to contact",
                request.index
            )));
        };

        session.apply_segment_profile(&self.initial)?;
        let mut pieces = session
            .planner_mut()
            .plan_pieces(request)
            .map_err(|e| no_path(request, e))?;
        if pieces.is_empty() {
            return Err(no_path(
                request,
                PlannerError::new("planPieces", "planner returned no pieces"),
            ));
        }
        session.statistics_mut().pieces_planned += pieces.len() as u64;

        // Pieces are released whether or not registration succeeded.
        let outcome = self.register_pieces(session, request.index, &mut pieces);
        let released = release_all(session, &pieces);
        let (registered, skipped) = outcome?;
        released?;
        session.statistics_mut().segments += 1;

        info!(
            event = "segment_planned",
            segment = request.index,
            kind = "contact",
            handle = %handle,
            pieces = pieces.len(),
            skipped_optimizations = skipped,
        );
        Ok(PathSegment {
            index: request.index,
            kind: SegmentKind::Contact { handle },
            pieces: pieces.len(),
            registered,
            discarded: 0,
            skipped_optimizations: skipped,
        })
    }

    /// Optimizes the pieces past the pre-parameterized ones and stores the
    /// segment in the registry. Returns `(registered, skipped)`.
    ///
    /// `pieces` always holds the live references, so the caller can release
    /// them after a failure.
    fn register_pieces<P>(
        &self,
        session: &mut PlanningSession<'_, P>,
        segment: usize,
        pieces: &mut [PieceRef],
    ) -> Result<(usize, usize)>
    where
        P: SegmentPlanner + PathRegistry + ?Sized,
    {
        let fixed = self.pre_parameterized_pieces.min(pieces.len());
        let mut skipped = 0;
        if fixed < pieces.len() {
            session.apply_segment_profile(&self.refine)?;
            for piece in &mut pieces[fixed..] {
                skipped += self.optimize(session, segment, piece)?;
            }
        }

        let mut registered = 0;
        for &piece in &pieces[..fixed] {
            session.planner_mut().add_path(piece)?;
            registered += 1;
        }
        if fixed < pieces.len() {
            let planner = session.planner_mut();
            let tail = planner.concatenate_pieces(&pieces[fixed..])?;
            let added = planner.add_path(tail);
            let released = planner.release_piece(tail);
            added?;
            released?;
            registered += 1;
        }
        Ok((registered, skipped))
    }

    /// Runs every optimizer on `piece` in order, compare-and-skip.
    /// Returns the number of outputs skipped.
    fn optimize<P>(
        &self,
        session: &mut PlanningSession<'_, P>,
        segment: usize,
        piece: &mut PieceRef,
    ) -> Result<usize>
    where
        P: SegmentPlanner + ?Sized,
    {
        let mut skipped = 0;
        for optimizer in &self.optimizers {
            let planner = session.planner_mut();
            let output = planner.optimize_piece(optimizer, *piece)?;
            let equal = match planner.pieces_equal(*piece, output) {
                Ok(equal) => equal,
                Err(e) => {
                    let _ = planner.release_piece(output);
                    return Err(e.into());
                }
            };
            if equal {
                planner.release_piece(output)?;
                session.statistics_mut().optimizations_skipped += 1;
                skipped += 1;
                debug!(event = "optimization_skipped", segment = segment, optimizer = %optimizer);
            } else {
                planner.release_piece(*piece)?;
                *piece = output;
                session.statistics_mut().optimizations_adopted += 1;
                debug!(event = "optimization_adopted", segment = segment, optimizer = %optimizer);
            }
        }
        Ok(skipped)
    }
}

/// Releases every piece, reporting the first failure after trying them all.
fn release_all<P>(session: &mut PlanningSession<'_, P>, pieces: &[PieceRef]) -> Result<()>
where
    P: SegmentPlanner + ?Sized,
{
    let mut first_error = None;
    for &piece in pieces {
        if let Err(e) = session.planner_mut().release_piece(piece) {
            first_error.get_or_insert(e);
        }
    }
    match first_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn no_path(request: &SegmentRequest, error: PlannerError) -> CalibrationError {
    CalibrationError::NoPathFound {
        segment: request.index,
        description: request.description(),
        reason: error.to_string(),
    }
}
