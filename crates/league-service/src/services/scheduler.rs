//! Round scheduler
//!
//! Applies deadline-driven transitions. The same logic runs from the
//! periodic sweep and lazily whenever a round is read, so a round whose
//! deadline passed never looks open just because the sweep has not run yet.

use league_core::entities::Round;
use league_core::lifecycle::{plan_sweep, SweepDecision};
use league_core::{DomainError, RoundStatus};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::stats::invalidate_projections;

/// A round can at most go submitting -> voting -> revealed in one settle
const MAX_STEPS: usize = 2;

/// What one sweep did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub examined: usize,
    pub advanced: usize,
    pub extended: usize,
    pub held: usize,
    pub failed: usize,
}

#[derive(Debug, Default)]
struct Settled {
    advanced: usize,
    extended: bool,
    held: bool,
}

/// Deadline scheduler
pub struct RoundScheduler<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RoundScheduler<'a> {
    /// Create a new RoundScheduler
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Advance every round whose deadline has passed, up to the configured batch
    #[instrument(skip(self))]
    pub async fn sweep(&self) -> ServiceResult<SweepReport> {
        let now = self.ctx.now();
        let due = self
            .ctx
            .round_repo()
            .find_due(now, self.ctx.settings().round_sweep_batch)
            .await?;

        let mut report = SweepReport {
            examined: due.len(),
            ..Default::default()
        };

        for round in due {
            let round_id = round.id;
            match self.settle_round(round).await {
                Ok((_, settled)) => {
                    report.advanced += settled.advanced;
                    report.extended += usize::from(settled.extended);
                    report.held += usize::from(settled.held);
                }
                Err(e) => {
                    warn!(round_id = %round_id, error = %e, "Failed to settle round");
                    report.failed += 1;
                }
            }
        }

        if report.advanced > 0 || report.extended > 0 || report.failed > 0 {
            info!(?report, "Round sweep finished");
        } else {
            debug!(?report, "Round sweep finished");
        }
        Ok(report)
    }

    /// Apply every transition due now and return the round as stored
    pub async fn settle(&self, round: Round) -> ServiceResult<Round> {
        Ok(self.settle_round(round).await?.0)
    }

    async fn settle_round(&self, mut round: Round) -> ServiceResult<(Round, Settled)> {
        let now = self.ctx.now();
        let mut settled = Settled::default();

        for _ in 0..MAX_STEPS {
            if round.due_transition(now).is_none() {
                break;
            }

            let (submission_count, policy) = if round.status == RoundStatus::Submitting {
                let count = self.ctx.submission_repo().count_by_round(round.id).await?;
                let league = self
                    .ctx
                    .league_repo()
                    .find_by_id(round.league_id)
                    .await?
                    .ok_or(DomainError::LeagueNotFound(round.league_id))?;
                (
                    usize::try_from(count).unwrap_or(0),
                    league.settings.empty_round_policy,
                )
            } else {
                (0, Default::default())
            };

            let decision = match plan_sweep(&round, submission_count, policy, now) {
                Ok(Some(decision)) => decision,
                Ok(None) => break,
                Err(e) => {
                    // the round stays open rather than failing every read of it
                    warn!(round_id = %round.id, error = %e, "Cannot extend empty round, holding it");
                    settled.held = true;
                    break;
                }
            };

            match decision {
                SweepDecision::Advance { from, to } => {
                    match self.ctx.round_repo().transition(round.id, from, to, now).await {
                        Ok(updated) => {
                            info!(round_id = %round.id, %from, %to, "Round advanced by deadline");
                            if to.is_revealed() {
                                invalidate_projections(self.ctx, round.league_id).await;
                            }
                            settled.advanced += 1;
                            round = updated;
                        }
                        Err(DomainError::ConcurrentModification(_)) => {
                            debug!(round_id = %round.id, "Round moved concurrently, reloading");
                            round = self.reload(&round).await?;
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                SweepDecision::Extend(schedule) => {
                    let mut extended = round.clone();
                    extended.schedule = schedule;
                    extended.updated_at = now;
                    match self
                        .ctx
                        .round_repo()
                        .update_details(&extended, RoundStatus::Submitting)
                        .await
                    {
                        Ok(()) => {
                            info!(
                                round_id = %round.id,
                                submission_end = ?schedule.submission_end,
                                "Empty round extended"
                            );
                            settled.extended = true;
                            round = extended;
                        }
                        Err(DomainError::ConcurrentModification(_)) => {
                            round = self.reload(&round).await?;
                        }
                        Err(e) => return Err(e.into()),
                    }
                    break;
                }
                SweepDecision::Hold => {
                    debug!(round_id = %round.id, "Empty round held in submitting");
                    settled.held = true;
                    break;
                }
            }
        }

        Ok((round, settled))
    }

    async fn reload(&self, round: &Round) -> ServiceResult<Round> {
        Ok(self
            .ctx
            .round_repo()
            .find_by_id(round.id)
            .await?
            .ok_or(DomainError::RoundNotFound(round.id))?)
    }
}
