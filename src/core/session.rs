use crate::core::seat_assignment::SeatAssignmentEngine;
use crate::core::transfer::TransferEngine;
use crate::core::{ConfigProvider, Exporter, Notifier, RosterStore};
use crate::domain::model::{AssignmentResult, Roster};
use crate::utils::error::Result;

/// Outcome of the pure part of a session: queued transfers plus seating.
#[derive(Debug, Clone)]
pub struct SessionPlan {
    pub roster: Roster,
    pub result: AssignmentResult,
    pub transfers_applied: usize,
}

#[derive(Debug, Clone)]
pub struct SessionReport {
    pub roster: Roster,
    pub result: AssignmentResult,
    pub outputs: Vec<String>,
    pub notified: usize,
}

/// One allocation run for a competition.
///
/// All computation finishes before the roster is saved, the result exported
/// or any team notified.
pub struct SeatingSession<R: RosterStore, E: Exporter, N: Notifier, C: ConfigProvider> {
    store: R,
    exporter: E,
    notifier: N,
    config: C,
}

impl<R: RosterStore, E: Exporter, N: Notifier, C: ConfigProvider> SeatingSession<R, E, N, C> {
    pub fn new(store: R, exporter: E, notifier: N, config: C) -> Self {
        Self {
            store,
            exporter,
            notifier,
            config,
        }
    }

    pub async fn plan(&self) -> Result<SessionPlan> {
        let roster = self.store.load().await?;
        tracing::info!("📋 Loaded roster with {} teams", roster.len());

        let transfers = self.config.transfers();
        let roster = if transfers.is_empty() {
            roster
        } else {
            tracing::info!("🔁 Applying {} transfers", transfers.len());
            TransferEngine::new(self.config.rules().clone())?.apply_all(transfers, &roster)?
        };

        let pool = self.config.seat_pool()?;
        tracing::info!(
            "💺 Seating {} teams in {:?} mode ({} seats)",
            roster.len(),
            pool.mode(),
            pool.total_seats()
        );
        let result = SeatAssignmentEngine::new(self.config.rules())?.assign_seats(&roster, &pool);

        Ok(SessionPlan {
            roster,
            result,
            transfers_applied: transfers.len(),
        })
    }

    pub async fn run(&self) -> Result<SessionReport> {
        let plan = self.plan().await?;

        if plan.transfers_applied > 0 {
            self.store.save(&plan.roster).await?;
            tracing::info!("💾 Roster saved");
        }

        let outputs = self
            .exporter
            .export(self.config.competition_name(), &plan.result)
            .await?;
        for output in &outputs {
            tracing::info!("📁 Wrote {}", output);
        }

        let mut notified = 0;
        for team in plan.roster.teams() {
            self.notifier
                .notify(team, plan.result.assignment_for(team.id()))
                .await?;
            notified += 1;
        }

        if plan.result.insufficient_seats {
            tracing::warn!(
                "⚠️ Not enough seats: {} required, {} available, {} unseated",
                plan.result.required_seats,
                plan.result.available_capacity,
                plan.result.unseated.len()
            );
        }

        Ok(SessionReport {
            roster: plan.roster,
            result: plan.result,
            outputs,
            notified,
        })
    }
}
