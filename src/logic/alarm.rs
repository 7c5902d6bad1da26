use crate::datasources::{NotificationSink, UserStore, WeatherSource};
use crate::error::Result;
use crate::logic::alert_email::{format_alert, MessageContext};
use crate::logic::orchestrator::DecisionOrchestrator;
use crate::models::{Decision, UserPreference};
use chrono::{DateTime, FixedOffset};

/// Totals for one pass over the active users.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub users_checked: usize,
    pub alerts_sent: usize,
    pub failures: usize,
}

/// Runs the orchestrator over every active user and delivers alerts.
pub struct AlarmService<U, W, N> {
    store: U,
    engine: DecisionOrchestrator<W>,
    sink: N,
    message: MessageContext,
}

impl<U, W, N> AlarmService<U, W, N>
where
    U: UserStore,
    W: WeatherSource,
    N: NotificationSink,
{
    pub fn new(store: U, engine: DecisionOrchestrator<W>, sink: N, message: MessageContext) -> Self {
        Self {
            store,
            engine,
            sink,
            message,
        }
    }

    pub fn engine(&self) -> &DecisionOrchestrator<W> {
        &self.engine
    }

    #[cfg(test)]
    pub fn store(&self) -> &U {
        &self.store
    }

    #[cfg(test)]
    pub fn sink(&self) -> &N {
        &self.sink
    }

    pub async fn run_cycle(&mut self, now: DateTime<FixedOffset>) -> CycleReport {
        let ledger = self.engine.ledger_mut();
        if ledger.advance_to(now.date_naive()) {
            tracing::info!("New day - cleared alert history");
        } else {
            tracing::debug!("{} user(s) already alerted today", ledger.len());
        }

        let users = match self.store.list_active_users().await {
            Ok(users) => users,
            Err(e) => {
                tracing::error!("Error fetching users: {}", e);
                return CycleReport::default();
            }
        };

        if users.is_empty() {
            tracing::info!("No active users to check");
            return CycleReport::default();
        }
        tracing::info!("Fetched {} active user(s)", users.len());

        let mut report = CycleReport::default();
        for user in &users {
            report.users_checked += 1;
            match self.check_user(user, now).await {
                Ok(true) => report.alerts_sent += 1,
                Ok(false) => {}
                Err(e) => {
                    report.failures += 1;
                    tracing::error!("Check failed for {}: {}", user.email, e);
                }
            }
        }

        tracing::info!("Done. Sent {} alert(s).", report.alerts_sent);
        report
    }

    /// Decide for one user and deliver the alert when conditions are met.
    /// Returns whether an alert went out.
    pub async fn check_user(
        &mut self,
        user: &UserPreference,
        now: DateTime<FixedOffset>,
    ) -> Result<bool> {
        let decision = self.engine.decide(user, now).await?;
        match &decision {
            Decision::Skipped(reason) => {
                tracing::debug!("Skipping {}: {}", user.email, reason.as_str());
            }
            Decision::Sent { .. } => return Ok(self.deliver(user, &decision, now).await),
            other => tracing::info!("{}: {}", user.email, other),
        }
        Ok(false)
    }

    /// Send the alert for a `Sent` decision, then record it. Store update
    /// failures are logged only.
    pub async fn deliver(
        &mut self,
        user: &UserPreference,
        decision: &Decision,
        now: DateTime<FixedOffset>,
    ) -> bool {
        let Decision::Sent {
            window,
            wind,
            rationale,
        } = decision
        else {
            return false;
        };

        let message = format_alert(user, window, wind, rationale, now, &self.message);
        if !self.sink.send(&user.email, &message.subject, &message.body).await {
            tracing::warn!("Alert to {} was not accepted, will retry next cycle", user.email);
            return false;
        }
        tracing::info!("Email sent: {}", message.subject);

        self.engine.ledger_mut().mark(&user.id, now.date_naive());
        if let Err(e) = self.store.mark_alerted(&user.id, now).await {
            tracing::warn!("Could not update last_alert_at for {}: {}", user.id, e);
        }
        true
    }
}
