use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    DashboardStats, ResultEngine,
    util::{month_bounds, previous_month_bounds},
};

use super::Engine;

impl Engine {
    /// Rollup of the calendar month containing `today` and the month before,
    /// measured against the active plan.
    ///
    /// `None` means the user has no configuration yet and must run setup.
    pub async fn dashboard_stats(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> ResultEngine<Option<DashboardStats>> {
        let Some(config) = self.user_config(user_id).await? else {
            return Ok(None);
        };

        let (first, last) = month_bounds(today);
        let current = self
            .transactions_between(&self.database, user_id, first, last)
            .await?;
        let (first, last) = previous_month_bounds(today);
        let previous = self
            .transactions_between(&self.database, user_id, first, last)
            .await?;

        Ok(Some(DashboardStats::compute(
            &config.active_plan,
            config.currency,
            &current,
            &previous,
        )))
    }
}
