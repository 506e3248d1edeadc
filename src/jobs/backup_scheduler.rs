// ==================== BACKUP SCHEDULER ====================
// Periodic full backup of students/ and events/, followed by pruning down to
// the configured retention.

use crate::database::{backup, LocalDatabase};
use crate::utils::AppError;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Spawns the scheduler. `interval_hours == 0` leaves it disabled.
pub fn start_backup_scheduler(db: LocalDatabase, interval_hours: u64, retention: usize) {
    if interval_hours == 0 {
        log::info!("💾 Backup scheduler disabled (BACKUP_INTERVAL_HOURS=0)");
        return;
    }

    log::info!(
        "💾 Starting backup scheduler (every {}h, keeping {} backups)",
        interval_hours, retention
    );

    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(interval_hours * 3600));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick completes immediately; skip it so startup doesn't write a backup
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match run_scheduled_backup(&db, retention).await {
                Ok((name, pruned)) => {
                    log::info!("✅ Scheduled backup {} written, {} old backups pruned", name, pruned);
                }
                Err(e) => log::error!("❌ Scheduled backup failed: {}", e),
            }
        }
    });
}

/// One scheduler tick: back up, then prune. Returns the new backup's name and
/// how many old ones were removed.
pub async fn run_scheduled_backup(db: &LocalDatabase, retention: usize) -> Result<(String, usize), AppError> {
    let manifest = backup::create_backup(db).await?;
    let pruned = backup::prune_backups(db, retention).await?;
    Ok((manifest.name, pruned.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::students::tests::student;
    use crate::database::tests::temp_db;
    use crate::database::RecordStore;

    #[tokio::test]
    async fn tick_backs_up_and_enforces_retention() {
        let (_dir, db) = temp_db().await;
        db.students().save(&student("s1", "21CS001", "2021-2025")).await.unwrap();

        let mut total_pruned = 0;
        for _ in 0..3 {
            let (_, pruned) = run_scheduled_backup(&db, 2).await.unwrap();
            total_pruned += pruned;
            // backup names carry millisecond timestamps
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let backups = backup::list_backups(&db).await.unwrap();
        assert_eq!(backups.len(), 2);
        assert_eq!(total_pruned, 1);
        assert!(backups.iter().all(|b| b.students == 1));
    }
}
