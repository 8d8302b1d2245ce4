use std::{sync::Arc, time::Duration};

use jb_service::{JobBoardService, digest};

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
	Once,
	Every(Duration),
}
impl Schedule {
	pub fn new(once: bool, interval_secs: u64) -> Self {
		if once {
			return Self::Once;
		}

		Self::Every(Duration::from_secs(interval_secs.max(1)))
	}
}

/// Runs digest rounds on `schedule`.
///
/// In one-shot mode a failed round is returned. On an interval it is logged and the next round
/// runs as planned.
pub async fn run_worker(service: Arc<JobBoardService>, schedule: Schedule) -> Result<()> {
	loop {
		match digest::run_digest(service.clone()).await {
			Ok(summary) if summary.failed > 0 => {
				tracing::warn!(
					failed = summary.failed,
					sent = summary.sent,
					"Digest round had failures."
				);
			},
			Ok(_) => {},
			Err(err) if schedule == Schedule::Once => return Err(err.into()),
			Err(err) => {
				tracing::error!(error = %err, "Digest round failed.");
			},
		}

		let Schedule::Every(interval) = schedule else {
			return Ok(());
		};

		tracing::debug!(interval_secs = interval.as_secs(), "Waiting for the next digest round.");
		tokio::time::sleep(interval).await;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn once_flag_wins_over_interval() {
		assert_eq!(Schedule::new(true, 60), Schedule::Once);
		assert_eq!(Schedule::new(false, 60), Schedule::Every(Duration::from_secs(60)));
	}

	#[test]
	fn zero_interval_is_clamped() {
		assert_eq!(Schedule::new(false, 0), Schedule::Every(Duration::from_secs(1)));
	}
}
