// std
use std::{sync::Arc, time::Duration as StdDuration};
// crates.io
use parking_lot::Mutex;
use tokio::time::Instant;
// self
use api_access_core::{
	clock::{Clock, TokioClock},
	rate_limit::RateGovernor,
};

#[tokio::test(start_paused = true)]
async fn concurrent_waiters_are_admitted_one_window_at_a_time() {
	let clock: Arc<dyn Clock> = Arc::new(TokioClock);
	let governor = Arc::new(
		RateGovernor::new(3, StdDuration::from_secs(10), clock)
			.expect("Non-zero budget should be accepted."),
	);
	let start = Instant::now();
	let admitted = Arc::new(Mutex::new(Vec::new()));
	let tasks: Vec<_> = (0..7)
		.map(|_| {
			let governor = governor.clone();
			let admitted = admitted.clone();

			tokio::spawn(async move {
				governor.acquire().await;
				admitted.lock().push(start.elapsed().as_secs());
			})
		})
		.collect();

	for task in tasks {
		task.await.expect("Waiter should not panic.");
	}

	let mut offsets = admitted.lock().clone();

	offsets.sort_unstable();

	assert_eq!(offsets, vec![0, 0, 0, 10, 10, 10, 20]);
}

#[tokio::test(start_paused = true)]
async fn window_slides_from_oldest_admission() {
	let clock: Arc<dyn Clock> = Arc::new(TokioClock);
	let governor = RateGovernor::new(2, StdDuration::from_secs(60), clock)
		.expect("Non-zero budget should be accepted.");
	let start = Instant::now();

	governor.acquire().await;
	tokio::time::advance(StdDuration::from_secs(45)).await;
	governor.acquire().await;
	governor.acquire().await;

	assert_eq!(start.elapsed().as_secs(), 60);
	assert_eq!(governor.admitted_in_window().await, 2);
}
