use pretty_assertions::assert_eq;
use rstest::rstest;
use rustc_hash::FxHashSet;

use super::*;

/// Items complete by inserting their name; dependencies wait for that name.
#[derive(Default)]
struct Done {
	names: FxHashSet<&'static str>,
	order: Vec<&'static str>,
}

type Queue = SecondPassQueue<Done, String>;

fn item(queue: &mut Queue, name: &'static str, needs: &'static [&'static str]) {
	queue.push(name, move |done: &mut Done| {
		if needs.iter().all(|n| done.names.contains(n)) {
			done.names.insert(name);
			done.order.push(name);
			Ok(Resolution::Resolved)
		} else {
			Ok(Resolution::Pending)
		}
	});
}

#[rstest]
#[case(1)]
#[case(5)]
#[case(64)]
fn independent_items_converge_in_one_scan(#[case] n: usize) {
	let mut queue = Queue::new();
	let names: Vec<&'static str> = (0..n).map(|i| &*Box::leak(format!("item{i}").into_boxed_str())).collect();
	for name in &names {
		item(&mut queue, *name, &[]);
	}

	let mut done = Done::default();
	let report = queue.process(&mut done).unwrap();
	assert_eq!(report.scan_count(), 1);
	assert_eq!(report.resolved(), n);
	assert_eq!(done.order, names);
	assert!(queue.is_empty());
}

#[test]
fn dependency_queued_first_converges_in_two_scans() {
	let mut queue = Queue::new();
	item(&mut queue, "a", &["b"]);
	item(&mut queue, "b", &[]);

	let mut done = Done::default();
	let report = queue.process(&mut done).unwrap();
	assert_eq!(report.scan_count(), 2);
	assert_eq!(
		report.scans,
		vec![
			ScanReport {
				attempted: 2,
				resolved: 1,
				failed: 0
			},
			ScanReport {
				attempted: 1,
				resolved: 1,
				failed: 0
			},
		]
	);
	assert_eq!(done.order, vec!["b", "a"]);
}

#[test]
fn chain_resolves_one_link_per_scan() {
	let mut queue = Queue::new();
	item(&mut queue, "c", &["b"]);
	item(&mut queue, "b", &["a"]);
	item(&mut queue, "a", &[]);

	let report = queue.process(&mut Done::default()).unwrap();
	assert_eq!(report.scan_count(), 3);
}

#[test]
fn cycle_fails_after_one_scan() {
	let mut queue = Queue::new();
	item(&mut queue, "a", &["b"]);
	item(&mut queue, "b", &["a"]);

	let failure = queue.process(&mut Done::default()).unwrap_err();
	assert_eq!(failure.report.scan_count(), 1);
	let labels: Vec<&str> = failure.pending.iter().map(|p| p.label.as_str()).collect();
	assert_eq!(labels, vec!["a", "b"]);
	assert!(queue.is_empty(), "stalled items are handed to the failure");
}

#[test]
fn partial_progress_then_stall_reports_every_scan() {
	let mut queue = Queue::new();
	item(&mut queue, "free", &[]);
	item(&mut queue, "x", &["y"]);
	item(&mut queue, "y", &["x"]);

	let failure = queue.process(&mut Done::default()).unwrap_err();
	assert_eq!(failure.report.scan_count(), 2);
	assert_eq!(failure.report.resolved(), 1);
	assert_eq!(failure.pending.len(), 2);
	assert!(failure.pending.iter().all(|p| p.attempts == 2));
}

#[test]
fn errors_are_retried_and_kept_as_last_error() {
	let mut queue = Queue::new();
	let mut calls = 0;
	queue.push("flaky", move |_: &mut Done| {
		calls += 1;
		if calls == 1 {
			Err("not yet".to_owned())
		} else {
			Ok(Resolution::Resolved)
		}
	});
	item(&mut queue, "steady", &[]);

	let report = queue.process(&mut Done::default()).unwrap();
	assert_eq!(report.scan_count(), 2);
	assert_eq!(report.scans[0].failed, 1);
}

#[test]
fn persistent_error_surfaces_in_the_failure() {
	let mut queue = Queue::new();
	queue.push("broken", |_: &mut Done| Err("target has no primary key".to_owned()));

	let failure = queue.process(&mut Done::default()).unwrap_err();
	assert_eq!(failure.pending[0].last_error.as_deref(), Some("target has no primary key"));
	let message = failure.to_string();
	assert!(message.contains("broken (target has no primary key)"), "{message}");
}

#[test]
fn empty_queue_needs_no_scan() {
	let report = Queue::new().process(&mut Done::default()).unwrap();
	assert_eq!(report.scan_count(), 0);
}
