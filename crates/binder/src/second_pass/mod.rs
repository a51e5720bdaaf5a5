//! Deferred binding work resolved by fixed-point iteration.
//!
//! # Role
//!
//! A binding step that depends on a peer not yet bound (a foreign key needing
//! the target's primary key, a `mappedBy` collection needing the owning side)
//! is queued as a [`SecondPass`] instead of being resolved inline.
//! [`SecondPassQueue::process`] then scans the queue until it is empty or a
//! scan makes no progress.
//!
//! # Invariants
//!
//! - Every scan attempts every pending item once, in queue order.
//! - An item returning `Err` stays queued; the error is logged at that scan
//!   and kept as the item's last error.
//! - A non-empty queue after a scan with zero resolutions fails with
//!   [`ConvergenceFailure`]; there is no scan cap, so a scan either shrinks the
//!   queue or ends processing.

use std::fmt;

use thiserror::Error;

/// Outcome of one attempt at a deferred item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
	Resolved,
	/// A dependency is not available yet; retry on the next scan.
	Pending,
}

type Action<C, E> = Box<dyn FnMut(&mut C) -> Result<Resolution, E>>;

/// One retryable work item.
pub struct SecondPass<C, E> {
	label: String,
	action: Action<C, E>,
	attempts: usize,
	last_error: Option<String>,
}

impl<C, E> fmt::Debug for SecondPass<C, E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SecondPass")
			.field("label", &self.label)
			.field("attempts", &self.attempts)
			.field("last_error", &self.last_error)
			.finish_non_exhaustive()
	}
}

/// Per-scan counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanReport {
	pub attempted: usize,
	pub resolved: usize,
	pub failed: usize,
}

impl ScanReport {
	pub fn made_progress(self) -> bool {
		self.resolved > 0
	}
}

/// Summary of a converged run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvergenceReport {
	pub scans: Vec<ScanReport>,
}

impl ConvergenceReport {
	pub fn scan_count(&self) -> usize {
		self.scans.len()
	}

	pub fn resolved(&self) -> usize {
		self.scans.iter().map(|s| s.resolved).sum()
	}
}

/// An item left over when the queue stopped making progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StalledItem {
	pub label: String,
	pub attempts: usize,
	pub last_error: Option<String>,
}

#[derive(Debug, Clone, Error)]
#[error(
	"deferred binding did not converge after {} scan(s); {} item(s) still pending: {}",
	.report.scan_count(),
	.pending.len(),
	summarize(.pending)
)]
pub struct ConvergenceFailure {
	pub report: ConvergenceReport,
	pub pending: Vec<StalledItem>,
}

fn summarize(pending: &[StalledItem]) -> String {
	pending
		.iter()
		.map(|item| match &item.last_error {
			Some(error) => format!("{} ({error})", item.label),
			None => item.label.clone(),
		})
		.collect::<Vec<_>>()
		.join(", ")
}

pub struct SecondPassQueue<C, E> {
	items: Vec<SecondPass<C, E>>,
}

impl<C, E> Default for SecondPassQueue<C, E> {
	fn default() -> Self {
		Self { items: Vec::new() }
	}
}

impl<C, E> fmt::Debug for SecondPassQueue<C, E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(&self.items).finish()
	}
}

impl<C, E: fmt::Display> SecondPassQueue<C, E> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
		self.items.iter().map(|item| item.label.as_str())
	}

	pub fn push(&mut self, label: impl Into<String>, action: impl FnMut(&mut C) -> Result<Resolution, E> + 'static) {
		let label = label.into();
		tracing::trace!(domain = "second_pass", item = %label, "queued");
		self.items.push(SecondPass {
			label,
			action: Box::new(action),
			attempts: 0,
			last_error: None,
		});
	}

	/// Scans until the queue is empty or a scan resolves nothing.
	pub fn process(&mut self, context: &mut C) -> Result<ConvergenceReport, ConvergenceFailure> {
		let mut report = ConvergenceReport::default();
		while !self.items.is_empty() {
			let scan = self.scan(context, report.scans.len());
			report.scans.push(scan);
			if !scan.made_progress() && !self.items.is_empty() {
				let pending: Vec<StalledItem> = self
					.items
					.drain(..)
					.map(|item| StalledItem {
						label: item.label,
						attempts: item.attempts,
						last_error: item.last_error,
					})
					.collect();
				tracing::warn!(
					domain = "second_pass",
					scans = report.scan_count(),
					pending = pending.len(),
					"deferred binding stalled"
				);
				return Err(ConvergenceFailure { report, pending });
			}
		}
		tracing::debug!(
			domain = "second_pass",
			scans = report.scan_count(),
			resolved = report.resolved(),
			"deferred binding converged"
		);
		Ok(report)
	}

	fn scan(&mut self, context: &mut C, index: usize) -> ScanReport {
		let _span = tracing::trace_span!("second_pass.scan", scan = index).entered();
		let mut scan = ScanReport::default();
		for mut item in std::mem::take(&mut self.items) {
			scan.attempted += 1;
			item.attempts += 1;
			match (item.action)(context) {
				Ok(Resolution::Resolved) => {
					scan.resolved += 1;
					continue;
				}
				Ok(Resolution::Pending) => {}
				Err(error) => {
					scan.failed += 1;
					tracing::warn!(
						domain = "second_pass",
						item = %item.label,
						attempt = item.attempts,
						%error,
						"deferred item failed; will retry"
					);
					item.last_error = Some(error.to_string());
				}
			}
			self.items.push(item);
		}
		tracing::debug!(
			domain = "second_pass",
			scan = index,
			resolved = scan.resolved,
			remaining = self.items.len(),
			"scan finished"
		);
		scan
	}
}

#[cfg(test)]
mod tests;
