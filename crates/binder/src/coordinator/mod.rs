//! Drives binding of a categorized domain model.
//!
//! # Mental Model
//!
//! 1. Global registrations become lookup tables; duplicates fail here.
//! 2. Each hierarchy is walked supertype before subtype, binding what can be
//!    bound inline and queueing the rest.
//! 3. The queue is processed to a fixed point (see [`crate::second_pass`]).
//! 4. Every type binder runs its closing pass.
//! 5. The finished [`BoundModel`] goes to a [`SchemaSink`], if one is given.

use std::error::Error;

use strata_categorize::{CategorizedDomainModel, Categorizer};
use strata_models::ClassDetailsLookup;

use crate::binders::{self, BindingState, HierarchyContext, MappedSuperclassBinder, PassQueue, TypeBinder};
use crate::env::BindingEnvironment;
use crate::globals::GlobalLookups;
use crate::model::BoundModel;
use crate::BindingError;

/// Downstream consumer of the bound relational graph, such as a DDL
/// generator.
pub trait SchemaSink {
	fn accept(&mut self, model: &BoundModel) -> Result<(), Box<dyn Error + Send + Sync>>;
}

#[derive(Debug, Clone, Default)]
pub struct BindingCoordinator {
	env: BindingEnvironment,
}

impl BindingCoordinator {
	pub fn new(env: BindingEnvironment) -> Self {
		Self { env }
	}

	pub fn environment(&self) -> &BindingEnvironment {
		&self.env
	}

	/// Categorizes `names` with the configured shared-cache mode, then binds.
	pub fn bind_classes<I, S>(&self, lookup: &dyn ClassDetailsLookup, names: I) -> Result<BoundModel, BindingError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let domain = Categorizer::new(lookup)
			.with_cache_mode(self.env.settings().shared_cache_mode)
			.categorize(names)?;
		self.coordinate(&domain)
	}

	pub fn coordinate(&self, domain: &CategorizedDomainModel) -> Result<BoundModel, BindingError> {
		let _span = tracing::info_span!("binder.coordinate").entered();
		let mut state = BindingState {
			model: BoundModel::default(),
			globals: GlobalLookups::build(domain.registrations())?,
		};
		let mut queue = PassQueue::new();

		let mut type_binders: Vec<TypeBinder> = Vec::new();
		for hierarchy in domain.hierarchies() {
			let cx = HierarchyContext {
				env: &self.env,
				domain,
				hierarchy,
			};
			type_binders.extend(binders::bind_hierarchy(cx, &mut state, &mut queue)?);
		}
		for stray in domain.stray_mapped_superclasses() {
			type_binders.push(TypeBinder::MappedSuperclass(MappedSuperclassBinder::stray(stray, &mut state)));
		}

		let deferred = queue.len();
		let report = queue.process(&mut state)?;

		for binder in &type_binders {
			tracing::trace!(domain = "binder", class = binder.class_name(), "closing pass");
			binder.finish(&mut state)?;
		}

		let BindingState { mut model, globals } = state;
		model.install_globals(globals.generators(), globals.filter_defs());
		tracing::info!(
			domain = "binder",
			hierarchies = domain.hierarchies().len(),
			entities = model.entities().count(),
			tables = model.tables().len(),
			deferred,
			scans = report.scan_count(),
			"bound domain model"
		);
		model.set_convergence(report);
		Ok(model)
	}

	/// [`Self::coordinate`], then hands the model to `sink`.
	pub fn coordinate_into(
		&self,
		domain: &CategorizedDomainModel,
		sink: &mut dyn SchemaSink,
	) -> Result<BoundModel, BindingError> {
		let model = self.coordinate(domain)?;
		sink.accept(&model).map_err(BindingError::Sink)?;
		Ok(model)
	}
}
