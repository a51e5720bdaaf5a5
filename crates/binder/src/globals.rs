//! Lookup tables built from the global registrations before any hierarchy is
//! bound.

use std::sync::Arc;

use indexmap::IndexMap;
use indexmap::map::Entry;
use rustc_hash::FxBuildHasher;
use strata_categorize::GlobalRegistrations;
use strata_categorize::registrations::{
	ConverterRegistration, FilterDefRegistration, GeneratorRegistration, JavaTypeRegistration,
};

use crate::BindingError;

type ByName<T> = IndexMap<Arc<str>, T, FxBuildHasher>;

#[derive(Debug, Clone, Default)]
pub(crate) struct GlobalLookups {
	generators: ByName<GeneratorRegistration>,
	filter_defs: ByName<FilterDefRegistration>,
	converters: ByName<ConverterRegistration>,
	/// Auto-apply converters keyed by domain type.
	auto_apply: ByName<ConverterRegistration>,
	java_types: ByName<JavaTypeRegistration>,
}

fn insert_unique<T: Clone>(
	map: &mut ByName<T>,
	kind: &'static str,
	key: &Arc<str>,
	value: &T,
	source: impl Fn(&T) -> &str,
) -> Result<(), BindingError> {
	match map.entry(key.clone()) {
		Entry::Occupied(existing) => Err(BindingError::DuplicateRegistration {
			kind,
			name: key.to_string(),
			first: source(existing.get()).to_owned(),
			second: source(value).to_owned(),
		}),
		Entry::Vacant(slot) => {
			slot.insert(value.clone());
			Ok(())
		}
	}
}

impl GlobalLookups {
	/// Indexes every registration; the same name registered twice is an error
	/// regardless of declaration order.
	pub(crate) fn build(registrations: &GlobalRegistrations) -> Result<Self, BindingError> {
		let mut out = Self::default();
		for generator in registrations.generators() {
			insert_unique(&mut out.generators, "generator", &generator.name, generator, |g| &g.source)?;
		}
		for filter in registrations.filter_defs() {
			insert_unique(&mut out.filter_defs, "filter definition", &filter.name, filter, |f| &f.source)?;
		}
		for converter in registrations.converters() {
			insert_unique(&mut out.converters, "converter", &converter.converter, converter, |c| &c.source)?;
			if converter.auto_apply
				&& let Some(domain) = &converter.domain_type
			{
				insert_unique(&mut out.auto_apply, "auto-apply converter for", domain, converter, |c| {
					&c.source
				})?;
			}
		}
		for java_type in registrations.java_types() {
			insert_unique(&mut out.java_types, "java type descriptor for", &java_type.java_type, java_type, |j| {
				&j.source
			})?;
		}
		tracing::debug!(
			domain = "binder",
			generators = out.generators.len(),
			filter_defs = out.filter_defs.len(),
			converters = out.converters.len(),
			java_types = out.java_types.len(),
			"global lookups built"
		);
		Ok(out)
	}

	pub(crate) fn generator(&self, name: &str, attribute: &str) -> Result<&GeneratorRegistration, BindingError> {
		self.generators.get(name).ok_or_else(|| BindingError::UnknownGenerator {
			name: name.to_owned(),
			attribute: attribute.to_owned(),
		})
	}

	pub(crate) fn filter_def(&self, name: &str, location: &str) -> Result<&FilterDefRegistration, BindingError> {
		self.filter_defs.get(name).ok_or_else(|| BindingError::UnknownFilter {
			name: name.to_owned(),
			location: location.to_owned(),
		})
	}

	pub(crate) fn auto_apply_converter(&self, domain_type: &str) -> Option<&ConverterRegistration> {
		self.auto_apply.get(domain_type)
	}

	pub(crate) fn java_type_descriptor(&self, java_type: &str) -> Option<&Arc<str>> {
		self.java_types.get(java_type).map(|j| &j.descriptor)
	}

	pub(crate) fn generators(&self) -> &ByName<GeneratorRegistration> {
		&self.generators
	}

	pub(crate) fn filter_defs(&self) -> &ByName<FilterDefRegistration> {
		&self.filter_defs
	}
}
