use std::sync::Arc;

use strata_categorize::{AttributeContainer, ManagedType};

use super::{BindingState, HierarchyContext};
use crate::model::MappedSuperclassBinding;

/// A mapped superclass owns no table; its attributes live on the table of
/// the nearest entity above it, or else the nearest entity below it.
#[derive(Debug)]
pub(crate) struct MappedSuperclassBinder {
	class_name: Arc<str>,
	owner: Option<Arc<str>>,
}

impl MappedSuperclassBinder {
	pub(crate) fn bind(cx: HierarchyContext<'_>, ty: &ManagedType, state: &mut BindingState) -> Self {
		let name = ty.name();
		let owner = cx
			.hierarchy
			.entity_super_type_of(name)
			.or_else(|| {
				cx.hierarchy
					.entities()
					.find(|e| e.class().ancestors().any(|a| a.name() == name))
			})
			.map(|e| e.class().name_arc().clone());
		Self::register(ty, owner, state)
	}

	/// A mapped superclass no hierarchy reaches.
	pub(crate) fn stray(ty: &ManagedType, state: &mut BindingState) -> Self {
		Self::register(ty, None, state)
	}

	fn register(ty: &ManagedType, owner: Option<Arc<str>>, state: &mut BindingState) -> Self {
		let class_name = ty.class().name_arc().clone();
		state.model.insert_mapped_superclass(MappedSuperclassBinding {
			class_name: class_name.clone(),
			attributes: ty.attributes().iter().map(|a| Arc::from(a.name())).collect(),
			table_owner: None,
			table: None,
		});
		Self { class_name, owner }
	}

	pub(crate) fn class_name(&self) -> &str {
		&self.class_name
	}

	pub(crate) fn finish(&self, state: &mut BindingState) {
		let table = self
			.owner
			.as_deref()
			.and_then(|owner| state.model.entity(owner))
			.map(|entity| entity.table);
		if let Some(binding) = state.model.mapped_superclass_mut(&self.class_name) {
			binding.table_owner = self.owner.clone();
			binding.table = table;
		}
	}
}
