use std::sync::Arc;

use strata_models::annotations::{AnnotationTarget, bool_or_default, builtins};
use strata_models::{ClassDetailsLookup, simple_name};

use super::{EntityHierarchy, IdMapping, InheritanceStrategy, NaturalIdMapping};
use crate::error::SingularRole;
use crate::managed::{AccessType, AttributeContainer, AttributeMetadata, ManagedType};
use crate::registrations::class_or_default;
use crate::{CacheRegion, CategorizeError};

/// Collects identifier, version, tenant-id and natural-id attributes while a
/// hierarchy's types are visited, then [`resolve`](Self::resolve)s them into
/// an [`EntityHierarchy`].
pub(crate) struct HierarchyBuilder {
	root: Arc<ManagedType>,
	types: Vec<Arc<ManagedType>>,
	ids: Vec<Arc<AttributeMetadata>>,
	embedded_ids: Vec<Arc<AttributeMetadata>>,
	id_class: Option<Arc<str>>,
	version: Option<Arc<AttributeMetadata>>,
	tenant_id: Option<Arc<AttributeMetadata>>,
	natural_id: Vec<Arc<AttributeMetadata>>,
	natural_id_mutable: bool,
}

impl HierarchyBuilder {
	pub(crate) fn new(root: Arc<ManagedType>) -> Self {
		Self {
			root,
			types: Vec::new(),
			ids: Vec::new(),
			embedded_ids: Vec::new(),
			id_class: None,
			version: None,
			tenant_id: None,
			natural_id: Vec::new(),
			natural_id_mutable: false,
		}
	}

	fn root_name(&self) -> String {
		self.root.name().to_owned()
	}

	/// Adds a member type. Types must arrive supertype first.
	pub(crate) fn add_type(&mut self, ty: Arc<ManagedType>) -> Result<(), CategorizeError> {
		if let Some(usage) = ty.class().local_usages().get(&builtins().id_class) {
			let declared = class_or_default(usage, "value")
				.ok_or_else(|| CategorizeError::invalid("IdClass.value", "void", ty.class().location()))?;
			match &self.id_class {
				Some(existing) if **existing != *declared => {
					return Err(CategorizeError::IdMappingConflict {
						root: self.root_name(),
						detail: format!("@IdClass `{existing}` redeclared as `{declared}` on `{}`", ty.name()),
					});
				}
				Some(_) => {}
				None => self.id_class = Some(Arc::from(declared)),
			}
		}
		for attribute in ty.attributes() {
			self.visit(attribute)?;
		}
		self.types.push(ty);
		Ok(())
	}

	fn visit(&mut self, attribute: &Arc<AttributeMetadata>) -> Result<(), CategorizeError> {
		let b = builtins();
		if attribute.has(&b.id) {
			self.ids.push(attribute.clone());
		}
		if attribute.has(&b.embedded_id) {
			self.embedded_ids.push(attribute.clone());
		}
		if attribute.has(&b.version) {
			let root = self.root_name();
			claim(&mut self.version, attribute, SingularRole::Version, root)?;
		}
		if attribute.has(&b.tenant_id) {
			let root = self.root_name();
			claim(&mut self.tenant_id, attribute, SingularRole::TenantId, root)?;
		}
		if let Some(usage) = attribute.usage(&b.natural_id) {
			self.natural_id_mutable |= bool_or_default(usage, "mutable").unwrap_or(false);
			self.natural_id.push(attribute.clone());
		}
		Ok(())
	}

	/// Finalizes the identifier mapping. The id class of an aggregated id is
	/// the embedded attribute's declared type.
	pub(crate) fn resolve(
		self,
		lookup: &dyn ClassDetailsLookup,
		inheritance: InheritanceStrategy,
		cache: CacheRegion,
		access: AccessType,
	) -> Result<EntityHierarchy, CategorizeError> {
		let conflict = |detail: String| CategorizeError::IdMappingConflict {
			root: self.root_name(),
			detail,
		};

		let id_mapping = match (self.embedded_ids.as_slice(), self.ids.as_slice(), &self.id_class) {
			([], [], _) => return Err(CategorizeError::MissingId { root: self.root_name() }),
			([embedded], [], None) => IdMapping::Aggregated {
				id_class: lookup.resolve(embedded.member().type_name())?,
				attribute: embedded.clone(),
			},
			([_, _, ..], _, _) => {
				return Err(conflict(format!("more than one @EmbeddedId: {}", join(&self.embedded_ids))));
			}
			([embedded], [_, ..], _) => {
				return Err(conflict(format!(
					"@EmbeddedId `{}` combined with @Id {}",
					embedded.qualified_name(),
					join(&self.ids)
				)));
			}
			([embedded], [], Some(id_class)) => {
				return Err(conflict(format!(
					"@EmbeddedId `{}` combined with @IdClass `{id_class}`",
					embedded.qualified_name()
				)));
			}
			([], [single], None) => IdMapping::Basic {
				attribute: single.clone(),
			},
			([], _, Some(id_class)) => IdMapping::NonAggregated {
				attributes: self.ids.clone(),
				id_class: lookup.resolve(id_class)?,
			},
			([], _, None) => {
				return Err(CategorizeError::IdClassRequired {
					root: self.root_name(),
					attributes: join(&self.ids),
				});
			}
		};

		let natural_id = (!self.natural_id.is_empty()).then(|| NaturalIdMapping {
			attributes: self.natural_id,
			mutable: self.natural_id_mutable,
		});

		tracing::debug!(
			domain = "categorize",
			root = %simple_name(self.root.name()),
			types = self.types.len(),
			?inheritance,
			"resolved entity hierarchy"
		);

		Ok(EntityHierarchy {
			root: self.root,
			types: self.types,
			inheritance,
			id_mapping,
			version: self.version,
			tenant_id: self.tenant_id,
			natural_id,
			cache,
			access,
		})
	}
}

fn claim(
	slot: &mut Option<Arc<AttributeMetadata>>,
	attribute: &Arc<AttributeMetadata>,
	role: SingularRole,
	root: String,
) -> Result<(), CategorizeError> {
	if let Some(existing) = slot {
		return Err(CategorizeError::HierarchyConflict {
			role,
			attribute: attribute.qualified_name(),
			existing: existing.qualified_name(),
			root,
		});
	}
	*slot = Some(attribute.clone());
	Ok(())
}

fn join(attributes: &[Arc<AttributeMetadata>]) -> String {
	attributes
		.iter()
		.map(|a| format!("`{}`", a.qualified_name()))
		.collect::<Vec<_>>()
		.join(", ")
}
