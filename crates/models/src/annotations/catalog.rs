//! Built-in persistence annotation shapes.
//!
//! The catalogue is process-wide: every registry hands out the same
//! `Arc<AnnotationDescriptor>` for a built-in name. Custom and lenient shapes
//! live in a second process-wide table with the same guarantee.

use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::{AnnotationDescriptor, AnnotationTargets as T, AttributeValue as V};
use crate::ModelsError;

pub mod names {
	pub const ENTITY: &str = "jakarta.persistence.Entity";
	pub const MAPPED_SUPERCLASS: &str = "jakarta.persistence.MappedSuperclass";
	pub const EMBEDDABLE: &str = "jakarta.persistence.Embeddable";
	pub const ID: &str = "jakarta.persistence.Id";
	pub const EMBEDDED_ID: &str = "jakarta.persistence.EmbeddedId";
	pub const ID_CLASS: &str = "jakarta.persistence.IdClass";
	pub const VERSION: &str = "jakarta.persistence.Version";
	pub const TENANT_ID: &str = "org.hibernate.annotations.TenantId";
	pub const NATURAL_ID: &str = "org.hibernate.annotations.NaturalId";
	pub const INHERITANCE: &str = "jakarta.persistence.Inheritance";
	pub const TABLE: &str = "jakarta.persistence.Table";
	pub const VIEW: &str = "org.hibernate.annotations.View";
	pub const SUBSELECT: &str = "org.hibernate.annotations.Subselect";
	pub const COLUMN: &str = "jakarta.persistence.Column";
	pub const JOIN_COLUMN: &str = "jakarta.persistence.JoinColumn";
	pub const EMBEDDED: &str = "jakarta.persistence.Embedded";
	pub const ATTRIBUTE_OVERRIDE: &str = "jakarta.persistence.AttributeOverride";
	pub const ATTRIBUTE_OVERRIDES: &str = "jakarta.persistence.AttributeOverrides";
	pub const MANY_TO_ONE: &str = "jakarta.persistence.ManyToOne";
	pub const ONE_TO_ONE: &str = "jakarta.persistence.OneToOne";
	pub const ONE_TO_MANY: &str = "jakarta.persistence.OneToMany";
	pub const MANY_TO_MANY: &str = "jakarta.persistence.ManyToMany";
	pub const ELEMENT_COLLECTION: &str = "jakarta.persistence.ElementCollection";
	pub const TRANSIENT: &str = "jakarta.persistence.Transient";
	pub const ACCESS: &str = "jakarta.persistence.Access";
	pub const GENERATED_VALUE: &str = "jakarta.persistence.GeneratedValue";
	pub const SEQUENCE_GENERATOR: &str = "jakarta.persistence.SequenceGenerator";
	pub const SEQUENCE_GENERATORS: &str = "jakarta.persistence.SequenceGenerators";
	pub const TABLE_GENERATOR: &str = "jakarta.persistence.TableGenerator";
	pub const GENERIC_GENERATOR: &str = "org.hibernate.annotations.GenericGenerator";
	pub const GENERIC_GENERATORS: &str = "org.hibernate.annotations.GenericGenerators";
	pub const CONVERT: &str = "jakarta.persistence.Convert";
	pub const CONVERTER_REGISTRATION: &str = "org.hibernate.annotations.ConverterRegistration";
	pub const CONVERTER_REGISTRATIONS: &str = "org.hibernate.annotations.ConverterRegistrations";
	pub const JAVA_TYPE_REGISTRATION: &str = "org.hibernate.annotations.JavaTypeRegistration";
	pub const JAVA_TYPE_REGISTRATIONS: &str = "org.hibernate.annotations.JavaTypeRegistrations";
	pub const FILTER_DEF: &str = "org.hibernate.annotations.FilterDef";
	pub const FILTER_DEFS: &str = "org.hibernate.annotations.FilterDefs";
	pub const PARAM_DEF: &str = "org.hibernate.annotations.ParamDef";
	pub const FILTER: &str = "org.hibernate.annotations.Filter";
	pub const FILTERS: &str = "org.hibernate.annotations.Filters";
	pub const CACHE: &str = "org.hibernate.annotations.Cache";
	pub const CACHEABLE: &str = "jakarta.persistence.Cacheable";
	pub const DISCRIMINATOR_COLUMN: &str = "jakarta.persistence.DiscriminatorColumn";
	pub const DISCRIMINATOR_VALUE: &str = "jakarta.persistence.DiscriminatorValue";
	pub const PRIMARY_KEY_JOIN_COLUMN: &str = "jakarta.persistence.PrimaryKeyJoinColumn";

	pub const INHERITANCE_TYPE: &str = "jakarta.persistence.InheritanceType";
	pub const GENERATION_TYPE: &str = "jakarta.persistence.GenerationType";
	pub const ACCESS_TYPE: &str = "jakarta.persistence.AccessType";
	pub const DISCRIMINATOR_TYPE: &str = "jakarta.persistence.DiscriminatorType";
	/// Placeholder class literal meaning "not specified".
	pub const VOID: &str = "void";
}

use names::*;

/// The built-in descriptor set, one field per shape.
#[derive(Debug)]
pub struct BuiltinDescriptors {
	pub entity: Arc<AnnotationDescriptor>,
	pub mapped_superclass: Arc<AnnotationDescriptor>,
	pub embeddable: Arc<AnnotationDescriptor>,
	pub id: Arc<AnnotationDescriptor>,
	pub embedded_id: Arc<AnnotationDescriptor>,
	pub id_class: Arc<AnnotationDescriptor>,
	pub version: Arc<AnnotationDescriptor>,
	pub tenant_id: Arc<AnnotationDescriptor>,
	pub natural_id: Arc<AnnotationDescriptor>,
	pub inheritance: Arc<AnnotationDescriptor>,
	pub table: Arc<AnnotationDescriptor>,
	pub view: Arc<AnnotationDescriptor>,
	pub subselect: Arc<AnnotationDescriptor>,
	pub column: Arc<AnnotationDescriptor>,
	pub join_column: Arc<AnnotationDescriptor>,
	pub embedded: Arc<AnnotationDescriptor>,
	pub attribute_override: Arc<AnnotationDescriptor>,
	pub attribute_overrides: Arc<AnnotationDescriptor>,
	pub many_to_one: Arc<AnnotationDescriptor>,
	pub one_to_one: Arc<AnnotationDescriptor>,
	pub one_to_many: Arc<AnnotationDescriptor>,
	pub many_to_many: Arc<AnnotationDescriptor>,
	pub element_collection: Arc<AnnotationDescriptor>,
	pub transient: Arc<AnnotationDescriptor>,
	pub access: Arc<AnnotationDescriptor>,
	pub generated_value: Arc<AnnotationDescriptor>,
	pub sequence_generator: Arc<AnnotationDescriptor>,
	pub sequence_generators: Arc<AnnotationDescriptor>,
	pub table_generator: Arc<AnnotationDescriptor>,
	pub generic_generator: Arc<AnnotationDescriptor>,
	pub generic_generators: Arc<AnnotationDescriptor>,
	pub convert: Arc<AnnotationDescriptor>,
	pub converter_registration: Arc<AnnotationDescriptor>,
	pub converter_registrations: Arc<AnnotationDescriptor>,
	pub java_type_registration: Arc<AnnotationDescriptor>,
	pub java_type_registrations: Arc<AnnotationDescriptor>,
	pub filter_def: Arc<AnnotationDescriptor>,
	pub filter_defs: Arc<AnnotationDescriptor>,
	pub param_def: Arc<AnnotationDescriptor>,
	pub filter: Arc<AnnotationDescriptor>,
	pub filters: Arc<AnnotationDescriptor>,
	pub cache: Arc<AnnotationDescriptor>,
	pub cacheable: Arc<AnnotationDescriptor>,
	pub discriminator_column: Arc<AnnotationDescriptor>,
	pub discriminator_value: Arc<AnnotationDescriptor>,
	pub primary_key_join_column: Arc<AnnotationDescriptor>,
	by_name: FxHashMap<Arc<str>, Arc<AnnotationDescriptor>>,
}

static BUILTINS: LazyLock<BuiltinDescriptors> = LazyLock::new(BuiltinDescriptors::create);

/// Returns the process-wide built-in catalogue.
pub fn builtins() -> &'static BuiltinDescriptors {
	&BUILTINS
}

static SHAPES: LazyLock<RwLock<FxHashMap<Box<str>, Arc<AnnotationDescriptor>>>> = LazyLock::new(Default::default);

/// Looks a name up among built-in, registered and lenient shapes.
pub(crate) fn shared_descriptor(name: &str) -> Option<Arc<AnnotationDescriptor>> {
	if let Some(builtin) = BUILTINS.get(name) {
		return Some(builtin.clone());
	}
	SHAPES.read().get(name).cloned()
}

/// Returns the shared shape for `name`, creating a lenient one on first use.
pub(crate) fn lenient_descriptor(name: &str) -> Arc<AnnotationDescriptor> {
	if let Some(found) = shared_descriptor(name) {
		return found;
	}
	SHAPES
		.write()
		.entry(Box::from(name))
		.or_insert_with(|| {
			tracing::debug!(domain = "models", annotation = name, "no descriptor registered; using lenient shape");
			Arc::new(AnnotationDescriptor::lenient(name))
		})
		.clone()
}

/// Publishes a custom shape. Registering an identical shape again returns the
/// instance already published; a different shape under a taken name fails.
pub(crate) fn register_shape(descriptor: AnnotationDescriptor) -> Result<Arc<AnnotationDescriptor>, ModelsError> {
	let duplicate = || ModelsError::DuplicateDescriptor {
		name: descriptor.name().to_string(),
	};
	if BUILTINS.get(descriptor.name()).is_some() {
		return Err(duplicate());
	}
	let mut shapes = SHAPES.write();
	if let Some(existing) = shapes.get(descriptor.name()) {
		return if existing.same_shape(&descriptor) {
			Ok(existing.clone())
		} else {
			Err(duplicate())
		};
	}
	let descriptor = Arc::new(descriptor);
	shapes.insert(Box::from(descriptor.name()), descriptor.clone());
	Ok(descriptor)
}

fn empty() -> V {
	V::string("")
}

fn void() -> V {
	V::class(VOID)
}

fn no_items() -> V {
	V::Array(Vec::new())
}

fn container(name: &str, targets: T) -> Arc<AnnotationDescriptor> {
	AnnotationDescriptor::builder(name, targets).required("value").build_arc()
}

fn marker(name: &str, targets: T) -> Arc<AnnotationDescriptor> {
	AnnotationDescriptor::builder(name, targets).build_arc()
}

impl BuiltinDescriptors {
	fn create() -> Self {
		let attribute_overrides = container(ATTRIBUTE_OVERRIDES, T::TYPE | T::MEMBER);
		let sequence_generators = container(SEQUENCE_GENERATORS, T::TYPE | T::PACKAGE);
		let generic_generators = container(GENERIC_GENERATORS, T::TYPE | T::PACKAGE);
		let converter_registrations = container(CONVERTER_REGISTRATIONS, T::TYPE | T::PACKAGE);
		let java_type_registrations = container(JAVA_TYPE_REGISTRATIONS, T::TYPE | T::PACKAGE);
		let filter_defs = container(FILTER_DEFS, T::TYPE | T::PACKAGE);
		let filters = container(FILTERS, T::TYPE | T::MEMBER);

		let mut out = Self {
			entity: AnnotationDescriptor::builder(ENTITY, T::TYPE).attr("name", empty()).build_arc(),
			mapped_superclass: marker(MAPPED_SUPERCLASS, T::TYPE),
			embeddable: marker(EMBEDDABLE, T::TYPE),
			id: marker(ID, T::MEMBER),
			embedded_id: marker(EMBEDDED_ID, T::MEMBER),
			id_class: AnnotationDescriptor::builder(ID_CLASS, T::TYPE).required("value").build_arc(),
			version: marker(VERSION, T::MEMBER),
			tenant_id: marker(TENANT_ID, T::MEMBER),
			natural_id: AnnotationDescriptor::builder(NATURAL_ID, T::MEMBER)
				.attr("mutable", V::Bool(false))
				.build_arc(),
			inheritance: AnnotationDescriptor::builder(INHERITANCE, T::TYPE)
				.attr("strategy", V::enum_constant(INHERITANCE_TYPE, "SINGLE_TABLE"))
				.build_arc(),
			table: AnnotationDescriptor::builder(TABLE, T::TYPE)
				.attr("name", empty())
				.attr("catalog", empty())
				.attr("schema", empty())
				.build_arc(),
			view: AnnotationDescriptor::builder(VIEW, T::TYPE).required("query").build_arc(),
			subselect: AnnotationDescriptor::builder(SUBSELECT, T::TYPE).required("value").build_arc(),
			column: AnnotationDescriptor::builder(COLUMN, T::MEMBER)
				.attr("name", empty())
				.attr("nullable", V::Bool(true))
				.attr("unique", V::Bool(false))
				.attr("length", V::Int(255))
				.attr("insertable", V::Bool(true))
				.attr("updatable", V::Bool(true))
				.build_arc(),
			join_column: AnnotationDescriptor::builder(JOIN_COLUMN, T::MEMBER)
				.attr("name", empty())
				.attr("referencedColumnName", empty())
				.attr("nullable", V::Bool(true))
				.build_arc(),
			embedded: marker(EMBEDDED, T::MEMBER),
			attribute_override: AnnotationDescriptor::builder(ATTRIBUTE_OVERRIDE, T::TYPE | T::MEMBER)
				.required("name")
				.required("column")
				.repeatable(attribute_overrides.clone())
				.build_arc(),
			attribute_overrides,
			many_to_one: AnnotationDescriptor::builder(MANY_TO_ONE, T::MEMBER)
				.attr("targetEntity", void())
				.attr("optional", V::Bool(true))
				.build_arc(),
			one_to_one: AnnotationDescriptor::builder(ONE_TO_ONE, T::MEMBER)
				.attr("targetEntity", void())
				.attr("optional", V::Bool(true))
				.attr("mappedBy", empty())
				.build_arc(),
			one_to_many: AnnotationDescriptor::builder(ONE_TO_MANY, T::MEMBER)
				.attr("targetEntity", void())
				.attr("mappedBy", empty())
				.build_arc(),
			many_to_many: AnnotationDescriptor::builder(MANY_TO_MANY, T::MEMBER)
				.attr("targetEntity", void())
				.attr("mappedBy", empty())
				.build_arc(),
			element_collection: AnnotationDescriptor::builder(ELEMENT_COLLECTION, T::MEMBER)
				.attr("targetClass", void())
				.build_arc(),
			transient: marker(TRANSIENT, T::MEMBER),
			access: AnnotationDescriptor::builder(ACCESS, T::TYPE | T::MEMBER).required("value").build_arc(),
			generated_value: AnnotationDescriptor::builder(GENERATED_VALUE, T::MEMBER)
				.attr("strategy", V::enum_constant(GENERATION_TYPE, "AUTO"))
				.attr("generator", empty())
				.build_arc(),
			sequence_generator: AnnotationDescriptor::builder(SEQUENCE_GENERATOR, T::TYPE | T::MEMBER | T::PACKAGE)
				.required("name")
				.attr("sequenceName", empty())
				.attr("catalog", empty())
				.attr("schema", empty())
				.attr("initialValue", V::Int(1))
				.attr("allocationSize", V::Int(50))
				.repeatable(sequence_generators.clone())
				.build_arc(),
			sequence_generators,
			table_generator: AnnotationDescriptor::builder(TABLE_GENERATOR, T::TYPE | T::MEMBER | T::PACKAGE)
				.required("name")
				.attr("table", empty())
				.attr("pkColumnName", empty())
				.attr("valueColumnName", empty())
				.attr("pkColumnValue", empty())
				.attr("initialValue", V::Int(0))
				.attr("allocationSize", V::Int(50))
				.build_arc(),
			generic_generator: AnnotationDescriptor::builder(GENERIC_GENERATOR, T::TYPE | T::MEMBER | T::PACKAGE)
				.required("name")
				.attr("type", void())
				.attr("strategy", empty())
				.repeatable(generic_generators.clone())
				.build_arc(),
			generic_generators,
			convert: AnnotationDescriptor::builder(CONVERT, T::TYPE | T::MEMBER)
				.attr("converter", void())
				.attr("attributeName", empty())
				.attr("disableConversion", V::Bool(false))
				.build_arc(),
			converter_registration: AnnotationDescriptor::builder(CONVERTER_REGISTRATION, T::TYPE | T::PACKAGE)
				.required("converter")
				.attr("domainType", void())
				.attr("autoApply", V::Bool(true))
				.repeatable(converter_registrations.clone())
				.build_arc(),
			converter_registrations,
			java_type_registration: AnnotationDescriptor::builder(JAVA_TYPE_REGISTRATION, T::TYPE | T::PACKAGE)
				.required("javaType")
				.required("descriptorClass")
				.repeatable(java_type_registrations.clone())
				.build_arc(),
			java_type_registrations,
			filter_def: AnnotationDescriptor::builder(FILTER_DEF, T::TYPE | T::PACKAGE)
				.required("name")
				.attr("defaultCondition", empty())
				.attr("parameters", no_items())
				.repeatable(filter_defs.clone())
				.build_arc(),
			filter_defs,
			param_def: AnnotationDescriptor::builder(PARAM_DEF, T::empty())
				.required("name")
				.required("type")
				.build_arc(),
			filter: AnnotationDescriptor::builder(FILTER, T::TYPE | T::MEMBER)
				.required("name")
				.attr("condition", empty())
				.repeatable(filters.clone())
				.build_arc(),
			filters,
			cache: AnnotationDescriptor::builder(CACHE, T::TYPE | T::MEMBER)
				.required("usage")
				.attr("region", empty())
				.build_arc(),
			cacheable: AnnotationDescriptor::builder(CACHEABLE, T::TYPE)
				.attr("value", V::Bool(true))
				.build_arc(),
			discriminator_column: AnnotationDescriptor::builder(DISCRIMINATOR_COLUMN, T::TYPE)
				.attr("name", V::string("DTYPE"))
				.attr("length", V::Int(31))
				.attr("discriminatorType", V::enum_constant(DISCRIMINATOR_TYPE, "STRING"))
				.build_arc(),
			discriminator_value: AnnotationDescriptor::builder(DISCRIMINATOR_VALUE, T::TYPE)
				.required("value")
				.build_arc(),
			primary_key_join_column: AnnotationDescriptor::builder(PRIMARY_KEY_JOIN_COLUMN, T::TYPE | T::MEMBER)
				.attr("name", empty())
				.attr("referencedColumnName", empty())
				.build_arc(),
			by_name: FxHashMap::default(),
		};

		let all = out.all();
		out.by_name = all.into_iter().map(|d| (d.name_arc().clone(), d)).collect();
		out
	}

	fn all(&self) -> Vec<Arc<AnnotationDescriptor>> {
		[
			&self.entity,
			&self.mapped_superclass,
			&self.embeddable,
			&self.id,
			&self.embedded_id,
			&self.id_class,
			&self.version,
			&self.tenant_id,
			&self.natural_id,
			&self.inheritance,
			&self.table,
			&self.view,
			&self.subselect,
			&self.column,
			&self.join_column,
			&self.embedded,
			&self.attribute_override,
			&self.attribute_overrides,
			&self.many_to_one,
			&self.one_to_one,
			&self.one_to_many,
			&self.many_to_many,
			&self.element_collection,
			&self.transient,
			&self.access,
			&self.generated_value,
			&self.sequence_generator,
			&self.sequence_generators,
			&self.table_generator,
			&self.generic_generator,
			&self.generic_generators,
			&self.convert,
			&self.converter_registration,
			&self.converter_registrations,
			&self.java_type_registration,
			&self.java_type_registrations,
			&self.filter_def,
			&self.filter_defs,
			&self.param_def,
			&self.filter,
			&self.filters,
			&self.cache,
			&self.cacheable,
			&self.discriminator_column,
			&self.discriminator_value,
			&self.primary_key_join_column,
		]
		.into_iter()
		.cloned()
		.collect()
	}

	pub fn get(&self, name: &str) -> Option<&Arc<AnnotationDescriptor>> {
		self.by_name.get(name)
	}

	pub fn len(&self) -> usize {
		self.by_name.len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_name.is_empty()
	}
}
