//! Class-graph builders shared by unit tests.

use strata_models::annotations::names;
use strata_models::source::{AnnotationShape, DefinedClass, InMemoryClassLoader, LoadedClass, MemberShape, ValueShape};
use strata_models::{MetadataRegistry, TypeRef};

use crate::{CategorizeError, CategorizedDomainModel, Categorizer, SharedCacheMode};

pub(crate) fn ann(name: &str) -> AnnotationShape {
	AnnotationShape::new(name)
}

pub(crate) fn field(name: &str, type_name: &str) -> MemberShape {
	MemberShape::field(name, TypeRef::new(type_name))
}

pub(crate) fn getter(name: &str, type_name: &str) -> MemberShape {
	MemberShape::method(name, TypeRef::new(type_name))
}

pub(crate) fn id(name: &str) -> MemberShape {
	field(name, "long").annotated(ann(names::ID))
}

pub(crate) fn entity(name: &str) -> DefinedClass {
	DefinedClass::new(name).annotated(ann(names::ENTITY))
}

pub(crate) fn class_value(name: &str) -> ValueShape {
	ValueShape::class(name)
}

pub(crate) fn registry(classes: Vec<DefinedClass>) -> MetadataRegistry {
	let mut loader = InMemoryClassLoader::new();
	for class in classes {
		loader.add(class);
	}
	MetadataRegistry::live(loader)
}

pub(crate) fn categorize_with(
	classes: Vec<DefinedClass>,
	mode: SharedCacheMode,
) -> Result<CategorizedDomainModel, CategorizeError> {
	let names: Vec<String> = classes.iter().map(|c| c.name().to_owned()).collect();
	let registry = registry(classes);
	Categorizer::new(&registry).with_cache_mode(mode).categorize(&names)
}

pub(crate) fn categorize(classes: Vec<DefinedClass>) -> Result<CategorizedDomainModel, CategorizeError> {
	categorize_with(classes, SharedCacheMode::default())
}
