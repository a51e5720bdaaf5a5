//! Class-graph builders shared by unit tests.

use strata_categorize::{CategorizedDomainModel, Categorizer};
use strata_models::annotations::names;
use strata_models::source::{AnnotationShape, DefinedClass, InMemoryClassLoader, LoadedClass, MemberShape, ValueShape};
use strata_models::{MetadataRegistry, TypeRef};

use crate::{BindingCoordinator, BindingEnvironment, BindingError, BoundModel};

pub(crate) fn ann(name: &str) -> AnnotationShape {
	AnnotationShape::new(name)
}

pub(crate) fn field(name: &str, type_name: &str) -> MemberShape {
	MemberShape::field(name, TypeRef::new(type_name))
}

pub(crate) fn id(name: &str) -> MemberShape {
	field(name, "long").annotated(ann(names::ID))
}

pub(crate) fn entity(name: &str) -> DefinedClass {
	DefinedClass::new(name).annotated(ann(names::ENTITY))
}

pub(crate) fn many_to_one(name: &str, target: &str) -> MemberShape {
	field(name, target).annotated(ann(names::MANY_TO_ONE))
}

pub(crate) fn plural(name: &str, annotation: &str, element: &str) -> MemberShape {
	MemberShape::field(name, TypeRef::generic("java.util.List", &[element])).annotated(ann(annotation))
}

pub(crate) fn inheritance(strategy: &str) -> AnnotationShape {
	ann(names::INHERITANCE).with("strategy", ValueShape::enum_constant(names::INHERITANCE_TYPE, strategy))
}

pub(crate) fn categorize(classes: Vec<DefinedClass>) -> CategorizedDomainModel {
	let names: Vec<String> = classes.iter().map(|c| c.name().to_owned()).collect();
	let mut loader = InMemoryClassLoader::new();
	for class in classes {
		loader.add(class);
	}
	let registry = MetadataRegistry::live(loader);
	Categorizer::new(&registry).categorize(&names).unwrap()
}

pub(crate) fn bind_with(env: BindingEnvironment, classes: Vec<DefinedClass>) -> Result<BoundModel, BindingError> {
	BindingCoordinator::new(env).coordinate(&categorize(classes))
}

pub(crate) fn bind(classes: Vec<DefinedClass>) -> Result<BoundModel, BindingError> {
	bind_with(BindingEnvironment::default(), classes)
}

/// Column names of `class_name`'s table, in table order.
pub(crate) fn columns_of<'m>(model: &'m BoundModel, class_name: &str) -> Vec<&'m str> {
	let entity = model.entity(class_name).unwrap();
	model.table(entity.table).columns().iter().map(|c| c.name.text()).collect()
}
