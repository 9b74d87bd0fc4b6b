//! Shared fixtures for the binder integration tests.
//!
//! The fixture world:
//!
//! - `Widget`: read-write `Color`, read-only `Count`, private field `secret`,
//!   overloaded `Resize`, static field `Instances`
//! - `Shape` <- `Circle`: static field `Total` on `Shape`, read-only `Area`
//! - extension method `Describe` on both `Shape` and `object`
//! - `int[]`

#![allow(dead_code)]

use std::sync::Arc;

use latebind::prelude::*;

pub struct World {
    pub catalog: Arc<MemberCatalog>,
    pub binder: Binder,
    pub widget: TypeHash,
    pub shape: TypeHash,
    pub circle: TypeHash,
    pub ints: TypeHash,
    pub shape_extensions: TypeHash,
}

impl World {
    pub fn new() -> Self {
        let mut registry = TypeRegistry::with_primitives();

        let widget = TypeEntry::class("Widget")
            .with_property(PropertyDecl::read_write("Color", primitives::STRING))
            .with_property(PropertyDecl::read_only("Count", primitives::INT32))
            .with_field(
                FieldEntry::new("secret", primitives::INT32).with_visibility(Visibility::Private),
            )
            .with_field(FieldEntry::new("Instances", primitives::INT32).as_static())
            .with_method(MethodEntry::new("Resize", vec![primitives::INT32], primitives::VOID))
            .with_method(MethodEntry::new(
                "Resize",
                vec![primitives::INT32, primitives::INT32],
                primitives::VOID,
            ));
        let widget = registry.register_type(widget).unwrap();

        let shape = TypeEntry::class("Shape")
            .with_field(FieldEntry::new("Total", primitives::INT32).as_static())
            .with_property(PropertyDecl::read_only("Area", primitives::DOUBLE));
        let shape = registry.register_type(shape).unwrap();
        let circle = registry
            .register_type(TypeEntry::class("Circle").with_base(shape))
            .unwrap();

        let int = registry.get(primitives::INT32).unwrap().clone();
        let ints = registry.register_type(TypeEntry::array_of(&int)).unwrap();

        let shape_helpers = TypeEntry::class("ShapeExtensions").with_method(MethodEntry::extension(
            "Describe",
            vec![shape],
            primitives::STRING,
        ));
        let describe_shape = shape_helpers.methods[0].clone();
        let shape_extensions = registry.register_type(shape_helpers).unwrap();

        let object_helpers = TypeEntry::class("ObjectExtensions").with_method(
            MethodEntry::extension("Describe", vec![primitives::OBJECT], primitives::STRING),
        );
        let describe_object = object_helpers.methods[0].clone();
        registry.register_type(object_helpers).unwrap();

        let catalog = Arc::new(MemberCatalog::new(Arc::new(registry)));
        catalog.register_extension(shape, ExtensionMember::method(&describe_shape));
        catalog.register_extension(primitives::OBJECT, ExtensionMember::method(&describe_object));

        Self {
            binder: Binder::new(Arc::clone(&catalog)),
            catalog,
            widget,
            shape,
            circle,
            ints,
            shape_extensions,
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        self.catalog.registry()
    }

    /// An instance of `ty` as call-site argument `index`.
    pub fn instance(&self, index: usize, ty: TypeHash) -> BoundValue {
        BoundValue::argument(index, RuntimeValue::object(ty, index as u64 + 1))
    }

    /// The type value for `ty` as call-site argument `index`.
    pub fn type_value(&self, index: usize, ty: TypeHash) -> BoundValue {
        BoundValue::argument(index, RuntimeValue::TypeRef(ty))
    }
}

pub fn int(index: usize, value: i64) -> BoundValue {
    BoundValue::argument(index, RuntimeValue::int(value))
}

pub fn text(index: usize, value: &str) -> BoundValue {
    BoundValue::argument(index, RuntimeValue::Str(value.to_string()))
}

/// Category of the first synthesized exception in `bound`.
pub fn error_kind(bound: &BoundValue) -> Option<ErrorKind> {
    let mut found = None;
    find_error(&bound.expr, &mut found);
    found
}

fn find_error(expr: &Expr, found: &mut Option<ErrorKind>) {
    if found.is_some() {
        return;
    }
    if let Expr::NewError { kind, .. } = expr {
        *found = Some(*kind);
        return;
    }
    for child in expr.children() {
        find_error(child, found);
    }
}
