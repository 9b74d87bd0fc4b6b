//! Computation trees.
//!
//! An [`Expr`] is the computation half of a bound plan. The binder only builds
//! these trees; compiling or interpreting them belongs to the host. Every node
//! reports its static type through [`Expr::ty`], which is what plan widening
//! operates on.

use std::sync::Arc;

use ordered_float::OrderedFloat;

use crate::{ErrorKind, MemberDescriptor, MethodEntry, TypeHash, primitives};

/// Type of `object[]`, used for packed reflective argument arrays.
pub const OBJECT_ARRAY: TypeHash = TypeHash::from_name("object[]");

/// A constant value embedded in a computation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(OrderedFloat<f64>),
    Char(char),
    Str(String),
}

impl Literal {
    /// Type a literal has when no explicit type is given.
    pub fn natural_type(&self) -> TypeHash {
        match self {
            Literal::Null => primitives::NULL,
            Literal::Bool(_) => primitives::BOOL,
            Literal::Int(_) => primitives::INT32,
            Literal::UInt(_) => primitives::UINT32,
            Literal::Float(_) => primitives::DOUBLE,
            Literal::Char(_) => primitives::CHAR,
            Literal::Str(_) => primitives::STRING,
        }
    }
}

/// A temporary declared by a plan; scoped around the whole plan body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Temp {
    pub id: u32,
    pub ty: TypeHash,
}

/// Primitive unary operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Arithmetic negation.
    Negate,
    /// Logical not.
    Not,
    /// Bitwise complement.
    OnesComplement,
}

/// Primitive binary operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    And,
    Or,
    ExclusiveOr,
    LeftShift,
    RightShift,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    /// Short-circuit conjunction.
    AndAlso,
}

impl BinaryOp {
    /// Whether the operation produces a `bool`.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::LessThan
                | BinaryOp::LessThanOrEqual
                | BinaryOp::GreaterThan
                | BinaryOp::GreaterThanOrEqual
                | BinaryOp::AndAlso
        )
    }
}

/// A node in a computation tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A constant.
    Constant { value: Literal, ty: TypeHash },
    /// The call-site argument at `index`.
    Argument { index: usize, ty: TypeHash },
    /// A plan temporary.
    Temp(Temp),
    /// A type used as a value (static context).
    TypeValue(TypeHash),
    /// A member descriptor used as a value.
    Descriptor(Arc<MemberDescriptor>),
    /// An overload set used as a value.
    MemberGroup(Vec<Arc<MemberDescriptor>>),
    /// Direct field read; `instance` is `None` for static fields.
    Field {
        instance: Option<Box<Expr>>,
        field: TypeHash,
        ty: TypeHash,
    },
    /// Field read through reflection; crosses visibility boundaries.
    ReflectiveGetField {
        instance: Option<Box<Expr>>,
        field: TypeHash,
    },
    /// Field write through reflection; crosses visibility boundaries.
    ReflectiveSetField {
        instance: Option<Box<Expr>>,
        field: TypeHash,
        value: Box<Expr>,
    },
    /// Assignment; evaluates to the assigned value.
    Assign { target: Box<Expr>, value: Box<Expr> },
    /// Direct method call.
    Call {
        method: TypeHash,
        instance: Option<Box<Expr>>,
        args: Vec<Expr>,
        ty: TypeHash,
    },
    /// Method call through reflection with a packed `object[]` of arguments.
    ReflectiveInvoke {
        method: TypeHash,
        instance: Option<Box<Expr>>,
        args: Box<Expr>,
    },
    /// Array construction.
    NewArray {
        element: TypeHash,
        items: Vec<Expr>,
        ty: TypeHash,
    },
    /// Array element access.
    ArrayIndex {
        array: Box<Expr>,
        index: Box<Expr>,
        ty: TypeHash,
    },
    /// Conversion to `ty`.
    Convert { expr: Box<Expr>, ty: TypeHash },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        ty: TypeHash,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        ty: TypeHash,
    },
    /// Exact runtime type test.
    TypeIs { expr: Box<Expr>, test: TypeHash },
    /// `test ? if_true : if_false`.
    Condition {
        test: Box<Expr>,
        if_true: Box<Expr>,
        if_false: Box<Expr>,
        ty: TypeHash,
    },
    /// Sequence with scoped temporaries; evaluates to its last expression.
    Block { temps: Vec<Temp>, body: Vec<Expr> },
    /// Construct an exception object.
    NewError { kind: ErrorKind, message: String },
    /// Raise an exception; typed as `ty` so it can sit in any branch.
    Throw { error: Box<Expr>, ty: TypeHash },
    /// Check that `value` is the result of an in-place add/remove on the event.
    ValidateEventAssign {
        event: TypeHash,
        instance: Option<Box<Expr>>,
        value: Box<Expr>,
    },
}

impl Expr {
    // === Constructors ===

    /// A constant with its natural type.
    pub fn constant(value: Literal) -> Self {
        let ty = value.natural_type();
        Expr::Constant { value, ty }
    }

    /// A constant with an explicit type.
    pub fn typed_constant(value: Literal, ty: TypeHash) -> Self {
        Expr::Constant { value, ty }
    }

    pub fn null() -> Self {
        Expr::constant(Literal::Null)
    }

    pub fn bool(value: bool) -> Self {
        Expr::constant(Literal::Bool(value))
    }

    pub fn int(value: i64) -> Self {
        Expr::constant(Literal::Int(value))
    }

    pub fn argument(index: usize, ty: TypeHash) -> Self {
        Expr::Argument { index, ty }
    }

    pub fn descriptor(desc: Arc<MemberDescriptor>) -> Self {
        Expr::Descriptor(desc)
    }

    /// Direct call of `method`, typed by its return type.
    pub fn call(method: &MethodEntry, instance: Option<Expr>, args: Vec<Expr>) -> Self {
        Expr::Call {
            method: method.method_hash,
            instance: instance.map(Box::new),
            args,
            ty: method.return_type,
        }
    }

    /// Convert to `ty`, skipping the node when the type already matches.
    pub fn convert(self, ty: TypeHash) -> Self {
        if self.ty() == ty {
            self
        } else {
            Expr::Convert {
                expr: Box::new(self),
                ty,
            }
        }
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        Expr::Assign {
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    pub fn not(self) -> Self {
        Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(self),
            ty: primitives::BOOL,
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr, ty: TypeHash) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            ty,
        }
    }

    pub fn and_also(left: Expr, right: Expr) -> Self {
        Expr::binary(BinaryOp::AndAlso, left, right, primitives::BOOL)
    }

    pub fn type_is(expr: Expr, test: TypeHash) -> Self {
        Expr::TypeIs {
            expr: Box::new(expr),
            test,
        }
    }

    pub fn condition(test: Expr, if_true: Expr, if_false: Expr, ty: TypeHash) -> Self {
        Expr::Condition {
            test: Box::new(test),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
            ty,
        }
    }

    pub fn block(temps: Vec<Temp>, body: Vec<Expr>) -> Self {
        Expr::Block { temps, body }
    }

    /// An exception object of the given category.
    pub fn new_error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Expr::NewError {
            kind,
            message: message.into(),
        }
    }

    /// Raise `error`, typed as `ty`.
    pub fn throw(error: Expr, ty: TypeHash) -> Self {
        Expr::Throw {
            error: Box::new(error),
            ty,
        }
    }

    /// Pack expressions into an `object[]`.
    pub fn object_array(items: Vec<Expr>) -> Self {
        Expr::NewArray {
            element: primitives::OBJECT,
            items: items
                .into_iter()
                .map(|e| e.convert(primitives::OBJECT))
                .collect(),
            ty: OBJECT_ARRAY,
        }
    }

    // === Queries ===

    /// Static type of the value this node produces.
    pub fn ty(&self) -> TypeHash {
        match self {
            Expr::Constant { ty, .. }
            | Expr::Argument { ty, .. }
            | Expr::Field { ty, .. }
            | Expr::Call { ty, .. }
            | Expr::NewArray { ty, .. }
            | Expr::ArrayIndex { ty, .. }
            | Expr::Convert { ty, .. }
            | Expr::Unary { ty, .. }
            | Expr::Binary { ty, .. }
            | Expr::Condition { ty, .. }
            | Expr::Throw { ty, .. } => *ty,
            Expr::Temp(temp) => temp.ty,
            Expr::TypeValue(_) => primitives::TYPE,
            Expr::Descriptor(_)
            | Expr::MemberGroup(_)
            | Expr::ReflectiveGetField { .. }
            | Expr::ReflectiveInvoke { .. } => primitives::OBJECT,
            Expr::ReflectiveSetField { .. } | Expr::ValidateEventAssign { .. } => {
                primitives::VOID
            }
            Expr::Assign { target, .. } => target.ty(),
            Expr::TypeIs { .. } => primitives::BOOL,
            Expr::Block { body, .. } => body.last().map_or(primitives::VOID, Expr::ty),
            Expr::NewError { .. } => primitives::EXCEPTION,
        }
    }

    /// Direct children of this node.
    pub fn children(&self) -> Vec<&Expr> {
        fn opt(e: &Option<Box<Expr>>) -> impl Iterator<Item = &Expr> {
            e.as_deref().into_iter()
        }
        match self {
            Expr::Constant { .. }
            | Expr::Argument { .. }
            | Expr::Temp(_)
            | Expr::TypeValue(_)
            | Expr::Descriptor(_)
            | Expr::MemberGroup(_)
            | Expr::NewError { .. } => Vec::new(),
            Expr::Field { instance, .. } | Expr::ReflectiveGetField { instance, .. } => {
                opt(instance).collect()
            }
            Expr::ReflectiveSetField {
                instance, value, ..
            }
            | Expr::ValidateEventAssign {
                instance, value, ..
            } => opt(instance).chain(std::iter::once(value.as_ref())).collect(),
            Expr::Assign { target, value } => vec![target, value],
            Expr::Call { instance, args, .. } => opt(instance).chain(args.iter()).collect(),
            Expr::ReflectiveInvoke { instance, args, .. } => {
                opt(instance).chain(std::iter::once(args.as_ref())).collect()
            }
            Expr::NewArray { items, .. } => items.iter().collect(),
            Expr::ArrayIndex { array, index, .. } => vec![array, index],
            Expr::Convert { expr, .. } | Expr::TypeIs { expr, .. } => vec![expr],
            Expr::Unary { operand, .. } => vec![operand],
            Expr::Binary { left, right, .. } => vec![left, right],
            Expr::Condition {
                test,
                if_true,
                if_false,
                ..
            } => vec![test, if_true, if_false],
            Expr::Block { body, .. } => body.iter().collect(),
            Expr::Throw { error, .. } => vec![error],
        }
    }

    /// Whether this node or any descendant satisfies `pred`.
    pub fn any(&self, pred: &impl Fn(&Expr) -> bool) -> bool {
        pred(self) || self.children().into_iter().any(|child| child.any(pred))
    }

    /// Whether evaluating this node always raises.
    pub fn is_throw(&self) -> bool {
        matches!(self, Expr::Throw { .. })
    }
}
