//! Error/result taxonomy.
//!
//! Failures a user can cause (missing member, read-only member, ...) are not
//! returned as `Err`. They are built into the plan so a call-site cache can
//! replay them as cheaply as a success. [`ErrorInfo`] tags such a synthesized
//! computation with how the host should treat it.

use latebind_core::{ErrorKind, Expr, TypeHash};

use crate::{BoundValue, GuardSet};

/// How a synthesized computation should be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorResultKind {
    /// The payload is an exception object to raise.
    Exception,
    /// The payload is a substitute return value signalling failure.
    ErrorValue,
    /// The payload is a legitimate result.
    SuccessValue,
}

/// A synthesized computation with its [`ErrorResultKind`].
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorInfo {
    kind: ErrorResultKind,
    expr: Expr,
}

impl ErrorInfo {
    /// `exception` must be raised.
    pub fn from_exception(exception: Expr) -> Self {
        Self {
            kind: ErrorResultKind::Exception,
            expr: exception,
        }
    }

    /// `value` is returned in place of a result.
    pub fn from_value(value: Expr) -> Self {
        Self {
            kind: ErrorResultKind::ErrorValue,
            expr: value,
        }
    }

    /// `value` is the result.
    pub fn from_success(value: Expr) -> Self {
        Self {
            kind: ErrorResultKind::SuccessValue,
            expr: value,
        }
    }

    /// Exception of category `kind` carrying `message`.
    pub fn exception(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::from_exception(Expr::new_error(kind, message))
    }

    pub fn kind(&self) -> ErrorResultKind {
        self.kind
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn is_error(&self) -> bool {
        self.kind != ErrorResultKind::SuccessValue
    }

    /// Category of the carried exception, if it is a synthesized one.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match (&self.kind, &self.expr) {
            (ErrorResultKind::Exception, Expr::NewError { kind, .. }) => Some(*kind),
            _ => None,
        }
    }

    /// The computation to place in a plan; exceptions become a throw typed `ty`.
    pub fn into_expr(self, ty: TypeHash) -> Expr {
        match self.kind {
            ErrorResultKind::Exception => Expr::throw(self.expr, ty),
            ErrorResultKind::ErrorValue | ErrorResultKind::SuccessValue => self.expr,
        }
    }

    /// Wrap into a bound value valid under `guards`.
    pub fn into_bound(self, guards: GuardSet, ty: TypeHash) -> BoundValue {
        let is_error = self.is_error();
        let mut bound = BoundValue::new(self.into_expr(ty), guards);
        bound.is_error = is_error;
        bound
    }
}
