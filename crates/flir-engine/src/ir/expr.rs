//! Expression IR nodes
//!
//! Every expression owns its children exclusively and carries the result
//! type reported by the upstream resolver (`dynamic` when unresolved).

use serde::{Deserialize, Serialize};

use super::decl::{FunctionBody, ParameterDecl};
use super::node::{LiteralValue, NodeId, NodeMetadata};
use super::types::TypeIR;
use crate::source::SourceLocation;

/// Expression node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub id: NodeId,
    pub location: SourceLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NodeMetadata>,
    #[serde(default)]
    pub result_type: TypeIR,
    pub kind: ExprKind,
}

/// Closed set of expression forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "expr", rename_all = "snake_case")]
pub enum ExprKind {
    /// `42`, `'text'`, `null`, `const [1, 2]`
    Literal { value: LiteralValue },

    /// `count`
    Identifier { name: String },

    /// `a + b`, `a ?? b`, `x = y`, `x += 1`
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `!a`, `-a`, `i++`, `value!`
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// `setState(() {})`, `controller.dispose()`, `list?.add(x)`
    MethodCall {
        #[serde(default)]
        target: Option<Box<Expr>>,
        method: String,
        #[serde(default)]
        type_args: Vec<TypeIR>,
        #[serde(default)]
        arguments: Vec<Argument>,
        #[serde(default)]
        null_aware: bool,
    },

    /// `widget.title`, `user?.name`
    PropertyAccess {
        target: Box<Expr>,
        property: String,
        #[serde(default)]
        null_aware: bool,
    },

    /// `items[i]`
    IndexAccess { target: Box<Expr>, index: Box<Expr> },

    /// `Text('hi')`, `const EdgeInsets.all(8)`
    InstanceCreation {
        ty: TypeIR,
        #[serde(default)]
        constructor: Option<String>,
        #[serde(default)]
        arguments: Vec<Argument>,
        #[serde(default)]
        is_const: bool,
    },

    /// `c ? a : b`
    Conditional {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },

    /// `(x) => x + 1`, `() async { ... }`
    FunctionLiteral {
        #[serde(default)]
        parameters: Vec<ParameterDecl>,
        body: FunctionBody,
        #[serde(default)]
        is_async: bool,
        #[serde(default)]
        is_generator: bool,
    },

    /// `[a, b]`
    ListLiteral {
        #[serde(default)]
        elements: Vec<Expr>,
        #[serde(default)]
        element_type: Option<TypeIR>,
        #[serde(default)]
        is_const: bool,
    },

    /// `{'a': 1}`
    MapLiteral {
        #[serde(default)]
        entries: Vec<MapEntry>,
        #[serde(default)]
        key_type: Option<TypeIR>,
        #[serde(default)]
        value_type: Option<TypeIR>,
        #[serde(default)]
        is_const: bool,
    },

    /// `await future`
    Await { operand: Box<Expr> },

    /// `value as String`
    As {
        operand: Box<Expr>,
        target_type: TypeIR,
    },

    /// `value is String`, `value is! String`
    Is {
        operand: Box<Expr>,
        target_type: TypeIR,
        #[serde(default)]
        negated: bool,
    },

    /// `paint..color = c..strokeWidth = 2`
    ///
    /// Sections apply to the target; method-call sections have no explicit
    /// target of their own.
    Cascade {
        target: Box<Expr>,
        sections: Vec<Expr>,
    },

    /// `'Hello $name'`
    InterpolatedString { parts: Vec<StringPart> },

    /// `this`
    This,

    /// `super`
    Super,
}

/// Call argument, positional or named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    #[serde(default)]
    pub name: Option<String>,
    pub value: Expr,
}

impl Argument {
    pub fn positional(value: Expr) -> Self {
        Self { name: None, value }
    }

    pub fn named(name: impl Into<String>, value: Expr) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }
}

/// `key: value` entry of a map literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEntry {
    pub key: Expr,
    pub value: Expr,
}

/// Segment of an interpolated string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "part", rename_all = "snake_case")]
pub enum StringPart {
    Text { text: String },
    Interpolation { expr: Expr },
}

/// Binary operators, including assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    IntDiv,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    IfNull,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    IfNullAssign,
}

impl BinaryOp {
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            BinaryOp::Assign
                | BinaryOp::AddAssign
                | BinaryOp::SubAssign
                | BinaryOp::MulAssign
                | BinaryOp::DivAssign
                | BinaryOp::IfNullAssign
        )
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::IntDiv => "~/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::IfNull => "??",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Assign => "=",
            BinaryOp::AddAssign => "+=",
            BinaryOp::SubAssign => "-=",
            BinaryOp::MulAssign => "*=",
            BinaryOp::DivAssign => "/=",
            BinaryOp::IfNullAssign => "??=",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
    /// `value!`
    NullCheck,
}

impl UnaryOp {
    /// Whether the operator writes to its operand.
    pub fn is_update(self) -> bool {
        matches!(
            self,
            UnaryOp::PreIncrement
                | UnaryOp::PreDecrement
                | UnaryOp::PostIncrement
                | UnaryOp::PostDecrement
        )
    }
}

impl Expr {
    pub fn new(id: NodeId, location: SourceLocation, result_type: TypeIR, kind: ExprKind) -> Self {
        Self {
            id,
            location,
            metadata: None,
            result_type,
            kind,
        }
    }

    /// Name referenced by an identifier, or by a property access on `this`.
    ///
    /// `count` and `this.count` both refer to the member `count`.
    pub fn member_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Identifier { name } => Some(name),
            ExprKind::PropertyAccess {
                target, property, ..
            } if matches!(target.kind, ExprKind::This) => Some(property),
            _ => None,
        }
    }

    /// Whether this is `super.<method>(...)`.
    pub fn is_super_call(&self, method_name: &str) -> bool {
        match &self.kind {
            ExprKind::MethodCall {
                target: Some(target),
                method,
                ..
            } => matches!(target.kind, ExprKind::Super) && method == method_name,
            _ => false,
        }
    }

    /// Whether this is a call to `method_name` on `this` or with no receiver.
    pub fn is_self_call(&self, method_name: &str) -> bool {
        match &self.kind {
            ExprKind::MethodCall { target, method, .. } => {
                method == method_name
                    && target
                        .as_ref()
                        .map_or(true, |t| matches!(t.kind, ExprKind::This))
            }
            _ => false,
        }
    }

    pub fn is_literal_true(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Literal {
                value: LiteralValue::Bool(true)
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(id: u32, name: &str) -> Expr {
        Expr::new(
            NodeId(id),
            SourceLocation::unknown("t.dart"),
            TypeIR::Dynamic,
            ExprKind::Identifier {
                name: name.to_string(),
            },
        )
    }

    #[test]
    fn test_member_name_through_this() {
        let this = Expr::new(
            NodeId(1),
            SourceLocation::unknown("t.dart"),
            TypeIR::Dynamic,
            ExprKind::This,
        );
        let access = Expr::new(
            NodeId(2),
            SourceLocation::unknown("t.dart"),
            TypeIR::simple("int"),
            ExprKind::PropertyAccess {
                target: Box::new(this),
                property: "count".to_string(),
                null_aware: false,
            },
        );
        assert_eq!(access.member_name(), Some("count"));
        assert_eq!(ident(3, "x").member_name(), Some("x"));
    }

    #[test]
    fn test_super_call_detection() {
        let sup = Expr::new(
            NodeId(1),
            SourceLocation::unknown("t.dart"),
            TypeIR::Dynamic,
            ExprKind::Super,
        );
        let call = Expr::new(
            NodeId(2),
            SourceLocation::unknown("t.dart"),
            TypeIR::Void,
            ExprKind::MethodCall {
                target: Some(Box::new(sup)),
                method: "initState".to_string(),
                type_args: vec![],
                arguments: vec![],
                null_aware: false,
            },
        );
        assert!(call.is_super_call("initState"));
        assert!(!call.is_super_call("dispose"));
        assert!(!call.is_self_call("initState"));
    }

    #[test]
    fn test_assignment_ops() {
        assert!(BinaryOp::IfNullAssign.is_assignment());
        assert!(!BinaryOp::IfNull.is_assignment());
        assert!(UnaryOp::PostIncrement.is_update());
        assert!(!UnaryOp::NullCheck.is_update());
    }
}
