//! Node tag assignments
//!
//! Every expression, statement and type node is preceded by one tag byte.
//! The ranges are disjoint so a misrouted byte is caught as an unknown tag.
//! `0xF0..=0xFE` are reserved as the first byte of a future two-byte tag
//! and `0xFF` is the explicit unknown tag; this version writes neither.

use crate::ir::{BinaryOp, UnaryOp};

// ===== Expressions (0x01..=0x3F) =====

pub const EXPR_LITERAL: u8 = 0x01;
pub const EXPR_IDENTIFIER: u8 = 0x02;
pub const EXPR_BINARY: u8 = 0x03;
pub const EXPR_UNARY: u8 = 0x04;
pub const EXPR_METHOD_CALL: u8 = 0x05;
pub const EXPR_PROPERTY_ACCESS: u8 = 0x06;
pub const EXPR_INDEX_ACCESS: u8 = 0x07;
pub const EXPR_INSTANCE_CREATION: u8 = 0x08;
pub const EXPR_CONDITIONAL: u8 = 0x09;
pub const EXPR_FUNCTION_LITERAL: u8 = 0x0A;
pub const EXPR_LIST_LITERAL: u8 = 0x0B;
pub const EXPR_MAP_LITERAL: u8 = 0x0C;
pub const EXPR_AWAIT: u8 = 0x0D;
pub const EXPR_AS: u8 = 0x0E;
pub const EXPR_IS: u8 = 0x0F;
pub const EXPR_CASCADE: u8 = 0x10;
pub const EXPR_INTERPOLATED_STRING: u8 = 0x11;
pub const EXPR_THIS: u8 = 0x12;
pub const EXPR_SUPER: u8 = 0x13;

// ===== Statements (0x40..=0x7F) =====

pub const STMT_VARIABLE_DECL: u8 = 0x40;
pub const STMT_EXPRESSION: u8 = 0x41;
pub const STMT_RETURN: u8 = 0x42;
pub const STMT_IF: u8 = 0x43;
pub const STMT_FOR: u8 = 0x44;
pub const STMT_FOR_EACH: u8 = 0x45;
pub const STMT_WHILE: u8 = 0x46;
pub const STMT_DO_WHILE: u8 = 0x47;
pub const STMT_SWITCH: u8 = 0x48;
pub const STMT_TRY: u8 = 0x49;
pub const STMT_BLOCK: u8 = 0x4A;
pub const STMT_BREAK: u8 = 0x4B;
pub const STMT_CONTINUE: u8 = 0x4C;
pub const STMT_THROW: u8 = 0x4D;
pub const STMT_ASSERT: u8 = 0x4E;
pub const STMT_EMPTY: u8 = 0x4F;

// ===== Types (0x80..=0xBF) =====

pub const TYPE_SIMPLE: u8 = 0x80;
pub const TYPE_GENERIC: u8 = 0x81;
pub const TYPE_FUNCTION: u8 = 0x82;
pub const TYPE_PARAMETER: u8 = 0x83;
pub const TYPE_DYNAMIC: u8 = 0x84;
pub const TYPE_VOID: u8 = 0x85;
pub const TYPE_NEVER: u8 = 0x86;
pub const TYPE_NULLABLE: u8 = 0x87;

// ===== Reserved =====

/// First byte of a future two-byte tag
pub const RESERVED_START: u8 = 0xF0;
/// Explicit unknown node
pub const UNKNOWN: u8 = 0xFF;

pub fn is_reserved(tag: u8) -> bool {
    tag >= RESERVED_START
}

// ===== Literal value kinds =====

pub const LIT_STRING: u8 = 0;
pub const LIT_INT: u8 = 1;
pub const LIT_DOUBLE: u8 = 2;
pub const LIT_BOOL: u8 = 3;
pub const LIT_NULL: u8 = 4;
pub const LIT_LIST: u8 = 5;
pub const LIT_MAP: u8 = 6;

// ===== Operators =====

/// Binary operators in wire order.
const BINARY_OPS: [BinaryOp; 26] = [
    BinaryOp::Add,
    BinaryOp::Sub,
    BinaryOp::Mul,
    BinaryOp::Div,
    BinaryOp::IntDiv,
    BinaryOp::Mod,
    BinaryOp::Eq,
    BinaryOp::NotEq,
    BinaryOp::Lt,
    BinaryOp::LtEq,
    BinaryOp::Gt,
    BinaryOp::GtEq,
    BinaryOp::And,
    BinaryOp::Or,
    BinaryOp::IfNull,
    BinaryOp::BitAnd,
    BinaryOp::BitOr,
    BinaryOp::BitXor,
    BinaryOp::Shl,
    BinaryOp::Shr,
    BinaryOp::Assign,
    BinaryOp::AddAssign,
    BinaryOp::SubAssign,
    BinaryOp::MulAssign,
    BinaryOp::DivAssign,
    BinaryOp::IfNullAssign,
];

/// Unary operators in wire order.
const UNARY_OPS: [UnaryOp; 8] = [
    UnaryOp::Neg,
    UnaryOp::Not,
    UnaryOp::BitNot,
    UnaryOp::PreIncrement,
    UnaryOp::PreDecrement,
    UnaryOp::PostIncrement,
    UnaryOp::PostDecrement,
    UnaryOp::NullCheck,
];

impl BinaryOp {
    pub(crate) fn to_u8(self) -> u8 {
        self as u8
    }

    pub(crate) fn from_u8(value: u8) -> Option<Self> {
        BINARY_OPS.get(value as usize).copied()
    }
}

impl UnaryOp {
    pub(crate) fn to_u8(self) -> u8 {
        self as u8
    }

    pub(crate) fn from_u8(value: u8) -> Option<Self> {
        UNARY_OPS.get(value as usize).copied()
    }
}
