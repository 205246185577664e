//! `.ir` reader
//!
//! Validation order is fixed: magic, version, flags, checksum, then the
//! string table and payload. Declarations are rebuilt through the same
//! validating constructors the builders use, so a payload that decodes is a
//! tree that satisfies the IR invariants. Any failure aborts the whole read.

use sha2::{Digest, Sha256};

use super::bytes::IrReader;
use super::format::{Header, SerializationError, CHECKSUM_SIZE, HEADER_SIZE, MAX_DEPTH};
use super::string_table::StringTable;
use super::tags::*;
use super::writer::*;
use crate::diagnostics::{AnalysisIssue, IssueCategory, IssueId, Severity};
use crate::ir::*;
use crate::source::SourceLocation;

/// Everything recovered from an `.ir` buffer.
#[derive(Debug, Clone)]
pub struct DecodedFile {
    pub header: Header,
    pub strings: StringTable,
    pub file: FileDecl,
    /// Bytes covered by the checksum (everything but the trailer).
    pub body_len: usize,
}

/// Deserialize `.ir` bytes into a [`FileDecl`].
pub fn read_file_ir(data: &[u8]) -> Result<FileDecl, SerializationError> {
    decode(data).map(|decoded| decoded.file)
}

/// Deserialize `.ir` bytes, keeping the header and string table.
pub fn decode(data: &[u8]) -> Result<DecodedFile, SerializationError> {
    let header = Header::parse(data)?;
    let body = verify_checksum(data, &header)?;

    let mut reader = IrReader::at(body, HEADER_SIZE);
    let strings = StringTable::decode(&mut reader)?;
    let mut decoder = Decoder {
        reader,
        strings,
        debug_info: header.has_debug_info(),
        file_path: String::new(),
        depth: 0,
    };
    let file = decoder.file()?;

    if decoder.reader.has_more() {
        return Err(SerializationError::TrailingBytes {
            count: decoder.reader.remaining(),
            offset: decoder.reader.position(),
        });
    }

    tracing::debug!(file = %file.file_path, bytes = data.len(), "decoded file");
    Ok(DecodedFile {
        header,
        strings: decoder.strings,
        file,
        body_len: body.len(),
    })
}

/// Check the SHA-256 trailer and return the bytes it covers.
fn verify_checksum<'a>(data: &'a [u8], header: &Header) -> Result<&'a [u8], SerializationError> {
    if !header.has_checksum() {
        return Ok(data);
    }
    if data.len() < HEADER_SIZE + CHECKSUM_SIZE {
        return Err(SerializationError::UnexpectedEnd {
            needed: HEADER_SIZE + CHECKSUM_SIZE - data.len(),
            offset: data.len(),
        });
    }
    let split = data.len() - CHECKSUM_SIZE;
    let (body, stored) = data.split_at(split);
    let computed = Sha256::digest(body);
    if computed.as_slice() != stored {
        tracing::warn!(offset = split, "checksum mismatch");
        return Err(SerializationError::ChecksumMismatch {
            expected: hex::encode(stored),
            actual: hex::encode(computed),
            offset: split,
        });
    }
    Ok(body)
}

fn severity_from_u8(value: u8) -> Option<Severity> {
    Some(match value {
        0 => Severity::Error,
        1 => Severity::Warning,
        2 => Severity::Info,
        3 => Severity::Hint,
        _ => return None,
    })
}

fn category_from_u8(value: u8) -> Option<IssueCategory> {
    Some(match value {
        0 => IssueCategory::ControlFlow,
        1 => IssueCategory::Lifecycle,
        2 => IssueCategory::Reactivity,
        3 => IssueCategory::Performance,
        4 => IssueCategory::Provider,
        5 => IssueCategory::Unused,
        6 => IssueCategory::Adapter,
        _ => return None,
    })
}

/// Upper bound on elements reserved up front for a sequence; longer
/// sequences grow as they decode.
const MAX_RESERVE: usize = 1024;

struct Decoder<'a> {
    reader: IrReader<'a>,
    strings: StringTable,
    debug_info: bool,
    /// Filled in as soon as the payload's file path is read.
    file_path: String,
    depth: usize,
}

impl<'a> Decoder<'a> {
    // ===== Primitives =====

    fn invalid(&self, what: &'static str, value: u64, offset: usize) -> SerializationError {
        SerializationError::InvalidValue {
            what,
            value,
            offset,
        }
    }

    fn u8(&mut self) -> Result<u8, SerializationError> {
        self.reader.read_u8()
    }

    fn u32(&mut self) -> Result<u32, SerializationError> {
        self.reader.read_u32()
    }

    fn bool(&mut self) -> Result<bool, SerializationError> {
        self.reader.read_bool()
    }

    /// Presence byte of an optional value.
    fn present(&mut self) -> Result<bool, SerializationError> {
        let offset = self.reader.position();
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(self.invalid("presence flag", other as u64, offset)),
        }
    }

    fn str(&mut self) -> Result<String, SerializationError> {
        let offset = self.reader.position();
        let index = self.u32()?;
        self.strings
            .get_string(index)
            .map(str::to_string)
            .map_err(|e| e.at(offset))
    }

    fn opt_str(&mut self) -> Result<Option<String>, SerializationError> {
        if self.present()? {
            Ok(Some(self.str()?))
        } else {
            Ok(None)
        }
    }

    /// Sequence length. Every element takes at least one byte, so a count
    /// beyond the remaining input is truncation.
    fn len(&mut self) -> Result<usize, SerializationError> {
        let offset = self.reader.position();
        let count = self.u32()? as usize;
        if count > self.reader.remaining() {
            return Err(SerializationError::UnexpectedEnd {
                needed: count - self.reader.remaining(),
                offset,
            });
        }
        Ok(count)
    }

    fn seq<T>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> Result<T, SerializationError>,
    ) -> Result<Vec<T>, SerializationError> {
        let count = self.len()?;
        let mut out = Vec::with_capacity(count.min(MAX_RESERVE));
        for _ in 0..count {
            out.push(item(self)?);
        }
        Ok(out)
    }

    fn strs(&mut self) -> Result<Vec<String>, SerializationError> {
        self.seq(|d| d.str())
    }

    fn enter(&mut self) -> Result<(), SerializationError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            let offset = self.reader.position();
            return Err(self.invalid("nesting depth", self.depth as u64, offset));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn node_id(&mut self) -> Result<NodeId, SerializationError> {
        Ok(NodeId(self.u32()?))
    }

    fn location(&mut self) -> Result<SourceLocation, SerializationError> {
        if !self.debug_info {
            return Ok(SourceLocation::unknown(self.file_path.clone()));
        }
        let file = self.str()?;
        let line = self.u32()?;
        let column = self.u32()?;
        let offset = self.u32()?;
        let length = self.u32()?;
        Ok(SourceLocation::new(file, line, column, offset, length))
    }

    fn metadata(&mut self) -> Result<Option<NodeMetadata>, SerializationError> {
        if !self.debug_info || !self.present()? {
            return Ok(None);
        }
        let doc_comment = self.opt_str()?;
        let annotations = self.seq(|d| {
            let name = d.str()?;
            let arguments = d.seq(|d| d.literal())?;
            Ok(Annotation { name, arguments })
        })?;
        let synthetic = self.bool()?;
        Ok(Some(NodeMetadata {
            doc_comment,
            annotations,
            synthetic,
        }))
    }

    fn node(
        &mut self,
    ) -> Result<(NodeId, SourceLocation, Option<NodeMetadata>), SerializationError> {
        Ok((self.node_id()?, self.location()?, self.metadata()?))
    }

    fn literal(&mut self) -> Result<LiteralValue, SerializationError> {
        self.enter()?;
        let offset = self.reader.position();
        let value = match self.u8()? {
            LIT_STRING => LiteralValue::String(self.str()?),
            LIT_INT => LiteralValue::Int(self.reader.read_i64()?),
            LIT_DOUBLE => LiteralValue::Double(self.reader.read_f64()?),
            LIT_BOOL => LiteralValue::Bool(self.bool()?),
            LIT_NULL => LiteralValue::Null,
            LIT_LIST => LiteralValue::List(self.seq(|d| d.literal())?),
            LIT_MAP => LiteralValue::Map(self.seq(|d| Ok((d.str()?, d.literal()?)))?),
            other => return Err(self.invalid("literal kind", other as u64, offset)),
        };
        self.leave();
        Ok(value)
    }

    // ===== Types =====

    fn ty(&mut self) -> Result<TypeIR, SerializationError> {
        self.enter()?;
        let offset = self.reader.position();
        let ty = match self.u8()? {
            TYPE_SIMPLE => TypeIR::Simple {
                name: self.str()?,
                type_args: self.types()?,
            },
            TYPE_GENERIC => TypeIR::Generic {
                name: self.str()?,
                type_args: self.types()?,
            },
            TYPE_FUNCTION => {
                let return_type = Box::new(self.ty()?);
                let positional = self.types()?;
                let named = self.seq(|d| {
                    Ok(NamedType {
                        name: d.str()?,
                        ty: d.ty()?,
                        required: d.bool()?,
                    })
                })?;
                TypeIR::Function {
                    return_type,
                    positional,
                    named,
                }
            }
            TYPE_PARAMETER => TypeIR::TypeParameter {
                name: self.str()?,
                bound: self.opt_ty()?.map(Box::new),
            },
            TYPE_DYNAMIC => TypeIR::Dynamic,
            TYPE_VOID => TypeIR::Void,
            TYPE_NEVER => TypeIR::Never,
            TYPE_NULLABLE => {
                let base = self.ty()?;
                let inner = NullableType::new(base)
                    .map_err(|source| SerializationError::InvalidNode { source, offset })?;
                TypeIR::Nullable { inner }
            }
            tag => {
                return Err(SerializationError::UnknownTag {
                    tag,
                    context: "type",
                    offset,
                })
            }
        };
        self.leave();
        Ok(ty)
    }

    fn types(&mut self) -> Result<Vec<TypeIR>, SerializationError> {
        self.seq(|d| d.ty())
    }

    fn opt_ty(&mut self) -> Result<Option<TypeIR>, SerializationError> {
        if self.present()? {
            Ok(Some(self.ty()?))
        } else {
            Ok(None)
        }
    }

    // ===== Expressions =====

    fn expr(&mut self) -> Result<Expr, SerializationError> {
        self.enter()?;
        let offset = self.reader.position();
        let tag = self.u8()?;
        if !(EXPR_LITERAL..=EXPR_SUPER).contains(&tag) {
            return Err(SerializationError::UnknownTag {
                tag,
                context: "expression",
                offset,
            });
        }
        let (id, location, metadata) = self.node()?;
        let result_type = self.ty()?;

        let kind = match tag {
            EXPR_LITERAL => ExprKind::Literal {
                value: self.literal()?,
            },
            EXPR_IDENTIFIER => ExprKind::Identifier { name: self.str()? },
            EXPR_BINARY => {
                let op_offset = self.reader.position();
                let raw = self.u8()?;
                let op = BinaryOp::from_u8(raw)
                    .ok_or_else(|| self.invalid("binary operator", raw as u64, op_offset))?;
                ExprKind::Binary {
                    op,
                    left: Box::new(self.expr()?),
                    right: Box::new(self.expr()?),
                }
            }
            EXPR_UNARY => {
                let op_offset = self.reader.position();
                let raw = self.u8()?;
                let op = UnaryOp::from_u8(raw)
                    .ok_or_else(|| self.invalid("unary operator", raw as u64, op_offset))?;
                ExprKind::Unary {
                    op,
                    operand: Box::new(self.expr()?),
                }
            }
            EXPR_METHOD_CALL => ExprKind::MethodCall {
                target: self.opt_expr()?.map(Box::new),
                method: self.str()?,
                type_args: self.types()?,
                arguments: self.arguments()?,
                null_aware: self.bool()?,
            },
            EXPR_PROPERTY_ACCESS => ExprKind::PropertyAccess {
                target: Box::new(self.expr()?),
                property: self.str()?,
                null_aware: self.bool()?,
            },
            EXPR_INDEX_ACCESS => ExprKind::IndexAccess {
                target: Box::new(self.expr()?),
                index: Box::new(self.expr()?),
            },
            EXPR_INSTANCE_CREATION => ExprKind::InstanceCreation {
                ty: self.ty()?,
                constructor: self.opt_str()?,
                arguments: self.arguments()?,
                is_const: self.bool()?,
            },
            EXPR_CONDITIONAL => ExprKind::Conditional {
                condition: Box::new(self.expr()?),
                then_expr: Box::new(self.expr()?),
                else_expr: Box::new(self.expr()?),
            },
            EXPR_FUNCTION_LITERAL => ExprKind::FunctionLiteral {
                parameters: self.parameters()?,
                body: self.function_body()?,
                is_async: self.bool()?,
                is_generator: self.bool()?,
            },
            EXPR_LIST_LITERAL => ExprKind::ListLiteral {
                elements: self.exprs()?,
                element_type: self.opt_ty()?,
                is_const: self.bool()?,
            },
            EXPR_MAP_LITERAL => ExprKind::MapLiteral {
                entries: self.seq(|d| {
                    Ok(MapEntry {
                        key: d.expr()?,
                        value: d.expr()?,
                    })
                })?,
                key_type: self.opt_ty()?,
                value_type: self.opt_ty()?,
                is_const: self.bool()?,
            },
            EXPR_AWAIT => ExprKind::Await {
                operand: Box::new(self.expr()?),
            },
            EXPR_AS => ExprKind::As {
                operand: Box::new(self.expr()?),
                target_type: self.ty()?,
            },
            EXPR_IS => ExprKind::Is {
                operand: Box::new(self.expr()?),
                target_type: self.ty()?,
                negated: self.bool()?,
            },
            EXPR_CASCADE => ExprKind::Cascade {
                target: Box::new(self.expr()?),
                sections: self.exprs()?,
            },
            EXPR_INTERPOLATED_STRING => ExprKind::InterpolatedString {
                parts: self.seq(|d| {
                    let part_offset = d.reader.position();
                    match d.u8()? {
                        0 => Ok(StringPart::Text { text: d.str()? }),
                        1 => Ok(StringPart::Interpolation { expr: d.expr()? }),
                        other => Err(d.invalid("string part", other as u64, part_offset)),
                    }
                })?,
            },
            EXPR_THIS => ExprKind::This,
            _ => ExprKind::Super,
        };
        self.leave();
        Ok(Expr {
            id,
            location,
            metadata,
            result_type,
            kind,
        })
    }

    fn exprs(&mut self) -> Result<Vec<Expr>, SerializationError> {
        self.seq(|d| d.expr())
    }

    fn opt_expr(&mut self) -> Result<Option<Expr>, SerializationError> {
        if self.present()? {
            Ok(Some(self.expr()?))
        } else {
            Ok(None)
        }
    }

    fn arguments(&mut self) -> Result<Vec<Argument>, SerializationError> {
        self.seq(|d| {
            Ok(Argument {
                name: d.opt_str()?,
                value: d.expr()?,
            })
        })
    }

    // ===== Statements =====

    fn stmt(&mut self) -> Result<Stmt, SerializationError> {
        self.enter()?;
        let offset = self.reader.position();
        let tag = self.u8()?;
        if !(STMT_VARIABLE_DECL..=STMT_EMPTY).contains(&tag) {
            return Err(SerializationError::UnknownTag {
                tag,
                context: "statement",
                offset,
            });
        }
        let (id, location, metadata) = self.node()?;
        let labels = self.strs()?;

        let kind = match tag {
            STMT_VARIABLE_DECL => StmtKind::VariableDecl {
                decl: self.variable()?,
            },
            STMT_EXPRESSION => StmtKind::Expression { expr: self.expr()? },
            STMT_RETURN => StmtKind::Return {
                value: self.opt_expr()?,
            },
            STMT_IF => StmtKind::If {
                condition: self.expr()?,
                then_branch: Box::new(self.stmt()?),
                else_branch: self.opt_stmt()?.map(Box::new),
            },
            STMT_FOR => StmtKind::For {
                initializers: self.stmts()?,
                condition: self.opt_expr()?,
                updaters: self.exprs()?,
                body: Box::new(self.stmt()?),
            },
            STMT_FOR_EACH => StmtKind::ForEach {
                variable: self.str()?,
                variable_type: self.opt_ty()?,
                iterable: self.expr()?,
                body: Box::new(self.stmt()?),
                is_await: self.bool()?,
            },
            STMT_WHILE => StmtKind::While {
                condition: self.expr()?,
                body: Box::new(self.stmt()?),
            },
            STMT_DO_WHILE => StmtKind::DoWhile {
                body: Box::new(self.stmt()?),
                condition: self.expr()?,
            },
            STMT_SWITCH => StmtKind::Switch {
                subject: self.expr()?,
                cases: self.seq(|d| {
                    let (id, location, metadata) = d.node()?;
                    Ok(SwitchCase {
                        id,
                        location,
                        metadata,
                        patterns: d.exprs()?,
                        body: d.stmts()?,
                    })
                })?,
                default: self.opt_stmts()?,
            },
            STMT_TRY => StmtKind::Try {
                body: self.stmts()?,
                catches: self.seq(|d| {
                    let (id, location, metadata) = d.node()?;
                    Ok(CatchClause {
                        id,
                        location,
                        metadata,
                        exception_type: d.opt_ty()?,
                        exception_param: d.opt_str()?,
                        stack_trace_param: d.opt_str()?,
                        body: d.stmts()?,
                    })
                })?,
                finally: self.opt_stmts()?,
            },
            STMT_BLOCK => StmtKind::Block {
                statements: self.stmts()?,
            },
            STMT_BREAK => StmtKind::Break {
                label: self.opt_str()?,
            },
            STMT_CONTINUE => StmtKind::Continue {
                label: self.opt_str()?,
            },
            STMT_THROW => StmtKind::Throw { value: self.expr()? },
            STMT_ASSERT => StmtKind::Assert {
                condition: self.expr()?,
                message: self.opt_expr()?,
            },
            _ => StmtKind::Empty,
        };
        self.leave();
        Ok(Stmt {
            id,
            location,
            metadata,
            labels,
            kind,
        })
    }

    fn stmts(&mut self) -> Result<Vec<Stmt>, SerializationError> {
        self.seq(|d| d.stmt())
    }

    fn opt_stmt(&mut self) -> Result<Option<Stmt>, SerializationError> {
        if self.present()? {
            Ok(Some(self.stmt()?))
        } else {
            Ok(None)
        }
    }

    fn opt_stmts(&mut self) -> Result<Option<Vec<Stmt>>, SerializationError> {
        if self.present()? {
            Ok(Some(self.stmts()?))
        } else {
            Ok(None)
        }
    }

    // ===== Declarations =====

    fn storage_bits(&mut self, allowed: u8) -> Result<u8, SerializationError> {
        let offset = self.reader.position();
        let bits = self.u8()?;
        if bits & !allowed != 0 {
            return Err(self.invalid("storage flags", bits as u64, offset));
        }
        Ok(bits)
    }

    fn variable(&mut self) -> Result<VariableDecl, SerializationError> {
        let (id, location, metadata) = self.node()?;
        let name = self.str()?;
        let ty = self.ty()?;
        let initializer = self.opt_expr()?;
        let bits = self.storage_bits(STORAGE_FINAL | STORAGE_CONST | STORAGE_LATE)?;
        Ok(VariableDecl {
            id,
            location,
            metadata,
            name,
            ty,
            initializer,
            is_final: bits & STORAGE_FINAL != 0,
            is_const: bits & STORAGE_CONST != 0,
            is_late: bits & STORAGE_LATE != 0,
        })
    }

    fn field(&mut self) -> Result<FieldDecl, SerializationError> {
        let (id, location, metadata) = self.node()?;
        let name = self.str()?;
        let ty = self.ty()?;
        let initializer = self.opt_expr()?;
        let bits =
            self.storage_bits(STORAGE_FINAL | STORAGE_CONST | STORAGE_LATE | STORAGE_STATIC)?;
        Ok(FieldDecl {
            id,
            location,
            metadata,
            name,
            ty,
            initializer,
            is_final: bits & STORAGE_FINAL != 0,
            is_const: bits & STORAGE_CONST != 0,
            is_late: bits & STORAGE_LATE != 0,
            is_static: bits & STORAGE_STATIC != 0,
        })
    }

    fn parameters(&mut self) -> Result<Vec<ParameterDecl>, SerializationError> {
        self.seq(|d| {
            let offset = d.reader.position();
            let (id, location, metadata) = d.node()?;
            let name = d.str()?;
            let ty = d.ty()?;
            let bits_offset = d.reader.position();
            let bits = d.u8()?;
            let known = PARAM_NAMED
                | PARAM_POSITIONAL
                | PARAM_REQUIRED
                | PARAM_OPTIONAL
                | PARAM_FIELD_FORMAL
                | PARAM_SUPER_FORMAL;
            if bits & !known != 0 {
                return Err(d.invalid("parameter flags", bits as u64, bits_offset));
            }
            let flags = ParameterFlags {
                is_named: bits & PARAM_NAMED != 0,
                is_positional: bits & PARAM_POSITIONAL != 0,
                is_required: bits & PARAM_REQUIRED != 0,
                is_optional: bits & PARAM_OPTIONAL != 0,
                is_field_formal: bits & PARAM_FIELD_FORMAL != 0,
                is_super_formal: bits & PARAM_SUPER_FORMAL != 0,
            };
            let default_value = d.opt_expr()?;
            let mut param = ParameterDecl::new(id, location, name, ty, flags, default_value)
                .map_err(|source| SerializationError::InvalidNode { source, offset })?;
            param.metadata = metadata;
            Ok(param)
        })
    }

    fn function_body(&mut self) -> Result<FunctionBody, SerializationError> {
        let offset = self.reader.position();
        match self.u8()? {
            0 => Ok(FunctionBody::Block {
                statements: self.stmts()?,
            }),
            1 => Ok(FunctionBody::Expression {
                expr: Box::new(self.expr()?),
            }),
            other => Err(self.invalid("function body kind", other as u64, offset)),
        }
    }

    fn function(&mut self) -> Result<FunctionDecl, SerializationError> {
        let offset = self.reader.position();
        let (id, location, metadata) = self.node()?;
        let name = self.str()?;
        let return_type = self.ty()?;
        let parameters = self.parameters()?;
        let type_parameters = self.types()?;
        let body = if self.present()? {
            Some(self.function_body()?)
        } else {
            None
        };

        let bits_offset = self.reader.position();
        let bits = self.u8()?;
        let known = FN_ASYNC | FN_GENERATOR | FN_CONST | FN_ABSTRACT | FN_STATIC | FN_EXTERNAL;
        if bits & !known != 0 {
            return Err(self.invalid("function modifiers", bits as u64, bits_offset));
        }
        let modifiers = FunctionModifiers {
            is_async: bits & FN_ASYNC != 0,
            is_generator: bits & FN_GENERATOR != 0,
            is_const: bits & FN_CONST != 0,
            is_abstract: bits & FN_ABSTRACT != 0,
            is_static: bits & FN_STATIC != 0,
            is_external: bits & FN_EXTERNAL != 0,
        };

        let accessor_offset = self.reader.position();
        let accessor = match self.u8()? {
            0 => Accessor::None,
            1 => Accessor::Getter,
            2 => Accessor::Setter,
            other => return Err(self.invalid("accessor", other as u64, accessor_offset)),
        };

        let mut builder = FunctionDecl::builder(id, name)
            .location(location)
            .return_type(return_type)
            .parameters(parameters)
            .modifiers(modifiers)
            .accessor(accessor);
        for ty in type_parameters {
            builder = builder.type_parameter(ty);
        }
        builder = match body {
            Some(FunctionBody::Block { statements }) => builder.body(statements),
            Some(FunctionBody::Expression { expr }) => builder.expression_body(*expr),
            None => builder,
        };
        if let Some(metadata) = metadata {
            builder = builder.metadata(metadata);
        }
        builder
            .build()
            .map_err(|source| SerializationError::InvalidNode { source, offset })
    }

    fn method(&mut self) -> Result<MethodDecl, SerializationError> {
        let function = self.function()?;
        let class_name = self.str()?;
        let is_override = self.bool()?;
        let role_offset = self.reader.position();
        let lifecycle = match self.u8()? {
            0 => LifecycleRole::None,
            1 => LifecycleRole::Init,
            2 => LifecycleRole::Dispose,
            3 => LifecycleRole::Build {
                context_param: self.opt_str()?,
            },
            4 => LifecycleRole::DidUpdateWidget {
                old_widget_param: self.opt_str()?,
            },
            5 => LifecycleRole::Other { hook: self.str()? },
            other => return Err(self.invalid("lifecycle role", other as u64, role_offset)),
        };
        Ok(MethodDecl {
            function,
            class_name,
            is_override,
            lifecycle,
        })
    }

    fn invocation(&mut self) -> Result<Option<ConstructorInvocation>, SerializationError> {
        if !self.present()? {
            return Ok(None);
        }
        Ok(Some(ConstructorInvocation {
            constructor_name: self.opt_str()?,
            arguments: self.arguments()?,
        }))
    }

    fn constructor(&mut self) -> Result<ConstructorDecl, SerializationError> {
        let offset = self.reader.position();
        let function = self.function()?;
        let class_name = self.str()?;
        let constructor_name = self.opt_str()?;
        let initializers = self.seq(|d| {
            Ok(FieldInitializer {
                field: d.str()?,
                value: d.expr()?,
            })
        })?;
        let super_call = self.invocation()?;
        let redirect = self.invocation()?;
        let is_factory = self.bool()?;
        ConstructorDecl::new(
            function,
            class_name,
            constructor_name,
            initializers,
            super_call,
            redirect,
            is_factory,
        )
        .map_err(|source| SerializationError::InvalidNode { source, offset })
    }

    fn component(&mut self) -> Result<ComponentProfile, SerializationError> {
        let offset = self.reader.position();
        let kind = match self.u8()? {
            0 => ComponentKind::StatefulWidget {
                state_class: self.str()?,
            },
            1 => {
                let widget_class = self.str()?;
                let widget = if self.present()? {
                    Some(self.node_id()?)
                } else {
                    None
                };
                ComponentKind::State {
                    widget_class,
                    widget,
                }
            }
            2 => ComponentKind::Stateless,
            other => return Err(self.invalid("component kind", other as u64, offset)),
        };
        let reactive_fields = self.seq(|d| {
            Ok(ReactiveField {
                name: d.str()?,
                triggers_rebuild: d.bool()?,
                is_late: d.bool()?,
            })
        })?;
        let resources = self.seq(|d| {
            let name = d.str()?;
            let type_name = d.str()?;
            let kind_offset = d.reader.position();
            let kind = match d.u8()? {
                0 => ResourceKind::Controller,
                1 => ResourceKind::Subscription,
                other => return Err(d.invalid("resource kind", other as u64, kind_offset)),
            };
            Ok(ManagedResource {
                name,
                type_name,
                kind,
            })
        })?;
        Ok(ComponentProfile {
            kind,
            reactive_fields,
            resources,
        })
    }

    fn provider(&mut self) -> Result<ProviderProfile, SerializationError> {
        let notify_calls = self.seq(|d| {
            Ok(NotifyCall {
                method: d.str()?,
                location: d.location()?,
            })
        })?;
        let consumers = self.strs()?;
        let mutations = self.seq(|d| {
            Ok(StateMutation {
                field: d.str()?,
                method: d.str()?,
                location: d.location()?,
            })
        })?;
        let depends_on = self.strs()?;
        Ok(ProviderProfile {
            notify_calls,
            consumers,
            mutations,
            depends_on,
        })
    }

    fn class(&mut self) -> Result<ClassDecl, SerializationError> {
        let (id, location, metadata) = self.node()?;
        let name = self.str()?;
        let superclass = self.opt_ty()?;
        let interfaces = self.types()?;
        let mixins = self.types()?;
        let type_parameters = self.types()?;
        let fields = self.seq(|d| d.field())?;
        let methods = self.seq(|d| d.method())?;
        let constructors = self.seq(|d| d.constructor())?;

        let bits_offset = self.reader.position();
        let bits = self.u8()?;
        if bits & !0b111 != 0 {
            return Err(self.invalid("class flags", bits as u64, bits_offset));
        }
        let component = if self.present()? {
            Some(self.component()?)
        } else {
            None
        };
        let provider = if self.present()? {
            Some(self.provider()?)
        } else {
            None
        };
        Ok(ClassDecl {
            id,
            location,
            metadata,
            name,
            superclass,
            interfaces,
            mixins,
            type_parameters,
            fields,
            methods,
            constructors,
            is_abstract: bits & 1 != 0,
            is_final: bits & 2 != 0,
            is_sealed: bits & 4 != 0,
            component,
            provider,
        })
    }

    fn import(&mut self) -> Result<ImportDecl, SerializationError> {
        let (id, location, metadata) = self.node()?;
        Ok(ImportDecl {
            id,
            location,
            metadata,
            uri: self.str()?,
            prefix: self.opt_str()?,
            show: self.strs()?,
            hide: self.strs()?,
            is_deferred: self.bool()?,
        })
    }

    fn export(&mut self) -> Result<ExportDecl, SerializationError> {
        let (id, location, metadata) = self.node()?;
        Ok(ExportDecl {
            id,
            location,
            metadata,
            uri: self.str()?,
            show: self.strs()?,
            hide: self.strs()?,
        })
    }

    fn issue(&mut self) -> Result<AnalysisIssue, SerializationError> {
        let id = IssueId(self.u32()?);
        let code = self.str()?;
        let severity_offset = self.reader.position();
        let raw = self.u8()?;
        let severity = severity_from_u8(raw)
            .ok_or_else(|| self.invalid("severity", raw as u64, severity_offset))?;
        let category_offset = self.reader.position();
        let raw = self.u8()?;
        let category = category_from_u8(raw)
            .ok_or_else(|| self.invalid("issue category", raw as u64, category_offset))?;
        Ok(AnalysisIssue {
            id,
            code,
            severity,
            category,
            message: self.str()?,
            suggestion: self.opt_str()?,
            location: self.location()?,
        })
    }

    fn file(&mut self) -> Result<FileDecl, SerializationError> {
        let file_path = self.str()?;
        self.file_path = file_path.clone();
        let content_hash = self.str()?;
        let library_name = self.str()?;
        let analyzed_at = self.reader.read_u64()?;
        Ok(FileDecl {
            file_path,
            content_hash,
            library_name,
            analyzed_at,
            imports: self.seq(|d| d.import())?,
            exports: self.seq(|d| d.export())?,
            variables: self.seq(|d| d.variable())?,
            functions: self.seq(|d| d.function())?,
            classes: self.seq(|d| d.class())?,
            issues: self.seq(|d| d.issue())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::IrWriter;

    fn decoder(data: &[u8]) -> Decoder<'_> {
        Decoder {
            reader: IrReader::at(data, 0),
            strings: StringTable::new(),
            debug_info: false,
            file_path: String::new(),
            depth: 0,
        }
    }

    fn counted(count: u32, items: usize) -> Vec<u8> {
        let mut out = IrWriter::new();
        out.emit_u32(count);
        for i in 0..items {
            out.emit_u8(i as u8);
        }
        out.into_bytes()
    }

    #[test]
    fn test_sequence_longer_than_reserve_decodes_fully() {
        let count = MAX_RESERVE * 3 + 7;
        let data = counted(count as u32, count);
        let items = decoder(&data).seq(|d| d.u8()).unwrap();
        assert_eq!(items.len(), count);
        assert_eq!(items[MAX_RESERVE], MAX_RESERVE as u8);
    }

    #[test]
    fn test_inflated_count_is_truncation() {
        let data = counted(u32::MAX, 16);
        match decoder(&data).seq(|d| d.u8()) {
            Err(SerializationError::UnexpectedEnd { offset, .. }) => assert_eq!(offset, 0),
            other => panic!("expected UnexpectedEnd, got {:?}", other),
        }
    }

    #[test]
    fn test_count_within_input_but_short_items_fails_cleanly() {
        // 4096 claimed, bytes enough for the count check, items need 4 each.
        let data = counted(4096, 4096);
        assert!(decoder(&data).seq(|d| d.u32()).is_err());
    }
}
