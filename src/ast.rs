use crate::token::{Literal, Span, Token};

/// A name as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    #[must_use]
    pub fn from_token(token: &Token) -> Self {
        Self {
            name: token.text.clone(),
            span: token.span,
        }
    }
}

/// A sequence of statements inside a block construct.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

/// Statement nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assignment(AssignmentStatement),
    DottedSet(DottedSetStatement),
    IndexedSet(IndexedSetStatement),
    Increment(IncrementStatement),
    Expression(ExpressionStatement),
    Print(PrintStatement),
    If(IfStatement),
    While(WhileStatement),
    For(ForStatement),
    ForEach(ForEachStatement),
    Exit(ExitStatement),
    Function(FunctionStatement),
    Return(ReturnStatement),
    Goto(GotoStatement),
    Label(LabelStatement),
    Dim(DimStatement),
    End(Span),
    Stop(Span),
}

impl Statement {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Assignment(s) => s.span,
            Self::DottedSet(s) => s.span,
            Self::IndexedSet(s) => s.span,
            Self::Increment(s) => s.span,
            Self::Expression(s) => s.span,
            Self::Print(s) => s.span,
            Self::If(s) => s.span,
            Self::While(s) => s.span,
            Self::For(s) => s.span,
            Self::ForEach(s) => s.span,
            Self::Exit(s) => s.span,
            Self::Function(s) => s.span,
            Self::Return(s) => s.span,
            Self::Goto(s) => s.span,
            Self::Label(s) => s.span,
            Self::Dim(s) => s.span,
            Self::End(span) | Self::Stop(span) => *span,
        }
    }
}

/// Operator of an assignment: plain `=` or a compound form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOperator {
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
    IntegerDivide,
    LeftShift,
    RightShift,
}

/// `name = value`
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentStatement {
    pub name: Identifier,
    pub operator: AssignOperator,
    pub value: Expression,
    pub span: Span,
}

/// `object.name = value`
#[derive(Debug, Clone, PartialEq)]
pub struct DottedSetStatement {
    pub object: Expression,
    pub name: Identifier,
    pub operator: AssignOperator,
    pub value: Expression,
    pub span: Span,
}

/// `object[index] = value`
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedSetStatement {
    pub object: Expression,
    pub index: Expression,
    pub operator: AssignOperator,
    pub value: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrementOperator {
    Increment,
    Decrement,
}

/// `target++` / `target--`
#[derive(Debug, Clone, PartialEq)]
pub struct IncrementStatement {
    pub target: Expression,
    pub operator: IncrementOperator,
    pub span: Span,
}

/// An expression evaluated for its side effects, usually a call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expression: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrintItem {
    Expression(Expression),
    /// `;` keeps output on the same line.
    Semicolon(Span),
    /// `,` advances to the next print zone.
    Comma(Span),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrintStatement {
    pub items: Vec<PrintItem>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElseIf {
    pub condition: Expression,
    pub then_branch: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub condition: Expression,
    pub then_branch: Block,
    pub else_ifs: Vec<ElseIf>,
    pub else_branch: Option<Block>,
    /// Written on a single line, without `end if`.
    pub is_inline: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    pub counter: Identifier,
    pub start: Expression,
    pub end: Expression,
    pub step: Option<Expression>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForEachStatement {
    pub item: Identifier,
    pub target: Expression,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopKind {
    For,
    While,
}

/// `exit for` / `exit while`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitStatement {
    pub loop_kind: LoopKind,
    pub span: Span,
}

/// A named `function` or `sub` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionStatement {
    pub name: Identifier,
    pub func: FunctionExpression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub value: Option<Expression>,
    pub span: Span,
}

/// `goto label`. The label is resolved by the evaluator, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GotoStatement {
    pub label: Identifier,
    pub span: Span,
}

/// `name:` at statement position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelStatement {
    pub name: Identifier,
    pub span: Span,
}

/// `dim name[d1, d2, ...]`
#[derive(Debug, Clone, PartialEq)]
pub struct DimStatement {
    pub name: Identifier,
    pub dimensions: Vec<Expression>,
    pub span: Span,
}

/// Expression nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Binary(BinaryExpression),
    Unary(UnaryExpression),
    Grouping(GroupingExpression),
    Literal(LiteralExpression),
    Variable(Identifier),
    Call(CallExpression),
    DottedGet(DottedGetExpression),
    IndexedGet(IndexedGetExpression),
    AttributeGet(DottedGetExpression),
    ArrayLiteral(ArrayLiteralExpression),
    AaLiteral(AaLiteralExpression),
    Function(FunctionExpression),
}

impl Expression {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Grouping(e) => e.span,
            Self::Literal(e) => e.span,
            Self::Variable(e) => e.span,
            Self::Call(e) => e.span,
            Self::DottedGet(e) | Self::AttributeGet(e) => e.span,
            Self::IndexedGet(e) => e.span,
            Self::ArrayLiteral(e) => e.span,
            Self::AaLiteral(e) => e.span,
            Self::Function(e) => e.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Or,
    And,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    LeftShift,
    RightShift,
    Add,
    Subtract,
    Multiply,
    Divide,
    IntegerDivide,
    Modulo,
    Power,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    pub left: Box<Expression>,
    pub operator: BinaryOperator,
    pub right: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Negate,
    Plus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression {
    pub operator: UnaryOperator,
    pub operand: Box<Expression>,
    pub span: Span,
}

/// `( expression )`
#[derive(Debug, Clone, PartialEq)]
pub struct GroupingExpression {
    pub expression: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpression {
    pub value: Literal,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub callee: Box<Expression>,
    pub arguments: Vec<Expression>,
    pub span: Span,
}

/// `object.name`, or `object@name` for attribute access.
#[derive(Debug, Clone, PartialEq)]
pub struct DottedGetExpression {
    pub object: Box<Expression>,
    pub name: Identifier,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexedGetExpression {
    pub object: Box<Expression>,
    pub index: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLiteralExpression {
    pub elements: Vec<Expression>,
    pub span: Span,
}

/// `{ key: value, ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct AaLiteralExpression {
    pub elements: Vec<AaElement>,
    pub span: Span,
}

impl AaLiteralExpression {
    /// Key/value members, skipping comment elements.
    pub fn members(&self) -> impl Iterator<Item = &AaMember> {
        self.elements.iter().filter_map(|element| match element {
            AaElement::Member(member) => Some(member),
            AaElement::Comment(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AaElement {
    Member(AaMember),
    Comment(Comment),
}

impl AaElement {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Member(member) => member.span,
            Self::Comment(comment) => comment.span,
        }
    }
}

/// One `key: value` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct AaMember {
    /// The key exactly as written, quotes included for string keys.
    pub key_token: Token,
    /// The resolved key: unquoted for string keys.
    pub key: String,
    pub value: Expression,
    pub span: Span,
}

/// A comment kept inside a literal, with its exact source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub span: Span,
}

/// Declared type of a parameter or function result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Boolean,
    Integer,
    LongInteger,
    Float,
    Double,
    String,
    Object,
    Interface,
    Function,
    Dynamic,
    Void,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Function,
    Sub,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: Identifier,
    pub default_value: Option<Expression>,
    pub value_type: ValueType,
    pub span: Span,
}

/// A `function` or `sub` body, named or anonymous.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionExpression {
    pub kind: FunctionKind,
    pub parameters: Vec<Parameter>,
    pub return_type: ValueType,
    pub body: Block,
    pub span: Span,
}
