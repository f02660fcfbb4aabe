//! Statement grammar for free-form Fortran.
//!
//! Parses one spliced logical statement (see [`crate::scan`]) into a flat
//! [`Stmt`]. Block structure is not resolved here; openers (`IF ... THEN`,
//! `DO`, `SUBROUTINE`, ...) and closers (`END ...`, `ELSE`, `CASE`, ...) come
//! out as individual statements and are folded into a tree by
//! [`crate::tree`].
//!
//! Keywords are not reserved: every keyword rule matches a full identifier
//! and compares it case-insensitively, so `IF = 3` parses as an assignment
//! to a variable called `IF`.

use indexmap::IndexMap;

use crate::scan::{Comment, LogicalStatement, Span, SpanMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Concat,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    Eqv,
    Neqv,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub span: Span,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Numeric literal, raw text including any exponent or kind suffix.
    Number(String),
    /// Binary/octal/hex literal, raw text.
    Boz(String),
    /// Character literal, raw text including the quotes.
    Str(String),
    Logical(bool),
    Complex {
        real: Box<Expression>,
        imag: Box<Expression>,
    },
    Array(Vec<Expression>),
    Identifier(String),
    /// `left % right`, right-associative.
    Member {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Unary {
        operator: UnaryOp,
        argument: Box<Expression>,
    },
    Binary {
        operator: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Paren(Box<Expression>),
    /// Function call or array index; the distinction needs symbol tables,
    /// which a syntax tree does not have.
    CallOrIndex {
        callee: Box<Expression>,
        args: Vec<Argument>,
    },
}

impl Expression {
    fn binary(operator: BinaryOp, left: Expression, right: Expression) -> Expression {
        Expression {
            span: left.span.cover(right.span),
            kind: ExprKind::Binary {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            },
        }
    }

    fn prefix(start: usize, operator: UnaryOp, argument: Expression) -> Expression {
        Expression {
            span: Span::new(start, argument.span.end),
            kind: ExprKind::Unary {
                operator,
                argument: Box::new(argument),
            },
        }
    }

    fn member(left: Expression, right: Expression) -> Expression {
        Expression {
            span: left.span.cover(right.span),
            kind: ExprKind::Member {
                left: Box::new(left),
                right: Box::new(right),
            },
        }
    }

    /// The unescaped contents of a character literal, if this is one.
    pub fn string_value(&self) -> Option<String> {
        match &self.kind {
            ExprKind::Str(raw) => Some(unquote(raw)),
            _ => None,
        }
    }
}

/// Strip the delimiters from a character literal and undouble embedded
/// quotes.
pub fn unquote(raw: &str) -> String {
    let quote = raw.chars().next().unwrap_or('\'');
    let inner = &raw[quote.len_utf8()..raw.len().saturating_sub(quote.len_utf8())];
    match quote {
        '\'' => inner.replace("''", "'"),
        _ => inner.replace("\"\"", "\""),
    }
}

/// `start:stop:stride` with every part optional, as in `A(1:, ::2)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtentSpec {
    pub span: Span,
    pub start: Option<Expression>,
    pub stop: Option<Expression>,
    pub stride: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Positional(Expression),
    Keyword {
        span: Span,
        name: String,
        value: KeywordValue,
    },
    Extent(ExtentSpec),
    /// A bare `*` dimension, as in `DIMENSION A(*)`.
    AssumedSize(Span),
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeywordValue {
    Expr(Expression),
    /// `LEN=*`
    AssumedSize(Span),
    /// `DIMENSION=:`
    AssumedShape(Span),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntrinsicKind {
    Byte,
    Integer,
    Real,
    DoublePrecision,
    Complex,
    DoubleComplex,
    Logical,
    Character,
}

/// Length/kind part of a type spec: `INTEGER(KIND=8)`, `CHARACTER*32`.
#[derive(Debug, Clone, PartialEq)]
pub enum Size {
    List(Vec<Argument>),
    Star(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeSpec {
    Intrinsic {
        kind: IntrinsicKind,
        size: Option<Size>,
    },
    Derived {
        class: bool,
        name: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    In,
    Out,
    InOut,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeQualifier {
    Allocatable,
    Automatic,
    Dimension(Option<Vec<Argument>>),
    External,
    Intent(Intent),
    Intrinsic,
    Optional,
    Parameter,
    Pointer,
    Private,
    Public,
    Save,
    Sequence,
    Static,
    Target,
    Device,
    Volatile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcQualifier {
    Elemental,
    Pure,
    Recursive,
}

/// CUDA Fortran procedure attribute, `ATTRIBUTES(GLOBAL)` and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuAttribute {
    Global,
    Device,
    Host,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionPrefix {
    Qualifier(ProcQualifier),
    Type(TypeSpec),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitKind {
    /// `= expr`
    Value,
    /// `=> expr`
    Pointer,
}

/// One declared entity: `X`, `A(10)`, `P => NULL()`, `N = 3`.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDecl {
    pub target: Expression,
    pub init: Option<(InitKind, Expression)>,
}

/// Name of an interface block or of the construct an `END` closes.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockName {
    Name(String),
    Assignment,
    Operator(String),
}

impl BlockName {
    pub fn as_name(&self) -> Option<&str> {
        match self {
            BlockName::Name(n) => Some(n),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImplicitRule {
    pub kind: IntrinsicKind,
    pub size: Option<Size>,
    /// Initial-letter ranges, e.g. `(A-H, O-Z)`.
    pub ranges: Vec<(char, Option<char>)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImplicitSpec {
    None,
    Rules(Vec<ImplicitRule>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureKind {
    Generic,
    Initial,
    Procedure,
    ModuleProcedure,
    Property,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureAttribute {
    Pass,
    Nopass,
    NonOverridable,
    Public,
    Private,
    Family,
    Pointer,
}

/// Unit or format identifier in an I/O control list.
#[derive(Debug, Clone, PartialEq)]
pub enum IoValue {
    /// List-directed `*`.
    Star(Span),
    /// Reference to a labelled FORMAT statement.
    Label(String, Span),
    Expr(Expression),
}

/// Parsed `(unit, format, KEY=value, ...)` control list. Specifier names are
/// folded to upper case; their order is preserved.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IoControl {
    pub unit: Option<IoValue>,
    pub format: Option<IoValue>,
    pub keywords: IndexMap<String, IoValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormatItem {
    /// Quoted literal text, raw.
    Str(String),
    /// An edit descriptor such as `I5`, `F8.3`, `2X`, `/`.
    Descriptor(String),
    /// Parenthesised repeat group, e.g. `3(F4.1, 1X)`.
    Group {
        descriptor: Option<String>,
        items: Vec<FormatItem>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoopControl {
    Counted {
        var: String,
        from: Expression,
        to: Expression,
        step: Option<Expression>,
    },
    While(Expression),
}

/// `I = 1:N:2` inside a FORALL header.
#[derive(Debug, Clone, PartialEq)]
pub struct TripletSpec {
    pub span: Span,
    pub var: String,
    pub from: Expression,
    pub to: Expression,
    pub stride: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaseValue {
    Expr(Expression),
    Range(ExtentSpec),
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaseSelector {
    Values(Vec<CaseValue>),
    Default,
}

/// Which construct an `END` closes, when it says so.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndKind {
    Program,
    Module,
    Subroutine,
    Function,
    Type,
    Interface,
    Do,
    If,
    Where,
    Forall,
    Select,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub span: Span,
    /// Numeric statement label, e.g. the `100` of `100 CONTINUE`.
    pub label: Option<String>,
    pub comments: Vec<Comment>,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// A comment-only line; the text is in [`Stmt::comments`].
    Comment,
    /// A statement the grammar could not parse.
    Error { message: String },

    Program {
        name: String,
    },
    Module {
        name: String,
    },
    Interface {
        name: Option<BlockName>,
    },
    Subroutine {
        attributes: Option<GpuAttribute>,
        prefix: Vec<FunctionPrefix>,
        name: String,
        params: Option<Vec<String>>,
    },
    Function {
        attributes: Option<GpuAttribute>,
        prefix: Vec<FunctionPrefix>,
        name: String,
        params: Option<Vec<String>>,
        result: Option<String>,
    },
    Contains,
    DerivedTypeDef {
        qualifier: Option<TypeQualifier>,
        name: String,
    },
    End {
        kind: Option<EndKind>,
        name: Option<BlockName>,
    },

    Use {
        module: String,
        only: Option<Vec<String>>,
    },
    Implicit(ImplicitSpec),
    Import {
        names: Vec<String>,
    },
    Public,
    Private,
    Sequence,
    Namelist {
        name: String,
        items: Vec<String>,
    },
    Declaration {
        type_spec: TypeSpec,
        qualifiers: Vec<TypeQualifier>,
        entities: Vec<EntityDecl>,
    },
    /// A qualifier applied to existing entities: `DIMENSION A(10)`,
    /// `PUBLIC :: X, Y`.
    Modification {
        qualifier: TypeQualifier,
        entities: Vec<EntityDecl>,
    },
    Parameter(Vec<(String, Expression)>),
    Equivalence(Vec<Vec<Expression>>),
    ProcedureBinding {
        kind: ProcedureKind,
        attributes: Vec<ProcedureAttribute>,
        /// Generic binding name before `=>`, if present.
        binding: Option<String>,
        methods: Vec<String>,
    },
    Include {
        filename: String,
    },
    Format(Vec<FormatItem>),

    Assignment {
        target: Expression,
        value: Expression,
    },
    PointerAssignment {
        target: Expression,
        value: Expression,
    },
    Call {
        name: String,
        args: Option<Vec<Argument>>,
    },
    /// A bare call expression in statement position.
    ExprCall(Expression),
    Continue,
    Cycle(Option<String>),
    Exit(Option<String>),
    Goto(String),
    Return,
    Stop(Option<Expression>),

    If {
        condition: Expression,
        body: Box<Stmt>,
    },
    BlockIf {
        block_label: Option<String>,
        condition: Expression,
        name: Option<String>,
    },
    ElseIf {
        condition: Expression,
        name: Option<String>,
    },
    Else {
        name: Option<String>,
    },
    Where {
        condition: Expression,
        body: Box<Stmt>,
    },
    BlockWhere {
        block_label: Option<String>,
        condition: Expression,
    },
    Elsewhere {
        condition: Option<Expression>,
        name: Option<String>,
    },
    Forall {
        triplets: Vec<TripletSpec>,
        mask: Option<Expression>,
        body: Box<Stmt>,
    },
    BlockForall {
        block_label: Option<String>,
        triplets: Vec<TripletSpec>,
        mask: Option<Expression>,
    },
    SelectCase {
        block_label: Option<String>,
        selector: Expression,
    },
    Case {
        selector: CaseSelector,
        name: Option<String>,
    },
    Do {
        block_label: Option<String>,
        control: Option<LoopControl>,
    },

    Print {
        format: IoValue,
        items: Vec<Expression>,
    },
    Write {
        control: IoControl,
        items: Vec<Expression>,
    },
    Read {
        control: IoControl,
        items: Vec<Expression>,
    },
}

fn kw_eq(ident: &str, kw: &str) -> bool {
    ident.eq_ignore_ascii_case(kw)
}

/// Matches `ident` against the fused spelling of a two-word keyword, e.g.
/// `ENDIF` for `END IF`.
fn kw2_eq(ident: &str, a: &str, b: &str) -> bool {
    ident.len() == a.len() + b.len()
        && ident[..a.len()].eq_ignore_ascii_case(a)
        && ident[a.len()..].eq_ignore_ascii_case(b)
}

peg::parser! {
    pub grammar fortran(map: &SpanMap) for str {
        // Optional inline whitespace. Newlines never appear in spliced text.
        rule ws() = quiet!{[' ' | '\t']*}

        rule ident_text() -> &'input str
            = $(['a'..='z' | 'A'..='Z' | '_'] ['a'..='z' | 'A'..='Z' | '0'..='9' | '_']*)

        rule name() -> String
            = i:ident_text() { i.to_owned() }

        rule digits() -> &'input str = $(['0'..='9']+)

        // Keywords are ordinary identifiers compared case-insensitively, so
        // they are only recognised in keyword position.
        rule kw(k: &'static str)
            = i:ident_text() {? if kw_eq(i, k) { Ok(()) } else { Err(k) } }

        // A two-word keyword in either fused or spaced spelling.
        rule kw2(a: &'static str, b: &'static str)
            = i:ident_text() {? if kw2_eq(i, a, b) { Ok(()) } else { Err(a) } }
            / kw(a) ws() kw(b)

        rule dot_op(k: &'static str)
            = "." i:ident_text() "." {? if kw_eq(i, k) { Ok(()) } else { Err(k) } }

        // End of statement. Every statement rule is anchored on this so a
        // partial match fails inside the rule and the next alternative gets
        // its turn.
        rule eos() = quiet!{ws() ![_]} / expected!("end of statement")

        rule ident_expr() -> Expression
            = s:position!() i:ident_text() e:position!()
              { Expression { span: map.span(s, e), kind: ExprKind::Identifier(i.to_owned()) } }

        // ---------------------------------------------------------------
        // Literals

        rule string_text() -> &'input str
            = $("'" ("''" / [^ '\''])* "'")
            / $("\"" ("\"\"" / [^ '"'])* "\"")

        rule boz_text() -> &'input str
            = $(['b' | 'B'] "'" ['0'..='1']+ "'") / $(['b' | 'B'] "\"" ['0'..='1']+ "\"")
            / $(['o' | 'O'] "'" ['0'..='7']+ "'") / $(['o' | 'O'] "\"" ['0'..='7']+ "\"")
            / $(['z' | 'Z'] "'" ['0'..='9' | 'a'..='f' | 'A'..='F']+ "'")
            / $(['z' | 'Z'] "\"" ['0'..='9' | 'a'..='f' | 'A'..='F']+ "\"")
            / $("'" ['0'..='1']+ "'" ['b' | 'B']) / $("\"" ['0'..='1']+ "\"" ['b' | 'B'])
            / $("'" ['0'..='7']+ "'" ['o' | 'O']) / $("\"" ['0'..='7']+ "\"" ['o' | 'O'])
            / $("'" ['0'..='9' | 'a'..='f' | 'A'..='F']+ "'" ['z' | 'Z'])
            / $("\"" ['0'..='9' | 'a'..='f' | 'A'..='F']+ "\"" ['z' | 'Z'])

        // Letters followed by a dot, i.e. the tail of `.AND.` style
        // operators. `1.EQ.2` must lex as `1` `.EQ.` `2`, not `1.` `EQ`.
        rule dot_op_tail() = ['a'..='z' | 'A'..='Z']+ "."

        rule exponent() = ['e' | 'E' | 'd' | 'D'] ['+' | '-']? ['0'..='9']+

        rule kind_suffix() = "_" ['a'..='z' | 'A'..='Z' | '0'..='9' | '_']+

        rule number_text() -> &'input str
            = $(['0'..='9']+ ("." !dot_op_tail() ['0'..='9']*)? exponent()? kind_suffix()?)
            / $("." ['0'..='9']+ exponent()? kind_suffix()?)

        rule logical_text() -> bool
            = "." i:ident_text() "."
              {? if kw_eq(i, "TRUE") { Ok(true) }
                 else if kw_eq(i, "FALSE") { Ok(false) }
                 else { Err(".TRUE.") } }

        // Complex literal parts per the language: number or identifier only,
        // which is what keeps `(A, B)` distinguishable from grouping.
        rule complex_part() -> Expression
            = s:position!() t:number_text() e:position!()
              { Expression { span: map.span(s, e), kind: ExprKind::Number(t.to_owned()) } }
            / ident_expr()

        rule complex_literal() -> Expression
            = s:position!() "(" ws() r:complex_part() ws() "," ws() i:complex_part() ws() ")" e:position!()
              { Expression { span: map.span(s, e), kind: ExprKind::Complex { real: Box::new(r), imag: Box::new(i) } } }

        rule array_literal() -> Expression
            = s:position!() "(/" ws() es:(expression() ** (ws() "," ws())) ws() "/)" e:position!()
              { Expression { span: map.span(s, e), kind: ExprKind::Array(es) } }
            / s:position!() "[" ws() es:(expression() ++ (ws() "," ws())) ws() "]" e:position!()
              { Expression { span: map.span(s, e), kind: ExprKind::Array(es) } }

        rule boz_expr() -> Expression
            = s:position!() t:boz_text() e:position!()
              { Expression { span: map.span(s, e), kind: ExprKind::Boz(t.to_owned()) } }

        rule number_expr() -> Expression
            = s:position!() t:number_text() e:position!()
              { Expression { span: map.span(s, e), kind: ExprKind::Number(t.to_owned()) } }

        rule string_expr() -> Expression
            = s:position!() t:string_text() e:position!()
              { Expression { span: map.span(s, e), kind: ExprKind::Str(t.to_owned()) } }

        rule logical_expr() -> Expression
            = s:position!() b:logical_text() e:position!()
              { Expression { span: map.span(s, e), kind: ExprKind::Logical(b) } }

        rule paren_expr() -> Expression
            = s:position!() "(" ws() x:expression() ws() ")" e:position!()
              { Expression { span: map.span(s, e), kind: ExprKind::Paren(Box::new(x)) } }

        // ---------------------------------------------------------------
        // Expressions

        rule call_expr() -> Expression
            = s:position!() i:ident_text() m:position!() ws() a:argument_list() e:position!()
              { Expression {
                    span: map.span(s, e),
                    kind: ExprKind::CallOrIndex {
                        callee: Box::new(Expression {
                            span: map.span(s, m),
                            kind: ExprKind::Identifier(i.to_owned()),
                        }),
                        args: a,
                    },
                } }

        pub rule expression() -> Expression = precedence!{
            x:(@) ws() dot_op("EQV") ws() y:@ { Expression::binary(BinaryOp::Eqv, x, y) }
            x:(@) ws() dot_op("NEQV") ws() y:@ { Expression::binary(BinaryOp::Neqv, x, y) }
            --
            x:(@) ws() dot_op("OR") ws() y:@ { Expression::binary(BinaryOp::Or, x, y) }
            --
            x:(@) ws() dot_op("AND") ws() y:@ { Expression::binary(BinaryOp::And, x, y) }
            --
            s:position!() dot_op("NOT") ws() y:@ { Expression::prefix(map.source_pos(s), UnaryOp::Not, y) }
            --
            x:(@) ws() "<=" ws() y:@ { Expression::binary(BinaryOp::Le, x, y) }
            x:(@) ws() ">=" ws() y:@ { Expression::binary(BinaryOp::Ge, x, y) }
            x:(@) ws() "==" ws() y:@ { Expression::binary(BinaryOp::Eq, x, y) }
            x:(@) ws() "/=" ws() y:@ { Expression::binary(BinaryOp::Ne, x, y) }
            x:(@) ws() "<" ws() y:@ { Expression::binary(BinaryOp::Lt, x, y) }
            x:(@) ws() ">" ws() y:@ { Expression::binary(BinaryOp::Gt, x, y) }
            x:(@) ws() dot_op("LE") ws() y:@ { Expression::binary(BinaryOp::Le, x, y) }
            x:(@) ws() dot_op("GE") ws() y:@ { Expression::binary(BinaryOp::Ge, x, y) }
            x:(@) ws() dot_op("EQ") ws() y:@ { Expression::binary(BinaryOp::Eq, x, y) }
            x:(@) ws() dot_op("NE") ws() y:@ { Expression::binary(BinaryOp::Ne, x, y) }
            x:(@) ws() dot_op("LT") ws() y:@ { Expression::binary(BinaryOp::Lt, x, y) }
            x:(@) ws() dot_op("GT") ws() y:@ { Expression::binary(BinaryOp::Gt, x, y) }
            --
            x:(@) ws() "//" ws() y:@ { Expression::binary(BinaryOp::Concat, x, y) }
            x:(@) ws() "+" ws() y:@ { Expression::binary(BinaryOp::Add, x, y) }
            x:(@) ws() "-" ws() y:@ { Expression::binary(BinaryOp::Sub, x, y) }
            --
            x:(@) ws() "*" !"*" ws() y:@ { Expression::binary(BinaryOp::Mul, x, y) }
            x:(@) ws() "/" !['/' | '=' | ')'] ws() y:@ { Expression::binary(BinaryOp::Div, x, y) }
            --
            x:@ ws() "**" ws() y:(@) { Expression::binary(BinaryOp::Pow, x, y) }
            --
            s:position!() "-" ws() y:@ { Expression::prefix(map.source_pos(s), UnaryOp::Minus, y) }
            s:position!() "+" ws() y:@ { Expression::prefix(map.source_pos(s), UnaryOp::Plus, y) }
            --
            x:@ ws() "%" ws() y:(@) { Expression::member(x, y) }
            --
            c:call_expr() { c }
            a:array_literal() { a }
            c:complex_literal() { c }
            b:boz_expr() { b }
            n:number_expr() { n }
            t:string_expr() { t }
            l:logical_expr() { l }
            i:ident_expr() { i }
            p:paren_expr() { p }
        }

        // ---------------------------------------------------------------
        // Argument lists

        rule argument_list() -> Vec<Argument>
            = "(" ws() a:(argument() ** (ws() "," ws())) ws() ")" { a }

        rule argument() -> Argument
            = keyword_argument()
            / extent_argument()
            / s:position!() "*" e:position!() { Argument::AssumedSize(map.span(s, e)) }
            / e:expression() { Argument::Positional(e) }

        rule keyword_argument() -> Argument
            = s:position!() n:ident_text() ws() "=" !['=' | '>'] ws() v:keyword_value() e:position!()
              { Argument::Keyword { span: map.span(s, e), name: n.to_owned(), value: v } }

        rule keyword_value() -> KeywordValue
            = e:expression() { KeywordValue::Expr(e) }
            / s:position!() "*" e:position!() { KeywordValue::AssumedSize(map.span(s, e)) }
            / s:position!() ":" e:position!() { KeywordValue::AssumedShape(map.span(s, e)) }

        rule extent_argument() -> Argument
            = e:extent_spec() { Argument::Extent(e) }

        rule extent_spec() -> ExtentSpec
            = s:position!() st:expression()? ws() ":" ws() sp:expression()?
              strd:(ws() ":" ws() e:expression() { e })? e:position!()
              { ExtentSpec { span: map.span(s, e), start: st, stop: sp, stride: strd } }

        // ---------------------------------------------------------------
        // I/O expressions: the subset legal as unit/format identifiers.
        // No logical or relational operators, no complex literals.

        rule io_expression() -> Expression = precedence!{
            x:(@) ws() "//" ws() y:@ { Expression::binary(BinaryOp::Concat, x, y) }
            x:(@) ws() "+" ws() y:@ { Expression::binary(BinaryOp::Add, x, y) }
            x:(@) ws() "-" ws() y:@ { Expression::binary(BinaryOp::Sub, x, y) }
            --
            x:(@) ws() "*" !"*" ws() y:@ { Expression::binary(BinaryOp::Mul, x, y) }
            x:(@) ws() "/" !['/' | '=' | ')'] ws() y:@ { Expression::binary(BinaryOp::Div, x, y) }
            --
            x:@ ws() "**" ws() y:(@) { Expression::binary(BinaryOp::Pow, x, y) }
            --
            s:position!() "-" ws() y:@ { Expression::prefix(map.source_pos(s), UnaryOp::Minus, y) }
            s:position!() "+" ws() y:@ { Expression::prefix(map.source_pos(s), UnaryOp::Plus, y) }
            --
            x:@ ws() "%" ws() y:(@) { Expression::member(x, y) }
            --
            c:call_expr() { c }
            b:boz_expr() { b }
            n:number_expr() { n }
            t:string_expr() { t }
            i:ident_expr() { i }
            p:io_paren_expr() { p }
        }

        rule io_paren_expr() -> Expression
            = s:position!() "(" ws() x:io_expression() ws() ")" e:position!()
              { Expression { span: map.span(s, e), kind: ExprKind::Paren(Box::new(x)) } }

        rule star_value() -> IoValue
            = s:position!() "*" e:position!() { IoValue::Star(map.span(s, e)) }

        rule label_value() -> IoValue
            = s:position!() d:digits() e:position!()
              !['0'..='9' | 'a'..='z' | 'A'..='Z' | '.' | '_']
              { IoValue::Label(d.to_owned(), map.span(s, e)) }

        rule format_value() -> IoValue
            = star_value()
            / label_value()
            / e:io_expression() { IoValue::Expr(e) }

        rule unit_value() -> IoValue
            = star_value()
            / e:io_expression() { IoValue::Expr(e) }

        rule io_keyword_value() -> IoValue
            = star_value()
            / label_value()
            / e:io_expression() { IoValue::Expr(e) }

        rule io_keyword_arg() -> (String, IoValue)
            = n:ident_text() ws() "=" !['=' | '>'] ws() v:io_keyword_value()
              { (n.to_uppercase(), v) }

        rule io_keyword_args() -> IndexMap<String, IoValue>
            = kvs:(io_keyword_arg() ++ (ws() "," ws())) { kvs.into_iter().collect() }

        // Positional unit, then positional format, then keyword specifiers.
        // The `!(ws() "=")` guard keeps a leading `IOSTAT=...` from being taken
        // as a positional format.
        rule io_control_list() -> IoControl
            = k:io_keyword_args()
              { IoControl { unit: None, format: None, keywords: k } }
            / u:unit_value()
              f:(ws() "," ws() f:format_value() !(ws() "=") { f })?
              k:(ws() "," ws() k:io_keyword_args() { k })?
              { IoControl { unit: Some(u), format: f, keywords: k.unwrap_or_default() } }

        rule io_items() -> Vec<Expression>
            = expression() ++ (ws() "," ws())

        // ---------------------------------------------------------------
        // I/O statements

        rule print_statement() -> StmtKind
            = kw("PRINT") ws() f:format_value() items:(ws() "," ws() i:io_items() { i })? eos()
              { StmtKind::Print { format: f, items: items.unwrap_or_default() } }

        rule write_statement() -> StmtKind
            = kw("WRITE") ws() "(" ws() c:io_control_list() ws() ")" ws() items:io_items()? eos()
              { StmtKind::Write { control: c, items: items.unwrap_or_default() } }

        rule read_statement() -> StmtKind
            = kw("READ") ws() "(" ws() c:io_control_list() ws() ")" ws() items:io_items()? eos()
              { StmtKind::Read { control: c, items: items.unwrap_or_default() } }
            / kw("READ") ws() f:format_value() items:(ws() "," ws() i:io_items() { i })? eos()
              { StmtKind::Read {
                    control: IoControl { unit: None, format: Some(f), keywords: IndexMap::new() },
                    items: items.unwrap_or_default(),
                } }

        rule edit_descriptor() -> String
            = d:$(['a'..='z' | 'A'..='Z' | '0'..='9' | '/' | ':' | '.' | '*']+) { d.to_owned() }

        rule format_item() -> FormatItem
            = t:string_text() { FormatItem::Str(t.to_owned()) }
            / d:edit_descriptor()? ws() "(" ws() items:format_items() ws() ")"
              { FormatItem::Group { descriptor: d, items } }
            / d:edit_descriptor() { FormatItem::Descriptor(d) }

        rule format_items() -> Vec<FormatItem>
            = format_item() ++ (ws() "," ws())

        rule format_statement() -> StmtKind
            = kw("FORMAT") ws() "(" ws() items:format_items() ws() ")" eos()
              { StmtKind::Format(items) }

        // ---------------------------------------------------------------
        // Type specs and declarations

        rule intrinsic_kind() -> IntrinsicKind
            = kw2("DOUBLE", "PRECISION") { IntrinsicKind::DoublePrecision }
            / kw2("DOUBLE", "COMPLEX") { IntrinsicKind::DoubleComplex }
            / kw("BYTE") { IntrinsicKind::Byte }
            / kw("INTEGER") { IntrinsicKind::Integer }
            / kw("REAL") { IntrinsicKind::Real }
            / kw("COMPLEX") { IntrinsicKind::Complex }
            / kw("LOGICAL") { IntrinsicKind::Logical }
            / kw("CHARACTER") { IntrinsicKind::Character }

        rule size() -> Size
            = a:argument_list() { Size::List(a) }
            / "*" ws() s:position!() d:digits() e:position!()
              { Size::Star(Expression { span: map.span(s, e), kind: ExprKind::Number(d.to_owned()) }) }
            / "*" ws() s:position!() "(" ws() x:expression() ws() ")" e:position!()
              { Size::Star(Expression { span: map.span(s, e), kind: ExprKind::Paren(Box::new(x)) }) }
            // CHARACTER*(*), assumed length
            / "*" ws() "(" ws() s:position!() "*" e:position!() ws() ")"
              { Size::List(vec![Argument::AssumedSize(map.span(s, e))]) }

        rule type_spec() -> TypeSpec
            = k:intrinsic_kind() s:(ws() s:size() { s })?
              { TypeSpec::Intrinsic { kind: k, size: s } }
            / c:(kw("CLASS") { true } / kw("TYPE") { false }) ws() "(" ws() n:name() ws() ")"
              { TypeSpec::Derived { class: c, name: n } }

        rule intent() -> Intent
            = kw2("IN", "OUT") { Intent::InOut }
            / kw("IN") { Intent::In }
            / kw("OUT") { Intent::Out }

        rule type_qualifier() -> TypeQualifier
            = kw("ALLOCATABLE") { TypeQualifier::Allocatable }
            / kw("AUTOMATIC") { TypeQualifier::Automatic }
            / kw("DIMENSION") a:(ws() a:argument_list() { a })? { TypeQualifier::Dimension(a) }
            / kw("EXTERNAL") { TypeQualifier::External }
            / kw("INTENT") ws() "(" ws() i:intent() ws() ")" { TypeQualifier::Intent(i) }
            / kw("INTRINSIC") { TypeQualifier::Intrinsic }
            / kw("OPTIONAL") { TypeQualifier::Optional }
            / kw("PARAMETER") { TypeQualifier::Parameter }
            / kw("POINTER") { TypeQualifier::Pointer }
            / kw("PRIVATE") { TypeQualifier::Private }
            / kw("PUBLIC") { TypeQualifier::Public }
            / kw("SAVE") { TypeQualifier::Save }
            / kw("SEQUENCE") { TypeQualifier::Sequence }
            / kw("STATIC") { TypeQualifier::Static }
            / kw("TARGET") { TypeQualifier::Target }
            / kw("DEVICE") { TypeQualifier::Device }
            / kw("VOLATILE") { TypeQualifier::Volatile }

        rule entity_target() -> Expression
            = c:call_expr() { c }
            / ident_expr()

        rule init_kind() -> InitKind
            = "=>" { InitKind::Pointer }
            / "=" !['=' | '>'] { InitKind::Value }

        rule entity_decl() -> EntityDecl
            = t:entity_target() init:(ws() k:init_kind() ws() v:expression() { (k, v) })?
              { EntityDecl { target: t, init } }

        rule declaration_statement() -> StmtKind
            = t:type_spec()
              q:(ws() "," ws() q:(type_qualifier() ++ (ws() "," ws())) { q })?
              ws() ("::" ws())? e:(entity_decl() ++ (ws() "," ws())) eos()
              { StmtKind::Declaration {
                    type_spec: t,
                    qualifiers: q.unwrap_or_default(),
                    entities: e,
                } }

        rule modification_statement() -> StmtKind
            = q:type_qualifier() ws() ("::" ws())? e:(entity_decl() ++ (ws() "," ws())) eos()
              { StmtKind::Modification { qualifier: q, entities: e } }

        rule use_statement() -> StmtKind
            = kw("USE") ws() m:name()
              only:(ws() "," ws() kw("ONLY") ws() ":" ws() ns:(name() ++ (ws() "," ws())) { ns })? eos()
              { StmtKind::Use { module: m, only } }

        // A size before the letter ranges is only a size if another paren
        // group follows; `REAL (A-H)` is ranges, `REAL(4) (A-H)` is both.
        rule implicit_rule_spec() -> ImplicitRule
            = k:intrinsic_kind() s:(ws() s:size() &(ws() "(") { s })?
              ws() "(" ws() rs:(implicit_range() ++ (ws() "," ws())) ws() ")"
              { ImplicitRule { kind: k, size: s, ranges: rs } }

        rule implicit_range() -> (char, Option<char>)
            = a:['a'..='z' | 'A'..='Z'] b:(ws() "-" ws() b:['a'..='z' | 'A'..='Z'] { b })?
              { (a, b) }

        rule implicit_statement() -> StmtKind
            = kw("IMPLICIT") ws() kw("NONE") eos() { StmtKind::Implicit(ImplicitSpec::None) }
            / kw("IMPLICIT") ws() rs:(implicit_rule_spec() ++ (ws() "," ws())) eos()
              { StmtKind::Implicit(ImplicitSpec::Rules(rs)) }

        rule import_statement() -> StmtKind
            = kw("IMPORT") ws() "::" ws() ns:(name() ++ (ws() "," ws())) eos()
              { StmtKind::Import { names: ns } }

        rule namelist_statement() -> StmtKind
            = kw("NAMELIST") ws() "/" ws() n:name() ws() "/" ws() items:(name() ++ (ws() "," ws())) eos()
              { StmtKind::Namelist { name: n, items } }

        rule parameter_statement() -> StmtKind
            = kw("PARAMETER") ws() "(" ws() ps:(parameter_assignment() ++ (ws() "," ws())) ws() ")" eos()
              { StmtKind::Parameter(ps) }

        rule parameter_assignment() -> (String, Expression)
            = n:name() ws() "=" !['=' | '>'] ws() v:expression() { (n, v) }

        rule equivalence_statement() -> StmtKind
            = kw("EQUIVALENCE") ws() sets:(equivalence_set() ++ (ws() "," ws())) eos()
              { StmtKind::Equivalence(sets) }

        rule equivalence_set() -> Vec<Expression>
            = "(" ws() es:(entity_target() ++ (ws() "," ws())) ws() ")" { es }

        rule include_statement() -> StmtKind
            = kw("INCLUDE") ws() f:string_text() eos()
              { StmtKind::Include { filename: unquote(f) } }

        // ---------------------------------------------------------------
        // Program unit openers and structure

        rule program_statement() -> StmtKind
            = kw("PROGRAM") ws() n:name() eos() { StmtKind::Program { name: n } }

        rule module_statement() -> StmtKind
            = kw("MODULE") ws() n:name() eos() { StmtKind::Module { name: n } }

        rule block_name() -> BlockName
            = kw("ASSIGNMENT") ws() "(" ws() "=" ws() ")" { BlockName::Assignment }
            / kw("OPERATOR") ws() "(" ws() op:$([^ '(' | ')']+) ws() ")"
              { BlockName::Operator(op.trim().to_owned()) }
            / n:name() { BlockName::Name(n) }

        rule interface_statement() -> StmtKind
            = kw("INTERFACE") n:(ws() n:block_name() { n })? eos()
              { StmtKind::Interface { name: n } }

        rule contains_statement() -> StmtKind
            = kw("CONTAINS") eos() { StmtKind::Contains }

        rule gpu_attributes() -> GpuAttribute
            = kw("ATTRIBUTES") ws() "(" ws()
              a:(kw("GLOBAL") { GpuAttribute::Global }
                 / kw("DEVICE") { GpuAttribute::Device }
                 / kw("HOST") { GpuAttribute::Host })
              ws() ")" { a }

        rule function_prefix() -> FunctionPrefix
            = q:(kw("ELEMENTAL") { ProcQualifier::Elemental }
                 / kw("PURE") { ProcQualifier::Pure }
                 / kw("RECURSIVE") { ProcQualifier::Recursive })
              { FunctionPrefix::Qualifier(q) }
            / t:type_spec() { FunctionPrefix::Type(t) }

        rule param_list() -> Vec<String>
            = "(" ws() ")" { Vec::new() }
            / "(" ws() ns:(name() ++ (ws() "," ws())) ws() ")" { ns }

        rule subroutine_statement() -> StmtKind
            = a:(a:gpu_attributes() ws() { a })?
              p:(p:function_prefix() ws() { p })*
              kw("SUBROUTINE") ws() n:name() pr:(ws() pr:param_list() { pr })? eos()
              { StmtKind::Subroutine { attributes: a, prefix: p, name: n, params: pr } }

        rule function_statement() -> StmtKind
            = a:(a:gpu_attributes() ws() { a })?
              p:(p:function_prefix() ws() { p })*
              kw("FUNCTION") ws() n:name() pr:(ws() pr:param_list() { pr })?
              r:(ws() kw("RESULT") ws() "(" ws() rn:name() ws() ")" { rn })? eos()
              { StmtKind::Function { attributes: a, prefix: p, name: n, params: pr, result: r } }

        rule derived_type_statement() -> StmtKind
            = kw("TYPE") ws() "," ws() q:type_qualifier() ws() "::" ws() n:name() eos()
              { StmtKind::DerivedTypeDef { qualifier: Some(q), name: n } }
            / kw("TYPE") ws() ("::" ws())? n:name() eos()
              { StmtKind::DerivedTypeDef { qualifier: None, name: n } }

        rule procedure_kind() -> ProcedureKind
            = kw2("MODULE", "PROCEDURE") { ProcedureKind::ModuleProcedure }
            / kw("GENERIC") { ProcedureKind::Generic }
            / kw("INITIAL") { ProcedureKind::Initial }
            / kw("PROCEDURE") { ProcedureKind::Procedure }
            / kw("PROPERTY") { ProcedureKind::Property }

        rule procedure_attribute() -> ProcedureAttribute
            = kw("PASS") { ProcedureAttribute::Pass }
            / kw("NOPASS") { ProcedureAttribute::Nopass }
            / kw("NON_OVERRIDABLE") { ProcedureAttribute::NonOverridable }
            / kw("PUBLIC") { ProcedureAttribute::Public }
            / kw("PRIVATE") { ProcedureAttribute::Private }
            / kw("FAMILY") { ProcedureAttribute::Family }
            / kw("POINTER") { ProcedureAttribute::Pointer }

        rule procedure_statement() -> StmtKind
            = k:procedure_kind()
              attrs:(ws() "," ws() a:(procedure_attribute() ++ (ws() "," ws())) { a })?
              b:(ws() "::" ws() b:name() ws() "=>" { Some(b) } / ws() "::" { None })?
              ws() m:(name() ++ (ws() "," ws())) eos()
              { StmtKind::ProcedureBinding {
                    kind: k,
                    attributes: attrs.unwrap_or_default(),
                    binding: b.flatten(),
                    methods: m,
                } }

        rule end_statement() -> StmtKind
            = kw2("END", "PROGRAM") n:(ws() n:name() { n })? eos()
              { StmtKind::End { kind: Some(EndKind::Program), name: n.map(BlockName::Name) } }
            / kw2("END", "MODULE") n:(ws() n:name() { n })? eos()
              { StmtKind::End { kind: Some(EndKind::Module), name: n.map(BlockName::Name) } }
            / kw2("END", "SUBROUTINE") n:(ws() n:name() { n })? eos()
              { StmtKind::End { kind: Some(EndKind::Subroutine), name: n.map(BlockName::Name) } }
            / kw2("END", "FUNCTION") n:(ws() n:name() { n })? eos()
              { StmtKind::End { kind: Some(EndKind::Function), name: n.map(BlockName::Name) } }
            / kw2("END", "TYPE") n:(ws() n:name() { n })? eos()
              { StmtKind::End { kind: Some(EndKind::Type), name: n.map(BlockName::Name) } }
            / kw2("END", "INTERFACE") n:(ws() n:block_name() { n })? eos()
              { StmtKind::End { kind: Some(EndKind::Interface), name: n } }
            / kw2("END", "DO") n:(ws() n:name() { n })? eos()
              { StmtKind::End { kind: Some(EndKind::Do), name: n.map(BlockName::Name) } }
            / kw2("END", "IF") n:(ws() n:name() { n })? eos()
              { StmtKind::End { kind: Some(EndKind::If), name: n.map(BlockName::Name) } }
            / kw2("END", "WHERE") n:(ws() n:name() { n })? eos()
              { StmtKind::End { kind: Some(EndKind::Where), name: n.map(BlockName::Name) } }
            / kw2("END", "FORALL") n:(ws() n:name() { n })? eos()
              { StmtKind::End { kind: Some(EndKind::Forall), name: n.map(BlockName::Name) } }
            / kw2("END", "SELECT") n:(ws() n:name() { n })? eos()
              { StmtKind::End { kind: Some(EndKind::Select), name: n.map(BlockName::Name) } }
            / kw("END") eos() { StmtKind::End { kind: None, name: None } }

        // ---------------------------------------------------------------
        // Control flow

        rule block_label() -> String
            = n:name() ws() ":" !":" { n }

        rule do_statement() -> StmtKind
            = l:(l:block_label() ws() { l })? kw("DO") c:(ws() c:loop_control() { c })? eos()
              { StmtKind::Do { block_label: l, control: c } }

        rule loop_control() -> LoopControl
            = kw("WHILE") ws() "(" ws() e:expression() ws() ")" { LoopControl::While(e) }
            / v:name() ws() "=" !['=' | '>'] ws() f:expression() ws() "," ws() t:expression()
              st:(ws() "," ws() s:expression() { s })?
              { LoopControl::Counted { var: v, from: f, to: t, step: st } }

        rule block_if_statement() -> StmtKind
            = l:(l:block_label() ws() { l })? kw("IF") ws() "(" ws() c:expression() ws() ")" ws() kw("THEN")
              n:(ws() n:name() { n })? eos()
              { StmtKind::BlockIf { block_label: l, condition: c, name: n } }

        rule inline_if_statement() -> StmtKind
            = kw("IF") ws() "(" ws() c:expression() ws() ")" ws() b:simple_statement()
              { StmtKind::If { condition: c, body: Box::new(b) } }

        rule else_statement() -> StmtKind
            = kw2("ELSE", "IF") ws() "(" ws() c:expression() ws() ")" ws() kw("THEN")
              n:(ws() n:name() { n })? eos()
              { StmtKind::ElseIf { condition: c, name: n } }
            / kw2("ELSE", "WHERE") c:(ws() "(" ws() c:expression() ws() ")" { c })?
              n:(ws() n:name() { n })? eos()
              { StmtKind::Elsewhere { condition: c, name: n } }
            / kw("ELSE") n:(ws() n:name() { n })? eos()
              { StmtKind::Else { name: n } }

        rule inline_where_statement() -> StmtKind
            = kw("WHERE") ws() "(" ws() c:expression() ws() ")" ws() b:simple_statement()
              { StmtKind::Where { condition: c, body: Box::new(b) } }

        rule block_where_statement() -> StmtKind
            = l:(l:block_label() ws() { l })? kw("WHERE") ws() "(" ws() c:expression() ws() ")" eos()
              { StmtKind::BlockWhere { block_label: l, condition: c } }

        rule forall_header() -> (Vec<TripletSpec>, Option<Expression>)
            = kw("FORALL") ws() "(" ws() ts:(triplet_spec() ++ (ws() "," ws()))
              m:(ws() "," ws() m:expression() { m })? ws() ")"
              { (ts, m) }

        rule triplet_spec() -> TripletSpec
            = s:position!() v:name() ws() "=" !['=' | '>'] ws() f:expression() ws() ":" ws() t:expression()
              st:(ws() ":" ws() x:expression() { x })? e:position!()
              { TripletSpec { span: map.span(s, e), var: v, from: f, to: t, stride: st } }

        rule inline_forall_statement() -> StmtKind
            = h:forall_header() ws() b:simple_statement()
              { StmtKind::Forall { triplets: h.0, mask: h.1, body: Box::new(b) } }

        rule block_forall_statement() -> StmtKind
            = l:(l:block_label() ws() { l })? h:forall_header() eos()
              { StmtKind::BlockForall { block_label: l, triplets: h.0, mask: h.1 } }

        rule select_statement() -> StmtKind
            = l:(l:block_label() ws() { l })? kw2("SELECT", "CASE") ws() "(" ws() e:expression() ws() ")" eos()
              { StmtKind::SelectCase { block_label: l, selector: e } }

        rule case_value() -> CaseValue
            = kw("DEFAULT") { CaseValue::Default }
            / e:extent_spec() { CaseValue::Range(e) }
            / e:expression() { CaseValue::Expr(e) }

        rule case_statement() -> StmtKind
            = kw("CASE") ws()
              sel:(kw("DEFAULT") { CaseSelector::Default }
                   / "(" ws() vs:(case_value() ++ (ws() "," ws())) ws() ")" { CaseSelector::Values(vs) })
              n:(ws() n:name() { n })? eos()
              { StmtKind::Case { selector: sel, name: n } }

        // ---------------------------------------------------------------
        // Simple executable statements

        rule call_statement() -> StmtKind
            = kw("CALL") ws() n:name() a:(ws() a:argument_list() { a })? eos()
              { StmtKind::Call { name: n, args: a } }

        rule keyword_statement() -> StmtKind
            = kw("CONTINUE") eos() { StmtKind::Continue }
            / kw("CYCLE") n:(ws() n:name() { n })? eos() { StmtKind::Cycle(n) }
            / kw("EXIT") n:(ws() n:name() { n })? eos() { StmtKind::Exit(n) }
            / kw2("GO", "TO") ws() l:digits() eos() { StmtKind::Goto(l.to_owned()) }
            / kw("RETURN") eos() { StmtKind::Return }
            / kw("STOP") e:(ws() e:expression() { e })? eos() { StmtKind::Stop(e) }
            / kw("SEQUENCE") eos() { StmtKind::Sequence }

        rule assignment_statement() -> StmtKind
            = t:expression() ws() "=>" ws() v:expression() eos()
              { StmtKind::PointerAssignment { target: t, value: v } }
            / t:expression() ws() "=" !['=' | '>'] ws() v:expression() eos()
              { StmtKind::Assignment { target: t, value: v } }

        rule expr_call_statement() -> StmtKind
            = e:expression() eos()
              {? if matches!(e.kind, ExprKind::CallOrIndex { .. }) {
                    Ok(StmtKind::ExprCall(e))
                 } else {
                    Err("call")
                 } }

        rule bare_access_statement() -> StmtKind
            = kw("PUBLIC") eos() { StmtKind::Public }
            / kw("PRIVATE") eos() { StmtKind::Private }

        // Statements legal as the body of an inline IF/WHERE/FORALL. The
        // body runs to the end of the statement, so these reuse the
        // anchored rules directly.
        rule simple_statement() -> Stmt
            = s:position!() k:simple_statement_kind() e:position!()
              { Stmt { span: map.span(s, e), label: None, comments: Vec::new(), kind: k } }

        rule simple_statement_kind() -> StmtKind
            = print_statement()
            / write_statement()
            / read_statement()
            / call_statement()
            / keyword_statement()
            / include_statement()
            / inline_if_statement()
            / inline_where_statement()
            / inline_forall_statement()
            / assignment_statement()
            / expr_call_statement()

        // Ordered by specificity; every alternative is anchored on eos() so
        // a wrong prefix match fails here and the next one is tried.
        rule statement_kind() -> StmtKind
            = include_statement()
            / use_statement()
            / implicit_statement()
            / import_statement()
            / namelist_statement()
            / parameter_statement()
            / format_statement()
            / print_statement()
            / write_statement()
            / read_statement()
            / call_statement()
            / keyword_statement()
            / end_statement()
            / else_statement()
            / case_statement()
            / select_statement()
            / do_statement()
            / block_if_statement()
            / inline_if_statement()
            / inline_where_statement()
            / block_where_statement()
            / inline_forall_statement()
            / block_forall_statement()
            / contains_statement()
            / interface_statement()
            / procedure_statement()
            / program_statement()
            / module_statement()
            / function_statement()
            / subroutine_statement()
            / declaration_statement()
            / derived_type_statement()
            / modification_statement()
            / bare_access_statement()
            / equivalence_statement()
            / assignment_statement()
            / expr_call_statement()

        pub rule statement() -> Stmt
            = ws() s:position!() l:(d:digits() ws() { d.to_owned() })? k:statement_kind() e:position!()
              { Stmt { span: map.span(s, e), label: l, comments: Vec::new(), kind: k } }
    }
}

/// Parse one logical statement into a flat [`Stmt`]. Unparseable statements
/// become [`StmtKind::Error`] rather than failing the whole run.
pub fn parse_statement(ls: LogicalStatement) -> Stmt {
    if ls.text.is_empty() {
        return Stmt {
            span: ls.span,
            label: None,
            comments: ls.comments,
            kind: StmtKind::Comment,
        };
    }
    match fortran::statement(&ls.text, &ls.map) {
        Ok(mut stmt) => {
            stmt.comments = ls.comments;
            stmt
        }
        Err(err) => {
            log::warn!("syntax error at bytes {}: expected {}", ls.span, err.expected);
            Stmt {
                span: ls.span,
                label: None,
                comments: ls.comments,
                kind: StmtKind::Error {
                    message: format!("expected {}", err.expected),
                },
            }
        }
    }
}
