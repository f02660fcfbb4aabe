//! Folds the flat statement stream into a nested block tree.
//!
//! The grammar emits openers (`IF ... THEN`, `DO`, `SUBROUTINE`), clause
//! markers (`ELSE`, `CASE`) and closers (`END ...`) as individual statements.
//! This module matches them up using a stack of open scopes. Mismatches never
//! abort the build: a closer that matches an enclosing scope ends the inner
//! (unterminated) one, a closer that matches nothing becomes an error node,
//! and end of input closes whatever is still open.

use crate::grammar::{EndKind, Stmt, StmtKind};
use crate::scan::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Program,
    Module,
    Subroutine,
    Function,
    Interface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructKind {
    Do,
    If,
    Where,
    Forall,
    Select,
}

/// Root of the tree: everything in one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationUnit {
    pub span: Span,
    pub items: Vec<Node>,
    /// Number of syntax and structure errors encountered.
    pub errors: usize,
}

impl TranslationUnit {
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Statement(Stmt),
    Unit(ProgramUnit),
    DerivedType(DerivedType),
    Construct(Construct),
    Error(ErrorNode),
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Statement(s) => s.span,
            Node::Unit(u) => u.span,
            Node::DerivedType(d) => d.span,
            Node::Construct(c) => c.span,
            Node::Error(e) => e.span,
        }
    }
}

/// Marker for a statement that could not be parsed or placed.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorNode {
    pub span: Span,
    pub message: String,
}

/// A program, module, subroutine, function, or interface block.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramUnit {
    pub span: Span,
    pub kind: UnitKind,
    pub open: Stmt,
    /// Declarations and other specification statements before the first
    /// executable statement. Empty for interfaces, which keep everything in
    /// `body`.
    pub specification: Vec<Node>,
    pub body: Vec<Node>,
    pub contains: Option<ContainsSection>,
    /// `None` when the unit ran into end of input or an enclosing closer.
    pub end: Option<Stmt>,
}

impl ProgramUnit {
    pub fn name(&self) -> Option<&str> {
        match &self.open.kind {
            StmtKind::Program { name }
            | StmtKind::Module { name }
            | StmtKind::Subroutine { name, .. }
            | StmtKind::Function { name, .. } => Some(name),
            StmtKind::Interface { name } => name.as_ref().and_then(|n| n.as_name()),
            _ => None,
        }
    }
}

/// `CONTAINS` and the internal procedures after it.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainsSection {
    pub span: Span,
    pub open: Stmt,
    pub items: Vec<Node>,
}

/// `TYPE name ... END TYPE` definition.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedType {
    pub span: Span,
    pub open: Stmt,
    pub components: Vec<Node>,
    pub contains: Option<ContainsSection>,
    pub end: Option<Stmt>,
}

impl DerivedType {
    pub fn name(&self) -> Option<&str> {
        match &self.open.kind {
            StmtKind::DerivedTypeDef { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// A DO, block IF, WHERE, FORALL, or SELECT CASE construct.
#[derive(Debug, Clone, PartialEq)]
pub struct Construct {
    pub span: Span,
    pub kind: ConstructKind,
    pub open: Stmt,
    /// Statements before the first clause (for IF, the THEN branch; for
    /// SELECT CASE, normally empty).
    pub body: Vec<Node>,
    pub clauses: Vec<Clause>,
    pub end: Option<Stmt>,
}

impl Construct {
    pub fn block_label(&self) -> Option<&str> {
        match &self.open.kind {
            StmtKind::Do { block_label, .. }
            | StmtKind::BlockIf { block_label, .. }
            | StmtKind::BlockWhere { block_label, .. }
            | StmtKind::BlockForall { block_label, .. }
            | StmtKind::SelectCase { block_label, .. } => block_label.as_deref(),
            _ => None,
        }
    }
}

/// One `ELSE IF`/`ELSE`/`ELSEWHERE`/`CASE` arm and its statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub span: Span,
    pub open: Stmt,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Unit(UnitKind),
    Construct(ConstructKind),
    DerivedType,
}

fn unit_end_kind(kind: UnitKind) -> EndKind {
    match kind {
        UnitKind::Program => EndKind::Program,
        UnitKind::Module => EndKind::Module,
        UnitKind::Subroutine => EndKind::Subroutine,
        UnitKind::Function => EndKind::Function,
        UnitKind::Interface => EndKind::Interface,
    }
}

fn construct_end_kind(kind: ConstructKind) -> EndKind {
    match kind {
        ConstructKind::Do => EndKind::Do,
        ConstructKind::If => EndKind::If,
        ConstructKind::Where => EndKind::Where,
        ConstructKind::Forall => EndKind::Forall,
        ConstructKind::Select => EndKind::Select,
    }
}

/// Does this statement close the given scope? A bare `END` closes program
/// units and derived types but never constructs, and `END INTERFACE` must be
/// spelled out.
fn closes(scope: Scope, kind: &StmtKind) -> bool {
    let StmtKind::End { kind: end_kind, .. } = kind else {
        return false;
    };
    match scope {
        Scope::Unit(UnitKind::Interface) => *end_kind == Some(EndKind::Interface),
        Scope::Unit(u) => match end_kind {
            None => true,
            Some(k) => *k == unit_end_kind(u),
        },
        Scope::DerivedType => matches!(end_kind, None | Some(EndKind::Type)),
        Scope::Construct(c) => *end_kind == Some(construct_end_kind(c)),
    }
}

/// Does this statement open a new clause of the given scope?
fn continues(scope: Scope, kind: &StmtKind) -> bool {
    match (scope, kind) {
        (Scope::Construct(ConstructKind::If), StmtKind::ElseIf { .. } | StmtKind::Else { .. }) => {
            true
        }
        (Scope::Construct(ConstructKind::Where), StmtKind::Elsewhere { .. }) => true,
        (Scope::Construct(ConstructKind::Select), StmtKind::Case { .. }) => true,
        _ => false,
    }
}

fn is_specification(kind: &StmtKind) -> bool {
    matches!(
        kind,
        StmtKind::Use { .. }
            | StmtKind::Implicit(_)
            | StmtKind::Import { .. }
            | StmtKind::Public
            | StmtKind::Private
            | StmtKind::Sequence
            | StmtKind::Namelist { .. }
            | StmtKind::Declaration { .. }
            | StmtKind::Modification { .. }
            | StmtKind::Parameter(_)
            | StmtKind::Equivalence(_)
            | StmtKind::ProcedureBinding { .. }
            | StmtKind::Include { .. }
            | StmtKind::Format(_)
            | StmtKind::Comment
    )
}

fn is_unit_opener(kind: &StmtKind) -> bool {
    matches!(
        kind,
        StmtKind::Program { .. }
            | StmtKind::Module { .. }
            | StmtKind::Subroutine { .. }
            | StmtKind::Function { .. }
    )
}

struct Builder {
    /// Remaining statements, reversed so the next one is at the back.
    stmts: Vec<Stmt>,
    scopes: Vec<Scope>,
    errors: usize,
}

impl Builder {
    fn peek(&self) -> Option<&Stmt> {
        self.stmts.last()
    }

    // Callers check peek() first.
    fn advance(&mut self) -> Stmt {
        match self.stmts.pop() {
            Some(stmt) => stmt,
            None => unreachable!("advance past end of statement stream"),
        }
    }

    fn error(&mut self, span: Span, message: impl Into<String>) -> Node {
        let message = message.into();
        log::warn!("structure error at bytes {span}: {message}");
        self.errors += 1;
        Node::Error(ErrorNode { span, message })
    }

    /// Would some scope outside the innermost one consume this statement?
    /// If so the inner scope must give up on it and close unterminated.
    fn outer_accepts(&self, kind: &StmtKind) -> bool {
        let outer = &self.scopes[..self.scopes.len().saturating_sub(1)];
        outer.iter().rev().any(|scope| {
            closes(*scope, kind)
                || continues(*scope, kind)
                || (matches!(kind, StmtKind::Contains)
                    && (matches!(scope, Scope::Unit(u) if *u != UnitKind::Interface)
                        || matches!(scope, Scope::DerivedType)))
        })
    }

    /// Consume one statement and produce the node it starts. Openers pull in
    /// their whole block.
    fn node(&mut self) -> Node {
        let stmt = self.advance();
        match stmt.kind {
            StmtKind::Program { .. } => Node::Unit(self.unit(UnitKind::Program, stmt)),
            StmtKind::Module { .. } => Node::Unit(self.unit(UnitKind::Module, stmt)),
            StmtKind::Subroutine { .. } => Node::Unit(self.unit(UnitKind::Subroutine, stmt)),
            StmtKind::Function { .. } => Node::Unit(self.unit(UnitKind::Function, stmt)),
            StmtKind::Interface { .. } => Node::Unit(self.unit(UnitKind::Interface, stmt)),
            StmtKind::DerivedTypeDef { .. } => Node::DerivedType(self.derived_type(stmt)),
            StmtKind::Do { .. } => Node::Construct(self.construct(ConstructKind::Do, stmt)),
            StmtKind::BlockIf { .. } => Node::Construct(self.construct(ConstructKind::If, stmt)),
            StmtKind::BlockWhere { .. } => {
                Node::Construct(self.construct(ConstructKind::Where, stmt))
            }
            StmtKind::BlockForall { .. } => {
                Node::Construct(self.construct(ConstructKind::Forall, stmt))
            }
            StmtKind::SelectCase { .. } => {
                Node::Construct(self.construct(ConstructKind::Select, stmt))
            }
            StmtKind::Error { ref message } => {
                let message = message.clone();
                self.errors += 1;
                Node::Error(ErrorNode {
                    span: stmt.span,
                    message,
                })
            }
            StmtKind::End { .. } => self.error(stmt.span, "END without a matching opener"),
            StmtKind::ElseIf { .. } | StmtKind::Else { .. } => {
                self.error(stmt.span, "ELSE outside an IF construct")
            }
            StmtKind::Elsewhere { .. } => {
                self.error(stmt.span, "ELSEWHERE outside a WHERE construct")
            }
            StmtKind::Case { .. } => self.error(stmt.span, "CASE outside a SELECT CASE construct"),
            StmtKind::Contains => self.error(stmt.span, "CONTAINS outside a program unit"),
            _ => Node::Statement(stmt),
        }
    }

    fn unit(&mut self, kind: UnitKind, open: Stmt) -> ProgramUnit {
        self.scopes.push(Scope::Unit(kind));
        let mut specification = Vec::new();
        let mut body = Vec::new();
        let mut contains: Option<ContainsSection> = None;
        let mut end = None;
        let mut in_body = kind == UnitKind::Interface;
        while let Some(next) = self.peek() {
            if closes(Scope::Unit(kind), &next.kind) {
                end = Some(self.advance());
                break;
            }
            match &next.kind {
                StmtKind::End { .. }
                | StmtKind::ElseIf { .. }
                | StmtKind::Else { .. }
                | StmtKind::Elsewhere { .. }
                | StmtKind::Case { .. } => {
                    if self.outer_accepts(&next.kind) {
                        break;
                    }
                    let stmt = self.advance();
                    let node = self.error(stmt.span, "statement closes nothing here");
                    sink(&mut specification, &mut body, &mut contains, in_body).push(node);
                }
                StmtKind::Contains => {
                    let stmt = self.advance();
                    if contains.is_some() {
                        let node = self.error(stmt.span, "duplicate CONTAINS");
                        sink(&mut specification, &mut body, &mut contains, in_body).push(node);
                    } else {
                        contains = Some(ContainsSection {
                            span: stmt.span,
                            open: stmt,
                            items: Vec::new(),
                        });
                    }
                }
                StmtKind::Program { .. } | StmtKind::Module { .. } => break,
                StmtKind::Subroutine { .. } | StmtKind::Function { .. } => {
                    // Internal procedure after CONTAINS, interface body
                    // procedure, or the start of the next top-level unit.
                    if contains.is_some() || kind == UnitKind::Interface {
                        let node = self.node();
                        sink(&mut specification, &mut body, &mut contains, in_body).push(node);
                    } else {
                        break;
                    }
                }
                _ => {
                    // Interfaces and derived types sit in the specification
                    // part; anything else non-declarative starts the body.
                    if contains.is_none()
                        && !in_body
                        && !is_specification(&next.kind)
                        && !matches!(
                            next.kind,
                            StmtKind::Interface { .. } | StmtKind::DerivedTypeDef { .. }
                        )
                    {
                        in_body = true;
                    }
                    let node = self.node();
                    sink(&mut specification, &mut body, &mut contains, in_body).push(node);
                }
            }
        }
        self.scopes.pop();
        if end.is_none() {
            self.errors += 1;
            log::warn!("unterminated {kind:?} unit at bytes {}", open.span);
        }
        let mut span = open.span;
        for n in specification.iter().chain(&body) {
            span = span.cover(n.span());
        }
        if let Some(c) = &mut contains {
            c.span = c.items.iter().map(Node::span).fold(c.span, Span::cover);
            span = span.cover(c.span);
        }
        if let Some(e) = &end {
            span = span.cover(e.span);
        }
        ProgramUnit {
            span,
            kind,
            open,
            specification,
            body,
            contains,
            end,
        }
    }

    fn derived_type(&mut self, open: Stmt) -> DerivedType {
        self.scopes.push(Scope::DerivedType);
        let mut components: Vec<Node> = Vec::new();
        let mut contains: Option<ContainsSection> = None;
        let mut end = None;
        while let Some(next) = self.peek() {
            if closes(Scope::DerivedType, &next.kind) {
                end = Some(self.advance());
                break;
            }
            match &next.kind {
                StmtKind::End { .. } => {
                    if self.outer_accepts(&next.kind) {
                        break;
                    }
                    let stmt = self.advance();
                    let node = self.error(stmt.span, "statement closes nothing here");
                    contains
                        .as_mut()
                        .map(|c| &mut c.items)
                        .unwrap_or(&mut components)
                        .push(node);
                }
                StmtKind::Contains => {
                    let stmt = self.advance();
                    if contains.is_some() {
                        let node = self.error(stmt.span, "duplicate CONTAINS");
                        if let Some(c) = &mut contains {
                            c.items.push(node);
                        }
                    } else {
                        contains = Some(ContainsSection {
                            span: stmt.span,
                            open: stmt,
                            items: Vec::new(),
                        });
                    }
                }
                k if is_unit_opener(k) => break,
                StmtKind::Declaration { .. }
                | StmtKind::Modification { .. }
                | StmtKind::Sequence
                | StmtKind::ProcedureBinding { .. }
                | StmtKind::Include { .. }
                | StmtKind::Comment => {
                    let stmt = self.advance();
                    contains
                        .as_mut()
                        .map(|c| &mut c.items)
                        .unwrap_or(&mut components)
                        .push(Node::Statement(stmt));
                }
                StmtKind::Error { .. } => {
                    let node = self.node();
                    contains
                        .as_mut()
                        .map(|c| &mut c.items)
                        .unwrap_or(&mut components)
                        .push(node);
                }
                _ => {
                    let stmt = self.advance();
                    let node = self.error(stmt.span, "statement not allowed in a derived type");
                    contains
                        .as_mut()
                        .map(|c| &mut c.items)
                        .unwrap_or(&mut components)
                        .push(node);
                }
            }
        }
        self.scopes.pop();
        if end.is_none() {
            self.errors += 1;
            log::warn!("unterminated derived type at bytes {}", open.span);
        }
        let mut span = open.span;
        for n in &components {
            span = span.cover(n.span());
        }
        if let Some(c) = &mut contains {
            c.span = c.items.iter().map(Node::span).fold(c.span, Span::cover);
            span = span.cover(c.span);
        }
        if let Some(e) = &end {
            span = span.cover(e.span);
        }
        DerivedType {
            span,
            open,
            components,
            contains,
            end,
        }
    }

    fn construct(&mut self, kind: ConstructKind, open: Stmt) -> Construct {
        self.scopes.push(Scope::Construct(kind));
        let mut body: Vec<Node> = Vec::new();
        let mut clauses: Vec<Clause> = Vec::new();
        let mut end = None;
        while let Some(next) = self.peek() {
            if closes(Scope::Construct(kind), &next.kind) {
                end = Some(self.advance());
                break;
            }
            if continues(Scope::Construct(kind), &next.kind) {
                let stmt = self.advance();
                clauses.push(Clause {
                    span: stmt.span,
                    open: stmt,
                    body: Vec::new(),
                });
                continue;
            }
            match &next.kind {
                StmtKind::End { .. }
                | StmtKind::ElseIf { .. }
                | StmtKind::Else { .. }
                | StmtKind::Elsewhere { .. }
                | StmtKind::Case { .. }
                | StmtKind::Contains => {
                    if self.outer_accepts(&next.kind) {
                        break;
                    }
                    let stmt = self.advance();
                    let node = self.error(stmt.span, "statement closes nothing here");
                    clauses
                        .last_mut()
                        .map(|c| &mut c.body)
                        .unwrap_or(&mut body)
                        .push(node);
                }
                k if is_unit_opener(k) => break,
                k if kind == ConstructKind::Select
                    && clauses.is_empty()
                    && !matches!(*k, StmtKind::Comment) =>
                {
                    // Only trivia may sit between SELECT CASE and its first
                    // CASE.
                    let stmt = self.advance();
                    let node = self.error(stmt.span, "statement before the first CASE");
                    body.push(node);
                }
                _ => {
                    let node = self.node();
                    clauses
                        .last_mut()
                        .map(|c| &mut c.body)
                        .unwrap_or(&mut body)
                        .push(node);
                }
            }
        }
        self.scopes.pop();
        if end.is_none() {
            self.errors += 1;
            log::warn!("unterminated {kind:?} construct at bytes {}", open.span);
        }
        let mut span = open.span;
        for n in &body {
            span = span.cover(n.span());
        }
        for c in &mut clauses {
            c.span = c.body.iter().map(Node::span).fold(c.span, Span::cover);
            span = span.cover(c.span);
        }
        if let Some(e) = &end {
            span = span.cover(e.span);
        }
        Construct {
            span,
            kind,
            open,
            body,
            clauses,
            end,
        }
    }
}

fn sink<'a>(
    specification: &'a mut Vec<Node>,
    body: &'a mut Vec<Node>,
    contains: &'a mut Option<ContainsSection>,
    in_body: bool,
) -> &'a mut Vec<Node> {
    if let Some(c) = contains {
        &mut c.items
    } else if in_body {
        body
    } else {
        specification
    }
}

/// Assemble the statement stream into a [`TranslationUnit`]. Top level
/// accepts program units, and leniently also bare statements and constructs
/// so fragments can be parsed.
pub fn build(stmts: Vec<Stmt>) -> TranslationUnit {
    let mut stmts = stmts;
    stmts.reverse();
    let mut builder = Builder {
        stmts,
        scopes: Vec::new(),
        errors: 0,
    };
    let mut items = Vec::new();
    while builder.peek().is_some() {
        items.push(builder.node());
    }
    let span = items
        .iter()
        .map(Node::span)
        .reduce(Span::cover)
        .unwrap_or(Span::new(0, 0));
    TranslationUnit {
        span,
        items,
        errors: builder.errors,
    }
}
