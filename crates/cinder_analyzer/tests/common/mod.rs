#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use cinder_analyzer::Analyzer;
use cinder_ast::{BinaryOperation, ExprId, ExprKind, ExprPrinter, Expression, UnaryOperation};
use cinder_config::CinderConfig;
use cinder_type::{
  definition::{DefinitionId, Storage},
  span::Span,
  symbol::SymbolTable,
  types::TypeId,
  value::LiteralValue,
};

/// An analyzer with one function `outer` already entered, plus expression
/// builders.
pub struct Fixture {
  pub analyzer: Analyzer,
  pub outer: DefinitionId,
}

impl Fixture {
  pub fn new() -> Self {
    let symbols = Rc::new(RefCell::new(SymbolTable::new()));
    let mut analyzer = Analyzer::new(symbols, Arc::new(CinderConfig::quiet()));

    let int = analyzer.types().i32();
    let outer = analyzer.declare_function("outer", Vec::new(), int, None, Span::synthetic());
    analyzer.enter_function(outer);

    Self { analyzer, outer }
  }

  pub fn int(&self) -> TypeId {
    self.analyzer.types().i32()
  }

  pub fn local(
    &mut self,
    name: &str,
  ) -> DefinitionId {
    self.local_at(name, Span::synthetic())
  }

  pub fn local_at(
    &mut self,
    name: &str,
    span: Span,
  ) -> DefinitionId {
    let int = self.int();
    let outer = self.outer;
    self.analyzer.declare_variable(name, int, Storage::Stack, Some(outer), span)
  }

  pub fn function(
    &mut self,
    name: &str,
    parent: DefinitionId,
  ) -> DefinitionId {
    let int = self.int();
    self.analyzer.declare_function(name, Vec::new(), int, Some(parent), Span::synthetic())
  }

  /// Delegate `expr` from whatever scope is current.
  pub fn to_delegate(
    &mut self,
    expr: ExprId,
    result_type: TypeId,
  ) -> ExprId {
    let scope = self.analyzer.scopes().current();
    self.analyzer.to_delegate(expr, result_type, &scope)
  }

  pub fn captured(
    &self,
    def: DefinitionId,
  ) -> bool {
    self.analyzer.defs().is_captured(&def)
  }

  pub fn node(
    &mut self,
    kind: ExprKind,
  ) -> ExprId {
    let int = self.int();
    self.typed(kind, int)
  }

  pub fn typed(
    &mut self,
    kind: ExprKind,
    type_id: TypeId,
  ) -> ExprId {
    self
      .analyzer
      .ast_mut()
      .alloc(Expression::new(kind, type_id, Span::synthetic()))
  }

  pub fn lit(
    &mut self,
    value: i64,
  ) -> ExprId {
    self.node(ExprKind::Literal(LiteralValue::Int(value)))
  }

  pub fn var(
    &mut self,
    def: DefinitionId,
  ) -> ExprId {
    let type_id = self.analyzer.defs().type_of(&def);
    self.typed(ExprKind::Var(def), type_id)
  }

  pub fn add(
    &mut self,
    left: ExprId,
    right: ExprId,
  ) -> ExprId {
    self.node(ExprKind::Binary {
      operation: BinaryOperation::Add,
      left,
      right,
    })
  }

  pub fn neg(
    &mut self,
    operand: ExprId,
  ) -> ExprId {
    self.node(ExprKind::Unary {
      operation: UnaryOperation::Neg,
      operand,
    })
  }

  pub fn call(
    &mut self,
    callee: ExprId,
    args: Vec<ExprId>,
  ) -> ExprId {
    self.node(ExprKind::Call { callee, args })
  }

  pub fn index(
    &mut self,
    base: ExprId,
    index: ExprId,
    length_var: Option<DefinitionId>,
  ) -> ExprId {
    self.node(ExprKind::Index {
      base,
      index,
      length_var,
    })
  }

  pub fn print(
    &self,
    expr: ExprId,
  ) -> String {
    let symbols = self.analyzer.symbols();
    let symbols = symbols.borrow();
    let printed = ExprPrinter::new(
      self.analyzer.ast(),
      self.analyzer.types(),
      self.analyzer.defs(),
      &symbols,
    )
    .print(&expr);
    printed
  }

  pub fn name_of(
    &self,
    def: DefinitionId,
  ) -> String {
    let symbols = self.analyzer.symbols();
    let symbols = symbols.borrow();
    let name = symbols.get(&self.analyzer.defs().get(&def).name).to_string();
    name
  }
}
