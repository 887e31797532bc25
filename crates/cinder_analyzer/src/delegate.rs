use cinder_ast::{ExprId, ExprKind, Expression, Statement};
use cinder_config::DebugTrace;
use cinder_log::{log_dbg, trace_dbg};
use cinder_type::{definition::LiteralKind, types::{TypeId, format_type}};

use crate::{Analyzer, NestedRefScanner, ScopeId, ScopeKind};

impl Analyzer {
  /// Wrap `expr` in a zero-argument delegate literal returning `result_type`,
  /// nested in the context of `scope`.
  ///
  /// Every declaration `expr` refers to is re-checked against the new
  /// literal, so locals of enclosing functions become captured. The result
  /// has already been through [`Analyzer::semantic_function_expression`] and
  /// is an `Error` node if the expression does not fit `result_type`.
  pub fn to_delegate(
    &mut self,
    expr: ExprId,
    result_type: TypeId,
    scope: &ScopeId,
  ) -> ExprId {
    let span = self.ast.get(&expr).span.clone();
    let context = self.scopes.get_scope(scope).context;
    let literal = self.declare_function_literal(LiteralKind::Delegate, result_type, context);
    self.defs.get_mut(&literal).span = span.clone();

    trace_dbg!(
      &self.config,
      DebugTrace::Delegate,
      "{} returning {}",
      self.symbols.borrow().get(&self.defs.get(&literal).name),
      format_type(&self.types, &result_type)
    );

    let stats = {
      let guard = self.scopes.enter_child(*scope, ScopeKind::DelegateLiteral, Some(literal));
      let scope = guard.current_scope().clone();
      let symbols = self.symbols.borrow();

      let scanner = NestedRefScanner::new(&self.ast, &mut self.defs, &self.types, &symbols, &self.config);
      let stats = scanner.scan(&expr, &scope);
      stats
    };

    log_dbg!(
      &self.config,
      "delegate literal scanned {} node(s), {} new capture(s)",
      stats.nodes_visited,
      stats.captures
    );

    let body = self.ast.alloc_statement(Statement::Return {
      value: Some(expr),
      span: span.clone(),
    });
    self.ast.function_bodies.insert(literal, body);

    let fn_type = self.defs.type_of(&literal);
    let func_expr = self.ast.alloc(Expression::new(ExprKind::Function(literal), fn_type, span));

    self.semantic_function_expression(func_expr)
  }
}
