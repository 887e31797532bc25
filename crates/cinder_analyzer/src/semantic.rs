use cinder_ast::{ExprId, ExprKind, Expression, ExprPrinter};
use cinder_config::DebugTrace;
use cinder_diagnostics::message::DiagnosticMessage;
use cinder_log::trace_dbg;
use cinder_type::{
  definition::LiteralKind,
  span::Span,
  types::format_type,
};

use crate::Analyzer;

impl Analyzer {
  /// Type-check a function literal expression.
  ///
  /// On success the expression is typed as a delegate (or a function pointer
  /// for `function` literals) and returned unchanged. On failure a diagnostic
  /// is recorded and a fresh `Error` node is returned in its place.
  pub fn semantic_function_expression(
    &mut self,
    expr: ExprId,
  ) -> ExprId {
    let span = self.ast.get(&expr).span.clone();

    let ExprKind::Function(literal) = self.ast.get(&expr).kind else {
      let found = self.print(&expr);
      return self.fail(DiagnosticMessage::NotAFunctionLiteral { found, span });
    };

    let Some(fd) = self.defs.as_function(&literal) else {
      let found = self.print(&expr);
      return self.fail(DiagnosticMessage::NotAFunctionLiteral { found, span });
    };

    let Some(kind) = fd.literal else {
      let found = self.print(&expr);
      return self.fail(DiagnosticMessage::NotAFunctionLiteral { found, span });
    };

    let (fn_type, return_type) = (fd.type_id, fd.return_type);

    if self.ast.function_body(&literal).is_none() {
      let name = self.symbols.borrow().get(&self.defs.get(&literal).name).to_string();
      return self.fail(DiagnosticMessage::MissingFunctionLiteralBody { name, span });
    }

    let literal_name = self.symbols.borrow().get(&self.defs.get(&literal).name).to_string();
    let found = match self.ast.returned_expression(&literal) {
      Some(value) => self.ast.get(&value).type_id,
      None => self.types.void(),
    };

    if self.types.is_void(&return_type) {
      if !self.types.is_void(&found) {
        let found = format_type(&self.types, &found);
        return self.fail(DiagnosticMessage::VoidDelegateReturnsValue {
          found,
          literal: literal_name,
          span,
        });
      }
    } else if self.types.is_void(&found) || !self.types.is_implicitly_convertible(&found, &return_type) {
      let expected = format_type(&self.types, &return_type);
      let found = format_type(&self.types, &found);
      return self.fail(DiagnosticMessage::DelegateReturnTypeMismatch {
        expected,
        found,
        literal: literal_name,
        span,
      });
    }

    let type_id = match kind {
      LiteralKind::Delegate => self.types.delegate(fn_type),
      LiteralKind::Function => self.types.pointer(fn_type),
    };
    self.ast.get_mut(&expr).type_id = type_id;

    trace_dbg!(
      &self.config,
      DebugTrace::Semantic,
      "{} : {}",
      self.print(&expr),
      format_type(&self.types, &type_id)
    );

    expr
  }

  fn fail(
    &mut self,
    message: DiagnosticMessage,
  ) -> ExprId {
    let span: Span = message.primary_span();
    self.diagnostics.push(message.report());

    let error = self.types.error();
    self.ast.alloc(Expression::new(ExprKind::Error, error, span))
  }

  fn print(
    &self,
    expr: &ExprId,
  ) -> String {
    let symbols = self.symbols.borrow();
    ExprPrinter::new(&self.ast, &self.types, &self.defs, &symbols).print(expr)
  }
}
