mod common;

use std::panic::{AssertUnwindSafe, catch_unwind};

use cinder_ast::{BinaryOperation, ExprKind, Statement};
use cinder_diagnostics::diagnostic_report::Severity;
use cinder_type::{
  BytePosition,
  definition::{LiteralKind, Storage},
  file::FileId,
  span::Span,
  types::format_type,
  value::LiteralValue,
};
use common::Fixture;

fn literal_of(
  fx: &Fixture,
  expr: cinder_ast::ExprId,
) -> cinder_type::definition::DefinitionId {
  match fx.analyzer.ast().get(&expr).kind {
    ExprKind::Function(def) => def,
    ref other => panic!("expected a function expression, got {:?}", other),
  }
}

#[test]
fn outer_local_is_captured_by_delegate() {
  let mut fx = Fixture::new();
  let x = fx.local("x");
  let int = fx.int();

  let expr = fx.var(x);
  let dg = fx.to_delegate(expr, int);

  assert!(fx.captured(x));
  assert!(fx.analyzer.diagnostics().is_empty());

  let outer = fx.analyzer.defs().as_function(&fx.outer).unwrap();
  assert!(outer.nested_frame_ref);
  assert_eq!(outer.closure_vars, vec![x]);
  assert!(fx.analyzer.defs().needs_closure(&fx.outer));

  let literal = literal_of(&fx, dg);
  assert_eq!(fx.analyzer.defs().get(&literal).parent, Some(fx.outer));
}

#[test]
fn literal_only_delegate_captures_nothing() {
  let mut fx = Fixture::new();
  let x = fx.local("x");
  let int = fx.int();

  let one = fx.lit(1);
  let two = fx.lit(2);
  let sum = fx.add(one, two);
  let dg = fx.to_delegate(sum, int);

  assert!(!fx.captured(x));
  assert!(!fx.analyzer.defs().needs_closure(&fx.outer));
  assert_eq!(
    fx.analyzer
      .defs()
      .iter()
      .filter(|(id, _)| fx.analyzer.defs().is_captured(id))
      .count(),
    0
  );
  assert!(matches!(fx.analyzer.ast().get(&dg).kind, ExprKind::Function(_)));
}

#[test]
fn delegate_is_zero_argument_and_returns_the_expression() {
  let mut fx = Fixture::new();
  let x = fx.local("x");
  let int = fx.int();

  let var = fx.var(x);
  let one = fx.lit(1);
  let expr = fx.add(var, one);
  let dg = fx.to_delegate(expr, int);

  let types = fx.analyzer.types();
  let type_id = fx.analyzer.ast().get(&dg).type_id;
  let (params, ret) = types.delegate_signature(&type_id).unwrap();
  assert!(types.is_delegate(&type_id));
  assert!(params.is_empty());
  assert_eq!(ret, int);
  assert_eq!(format_type(types, &type_id), "int delegate()");

  let literal = literal_of(&fx, dg);
  let fd = fx.analyzer.defs().as_function(&literal).unwrap();
  assert_eq!(fd.literal, Some(LiteralKind::Delegate));
  assert!(fd.params.is_empty());

  let body = fx.analyzer.ast().function_body(&literal).unwrap();
  assert!(matches!(
    fx.analyzer.ast().statement(&body),
    Statement::Return { value: Some(v), .. } if *v == expr
  ));

  insta::assert_snapshot!(fx.print(dg), @"delegate() { return x + 1; }");
}

#[test]
fn current_scope_is_restored() {
  let mut fx = Fixture::new();
  let x = fx.local("x");
  let int = fx.int();
  let before = fx.analyzer.scopes().current();

  let expr = fx.var(x);
  fx.to_delegate(expr, int);

  assert_eq!(fx.analyzer.scopes().current(), before);
  assert_eq!(fx.analyzer.scopes().context(), Some(fx.outer));
}

#[test]
fn current_scope_is_restored_when_scanning_aborts() {
  let mut fx = Fixture::new();
  let int = fx.int();
  let before = fx.analyzer.scopes().current();

  let sup = fx.node(ExprKind::Super(None));
  let result = catch_unwind(AssertUnwindSafe(|| fx.to_delegate(sup, int)));

  assert!(result.is_err());
  assert_eq!(fx.analyzer.scopes().current(), before);
}

#[test]
fn nested_function_locals_and_outer_locals_are_both_promoted() {
  let mut fx = Fixture::new();
  let x = fx.local("x");
  let int = fx.int();
  let inner = fx.function("inner", fx.outer);
  let y = fx.analyzer.declare_variable("y", int, Storage::Stack, Some(inner), Span::synthetic());
  fx.analyzer.enter_function(inner);

  let vx = fx.var(x);
  let vy = fx.var(y);
  let sum = fx.add(vx, vy);
  fx.to_delegate(sum, int);
  fx.analyzer.exit_scope();

  assert!(fx.captured(x));
  assert!(fx.captured(y));
  assert_eq!(fx.analyzer.defs().as_function(&fx.outer).unwrap().closure_vars, vec![x]);
  assert_eq!(fx.analyzer.defs().as_function(&inner).unwrap().closure_vars, vec![y]);
}

#[test]
fn wider_return_type_accepts_implicit_conversion() {
  let mut fx = Fixture::new();
  let x = fx.local("x");
  let long = fx.analyzer.types().i64();

  let expr = fx.var(x);
  let dg = fx.to_delegate(expr, long);

  let type_id = fx.analyzer.ast().get(&dg).type_id;
  assert_eq!(format_type(fx.analyzer.types(), &type_id), "long delegate()");
  assert!(fx.analyzer.diagnostics().is_empty());
}

#[test]
fn mismatched_return_type_is_reported() {
  let mut fx = Fixture::new();
  let int = fx.int();
  let string = fx.analyzer.types().string();

  let expr = fx.typed(ExprKind::Literal(LiteralValue::String("hi".to_string())), string);
  let dg = fx.to_delegate(expr, int);

  assert!(matches!(fx.analyzer.ast().get(&dg).kind, ExprKind::Error));
  let diags = fx.analyzer.diagnostics();
  assert_eq!(diags.len(), 1);
  assert_eq!(diags[0].error_code, "C0301");
  assert_eq!(diags[0].severity, Severity::Error);
  assert!(diags[0].message.contains("'string'"));
}

#[test]
fn void_delegate_rejects_values() {
  let mut fx = Fixture::new();
  let void = fx.analyzer.types().void();

  let expr = fx.lit(7);
  let dg = fx.to_delegate(expr, void);

  assert!(matches!(fx.analyzer.ast().get(&dg).kind, ExprKind::Error));
  assert_eq!(fx.analyzer.diagnostics()[0].error_code, "C0302");
}

#[test]
fn void_delegate_accepts_void_calls() {
  let mut fx = Fixture::new();
  let void = fx.analyzer.types().void();
  let log = fx.function("log", fx.outer);

  let callee = fx.var(log);
  let call = fx.typed(
    ExprKind::Call {
      callee,
      args: Vec::new(),
    },
    void,
  );
  let dg = fx.to_delegate(call, void);

  let type_id = fx.analyzer.ast().get(&dg).type_id;
  assert_eq!(format_type(fx.analyzer.types(), &type_id), "void delegate()");
  assert!(fx.analyzer.diagnostics().is_empty());
}

#[test]
fn semantic_rejects_non_literals() {
  let mut fx = Fixture::new();
  let x = fx.local("x");

  let expr = fx.var(x);
  let checked = fx.analyzer.semantic_function_expression(expr);

  assert_ne!(checked, expr);
  assert_eq!(fx.analyzer.diagnostics()[0].error_code, "C0304");
}

#[test]
fn semantic_rejects_literals_without_body() {
  let mut fx = Fixture::new();
  let int = fx.int();
  let outer = fx.outer;
  let literal = fx
    .analyzer
    .declare_function_literal(LiteralKind::Delegate, int, Some(outer));
  let fn_type = fx.analyzer.defs().type_of(&literal);

  let expr = fx.typed(ExprKind::Function(literal), fn_type);
  fx.analyzer.semantic_function_expression(expr);

  assert_eq!(fx.analyzer.diagnostics()[0].error_code, "C0303");
}

#[test]
fn function_literals_are_typed_as_pointers() {
  let mut fx = Fixture::new();
  let int = fx.int();
  let outer = fx.outer;
  let literal = fx
    .analyzer
    .declare_function_literal(LiteralKind::Function, int, Some(outer));
  let fn_type = fx.analyzer.defs().type_of(&literal);

  let value = fx.lit(3);
  let body = fx.analyzer.ast_mut().alloc_statement(Statement::Return {
    value: Some(value),
    span: cinder_type::span::Span::synthetic(),
  });
  fx.analyzer.ast_mut().function_bodies.insert(literal, body);

  let expr = fx.typed(ExprKind::Function(literal), fn_type);
  let checked = fx.analyzer.semantic_function_expression(expr);

  assert_eq!(checked, expr);
  let type_id = fx.analyzer.ast().get(&checked).type_id;
  assert_eq!(format_type(fx.analyzer.types(), &type_id), "int function()*");
  insta::assert_snapshot!(fx.print(checked), @"function() { return 3; }");
}

#[test]
fn heap_frames_are_reported_once_per_function() {
  let mut fx = Fixture::new();
  let x = fx.local("x");
  let y = fx.local("y");
  let int = fx.int();

  let vx = fx.var(x);
  fx.to_delegate(vx, int);
  let vy = fx.var(y);
  fx.to_delegate(vy, int);
  fx.analyzer.report_heap_frames();

  let diags = fx.analyzer.diagnostics();
  assert_eq!(diags.len(), 1);
  assert_eq!(diags[0].severity, Severity::Info);
  assert_eq!(diags[0].error_code, "C0401");
  assert!(diags[0].message.contains("'outer'"));
  assert!(diags[0].message.ends_with("x, y"));
}

#[test]
fn dollar_in_index_belongs_to_the_literal() {
  let mut fx = Fixture::new();
  let arr = fx.local("arr");
  let int = fx.int();
  let outer = fx.outer;
  let length_var = fx.analyzer.declare_length_var(Some(outer));

  // arr[$ - 1]
  let base = fx.var(arr);
  let dollar = fx.var(length_var);
  let one = fx.lit(1);
  let bound = fx.node(ExprKind::Binary {
    operation: BinaryOperation::Sub,
    left: dollar,
    right: one,
  });
  let index = fx.index(base, bound, Some(length_var));
  let dg = fx.to_delegate(index, int);

  let literal = literal_of(&fx, dg);
  assert_eq!(fx.analyzer.defs().get(&length_var).parent, Some(literal));
  assert!(!fx.captured(length_var));
  assert!(fx.captured(arr));
  assert_eq!(fx.analyzer.defs().as_function(&outer).unwrap().closure_vars, vec![arr]);

  // Scanning the same tree from `outer` hands `$` back to it.
  let scope = fx.analyzer.scopes().current();
  let stats = fx.analyzer.scan_for_nested_ref(&index, &scope);

  assert_eq!(stats.captures, 0);
  assert_eq!(fx.analyzer.defs().get(&length_var).parent, Some(outer));
  assert!(!fx.captured(length_var));
}

#[test]
fn delegate_context_comes_from_the_given_scope() {
  let mut fx = Fixture::new();
  let x = fx.local("x");
  let int = fx.int();
  let inner = fx.function("inner", fx.outer);
  let inner_scope = fx.analyzer.enter_function(inner);
  fx.analyzer.exit_scope();
  let before = fx.analyzer.scopes().current();

  let expr = fx.var(x);
  let dg = fx.analyzer.to_delegate(expr, int, &inner_scope);

  let literal = literal_of(&fx, dg);
  assert_eq!(fx.analyzer.defs().get(&literal).parent, Some(inner));
  assert!(fx.captured(x));
  assert_eq!(fx.analyzer.scopes().current(), before);
  assert_eq!(fx.analyzer.scopes().context(), Some(fx.outer));
}

#[test]
fn exiting_the_global_scope_is_ignored() {
  let mut fx = Fixture::new();
  fx.analyzer.exit_scope();
  assert_eq!(fx.analyzer.scopes().depth(), 0);

  fx.analyzer.exit_scope();
  assert_eq!(fx.analyzer.scopes().depth(), 0);
  assert_eq!(fx.analyzer.scopes().context(), None);
}

#[test]
fn return_type_errors_name_the_literal() {
  let mut fx = Fixture::new();
  let void = fx.analyzer.types().void();

  let expr = fx.lit(7);
  fx.to_delegate(expr, void);

  let diag = &fx.analyzer.diagnostics()[0];
  assert_eq!(diag.notes, vec!["while checking the body of delegate literal '__dgliteral0'"]);
}

#[test]
fn heap_frame_labels_point_at_captured_declarations() {
  let mut fx = Fixture::new();
  let file = FileId::new(0);
  let x_span = Span::new(file, BytePosition(19), BytePosition(20));
  let y_span = Span::new(file, BytePosition(32), BytePosition(33));
  let x = fx.local_at("x", x_span.clone());
  let y = fx.local_at("y", y_span.clone());
  let int = fx.int();

  let vx = fx.var(x);
  let vy = fx.var(y);
  let sum = fx.add(vx, vy);
  fx.to_delegate(sum, int);
  fx.analyzer.report_heap_frames();

  let diag = &fx.analyzer.diagnostics()[0];
  let spans: Vec<_> = diag.labels.iter().map(|l| l.span.clone()).collect();
  assert_eq!(spans, vec![x_span, y_span]);
  assert_eq!(diag.labels[0].message, "'x' is captured by a delegate");
  assert!(!fx.analyzer.defs().get(&x).span.is_synthetic());
}
