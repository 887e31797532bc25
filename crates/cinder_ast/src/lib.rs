pub mod display;
pub mod operation;

use std::collections::HashMap;

use cinder_type::{Id, Store, definition::DefinitionId, span::Span, types::TypeId, value::LiteralValue};

pub use display::ExprPrinter;
pub use operation::{BinaryOperation, UnaryOperation};

pub type ExprId = Id<Expression>;
pub type StmtId = Id<Statement>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
  Literal(LiteralValue),
  /// Address of a declaration plus a byte offset.
  SymOff {
    var: DefinitionId,
    offset: u64,
  },
  Var(DefinitionId),
  /// Implicit receiver. `None` only if an earlier pass failed to resolve it.
  This(Option<DefinitionId>),
  /// Base-class receiver; rewritten away before nested-reference analysis.
  Super(Option<DefinitionId>),
  /// A local declaration used in expression position. Its initializer lives
  /// in [`Ast::var_inits`].
  Declaration(DefinitionId),
  New {
    this_arg: Option<ExprId>,
    /// Allocator arguments (`new(a, b) T`).
    new_args: Vec<ExprId>,
    /// Constructor arguments.
    arguments: Vec<ExprId>,
  },
  Unary {
    operation: UnaryOperation,
    operand: ExprId,
  },
  Binary {
    operation: BinaryOperation,
    left: ExprId,
    right: ExprId,
  },
  Call {
    callee: ExprId,
    args: Vec<ExprId>,
  },
  Index {
    base: ExprId,
    index: ExprId,
    /// Synthetic `$` declaration visible inside `index`. Not owned by the
    /// definition store's parent chain: the scanner re-points it.
    length_var: Option<DefinitionId>,
  },
  Slice {
    base: ExprId,
    lower: Option<ExprId>,
    upper: Option<ExprId>,
    length_var: Option<DefinitionId>,
  },
  ArrayLiteral {
    elements: Vec<ExprId>,
  },
  /// Array operation with an auxiliary argument list (`a[args]` on a
  /// user-defined indexable).
  Array {
    base: ExprId,
    args: Vec<ExprId>,
  },
  Cond {
    condition: ExprId,
    then_branch: ExprId,
    else_branch: ExprId,
  },
  /// Closure-valued expression hosting a function literal.
  Function(DefinitionId),

  // Error recovery
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
  pub kind: ExprKind,
  pub type_id: TypeId,
  pub span: Span,
}

impl Expression {
  pub fn new(
    kind: ExprKind,
    type_id: TypeId,
    span: Span,
  ) -> Self {
    Self { kind, type_id, span }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
  Return { value: Option<ExprId>, span: Span },
}

#[derive(Debug, Clone, Default)]
pub struct Ast {
  pub nodes: Store<Expression>,
  pub statements: Store<Statement>,
  pub function_bodies: HashMap<DefinitionId, StmtId>,
  pub var_inits: HashMap<DefinitionId, ExprId>,
}

impl Ast {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn alloc(
    &mut self,
    expr: Expression,
  ) -> ExprId {
    self.nodes.alloc(expr)
  }

  pub fn alloc_statement(
    &mut self,
    stmt: Statement,
  ) -> StmtId {
    self.statements.alloc(stmt)
  }

  pub fn get(
    &self,
    id: &ExprId,
  ) -> &Expression {
    self.nodes.get(id)
  }

  pub fn get_mut(
    &mut self,
    id: &ExprId,
  ) -> &mut Expression {
    self.nodes.get_mut(id)
  }

  pub fn statement(
    &self,
    id: &StmtId,
  ) -> &Statement {
    self.statements.get(id)
  }

  pub fn function_body(
    &self,
    def: &DefinitionId,
  ) -> Option<StmtId> {
    self.function_bodies.get(def).copied()
  }

  /// Expression returned by a single-`return` function body.
  pub fn returned_expression(
    &self,
    def: &DefinitionId,
  ) -> Option<ExprId> {
    let body = self.function_body(def)?;
    match self.statement(&body) {
      Statement::Return { value, .. } => *value,
    }
  }

  /// Direct sub-expressions in the order nested-reference scanning visits them.
  pub fn children(
    &self,
    id: &ExprId,
  ) -> Vec<ExprId> {
    match &self.get(id).kind {
      ExprKind::Literal(_)
      | ExprKind::SymOff { .. }
      | ExprKind::Var(_)
      | ExprKind::This(_)
      | ExprKind::Super(_)
      | ExprKind::Declaration(_)
      | ExprKind::Function(_)
      | ExprKind::Error => Vec::new(),
      ExprKind::New {
        this_arg,
        new_args,
        arguments,
      } => this_arg.iter().chain(new_args).chain(arguments).copied().collect(),
      ExprKind::Unary { operand, .. } => vec![*operand],
      ExprKind::Binary { left, right, .. } => vec![*left, *right],
      ExprKind::Call { callee, args } => std::iter::once(callee).chain(args).copied().collect(),
      ExprKind::Index { base, index, .. } => vec![*base, *index],
      ExprKind::Slice { base, lower, upper, .. } => std::iter::once(base).chain(lower).chain(upper).copied().collect(),
      ExprKind::ArrayLiteral { elements } => elements.clone(),
      ExprKind::Array { base, args } => std::iter::once(base).chain(args).copied().collect(),
      ExprKind::Cond {
        condition,
        then_branch,
        else_branch,
      } => vec![*condition, *then_branch, *else_branch],
    }
  }

  /// Number of nodes in the tree rooted at `root`, counting shared subtrees
  /// once per path.
  pub fn reachable_count(
    &self,
    root: &ExprId,
  ) -> usize {
    let mut count = 0;
    let mut stack = vec![*root];

    while let Some(id) = stack.pop() {
      count += 1;
      stack.extend(self.children(&id));
    }

    count
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use cinder_type::types::TypeStore;

  fn literal(
    ast: &mut Ast,
    types: &TypeStore,
    value: i64,
  ) -> ExprId {
    ast.alloc(Expression::new(
      ExprKind::Literal(LiteralValue::Int(value)),
      types.i32(),
      Span::default(),
    ))
  }

  #[test]
  fn slice_children_skip_missing_bounds() {
    let types = TypeStore::new();
    let mut ast = Ast::new();
    let base = literal(&mut ast, &types, 1);
    let upper = literal(&mut ast, &types, 2);
    let slice = ast.alloc(Expression::new(
      ExprKind::Slice {
        base,
        lower: None,
        upper: Some(upper),
        length_var: None,
      },
      types.i32(),
      Span::default(),
    ));

    assert_eq!(ast.children(&slice), vec![base, upper]);
    assert_eq!(ast.reachable_count(&slice), 3);
  }

  #[test]
  fn new_children_follow_receiver_allocator_constructor_order() {
    let types = TypeStore::new();
    let mut ast = Ast::new();
    let receiver = literal(&mut ast, &types, 0);
    let alloc_arg = literal(&mut ast, &types, 1);
    let ctor_arg = literal(&mut ast, &types, 2);
    let new = ast.alloc(Expression::new(
      ExprKind::New {
        this_arg: Some(receiver),
        new_args: vec![alloc_arg],
        arguments: vec![ctor_arg],
      },
      types.i32(),
      Span::default(),
    ));

    assert_eq!(ast.children(&new), vec![receiver, alloc_arg, ctor_arg]);
  }
}
