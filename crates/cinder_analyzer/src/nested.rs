use cinder_ast::{Ast, ExprId, ExprKind, ExprPrinter};
use cinder_config::{CinderConfig, DebugTrace};
use cinder_log::{log_trc, trace_dbg};
use cinder_type::{
  definition::{DefinitionId, DefinitionStore, NestedRef, NestedRefFlags},
  symbol::SymbolTable,
  types::TypeStore,
};

use crate::scope::Scope;

/// Counters collected during one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
  pub nodes_visited: usize,
  /// Declarations handed to `check_nested_reference`.
  pub references_checked: usize,
  /// References that flipped a capture flag.
  pub captures: usize,
}

/// Walks an expression tree and reports every direct declaration reference
/// to the definition store, which decides whether it crosses a function
/// boundary.
pub struct NestedRefScanner<'a> {
  ast: &'a Ast,
  defs: &'a mut DefinitionStore,
  types: &'a TypeStore,
  symbols: &'a SymbolTable,
  config: &'a CinderConfig,
  stats: ScanStats,
}

impl<'a> NestedRefScanner<'a> {
  pub fn new(
    ast: &'a Ast,
    defs: &'a mut DefinitionStore,
    types: &'a TypeStore,
    symbols: &'a SymbolTable,
    config: &'a CinderConfig,
  ) -> Self {
    Self {
      ast,
      defs,
      types,
      symbols,
      config,
      stats: ScanStats::default(),
    }
  }

  pub fn scan(
    mut self,
    expr: &ExprId,
    scope: &Scope,
  ) -> ScanStats {
    self.visit(expr, scope);
    self.stats
  }

  fn visit(
    &mut self,
    id: &ExprId,
    scope: &Scope,
  ) {
    self.stats.nodes_visited += 1;
    let node = self.ast.get(id);

    match &node.kind {
      ExprKind::Literal(_) | ExprKind::Function(_) | ExprKind::Error => {},
      ExprKind::SymOff { var, .. } | ExprKind::Var(var) => {
        if self.defs.is_var_declaration(var) {
          self.check_reference(var, scope);
        }
      },
      ExprKind::This(receiver) => {
        let Some(receiver) = receiver else {
          panic!(
            "internal error: `this` without a resolved receiver at {}: {}",
            node.span,
            self.describe(id)
          );
        };
        self.check_reference(receiver, scope);
      },
      ExprKind::Super(_) => {
        panic!(
          "internal error: `super` reached nested-reference scanning at {}: {}",
          node.span,
          self.describe(id)
        );
      },
      ExprKind::Declaration(def) => {
        // Initializers of declarations in expression position are not scanned.
        trace_dbg!(
          self.config,
          DebugTrace::Nested,
          "declaration `{}` left unscanned",
          self.symbols.get(&self.defs.get(def).name)
        );
      },
      ExprKind::New {
        this_arg,
        new_args,
        arguments,
      } => {
        if let Some(receiver) = this_arg {
          self.visit(receiver, scope);
        }
        self.visit_all(new_args, scope);
        self.visit_all(arguments, scope);
      },
      ExprKind::Unary { operand, .. } => self.visit(operand, scope),
      ExprKind::Binary { left, right, .. } => {
        self.visit(left, scope);
        self.visit(right, scope);
      },
      ExprKind::Call { callee, args } => {
        self.visit(callee, scope);
        self.visit_all(args, scope);
      },
      ExprKind::Index {
        base,
        index,
        length_var,
      } => {
        self.visit(base, scope);
        if let Some(length_var) = length_var {
          self.reattribute(length_var, scope);
        }
        self.visit(index, scope);
      },
      ExprKind::Slice {
        base,
        lower,
        upper,
        length_var,
      } => {
        self.visit(base, scope);
        if let Some(length_var) = length_var {
          self.reattribute(length_var, scope);
        }
        if let Some(lower) = lower {
          self.visit(lower, scope);
        }
        if let Some(upper) = upper {
          self.visit(upper, scope);
        }
      },
      ExprKind::ArrayLiteral { elements } => self.visit_all(elements, scope),
      ExprKind::Array { base, args } => {
        self.visit(base, scope);
        self.visit_all(args, scope);
      },
      ExprKind::Cond {
        condition,
        then_branch,
        else_branch,
      } => {
        self.visit(condition, scope);
        self.visit(then_branch, scope);
        self.visit(else_branch, scope);
      },
    }
  }

  fn visit_all(
    &mut self,
    ids: &[ExprId],
    scope: &Scope,
  ) {
    for id in ids {
      self.visit(id, scope);
    }
  }

  fn check_reference(
    &mut self,
    var: &DefinitionId,
    scope: &Scope,
  ) {
    self.stats.references_checked += 1;

    let outcome = self
      .defs
      .check_nested_reference(var, scope.context.as_ref(), NestedRefFlags::NONE);

    log_trc!(
      self.config,
      "`{}` against `{}`: {:?}",
      self.name(var),
      self.context_name(scope),
      outcome
    );

    if outcome == NestedRef::Captured {
      self.stats.captures += 1;
      trace_dbg!(
        self.config,
        DebugTrace::Nested,
        "captured `{}` from `{}`",
        self.name(var),
        self.context_name(scope)
      );
    }
  }

  /// The `$` length variable is created once but may be scanned under
  /// several owners as delegates are wrapped around its expression.
  fn reattribute(
    &mut self,
    length_var: &DefinitionId,
    scope: &Scope,
  ) {
    self.defs.get_mut(length_var).parent = scope.context;
  }

  fn name(
    &self,
    def: &DefinitionId,
  ) -> &'a str {
    self.symbols.get(&self.defs.get(def).name)
  }

  fn context_name(
    &self,
    scope: &Scope,
  ) -> &'a str {
    scope.context.map(|c| self.name(&c)).unwrap_or("<module>")
  }

  fn describe(
    &self,
    id: &ExprId,
  ) -> String {
    ExprPrinter::new(self.ast, self.types, self.defs, self.symbols).print(id)
  }
}
