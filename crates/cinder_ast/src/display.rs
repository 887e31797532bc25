use std::fmt::Write;

use cinder_type::{
  definition::{DefinitionId, DefinitionStore, LiteralKind},
  symbol::SymbolTable,
  types::{TypeStore, format_type},
};

use crate::{Ast, ExprId, ExprKind, Statement, UnaryOperation};

/// Renders expressions as source-like text for diagnostics and traces.
pub struct ExprPrinter<'a> {
  ast: &'a Ast,
  types: &'a TypeStore,
  defs: &'a DefinitionStore,
  symbols: &'a SymbolTable,
  output: String,
}

impl<'a> ExprPrinter<'a> {
  pub fn new(
    ast: &'a Ast,
    types: &'a TypeStore,
    defs: &'a DefinitionStore,
    symbols: &'a SymbolTable,
  ) -> Self {
    Self {
      ast,
      types,
      defs,
      symbols,
      output: String::new(),
    }
  }

  pub fn print(
    mut self,
    expr: &ExprId,
  ) -> String {
    self.expr(expr);
    self.output
  }

  fn name(
    &self,
    def: &DefinitionId,
  ) -> &'a str {
    self.symbols.get(&self.defs.get(def).name)
  }

  fn list(
    &mut self,
    items: &[ExprId],
  ) {
    for (i, item) in items.iter().enumerate() {
      if i > 0 {
        self.output.push_str(", ");
      }
      self.expr(item);
    }
  }

  /// Operands that are themselves operators get parentheses.
  fn operand(
    &mut self,
    expr: &ExprId,
  ) {
    let nested = matches!(
      self.ast.get(expr).kind,
      ExprKind::Binary { .. } | ExprKind::Cond { .. }
    );

    if nested {
      self.output.push('(');
      self.expr(expr);
      self.output.push(')');
    } else {
      self.expr(expr);
    }
  }

  fn expr(
    &mut self,
    id: &ExprId,
  ) {
    let node = self.ast.get(id);

    match &node.kind {
      ExprKind::Literal(value) => write!(self.output, "{}", value).unwrap(),
      ExprKind::SymOff { var, offset } => {
        if *offset == 0 {
          write!(self.output, "&{}", self.name(var)).unwrap();
        } else {
          write!(self.output, "&{} + {}", self.name(var), offset).unwrap();
        }
      },
      ExprKind::Var(def) => self.output.push_str(self.name(def)),
      ExprKind::This(_) => self.output.push_str("this"),
      ExprKind::Super(_) => self.output.push_str("super"),
      ExprKind::Declaration(def) => {
        write!(self.output, "auto {}", self.name(def)).unwrap();
        if let Some(init) = self.ast.var_inits.get(def) {
          self.output.push_str(" = ");
          self.expr(init);
        }
      },
      ExprKind::New {
        this_arg,
        new_args,
        arguments,
      } => {
        if let Some(receiver) = this_arg {
          self.operand(receiver);
          self.output.push('.');
        }
        self.output.push_str("new");
        if !new_args.is_empty() {
          self.output.push('(');
          self.list(new_args);
          self.output.push(')');
        }
        write!(self.output, " {}(", format_type(self.types, &node.type_id)).unwrap();
        self.list(arguments);
        self.output.push(')');
      },
      ExprKind::Unary { operation, operand } => {
        if *operation == UnaryOperation::Cast {
          write!(self.output, "cast({})", format_type(self.types, &node.type_id)).unwrap();
        } else {
          self.output.push_str(operation.symbol());
        }
        self.operand(operand);
      },
      ExprKind::Binary { operation, left, right } => {
        self.operand(left);
        if matches!(operation, crate::BinaryOperation::Comma) {
          self.output.push_str(", ");
        } else {
          write!(self.output, " {} ", operation.symbol()).unwrap();
        }
        self.operand(right);
      },
      ExprKind::Call { callee, args } => {
        self.operand(callee);
        self.output.push('(');
        self.list(args);
        self.output.push(')');
      },
      ExprKind::Index { base, index, .. } => {
        self.operand(base);
        self.output.push('[');
        self.expr(index);
        self.output.push(']');
      },
      ExprKind::Slice { base, lower, upper, .. } => {
        self.operand(base);
        self.output.push('[');
        if let Some(lower) = lower {
          self.expr(lower);
          self.output.push_str(" .. ");
          if let Some(upper) = upper {
            self.expr(upper);
          } else {
            self.output.push('$');
          }
        } else if let Some(upper) = upper {
          self.output.push_str("0 .. ");
          self.expr(upper);
        }
        self.output.push(']');
      },
      ExprKind::ArrayLiteral { elements } => {
        self.output.push('[');
        self.list(elements);
        self.output.push(']');
      },
      ExprKind::Array { base, args } => {
        self.operand(base);
        self.output.push('[');
        self.list(args);
        self.output.push(']');
      },
      ExprKind::Cond {
        condition,
        then_branch,
        else_branch,
      } => {
        self.operand(condition);
        self.output.push_str(" ? ");
        self.operand(then_branch);
        self.output.push_str(" : ");
        self.operand(else_branch);
      },
      ExprKind::Function(def) => self.function_literal(def),
      ExprKind::Error => self.output.push_str("<error>"),
    }
  }

  fn function_literal(
    &mut self,
    def: &DefinitionId,
  ) {
    let keyword = match self.defs.as_function(def).and_then(|fd| fd.literal) {
      Some(LiteralKind::Function) => "function",
      _ => "delegate",
    };

    write!(self.output, "{}() {{ ", keyword).unwrap();

    if let Some(body) = self.ast.function_body(def) {
      match self.ast.statement(&body) {
        Statement::Return { value: Some(value), .. } => {
          self.output.push_str("return ");
          let value = *value;
          self.expr(&value);
          self.output.push_str("; ");
        },
        Statement::Return { value: None, .. } => self.output.push_str("return; "),
      }
    }

    self.output.push('}');
  }
}
