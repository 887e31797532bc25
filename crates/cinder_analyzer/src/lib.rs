mod delegate;
pub mod nested;
pub mod scope;
mod semantic;

use std::{cell::RefCell, rc::Rc, sync::Arc};

use cinder_ast::Ast;
use cinder_config::CinderConfig;
use cinder_diagnostics::{diagnostic_report::Diagnostic, message::DiagnosticMessage};
use cinder_log::{phase_log, phase_warn};
use cinder_type::{
  definition::{
    Definition, DefinitionId, DefinitionKind, DefinitionStore, FunctionDefinition, LiteralKind, ParameterDefinition,
    Storage, VariableDefinition,
  },
  span::Span,
  symbol::SymbolTable,
  types::{Linkage, TypeId, TypeStore},
};

pub use nested::{NestedRefScanner, ScanStats};
pub use scope::{Scope, ScopeGuard, ScopeId, ScopeKind, ScopeTree};

/// Closure-conversion pass over an already-typed expression arena.
pub struct Analyzer {
  ast: Ast,
  types: TypeStore,
  defs: DefinitionStore,
  symbols: Rc<RefCell<SymbolTable>>,
  scopes: ScopeTree,
  config: Arc<CinderConfig>,
  diagnostics: Vec<Diagnostic>,
  literal_counter: u32,
}

pub struct AnalyzerOutput {
  pub ast: Ast,
  pub types: TypeStore,
  pub defs: DefinitionStore,
  pub diagnostics: Vec<Diagnostic>,
  pub symbols: Rc<RefCell<SymbolTable>>,
}

impl Analyzer {
  pub fn new(
    symbols: Rc<RefCell<SymbolTable>>,
    config: Arc<CinderConfig>,
  ) -> Self {
    Self::with_parts(Ast::new(), TypeStore::new(), DefinitionStore::new(), symbols, config)
  }

  /// Resume from the output of earlier passes.
  pub fn with_parts(
    ast: Ast,
    types: TypeStore,
    defs: DefinitionStore,
    symbols: Rc<RefCell<SymbolTable>>,
    config: Arc<CinderConfig>,
  ) -> Self {
    Self {
      ast,
      types,
      defs,
      symbols,
      scopes: ScopeTree::new(),
      config,
      diagnostics: Vec::new(),
      literal_counter: 0,
    }
  }

  pub fn ast(&self) -> &Ast {
    &self.ast
  }

  pub fn ast_mut(&mut self) -> &mut Ast {
    &mut self.ast
  }

  pub fn types(&self) -> &TypeStore {
    &self.types
  }

  pub fn types_mut(&mut self) -> &mut TypeStore {
    &mut self.types
  }

  pub fn defs(&self) -> &DefinitionStore {
    &self.defs
  }

  pub fn defs_mut(&mut self) -> &mut DefinitionStore {
    &mut self.defs
  }

  pub fn scopes(&self) -> &ScopeTree {
    &self.scopes
  }

  pub fn scopes_mut(&mut self) -> &mut ScopeTree {
    &mut self.scopes
  }

  pub fn diagnostics(&self) -> &[Diagnostic] {
    &self.diagnostics
  }

  pub fn symbols(&self) -> Rc<RefCell<SymbolTable>> {
    self.symbols.clone()
  }

  pub fn into_output(self) -> AnalyzerOutput {
    AnalyzerOutput {
      ast: self.ast,
      types: self.types,
      defs: self.defs,
      diagnostics: self.diagnostics,
      symbols: self.symbols,
    }
  }

  // #region Declarations

  pub fn declare_function(
    &mut self,
    name: &str,
    params: Vec<DefinitionId>,
    return_type: TypeId,
    parent: Option<DefinitionId>,
    span: Span,
  ) -> DefinitionId {
    self.declare_function_with(name, params, return_type, parent, None, span)
  }

  /// A `delegate() { ... }` or `function() { ... }` literal. Its body is set
  /// separately through [`Ast::function_bodies`]; its span starts synthetic.
  pub fn declare_function_literal(
    &mut self,
    kind: LiteralKind,
    return_type: TypeId,
    parent: Option<DefinitionId>,
  ) -> DefinitionId {
    let name = self.next_literal_name(kind);
    self.declare_function_with(&name, Vec::new(), return_type, parent, Some(kind), Span::synthetic())
  }

  fn declare_function_with(
    &mut self,
    name: &str,
    params: Vec<DefinitionId>,
    return_type: TypeId,
    parent: Option<DefinitionId>,
    literal: Option<LiteralKind>,
    span: Span,
  ) -> DefinitionId {
    let param_types = params.iter().map(|p| self.defs.type_of(p)).collect();
    let type_id = self.types.function(param_types, return_type, Linkage::Native);
    let name = self.symbols.borrow_mut().intern(name);

    let func = self.defs.alloc(Definition {
      kind: DefinitionKind::Function(FunctionDefinition {
        params: params.clone(),
        return_type,
        type_id,
        literal,
        this_param: None,
        nested_frame_ref: false,
        closure_vars: Vec::new(),
      }),
      name,
      span,
      parent,
    });

    for param in &params {
      self.defs.get_mut(param).parent = Some(func);
    }

    func
  }

  pub fn declare_variable(
    &mut self,
    name: &str,
    type_id: TypeId,
    storage: Storage,
    parent: Option<DefinitionId>,
    span: Span,
  ) -> DefinitionId {
    self.alloc_variable(name, type_id, storage, parent, span, false)
  }

  /// The synthetic `$` of an index or slice expression.
  pub fn declare_length_var(
    &mut self,
    parent: Option<DefinitionId>,
  ) -> DefinitionId {
    let size_t = self.types.u64();
    self.alloc_variable("__dollar", size_t, Storage::Stack, parent, Span::synthetic(), true)
  }

  fn alloc_variable(
    &mut self,
    name: &str,
    type_id: TypeId,
    storage: Storage,
    parent: Option<DefinitionId>,
    span: Span,
    synthetic: bool,
  ) -> DefinitionId {
    let name = self.symbols.borrow_mut().intern(name);

    self.defs.alloc(Definition {
      kind: DefinitionKind::Variable(VariableDefinition {
        type_id,
        mutable: true,
        storage,
        captured: false,
        synthetic,
      }),
      name,
      span,
      parent,
    })
  }

  /// A parameter not yet attached to a function; `declare_function` adopts it.
  pub fn declare_parameter(
    &mut self,
    name: &str,
    type_id: TypeId,
    span: Span,
  ) -> DefinitionId {
    let name = self.symbols.borrow_mut().intern(name);

    self.defs.alloc(Definition {
      kind: DefinitionKind::Parameter(ParameterDefinition {
        type_id,
        mutable: false,
        captured: false,
        is_this: false,
      }),
      name,
      span,
      parent: None,
    })
  }

  /// Give `func` an implicit `this` receiver of type `receiver_type`,
  /// located at the function itself.
  pub fn declare_this(
    &mut self,
    func: DefinitionId,
    receiver_type: TypeId,
  ) -> DefinitionId {
    let name = self.symbols.borrow_mut().intern("this");
    let span = self.defs.get(&func).span.clone();

    let this = self.defs.alloc(Definition {
      kind: DefinitionKind::Parameter(ParameterDefinition {
        type_id: receiver_type,
        mutable: false,
        captured: false,
        is_this: true,
      }),
      name,
      span,
      parent: Some(func),
    });

    if let Some(fd) = self.defs.as_function_mut(&func) {
      fd.this_param = Some(this);
    }

    this
  }

  fn next_literal_name(
    &mut self,
    kind: LiteralKind,
  ) -> String {
    let prefix = match kind {
      LiteralKind::Delegate => "__dgliteral",
      LiteralKind::Function => "__funcliteral",
    };

    let name = format!("{}{}", prefix, self.literal_counter);
    self.literal_counter += 1;
    name
  }

  // #endregion Declarations

  // #region Scopes

  /// Make `func` the context for subsequent analysis until the matching
  /// [`Analyzer::exit_scope`].
  pub fn enter_function(
    &mut self,
    func: DefinitionId,
  ) -> ScopeId {
    self.scopes.push_with_context(ScopeKind::Function, Some(func))
  }

  pub fn exit_scope(&mut self) {
    if self.scopes.depth() == 0 {
      phase_warn!(&self.config, "exit_scope called at the global scope");
      return;
    }

    self.scopes.pop();
  }

  // #endregion Scopes

  /// Report every declaration referenced from `expr` against the context of
  /// `scope`.
  pub fn scan_for_nested_ref(
    &mut self,
    expr: &cinder_ast::ExprId,
    scope: &ScopeId,
  ) -> ScanStats {
    let scope = self.scopes.get_scope(scope).clone();
    let symbols = self.symbols.borrow();

    let scanner = NestedRefScanner::new(&self.ast, &mut self.defs, &self.types, &symbols, &self.config);
    let stats = scanner.scan(expr, &scope);
    stats
  }

  /// One informational diagnostic per function whose frame must live on the
  /// heap because a delegate literal refers to its locals.
  pub fn report_heap_frames(&mut self) {
    let symbols = self.symbols.borrow();
    let mut reported = 0;

    for (_, def) in self.defs.iter() {
      let DefinitionKind::Function(fd) = &def.kind else {
        continue;
      };

      if fd.closure_vars.is_empty() {
        continue;
      }

      let captures = fd
        .closure_vars
        .iter()
        .map(|var| {
          let var = self.defs.get(var);
          (symbols.get(&var.name).to_string(), var.span.clone())
        })
        .collect();

      self.diagnostics.push(
        DiagnosticMessage::ClosureFrameOnHeap {
          function: symbols.get(&def.name).to_string(),
          captures,
          span: def.span.clone(),
        }
        .report(),
      );
      reported += 1;
    }

    phase_log!(&self.config, "{} heap-allocated frame(s)", reported);
  }
}
