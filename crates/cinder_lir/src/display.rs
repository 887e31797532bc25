use std::fmt;

use cinder_type::types::{TypeId, TypeStore, format_type};

use crate::{Block, ConstValue, FunctionLir, Instr, Operand, Terminator};

/// Pretty printer for a lowered function.
pub struct LirPrinter<'a> {
  func: &'a FunctionLir,
  types: &'a TypeStore,
}

impl<'a> LirPrinter<'a> {
  pub fn new(
    func: &'a FunctionLir,
    types: &'a TypeStore,
  ) -> Self {
    Self { func, types }
  }

  pub fn print(&self) -> String {
    self.to_string()
  }

  fn format_type(
    &self,
    ty: TypeId,
  ) -> String {
    format_type(self.types, &ty)
  }

  fn format_operand(
    &self,
    op: &Operand,
  ) -> String {
    match op {
      Operand::Temp(t) => format!("t{}", t.index()),
      Operand::Local(l) => format!("%{}", l.index()),
      Operand::Const(c) => match c {
        ConstValue::Int(v, _) => format!("{}", v),
        ConstValue::UInt(v, _) => format!("{}u", v),
        ConstValue::String(v, _) => format!("\"{}\"", v.escape_default()),
        ConstValue::Null(_) => "null".to_string(),
      },
    }
  }

  fn label(
    &self,
    block: &crate::BlockId,
  ) -> &str {
    &self.func.blocks.get(block).label
  }

  fn write_block(
    &self,
    f: &mut fmt::Formatter<'_>,
    block: &Block,
  ) -> fmt::Result {
    writeln!(f, "  {}:", block.label)?;

    for instr in &block.instructions {
      write!(f, "    ")?;
      self.write_instr(f, instr)?;
    }

    write!(f, "    ")?;
    self.write_terminator(f, &block.terminator)
  }

  fn write_instr(
    &self,
    f: &mut fmt::Formatter<'_>,
    instr: &Instr,
  ) -> fmt::Result {
    let func = self.func;

    match instr {
      Instr::Load { dest, source } => {
        let ty = self.format_type(func.temp_type(*dest));
        writeln!(f, "t{} = load %{} : {}", dest.index(), source.index(), ty)
      },
      Instr::Store { dest, value } => {
        writeln!(f, "store %{}, {}", dest.index(), self.format_operand(value))
      },
      Instr::LoadPtr { dest, ptr } => {
        let ty = self.format_type(func.temp_type(*dest));
        writeln!(f, "t{} = load_ptr {} : {}", dest.index(), self.format_operand(ptr), ty)
      },
      Instr::AddrOfLocal { dest, local } => {
        let ty = self.format_type(func.temp_type(*dest));
        writeln!(f, "t{} = addr %{} : {}", dest.index(), local.index(), ty)
      },
      Instr::BitCast {
        dest,
        source,
        target_type,
      } => {
        let ty = self.format_type(*target_type);
        writeln!(f, "t{} = bitcast {} to {}", dest.index(), self.format_operand(source), ty)
      },
      Instr::TypeInfo { dest, ty } => {
        writeln!(f, "t{} = typeinfo {}", dest.index(), self.format_type(*ty))
      },
      Instr::RuntimeCall { dest, func: callee, args } => {
        let args_str: Vec<_> = args.iter().map(|a| self.format_operand(a)).collect();

        if let Some(d) = dest {
          let ty = self.format_type(func.temp_type(*d));
          writeln!(f, "t{} = call {}({}) : {}", d.index(), callee, args_str.join(", "), ty)
        } else {
          writeln!(f, "call {}({})", callee, args_str.join(", "))
        }
      },
      Instr::BinOp { dest, op, left, right } => {
        let ty = self.format_type(func.temp_type(*dest));
        writeln!(
          f,
          "t{} = {:?} {}, {} : {}",
          dest.index(),
          op,
          self.format_operand(left),
          self.format_operand(right),
          ty
        )
      },
      Instr::UnaryOp { dest, op, operand } => {
        let ty = self.format_type(func.temp_type(*dest));
        writeln!(f, "t{} = {:?} {} : {}", dest.index(), op, self.format_operand(operand), ty)
      },
    }
  }

  fn write_terminator(
    &self,
    f: &mut fmt::Formatter<'_>,
    term: &Terminator,
  ) -> fmt::Result {
    match term {
      Terminator::Goto(target) => writeln!(f, "goto {}", self.label(target)),
      Terminator::Branch {
        condition,
        then_block,
        else_block,
      } => writeln!(
        f,
        "br {}, {}, {}",
        self.format_operand(condition),
        self.label(then_block),
        self.label(else_block)
      ),
      Terminator::Return(Some(v)) => writeln!(f, "ret {}", self.format_operand(v)),
      Terminator::Return(None) => writeln!(f, "ret"),
      Terminator::Unreachable => writeln!(f, "unreachable"),
    }
  }
}

impl fmt::Display for LirPrinter<'_> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    let func = self.func;
    writeln!(f, "fn {}(): {} {{", func.name, self.format_type(func.return_type))?;

    if !func.locals.is_empty() {
      writeln!(f, "  locals:")?;
      for (id, local) in func.locals.iter() {
        let name = local.name.as_deref().unwrap_or("_");
        let mutable = if local.mutable { " [mut]" } else { "" };
        writeln!(
          f,
          "    %{}: {} = {}{}",
          id.index(),
          self.format_type(local.ty),
          name,
          mutable
        )?;
      }
    }

    for (_, block) in func.blocks.iter() {
      writeln!(f)?;
      self.write_block(f, block)?;
    }

    write!(f, "}}")
  }
}
