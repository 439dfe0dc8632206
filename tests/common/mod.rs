//! Tiny interpreter for the instruction subset the code generator emits.
//!
//! Runs generated assembly straight from text and returns the exit code passed
//! to the first `exit` syscall, so tests can check what a program computes
//! instead of how it is spelled.

#![allow(dead_code)]

use std::collections::HashMap;

const STEP_LIMIT: usize = 100_000;

#[derive(Default)]
struct Machine {
  regs: HashMap<String, i64>,
  stack: Vec<i64>,
  equal: bool,
  zero: bool,
}

impl Machine {
  fn slot(&self, operand: &str) -> Option<usize> {
    let inner = operand
      .trim_start_matches("QWORD ")
      .strip_prefix("[rsp + ")?
      .strip_suffix(']')?;
    let offset: usize = inner.parse().expect("stack offset");
    assert_eq!(offset % 8, 0, "misaligned stack offset {offset}");
    let depth = offset / 8;
    assert!(depth < self.stack.len(), "read past stack top: {operand}");
    Some(self.stack.len() - 1 - depth)
  }

  fn read(&self, operand: &str) -> i64 {
    if let Some(index) = self.slot(operand) {
      return self.stack[index];
    }
    if let Ok(value) = operand.parse() {
      return value;
    }
    *self
      .regs
      .get(operand)
      .unwrap_or_else(|| panic!("register {operand} read before write"))
  }

  fn write(&mut self, operand: &str, value: i64) {
    match self.slot(operand) {
      Some(index) => self.stack[index] = value,
      None => {
        self.regs.insert(operand.to_string(), value);
      }
    }
  }
}

/// Execute `asm` and return the exit status it requests.
pub fn run(asm: &str) -> i64 {
  let lines: Vec<&str> = asm
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty())
    .collect();
  let labels: HashMap<&str, usize> = lines
    .iter()
    .enumerate()
    .filter_map(|(i, line)| line.strip_suffix(':').map(|name| (name, i)))
    .collect();

  let mut m = Machine::default();
  let mut pc = 0;

  for _ in 0..STEP_LIMIT {
    let line = *lines.get(pc).expect("fell off the end of the program");
    pc += 1;
    if line.starts_with("global") || line.ends_with(':') {
      continue;
    }

    let (op, rest) = line.split_once(' ').unwrap_or((line, ""));
    let args: Vec<&str> = rest.split(", ").collect();
    match op {
      "mov" => {
        let value = m.read(args[1]);
        m.write(args[0], value);
      }
      "push" => {
        let value = m.read(args[0]);
        m.stack.push(value);
      }
      "pop" => {
        let value = m.stack.pop().expect("pop from empty stack");
        m.write(args[0], value);
      }
      "add" if args[0] == "rsp" => {
        let words = (m.read(args[1]) / 8) as usize;
        assert!(words <= m.stack.len(), "released more words than pushed");
        let keep = m.stack.len() - words;
        m.stack.truncate(keep);
      }
      "add" => {
        let value = m.read(args[0]).wrapping_add(m.read(args[1]));
        m.write(args[0], value);
      }
      "sub" => {
        let value = m.read(args[0]).wrapping_sub(m.read(args[1]));
        m.write(args[0], value);
      }
      "imul" => {
        let value = m.read("rax").wrapping_mul(m.read(args[0]));
        m.write("rax", value);
      }
      "cqo" => {
        let sign = if m.read("rax") < 0 { -1 } else { 0 };
        m.write("rdx", sign);
      }
      "idiv" => {
        let value = m.read("rax") / m.read(args[0]);
        m.write("rax", value);
      }
      "cmp" => m.equal = m.read(args[0]) == m.read(args[1]),
      "sete" => {
        let value = (m.read("rax") & !0xff) | i64::from(m.equal);
        m.write("rax", value);
      }
      "movzx" => {
        let value = m.read("rax") & 0xff;
        m.write("rax", value);
      }
      "test" => m.zero = m.read(args[0]) & m.read(args[1]) == 0,
      "jz" => {
        if m.zero {
          pc = labels[args[0]];
        }
      }
      "jmp" => pc = labels[args[0]],
      "syscall" => {
        assert_eq!(m.read("rax"), 60, "only exit is supported");
        return m.read("rdi");
      }
      other => panic!("unknown instruction `{other}`"),
    }
  }

  panic!("step limit exceeded");
}

/// Compile `source` and run it.
pub fn exit_code(source: &str) -> i64 {
  let asm = hydroc::generate_assembly(source).expect("program should compile");
  run(&asm)
}
