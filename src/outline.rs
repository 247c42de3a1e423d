use std::fmt;

use jclass_reader::{ClassInfo, Code, ConstantPool, ExceptionHandler, FieldInfo, MethodInfo, ReaderError, Visitor};

/// Renders classes as Java-like outlines. Members are numbered by position, starting over at 1
/// for every class.
#[derive(Debug, Default)]
pub struct Outline {
	out: String,
	member: usize,
	open: bool,
}

fn or_unresolved(result: Result<String, ReaderError>) -> String {
	result.unwrap_or_else(|error| format!("<{error}>"))
}

impl Outline {
	pub fn new() -> Outline {
		Outline::default()
	}

	/// Closes the last class and hands back everything rendered so far.
	pub fn finish(mut self) -> String {
		self.close();
		self.out
	}

	fn close(&mut self) {
		if self.open {
			self.out.push_str("}\n");
			self.open = false;
		}
	}

	fn line(&mut self, args: fmt::Arguments<'_>) {
		self.out.push_str(&format!("{args}\n"));
	}

	fn next_member(&mut self) -> usize {
		self.member += 1;
		self.member
	}
}

impl Visitor for Outline {
	fn reset(&mut self) {
		self.close();
		self.member = 0;
	}

	fn visit_classfile(&mut self, class: &ClassInfo) {
		self.close();
		self.line(format_args!("{} {{", or_unresolved(class.declaration())));
		if let Ok(Some(source)) = class.source_file() {
			self.line(format_args!("    // {source}, version {}.{}", class.major_version, class.minor_version));
		}
		self.open = true;
	}

	fn visit_field(&mut self, field: &FieldInfo, class: &ClassInfo) {
		let n = self.next_member();
		let declaration = or_unresolved(field.declaration(&class.constant_pool));
		self.line(format_args!("    #{n} {declaration};"));
	}

	fn visit_method(&mut self, method: &MethodInfo, class: &ClassInfo) {
		let n = self.next_member();
		let declaration = or_unresolved(method.declaration(class));
		self.line(format_args!("    #{n} {declaration};"));
	}

	fn visit_code(&mut self, code: &Code, _: &ConstantPool) {
		self.line(format_args!(
			"        code: {} bytes, max stack {}, max locals {}",
			code.code.len(),
			code.max_stack,
			code.max_locals
		));
	}

	fn visit_instruction(&mut self, instruction: &jclass_reader::Instruction<'_>, cp: &ConstantPool) {
		let text = or_unresolved(instruction.describe(cp));
		self.line(format_args!("        {}:\t{text}", instruction.start()));
	}

	fn visit_bytecode_error(&mut self, _: &Code, error: &ReaderError, _: &ConstantPool) {
		self.line(format_args!("        !! {error}"));
	}

	fn visit_exception_handler(&mut self, handler: &ExceptionHandler, cp: &ConstantPool) {
		let catches = match handler.catch_type_name(cp) {
			Ok(Some(name)) => jclass_core::java_name(name),
			Ok(None) => "any".to_string(),
			Err(error) => format!("<{error}>"),
		};
		self.line(format_args!(
			"        {}-{}: {} ({catches})",
			handler.start_pc, handler.end_pc, handler.handler_pc
		));
	}
}
