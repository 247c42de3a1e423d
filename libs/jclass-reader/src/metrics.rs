use std::collections::BTreeMap;

use tracing::trace;

use crate::attribute::AttributeInfo;
use crate::code::opcode::print_op;
use crate::code::{Code, Instruction};
use crate::consts::ConstantPool;
use crate::visitor::Visitor;
use crate::{ClassInfo, ConstPtr, FieldInfo, MethodInfo, ReaderError, UTF8Const};

/// Counts what a traversal walks over. Totals accumulate across class files.
#[derive(Clone, Debug)]
pub struct MetricsGatherer {
	pub classes: u64,
	pub interfaces: u64,
	pub public_classes: u64,
	pub abstract_classes: u64,
	pub final_classes: u64,
	pub synthetic_classes: u64,
	pub deprecated_classes: u64,

	pub fields: u64,
	pub public_fields: u64,
	pub static_fields: u64,
	pub synthetic_fields: u64,
	pub deprecated_fields: u64,

	pub methods: u64,
	pub public_methods: u64,
	pub static_methods: u64,
	pub abstract_methods: u64,
	pub native_methods: u64,
	pub synthetic_methods: u64,
	pub deprecated_methods: u64,

	pub instructions: u64,
	pub bytecode_errors: u64,
	pub custom_attributes: u64,

	opcodes: [u64; 256],
	attributes: BTreeMap<String, u64>,
}

impl Default for MetricsGatherer {
	fn default() -> Self {
		MetricsGatherer {
			classes: 0,
			interfaces: 0,
			public_classes: 0,
			abstract_classes: 0,
			final_classes: 0,
			synthetic_classes: 0,
			deprecated_classes: 0,
			fields: 0,
			public_fields: 0,
			static_fields: 0,
			synthetic_fields: 0,
			deprecated_fields: 0,
			methods: 0,
			public_methods: 0,
			static_methods: 0,
			abstract_methods: 0,
			native_methods: 0,
			synthetic_methods: 0,
			deprecated_methods: 0,
			instructions: 0,
			bytecode_errors: 0,
			custom_attributes: 0,
			opcodes: [0; 256],
			attributes: BTreeMap::new(),
		}
	}
}

impl MetricsGatherer {
	pub fn new() -> MetricsGatherer {
		MetricsGatherer::default()
	}

	pub fn opcode_count(&self, opcode: u8) -> u64 {
		self.opcodes[opcode as usize]
	}

	/// Opcodes seen at least once, by mnemonic, most frequent first.
	pub fn opcode_histogram(&self) -> Vec<(&'static str, u64)> {
		let mut histogram: Vec<(&'static str, u64)> = self
			.opcodes
			.iter()
			.enumerate()
			.filter(|(_, count)| **count > 0)
			.map(|(opcode, count)| (print_op(opcode as u8), *count))
			.collect();
		histogram.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
		histogram
	}

	/// Attribute occurrences by name, custom attributes included.
	pub fn attribute_counts(&self) -> &BTreeMap<String, u64> {
		&self.attributes
	}
}

impl Visitor for MetricsGatherer {
	fn visit_classfile(&mut self, class: &ClassInfo) {
		if class.is_interface() {
			self.interfaces += 1;
		} else {
			self.classes += 1;
			if class.is_abstract() {
				self.abstract_classes += 1;
			}
		}
		if class.is_public() {
			self.public_classes += 1;
		}
		if class.is_final() {
			self.final_classes += 1;
		}
		if class.is_synthetic() {
			self.synthetic_classes += 1;
		}
		if class.is_deprecated() {
			self.deprecated_classes += 1;
		}
	}

	fn visit_field(&mut self, field: &FieldInfo, class: &ClassInfo) {
		self.fields += 1;
		if field.is_public() {
			self.public_fields += 1;
		}
		if field.is_static() {
			self.static_fields += 1;
		}
		if field.is_synthetic() {
			self.synthetic_fields += 1;
		}
		if field.is_deprecated(&class.constant_pool) {
			self.deprecated_fields += 1;
		}
	}

	fn visit_method(&mut self, method: &MethodInfo, class: &ClassInfo) {
		self.methods += 1;
		if method.is_public() {
			self.public_methods += 1;
		}
		if method.is_static() {
			self.static_methods += 1;
		}
		if method.is_abstract() {
			self.abstract_methods += 1;
		}
		if method.is_native() {
			self.native_methods += 1;
		}
		if method.is_synthetic() {
			self.synthetic_methods += 1;
		}
		if method.is_deprecated(&class.constant_pool) {
			self.deprecated_methods += 1;
		}
	}

	fn visit_attribute(&mut self, attribute: &AttributeInfo, cp: &ConstantPool) {
		if let Ok(name) = attribute.name(cp) {
			*self.attributes.entry(name.to_string()).or_default() += 1;
		}
	}

	fn visit_custom_attribute(&mut self, _: ConstPtr<UTF8Const>, info: &[u8], _: &ConstantPool) {
		trace!("custom attribute, {} bytes", info.len());
		self.custom_attributes += 1;
	}

	fn visit_instruction(&mut self, instruction: &Instruction<'_>, _: &ConstantPool) {
		self.instructions += 1;
		self.opcodes[instruction.opcode() as usize] += 1;
	}

	fn visit_bytecode_error(&mut self, _: &Code, _: &ReaderError, _: &ConstantPool) {
		self.bytecode_errors += 1;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::code::opcode::{ALOAD_0, RETURN};
	use crate::visitor::walk_attribute;
	use crate::ConstantInfo;

	#[test]
	fn counts_code() {
		let cp = ConstantPool::new(vec![
			ConstantInfo::UTF8(UTF8Const("Code".to_string())),
			ConstantInfo::UTF8(UTF8Const("Vendor".to_string())),
		]);
		let code = AttributeInfo::Code(Code {
			max_stack: 1,
			max_locals: 1,
			code: vec![ALOAD_0, ALOAD_0, RETURN, 0xcb],
			exception_table: vec![],
			attributes: vec![AttributeInfo::Custom {
				name: ConstPtr::new(2),
				info: vec![1, 2, 3],
			}],
		});

		let mut metrics = MetricsGatherer::new();
		walk_attribute(&mut metrics, &code, &cp);

		assert_eq!(metrics.instructions, 3);
		assert_eq!(metrics.opcode_count(ALOAD_0), 2);
		assert_eq!(metrics.bytecode_errors, 1);
		assert_eq!(metrics.custom_attributes, 1);
		assert_eq!(metrics.attribute_counts().get("Code"), Some(&1));
		assert_eq!(metrics.attribute_counts().get("Vendor"), Some(&1));
		assert_eq!(metrics.opcode_histogram()[0], ("aload_0", 2));
	}
}
