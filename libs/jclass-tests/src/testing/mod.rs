use ahash::AHashMap;
use jclass_core::{ClassAccessFlags, MethodAccessFlags};
use jclass_reader::{ClassInfo, MAGIC};
use tracing::trace;

/// Assembles class files byte by byte. Constant pool entries are deduplicated, so asking for
/// the same entry twice returns the same index.
pub struct ClassBuilder {
	major: u16,
	minor: u16,
	pool: Vec<u8>,
	next_slot: u16,
	known: AHashMap<Vec<u8>, u16>,
	access_flags: u16,
	this_class: u16,
	super_class: u16,
	interfaces: Vec<u16>,
	fields: Vec<Vec<u8>>,
	methods: Vec<Vec<u8>>,
	attributes: Vec<Vec<u8>>,
}

impl ClassBuilder {
	/// Empty constant pool, no this or super class.
	pub fn bare() -> ClassBuilder {
		ClassBuilder {
			major: 52,
			minor: 0,
			pool: vec![],
			next_slot: 1,
			known: AHashMap::new(),
			access_flags: 0,
			this_class: 0,
			super_class: 0,
			interfaces: vec![],
			fields: vec![],
			methods: vec![],
			attributes: vec![],
		}
	}

	/// `public class <name> extends java.lang.Object`
	pub fn new(name: &str) -> ClassBuilder {
		let mut builder = ClassBuilder::bare();
		builder.access_flags = (ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER).bits();
		builder.this_class = builder.class(name);
		builder.super_class = builder.class("java/lang/Object");
		builder
	}

	pub fn version(&mut self, major: u16, minor: u16) -> &mut Self {
		self.major = major;
		self.minor = minor;
		self
	}

	pub fn access(&mut self, flags: u16) -> &mut Self {
		self.access_flags = flags;
		self
	}

	pub fn this_class_index(&mut self, index: u16) -> &mut Self {
		self.this_class = index;
		self
	}

	pub fn super_class(&mut self, name: Option<&str>) -> &mut Self {
		self.super_class = match name {
			Some(name) => self.class(name),
			None => 0,
		};
		self
	}

	pub fn interface(&mut self, name: &str) -> &mut Self {
		let index = self.class(name);
		self.interfaces.push(index);
		self
	}

	// Constant pool

	/// Appends an encoded entry without deduplication.
	pub fn raw_entry(&mut self, bytes: &[u8]) -> u16 {
		let index = self.next_slot;
		self.pool.extend_from_slice(bytes);
		self.next_slot += match bytes.first() {
			Some(5 | 6) => 2,
			_ => 1,
		};
		trace!("constant #{index} tag {:?}", bytes.first());
		index
	}

	fn entry(&mut self, bytes: Vec<u8>) -> u16 {
		if let Some(index) = self.known.get(&bytes) {
			return *index;
		}
		let index = self.raw_entry(&bytes);
		self.known.insert(bytes, index);
		index
	}

	pub fn utf8(&mut self, text: &str) -> u16 {
		let mut bytes = vec![1];
		bytes.extend_from_slice(&(text.len() as u16).to_be_bytes());
		bytes.extend_from_slice(text.as_bytes());
		self.entry(bytes)
	}

	pub fn integer(&mut self, value: i32) -> u16 {
		let mut bytes = vec![3];
		bytes.extend_from_slice(&value.to_be_bytes());
		self.entry(bytes)
	}

	pub fn float(&mut self, value: f32) -> u16 {
		let mut bytes = vec![4];
		bytes.extend_from_slice(&value.to_bits().to_be_bytes());
		self.entry(bytes)
	}

	pub fn long(&mut self, value: i64) -> u16 {
		let mut bytes = vec![5];
		bytes.extend_from_slice(&value.to_be_bytes());
		self.entry(bytes)
	}

	pub fn double(&mut self, value: f64) -> u16 {
		let mut bytes = vec![6];
		bytes.extend_from_slice(&value.to_bits().to_be_bytes());
		self.entry(bytes)
	}

	fn indexed(&mut self, tag: u8, indices: &[u16]) -> u16 {
		let mut bytes = vec![tag];
		for index in indices {
			bytes.extend_from_slice(&index.to_be_bytes());
		}
		self.entry(bytes)
	}

	pub fn class(&mut self, name: &str) -> u16 {
		let name = self.utf8(name);
		self.indexed(7, &[name])
	}

	pub fn string(&mut self, value: &str) -> u16 {
		let value = self.utf8(value);
		self.indexed(8, &[value])
	}

	pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
		let name = self.utf8(name);
		let descriptor = self.utf8(descriptor);
		self.indexed(12, &[name, descriptor])
	}

	fn member_ref(&mut self, tag: u8, class: &str, name: &str, descriptor: &str) -> u16 {
		let class = self.class(class);
		let name_and_type = self.name_and_type(name, descriptor);
		self.indexed(tag, &[class, name_and_type])
	}

	pub fn field_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
		self.member_ref(9, class, name, descriptor)
	}

	pub fn method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
		self.member_ref(10, class, name, descriptor)
	}

	pub fn interface_method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
		self.member_ref(11, class, name, descriptor)
	}

	pub fn method_handle(&mut self, kind: u8, reference: u16) -> u16 {
		let mut bytes = vec![15, kind];
		bytes.extend_from_slice(&reference.to_be_bytes());
		self.entry(bytes)
	}

	pub fn method_type(&mut self, descriptor: &str) -> u16 {
		let descriptor = self.utf8(descriptor);
		self.indexed(16, &[descriptor])
	}

	pub fn invoke_dynamic(&mut self, bootstrap: u16, name: &str, descriptor: &str) -> u16 {
		let name_and_type = self.name_and_type(name, descriptor);
		self.indexed(18, &[bootstrap, name_and_type])
	}

	// Members

	pub fn field(&mut self, flags: u16, name: &str, descriptor: &str, attributes: Vec<Vec<u8>>) -> &mut Self {
		let member = self.member(flags, name, descriptor, attributes);
		self.fields.push(member);
		self
	}

	pub fn method(&mut self, flags: u16, name: &str, descriptor: &str, attributes: Vec<Vec<u8>>) -> &mut Self {
		let member = self.member(flags, name, descriptor, attributes);
		self.methods.push(member);
		self
	}

	/// A default constructor calling `Object.<init>`.
	pub fn default_constructor(&mut self) -> &mut Self {
		let init = self.method_ref("java/lang/Object", "<init>", "()V");
		let [hi, lo] = init.to_be_bytes();
		let code = self.code(1, 1, &[0x2a, 0xb7, hi, lo, 0xb1], &[], vec![]);
		self.method(MethodAccessFlags::PUBLIC.bits(), "<init>", "()V", vec![code])
	}

	fn member(&mut self, flags: u16, name: &str, descriptor: &str, attributes: Vec<Vec<u8>>) -> Vec<u8> {
		let name = self.utf8(name);
		let descriptor = self.utf8(descriptor);
		let mut bytes = vec![];
		bytes.extend_from_slice(&flags.to_be_bytes());
		bytes.extend_from_slice(&name.to_be_bytes());
		bytes.extend_from_slice(&descriptor.to_be_bytes());
		push_list(&mut bytes, &attributes);
		bytes
	}

	pub fn attribute(&mut self, attribute: Vec<u8>) -> &mut Self {
		self.attributes.push(attribute);
		self
	}

	// Attributes

	/// Any attribute, payload as given.
	pub fn attr(&mut self, name: &str, payload: &[u8]) -> Vec<u8> {
		let name = self.utf8(name);
		let mut bytes = vec![];
		bytes.extend_from_slice(&name.to_be_bytes());
		bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
		bytes.extend_from_slice(payload);
		bytes
	}

	/// An attribute whose payload is a list of `u16` indices, preceded by `count` when set.
	pub fn index_attr(&mut self, name: &str, indices: &[u16], count: bool) -> Vec<u8> {
		let mut payload = vec![];
		if count {
			payload.extend_from_slice(&(indices.len() as u16).to_be_bytes());
		}
		for index in indices {
			payload.extend_from_slice(&index.to_be_bytes());
		}
		self.attr(name, &payload)
	}

	/// `handlers` are `(start_pc, end_pc, handler_pc, catch_type)`.
	pub fn code(
		&mut self,
		max_stack: u16,
		max_locals: u16,
		code: &[u8],
		handlers: &[(u16, u16, u16, u16)],
		attributes: Vec<Vec<u8>>,
	) -> Vec<u8> {
		let mut payload = vec![];
		payload.extend_from_slice(&max_stack.to_be_bytes());
		payload.extend_from_slice(&max_locals.to_be_bytes());
		payload.extend_from_slice(&(code.len() as u32).to_be_bytes());
		payload.extend_from_slice(code);
		payload.extend_from_slice(&(handlers.len() as u16).to_be_bytes());
		for (start, end, handler, catch_type) in handlers {
			for value in [start, end, handler, catch_type] {
				payload.extend_from_slice(&value.to_be_bytes());
			}
		}
		push_list(&mut payload, &attributes);
		self.attr("Code", &payload)
	}

	pub fn constant_value(&mut self, constant: u16) -> Vec<u8> {
		self.index_attr("ConstantValue", &[constant], false)
	}

	pub fn source_file(&mut self, name: &str) -> Vec<u8> {
		let name = self.utf8(name);
		self.index_attr("SourceFile", &[name], false)
	}

	pub fn signature(&mut self, signature: &str) -> Vec<u8> {
		let signature = self.utf8(signature);
		self.index_attr("Signature", &[signature], false)
	}

	pub fn exceptions(&mut self, classes: &[&str]) -> Vec<u8> {
		let indices: Vec<u16> = classes.iter().map(|class| self.class(class)).collect();
		self.index_attr("Exceptions", &indices, true)
	}

	/// `(start_pc, line)` pairs.
	pub fn line_numbers(&mut self, lines: &[(u16, u16)]) -> Vec<u8> {
		let flat: Vec<u16> = lines.iter().flat_map(|(pc, line)| [*pc, *line]).collect();
		let mut payload = (lines.len() as u16).to_be_bytes().to_vec();
		for value in flat {
			payload.extend_from_slice(&value.to_be_bytes());
		}
		self.attr("LineNumberTable", &payload)
	}

	/// `(start_pc, length, name, descriptor, slot)` entries.
	pub fn local_variables(&mut self, locals: &[(u16, u16, &str, &str, u16)]) -> Vec<u8> {
		let mut payload = (locals.len() as u16).to_be_bytes().to_vec();
		for (start, length, name, descriptor, slot) in locals {
			let name = self.utf8(name);
			let descriptor = self.utf8(descriptor);
			for value in [*start, *length, name, descriptor, *slot] {
				payload.extend_from_slice(&value.to_be_bytes());
			}
		}
		self.attr("LocalVariableTable", &payload)
	}

	/// `(inner, outer, simple name, flags)` entries, `None` for absent indices.
	pub fn inner_classes(&mut self, classes: &[(&str, Option<&str>, Option<&str>, u16)]) -> Vec<u8> {
		let mut payload = (classes.len() as u16).to_be_bytes().to_vec();
		for (inner, outer, name, flags) in classes {
			let inner = self.class(inner);
			let outer = outer.map_or(0, |outer| self.class(outer));
			let name = name.map_or(0, |name| self.utf8(name));
			for value in [inner, outer, name, *flags] {
				payload.extend_from_slice(&value.to_be_bytes());
			}
		}
		self.attr("InnerClasses", &payload)
	}

	pub fn enclosing_method(&mut self, class: &str, method: Option<(&str, &str)>) -> Vec<u8> {
		let class = self.class(class);
		let method = method.map_or(0, |(name, descriptor)| self.name_and_type(name, descriptor));
		self.index_attr("EnclosingMethod", &[class, method], false)
	}

	/// Annotations without element value pairs, by type descriptor.
	pub fn annotations(&mut self, visible: bool, descriptors: &[&str]) -> Vec<u8> {
		let mut payload = (descriptors.len() as u16).to_be_bytes().to_vec();
		for descriptor in descriptors {
			let descriptor = self.utf8(descriptor);
			payload.extend_from_slice(&descriptor.to_be_bytes());
			payload.extend_from_slice(&0u16.to_be_bytes());
		}
		let name = if visible {
			"RuntimeVisibleAnnotations"
		} else {
			"RuntimeInvisibleAnnotations"
		};
		self.attr(name, &payload)
	}

	pub fn marker(&mut self, name: &str) -> Vec<u8> {
		self.attr(name, &[])
	}

	// Output

	pub fn build(&self) -> Vec<u8> {
		let mut bytes = MAGIC.to_vec();
		bytes.extend_from_slice(&self.minor.to_be_bytes());
		bytes.extend_from_slice(&self.major.to_be_bytes());
		bytes.extend_from_slice(&self.next_slot.to_be_bytes());
		bytes.extend_from_slice(&self.pool);
		bytes.extend_from_slice(&self.access_flags.to_be_bytes());
		bytes.extend_from_slice(&self.this_class.to_be_bytes());
		bytes.extend_from_slice(&self.super_class.to_be_bytes());
		bytes.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
		for interface in &self.interfaces {
			bytes.extend_from_slice(&interface.to_be_bytes());
		}
		push_list(&mut bytes, &self.fields);
		push_list(&mut bytes, &self.methods);
		push_list(&mut bytes, &self.attributes);
		bytes
	}

	/// Builds and parses, panicking on failure.
	pub fn parse(&self) -> ClassInfo {
		match ClassInfo::parse_complete(&self.build()) {
			Ok(class) => class,
			Err(error) => panic!("assembled class does not parse: {error}"),
		}
	}
}

fn push_list(bytes: &mut Vec<u8>, items: &[Vec<u8>]) {
	bytes.extend_from_slice(&(items.len() as u16).to_be_bytes());
	for item in items {
		bytes.extend_from_slice(item);
	}
}
