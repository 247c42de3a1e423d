use jclass_core::MethodAccessFlags;
use jclass_reader::opcode::*;
use jclass_reader::{Code, ConstantPool, ReaderError, Visitor};

use crate::ClassBuilder;

/// `iconst_0, tableswitch, lookupswitch, wide iinc, return`; the switches land on different
/// alignments.
fn switch_heavy() -> Vec<u8> {
	let mut code = vec![ICONST_0, TABLESWITCH, 0, 0];
	for value in [50i32, 0, 1, 50, 50] {
		code.extend_from_slice(&value.to_be_bytes());
	}
	assert_eq!(code.len(), 24);
	code.extend_from_slice(&[LOOKUPSWITCH, 0, 0, 0]);
	for value in [26i32, 1, 7, 26] {
		code.extend_from_slice(&value.to_be_bytes());
	}
	code.extend_from_slice(&[WIDE, IINC, 0x01, 0x00, 0xff, 0xff]);
	code.push(RETURN);
	code
}

#[test]
fn instructions_cover_the_code_array() {
	let bytecode = switch_heavy();
	let mut builder = ClassBuilder::new("a/Switches");
	let body = builder.code(2, 300, &bytecode, &[], vec![]);
	builder.method(MethodAccessFlags::STATIC.bits(), "pick", "()V", vec![body]);
	let class = builder.parse();

	let code = class.methods[0].code().unwrap();
	let instructions = code.decode().unwrap();
	let layout: Vec<_> = instructions.iter().map(|i| (i.opcode(), i.start(), i.length())).collect();
	assert_eq!(
		layout,
		[
			(ICONST_0, 0, 1),
			(TABLESWITCH, 1, 23),
			(LOOKUPSWITCH, 24, 20),
			(WIDE, 44, 6),
			(RETURN, 50, 1)
		]
	);

	let joined: Vec<u8> = instructions.iter().flat_map(|i| i.bytes().iter().copied()).collect();
	assert_eq!(joined, bytecode);

	let table = instructions[1].switch().unwrap();
	assert_eq!(table.default, 50);
	assert_eq!(table.cases, [(0, 50), (1, 50)]);
	let lookup = instructions[2].switch().unwrap();
	assert_eq!(lookup.cases, [(7, 26)]);

	assert!(instructions[3].is_wide());
	assert_eq!(instructions[3].effective_opcode(), IINC);
	assert_eq!(instructions[3].local_index(), Some(256));
	assert_eq!(instructions[3].value(), -1);
}

#[derive(Default)]
struct Recorder {
	instructions: Vec<(usize, u8)>,
	errors: usize,
}

impl Visitor for Recorder {
	fn visit_instruction(&mut self, instruction: &jclass_reader::Instruction<'_>, _: &ConstantPool) {
		self.instructions.push((instruction.start(), instruction.opcode()));
	}

	fn visit_bytecode_error(&mut self, _: &Code, error: &ReaderError, _: &ConstantPool) {
		assert!(matches!(error, ReaderError::MalformedBytecode { .. }), "{error:?}");
		self.errors += 1;
	}
}

#[test]
fn broken_method_does_not_poison_its_sibling() {
	let mut builder = ClassBuilder::new("a/Broken");
	let truncated = builder.code(1, 0, &[NOP, SIPUSH, 0x00], &[], vec![]);
	builder.method(MethodAccessFlags::STATIC.bits(), "broken", "()V", vec![truncated]);
	let fine = builder.code(1, 0, &[ICONST_0, IRETURN], &[], vec![]);
	builder.method(MethodAccessFlags::STATIC.bits(), "fine", "()I", vec![fine]);
	let class = builder.parse();

	let broken = class.find_method("broken", "()V").unwrap().code().unwrap();
	let results: Vec<_> = broken.instructions().collect();
	assert_eq!(results.len(), 2);
	assert!(results[0].is_ok());
	assert!(matches!(
		results[1],
		Err(ReaderError::MalformedBytecode { offset: 1, .. })
	));

	let mut recorder = Recorder::default();
	class.accept(&mut recorder);
	assert_eq!(recorder.errors, 1);
	assert_eq!(recorder.instructions, [(0, NOP), (0, ICONST_0), (1, IRETURN)]);
}

#[test]
fn undefined_opcode() {
	let mut builder = ClassBuilder::new("a/Odd");
	let body = builder.code(0, 0, &[0xcb], &[], vec![]);
	builder.method(0, "odd", "()V", vec![body]);
	let class = builder.parse();
	let code = class.methods[0].code().unwrap();
	assert!(matches!(
		code.decode(),
		Err(ReaderError::MalformedBytecode { offset: 0, .. })
	));
}

#[test]
fn locals_and_lines() {
	let mut builder = ClassBuilder::new("a/Locals");
	let locals = builder.local_variables(&[(2, 2, "x", "I", 1)]);
	let lines = builder.line_numbers(&[(0, 10), (2, 11)]);
	let body = builder.code(1, 2, &[ICONST_0, ISTORE_1, ILOAD_1, IRETURN], &[], vec![locals, lines]);
	builder.method(MethodAccessFlags::STATIC.bits(), "answer", "()I", vec![body]);
	let class = builder.parse();
	let cp = &class.constant_pool;

	let code = class.methods[0].code().unwrap();
	let instructions = code.decode().unwrap();

	// The store happens before the variable's range opens, the load inside it.
	let stored = instructions[1].indexed_local_variable().unwrap();
	assert_eq!(cp.utf8(stored.name).unwrap(), "x");
	let loaded = instructions[2].indexed_local_variable().unwrap();
	assert_eq!(cp.utf8(loaded.descriptor).unwrap(), "I");
	assert!(instructions[0].indexed_local_variable().is_none());

	assert_eq!(code.line_number(instructions[1].start()), Some(10));
	assert_eq!(code.line_number(instructions[3].start()), Some(11));
}

#[test]
fn constant_operands_resolve() {
	let mut builder = ClassBuilder::new("a/Calls");
	let out = builder.field_ref("java/lang/System", "out", "Ljava/io/PrintStream;");
	let println = builder.method_ref("java/io/PrintStream", "println", "(Ljava/lang/String;)V");
	let hello = builder.string("hello");
	let [out_hi, out_lo] = out.to_be_bytes();
	let [call_hi, call_lo] = println.to_be_bytes();
	let [hello_hi, hello_lo] = hello.to_be_bytes();
	let bytecode = [
		GETSTATIC, out_hi, out_lo, LDC_W, hello_hi, hello_lo, INVOKEVIRTUAL, call_hi, call_lo, RETURN,
	];
	let body = builder.code(2, 1, &bytecode, &[], vec![]);
	builder.method(MethodAccessFlags::STATIC.bits(), "greet", "()V", vec![body]);
	let class = builder.parse();
	let cp = &class.constant_pool;

	let code = class.methods[0].code().unwrap();
	let instructions = code.decode().unwrap();
	assert_eq!(instructions[0].constant_index(), Some(out));
	assert_eq!(instructions[1].constant_index(), Some(hello));
	assert_eq!(instructions[2].constant_index(), Some(println));
	for instruction in &instructions[..3] {
		assert!(instruction.indexed_constant(cp).unwrap().is_some());
	}
	assert!(instructions[3].indexed_constant(cp).unwrap().is_none());
}
