use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};

use jclass_core::{align_size, PrimitiveType};
use nom::bytes::complete::take;
use nom::number::complete::be_i32;
use nom::sequence::tuple;
use tracing::trace;

use crate::code::opcode::*;
use crate::{Code, ConstantInfo, ConstantPool, LocalVariable, ReaderError};

const TRUNCATED: &str = "instruction runs past the end of the code";

type Step<'a, O> = nom::IResult<&'a [u8], O, ()>;

/// One instruction, as a window over its method's code array.
///
/// Two instructions are equal when their opcode and operand bytes are, whichever constant pool
/// their symbolic operands would resolve against.
#[derive(Copy, Clone)]
pub struct Instruction<'a> {
	code: &'a Code,
	start: usize,
	length: usize,
}

/// Operands of `tableswitch` and `lookupswitch`, offsets relative to the instruction start.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Switch {
	pub default: i32,
	/// `(match, offset)` pairs. For `tableswitch` the match values run from low to high.
	pub cases: Vec<(i32, i32)>,
}

impl<'a> Instruction<'a> {
	pub(crate) fn decode(code: &'a Code, start: usize) -> Result<Instruction<'a>, ReaderError> {
		let bytes = code.bytecode().get(start..).unwrap_or_default();
		let Some(&opcode) = bytes.first() else {
			return Err(ReaderError::MalformedBytecode {
				offset: start,
				opcode: 0,
				reason: TRUNCATED,
			});
		};

		let length = measure(opcode, bytes, start).map_err(|reason| ReaderError::MalformedBytecode {
			offset: start,
			opcode,
			reason,
		})?;
		trace!("{start}: {} ({length} bytes)", print_op(opcode));
		Ok(Instruction { code, start, length })
	}

	pub fn code(&self) -> &'a Code {
		self.code
	}

	pub fn start(&self) -> usize {
		self.start
	}

	pub fn length(&self) -> usize {
		self.length
	}

	/// The opcode followed by every operand byte, switch padding included.
	pub fn bytes(&self) -> &'a [u8] {
		&self.code.bytecode()[self.start..self.start + self.length]
	}

	pub fn opcode(&self) -> u8 {
		self.byte(0)
	}

	pub fn is_wide(&self) -> bool {
		self.opcode() == WIDE
	}

	/// The opcode the instruction acts as, which is the prefixed one for `wide`.
	pub fn effective_opcode(&self) -> u8 {
		if self.is_wide() {
			self.byte(1)
		} else {
			self.opcode()
		}
	}

	pub fn mnemonic(&self) -> String {
		if self.is_wide() {
			format!("wide {}", print_op(self.byte(1)))
		} else {
			print_op(self.opcode()).to_string()
		}
	}

	/// The constant pool or local variable index operand, implicit ones (`aload_0`) included.
	pub fn index(&self) -> Option<u16> {
		match self.opcode() {
			LDC => Some(self.byte(1) as u16),
			_ => self.constant_index().or_else(|| self.local_index()),
		}
	}

	pub fn constant_index(&self) -> Option<u16> {
		match self.opcode() {
			LDC => Some(self.byte(1) as u16),
			LDC_W | LDC2_W | GETSTATIC..=INVOKEDYNAMIC | NEW | ANEWARRAY | CHECKCAST | INSTANCEOF
			| MULTIANEWARRAY => Some(self.u16_at(1)),
			_ => None,
		}
	}

	pub fn local_index(&self) -> Option<u16> {
		let op = self.opcode();
		match op {
			ILOAD_0..=ALOAD_3 => Some(((op - ILOAD_0) % 4) as u16),
			ISTORE_0..=ASTORE_3 => Some(((op - ISTORE_0) % 4) as u16),
			ILOAD..=ALOAD | ISTORE..=ASTORE | IINC | RET => Some(self.byte(1) as u16),
			WIDE => Some(self.u16_at(2)),
			_ => None,
		}
	}

	/// Resolves the constant pool operand against the pool of the class the code belongs to.
	pub fn indexed_constant<'p>(&self, cp: &'p ConstantPool) -> Result<Option<&'p ConstantInfo>, ReaderError> {
		match self.constant_index() {
			Some(index) => cp.raw_get(index).map(Some),
			None => Ok(None),
		}
	}

	/// The LocalVariableTable entry the instruction reads or writes. Loads are looked up at the
	/// instruction's own pc, stores right after it, where the stored variable becomes live.
	pub fn indexed_local_variable(&self) -> Option<&'a LocalVariable> {
		let slot = self.local_index()?;
		let pc = if is_store(self.effective_opcode()) {
			self.start + self.length
		} else {
			self.start
		};
		self.code.local_variable(slot, pc)
	}

	/// Signed branch offset, 0 for instructions that do not branch.
	pub fn offset(&self) -> i32 {
		match self.opcode() {
			IFEQ..=JSR | IFNULL | IFNONNULL => self.i16_at(1),
			GOTO_W | JSR_W => self.i32_at(1),
			_ => 0,
		}
	}

	pub fn is_branch(&self) -> bool {
		matches!(self.opcode(), IFEQ..=JSR | IFNULL | IFNONNULL | GOTO_W | JSR_W)
	}

	pub fn branch_target(&self) -> Option<usize> {
		if !self.is_branch() {
			return None;
		}
		usize::try_from(self.start as i64 + self.offset() as i64).ok()
	}

	/// Immediate numeric operand: pushed constants, `bipush`/`sipush` and the `iinc` increment.
	pub fn value(&self) -> i32 {
		let op = self.opcode();
		match op {
			ICONST_M1..=ICONST_5 => op as i32 - ICONST_0 as i32,
			LCONST_0 | LCONST_1 => (op - LCONST_0) as i32,
			FCONST_0..=FCONST_2 => (op - FCONST_0) as i32,
			DCONST_0 | DCONST_1 => (op - DCONST_0) as i32,
			BIPUSH => self.signed_byte(1),
			SIPUSH => self.i16_at(1),
			IINC => self.signed_byte(2),
			WIDE if self.byte(1) == IINC => self.i16_at(4),
			_ => 0,
		}
	}

	pub fn switch(&self) -> Option<Switch> {
		let base = 1 + switch_padding(self.start);
		let default = self.i32_at(base);
		let cases = match self.opcode() {
			TABLESWITCH => {
				let low = self.i32_at(base + 4);
				let high = self.i32_at(base + 8);
				(low..=high)
					.enumerate()
					.map(|(i, key)| (key, self.i32_at(base + 12 + i * 4)))
					.collect()
			}
			LOOKUPSWITCH => {
				let npairs = self.i32_at(base + 4).max(0) as usize;
				(0..npairs)
					.map(|i| (self.i32_at(base + 8 + i * 8), self.i32_at(base + 12 + i * 8)))
					.collect()
			}
			_ => return None,
		};

		Some(Switch { default, cases })
	}

	/// Argument slot count of `invokeinterface`.
	pub fn count(&self) -> Option<u8> {
		(self.opcode() == INVOKEINTERFACE).then(|| self.byte(3))
	}

	pub fn dimensions(&self) -> Option<u8> {
		(self.opcode() == MULTIANEWARRAY).then(|| self.byte(3))
	}

	/// Element type of `newarray`.
	pub fn array_type(&self) -> Option<PrimitiveType> {
		if self.opcode() == NEWARRAY {
			PrimitiveType::from_array_code(self.byte(1))
		} else {
			None
		}
	}

	/// Mnemonic plus resolved operands, for listings.
	pub fn describe(&self, cp: &ConstantPool) -> Result<String, ReaderError> {
		let mut out = self.mnemonic();
		if let Some(constant) = self.indexed_constant(cp)? {
			out.push(' ');
			out.push_str(&constant.render(cp)?);
		} else if let Some(slot) = self.local_index() {
			match self.indexed_local_variable() {
				Some(variable) => out.push_str(&format!(" {}", variable.name(cp)?)),
				None => out.push_str(&format!(" #{slot}")),
			}
		}

		let op = self.effective_opcode();
		if let Some(target) = self.branch_target() {
			out.push_str(&format!(" -> {target}"));
		} else if matches!(op, BIPUSH | SIPUSH | IINC) {
			out.push_str(&format!(" {}", self.value()));
		} else if let Some(ty) = self.array_type() {
			out.push_str(&format!(" {}", ty.java_name()));
		} else if let Some(switch) = self.switch() {
			out.push_str(&format!(" {} cases, default -> {}", switch.cases.len(), self.start as i64 + switch.default as i64));
		}
		Ok(out)
	}

	fn byte(&self, offset: usize) -> u8 {
		self.bytes().get(offset).copied().unwrap_or(0)
	}

	fn signed_byte(&self, offset: usize) -> i32 {
		self.byte(offset) as i8 as i32
	}

	fn u16_at(&self, offset: usize) -> u16 {
		u16::from_be_bytes([self.byte(offset), self.byte(offset + 1)])
	}

	fn i16_at(&self, offset: usize) -> i32 {
		i16::from_be_bytes([self.byte(offset), self.byte(offset + 1)]) as i32
	}

	fn i32_at(&self, offset: usize) -> i32 {
		i32::from_be_bytes([
			self.byte(offset),
			self.byte(offset + 1),
			self.byte(offset + 2),
			self.byte(offset + 3),
		])
	}
}

/// Bytes between a switch opcode at `start` and its 4-byte aligned operands.
pub fn switch_padding(start: usize) -> usize {
	align_size(start + 1, 4) - (start + 1)
}

fn is_store(op: u8) -> bool {
	matches!(op, ISTORE..=ASTORE | ISTORE_0..=ASTORE_3)
}

fn measure(opcode: u8, bytes: &[u8], start: usize) -> Result<usize, &'static str> {
	let length = match shape(opcode) {
		None => return Err("undefined opcode"),
		Some(Shape::Fixed(length)) => length,
		Some(Shape::TableSwitch) => {
			let padding = switch_padding(start);
			let step: Step<'_, _> = tuple((take(1 + padding), be_i32, be_i32, be_i32))(bytes);
			let (_, (_, _, low, high)) = step.map_err(|_| TRUNCATED)?;
			if high < low {
				return Err("tableswitch high bound below its low bound");
			}
			let entries = (high as i64 - low as i64 + 1) as usize;
			let table = entries.checked_mul(4).ok_or(TRUNCATED)?;
			1 + padding + 12 + table
		}
		Some(Shape::LookupSwitch) => {
			let padding = switch_padding(start);
			let step: Step<'_, _> = tuple((take(1 + padding), be_i32, be_i32))(bytes);
			let (_, (_, _, npairs)) = step.map_err(|_| TRUNCATED)?;
			let npairs = usize::try_from(npairs).map_err(|_| "negative lookupswitch pair count")?;
			let table = npairs.checked_mul(8).ok_or(TRUNCATED)?;
			1 + padding + 8 + table
		}
		Some(Shape::Wide) => match bytes.get(1) {
			None => return Err(TRUNCATED),
			Some(&IINC) => 6,
			Some(&op) if is_widenable(op) => 4,
			Some(_) => return Err("wide prefix on an opcode without a local variable operand"),
		},
	};

	if length > bytes.len() {
		return Err(TRUNCATED);
	}
	Ok(length)
}

impl PartialEq for Instruction<'_> {
	fn eq(&self, other: &Self) -> bool {
		self.bytes() == other.bytes()
	}
}

impl Eq for Instruction<'_> {}

impl Hash for Instruction<'_> {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.bytes().hash(state)
	}
}

impl Debug for Instruction<'_> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Instruction")
			.field("start", &self.start)
			.field("mnemonic", &self.mnemonic())
			.field("bytes", &self.bytes())
			.finish()
	}
}

impl Display for Instruction<'_> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.mnemonic())
	}
}

/// Decodes a code array front to back. The first malformed instruction ends the iteration.
pub struct Instructions<'a> {
	code: &'a Code,
	pc: usize,
	failed: bool,
}

impl<'a> Instructions<'a> {
	pub(crate) fn new(code: &'a Code) -> Instructions<'a> {
		Instructions {
			code,
			pc: 0,
			failed: false,
		}
	}
}

impl<'a> Iterator for Instructions<'a> {
	type Item = Result<Instruction<'a>, ReaderError>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.failed || self.pc >= self.code.bytecode().len() {
			return None;
		}

		match Instruction::decode(self.code, self.pc) {
			Ok(instruction) => {
				self.pc += instruction.length;
				Some(Ok(instruction))
			}
			Err(error) => {
				self.failed = true;
				Some(Err(error))
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use std::collections::hash_map::DefaultHasher;

	use super::*;
	use crate::{AttributeInfo, ConstPtr};

	fn code(bytes: &[u8]) -> Code {
		Code {
			max_stack: 4,
			max_locals: 4,
			code: bytes.to_vec(),
			exception_table: vec![],
			attributes: vec![],
		}
	}

	fn hash(instruction: &Instruction) -> u64 {
		let mut hasher = DefaultHasher::new();
		instruction.hash(&mut hasher);
		hasher.finish()
	}

	#[test]
	fn constructor_prologue() {
		let code = code(&[ALOAD_0, INVOKESPECIAL, 0, 1, RETURN]);
		let instructions = code.decode().unwrap();
		let layout: Vec<_> = instructions.iter().map(|i| (i.start(), i.length())).collect();
		assert_eq!(layout, vec![(0, 1), (1, 3), (4, 1)]);
		assert_eq!(instructions[0].index(), Some(0));
		assert_eq!(instructions[1].constant_index(), Some(1));
		assert_eq!(instructions[1].mnemonic(), "invokespecial");
	}

	#[test]
	fn tableswitch_is_aligned_to_its_start() {
		#[rustfmt::skip]
		let code = code(&[
			NOP,
			TABLESWITCH, 0, 0,
			0, 0, 0, 20,
			0, 0, 0, 0,
			0, 0, 0, 1,
			0, 0, 0, 10,
			0, 0, 0, 15,
			RETURN,
		]);
		let instructions = code.decode().unwrap();
		assert_eq!(instructions.len(), 3);
		assert_eq!(instructions[1].length(), 23);
		assert_eq!(
			instructions[1].switch(),
			Some(Switch {
				default: 20,
				cases: vec![(0, 10), (1, 15)]
			})
		);
		assert_eq!(instructions[2].start(), 24);
	}

	#[test]
	fn lookupswitch_padding() {
		#[rustfmt::skip]
		let code = code(&[
			LOOKUPSWITCH, 0, 0, 0,
			0, 0, 0, 5,
			0, 0, 0, 1,
			0, 0, 0, 7,
			0, 0, 0, 9,
		]);
		let instructions = code.decode().unwrap();
		assert_eq!(instructions[0].length(), 20);
		assert_eq!(instructions[0].switch().unwrap().cases, vec![(7, 9)]);
		for start in 0..8 {
			assert!(switch_padding(start) <= 3);
			assert_eq!((start + 1 + switch_padding(start)) % 4, 0);
		}
	}

	#[test]
	fn wide_iinc() {
		let wide = code(&[WIDE, IINC, 0x01, 0x00, 0xff, 0xfe]);
		let narrow = code(&[IINC, 5, 0xfe]);
		let wide = wide.decode().unwrap();
		let narrow = narrow.decode().unwrap();
		assert_eq!(wide[0].length(), 6);
		assert_eq!(wide[0].index(), Some(256));
		assert_eq!(wide[0].value(), -2);
		assert_eq!(wide[0].mnemonic(), "wide iinc");
		assert_eq!(narrow[0].index(), Some(5));
		assert_eq!(narrow[0].value(), -2);
	}

	#[test]
	fn wide_load() {
		let code = code(&[WIDE, ILOAD, 0x01, 0x02]);
		let instructions = code.decode().unwrap();
		assert_eq!(instructions[0].length(), 4);
		assert_eq!(instructions[0].local_index(), Some(258));
		assert_eq!(instructions[0].constant_index(), None);
	}

	#[test]
	fn malformed_streams() {
		assert_eq!(
			code(&[SIPUSH, 0]).decode(),
			Err(ReaderError::MalformedBytecode {
				offset: 0,
				opcode: SIPUSH,
				reason: TRUNCATED
			})
		);
		assert!(matches!(
			code(&[NOP, 0xcb]).decode(),
			Err(ReaderError::MalformedBytecode { offset: 1, opcode: 0xcb, .. })
		));
		assert!(matches!(
			code(&[WIDE, IADD, 0, 0]).decode(),
			Err(ReaderError::MalformedBytecode { opcode: WIDE, .. })
		));
		assert!(code(&[NOP, TABLESWITCH, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0]).decode().is_err());
	}

	#[test]
	fn iteration_stops_at_the_first_error() {
		let code = code(&[NOP, SIPUSH, 1]);
		let mut instructions = code.instructions();
		assert!(matches!(instructions.next(), Some(Ok(_))));
		assert!(matches!(instructions.next(), Some(Err(_))));
		assert!(instructions.next().is_none());
	}

	#[test]
	fn equality_ignores_position() {
		let first = code(&[ALOAD_0, INVOKESPECIAL, 0, 1]);
		let second = code(&[NOP, NOP, INVOKESPECIAL, 0, 1]);
		let first = first.decode().unwrap();
		let second = second.decode().unwrap();
		assert_eq!(first[1], second[2]);
		assert_eq!(hash(&first[1]), hash(&second[2]));
		assert_ne!(first[0], second[0]);
	}

	#[test]
	fn store_looks_up_after_itself() {
		let mut code = code(&[ISTORE_1, ILOAD_1, RETURN]);
		code.attributes.push(AttributeInfo::LocalVariableTable {
			local_variables: vec![LocalVariable {
				start_pc: 1,
				length: 2,
				name: ConstPtr::new(1),
				descriptor: ConstPtr::new(2),
				index: 1,
			}],
		});
		let instructions = code.decode().unwrap();
		assert!(instructions[0].indexed_local_variable().is_some());
		assert!(instructions[1].indexed_local_variable().is_some());
		assert!(instructions[2].indexed_local_variable().is_none());
	}

	#[test]
	fn branches_and_values() {
		let code = code(&[NOP, NOP, NOP, GOTO, 0xff, 0xfd, BIPUSH, 0x80, ICONST_M1, NEWARRAY, 10, MULTIANEWARRAY, 0, 3, 2]);
		let instructions = code.decode().unwrap();
		assert_eq!(instructions[3].offset(), -3);
		assert_eq!(instructions[3].branch_target(), Some(0));
		assert_eq!(instructions[4].value(), -128);
		assert_eq!(instructions[5].value(), -1);
		assert_eq!(instructions[6].array_type(), Some(PrimitiveType::Int));
		assert_eq!(instructions[7].dimensions(), Some(2));
		assert_eq!(instructions[7].constant_index(), Some(3));
	}
}
