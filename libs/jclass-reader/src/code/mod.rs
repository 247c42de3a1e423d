use nom::combinator::map;
use nom::error::context;
use nom::multi::{length_count, length_data};
use nom::number::complete::{be_u16, be_u32};
use nom::sequence::tuple;
use tracing::trace;

pub use crate::code::inst::*;
use crate::attribute::AttributeInfo;
use crate::consts::ConstantPool;
use crate::{be_cp, ClassConst, ConstPtr, IResult, LineNumber, LocalVariable, ReaderError, StackMapFrame};

mod inst;
pub mod opcode;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExceptionHandler {
	pub start_pc: u16,
	pub end_pc: u16,
	pub handler_pc: u16,
	/// Absent for handlers that catch everything (`finally`).
	pub catch_type: ConstPtr<ClassConst>,
}

impl ExceptionHandler {
	pub fn parse(input: &[u8]) -> IResult<Self> {
		map(
			tuple((be_u16, be_u16, be_u16, be_cp)),
			|(start_pc, end_pc, handler_pc, catch_type)| ExceptionHandler {
				start_pc,
				end_pc,
				handler_pc,
				catch_type,
			},
		)(input)
	}

	pub fn catches_everything(&self) -> bool {
		self.catch_type.is_absent()
	}

	pub fn catch_type_name<'a>(&self, cp: &'a ConstantPool) -> Result<Option<&'a str>, ReaderError> {
		match cp.get_optional(self.catch_type)? {
			Some(class) => class.name(cp).map(Some),
			None => Ok(None),
		}
	}
}

/// The body of a method. Instructions are decoded on demand, so a broken code array only
/// surfaces when somebody walks it and never keeps the rest of the class from loading.
#[derive(Clone, Debug, PartialEq)]
pub struct Code {
	pub max_stack: u16,
	pub max_locals: u16,
	pub code: Vec<u8>,
	pub exception_table: Vec<ExceptionHandler>,
	pub attributes: Vec<AttributeInfo>,
}

impl Code {
	pub fn parse<'a>(input: &'a [u8], constant_pool: &ConstantPool) -> IResult<'a, Self> {
		Self::parse_nested(input, constant_pool, 1)
	}

	pub(crate) fn parse_nested<'a>(
		input: &'a [u8],
		constant_pool: &ConstantPool,
		depth: usize,
	) -> IResult<'a, Self> {
		let (input, max_stack) = be_u16(input)?;
		let (input, max_locals) = be_u16(input)?;
		let (input, code) = context("Bytecode", length_data(be_u32))(input)?;
		let (input, exception_table) =
			context("Exception table", length_count(be_u16, ExceptionHandler::parse))(input)?;
		let (input, attributes) = AttributeInfo::parse_list_nested(input, constant_pool, depth)?;

		trace!(
			"code: {} bytes, {} handlers, {} attributes",
			code.len(),
			exception_table.len(),
			attributes.len()
		);
		Ok((
			input,
			Code {
				max_stack,
				max_locals,
				code: code.to_vec(),
				exception_table,
				attributes,
			},
		))
	}

	pub fn bytecode(&self) -> &[u8] {
		&self.code
	}

	pub fn instructions(&self) -> Instructions<'_> {
		Instructions::new(self)
	}

	/// Decodes every instruction, failing on the first malformed one.
	pub fn decode(&self) -> Result<Vec<Instruction<'_>>, ReaderError> {
		self.instructions().collect()
	}

	pub fn instruction_at(&self, pc: usize) -> Result<Instruction<'_>, ReaderError> {
		Instruction::decode(self, pc)
	}

	pub fn line_numbers(&self) -> impl Iterator<Item = &LineNumber> {
		self.attributes.iter().flat_map(|attribute| match attribute {
			AttributeInfo::LineNumberTable { line_numbers } => line_numbers.as_slice(),
			_ => &[][..],
		})
	}

	/// Source line of the instruction at `pc`, from the closest entry at or before it.
	pub fn line_number(&self, pc: usize) -> Option<u16> {
		self.line_numbers()
			.filter(|line| line.start_pc as usize <= pc)
			.max_by_key(|line| line.start_pc)
			.map(|line| line.line_number)
	}

	pub fn local_variables(&self) -> impl Iterator<Item = &LocalVariable> {
		self.attributes.iter().flat_map(|attribute| match attribute {
			AttributeInfo::LocalVariableTable { local_variables } => local_variables.as_slice(),
			_ => &[][..],
		})
	}

	/// The variable stored in `slot` while `pc` executes.
	pub fn local_variable(&self, slot: u16, pc: usize) -> Option<&LocalVariable> {
		self.local_variables()
			.find(|variable| variable.index == slot && variable.covers(pc))
	}

	pub fn stack_map(&self) -> Option<&[StackMapFrame]> {
		self.attributes.iter().find_map(|attribute| match attribute {
			AttributeInfo::StackMapTable { frames } => Some(frames.as_slice()),
			_ => None,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{ConstantInfo, UTF8Const};

	#[test]
	fn nested_tables() {
		let cp = ConstantPool::new(vec![ConstantInfo::UTF8(UTF8Const("LineNumberTable".to_string()))]);
		#[rustfmt::skip]
		let data = [
			0, 2, 0, 1, // max stack, max locals
			0, 0, 0, 3, 0x2a, 0x57, 0xb1, // code
			0, 1, 0, 0, 0, 3, 0, 2, 0, 0, // one catch-all handler
			0, 1, 0, 1, 0, 0, 0, 10, 0, 2, 0, 0, 0, 7, 0, 2, 0, 8, // two line numbers
		];
		let (rest, code) = Code::parse(&data, &cp).map_err(|_| "parse failed").unwrap();
		assert!(rest.is_empty());
		assert_eq!(code.bytecode(), &[0x2a, 0x57, 0xb1]);
		assert!(code.exception_table[0].catches_everything());
		assert_eq!(code.exception_table[0].catch_type_name(&cp), Ok(None));
		assert_eq!(code.line_number(0), Some(7));
		assert_eq!(code.line_number(1), Some(7));
		assert_eq!(code.line_number(2), Some(8));
		assert!(code.stack_map().is_none());
	}

	#[test]
	fn broken_bytecode_still_parses() {
		let cp = ConstantPool::new(vec![]);
		let data = [0, 1, 0, 1, 0, 0, 0, 2, 0x11, 0x00, 0, 0, 0, 0];
		let (_, code) = Code::parse(&data, &cp).map_err(|_| "parse failed").unwrap();
		assert!(code.decode().is_err());
	}
}
