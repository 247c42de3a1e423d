use jclass_core::{InnerClassAccessFlags, ParameterFlags};
use nom::combinator::map;
use nom::multi::length_count;
use nom::number::complete::be_u16;
use nom::sequence::tuple;

use crate::{be_cp, ClassConst, ConstPtr, ConstantInfo, ConstantPool, IResult, MethodHandleConst, ReaderError, UTF8Const};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct InnerClass {
	pub inner_class: ConstPtr<ClassConst>,
	/// Absent for local and anonymous classes.
	pub outer_class: ConstPtr<ClassConst>,
	/// Absent for anonymous classes.
	pub inner_name: ConstPtr<UTF8Const>,
	pub access_flags: InnerClassAccessFlags,
}

impl InnerClass {
	pub fn parse(input: &[u8]) -> IResult<'_, Self> {
		map(
			tuple((be_cp, be_cp, be_cp, map(be_u16, InnerClassAccessFlags::from_bits_retain))),
			|(inner_class, outer_class, inner_name, access_flags)| InnerClass {
				inner_class,
				outer_class,
				inner_name,
				access_flags,
			},
		)(input)
	}

	pub fn inner_class_name<'a>(&self, cp: &'a ConstantPool) -> Result<&'a str, ReaderError> {
		cp.class_name(self.inner_class)
	}

	pub fn outer_class_name<'a>(&self, cp: &'a ConstantPool) -> Result<Option<&'a str>, ReaderError> {
		match cp.get_optional(self.outer_class)? {
			Some(class) => class.name(cp).map(Some),
			None => Ok(None),
		}
	}

	pub fn inner_name<'a>(&self, cp: &'a ConstantPool) -> Result<Option<&'a str>, ReaderError> {
		Ok(cp.get_optional(self.inner_name)?.map(UTF8Const::as_str))
	}

	pub fn is_anonymous(&self) -> bool {
		self.inner_name.is_absent()
	}

	pub fn is_member(&self) -> bool {
		!self.outer_class.is_absent() && !self.inner_name.is_absent()
	}
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LineNumber {
	pub start_pc: u16,
	pub line_number: u16,
}

impl LineNumber {
	pub fn parse(input: &[u8]) -> IResult<'_, Self> {
		map(tuple((be_u16, be_u16)), |(start_pc, line_number)| LineNumber {
			start_pc,
			line_number,
		})(input)
	}
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LocalVariable {
	pub start_pc: u16,
	pub length: u16,
	pub name: ConstPtr<UTF8Const>,
	pub descriptor: ConstPtr<UTF8Const>,
	pub index: u16,
}

impl LocalVariable {
	pub fn parse(input: &[u8]) -> IResult<'_, Self> {
		map(
			tuple((be_u16, be_u16, be_cp, be_cp, be_u16)),
			|(start_pc, length, name, descriptor, index)| LocalVariable {
				start_pc,
				length,
				name,
				descriptor,
				index,
			},
		)(input)
	}

	/// The variable is live in `start_pc..start_pc + length`.
	pub fn covers(&self, pc: usize) -> bool {
		let start = self.start_pc as usize;
		pc >= start && pc < start + self.length as usize
	}

	pub fn name<'a>(&self, cp: &'a ConstantPool) -> Result<&'a str, ReaderError> {
		cp.utf8(self.name)
	}

	pub fn descriptor<'a>(&self, cp: &'a ConstantPool) -> Result<&'a str, ReaderError> {
		cp.utf8(self.descriptor)
	}
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LocalVariableType {
	pub start_pc: u16,
	pub length: u16,
	pub name: ConstPtr<UTF8Const>,
	pub signature: ConstPtr<UTF8Const>,
	pub index: u16,
}

impl LocalVariableType {
	pub fn parse(input: &[u8]) -> IResult<'_, Self> {
		map(
			tuple((be_u16, be_u16, be_cp, be_cp, be_u16)),
			|(start_pc, length, name, signature, index)| LocalVariableType {
				start_pc,
				length,
				name,
				signature,
				index,
			},
		)(input)
	}
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BootstrapMethod {
	pub method_ref: ConstPtr<MethodHandleConst>,
	/// Loadable constants (strings, classes, numbers, handles, method types, dynamic constants).
	pub arguments: Vec<ConstPtr<ConstantInfo>>,
}

impl BootstrapMethod {
	pub fn parse(input: &[u8]) -> IResult<'_, Self> {
		map(
			tuple((be_cp, length_count(be_u16, be_cp))),
			|(method_ref, arguments)| BootstrapMethod {
				method_ref,
				arguments,
			},
		)(input)
	}
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct MethodParameter {
	/// Absent for parameters compiled without a name.
	pub name: ConstPtr<UTF8Const>,
	pub access_flags: ParameterFlags,
}

impl MethodParameter {
	pub fn parse(input: &[u8]) -> IResult<'_, Self> {
		map(
			tuple((be_cp, map(be_u16, ParameterFlags::from_bits_retain))),
			|(name, access_flags)| MethodParameter { name, access_flags },
		)(input)
	}

	pub fn name<'a>(&self, cp: &'a ConstantPool) -> Result<Option<&'a str>, ReaderError> {
		Ok(cp.get_optional(self.name)?.map(UTF8Const::as_str))
	}
}
