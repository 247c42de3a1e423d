use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use nom::combinator::map;
use nom::multi::length_count;
use nom::number::complete::{be_u16, be_u8};
use nom::sequence::{pair, tuple};

use crate::error::malformed;
use crate::{Annotation, IResult};

/// Where in a declaration or expression an annotated type occurs.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, FromPrimitive)]
pub enum TargetType {
	ClassTypeParameter = 0x00,
	MethodTypeParameter = 0x01,
	ClassExtends = 0x10,
	ClassTypeParameterBound = 0x11,
	MethodTypeParameterBound = 0x12,
	Field = 0x13,
	MethodReturn = 0x14,
	MethodReceiver = 0x15,
	MethodFormalParameter = 0x16,
	Throws = 0x17,
	LocalVariable = 0x40,
	ResourceVariable = 0x41,
	ExceptionParameter = 0x42,
	InstanceOf = 0x43,
	New = 0x44,
	ConstructorReference = 0x45,
	MethodReference = 0x46,
	Cast = 0x47,
	ConstructorInvocationTypeArgument = 0x48,
	MethodInvocationTypeArgument = 0x49,
	ConstructorReferenceTypeArgument = 0x4a,
	MethodReferenceTypeArgument = 0x4b,
}

/// The `target_info` union, its shape picked by the [`TargetType`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TargetInfo {
	TypeParameter {
		type_parameter_index: u8,
	},
	Supertype {
		supertype_index: u16,
	},
	TypeParameterBound {
		type_parameter_index: u8,
		bound_index: u8,
	},
	Empty,
	FormalParameter {
		formal_parameter_index: u8,
	},
	Throws {
		throws_type_index: u16,
	},
	LocalVariable {
		table: Vec<LocalVariableTarget>,
	},
	Catch {
		exception_table_index: u16,
	},
	Offset {
		offset: u16,
	},
	TypeArgument {
		offset: u16,
		type_argument_index: u8,
	},
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LocalVariableTarget {
	pub start_pc: u16,
	pub length: u16,
	pub index: u16,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TypePathEntry {
	/// 0 array element, 1 nested type, 2 wildcard bound, 3 type argument.
	pub type_path_kind: u8,
	pub type_argument_index: u8,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypeAnnotation {
	pub target_type: TargetType,
	pub target_info: TargetInfo,
	pub target_path: Vec<TypePathEntry>,
	pub annotation: Annotation,
}

impl TypeAnnotation {
	pub fn parse(input: &[u8]) -> IResult<'_, Self> {
		let (rest, raw) = be_u8(input)?;
		let target_type = TargetType::from_u8(raw)
			.ok_or_else(|| malformed(input, format!("unknown type annotation target {raw:#04x}")))?;
		let (rest, target_info) = TargetInfo::parse(rest, target_type)?;
		let (rest, target_path) = length_count(
			be_u8,
			map(pair(be_u8, be_u8), |(type_path_kind, type_argument_index)| {
				TypePathEntry {
					type_path_kind,
					type_argument_index,
				}
			}),
		)(rest)?;
		let (rest, annotation) = Annotation::parse(rest)?;

		Ok((
			rest,
			TypeAnnotation {
				target_type,
				target_info,
				target_path,
				annotation,
			},
		))
	}
}

impl TargetInfo {
	pub fn parse(input: &[u8], target_type: TargetType) -> IResult<'_, Self> {
		use TargetType::*;
		match target_type {
			ClassTypeParameter | MethodTypeParameter => map(be_u8, |type_parameter_index| {
				TargetInfo::TypeParameter {
					type_parameter_index,
				}
			})(input),
			ClassExtends => map(be_u16, |supertype_index| TargetInfo::Supertype { supertype_index })(input),
			ClassTypeParameterBound | MethodTypeParameterBound => {
				map(pair(be_u8, be_u8), |(type_parameter_index, bound_index)| {
					TargetInfo::TypeParameterBound {
						type_parameter_index,
						bound_index,
					}
				})(input)
			}
			Field | MethodReturn | MethodReceiver => Ok((input, TargetInfo::Empty)),
			MethodFormalParameter => map(be_u8, |formal_parameter_index| TargetInfo::FormalParameter {
				formal_parameter_index,
			})(input),
			Throws => map(be_u16, |throws_type_index| TargetInfo::Throws { throws_type_index })(input),
			LocalVariable | ResourceVariable => map(
				length_count(
					be_u16,
					map(tuple((be_u16, be_u16, be_u16)), |(start_pc, length, index)| {
						LocalVariableTarget {
							start_pc,
							length,
							index,
						}
					}),
				),
				|table| TargetInfo::LocalVariable { table },
			)(input),
			ExceptionParameter => map(be_u16, |exception_table_index| TargetInfo::Catch {
				exception_table_index,
			})(input),
			InstanceOf | New | ConstructorReference | MethodReference => {
				map(be_u16, |offset| TargetInfo::Offset { offset })(input)
			}
			Cast
			| ConstructorInvocationTypeArgument
			| MethodInvocationTypeArgument
			| ConstructorReferenceTypeArgument
			| MethodReferenceTypeArgument => map(pair(be_u16, be_u8), |(offset, type_argument_index)| {
				TargetInfo::TypeArgument {
					offset,
					type_argument_index,
				}
			})(input),
		}
	}
}
