use nom::multi::length_count;
use nom::number::complete::be_u16;
use nom::sequence::pair;

use crate::{be_cp, AttributeInfo, ConstPtr, ConstantPool, IResult, ReaderError, UTF8Const};

#[derive(Clone, Debug, PartialEq)]
pub struct RecordComponent {
	pub name: ConstPtr<UTF8Const>,
	pub descriptor: ConstPtr<UTF8Const>,
	pub attributes: Vec<AttributeInfo>,
}

impl RecordComponent {
	pub fn parse<'a>(input: &'a [u8], constant_pool: &ConstantPool) -> IResult<'a, Self> {
		Self::parse_nested(input, constant_pool, 1)
	}

	fn parse_nested<'a>(input: &'a [u8], constant_pool: &ConstantPool, depth: usize) -> IResult<'a, Self> {
		let (input, (name, descriptor)) = pair(be_cp, be_cp)(input)?;
		let (input, attributes) = AttributeInfo::parse_list_nested(input, constant_pool, depth)?;
		Ok((
			input,
			RecordComponent {
				name,
				descriptor,
				attributes,
			},
		))
	}

	pub fn name<'a>(&self, cp: &'a ConstantPool) -> Result<&'a str, ReaderError> {
		cp.utf8(self.name)
	}

	pub fn descriptor<'a>(&self, cp: &'a ConstantPool) -> Result<&'a str, ReaderError> {
		cp.utf8(self.descriptor)
	}
}

pub(crate) fn parse_components<'a>(
	input: &'a [u8],
	constant_pool: &ConstantPool,
	depth: usize,
) -> IResult<'a, Vec<RecordComponent>> {
	length_count(be_u16, |input| RecordComponent::parse_nested(input, constant_pool, depth))(input)
}
