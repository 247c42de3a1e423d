use nom::combinator::map;
use nom::multi::{count, length_count};
use nom::number::complete::{be_u16, be_u8};

use crate::error::malformed;
use crate::{be_cp, ClassConst, ConstPtr, IResult};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum VerificationType {
	Top,
	Integer,
	Float,
	Double,
	Long,
	Null,
	UninitializedThis,
	Object(ConstPtr<ClassConst>),
	/// Offset of the `new` instruction that created the object.
	Uninitialized(u16),
}

impl VerificationType {
	pub fn parse(input: &[u8]) -> IResult<'_, Self> {
		let (rest, tag) = be_u8(input)?;
		match tag {
			0 => Ok((rest, VerificationType::Top)),
			1 => Ok((rest, VerificationType::Integer)),
			2 => Ok((rest, VerificationType::Float)),
			3 => Ok((rest, VerificationType::Double)),
			4 => Ok((rest, VerificationType::Long)),
			5 => Ok((rest, VerificationType::Null)),
			6 => Ok((rest, VerificationType::UninitializedThis)),
			7 => map(be_cp, VerificationType::Object)(rest),
			8 => map(be_u16, VerificationType::Uninitialized)(rest),
			tag => Err(malformed(input, format!("unknown verification type tag {tag}"))),
		}
	}

	pub fn tag(&self) -> u8 {
		match self {
			VerificationType::Top => 0,
			VerificationType::Integer => 1,
			VerificationType::Float => 2,
			VerificationType::Double => 3,
			VerificationType::Long => 4,
			VerificationType::Null => 5,
			VerificationType::UninitializedThis => 6,
			VerificationType::Object(_) => 7,
			VerificationType::Uninitialized(_) => 8,
		}
	}
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StackMapFrame {
	/// 0..=63, the offset delta is the frame type itself.
	Same { frame_type: u8 },
	/// 64..=127, offset delta is `frame_type - 64`.
	SameLocals1StackItem { frame_type: u8, stack: VerificationType },
	/// 247
	SameLocals1StackItemExtended { offset_delta: u16, stack: VerificationType },
	/// 248..=250, drops `251 - frame_type` locals.
	Chop { frame_type: u8, offset_delta: u16 },
	/// 251
	SameExtended { offset_delta: u16 },
	/// 252..=254, adds `frame_type - 251` locals.
	Append {
		frame_type: u8,
		offset_delta: u16,
		locals: Vec<VerificationType>,
	},
	/// 255
	Full {
		offset_delta: u16,
		locals: Vec<VerificationType>,
		stack: Vec<VerificationType>,
	},
}

impl StackMapFrame {
	pub fn parse(input: &[u8]) -> IResult<'_, Self> {
		let (rest, frame_type) = be_u8(input)?;
		match frame_type {
			0..=63 => Ok((rest, StackMapFrame::Same { frame_type })),
			64..=127 => map(VerificationType::parse, |stack| StackMapFrame::SameLocals1StackItem {
				frame_type,
				stack,
			})(rest),
			247 => {
				let (rest, offset_delta) = be_u16(rest)?;
				let (rest, stack) = VerificationType::parse(rest)?;
				Ok((rest, StackMapFrame::SameLocals1StackItemExtended { offset_delta, stack }))
			}
			248..=250 => map(be_u16, |offset_delta| StackMapFrame::Chop {
				frame_type,
				offset_delta,
			})(rest),
			251 => map(be_u16, |offset_delta| StackMapFrame::SameExtended { offset_delta })(rest),
			252..=254 => {
				let (rest, offset_delta) = be_u16(rest)?;
				let (rest, locals) = count(VerificationType::parse, (frame_type - 251) as usize)(rest)?;
				Ok((
					rest,
					StackMapFrame::Append {
						frame_type,
						offset_delta,
						locals,
					},
				))
			}
			255 => {
				let (rest, offset_delta) = be_u16(rest)?;
				let (rest, locals) = length_count(be_u16, VerificationType::parse)(rest)?;
				let (rest, stack) = length_count(be_u16, VerificationType::parse)(rest)?;
				Ok((
					rest,
					StackMapFrame::Full {
						offset_delta,
						locals,
						stack,
					},
				))
			}
			reserved => Err(malformed(input, format!("reserved stack map frame type {reserved}"))),
		}
	}

	pub fn frame_type(&self) -> u8 {
		match self {
			StackMapFrame::Same { frame_type }
			| StackMapFrame::SameLocals1StackItem { frame_type, .. }
			| StackMapFrame::Chop { frame_type, .. }
			| StackMapFrame::Append { frame_type, .. } => *frame_type,
			StackMapFrame::SameLocals1StackItemExtended { .. } => 247,
			StackMapFrame::SameExtended { .. } => 251,
			StackMapFrame::Full { .. } => 255,
		}
	}

	pub fn offset_delta(&self) -> u16 {
		match self {
			StackMapFrame::Same { frame_type } => *frame_type as u16,
			StackMapFrame::SameLocals1StackItem { frame_type, .. } => (*frame_type - 64) as u16,
			StackMapFrame::SameLocals1StackItemExtended { offset_delta, .. }
			| StackMapFrame::Chop { offset_delta, .. }
			| StackMapFrame::SameExtended { offset_delta }
			| StackMapFrame::Append { offset_delta, .. }
			| StackMapFrame::Full { offset_delta, .. } => *offset_delta,
		}
	}

	/// Every verification type in the frame, locals before stack items.
	pub fn verification_types(&self) -> Vec<&VerificationType> {
		match self {
			StackMapFrame::Same { .. } | StackMapFrame::Chop { .. } | StackMapFrame::SameExtended { .. } => {
				Vec::new()
			}
			StackMapFrame::SameLocals1StackItem { stack, .. }
			| StackMapFrame::SameLocals1StackItemExtended { stack, .. } => vec![stack],
			StackMapFrame::Append { locals, .. } => locals.iter().collect(),
			StackMapFrame::Full { locals, stack, .. } => locals.iter().chain(stack.iter()).collect(),
		}
	}
}
