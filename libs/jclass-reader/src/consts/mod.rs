mod class;
mod dynamic;
mod field;
mod interface;
mod method;
mod module;
mod name_and_type;
mod number;
mod string;
mod utf_8;

pub use crate::consts::class::ClassConst;
pub use crate::consts::dynamic::{DynamicConst, InvokeDynamicConst};
pub use crate::consts::field::FieldConst;
pub use crate::consts::interface::InterfaceConst;
pub use crate::consts::method::{MethodConst, MethodHandleConst, MethodTypeConst, ReferenceKind};
pub use crate::consts::module::{ModuleConst, PackageConst};
pub use crate::consts::name_and_type::NameAndTypeConst;
pub use crate::consts::number::{DoubleConst, FloatConst, IntegerConst, LongConst};
pub use crate::consts::string::StringConst;
pub use crate::consts::utf_8::UTF8Const;
use crate::error::{fault, malformed};
use crate::{IResult, PoolProblem, ReaderError};
use jclass_core::MethodDescriptor;
use nom::combinator::map;
use nom::error::context;
use nom::multi::length_data;
use nom::number::complete::{be_f32, be_f64, be_i32, be_i64, be_u16, be_u8};
use nom::sequence::pair;
use num_traits::FromPrimitive;
use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use tracing::trace;

#[macro_export]
macro_rules! impl_constant {
	($VARIANT:ident $TY:ty, $KIND:literal) => {
		impl $crate::Constant for $TY {
			const KIND: &'static str = $KIND;

			fn get(value: &$crate::ConstantInfo) -> Option<&Self> {
				match value {
					$crate::ConstantInfo::$VARIANT(v) => Some(v),
					_ => None,
				}
			}
		}
	};
}

/// An entry kind a [`ConstPtr`] can point at.
pub trait Constant {
	/// Name of the kind as used in error messages.
	const KIND: &'static str;

	fn get(value: &ConstantInfo) -> Option<&Self>;
}

/// Any live entry.
impl Constant for ConstantInfo {
	const KIND: &'static str = "any entry";

	fn get(value: &ConstantInfo) -> Option<&Self> {
		Some(value)
	}
}

/// A 1-based constant pool slot expected to hold a `V`. Index 0 is the "absent" pointer.
pub struct ConstPtr<V: Constant>(u16, PhantomData<V>);

impl<V: Constant> ConstPtr<V> {
	pub fn new(id: u16) -> ConstPtr<V> {
		ConstPtr(id, PhantomData)
	}

	pub fn index(&self) -> u16 {
		self.0
	}

	pub fn is_absent(&self) -> bool {
		self.0 == 0
	}

	pub fn get<'a>(&self, cp: &'a ConstantPool) -> Result<&'a V, ReaderError> {
		cp.get(*self)
	}

	/// Forgets the expected kind.
	pub fn any(&self) -> ConstPtr<ConstantInfo> {
		ConstPtr::new(self.0)
	}
}

#[inline]
pub fn be_cp<V: Constant>(input: &[u8]) -> IResult<'_, ConstPtr<V>> {
	map(be_u16, |v| ConstPtr::new(v))(input)
}

impl<V: Constant> Clone for ConstPtr<V> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<V: Constant> Copy for ConstPtr<V> {}

impl<V: Constant> PartialEq for ConstPtr<V> {
	fn eq(&self, other: &Self) -> bool {
		self.0 == other.0
	}
}

impl<V: Constant> Eq for ConstPtr<V> {}

impl<V: Constant> Hash for ConstPtr<V> {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.0.hash(state)
	}
}

impl<V: Constant> Debug for ConstPtr<V> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Chained resolution shared by field, method and interface method references.
pub trait MemberRef {
	fn class(&self) -> ConstPtr<ClassConst>;
	fn name_and_type(&self) -> ConstPtr<NameAndTypeConst>;

	fn class_name<'a>(&self, cp: &'a ConstantPool) -> Result<&'a str, ReaderError> {
		cp.get(self.class())?.name(cp)
	}

	fn name<'a>(&self, cp: &'a ConstantPool) -> Result<&'a str, ReaderError> {
		cp.get(self.name_and_type())?.name(cp)
	}

	fn descriptor<'a>(&self, cp: &'a ConstantPool) -> Result<&'a str, ReaderError> {
		cp.get(self.name_and_type())?.descriptor(cp)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConstantPool(Vec<ConstantInfo>);

impl ConstantPool {
	pub fn new(values: Vec<ConstantInfo>) -> ConstantPool {
		ConstantPool(values)
	}

	pub fn parse(input: &[u8]) -> IResult<'_, ConstantPool> {
		let (mut input, count) = be_u16(input)?;
		if count == 0 {
			return Err(malformed(input, "constant_pool_count is zero"));
		}

		trace!("cp_pool count {}", count - 1);
		let mut values = Vec::with_capacity(count as usize - 1);
		let mut index = 1;
		while index < count {
			let (rest, info) = context("Constant", |input| ConstantInfo::parse(input, index))(input)?;
			let wide = matches!(info, ConstantInfo::Long(_) | ConstantInfo::Double(_));
			values.push(info);
			input = rest;
			index += 1;

			if wide {
				if index >= count {
					return Err(malformed(input, "long or double entry in the last constant pool slot"));
				}
				values.push(ConstantInfo::Unusable);
				index += 1;
			}
		}

		Ok((input, ConstantPool(values)))
	}

	/// Number of slots, placeholders included. Slot indices run from 1 to `len()`.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn raw_get(&self, index: u16) -> Result<&ConstantInfo, ReaderError> {
		let problem = if index == 0 {
			PoolProblem::Absent
		} else {
			match self.0.get(index as usize - 1) {
				Some(ConstantInfo::Unusable) => PoolProblem::Unusable,
				Some(info) => return Ok(info),
				None => PoolProblem::OutOfRange {
					slots: self.0.len(),
				},
			}
		};

		Err(ReaderError::MalformedConstantPool { index, problem })
	}

	pub fn get<V: Constant>(&self, ptr: ConstPtr<V>) -> Result<&V, ReaderError> {
		let info = self.raw_get(ptr.0)?;
		V::get(info).ok_or(ReaderError::MalformedConstantPool {
			index: ptr.0,
			problem: PoolProblem::WrongKind {
				expected: V::KIND,
				found: info.kind(),
			},
		})
	}

	/// Like [`ConstantPool::get`], but index 0 resolves to `None` instead of failing.
	pub fn get_optional<V: Constant>(&self, ptr: ConstPtr<V>) -> Result<Option<&V>, ReaderError> {
		if ptr.is_absent() {
			Ok(None)
		} else {
			self.get(ptr).map(Some)
		}
	}

	pub fn utf8(&self, ptr: ConstPtr<UTF8Const>) -> Result<&str, ReaderError> {
		self.get(ptr).map(UTF8Const::as_str)
	}

	pub fn class_name(&self, ptr: ConstPtr<ClassConst>) -> Result<&str, ReaderError> {
		self.get(ptr)?.name(self)
	}

	/// Live entries with their slot index, placeholders skipped.
	pub fn iter(&self) -> impl Iterator<Item = (u16, &ConstantInfo)> {
		self.0
			.iter()
			.enumerate()
			.filter(|(_, info)| !matches!(info, ConstantInfo::Unusable))
			.map(|(i, info)| ((i + 1) as u16, info))
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConstantInfo {
	Class(ClassConst),
	Field(FieldConst),
	Method(MethodConst),
	Interface(InterfaceConst),
	String(StringConst),
	Integer(IntegerConst),
	Float(FloatConst),
	Long(LongConst),
	Double(DoubleConst),
	NameAndType(NameAndTypeConst),
	UTF8(UTF8Const),
	MethodHandle(MethodHandleConst),
	MethodType(MethodTypeConst),
	Dynamic(DynamicConst),
	InvokeDynamic(InvokeDynamicConst),
	Module(ModuleConst),
	Package(PackageConst),
	/// Second slot of a long or double.
	Unusable,
}

impl ConstantInfo {
	pub fn parse(input: &[u8], index: u16) -> IResult<'_, Self> {
		let (rest, variant) = be_u8(input)?;

		trace!("cp_info #{index} tag: {variant}");
		match variant {
			1 => {
				let (rest, data) = length_data(be_u16)(rest)?;
				let text = decode_mutf8(data).ok_or_else(|| {
					fault(
						input,
						ReaderError::MalformedConstantPool {
							index,
							problem: PoolProblem::InvalidUtf8,
						},
					)
				})?;
				trace!("cp_info UTF-8 {text}");
				Ok((rest, ConstantInfo::UTF8(UTF8Const(text))))
			}
			3 => map(be_i32, |value| ConstantInfo::Integer(IntegerConst { value }))(rest),
			4 => map(be_f32, |value| ConstantInfo::Float(FloatConst { value }))(rest),
			5 => map(be_i64, |value| ConstantInfo::Long(LongConst { value }))(rest),
			6 => map(be_f64, |value| ConstantInfo::Double(DoubleConst { value }))(rest),
			7 => map(be_cp, |name| ConstantInfo::Class(ClassConst { name }))(rest),
			8 => map(be_cp, |string| ConstantInfo::String(StringConst { string }))(rest),
			9 => map(pair(be_cp, be_cp), |(class, name_and_type)| {
				ConstantInfo::Field(FieldConst {
					class,
					name_and_type,
				})
			})(rest),
			10 => map(pair(be_cp, be_cp), |(class, name_and_type)| {
				ConstantInfo::Method(MethodConst {
					class,
					name_and_type,
				})
			})(rest),
			11 => map(pair(be_cp, be_cp), |(class, name_and_type)| {
				ConstantInfo::Interface(InterfaceConst {
					class,
					name_and_type,
				})
			})(rest),
			12 => map(pair(be_cp, be_cp), |(name, descriptor)| {
				ConstantInfo::NameAndType(NameAndTypeConst { name, descriptor })
			})(rest),
			15 => {
				let (rest, (kind, reference)) = pair(be_u8, be_cp)(rest)?;
				let reference_kind = ReferenceKind::from_u8(kind).ok_or_else(|| {
					fault(
						input,
						ReaderError::MalformedConstantPool {
							index,
							problem: PoolProblem::InvalidReferenceKind(kind),
						},
					)
				})?;
				Ok((
					rest,
					ConstantInfo::MethodHandle(MethodHandleConst {
						reference_kind,
						reference,
					}),
				))
			}
			16 => map(be_cp, |descriptor| {
				ConstantInfo::MethodType(MethodTypeConst { descriptor })
			})(rest),
			17 => map(pair(be_u16, be_cp), |(bootstrap_method_attr_index, name_and_type)| {
				ConstantInfo::Dynamic(DynamicConst {
					bootstrap_method_attr_index,
					name_and_type,
				})
			})(rest),
			18 => map(pair(be_u16, be_cp), |(bootstrap_method_attr_index, name_and_type)| {
				ConstantInfo::InvokeDynamic(InvokeDynamicConst {
					bootstrap_method_attr_index,
					name_and_type,
				})
			})(rest),
			19 => map(be_cp, |name| ConstantInfo::Module(ModuleConst { name }))(rest),
			20 => map(be_cp, |name| ConstantInfo::Package(PackageConst { name }))(rest),
			tag => Err(fault(
				input,
				ReaderError::MalformedConstantPool {
					index,
					problem: PoolProblem::UnknownTag(tag),
				},
			)),
		}
	}

	/// The tag byte this entry was read from, 0 for the placeholder.
	pub fn tag(&self) -> u8 {
		match self {
			ConstantInfo::UTF8(_) => 1,
			ConstantInfo::Integer(_) => 3,
			ConstantInfo::Float(_) => 4,
			ConstantInfo::Long(_) => 5,
			ConstantInfo::Double(_) => 6,
			ConstantInfo::Class(_) => 7,
			ConstantInfo::String(_) => 8,
			ConstantInfo::Field(_) => 9,
			ConstantInfo::Method(_) => 10,
			ConstantInfo::Interface(_) => 11,
			ConstantInfo::NameAndType(_) => 12,
			ConstantInfo::MethodHandle(_) => 15,
			ConstantInfo::MethodType(_) => 16,
			ConstantInfo::Dynamic(_) => 17,
			ConstantInfo::InvokeDynamic(_) => 18,
			ConstantInfo::Module(_) => 19,
			ConstantInfo::Package(_) => 20,
			ConstantInfo::Unusable => 0,
		}
	}

	pub fn kind(&self) -> &'static str {
		use crate::Constant as C;
		match self {
			ConstantInfo::Class(_) => <ClassConst as C>::KIND,
			ConstantInfo::Field(_) => <FieldConst as C>::KIND,
			ConstantInfo::Method(_) => <MethodConst as C>::KIND,
			ConstantInfo::Interface(_) => <InterfaceConst as C>::KIND,
			ConstantInfo::String(_) => <StringConst as C>::KIND,
			ConstantInfo::Integer(_) => <IntegerConst as C>::KIND,
			ConstantInfo::Float(_) => <FloatConst as C>::KIND,
			ConstantInfo::Long(_) => <LongConst as C>::KIND,
			ConstantInfo::Double(_) => <DoubleConst as C>::KIND,
			ConstantInfo::NameAndType(_) => <NameAndTypeConst as C>::KIND,
			ConstantInfo::UTF8(_) => <UTF8Const as C>::KIND,
			ConstantInfo::MethodHandle(_) => <MethodHandleConst as C>::KIND,
			ConstantInfo::MethodType(_) => <MethodTypeConst as C>::KIND,
			ConstantInfo::Dynamic(_) => <DynamicConst as C>::KIND,
			ConstantInfo::InvokeDynamic(_) => <InvokeDynamicConst as C>::KIND,
			ConstantInfo::Module(_) => <ModuleConst as C>::KIND,
			ConstantInfo::Package(_) => <PackageConst as C>::KIND,
			ConstantInfo::Unusable => "unusable slot",
		}
	}

	/// Human readable rendering, resolving every reference through `cp`.
	pub fn render(&self, cp: &ConstantPool) -> Result<String, ReaderError> {
		Ok(match self {
			ConstantInfo::Class(v) => v.java_name(cp)?,
			ConstantInfo::Field(v) => render_member(v, cp, false)?,
			ConstantInfo::Method(v) => render_member(v, cp, true)?,
			ConstantInfo::Interface(v) => render_member(v, cp, true)?,
			ConstantInfo::String(v) => format!("{:?}", v.value(cp)?),
			ConstantInfo::Integer(v) => v.value.to_string(),
			ConstantInfo::Float(v) => format!("{}f", v.value),
			ConstantInfo::Long(v) => format!("{}L", v.value),
			ConstantInfo::Double(v) => format!("{}d", v.value),
			ConstantInfo::NameAndType(v) => format!("{} {}", v.name(cp)?, v.descriptor(cp)?),
			ConstantInfo::UTF8(v) => v.to_string(),
			ConstantInfo::MethodHandle(v) => {
				let member = v.member(cp)?;
				format!(
					"{} {}.{}",
					v.reference_kind.name(),
					jclass_core::java_name(member.class_name(cp)?),
					member.name(cp)?
				)
			}
			ConstantInfo::MethodType(v) => v.descriptor(cp)?.to_string(),
			ConstantInfo::Dynamic(v) => format!("#{}:{}", v.bootstrap_method_attr_index, v.name(cp)?),
			ConstantInfo::InvokeDynamic(v) => {
				format!("#{}:{}", v.bootstrap_method_attr_index, v.name(cp)?)
			}
			ConstantInfo::Module(v) => v.name(cp)?.to_string(),
			ConstantInfo::Package(v) => jclass_core::java_name(v.name(cp)?),
			ConstantInfo::Unusable => String::new(),
		})
	}
}

fn render_member(member: &dyn MemberRef, cp: &ConstantPool, method: bool) -> Result<String, ReaderError> {
	let class = jclass_core::java_name(member.class_name(cp)?);
	let name = member.name(cp)?;
	if !method {
		return Ok(format!("{class}.{name}"));
	}

	let descriptor = member.descriptor(cp)?;
	let parameters = match MethodDescriptor::parse(descriptor) {
		Some(desc) => desc.java_parameters(),
		None => descriptor.to_string(),
	};
	Ok(format!("{class}.{name}{parameters}"))
}

fn decode_mutf8(data: &[u8]) -> Option<String> {
	let data = mutf8::mutf8_to_utf8(data).ok()?;
	String::from_utf8(data.to_vec()).ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn pool(count: u16, entries: &[u8]) -> ConstantPool {
		let mut data = count.to_be_bytes().to_vec();
		data.extend_from_slice(entries);
		let (rest, pool) = ConstantPool::parse(&data).map_err(|_| "parse failed").unwrap();
		assert!(rest.is_empty());
		pool
	}

	#[test]
	fn forward_references_resolve_lazily() {
		// #1 Class -> #2, #2 Utf8 "Foo"
		let cp = pool(3, &[7, 0, 2, 1, 0, 3, b'F', b'o', b'o']);
		assert_eq!(cp.class_name(ConstPtr::new(1)).unwrap(), "Foo");
		assert_eq!(cp.raw_get(1).unwrap().render(&cp).unwrap(), "Foo");
	}

	#[test]
	fn long_takes_two_slots() {
		// #1 Long, #2 placeholder, #3 Integer
		let cp = pool(4, &[5, 0, 0, 0, 0, 0, 0, 0, 7, 3, 0, 0, 0, 9]);
		assert_eq!(cp.len(), 3);
		assert_eq!(cp.get(ConstPtr::<LongConst>::new(1)).unwrap().value, 7);
		assert_eq!(
			cp.raw_get(2),
			Err(ReaderError::MalformedConstantPool {
				index: 2,
				problem: PoolProblem::Unusable
			})
		);
		assert_eq!(cp.get(ConstPtr::<IntegerConst>::new(3)).unwrap().value, 9);
		assert_eq!(cp.iter().map(|(i, _)| i).collect::<Vec<_>>(), vec![1, 3]);
	}

	#[test]
	fn bad_indices() {
		let cp = pool(2, &[3, 0, 0, 0, 1]);
		assert!(matches!(
			cp.raw_get(0),
			Err(ReaderError::MalformedConstantPool {
				problem: PoolProblem::Absent,
				..
			})
		));
		assert!(matches!(
			cp.raw_get(2),
			Err(ReaderError::MalformedConstantPool {
				problem: PoolProblem::OutOfRange { slots: 1 },
				..
			})
		));
		assert!(matches!(
			cp.utf8(ConstPtr::new(1)),
			Err(ReaderError::MalformedConstantPool {
				index: 1,
				problem: PoolProblem::WrongKind {
					expected: "Utf8",
					found: "Integer"
				}
			})
		));
		assert_eq!(cp.get_optional(ConstPtr::<ClassConst>::new(0)), Ok(None));
	}

	#[test]
	fn unknown_tag_fails() {
		let data = [0, 2, 2, 0, 0];
		let err = ConstantPool::parse(&data).err().unwrap();
		let nom::Err::Failure(err) = err else {
			panic!("expected a failure");
		};
		assert_eq!(
			err.into_reader_error(&data),
			ReaderError::MalformedConstantPool {
				index: 1,
				problem: PoolProblem::UnknownTag(2)
			}
		);
	}

	#[test]
	fn method_handle_member() {
		// #1 MethodHandle invokeStatic -> #2, #2 Methodref #3.#5, #3 Class #4, #4 "A", #5 NaT #6:#7, #6 "m", #7 "()V"
		let cp = pool(
			8,
			&[
				15, 6, 0, 2, 10, 0, 3, 0, 5, 7, 0, 4, 1, 0, 1, b'A', 12, 0, 6, 0, 7, 1, 0, 1, b'm', 1, 0, 3, b'(',
				b')', b'V',
			],
		);
		let handle = cp.get(ConstPtr::<MethodHandleConst>::new(1)).unwrap();
		assert_eq!(handle.reference_kind, ReferenceKind::InvokeStatic);
		assert_eq!(handle.member(&cp).unwrap().name(&cp).unwrap(), "m");
		assert_eq!(cp.raw_get(1).unwrap().render(&cp).unwrap(), "REF_invokeStatic A.m");
		assert_eq!(cp.raw_get(2).unwrap().render(&cp).unwrap(), "A.m()");
	}

	#[test]
	fn modified_utf8_null() {
		let cp = pool(2, &[1, 0, 3, b'a', 0xc0, 0x80]);
		assert_eq!(cp.utf8(ConstPtr::new(1)).unwrap(), "a\0");
	}
}
