use num_derive::FromPrimitive;

use crate::consts::class::ClassConst;
use crate::consts::name_and_type::NameAndTypeConst;
use crate::consts::utf_8::UTF8Const;
use crate::consts::{ConstPtr, ConstantInfo, MemberRef};
use crate::{impl_constant, ConstantPool, PoolProblem, ReaderError};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct MethodConst {
	pub class: ConstPtr<ClassConst>,
	pub name_and_type: ConstPtr<NameAndTypeConst>,
}

impl MemberRef for MethodConst {
	fn class(&self) -> ConstPtr<ClassConst> {
		self.class
	}

	fn name_and_type(&self) -> ConstPtr<NameAndTypeConst> {
		self.name_and_type
	}
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, FromPrimitive)]
pub enum ReferenceKind {
	GetField = 1,
	GetStatic = 2,
	PutField = 3,
	PutStatic = 4,
	InvokeVirtual = 5,
	InvokeStatic = 6,
	InvokeSpecial = 7,
	NewInvokeSpecial = 8,
	InvokeInterface = 9,
}

impl ReferenceKind {
	pub fn name(&self) -> &'static str {
		match self {
			ReferenceKind::GetField => "REF_getField",
			ReferenceKind::GetStatic => "REF_getStatic",
			ReferenceKind::PutField => "REF_putField",
			ReferenceKind::PutStatic => "REF_putStatic",
			ReferenceKind::InvokeVirtual => "REF_invokeVirtual",
			ReferenceKind::InvokeStatic => "REF_invokeStatic",
			ReferenceKind::InvokeSpecial => "REF_invokeSpecial",
			ReferenceKind::NewInvokeSpecial => "REF_newInvokeSpecial",
			ReferenceKind::InvokeInterface => "REF_invokeInterface",
		}
	}
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct MethodHandleConst {
	pub reference_kind: ReferenceKind,
	pub reference: ConstPtr<ConstantInfo>,
}

impl MethodHandleConst {
	/// The field or method the handle points at.
	pub fn member<'a>(&self, cp: &'a ConstantPool) -> Result<&'a dyn MemberRef, ReaderError> {
		match cp.raw_get(self.reference.index())? {
			ConstantInfo::Field(v) => Ok(v),
			ConstantInfo::Method(v) => Ok(v),
			ConstantInfo::Interface(v) => Ok(v),
			other => Err(ReaderError::MalformedConstantPool {
				index: self.reference.index(),
				problem: PoolProblem::WrongKind {
					expected: "member reference",
					found: other.kind(),
				},
			}),
		}
	}
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct MethodTypeConst {
	pub descriptor: ConstPtr<UTF8Const>,
}

impl MethodTypeConst {
	pub fn descriptor<'a>(&self, cp: &'a ConstantPool) -> Result<&'a str, ReaderError> {
		cp.utf8(self.descriptor)
	}
}

impl_constant!(Method MethodConst, "Methodref");
impl_constant!(MethodHandle MethodHandleConst, "MethodHandle");
impl_constant!(MethodType MethodTypeConst, "MethodType");
