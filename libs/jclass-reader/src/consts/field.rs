use crate::consts::class::ClassConst;
use crate::consts::name_and_type::NameAndTypeConst;
use crate::consts::{ConstPtr, MemberRef};
use crate::impl_constant;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct FieldConst {
	pub class: ConstPtr<ClassConst>,
	pub name_and_type: ConstPtr<NameAndTypeConst>,
}

impl MemberRef for FieldConst {
	fn class(&self) -> ConstPtr<ClassConst> {
		self.class
	}

	fn name_and_type(&self) -> ConstPtr<NameAndTypeConst> {
		self.name_and_type
	}
}

impl_constant!(Field FieldConst, "Fieldref");
