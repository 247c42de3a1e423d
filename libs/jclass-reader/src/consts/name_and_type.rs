use crate::consts::utf_8::UTF8Const;
use crate::consts::ConstPtr;
use crate::{impl_constant, ConstantPool, ReaderError};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NameAndTypeConst {
	pub name: ConstPtr<UTF8Const>,
	pub descriptor: ConstPtr<UTF8Const>,
}

impl NameAndTypeConst {
	pub fn name<'a>(&self, cp: &'a ConstantPool) -> Result<&'a str, ReaderError> {
		cp.utf8(self.name)
	}

	pub fn descriptor<'a>(&self, cp: &'a ConstantPool) -> Result<&'a str, ReaderError> {
		cp.utf8(self.descriptor)
	}
}

impl_constant!(NameAndType NameAndTypeConst, "NameAndType");
