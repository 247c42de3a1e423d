use crate::consts::utf_8::UTF8Const;
use crate::consts::ConstPtr;
use crate::{impl_constant, ConstantPool, ReaderError};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct StringConst {
	pub string: ConstPtr<UTF8Const>,
}

impl StringConst {
	pub fn value<'a>(&self, cp: &'a ConstantPool) -> Result<&'a str, ReaderError> {
		cp.utf8(self.string)
	}
}

impl_constant!(String StringConst, "String");
