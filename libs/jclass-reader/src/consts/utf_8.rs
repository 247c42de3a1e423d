use std::fmt::{Display, Formatter};
use std::ops::Deref;

use crate::impl_constant;

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct UTF8Const(pub String);

impl UTF8Const {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Deref for UTF8Const {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl Display for UTF8Const {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

impl_constant!(UTF8 UTF8Const, "Utf8");
