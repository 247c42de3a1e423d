use bitflags::bitflags;

bitflags! {
	#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
	pub struct ClassAccessFlags: u16 {
		const PUBLIC = 0x0001;
		const FINAL = 0x0010;
		const SUPER = 0x0020;
		const INTERFACE = 0x0200;
		const ABSTRACT = 0x0400;
		const SYNTHETIC = 0x1000;
		const ANNOTATION = 0x2000;
		const ENUM = 0x4000;
		const MODULE = 0x8000;
	}
}

bitflags! {
	#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
	pub struct FieldAccessFlags: u16 {
		const PUBLIC = 0x0001;
		const PRIVATE = 0x0002;
		const PROTECTED = 0x0004;
		const STATIC = 0x0008;
		const FINAL = 0x0010;
		const VOLATILE = 0x0040;
		const TRANSIENT = 0x0080;
		const SYNTHETIC = 0x1000;
		const ENUM = 0x4000;
	}
}

bitflags! {
	#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
	pub struct MethodAccessFlags: u16 {
		const PUBLIC = 0x0001;
		const PRIVATE = 0x0002;
		const PROTECTED = 0x0004;
		const STATIC = 0x0008;
		const FINAL = 0x0010;
		const SYNCHRONIZED = 0x0020;
		const BRIDGE = 0x0040;
		const VARARGS = 0x0080;
		const NATIVE = 0x0100;
		const ABSTRACT = 0x0400;
		const STRICT = 0x0800;
		const SYNTHETIC = 0x1000;
	}
}

bitflags! {
	#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
	pub struct InnerClassAccessFlags: u16 {
		const PUBLIC = 0x0001;
		const PRIVATE = 0x0002;
		const PROTECTED = 0x0004;
		const STATIC = 0x0008;
		const FINAL = 0x0010;
		const INTERFACE = 0x0200;
		const ABSTRACT = 0x0400;
		const SYNTHETIC = 0x1000;
		const ANNOTATION = 0x2000;
		const ENUM = 0x4000;
	}
}

bitflags! {
	#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
	pub struct ModuleFlags: u16 {
		const OPEN = 0x0020;
		const SYNTHETIC = 0x1000;
		const MANDATED = 0x8000;
	}
}

bitflags! {
	#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
	pub struct RequiresFlags: u16 {
		const TRANSITIVE = 0x0020;
		const STATIC_PHASE = 0x0040;
		const SYNTHETIC = 0x1000;
		const MANDATED = 0x8000;
	}
}

bitflags! {
	/// Shared by `exports` and `opens` entries.
	#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
	pub struct ExportsFlags: u16 {
		const SYNTHETIC = 0x1000;
		const MANDATED = 0x8000;
	}
}

bitflags! {
	#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
	pub struct ParameterFlags: u16 {
		const FINAL = 0x0010;
		const SYNTHETIC = 0x1000;
		const MANDATED = 0x8000;
	}
}

macro_rules! visibility {
	($($FLAGS:ident),*) => {
		$(
		impl $FLAGS {
			/// Java source keyword for the visibility, empty for package-private.
			pub fn visibility(self) -> &'static str {
				if self.contains(Self::PUBLIC) {
					"public"
				} else if self.contains(Self::PROTECTED) {
					"protected"
				} else if self.contains(Self::PRIVATE) {
					"private"
				} else {
					""
				}
			}

			pub fn is_package(self) -> bool {
				!self.intersects(Self::PUBLIC | Self::PROTECTED | Self::PRIVATE)
			}
		}
		)*
	};
}

visibility!(FieldAccessFlags, MethodAccessFlags, InnerClassAccessFlags);

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unknown_bits_are_kept() {
		let flags = ClassAccessFlags::from_bits_retain(0x0021 | 0x0100);
		assert!(flags.contains(ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER));
		assert_eq!(flags.bits(), 0x0121);
	}

	#[test]
	fn visibility() {
		assert_eq!(MethodAccessFlags::PROTECTED.visibility(), "protected");
		assert!(FieldAccessFlags::STATIC.is_package());
		assert!(!InnerClassAccessFlags::PRIVATE.is_package());
	}
}
