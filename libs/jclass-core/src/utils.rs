pub const fn align_size(bytes: usize, byte_alignment: usize) -> usize {
	let remainder = bytes % byte_alignment;
	if remainder == 0 {
		bytes // Already aligned
	} else {
		bytes + byte_alignment - remainder
	}
}

/// Turns an internal binary name (`java/lang/String`) into its source form (`java.lang.String`).
pub fn java_name(internal: &str) -> String {
	internal.replace('/', ".")
}

/// Everything before the last `/` of an internal name, or `""` for the unnamed package.
pub fn package_of(internal: &str) -> &str {
	match internal.rfind('/') {
		Some(end) => &internal[..end],
		None => "",
	}
}

/// The last segment of an internal name, nested classes included (`Outer$Inner`).
pub fn simple_name_of(internal: &str) -> &str {
	match internal.rfind('/') {
		Some(end) => &internal[end + 1..],
		None => internal,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn alignment() {
		assert_eq!(align_size(0, 4), 0);
		assert_eq!(align_size(1, 4), 4);
		assert_eq!(align_size(4, 4), 4);
		assert_eq!(align_size(7, 4), 8);
	}

	#[test]
	fn names() {
		assert_eq!(java_name("java/lang/String"), "java.lang.String");
		assert_eq!(package_of("java/lang/String"), "java/lang");
		assert_eq!(package_of("Main"), "");
		assert_eq!(simple_name_of("java/util/Map$Entry"), "Map$Entry");
		assert_eq!(simple_name_of("Main"), "Main");
	}
}
