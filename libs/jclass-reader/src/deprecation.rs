use crate::attribute::{Annotation, AttributeInfo};
use crate::consts::ConstantPool;
use crate::visitor::{walk_attribute, Visitor};

/// Raises a flag on the first `Deprecated` attribute or `@Deprecated` annotation it is shown.
/// The flag never goes back down.
#[derive(Clone, Debug, Default)]
pub struct DeprecationDetector {
	deprecated: bool,
}

impl DeprecationDetector {
	pub fn new() -> DeprecationDetector {
		DeprecationDetector::default()
	}

	pub fn is_deprecated(&self) -> bool {
		self.deprecated
	}

	/// Checks the attributes that belong to one node. Code and the attributes of record
	/// components describe other things and are not looked at.
	pub fn inspect(attributes: &[AttributeInfo], cp: &ConstantPool) -> bool {
		let mut detector = DeprecationDetector::new();
		for attribute in attributes {
			if matches!(
				attribute,
				AttributeInfo::Deprecated
					| AttributeInfo::RuntimeVisibleAnnotations { .. }
					| AttributeInfo::RuntimeInvisibleAnnotations { .. }
			) {
				walk_attribute(&mut detector, attribute, cp);
			}
		}
		detector.is_deprecated()
	}
}

impl Visitor for DeprecationDetector {
	fn visit_deprecated(&mut self, _: &ConstantPool) {
		self.deprecated = true;
	}

	fn visit_annotation(&mut self, annotation: &Annotation, cp: &ConstantPool) {
		self.deprecated |= annotation.is_deprecation(cp);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{ConstPtr, ConstantInfo, UTF8Const};

	fn pool() -> ConstantPool {
		ConstantPool::new(vec![
			ConstantInfo::UTF8(UTF8Const("Ljava/lang/Deprecated;".to_string())),
			ConstantInfo::UTF8(UTF8Const("Ljava/lang/Override;".to_string())),
		])
	}

	fn annotation(index: u16) -> Annotation {
		Annotation {
			type_index: ConstPtr::new(index),
			pairs: vec![],
		}
	}

	#[test]
	fn attribute_marks() {
		assert!(DeprecationDetector::inspect(&[AttributeInfo::Deprecated], &pool()));
		assert!(!DeprecationDetector::inspect(&[AttributeInfo::Synthetic], &pool()));
	}

	#[test]
	fn annotation_marks() {
		let attributes = [AttributeInfo::RuntimeVisibleAnnotations {
			annotations: vec![annotation(1)],
		}];
		assert!(DeprecationDetector::inspect(&attributes, &pool()));
	}

	#[test]
	fn sticky() {
		let cp = pool();
		let mut detector = DeprecationDetector::new();
		detector.visit_annotation(&annotation(1), &cp);
		detector.visit_annotation(&annotation(2), &cp);
		assert!(detector.is_deprecated());

		let attributes = [
			AttributeInfo::Deprecated,
			AttributeInfo::RuntimeInvisibleAnnotations {
				annotations: vec![annotation(2)],
			},
		];
		assert!(DeprecationDetector::inspect(&attributes, &cp));
	}

	#[test]
	fn other_annotations() {
		let attributes = [AttributeInfo::RuntimeVisibleAnnotations {
			annotations: vec![annotation(2)],
		}];
		assert!(!DeprecationDetector::inspect(&attributes, &pool()));
	}
}
