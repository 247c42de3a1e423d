use jclass_core::{ClassAccessFlags, FieldAccessFlags, InnerClassAccessFlags, MethodAccessFlags};
use jclass_reader::{AttributeInfo, ClassInfo, PoolProblem, ReaderError};

use crate::ClassBuilder;

const DEPRECATED: &str = "Ljava/lang/Deprecated;";

#[test]
fn names_and_declaration() {
	let mut builder = ClassBuilder::new("com/example/Widget");
	builder
		.access((ClassAccessFlags::PUBLIC | ClassAccessFlags::FINAL | ClassAccessFlags::SUPER).bits())
		.super_class(Some("com/example/Base"))
		.interface("java/io/Serializable")
		.interface("java/lang/Comparable");
	let source = builder.source_file("Widget.java");
	builder.attribute(source);
	let class = builder.parse();

	assert_eq!(class.java_name().unwrap(), "com.example.Widget");
	assert_eq!(class.package_name().unwrap(), "com.example");
	assert_eq!(class.simple_name().unwrap(), "Widget");
	assert_eq!(class.super_class_name().unwrap(), Some("com/example/Base"));
	assert_eq!(
		class.interface_names().unwrap(),
		["java/io/Serializable", "java/lang/Comparable"]
	);
	assert!(class.interface("java/lang/Comparable").is_some());
	assert!(class.interface("java/lang/Runnable").is_none());
	assert_eq!(class.source_file().unwrap(), Some("Widget.java"));
	assert_eq!(
		class.declaration().unwrap(),
		"public final class com.example.Widget extends com.example.Base implements java.io.Serializable, java.lang.Comparable"
	);
}

#[test]
fn interface_declaration() {
	let mut builder = ClassBuilder::new("a/Shape");
	builder
		.access((ClassAccessFlags::PUBLIC | ClassAccessFlags::INTERFACE | ClassAccessFlags::ABSTRACT).bits())
		.interface("a/Drawable");
	let class = builder.parse();
	assert!(class.is_interface() && class.is_abstract());
	assert_eq!(class.declaration().unwrap(), "public interface a.Shape extends a.Drawable");
}

#[test]
fn method_signatures() {
	let mut builder = ClassBuilder::new("a/Tool");
	builder.default_constructor();
	let init = builder.code(0, 3, &[0xb1], &[], vec![]);
	builder.method(MethodAccessFlags::PUBLIC.bits(), "<init>", "(ILjava/lang/String;)V", vec![init]);
	let clinit = builder.code(0, 0, &[0xb1], &[], vec![]);
	builder.method(MethodAccessFlags::STATIC.bits(), "<clinit>", "()V", vec![clinit]);
	let main = builder.code(0, 1, &[0xb1], &[], vec![]);
	let throws = builder.exceptions(&["java/io/IOException"]);
	builder.method(
		(MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC).bits(),
		"main",
		"([Ljava/lang/String;)V",
		vec![main, throws],
	);
	builder.method(
		(MethodAccessFlags::PROTECTED | MethodAccessFlags::ABSTRACT).bits(),
		"size",
		"()J",
		vec![],
	);
	let class = builder.parse();
	let cp = &class.constant_pool;

	let init = class.find_method("<init>", "(ILjava/lang/String;)V").unwrap();
	assert!(init.is_constructor(cp));
	assert_eq!(init.signature(&class).unwrap(), "Tool(int, java.lang.String)");
	assert_eq!(init.declaration(&class).unwrap(), "public Tool(int, java.lang.String)");

	let clinit = class.find_method("<clinit>", "()V").unwrap();
	assert!(clinit.is_static_initializer(cp));
	assert_eq!(clinit.signature(&class).unwrap(), "static {}");

	let main = class.method_by_signature("main(java.lang.String[])").unwrap();
	assert_eq!(main.exceptions(cp).unwrap(), ["java/io/IOException"]);
	assert_eq!(main.return_type(cp).unwrap(), "void");
	assert_eq!(main.full_name(&class).unwrap(), "a.Tool.main");
	assert_eq!(
		main.declaration(&class).unwrap(),
		"public static void main(java.lang.String[]) throws java.io.IOException"
	);

	let size = class.get_method(|m| m.is_abstract()).unwrap();
	assert!(size.code().is_none());
	assert!(size.is_protected() && !size.is_package());
	assert_eq!(size.declaration(&class).unwrap(), "protected abstract long size()");
}

#[test]
fn field_queries() {
	let mut builder = ClassBuilder::new("a/Holder");
	let synthetic = builder.marker("Synthetic");
	builder.field(FieldAccessFlags::PRIVATE.bits(), "this$0", "La/Outer;", vec![synthetic]);
	let signature = builder.signature("Ljava/util/List<Ljava/lang/String;>;");
	builder.field(
		(FieldAccessFlags::VOLATILE | FieldAccessFlags::TRANSIENT).bits(),
		"items",
		"Ljava/util/List;",
		vec![signature],
	);
	let class = builder.parse();
	let cp = &class.constant_pool;

	let outer = class.find_field("this$0").unwrap();
	assert!(outer.is_synthetic() && outer.is_private() && !outer.is_generic());
	assert_eq!(outer.full_name(&class).unwrap(), "a.Holder.this$0");

	let items = class.get_field(|f| f.is_volatile()).unwrap();
	assert!(items.is_transient() && items.is_package() && items.is_generic());
	assert_eq!(items.generic_signature(cp).unwrap(), Some("Ljava/util/List<Ljava/lang/String;>;"));
	assert_eq!(items.field_type(cp).unwrap().unwrap().java_name(), "java.util.List");
	assert_eq!(items.declaration(cp).unwrap(), "volatile transient java.util.List items");
}

#[test]
fn inner_class_kinds() {
	let member_flags = (InnerClassAccessFlags::PUBLIC | InnerClassAccessFlags::STATIC).bits();

	let mut member = ClassBuilder::new("a/Outer$Inner");
	let table = member.inner_classes(&[("a/Outer$Inner", Some("a/Outer"), Some("Inner"), member_flags)]);
	member.attribute(table);
	let member = member.parse();
	assert!(member.is_inner_class() && member.is_member_class());
	assert!(!member.is_local_class() && !member.is_anonymous_class());

	let mut anonymous = ClassBuilder::new("a/Outer$1");
	let table = anonymous.inner_classes(&[("a/Outer$1", None, None, 0)]);
	let enclosing = anonymous.enclosing_method("a/Outer", Some(("run", "()V")));
	anonymous.attribute(table).attribute(enclosing);
	let anonymous = anonymous.parse();
	assert!(anonymous.is_inner_class() && anonymous.is_anonymous_class());
	assert!(!anonymous.is_member_class() && !anonymous.is_local_class());
	assert!(anonymous.enclosing_method().is_some());

	let mut local = ClassBuilder::new("a/Outer$1Local");
	let table = local.inner_classes(&[("a/Outer$1Local", None, Some("Local"), 0)]);
	let enclosing = local.enclosing_method("a/Outer", None);
	local.attribute(table).attribute(enclosing);
	let local = local.parse();
	assert!(local.is_local_class());
	assert!(!local.is_member_class() && !local.is_anonymous_class());

	// An InnerClasses table listing only other classes says nothing about this one.
	let mut outer = ClassBuilder::new("a/Outer");
	let table = outer.inner_classes(&[("a/Outer$Inner", Some("a/Outer"), Some("Inner"), member_flags)]);
	outer.attribute(table);
	let outer = outer.parse();
	assert!(!outer.is_inner_class());
	assert_eq!(outer.inner_classes().len(), 1);
}

#[test]
fn deprecation() {
	let mut builder = ClassBuilder::new("a/Old");
	let marker = builder.marker("Deprecated");
	builder.attribute(marker);
	let annotated = builder.annotations(true, &[DEPRECATED]);
	builder.field(0, "annotated", "I", vec![annotated]);
	let marker = builder.marker("Deprecated");
	let other = builder.annotations(false, &["Ljava/lang/SuppressWarnings;"]);
	builder.method(0, "both", "()V", vec![marker, other]);
	let other = builder.annotations(true, &["Ljava/lang/Override;"]);
	builder.method(0, "plain", "()V", vec![other]);
	let class = builder.parse();
	let cp = &class.constant_pool;

	assert!(class.is_deprecated());
	assert!(class.find_field("annotated").unwrap().is_deprecated(cp));
	assert!(class.find_method("both", "()V").unwrap().is_deprecated(cp));
	assert!(!class.find_method("plain", "()V").unwrap().is_deprecated(cp));
}

#[test]
fn custom_attribute_kept() {
	let mut builder = ClassBuilder::new("a/B");
	let vendor = builder.attr("com.vendor.Extra", &[1, 2, 3, 4, 5]);
	let synthetic = builder.marker("Synthetic");
	builder.attribute(vendor).attribute(synthetic);
	let class = builder.parse();

	assert!(class.is_synthetic());
	match &class.attributes[0] {
		AttributeInfo::Custom { name, info } => {
			assert_eq!(class.constant_pool.utf8(*name).unwrap(), "com.vendor.Extra");
			assert_eq!(info, &[1, 2, 3, 4, 5]);
		}
		other => panic!("expected a custom attribute, got {other:?}"),
	}
	assert_eq!(class.attributes[0].name(&class.constant_pool).unwrap(), "com.vendor.Extra");
}

#[test]
fn attribute_length_mismatch() {
	let mut builder = ClassBuilder::new("a/B");
	// SourceFile is two bytes, this one declares three.
	let name = builder.utf8("B.java");
	let [hi, lo] = name.to_be_bytes();
	let broken = builder.attr("SourceFile", &[hi, lo, 0]);
	builder.attribute(broken);
	let error = ClassInfo::parse_complete(&builder.build()).unwrap_err();
	assert!(matches!(error, ReaderError::MalformedStructure { .. }), "{error:?}");
}

#[test]
fn dangling_reference() {
	let mut builder = ClassBuilder::new("a/B");
	builder.this_class_index(200);
	let class = builder.parse();
	assert!(matches!(
		class.class_name(),
		Err(ReaderError::MalformedConstantPool {
			index: 200,
			problem: PoolProblem::OutOfRange { .. }
		})
	));
}

#[test]
fn unknown_constant_tag() {
	let mut builder = ClassBuilder::new("a/B");
	builder.raw_entry(&[2, 0, 0]);
	assert!(matches!(
		ClassInfo::parse_complete(&builder.build()),
		Err(ReaderError::MalformedConstantPool {
			problem: PoolProblem::UnknownTag(2),
			..
		})
	));
}
