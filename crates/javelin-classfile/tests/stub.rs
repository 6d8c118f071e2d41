use javelin_classfile::{
    ClassStub, ClassWriter, Error, FieldType, InnerClassInfo, MemberSpec, ReturnType,
    ACC_ABSTRACT, ACC_BRIDGE, ACC_INTERFACE, ACC_PUBLIC, ACC_STATIC, ACC_SYNTHETIC, ACC_VARARGS,
};
use pretty_assertions::assert_eq;

#[test]
fn stub_keeps_members_flags_and_raw_signatures() {
    let bytes = ClassWriter::new(ACC_PUBLIC, "com/example/Box")
        .signature("<T:Ljava/lang/Object;>Ljava/lang/Object;")
        .field(MemberSpec::new(ACC_PUBLIC, "value", "Ljava/lang/Object;").with_signature("TT;"))
        .method(
            MemberSpec::new(ACC_PUBLIC | ACC_VARARGS, "<init>", "([Ljava/lang/Object;)V")
                .with_signature("([TT;)V")
                .with_exceptions(&["java/io/IOException"]),
        )
        .method(MemberSpec::new(ACC_PUBLIC | ACC_STATIC, "size", "()I"))
        .method(MemberSpec::new(ACC_SYNTHETIC | ACC_BRIDGE, "access$000", "()V"))
        .to_bytes();

    let stub = ClassStub::parse(&bytes).unwrap();
    assert_eq!(stub.internal_name, "com/example/Box");
    assert_eq!(stub.super_class.as_deref(), Some("java/lang/Object"));
    assert_eq!(stub.source_name(), "com.example.Box");
    assert!(!stub.is_interface());

    assert_eq!(stub.fields[0].name, "value");
    assert_eq!(stub.fields[0].signature.as_deref(), Some("TT;"));
    assert_eq!(
        stub.fields[0].descriptor,
        FieldType::Object("java/lang/Object".to_string())
    );

    let ctor = &stub.methods[0];
    assert!(ctor.is_constructor());
    assert_eq!(ctor.exceptions, vec!["java/io/IOException".to_string()]);
    assert_eq!(ctor.descriptor.return_type, ReturnType::Void);

    assert_eq!(stub.methods[1].name, "size");
    assert!(!stub.methods[1].is_hidden());
    assert!(stub.methods[2].is_hidden());
}

#[test]
fn nested_classes_get_dotted_source_names() {
    let bytes = ClassWriter::new(ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT, "java/util/Map$Entry")
        .inner_class(InnerClassInfo {
            inner_class: "java/util/Map$Entry".to_string(),
            outer_class: Some("java/util/Map".to_string()),
            inner_name: Some("Entry".to_string()),
            access_flags: ACC_PUBLIC | ACC_STATIC | ACC_INTERFACE | ACC_ABSTRACT,
        })
        .to_bytes();

    let stub = ClassStub::parse(&bytes).unwrap();
    assert!(stub.is_interface());
    assert_eq!(stub.source_name(), "java.util.Map.Entry");
}

#[test]
fn broken_input_is_reported() {
    assert_eq!(
        ClassStub::parse(&[0, 1, 2, 3]).unwrap_err(),
        Error::InvalidMagic(0x00010203)
    );

    let mut bytes = ClassWriter::new(ACC_PUBLIC, "A").to_bytes();
    bytes.truncate(bytes.len() - 3);
    assert_eq!(ClassStub::parse(&bytes).unwrap_err(), Error::UnexpectedEof);

    let bad_descriptor = ClassWriter::new(ACC_PUBLIC, "B")
        .field(MemberSpec::new(ACC_PUBLIC, "x", "Q"))
        .to_bytes();
    assert_eq!(
        ClassStub::parse(&bad_descriptor).unwrap_err(),
        Error::InvalidDescriptor("Q".to_string())
    );
}
