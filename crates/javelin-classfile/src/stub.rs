use crate::access::{ACC_ANNOTATION, ACC_BRIDGE, ACC_ENUM, ACC_INTERFACE, ACC_SYNTHETIC};
use crate::classfile::{ClassFile, InnerClassInfo};
use crate::descriptor::{
    parse_field_descriptor, parse_method_descriptor, FieldType, MethodDescriptor,
};
use crate::error::Result;

/// Resolution-relevant view of one class.
///
/// Descriptors are parsed eagerly since a bad descriptor means a broken class
/// file. Generic signatures are kept as text and parsed per member on demand so
/// one unparseable signature only affects the member that carries it.
#[derive(Debug, Clone)]
pub struct ClassStub {
    pub internal_name: String,
    pub access_flags: u16,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub signature: Option<String>,
    pub inner_classes: Vec<InnerClassInfo>,
    pub fields: Vec<FieldStub>,
    pub methods: Vec<MethodStub>,
}

#[derive(Debug, Clone)]
pub struct FieldStub {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: FieldType,
    pub signature: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MethodStub {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: MethodDescriptor,
    pub signature: Option<String>,
    pub exceptions: Vec<String>,
}

impl ClassStub {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        ClassStub::from_classfile(&ClassFile::parse(bytes)?)
    }

    pub fn from_classfile(class: &ClassFile) -> Result<Self> {
        let fields = class
            .fields
            .iter()
            .map(|field| {
                Ok(FieldStub {
                    access_flags: field.access_flags,
                    name: field.name.clone(),
                    descriptor: parse_field_descriptor(&field.descriptor)?,
                    signature: field.signature.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let methods = class
            .methods
            .iter()
            .map(|method| {
                Ok(MethodStub {
                    access_flags: method.access_flags,
                    name: method.name.clone(),
                    descriptor: parse_method_descriptor(&method.descriptor)?,
                    signature: method.signature.clone(),
                    exceptions: method.exceptions.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ClassStub {
            internal_name: class.this_class.clone(),
            access_flags: class.access_flags,
            super_class: class.super_class.clone(),
            interfaces: class.interfaces.clone(),
            signature: class.signature.clone(),
            inner_classes: class.inner_classes.clone(),
            fields,
            methods,
        })
    }

    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.access_flags & (ACC_INTERFACE | ACC_ANNOTATION) != 0
    }

    #[must_use]
    pub fn is_enum(&self) -> bool {
        self.access_flags & ACC_ENUM != 0
    }

    /// Dotted source name; nested classes use `.` when the `InnerClasses`
    /// table names them (`java.util.Map.Entry`).
    #[must_use]
    pub fn source_name(&self) -> String {
        let mut name = self.internal_name.clone();
        let mut current = self.internal_name.as_str();
        let mut suffix = String::new();
        while let Some(info) = self.member_inner_class(current) {
            let (Some(outer), Some(inner_name)) = (&info.outer_class, &info.inner_name) else {
                break;
            };
            suffix = format!(".{inner_name}{suffix}");
            name = format!("{outer}{suffix}");
            current = outer;
        }
        name.replace('/', ".")
    }

    /// Entry describing `internal_name` as a member class of another class.
    #[must_use]
    pub fn member_inner_class(&self, internal_name: &str) -> Option<&InnerClassInfo> {
        self.inner_classes
            .iter()
            .find(|info| info.inner_class == internal_name && info.outer_class.is_some())
    }
}

impl FieldStub {
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.access_flags & ACC_SYNTHETIC != 0
    }
}

impl MethodStub {
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }

    #[must_use]
    pub fn is_class_initializer(&self) -> bool {
        self.name == "<clinit>"
    }

    /// Compiler-generated members that are invisible at the source level.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.access_flags & (ACC_SYNTHETIC | ACC_BRIDGE) != 0
    }
}
