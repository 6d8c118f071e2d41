use std::collections::HashMap;
use std::sync::Arc;

use javelin_ast::{Modifiers, ParseTypeRefError, TypeRef};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeclarationParseError {
    #[error("expected {expected} at offset {offset} in `{text}`")]
    Expected {
        expected: &'static str,
        offset: usize,
        text: String,
    },
    #[error("constructor `{found}` does not match class `{class}`")]
    ConstructorName { class: String, found: String },
    #[error(transparent)]
    Type(#[from] ParseTypeRefError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeKind {
    Class,
    Interface,
    Enum,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeTypeParameter {
    pub name: String,
    pub bounds: Vec<TypeRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeParameter {
    pub name: String,
    pub ty: TypeRef,
    pub varargs: bool,
}

/// A method or constructor; constructors are named `<init>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeMethod {
    pub name: String,
    pub modifiers: Modifiers,
    pub type_params: Vec<RuntimeTypeParameter>,
    pub params: Vec<RuntimeParameter>,
    /// `Void` for constructors.
    pub return_type: TypeRef,
    pub throws: Vec<TypeRef>,
}

impl RuntimeMethod {
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeField {
    pub name: String,
    pub modifiers: Modifiers,
    pub ty: TypeRef,
}

const CONSTRUCTOR: &str = "<init>";

/// A class as the host runtime describes it, written as Java declarations:
///
/// ```
/// # use javelin_resolve::RuntimeClass;
/// let list = RuntimeClass::declare("public interface java.util.List<E> extends Collection<E>")?
///     .member("E get(int index)")?
///     .member("static <E> List<E> of(E... elements)")?;
/// assert_eq!(list.name(), "java.util.List");
/// # Ok::<(), javelin_resolve::DeclarationParseError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeClass {
    name: String,
    kind: RuntimeKind,
    modifiers: Modifiers,
    type_params: Vec<RuntimeTypeParameter>,
    superclass: Option<TypeRef>,
    interfaces: Vec<TypeRef>,
    fields: Vec<RuntimeField>,
    methods: Vec<RuntimeMethod>,
}

impl RuntimeClass {
    /// Parses a header such as `public final class a.b.C<T> extends D implements E, F`.
    pub fn declare(header: &str) -> Result<Self, DeclarationParseError> {
        let mut cursor = Cursor::new(header);
        let modifiers = cursor.modifiers();
        let kind = match cursor.word() {
            Some("class") => RuntimeKind::Class,
            Some("interface") => RuntimeKind::Interface,
            Some("enum") => RuntimeKind::Enum,
            _ => return Err(cursor.expected("`class`, `interface` or `enum`")),
        };
        let name = cursor.dotted_name()?;
        let type_params = cursor.type_params()?;

        let mut superclass = None;
        let mut interfaces = Vec::new();
        loop {
            match cursor.peek_word() {
                Some("extends") if kind == RuntimeKind::Interface => {
                    cursor.word();
                    interfaces.extend(cursor.type_list()?);
                }
                Some("extends") => {
                    cursor.word();
                    superclass = Some(cursor.ty()?);
                }
                Some("implements") => {
                    cursor.word();
                    interfaces.extend(cursor.type_list()?);
                }
                _ => break,
            }
        }
        cursor.finish()?;

        Ok(RuntimeClass {
            name,
            kind,
            modifiers,
            type_params,
            superclass,
            interfaces,
            fields: Vec::new(),
            methods: Vec::new(),
        })
    }

    /// Adds a field, method or constructor written as its Java declaration.
    pub fn member(mut self, text: &str) -> Result<Self, DeclarationParseError> {
        let mut cursor = Cursor::new(text);
        let modifiers = cursor.modifiers();
        let type_params = cursor.type_params()?;
        let first = cursor.ty()?;

        if cursor.peek_char('(') {
            let found = first.to_string();
            if found != self.simple_name() {
                return Err(DeclarationParseError::ConstructorName {
                    class: self.name.clone(),
                    found,
                });
            }
            let params = cursor.params()?;
            let throws = cursor.throws()?;
            cursor.finish()?;
            self.methods.push(RuntimeMethod {
                name: CONSTRUCTOR.to_string(),
                modifiers,
                type_params,
                params,
                return_type: TypeRef::Void,
                throws,
            });
            return Ok(self);
        }

        let name = cursor.ident()?;
        if cursor.peek_char('(') {
            let params = cursor.params()?;
            let throws = cursor.throws()?;
            cursor.finish()?;
            self.methods.push(RuntimeMethod {
                name,
                modifiers,
                type_params,
                params,
                return_type: first,
                throws,
            });
        } else {
            cursor.finish()?;
            self.fields.push(RuntimeField {
                name,
                modifiers,
                ty: first,
            });
        }
        Ok(self)
    }

    /// Header plus members in one call.
    pub fn parse(header: &str, members: &[&str]) -> Result<Self, DeclarationParseError> {
        members
            .iter()
            .try_fold(Self::declare(header)?, |class, member| class.member(member))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    #[must_use]
    pub fn kind(&self) -> RuntimeKind {
        self.kind
    }

    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    #[must_use]
    pub fn type_params(&self) -> &[RuntimeTypeParameter] {
        &self.type_params
    }

    #[must_use]
    pub fn superclass(&self) -> Option<&TypeRef> {
        self.superclass.as_ref()
    }

    #[must_use]
    pub fn interfaces(&self) -> &[TypeRef] {
        &self.interfaces
    }

    #[must_use]
    pub fn fields(&self) -> &[RuntimeField] {
        &self.fields
    }

    /// Methods and constructors in declaration order.
    #[must_use]
    pub fn methods(&self) -> &[RuntimeMethod] {
        &self.methods
    }

    /// Rewrites simple class names to the qualified names in `index`.
    fn qualify(&mut self, index: &HashMap<String, String>) {
        let class_scope: Vec<String> = self.type_params.iter().map(|p| p.name.clone()).collect();
        for param in &mut self.type_params {
            for bound in &mut param.bounds {
                qualify_type(bound, &class_scope, index);
            }
        }
        if let Some(superclass) = &mut self.superclass {
            qualify_type(superclass, &class_scope, index);
        }
        for iface in &mut self.interfaces {
            qualify_type(iface, &class_scope, index);
        }
        for field in &mut self.fields {
            qualify_type(&mut field.ty, &class_scope, index);
        }
        for method in &mut self.methods {
            let mut scope = class_scope.clone();
            scope.extend(method.type_params.iter().map(|p| p.name.clone()));
            for param in &mut method.type_params {
                for bound in &mut param.bounds {
                    qualify_type(bound, &scope, index);
                }
            }
            for param in &mut method.params {
                qualify_type(&mut param.ty, &scope, index);
            }
            qualify_type(&mut method.return_type, &scope, index);
            for thrown in &mut method.throws {
                qualify_type(thrown, &scope, index);
            }
        }
    }
}

fn qualify_type(ty: &mut TypeRef, scope: &[String], index: &HashMap<String, String>) {
    match ty {
        TypeRef::Primitive(_) | TypeRef::Void => {}
        TypeRef::Array(component) => qualify_type(component, scope, index),
        TypeRef::Wildcard(javelin_ast::WildcardRef::Unbounded) => {}
        TypeRef::Wildcard(
            javelin_ast::WildcardRef::Extends(bound) | javelin_ast::WildcardRef::Super(bound),
        ) => qualify_type(bound, scope, index),
        TypeRef::Class(class) => {
            for segment in &mut class.segments {
                for arg in segment.type_args.iter_mut().flatten() {
                    qualify_type(arg, scope, index);
                }
            }
            if class.segments.len() != 1 || scope.contains(&class.segments[0].name) {
                return;
            }
            let Some(qualified) = index.get(&class.segments[0].name) else {
                return;
            };
            let TypeRef::Class(mut replacement) = TypeRef::named(qualified) else {
                return;
            };
            let args = class.segments[0].type_args.take();
            if let Some(last) = replacement.segments.last_mut() {
                last.type_args = args;
            }
            *class = replacement;
        }
    }
}

/// Every class the host runtime exposes, by qualified name.
#[derive(Debug, Clone, Default)]
pub struct RuntimeRegistry {
    classes: HashMap<String, Arc<RuntimeClass>>,
}

impl RuntimeRegistry {
    /// Simple names used in member declarations are qualified against the
    /// classes of the registry itself.
    #[must_use]
    pub fn from_classes(classes: impl IntoIterator<Item = RuntimeClass>) -> Self {
        let mut classes: Vec<RuntimeClass> = classes.into_iter().collect();
        let index: HashMap<String, String> = classes
            .iter()
            .map(|class| (class.simple_name().to_string(), class.name.clone()))
            .collect();
        for class in &mut classes {
            class.qualify(&index);
        }
        RuntimeRegistry {
            classes: classes
                .into_iter()
                .map(|class| (class.name.clone(), Arc::new(class)))
                .collect(),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<RuntimeClass>> {
        self.classes.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Cursor { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn expected(&self, expected: &'static str) -> DeclarationParseError {
        DeclarationParseError::Expected {
            expected,
            offset: self.pos,
            text: self.text.to_string(),
        }
    }

    fn peek_word(&mut self) -> Option<&'a str> {
        self.skip_ws();
        let rest = self.rest();
        let mut chars = rest.char_indices();
        let (_, first) = chars.next()?;
        if !(unicode_ident::is_xid_start(first) || first == '_' || first == '$') {
            return None;
        }
        let end = chars
            .find(|&(_, ch)| !(unicode_ident::is_xid_continue(ch) || ch == '$'))
            .map_or(rest.len(), |(idx, _)| idx);
        Some(&rest[..end])
    }

    fn word(&mut self) -> Option<&'a str> {
        let word = self.peek_word()?;
        self.pos += word.len();
        Some(word)
    }

    fn ident(&mut self) -> Result<String, DeclarationParseError> {
        self.word()
            .map(str::to_string)
            .ok_or_else(|| self.expected("an identifier"))
    }

    fn dotted_name(&mut self) -> Result<String, DeclarationParseError> {
        let mut name = self.ident()?;
        while self.eat('.') {
            name.push('.');
            name.push_str(&self.ident()?);
        }
        Ok(name)
    }

    fn peek_char(&mut self, ch: char) -> bool {
        self.skip_ws();
        self.rest().starts_with(ch)
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek_char(ch) {
            self.pos += ch.len_utf8();
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, ch: char, expected: &'static str) -> Result<(), DeclarationParseError> {
        if self.eat(ch) {
            Ok(())
        } else {
            Err(self.expected(expected))
        }
    }

    fn finish(&mut self) -> Result<(), DeclarationParseError> {
        self.eat(';');
        self.skip_ws();
        if self.rest().is_empty() {
            Ok(())
        } else {
            Err(self.expected("end of declaration"))
        }
    }

    fn modifiers(&mut self) -> Modifiers {
        let mut modifiers = Modifiers::NONE;
        loop {
            let flag = match self.peek_word() {
                Some("public") => Modifiers::PUBLIC,
                Some("protected") => Modifiers::PROTECTED,
                Some("private") => Modifiers::PRIVATE,
                Some("static") => Modifiers::STATIC,
                Some("final") => Modifiers::FINAL,
                Some("abstract") => Modifiers::ABSTRACT,
                Some("default") => Modifiers::DEFAULT,
                Some("native" | "synchronized" | "transient" | "volatile" | "strictfp") => {
                    Modifiers::NONE
                }
                _ => return modifiers,
            };
            self.word();
            modifiers = modifiers | flag;
        }
    }

    fn ty(&mut self) -> Result<TypeRef, DeclarationParseError> {
        self.skip_ws();
        let rest = self.rest();
        let (ty, after) = TypeRef::parse_prefix(rest)?;
        self.pos += rest.len() - after.len();
        Ok(ty)
    }

    fn type_list(&mut self) -> Result<Vec<TypeRef>, DeclarationParseError> {
        let mut types = vec![self.ty()?];
        while self.eat(',') {
            types.push(self.ty()?);
        }
        Ok(types)
    }

    fn type_params(&mut self) -> Result<Vec<RuntimeTypeParameter>, DeclarationParseError> {
        let mut params = Vec::new();
        if !self.eat('<') {
            return Ok(params);
        }
        loop {
            let name = self.ident()?;
            let mut bounds = Vec::new();
            if self.peek_word() == Some("extends") {
                self.word();
                bounds.push(self.ty()?);
                while self.eat('&') {
                    bounds.push(self.ty()?);
                }
            }
            params.push(RuntimeTypeParameter { name, bounds });
            if self.eat('>') {
                return Ok(params);
            }
            self.expect(',', "`,` or `>`")?;
        }
    }

    fn params(&mut self) -> Result<Vec<RuntimeParameter>, DeclarationParseError> {
        self.expect('(', "`(`")?;
        let mut params = Vec::new();
        if self.eat(')') {
            return Ok(params);
        }
        loop {
            self.modifiers();
            let mut ty = self.ty()?;
            let varargs = self.eat_str("...");
            if varargs {
                ty = TypeRef::array_of(ty);
            }
            let name = self.ident()?;
            params.push(RuntimeParameter { name, ty, varargs });
            if self.eat(')') {
                return Ok(params);
            }
            self.expect(',', "`,` or `)`")?;
        }
    }

    fn throws(&mut self) -> Result<Vec<TypeRef>, DeclarationParseError> {
        if self.peek_word() != Some("throws") {
            return Ok(Vec::new());
        }
        self.word();
        self.type_list()
    }
}
