use super::error::ManifestError;
use super::xml::{parse_document, Element};
use std::collections::HashMap;

const NO_ENUMERATION: &[String] = &[];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuiltinType {
    String,
    Token,
    Boolean,
    Int,
    PositiveInteger,
}

impl BuiltinType {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "token" | "normalizedString" => Some(Self::Token),
            "boolean" => Some(Self::Boolean),
            "int" | "integer" => Some(Self::Int),
            "positiveInteger" => Some(Self::PositiveInteger),
            _ => None,
        }
    }

    /// Applies the type's whitespace facet: strings are kept as written, everything else collapses.
    fn normalize(&self, value: &str) -> String {
        match self {
            Self::String => value.to_string(),
            _ => value.split_whitespace().collect::<Vec<_>>().join(" "),
        }
    }

    fn check(&self, value: &str) -> Result<(), String> {
        match self {
            Self::String | Self::Token => Ok(()),
            Self::Boolean => match value {
                "true" | "false" | "1" | "0" => Ok(()),
                _ => Err("expected a boolean (true, false, 1, 0)".to_string()),
            },
            Self::Int => value
                .parse::<i32>()
                .map(|_| ())
                .map_err(|_| "expected a 32-bit integer".to_string()),
            Self::PositiveInteger => match value.parse::<u64>() {
                Ok(n) if n > 0 => Ok(()),
                _ => Err("expected a positive integer".to_string()),
            },
        }
    }
}

#[derive(Debug, Clone)]
struct SimpleType {
    base: BuiltinType,
    enumeration: Vec<String>,
}

#[derive(Debug, Clone)]
struct ComplexType {
    sequence: Vec<ElementDecl>,
}

#[derive(Debug, Clone)]
enum TypeDef {
    Simple(SimpleType),
    Complex(ComplexType),
}

#[derive(Debug, Clone)]
enum TypeRef {
    Builtin(BuiltinType),
    Named(String),
    Inline(Box<TypeDef>),
}

#[derive(Debug, Clone)]
struct ElementDecl {
    name: String,
    type_ref: TypeRef,
    min_occurs: u32,
    /// `None` when unbounded.
    max_occurs: Option<u32>,
}

impl ElementDecl {
    fn allows(&self, count: u32) -> bool {
        self.max_occurs.map_or(true, |max| count < max)
    }

    fn is_repeatable(&self) -> bool {
        self.max_occurs != Some(1)
    }
}

enum ContentModel<'a> {
    Simple(BuiltinType, &'a [String]),
    Complex(&'a ComplexType),
}

impl<'a> From<&'a TypeDef> for ContentModel<'a> {
    fn from(def: &'a TypeDef) -> Self {
        match def {
            TypeDef::Simple(s) => ContentModel::Simple(s.base, &s.enumeration),
            TypeDef::Complex(c) => ContentModel::Complex(c),
        }
    }
}

/// A compiled XML schema restricted to the constructs manifests use: global and local
/// elements with occurrence bounds, sequences, enumerated simple types and a handful
/// of built-in types.
#[derive(Debug, Clone)]
pub struct Schema {
    logical_path: &'static str,
    elements: Vec<ElementDecl>,
    types: HashMap<String, TypeDef>,
}

impl Schema {
    pub fn compile(logical_path: &'static str, source: &str) -> Result<Self, ManifestError> {
        let defect = |message: String| ManifestError::Schema {
            schema: logical_path,
            message,
        };

        let root = parse_document(source).map_err(defect)?;
        if root.name != "schema" {
            return Err(defect(format!(
                "root element must be <schema>, found <{}>",
                root.name
            )));
        }

        let mut elements = Vec::new();
        let mut types = HashMap::new();
        for child in &root.children {
            match child.name.as_str() {
                "element" => elements.push(compile_element(child).map_err(defect)?),
                "complexType" | "simpleType" => {
                    let name = child
                        .attr("name")
                        .ok_or_else(|| defect(format!("global <{}> without a name", child.name)))?;
                    let def = compile_type(child).map_err(defect)?;
                    if types.insert(name.to_string(), def).is_some() {
                        return Err(defect(format!("type '{}' is defined twice", name)));
                    }
                }
                "annotation" => {}
                other => return Err(defect(format!("unsupported construct <{}>", other))),
            }
        }

        let schema = Self {
            logical_path,
            elements,
            types,
        };
        schema.check_references().map_err(defect)?;
        Ok(schema)
    }

    pub fn logical_path(&self) -> &'static str {
        self.logical_path
    }

    pub fn root_elements(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|e| e.name.as_str())
    }

    /// Values allowed by the named enumerated simple type.
    pub fn enumeration(&self, type_name: &str) -> Option<&[String]> {
        match self.types.get(type_name)? {
            TypeDef::Simple(s) => Some(&s.enumeration),
            TypeDef::Complex(_) => None,
        }
    }

    pub(crate) fn violation(&self, message: impl Into<String>) -> ManifestError {
        ManifestError::Validation {
            schema: self.logical_path,
            message: message.into(),
        }
    }

    pub(crate) fn validate(&self, document: &Element) -> Result<(), ManifestError> {
        let decl = self
            .elements
            .iter()
            .find(|d| d.name == document.name)
            .ok_or_else(|| {
                self.violation(format!(
                    "root element <{}> is not declared; expected one of: {}",
                    document.name,
                    self.root_elements().collect::<Vec<_>>().join(", ")
                ))
            })?;
        self.validate_element(document, decl, &format!("/{}", document.name))
    }

    fn validate_element(
        &self,
        element: &Element,
        decl: &ElementDecl,
        path: &str,
    ) -> Result<(), ManifestError> {
        for (key, _) in &element.attributes {
            let allowed = key == "xmlns" || key.starts_with("xmlns:") || key.starts_with("xsi:");
            if !allowed {
                return Err(self.violation(format!(
                    "attribute '{}' is not allowed on {}",
                    key, path
                )));
            }
        }

        match self.content_model(&decl.type_ref)? {
            ContentModel::Simple(base, enumeration) => {
                self.validate_simple(element, base, enumeration, path)
            }
            ContentModel::Complex(complex) => self.validate_complex(element, complex, path),
        }
    }

    fn validate_simple(
        &self,
        element: &Element,
        base: BuiltinType,
        enumeration: &[String],
        path: &str,
    ) -> Result<(), ManifestError> {
        if let Some(child) = element.children.first() {
            return Err(self.violation(format!(
                "element <{}> is not allowed in {}: simple content expected",
                child.name, path
            )));
        }

        let value = base.normalize(&element.text);
        base.check(&value)
            .map_err(|msg| self.violation(format!("invalid value '{}' in {}: {}", value, path, msg)))?;

        if !enumeration.is_empty() && !enumeration.contains(&value) {
            return Err(self.violation(format!(
                "value '{}' in {} is not one of: {}",
                value,
                path,
                enumeration.join(", ")
            )));
        }
        Ok(())
    }

    fn validate_complex(
        &self,
        element: &Element,
        complex: &ComplexType,
        path: &str,
    ) -> Result<(), ManifestError> {
        if element.has_text() {
            return Err(self.violation(format!(
                "character content is not allowed in {}",
                path
            )));
        }

        let children = &element.children;
        let mut idx = 0;
        for particle in &complex.sequence {
            let mut count = 0;
            while idx < children.len() && children[idx].name == particle.name && particle.allows(count)
            {
                let child_path = if particle.is_repeatable() {
                    format!("{}/{}[{}]", path, particle.name, count + 1)
                } else {
                    format!("{}/{}", path, particle.name)
                };
                self.validate_element(&children[idx], particle, &child_path)?;
                idx += 1;
                count += 1;
            }

            if count < particle.min_occurs {
                let message = match children.get(idx) {
                    Some(found) => format!(
                        "unexpected element <{}> in {}; expected <{}>",
                        found.name, path, particle.name
                    ),
                    None => format!(
                        "missing required element <{}> in {}",
                        particle.name, path
                    ),
                };
                return Err(self.violation(message));
            }
        }

        if let Some(extra) = children.get(idx) {
            return Err(self.violation(format!(
                "unexpected element <{}> in {}",
                extra.name, path
            )));
        }
        Ok(())
    }

    fn content_model<'a>(&'a self, type_ref: &'a TypeRef) -> Result<ContentModel<'a>, ManifestError> {
        match type_ref {
            TypeRef::Builtin(base) => Ok(ContentModel::Simple(*base, NO_ENUMERATION)),
            TypeRef::Named(name) => self
                .types
                .get(name)
                .map(ContentModel::from)
                .ok_or_else(|| ManifestError::Schema {
                    schema: self.logical_path,
                    message: format!("type '{}' is not defined", name),
                }),
            TypeRef::Inline(def) => Ok(ContentModel::from(def.as_ref())),
        }
    }

    fn check_references(&self) -> Result<(), String> {
        let mut pending: Vec<&ElementDecl> = self.elements.iter().collect();
        for def in self.types.values() {
            if let TypeDef::Complex(c) = def {
                pending.extend(c.sequence.iter());
            }
        }

        while let Some(decl) = pending.pop() {
            match &decl.type_ref {
                TypeRef::Named(name) if !self.types.contains_key(name) => {
                    return Err(format!(
                        "element '{}' refers to undefined type '{}'",
                        decl.name, name
                    ));
                }
                TypeRef::Inline(def) => {
                    if let TypeDef::Complex(c) = def.as_ref() {
                        pending.extend(c.sequence.iter());
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn compile_element(el: &Element) -> Result<ElementDecl, String> {
    let name = el
        .attr("name")
        .ok_or_else(|| "<element> without a name (ref is not supported)".to_string())?
        .to_string();

    let min_occurs: u32 = match el.attr("minOccurs") {
        Some(v) => v
            .parse()
            .map_err(|_| format!("element '{}': invalid minOccurs '{}'", name, v))?,
        None => 1,
    };
    let max_occurs: Option<u32> = match el.attr("maxOccurs") {
        Some("unbounded") => None,
        Some(v) => Some(
            v.parse()
                .map_err(|_| format!("element '{}': invalid maxOccurs '{}'", name, v))?,
        ),
        None => Some(1),
    };
    if let Some(max) = max_occurs {
        if max < min_occurs {
            return Err(format!(
                "element '{}': maxOccurs {} is below minOccurs {}",
                name, max, min_occurs
            ));
        }
    }

    let type_ref = match el.attr("type") {
        Some(type_name) => resolve_type_name(type_name)?,
        None => {
            let inline = el
                .children
                .iter()
                .find(|c| c.name == "complexType" || c.name == "simpleType")
                .ok_or_else(|| format!("element '{}' has no type", name))?;
            TypeRef::Inline(Box::new(compile_type(inline)?))
        }
    };

    Ok(ElementDecl {
        name,
        type_ref,
        min_occurs,
        max_occurs,
    })
}

fn resolve_type_name(qualified: &str) -> Result<TypeRef, String> {
    match qualified.split_once(':') {
        Some(("xs" | "xsd", local)) => BuiltinType::from_name(local)
            .map(TypeRef::Builtin)
            .ok_or_else(|| format!("unsupported built-in type '{}'", qualified)),
        Some((_, local)) => Ok(TypeRef::Named(local.to_string())),
        None => Ok(TypeRef::Named(qualified.to_string())),
    }
}

fn compile_type(el: &Element) -> Result<TypeDef, String> {
    match el.name.as_str() {
        "complexType" => compile_complex(el).map(TypeDef::Complex),
        "simpleType" => compile_simple(el).map(TypeDef::Simple),
        other => Err(format!("<{}> is not a type definition", other)),
    }
}

fn compile_complex(el: &Element) -> Result<ComplexType, String> {
    let mut sequence = None;
    for child in &el.children {
        match child.name.as_str() {
            "sequence" if sequence.is_none() => {
                let decls = child
                    .children
                    .iter()
                    .filter(|c| c.name != "annotation")
                    .map(|c| match c.name.as_str() {
                        "element" => compile_element(c),
                        other => Err(format!("unsupported particle <{}> in sequence", other)),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                sequence = Some(decls);
            }
            "sequence" => return Err("complexType with more than one sequence".to_string()),
            "annotation" => {}
            other => return Err(format!("unsupported construct <{}> in complexType", other)),
        }
    }
    Ok(ComplexType {
        sequence: sequence.unwrap_or_default(),
    })
}

fn compile_simple(el: &Element) -> Result<SimpleType, String> {
    let restriction = el
        .child("restriction")
        .ok_or_else(|| "simpleType must be defined by <restriction>".to_string())?;
    let base = match restriction.attr("base").map(resolve_type_name) {
        Some(Ok(TypeRef::Builtin(base))) => base,
        _ => return Err("restriction base must be a supported built-in type".to_string()),
    };

    let mut enumeration = Vec::new();
    for facet in &restriction.children {
        match facet.name.as_str() {
            "enumeration" => {
                let value = facet
                    .attr("value")
                    .ok_or_else(|| "<enumeration> without a value".to_string())?;
                enumeration.push(base.normalize(value));
            }
            "annotation" => {}
            other => return Err(format!("unsupported facet <{}>", other)),
        }
    }

    Ok(SimpleType { base, enumeration })
}
