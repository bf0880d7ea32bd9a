//! Walk a parsed file and collect the structs marked for generation.

use tracing::debug;

use crate::syntax::{FieldDecl, SourceFile, TypeExpr, TypeSpec};

use super::marker::has_directive;
use super::type_params::TypeParams;
use super::types::render_type;

/// A struct selected for generation, with everything the templates need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructRecord {
    pub name: String,
    pub package_name: String,
    /// Exported fields in declaration order
    pub fields: Vec<FieldRecord>,
    pub type_params: TypeParams,
}

impl StructRecord {
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    /// Fields that get a nil check.
    pub fn pointer_fields(&self) -> impl Iterator<Item = &FieldRecord> {
        self.fields.iter().filter(|f| f.is_pointer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRecord {
    pub name: String,
    /// Rendered type with one leading `*` removed when `is_pointer` is set
    pub ty: String,
    pub is_pointer: bool,
}

impl FieldRecord {
    /// The field's type as declared.
    pub fn declared_type(&self) -> String {
        if self.is_pointer {
            format!("*{}", self.ty)
        } else {
            self.ty.clone()
        }
    }
}

/// Go's export rule: the identifier starts with an upper-case letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Collect every struct type whose enclosing `type` declaration carries
/// `directive` in its doc comment, in source order.
///
/// Aliases and non-struct types are ignored even when marked. Unexported and
/// embedded fields are left out of the field list.
pub fn extract_structs(file: &SourceFile, directive: &str) -> Vec<StructRecord> {
    let mut records = Vec::new();
    for decl in &file.type_decls {
        if !has_directive(decl.doc.as_ref(), directive) {
            continue;
        }
        for spec in &decl.specs {
            if let Some(record) = struct_record(&file.package, spec) {
                debug!(
                    name = %record.name,
                    fields = record.fields.len(),
                    generic = record.is_generic(),
                    "selected struct"
                );
                records.push(record);
            }
        }
    }
    records
}

fn struct_record(package: &str, spec: &TypeSpec) -> Option<StructRecord> {
    if spec.alias {
        return None;
    }
    let TypeExpr::Struct(body) = &spec.ty else {
        return None;
    };
    Some(StructRecord {
        name: spec.name.clone(),
        package_name: package.to_string(),
        fields: body.fields.iter().flat_map(field_records).collect(),
        type_params: TypeParams::from_groups(&spec.type_params),
    })
}

fn field_records(field: &FieldDecl) -> Vec<FieldRecord> {
    let (is_pointer, target) = match &field.ty {
        TypeExpr::Pointer(inner) => (true, inner.as_ref()),
        other => (false, other),
    };
    let ty = render_type(target);
    field
        .names
        .iter()
        .filter(|name| is_exported(name))
        .map(|name| FieldRecord {
            name: name.clone(),
            ty: ty.clone(),
            is_pointer,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::generator::marker::DEFAULT_DIRECTIVE;
    use crate::syntax::parse_file;

    fn extract(src: &str) -> Vec<StructRecord> {
        let file = parse_file("test.go", src).unwrap();
        extract_structs(&file, DEFAULT_DIRECTIVE)
    }

    fn field(name: &str, ty: &str, is_pointer: bool) -> FieldRecord {
        FieldRecord {
            name: name.to_string(),
            ty: ty.to_string(),
            is_pointer,
        }
    }

    #[test]
    fn test_only_marked_structs_are_selected() {
        let records = extract(
            r#"package svc

//go:generate validation-gen
type Service struct {
	Client *Client
	Timeout int
}

// Helper is not marked.
type Helper struct {
	Name string
}
"#,
        );
        assert_eq!(records.len(), 1);
        let service = &records[0];
        assert_eq!(service.name, "Service");
        assert_eq!(service.package_name, "svc");
        assert!(!service.is_generic());
        assert_eq!(
            service.fields,
            vec![field("Client", "Client", true), field("Timeout", "int", false)]
        );
    }

    #[test]
    fn test_unexported_and_embedded_fields_are_skipped() {
        let records = extract(
            r#"package svc

//go:generate validation-gen
type Service struct {
	sync.Mutex
	*Base
	cache map[string]int
	Name, alias string
	Logger *log.Logger
}
"#,
        );
        let names: Vec<&str> = records[0].fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Name", "Logger"]);
        assert_eq!(records[0].fields[1], field("Logger", "log.Logger", true));
    }

    #[test]
    fn test_only_one_pointer_level_is_stripped() {
        let records = extract(
            "package p\n\n//go:generate x\ntype S struct {\n\tPP **Conn\n\tList []*Item\n}\n",
        );
        assert_eq!(records[0].fields[0], field("PP", "*Conn", true));
        assert_eq!(records[0].fields[0].declared_type(), "**Conn");
        assert_eq!(records[0].fields[1], field("List", "[]*Item", false));
        assert_eq!(records[0].pointer_fields().count(), 1);
    }

    #[test]
    fn test_generic_struct_params() {
        let records = extract(
            r#"package p

//go:generate validation-gen
type Cache[K comparable, V any] struct {
	Store KeyValueStore[K, V]
	Fallback *V
}
"#,
        );
        let cache = &records[0];
        assert!(cache.is_generic());
        assert_eq!(cache.type_params.declaration(), "[K comparable, V any]");
        assert_eq!(cache.type_params.use_site(), "[K, V]");
        assert_eq!(cache.fields[0], field("Store", "KeyValueStore[K, V]", false));
        assert_eq!(cache.fields[1], field("Fallback", "V", true));
    }

    #[test]
    fn test_marked_non_structs_and_aliases_are_ignored() {
        let records = extract(
            r#"package p

//go:generate validation-gen
type ID string

//go:generate validation-gen
type Alias = struct{ A *int }

//go:generate validation-gen
type Handler interface {
	Handle() error
}
"#,
        );
        assert!(records.is_empty());
    }

    #[test]
    fn test_marker_on_group_applies_to_every_type() {
        let records = extract(
            r#"package p

//go:generate validation-gen
type (
	A struct{ X *int }
	B struct{ Y string }
)
"#,
        );
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_struct_without_exported_fields_still_selected() {
        let records = extract("package p\n\n//go:generate x\ntype Empty struct{}\n");
        assert_eq!(records.len(), 1);
        assert!(records[0].fields.is_empty());
    }

    #[test]
    fn test_is_exported() {
        assert!(is_exported("Name"));
        assert!(is_exported("Ünicode"));
        assert!(!is_exported("name"));
        assert!(!is_exported("_Name"));
        assert!(!is_exported(""));
    }
}
