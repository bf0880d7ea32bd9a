use askama::Template;

use super::extract::StructRecord;

/// Template data for one generated `_gen.go` file.
///
/// Renders the header, package clause and `errors` import once, then a
/// `<Name>Params` struct, `New<Name>` constructor and `isValid<Name>Params`
/// validator per struct.
#[derive(Template)]
#[template(path = "params.go.txt", escape = "none")]
pub struct ParamsFileTemplate<'a> {
    /// Name written into the "Code generated by" header
    pub tool_name: &'a str,
    pub package_name: &'a str,
    pub structs: &'a [StructRecord],
}

/// Render the unformatted Go source for `structs`.
pub fn render_file(
    tool_name: &str,
    package_name: &str,
    structs: &[StructRecord],
) -> Result<String, askama::Error> {
    ParamsFileTemplate {
        tool_name,
        package_name,
        structs,
    }
    .render()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::generator::extract::FieldRecord;
    use crate::generator::type_params::{TypeParam, TypeParams};

    fn record(name: &str, fields: Vec<FieldRecord>, params: TypeParams) -> StructRecord {
        StructRecord {
            name: name.to_string(),
            package_name: "svc".to_string(),
            fields,
            type_params: params,
        }
    }

    fn field(name: &str, ty: &str, is_pointer: bool) -> FieldRecord {
        FieldRecord {
            name: name.to_string(),
            ty: ty.to_string(),
            is_pointer,
        }
    }

    #[test]
    fn test_header_and_import_appear_once() {
        let structs = vec![
            record("A", vec![field("X", "int", true)], TypeParams::default()),
            record("B", vec![field("Y", "int", true)], TypeParams::default()),
        ];
        let out = render_file("validation-gen", "svc", &structs).unwrap();
        assert!(out.starts_with("// Code generated by validation-gen; DO NOT EDIT.\n"));
        assert_eq!(out.matches("package svc").count(), 1);
        assert_eq!(out.matches("\"errors\"").count(), 1);
        assert!(out.contains("type AParams struct"));
        assert!(out.contains("type BParams struct"));
    }

    #[test]
    fn test_constructor_and_validator() {
        let structs = vec![record(
            "Service",
            vec![field("Client", "Client", true), field("Timeout", "int", false)],
            TypeParams::default(),
        )];
        let out = render_file("validation-gen", "svc", &structs).unwrap();
        assert!(out.contains("\tClient *Client\n"));
        assert!(out.contains("\tTimeout int\n"));
        assert!(out.contains("func NewService(params ServiceParams) (*Service, error) {"));
        assert!(out.contains("if err := isValidServiceParams(params); err != nil {"));
        assert!(out.contains("return &Service{"));
        assert!(out.contains("\t\tClient: params.Client,\n"));
        assert!(out.contains("func isValidServiceParams(params ServiceParams) error {"));
        assert!(out.contains("if params.Client == nil {"));
        assert!(out.contains("errors.New(\"Client is required\")"));
        assert!(!out.contains("params.Timeout == nil"));
        assert!(out.contains("return errors.Join(errs...)"));
    }

    #[test]
    fn test_generic_brackets() {
        let params = TypeParams::new(vec![
            TypeParam::new("K", "comparable"),
            TypeParam::new("V", "any"),
        ]);
        let structs = vec![record(
            "Cache",
            vec![field("Store", "KeyValueStore[K, V]", false)],
            params,
        )];
        let out = render_file("validation-gen", "svc", &structs).unwrap();
        assert!(out.contains("type CacheParams[K comparable, V any] struct {"));
        assert!(out.contains(
            "func NewCache[K comparable, V any](params CacheParams[K, V]) (*Cache[K, V], error) {"
        ));
        assert!(out.contains("isValidCacheParams[K, V](params)"));
        assert!(out.contains("return &Cache[K, V]{"));
        assert!(out.contains(
            "func isValidCacheParams[K comparable, V any](params CacheParams[K, V]) error {"
        ));
    }
}
