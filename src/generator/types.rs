//! Canonical text for Go type expressions.

use crate::syntax::{ChanDir, FieldDecl, FuncType, StructType, TypeExpr};

/// Render a type expression back to Go source.
///
/// The match is exhaustive over [`TypeExpr`], so every type the parser can
/// produce has a defined rendering. Interfaces collapse to `interface{}`.
pub fn render_type(ty: &TypeExpr) -> String {
    match ty {
        TypeExpr::Ident(name) => name.clone(),
        TypeExpr::Qualified { package, name } => format!("{package}.{name}"),
        TypeExpr::Pointer(target) => format!("*{}", render_type(target)),
        TypeExpr::Slice(elem) => format!("[]{}", render_type(elem)),
        TypeExpr::Array { len, elem } => format!("[{len}]{}", render_type(elem)),
        TypeExpr::Map { key, value } => {
            format!("map[{}]{}", render_type(key), render_type(value))
        }
        TypeExpr::Chan { dir, elem } => match dir {
            ChanDir::Both => format!("chan {}", render_type(elem)),
            ChanDir::Send => format!("chan<- {}", render_type(elem)),
            ChanDir::Recv => format!("<-chan {}", render_type(elem)),
        },
        TypeExpr::Func(func) => render_func(func),
        TypeExpr::Struct(st) => render_struct(st),
        TypeExpr::Interface => "interface{}".to_string(),
        TypeExpr::Generic { base, args } => {
            format!("{}[{}]", render_type(base), render_list(args))
        }
        TypeExpr::Paren(inner) => format!("({})", render_type(inner)),
        TypeExpr::Approx(inner) => format!("~{}", render_type(inner)),
        TypeExpr::Union(terms) => terms
            .iter()
            .map(render_type)
            .collect::<Vec<_>>()
            .join(" | "),
    }
}

fn render_list(types: &[TypeExpr]) -> String {
    types.iter().map(render_type).collect::<Vec<_>>().join(", ")
}

fn render_func(func: &FuncType) -> String {
    let mut params: Vec<String> = func.params.iter().map(render_type).collect();
    if func.variadic {
        if let Some(last) = params.last_mut() {
            last.insert_str(0, "...");
        }
    }
    let mut out = format!("func({})", params.join(", "));
    match func.results.as_slice() {
        [] => {}
        [single] => {
            out.push(' ');
            out.push_str(&render_type(single));
        }
        many => {
            out.push_str(" (");
            out.push_str(&render_list(many));
            out.push(')');
        }
    }
    out
}

// Longest `name type` pair gofmt still prints as `struct{ name type }`.
const ONE_LINE_FIELD_MAX: usize = 30;

// Multi-field struct types get one field per line, as gofmt lays them out.
// Indentation is left to the formatter.
fn render_struct(st: &StructType) -> String {
    match st.fields.as_slice() {
        [] => "struct{}".to_string(),
        [field] if fits_one_line(field) => format!("struct{{ {} }}", render_field(field)),
        fields => {
            let body: String = fields
                .iter()
                .map(|field| format!("{}\n", render_field(field)))
                .collect();
            format!("struct {{\n{body}}}")
        }
    }
}

fn fits_one_line(field: &FieldDecl) -> bool {
    if field.tag.is_some() {
        return false;
    }
    let ty = render_type(&field.ty);
    let names = usize::from(!field.is_embedded());
    !ty.contains('\n') && names + ty.chars().count() <= ONE_LINE_FIELD_MAX
}

fn render_field(field: &FieldDecl) -> String {
    let mut out = if field.is_embedded() {
        render_type(&field.ty)
    } else {
        format!("{} {}", field.names.join(", "), render_type(&field.ty))
    };
    if let Some(tag) = &field.tag {
        out.push(' ');
        out.push_str(tag);
    }
    out
}
