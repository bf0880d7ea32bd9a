use crate::syntax::TypeParamGroup;

use super::types::render_type;

/// One type parameter of a generic struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    pub name: String,
    /// Rendered constraint, e.g. `any` or `~int | ~float64`
    pub constraint: String,
}

impl TypeParam {
    pub fn new(name: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: constraint.into(),
        }
    }
}

/// Ordered type parameters of a struct.
///
/// Both bracketed forms the generated code needs come from this one list, so the
/// declaration `[K comparable, V any]` and the instantiation `[K, V]` can never
/// disagree about names or order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeParams(Vec<TypeParam>);

impl TypeParams {
    pub fn new(params: Vec<TypeParam>) -> Self {
        Self(params)
    }

    /// Flatten grouped declarations: `[K, V any]` becomes `K any`, `V any`.
    pub fn from_groups(groups: &[TypeParamGroup]) -> Self {
        let params = groups
            .iter()
            .flat_map(|group| {
                let constraint = render_type(&group.constraint);
                group
                    .names
                    .iter()
                    .map(move |name| TypeParam::new(name.clone(), constraint.clone()))
            })
            .collect();
        Self(params)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `[T any, K comparable]`, or an empty string for a non-generic struct.
    pub fn declaration(&self) -> String {
        self.bracketed(|p| format!("{} {}", p.name, p.constraint))
    }

    /// `[T, K]`, or an empty string for a non-generic struct.
    pub fn use_site(&self) -> String {
        self.bracketed(|p| p.name.clone())
    }

    fn bracketed(&self, item: impl Fn(&TypeParam) -> String) -> String {
        if self.0.is_empty() {
            return String::new();
        }
        let items: Vec<String> = self.0.iter().map(item).collect();
        format!("[{}]", items.join(", "))
    }
}
