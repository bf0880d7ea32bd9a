use super::error::Position;

/// The parts of a Go file the generator cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Name from the `package` clause
    pub package: String,
    /// Every `type` declaration, in source order
    pub type_decls: Vec<TypeDecl>,
}

/// A `type` declaration: either a single spec or a parenthesized group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    /// Doc comment attached to the `type` keyword
    pub doc: Option<CommentBlock>,
    pub specs: Vec<TypeSpec>,
    pub pos: Position,
}

/// Raw comment texts of one comment group, delimiters included.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentBlock {
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub name: String,
    pub type_params: Vec<TypeParamGroup>,
    /// `type A = B`
    pub alias: bool,
    pub ty: TypeExpr,
    pub pos: Position,
}

/// `K, V any` inside a type parameter list: several names sharing a constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParamGroup {
    pub names: Vec<String>,
    pub constraint: TypeExpr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    /// `chan T`
    Both,
    /// `chan<- T`
    Send,
    /// `<-chan T`
    Recv,
}

/// A Go type expression.
///
/// The set is closed: every form the parser accepts has a variant here, so
/// consumers can match exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// `T`
    Ident(String),
    /// `pkg.T`
    Qualified { package: String, name: String },
    /// `*T`
    Pointer(Box<TypeExpr>),
    /// `[]T`
    Slice(Box<TypeExpr>),
    /// `[N]T`, with the length expression kept as written
    Array { len: String, elem: Box<TypeExpr> },
    /// `map[K]V`
    Map { key: Box<TypeExpr>, value: Box<TypeExpr> },
    Chan { dir: ChanDir, elem: Box<TypeExpr> },
    Func(FuncType),
    /// Anonymous `struct { ... }`
    Struct(StructType),
    /// `interface { ... }`; the method set is not retained
    Interface,
    /// `Base[A]` or `Base[A, B]`
    Generic { base: Box<TypeExpr>, args: Vec<TypeExpr> },
    /// `(T)`
    Paren(Box<TypeExpr>),
    /// `~T` in a constraint
    Approx(Box<TypeExpr>),
    /// `A | B` in a constraint
    Union(Vec<TypeExpr>),
}

/// A function signature with parameter names dropped.
///
/// Named groups such as `(a, b int)` expand to one entry per name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FuncType {
    pub params: Vec<TypeExpr>,
    /// The last parameter is `...T`
    pub variadic: bool,
    pub results: Vec<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructType {
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// Empty for an embedded field
    pub names: Vec<String>,
    pub ty: TypeExpr,
    /// Tag literal as written, quotes included
    pub tag: Option<String>,
    pub pos: Position,
}

impl FieldDecl {
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }
}
