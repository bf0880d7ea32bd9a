use crate::syntax::CommentBlock;

/// Directive that opts a struct into generation.
pub const DEFAULT_DIRECTIVE: &str = "//go:generate";

/// Whether any comment in `doc` contains `directive` verbatim.
///
/// Plain substring containment; a missing doc comment never matches.
pub fn has_directive(doc: Option<&CommentBlock>, directive: &str) -> bool {
    doc.is_some_and(|doc| doc.comments.iter().any(|c| c.contains(directive)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(lines: &[&str]) -> CommentBlock {
        CommentBlock {
            comments: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn test_directive_anywhere_in_block() {
        let doc = block(&[
            "// Service talks to the API",
            "//",
            "//go:generate go run ./cmd/gen",
        ]);
        assert!(has_directive(Some(&doc), DEFAULT_DIRECTIVE));
    }

    #[test]
    fn test_missing_doc_never_matches() {
        assert!(!has_directive(None, DEFAULT_DIRECTIVE));
    }

    #[test]
    fn test_requires_exact_text() {
        let doc = block(&["// go:generate with a space is just prose"]);
        assert!(!has_directive(Some(&doc), DEFAULT_DIRECTIVE));

        let doc = block(&["/* //go:generate inside a block comment */"]);
        assert!(has_directive(Some(&doc), DEFAULT_DIRECTIVE));
    }

    #[test]
    fn test_custom_directive() {
        let doc = block(&["//validation:gen"]);
        assert!(has_directive(Some(&doc), "//validation:gen"));
        assert!(!has_directive(Some(&doc), DEFAULT_DIRECTIVE));
    }
}
