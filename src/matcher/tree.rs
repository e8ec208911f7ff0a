// src/matcher/tree.rs
//! Parse-tree backend built on tree-sitter.
//!
//! Every lookup parses the current text; trees are never edited in place.
//! `reserialize` re-parses edited text and rejects anything with an error
//! or missing node, which is what makes C variants syntactically sound.

use super::{
    BinaryExpr, DeclarationScope, Region, Statement, StatementBlock, StatementClass,
    StructuralMatcher,
};
use crate::error::{AdversaError, Result};
use crate::lang::{BackendKind, Lang};
use std::collections::BTreeSet;
use tree_sitter::{Language, Node, Parser, Tree};

pub struct TreeMatcher {
    lang: Lang,
    grammar: Language,
}

impl TreeMatcher {
    /// # Errors
    /// Returns `UnsupportedLanguage` if `lang` has no tree-sitter grammar.
    pub fn new(lang: Lang) -> Result<Self> {
        let grammar = lang
            .grammar()
            .ok_or_else(|| AdversaError::UnsupportedLanguage(lang.name().to_string()))?;
        Ok(Self { lang, grammar })
    }

    fn parse(&self, source: &str) -> Result<Tree> {
        let mut parser = Parser::new();
        parser
            .set_language(self.grammar)
            .map_err(|e| AdversaError::MalformedSource(format!("grammar unavailable: {e}")))?;
        parser
            .parse(source, None)
            .ok_or_else(|| AdversaError::MalformedSource("parser produced no tree".to_string()))
    }

    /// Parses and refuses trees containing syntax errors.
    fn parse_clean(&self, source: &str) -> Result<Tree> {
        let tree = self.parse(source)?;
        let root = tree.root_node();
        if root.has_error() {
            let location = first_error(root).map_or_else(
                || "unknown location".to_string(),
                |n| {
                    let pos = n.start_position();
                    format!("line {}, column {}", pos.row + 1, pos.column + 1)
                },
            );
            return Err(AdversaError::MalformedSource(format!(
                "{} syntax error at {location}",
                self.lang
            )));
        }
        Ok(tree)
    }
}

impl StructuralMatcher for TreeMatcher {
    fn lang(&self) -> Lang {
        self.lang
    }

    fn backend(&self) -> BackendKind {
        BackendKind::ParseTree
    }

    fn validate(&self, source: &str) -> Result<()> {
        self.parse_clean(source).map(|_| ())
    }

    fn find_function_bodies(&self, source: &str) -> Result<Vec<Region>> {
        let tree = self.parse_clean(source)?;
        let mut out = Vec::new();
        walk(tree.root_node(), &mut |node| {
            if node.kind() == "function_definition" {
                if let Some(body) = node.child_by_field_name("body") {
                    out.push(region_of(body, source));
                }
            }
        });
        Ok(out)
    }

    fn find_main_entry(&self, source: &str) -> Result<Option<Region>> {
        let tree = self.parse_clean(source)?;
        let mut found = None;
        walk(tree.root_node(), &mut |node| {
            if found.is_some() || node.kind() != "function_definition" {
                return;
            }
            if function_name(node, source).as_deref() == Some("main") {
                found = node.child_by_field_name("body").map(|b| region_of(b, source));
            }
        });
        Ok(found)
    }

    fn find_declarations(&self, source: &str) -> Result<Vec<DeclarationScope>> {
        let tree = self.parse_clean(source)?;
        let mut scopes = Vec::new();
        walk(tree.root_node(), &mut |node| {
            let mut scope = DeclarationScope::new(region_of(node, source));
            match node.kind() {
                "function_definition" => {
                    let params = node
                        .child_by_field_name("declarator")
                        .and_then(function_declarator)
                        .and_then(|f| f.child_by_field_name("parameters"));
                    if let Some(params) = params {
                        let mut cursor = params.walk();
                        for param in params.named_children(&mut cursor) {
                            if param.kind() == "parameter_declaration" {
                                declare_all(&mut scope, param, source);
                            }
                        }
                    }
                }
                "compound_statement" => {
                    let mut cursor = node.walk();
                    for child in node.named_children(&mut cursor) {
                        if child.kind() == "declaration" {
                            declare_all(&mut scope, child, source);
                        }
                    }
                }
                "for_statement" => {
                    if let Some(init) = node
                        .child_by_field_name("initializer")
                        .filter(|n| n.kind() == "declaration")
                    {
                        declare_all(&mut scope, init, source);
                    }
                }
                _ => return,
            }
            if !scope.names.is_empty() {
                scopes.push(scope);
            }
        });
        Ok(scopes)
    }

    fn find_identifiers(&self, source: &str, region: &Region) -> Result<Vec<Region>> {
        let tree = self.parse_clean(source)?;
        let mut out = Vec::new();
        walk(tree.root_node(), &mut |node| {
            if node.kind() == "identifier" {
                let r = region_of(node, source);
                if region.contains(&r) {
                    out.push(r);
                }
            }
        });
        Ok(out)
    }

    fn find_statement_blocks(&self, source: &str) -> Result<Vec<StatementBlock>> {
        let tree = self.parse_clean(source)?;
        let mut blocks = Vec::new();
        walk(tree.root_node(), &mut |node| {
            if node.kind() != "compound_statement" {
                return;
            }
            let mut cursor = node.walk();
            let statements = node
                .named_children(&mut cursor)
                .filter(|child| child.kind() != "comment")
                .map(|child| Statement {
                    region: region_of(child, source),
                    class: classify(child, source),
                })
                .collect();
            blocks.push(StatementBlock {
                region: region_of(node, source),
                statements,
            });
        });
        Ok(blocks)
    }

    fn find_binary_expressions(&self, source: &str) -> Result<Vec<BinaryExpr>> {
        let tree = self.parse_clean(source)?;
        let mut out = Vec::new();
        walk(tree.root_node(), &mut |node| {
            if node.kind() != "binary_expression" {
                return;
            }
            let (Some(left), Some(op), Some(right)) = (
                node.child_by_field_name("left"),
                node.child_by_field_name("operator"),
                node.child_by_field_name("right"),
            ) else {
                return;
            };
            out.push(BinaryExpr {
                region: region_of(node, source),
                left: region_of(left, source),
                operator: op.kind().to_string(),
                right: region_of(right, source),
            });
        });
        Ok(out)
    }

    fn reserialize(&self, source: String) -> Result<String> {
        self.parse_clean(&source)?;
        Ok(source)
    }
}

/// Depth-first pre-order walk.
fn walk<'t>(node: Node<'t>, visit: &mut impl FnMut(Node<'t>)) {
    visit(node);
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(child, visit);
    }
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

fn region_of(node: Node<'_>, source: &str) -> Region {
    Region::slice(source, node.start_byte(), node.end_byte())
}

fn text_of<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or_default()
}

/// Name of a `function_definition`, looking through pointer declarators.
fn function_name(node: Node<'_>, source: &str) -> Option<String> {
    let mut declarator = node.child_by_field_name("declarator")?;
    loop {
        match declarator.kind() {
            "function_declarator" | "pointer_declarator" | "parenthesized_declarator" => {
                declarator = declarator
                    .child_by_field_name("declarator")
                    .or_else(|| declarator.named_child(0))?;
            }
            "identifier" => return Some(text_of(declarator, source).to_string()),
            _ => return None,
        }
    }
}

/// The `function_declarator` under a definition's declarator chain.
fn function_declarator(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "function_declarator" => Some(node),
        "pointer_declarator" | "attributed_declarator" => {
            function_declarator(node.child_by_field_name("declarator")?)
        }
        "parenthesized_declarator" => function_declarator(node.named_child(0)?),
        _ => None,
    }
}

/// Declares every variable declarator of `decl` in `scope` at its identifier's offset.
fn declare_all(scope: &mut DeclarationScope, decl: Node<'_>, source: &str) {
    let mut cursor = decl.walk();
    for declarator in decl.children_by_field_name("declarator", &mut cursor) {
        if let Some(ident) = declarator_ident(declarator) {
            scope.declare(text_of(ident, source), ident.start_byte());
        }
    }
}

/// Innermost identifier of a variable declarator. Function prototypes yield `None`.
fn declarator_ident(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "identifier" => Some(node),
        "init_declarator" | "pointer_declarator" | "array_declarator" | "attributed_declarator" => {
            declarator_ident(node.child_by_field_name("declarator")?)
        }
        "parenthesized_declarator" => declarator_ident(node.named_child(0)?),
        _ => None,
    }
}

fn declarator_name(node: Node<'_>, source: &str) -> Option<String> {
    declarator_ident(node).map(|n| text_of(n, source).to_string())
}

/// Def/use classification of one statement.
fn classify(node: Node<'_>, source: &str) -> StatementClass {
    if !matches!(node.kind(), "expression_statement" | "declaration") {
        return StatementClass::Pinned;
    }
    if node.named_child_count() == 0 {
        return StatementClass::Pinned;
    }

    let mut writes = BTreeSet::new();
    let mut reads = BTreeSet::new();
    let mut has_effects = false;

    walk(node, &mut |inner| match inner.kind() {
        "call_expression" | "comma_expression" | "function_declarator" => has_effects = true,
        "identifier" => {
            reads.insert(text_of(inner, source).to_string());
        }
        "assignment_expression" => {
            if let Some(target) = inner.child_by_field_name("left").and_then(|l| base_identifier(l, source)) {
                writes.insert(target);
            }
        }
        "update_expression" => {
            if let Some(target) = inner.child_by_field_name("argument").and_then(|a| base_identifier(a, source)) {
                writes.insert(target);
            }
        }
        _ => {}
    });

    if node.kind() == "declaration" {
        let mut cursor = node.walk();
        for declarator in node.children_by_field_name("declarator", &mut cursor) {
            match declarator_name(declarator, source) {
                Some(name) => {
                    writes.insert(name);
                }
                None => has_effects = true,
            }
        }
    }

    if has_effects {
        return StatementClass::Pinned;
    }
    StatementClass::Candidate { writes, reads }
}

/// The variable an lvalue ultimately writes through (`a`, `a[i]`, `*a`, `a.f`).
fn base_identifier(node: Node<'_>, source: &str) -> Option<String> {
    match node.kind() {
        "identifier" => Some(text_of(node, source).to_string()),
        "subscript_expression" => base_identifier(node.child_by_field_name("argument")?, source),
        "field_expression" => base_identifier(node.child_by_field_name("argument")?, source),
        "pointer_expression" => base_identifier(node.child_by_field_name("argument")?, source),
        "parenthesized_expression" => base_identifier(node.named_child(0)?, source),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    fn matcher() -> TreeMatcher {
        TreeMatcher::new(Lang::C).expect("c grammar")
    }

    #[test]
    fn test_main_entry_found() {
        let src = "int helper(int a) { return a; }\nint main() { int x = 1; return x; }";
        let body = matcher().find_main_entry(src).expect("parse").expect("main");
        assert!(body.text.starts_with('{'));
        assert!(body.text.contains("return x;"));
    }

    #[test]
    fn test_no_main_entry() {
        let src = "int helper(int a) { return a; }";
        assert!(matcher().find_main_entry(src).expect("parse").is_none());
    }

    #[test]
    fn test_malformed_source_rejected() {
        let err = matcher().validate("int main( { return ;").expect_err("must fail");
        assert!(matches!(err, AdversaError::MalformedSource(_)));
    }

    #[test]
    fn test_declarations_per_block() {
        let src = "int f(int a, int *b) { int c = a, d[4]; return c; }\nvoid g(void) { char *s; }";
        let scopes = matcher().find_declarations(src).expect("parse");
        assert_eq!(scopes.len(), 3);
        assert_eq!(scopes[0].names, vec!["a", "b"]);
        assert!(scopes[0].region.text.starts_with("int f("));
        assert_eq!(scopes[1].names, vec!["c", "d"]);
        assert!(scopes[1].region.text.starts_with('{'));
        assert_eq!(scopes[2].names, vec!["s"]);
    }

    #[test]
    fn test_inner_block_shadows_outer_binding() {
        let src = "int x = 5;\nint f(void) { int y = x; { int x = 2; y += x; } return y; }";
        let scopes = matcher().find_declarations(src).expect("parse");
        assert_eq!(scopes.len(), 2);
        let outer_use = src.find("= x;").expect("outer use") + 2;
        let inner_use = src.rfind("+= x").expect("inner use") + 3;

        // The global is never a rename target.
        assert!(!scopes.iter().any(|s| s.binds("x", outer_use)));
        assert!(scopes[1].binds("x", inner_use));
        assert!(!scopes[0].binds("x", inner_use));
        // A use before the declaration is not bound by it.
        let before = src.find("{ int x").expect("inner block");
        assert!(!scopes[1].binds("x", before));
        assert!(scopes[0].binds("y", inner_use));
    }

    #[test]
    fn test_for_header_is_its_own_scope() {
        let src = "int main() { int i = 9; for (int i = 0; i < 3; i++) { } return i; }";
        let scopes = matcher().find_declarations(src).expect("parse");
        assert_eq!(scopes.len(), 2);
        assert!(scopes[1].region.text.starts_with("for"));
        let ret = src.rfind("i;").expect("return use");
        assert!(!scopes[1].binds("i", ret));
        assert!(scopes[0].binds("i", ret));
    }

    #[test]
    fn test_identifiers_skip_strings_and_fields() {
        let src = "int main() { int x = 1; char *s = \"x\"; p.x = x; return x; }";
        let m = matcher();
        let body = m.find_main_entry(src).expect("parse").expect("main");
        let xs = m
            .find_identifiers(src, &body)
            .expect("parse")
            .into_iter()
            .filter(|r| r.text == "x")
            .count();
        assert_eq!(xs, 3);
    }

    #[test]
    fn test_statement_classification() {
        let src = "int main() { int a = 1; b = a + 2; printf(\"%d\", b); if (a) { a++; } return 0; }";
        let blocks = matcher().find_statement_blocks(src).expect("parse");
        let outer = &blocks[0];
        assert_eq!(outer.statements.len(), 5);
        assert!(matches!(outer.statements[0].class, StatementClass::Candidate { .. }));
        assert!(matches!(outer.statements[1].class, StatementClass::Candidate { .. }));
        assert_eq!(outer.statements[2].class, StatementClass::Pinned);
        assert_eq!(outer.statements[3].class, StatementClass::Pinned);
        assert_eq!(outer.statements[4].class, StatementClass::Pinned);
    }

    #[test]
    fn test_reserialize_rejects_broken_edit() {
        let broken = "int main() { return 0; ".to_string();
        assert!(matcher().reserialize(broken).is_err());
    }
}
