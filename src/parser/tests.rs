use super::*;
use crate::ast::{Item, ShaderKind, Stmt};
use crate::lexer::VecSource;
use crate::utf8;

fn tok(kind: TokenKind, text: &str) -> Token {
    let lexeme: Vec<utf8::Glyph> = utf8::decode_str(text).collect();
    Token {
        kind,
        lexeme,
        line: 0,
        column: 0,
    }
}

/// Parse a hand-built token list as a single expression and render it.
fn parse_expr_debug(tokens: Vec<Token>) -> String {
    let mut interner = Interner::new();
    let mut ordinals = Ordinals::new();
    let mut parser = Parser::new(VecSource::new(tokens), &mut interner, &mut ordinals).unwrap();
    let expr = parser.parse_expression().unwrap();
    expr.debug(&interner)
}

fn parse_expr_err(tokens: Vec<Token>) -> ParseError {
    let mut interner = Interner::new();
    let mut ordinals = Ordinals::new();
    let mut parser = Parser::new(VecSource::new(tokens), &mut interner, &mut ordinals).unwrap();
    parser.parse_expression().unwrap_err()
}

/// Lex and parse whole source text.
fn parse_program_src(source: &str) -> Program {
    let mut interner = Interner::new();
    let mut ordinals = Ordinals::new();
    let lexer = crate::lexer::Lexer::slim(source.bytes());
    let mut parser = Parser::new(lexer, &mut interner, &mut ordinals).unwrap();
    parser.parse_program().unwrap()
}

fn num(text: &str) -> Token {
    tok(TokenKind::NumericLiteral, text)
}

fn ident(text: &str) -> Token {
    tok(TokenKind::Identifier, text)
}

fn op(kind: TokenKind, text: &str) -> Token {
    tok(kind, text)
}

#[test]
fn literals_and_references() {
    assert_eq!(parse_expr_debug(vec![num("10")]), "i{10}");
    assert_eq!(parse_expr_debug(vec![num("2.5")]), "f{2.5}");
    assert_eq!(
        parse_expr_debug(vec![tok(TokenKind::BoolLiteral, "true")]),
        "b{true}"
    );
    assert_eq!(parse_expr_debug(vec![ident("myVar")]), "id{myVar}");
}

#[test]
fn logical_precedence_and_grouping() {
    assert_eq!(
        parse_expr_debug(vec![
            tok(TokenKind::BoolLiteral, "true"),
            op(TokenKind::OpAnd, "&&"),
            tok(TokenKind::BoolLiteral, "false"),
        ]),
        "(&& b{true} b{false})"
    );

    assert_eq!(
        parse_expr_debug(vec![
            tok(TokenKind::BoolLiteral, "true"),
            op(TokenKind::OpOr, "||"),
            op(TokenKind::OpenParen, "("),
            tok(TokenKind::BoolLiteral, "false"),
            op(TokenKind::OpAnd, "&&"),
            tok(TokenKind::BoolLiteral, "true"),
            op(TokenKind::CloseParen, ")"),
        ]),
        "(|| b{true} (&& b{false} b{true}))"
    );

    assert_eq!(
        parse_expr_debug(vec![
            op(TokenKind::OpBang, "!"),
            tok(TokenKind::BoolLiteral, "true"),
            op(TokenKind::OpOr, "||"),
            tok(TokenKind::BoolLiteral, "false"),
        ]),
        "(|| (! b{true}) b{false})"
    );

    assert_eq!(
        parse_expr_debug(vec![
            ident("cond1"),
            op(TokenKind::OpAnd, "&&"),
            ident("cond2"),
            op(TokenKind::OpOr, "||"),
            op(TokenKind::OpenParen, "("),
            ident("cond3"),
            op(TokenKind::OpOr, "||"),
            ident("cond4"),
            op(TokenKind::CloseParen, ")"),
            op(TokenKind::OpAnd, "&&"),
            ident("cond5"),
        ]),
        "(|| (&& id{cond1} id{cond2}) (&& (|| id{cond3} id{cond4}) id{cond5}))"
    );
}

#[test]
fn comparisons_bind_tighter_than_logic() {
    assert_eq!(
        parse_expr_debug(vec![
            num("1"),
            op(TokenKind::OpGt, ">"),
            num("2"),
            op(TokenKind::OpOr, "||"),
            num("3"),
            op(TokenKind::OpLe, "<="),
            num("4"),
        ]),
        "(|| (> i{1} i{2}) (<= i{3} i{4}))"
    );

    assert_eq!(
        parse_expr_debug(vec![
            ident("myVar"),
            op(TokenKind::OpAdd, "+"),
            num("1"),
            op(TokenKind::OpGt, ">"),
            ident("otherVar"),
            op(TokenKind::OpAnd, "&&"),
            ident("myVar"),
            op(TokenKind::OpMod, "%"),
            num("2"),
            op(TokenKind::OpEq, "=="),
            num("0"),
        ]),
        "(&& (> (+ id{myVar} i{1}) id{otherVar}) (== (% id{myVar} i{2}) i{0}))"
    );
}

#[test]
fn arithmetic_precedence_and_associativity() {
    assert_eq!(
        parse_expr_debug(vec![num("5"), op(TokenKind::OpAdd, "+"), num("10"),
            op(TokenKind::OpDiv, "/"), num("3")]),
        "(+ i{5} (/ i{10} i{3}))"
    );

    assert_eq!(
        parse_expr_debug(vec![
            num("4"),
            op(TokenKind::OpMul, "*"),
            op(TokenKind::OpenParen, "("),
            num("2"),
            op(TokenKind::OpAdd, "+"),
            num("3"),
            op(TokenKind::CloseParen, ")"),
            op(TokenKind::OpSub, "-"),
            num("7"),
        ]),
        "(- (* i{4} (+ i{2} i{3})) i{7})"
    );

    // 3 * (2 + 5) / 4 + 6
    assert_eq!(
        parse_expr_debug(vec![
            num("3"),
            op(TokenKind::OpMul, "*"),
            op(TokenKind::OpenParen, "("),
            num("2"),
            op(TokenKind::OpAdd, "+"),
            num("5"),
            op(TokenKind::CloseParen, ")"),
            op(TokenKind::OpDiv, "/"),
            num("4"),
            op(TokenKind::OpAdd, "+"),
            num("6"),
        ]),
        "(+ (/ (* i{3} (+ i{2} i{5})) i{4}) i{6})"
    );

    assert_eq!(
        parse_expr_debug(vec![
            num("1"),
            op(TokenKind::OpAdd, "+"),
            num("2"),
            op(TokenKind::OpAdd, "+"),
            num("3"),
            op(TokenKind::OpAdd, "+"),
            num("4"),
        ]),
        "(+ (+ (+ i{1} i{2}) i{3}) i{4})"
    );
}

#[test]
fn calls_with_and_without_arguments() {
    assert_eq!(
        parse_expr_debug(vec![
            ident("sqrt"),
            op(TokenKind::OpenParen, "("),
            num("16"),
            op(TokenKind::CloseParen, ")"),
        ]),
        "(id{sqrt} i{16})"
    );

    assert_eq!(
        parse_expr_debug(vec![
            ident("max"),
            op(TokenKind::OpenParen, "("),
            num("5"),
            op(TokenKind::Comma, ","),
            num("10"),
            op(TokenKind::CloseParen, ")"),
            op(TokenKind::OpSub, "-"),
            ident("min"),
            op(TokenKind::OpenParen, "("),
            num("2"),
            op(TokenKind::Comma, ","),
            num("7"),
            op(TokenKind::CloseParen, ")"),
        ]),
        "(- (id{max} i{5} i{10}) (id{min} i{2} i{7}))"
    );

    assert_eq!(
        parse_expr_debug(vec![
            ident("abs"),
            op(TokenKind::OpenParen, "("),
            op(TokenKind::OpSub, "-"),
            num("7"),
            op(TokenKind::CloseParen, ")"),
            op(TokenKind::OpMul, "*"),
            ident("pow"),
            op(TokenKind::OpenParen, "("),
            num("2"),
            op(TokenKind::Comma, ","),
            num("3"),
            op(TokenKind::CloseParen, ")"),
        ]),
        "(* (id{abs} (- i{7})) (id{pow} i{2} i{3}))"
    );

    // Data-type keywords act as constructor callees.
    assert_eq!(
        parse_expr_debug(vec![
            tok(TokenKind::DataType, "vec3"),
            op(TokenKind::OpenParen, "("),
            num("1"),
            op(TokenKind::Comma, ","),
            num("2"),
            op(TokenKind::Comma, ","),
            num("3"),
            op(TokenKind::CloseParen, ")"),
        ]),
        "(id{vec3} i{1} i{2} i{3})"
    );
}

#[test]
fn indexing_and_field_access_chain() {
    assert_eq!(
        parse_expr_debug(vec![
            ident("arr"),
            op(TokenKind::OpenBracket, "["),
            num("0"),
            op(TokenKind::CloseBracket, "]"),
            op(TokenKind::OpAdd, "+"),
            ident("arr"),
            op(TokenKind::OpenBracket, "["),
            num("1"),
            op(TokenKind::CloseBracket, "]"),
        ]),
        "(+ ([] id{arr} i{0}) ([] id{arr} i{1}))"
    );

    assert_eq!(
        parse_expr_debug(vec![
            ident("obj"),
            op(TokenKind::Dot, "."),
            ident("property"),
            op(TokenKind::Dot, "."),
            ident("nested"),
        ]),
        "(. (. id{obj} id{property}) id{nested})"
    );

    // arr[1].foo()[i + 1]
    assert_eq!(
        parse_expr_debug(vec![
            ident("arr"),
            op(TokenKind::OpenBracket, "["),
            num("1"),
            op(TokenKind::CloseBracket, "]"),
            op(TokenKind::Dot, "."),
            ident("foo"),
            op(TokenKind::OpenParen, "("),
            op(TokenKind::CloseParen, ")"),
            op(TokenKind::OpenBracket, "["),
            ident("i"),
            op(TokenKind::OpAdd, "+"),
            num("1"),
            op(TokenKind::CloseBracket, "]"),
        ]),
        "([] ((. ([] id{arr} i{1}) id{foo})) (+ id{i} i{1}))"
    );
}

#[test]
fn assignment_is_lowest_precedence_and_right_associative() {
    assert_eq!(
        parse_expr_debug(vec![ident("foo"), op(TokenKind::OpAssign, "="), num("5")]),
        "(= id{foo} i{5})"
    );

    assert_eq!(
        parse_expr_debug(vec![
            ident("foo"),
            op(TokenKind::Dot, "."),
            ident("bar"),
            op(TokenKind::OpAssign, "="),
            ident("baz"),
        ]),
        "(= (. id{foo} id{bar}) id{baz})"
    );

    assert_eq!(
        parse_expr_debug(vec![
            ident("a"),
            op(TokenKind::OpAssign, "="),
            ident("b"),
            op(TokenKind::OpAssign, "="),
            num("1"),
        ]),
        "(= id{a} (= id{b} i{1}))"
    );
}

#[test]
fn invalid_expressions_are_rejected() {
    // Trailing operator.
    parse_expr_err(vec![num("5"), op(TokenKind::OpAdd, "+")]);

    // Unbalanced parentheses.
    parse_expr_err(vec![
        op(TokenKind::OpenParen, "("),
        op(TokenKind::OpenParen, "("),
        num("3"),
        op(TokenKind::OpAdd, "+"),
        num("1"),
        op(TokenKind::CloseParen, ")"),
    ]);

    // Double dot.
    parse_expr_err(vec![
        ident("myVar"),
        op(TokenKind::Dot, "."),
        op(TokenKind::Dot, "."),
        ident("property"),
    ]);

    // Unterminated index.
    parse_expr_err(vec![ident("myVar"), op(TokenKind::OpenBracket, "[")]);

    // Trailing comma in an argument list.
    let err = parse_expr_err(vec![
        ident("fn"),
        op(TokenKind::OpenParen, "("),
        num("1"),
        op(TokenKind::Comma, ","),
        num("2"),
        op(TokenKind::Comma, ","),
        op(TokenKind::CloseParen, ")"),
    ]);
    assert_eq!(err.kind, ParseErrorKind::ExpectedExpression);
}

#[test]
fn numeric_overflow_is_a_parse_error() {
    let err = parse_expr_err(vec![num("99999999999999999999")]);
    assert_eq!(err.kind, ParseErrorKind::InvalidNumericLiteral);
}

#[test]
fn property_declarations_with_tags() {
    let program =
        parse_program_src("#uniform \"u_color\" property vec3 color = vec3(1.0, 1.0, 1.0);");
    assert_eq!(program.items.len(), 1);

    let Item::Property(decl) = &program.items[0] else {
        panic!("expected a property declaration");
    };
    assert_eq!(decl.tags.len(), 1);
    assert!(decl.tags[0].meta.is_some());
    assert!(decl.init.is_some());
}

#[test]
fn shared_declaration_without_initializer() {
    let program = parse_program_src("shared mat4 transform;");
    let Item::Shared(decl) = &program.items[0] else {
        panic!("expected a shared declaration");
    };
    assert!(decl.init.is_none());
}

#[test]
fn feature_blocks_hold_property_declarations() {
    let program = parse_program_src(
        "feature lighting { \
           property vec3 light_dir; \
           #optional property float intensity = 1.0; \
         }",
    );
    let Item::Feature(feature) = &program.items[0] else {
        panic!("expected a feature block");
    };
    assert_eq!(feature.decls.len(), 2);
    assert_eq!(feature.decls[1].tags.len(), 1);
}

#[test]
fn shader_blocks_parse_statements() {
    let program = parse_program_src(
        "shader vertex { \
           vec3 pos = vec3(0.0, 0.0, 0.0); \
           pos.x = 1.0; \
           return vec4(pos, 1.0); \
         }",
    );
    let Item::Shader(shader) = &program.items[0] else {
        panic!("expected a shader block");
    };
    assert_eq!(shader.kind, ShaderKind::Vertex);
    assert_eq!(shader.stats.len(), 3);
    assert!(matches!(shader.stats[0], Stmt::Decl(_)));
    assert!(matches!(shader.stats[1], Stmt::Expr(_)));
    assert!(matches!(shader.stats[2], Stmt::Return(_)));
}

#[test]
fn require_blocks_nest_in_shaders() {
    let program = parse_program_src(
        "shader fragment { \
           require lighting { \
             float l = 0.5; \
           } \
         }",
    );
    let Item::Shader(shader) = &program.items[0] else {
        panic!("expected a shader block");
    };
    let Stmt::Require(require) = &shader.stats[0] else {
        panic!("expected a require block statement");
    };
    assert_eq!(require.stats.len(), 1);
}

#[test]
fn require_blocks_parse_at_top_level() {
    let program = parse_program_src("require lighting { float l = 0.5; }");
    assert!(matches!(program.items[0], Item::Require(_)));
}

#[test]
fn fragment_shader_kind_is_recognized() {
    let program = parse_program_src("shader fragment { }");
    let Item::Shader(shader) = &program.items[0] else {
        panic!("expected a shader block");
    };
    assert_eq!(shader.kind, ShaderKind::Fragment);
}

#[test]
fn empty_program_parses() {
    let program = parse_program_src("");
    assert!(program.items.is_empty());
    assert!(program.token.is_none());
}

#[test]
fn stray_token_at_top_level_is_an_item_error() {
    let mut interner = Interner::new();
    let mut ordinals = Ordinals::new();
    let lexer = crate::lexer::Lexer::slim("42".bytes());
    let mut parser = Parser::new(lexer, &mut interner, &mut ordinals).unwrap();
    let err = parser.parse_program().unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::ExpectedItem);
}

#[test]
fn unterminated_block_reports_end_of_input() {
    let mut interner = Interner::new();
    let mut ordinals = Ordinals::new();
    let lexer = crate::lexer::Lexer::slim("shader vertex { float x = 1.0;".bytes());
    let mut parser = Parser::new(lexer, &mut interner, &mut ordinals).unwrap();
    let err = parser.parse_program().unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnexpectedEndOfInput);
}

#[test]
fn ordinals_are_distinct_across_the_tree() {
    let program = parse_program_src(
        "shared float a = 1.0; shader fragment { float b = a + 2.0; return vec4(b, b, b, b); }",
    );

    use crate::visitor::{NodeRef, Traverser};
    use std::convert::Infallible;

    struct Collect {
        seen: Vec<u32>,
    }

    impl Traverser for Collect {
        type Error = Infallible;

        fn pre(&mut self, node: NodeRef<'_>) -> Result<(), Infallible> {
            self.seen.push(node.ordinal());
            Ok(())
        }

        fn post(&mut self, _node: NodeRef<'_>) -> Result<(), Infallible> {
            Ok(())
        }
    }

    let mut collect = Collect { seen: vec![] };
    crate::visitor::traverse_program(&mut collect, &program).unwrap();

    let mut unique = collect.seen.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), collect.seen.len());
}
