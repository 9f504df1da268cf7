use pas2go_core::{CoreError, DiagnosticKind, compile, translate};

fn go(source: &str) -> String {
    translate(source).unwrap_or_else(|d| panic!("translation failed: {d}"))
}

fn error_kind(source: &str) -> DiagnosticKind {
    match translate(source) {
        Ok(go) => panic!("expected an error, got:\n{go}"),
        Err(diagnostic) => diagnostic.kind,
    }
}

#[test]
fn logic_operators() {
    let out = go("program t;
var a: boolean;
begin
  a := not (true xor false) and true or false;
end.");
    assert!(out.contains("&&"));
    assert!(out.contains("||"));
    assert!(out.contains("!"));
    assert!(out.contains("a = !(true != false) && true || false"));
}

#[test]
fn unary_minus() {
    let out = go("program t;
var x: integer;
begin
  x := -1;
  x := -(1 + 2);
end.");
    assert!(out.contains("x = -1\n"));
    assert!(out.contains("x = -(1 + 2)\n"));
}

#[test]
fn parentheses_follow_precedence() {
    let out = go("program t;
var x: integer; r: real;
begin
  x := (1 + 2) * 3;
  x := 10 - (3 - 1);
  x := 1 + 2 * 3;
  r := (1.0 + 2.0) / 4.0;
end.");
    assert!(out.contains("x = (1 + 2) * 3"));
    assert!(out.contains("x = 10 - (3 - 1)"));
    assert!(out.contains("x = 1 + 2 * 3"));
    assert!(out.contains("r = (1.0 + 2.0) / 4.0"));
}

#[test]
fn functions_and_procedures() {
    let out = go("program t;
var x: integer;
function add(a: integer; b: integer): integer;
begin
  add := a + b;
end;
procedure show(v: integer);
begin
  writeln(v);
end;
begin
  x := add(2, 3);
  show(x);
end.");
    assert!(out.contains("func add(a int, b int) int {\n\treturn a + b\n}"));
    assert!(out.contains("func show(v int) {\n\tfmt.Println(v)\n}"));
    assert!(out.contains("\tx = add(2, 3)\n"));
    assert!(out.contains("\tshow(x)\n"));
}

#[test]
fn control_flow() {
    let out = go("program t;
var i, s: integer;
begin
  s := 0;
  for i := 1 to 10 do
    if i mod 2 = 0 then s := s + i else s := s - 1;
  while s > 0 do s := s - 3;
  repeat s := s + 1 until s >= 5;
  case s of
    5: writeln('five');
    6, 7: writeln('more');
  else
    writeln('other');
  end;
end.");
    assert!(out.contains("\tfor i = 1; i <= 10; i++ {\n\t\tif i % 2 == 0 {\n"));
    assert!(out.contains("\tfor s > 0 {\n"));
    assert!(out.contains("\t\tif s >= 5 {\n\t\t\tbreak\n"));
    assert!(out.contains("\tswitch s {\n\tcase 5:\n"));
    assert!(out.contains("\tcase 6, 7:\n"));
    assert!(out.contains("\tdefault:\n\t\tfmt.Println(\"other\")\n"));
}

#[test]
fn real_and_char_types() {
    let out = go("program t;
var r: real; c: char;
begin
  r := 3.14;
  c := 'z';
  writeln(r, c);
end.");
    assert!(out.contains("var r float64\n"));
    assert!(out.contains("var c rune\n"));
    assert!(out.contains("r = 3.14\n"));
    assert!(out.contains("c = 'z'\n"));
}

#[test]
fn arrays_are_renormalized() {
    let out = go("program t;
var a: array[1..3] of integer; i: integer;
begin
  i := 2;
  a[i] := 10;
  writeln(a[1]);
end.");
    assert!(out.contains("var a [3]int\n"));
    assert!(out.contains("a[(i) - 1] = 10"));
    assert!(out.contains("fmt.Println(a[(1) - 1])"));
}

#[test]
fn fmt_import_appears_once_when_writeln_is_used() {
    let with = go("program t; begin writeln(1); writeln(2); writeln('x') end.");
    assert_eq!(with.matches("import \"fmt\"").count(), 1);
    let without = go("program t; var x: integer; begin x := 1 end.");
    assert!(!without.contains("fmt"));
}

#[test]
fn identical_input_gives_identical_output() {
    let source = "program t; var a: array[0..9] of char; i: integer;
begin for i := 9 downto 0 do a[i] := 'x' end.";
    assert_eq!(go(source), go(source));
}

#[test]
fn output_ends_with_single_newline() {
    let out = go("program t; begin end.");
    assert!(out.ends_with("}\n"));
    assert!(!out.ends_with("\n\n"));
}

#[test]
fn compile_exposes_tokens_and_tree() {
    let artifact = compile("program t; var x: integer; begin x := 1 end.").expect("compile");
    assert_eq!(artifact.program.globals.len(), 1);
    assert_eq!(
        artifact.tokens.last().map(|t| t.kind),
        Some(pas2go_core::lexer::TokenKind::Eof)
    );
}

#[test]
fn reserved_go_word_is_rejected() {
    let err = compile("program t; var func: integer; begin end.").unwrap_err();
    assert!(matches!(err, CoreError::ReservedWord { .. }), "{err:?}");
    let diagnostic = translate("program t; var range: integer; begin end.").unwrap_err();
    assert_eq!(diagnostic.code, "E0003");
}

#[test]
fn generated_go_names_are_reserved() {
    for source in [
        "program t; var fmt: integer; begin writeln(fmt) end.",
        "program t; var int: integer; begin int := 1 end.",
        "program t; procedure bool; begin end; begin end.",
    ] {
        let diagnostic = translate(source).unwrap_err();
        assert_eq!(diagnostic.kind, DiagnosticKind::Lexical, "{source}");
        assert_eq!(diagnostic.code, "E0003", "{source}");
    }
}

// ---------------------------------------------------------------------
// Rejected programs
// ---------------------------------------------------------------------

#[test]
fn undeclared_variable() {
    assert_eq!(error_kind("program t; begin x := 1; end."), DiagnosticKind::Name);
}

#[test]
fn assignment_type_mismatch() {
    assert_eq!(
        error_kind("program t; var s: string; begin s := 1; end."),
        DiagnosticKind::Type
    );
}

#[test]
fn mixed_numeric_types() {
    assert_eq!(
        error_kind("program t; var i: integer; begin i := 1 + 1.0; end."),
        DiagnosticKind::Type
    );
}

#[test]
fn wrong_argument_count_and_type() {
    let routines = "function add(a: integer; b: integer): integer; begin add := a + b; end;";
    assert_eq!(
        error_kind(&format!("program t; var x: integer; {routines} begin x := add(1); end.")),
        DiagnosticKind::Type
    );
    assert_eq!(
        error_kind(&format!("program t; var x: integer; {routines} begin x := add(1, 'a'); end.")),
        DiagnosticKind::Type
    );
}

#[test]
fn routine_role_misuse() {
    assert_eq!(
        error_kind(
            "program t; var x: integer; procedure p(a: integer); begin writeln(a); end;
             begin x := p(1); end."
        ),
        DiagnosticKind::Type
    );
    assert_eq!(
        error_kind("program t; function f(): integer; begin f := 1; end; begin f(); end."),
        DiagnosticKind::Type
    );
}

#[test]
fn unknown_function() {
    assert_eq!(
        error_kind("program t; var x: integer; begin x := g(1); end."),
        DiagnosticKind::Name
    );
}

#[test]
fn array_misuse() {
    assert_eq!(
        error_kind(
            "program t; var a: array[1..3] of integer; f: real; begin f := 1.5; a[f] := 1; end."
        ),
        DiagnosticKind::Type
    );
    assert_eq!(
        error_kind("program t; var a: array[1..3] of integer; begin a[1] := 'c'; end."),
        DiagnosticKind::Type
    );
    assert_eq!(
        error_kind(
            "program t; var a, b: array[1..3] of integer; x: boolean; begin x := a = b; end."
        ),
        DiagnosticKind::Type
    );
    assert_eq!(
        error_kind(
            "program t; var a, b: array[1..3] of integer; x: integer; begin x := a + b; end."
        ),
        DiagnosticKind::Type
    );
    assert_eq!(
        error_kind(
            "program t; var a: array[1..3] of integer;
             procedure p(v: integer); begin writeln(v); end;
             begin p(a); end."
        ),
        DiagnosticKind::Type
    );
}

#[test]
fn package_level_go_names_are_rejected() {
    assert_eq!(
        error_kind("program t; procedure init; begin end; begin end."),
        DiagnosticKind::Name
    );
    assert_eq!(
        error_kind("program t; procedure init(a: integer); begin writeln(a); end; begin init(1); end."),
        DiagnosticKind::Name
    );
    assert_eq!(
        error_kind("program t; var main: integer; begin end."),
        DiagnosticKind::Name
    );
}

#[test]
fn case_label_type_mismatch() {
    assert_eq!(
        error_kind("program t; var i: integer; begin case i of 'a': writeln(1); end; end."),
        DiagnosticKind::Type
    );
}

#[test]
fn invalid_array_declarations() {
    assert_eq!(
        error_kind("program t; var a: array[1.5..3] of integer; begin end."),
        DiagnosticKind::Syntax
    );
    assert_eq!(
        error_kind("program t; var a: array[3..1] of integer; begin end."),
        DiagnosticKind::Syntax
    );
    assert_eq!(
        error_kind(
            "program t; procedure p(a: array[1..3] of integer); begin end; begin end."
        ),
        DiagnosticKind::Syntax
    );
}

#[test]
fn malformed_input() {
    assert_eq!(error_kind("program t; begin x := 1 @ end."), DiagnosticKind::Lexical);
    assert_eq!(error_kind("program t; begin { never closed end."), DiagnosticKind::Lexical);
    let diagnostic = translate("program t; begin writeln('open); end.").unwrap_err();
    assert_eq!(diagnostic.code, "E0002");
    assert_eq!(diagnostic.message, "unterminated string literal");
    assert_eq!(error_kind("program t; begin end"), DiagnosticKind::Syntax);
    assert_eq!(error_kind(""), DiagnosticKind::Syntax);
}
