//! Lexer for the Pascal-flavored source language.

use log::trace;

use crate::error::{CoreError, CoreResult};
use crate::span::Location;

/// Kind of a token produced by the lexer.
///
/// The lexer does not attach any semantic meaning beyond recognizing
/// keywords, operators and literals. Keywords and word operators are matched
/// case-insensitively; identifiers keep their spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Special
    Eof,

    // Identifiers and literals
    Ident,
    IntLiteral,
    RealLiteral,
    StringLiteral,
    CharLiteral,
    BoolLiteral, // true / false

    // Punctuation
    LParen,    // (
    RParen,    // )
    LBracket,  // [
    RBracket,  // ]
    Comma,     // ,
    Semi,      // ;
    Colon,     // :
    Dot,       // .
    DotDot,    // ..
    Assign,    // :=

    // Operators
    Plus,      // +
    Minus,     // -
    Star,      // *
    Slash,     // /
    Equal,     // =
    EqEq,      // ==
    BangEq,    // !=
    LessGreater, // <>
    Less,      // <
    LessEq,    // <=
    Greater,   // >
    GreaterEq, // >=
    Div,
    Mod,
    And,
    Or,
    Xor,
    Not,

    // Keywords
    Program,
    Var,
    Function,
    Procedure,
    Integer,
    Real,
    Boolean,
    Char,
    String,
    Begin,
    End,
    If,
    Then,
    Else,
    While,
    Do,
    Repeat,
    Until,
    For,
    To,
    Downto,
    Switch,
    Case,
    Default,
    Writeln,
    Array,
    Of,
}

impl TokenKind {
    /// Human-readable name used in parser messages.
    pub fn describe(self) -> &'static str {
        use TokenKind::*;
        match self {
            Eof => "end of input",
            Ident => "identifier",
            IntLiteral => "integer literal",
            RealLiteral => "real literal",
            StringLiteral => "string literal",
            CharLiteral => "char literal",
            BoolLiteral => "boolean literal",
            LParen => "'('",
            RParen => "')'",
            LBracket => "'['",
            RBracket => "']'",
            Comma => "','",
            Semi => "';'",
            Colon => "':'",
            Dot => "'.'",
            DotDot => "'..'",
            Assign => "':='",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            Equal => "'='",
            EqEq => "'=='",
            BangEq => "'!='",
            LessGreater => "'<>'",
            Less => "'<'",
            LessEq => "'<='",
            Greater => "'>'",
            GreaterEq => "'>='",
            Div => "'div'",
            Mod => "'mod'",
            And => "'and'",
            Or => "'or'",
            Xor => "'xor'",
            Not => "'not'",
            Program => "'program'",
            Var => "'var'",
            Function => "'function'",
            Procedure => "'procedure'",
            Integer => "'integer'",
            Real => "'real'",
            Boolean => "'boolean'",
            Char => "'char'",
            String => "'string'",
            Begin => "'begin'",
            End => "'end'",
            If => "'if'",
            Then => "'then'",
            Else => "'else'",
            While => "'while'",
            Do => "'do'",
            Repeat => "'repeat'",
            Until => "'until'",
            For => "'for'",
            To => "'to'",
            Downto => "'downto'",
            Switch => "'switch'",
            Case => "'case'",
            Default => "'default'",
            Writeln => "'writeln'",
            Array => "'array'",
            Of => "'of'",
        }
    }
}

/// A single token with its kind, source text and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token. String and char literals keep their quotes.
    pub lexeme: String,
    pub location: Location,
}

/// Go spellings an identifier may not take.
///
/// The first group are Go keywords that are not also keywords of the source
/// language; an identifier spelled like one would produce Go that does not
/// parse. The second group are names the generator itself emits: the `fmt`
/// package and the Go type names. A user binding with one of those names
/// would shadow it and break the emitted code.
const TARGET_RESERVED: &[&str] = &[
    "break",
    "chan",
    "const",
    "continue",
    "defer",
    "fallthrough",
    "func",
    "go",
    "goto",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "type",
    // emitted by the generator
    "fmt",
    "int",
    "float64",
    "bool",
    "rune",
];

/// Lex a source string into tokens.
///
/// The returned vector always ends with a single [`TokenKind::Eof`] token
/// located just past the last character. Lexing stops at the first
/// character that cannot start a token.
pub fn tokenize(source: &str) -> CoreResult<Vec<Token>> {
    let mut lexer = Lexer {
        chars: source.chars().collect(),
        index: 0,
        line: 1,
        column: 1,
    };
    let tokens = lexer.run()?;
    trace!("lexed {} tokens", tokens.len());
    Ok(tokens)
}

struct Lexer {
    chars: Vec<char>,
    index: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    fn run(&mut self) -> CoreResult<Vec<Token>> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.consume_char();
                continue;
            }

            let start = self.location();
            let token = match ch {
                '/' if self.peek_next() == Some('/') => {
                    self.skip_line_comment();
                    continue;
                }
                '{' => {
                    self.skip_block_comment(start)?;
                    continue;
                }
                '(' => self.simple_token(TokenKind::LParen, start, 1),
                ')' => self.simple_token(TokenKind::RParen, start, 1),
                '[' => self.simple_token(TokenKind::LBracket, start, 1),
                ']' => self.simple_token(TokenKind::RBracket, start, 1),
                ',' => self.simple_token(TokenKind::Comma, start, 1),
                ';' => self.simple_token(TokenKind::Semi, start, 1),
                ':' => {
                    if self.peek_next() == Some('=') {
                        self.simple_token(TokenKind::Assign, start, 2)
                    } else {
                        self.simple_token(TokenKind::Colon, start, 1)
                    }
                }
                '.' => {
                    if self.peek_next() == Some('.') {
                        self.simple_token(TokenKind::DotDot, start, 2)
                    } else {
                        self.simple_token(TokenKind::Dot, start, 1)
                    }
                }
                '+' => self.simple_token(TokenKind::Plus, start, 1),
                '-' => self.simple_token(TokenKind::Minus, start, 1),
                '*' => self.simple_token(TokenKind::Star, start, 1),
                '/' => self.simple_token(TokenKind::Slash, start, 1),
                '=' => {
                    if self.peek_next() == Some('=') {
                        self.simple_token(TokenKind::EqEq, start, 2)
                    } else {
                        self.simple_token(TokenKind::Equal, start, 1)
                    }
                }
                '!' => {
                    if self.peek_next() == Some('=') {
                        self.simple_token(TokenKind::BangEq, start, 2)
                    } else {
                        return Err(self.unexpected_char(ch, start));
                    }
                }
                '<' => match self.peek_next() {
                    Some('=') => self.simple_token(TokenKind::LessEq, start, 2),
                    Some('>') => self.simple_token(TokenKind::LessGreater, start, 2),
                    _ => self.simple_token(TokenKind::Less, start, 1),
                },
                '>' => {
                    if self.peek_next() == Some('=') {
                        self.simple_token(TokenKind::GreaterEq, start, 2)
                    } else {
                        self.simple_token(TokenKind::Greater, start, 1)
                    }
                }
                '\'' => self.lex_quoted(start)?,
                '0'..='9' => self.lex_number(start)?,
                _ if is_ident_start(ch) => self.lex_ident_or_keyword(start)?,
                _ => return Err(self.unexpected_char(ch, start)),
            };

            tokens.push(token);
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            lexeme: String::new(),
            location: self.location(),
        });

        Ok(tokens)
    }

    fn simple_token(&mut self, kind: TokenKind, start: Location, width: usize) -> Token {
        let from = self.index;
        for _ in 0..width {
            self.consume_char();
        }
        Token {
            kind,
            lexeme: self.text(from),
            location: start,
        }
    }

    fn unexpected_char(&self, ch: char, at: Location) -> CoreError {
        CoreError::lexical(format!("unexpected character '{ch}'"), at)
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch == '\n' {
                break;
            }
            self.consume_char();
        }
    }

    fn skip_block_comment(&mut self, start: Location) -> CoreResult<()> {
        self.consume_char(); // '{'
        while let Some(ch) = self.peek_char() {
            self.consume_char();
            if ch == '}' {
                return Ok(());
            }
        }
        Err(CoreError::Unterminated {
            construct: "comment",
            location: start,
        })
    }

    /// Lex `'x'` as a char literal and any other `'...'` as a string literal.
    fn lex_quoted(&mut self, start: Location) -> CoreResult<Token> {
        let from = self.index;

        // A single character between two quotes is always a char, even when
        // that character is itself a quote.
        if let (Some(ch), Some('\'')) = (self.peek_at(1), self.peek_at(2)) {
            if ch != '\n' {
                for _ in 0..3 {
                    self.consume_char();
                }
                return Ok(Token {
                    kind: TokenKind::CharLiteral,
                    lexeme: self.text(from),
                    location: start,
                });
            }
        }

        self.consume_char(); // opening quote
        while let Some(ch) = self.peek_char() {
            match ch {
                '\'' => {
                    self.consume_char();
                    return Ok(Token {
                        kind: TokenKind::StringLiteral,
                        lexeme: self.text(from),
                        location: start,
                    });
                }
                '\n' => break,
                _ => self.consume_char(),
            }
        }

        Err(CoreError::Unterminated {
            construct: "string literal",
            location: start,
        })
    }

    fn lex_number(&mut self, start: Location) -> CoreResult<Token> {
        let from = self.index;
        self.consume_digits();

        let mut is_real = false;
        // "1..5" is a range, not the real "1." followed by ".5".
        if self.peek_char() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            is_real = true;
            self.consume_char(); // '.'
            self.consume_digits();
        }

        let lexeme = self.text(from);
        if !is_real && lexeme.parse::<i64>().is_err() {
            return Err(CoreError::lexical(
                format!("integer literal {lexeme} is out of range"),
                start,
            ));
        }

        Ok(Token {
            kind: if is_real {
                TokenKind::RealLiteral
            } else {
                TokenKind::IntLiteral
            },
            lexeme,
            location: start,
        })
    }

    fn lex_ident_or_keyword(&mut self, start: Location) -> CoreResult<Token> {
        let from = self.index;
        while self.peek_char().is_some_and(is_ident_continue) {
            self.consume_char();
        }

        let lexeme = self.text(from);
        let lowered = lexeme.to_ascii_lowercase();
        let kind = keyword(&lowered).unwrap_or(TokenKind::Ident);

        if kind == TokenKind::Ident && TARGET_RESERVED.contains(&lowered.as_str()) {
            return Err(CoreError::ReservedWord {
                word: lexeme,
                location: start,
            });
        }

        Ok(Token {
            kind,
            lexeme,
            location: start,
        })
    }

    fn consume_digits(&mut self) {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.consume_char();
        }
    }

    fn text(&self, from: usize) -> String {
        self.chars[from..self.index].iter().collect()
    }

    fn location(&self) -> Location {
        Location::new(self.line, self.column)
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.peek_at(1)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index + offset).copied()
    }

    fn consume_char(&mut self) {
        if let Some(ch) = self.peek_char() {
            self.index += 1;
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }
}

fn keyword(lowered: &str) -> Option<TokenKind> {
    let kind = match lowered {
        "program" => TokenKind::Program,
        "var" => TokenKind::Var,
        "function" => TokenKind::Function,
        "procedure" => TokenKind::Procedure,
        "integer" => TokenKind::Integer,
        "real" => TokenKind::Real,
        "boolean" => TokenKind::Boolean,
        "char" => TokenKind::Char,
        "string" => TokenKind::String,
        "begin" => TokenKind::Begin,
        "end" => TokenKind::End,
        "if" => TokenKind::If,
        "then" => TokenKind::Then,
        "else" => TokenKind::Else,
        "while" => TokenKind::While,
        "do" => TokenKind::Do,
        "repeat" => TokenKind::Repeat,
        "until" => TokenKind::Until,
        "for" => TokenKind::For,
        "to" => TokenKind::To,
        "downto" => TokenKind::Downto,
        "switch" => TokenKind::Switch,
        "case" => TokenKind::Case,
        "default" => TokenKind::Default,
        "writeln" => TokenKind::Writeln,
        "not" => TokenKind::Not,
        "array" => TokenKind::Array,
        "of" => TokenKind::Of,
        "div" => TokenKind::Div,
        "mod" => TokenKind::Mod,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "xor" => TokenKind::Xor,
        "true" | "false" => TokenKind::BoolLiteral,
        _ => return None,
    };
    Some(kind)
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_continue(ch: char) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .expect("lex")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_keywords_case_insensitively() {
        assert_eq!(
            kinds("PROGRAM Begin end WriteLn"),
            vec![
                TokenKind::Program,
                TokenKind::Begin,
                TokenKind::End,
                TokenKind::Writeln,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn word_operators_and_booleans_ignore_case() {
        assert_eq!(
            kinds("a DIV b Mod c AND True xor FALSE"),
            vec![
                TokenKind::Ident,
                TokenKind::Div,
                TokenKind::Ident,
                TokenKind::Mod,
                TokenKind::Ident,
                TokenKind::And,
                TokenKind::BoolLiteral,
                TokenKind::Xor,
                TokenKind::BoolLiteral,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn keyword_prefix_stays_an_identifier() {
        let tokens = tokenize("program_name endless").expect("lex");
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[0].lexeme, "program_name");
        assert_eq!(tokens[1].kind, TokenKind::Ident);
    }

    #[test]
    fn lexes_compound_punctuation() {
        assert_eq!(
            kinds(":= : .. . <> <= >= == != < > ="),
            vec![
                TokenKind::Assign,
                TokenKind::Colon,
                TokenKind::DotDot,
                TokenKind::Dot,
                TokenKind::LessGreater,
                TokenKind::LessEq,
                TokenKind::GreaterEq,
                TokenKind::EqEq,
                TokenKind::BangEq,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::Equal,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn range_between_integers_is_not_a_real() {
        let tokens = tokenize("1..3").expect("lex");
        assert_eq!(tokens[0].kind, TokenKind::IntLiteral);
        assert_eq!(tokens[0].lexeme, "1");
        assert_eq!(tokens[1].kind, TokenKind::DotDot);
        assert_eq!(tokens[2].kind, TokenKind::IntLiteral);
    }

    #[test]
    fn real_literal_requires_digits_after_dot() {
        let tokens = tokenize("1.5 2.").expect("lex");
        assert_eq!(tokens[0].kind, TokenKind::RealLiteral);
        assert_eq!(tokens[0].lexeme, "1.5");
        assert_eq!(tokens[1].kind, TokenKind::IntLiteral);
        assert_eq!(tokens[2].kind, TokenKind::Dot);
    }

    #[test]
    fn minus_is_always_a_separate_token() {
        assert_eq!(
            kinds("-1"),
            vec![TokenKind::Minus, TokenKind::IntLiteral, TokenKind::Eof]
        );
    }

    #[test]
    fn single_quoted_character_is_a_char() {
        let tokens = tokenize("'a' 'ab' '' '''").expect("lex");
        assert_eq!(tokens[0].kind, TokenKind::CharLiteral);
        assert_eq!(tokens[0].lexeme, "'a'");
        assert_eq!(tokens[1].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[2].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[2].lexeme, "''");
        assert_eq!(tokens[3].kind, TokenKind::CharLiteral);
        assert_eq!(tokens[3].lexeme, "'''");
    }

    #[test]
    fn comments_are_skipped_but_advance_lines() {
        let tokens = tokenize("// first\n{ a\n multi-line\n comment } x\n  y").expect("lex");
        assert_eq!(tokens[0].lexeme, "x");
        assert_eq!(tokens[0].location, Location::new(4, 12));
        assert_eq!(tokens[1].lexeme, "y");
        assert_eq!(tokens[1].location, Location::new(5, 3));
    }

    #[test]
    fn eof_token_points_past_the_input() {
        let tokens = tokenize("ab\n").expect("lex");
        let eof = tokens.last().expect("eof");
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.location, Location::new(2, 1));
    }

    #[test]
    fn reports_unexpected_character_with_location() {
        let err = tokenize("x := 1;\n  y @ 2").unwrap_err();
        assert_eq!(
            err,
            CoreError::lexical("unexpected character '@'", Location::new(2, 5))
        );
    }

    #[test]
    fn lone_bang_is_unexpected() {
        assert!(matches!(tokenize("!a"), Err(CoreError::Lexical { .. })));
    }

    #[test]
    fn reports_unterminated_string_and_comment() {
        let err = tokenize("s := 'abc").unwrap_err();
        assert_eq!(
            err,
            CoreError::Unterminated {
                construct: "string literal",
                location: Location::new(1, 6)
            }
        );
        assert_eq!(err.message(), "unterminated string literal");
        let err = tokenize("{ never closed").unwrap_err();
        assert!(matches!(err, CoreError::Unterminated { construct: "comment", .. }));
        assert_eq!(err.message(), "unterminated comment");
    }

    #[test]
    fn rejects_target_reserved_words() {
        let err = tokenize("var func: integer;").unwrap_err();
        assert_eq!(
            err,
            CoreError::ReservedWord {
                word: "func".to_string(),
                location: Location::new(1, 5)
            }
        );
        assert!(matches!(
            tokenize("Package"),
            Err(CoreError::ReservedWord { .. })
        ));
    }

    #[test]
    fn rejects_names_the_generator_emits() {
        let err = tokenize("var fmt: integer;").unwrap_err();
        assert_eq!(
            err,
            CoreError::ReservedWord {
                word: "fmt".to_string(),
                location: Location::new(1, 5)
            }
        );
        for word in ["int", "float64", "bool", "rune"] {
            assert!(
                matches!(tokenize(word), Err(CoreError::ReservedWord { .. })),
                "{word}"
            );
        }
        // `integer` and `boolean` are source keywords, not Go type names.
        assert!(tokenize("integer boolean").is_ok());
    }

    #[test]
    fn rejects_out_of_range_integer() {
        let err = tokenize("99999999999999999999").unwrap_err();
        assert!(matches!(err, CoreError::Lexical { .. }));
    }
}
