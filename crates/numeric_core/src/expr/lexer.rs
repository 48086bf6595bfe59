//! Tokenizer for expression text.

use crate::types::NumericError;

/// Lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Numeric literal, scientific notation included
    Number(f64),
    /// Variable, constant or function name
    Ident(String),
    /// One of `+ - * / ^` (`**` is folded into `^`)
    Op(char),
    /// `(`
    OParen,
    /// `)`
    CParen,
}

/// Token with its character offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    /// The token
    pub token: Token,
    /// Offset of its first character
    pub position: usize,
}

/// Split `text` into tokens.
pub fn tokenize(text: &str) -> Result<Vec<Spanned>, NumericError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let start = i;
        let token = match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '0'..='9' | '.' => {
                i = scan_number(&chars, i);
                let lexeme: String = chars[start..i].iter().collect();
                let value = lexeme.parse::<f64>().map_err(|_| {
                    NumericError::parse(format!("malformed number '{}'", lexeme), start)
                })?;
                Token::Number(value)
            }
            c if c.is_alphabetic() || c == '_' => {
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                Token::Ident(chars[start..i].iter().collect())
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                Token::Op('^')
            }
            '+' | '-' | '*' | '/' | '^' => {
                i += 1;
                Token::Op(c)
            }
            '(' => {
                i += 1;
                Token::OParen
            }
            ')' => {
                i += 1;
                Token::CParen
            }
            other => {
                return Err(NumericError::parse(
                    format!("unexpected character '{}'", other),
                    start,
                ))
            }
        };
        tokens.push(Spanned {
            token,
            position: start,
        });
    }

    Ok(tokens)
}

// digits [. digits] [(e|E) [+|-] digits]; the exponent is only consumed when
// at least one digit follows it, so "2e" lexes as 2 followed by `e`.
fn scan_number(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
        i += 1;
    }
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
            j += 1;
        }
        if j < chars.len() && chars[j].is_ascii_digit() {
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<Token> {
        tokenize(text).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn test_tokenize_simple() {
        assert_eq!(
            kinds("x^2 - 2"),
            vec![
                Token::Ident("x".into()),
                Token::Op('^'),
                Token::Number(2.0),
                Token::Op('-'),
                Token::Number(2.0),
            ]
        );
    }

    #[test]
    fn test_double_star_is_power() {
        assert_eq!(
            kinds("x**3"),
            vec![Token::Ident("x".into()), Token::Op('^'), Token::Number(3.0)]
        );
    }

    #[test]
    fn test_scientific_notation() {
        assert_eq!(kinds("1.5e-3"), vec![Token::Number(1.5e-3)]);
        assert_eq!(kinds("2E+2"), vec![Token::Number(200.0)]);
    }

    #[test]
    fn test_trailing_e_is_identifier() {
        assert_eq!(
            kinds("2e"),
            vec![Token::Number(2.0), Token::Ident("e".into())]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("  sin(x)").unwrap();
        assert_eq!(tokens[0].position, 2);
        assert_eq!(tokens[1].position, 5);
    }

    #[test]
    fn test_bad_character() {
        let err = tokenize("x $ 2").unwrap_err();
        assert_eq!(
            err,
            NumericError::parse("unexpected character '$'", 2)
        );
    }

    #[test]
    fn test_malformed_number() {
        assert!(tokenize("1.2.3").is_err());
    }
}
