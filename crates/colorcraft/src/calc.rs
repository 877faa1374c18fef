//! The `calc()` evaluator: tokenize, recursive-descent parse, and evaluate
//! in one pass, with unit conversion, named constants, and a small math
//! function library.
//!
//! Grammar (right-associative exponent): `additive -> multiplicative ->
//! power -> unary -> primary`; `primary` is a number, identifier,
//! `identifier(args...)`, or `(expr)`. Grounded in the teacher's
//! hand-written recursive-descent style (`core::string`), generalized from
//! that module's narrow numeric-literal handling to the full grammar
//! spec.md §4.3 requires.

use std::collections::HashMap;

use crate::error::{CalcError, Error};
use crate::Float;

/// The range, relative-origin bindings, and unit policy a `calc()`
/// expression is evaluated against.
pub struct CalcContext<'a> {
    /// The origin color's named components, bound only in relative syntax;
    /// empty otherwise.
    pub variables: &'a HashMap<String, Float>,
    /// The target component's active range, used for percent remapping and
    /// the `infinity`/`-infinity` short circuits.
    pub range: (Float, Float),
    /// True for a percentage-typed target component: percents stay literal
    /// numbers instead of being remapped against `range`.
    pub is_percentage_component: bool,
    /// True under relative-color syntax, where `%` and angle units are
    /// disallowed inside `calc()`.
    pub disallow_units: bool,
}

impl<'a> CalcContext<'a> {
    pub fn new(range: (Float, Float)) -> Self {
        static EMPTY: std::sync::OnceLock<HashMap<String, Float>> = std::sync::OnceLock::new();
        Self {
            variables: EMPTY.get_or_init(HashMap::new),
            range,
            is_percentage_component: false,
            disallow_units: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Num(Float),
    Ident(String),
    LParen,
    RParen,
    Comma,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
}

fn tokenize(input: &str, ctx: &CalcContext) -> Result<Vec<Token>, Error> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Caret);
                i += 1;
            }
            '-' => {
                if chars[i..].iter().collect::<String>().to_lowercase().starts_with("-infinity") {
                    tokens.push(Token::Ident("-infinity".to_owned()));
                    i += "-infinity".len();
                } else {
                    tokens.push(Token::Minus);
                    i += 1;
                }
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    i += 1;
                    if i < chars.len() && (chars[i] == '+' || chars[i] == '-') {
                        i += 1;
                    }
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                let literal: String = chars[start..i].iter().collect();
                let value: Float = literal
                    .parse()
                    .map_err(|_| CalcError::MalformedNumber(literal.clone()))?;

                if i < chars.len() && chars[i] == '%' {
                    if ctx.disallow_units {
                        return Err(CalcError::UnitInRelativeCalc.into());
                    }
                    i += 1;
                    let remapped = if ctx.is_percentage_component {
                        value
                    } else {
                        remap_percent(value, ctx.range)
                    };
                    tokens.push(Token::Num(remapped));
                    continue;
                }

                let rest: String = chars[i..].iter().collect::<String>().to_lowercase();
                let unit = ["deg", "grad", "turn", "rad"]
                    .into_iter()
                    .find(|u| rest.starts_with(u));
                if let Some(unit) = unit {
                    if ctx.disallow_units {
                        return Err(CalcError::UnitInRelativeCalc.into());
                    }
                    i += unit.len();
                    let degrees = match unit {
                        "deg" => value,
                        "rad" => value.to_degrees(),
                        "grad" => value * 0.9,
                        "turn" => value * 360.0,
                        _ => unreachable!(),
                    };
                    tokens.push(Token::Num(degrees));
                    continue;
                }

                tokens.push(Token::Num(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                tokens.push(Token::Ident(ident.to_lowercase()));
            }
            other => {
                return Err(CalcError::MalformedNumber(other.to_string()).into());
            }
        }
    }

    Ok(tokens)
}

/// Map a bare percent number `p` into `range`: the symmetric midpoint
/// formula when `range` straddles zero, the affine formula otherwise.
pub(crate) fn remap_percent(p: Float, (min, max): (Float, Float)) -> Float {
    if min < 0.0 && max > 0.0 {
        p / 100.0 * (max - min) / 2.0
    } else {
        p / 100.0 * (max - min) + min
    }
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    ctx: &'a CalcContext<'a>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn expect(&mut self, expected: &Token) -> Result<(), Error> {
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(CalcError::MismatchedParens.into())
        }
    }

    fn parse_additive(&mut self) -> Result<Float, Error> {
        let mut value = self.parse_multiplicative()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    value += self.parse_multiplicative()?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    value -= self.parse_multiplicative()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn parse_multiplicative(&mut self) -> Result<Float, Error> {
        let mut value = self.parse_power()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    value *= self.parse_power()?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    value /= self.parse_power()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn parse_power(&mut self) -> Result<Float, Error> {
        let base = self.parse_unary()?;
        if matches!(self.peek(), Some(Token::Caret)) {
            self.pos += 1;
            let exponent = self.parse_power()?;
            Ok(base.powf(exponent))
        } else {
            Ok(base)
        }
    }

    fn parse_unary(&mut self) -> Result<Float, Error> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(-self.parse_unary()?)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.parse_unary()
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Float>, Error> {
        self.expect(&Token::LParen)?;
        let mut args = Vec::new();
        if !matches!(self.peek(), Some(Token::RParen)) {
            args.push(self.parse_additive()?);
            while matches!(self.peek(), Some(Token::Comma)) {
                self.pos += 1;
                args.push(self.parse_additive()?);
            }
        }
        self.expect(&Token::RParen)?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Float, Error> {
        match self.advance() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.parse_additive()?;
                self.expect(&Token::RParen)?;
                Ok(value)
            }
            Some(Token::Ident(name)) => {
                if matches!(self.peek(), Some(Token::LParen)) {
                    let args = self.parse_args()?;
                    call_function(&name, &args)
                } else if name == "-infinity" {
                    Ok(self.ctx.range.0)
                } else if let Some(value) = self.ctx.variables.get(&name) {
                    Ok(*value)
                } else {
                    match name.as_str() {
                        "pi" => Ok(std::f64::consts::PI as Float),
                        "e" => Ok(std::f64::consts::E as Float),
                        "tau" => Ok(std::f64::consts::TAU as Float),
                        "infinity" => Ok(self.ctx.range.1),
                        "nan" => Ok(0.0),
                        _ => Err(CalcError::UnknownIdentifier(name).into()),
                    }
                }
            }
            _ => Err(CalcError::TrailingTokens.into()),
        }
    }
}

fn call_function(name: &str, args: &[Float]) -> Result<Float, Error> {
    fn one(name: &str, args: &[Float]) -> Result<Float, Error> {
        args.first()
            .copied()
            .ok_or_else(|| CalcError::UnknownFunction(name.to_owned()).into())
    }

    match name {
        "pow" if args.len() == 2 => Ok(args[0].powf(args[1])),
        "sqrt" => Ok(one(name, args)?.sqrt()),
        "sin" => Ok(one(name, args)?.sin()),
        "cos" => Ok(one(name, args)?.cos()),
        "tan" => Ok(one(name, args)?.tan()),
        "asin" => Ok(one(name, args)?.asin()),
        "acos" => Ok(one(name, args)?.acos()),
        "atan" => Ok(one(name, args)?.atan()),
        "atan2" if args.len() == 2 => Ok(args[0].atan2(args[1])),
        "exp" => Ok(one(name, args)?.exp()),
        "log" if args.len() == 1 => Ok(args[0].ln()),
        "log" if args.len() == 2 => Ok(args[0].log(args[1])),
        "log10" => Ok(one(name, args)?.log10()),
        "log2" => Ok(one(name, args)?.log2()),
        "abs" => Ok(one(name, args)?.abs()),
        "min" if !args.is_empty() => Ok(args.iter().copied().fold(Float::INFINITY, Float::min)),
        "max" if !args.is_empty() => Ok(args.iter().copied().fold(Float::NEG_INFINITY, Float::max)),
        "hypot" if !args.is_empty() => Ok(args.iter().copied().fold(0.0, |acc, v| acc.hypot(v))),
        "round" => Ok(one(name, args)?.round()),
        "ceil" => Ok(one(name, args)?.ceil()),
        "floor" => Ok(one(name, args)?.floor()),
        "sign" => Ok(one(name, args)?.signum()),
        "trunc" => Ok(one(name, args)?.trunc()),
        "random" if args.is_empty() => Ok(rand::random::<Float>()),
        _ => Err(CalcError::UnknownFunction(name.to_owned()).into()),
    }
}

/// Evaluate a `calc()` expression's inner text (without the surrounding
/// `calc(`/`)`) against `ctx`.
pub fn evaluate(inner: &str, ctx: &CalcContext) -> Result<Float, Error> {
    let tokens = tokenize(inner, ctx)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        ctx,
    };
    let value = parser.parse_additive()?;
    if parser.pos != parser.tokens.len() {
        return Err(CalcError::TrailingTokens.into());
    }
    Ok(value)
}

#[cfg(test)]
mod test {
    use super::*;

    fn ctx(range: (Float, Float)) -> CalcContext<'static> {
        CalcContext::new(range)
    }

    #[test]
    fn evaluates_arithmetic_with_precedence() {
        assert_eq!(evaluate("1 + 2 * 3", &ctx((0.0, 255.0))).unwrap(), 7.0);
        assert_eq!(evaluate("(1 + 2) * 3", &ctx((0.0, 255.0))).unwrap(), 9.0);
        assert_eq!(evaluate("2 ^ 3 ^ 2", &ctx((0.0, 255.0))).unwrap(), 512.0);
    }

    #[test]
    fn evaluates_functions_and_constants() {
        let result = evaluate("max(1, 2, pow(2, 3))", &ctx((0.0, 255.0))).unwrap();
        assert_eq!(result, 8.0);
        assert!((evaluate("pi", &ctx((0.0, 1.0))).unwrap() - std::f64::consts::PI as Float).abs() < 1e-9);
    }

    #[test]
    fn remaps_percent_against_symmetric_range() {
        assert_eq!(evaluate("50%", &ctx((-125.0, 125.0))).unwrap(), 62.5);
        assert_eq!(evaluate("50%", &ctx((0.0, 255.0))).unwrap(), 127.5);
    }

    #[test]
    fn infinity_short_circuits_to_range_bounds() {
        assert_eq!(evaluate("infinity", &ctx((0.0, 255.0))).unwrap(), 255.0);
        assert_eq!(evaluate("-infinity", &ctx((0.0, 255.0))).unwrap(), 0.0);
    }

    #[test]
    fn relative_calc_rejects_units() {
        let mut context = ctx((0.0, 255.0));
        context.disallow_units = true;
        assert!(matches!(
            evaluate("50%", &context),
            Err(Error::Calc(CalcError::UnitInRelativeCalc))
        ));
    }

    #[test]
    fn unknown_identifier_is_reported() {
        assert!(matches!(
            evaluate("bogus", &ctx((0.0, 1.0))),
            Err(Error::Calc(CalcError::UnknownIdentifier(_)))
        ));
    }
}
