use std::iter::Peekable;
use std::str::Chars;

use log::trace;

use crate::mistakes::LexError;

use super::{Lexeme, Tokens};

/// 词法分析主体
pub struct Analysis<'a> {
    /// 表达式字符迭代器
    iter_c: Peekable<Chars<'a>>,
    /// 下一个字符的偏移量
    c_offset: usize,
    /// 出错后不再继续
    failed: bool,
}

impl Iterator for Analysis<'_> {
    type Item = Result<Lexeme, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let r = self.next_token();
        if let Some(Err(_)) = &r {
            self.failed = true;
        }
        r
    }
}

impl<'a> Analysis<'a> {
    pub fn new(source: &'a str) -> Self {
        Analysis {
            iter_c: source.chars().peekable(),
            c_offset: 0,
            failed: false,
        }
    }

    fn readch(&mut self) -> Option<char> {
        let c = self.iter_c.next()?;
        self.c_offset += 1;
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.iter_c.peek().copied()
    }

    /// 连续读取满足条件的字符
    fn read_while(&mut self, buf: &mut String, pred: fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            buf.push(c);
            self.readch();
        }
    }

    /// 至少读入一位数字
    fn read_digits(&mut self, buf: &mut String) -> bool {
        let before = buf.len();
        self.read_while(buf, |c| c.is_ascii_digit());
        buf.len() > before
    }

    /// 可选的指数部分 e[+-]digits，有 e 而没有数字时返回 false
    fn read_exponent(&mut self, buf: &mut String) -> bool {
        if !matches!(self.peek(), Some('e' | 'E')) {
            return true;
        }
        buf.extend(self.readch());
        if let Some(sign @ ('+' | '-')) = self.peek() {
            buf.push(sign);
            self.readch();
        }
        self.read_digits(buf)
    }

    pub fn next_token(&mut self) -> Option<Result<Lexeme, LexError>> {
        while self.peek()?.is_whitespace() {
            self.readch();
        }
        let start = self.c_offset;
        let c = self.readch()?;
        let tok = match c {
            '+' => Tokens::Plus,
            '-' => Tokens::Minus,
            '*' => Tokens::Mul,
            '/' => Tokens::Div,
            '(' => Tokens::LeftC,
            ')' => Tokens::RightC,
            c if c.is_ascii_digit() => {
                let mut s = String::from(c);
                self.read_while(&mut s, |c| c.is_ascii_digit());
                if self.peek() == Some('.') {
                    s.push('.');
                    self.readch();
                    if !self.read_digits(&mut s) {
                        return Some(Err(LexError::MalformedNumber { text: s, offset: start }));
                    }
                }
                match self.read_exponent(&mut s) {
                    true => Tokens::Num(s),
                    false => return Some(Err(LexError::MalformedNumber { text: s, offset: start })),
                }
            }
            // .5
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                let mut s = String::from('.');
                self.read_while(&mut s, |c| c.is_ascii_digit());
                match self.read_exponent(&mut s) {
                    true => Tokens::Num(s),
                    false => return Some(Err(LexError::MalformedNumber { text: s, offset: start })),
                }
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut s = String::from(c);
                self.read_while(&mut s, |c| c.is_alphanumeric() || c == '_');
                Tokens::Identity(s)
            }
            other => return Some(Err(LexError::UnknownChar { ch: other, offset: start })),
        };
        trace!("lex {} at {}", tok.dump(), start);
        Some(Ok(Lexeme::new(tok, start)))
    }
}

/// 整个表达式切分成词法单元
pub fn tokenize(source: &str) -> Result<Vec<Lexeme>, LexError> {
    Analysis::new(source).collect()
}
