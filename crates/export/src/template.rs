use std::fmt::Write;

use thiserror::Error;

/// Placeholders recognised in page header/footer templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateToken {
    /// `&t`
    Title,
    /// `&a`
    Author,
    /// `&f`
    FileName,
    /// `&F`
    FilePath,
    /// `&p`
    PageNumber,
    /// `&P`
    PageCount,
}

impl TemplateToken {
    fn from_code(code: char) -> Option<Self> {
        let token = match code {
            't' => TemplateToken::Title,
            'a' => TemplateToken::Author,
            'f' => TemplateToken::FileName,
            'F' => TemplateToken::FilePath,
            'p' => TemplateToken::PageNumber,
            'P' => TemplateToken::PageCount,
            _ => return None,
        };
        Some(token)
    }

    fn append_to(self, buffer: &mut String, context: &HeaderFooterContext<'_>) {
        match self {
            TemplateToken::Title => buffer.push_str(context.title),
            TemplateToken::Author => buffer.push_str(context.author),
            TemplateToken::FileName => buffer.push_str(context.file_name),
            TemplateToken::FilePath => buffer.push_str(context.file_path),
            TemplateToken::PageNumber => {
                let _ = write!(buffer, "{}", context.page_number);
            }
            TemplateToken::PageCount => {
                let _ = write!(buffer, "{}", context.page_count);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSegment {
    Literal(String),
    Token(TemplateToken),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// Parsed header or footer, split into left, centre and right slots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderFooterTemplate {
    pub left: Vec<TemplateSegment>,
    pub center: Vec<TemplateSegment>,
    pub right: Vec<TemplateSegment>,
}

impl HeaderFooterTemplate {
    /// Parses `&`-escaped template text.
    ///
    /// `&l`, `&c` and `&r` switch the slot that following text lands in,
    /// `&&` is a literal ampersand and a trailing lone `&` is kept as text.
    pub fn parse(input: &str) -> Result<Self, TemplateError> {
        let mut template = Self::default();
        let mut alignment = Alignment::Left;
        let mut literal = String::new();

        let mut chars = input.chars();
        while let Some(ch) = chars.next() {
            if ch != '&' {
                literal.push(ch);
                continue;
            }
            let Some(code) = chars.next() else {
                literal.push('&');
                break;
            };

            let switch_to = match code {
                '&' => {
                    literal.push('&');
                    continue;
                }
                'l' | 'L' => Some(Alignment::Left),
                'c' | 'C' => Some(Alignment::Center),
                'r' | 'R' => Some(Alignment::Right),
                _ => None,
            };

            template.flush(&mut literal, alignment);
            match switch_to {
                Some(next) => alignment = next,
                None => {
                    let token =
                        TemplateToken::from_code(code).ok_or(TemplateError::UnknownToken(code))?;
                    template.slot_mut(alignment).push(TemplateSegment::Token(token));
                }
            }
        }
        template.flush(&mut literal, alignment);
        Ok(template)
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.center.is_empty() && self.right.is_empty()
    }

    pub fn render(&self, context: &HeaderFooterContext<'_>) -> RenderedHeaderFooter {
        RenderedHeaderFooter {
            left: render_segments(&self.left, context),
            center: render_segments(&self.center, context),
            right: render_segments(&self.right, context),
        }
    }

    fn slot_mut(&mut self, alignment: Alignment) -> &mut Vec<TemplateSegment> {
        match alignment {
            Alignment::Left => &mut self.left,
            Alignment::Center => &mut self.center,
            Alignment::Right => &mut self.right,
        }
    }

    fn flush(&mut self, literal: &mut String, alignment: Alignment) {
        if literal.is_empty() {
            return;
        }
        let text = std::mem::take(literal);
        self.slot_mut(alignment).push(TemplateSegment::Literal(text));
    }
}

fn render_segments(segments: &[TemplateSegment], context: &HeaderFooterContext<'_>) -> String {
    let mut output = String::new();
    for segment in segments {
        match segment {
            TemplateSegment::Literal(text) => output.push_str(text),
            TemplateSegment::Token(token) => token.append_to(&mut output, context),
        }
    }
    output
}

/// Values substituted into a template for one page.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderFooterContext<'a> {
    pub title: &'a str,
    pub author: &'a str,
    pub file_name: &'a str,
    pub file_path: &'a str,
    pub page_number: usize,
    pub page_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedHeaderFooter {
    pub left: String,
    pub center: String,
    pub right: String,
}

impl RenderedHeaderFooter {
    pub fn is_blank(&self) -> bool {
        self.left.is_empty() && self.center.is_empty() && self.right.is_empty()
    }

    pub fn slots(&self) -> [(Alignment, &str); 3] {
        [
            (Alignment::Left, self.left.as_str()),
            (Alignment::Center, self.center.as_str()),
            (Alignment::Right, self.right.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unknown header/footer token '&{0}'")]
    UnknownToken(char),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> HeaderFooterContext<'static> {
        HeaderFooterContext {
            title: "Log Export",
            author: "Unknown",
            file_name: "language_check.log",
            file_path: "/work/language_check.log",
            page_number: 2,
            page_count: 5,
        }
    }

    #[test]
    fn parse_alignment_and_tokens() {
        let template = HeaderFooterTemplate::parse("&lBy &a&c&t&rPage &p").unwrap();
        assert_eq!(
            template.left,
            vec![
                TemplateSegment::Literal("By ".into()),
                TemplateSegment::Token(TemplateToken::Author)
            ]
        );
        assert_eq!(template.center, vec![TemplateSegment::Token(TemplateToken::Title)]);
        assert_eq!(
            template.right,
            vec![
                TemplateSegment::Literal("Page ".into()),
                TemplateSegment::Token(TemplateToken::PageNumber)
            ]
        );
    }

    #[test]
    fn render_fills_every_slot() {
        let template = HeaderFooterTemplate::parse("&l&f && more&c&p / &P&r&F").unwrap();
        let rendered = template.render(&context());
        assert_eq!(rendered.left, "language_check.log & more");
        assert_eq!(rendered.center, "2 / 5");
        assert_eq!(rendered.right, "/work/language_check.log");
    }

    #[test]
    fn trailing_ampersand_is_literal() {
        let template = HeaderFooterTemplate::parse("Q&").unwrap();
        assert_eq!(template.left, vec![TemplateSegment::Literal("Q&".into())]);
    }

    #[test]
    fn empty_template_renders_blank() {
        let template = HeaderFooterTemplate::parse("").unwrap();
        assert!(template.is_empty());
        assert!(template.render(&context()).is_blank());
    }

    #[test]
    fn unknown_token() {
        match HeaderFooterTemplate::parse("&x") {
            Err(TemplateError::UnknownToken('x')) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
