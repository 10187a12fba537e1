use crate::position::Span;

const OPEN: &[u8] = b"${";

/// One `${...}` occurrence inside a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubExpression {
    /// The whole occurrence, delimiters included.
    pub text: String,
    /// Where `text` sits in the parsed input.
    pub span: Span,
    /// Where the expression between the delimiters sits in the parsed input.
    pub body: Span,
}

impl SubExpression {
    pub fn begin(&self) -> usize {
        self.span.start()
    }

    pub fn end(&self) -> usize {
        self.span.end()
    }

    /// The expression between `${` and `}`.
    pub fn body_text(&self) -> &str {
        &self.text[OPEN.len()..self.text.len() - 1]
    }
}

/// Literal segments interleaved with sub-expression occurrences.
///
/// `literals.len() == expressions.len() + 1` always holds: segment `i`
/// precedes occurrence `i`, and the last segment trails the last occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParseResult {
    pub literals: Vec<String>,
    pub expressions: Vec<SubExpression>,
}

/// How the orchestrator should treat a parsed template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateShape<'a> {
    /// No occurrences; the template is a single literal segment.
    Literal(&'a str),
    /// `${...}` and nothing else.
    Wrapper(&'a SubExpression),
    /// Anything else: literal text mixed with one or more occurrences.
    Mixed,
}

impl TemplateParseResult {
    pub fn shape(&self) -> TemplateShape<'_> {
        match self.expressions.as_slice() {
            [] => TemplateShape::Literal(&self.literals[0]),
            [only] if self.literals.iter().all(String::is_empty) => TemplateShape::Wrapper(only),
            _ => TemplateShape::Mixed,
        }
    }
}

/// Split `text` into literal segments and `${...}` occurrences.
///
/// Total: text without occurrences is one literal segment, an unterminated
/// `${` is literal text, and `\${` is an escaped literal `${`. Offsets are
/// byte offsets into `text`.
pub fn parse_template(text: &str) -> TemplateParseResult {
    let bytes = text.as_bytes();
    let mut literals = Vec::new();
    let mut expressions = Vec::new();
    let mut current = String::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' && bytes[i + 1..].starts_with(OPEN) {
            current.push_str(&text[literal_start..i]);
            current.push_str("${");
            i += 1 + OPEN.len();
            literal_start = i;
            continue;
        }

        if bytes[i..].starts_with(OPEN) {
            let Some(close) = find_closing_brace(bytes, i + OPEN.len()) else {
                // Only the opener is literal; the rest is scanned as usual.
                i += OPEN.len();
                continue;
            };
            current.push_str(&text[literal_start..i]);
            literals.push(core::mem::take(&mut current));
            expressions.push(SubExpression {
                text: text[i..=close].to_string(),
                span: Span::new(i, close + 1),
                body: Span::new(i + OPEN.len(), close),
            });
            i = close + 1;
            literal_start = i;
            continue;
        }

        i += 1;
    }

    current.push_str(&text[literal_start..]);
    literals.push(current);

    TemplateParseResult {
        literals,
        expressions,
    }
}

/// Index of the `}` closing an occurrence whose body starts at `from`.
/// Braces nest; braces inside quoted strings are ignored.
fn find_closing_brace(bytes: &[u8], from: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut j = from;

    while j < bytes.len() {
        let b = bytes[j];
        match quote {
            Some(_) if b == b'\\' => j += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'\'' | b'"' => quote = Some(b),
                b'{' => depth += 1,
                b'}' if depth == 0 => return Some(j),
                b'}' => depth -= 1,
                _ => {}
            },
        }
        j += 1;
    }

    None
}
