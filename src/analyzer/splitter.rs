//! Statement splitting over raw SQL text.
//!
//! The scanner understands single- and double-quoted strings, `E'…'`
//! escapes, dollar-quoted bodies, line and nested block comments, and
//! parenthesis depth; statements end at top-level semicolons.

/// One raw statement, leading comment lines included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStatement {
    pub text: String,
    /// 1-based line where the statement's text begins.
    pub line: usize,
}

#[derive(PartialEq)]
enum State {
    Normal,
    SingleQuote { escape_string: bool },
    DoubleQuote,
    DollarQuote { tag: String },
    LineComment,
    BlockComment { depth: u32 },
}

pub fn split_statements(sql: &str) -> Vec<RawStatement> {
    let chars: Vec<char> = sql.chars().collect();
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut state = State::Normal;
    let mut paren_depth: i32 = 0;
    let mut line = 1usize;
    let mut statement_line = 1usize;
    let mut i = 0usize;

    let mut flush = |current: &mut String, statement_line: usize| {
        let text = current.trim();
        if !text.is_empty() && !is_comment_only(text) {
            statements.push(RawStatement {
                text: text.to_string(),
                line: statement_line,
            });
        }
        current.clear();
    };

    while i < chars.len() {
        let c = chars[i];
        if c == '\n' {
            line += 1;
        }
        if current.trim().is_empty() && !c.is_whitespace() {
            statement_line = line;
        }

        match &mut state {
            State::Normal => match c {
                '\'' => {
                    let escape_string = current
                        .chars()
                        .last()
                        .map(|p| p == 'E' || p == 'e')
                        .unwrap_or(false);
                    state = State::SingleQuote { escape_string };
                    current.push(c);
                }
                '"' => {
                    state = State::DoubleQuote;
                    current.push(c);
                }
                '$' => {
                    if let Some(tag) = read_dollar_tag(&chars, i) {
                        current.push_str(&tag);
                        i += tag.chars().count();
                        state = State::DollarQuote {
                            tag: tag.clone(),
                        };
                        continue;
                    }
                    current.push(c);
                }
                '-' if chars.get(i + 1) == Some(&'-') => {
                    state = State::LineComment;
                    current.push(c);
                }
                '/' if chars.get(i + 1) == Some(&'*') => {
                    state = State::BlockComment { depth: 1 };
                    current.push(c);
                    current.push('*');
                    i += 2;
                    continue;
                }
                '(' => {
                    paren_depth += 1;
                    current.push(c);
                }
                ')' => {
                    paren_depth -= 1;
                    current.push(c);
                }
                ';' if paren_depth <= 0 => {
                    flush(&mut current, statement_line);
                }
                _ => current.push(c),
            },
            State::SingleQuote { escape_string } => {
                current.push(c);
                if *escape_string && c == '\\' {
                    if let Some(&next) = chars.get(i + 1) {
                        current.push(next);
                        if next == '\n' {
                            line += 1;
                        }
                        i += 2;
                        continue;
                    }
                } else if c == '\'' {
                    // '' stays inside the literal
                    if chars.get(i + 1) == Some(&'\'') {
                        current.push('\'');
                        i += 2;
                        continue;
                    }
                    state = State::Normal;
                }
            }
            State::DoubleQuote => {
                current.push(c);
                if c == '"' {
                    if chars.get(i + 1) == Some(&'"') {
                        current.push('"');
                        i += 2;
                        continue;
                    }
                    state = State::Normal;
                }
            }
            State::DollarQuote { tag } => {
                if c == '$' {
                    let tag_chars: Vec<char> = tag.chars().collect();
                    if chars[i..].starts_with(&tag_chars) {
                        current.push_str(tag);
                        i += tag_chars.len();
                        state = State::Normal;
                        continue;
                    }
                }
                current.push(c);
            }
            State::LineComment => {
                current.push(c);
                if c == '\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment { depth } => {
                if c == '*' && chars.get(i + 1) == Some(&'/') {
                    *depth -= 1;
                    current.push('*');
                    current.push('/');
                    i += 2;
                    if *depth == 0 {
                        state = State::Normal;
                    }
                    continue;
                }
                if c == '/' && chars.get(i + 1) == Some(&'*') {
                    *depth += 1;
                    current.push('/');
                    current.push('*');
                    i += 2;
                    continue;
                }
                current.push(c);
            }
        }
        i += 1;
    }
    flush(&mut current, statement_line);

    statements
}

/// At `position` (a `$`), read a `$tag$` opener if one is there.
fn read_dollar_tag(chars: &[char], position: usize) -> Option<String> {
    let mut tag = String::from("$");
    let mut i = position + 1;
    while i < chars.len() {
        let c = chars[i];
        if c == '$' {
            tag.push('$');
            return Some(tag);
        }
        if c.is_alphanumeric() || c == '_' {
            tag.push(c);
            i += 1;
        } else {
            return None;
        }
    }
    None
}

fn is_comment_only(text: &str) -> bool {
    text.lines().all(|line| {
        let trimmed = line.trim();
        trimmed.is_empty() || trimmed.starts_with("--")
    })
}

/// Replace comments and dollar-quoted bodies with spaces so reference
/// extraction only sees real statement text.
pub fn strip_noise(sql: &str) -> String {
    let chars: Vec<char> = sql.chars().collect();
    let mut out = String::with_capacity(sql.len());
    let mut state = State::Normal;
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];
        match &mut state {
            State::Normal => match c {
                '\'' => {
                    state = State::SingleQuote {
                        escape_string: out.ends_with(['E', 'e']),
                    };
                    out.push(c);
                }
                '"' => {
                    state = State::DoubleQuote;
                    out.push(c);
                }
                '$' => {
                    if let Some(tag) = read_dollar_tag(&chars, i) {
                        i += tag.chars().count();
                        state = State::DollarQuote { tag };
                        out.push(' ');
                        continue;
                    }
                    out.push(c);
                }
                '-' if chars.get(i + 1) == Some(&'-') => {
                    state = State::LineComment;
                }
                '/' if chars.get(i + 1) == Some(&'*') => {
                    state = State::BlockComment { depth: 1 };
                    i += 2;
                    continue;
                }
                _ => out.push(c),
            },
            State::SingleQuote { escape_string } => {
                out.push(c);
                if *escape_string && c == '\\' {
                    if chars.get(i + 1).is_some() {
                        out.push(chars[i + 1]);
                        i += 2;
                        continue;
                    }
                } else if c == '\'' {
                    if chars.get(i + 1) == Some(&'\'') {
                        out.push('\'');
                        i += 2;
                        continue;
                    }
                    state = State::Normal;
                }
            }
            State::DoubleQuote => {
                out.push(c);
                if c == '"' {
                    state = State::Normal;
                }
            }
            State::DollarQuote { tag } => {
                if c == '$' {
                    let tag_chars: Vec<char> = tag.chars().collect();
                    if chars[i..].starts_with(&tag_chars) {
                        i += tag_chars.len();
                        state = State::Normal;
                        out.push(' ');
                        continue;
                    }
                }
            }
            State::LineComment => {
                if c == '\n' {
                    out.push('\n');
                    state = State::Normal;
                }
            }
            State::BlockComment { depth } => {
                if c == '*' && chars.get(i + 1) == Some(&'/') {
                    *depth -= 1;
                    i += 2;
                    if *depth == 0 {
                        state = State::Normal;
                        out.push(' ');
                    }
                    continue;
                }
                if c == '/' && chars.get(i + 1) == Some(&'*') {
                    *depth += 1;
                    i += 2;
                    continue;
                }
            }
        }
        i += 1;
    }
    out
}
