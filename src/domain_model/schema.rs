use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const MAX_IDENT_LEN: usize = 64;
const MAX_COMMENT_CHARS: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    #[error("invalid identifier {0:?}")]
    InvalidIdentifier(String),
    #[error("invalid column type {0:?}")]
    InvalidColumnType(String),
    #[error("invalid default value {0:?}")]
    InvalidDefault(String),
    #[error("invalid column definition: {0}")]
    Malformed(String),
    #[error("index {0} has no key parts")]
    EmptyIndex(String),
    #[error("column comment exceeds 1024 characters")]
    CommentTooLong,
}

/// A table, column or index name. Only `[A-Za-z0-9_$]` is accepted, so a
/// validated name can be quoted into DDL text without escaping.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident(String);

impl Ident {
    pub fn new(name: impl Into<String>) -> Result<Self, DefinitionError> {
        let name = name.into();
        let valid = !name.is_empty()
            && name.len() <= MAX_IDENT_LEN
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
        if valid {
            Ok(Ident(name))
        } else {
            Err(DefinitionError::InvalidIdentifier(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Ident {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

pub type TableName = Ident;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    Null,
    Number(String),
    Text(String),
    /// Bare SQL keyword or function such as `CURRENT_TIMESTAMP`.
    Expression(String),
}

impl DefaultValue {
    pub fn number(literal: impl Into<String>) -> Result<Self, DefinitionError> {
        let literal = literal.into();
        if is_numeric_literal(&literal) {
            Ok(DefaultValue::Number(literal))
        } else {
            Err(DefinitionError::InvalidDefault(literal))
        }
    }

    pub fn expression(expr: impl Into<String>) -> Result<Self, DefinitionError> {
        let expr = expr.into();
        let valid = !expr.is_empty()
            && expr
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '(' || c == ')');
        if valid {
            Ok(DefaultValue::Expression(expr))
        } else {
            Err(DefinitionError::InvalidDefault(expr))
        }
    }
}

fn is_numeric_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let dots = digits.matches('.').count();
    !digits.is_empty()
        && digits.chars().all(|c| c == '.' || c.is_ascii_digit())
        && dots <= 1
        && !digits.starts_with('.')
        && !digits.ends_with('.')
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnPosition {
    #[default]
    Last,
    First,
    After(Ident),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: Ident,
    pub column_type: String,
    pub nullable: bool,
    pub default: Option<DefaultValue>,
    pub comment: Option<String>,
    pub position: ColumnPosition,
}

impl ColumnSpec {
    pub fn new(name: &str, column_type: &str) -> Result<Self, DefinitionError> {
        Ok(ColumnSpec {
            name: Ident::new(name)?,
            column_type: validate_column_type(column_type)?,
            nullable: true,
            default: None,
            comment: None,
            position: ColumnPosition::Last,
        })
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn default_value(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn comment(mut self, text: impl Into<String>) -> Result<Self, DefinitionError> {
        let text = text.into();
        if text.chars().count() > MAX_COMMENT_CHARS {
            return Err(DefinitionError::CommentTooLong);
        }
        self.comment = Some(text);
        Ok(self)
    }

    pub fn after(mut self, column: &str) -> Result<Self, DefinitionError> {
        self.position = ColumnPosition::After(Ident::new(column)?);
        Ok(self)
    }

    pub fn first(mut self) -> Self {
        self.position = ColumnPosition::First;
        self
    }
}

fn validate_column_type(column_type: &str) -> Result<String, DefinitionError> {
    let normalized = column_type.split_whitespace().collect::<Vec<_>>().join(" ");
    let valid = !normalized.is_empty()
        && normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '(' | ')' | ',' | '_'));
    if valid {
        Ok(normalized)
    } else {
        Err(DefinitionError::InvalidColumnType(column_type.to_string()))
    }
}

#[derive(Debug, PartialEq)]
enum Token {
    Word(String),
    Quoted(String),
}

fn tokenize(input: &str) -> Result<Vec<Token>, DefinitionError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '\'' || c == '"' {
            chars.next();
            let mut literal = String::new();
            let mut closed = false;
            while let Some(ch) = chars.next() {
                if ch == c {
                    if chars.peek() == Some(&c) {
                        chars.next();
                        literal.push(c);
                    } else {
                        closed = true;
                        break;
                    }
                } else {
                    literal.push(ch);
                }
            }
            if !closed {
                return Err(DefinitionError::Malformed("unterminated string".to_string()));
            }
            tokens.push(Token::Quoted(literal));
        } else {
            let mut word = String::new();
            let mut depth = 0usize;
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() && depth == 0 {
                    break;
                }
                match ch {
                    '(' => depth += 1,
                    ')' => depth = depth.saturating_sub(1),
                    _ => {}
                }
                word.push(ch);
                chars.next();
            }
            tokens.push(Token::Word(word));
        }
    }

    Ok(tokens)
}

fn is_keyword(word: &str) -> bool {
    ["NOT", "NULL", "DEFAULT", "COMMENT", "AFTER", "FIRST"]
        .iter()
        .any(|k| word.eq_ignore_ascii_case(k))
}

fn strip_backticks(word: &str) -> &str {
    word.strip_prefix('`')
        .and_then(|w| w.strip_suffix('`'))
        .unwrap_or(word)
}

/// Parses a column definition fragment, e.g. `share_enabled TINYINT default 1`
/// or `currency VARCHAR(10) DEFAULT 'CNY' COMMENT 'code' AFTER include_prepay`.
impl FromStr for ColumnSpec {
    type Err = DefinitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = tokenize(s)?.into_iter().peekable();

        let name = match tokens.next() {
            Some(Token::Word(w)) => strip_backticks(&w).to_string(),
            _ => return Err(DefinitionError::Malformed("missing column name".to_string())),
        };

        let mut type_words = Vec::new();
        while let Some(Token::Word(w)) = tokens.peek() {
            if is_keyword(w) {
                break;
            }
            type_words.push(w.clone());
            tokens.next();
        }
        if type_words.is_empty() {
            return Err(DefinitionError::Malformed(format!(
                "missing type for column {name}"
            )));
        }

        let mut spec = ColumnSpec::new(&name, &type_words.join(" "))?;

        while let Some(token) = tokens.next() {
            let word = match token {
                Token::Word(w) => w.to_ascii_uppercase(),
                Token::Quoted(q) => {
                    return Err(DefinitionError::Malformed(format!("unexpected literal {q:?}")));
                }
            };
            match word.as_str() {
                "NOT" => match tokens.next() {
                    Some(Token::Word(w)) if w.eq_ignore_ascii_case("NULL") => spec = spec.not_null(),
                    _ => return Err(DefinitionError::Malformed("expected NULL after NOT".into())),
                },
                "NULL" => spec.nullable = true,
                "DEFAULT" => {
                    let value = match tokens.next() {
                        Some(Token::Quoted(q)) => DefaultValue::Text(q),
                        Some(Token::Word(w)) if w.eq_ignore_ascii_case("NULL") => DefaultValue::Null,
                        Some(Token::Word(w)) if is_numeric_literal(&w) => DefaultValue::Number(w),
                        Some(Token::Word(w)) => DefaultValue::expression(w)?,
                        None => return Err(DefinitionError::Malformed("missing default".into())),
                    };
                    spec = spec.default_value(value);
                }
                "COMMENT" => match tokens.next() {
                    Some(Token::Quoted(q)) => spec = spec.comment(q)?,
                    _ => return Err(DefinitionError::Malformed("expected literal after COMMENT".into())),
                },
                "AFTER" => match tokens.next() {
                    Some(Token::Word(w)) => spec = spec.after(strip_backticks(&w))?,
                    _ => return Err(DefinitionError::Malformed("expected column after AFTER".into())),
                },
                "FIRST" => spec = spec.first(),
                other => {
                    return Err(DefinitionError::Malformed(format!("unexpected token {other}")));
                }
            }
        }

        Ok(spec)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPart {
    pub column: Ident,
    pub prefix_len: Option<u16>,
}

impl IndexPart {
    pub fn column(name: &str) -> Result<Self, DefinitionError> {
        Ok(IndexPart {
            column: Ident::new(name)?,
            prefix_len: None,
        })
    }

    pub fn prefix(name: &str, len: u16) -> Result<Self, DefinitionError> {
        Ok(IndexPart {
            column: Ident::new(name)?,
            prefix_len: Some(len),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub name: Ident,
    pub parts: Vec<IndexPart>,
    pub unique: bool,
}

impl IndexSpec {
    pub fn new(name: &str, parts: Vec<IndexPart>) -> Result<Self, DefinitionError> {
        if parts.is_empty() {
            return Err(DefinitionError::EmptyIndex(name.to_string()));
        }
        Ok(IndexSpec {
            name: Ident::new(name)?,
            parts,
            unique: false,
        })
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    AddColumn,
    AddIndex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaChange {
    AddColumn(ColumnSpec),
    AddIndex(IndexSpec),
}

impl SchemaChange {
    pub fn kind(&self) -> ChangeKind {
        match self {
            SchemaChange::AddColumn(_) => ChangeKind::AddColumn,
            SchemaChange::AddIndex(_) => ChangeKind::AddIndex,
        }
    }

    /// Name of the column or index whose presence marks the change as applied.
    pub fn object_name(&self) -> &Ident {
        match self {
            SchemaChange::AddColumn(column) => &column.name,
            SchemaChange::AddIndex(index) => &index.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaChangeDescriptor {
    pub target_table: TableName,
    pub change: SchemaChange,
}

impl SchemaChangeDescriptor {
    pub fn add_column(table: &str, column: ColumnSpec) -> Result<Self, DefinitionError> {
        Ok(SchemaChangeDescriptor {
            target_table: Ident::new(table)?,
            change: SchemaChange::AddColumn(column),
        })
    }

    pub fn add_index(table: &str, index: IndexSpec) -> Result<Self, DefinitionError> {
        Ok(SchemaChangeDescriptor {
            target_table: Ident::new(table)?,
            change: SchemaChange::AddIndex(index),
        })
    }

    pub fn kind(&self) -> ChangeKind {
        self.change.kind()
    }
}

impl fmt::Display for SchemaChangeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.change {
            SchemaChange::AddColumn(c) => write!(f, "{}.{} (column)", self.target_table, c.name),
            SchemaChange::AddIndex(i) => write!(f, "{}.{} (index)", self.target_table, i.name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaChangeOutcome {
    Applied,
    AlreadyApplied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevertOutcome {
    Reverted,
    AlreadyAbsent,
}

/// Progress of a single ensure run.
///
/// `NotChecked -> CheckedAbsent -> Applied` or `NotChecked -> CheckedPresent -> NoOp`;
/// any state may move to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvolutionState {
    NotChecked,
    CheckedAbsent,
    CheckedPresent,
    Applied,
    NoOp,
    Failed,
}

impl EvolutionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            EvolutionState::Applied | EvolutionState::NoOp | EvolutionState::Failed
        )
    }

    pub fn after_check(self, present: bool) -> Self {
        match (self, present) {
            (EvolutionState::NotChecked, true) => EvolutionState::CheckedPresent,
            (EvolutionState::NotChecked, false) => EvolutionState::CheckedAbsent,
            _ => EvolutionState::Failed,
        }
    }

    pub fn finish(self) -> Self {
        match self {
            EvolutionState::CheckedAbsent => EvolutionState::Applied,
            EvolutionState::CheckedPresent => EvolutionState::NoOp,
            _ => EvolutionState::Failed,
        }
    }
}
