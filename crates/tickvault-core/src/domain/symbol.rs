use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_TICKER_LEN: usize = 15;

/// Canonical (trimmed, uppercase) ticker symbol.
///
/// Every store key and every cache entry is addressed by a `Symbol`, so `voo`,
/// ` VOO ` and `Voo` all resolve to the same entry. Only ASCII letters, digits,
/// `.` and `-` are accepted, which also keeps symbols safe to use as file stems.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let canonical = input.trim().to_ascii_uppercase();

        let mut chars = canonical.chars();
        match chars.next() {
            None => return Err(ValidationError::EmptySymbol),
            Some(ch) if !ch.is_ascii_alphabetic() => {
                return Err(ValidationError::SymbolInvalidStart { ch })
            }
            Some(_) => {}
        }

        if let Some((index, ch)) = canonical
            .char_indices()
            .find(|(_, ch)| !(ch.is_ascii_alphanumeric() || *ch == '.' || *ch == '-'))
        {
            return Err(ValidationError::SymbolInvalidChar { ch, index });
        }

        if canonical.len() > MAX_TICKER_LEN {
            return Err(ValidationError::SymbolTooLong {
                len: canonical.len(),
                max: MAX_TICKER_LEN,
            });
        }

        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}
