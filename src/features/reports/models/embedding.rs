//! pgvector column codec.
//!
//! Vectors are exchanged in pgvector's text form `[0.1,0.2,0.3]`: read with
//! `embedding::text`, written with `$n::text::vector`.

use std::fmt;
use std::str::FromStr;

use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef};
use sqlx::{Decode, Encode, Postgres, Type};

#[derive(Debug, Clone, PartialEq)]
pub struct Embedding(pub Vec<f32>);

impl Embedding {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn dimensions(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

impl fmt::Display for Embedding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", value)?;
        }
        f.write_str("]")
    }
}

impl FromStr for Embedding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .trim()
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| format!("Invalid vector literal: {}", s))?;

        if inner.trim().is_empty() {
            return Ok(Self(Vec::new()));
        }

        inner
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<f32>()
                    .map_err(|e| format!("Invalid vector component '{}': {}", part, e))
            })
            .collect::<Result<Vec<f32>, String>>()
            .map(Self)
    }
}

impl Type<Postgres> for Embedding {
    fn type_info() -> PgTypeInfo {
        <String as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<Postgres>>::compatible(ty)
    }
}

impl Encode<'_, Postgres> for Embedding {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        <String as Encode<Postgres>>::encode_by_ref(&self.to_string(), buf)
    }
}

impl<'r> Decode<'r, Postgres> for Embedding {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let text = <&str as Decode<Postgres>>::decode(value)?;
        Ok(text.parse::<Embedding>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_form_matches_pgvector() {
        let embedding = Embedding(vec![0.5, -1.0, 2.25]);
        assert_eq!(embedding.to_string(), "[0.5,-1,2.25]");
    }

    #[test]
    fn test_parse_pgvector_output() {
        let parsed: Embedding = "[0.5,-1,2.25]".parse().unwrap();
        assert_eq!(parsed, Embedding(vec![0.5, -1.0, 2.25]));
        assert_eq!(parsed.dimensions(), 3);

        let spaced: Embedding = " [1, 2] ".parse().unwrap();
        assert_eq!(spaced.as_slice(), &[1.0, 2.0]);
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert!("0.5,1".parse::<Embedding>().is_err());
        assert!("[0.5,abc]".parse::<Embedding>().is_err());
    }
}
