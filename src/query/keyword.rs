use crate::error::ValidationError;

/// Characters with operator meaning inside a `to_tsquery` expression.
const TSQUERY_OPERATORS: [char; 6] = ['&', '|', '!', '(', ')', ':'];

/// Reduce a caller-supplied keyword to a single bare search token.
///
/// Operator characters are removed, surrounding whitespace trimmed, and the
/// result must be one non-empty word.
pub fn sanitize_keyword(raw: &str) -> Result<String, ValidationError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !TSQUERY_OPERATORS.contains(c))
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || cleaned.contains(char::is_whitespace) {
        return Err(ValidationError::InvalidKeyword(raw.trim().to_string()));
    }
    Ok(cleaned.to_string())
}

/// Sanitize every entry of a keyword list. Blank entries are skipped; any
/// other invalid entry rejects the whole list.
pub fn sanitize_keywords<S: AsRef<str>>(raw: &[S]) -> Result<Vec<String>, ValidationError> {
    let keywords = raw
        .iter()
        .map(AsRef::as_ref)
        .filter(|k| !k.trim().is_empty())
        .map(sanitize_keyword)
        .collect::<Result<Vec<_>, _>>()?;

    if keywords.is_empty() {
        return Err(ValidationError::EmptyKeywordList);
    }
    Ok(keywords)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators_are_stripped() {
        assert_eq!(sanitize_keyword("Fed!:ex").unwrap(), "Fedex");
        assert_eq!(sanitize_keyword("  (adó|)  ").unwrap(), "adó");
        assert_eq!(sanitize_keyword("a&b").unwrap(), "ab");
    }

    #[test]
    fn test_multi_word_is_rejected() {
        assert_eq!(
            sanitize_keyword("two words"),
            Err(ValidationError::InvalidKeyword("two words".to_string()))
        );
        assert!(sanitize_keyword("tab\tbed").is_err());
    }

    #[test]
    fn test_empty_after_cleanup_is_rejected() {
        assert!(sanitize_keyword("").is_err());
        assert!(sanitize_keyword("  !&|  ").is_err());
    }

    #[test]
    fn test_keyword_lists() {
        assert_eq!(
            sanitize_keywords(&["Orbán", " ", "Fed!ex"]).unwrap(),
            vec!["Orbán".to_string(), "Fedex".to_string()]
        );
        assert_eq!(
            sanitize_keywords::<&str>(&[]),
            Err(ValidationError::EmptyKeywordList)
        );
        assert_eq!(
            sanitize_keywords(&["", "  "]),
            Err(ValidationError::EmptyKeywordList)
        );
        assert!(sanitize_keywords(&["ok", "not ok"]).is_err());
    }
}
