//! Query-string helpers shared by the per-entity filter structs.

use serde::{Deserialize, Deserializer};

/// Split raw values on commas, trimming and dropping empty parts.
///
/// `["java, rust", "go"]` and `["java", "rust", "go"]` both normalize to
/// `["java", "rust", "go"]`.
pub fn split_values<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .flat_map(|value| {
            value
                .as_ref()
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_owned)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// `deserialize_with` target for multi-value query parameters.
///
/// Accepts repeated keys (`?skills=a&skills=b`), comma-separated values
/// (`?skills=a,b`) or a mix of both.
pub fn multi_value<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    Ok(split_values(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "multi_value")]
        skills: Vec<String>,
    }

    #[test]
    fn test_split_values_mixed() {
        assert_eq!(
            split_values(["java, rust", " ", "go,,"]),
            vec!["java", "rust", "go"]
        );
    }

    #[test]
    fn test_repeated_keys() {
        let probe: Probe = serde_html_form::from_str("skills=Java&skills=Go").unwrap();
        assert_eq!(probe.skills, vec!["Java", "Go"]);
    }

    #[test]
    fn test_comma_separated_single_key() {
        let probe: Probe = serde_html_form::from_str("skills=Java,Go").unwrap();
        assert_eq!(probe.skills, vec!["Java", "Go"]);
    }

    #[test]
    fn test_missing_key_is_empty() {
        let probe: Probe = serde_html_form::from_str("").unwrap();
        assert!(probe.skills.is_empty());
    }
}
