use serde::{Deserialize, Serialize};

/// One entry of the scan universe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    /// Exchange code, e.g. "2330" or "6488.TWO".
    pub code: String,
    pub display_name: String,
}

impl SymbolInfo {
    pub fn new(code: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display_name: display_name.into(),
        }
    }

    /// Parse a `code:name,code:name` list. Entries without a name reuse the code.
    pub fn parse_list(raw: &str) -> Vec<SymbolInfo> {
        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .filter_map(|entry| {
                let (code, name) = match entry.split_once(':') {
                    Some((code, name)) => (code.trim(), name.trim()),
                    None => (entry, entry),
                };
                if code.is_empty() {
                    return None;
                }
                let name = if name.is_empty() { code } else { name };
                Some(SymbolInfo::new(code, name))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        let list = SymbolInfo::parse_list("2454:聯發科, 2324:仁寶 ,8299");
        assert_eq!(
            list,
            vec![
                SymbolInfo::new("2454", "聯發科"),
                SymbolInfo::new("2324", "仁寶"),
                SymbolInfo::new("8299", "8299"),
            ]
        );
    }

    #[test]
    fn test_parse_list_skips_blank_entries() {
        assert!(SymbolInfo::parse_list(" , ,").is_empty());
        assert_eq!(SymbolInfo::parse_list(":name,3017:").len(), 1);
    }
}
