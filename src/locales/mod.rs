//! Language resolution for backend requests

/// Primary language subtag of a locale string
///
/// `"fr-CH"` and `"fr_CH.UTF-8"` both give `"fr"`.
pub fn primary_subtag(locale: &str) -> &str {
    locale
        .split(|c| c == '-' || c == '_' || c == '.')
        .next()
        .unwrap_or(locale)
        .trim()
}

/// Language sent to the backends: the explicit language if set, the host
/// language otherwise, reduced to its primary subtag and lowercased
pub fn resolve_lang(explicit: Option<&str>, host: &str) -> String {
    let locale = explicit
        .filter(|lang| !primary_subtag(lang).is_empty())
        .unwrap_or(host);
    primary_subtag(locale).to_lowercase()
}

/// Host language from the POSIX locale environment
pub fn host_lang_from_env() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|value| primary_subtag(&value).to_lowercase())
        .find(|lang| !lang.is_empty() && lang != "c" && lang != "posix")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_subtag() {
        assert_eq!(primary_subtag("fr-CH"), "fr");
        assert_eq!(primary_subtag("de_CH.UTF-8"), "de");
        assert_eq!(primary_subtag("it"), "it");
        assert_eq!(primary_subtag(""), "");
    }

    #[test]
    fn test_resolve_lang() {
        assert_eq!(resolve_lang(Some("fr-CH"), "de"), "fr");
        assert_eq!(resolve_lang(None, "de-CH"), "de");
        assert_eq!(resolve_lang(Some(""), "it"), "it");
        assert_eq!(resolve_lang(Some("RM"), "de"), "rm");
    }
}
