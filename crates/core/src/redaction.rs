use std::sync::OnceLock;

/// Short preview of an API key for logs and status output.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 11 {
        let head: String = chars[..7].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}

/// Strip API keys from text before it is logged.
pub fn sanitize_text(input: &str) -> String {
    static JSON_KEY_RE: OnceLock<regex::Regex> = OnceLock::new();
    static OPENAI_KEY_RE: OnceLock<regex::Regex> = OnceLock::new();
    static GEMINI_KEY_RE: OnceLock<regex::Regex> = OnceLock::new();

    let json_key = JSON_KEY_RE.get_or_init(|| {
        regex::Regex::new(r#"(?i)"(api_?key|[a-z]+_api_key)"\s*:\s*"[^"]*""#)
            .expect("valid json key regex")
    });
    let openai_key = OPENAI_KEY_RE.get_or_init(|| {
        regex::Regex::new(r"\bsk-[A-Za-z0-9_\-]{8,}").expect("valid openai key regex")
    });
    let gemini_key = GEMINI_KEY_RE.get_or_init(|| {
        regex::Regex::new(r"\bAIza[0-9A-Za-z_\-]{8,}").expect("valid gemini key regex")
    });

    let mut out = json_key
        .replace_all(input, r#""$1":"[REDACTED]""#)
        .to_string();
    out = openai_key.replace_all(&out, "sk-[REDACTED]").to_string();
    out = gemini_key.replace_all(&out, "AIza[REDACTED]").to_string();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key("sk-1234567890abcdef"), "sk-1234...cdef");
        assert_eq!(mask_api_key("short"), "***");
        assert_eq!(mask_api_key("exactly11ch"), "***");
    }

    #[test]
    fn test_sanitize_json_payload() {
        let input = r#"{"apiKey":"my-secret","provider":"gemini"}"#;
        let out = sanitize_text(input);
        assert_eq!(out, r#"{"apiKey":"[REDACTED]","provider":"gemini"}"#);
    }

    #[test]
    fn test_sanitize_config_keys() {
        let input = r#"{"openai_api_key": "whatever", "llm_provider": "auto"}"#;
        let out = sanitize_text(input);
        assert!(out.contains(r#""openai_api_key":"[REDACTED]""#));
        assert!(!out.contains("whatever"));
    }

    #[test]
    fn test_sanitize_bare_keys() {
        let out = sanitize_text("using sk-ABCDEF123456 and AIzaSyA1234567890");
        assert_eq!(out, "using sk-[REDACTED] and AIza[REDACTED]");
    }

    #[test]
    fn test_sanitize_leaves_plain_text() {
        let input = "How do I fillet an edge?";
        assert_eq!(sanitize_text(input), input);
    }
}
