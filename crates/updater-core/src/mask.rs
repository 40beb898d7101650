use std::sync::OnceLock;

use regex::Regex;

fn patterns() -> &'static [(Regex, &'static str)] {
    static PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // user:token@host in remote URLs
            (r"(https?://)[^/\s:@]+:[^/\s@]+@", "${1}[MASKED]@"),
            (r"Bearer\s+[a-zA-Z0-9._\-]+", "Bearer [MASKED]"),
            (
                r"(?i)(password|passwd|secret|token|api_key|apikey)=[^\s&]+",
                "$1=[MASKED]",
            ),
        ]
        .into_iter()
        .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, replacement)))
        .collect()
    })
}

/// Mask credentials in tool output before it leaves the host.
pub fn mask_secrets(text: &str) -> String {
    let mut result = text.to_string();
    for (re, replacement) in patterns() {
        result = re.replace_all(&result, *replacement).into_owned();
    }
    result
}

/// Secrets shorter than this are left in place; replacing every occurrence of a
/// one- or two-letter value would destroy the surrounding text.
const MIN_LITERAL_SECRET_LEN: usize = 4;

/// [`mask_secrets`] plus literal removal of a known secret value.
pub fn mask_secrets_with(text: &str, secret: &str) -> String {
    let masked = mask_secrets(text);
    if secret.chars().count() < MIN_LITERAL_SECRET_LEN {
        masked
    } else {
        masked.replace(secret, "[MASKED]")
    }
}
