use {
    once_cell::sync::Lazy,
    regex::Regex,
};

// a url stops at `)` so a link target like `[a](http://x)` still closes
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"http[^\s)]*").unwrap());
// label and target are both dropped, not just the markup
static MARKDOWN_LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]\(.*?\)").unwrap());
static NON_LETTER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z\s]").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Turns raw submission text into a lowercase, letters-only, single-spaced
/// string. Missing text becomes an empty string.
///
/// Steps run in a fixed order: urls, markdown links, lowercase, non-letters,
/// whitespace collapse, trim. Running them in another order gives different
/// results for urls that contain brackets.
pub fn normalize(text: Option<&str>) -> String {
    let mut cleaned = match text {
        Some(v) => clean_once(v),
        None => return String::new(),
    };

    // lowercasing or dropping punctuation can assemble a new `http` token.
    // Repeating until none is left also drops a plain `http` word and any
    // word starting with `HTTP`, so normalized text never contains `http`.
    while URL_RE.is_match(&cleaned) {
        cleaned = clean_once(&cleaned);
    }

    cleaned
}

fn clean_once(text: &str) -> String {
    let text = URL_RE.replace_all(text, "");
    let text = MARKDOWN_LINK_RE.replace_all(&text, "");
    let text = text.to_lowercase();
    let text = NON_LETTER_RE.replace_all(&text, "");
    let text = WHITESPACE_RE.replace_all(&text, " ");

    text.trim().to_owned()
}

/// Whether `text` already looks like `normalize` output.
pub fn is_normalized(text: &str) -> bool {
    !text.starts_with(' ')
        && !text.ends_with(' ')
        && !text.contains("  ")
        && text.chars().all(|c| c.is_ascii_lowercase() || c == ' ')
}
