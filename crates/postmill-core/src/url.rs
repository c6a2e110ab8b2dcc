//! URL joining, slug normalization and data-key hashing.

/// Join URL segments with single slashes.
///
/// Empty segments are skipped, runs of slashes collapse to one (the `//` of a
/// scheme such as `https://` is kept) and a trailing slash is dropped unless
/// the result is the root.
///
/// ```
/// use postmill_core::url::normalize_url;
///
/// assert_eq!(normalize_url(&["/", "blog"]), "/blog");
/// assert_eq!(normalize_url(&["/blog/", "/page/2"]), "/blog/page/2");
/// assert_eq!(normalize_url(&["https://example.com/", "blog"]), "https://example.com/blog");
/// ```
pub fn normalize_url(parts: &[&str]) -> String {
    let mut joined = String::new();
    for part in parts.iter().filter(|p| !p.is_empty()) {
        if !joined.is_empty() && !joined.ends_with('/') {
            joined.push('/');
        }
        joined.push_str(part);
    }

    let mut out = String::with_capacity(joined.len());
    for c in joined.chars() {
        if c == '/' && out.ends_with('/') && !out.ends_with(":/") {
            continue;
        }
        out.push(c);
    }

    while out.len() > 1 && out.ends_with('/') && !out.ends_with("://") {
        out.pop();
    }

    if out.is_empty() { "/".to_string() } else { out }
}

/// Normalize a human-readable label into a kebab-case slug.
///
/// Accented Latin letters are reduced to ASCII and apostrophes are removed.
/// The label is then split into words at non-alphanumeric characters,
/// lower-to-upper case changes, acronym ends (`XMLHttp` → `xml`, `http`) and
/// letter/digit changes, except that ordinals such as `1st` or `22nd` stay
/// one word. Words are lowercased and joined with `-`. Letters of other
/// scripts are kept as they are. Applying it to its own output is a no-op.
pub fn slugify(label: &str) -> String {
    let chars: Vec<char> = deburr(label)
        .chars()
        .filter(|c| !matches!(c, '\'' | '\u{2019}'))
        .collect();

    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            i += 1;
            continue;
        }

        let prev = current.chars().last();

        if c.is_ascii_digit()
            && !prev.is_some_and(|p| p.is_ascii_digit())
            && let Some(len) = ordinal_len(&chars[i..])
        {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            words.push(chars[i..i + len].iter().collect());
            i += len;
            continue;
        }

        if let Some(prev) = prev {
            let next = chars.get(i + 1).copied();
            let camel = prev.is_ascii_lowercase() && c.is_ascii_uppercase();
            let acronym = prev.is_ascii_uppercase()
                && c.is_ascii_uppercase()
                && next.is_some_and(|n| n.is_ascii_lowercase());
            let digits = prev.is_ascii_digit() != c.is_ascii_digit();

            if camel || acronym || digits {
                words.push(std::mem::take(&mut current));
            }
        }

        current.push(c);
        i += 1;
    }

    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Reduce Latin-1 Supplement and Latin Extended-A letters to ASCII and drop
/// combining marks.
fn deburr(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        match c {
            '\u{0300}'..='\u{036f}' | '\u{fe20}'..='\u{fe2f}' | '\u{20d0}'..='\u{20ff}' => {}
            '\u{00c0}'..='\u{017f}' if c.is_alphabetic() => {
                out.push_str(deunicode::deunicode_char(c).unwrap_or_default());
            }
            _ => out.push(c),
        }
    }
    out
}

/// Length of an ordinal (`1st`, `2ND`, `24th`) at the start of `chars`.
///
/// The suffix must agree with the last digit and be followed by a word
/// boundary or a change of case.
fn ordinal_len(chars: &[char]) -> Option<usize> {
    let digits = chars.iter().take_while(|c| c.is_ascii_digit()).count();
    let last = *chars.get(digits.checked_sub(1)?)?;
    let suffix: String = chars.get(digits..digits + 2)?.iter().collect();

    let expected = match last {
        '1' => "st",
        '2' => "nd",
        '3' => "rd",
        _ => "th",
    };
    let upper = if suffix == expected {
        false
    } else if suffix == expected.to_ascii_uppercase() {
        true
    } else {
        return None;
    };

    let end = digits + 2;
    let boundary = match chars.get(end) {
        None => true,
        Some(&n) if !n.is_alphanumeric() => true,
        Some(&n) if upper => n.is_ascii_lowercase(),
        Some(&n) => n.is_ascii_uppercase(),
    };

    boundary.then_some(end)
}

/// Deterministic file stem for a data blob keyed by `input`.
///
/// The root path maps to `index`; anything else becomes its slug followed by
/// a short blake3 digest of the untouched input, so inputs that slugify
/// identically still get distinct keys.
pub fn data_key(input: &str) -> String {
    if input == "/" {
        return "index".to_string();
    }

    let digest = blake3::hash(input.as_bytes());
    let short = hex::encode(&digest.as_bytes()[..4]);
    let slug = slugify(input);

    if slug.is_empty() {
        short
    } else {
        format!("{slug}-{short}")
    }
}
