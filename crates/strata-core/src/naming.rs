//! Entity name normalization
//!
//! Path segments may name a type in several spellings: `Person`, `person`,
//! `people`. Type urls use the plural snake-case form (`/linked_people`).

/// Irregular plurals (singular, plural)
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
];

/// `CamelCase` to `snake_case`
#[must_use]
pub fn to_underscore(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

/// Plural of a lower-case word; only the last `_` segment is inflected
#[must_use]
pub fn pluralize(word: &str) -> String {
    let (head, last) = split_last(word);
    if let Some((_, plural)) = IRREGULAR.iter().find(|(s, _)| *s == last) {
        return format!("{head}{plural}");
    }
    let inflected = if last.ends_with('s')
        || last.ends_with('x')
        || last.ends_with('z')
        || last.ends_with("ch")
        || last.ends_with("sh")
    {
        format!("{last}es")
    } else if last.ends_with('y') && !ends_with_vowel_y(last) {
        format!("{}ies", &last[..last.len() - 1])
    } else {
        format!("{last}s")
    };
    format!("{head}{inflected}")
}

/// Singular of a lower-case word; inverse of [`pluralize`] for its outputs
#[must_use]
pub fn singularize(word: &str) -> String {
    let (head, last) = split_last(word);
    if let Some((singular, _)) = IRREGULAR.iter().find(|(_, p)| *p == last) {
        return format!("{head}{singular}");
    }
    let inflected = if let Some(stem) = last.strip_suffix("ies") {
        format!("{stem}y")
    } else if let Some(stem) = last
        .strip_suffix("es")
        .filter(|stem| ["s", "x", "z", "ch", "sh"].iter().any(|e| stem.ends_with(e)))
    {
        stem.to_string()
    } else if let Some(stem) = last.strip_suffix('s').filter(|stem| !stem.ends_with('s')) {
        stem.to_string()
    } else {
        last.to_string()
    };
    format!("{head}{inflected}")
}

/// Check if a path segment names `type_name`
#[must_use]
pub fn matches_type(type_name: &str, segment: &str) -> bool {
    if type_name == segment {
        return true;
    }
    let segment = segment.to_lowercase();
    let snake = to_underscore(type_name);
    segment == type_name.to_lowercase() || segment == snake || segment == pluralize(&snake)
}

/// Url of a type's collection resource
#[must_use]
pub fn type_url(type_name: &str) -> String {
    format!("/{}", pluralize(&to_underscore(type_name)))
}

fn split_last(word: &str) -> (&str, &str) {
    match word.rfind('_') {
        Some(pos) => (&word[..=pos], &word[pos + 1..]),
        None => ("", word),
    }
}

fn ends_with_vowel_y(word: &str) -> bool {
    let mut chars = word.chars().rev();
    chars.next();
    matches!(chars.next(), Some('a' | 'e' | 'i' | 'o' | 'u'))
}
