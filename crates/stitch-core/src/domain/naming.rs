//! Identifier casing shared by the planners.
//!
//! Entity names arrive in PascalCase (`PaymentMethod`) and field names in
//! snake_case (`due_date`). Every generated symbol is derived from those two
//! through the helpers below, so both ecosystems agree on spelling.

use crate::domain::error::DomainError;

/// Split an identifier into lowercase words.
///
/// Handles `snake_case`, `kebab-case`, `camelCase`, `PascalCase` and
/// acronyms (`HTTPServer` → `http`, `server`).
pub fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(current.to_lowercase());
                current.clear();
            }
            continue;
        }

        if let Some(next) = chars.peek() {
            // "dueDate" → "due" + "Date"
            if c.is_lowercase() && next.is_uppercase() {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }

            // "HTTPServer" → "HTTP" + "Server"
            if c.is_uppercase()
                && next.is_uppercase()
                && chars.clone().nth(1).is_some_and(|n| n.is_lowercase())
            {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current.to_lowercase());
    }

    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(word.len());
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}

/// `due_date` → `dueDate`, `Invoice` → `invoice`.
pub fn camel(s: &str) -> String {
    let mut words = split_words(s).into_iter();
    let mut out = words.next().unwrap_or_default();
    for word in words {
        out.push_str(&capitalize(&word));
    }
    out
}

/// `due_date` → `DueDate`.
pub fn pascal(s: &str) -> String {
    split_words(s).iter().map(|w| capitalize(w)).collect()
}

/// `billing` → `Billing`; used for namespace-level class names.
pub fn title(s: &str) -> String {
    capitalize(&s.to_lowercase())
}

/// `PaymentMethod` → `Payment Method`, `due_date` → `Due Date`.
pub fn humanize(s: &str) -> String {
    split_words(s)
        .iter()
        .map(|w| capitalize(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reject names the generated code cannot use as module or class names.
pub fn validate_identifier(name: &str) -> Result<(), DomainError> {
    let reason = if name.trim().is_empty() {
        Some("must not be empty")
    } else if name.chars().any(|c| c.is_ascii_digit()) {
        Some("must not contain digits")
    } else if !name.chars().all(|c| c.is_alphabetic() || c == '_') {
        Some("only letters and underscores are allowed")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(DomainError::InvalidName {
            name: name.to_string(),
            reason: reason.into(),
        }),
        None => Ok(()),
    }
}
