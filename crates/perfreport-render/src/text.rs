//! Text shaping helpers shared by layout, encoding and file naming.

/// Longest table cell name kept intact.
pub const MAX_CELL_CHARS: usize = 15;

pub const ELLIPSIS: char = '…';

/// Cut `name` to [`MAX_CELL_CHARS`] characters plus an ellipsis.
pub fn truncate_cell(name: &str) -> String {
    if name.chars().count() <= MAX_CELL_CHARS {
        return name.to_string();
    }
    let mut cut: String = name.chars().take(MAX_CELL_CHARS).collect();
    cut.push(ELLIPSIS);
    cut
}

/// Right-align a value in a fixed-width text cell.
pub fn pad_numeric(value: impl std::fmt::Display, width: usize) -> String {
    format!("{value:>width$}")
}

/// Greedy word wrap on character count. Words longer than `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            lines.push(word.drain(..width).collect());
        }
        if word.is_empty() {
            continue;
        }
        let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
        if needed > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }
    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// ASCII replacement for letters the base fonts cannot show.
pub fn transliterate(c: char) -> Option<char> {
    let mapped = match c {
        'ğ' => 'g',
        'Ğ' => 'G',
        'ş' => 's',
        'Ş' => 'S',
        'ı' => 'i',
        'İ' => 'I',
        _ => return None,
    };
    Some(mapped)
}

/// Fold a character to lowercase ASCII for file names, if it has an obvious
/// ASCII form.
pub fn fold_ascii(c: char) -> Option<char> {
    if c.is_ascii() {
        return Some(c.to_ascii_lowercase());
    }
    if let Some(t) = transliterate(c) {
        return Some(t.to_ascii_lowercase());
    }
    let folded = match c {
        'ç' | 'Ç' => 'c',
        'ö' | 'Ö' | 'ó' | 'Ó' | 'ò' | 'Ò' | 'ô' | 'Ô' => 'o',
        'ü' | 'Ü' | 'ú' | 'Ú' | 'ù' | 'Ù' | 'û' | 'Û' => 'u',
        'á' | 'Á' | 'à' | 'À' | 'â' | 'Â' | 'ä' | 'Ä' | 'ã' | 'Ã' => 'a',
        'é' | 'É' | 'è' | 'È' | 'ê' | 'Ê' | 'ë' | 'Ë' => 'e',
        'í' | 'Í' | 'ì' | 'Ì' | 'î' | 'Î' | 'ï' | 'Ï' => 'i',
        'ñ' | 'Ñ' => 'n',
        _ => return None,
    };
    Some(folded)
}

/// Lowercase ASCII slug; runs of anything else collapse to a single `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        match fold_ascii(c) {
            Some(a) if a.is_ascii_alphanumeric() => slug.push(a),
            _ => {
                if !slug.is_empty() && !slug.ends_with('-') {
                    slug.push('-');
                }
            }
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
