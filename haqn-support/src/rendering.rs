//! Text rendering for container diagnostics.
//!
//! Type names coming from [`std::any::type_name`] are long and full of
//! module paths. Errors print the short form and keep the full one only
//! where it disambiguates.

/// Arrow used between the links of a resolution chain.
pub const CHAIN_ARROW: &str = " → ";

/// Renders a resolution chain using short type names.
///
/// # Examples
/// ```
/// use haqn_support::rendering::render_chain;
///
/// let chain = ["app::Database", "app::Logger", "app::Database"];
/// assert_eq!(render_chain(chain), "Database → Logger → Database");
/// ```
pub fn render_chain<I>(chain: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    chain
        .into_iter()
        .map(|name| shorten_type_name(name.as_ref()))
        .collect::<Vec<_>>()
        .join(CHAIN_ARROW)
}

/// Renders a bulleted list, one short type name per line.
///
/// Each line is indented by four spaces and prefixed with `- `.
pub fn render_list<I>(names: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| format!("    - {}", shorten_type_name(name.as_ref())))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strips module paths from every path segment of a type name.
///
/// ```
/// use haqn_support::rendering::shorten_type_name;
///
/// assert_eq!(shorten_type_name("app::db::Database"), "Database");
/// assert_eq!(
///     shorten_type_name("alloc::sync::Arc<dyn app::log::Logger + Send>"),
///     "Arc<dyn Logger + Send>"
/// );
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    let mut short = String::with_capacity(full_name.len());
    let mut segment = String::new();
    let mut chars = full_name.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                segment.clear();
            }
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&' => {
                short.push_str(&segment);
                short.push(ch);
                segment.clear();
            }
            _ => segment.push(ch),
        }
    }

    short.push_str(&segment);
    short
}

/// Picks registered type names that look like the requested one.
///
/// Matching is case-insensitive on short names. Same short names rank
/// first, so a type from another module or one bound only under a name
/// is still offered. Substring matches follow, then names sharing a prefix
/// of at least three characters. At most `limit` distinct names are
/// returned, best first.
pub fn suggest_similar<'a>(requested: &str, registered: &[&'a str], limit: usize) -> Vec<&'a str> {
    let wanted = shorten_type_name(requested).to_lowercase();
    if wanted.is_empty() {
        return Vec::new();
    }

    let mut ranked: Vec<(usize, &'a str)> = registered
        .iter()
        .filter_map(|&candidate| {
            let short = shorten_type_name(candidate).to_lowercase();
            if short == wanted {
                return Some((usize::MAX, candidate));
            }
            if short.contains(&wanted) || wanted.contains(&short) {
                return Some((usize::MAX - 1, candidate));
            }
            let shared = short
                .chars()
                .zip(wanted.chars())
                .take_while(|(a, b)| a == b)
                .count();
            (shared >= 3).then_some((shared, candidate))
        })
        .collect();

    ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    ranked.dedup_by(|a, b| a.1 == b.1);
    ranked.into_iter().take(limit).map(|(_, name)| name).collect()
}
