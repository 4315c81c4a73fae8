//! Link text for attachments embedded in notes.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static WIKI_EMBED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[\[([^\]|#^]+)(?:[#^][^\]|]*)?(?:\|[^\]]*)?\]\]").expect("static regex"));

static MARKDOWN_EMBED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\(<?([^)>]+)>?\)").expect("static regex"));

/// How the vault writes links to attachments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStyle {
    /// `[[name.png]]`
    #[default]
    Wiki,
    /// `[](name%20with%20spaces.png)`
    Markdown,
}

impl LinkStyle {
    #[must_use]
    pub fn from_markdown_flag(use_markdown_links: bool) -> Self {
        if use_markdown_links {
            Self::Markdown
        } else {
            Self::Wiki
        }
    }
}

/// The link fragment the editor inserts for an attachment named `name`.
///
/// This is the part shared by `![[name]]` / `![](name)` embeds and plain
/// links, so replacing it patches either form.
#[must_use]
pub fn link_text(name: &str, style: LinkStyle) -> String {
    match style {
        LinkStyle::Wiki => format!("[[{name}]]"),
        LinkStyle::Markdown => format!("[]({})", encode_uri(name)),
    }
}

/// Characters `encodeURI` leaves alone besides ASCII alphanumerics.
const URI_KEEP: &str = ";,/?:@&=+$-_.!~*'()#";

/// Percent-encode a link target the way the editor writes markdown links
/// (`encodeURI` semantics: reserved characters and path separators stay
/// readable).
#[must_use]
pub fn encode_uri(target: &str) -> String {
    let mut out = String::with_capacity(target.len());
    let mut buf = [0u8; 4];
    for c in target.chars() {
        if c.is_ascii_alphanumeric() || URI_KEEP.contains(c) {
            out.push(c);
        } else {
            out.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    out
}

/// An attachment embedded in a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    /// Link target as written, decoded for markdown links.
    pub target: String,
    pub style: LinkStyle,
}

/// All embeds in `text`, in document order.
#[must_use]
pub fn find_embeds(text: &str) -> Vec<Embed> {
    let mut found: Vec<(usize, Embed)> = WIKI_EMBED
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some((
                whole.start(),
                Embed {
                    target: caps[1].trim().to_string(),
                    style: LinkStyle::Wiki,
                },
            ))
        })
        .collect();

    found.extend(MARKDOWN_EMBED.captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        let raw = caps[1].trim();
        if raw.contains("://") {
            return None;
        }
        let target = urlencoding::decode(raw)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| raw.to_string());
        Some((
            whole.start(),
            Embed {
                target,
                style: LinkStyle::Markdown,
            },
        ))
    }));

    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, embed)| embed).collect()
}

/// Replace the first occurrence of `old` in `text` with `new`.
///
/// Returns `None` when `old` does not occur.
#[must_use]
pub fn patch_first_occurrence(text: &str, old: &str, new: &str) -> Option<String> {
    if old.is_empty() || !text.contains(old) {
        return None;
    }
    Some(text.replacen(old, new, 1))
}

/// Point the first link to `old_target` in `text` at `new_target` instead.
///
/// Tries the exact form the editor inserts first (`[[name]]` or
/// `[](encoded)`), then aliased, heading and angle-bracket variants of the
/// same style. Returns `None` when no link to `old_target` is found.
#[must_use]
pub fn rewrite_link(text: &str, old_target: &str, new_target: &str, style: LinkStyle) -> Option<String> {
    link_forms(old_target, style)
        .into_iter()
        .zip(link_forms(new_target, style))
        .find_map(|(old, new)| patch_first_occurrence(text, &old, &new))
}

fn link_forms(target: &str, style: LinkStyle) -> Vec<String> {
    match style {
        LinkStyle::Wiki => vec![
            link_text(target, style),
            format!("[[{target}|"),
            format!("[[{target}#"),
        ],
        LinkStyle::Markdown => vec![
            link_text(target, style),
            format!("]({})", encode_uri(target)),
            format!("](<{target}>)"),
            format!("]({target})"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wiki_link_text() {
        assert_eq!(link_text("Pasted image 1.png", LinkStyle::Wiki), "[[Pasted image 1.png]]");
    }

    #[test]
    fn markdown_link_text_is_percent_encoded() {
        assert_eq!(
            link_text("Pasted image 1.png", LinkStyle::Markdown),
            "[](Pasted%20image%201.png)"
        );
        assert_eq!(link_text("assets/a b.png", LinkStyle::Markdown), "[](assets/a%20b.png)");
        assert_eq!(encode_uri("img (1) ü.png"), "img%20(1)%20%C3%BC.png");
    }

    #[test]
    fn link_style_from_flag() {
        assert_eq!(LinkStyle::from_markdown_flag(true), LinkStyle::Markdown);
        assert_eq!(LinkStyle::from_markdown_flag(false), LinkStyle::Wiki);
    }

    #[test]
    fn find_embeds_in_document_order() {
        let text = "intro ![](assets/a%20b.png) then ![[c.png|300]] and ![[d.jpg]]\n[[not-embed.png]] ![x](https://e.com/i.png)";
        let embeds = find_embeds(text);
        let targets: Vec<&str> = embeds.iter().map(|e| e.target.as_str()).collect();
        assert_eq!(targets, vec!["assets/a b.png", "c.png", "d.jpg"]);
        assert_eq!(embeds[0].style, LinkStyle::Markdown);
        assert_eq!(embeds[1].style, LinkStyle::Wiki);
    }

    #[test]
    fn patch_replaces_only_first_occurrence() {
        let line = "![[a.png]] and ![[a.png]]";
        assert_eq!(
            patch_first_occurrence(line, "[[a.png]]", "[[b.png]]").as_deref(),
            Some("![[b.png]] and ![[a.png]]")
        );
        assert_eq!(patch_first_occurrence(line, "[[z.png]]", "[[b.png]]"), None);
        assert_eq!(patch_first_occurrence(line, "", "x"), None);
    }

    #[test]
    fn rewrite_link_handles_aliases_and_alt_text() {
        let text = "see ![[Pasted image 1.png|200]] here";
        assert_eq!(
            rewrite_link(text, "Pasted image 1.png", "diagram.png", LinkStyle::Wiki).as_deref(),
            Some("see ![[diagram.png|200]] here")
        );

        let text = "![shot](Pasted%20image%201.png)";
        assert_eq!(
            rewrite_link(text, "Pasted image 1.png", "my shot.png", LinkStyle::Markdown).as_deref(),
            Some("![shot](my%20shot.png)")
        );

        assert_eq!(rewrite_link("nothing", "a.png", "b.png", LinkStyle::Wiki), None);
    }

    #[test]
    fn rewrite_link_prefers_exact_editor_form() {
        let text = "![[a.png|x]] ![[a.png]]";
        assert_eq!(
            rewrite_link(text, "a.png", "b.png", LinkStyle::Wiki).as_deref(),
            Some("![[a.png|x]] ![[b.png]]")
        );
    }
}
