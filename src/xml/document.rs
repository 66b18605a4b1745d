use std::fmt;

/// A parsed or to-be-written XML element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Element {
    pub(crate) name: String,
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) children: Vec<Content>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Content {
    Element(Element),
    Text(String),
}

impl Element {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub(crate) fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_owned(), value.to_owned()));
        self
    }

    pub(crate) fn with_child(mut self, child: Element) -> Self {
        self.children.push(Content::Element(child));
        self
    }

    /// Adds a text node; empty text adds nothing so the element stays empty.
    pub(crate) fn with_text(mut self, text: &str) -> Self {
        if !text.is_empty() {
            self.children.push(Content::Text(text.to_owned()));
        }
        self
    }

    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            Content::Element(e) => Some(e),
            Content::Text(_) => None,
        })
    }

    pub(crate) fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    /// Direct text content, verbatim. Whitespace-only runs between child
    /// elements are indentation and are skipped.
    pub(crate) fn text(&self) -> String {
        let has_elements = self.elements().next().is_some();
        let mut text = String::new();
        for child in &self.children {
            if let Content::Text(t) = child {
                if has_elements && t.trim().is_empty() {
                    continue;
                }
                text.push_str(t);
            }
        }
        text
    }

    /// Direct text content with surrounding whitespace removed, for keys
    /// such as `<logic>` and `<name>`.
    pub(crate) fn trimmed_text(&self) -> String {
        self.text().trim().to_owned()
    }

    /// Serialize into `out`. With `indent`, element-only content is placed
    /// on separate lines, `indent` spaces per level.
    pub(crate) fn write(&self, out: &mut String, indent: Option<usize>, depth: usize) {
        out.push('<');
        out.push_str(&self.name);
        for (k, v) in &self.attributes {
            out.push(' ');
            out.push_str(k);
            out.push_str("=\"");
            escape_into(out, v, true);
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');

        let element_only = self
            .children
            .iter()
            .all(|c| matches!(c, Content::Element(_)));
        for child in &self.children {
            match child {
                Content::Element(e) => {
                    if let (Some(width), true) = (indent, element_only) {
                        newline(out, width * (depth + 1));
                    }
                    e.write(out, indent, depth + 1);
                }
                Content::Text(t) => escape_into(out, t, false),
            }
        }
        if let (Some(width), true) = (indent, element_only) {
            newline(out, width * depth);
        }

        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

fn newline(out: &mut String, pad: usize) {
    out.push('\n');
    out.extend(std::iter::repeat(' ').take(pad));
}

/// Escape markup characters; quotes too when writing an attribute value.
pub(crate) fn escape_into(out: &mut String, raw: &str, attribute: bool) {
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// An entity reference the reader does not know.
#[derive(Debug)]
pub(crate) struct BadEntity(String);

impl fmt::Display for BadEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown entity '&{};'", self.0)
    }
}

impl std::error::Error for BadEntity {}

/// Resolve entity and character references.
pub(crate) fn unescape(raw: &str) -> Result<String, BadEntity> {
    if !raw.contains('&') {
        return Ok(raw.to_owned());
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let Some(end) = after.find(';') else {
            return Err(BadEntity(after.chars().take(8).collect()));
        };
        let entity = &after[..end];
        let decoded = decode_entity(entity).ok_or_else(|| BadEntity(entity.to_owned()))?;
        out.push(decoded);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}
