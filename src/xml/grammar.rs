use winnow::combinator::{alt, cut_err, delimited, opt, preceded, repeat};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{take_till, take_until, take_while};

use super::document::{unescape, Content, Element};

// -- Whitespace & markup we skip --------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_ascii_whitespace())
        .void()
        .parse_next(input)
}

fn comment(input: &mut &str) -> ModalResult<()> {
    ("<!--", cut_err(take_until(0.., "-->")), "-->")
        .void()
        .parse_next(input)
}

/// Processing instructions, including the `<?xml ...?>` declaration.
fn processing_instruction(input: &mut &str) -> ModalResult<()> {
    ("<?", cut_err(take_until(0.., "?>")), "?>")
        .void()
        .parse_next(input)
}

/// A DOCTYPE without an internal subset.
fn doctype(input: &mut &str) -> ModalResult<()> {
    (
        "<!DOCTYPE",
        take_till(0.., ['>', '[']),
        cut_err('>').context(StrContext::Expected(StrContextValue::Description(
            "end of DOCTYPE (internal subsets are not supported)",
        ))),
    )
        .void()
        .parse_next(input)
}

fn misc(input: &mut &str) -> ModalResult<()> {
    let _: () = repeat(
        0..,
        alt((
            take_while(1.., |c: char| c.is_ascii_whitespace()).void(),
            comment,
            processing_instruction,
            doctype,
        )),
    )
    .parse_next(input)?;
    Ok(())
}

// -- Names & attributes -----------------------------------------------------

fn name<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1, |c: char| c.is_alphabetic() || c == '_' || c == ':'),
        take_while(0.., |c: char| {
            c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
        }),
    )
        .take()
        .parse_next(input)
}

fn quoted<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    alt((
        delimited('"', take_till(0.., ['"', '<']), '"'),
        delimited('\'', take_till(0.., ['\'', '<']), '\''),
    ))
    .parse_next(input)
}

fn attribute(input: &mut &str) -> ModalResult<(String, String)> {
    let key = name.parse_next(input)?;
    (ws, '=', ws).parse_next(input)?;
    let value = cut_err(quoted.try_map(unescape))
        .context(StrContext::Expected(StrContextValue::Description(
            "quoted attribute value",
        )))
        .parse_next(input)?;
    Ok((key.to_owned(), value))
}

// -- Content ----------------------------------------------------------------

fn cdata(input: &mut &str) -> ModalResult<String> {
    delimited("<![CDATA[", cut_err(take_until(0.., "]]>")), "]]>")
        .map(str::to_owned)
        .parse_next(input)
}

fn text(input: &mut &str) -> ModalResult<String> {
    cut_err(take_till(1.., '<').try_map(unescape))
        .context(StrContext::Expected(StrContextValue::Description(
            "character data",
        )))
        .parse_next(input)
}

fn push_text(children: &mut Vec<Content>, text: String) {
    if let Some(Content::Text(last)) = children.last_mut() {
        last.push_str(&text);
    } else {
        children.push(Content::Text(text));
    }
}

fn content(input: &mut &str) -> ModalResult<Vec<Content>> {
    let mut children = Vec::new();
    loop {
        if input.is_empty() || input.starts_with("</") {
            return Ok(children);
        }
        if input.starts_with("<!--") {
            comment.parse_next(input)?;
        } else if input.starts_with("<![CDATA[") {
            let data = cdata.parse_next(input)?;
            push_text(&mut children, data);
        } else if input.starts_with("<?") {
            processing_instruction.parse_next(input)?;
        } else if input.starts_with('<') {
            let child = cut_err(element).parse_next(input)?;
            children.push(Content::Element(child));
        } else {
            let data = text.parse_next(input)?;
            push_text(&mut children, data);
        }
    }
}

fn element(input: &mut &str) -> ModalResult<Element> {
    '<'.parse_next(input)?;
    let open = cut_err(name)
        .context(StrContext::Expected(StrContextValue::Description(
            "element name",
        )))
        .parse_next(input)?;
    let attributes: Vec<(String, String)> =
        repeat(0.., preceded(take_while(1.., |c: char| c.is_ascii_whitespace()), attribute))
            .parse_next(input)?;
    ws.parse_next(input)?;

    let mut el = Element::new(open);
    el.attributes = attributes;

    if opt("/>").parse_next(input)?.is_some() {
        return Ok(el);
    }
    cut_err('>')
        .context(StrContext::Expected(StrContextValue::CharLiteral('>')))
        .parse_next(input)?;

    el.children = content(input)?;

    cut_err("</")
        .context(StrContext::Expected(StrContextValue::Description(
            "closing tag",
        )))
        .parse_next(input)?;
    cut_err(name.verify(|close: &str| close == open))
        .context(StrContext::Expected(StrContextValue::Description(
            "matching closing tag",
        )))
        .parse_next(input)?;
    (ws, cut_err('>')).parse_next(input)?;
    Ok(el)
}

// -- Top-level parser -------------------------------------------------------

pub(crate) fn document(input: &mut &str) -> ModalResult<Element> {
    opt('\u{feff}').parse_next(input)?;
    misc.parse_next(input)?;
    let root = cut_err(element)
        .context(StrContext::Expected(StrContextValue::Description(
            "root element",
        )))
        .parse_next(input)?;
    misc.parse_next(input)?;
    Ok(root)
}
