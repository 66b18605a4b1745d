//! XML codec for rule trees.
//!
//! Documents look like this:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <rules>
//!   <group logic="AND">
//!     <age comparator="equals">30</age>
//!   </group>
//! </rules>
//! ```
//!
//! Rules are elements named after their rule type key. The decoder also
//! reads the older `<rule><name/><comparator/><value/></rule>` form and a
//! `<logic>` child element in place of the `logic` attribute.

mod decode;
mod document;
mod encode;
mod error;
mod grammar;

pub use decode::decode;
pub use encode::{encode, encode_with, EncodeOptions};
pub use error::MalformedXml;

use document::Element;

fn parse_document(input: &str) -> Result<Element, MalformedXml> {
    use winnow::Parser;
    grammar::document
        .parse(input)
        .map_err(|e| MalformedXml::new(e.to_string()))
}
