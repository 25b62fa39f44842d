//! XML helpers shared by the package writer.

mod escape;

pub use escape::{escape_xml, find_invalid_xml_char, is_xml_char};
