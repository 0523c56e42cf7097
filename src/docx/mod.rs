mod document;
mod package;
mod xml;

#[cfg(test)]
pub mod testing;

pub use document::*;
#[cfg(test)]
pub use package::Package;
pub use xml::{XmlElement, XmlNode};
