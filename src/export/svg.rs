//! Raster-in-vector wrapper: an SVG document whose only content is an embedded PNG.
//! Nothing is traced, so consumers get no editable paths.

use crate::models::data_url;
use simple_xml_builder::XMLElement;

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

pub fn wrap_png(png: &[u8], width: u32, height: u32) -> String {
    let width = width.to_string();
    let height = height.to_string();

    let mut root = XMLElement::new("svg");
    root.add_attribute("xmlns", SVG_NAMESPACE);
    root.add_attribute("width", &width);
    root.add_attribute("height", &height);
    root.add_attribute("viewBox", &format!("0 0 {} {}", width, height));

    let mut image = XMLElement::new("image");
    image.add_attribute("href", &data_url("image/png", png));
    image.add_attribute("width", &width);
    image.add_attribute("height", &height);
    root.add_child(image);

    root.to_string()
}
