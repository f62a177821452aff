pub mod gazette_rss;
pub mod gazette_xml;
