//! EPUB 3 container around a rendered XHTML content document.

use std::io::{Cursor, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::xhtml::write_text_element;
use crate::ExportError;

pub const MIMETYPE: &str = "application/epub+zip";
pub const CONTAINER_PATH: &str = "META-INF/container.xml";
pub const PACKAGE_PATH: &str = "OEBPS/content.opf";
pub const NAV_PATH: &str = "OEBPS/nav.xhtml";
pub const CONTENT_PATH: &str = "OEBPS/content.xhtml";

const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Package metadata written to `content.opf`.
#[derive(Debug, Clone, Copy)]
pub struct EpubMetadata<'a> {
    pub identifier: &'a str,
    pub title: &'a str,
    pub author: &'a str,
    pub language: &'a str,
    /// `dcterms:modified`, as `YYYY-MM-DDThh:mm:ssZ`.
    pub modified: &'a str,
}

/// Current UTC time in the form `dcterms:modified` requires.
pub fn modified_now() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Zips `content` into an EPUB with a navigation entry per page.
///
/// `content` must carry `id="page-N"` anchors for pages `1..=page_count`.
pub fn package(
    metadata: &EpubMetadata<'_>,
    content: &str,
    page_count: usize,
) -> Result<Vec<u8>, ExportError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let stored = FileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = FileOptions::default().compression_method(CompressionMethod::Deflated);

    // Readers sniff the first entry; it must be `mimetype`, uncompressed.
    add_entry(&mut zip, "mimetype", MIMETYPE.as_bytes(), stored)?;
    add_entry(&mut zip, CONTAINER_PATH, &container_xml()?, deflated)?;
    add_entry(&mut zip, PACKAGE_PATH, &package_opf(metadata)?, deflated)?;
    add_entry(&mut zip, NAV_PATH, &nav_xhtml(metadata, page_count)?, deflated)?;
    add_entry(&mut zip, CONTENT_PATH, content.as_bytes(), deflated)?;

    Ok(zip.finish()?.into_inner())
}

fn add_entry(
    zip: &mut ZipWriter<Cursor<Vec<u8>>>,
    name: &str,
    data: &[u8],
    options: FileOptions,
) -> Result<(), ExportError> {
    zip.start_file(name, options)?;
    zip.write_all(data).map_err(ZipError::from)?;
    Ok(())
}

fn xml_writer() -> Result<Writer<Vec<u8>>, ExportError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    Ok(writer)
}

fn container_xml() -> Result<Vec<u8>, ExportError> {
    let mut writer = xml_writer()?;
    writer.write_event(Event::Start(BytesStart::new("container").with_attributes([
        ("version", "1.0"),
        ("xmlns", "urn:oasis:names:tc:opendocument:xmlns:container"),
    ])))?;
    writer.write_event(Event::Start(BytesStart::new("rootfiles")))?;
    writer.write_event(Event::Empty(BytesStart::new("rootfile").with_attributes([
        ("full-path", PACKAGE_PATH),
        ("media-type", "application/oebps-package+xml"),
    ])))?;
    writer.write_event(Event::End(BytesEnd::new("rootfiles")))?;
    writer.write_event(Event::End(BytesEnd::new("container")))?;
    Ok(writer.into_inner())
}

fn package_opf(metadata: &EpubMetadata<'_>) -> Result<Vec<u8>, ExportError> {
    let mut writer = xml_writer()?;
    writer.write_event(Event::Start(BytesStart::new("package").with_attributes([
        ("xmlns", "http://www.idpf.org/2007/opf"),
        ("version", "3.0"),
        ("unique-identifier", "book-id"),
        ("xml:lang", metadata.language),
    ])))?;

    writer.write_event(Event::Start(
        BytesStart::new("metadata")
            .with_attributes([("xmlns:dc", "http://purl.org/dc/elements/1.1/")]),
    ))?;
    writer.write_event(Event::Start(
        BytesStart::new("dc:identifier").with_attributes([("id", "book-id")]),
    ))?;
    writer.write_event(Event::Text(BytesText::new(metadata.identifier)))?;
    writer.write_event(Event::End(BytesEnd::new("dc:identifier")))?;
    write_text_element(&mut writer, "dc:title", metadata.title)?;
    write_text_element(&mut writer, "dc:language", metadata.language)?;
    write_text_element(&mut writer, "dc:creator", metadata.author)?;
    writer.write_event(Event::Start(
        BytesStart::new("meta").with_attributes([("property", "dcterms:modified")]),
    ))?;
    writer.write_event(Event::Text(BytesText::new(metadata.modified)))?;
    writer.write_event(Event::End(BytesEnd::new("meta")))?;
    writer.write_event(Event::End(BytesEnd::new("metadata")))?;

    writer.write_event(Event::Start(BytesStart::new("manifest")))?;
    writer.write_event(Event::Empty(BytesStart::new("item").with_attributes([
        ("id", "nav"),
        ("href", "nav.xhtml"),
        ("media-type", "application/xhtml+xml"),
        ("properties", "nav"),
    ])))?;
    writer.write_event(Event::Empty(BytesStart::new("item").with_attributes([
        ("id", "content"),
        ("href", "content.xhtml"),
        ("media-type", "application/xhtml+xml"),
    ])))?;
    writer.write_event(Event::End(BytesEnd::new("manifest")))?;

    writer.write_event(Event::Start(BytesStart::new("spine")))?;
    for idref in ["nav", "content"] {
        writer.write_event(Event::Empty(
            BytesStart::new("itemref").with_attributes([("idref", idref)]),
        ))?;
    }
    writer.write_event(Event::End(BytesEnd::new("spine")))?;
    writer.write_event(Event::End(BytesEnd::new("package")))?;
    Ok(writer.into_inner())
}

fn nav_xhtml(metadata: &EpubMetadata<'_>, page_count: usize) -> Result<Vec<u8>, ExportError> {
    let mut writer = xml_writer()?;
    writer.write_event(Event::DocType(BytesText::from_escaped("html")))?;
    writer.write_event(Event::Start(BytesStart::new("html").with_attributes([
        ("xmlns", XHTML_NS),
        ("xmlns:epub", "http://www.idpf.org/2007/ops"),
        ("lang", metadata.language),
        ("xml:lang", metadata.language),
    ])))?;
    writer.write_event(Event::Start(BytesStart::new("head")))?;
    write_text_element(&mut writer, "title", metadata.title)?;
    writer.write_event(Event::End(BytesEnd::new("head")))?;

    writer.write_event(Event::Start(BytesStart::new("body")))?;
    writer.write_event(Event::Start(
        BytesStart::new("nav").with_attributes([("epub:type", "toc"), ("id", "toc")]),
    ))?;
    write_text_element(&mut writer, "h1", metadata.title)?;
    writer.write_event(Event::Start(BytesStart::new("ol")))?;
    for page in 1..=page_count.max(1) {
        let href = format!("content.xhtml#page-{page}");
        writer.write_event(Event::Start(BytesStart::new("li")))?;
        writer.write_event(Event::Start(
            BytesStart::new("a").with_attributes([("href", href.as_str())]),
        ))?;
        let label = format!("Page {page}");
        writer.write_event(Event::Text(BytesText::new(&label)))?;
        writer.write_event(Event::End(BytesEnd::new("a")))?;
        writer.write_event(Event::End(BytesEnd::new("li")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("ol")))?;
    writer.write_event(Event::End(BytesEnd::new("nav")))?;
    writer.write_event(Event::End(BytesEnd::new("body")))?;
    writer.write_event(Event::End(BytesEnd::new("html")))?;
    Ok(writer.into_inner())
}
