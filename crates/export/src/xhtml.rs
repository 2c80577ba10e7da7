//! Paginated XHTML rendering of log lines.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::layout::{FixedLinePaginator, LayoutSummary, Paginator};
use crate::template::{Alignment, HeaderFooterContext, HeaderFooterTemplate, RenderedHeaderFooter};
use crate::{ExportError, ExportOptions};

const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

const STYLESHEET: &str = "\
section.page { page-break-after: always; margin-bottom: 2em; }
header.page-header, footer.page-footer { display: flex; justify-content: space-between; color: #555; font-size: 0.8em; }
header.page-header span, footer.page-footer span { flex: 1; }
span.center { text-align: center; }
span.right { text-align: right; }
p { margin: 0.2em 0; }
";

/// Where the lines being rendered came from, for `&f` and `&F`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceInfo<'a> {
    pub file_name: &'a str,
    pub file_path: &'a str,
}

#[derive(Debug)]
pub struct XhtmlRenderer<'a> {
    options: &'a ExportOptions,
    header: HeaderFooterTemplate,
    footer: HeaderFooterTemplate,
}

impl<'a> XhtmlRenderer<'a> {
    pub fn new(options: &'a ExportOptions) -> Result<Self, ExportError> {
        Ok(Self {
            options,
            header: HeaderFooterTemplate::parse(&options.header)?,
            footer: HeaderFooterTemplate::parse(&options.footer)?,
        })
    }

    /// Renders `lines` as one XHTML document with a `<section class="page">`
    /// per page and one `<p>` per line.
    pub fn render(
        &self,
        lines: &[String],
        source: SourceInfo<'_>,
    ) -> Result<(String, LayoutSummary), ExportError> {
        let pagination = FixedLinePaginator::new(self.options.lines_per_page).paginate(&lines);
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::DocType(BytesText::from_escaped("html")))?;

        let language = self.options.language.as_str();
        writer.write_event(Event::Start(BytesStart::new("html").with_attributes([
            ("xmlns", XHTML_NS),
            ("lang", language),
            ("xml:lang", language),
        ])))?;
        self.write_head(&mut writer)?;

        writer.write_event(Event::Start(BytesStart::new("body")))?;
        for page in &pagination.pages {
            let context = HeaderFooterContext {
                title: &self.options.title,
                author: &self.options.author,
                file_name: source.file_name,
                file_path: source.file_path,
                page_number: page.page_number,
                page_count: pagination.summary.total_pages,
            };
            let page_id = format!("page-{}", page.page_number);
            writer.write_event(Event::Start(
                BytesStart::new("section")
                    .with_attributes([("class", "page"), ("id", page_id.as_str())]),
            ))?;

            write_band(&mut writer, "header", "page-header", &self.header.render(&context))?;
            for line in &lines[page.lines.start..page.lines.end] {
                write_text_element(&mut writer, "p", line)?;
            }
            write_band(&mut writer, "footer", "page-footer", &self.footer.render(&context))?;

            writer.write_event(Event::End(BytesEnd::new("section")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("body")))?;
        writer.write_event(Event::End(BytesEnd::new("html")))?;

        let mut xhtml = String::from_utf8(writer.into_inner())
            .map_err(|err| ExportError::Render(err.to_string()))?;
        xhtml.push('\n');
        Ok((xhtml, pagination.summary))
    }

    fn write_head(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), ExportError> {
        writer.write_event(Event::Start(BytesStart::new("head")))?;
        writer.write_event(Event::Empty(
            BytesStart::new("meta").with_attributes([("charset", "UTF-8")]),
        ))?;
        write_text_element(writer, "title", &self.options.title)?;
        writer.write_event(Event::Empty(BytesStart::new("meta").with_attributes([
            ("name", "author"),
            ("content", self.options.author.as_str()),
        ])))?;
        write_text_element(writer, "style", STYLESHEET)?;
        writer.write_event(Event::End(BytesEnd::new("head")))?;
        Ok(())
    }
}

pub(crate) fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> Result<(), ExportError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_band(
    writer: &mut Writer<Vec<u8>>,
    element: &str,
    class: &str,
    rendered: &RenderedHeaderFooter,
) -> Result<(), ExportError> {
    if rendered.is_blank() {
        return Ok(());
    }
    writer.write_event(Event::Start(
        BytesStart::new(element).with_attributes([("class", class)]),
    ))?;
    for (alignment, text) in rendered.slots() {
        let slot_class = match alignment {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        };
        let span = BytesStart::new("span").with_attributes([("class", slot_class)]);
        if text.is_empty() {
            writer.write_event(Event::Empty(span))?;
            continue;
        }
        writer.write_event(Event::Start(span))?;
        writer.write_event(Event::Text(BytesText::new(text)))?;
        writer.write_event(Event::End(BytesEnd::new("span")))?;
    }
    writer.write_event(Event::End(BytesEnd::new(element)))?;
    Ok(())
}
