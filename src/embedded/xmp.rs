//! embedded::xmp
//!
//! Reading and rewriting the Dublin Core fields of an XMP packet.
//!
//! Only two properties are handled:
//! - `dc:description` (an `rdf:Alt`; the first entry is the comment)
//! - `dc:subject` (an `rdf:Bag`; one entry per keyword)
//!
//! Rewriting is textual: existing `dc:description`/`dc:subject` elements are
//! cut out of the packet and fresh ones inserted before the closing
//! `</rdf:Description>`, so everything else in the packet is preserved
//! byte for byte.

use quick_xml::events::Event;
use quick_xml::Reader;

/// Signature that starts an XMP APP1 segment.
pub const XMP_HEADER: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";

const DC_NS: &str = "http://purl.org/dc/elements/1.1/";

/// Dublin Core fields extracted from a packet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DublinCore {
    pub description: Option<String>,
    pub subject: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Description,
    Subject,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Field> {
        match name {
            b"dc:description" => Some(Field::Description),
            b"dc:subject" => Some(Field::Subject),
            _ => None,
        }
    }
}

/// Extract `dc:description` and `dc:subject` from an XMP packet.
///
/// Parsing is best-effort: malformed XML ends the scan and whatever was
/// collected up to that point is returned.
pub fn parse_packet(xml: &[u8]) -> DublinCore {
    let mut out = DublinCore::default();
    let mut reader = Reader::from_reader(xml);

    let mut buf = Vec::new();
    let mut field: Option<Field> = None;
    let mut entry: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if let Some(f) = Field::from_name(e.name().as_ref()) {
                    field = Some(f);
                } else if field.is_some() && e.local_name().as_ref() == b"li" {
                    entry = Some(String::new());
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(text) = entry.as_mut() {
                    match e.unescape() {
                        Ok(value) => text.push_str(&value),
                        Err(_) => text.push_str(&String::from_utf8_lossy(e)),
                    }
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some(text) = entry.as_mut() {
                    text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"li" {
                    if let Some(value) = entry.take() {
                        match field {
                            Some(Field::Description) => {
                                if out.description.is_none() && !value.is_empty() {
                                    out.description = Some(value);
                                }
                            }
                            Some(Field::Subject) => {
                                if !value.is_empty() {
                                    out.subject.push(value);
                                }
                            }
                            None => {}
                        }
                    }
                } else if Field::from_name(e.name().as_ref()).is_some() {
                    field = None;
                    entry = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::debug!("XMP parse stopped: {}", e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    out
}

/// Produce a packet carrying `description` and `subject`.
///
/// With an existing packet the Dublin Core elements are replaced in place;
/// otherwise a fresh packet is built. `None`/empty values drop the element.
pub fn update_packet(
    existing: Option<&str>,
    description: Option<&str>,
    subject: &[String],
) -> String {
    let elements = dc_elements(description, subject);

    let Some(xmp) = existing else {
        return fresh_packet(&elements);
    };

    let mut result = xmp.to_string();
    remove_element(&mut result, "dc:description");
    remove_element(&mut result, "dc:subject");

    if !result.contains("<rdf:Description") {
        let Some(rdf_end) = result.find("</rdf:RDF>") else {
            return fresh_packet(&elements);
        };
        let block = format!(
            "<rdf:Description rdf:about=\"\"\n  xmlns:dc=\"{}\">\n{}</rdf:Description>\n",
            DC_NS, elements
        );
        result.insert_str(rdf_end, &block);
        return result;
    }

    if !result.contains("</rdf:Description>") && !open_self_closing_description(&mut result) {
        return fresh_packet(&elements);
    }

    if !result.contains("xmlns:dc=") {
        if let Some(pos) = result.find("<rdf:Description") {
            let insert_at = pos + "<rdf:Description".len();
            result.insert_str(insert_at, &format!("\n  xmlns:dc=\"{}\"", DC_NS));
        }
    }

    if let Some(pos) = result.find("</rdf:Description>") {
        result.insert_str(pos, &elements);
    }

    result
}

fn dc_elements(description: Option<&str>, subject: &[String]) -> String {
    let mut out = String::new();

    if let Some(d) = description.filter(|d| !d.is_empty()) {
        out.push_str(&format!(
            "  <dc:description><rdf:Alt><rdf:li xml:lang=\"x-default\">{}</rdf:li></rdf:Alt></dc:description>\n",
            xml_escape(d)
        ));
    }

    if !subject.is_empty() {
        out.push_str("  <dc:subject><rdf:Bag>\n");
        for keyword in subject {
            out.push_str(&format!("    <rdf:li>{}</rdf:li>\n", xml_escape(keyword)));
        }
        out.push_str("  </rdf:Bag></dc:subject>\n");
    }

    out
}

fn fresh_packet(elements: &str) -> String {
    let mut xmp = String::new();
    xmp.push_str("<?xpacket begin=\"\u{feff}\" id=\"W5M0MpCehiHzreSzNTczkc9d\"?>\n");
    xmp.push_str("<x:xmpmeta xmlns:x=\"adobe:ns:meta/\">\n");
    xmp.push_str("<rdf:RDF xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\">\n");
    xmp.push_str("<rdf:Description rdf:about=\"\"\n");
    xmp.push_str(&format!("  xmlns:dc=\"{}\">\n", DC_NS));
    xmp.push_str(elements);
    xmp.push_str("</rdf:Description>\n");
    xmp.push_str("</rdf:RDF>\n");
    xmp.push_str("</x:xmpmeta>\n");
    xmp.push_str("<?xpacket end=\"w\"?>");
    xmp
}

/// Turn the first self-closing `<rdf:Description .../>` into an open/close
/// pair. Returns false if there is none.
fn open_self_closing_description(xml: &mut String) -> bool {
    let Some(start) = xml.find("<rdf:Description") else {
        return false;
    };
    let Some(close_rel) = xml[start..].find('>') else {
        return false;
    };
    let close = start + close_rel;
    if close == 0 || xml.as_bytes()[close - 1] != b'/' {
        return false;
    }

    xml.replace_range(close - 1..close + 1, ">\n</rdf:Description>");
    true
}

/// Remove every `<tag ...>...</tag>` or `<tag/>` element from `xml`.
fn remove_element(xml: &mut String, tag: &str) {
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);
    let mut from = 0;

    while let Some(rel) = xml[from..].find(&open) {
        let start = from + rel;
        let after = start + open.len();

        // "<dc:subjectFoo" is a different element
        match xml.as_bytes().get(after) {
            Some(b'>') | Some(b'/') | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') => {}
            _ => {
                from = after;
                continue;
            }
        }

        let Some(tag_end_rel) = xml[start..].find('>') else {
            return;
        };
        let tag_end = start + tag_end_rel;

        let end = if xml.as_bytes()[tag_end - 1] == b'/' {
            tag_end + 1
        } else {
            match xml[tag_end..].find(&close) {
                Some(rel) => tag_end + rel + close.len(),
                None => return,
            }
        };

        let start = line_start_if_blank(xml, start);
        let end = if xml.as_bytes().get(end) == Some(&b'\n') {
            end + 1
        } else {
            end
        };

        xml.replace_range(start..end, "");
        from = start;
    }
}

/// Extend `pos` back over indentation when only whitespace precedes it on
/// its line.
fn line_start_if_blank(xml: &str, pos: usize) -> usize {
    let line_start = xml[..pos].rfind('\n').map(|p| p + 1).unwrap_or(0);
    if xml[line_start..pos].chars().all(|c| c == ' ' || c == '\t') {
        line_start
    } else {
        pos
    }
}

/// Escape special XML characters.
fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
