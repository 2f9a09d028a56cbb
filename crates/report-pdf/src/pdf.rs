//! PDF serialization of layouts and score table read-back

use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use posture_analysis::catalog::captions;
use posture_analysis::Region;
use tracing::debug;

use crate::config::CompilerConfig;
use crate::layout::{Color, Element, FontStyle, Layout, LOCALE, TABLE_REGION, TABLE_SCORE};
use crate::ReportError;

const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";

/// WinAnsiEncoding codes 0x80-0x9F that differ from Latin-1
const WIN_ANSI_HIGH: [(u8, char); 27] = [
    (0x80, '\u{20AC}'),
    (0x82, '\u{201A}'),
    (0x83, '\u{0192}'),
    (0x84, '\u{201E}'),
    (0x85, '\u{2026}'),
    (0x86, '\u{2020}'),
    (0x87, '\u{2021}'),
    (0x88, '\u{02C6}'),
    (0x89, '\u{2030}'),
    (0x8A, '\u{0160}'),
    (0x8B, '\u{2039}'),
    (0x8C, '\u{0152}'),
    (0x8E, '\u{017D}'),
    (0x91, '\u{2018}'),
    (0x92, '\u{2019}'),
    (0x93, '\u{201C}'),
    (0x94, '\u{201D}'),
    (0x95, '\u{2022}'),
    (0x96, '\u{2013}'),
    (0x97, '\u{2014}'),
    (0x98, '\u{02DC}'),
    (0x99, '\u{2122}'),
    (0x9A, '\u{0161}'),
    (0x9B, '\u{203A}'),
    (0x9C, '\u{0153}'),
    (0x9E, '\u{017E}'),
    (0x9F, '\u{0178}'),
];

/// Encode text for a WinAnsi standard font; characters the encoding lacks become '?'
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(encode_char).collect()
}

fn encode_char(c: char) -> u8 {
    match u32::from(c) {
        // C1 controls have no WinAnsi glyph
        0x80..=0x9F => b'?',
        code @ 0..=0xFF => code as u8,
        _ => WIN_ANSI_HIGH
            .iter()
            .find(|&&(_, mapped)| mapped == c)
            .map(|&(byte, _)| byte)
            .unwrap_or(b'?'),
    }
}

fn from_win_ansi(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| {
            WIN_ANSI_HIGH
                .iter()
                .find(|&&(byte, _)| byte == b)
                .map(|&(_, c)| c)
                .unwrap_or_else(|| char::from(b))
        })
        .collect()
}

fn fill(color: Color) -> Operation {
    Operation::new("rg", vec![color.r.into(), color.g.into(), color.b.into()])
}

fn page_operations(elements: &[Element], page_height: f32) -> Vec<Operation> {
    let mut ops = Vec::new();
    for element in elements {
        match element {
            Element::Text {
                x,
                y,
                size,
                style,
                color,
                text,
            } => {
                let font = match style {
                    FontStyle::Regular => FONT_REGULAR,
                    FontStyle::Bold => FONT_BOLD,
                };
                ops.push(fill(*color));
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new("Tf", vec![font.into(), (*size).into()]));
                ops.push(Operation::new("Td", vec![(*x).into(), (page_height - y).into()]));
                ops.push(Operation::new("Tj", vec![Object::string_literal(to_win_ansi(text))]));
                ops.push(Operation::new("ET", vec![]));
            }
            Element::Rect {
                x,
                y,
                width,
                height,
                color,
            } => {
                ops.push(fill(*color));
                ops.push(Operation::new(
                    "re",
                    vec![
                        (*x).into(),
                        (page_height - y - height).into(),
                        (*width).into(),
                        (*height).into(),
                    ],
                ));
                ops.push(Operation::new("f", vec![]));
            }
            Element::Image {
                x,
                y,
                width,
                height,
                index,
            } => {
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new(
                    "cm",
                    vec![
                        (*width).into(),
                        0.0f32.into(),
                        0.0f32.into(),
                        (*height).into(),
                        (*x).into(),
                        (page_height - y - height).into(),
                    ],
                ));
                ops.push(Operation::new("Do", vec![format!("Im{}", index).as_str().into()]));
                ops.push(Operation::new("Q", vec![]));
            }
        }
    }
    ops
}

fn image_stream(image: &image::RgbImage, quality: u8) -> Result<Stream, ReportError> {
    let mut jpeg = Vec::new();
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100));
    DynamicImage::ImageRgb8(image.clone()).write_with_encoder(encoder)?;

    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => image.width() as i64,
        "Height" => image.height() as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
        "Filter" => "DCTDecode",
    };
    Ok(Stream::new(dict, jpeg))
}

/// Serialize a layout into PDF bytes
pub fn write(
    layout: &Layout,
    config: &CompilerConfig,
    title: &str,
) -> Result<Vec<u8>, ReportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut xobjects = lopdf::Dictionary::new();
    for (i, image) in layout.images.iter().enumerate() {
        let id = doc.add_object(image_stream(image, config.jpeg_quality)?);
        xobjects.set(format!("Im{}", i), id);
    }

    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_REGULAR => regular_id,
            FONT_BOLD => bold_id,
        },
        "XObject" => xobjects,
    });

    let mut kids: Vec<Object> = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let content = Content {
            operations: page_operations(&page.elements, config.page_height),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => layout.pages.len() as i64,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), config.page_width.into(), config.page_height.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(to_win_ansi(title)),
        "Producer" => Object::string_literal("report-pdf"),
    });
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    debug!("Wrote {} page PDF ({} bytes)", layout.pages.len(), bytes.len());
    Ok(bytes)
}

/// All shown text strings of a document, in page and content order
pub fn extract_text(pdf: &[u8]) -> Result<Vec<String>, ReportError> {
    let doc = Document::load_mem(pdf)?;
    let mut strings = Vec::new();

    for (_, page_id) in doc.get_pages() {
        let content = Content::decode(&doc.get_page_content(page_id)?)?;
        for op in content.operations {
            match op.operator.as_str() {
                "Tj" | "'" => {
                    if let Some(Object::String(bytes, _)) = op.operands.first() {
                        strings.push(from_win_ansi(bytes));
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(parts)) = op.operands.first() {
                        let joined: Vec<u8> = parts
                            .iter()
                            .filter_map(|p| match p {
                                Object::String(bytes, _) => Some(bytes.as_slice()),
                                _ => None,
                            })
                            .flatten()
                            .copied()
                            .collect();
                        strings.push(from_win_ansi(&joined));
                    }
                }
                _ => {}
            }
        }
    }
    Ok(strings)
}

/// Parse the alignment score table back out of a compiled report
pub fn read_score_table(pdf: &[u8]) -> Result<Vec<(Region, f64)>, ReportError> {
    let strings = extract_text(pdf)?;
    let text = captions(LOCALE);

    let start = strings
        .iter()
        .position(|s| s == text.alignment_scores)
        .ok_or(ReportError::ScoreTableMissing)?;
    let header = strings[start..]
        .windows(2)
        .position(|w| w[0] == TABLE_REGION && w[1] == TABLE_SCORE)
        .ok_or(ReportError::ScoreTableMissing)?;

    let mut rows = Vec::new();
    let mut iter = strings[start + header + 2..].iter();
    while let Some(s) = iter.next() {
        if s == text.problems {
            break;
        }
        // Footers and repeated furniture between rows are skipped
        let Some(region) = Region::from_label(s, LOCALE) else {
            continue;
        };
        let value = iter
            .next()
            .ok_or_else(|| ReportError::MalformedTable(format!("no score after {:?}", s)))?;
        let score: f64 = value
            .parse()
            .map_err(|_| ReportError::MalformedTable(format!("{:?} is not a score", value)))?;
        rows.push((region, score));
    }
    Ok(rows)
}
