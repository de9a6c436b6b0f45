//! SVG and PDF containers around the rendered raster.
//!
//! Both formats carry the PNG raster rather than re-rendering vector
//! geometry: the SVG embeds it as a base64 data URI in a fixed 1024x1024
//! viewport, and the PDF places it at full bleed on a single 270 mm square
//! page. Neither container embeds timestamps or random identifiers, so output
//! stays byte-identical for identical input.

use std::io::Write as _;

use base64::Engine as _;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use serde_json::json;

use crate::error::AppError;
use crate::qr::raster::{CANVAS_SIZE, encode_png, render_canvas};

/// PDF page edge, 270 mm in points.
const PAGE_SIZE_PT: f32 = 270.0 * 72.0 / 25.4;

/// Renders the SVG container: the PNG raster embedded as a data URI.
pub(crate) fn render_svg(
    url: &str,
    color: &str,
    background: &str,
    smoothing: f64,
) -> Result<Vec<u8>, AppError> {
    let png = encode_png(&render_canvas(url, color, background, smoothing)?)?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&png);
    let size = CANVAS_SIZE;
    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}"><image width="{size}" height="{size}" href="data:image/png;base64,{b64}"/></svg>"#,
    );
    Ok(svg.into_bytes())
}

/// Renders the PDF container: one fixed-size page with the raster at full bleed.
pub(crate) fn render_pdf(
    url: &str,
    color: &str,
    background: &str,
    smoothing: f64,
) -> Result<Vec<u8>, AppError> {
    let canvas = render_canvas(url, color, background, smoothing)?;
    let (width, height) = canvas.dimensions();

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(canvas.as_raw())
        .map_err(|e| compress_error(&e))?;
    let image_data = encoder.finish().map_err(|e| compress_error(&e))?;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        image_data,
    ));

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(PAGE_SIZE_PT),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(PAGE_SIZE_PT),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec!["Im0".into()]),
            Operation::new("Q", vec![]),
        ],
    };
    let encoded = content.encode().map_err(|e| {
        AppError::internal(
            "Failed to encode pdf content",
            json!({ "source": e.to_string() }),
        )
    })?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(PAGE_SIZE_PT),
            Object::Real(PAGE_SIZE_PT),
        ],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).map_err(|e| {
        AppError::internal("Failed to write pdf", json!({ "source": e.to_string() }))
    })?;
    Ok(out)
}

fn compress_error(e: &std::io::Error) -> AppError {
    AppError::internal(
        "Failed to compress pdf image stream",
        json!({ "source": e.to_string() }),
    )
}
