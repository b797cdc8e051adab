use std::io::Cursor;

use anyhow::{Context, Result};
use image::{ImageFormat, Luma};
use qrcode::QrCode;
use qrcode::render::svg;

pub const DEFAULT_SIZE: u32 = 256;

/// Encode `data` as an SVG QR code of at least `size` pixels square
pub fn render_svg(data: &str, size: u32) -> Result<String> {
    let qr_code = QrCode::new(data.as_bytes()).context("QR code generation error")?;

    Ok(qr_code
        .render::<svg::Color>()
        .min_dimensions(size, size)
        .quiet_zone(true)
        .build())
}

/// Encode `data` as a PNG QR code of at least `size` pixels square
pub fn render_png(data: &str, size: u32) -> Result<Vec<u8>> {
    let qr_code = QrCode::new(data.as_bytes()).context("QR code generation error")?;

    let img = qr_code
        .render::<Luma<u8>>()
        .min_dimensions(size, size)
        .quiet_zone(true)
        .build();

    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .context("PNG encoding error")?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://localhost:8080/scan/abc123";

    #[test]
    fn svg_output_is_an_svg_document() {
        let svg = render_svg(URL, DEFAULT_SIZE).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
    }

    #[test]
    fn png_output_has_png_signature() {
        let png = render_png(URL, 128).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
