//! SVG floor plan renderer.
//!
//! Every polyline becomes one `<path>`; the viewport is the union of all
//! polyline bounds grown by a margin.

use std::fmt::Write;

use super::style::StyleSheet;
use crate::model::BuildingStorey;
use crate::section::{Bounds2D, Polyline2D};

/// Drawing options that are not per-class.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgOptions {
    pub background: Option<String>,
    /// Margin as a fraction of the larger extent.
    pub margin: f64,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            background: None,
            margin: 0.05,
        }
    }
}

/// Viewport `(x, y, width, height)` for a set of bounds.
pub fn view_box(bounds: &Bounds2D, margin: f64) -> (f64, f64, f64, f64) {
    if bounds.is_empty() {
        return (0.0, 0.0, 1.0, 1.0);
    }
    let extent = bounds.width().max(bounds.height());
    let pad = if extent > 0.0 { extent * margin } else { 0.5 };
    (
        bounds.min_x - pad,
        bounds.min_y - pad,
        bounds.width() + 2.0 * pad,
        bounds.height() + 2.0 * pad,
    )
}

/// Format a coordinate with up to four decimals.
fn fmt_num(v: f64) -> String {
    let s = format!("{:.4}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Path data for one polyline.
pub fn path_data(polyline: &Polyline2D) -> String {
    let mut d = String::new();
    for (i, p) in polyline.points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        if i > 0 {
            d.push(' ');
        }
        write!(d, "{} {} {}", cmd, fmt_num(p.x), fmt_num(p.y)).unwrap();
    }
    if polyline.closed {
        d.push_str(" Z");
    }
    d
}

/// SVG writer for one storey.
pub struct SvgWriter<'a> {
    output: String,
    styles: &'a StyleSheet,
    options: &'a SvgOptions,
}

impl<'a> SvgWriter<'a> {
    pub fn new(styles: &'a StyleSheet, options: &'a SvgOptions) -> Self {
        Self {
            output: String::new(),
            styles,
            options,
        }
    }

    /// Render a storey's polylines (already in output coordinates).
    pub fn render(mut self, storey: &BuildingStorey, polylines: &[Polyline2D]) -> String {
        let bounds = Bounds2D::of_polylines(polylines);
        let (x, y, w, h) = view_box(&bounds, self.options.margin);

        writeln!(self.output, r#"<?xml version="1.0" encoding="UTF-8"?>"#).unwrap();
        writeln!(
            self.output,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}" data-storey="{}" data-index="{}">"#,
            fmt_num(x),
            fmt_num(y),
            fmt_num(w),
            fmt_num(h),
            escape_xml(&storey.id),
            storey.index
        )
        .unwrap();
        writeln!(self.output, "  <title>{}</title>", escape_xml(storey.display_name())).unwrap();

        if let Some(background) = &self.options.background {
            writeln!(
                self.output,
                r#"  <rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
                fmt_num(x),
                fmt_num(y),
                fmt_num(w),
                fmt_num(h),
                escape_xml(background)
            )
            .unwrap();
        }

        for polyline in polylines {
            self.write_path(polyline);
        }

        writeln!(self.output, "</svg>").unwrap();
        self.output
    }

    fn write_path(&mut self, polyline: &Polyline2D) {
        let class = polyline.primary_class();
        let style = self.styles.resolve(&class);
        writeln!(
            self.output,
            r#"  <path d="{}" fill="none" stroke="{}" stroke-width="{}" vector-effect="non-scaling-stroke" data-class="{}" data-guids="{}"/>"#,
            path_data(polyline),
            escape_xml(&style.color),
            fmt_num(style.width),
            escape_xml(class.ifc_name()),
            escape_xml(&polyline.guids().join(" "))
        )
        .unwrap();
    }
}

/// Render one storey to an SVG document.
pub fn render_svg(
    storey: &BuildingStorey,
    polylines: &[Polyline2D],
    styles: &StyleSheet,
    options: &SvgOptions,
) -> String {
    SvgWriter::new(styles, options).render(storey, polylines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::style::LineStyle;
    use crate::model::ElementClass;
    use crate::section::ElementRef;
    use nalgebra::Point2;

    fn storey() -> BuildingStorey {
        BuildingStorey::new("S0", "Ground", 0, 0.0, 1.2)
    }

    fn rect(class: ElementClass) -> Polyline2D {
        Polyline2D::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(4.0, 0.0),
                Point2::new(4.0, -0.2),
                Point2::new(0.0, -0.2),
            ],
            true,
            vec![ElementRef {
                guid: "w<1>".to_string(),
                class,
            }],
        )
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(1.0), "1");
        assert_eq!(fmt_num(-0.00001), "0");
        assert_eq!(fmt_num(0.12345), "0.1235");
        assert_eq!(fmt_num(-2.5), "-2.5");
    }

    #[test]
    fn test_path_data_closed() {
        assert_eq!(path_data(&rect(ElementClass::Wall)), "M 0 0 L 4 0 L 4 -0.2 L 0 -0.2 Z");
    }

    #[test]
    fn test_view_box_margin() {
        let bounds = rect(ElementClass::Wall).bounds();
        let (x, y, w, h) = view_box(&bounds, 0.05);
        assert!((x + 0.2).abs() < 1e-12);
        assert!((y + 0.4).abs() < 1e-12);
        assert!((w - 4.4).abs() < 1e-12);
        assert!((h - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_render_styles_and_escaping() {
        let styles = StyleSheet::default().with_style(
            ElementClass::Wall,
            LineStyle {
                color: "#ff0000".to_string(),
                width: 2.0,
            },
        );
        let svg = render_svg(
            &storey(),
            &[rect(ElementClass::Wall), rect(ElementClass::Slab)],
            &styles,
            &SvgOptions::default(),
        );
        assert_eq!(svg.matches("<path").count(), 2);
        assert!(svg.contains(r##"stroke="#ff0000" stroke-width="2""##));
        assert!(svg.contains(r##"stroke="#000000" stroke-width="1""##));
        assert!(svg.contains("data-guids=\"w&lt;1&gt;\""));
        assert!(svg.contains("vector-effect=\"non-scaling-stroke\""));
    }

    #[test]
    fn test_empty_storey_canvas() {
        let options = SvgOptions {
            background: Some("white".to_string()),
            margin: 0.05,
        };
        let svg = render_svg(&storey(), &[], &StyleSheet::default(), &options);
        assert!(svg.contains(r#"viewBox="0 0 1 1""#));
        assert!(svg.contains(r#"<rect x="0" y="0" width="1" height="1" fill="white"/>"#));
        assert!(!svg.contains("<path"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
