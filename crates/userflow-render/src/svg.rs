//! SVG emission for a [`FlowScene`].
//!
//! Emits a single standalone document: an interaction-header strip, flow
//! ribbons, dropout bars, node rects and labels, with `<title>` tooltips and
//! hover CSS. Hosts that need richer interactivity consume the scene directly
//! and do their own drawing.

use crate::model::FlowScene;
use std::fmt::Write as _;

const NODE_FILL: &str = "#2196f3";
const RIBBON_STROKE: &str = "#9e9e9e";
const DROPOUT_FILL: &str = "#f44336";
const LABEL_FONT_SIZE: u32 = 10;

#[derive(Debug, Clone, Default)]
pub struct SvgRenderOptions {
    /// Root `id` of the emitted `<svg>`; also prefixes the hover CSS so
    /// multiple diagrams can share a page.
    pub diagram_id: Option<String>,
}

pub fn render_flow_svg(scene: &FlowScene, options: &SvgRenderOptions) -> String {
    let diagram_id = options.diagram_id.as_deref().unwrap_or("user-flow");
    let id_esc = escape_xml(diagram_id);
    let total_height = scene.header_height + scene.height;

    let mut out = String::new();
    let _ = write!(
        &mut out,
        r#"<svg id="{id}" xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" role="graphics-document document" aria-roledescription="user-flow">"#,
        id = id_esc,
        w = fmt_num(scene.width),
        h = fmt_num(total_height),
    );

    let _ = write!(
        &mut out,
        "<style>#{id} .link{{fill:none;stroke:{stroke};stroke-opacity:0.7}}#{id} .link:hover{{stroke-opacity:1}}#{id} .node rect{{fill:{node}}}#{id} .node:hover rect{{fill-opacity:0.85}}#{id} .dropout-node{{fill:{drop};stroke:{drop}}}</style>",
        id = id_esc,
        stroke = RIBBON_STROKE,
        node = NODE_FILL,
        drop = DROPOUT_FILL,
    );

    out.push_str(r#"<g class="headers">"#);
    for header in &scene.headers {
        let _ = write!(
            &mut out,
            r#"<text font-size="{fs}" font-weight="bold" transform="translate({x}, 10)">{text}</text>"#,
            fs = LABEL_FONT_SIZE,
            x = fmt_num(header.x),
            text = escape_xml(&header.text),
        );
    }
    out.push_str("</g>");

    let _ = write!(
        &mut out,
        r#"<g class="chart" transform="translate(0, {dy})">"#,
        dy = fmt_num(scene.header_height),
    );

    out.push_str(r#"<g class="links">"#);
    for ribbon in &scene.ribbons {
        let _ = write!(
            &mut out,
            r#"<path class="link" d="{d}" stroke-width="{sw}" data-source="{src}" data-target="{tgt}"><title>{tip}</title></path>"#,
            d = escape_xml(&ribbon.path),
            sw = fmt_num(ribbon.stroke_width),
            src = ribbon.source,
            tgt = ribbon.target,
            tip = escape_xml(&ribbon.tooltip),
        );
    }
    out.push_str("</g>");

    out.push_str(r#"<g class="dropouts">"#);
    for bar in &scene.dropout_bars {
        let _ = write!(
            &mut out,
            r#"<rect class="dropout-node" x="{x}" y="{y}" width="{w}" height="{h}" data-source="{src}"><title>{tip}</title></rect>"#,
            x = fmt_num(bar.x),
            y = fmt_num(bar.y),
            w = fmt_num(bar.width),
            h = fmt_num(bar.height),
            src = bar.source,
            tip = escape_xml(&bar.tooltip),
        );
    }
    out.push_str("</g>");

    out.push_str(r#"<g class="nodes">"#);
    for rect in &scene.node_rects {
        let _ = write!(
            &mut out,
            r#"<g class="node" data-node="{idx}"><rect x="{x}" y="{y}" width="{w}" height="{h}"><title>{tip}</title></rect></g>"#,
            idx = rect.node_index,
            x = fmt_num(rect.x),
            y = fmt_num(rect.y),
            w = fmt_num(rect.width),
            h = fmt_num(rect.height),
            tip = escape_xml(&rect.tooltip),
        );
    }
    out.push_str("</g>");

    out.push_str(r#"<g class="node-labels">"#);
    for label in &scene.node_labels {
        let _ = write!(
            &mut out,
            r#"<text x="{x}" y="{y}" dy="0.35em" font-size="{fs}" font-family="Roboto" text-anchor="start">{text}<title>{full}</title></text>"#,
            x = fmt_num(label.x),
            y = fmt_num(label.y),
            fs = LABEL_FONT_SIZE,
            text = escape_xml(&label.text),
            full = escape_xml(&label.full_text),
        );
    }
    out.push_str("</g>");

    out.push_str("</g></svg>");
    out
}

/// JS-compatible number stringification for SVG attributes: round-trippable
/// like `Number#toString()`, with `-0` and float noise from our own math
/// snapped away.
pub(crate) fn fmt_num(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if (v - nearest).abs() < 1e-6 {
        v = nearest;
    }
    let mut buf = ryu_js::Buffer::new();
    let s = buf.format(v);
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let bytes = text.as_bytes();
    let mut start = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        let esc = match b {
            b'&' => Some("&amp;"),
            b'<' => Some("&lt;"),
            b'"' => Some("&quot;"),
            b'\'' => Some("&#39;"),
            _ => None,
        };
        let Some(esc) = esc else {
            continue;
        };
        if start < i {
            out.push_str(&text[start..i]);
        }
        out.push_str(esc);
        start = i + 1;
    }
    if start < text.len() {
        out.push_str(&text[start..]);
    }
    out
}
