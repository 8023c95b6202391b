// Output rendering: legend, standalone HTML map, GeoJSON export, terminal summary

use crate::colors::ColorAssignment;
use crate::map::{LayerKind, MapDocument, MapLayer};
use colored::Colorize;
use drivetime_router::RetrievalStats;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Html,
    GeoJson,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "html" => Some(OutputFormat::Html),
            "geojson" | "json" => Some(OutputFormat::GeoJson),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::GeoJson => "geojson",
        }
    }
}

const LEAFLET_VERSION: &str = "1.9.4";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{TITLE}}</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@{{LEAFLET}}/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@{{LEAFLET}}/dist/leaflet.js"></script>
<style>
  body { margin: 0; font-family: sans-serif; }
  header { padding: 8px 16px; border-bottom: 1px solid #ddd; }
  header h1 { font-size: 20px; margin: 4px 0; }
  header p { margin: 2px 0; color: #555; font-size: 13px; }
  main { display: flex; height: calc(100vh - 72px); }
  #map { flex: 5; }
  aside { flex: 1; min-width: 180px; padding: 8px 12px; border-left: 1px solid #ddd; }
  aside h2 { font-size: 16px; margin: 4px 0 10px; }
  .dt-marker span { display: inline-block; width: 22px; height: 22px; border-radius: 50%;
    text-align: center; line-height: 22px; font-weight: bold; border: 1px solid #333; }
</style>
</head>
<body>
<header>
  <h1>Drive-Time Company Map</h1>
  <p>{{SUBTITLE}}</p>
</header>
<main>
  <div id="map"></div>
  <aside>
    <h2>Company Legend</h2>
    {{LEGEND}}
  </aside>
</main>
<script>
const view = {{VIEW}};
const entries = {{LAYERS}};
const map = L.map('map').setView([view.lat, view.lon], view.zoom);
L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
  maxZoom: 19,
  attribution: '&copy; OpenStreetMap contributors'
}).addTo(map);
const overlays = {};
for (const entry of entries) {
  const layer = L.geoJSON(entry.geometry, { style: entry.style }).addTo(map);
  if (entry.name) { overlays[entry.name] = layer; }
  const icon = L.divIcon({
    className: 'dt-marker',
    html: '<span style="background:' + entry.marker.color + ';color:' + entry.marker.icon_color + '">' + entry.marker.glyph + '</span>',
    iconSize: [24, 24]
  });
  L.marker([entry.marker.lat, entry.marker.lon], { icon: icon }).bindPopup(entry.marker.popup).addTo(map);
}
L.control.layers(null, overlays).addTo(map);
</script>
</body>
</html>
"#;

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Makes serialized JSON safe to place inside a `<script>` element.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

/// Color-keyed legend, one swatch per company group.
pub fn render_legend(colors: &ColorAssignment) -> String {
    let mut items = String::new();
    for (group, color) in colors.iter() {
        items.push_str(&format!(
            "<div style='margin-bottom:6px;'>\
             <span style='display:inline-block;width:14px;height:14px;\
             background:{};margin-right:8px;border:1px solid black;'></span>\
             {}</div>\n",
            escape_html(color),
            escape_html(group)
        ));
    }

    format!(
        "<div style='font-size: 14px; max-height: 500px; overflow-y: auto; padding: 4px;'>\n{}</div>",
        items
    )
}

fn layer_json(layer: &MapLayer) -> serde_json::Value {
    serde_json::json!({
        "name": layer.name.as_deref().map(escape_html),
        "kind": layer.kind,
        "geometry": layer.isochrone.geometry,
        "style": {
            "color": layer.style.color,
            "fillColor": layer.style.fill_color,
            "weight": layer.style.weight,
            "fillOpacity": layer.style.fill_opacity,
        },
        "marker": {
            "lat": layer.marker.latitude,
            "lon": layer.marker.longitude,
            "popup": escape_html(&layer.marker.popup),
            "glyph": layer.marker.icon.glyph(),
            "color": layer.marker.color,
            "icon_color": layer.marker.icon_color,
        }
    })
}

/// Standalone Leaflet page with every layer and the legend beside the map.
pub fn render_html(map: &MapDocument, legend_html: &str) -> Result<String, serde_json::Error> {
    let view = serde_json::json!({
        "lat": map.center.0,
        "lon": map.center.1,
        "zoom": map.zoom,
    });
    let layers: Vec<_> = map.layers.iter().map(layer_json).collect();

    let subtitle = format!(
        "{}-minute drive time &middot; {} projects &middot; {} company locations &middot; generated {}",
        map.duration_minutes,
        map.count(LayerKind::Project),
        map.count(LayerKind::Company),
        chrono::Utc::now().format("%Y-%m-%d %H:%M UTC")
    );

    let view = script_safe(&serde_json::to_string(&view)?);
    let layers = script_safe(&serde_json::to_string(&layers)?);

    Ok(fill_template(
        PAGE_TEMPLATE,
        &[
            ("TITLE", "Drive-Time Company Map"),
            ("LEAFLET", LEAFLET_VERSION),
            ("SUBTITLE", &subtitle),
            ("LEGEND", legend_html),
            ("VIEW", &view),
            ("LAYERS", &layers),
        ],
    ))
}

/// Substitutes `{{NAME}}` placeholders in a single scan. Inserted values are
/// never scanned again, and unknown placeholders are left as they are.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let value = after.find("}}").and_then(|end| {
            values
                .iter()
                .find(|(name, _)| *name == &after[..end])
                .map(|(_, value)| (*value, end))
        });
        match value {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// FeatureCollection with a polygon and a point feature per layer.
pub fn render_geojson(map: &MapDocument) -> serde_json::Value {
    let mut features = Vec::new();

    for layer in &map.layers {
        let label = layer
            .name
            .clone()
            .unwrap_or_else(|| layer.marker.popup.clone());

        features.push(serde_json::json!({
            "type": "Feature",
            "geometry": layer.isochrone.geometry,
            "properties": {
                "name": label,
                "kind": layer.kind,
                "color": layer.style.fill_color,
                "fill_opacity": layer.style.fill_opacity,
                "seconds": layer.isochrone.key.seconds,
            }
        }));
        features.push(serde_json::json!({
            "type": "Feature",
            "geometry": {
                "type": "Point",
                "coordinates": [layer.marker.longitude, layer.marker.latitude],
            },
            "properties": {
                "name": layer.marker.popup,
                "kind": layer.kind,
                "marker": layer.marker.icon,
                "color": layer.marker.icon_color,
            }
        }));
    }

    serde_json::json!({
        "type": "FeatureCollection",
        "features": features,
        "metadata": {
            "generator": "drivetime",
            "version": env!("CARGO_PKG_VERSION"),
            "generated_at": chrono::Utc::now().to_rfc3339(),
            "duration_minutes": map.duration_minutes,
            "center": [map.center.1, map.center.0],
        }
    })
}

/// Terminal summary of a render pass.
pub fn generate_text_summary(
    map: &MapDocument,
    colors: &ColorAssignment,
    stats: &RetrievalStats,
) -> String {
    let mut report = String::new();

    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str(&format!("{}\n", "DRIVE-TIME MAP".bold()));
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    report.push_str(&format!("Drive time:   {} minutes\n", map.duration_minutes));
    report.push_str(&format!("Center:       {:.5}, {:.5}\n", map.center.0, map.center.1));
    report.push_str(&format!("Projects:     {}\n", map.count(LayerKind::Project)));
    report.push_str(&format!("Companies:    {}\n", map.count(LayerKind::Company)));
    report.push_str(&format!(
        "Provider:     {} calls, {} cache hits\n\n",
        stats.calls, stats.hits
    ));

    report.push_str(&format!("{}\n", "Company Legend".bold()));
    if colors.is_empty() {
        report.push_str("  (no companies)\n");
    }
    for (group, color) in colors.iter() {
        report.push_str(&format!("  {} {}\n", hex_swatch(color), group));
    }

    report
}

fn hex_swatch(color: &str) -> String {
    let hex = color.trim_start_matches('#');
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .unwrap_or(0)
    };
    "■■".truecolor(channel(0), channel(2), channel(4)).to_string()
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
