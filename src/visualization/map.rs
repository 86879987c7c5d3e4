//! Interactive ocean map
//!
//! [`OceanMap`] collects the datasets to show and renders a standalone HTML
//! page. Popups and tooltips are rendered here, with every interpolated
//! value HTML-escaped; the page script only places them.

use super::template::{DATA_PLACEHOLDER, PAGE, SALINITY_COLORS, TEMPERATURE_COLORS};
use crate::error::Result;
use crate::types::{FloatMarker, FloatStatus, FloatTrajectory, HeatmapPoint, TrajectoryPoint};
use serde_json::{json, Map, Value};

/// Default map center (Arabian Sea)
pub const DEFAULT_CENTER: (f64, f64) = (15.0, 68.0);

/// Default zoom level
pub const DEFAULT_ZOOM: u8 = 6;

/// Builder for the interactive map page
#[derive(Debug, Clone)]
pub struct OceanMap {
    center_lat: f64,
    center_lon: f64,
    zoom: u8,
    floats: Vec<FloatMarker>,
    temperature: Vec<HeatmapPoint>,
    salinity: Vec<HeatmapPoint>,
    trajectories: Vec<FloatTrajectory>,
}

impl Default for OceanMap {
    fn default() -> Self {
        Self::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1, DEFAULT_ZOOM)
    }
}

impl OceanMap {
    /// Empty map centered on `(center_lat, center_lon)`
    pub fn new(center_lat: f64, center_lon: f64, zoom: u8) -> Self {
        Self {
            center_lat,
            center_lon,
            zoom,
            floats: Vec::new(),
            temperature: Vec::new(),
            salinity: Vec::new(),
            trajectories: Vec::new(),
        }
    }

    /// Add the clustered float marker layer
    pub fn with_floats(mut self, floats: Vec<FloatMarker>) -> Self {
        self.floats = floats;
        self
    }

    /// Add the temperature heatmap and its legend
    pub fn with_temperature_heatmap(mut self, points: Vec<HeatmapPoint>) -> Self {
        self.temperature = points;
        self
    }

    /// Add the salinity heatmap
    pub fn with_salinity_heatmap(mut self, points: Vec<HeatmapPoint>) -> Self {
        self.salinity = points;
        self
    }

    /// Add the trajectory layer
    pub fn with_trajectories(mut self, trajectories: Vec<FloatTrajectory>) -> Self {
        self.trajectories = trajectories;
        self
    }

    /// Render the full HTML document
    pub fn render(&self) -> Result<String> {
        let payload = serde_json::to_string(&self.payload())?;
        Ok(PAGE.replacen(DATA_PLACEHOLDER, &script_safe(&payload), 1))
    }

    fn payload(&self) -> Value {
        json!({
            "center": [self.center_lat, self.center_lon],
            "zoom": self.zoom,
            "floats": self.floats.iter().map(float_entry).collect::<Vec<_>>(),
            "temperature": heat_layer("Temperature", &self.temperature, &TEMPERATURE_COLORS),
            "salinity": heat_layer("Salinity", &self.salinity, &SALINITY_COLORS),
            "legend": temperature_legend(&self.temperature),
            "trajectories": self
                .trajectories
                .iter()
                .filter(|t| t.points.len() >= 2)
                .filter_map(trajectory_entry)
                .collect::<Vec<_>>(),
        })
    }
}

// ============================================================================
// Layer payloads
// ============================================================================

fn status_style(status: FloatStatus) -> (&'static str, &'static str) {
    match status {
        FloatStatus::Active => ("green", "play"),
        FloatStatus::Inactive => ("red", "stop"),
        FloatStatus::Maintenance => ("orange", "wrench"),
    }
}

fn float_entry(float: &FloatMarker) -> Value {
    let (color, icon) = status_style(float.status);
    json!({
        "latitude": float.latitude,
        "longitude": float.longitude,
        "color": color,
        "icon": icon,
        "tooltip": format!("Float {} - {}", escape_html(&float.id), float.status.label()),
        "popup": float_popup(float, color),
    })
}

fn float_popup(float: &FloatMarker, color: &str) -> String {
    let mut rows = vec![
        popup_row(
            "Status",
            &format!(
                r#"<span style="color: {color}; font-weight: bold;">{}</span>"#,
                float.status.label()
            ),
        ),
        popup_row(
            "Position",
            &format!("{:.3}°, {:.3}°", float.latitude, float.longitude),
        ),
    ];
    if let Some(t) = float.temperature {
        rows.push(popup_row("Temperature", &format!("{t:.1}°C")));
    }
    if let Some(s) = float.salinity {
        rows.push(popup_row("Salinity", &format!("{s:.1} PSU")));
    }
    if let Some(d) = float.depth {
        rows.push(popup_row("Depth", &format!("{d:.0}m")));
    }
    if let Some(ts) = float.last_update {
        rows.push(popup_row(
            "Last Update",
            &ts.format("%Y-%m-%d %H:%M UTC").to_string(),
        ));
    }

    format!(
        concat!(
            r#"<div style="width: 280px; font-family: Arial, sans-serif;">"#,
            r#"<h4 style="margin: 0 0 10px 0; color: #2c3e50;">"#,
            r#"<i class="fa fa-tint" style="color: {color};"></i> Float {id}</h4>"#,
            r#"<table style="width: 100%; font-size: 12px;">{rows}</table></div>"#
        ),
        color = color,
        id = escape_html(&float.id),
        rows = rows.concat(),
    )
}

fn popup_row(label: &str, value: &str) -> String {
    format!("<tr><td><strong>{label}:</strong></td><td>{value}</td></tr>")
}

/// Leaflet.heat gradient: evenly spaced stops over the ramp
fn gradient(colors: &[&str]) -> Map<String, Value> {
    let last = colors.len().saturating_sub(1).max(1) as f64;
    colors
        .iter()
        .enumerate()
        .map(|(i, c)| (format!("{:.2}", i as f64 / last), Value::from(*c)))
        .collect()
}

fn value_range(points: &[HeatmapPoint]) -> Option<(f64, f64)> {
    points.iter().map(|p| p.value).fold(None::<(f64, f64)>, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

fn heat_layer(name: &str, points: &[HeatmapPoint], colors: &[&str]) -> Value {
    let Some((_, max)) = value_range(points) else {
        return Value::Null;
    };
    json!({
        "name": name,
        "max": max,
        "gradient": gradient(colors),
        "points": points
            .iter()
            .map(|p| [p.latitude, p.longitude, p.value])
            .collect::<Vec<_>>(),
    })
}

fn temperature_legend(points: &[HeatmapPoint]) -> Value {
    match value_range(points) {
        Some((min, max)) => json!({
            "caption": "Temperature (°C)",
            "colors": TEMPERATURE_COLORS,
            "min": format!("{min:.1}"),
            "max": format!("{max:.1}"),
        }),
        None => Value::Null,
    }
}

fn endpoint(id: &str, label: &str, point: &TrajectoryPoint) -> Value {
    json!({
        "position": [point.latitude, point.longitude],
        "popup": format!(
            "Float {id} - {label}<br>{}",
            point.timestamp.format("%Y-%m-%d %H:%M")
        ),
        "tooltip": format!("{label}: {id}"),
    })
}

fn trajectory_entry(trajectory: &FloatTrajectory) -> Option<Value> {
    let (first, last) = (trajectory.points.first()?, trajectory.points.last()?);
    let id = escape_html(&trajectory.float_id);
    Some(json!({
        "path": trajectory
            .points
            .iter()
            .map(|p| [p.latitude, p.longitude])
            .collect::<Vec<_>>(),
        "popup": format!("Float {id} Trajectory"),
        "start": endpoint(&id, "Start", first),
        "latest": endpoint(&id, "Latest", last),
    }))
}

// ============================================================================
// Escaping
// ============================================================================

/// Escape text for HTML element content and attribute values
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Make serialized JSON safe to inline in a `<script>` element
///
/// `<`, `>` and `&` only occur inside JSON strings, where the `\u` escapes
/// decode to the same characters.
fn script_safe(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParameterName;
    use chrono::{Duration, TimeZone, Utc};

    fn float(id: &str, status: FloatStatus) -> FloatMarker {
        FloatMarker {
            id: id.to_string(),
            latitude: 15.0,
            longitude: 68.0,
            temperature: Some(28.4),
            salinity: Some(35.2),
            status,
            last_update: Some(Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap()),
            depth: Some(12.0),
        }
    }

    fn heat(value: f64) -> HeatmapPoint {
        HeatmapPoint {
            latitude: 12.0,
            longitude: 70.0,
            value,
            parameter: ParameterName::Temperature,
        }
    }

    fn trajectory(id: &str, n: usize) -> FloatTrajectory {
        let base = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        FloatTrajectory {
            float_id: id.to_string(),
            points: (0..n)
                .map(|i| TrajectoryPoint {
                    latitude: 10.0 + i as f64 * 0.1,
                    longitude: 70.0,
                    timestamp: base + Duration::days(3 * i as i64),
                })
                .collect(),
        }
    }

    #[test]
    fn test_empty_map_renders_base_layers() {
        let html = OceanMap::default().render().unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("World_Ocean_Base"));
        assert!(html.contains("GEBCO_basemap_NCEI"));
        assert!(html.contains(r#""center":[15.0,68.0]"#));
        assert!(!html.contains(DATA_PLACEHOLDER));
    }

    #[test]
    fn test_float_status_styles() {
        let map = OceanMap::default().with_floats(vec![
            float("F001", FloatStatus::Active),
            float("F002", FloatStatus::Maintenance),
        ]);
        let payload = map.payload();
        let floats = payload["floats"].as_array().unwrap();
        assert_eq!(floats[0]["color"], "green");
        assert_eq!(floats[0]["icon"], "play");
        assert_eq!(floats[1]["color"], "orange");
        assert_eq!(floats[1]["icon"], "wrench");
        assert_eq!(floats[1]["tooltip"], "Float F002 - Maintenance");

        let popup = floats[0]["popup"].as_str().unwrap();
        assert!(popup.contains("28.4°C"));
        assert!(popup.contains("35.2 PSU"));
        assert!(popup.contains("12m"));
        assert!(popup.contains("2024-05-01 08:30 UTC"));
    }

    #[test]
    fn test_hostile_ids_cannot_escape_script() {
        let html = OceanMap::default()
            .with_floats(vec![float("</script><script>alert(1)</script>", FloatStatus::Active)])
            .render()
            .unwrap();
        assert_eq!(html.matches("</script>").count(), html.matches("<script").count());
        assert!(!html.contains("alert(1)</script>"));
    }

    #[test]
    fn test_short_trajectories_are_skipped() {
        let map = OceanMap::default()
            .with_trajectories(vec![trajectory("F001", 10), trajectory("F002", 1)]);
        let payload = map.payload();
        let trajectories = payload["trajectories"].as_array().unwrap();
        assert_eq!(trajectories.len(), 1);
        assert_eq!(trajectories[0]["path"].as_array().unwrap().len(), 10);
        assert_eq!(trajectories[0]["start"]["tooltip"], "Start: F001");
        assert_eq!(
            trajectories[0]["latest"]["popup"],
            "Float F001 - Latest<br>2024-04-28 00:00"
        );
    }

    #[test]
    fn test_temperature_legend_spans_data() {
        let map = OceanMap::default().with_temperature_heatmap(vec![heat(24.3), heat(31.7)]);
        let payload = map.payload();
        assert_eq!(payload["legend"]["min"], "24.3");
        assert_eq!(payload["legend"]["max"], "31.7");
        assert_eq!(payload["temperature"]["points"].as_array().unwrap().len(), 2);
        assert!(payload["salinity"].is_null());

        assert!(OceanMap::default().payload()["legend"].is_null());
    }

    #[test]
    fn test_gradient_stops() {
        let stops = gradient(&TEMPERATURE_COLORS);
        assert_eq!(stops.len(), 7);
        assert_eq!(stops["0.00"], "#000080");
        assert_eq!(stops["1.00"], "#FF0000");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;"
        );
    }
}
