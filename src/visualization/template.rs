//! Static parts of the rendered map page
//!
//! The page loads Leaflet and its plugins from public CDNs and builds every
//! layer client-side from one JSON payload substituted for
//! [`DATA_PLACEHOLDER`].

/// Marker replaced by the JSON payload
pub(crate) const DATA_PLACEHOLDER: &str = "__VARUNA_MAP_DATA__";

/// Temperature color ramp, cold to warm
pub(crate) const TEMPERATURE_COLORS: [&str; 7] = [
    "#000080", "#0000FF", "#00FFFF", "#00FF00", "#FFFF00", "#FF8000", "#FF0000",
];

/// Salinity color ramp, fresh to saline
pub(crate) const SALINITY_COLORS: [&str; 7] = [
    "#E8F4FD", "#B3D9F2", "#7FBEE3", "#4BA3D0", "#1F88BD", "#0F6DAA", "#0A5297",
];

pub(crate) const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Varuna Lens - Ocean Map</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.css">
<link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.Default.css">
<link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/4.7.0/css/font-awesome.min.css">
<link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.css">
<link rel="stylesheet" href="https://unpkg.com/leaflet.fullscreen@2.4.0/Control.FullScreen.css">
<link rel="stylesheet" href="https://unpkg.com/leaflet-measure@3.1.0/dist/leaflet-measure.css">
<link rel="stylesheet" href="https://cdn.jsdelivr.net/gh/ardhi/Leaflet.MousePosition/src/L.Control.MousePosition.min.css">
<link rel="stylesheet" href="https://unpkg.com/leaflet-minimap@3.6.1/dist/Control.MiniMap.min.css">
<link rel="stylesheet" href="https://unpkg.com/leaflet-draw@1.0.4/dist/leaflet.draw.css">
<style>
html, body, #map { height: 100%; width: 100%; margin: 0; padding: 0; }
.legend { background: rgba(255, 255, 255, 0.9); padding: 6px 10px; border-radius: 4px; font: 12px Arial, sans-serif; }
.legend-bar { width: 200px; height: 10px; margin: 4px 0; }
.legend-labels { display: flex; justify-content: space-between; }
</style>
</head>
<body>
<div id="map"></div>
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<script src="https://unpkg.com/leaflet.markercluster@1.5.3/dist/leaflet.markercluster.js"></script>
<script src="https://unpkg.com/leaflet.heat@0.2.0/dist/leaflet-heat.js"></script>
<script src="https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.js"></script>
<script src="https://unpkg.com/leaflet.fullscreen@2.4.0/Control.FullScreen.js"></script>
<script src="https://unpkg.com/leaflet-measure@3.1.0/dist/leaflet-measure.js"></script>
<script src="https://cdn.jsdelivr.net/gh/ardhi/Leaflet.MousePosition/src/L.Control.MousePosition.min.js"></script>
<script src="https://unpkg.com/leaflet-minimap@3.6.1/dist/Control.MiniMap.min.js"></script>
<script src="https://unpkg.com/leaflet-draw@1.0.4/dist/leaflet.draw.js"></script>
<script>
(function (data) {
  var osmUrl = 'https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png';
  var map = L.map('map', { center: data.center, zoom: data.zoom, preferCanvas: true });
  L.control.scale().addTo(map);

  var ocean = L.tileLayer('https://server.arcgisonline.com/ArcGIS/rest/services/Ocean/World_Ocean_Base/MapServer/tile/{z}/{y}/{x}', { attribution: 'Esri Ocean Basemap' }).addTo(map);
  var satellite = L.tileLayer('https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}', { attribution: 'Esri Satellite' });
  var street = L.tileLayer(osmUrl, { attribution: '&copy; OpenStreetMap contributors' });
  var bathymetry = L.tileLayer('https://tiles.arcgis.com/tiles/C8EMgrsFcRFL6LrL/arcgis/rest/services/GEBCO_basemap_NCEI/MapServer/tile/{z}/{y}/{x}', { attribution: 'GEBCO Bathymetry', opacity: 0.6 }).addTo(map);

  var baseLayers = { 'Ocean Base': ocean, 'Satellite': satellite, 'Street Map': street };
  var overlays = { 'Bathymetry': bathymetry };

  function icon(name, color) {
    return L.AwesomeMarkers.icon({ icon: name, markerColor: color, prefix: 'fa' });
  }

  if (data.floats.length) {
    var cluster = L.markerClusterGroup({ disableClusteringAtZoom: 10, maxClusterRadius: 50 });
    data.floats.forEach(function (f) {
      L.marker([f.latitude, f.longitude], { icon: icon(f.icon, f.color) })
        .bindPopup(f.popup, { maxWidth: 300 })
        .bindTooltip(f.tooltip)
        .addTo(cluster);
    });
    cluster.addTo(map);
    overlays['ARGO Floats'] = cluster;
  }

  function heatLayer(layer) {
    return L.heatLayer(layer.points, {
      minOpacity: 0.3, maxZoom: 18, radius: 20, blur: 15, max: layer.max, gradient: layer.gradient
    });
  }
  if (data.temperature) {
    overlays[data.temperature.name] = heatLayer(data.temperature).addTo(map);
  }
  if (data.salinity) {
    overlays[data.salinity.name] = heatLayer(data.salinity).addTo(map);
  }

  if (data.legend) {
    var legend = L.control({ position: 'bottomright' });
    legend.onAdd = function () {
      var div = L.DomUtil.create('div', 'legend');
      div.innerHTML = '<div>' + data.legend.caption + '</div>'
        + '<div class="legend-bar" style="background: linear-gradient(to right, ' + data.legend.colors.join(', ') + ')"></div>'
        + '<div class="legend-labels"><span>' + data.legend.min + '</span><span>' + data.legend.max + '</span></div>';
      return div;
    };
    legend.addTo(map);
  }

  if (data.trajectories.length) {
    var paths = L.featureGroup();
    data.trajectories.forEach(function (t) {
      L.polyline(t.path, { color: 'blue', weight: 3, opacity: 0.7 }).bindPopup(t.popup).addTo(paths);
      L.marker(t.start.position, { icon: icon('play', 'green') })
        .bindPopup(t.start.popup).bindTooltip(t.start.tooltip).addTo(paths);
      L.marker(t.latest.position, { icon: icon('stop', 'red') })
        .bindPopup(t.latest.popup).bindTooltip(t.latest.tooltip).addTo(paths);
    });
    paths.addTo(map);
    overlays['Float Trajectories'] = paths;
  }

  L.control.layers(baseLayers, overlays, { position: 'topright' }).addTo(map);
  L.control.fullscreen({ position: 'topleft', title: 'Fullscreen', titleCancel: 'Exit fullscreen', forceSeparateButton: true }).addTo(map);
  L.control.measure({
    position: 'topleft', primaryLengthUnit: 'kilometers', secondaryLengthUnit: 'miles',
    primaryAreaUnit: 'sqkilometers', secondaryAreaUnit: 'acres'
  }).addTo(map);
  L.control.mousePosition().addTo(map);
  new L.Control.MiniMap(L.tileLayer(osmUrl), {
    position: 'bottomleft', width: 150, height: 150, collapsedWidth: 25, collapsedHeight: 25, toggleDisplay: true
  }).addTo(map);

  var drawn = new L.FeatureGroup().addTo(map);
  map.addControl(new L.Control.Draw({
    position: 'topleft',
    edit: { featureGroup: drawn },
    draw: { polyline: true, polygon: true, circle: false, rectangle: true, marker: true, circlemarker: false }
  }));
  map.on(L.Draw.Event.CREATED, function (e) { drawn.addLayer(e.layer); });
})(__VARUNA_MAP_DATA__);
</script>
</body>
</html>
"#;
