//! Status rendering: metrics exposition text and the HTML status page.
//!
//! Both renderers take one guarded snapshot, so every field in a single
//! response comes from the same measurement cycle.  The pure functions
//! [`metrics_text`] and [`page_html`] do the formatting; [`ReportRenderer`]
//! wraps them around a [`SnapshotHandle`].

pub mod server;

use core::fmt::Write as _;

use crate::measurement::{Snapshot, SnapshotHandle};

/// Reported in the `measurement_count` version label.
pub const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";
pub const HTML_CONTENT_TYPE: &str = "text/html";

/// Byte offset of the request target in `GET <target> HTTP/1.x`.
const TARGET_OFFSET: usize = 4;
const METRICS_PATH: &[u8] = b"/metrics";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Metrics,
    Page,
}

/// `/metrics` exactly at the target offset selects the exposition;
/// everything else gets the page.
pub fn route(request_line: &[u8]) -> Route {
    match request_line.get(TARGET_OFFSET..TARGET_OFFSET + METRICS_PATH.len()) {
        Some(target) if target == METRICS_PATH => Route::Metrics,
        _ => Route::Page,
    }
}

fn gauge(out: &mut String, name: &str, help: &str, value: impl core::fmt::Display) {
    let _ = writeln!(out, "# HELP {name} {help}");
    let _ = writeln!(out, "# TYPE {name} gauge");
    let _ = writeln!(out, "{name} {value}");
}

/// Exposition text for one snapshot.
///
/// Floats use the shortest representation that parses back to the same
/// `f32`.
pub fn metrics_text(snapshot: &Snapshot, version: &str) -> String {
    let s = &snapshot.measurement.sample;
    let mut out = String::with_capacity(1024);

    gauge(&mut out, "indoor_temp", "Indoor temperature in degree Celsius.", s.indoor_temp);
    gauge(&mut out, "indoor_hum", "Indoor humidity in percent.", s.indoor_hum);
    gauge(&mut out, "indoor_dew_point", "Indoor dew point in degree Celsius.", s.indoor_dew_point);
    gauge(&mut out, "outdoor_temp", "Outdoor temperature in degree Celsius.", s.outdoor_temp);
    gauge(&mut out, "outdoor_hum", "Outdoor humidity in percent.", s.outdoor_hum);
    gauge(
        &mut out,
        "outdoor_dew_point",
        "Outdoor dew point in degree Celsius.",
        s.outdoor_dew_point,
    );

    let _ = writeln!(
        out,
        "# HELP measurement_count Counter for the measurements taken since startup."
    );
    let _ = writeln!(out, "# TYPE measurement_count counter");
    let _ = writeln!(
        out,
        "measurement_count{{version=\"{version}\"}} {}",
        snapshot.measurement.counter
    );

    gauge(
        &mut out,
        "measure_control_duration",
        "Duration of the last measurement cycle in microseconds.",
        snapshot.cycle_duration_us,
    );
    gauge(&mut out, "fan_control", "Fan Control (1: on, 0: off)", u8::from(snapshot.fan.commanded));
    gauge(&mut out, "fan_state", "Fan state (1: on, 0: off)", u8::from(snapshot.fan.sensed));

    out
}

/// Human-readable status page for one snapshot.
pub fn page_html(snapshot: &Snapshot) -> String {
    let s = &snapshot.measurement.sample;
    let mut out = String::with_capacity(512);
    let _ = write!(
        out,
        "<!DOCTYPE html>\n\
         <html>\n\
         <head> <title>Dew Point Fan Controller</title> </head>\n\
         <body> <h1>Dew Point Fan Controller</h1>\n\
         <p><pre>{}\n\
         out: {:.1}&#176;C, {:.1}%\n\
         in:  {:.1}&#176;C, {:.1}%\n\
         Ti: {:.1}&#176;C To: {:.1}&#176;C\n\
         Fan Control: {}\n\
         Fan State: {}</pre></p>\n\
         </body>\n\
         </html>\n",
        snapshot.measurement.timestamp,
        s.outdoor_temp,
        s.outdoor_hum,
        s.indoor_temp,
        s.indoor_hum,
        s.indoor_dew_point,
        s.outdoor_dew_point,
        snapshot.fan.commanded,
        snapshot.fan.sensed,
    );
    out
}

/// Renders responses from the shared measurement record.
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    handle: SnapshotHandle,
    version: &'static str,
}

impl ReportRenderer {
    pub fn new(handle: SnapshotHandle) -> Self {
        Self { handle, version: FIRMWARE_VERSION }
    }

    pub fn render_metrics(&self) -> String {
        self.handle.with_snapshot(|s| metrics_text(s, self.version))
    }

    pub fn render_page(&self) -> String {
        self.handle.with_snapshot(page_html)
    }

    /// Content type and body for a route.
    pub fn render(&self, route: Route) -> (&'static str, String) {
        match route {
            Route::Metrics => (METRICS_CONTENT_TYPE, self.render_metrics()),
            Route::Page => (HTML_CONTENT_TYPE, self.render_page()),
        }
    }
}
