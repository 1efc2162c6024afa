// Web-Modul: eingebettetes Dashboard
//
// Routing und Antworten baut der RequestHandler aus station-core.

// HTML-Datei zur Compile-Zeit einbinden
// Die Datei wird direkt ins Binary eingebettet
pub const DASHBOARD_HTML: &str = include_str!("dashboard.html");
