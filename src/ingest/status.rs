/// Parser for the IP-100 `status.xml` document.
///
/// Document shape:
///
/// ```text
/// <status>
///   <hardware>           nested elements, leaves carry text
///     <name>IP-100</name>
///     <firmware><version>..</version></firmware>
///     <base_units>English</base_units>
///   </hardware>
///   <weather>
///     <wind>             four fixed grandchildren
///       <speed/> <direction/> <gust_speed/> <gust_direction/>
///     </wind>
///     <humidity><current>54</current></humidity>
///     ...                any sensor with a <current> child
///   </weather>
/// </status>
/// ```
///
/// Parsing is lenient: a malformed document or a foreign root element
/// yields an empty reading and a log line rather than an error, so one bad
/// response from the station never aborts a polling session.

use crate::model::{FieldValue, FlatReading};
use log::{debug, error};
use roxmltree::{Document, Node};

const LOG_TARGET: &str = "ip100::parse";

/// Root element of a status document.
pub const STATUS_ROOT: &str = "status";

const HARDWARE: &str = "hardware";
const WEATHER: &str = "weather";
const WIND: &str = "wind";
const CURRENT: &str = "current";

/// Grandchildren of `<wind>` and the flat fields they land in.
const WIND_FIELDS: &[(&str, &str)] = &[
    ("speed", "wind_speed"),
    ("direction", "wind_dir"),
    ("gust_speed", "gust_speed"),
    ("gust_direction", "gust_dir"),
];

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Flattens a raw status document into device-native fields.
///
/// Never fails. Returns an empty reading when the bytes are not UTF-8, not
/// well-formed XML, or not rooted at `<status>`.
pub fn parse_status(data: &[u8]) -> FlatReading {
    let mut reading = FlatReading::new();

    let text = match std::str::from_utf8(data) {
        Ok(text) => text,
        Err(e) => {
            debug!(target: LOG_TARGET, "parse failed: body is not UTF-8: {}", e);
            return reading;
        }
    };

    let doc = match Document::parse(text) {
        Ok(doc) => doc,
        Err(e) => {
            debug!(target: LOG_TARGET, "parse failed: {}", e);
            return reading;
        }
    };

    let root = doc.root_element();
    if root.tag_name().name() != STATUS_ROOT {
        error!(
            target: LOG_TARGET,
            "no status element in data (root is <{}>)",
            root.tag_name().name()
        );
        return reading;
    }

    // Hardware first, weather second: weather wins a name collision.
    if let Some(hardware) = child_element(root, HARDWARE) {
        merge_last_write_wins(&mut reading, flatten_hardware(hardware));
    }
    if let Some(weather) = child_element(root, WEATHER) {
        merge_last_write_wins(&mut reading, parse_weather(weather));
    }

    reading
}

/// Copies every entry of `newer` into `target`, replacing existing keys.
///
/// This is the only merge rule the parser uses: entries processed later in
/// document order overwrite earlier ones with the same tag name.
pub fn merge_last_write_wins(target: &mut FlatReading, newer: FlatReading) {
    for (key, value) in newer {
        target.insert(key, value);
    }
}

// ---------------------------------------------------------------------------
// Hardware subtree
// ---------------------------------------------------------------------------

/// Recursively flattens an element: leaves contribute `tag → text`,
/// elements with children are flattened and merged in place.
pub fn flatten_hardware(node: Node) -> FlatReading {
    let mut reading = FlatReading::new();

    for child in node.children().filter(|n| n.is_element()) {
        if has_element_children(child) {
            merge_last_write_wins(&mut reading, flatten_hardware(child));
        } else {
            let text = child.text().map(str::trim).unwrap_or("");
            reading.insert(
                child.tag_name().name().to_string(),
                FieldValue::Text(text.to_string()),
            );
        }
    }

    reading
}

// ---------------------------------------------------------------------------
// Weather subtree
// ---------------------------------------------------------------------------

/// Shapes a child of `<weather>` can take.
#[derive(Debug)]
enum WeatherElement<'a, 'input> {
    /// `<wind>` with speed/direction/gust grandchildren.
    Wind(Node<'a, 'input>),
    /// Any other sensor carrying a `<current>` reading.
    Simple {
        tag: &'a str,
        current: Node<'a, 'input>,
    },
    /// Neither of the above; dropped.
    Unrecognized(&'a str),
}

impl<'a, 'input> WeatherElement<'a, 'input> {
    fn classify(node: Node<'a, 'input>) -> Self {
        let tag = node.tag_name().name();
        if tag == WIND {
            return WeatherElement::Wind(node);
        }
        match child_element(node, CURRENT) {
            Some(current) => WeatherElement::Simple { tag, current },
            None => WeatherElement::Unrecognized(tag),
        }
    }
}

/// Extracts numeric sensor readings from the `<weather>` subtree.
pub fn parse_weather(node: Node) -> FlatReading {
    let mut reading = FlatReading::new();

    for child in node.children().filter(|n| n.is_element()) {
        match WeatherElement::classify(child) {
            WeatherElement::Wind(wind) => {
                for (grandchild, field) in WIND_FIELDS {
                    match child_element(wind, grandchild).and_then(numeric_text) {
                        Some(value) => {
                            reading.insert(field.to_string(), FieldValue::Number(value));
                        }
                        None => {
                            debug!(target: LOG_TARGET, "wind has no numeric <{}>", grandchild);
                        }
                    }
                }
            }
            WeatherElement::Simple { tag, current } => match numeric_text(current) {
                Some(value) => {
                    reading.insert(tag.to_string(), FieldValue::Number(value));
                }
                None => {
                    debug!(
                        target: LOG_TARGET,
                        "ignored {}: current value {:?} is not numeric",
                        tag,
                        current.text()
                    );
                }
            },
            WeatherElement::Unrecognized(tag) => {
                debug!(target: LOG_TARGET, "ignored {}", tag);
            }
        }
    }

    reading
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn child_element<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn has_element_children(node: Node) -> bool {
    node.children().any(|n| n.is_element())
}

fn numeric_text(node: Node) -> Option<f64> {
    node.text().and_then(|t| t.trim().parse().ok())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fixtures::*;

    fn number(reading: &FlatReading, key: &str) -> f64 {
        match reading.get(key) {
            Some(FieldValue::Number(v)) => *v,
            other => panic!("{} should be a number, got {:?}", key, other),
        }
    }

    fn text<'r>(reading: &'r FlatReading, key: &str) -> &'r str {
        match reading.get(key) {
            Some(FieldValue::Text(s)) => s.as_str(),
            other => panic!("{} should be text, got {:?}", key, other),
        }
    }

    // --- Happy path ---------------------------------------------------------

    #[test]
    fn test_parse_english_station_hardware_leaves() {
        let reading = parse_status(fixture_status_english_xml().as_bytes());

        assert_eq!(text(&reading, "name"), "IP-100");
        assert_eq!(text(&reading, "base_units"), "English");
        assert_eq!(text(&reading, "mac_address"), "00:0D:B5:12:34:56");
        // nested under <firmware>, flattened to the top level
        assert_eq!(text(&reading, "version"), "2.45");
        assert_eq!(text(&reading, "date"), "2015-11-02");
    }

    #[test]
    fn test_parse_english_station_weather_values() {
        let reading = parse_status(fixture_status_english_xml().as_bytes());

        assert!((number(&reading, "temperature_outside") - 71.5).abs() < 1e-9);
        assert!((number(&reading, "temperature_inside") - 68.0).abs() < 1e-9);
        assert!((number(&reading, "humidity") - 54.0).abs() < 1e-9);
        assert!((number(&reading, "pressure") - 29.92).abs() < 1e-9);
        assert!((number(&reading, "precipitation") - 0.12).abs() < 1e-9);
        assert!((number(&reading, "solar_radiation") - 612.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_wind_grandchildren_into_four_fields() {
        let reading = parse_status(fixture_status_english_xml().as_bytes());

        assert!((number(&reading, "wind_speed") - 4.0).abs() < 1e-9);
        assert!((number(&reading, "wind_dir") - 225.0).abs() < 1e-9);
        assert!((number(&reading, "gust_speed") - 9.5).abs() < 1e-9);
        assert!((number(&reading, "gust_dir") - 240.0).abs() < 1e-9);
        assert!(!reading.contains_key("wind"), "wind itself is not a field");
    }

    #[test]
    fn test_parse_yields_exactly_reachable_leaves() {
        let reading = parse_status(fixture_status_english_xml().as_bytes());
        let keys: Vec<&str> = reading.keys().map(String::as_str).collect();

        assert_eq!(
            keys,
            vec![
                "base_units",
                "date",
                "gust_dir",
                "gust_speed",
                "humidity",
                "mac_address",
                "name",
                "precipitation",
                "pressure",
                "solar_radiation",
                "temperature_inside",
                "temperature_outside",
                "version",
                "wind_dir",
                "wind_speed",
            ]
        );
    }

    #[test]
    fn test_unrecognized_weather_child_is_dropped() {
        let reading = parse_status(fixture_status_english_xml().as_bytes());
        assert!(
            !reading.contains_key("forecast"),
            "<forecast> has neither wind nor current shape"
        );
    }

    #[test]
    fn test_metric_station_reports_base_units() {
        let reading = parse_status(fixture_status_metric_xml().as_bytes());
        assert_eq!(text(&reading, "base_units"), "Metric");
        assert!((number(&reading, "temperature_outside") - 21.9).abs() < 1e-9);
    }

    // --- Merge rules --------------------------------------------------------

    #[test]
    fn test_hardware_tag_collision_last_write_wins() {
        let reading = parse_status(fixture_status_colliding_tags_xml().as_bytes());
        assert_eq!(
            text(&reading, "version"),
            "3.1",
            "later sibling's <version> should overwrite earlier one"
        );
    }

    #[test]
    fn test_weather_overrides_hardware_on_collision() {
        let reading = parse_status(fixture_status_colliding_tags_xml().as_bytes());
        assert!(
            (number(&reading, "humidity") - 40.0).abs() < 1e-9,
            "weather subtree is merged after hardware"
        );
    }

    #[test]
    fn test_merge_replaces_existing_keys() {
        let mut target = FlatReading::new();
        target.insert("a".into(), FieldValue::from("old"));
        target.insert("b".into(), FieldValue::from("kept"));

        let mut newer = FlatReading::new();
        newer.insert("a".into(), FieldValue::from("new"));

        merge_last_write_wins(&mut target, newer);
        assert_eq!(target.get("a"), Some(&FieldValue::from("new")));
        assert_eq!(target.get("b"), Some(&FieldValue::from("kept")));
    }

    // --- Leniency -----------------------------------------------------------

    #[test]
    fn test_wrong_root_yields_empty_reading() {
        let reading = parse_status(fixture_wrong_root_xml().as_bytes());
        assert!(reading.is_empty(), "non-status root should give empty reading");
    }

    #[test]
    fn test_malformed_xml_yields_empty_reading() {
        let reading = parse_status(b"<status><hardware><name>IP-100</hardware>");
        assert!(reading.is_empty());
    }

    #[test]
    fn test_empty_body_yields_empty_reading() {
        assert!(parse_status(b"").is_empty());
    }

    #[test]
    fn test_non_utf8_body_yields_empty_reading() {
        assert!(parse_status(&[0x3c, 0xff, 0xfe, 0x3e]).is_empty());
    }

    #[test]
    fn test_missing_subtrees_yield_empty_reading() {
        assert!(parse_status(b"<status></status>").is_empty());
    }

    #[test]
    fn test_partial_wind_keeps_present_fields() {
        let reading = parse_status(fixture_status_partial_wind_xml().as_bytes());
        assert!((number(&reading, "wind_speed") - 3.0).abs() < 1e-9);
        assert!((number(&reading, "wind_dir") - 90.0).abs() < 1e-9);
        assert!(!reading.contains_key("gust_speed"), "missing gust_speed is skipped");
        assert!(!reading.contains_key("gust_dir"), "non-numeric gust_direction is skipped");
    }

    #[test]
    fn test_non_numeric_current_is_skipped() {
        let reading = parse_status(fixture_status_partial_wind_xml().as_bytes());
        assert!(!reading.contains_key("pressure"), "'---' is not a number");
        assert!((number(&reading, "humidity") - 61.0).abs() < 1e-9);
    }
}
