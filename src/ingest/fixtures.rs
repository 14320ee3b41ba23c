/// Test fixtures: representative `status.xml` payloads from the IP-100.
///
/// Structurally complete but trimmed to what the parser looks at. The real
/// device serves the same envelope from:
///   http://<station>/status.xml
///
/// Status document shape:
///   status
///     .hardware.*            — nested elements, leaves are text
///     .hardware..base_units  — "English" or "Metric"
///     .weather.wind          — speed / direction / gust_speed / gust_direction
///     .weather.<sensor>      — <current> plus optional <high>/<low>
///
/// Note: the device writes every value as element text, numbers included.

/// Station configured for US units, every default-mapped sensor present,
/// plus a `<forecast>` element that matches neither weather shape.
#[cfg(test)]
pub(crate) fn fixture_status_english_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<status>
  <hardware>
    <name>IP-100</name>
    <firmware>
      <version>2.45</version>
      <date>2015-11-02</date>
    </firmware>
    <mac_address>00:0D:B5:12:34:56</mac_address>
    <base_units>English</base_units>
  </hardware>
  <weather>
    <temperature_outside>
      <current>71.5</current>
      <high>78.2</high>
      <low>60.1</low>
    </temperature_outside>
    <temperature_inside>
      <current>68.0</current>
    </temperature_inside>
    <humidity>
      <current>54</current>
    </humidity>
    <pressure>
      <current>29.92</current>
    </pressure>
    <wind>
      <speed>4.0</speed>
      <direction>225</direction>
      <gust_speed>9.5</gust_speed>
      <gust_direction>240</gust_direction>
    </wind>
    <precipitation>
      <current>0.12</current>
    </precipitation>
    <solar_radiation>
      <current>612</current>
    </solar_radiation>
    <forecast>Partly cloudy</forecast>
  </weather>
</status>"#
}

/// Same station reporting metric units, only a couple of sensors.
#[cfg(test)]
pub(crate) fn fixture_status_metric_xml() -> &'static str {
    r#"<status>
  <hardware>
    <name>IP-100</name>
    <base_units>Metric</base_units>
  </hardware>
  <weather>
    <temperature_outside><current>21.9</current></temperature_outside>
    <precipitation><current>3.4</current></precipitation>
  </weather>
</status>"#
}

/// Two hardware groups both containing `<version>`, and a hardware leaf
/// sharing its name with a weather sensor.
#[cfg(test)]
pub(crate) fn fixture_status_colliding_tags_xml() -> &'static str {
    r#"<status>
  <hardware>
    <firmware><version>2.45</version></firmware>
    <bootloader><version>3.1</version></bootloader>
    <humidity>sensor-ok</humidity>
  </hardware>
  <weather>
    <humidity><current>40</current></humidity>
  </weather>
</status>"#
}

/// Wind block missing `gust_speed` with a dashed-out `gust_direction`, and
/// a pressure sensor whose current value is not a number.
#[cfg(test)]
pub(crate) fn fixture_status_partial_wind_xml() -> &'static str {
    r#"<status>
  <hardware><base_units>English</base_units></hardware>
  <weather>
    <wind>
      <speed>3.0</speed>
      <direction>90</direction>
      <gust_direction>---</gust_direction>
    </wind>
    <pressure><current>---</current></pressure>
    <humidity><current>61</current></humidity>
  </weather>
</status>"#
}

/// Well-formed XML that is not a status document (e.g. a router's page).
#[cfg(test)]
pub(crate) fn fixture_wrong_root_xml() -> &'static str {
    r#"<response>
  <hardware><base_units>English</base_units></hardware>
  <weather><humidity><current>50</current></humidity></weather>
</response>"#
}
