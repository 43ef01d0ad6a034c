use log::debug;
use nmea2kml::{Analysis, Fix};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::error::Error;
use std::io::Write;

const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";
const CIRCLE_ICON: &str = "http://maps.google.com/mapfiles/kml/shapes/placemark_circle.png";

const ROUTE_COLOR: &str = "ff00ffff";
const STOP_COLOR: &str = "ff0000ff";
const TURN_COLOR: &str = "ff00ffff";

pub struct KmlOptions {
    pub name: String,
    pub altitude: f64,
}

impl Default for KmlOptions {
    fn default() -> Self {
        Self {
            name: "GPS Track".to_string(),
            altitude: 3.0,
        }
    }
}

fn format_coordinate(fix: &Fix, altitude: f64) -> String {
    format!("{:.6},{:.6},{:.1}", fix.longitude, fix.latitude, altitude)
}

fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), Box<dyn Error>> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_line_style<W: Write>(
    writer: &mut Writer<W>,
    id: &str,
    color: &str,
    width: u32,
) -> Result<(), Box<dyn Error>> {
    writer.write_event(Event::Start(
        BytesStart::new("Style").with_attributes([("id", id)]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("LineStyle")))?;
    write_text_element(writer, "color", color)?;
    write_text_element(writer, "width", &width.to_string())?;
    writer.write_event(Event::End(BytesEnd::new("LineStyle")))?;
    writer.write_event(Event::End(BytesEnd::new("Style")))?;
    Ok(())
}

fn write_icon_style<W: Write>(
    writer: &mut Writer<W>,
    id: &str,
    color: &str,
) -> Result<(), Box<dyn Error>> {
    writer.write_event(Event::Start(
        BytesStart::new("Style").with_attributes([("id", id)]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("IconStyle")))?;
    write_text_element(writer, "color", color)?;
    writer.write_event(Event::Start(BytesStart::new("Icon")))?;
    write_text_element(writer, "href", CIRCLE_ICON)?;
    writer.write_event(Event::End(BytesEnd::new("Icon")))?;
    writer.write_event(Event::End(BytesEnd::new("IconStyle")))?;
    writer.write_event(Event::End(BytesEnd::new("Style")))?;
    Ok(())
}

fn write_route<W: Write>(
    writer: &mut Writer<W>,
    fixes: &[Fix],
    altitude: f64,
) -> Result<(), Box<dyn Error>> {
    let coordinates = fixes
        .iter()
        .map(|fix| format_coordinate(fix, altitude))
        .collect::<Vec<_>>()
        .join(" ");

    writer.write_event(Event::Start(BytesStart::new("Placemark")))?;
    write_text_element(writer, "name", "Route")?;
    write_text_element(writer, "styleUrl", "#route")?;
    writer.write_event(Event::Start(BytesStart::new("LineString")))?;
    write_text_element(writer, "tessellate", "1")?;
    write_text_element(writer, "coordinates", &coordinates)?;
    writer.write_event(Event::End(BytesEnd::new("LineString")))?;
    writer.write_event(Event::End(BytesEnd::new("Placemark")))?;
    Ok(())
}

fn write_markers<W: Write>(
    writer: &mut Writer<W>,
    fixes: &[Fix],
    indices: &[usize],
    label: &str,
    style: &str,
    altitude: f64,
) -> Result<(), Box<dyn Error>> {
    for &index in indices {
        let Some(fix) = fixes.get(index) else {
            debug!("skipping {label} marker at index {index}, track has {} fixes", fixes.len());
            continue;
        };

        writer.write_event(Event::Start(BytesStart::new("Placemark")))?;
        write_text_element(writer, "name", &format!("{label} {}", index + 1))?;
        write_text_element(writer, "styleUrl", style)?;
        writer.write_event(Event::Start(BytesStart::new("Point")))?;
        write_text_element(writer, "coordinates", &format_coordinate(fix, altitude))?;
        writer.write_event(Event::End(BytesEnd::new("Point")))?;
        writer.write_event(Event::End(BytesEnd::new("Placemark")))?;
    }
    Ok(())
}

/// Serializes the route, stop markers and turn markers as a KML 2.2 document.
pub fn write_kml<W: Write>(
    output: W,
    fixes: &[Fix],
    analysis: &Analysis,
    options: &KmlOptions,
) -> Result<(), Box<dyn Error>> {
    let mut writer = Writer::new_with_indent(output, b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("kml").with_attributes([("xmlns", KML_NAMESPACE)]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("Document")))?;
    write_text_element(&mut writer, "name", &options.name)?;

    write_line_style(&mut writer, "route", ROUTE_COLOR, 4)?;
    write_icon_style(&mut writer, "stop", STOP_COLOR)?;
    write_icon_style(&mut writer, "turn", TURN_COLOR)?;

    write_route(&mut writer, fixes, options.altitude)?;
    write_markers(
        &mut writer,
        fixes,
        &analysis.stops,
        "Stop",
        "#stop",
        options.altitude,
    )?;
    write_markers(
        &mut writer,
        fixes,
        &analysis.turns,
        "Turn",
        "#turn",
        options.altitude,
    )?;

    writer.write_event(Event::End(BytesEnd::new("Document")))?;
    writer.write_event(Event::End(BytesEnd::new("kml")))?;
    writer.get_mut().write_all(b"\n")?;
    Ok(())
}
