//! `content/about.html`: archive description and data attribution.

use std::fmt::Write;

use url::Url;

use super::MetadataFields;
use super::bundle::escape_html;

/// About page entry path.
pub const ABOUT_PATH: &str = "content/about.html";

struct Credit {
    name: &'static str,
    url: &'static str,
    text: &'static str,
}

const OSM: Credit = Credit {
    name: "OpenStreetMap",
    url: "https://www.openstreetmap.org",
    text: "Map data is made available by the OpenStreetMap project and its \
           contributors under the Open Database License (ODbL).",
};

const OPENMAPTILES: Credit = Credit {
    name: "OpenMapTiles",
    url: "https://openmaptiles.org",
    text: "Vector tiles follow the OpenMapTiles schema.",
};

const GEOFABRIK: Credit = Credit {
    name: "Geofabrik",
    url: "https://www.geofabrik.de",
    text: "The region outline (.poly) used to clip this archive is provided \
           by Geofabrik GmbH.",
};

/// Whether a `.poly` source is served by Geofabrik.
pub fn is_geofabrik_source(source: &str) -> bool {
    Url::parse(source)
        .ok()
        .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
        .is_some_and(|host| host == "geofabrik.de" || host.ends_with(".geofabrik.de"))
}

/// Render the about page. Every metadata value is HTML-escaped.
pub fn render_about(fields: &MetadataFields, credit_geofabrik: bool) -> String {
    let title = escape_html(&fields.title);
    let mut body = String::new();

    if let Some(long) = fields.long_description.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(body, "<p class=\"description\">{}</p>", escape_html(long));
    }
    if fields.creator == fields.publisher {
        let _ = writeln!(body, "<p>Created &amp; published by {}</p>", escape_html(&fields.creator));
    } else {
        let _ = writeln!(body, "<p>Created by {}</p>", escape_html(&fields.creator));
        let _ = writeln!(body, "<p>Published by {}</p>", escape_html(&fields.publisher));
    }

    body.push_str("<h2>Credits &amp; Attribution</h2>\n");
    let credits = [Some(&OSM), Some(&OPENMAPTILES), credit_geofabrik.then_some(&GEOFABRIK)];
    for credit in credits.into_iter().flatten() {
        let _ = writeln!(
            body,
            "<div class=\"credit\"><a href=\"{}\" target=\"_blank\">{}</a><p>{}</p></div>",
            credit.url, credit.name, credit.text
        );
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>About - {title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n\
         <p class=\"subtitle\">{description}</p>\n{body}</body>\n</html>\n",
        description = escape_html(&fields.description),
    )
}
