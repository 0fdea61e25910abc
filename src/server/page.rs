//! HTML for the single prediction page

use crate::model::SeasonType;
use crate::predict::Prediction;

/// (form field, label) pairs in input order
const FIELDS: [(&str, &str); 8] = [
    ("PTS", "Points per game"),
    ("Age", "Age"),
    ("Usage_Rate", "Usage rate"),
    ("AST", "Assists per game"),
    ("TRB", "Rebounds per game"),
    ("STL", "Steals per game"),
    ("BLK", "Blocks per game"),
    ("ThreeP", "3P%"),
];

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(title),
        body
    )
}

/// The input form, with an optional error shown above it
pub fn render_form(error: Option<&str>) -> String {
    let mut body = String::from("<h1>NBA Player Type Predictor</h1>\n");
    if let Some(error) = error {
        body.push_str(&format!("<p class=\"error\">{}</p>\n", escape_html(error)));
    }
    body.push_str("<form method=\"post\" action=\"/\">\n");
    for (name, label) in FIELDS {
        body.push_str(&format!(
            "<label for=\"{name}\">{label}</label>\n<input type=\"number\" step=\"any\" id=\"{name}\" name=\"{name}\" required><br>\n"
        ));
    }
    body.push_str("<label for=\"Season\">Season</label>\n<select id=\"Season\" name=\"Season\">\n");
    for season in SeasonType::ALL {
        body.push_str(&format!(
            "<option value=\"{}\">{}</option>\n",
            season.code(),
            season
        ));
    }
    body.push_str("</select><br>\n<button type=\"submit\">Predict</button>\n</form>\n");
    layout("NBA Player Type Predictor", &body)
}

pub fn render_result(prediction: &Prediction) -> String {
    let body = format!(
        "<h1>Prediction Results</h1>\n<p>{} comparison</p>\n<p>Predicted Player Type: <strong>{}</strong></p>\n<p>Most similar NBA Player: <strong>{}</strong></p>\n<p><a href=\"/\">Try another stat line</a></p>\n",
        prediction.season,
        escape_html(prediction.label_text()),
        escape_html(&prediction.closest_player)
    );
    layout("Prediction Results", &body)
}
