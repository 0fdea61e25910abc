use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;

use super::page::{render_form, render_result};
use super::state::{ServerState, SharedRegistry};
use super::ServerConfig;
use crate::model::{FeatureVector, SeasonType};
use crate::predict::ModelRegistry;

#[derive(Debug, Deserialize)]
struct PredictionForm {
    #[serde(rename = "PTS")]
    pts: f64,
    #[serde(rename = "Age")]
    age: f64,
    #[serde(rename = "Usage_Rate")]
    usage_rate: f64,
    #[serde(rename = "AST")]
    ast: f64,
    #[serde(rename = "TRB")]
    trb: f64,
    #[serde(rename = "STL")]
    stl: f64,
    #[serde(rename = "BLK")]
    blk: f64,
    #[serde(rename = "ThreeP")]
    three_pct: f64,
    #[serde(rename = "Season")]
    season: String,
}

impl PredictionForm {
    fn features(&self) -> FeatureVector {
        FeatureVector {
            pts: self.pts,
            age: self.age,
            usage_rate: self.usage_rate,
            ast: self.ast,
            trb: self.trb,
            stl: self.stl,
            blk: self.blk,
            three_pct: self.three_pct,
        }
    }
}

async fn home() -> Html<String> {
    Html(render_form(None))
}

async fn predict(
    State(registry): State<SharedRegistry>,
    State(config): State<ServerConfig>,
    Form(form): Form<PredictionForm>,
) -> Response {
    let season = match SeasonType::from_code(&form.season) {
        Ok(season) => season,
        Err(err) => {
            log::warn!("Rejected prediction request: {}", err);
            return (StatusCode::BAD_REQUEST, Html(render_form(Some(&err.to_string())))).into_response();
        }
    };

    let features = form.features();
    if let Some((name, value)) = features.first_non_finite() {
        log::warn!("Rejected prediction request: {} = {}", name, value);
        let message = format!("{} must be a finite number", name);
        return (StatusCode::BAD_REQUEST, Html(render_form(Some(&message)))).into_response();
    }

    match registry.predict(season, &features, config.search_scope) {
        Ok(prediction) => {
            log::info!(
                "{} prediction: cluster {} ({}), closest {} at {:.3}",
                season,
                prediction.cluster,
                prediction.label_text(),
                prediction.closest_player,
                prediction.distance
            );
            Html(render_result(&prediction)).into_response()
        }
        Err(err) => {
            log::error!("Prediction failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render_form(Some("Prediction failed, please try again."))),
            )
                .into_response()
        }
    }
}

pub fn make_app(config: ServerConfig, registry: ModelRegistry) -> Router {
    let state = ServerState::new(config, registry);
    Router::new()
        .route("/", get(home).post(predict))
        .with_state(state)
}

pub async fn run_server(config: ServerConfig, registry: ModelRegistry) -> Result<()> {
    let port = config.port;
    let app = make_app(config, registry);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    log::info!("Listening on http://127.0.0.1:{}", port);

    Ok(axum::serve(listener, app).await?)
}
