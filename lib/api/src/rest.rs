use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::{error::BlockingError, web, App, HttpResponse, HttpServer, ResponseError};
use motiondx_core::{
    Channel, Embedder, EngineConfig, LoadReport, MatchCandidate, QueryVector, RawEmbedding, Severity,
    SignalStats,
};
use motiondx_report::{DiagnosisReport, MatchSummary, ReportGenerator};
use motiondx_storage::{KnowledgeFile, StorageError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use motiondx_core::DiagnosisEngine;

/// Everything the handlers share.
pub struct AppState {
    pub engine: Arc<DiagnosisEngine>,
    pub knowledge: KnowledgeFile,
    /// Needed only for requests that send raw samples
    pub embedder: Option<Arc<dyn Embedder>>,
    pub generator: Arc<dyn ReportGenerator>,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Core(#[from] motiondx_core::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Report(#[from] motiondx_report::ReportError),

    #[error("no embedder configured; send embeddings instead of samples")]
    EmbedderUnavailable,

    #[error("no knowledge entry matched above the candidate threshold")]
    NoMatch,

    #[error("worker pool unavailable")]
    Blocking,
}

impl From<BlockingError> for ApiError {
    fn from(_: BlockingError) -> Self {
        ApiError::Blocking
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::EmbedderUnavailable => StatusCode::BAD_REQUEST,
            ApiError::Core(motiondx_core::Error::InvalidConfig(_)) => StatusCode::BAD_REQUEST,
            ApiError::Core(motiondx_core::Error::Embedding(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Core(e) if e.is_input_error() => StatusCode::BAD_REQUEST,
            ApiError::Report(_) => StatusCode::BAD_GATEWAY,
            ApiError::NoMatch => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}

type ApiResult = Result<HttpResponse, ApiError>;

#[derive(Deserialize)]
struct ChannelInput {
    embedding: Option<RawEmbedding>,
    samples: Option<Vec<f32>>,
}

#[derive(Deserialize)]
struct DiagnosisRequest {
    channels: BTreeMap<String, ChannelInput>,
    top_k: Option<usize>,
    candidate_threshold: Option<f32>,
    report_threshold: Option<f32>,
}

impl DiagnosisRequest {
    fn config(&self, base: &EngineConfig) -> EngineConfig {
        EngineConfig {
            dimension: base.dimension,
            top_k: self.top_k.unwrap_or(base.top_k),
            candidate_threshold: self.candidate_threshold.unwrap_or(base.candidate_threshold),
            report_threshold: self.report_threshold.unwrap_or(base.report_threshold),
        }
    }
}

#[derive(Serialize)]
struct DiagnosisResponse {
    candidates: Vec<MatchCandidate>,
    channel_breakdown: BTreeMap<Channel, MatchCandidate>,
    severity: Severity,
    detected: Vec<MatchCandidate>,
    detected_severity: Severity,
    summary: String,
    report: DiagnosisReport,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(state: web::Data<AppState>, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new().wrap(cors).app_data(state.clone()).configure(configure)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }
}

/// Register every route. Expects `web::Data<AppState>` in app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/knowledge", web::get().to(knowledge_info))
        .route("/knowledge/reload", web::post().to(reload_knowledge))
        .route("/diagnosis", web::post().to(diagnose));
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "healthy" }))
}

async fn knowledge_info(state: web::Data<AppState>) -> HttpResponse {
    let base = state.engine.snapshot();
    HttpResponse::Ok().json(serde_json::json!({
        "dimension": base.dimension(),
        "entries": base.store().len(),
        "channels": base.store().channel_counts(),
        "generation": state.engine.generation(),
    }))
}

async fn reload_knowledge(state: web::Data<AppState>) -> ApiResult {
    let file = state.knowledge.clone();
    let engine = state.engine.clone();
    let report = web::block(move || -> Result<LoadReport, ApiError> {
        let records = file.read()?;
        Ok(engine.reload(&records)?)
    })
    .await??;
    if report.has_warnings() {
        warn!(skipped = report.skipped.len(), "knowledge reload skipped records");
    }
    info!(loaded = report.loaded, "knowledge reloaded");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "result": report,
        "generation": state.engine.generation(),
    })))
}

async fn diagnose(state: web::Data<AppState>, req: web::Json<DiagnosisRequest>) -> ApiResult {
    let req = req.into_inner();
    let config = req.config(state.engine.config());
    let inputs = parse_channels(req.channels)?;

    let embedder = state.embedder.clone();
    let engine = state.engine.clone();
    let match_config = config.clone();
    let (queries, diagnosis) = web::block(move || -> Result<_, ApiError> {
        let queries = build_queries(inputs, embedder.as_deref())?;
        let diagnosis = engine.diagnose_with(&queries, &match_config)?;
        Ok((queries, diagnosis))
    })
    .await??;
    if diagnosis.candidates.is_empty() {
        return Err(ApiError::NoMatch);
    }

    let mut summary = MatchSummary::new(&diagnosis.detected, config.report_threshold);
    for query in &queries {
        if let Some(stats) = query.source_stats {
            summary = summary.with_channel_stats(query.channel, stats);
        }
    }

    let generator = state.generator.clone();
    let report_input = summary.clone();
    let report =
        web::block(move || DiagnosisReport::generate(generator.as_ref(), &report_input)).await??;

    let candidates = diagnosis.candidates;
    let detected = diagnosis.detected;
    Ok(HttpResponse::Ok().json(DiagnosisResponse {
        candidates: candidates.ranked,
        channel_breakdown: candidates.breakdown,
        severity: candidates.severity,
        detected: detected.ranked,
        detected_severity: detected.severity,
        summary: summary.render(),
        report,
    }))
}

fn parse_channels(raw: BTreeMap<String, ChannelInput>) -> Result<Vec<(Channel, ChannelInput)>, ApiError> {
    if raw.is_empty() {
        return Err(ApiError::BadRequest("at least one channel is required".to_string()));
    }
    let mut inputs: Vec<(Channel, ChannelInput)> = Vec::with_capacity(raw.len());
    for (name, input) in raw {
        let channel: Channel = name.parse()?;
        if inputs.iter().any(|(c, _)| *c == channel) {
            return Err(ApiError::BadRequest(format!("channel {} given twice", channel)));
        }
        inputs.push((channel, input));
    }
    inputs.sort_by_key(|(c, _)| *c);
    Ok(inputs)
}

fn build_queries(
    inputs: Vec<(Channel, ChannelInput)>,
    embedder: Option<&dyn Embedder>,
) -> Result<Vec<QueryVector>, ApiError> {
    inputs
        .into_iter()
        .map(|(channel, input)| {
            let stats = match &input.samples {
                Some(samples) => Some(SignalStats::compute(samples)?),
                None => None,
            };
            let embedding = match (input.embedding, input.samples) {
                (Some(raw), _) => raw.parse(channel.as_str())?,
                (None, Some(samples)) => {
                    let embedder = embedder.ok_or(ApiError::EmbedderUnavailable)?;
                    embedder.embed_checked(channel, &samples)?
                }
                (None, None) => {
                    return Err(ApiError::BadRequest(format!(
                        "channel {} needs an embedding or samples",
                        channel
                    )))
                }
            };
            let query = QueryVector::new(channel, embedding);
            Ok(match stats {
                Some(stats) => query.with_source_stats(stats),
                None => query,
            })
        })
        .collect()
}
