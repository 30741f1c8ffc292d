//! HTTP solver backend.
//!
//! Talks to the timetable service's JSON API:
//! - `POST /gerar-grade` to solve
//! - `GET /restricoes/arquivos` and `POST /restricoes/importar` for restriction files
//! - `POST /exportar-grade` for server-side CSV/XLSX files
//! - `GET /dados` and `GET /dados/{name}` for bundled datasets
//! - `GET /health`

use std::time::Duration;

use async_trait::async_trait;
use classgrid_config::SolverConfig;
use classgrid_core::{
    AllocationResult, Dataset, ExportLocations, ExportRequest, ScheduleRequest, SolverBackend,
    SolverError,
};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::detail::error_from_response;

/// Solver service reached over HTTP.
pub struct HttpSolver {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpSolver {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SolverError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| SolverError::NotConfigured(format!("invalid base URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(SolverError::NotConfigured(format!(
                "base URL '{base_url}' cannot carry a path"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SolverError::NotConfigured(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { base_url, client })
    }

    pub fn from_config(config: &SolverConfig) -> Result<Self, SolverError> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Endpoint URL with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, SolverError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SolverError::NotConfigured("base URL cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, SolverError> {
        let url = self.endpoint(segments)?;
        debug!(%url, "GET");
        let response = self.client.get(url).send().await.map_err(transport_error)?;
        read_json(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, SolverError> {
        let url = self.endpoint(segments)?;
        debug!(%url, "POST");
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }
}

fn transport_error(e: reqwest::Error) -> SolverError {
    if e.is_timeout() {
        SolverError::Timeout(e.to_string())
    } else {
        SolverError::Network(e.to_string())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, SolverError> {
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;

    if !status.is_success() {
        warn!(status = status.as_u16(), body = %body, "Solver returned error");
        return Err(error_from_response(status.as_u16(), &body));
    }

    serde_json::from_str(&body)
        .map_err(|e| SolverError::InvalidResponse(format!("failed to parse response: {e}")))
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    arquivos: Vec<String>,
}

#[derive(Serialize)]
struct ImportBody<'a> {
    arquivos: &'a [String],
}

#[derive(Deserialize)]
struct ImportedRecords {
    #[serde(default)]
    restricoes: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct DatasetList {
    #[serde(default)]
    datasets: Vec<String>,
}

#[derive(Deserialize)]
struct Health {
    #[serde(default)]
    ok: bool,
}

#[async_trait]
impl SolverBackend for HttpSolver {
    fn name(&self) -> &str {
        "http"
    }

    async fn generate_schedule(
        &self,
        request: &ScheduleRequest,
    ) -> std::result::Result<AllocationResult, SolverError> {
        debug!(
            disciplines = request.disciplines.len(),
            restrictions = request.restrictions.len(),
            days = request.config.days_per_week,
            blocks = request.config.blocks_per_day,
            "Sending generate request"
        );
        self.post(&["gerar-grade"], request).await
    }

    async fn list_restriction_files(&self) -> std::result::Result<Vec<String>, SolverError> {
        let list: FileList = self.get(&["restricoes", "arquivos"]).await?;
        Ok(list.arquivos)
    }

    async fn import_restriction_files(
        &self,
        files: &[String],
    ) -> std::result::Result<Vec<serde_json::Value>, SolverError> {
        let records: ImportedRecords = self
            .post(&["restricoes", "importar"], &ImportBody { arquivos: files })
            .await?;
        debug!(files = files.len(), records = records.restricoes.len(), "Imported restriction files");
        Ok(records.restricoes)
    }

    async fn export_schedule(
        &self,
        request: &ExportRequest,
    ) -> std::result::Result<ExportLocations, SolverError> {
        self.post(&["exportar-grade"], request).await
    }

    async fn list_datasets(&self) -> std::result::Result<Vec<String>, SolverError> {
        let list: DatasetList = self.get(&["dados"]).await?;
        Ok(list.datasets)
    }

    async fn load_dataset(&self, name: &str) -> std::result::Result<Dataset, SolverError> {
        let mut dataset: Dataset = self.get(&["dados", name]).await?;
        if dataset.name.is_empty() {
            dataset.name = name.to_string();
        }
        Ok(dataset)
    }

    async fn health_check(&self) -> std::result::Result<bool, SolverError> {
        let url = self.endpoint(&["health"])?;
        let response = self.client.get(url).send().await.map_err(transport_error)?;
        if !response.status().is_success() {
            return Ok(false);
        }
        let health: Health = response
            .json()
            .await
            .map_err(|e| SolverError::InvalidResponse(e.to_string()))?;
        Ok(health.ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use classgrid_core::{Discipline, Restriction, ScheduleConfig};
    use serde_json::{Value, json};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn solver(base: &str) -> HttpSolver {
        HttpSolver::new(base, Duration::from_secs(5)).unwrap()
    }

    fn request() -> ScheduleRequest {
        ScheduleRequest {
            config: ScheduleConfig::default(),
            disciplines: vec![
                Discipline::new("Calc I").with_professor("Ana").with_semester("1"),
                Discipline::new("Phys I").with_professor("Bruno").with_semester("1"),
            ],
            restrictions: vec![Restriction::manual_fixed("Calc I", 0)],
        }
    }

    #[tokio::test]
    async fn generate_posts_wire_body_and_parses_result() {
        let app = Router::new().route(
            "/gerar-grade",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["config"]["blocos_por_dia"], 4);
                assert_eq!(body["disciplinas"][1]["prof"], "Bruno");
                assert_eq!(body["restricoes"][0]["tipo"], "fixo");
                Json(json!({
                    "alocacao": {"Calc I": 0, "Phys I": 10},
                    "horarios": {"0": "Seg 08:00", "10": "Qua 14:00"},
                    "nome_exibicao": {"Calc I": "Calc I / Ana", "Phys I": "Phys I / Bruno"},
                    "stats": {"total_blocos": 20, "blocos_usados": 2, "desbalanceamento": 0},
                    "logs": "done"
                }))
            }),
        );
        let base = serve(app).await;

        let result = solver(&base).generate_schedule(&request()).await.unwrap();
        assert_eq!(result.allocation.get("Phys I"), Some(10));
        assert_eq!(result.block_label(0), "Seg 08:00");
        assert_eq!(result.display_label("Calc I"), "Calc I / Ana");
        assert_eq!(result.stats.total_blocks, 20);
    }

    #[tokio::test]
    async fn validation_detail_maps_to_field_issues() {
        let app = Router::new().route(
            "/gerar-grade",
            post(|| async {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({"detail": [
                        {"loc": ["body", "disciplinas", 0, "nome"], "msg": "field required"}
                    ]})),
                )
            }),
        );
        let base = serve(app).await;

        let err = solver(&base).generate_schedule(&request()).await.unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("body.disciplinas.0.nome: field required"));
    }

    #[tokio::test]
    async fn solver_failure_keeps_detail_text() {
        let app = Router::new().route(
            "/gerar-grade",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"detail": "\nERRO: blocos insuficientes"})),
                )
            }),
        );
        let base = serve(app).await;

        match solver(&base).generate_schedule(&request()).await {
            Err(SolverError::ApiError {
                status_code,
                message,
            }) => {
                assert_eq!(status_code, 400);
                assert!(message.contains("blocos insuficientes"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn restriction_files_list_and_import() {
        let app = Router::new()
            .route(
                "/restricoes/arquivos",
                get(|| async { Json(json!({"arquivos": ["fixos.csv", "pares.csv"]})) }),
            )
            .route(
                "/restricoes/importar",
                post(|Json(body): Json<Value>| async move {
                    assert_eq!(body["arquivos"], json!(["fixos.csv"]));
                    Json(json!({"restricoes": [
                        {"tipo": "fixo", "disciplina": "Calc I", "bloco": "3", "origem": "fixos.csv"}
                    ]}))
                }),
            );
        let base = serve(app).await;
        let solver = solver(&base);

        let files = solver.list_restriction_files().await.unwrap();
        assert_eq!(files, ["fixos.csv", "pares.csv"]);

        let records = solver
            .import_restriction_files(&["fixos.csv".to_string()])
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["bloco"], "3");
    }

    #[tokio::test]
    async fn datasets_and_export() {
        let app = Router::new()
            .route("/dados", get(|| async { Json(json!({"datasets": ["bcc 2024"]})) }))
            .route(
                "/dados/{nome}",
                get(|Path(nome): Path<String>| async move {
                    Json(json!({
                        "nome": nome,
                        "disciplinas": [{"Nome": "Calc I", "professores": "Ana"}],
                        "restricoes": []
                    }))
                }),
            )
            .route(
                "/exportar-grade",
                post(|Json(body): Json<Value>| async move {
                    let prefix = body["prefixo"].as_str().unwrap_or_default().to_string();
                    Json(json!({
                        "base": format!("{prefix}_20240101_120000"),
                        "salvo_em": "/srv/out",
                        "csv": format!("/out/{prefix}_20240101_120000.csv"),
                        "xlsx": null
                    }))
                }),
            );
        let base = serve(app).await;
        let solver = solver(&base);

        assert_eq!(solver.list_datasets().await.unwrap(), ["bcc 2024"]);

        let dataset = solver.load_dataset("bcc 2024").await.unwrap();
        assert_eq!(dataset.name, "bcc 2024");
        assert_eq!(dataset.disciplines.len(), 1);

        let result = AllocationResult {
            allocation: [("Calc I", 0)].into_iter().collect(),
            ..AllocationResult::default()
        };
        let locations = solver
            .export_schedule(&ExportRequest::from_result("bcc", &result))
            .await
            .unwrap();
        assert_eq!(locations.csv_path.as_deref(), Some("/out/bcc_20240101_120000.csv"));
        assert!(locations.xlsx_path.is_none());
        assert_eq!(locations.saved_in.as_deref(), Some("/srv/out"));
    }

    #[tokio::test]
    async fn health_reads_ok_flag() {
        let app = Router::new().route("/health", get(|| async { Json(json!({"ok": true})) }));
        let base = serve(app).await;
        assert!(solver(&base).health_check().await.unwrap());

        let app = Router::new();
        let base = serve(app).await;
        assert!(!solver(&base).health_check().await.unwrap());
    }

    #[tokio::test]
    async fn unreachable_service_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = solver(&format!("http://{addr}"))
            .list_datasets()
            .await
            .unwrap_err();
        assert!(matches!(err, SolverError::Network(_)), "{err:?}");
    }

    #[tokio::test]
    async fn non_json_success_is_invalid_response() {
        let app = Router::new().route("/dados", get(|| async { "<html>" }));
        let base = serve(app).await;
        let err = solver(&base).list_datasets().await.unwrap_err();
        assert!(matches!(err, SolverError::InvalidResponse(_)));
    }

    #[test]
    fn endpoints_keep_base_path() {
        let solver = solver("http://host:8000/api/");
        let url = solver.endpoint(&["dados", "bcc 2024"]).unwrap();
        assert_eq!(url.as_str(), "http://host:8000/api/dados/bcc%202024");
    }

    #[test]
    fn invalid_base_url_is_not_configured() {
        assert!(matches!(
            HttpSolver::new("not a url", Duration::from_secs(1)),
            Err(SolverError::NotConfigured(_))
        ));
    }
}
