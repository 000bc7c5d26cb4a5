/// 检验系统 API 客户端
///
/// 通过 REST/JSON 实现结果存储与模板目录两个接口
use crate::clients::store::{ParameterStore, TemplateCatalog};
use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError};
use crate::models::{ExamType, ResultPayload, ResultRecord, Template, TemplateDetail};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// 检验系统 API 客户端
#[derive(Clone)]
pub struct LabClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl LabClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::api_request_failed("client", e))?;

        let base_url = Url::parse(&config.lab_api_base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "lab_api_base_url".to_string(),
                reason: format!("无效的 URL: {}", config.lab_api_base_url),
            })?;

        Ok(Self {
            http,
            base_url,
            token: config.lab_api_token.clone(),
        })
    }

    /// 拼接完整 URL，每一段单独做百分号编码
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// 构建带认证头的请求
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header("Accept", "application/json");
        if self.token.is_empty() {
            builder
        } else {
            builder.bearer_auth(&self.token)
        }
    }

    /// 发送请求并检查状态码
    async fn send(&self, builder: RequestBuilder, endpoint: &str) -> AppResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.ok().filter(|body| !body.is_empty());
            return Err(AppError::bad_response(endpoint, status.as_u16(), message));
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        endpoint: &str,
    ) -> AppResult<T> {
        let response = self.send(builder, endpoint).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;
        debug!("{} 响应: {} 字节", endpoint, body.len());
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl ParameterStore for LabClient {
    async fn list_results(&self, exam_id: &str) -> AppResult<Vec<ResultRecord>> {
        let url = self.url(&["exams", exam_id, "results"]);
        let endpoint = url.path().to_string();
        self.send_json(self.request(Method::GET, url), &endpoint)
            .await
    }

    async fn create_result(&self, exam_id: &str, payload: &ResultPayload) -> AppResult<ResultRecord> {
        let url = self.url(&["exams", exam_id, "results"]);
        let endpoint = url.path().to_string();
        debug!("新建结果 Payload: {:?}", payload);
        self.send_json(self.request(Method::POST, url).json(payload), &endpoint)
            .await
    }

    async fn update_result(&self, result_id: &str, payload: &ResultPayload) -> AppResult<ResultRecord> {
        let url = self.url(&["results", result_id]);
        let endpoint = url.path().to_string();
        debug!("更新结果 Payload: {:?}", payload);
        self.send_json(self.request(Method::PUT, url).json(payload), &endpoint)
            .await
    }

    async fn delete_result(&self, result_id: &str) -> AppResult<()> {
        let url = self.url(&["results", result_id]);
        let endpoint = url.path().to_string();
        self.send(self.request(Method::DELETE, url), &endpoint)
            .await?;
        Ok(())
    }

    async fn mark_exam_completed(&self, exam_id: &str) -> AppResult<()> {
        let url = self.url(&["exams", exam_id, "complete"]);
        let endpoint = url.path().to_string();
        self.send(self.request(Method::POST, url), &endpoint)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TemplateCatalog for LabClient {
    async fn list_exam_types(&self) -> AppResult<Vec<ExamType>> {
        let url = self.url(&["exam-types"]);
        let endpoint = url.path().to_string();
        self.send_json(self.request(Method::GET, url), &endpoint)
            .await
    }

    async fn list_templates_for_exam_type(&self, exam_type_id: &str) -> AppResult<Vec<Template>> {
        let url = self.url(&["exam-types", exam_type_id, "templates"]);
        let endpoint = url.path().to_string();
        self.send_json(self.request(Method::GET, url), &endpoint)
            .await
    }

    async fn get_template_detail(&self, template_id: &str) -> AppResult<TemplateDetail> {
        let url = self.url(&["templates", template_id]);
        let endpoint = url.path().to_string();
        self.send_json(self.request(Method::GET, url), &endpoint)
            .await
    }
}
