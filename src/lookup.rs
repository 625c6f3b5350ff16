/*!
 * HTTP client for the reference lookup service
 *
 * Resolves study, sample, run and analysis identifiers with
 * `GET {base}/cli/reference/{kind}/{id}` using HTTP basic authentication.
 * A 404 is a `NotFound`; any other failure is a `Service` error.
 */

use crate::config::SubmitConfig;
use crate::error::{Result, WebinError};
use reqwest::{StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use webin_core_manifest::{
    Analysis, Entity, EntityKind, LookupError, LookupService, Run, Sample, Study,
};

/// Study as returned by the service
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StudyResponse {
    id: String,
    #[serde(default)]
    bio_project_id: Option<String>,
    #[serde(default)]
    locus_tags: Vec<String>,
}

/// Sample as returned by the service
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SampleResponse {
    id: String,
    #[serde(default)]
    bio_sample_id: Option<String>,
    #[serde(default)]
    organism: Option<String>,
    #[serde(default)]
    tax_id: Option<u64>,
}

/// Run or analysis as returned by the service
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectResponse {
    id: String,
    #[serde(default)]
    alias: Option<String>,
}

impl From<StudyResponse> for Study {
    fn from(r: StudyResponse) -> Self {
        Study {
            project_id: r.bio_project_id.unwrap_or_else(|| r.id.clone()),
            study_id: r.id,
            locus_tags: r.locus_tags,
        }
    }
}

impl From<SampleResponse> for Sample {
    fn from(r: SampleResponse) -> Self {
        Sample {
            biosample_id: r.bio_sample_id.unwrap_or_else(|| r.id.clone()),
            sample_id: r.id,
            organism: r.organism,
            tax_id: r.tax_id,
        }
    }
}

/// Blocking lookup client holding the submission account credentials
pub struct HttpLookupClient {
    base_url: Url,
    username: String,
    password: SecretString,
    http_client: reqwest::blocking::Client,
}

impl HttpLookupClient {
    /// Create a client for a base URL
    pub fn new(
        base_url: &str,
        username: impl Into<String>,
        password: SecretString,
        timeout: Duration,
    ) -> Result<Self> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(WebinError::Authentication(
                "username must not be empty".to_string(),
            ));
        }
        if password.expose_secret().is_empty() {
            return Err(WebinError::Authentication(
                "password must not be empty".to_string(),
            ));
        }

        let base_url = Url::parse(base_url)
            .map_err(|e| WebinError::Config(format!("Invalid service URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(WebinError::Config(format!(
                "Invalid service URL {}",
                base_url
            )));
        }

        let http_client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .timeout(timeout)
            .user_agent(concat!("webin/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WebinError::Lookup(e.to_string()))?;

        Ok(Self {
            base_url,
            username,
            password,
            http_client,
        })
    }

    /// Create a client from the run configuration
    pub fn from_config(config: &SubmitConfig) -> Result<Self> {
        let username = config.username.clone().ok_or_else(|| {
            WebinError::Authentication("a Webin username is required".to_string())
        })?;
        let password = config.password.as_ref().map(|p| SecretString::new(p.expose_secret().into()));
        let password = password.ok_or_else(|| {
            WebinError::Authentication(format!(
                "a Webin password is required (--password or {})",
                crate::config::PASSWORD_ENV
            ))
        })?;
        Self::new(
            config.service_url(),
            username,
            password,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Reference endpoint for an entity
    pub fn reference_url(&self, kind: EntityKind, id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["cli", "reference", kind.as_str(), id]);
        }
        url
    }

    fn fetch(&self, kind: EntityKind, id: &str) -> std::result::Result<String, LookupError> {
        let url = self.reference_url(kind, id);
        debug!(%url, "Resolving {} {}", kind, id);

        let response = self
            .http_client
            .get(url)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .header("Accept", "application/json")
            .send()
            .map_err(|e| LookupError::Service {
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound {
                kind,
                id: id.to_string(),
            });
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(LookupError::Service {
                message: "invalid submission account user name or password".to_string(),
            });
        }
        if !status.is_success() {
            return Err(LookupError::Service {
                message: format!("HTTP {}", status),
            });
        }

        response.text().map_err(|e| LookupError::Service {
            message: e.to_string(),
        })
    }
}

/// Map a service response body to an entity
fn parse_entity(kind: EntityKind, body: &str) -> std::result::Result<Entity, LookupError> {
    let invalid = |e: serde_json::Error| LookupError::Service {
        message: format!("invalid {} response: {}", kind, e),
    };
    let entity = match kind {
        EntityKind::Study => {
            Entity::Study(serde_json::from_str::<StudyResponse>(body).map_err(invalid)?.into())
        }
        EntityKind::Sample => {
            Entity::Sample(serde_json::from_str::<SampleResponse>(body).map_err(invalid)?.into())
        }
        EntityKind::Run => {
            let r: ObjectResponse = serde_json::from_str(body).map_err(invalid)?;
            Entity::Run(Run {
                run_id: r.id,
                name: r.alias,
            })
        }
        EntityKind::Analysis => {
            let r: ObjectResponse = serde_json::from_str(body).map_err(invalid)?;
            Entity::Analysis(Analysis {
                analysis_id: r.id,
                name: r.alias,
            })
        }
    };
    Ok(entity)
}

impl LookupService for HttpLookupClient {
    fn resolve(&self, kind: EntityKind, id: &str) -> std::result::Result<Entity, LookupError> {
        let body = self.fetch(kind, id)?;
        parse_entity(kind, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpLookupClient {
        HttpLookupClient::new(
            base,
            "Webin-123",
            SecretString::new("secret".into()),
            Duration::from_secs(2),
        )
        .unwrap()
    }

    #[test]
    fn test_reference_url() {
        let remote = client(crate::config::TEST_SERVICE_URL);
        assert_eq!(
            remote.reference_url(EntityKind::Study, "SRP000392").as_str(),
            "https://wwwdev.ebi.ac.uk/ena/submit/drop-box/cli/reference/study/SRP000392"
        );

        let local = client("http://localhost:8080/api");
        assert_eq!(
            local.reference_url(EntityKind::Sample, "my sample").as_str(),
            "http://localhost:8080/api/cli/reference/sample/my%20sample"
        );
    }

    #[test]
    fn test_credentials_required() {
        let err = HttpLookupClient::new(
            crate::config::TEST_SERVICE_URL,
            " ",
            SecretString::new("secret".into()),
            Duration::from_secs(1),
        )
        .err()
        .unwrap();
        assert!(matches!(err, WebinError::Authentication(_)));

        let config = SubmitConfig {
            username: Some("Webin-123".to_string()),
            ..Default::default()
        };
        let err = HttpLookupClient::from_config(&config).err().unwrap();
        assert!(matches!(err, WebinError::Authentication(_)));
    }

    #[test]
    fn test_parse_study() {
        let entity = parse_entity(
            EntityKind::Study,
            r#"{"id":"SRP000392","bioProjectId":"PRJNA28545","locusTags":["ABC"]}"#,
        )
        .unwrap();
        match entity {
            Entity::Study(study) => {
                assert_eq!(study.study_id, "SRP000392");
                assert_eq!(study.project_id, "PRJNA28545");
                assert_eq!(study.locus_tags, vec!["ABC".to_string()]);
            }
            other => panic!("unexpected entity: {:?}", other),
        }
    }

    #[test]
    fn test_parse_sample() {
        let entity = parse_entity(
            EntityKind::Sample,
            r#"{"id":"ERS000001","bioSampleId":"SAMEA0000001","organism":"Homo sapiens","taxId":9606}"#,
        )
        .unwrap();
        assert_eq!(entity.canonical_id(), "SAMEA0000001");
    }

    #[test]
    fn test_malformed_response_is_service_error() {
        let err = parse_entity(EntityKind::Run, "<html>").unwrap_err();
        assert!(matches!(err, LookupError::Service { .. }));
    }

    #[test]
    fn test_unreachable_service_is_service_error() {
        let unreachable = client("http://127.0.0.1:9/");
        let err = unreachable.resolve(EntityKind::Study, "SRP000392").unwrap_err();
        assert!(matches!(err, LookupError::Service { .. }));
    }
}
