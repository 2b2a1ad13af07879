// src/services/tiny_oauth.rs
//
// Cliente OAuth2 do Tiny: troca client-credentials, montagem da URL de
// autorização (authorization-code) e chamadas bearer à API v3. A troca do
// `code` por tokens no callback fica fora daqui (colaborador externo).

use std::time::Duration;

use reqwest::{Client, Method, header::CONTENT_TYPE};

use crate::{
    common::error::AppError,
    models::tiny::{CorpoResposta, RespostaV3, TokenOAuth},
};

pub const TINY_ACCOUNTS_BASE: &str =
    "https://accounts.tiny.com.br/realms/tiny/protocol/openid-connect";
pub const TINY_API_V3_BASE: &str = "https://api.tiny.com.br/public-api/v3";

const TIMEOUT_SEGUNDOS: u64 = 15;

#[derive(Clone)]
pub struct TinyOAuthClient {
    http: Client,
    token_url: String,
    auth_url: String,
    api_base: String,
}

impl Default for TinyOAuthClient {
    fn default() -> Self {
        Self::new(TINY_ACCOUNTS_BASE, TINY_API_V3_BASE)
    }
}

impl TinyOAuthClient {
    pub fn new(accounts_base: &str, api_base: &str) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SEGUNDOS))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            token_url: format!("{accounts_base}/token"),
            auth_url: format!("{accounts_base}/auth"),
            api_base: api_base.to_string(),
        }
    }

    /// Troca client-credentials: uma única ida ao servidor de autorização.
    /// Não-2xx vira `FalhaTrocaOAuth` com status e corpo preservados; sem
    /// retry, credencial ou vale ou não vale.
    pub async fn exchange(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<TokenOAuth, AppError> {
        let resposta = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])
            .send()
            .await?;

        let status = resposta.status();
        if !status.is_success() {
            let corpo = resposta.text().await.unwrap_or_default();
            return Err(AppError::FalhaTrocaOAuth { status: status.as_u16(), corpo });
        }

        let texto = resposta.text().await?;
        serde_json::from_str(&texto).map_err(|_| AppError::JsonInvalido(texto))
    }

    /// URL de entrada do fluxo authorization-code: scope fixo `openid`,
    /// response_type `code`, state opcional. Valores percent-encoded.
    pub fn build_authorization_url(
        &self,
        client_id: &str,
        redirect_uri: &str,
        state: Option<&str>,
    ) -> String {
        let mut params = vec![
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("scope", "openid"),
            ("response_type", "code"),
        ];
        if let Some(state) = state {
            params.push(("state", state));
        }

        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", self.auth_url, query)
    }

    /// Chamada bearer à API v3. Sem retry implícito: o status volta cru e o
    /// chamador decide.
    pub async fn request(
        &self,
        path: &str,
        metodo: Method,
        corpo: Option<&serde_json::Value>,
        access_token: &str,
    ) -> Result<RespostaV3, AppError> {
        let url = format!("{}{}", self.api_base, path);

        let mut requisicao = self.http.request(metodo, &url).bearer_auth(access_token);
        if let Some(corpo) = corpo {
            requisicao = requisicao.json(corpo);
        }

        let resposta = requisicao.send().await?;
        let status = resposta.status().as_u16();
        let content_type = resposta
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let texto = resposta.text().await?;

        interpretar_resposta(status, &content_type, &texto)
    }
}

/// Negociação de conteúdo da v3: 204 é sucesso vazio; content-type JSON é
/// parseado (corpo não-vazio malformado é erro); qualquer outro content-type
/// volta como texto para inspeção do chamador.
fn interpretar_resposta(
    status: u16,
    content_type: &str,
    corpo: &str,
) -> Result<RespostaV3, AppError> {
    if status == 204 {
        return Ok(RespostaV3 { status, corpo: CorpoResposta::Vazio });
    }

    if content_type.contains("json") {
        if corpo.trim().is_empty() {
            return Ok(RespostaV3 { status, corpo: CorpoResposta::Vazio });
        }
        return serde_json::from_str(corpo)
            .map(|valor| RespostaV3 { status, corpo: CorpoResposta::Json(valor) })
            .map_err(|_| AppError::JsonInvalido(corpo.to_string()));
    }

    Ok(RespostaV3 { status, corpo: CorpoResposta::Texto(corpo.to_string()) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_de_autorizacao_completa() {
        let client = TinyOAuthClient::default();
        let url = client.build_authorization_url(
            "meu-app",
            "https://expedicao.example.com/callback",
            Some("abc123"),
        );

        assert!(url.starts_with(&format!("{TINY_ACCOUNTS_BASE}/auth?")));
        assert!(url.contains("client_id=meu-app"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fexpedicao.example.com%2Fcallback"));
        assert!(url.contains("scope=openid"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("state=abc123"));
    }

    #[test]
    fn url_de_autorizacao_sem_state() {
        let client = TinyOAuthClient::default();
        let url = client.build_authorization_url("meu-app", "http://localhost/cb", None);
        assert!(!url.contains("state="));
    }

    #[test]
    fn resposta_204_vira_sucesso_vazio() {
        let r = interpretar_resposta(204, "application/json", "").unwrap();
        assert_eq!(r.status, 204);
        assert_eq!(r.corpo, CorpoResposta::Vazio);
    }

    #[test]
    fn resposta_json_e_parseada() {
        let r = interpretar_resposta(200, "application/json; charset=utf-8", r#"{"id": 7}"#)
            .unwrap();
        assert_eq!(r.corpo, CorpoResposta::Json(serde_json::json!({"id": 7})));
    }

    #[test]
    fn json_malformado_preserva_o_corpo() {
        let err = interpretar_resposta(200, "application/json", "{quebrado").unwrap_err();
        assert!(matches!(err, AppError::JsonInvalido(corpo) if corpo == "{quebrado"));
    }

    #[test]
    fn json_com_corpo_vazio_nao_e_erro() {
        let r = interpretar_resposta(200, "application/json", "   ").unwrap();
        assert_eq!(r.corpo, CorpoResposta::Vazio);
    }

    #[test]
    fn content_type_desconhecido_vira_texto() {
        let r = interpretar_resposta(502, "text/html", "<html>erro</html>").unwrap();
        assert_eq!(r.status, 502);
        assert_eq!(r.corpo, CorpoResposta::Texto("<html>erro</html>".to_string()));
    }
}
