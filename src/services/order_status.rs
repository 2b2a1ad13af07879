// src/services/order_status.rs
//
// "Marcar enviado" no ERP, atrás de um gate de dry-run que falha para o
// lado seguro: sem pedido explícito em contrário, a chamada mutante não
// acontece e só a descrição dela volta. A chamada é irreversível no Tiny.

use reqwest::Method;
use serde_json::json;

use crate::{
    common::error::AppError,
    models::tiny::{ChamadaDescrita, CorpoResposta, MarcarEnviadoResultado, RespostaLegada},
    services::{TinyLegacyClient, TinyOAuthClient},
};

/// Código de situação "enviado" na API v3.
pub const SITUACAO_ENVIADO: i64 = 5;
/// Rótulo equivalente na API legada.
pub const SITUACAO_ENVIADO_LEGADO: &str = "Enviado";

#[derive(Clone)]
pub struct OrderStatusSync {
    oauth: TinyOAuthClient,
    legacy: TinyLegacyClient,
    dry_run_default: bool,
}

impl OrderStatusSync {
    /// O default de dry-run entra aqui de propósito (vem da configuração,
    /// nunca lido de ambiente no meio do caminho) para os testes poderem
    /// fixá-lo.
    pub fn new(oauth: TinyOAuthClient, legacy: TinyLegacyClient, dry_run_default: bool) -> Self {
        Self { oauth, legacy, dry_run_default }
    }

    pub fn dry_run_efetivo(&self, explicito: Option<bool>) -> bool {
        explicito.unwrap_or(self.dry_run_default)
    }

    /// Descrição da chamada v3. Idêntica em forma à execução real: é ela que
    /// volta no dry-run e é ela que vai para a rede no modo real.
    pub fn descrever_chamada(pedido_id: &str) -> ChamadaDescrita {
        ChamadaDescrita {
            metodo: "PUT".to_string(),
            path: format!("/pedidos/{pedido_id}/situacao"),
            corpo: json!({ "situacao": SITUACAO_ENVIADO }),
        }
    }

    /// Marca o pedido como enviado via API v3. Em dry-run devolve só a
    /// descrição, sem rede. No modo real exige access token (falha
    /// `NaoAutenticado` antes de qualquer chamada) e um não-2xx do Tiny
    /// sobe como `RecusadoUpstream`, nunca engolido.
    pub async fn marcar_enviado(
        &self,
        pedido_id: &str,
        dry_run: Option<bool>,
        access_token: Option<&str>,
    ) -> Result<MarcarEnviadoResultado, AppError> {
        let dry_run = self.dry_run_efetivo(dry_run);
        let chamada = Self::descrever_chamada(pedido_id);

        if dry_run {
            return Ok(MarcarEnviadoResultado { dry_run: true, chamada, resposta: None });
        }

        let token = access_token.ok_or(AppError::NaoAutenticado)?;

        let resposta = self
            .oauth
            .request(&chamada.path, Method::PUT, Some(&chamada.corpo), token)
            .await?;

        if !(200..300).contains(&resposta.status) {
            let corpo = match resposta.corpo {
                CorpoResposta::Json(valor) => valor.to_string(),
                CorpoResposta::Texto(texto) => texto,
                CorpoResposta::Vazio => String::new(),
            };
            return Err(AppError::RecusadoUpstream { status: resposta.status, corpo });
        }

        let valor = match resposta.corpo {
            CorpoResposta::Json(valor) => Some(valor),
            CorpoResposta::Texto(texto) => Some(serde_json::Value::String(texto)),
            CorpoResposta::Vazio => None,
        };

        Ok(MarcarEnviadoResultado { dry_run: false, chamada, resposta: valor })
    }

    /// Descrição da variante legada (api2), mesmo contrato de paridade.
    pub fn descrever_chamada_legada(pedido_id: &str) -> ChamadaDescrita {
        ChamadaDescrita {
            metodo: "GET".to_string(),
            path: "/pedido.alterar.situacao.php".to_string(),
            corpo: json!({ "id": pedido_id, "situacao": SITUACAO_ENVIADO_LEGADO }),
        }
    }

    /// Variante legada, usada quando o workspace opera no ambiente de teste
    /// (sem app OAuth). Mesmo gate: dry-run descreve, modo real exige o
    /// token do cofre.
    pub async fn marcar_enviado_legado(
        &self,
        token_legado: Option<&str>,
        pedido_id: &str,
        dry_run: Option<bool>,
    ) -> Result<MarcarEnviadoResultado, AppError> {
        let dry_run = self.dry_run_efetivo(dry_run);
        let chamada = Self::descrever_chamada_legada(pedido_id);

        if dry_run {
            return Ok(MarcarEnviadoResultado { dry_run: true, chamada, resposta: None });
        }

        let token = token_legado.ok_or(AppError::NaoAutenticado)?;

        let resposta = self
            .legacy
            .alterar_situacao_pedido(token, pedido_id, SITUACAO_ENVIADO_LEGADO)
            .await?;

        // A api2 responde 200 até para falha; o veredito vem em retorno.status.
        let valor = match resposta {
            RespostaLegada::Json(valor) => {
                let recusado = valor
                    .pointer("/retorno/status")
                    .and_then(|s| s.as_str())
                    .is_some_and(|s| s.eq_ignore_ascii_case("erro"));
                if recusado {
                    return Err(AppError::RecusadoUpstream {
                        status: 200,
                        corpo: valor.to_string(),
                    });
                }
                Some(valor)
            }
            RespostaLegada::Xml(texto) | RespostaLegada::Texto(texto) => {
                Some(serde_json::Value::String(texto))
            }
        };

        Ok(MarcarEnviadoResultado { dry_run: false, chamada, resposta: valor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sync(dry_run_default: bool) -> OrderStatusSync {
        OrderStatusSync::new(
            TinyOAuthClient::default(),
            TinyLegacyClient::new(crate::services::tiny_legacy::TINY_API2_BASE),
            dry_run_default,
        )
    }

    #[test]
    fn descricao_tem_path_e_situacao_corretos() {
        let chamada = OrderStatusSync::descrever_chamada("987");
        assert_eq!(chamada.metodo, "PUT");
        assert_eq!(chamada.path, "/pedidos/987/situacao");
        assert_eq!(chamada.corpo, json!({ "situacao": 5 }));
    }

    #[tokio::test]
    async fn dry_run_por_default_nao_toca_a_rede() {
        // Default seguro: sem flag explícita, nada de mutação.
        let resultado = sync(true).marcar_enviado("123", None, None).await.unwrap();
        assert!(resultado.dry_run);
        assert!(resultado.resposta.is_none());
        assert_eq!(resultado.chamada.path, "/pedidos/123/situacao");
        assert_eq!(resultado.chamada.corpo["situacao"], 5);
    }

    #[tokio::test]
    async fn dry_run_explicito_vence_o_default() {
        let resultado = sync(false).marcar_enviado("123", Some(true), None).await.unwrap();
        assert!(resultado.dry_run);
    }

    #[tokio::test]
    async fn modo_real_sem_token_falha_antes_da_rede() {
        let err = sync(true)
            .marcar_enviado("123", Some(false), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NaoAutenticado));
    }

    #[tokio::test]
    async fn variante_legada_sem_token_falha_antes_da_rede() {
        let err = sync(true)
            .marcar_enviado_legado(None, "123", Some(false))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NaoAutenticado));
    }

    #[test]
    fn dry_run_efetivo_respeita_default_e_override() {
        assert!(sync(true).dry_run_efetivo(None));
        assert!(!sync(false).dry_run_efetivo(None));
        assert!(!sync(true).dry_run_efetivo(Some(false)));
        assert!(sync(false).dry_run_efetivo(Some(true)));
    }

    #[test]
    fn descricao_legada_usa_rotulo_enviado() {
        let chamada = OrderStatusSync::descrever_chamada_legada("55");
        assert_eq!(chamada.corpo["situacao"], "Enviado");
        assert_eq!(chamada.corpo["id"], "55");
    }
}
