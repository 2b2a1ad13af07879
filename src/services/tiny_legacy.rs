// src/services/tiny_legacy.rs
//
// Cliente da API legada do Tiny (api2): endpoints `<operacao>.php` com o
// token e o formato embutidos na query. As leituras são idempotentes e o
// chamador pode repetir à vontade; a única escrita (alterar situação) não
// é, e só sai daqui através do gate de dry-run do OrderStatusSync.

use std::time::Duration;

use reqwest::Client;

use crate::{
    common::error::AppError,
    models::tiny::{FormatoLegado, RespostaLegada},
};

pub const TINY_API2_BASE: &str = "https://api.tiny.com.br/api2";

// O ERP é de terceiro: sem timeout explícito uma chamada pendurada
// seguraria a requisição inteira.
const TIMEOUT_SEGUNDOS: u64 = 15;

#[derive(Clone)]
pub struct TinyLegacyClient {
    http: Client,
    base_url: String,
}

impl TinyLegacyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SEGUNDOS))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { http, base_url: base_url.into() }
    }

    /// Query da chamada: token + formato fixos, mais os parâmetros da
    /// operação. O token entra aqui e em nenhum log.
    fn montar_query(
        token: &str,
        formato: FormatoLegado,
        params: &[(&str, &str)],
    ) -> Vec<(String, String)> {
        let mut query = Vec::with_capacity(params.len() + 2);
        query.push(("token".to_string(), token.to_string()));
        query.push(("formato".to_string(), formato.as_str().to_string()));
        for (chave, valor) in params {
            query.push((chave.to_string(), valor.to_string()));
        }
        query
    }

    /// Chamada genérica a um endpoint da api2. O resultado vem etiquetado
    /// pelo formato pedido; o chamador faz pattern-match.
    pub async fn call(
        &self,
        endpoint: &str,
        token: &str,
        params: &[(&str, &str)],
        formato: FormatoLegado,
    ) -> Result<RespostaLegada, AppError> {
        let url = format!("{}/{}.php", self.base_url, endpoint);
        let query = Self::montar_query(token, formato, params);

        let resposta = self.http.get(&url).query(&query).send().await?;
        let texto = resposta.text().await?;

        match formato {
            FormatoLegado::Json => {
                if texto.trim().is_empty() {
                    return Ok(RespostaLegada::Texto(texto));
                }
                serde_json::from_str(&texto)
                    .map(RespostaLegada::Json)
                    .map_err(|_| AppError::JsonInvalido(texto))
            }
            FormatoLegado::Xml => Ok(RespostaLegada::Xml(texto)),
        }
    }

    // --- LEITURAS ---

    pub async fn pesquisar_pedidos(
        &self,
        token: &str,
        pesquisa: &str,
    ) -> Result<RespostaLegada, AppError> {
        self.call("pedidos.pesquisa", token, &[("pesquisa", pesquisa)], FormatoLegado::Json)
            .await
    }

    pub async fn obter_pedido(&self, token: &str, id: &str) -> Result<RespostaLegada, AppError> {
        self.call("pedido.obter", token, &[("id", id)], FormatoLegado::Json)
            .await
    }

    pub async fn obter_expedicao(
        &self,
        token: &str,
        id_expedicao: &str,
    ) -> Result<RespostaLegada, AppError> {
        self.call(
            "expedicao.obter",
            token,
            &[("idExpedicao", id_expedicao)],
            FormatoLegado::Json,
        )
        .await
    }

    pub async fn pesquisar_transportadoras(
        &self,
        token: &str,
        pesquisa: &str,
    ) -> Result<RespostaLegada, AppError> {
        self.call(
            "transportadoras.pesquisa",
            token,
            &[("pesquisa", pesquisa)],
            FormatoLegado::Json,
        )
        .await
    }

    // --- ESCRITA ---

    /// Altera a situação de um pedido no ERP. Não idempotente do lado do
    /// Tiny; o único caminho até aqui é o OrderStatusSync com o gate de
    /// dry-run resolvido.
    pub(crate) async fn alterar_situacao_pedido(
        &self,
        token: &str,
        id: &str,
        situacao: &str,
    ) -> Result<RespostaLegada, AppError> {
        self.call(
            "pedido.alterar.situacao",
            token,
            &[("id", id), ("situacao", situacao)],
            FormatoLegado::Json,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_embute_token_e_formato() {
        let query = TinyLegacyClient::montar_query(
            "tok-123",
            FormatoLegado::Json,
            &[("pesquisa", "maria")],
        );
        assert_eq!(
            query,
            vec![
                ("token".to_string(), "tok-123".to_string()),
                ("formato".to_string(), "JSON".to_string()),
                ("pesquisa".to_string(), "maria".to_string()),
            ]
        );
    }

    #[test]
    fn formato_xml_na_query() {
        let query = TinyLegacyClient::montar_query("t", FormatoLegado::Xml, &[]);
        assert!(query.contains(&("formato".to_string(), "XML".to_string())));
    }
}
