// src/services/transportadora_service.rs
//
// Matching de transportadora: o nome livre que chega do Tiny é casado
// contra o registro canônico em três camadas, na ordem, e a primeira que
// satisfizer vence. O registro nunca é mutado durante o matching.

use crate::{
    common::error::AppError,
    db::TransportadoraRepository,
    models::transportadora::{ResolucaoTransportadora, Transportadora},
};

/// Rótulo sentinela para nome ausente/em branco.
pub const NOME_NAO_DEFINIDA: &str = "Não definida";

#[derive(Clone)]
pub struct TransportadoraService {
    repo: TransportadoraRepository,
}

impl TransportadoraService {
    pub fn new(repo: TransportadoraRepository) -> Self {
        Self { repo }
    }

    /// Resolve um nome livre contra o registro. Nome em branco devolve o
    /// sentinela sem consultar nada; sem match, o texto original é
    /// preservado como rótulo em vez de falhar a requisição.
    pub async fn resolver(
        &self,
        nome_bruto: Option<&str>,
    ) -> Result<ResolucaoTransportadora, AppError> {
        let bruto = nome_bruto.unwrap_or("");
        if bruto.trim().is_empty() {
            return Ok(ResolucaoTransportadora {
                transportadora: None,
                nome_display: NOME_NAO_DEFINIDA.to_string(),
            });
        }

        // A lista vem em ordem de criação; o matching parcial depende disso.
        let lista = self.repo.list_ativas().await?;
        let normalizado = normalizar(bruto);

        match match_transportadora(&normalizado, &lista) {
            Some(t) => Ok(ResolucaoTransportadora {
                nome_display: t.nome_display.clone(),
                transportadora: Some(t.clone()),
            }),
            None => Ok(ResolucaoTransportadora {
                transportadora: None,
                nome_display: bruto.to_string(),
            }),
        }
    }
}

pub(crate) fn normalizar(nome: &str) -> String {
    nome.trim().to_uppercase()
}

/// As três camadas, em ordem estrita:
/// 1. nome canônico igual ao texto normalizado;
/// 2. algum alias (normalizado) igual;
/// 3. continência bidirecional contra nome e aliases; a primeira
///    transportadora da varredura que satisfizer vence, sem ranking.
pub(crate) fn match_transportadora<'a>(
    normalizado: &str,
    lista: &'a [Transportadora],
) -> Option<&'a Transportadora> {
    if let Some(t) = lista.iter().find(|t| normalizar(&t.nome) == normalizado) {
        return Some(t);
    }

    if let Some(t) = lista
        .iter()
        .find(|t| t.aliases.iter().any(|a| normalizar(a) == normalizado))
    {
        return Some(t);
    }

    lista.iter().find(|t| {
        let nome = normalizar(&t.nome);
        let casa_nome =
            !nome.is_empty() && (normalizado.contains(&nome) || nome.contains(normalizado));
        casa_nome
            || t.aliases.iter().any(|a| {
                let alias = normalizar(a);
                !alias.is_empty()
                    && (normalizado.contains(&alias) || alias.contains(normalizado))
            })
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn transportadora(nome: &str, aliases: &[&str]) -> Transportadora {
        Transportadora {
            id: Uuid::new_v4(),
            nome: nome.to_string(),
            nome_display: {
                let mut chars = nome.chars();
                match chars.next() {
                    Some(c) => c.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                    None => String::new(),
                }
            },
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            is_active: true,
            criado_em: Utc::now(),
        }
    }

    fn registro() -> Vec<Transportadora> {
        vec![
            transportadora("CORREIOS", &["ECT", "CORREIO"]),
            transportadora("JADLOG", &["JAD LOG"]),
            transportadora("TOTAL EXPRESS", &[]),
        ]
    }

    #[test]
    fn camada_1_match_exato() {
        let lista = registro();
        let t = match_transportadora("JADLOG", &lista).unwrap();
        assert_eq!(t.nome, "JADLOG");
    }

    #[test]
    fn match_exato_vence_mesmo_com_sobreposicao_parcial() {
        // "CORREIO" é alias de CORREIOS, mas "CORREIOS" exato resolve na
        // camada 1 sem olhar aliases de ninguém.
        let lista = registro();
        let t = match_transportadora("CORREIOS", &lista).unwrap();
        assert_eq!(t.nome, "CORREIOS");
    }

    #[test]
    fn camada_2_match_por_alias() {
        let lista = registro();
        let t = match_transportadora("ECT", &lista).unwrap();
        assert_eq!(t.nome, "CORREIOS");
    }

    #[test]
    fn alias_em_minusculas_no_cadastro_ainda_casa() {
        let lista = vec![transportadora("CORREIOS", &["ect "])];
        let t = match_transportadora("ECT", &lista).unwrap();
        assert_eq!(t.nome, "CORREIOS");
    }

    #[test]
    fn camada_3_continencia_bidirecional() {
        let lista = registro();
        // Entrada contém o nome canônico.
        let t = match_transportadora("TRANSPORTADORA JADLOG SA", &lista).unwrap();
        assert_eq!(t.nome, "JADLOG");
        // Nome canônico contém a entrada.
        let t = match_transportadora("TOTAL", &lista).unwrap();
        assert_eq!(t.nome, "TOTAL EXPRESS");
    }

    #[test]
    fn camada_3_primeira_da_varredura_vence() {
        // Duas candidatas satisfazem a continência; a ordem de criação
        // decide, sem ranking por qualidade de match.
        let lista = vec![
            transportadora("EXPRESS SUL", &[]),
            transportadora("TOTAL EXPRESS", &[]),
        ];
        let t = match_transportadora("LOGISTICA EXPRESS SUL TOTAL EXPRESS", &lista).unwrap();
        assert_eq!(t.nome, "EXPRESS SUL");
    }

    #[test]
    fn sem_match_devolve_none() {
        let lista = registro();
        assert!(match_transportadora("BRASPRESS", &lista).is_none());
    }

    #[test]
    fn cenario_correio_minusculo_resolve_por_alias() {
        let lista = vec![transportadora("CORREIOS", &["ECT", "CORREIO"])];
        let t = match_transportadora(&normalizar("correio"), &lista).unwrap();
        assert_eq!(t.nome, "CORREIOS");
    }

    #[test]
    fn alias_vazio_nao_casa_com_tudo() {
        let lista = vec![transportadora("CORREIOS", &["", "  "])];
        assert!(match_transportadora("BRASPRESS", &lista).is_none());
    }

    #[test]
    fn normalizar_apara_e_sobe_caixa() {
        assert_eq!(normalizar("  correios  "), "CORREIOS");
    }
}
