//! Feed response shape and its conversion into a [`DrawRecord`].
//!
//! The feed is inconsistent between games and over time: the draw date may be
//! `dataApuracao` or `dataRealizacao`, and the numbers may arrive in
//! `listaDezenas` or `dezenasSorteadasOrdemSorteio`, as strings ("07") or as
//! integers. Everything is optional here and checked in [`DrawPayload::into_record`].

use serde::Deserialize;
use serde_json::Value;

use crate::models::{DrawRecord, LotteryVariant, ValidationError};

#[derive(Debug, Clone, Deserialize)]
pub struct DrawPayload {
    #[serde(alias = "concurso")]
    pub numero: Option<u32>,
    #[serde(rename = "dataApuracao")]
    pub data_apuracao: Option<String>,
    #[serde(rename = "dataRealizacao")]
    pub data_realizacao: Option<String>,
    #[serde(rename = "listaDezenas")]
    pub lista_dezenas: Option<Vec<Value>>,
    #[serde(rename = "dezenasSorteadasOrdemSorteio")]
    pub dezenas_ordem_sorteio: Option<Vec<Value>>,
    pub acumulado: Option<bool>,
    #[serde(rename = "valorEstimadoProximoConcurso")]
    pub valor_estimado_proximo_concurso: Option<f64>,
    #[serde(rename = "dataProximoConcurso")]
    pub data_proximo_concurso: Option<String>,
}

impl DrawPayload {
    /// First non-empty numbers field.
    fn raw_numbers(&self) -> Option<&[Value]> {
        [&self.lista_dezenas, &self.dezenas_ordem_sorteio]
            .into_iter()
            .flatten()
            .map(Vec::as_slice)
            .find(|list| !list.is_empty())
    }

    fn draw_date(&self) -> Option<&str> {
        [&self.data_apuracao, &self.data_realizacao]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
    }

    /// Validate against the game's rules and build the canonical record.
    pub fn into_record(self, variant: &LotteryVariant) -> Result<DrawRecord, ValidationError> {
        let contest = self.numero.ok_or(ValidationError::MissingField("numero"))?;
        let date = self
            .draw_date()
            .ok_or(ValidationError::MissingField("dataApuracao"))?
            .to_string();
        let raw = self
            .raw_numbers()
            .ok_or(ValidationError::MissingField("listaDezenas"))?;

        let numbers = raw
            .iter()
            .map(|value| coerce_number(value, variant))
            .collect::<Result<Vec<u8>, _>>()?;

        let record = DrawRecord::new(variant, contest, date, numbers)?;
        Ok(record.with_jackpot(
            self.acumulado.unwrap_or(false),
            self.valor_estimado_proximo_concurso.unwrap_or(0.0),
            self.data_proximo_concurso
                .filter(|d| !d.trim().is_empty()),
        ))
    }
}

fn coerce_number(value: &Value, variant: &LotteryVariant) -> Result<u8, ValidationError> {
    let parsed: i64 = match value {
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| ValidationError::NotANumber(s.clone()))?,
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| ValidationError::NotANumber(n.to_string()))?,
        other => return Err(ValidationError::NotANumber(other.to_string())),
    };

    u8::try_from(parsed).map_err(|_| ValidationError::OutOfRange {
        number: parsed,
        min: variant.min_number,
        max: variant.max_number,
    })
}
