use serde::{Deserialize, Deserializer};

// Distingue "campo ausente" de "campo enviado como null" nos payloads de
// PATCH: ausente -> None, null -> Some(None), valor -> Some(Some(v)).
// Usado com `#[serde(default, deserialize_with = "double_option")]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Parche {
        #[serde(default, deserialize_with = "double_option")]
        nro_registro: Option<Option<String>>,
    }

    #[test]
    fn ausente_null_y_valor() {
        let ausente: Parche = serde_json::from_str("{}").unwrap();
        assert_eq!(ausente.nro_registro, None);

        let nulo: Parche = serde_json::from_str(r#"{"nro_registro": null}"#).unwrap();
        assert_eq!(nulo.nro_registro, Some(None));

        let valor: Parche = serde_json::from_str(r#"{"nro_registro": "R-7"}"#).unwrap();
        assert_eq!(valor.nro_registro, Some(Some("R-7".to_string())));
    }
}
