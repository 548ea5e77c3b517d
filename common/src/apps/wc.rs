use super::KeyValue;

/// Emite `(palabra, "1")` por cada palabra. Una palabra es una secuencia
/// de letras; todo lo demás separa.
pub fn map(_input: &str, contents: &str) -> Vec<KeyValue> {
    contents
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .map(|w| KeyValue::new(w, "1"))
        .collect()
}

/// Cuántas veces apareció la palabra.
pub fn reduce(_key: &str, values: &[String]) -> String {
    values.len().to_string()
}
