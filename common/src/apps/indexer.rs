use std::collections::BTreeSet;

use super::KeyValue;

/// Índice invertido: emite `(palabra, documento)` una vez por palabra
/// distinta del documento.
pub fn map(input: &str, contents: &str) -> Vec<KeyValue> {
    let words: BTreeSet<&str> = contents
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .collect();

    words
        .into_iter()
        .map(|w| KeyValue::new(w, input))
        .collect()
}

/// `"<n> doc1,doc2,..."` con los documentos ordenados y sin repetir.
pub fn reduce(_key: &str, values: &[String]) -> String {
    let docs: BTreeSet<&str> = values.iter().map(String::as_str).collect();
    let joined = docs.iter().copied().collect::<Vec<_>>().join(",");
    format!("{} {}", docs.len(), joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_emite_cada_palabra_una_vez_por_documento() {
        let out = map("a.txt", "uno dos uno");
        assert_eq!(
            out,
            vec![KeyValue::new("dos", "a.txt"), KeyValue::new("uno", "a.txt")]
        );
    }

    #[test]
    fn reduce_ordena_y_deduplica_documentos() {
        let values = vec!["b.txt".to_string(), "a.txt".to_string(), "b.txt".to_string()];
        assert_eq!(reduce("uno", &values), "2 a.txt,b.txt");
    }
}
